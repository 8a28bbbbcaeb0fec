//! UI rendering for the TUI

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::state::{AppState, FocusedPanel, FollowPanel, Mode, PostSource, Screen};
use crate::forms::FormState;
use crate::models::{Comment, Post, Profile};
use crate::theme::{Theme, ThemeColors};

/// App icon
const ICON: &str = "🌐";

// Spinner animation frames
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main render function
pub fn render(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();

    // Set background
    let area = frame.area();
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_tabs(frame, state, chunks[0]);
    render_main(frame, state, chunks[1]);
    render_status_bar(frame, state, chunks[2]);

    // Render modal dialogs
    match &state.mode {
        Mode::Help => render_help_popup(frame, state),
        Mode::ThemePicker => render_theme_picker(frame, state),
        Mode::ComposePost => {
            let title = if state.post_form.editing.is_some() {
                " ✏️ Edit Post "
            } else {
                " 📝 New Post "
            };
            render_form_popup(frame, state, &state.post_form, title, "Ctrl+S post");
        }
        Mode::Comment => {
            let title = if state.comment_form.editing.is_some() {
                " ✏️ Edit Comment "
            } else {
                " 💬 Add Comment "
            };
            render_form_popup(frame, state, &state.comment_form, title, "↵ send");
        }
        Mode::EditProfile => {
            render_form_popup(frame, state, &state.profile_form, " 👤 Edit Profile ", "↵ save");
        }
        Mode::UploadImage => {
            let title = format!(" 🖼️ Upload {} ", state.image_form.target.name());
            render_form_popup(frame, state, &state.image_form, &title, "↵ upload");
        }
        Mode::Goto => render_goto_popup(frame, state),
        Mode::Confirm(confirm) => render_confirm_dialog(frame, state, confirm.prompt()),
        Mode::Normal => {}
    }
}

fn render_tabs(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.border_style(false))
        .title(format!(" {ICON} sosmed "))
        .title_style(colors.logo(true));

    if !state.is_logged_in() {
        let line = Line::from(vec![
            Span::styled(" ", Style::default()),
            Span::styled(state.screen.title(), colors.tab(true)),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), area);
        return;
    }

    let selected = match &state.screen {
        Screen::Home | Screen::Register | Screen::Login => 0,
        Screen::Posts {
            source: PostSource::Bookmarks,
            ..
        } => 3,
        Screen::Posts { .. } => 1,
        Screen::Profile | Screen::UserProfile(_) => 2,
    };

    let titles: Vec<Line> = ["Home", "Feed", "Profile", "Bookmarks"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Line::from(format!(
                "{}  {name}",
                if i == selected { "●" } else { "○" }
            ))
        })
        .collect();

    let user = state
        .current_user()
        .map(|u| format!(" @{} ", u.username))
        .unwrap_or_default();

    let tabs = Tabs::new(titles)
        .block(block.title_top(Line::from(user).right_aligned()))
        .select(selected)
        .style(colors.tab(false))
        .highlight_style(colors.tab(true))
        .divider(Span::styled(" │ ", colors.text_muted()));

    frame.render_widget(tabs, area);
}

fn render_main(frame: &mut Frame, state: &AppState, area: Rect) {
    match &state.screen {
        Screen::Register => render_auth_view(frame, state, area, true),
        Screen::Login => render_auth_view(frame, state, area, false),
        Screen::Home => render_home_view(frame, state, area),
        Screen::Posts { .. } => render_posts_view(frame, state, area),
        Screen::Profile | Screen::UserProfile(_) => render_profile_view(frame, state, area),
    }
}

/// Pad `text` with spaces to `width` display columns
fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

fn logo_lines(colors: &ThemeColors) -> Vec<Line<'static>> {
    crate::LOGO
        .lines()
        .filter(|l| !l.is_empty())
        .enumerate()
        .map(|(i, l)| Line::from(Span::styled(l.to_string(), colors.logo(i < 3))))
        .collect()
}

fn hint_line(colors: &ThemeColors, hints: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = vec![Span::styled("  ", Style::default())];
    for (key, label) in hints {
        spans.push(Span::styled(*key, colors.key_hint()));
        spans.push(Span::styled(format!(" {label}  "), colors.text_muted()));
    }
    Line::from(spans)
}

/// Label + boxed value for every field of a form
fn form_lines(form: &impl FormState, colors: &ThemeColors, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let inner = width.saturating_sub(4).max(10);
    for (i, label) in form.labels().iter().enumerate() {
        let focused = i == form.focused();
        lines.push(Line::from(vec![
            Span::styled(if focused { "▸ " } else { "  " }, colors.heading()),
            Span::styled(
                *label,
                if focused {
                    colors.heading().add_modifier(Modifier::BOLD)
                } else {
                    colors.text_dim()
                },
            ),
        ]));

        let mut value = form.display(i);
        if focused {
            value.push('▏');
        }
        let style = colors.input(focused);
        let wrapped: Vec<String> = value
            .split('\n')
            .flat_map(|l| {
                if l.is_empty() {
                    vec![String::new()]
                } else {
                    textwrap::wrap(l, inner)
                        .into_iter()
                        .map(|c| c.into_owned())
                        .collect()
                }
            })
            .collect();
        for chunk in wrapped {
            lines.push(Line::from(vec![
                Span::styled("  ", Style::default()),
                Span::styled(pad(&chunk, inner), style),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines
}

// ==================== Guest screens ====================

fn render_auth_view(frame: &mut Frame, state: &AppState, area: Rect, register: bool) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(60, 90, area);
    let width = popup_area.width.saturating_sub(2) as usize;

    let mut lines = logo_lines(&colors);
    lines.push(Line::from(""));

    let (form_content, toggle_label, submit, pending) = if register {
        (
            form_lines(&state.register_form, &colors, width),
            state.register_form.password.toggle_label(),
            "Sign Up",
            state
                .mutations
                .is_pending(&crate::mutation::MutationKey::Register),
        )
    } else {
        (
            form_lines(&state.login_form, &colors, width),
            state.login_form.password.toggle_label(),
            "Login",
            state.mutations.is_pending(&crate::mutation::MutationKey::Login),
        )
    };
    lines.extend(form_content);

    let button = if pending {
        if register {
            "Registering..."
        } else {
            "Logging in..."
        }
    } else {
        submit
    };
    lines.push(Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(format!(" {button} "), colors.selected()),
    ]));
    lines.push(Line::from(""));
    lines.push(hint_line(
        &colors,
        &[
            ("Tab", "next field"),
            ("↵", "submit"),
            ("F2", "show/hide password"),
        ],
    ));
    lines.push(Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(format!("Password: {toggle_label} with F2   "), colors.text_dim()),
        Span::styled("F3", colors.key_hint()),
        Span::styled(
            if register {
                " Already registered? Log in"
            } else {
                " No account? Sign up"
            },
            colors.text_muted(),
        ),
    ]));

    let title = if register { " ✨ Sign Up " } else { " 🔑 Log In " };
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.border_style(true))
            .title(title)
            .title_style(colors.heading()),
    );
    frame.render_widget(paragraph, popup_area);
}

// ==================== Home ====================

fn render_home_view(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let mut lines = vec![Line::from("")];
    lines.extend(logo_lines(&colors));
    lines.push(Line::from(""));

    let name = state
        .current_user()
        .map_or_else(|| "friend".to_string(), |u| u.username.clone());
    lines.push(Line::from(vec![
        Span::styled("Welcome back, ", colors.text()),
        Span::styled(
            format!("@{name}"),
            colors.heading().add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        "Share what's on your mind and see what others are up to.",
        colors.text_dim().add_modifier(Modifier::ITALIC),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" ↵ ", colors.selected()),
        Span::styled(" Start exploring   ", colors.text()),
        Span::styled(" p ", colors.selected()),
        Span::styled(" My profile", colors.text()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("/", colors.key_hint()),
        Span::styled(" jump to @user or #tag", colors.text_muted()),
    ]));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.border_style(false))
            .title(" 🏠 Home ")
            .title_style(colors.heading()),
    );
    frame.render_widget(paragraph, area);
}

// ==================== Post lists ====================

fn post_item(post: &Post, colors: &ThemeColors, width: usize, selected: bool) -> ListItem<'static> {
    let base_style = if selected {
        colors.selected()
    } else {
        Style::default()
    };

    let edited = if post.is_edited() { " (edited)" } else { "" };
    let header = format!(
        " {} @{} · {}{edited}",
        post.author.display_name(),
        post.author.username(),
        post.relative_time()
    );
    let mut lines = vec![Line::styled(
        pad(&header, width),
        base_style.patch(colors.heading()),
    )];

    let content_width = width.saturating_sub(4).max(10);
    let wrapped = textwrap::wrap(&post.content, content_width);
    for chunk in wrapped.iter().take(4) {
        lines.push(Line::styled(
            pad(&format!("   {chunk}"), width),
            base_style.patch(colors.text()),
        ));
    }
    if wrapped.len() > 4 {
        lines.push(Line::styled(pad("   …", width), base_style.patch(colors.text_dim())));
    }

    let tags = post.tags_line();
    if !tags.is_empty() {
        lines.push(Line::styled(
            pad(&format!("   {tags}"), width),
            base_style.patch(colors.accent()),
        ));
    }

    let mut stats = vec![
        Span::styled("   ", base_style),
        Span::styled(
            format!("{} {}", if post.is_liked { "♥" } else { "♡" }, post.likes),
            base_style.patch(colors.like(post.is_liked)),
        ),
        Span::styled(format!("  💬 {}", post.comments), base_style.patch(colors.text_muted())),
    ];
    if !post.images.is_empty() {
        stats.push(Span::styled(
            format!("  🖼️ {}", post.images.len()),
            base_style.patch(colors.text_muted()),
        ));
    }
    if post.is_bookmarked {
        stats.push(Span::styled("  🔖", base_style.patch(colors.bookmark(true))));
    }
    lines.push(Line::from(stats));
    lines.push(Line::from(""));

    ListItem::new(lines)
}

fn render_posts_view(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    // Layout: [Posts 55%] [Detail/Comments 45%]
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let page_label = state.posts_page().map(|page| page.label());
    let title = match page_label {
        Some(label) => format!(" 📰 {} · {label} ", state.screen.title()),
        None => format!(" 📰 {} ", state.screen.title()),
    };

    let list_block = Block::default()
        .title(title)
        .title_style(colors.heading())
        .title_bottom(hint_line(&colors, &[("n/p", "page"), ("c", "new post"), ("↵", "comments")]))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if state.focused_panel == FocusedPanel::Posts {
            colors.border_style(true)
        } else {
            colors.border_style(false)
        });

    let posts = state.posts();
    let loading = state
        .posts_key()
        .is_some_and(|k| state.cache.is_fetching(&k));

    let items: Vec<ListItem> = if posts.is_empty() && loading {
        vec![ListItem::new(Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled("⏳ Loading...", colors.text_muted()),
        ]))]
    } else if posts.is_empty() {
        vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(vec![
                Span::styled("  ℹ ", colors.tone(colors.info)),
                Span::styled("No posts yet", colors.text_muted()),
            ])),
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(vec![
                Span::styled("  Press ", colors.text_dim()),
                Span::styled("[c]", colors.key_hint()),
                Span::styled(" to write one or ", colors.text_dim()),
                Span::styled("[r]", colors.key_hint()),
                Span::styled(" to refresh", colors.text_dim()),
            ])),
        ]
    } else {
        let width = horizontal[0].width.saturating_sub(3) as usize;
        posts
            .iter()
            .enumerate()
            .map(|(i, post)| post_item(post, &colors, width, i == state.selected_post))
            .collect()
    };

    let list = List::new(items).block(list_block);
    let mut list_state = ListState::default();
    if !posts.is_empty() {
        list_state.select(Some(state.selected_post));
    }
    frame.render_stateful_widget(list, horizontal[0], &mut list_state);

    match (state.selected_post(), state.focused_panel) {
        (Some(post), FocusedPanel::Comments) => {
            render_comments_panel(frame, state, post, horizontal[1]);
        }
        (Some(post), FocusedPanel::Posts) => {
            render_post_detail(frame, state, post, horizontal[1]);
        }
        (None, _) => {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::styled("  Select a post", colors.text_muted()),
            ])
            .block(
                Block::default()
                    .title(" 📝 Post ")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(colors.border_style(false)),
            );
            frame.render_widget(empty, horizontal[1]);
        }
    }
}

fn render_post_detail(frame: &mut Frame, state: &AppState, post: &Post, area: Rect) {
    let colors = state.theme.colors();

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                post.author.display_name(),
                colors.heading().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" @{}", post.author.username()), colors.text_muted()),
        ]),
        Line::from(Span::styled(
            format!(
                "  {}{}",
                post.relative_time(),
                if post.is_edited() { " · edited" } else { "" }
            ),
            colors.text_muted(),
        )),
        Line::from(""),
    ];

    for line in post.content.lines() {
        lines.push(Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(line.to_string(), colors.text()),
        ]));
    }

    let tags = post.tags_line();
    if !tags.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {tags}"), colors.accent())));
    }

    if !post.images.is_empty() {
        lines.push(Line::from(""));
        for (i, image) in post.images.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("  [🖼️ {}] ", i + 1), colors.accent()),
                Span::styled(image.url.clone(), colors.text_dim()),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from("  ─────────────────────────────────"));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(
            format!("{} {}", if post.is_liked { "♥" } else { "♡" }, post.likes),
            colors.like(post.is_liked),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(format!("💬 {}", post.comments), colors.text_muted()),
        Span::styled("   ", Style::default()),
        Span::styled(
            if post.is_bookmarked {
                "🔖 saved"
            } else {
                "🔖 save"
            },
            colors.bookmark(post.is_bookmarked),
        ),
    ]));
    lines.push(Line::from(""));

    let mut hints = vec![("L", "like"), ("b", "bookmark"), ("u", "author")];
    if !post.images.is_empty() {
        hints.push(("o", "open image"));
    }
    lines.push(hint_line(&colors, &hints));
    if state.owns_post(post) {
        lines.push(hint_line(&colors, &[("e", "edit"), ("d", "delete"), ("x", "remove image")]));
    }

    let detail = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" 📝 Post ")
                .title_style(colors.heading())
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.border_style(false)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, area);
}

fn comment_item(
    comment: &Comment,
    colors: &ThemeColors,
    width: usize,
    selected: bool,
    own: bool,
) -> ListItem<'static> {
    let base_style = if selected {
        colors.selected()
    } else {
        Style::default()
    };
    let edited = if comment.is_edited() { " (edited)" } else { "" };
    let owner = if own { " · you" } else { "" };
    let header = format!(
        " @{} · {}{edited}{owner}",
        comment.author.username(),
        comment.relative_time()
    );

    let mut lines = vec![Line::styled(
        pad(&header, width),
        base_style.patch(colors.heading()),
    )];
    for chunk in textwrap::wrap(&comment.content, width.saturating_sub(4).max(10)) {
        lines.push(Line::styled(
            pad(&format!("   {chunk}"), width),
            base_style.patch(colors.text()),
        ));
    }
    lines.push(Line::from(vec![
        Span::styled("   ", base_style),
        Span::styled(
            format!("{} {}", if comment.is_liked { "♥" } else { "♡" }, comment.likes),
            base_style.patch(colors.like(comment.is_liked)),
        ),
    ]));
    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn render_comments_panel(frame: &mut Frame, state: &AppState, post: &Post, area: Rect) {
    let colors = state.theme.colors();
    let comments = state.comments();
    let loading = state
        .cache
        .is_fetching(&crate::query::QueryKey::Comments(post.id.clone()));

    let block = Block::default()
        .title(format!(" 💬 Comments on \"{}\" ", post.preview(20)))
        .title_style(colors.heading())
        .title_bottom(hint_line(
            &colors,
            &[("a", "add"), ("e", "edit"), ("d", "delete"), ("L", "like"), ("Esc", "back")],
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.border_style(true));

    let items: Vec<ListItem> = if comments.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            if loading {
                "  ⏳ Loading comments..."
            } else {
                "  No comments yet. Press [a] to add one."
            },
            colors.text_muted(),
        )))]
    } else {
        let width = area.width.saturating_sub(3) as usize;
        comments
            .iter()
            .enumerate()
            .map(|(i, c)| {
                comment_item(c, &colors, width, i == state.selected_comment, state.owns_comment(c))
            })
            .collect()
    };

    let mut list_state = ListState::default();
    if !comments.is_empty() {
        list_state.select(Some(state.selected_comment));
    }
    frame.render_stateful_widget(List::new(items).block(block), area, &mut list_state);
}

// ==================== Profiles ====================

fn profile_lines(profile: &Profile, own: bool, colors: &ThemeColors) -> Vec<Line<'static>> {
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {label:<10}"), colors.text_muted()),
            Span::styled(value, colors.text()),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                profile.display_name(),
                colors.heading().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" @{}", profile.account.username), colors.text_muted()),
        ]),
        Line::from(""),
    ];
    if !profile.bio.is_empty() {
        for line in profile.bio.lines() {
            lines.push(Line::from(Span::styled(
                format!("  {line}"),
                colors.text().add_modifier(Modifier::ITALIC),
            )));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled(format!("  {} ", profile.followers_count), colors.heading()),
        Span::styled("followers   ", colors.text_muted()),
        Span::styled(format!("{} ", profile.following_count), colors.heading()),
        Span::styled("following", colors.text_muted()),
    ]));
    lines.push(Line::from(""));

    if !profile.location.is_empty() {
        lines.push(field("Location", profile.location.clone()));
    }
    if let Some(dob) = profile.dob_date() {
        lines.push(field("Born", dob.to_string()));
    }
    if own {
        if !profile.account.email.is_empty() {
            lines.push(field("Email", profile.account.email.clone()));
        }
        if !profile.phone_number.is_empty() {
            lines.push(field(
                "Phone",
                format!("{} {}", profile.country_code, profile.phone_number)
                    .trim()
                    .to_string(),
            ));
        }
    }
    if let Some(cover) = &profile.cover_image
        && !cover.url.is_empty()
    {
        lines.push(field("Cover", cover.url.clone()));
    }
    if let Some(avatar) = &profile.account.avatar
        && !avatar.url.is_empty()
    {
        lines.push(field("Avatar", avatar.url.clone()));
    }
    lines.push(Line::from(""));

    if !own {
        lines.push(Line::from(vec![
            Span::styled("  ", Style::default()),
            if profile.is_following {
                Span::styled(" ✓ Following ", colors.selected())
            } else {
                Span::styled(" + Follow ", colors.heading().add_modifier(Modifier::BOLD))
            },
        ]));
        lines.push(Line::from(""));
    }
    lines
}

fn render_profile_view(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let own = state.screen == Screen::Profile;

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mut lines = match state.viewed_profile() {
        Some(profile) => profile_lines(profile, own, &colors),
        None if state.is_loading() => vec![
            Line::from(""),
            Line::styled("  ⏳ Loading profile...", colors.text_muted()),
        ],
        None => vec![
            Line::from(""),
            Line::styled("  Profile not available", colors.text_muted()),
        ],
    };
    if own {
        lines.push(hint_line(&colors, &[("e", "edit profile"), ("a", "avatar"), ("c", "cover")]));
        lines.push(hint_line(&colors, &[("p", "my posts"), ("Q", "log out")]));
    } else {
        lines.push(hint_line(&colors, &[("f", "follow/unfollow"), ("p", "posts")]));
        lines.push(hint_line(&colors, &[("[", "followers"), ("]", "following")]));
    }

    let card = Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!(" 👤 {} ", state.screen.title()))
                .title_style(colors.heading())
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.border_style(true)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(card, horizontal[0]);

    if own {
        render_account_panel(frame, state, horizontal[1]);
    } else {
        render_follow_panel(frame, state, horizontal[1]);
    }
}

fn render_account_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let mut lines = vec![Line::from("")];
    if let Some(user) = state.current_user() {
        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("  {label:<10}"), colors.text_muted()),
                Span::styled(value, colors.text()),
            ])
        };
        lines.push(row("Username", format!("@{}", user.username)));
        lines.push(row("Email", user.email.clone()));
        if let Some(role) = &user.role {
            lines.push(row("Role", role.clone()));
        }
        lines.push(row(
            "Verified",
            if user.is_email_verified { "yes" } else { "no" }.to_string(),
        ));
        if let Some(url) = user.avatar_url() {
            lines.push(row("Avatar", url.to_string()));
            lines.push(Line::from(""));
            lines.push(hint_line(&colors, &[("o", "open avatar")]));
        }
    }

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" 🔐 Account ")
                .title_style(colors.heading())
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.border_style(false)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

fn render_follow_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();
    let title = match state.follow_panel {
        Some(FollowPanel::Followers) => " 👥 Followers ",
        Some(FollowPanel::Following) => " 👥 Following ",
        None => " 👥 Connections ",
    };
    let block = Block::default()
        .title(title)
        .title_style(colors.heading())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if state.follow_panel.is_some() {
            colors.border_style(true)
        } else {
            colors.border_style(false)
        });

    if state.follow_panel.is_none() {
        let hint = Paragraph::new(vec![
            Line::from(""),
            hint_line(&colors, &[("[", "show followers"), ("]", "show following")]),
        ])
        .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let entries = state.follow_entries();
    let items: Vec<ListItem> = if entries.is_empty() {
        vec![ListItem::new(Line::styled(
            if state.is_loading() {
                "  ⏳ Loading..."
            } else {
                "  Nobody here yet"
            },
            colors.text_muted(),
        ))]
    } else {
        let width = area.width.saturating_sub(3) as usize;
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if i == state.selected_follow {
                    colors.selected()
                } else {
                    Style::default()
                };
                let mark = if entry.is_following { " ✓" } else { "" };
                let name = entry.full_name();
                let text = if name.is_empty() {
                    format!(" @{}{mark}", entry.username)
                } else {
                    format!(" @{} · {name}{mark}", entry.username)
                };
                ListItem::new(Line::styled(pad(&text, width), style.patch(colors.text())))
            })
            .collect()
    };

    let list = List::new(items).block(block.title_bottom(hint_line(
        &colors,
        &[("↵", "open"), ("F", "follow/unfollow")],
    )));
    let mut list_state = ListState::default();
    if !entries.is_empty() {
        list_state.select(Some(state.selected_follow));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

// ==================== Bars and overlays ====================

fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let busy = state.is_loading() || state.mutations.any_pending();
    let loading_indicator = if busy {
        let frame_idx = usize::try_from(state.current_tick() / 2).unwrap_or(0) % SPINNER.len();
        format!("{} ", SPINNER[frame_idx])
    } else {
        String::new()
    };

    let content = if !state.status.is_empty() {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(&loading_indicator, colors.accent()),
            Span::styled(&state.status, colors.accent()),
        ]
    } else if state.is_logged_in() {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(&loading_indicator, colors.accent()),
            Span::styled("1-4", colors.key_hint()),
            Span::styled(": screens  ", colors.text_muted()),
            Span::styled("/", colors.key_hint()),
            Span::styled(": goto  ", colors.text_muted()),
            Span::styled("r", colors.key_hint()),
            Span::styled(": refresh  ", colors.text_muted()),
            Span::styled("?", colors.key_hint()),
            Span::styled(": help  ", colors.text_muted()),
            Span::styled("t", colors.key_hint()),
            Span::styled(": theme  ", colors.text_muted()),
            Span::styled("q", colors.key_hint()),
            Span::styled(": quit", colors.text_muted()),
        ]
    } else {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(&loading_indicator, colors.accent()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(": quit  ", colors.text_muted()),
            Span::styled("Ctrl+C", colors.key_hint()),
            Span::styled(": quit", colors.text_muted()),
        ]
    };

    let status =
        Paragraph::new(Line::from(content)).style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(status, area);
}

fn help_section(colors: &ThemeColors, title: &'static str) -> Line<'static> {
    Line::from(vec![Span::styled(
        format!("  {title}"),
        colors.heading().add_modifier(Modifier::BOLD),
    )])
}

fn help_row(colors: &ThemeColors, key: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<17}"), colors.key_hint()),
        Span::styled(action, colors.text()),
    ])
}

fn render_help_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(50, 80, frame.area());

    // First render a solid background block to cover everything underneath
    let bg_block = Block::default().style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let c = &colors;
    let help_content = vec![
        Line::from(""),
        help_section(c, "Navigation"),
        help_row(c, "1/2/3/4", "Home / Feed / Profile / Bookmarks"),
        help_row(c, "/", "Jump to @user or #tag"),
        help_row(c, "j/k or ↑/↓", "Move selection"),
        help_row(c, "g/G", "First/last item"),
        help_row(c, "Esc", "Back"),
        help_row(c, "r", "Refresh"),
        Line::from(""),
        help_section(c, "Posts"),
        help_row(c, "n/p or →/←", "Next/previous page"),
        help_row(c, "c", "Compose new post"),
        help_row(c, "e / d", "Edit / delete own post"),
        help_row(c, "x", "Remove last image of own post"),
        help_row(c, "L", "Like/unlike"),
        help_row(c, "b", "Bookmark/un-bookmark"),
        help_row(c, "u", "Open author's profile"),
        help_row(c, "o", "Open image in browser"),
        help_row(c, "Enter", "Open comments"),
        Line::from(""),
        help_section(c, "Comments"),
        help_row(c, "a", "Add comment"),
        help_row(c, "e / d", "Edit / delete own comment"),
        help_row(c, "L", "Like/unlike comment"),
        Line::from(""),
        help_section(c, "Profiles"),
        help_row(c, "e", "Edit own profile"),
        help_row(c, "a / c", "Upload avatar / cover image"),
        help_row(c, "f", "Follow/unfollow"),
        help_row(c, "[ / ]", "Followers / following"),
        help_row(c, "Q", "Log out"),
        Line::from(""),
        help_section(c, "Forms"),
        help_row(c, "Tab / Shift+Tab", "Next/previous field"),
        help_row(c, "Ctrl+S", "Save post or profile"),
        help_row(c, "F2", "Show/hide password"),
        help_row(c, "Esc", "Cancel"),
        Line::from(""),
        help_section(c, "General"),
        help_row(c, "t", "Open theme selector"),
        help_row(c, "?", "Toggle this help"),
        help_row(c, "q", "Quit application"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" or ", colors.text_muted()),
            Span::styled("?", colors.key_hint()),
            Span::styled(" to close", colors.text_muted()),
        ]),
    ];

    let help = Paragraph::new(help_content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.border_style(true))
                .style(Style::default().bg(colors.bg_secondary))
                .title(" ⌨ Keyboard Shortcuts ")
                .title_style(colors.heading()),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help, popup_area);
}

fn render_theme_picker(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(50, 70, frame.area());

    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let themes = Theme::all();
    let items: Vec<ListItem> = themes
        .iter()
        .enumerate()
        .map(|(i, theme_name)| {
            let palette = theme_name.palette();
            let selected = i == state.theme_picker_index;
            let preview = format!(
                "  {} {} ",
                if selected { "▸" } else { " " },
                theme_name.display_name()
            );

            let style = if selected {
                Style::default()
                    .fg(palette.accent)
                    .bg(palette.selection)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.fg).bg(colors.bg)
            };

            ListItem::new(Line::from(vec![
                Span::styled(preview, style),
                Span::styled("█", Style::default().fg(palette.accent).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.secondary).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.success).bg(colors.bg)),
                Span::styled("█", Style::default().fg(palette.warning).bg(colors.bg)),
            ]))
        })
        .collect();

    let theme_list = List::new(items)
        .style(Style::default().bg(colors.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.primary))
                .border_type(BorderType::Rounded)
                .style(Style::default().bg(colors.bg))
                .title(format!(
                    " 🎨 Select Theme ({}/{}) ",
                    state.theme_picker_index + 1,
                    themes.len()
                ))
                .title_bottom(Line::from(" ↑↓ navigate │ ↵ apply │ Esc cancel ").centered()),
        );

    let mut list_state = ListState::default();
    list_state.select(Some(state.theme_picker_index));
    frame.render_stateful_widget(theme_list, popup_area, &mut list_state);
}

fn render_form_popup(
    frame: &mut Frame,
    state: &AppState,
    form: &impl FormState,
    title: &str,
    submit_hint: &'static str,
) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(60, 70, frame.area());

    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let width = popup_area.width.saturating_sub(2) as usize;
    let mut content = vec![Line::from("")];
    content.extend(form_lines(form, &colors, width));

    let (key, label) = submit_hint.split_once(' ').unwrap_or((submit_hint, ""));
    content.push(Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(key, colors.key_hint()),
        Span::styled(format!(" {label}  "), colors.text_dim()),
        Span::styled("Tab", colors.key_hint()),
        Span::styled(" next field  ", colors.text_dim()),
        Span::styled("Esc", colors.key_hint()),
        Span::styled(" cancel", colors.text_dim()),
    ]));

    let popup = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.border_style(true))
                .style(Style::default().bg(colors.bg))
                .title(title.to_string())
                .title_style(colors.heading()),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(popup, popup_area);
}

fn render_goto_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, popup_area);

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                if state.goto_input.is_empty() {
                    "@username or #tag".to_string()
                } else {
                    format!("{}▏", state.goto_input)
                },
                if state.goto_input.is_empty() {
                    colors.text_muted()
                } else {
                    colors.text()
                },
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled("Enter", colors.key_hint()),
            Span::styled(" go  ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" cancel", colors.text_muted()),
        ]),
    ];

    let goto = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.border_style(true))
            .style(Style::default().bg(colors.bg))
            .title(" 🔍 Go to ")
            .title_style(colors.heading()),
    );

    frame.render_widget(goto, popup_area);
}

fn render_confirm_dialog(frame: &mut Frame, state: &AppState, prompt: &str) {
    let colors = state.theme.colors();
    let popup_area = centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, popup_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(prompt.to_string(), colors.text())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [y] ", colors.tone(colors.error).add_modifier(Modifier::BOLD)),
            Span::raw("Yes    "),
            Span::styled(" [n] ", colors.text_muted()),
            Span::raw("No"),
        ]),
    ];

    let dialog = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.tone(colors.warning))
            .style(Style::default().bg(colors.bg))
            .title(" ⚠ Confirm ")
            .title_style(colors.tone(colors.warning)),
    );
    frame.render_widget(dialog, popup_area);
}

/// Helper function to create a centered rect
const fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = r.width * percent_x / 100;
    let popup_height = r.height * percent_y / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(popup_width)) / 2,
        y: r.y + (r.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::SessionStore;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_pad_uses_display_width() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(UnicodeWidthStr::width(pad("日本", 6).as_str()), 6);
        assert_eq!(pad("toolong", 3), "toolong");
    }

    #[test]
    fn test_centered_rect() {
        let r = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }

    #[test]
    fn test_renders_register_screen() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.enc"));
        let state = AppState::new(Config::default(), store).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| render(frame, &state)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Sign Up"));
        assert!(text.contains("Email"));
    }
}

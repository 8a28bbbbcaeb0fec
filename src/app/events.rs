//! Event handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::async_ops::AsyncCommand;
use super::state::{AppState, FocusedPanel, FollowPanel, Mode, PostSource, Screen};
use crate::forms::{FormState, ImageTarget};
use crate::theme::Theme;

/// Handle key events, returning the commands to send to the worker
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return Vec::new();
    }

    // Handle mode-specific input first
    match state.mode {
        Mode::ThemePicker => {
            handle_theme_picker_key(state, key);
            return Vec::new();
        }
        Mode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                state.mode = Mode::Normal;
            }
            return Vec::new();
        }
        Mode::ComposePost => return handle_compose_key(state, key),
        Mode::Comment => return handle_comment_key(state, key),
        Mode::EditProfile => return handle_profile_edit_key(state, key),
        Mode::UploadImage => return handle_image_key(state, key),
        Mode::Goto => return handle_goto_key(state, key),
        Mode::Confirm(_) => return handle_confirm_key(state, key),
        Mode::Normal => {}
    }

    // Guest screens are all text input
    match state.screen {
        Screen::Register => return handle_register_key(state, key),
        Screen::Login => return handle_login_key(state, key),
        _ => {}
    }

    // Global shortcuts (work in normal mode)
    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            return Vec::new();
        }
        (_, KeyCode::Char('?') | KeyCode::F(1)) => {
            state.mode = Mode::Help;
            return Vec::new();
        }
        // Number keys for quick navigation
        (_, KeyCode::Char('1')) => return state.navigate(Screen::Home),
        (_, KeyCode::Char('2')) => return state.navigate(Screen::feed()),
        (_, KeyCode::Char('3')) => return state.navigate(Screen::Profile),
        (_, KeyCode::Char('4')) => {
            return state.navigate(Screen::posts(PostSource::Bookmarks));
        }
        (_, KeyCode::Char('/')) => {
            state.goto_input.clear();
            state.mode = Mode::Goto;
            return Vec::new();
        }
        (_, KeyCode::Char('r')) => return state.reload(),
        // Theme picker
        (_, KeyCode::Char('t')) => {
            state.theme_picker_index = Theme::all()
                .iter()
                .position(|t| *t == state.theme.inner())
                .unwrap_or(0);
            state.mode = Mode::ThemePicker;
            return Vec::new();
        }
        (KeyModifiers::SHIFT, KeyCode::Char('Q')) => {
            state.request_logout();
            return Vec::new();
        }
        _ => {}
    }

    // Screen-specific handling
    let in_comments = state.focused_panel == FocusedPanel::Comments;
    match state.screen {
        Screen::Posts { .. } if in_comments => handle_comments_key(state, key),
        Screen::Posts { .. } => handle_posts_key(state, key),
        Screen::Profile => handle_profile_key(state, key),
        Screen::UserProfile(_) => handle_user_profile_key(state, key),
        Screen::Home => handle_home_key(state, key),
        Screen::Register | Screen::Login => Vec::new(),
    }
}

/// Shared list movement (arrows always, j/k/g/G in vim mode)
fn handle_list_motion(state: &mut AppState, key: KeyEvent) -> bool {
    let vim = state.config.vim_mode;
    match key.code {
        KeyCode::Down => state.select_next(),
        KeyCode::Up => state.select_prev(),
        KeyCode::Home => state.select_first(),
        KeyCode::End => state.select_last(),
        KeyCode::Char('j') if vim => state.select_next(),
        KeyCode::Char('k') if vim => state.select_prev(),
        KeyCode::Char('g') if vim => state.select_first(),
        KeyCode::Char('G') if vim => state.select_last(),
        _ => return false,
    }
    true
}

fn handle_home_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    match key.code {
        KeyCode::Enter | KeyCode::Char('f') => state.navigate(Screen::feed()),
        KeyCode::Char('p') => state.navigate(Screen::Profile),
        KeyCode::Esc => {
            state.clear_status();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_posts_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    if handle_list_motion(state, key) {
        return Vec::new();
    }

    match (key.modifiers, key.code) {
        (_, KeyCode::Char('n') | KeyCode::Right) => state.next_page(),
        (_, KeyCode::Char('p') | KeyCode::Left) => state.prev_page(),
        (_, KeyCode::Enter | KeyCode::Tab) => state.open_comments(),
        (_, KeyCode::Char('c')) => {
            state.open_compose();
            Vec::new()
        }
        (_, KeyCode::Char('e')) => {
            state.open_edit_post();
            Vec::new()
        }
        (_, KeyCode::Char('d')) => {
            state.request_delete_post();
            Vec::new()
        }
        (_, KeyCode::Char('x')) => {
            state.request_remove_image();
            Vec::new()
        }
        (_, KeyCode::Char('L')) => state.like_selected_post(),
        (_, KeyCode::Char('b')) => state.bookmark_selected_post(),
        (_, KeyCode::Char('u')) => state.open_selected_author(),
        (_, KeyCode::Char('o')) => {
            // Open first image in browser
            let url = state
                .selected_post()
                .and_then(|p| p.images.first())
                .map(|i| i.url.clone());
            match url {
                Some(url) => match open::that(&url) {
                    Ok(()) => state.set_status("✓ Opened image in browser"),
                    Err(e) => state.set_status(format!("❌ Could not open {url}: {e}")),
                },
                None => state.set_status("This post has no images"),
            }
            Vec::new()
        }
        (_, KeyCode::Esc) => state.back(),
        _ => Vec::new(),
    }
}

fn handle_comments_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    if handle_list_motion(state, key) {
        return Vec::new();
    }

    match key.code {
        KeyCode::Esc | KeyCode::Tab | KeyCode::Char('h') => {
            state.close_comments();
            Vec::new()
        }
        KeyCode::Char('a' | 'c') => {
            state.open_comment();
            Vec::new()
        }
        KeyCode::Char('e') => {
            state.open_edit_comment();
            Vec::new()
        }
        KeyCode::Char('d') => {
            state.request_delete_comment();
            Vec::new()
        }
        KeyCode::Char('L') => state.like_selected_comment(),
        _ => Vec::new(),
    }
}

fn handle_profile_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    match key.code {
        KeyCode::Char('e') => {
            state.open_profile_edit();
            Vec::new()
        }
        KeyCode::Char('a') => {
            state.open_image_upload(ImageTarget::Avatar);
            Vec::new()
        }
        KeyCode::Char('c') => {
            state.open_image_upload(ImageTarget::CoverImage);
            Vec::new()
        }
        KeyCode::Char('p') => state.navigate(Screen::posts(PostSource::Mine)),
        KeyCode::Char('o') => {
            let url = state
                .current_user()
                .and_then(|u| u.avatar_url())
                .map(str::to_string);
            if let Some(url) = url
                && open::that(&url).is_ok()
            {
                state.set_status("✓ Opened avatar in browser");
            }
            Vec::new()
        }
        KeyCode::Esc => state.back(),
        _ => Vec::new(),
    }
}

fn handle_user_profile_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    if state.follow_panel.is_some() && handle_list_motion(state, key) {
        return Vec::new();
    }

    let username = match &state.screen {
        Screen::UserProfile(username) => username.clone(),
        _ => return Vec::new(),
    };

    match key.code {
        KeyCode::Char('f') => state.toggle_follow_viewed(),
        KeyCode::Char('F') => state.toggle_follow_selected(),
        KeyCode::Char('[') => state.show_follow_panel(FollowPanel::Followers),
        KeyCode::Char(']') => state.show_follow_panel(FollowPanel::Following),
        KeyCode::Char('p') => state.navigate(Screen::posts(PostSource::User(username))),
        KeyCode::Enter => state.open_selected_follow(),
        KeyCode::Esc => state.back(),
        _ => Vec::new(),
    }
}

/// Keys shared by every form: Tab/arrows move focus, Esc cancels
fn handle_form_key(form: &mut impl FormState, key: KeyEvent) -> bool {
    match (key.modifiers, key.code) {
        (_, KeyCode::Tab | KeyCode::Down) => form.focus_next(),
        (KeyModifiers::SHIFT, KeyCode::BackTab) | (_, KeyCode::Up) => form.focus_prev(),
        (_, KeyCode::Backspace) => form.backspace(),
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => form.push_char(c),
        _ => return false,
    }
    true
}

fn handle_register_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => state.submit_register(),
        (_, KeyCode::F(2)) | (KeyModifiers::CONTROL, KeyCode::Char('p')) => {
            state.register_form.password.toggle();
            Vec::new()
        }
        (KeyModifiers::CONTROL, KeyCode::Char('l')) | (_, KeyCode::F(3)) => {
            state.navigate(Screen::Login)
        }
        (_, KeyCode::Esc) => {
            state.should_quit = true;
            Vec::new()
        }
        _ => {
            handle_form_key(&mut state.register_form, key);
            Vec::new()
        }
    }
}

fn handle_login_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => state.submit_login(),
        (_, KeyCode::F(2)) | (KeyModifiers::CONTROL, KeyCode::Char('p')) => {
            state.login_form.password.toggle();
            Vec::new()
        }
        (KeyModifiers::CONTROL, KeyCode::Char('r')) | (_, KeyCode::F(3)) => {
            state.navigate(Screen::Register)
        }
        (_, KeyCode::Esc) => {
            state.should_quit = true;
            Vec::new()
        }
        _ => {
            handle_form_key(&mut state.login_form, key);
            Vec::new()
        }
    }
}

fn handle_compose_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            state.mode = Mode::Normal;
            Vec::new()
        }
        (KeyModifiers::CONTROL, KeyCode::Enter | KeyCode::Char('s')) => state.submit_post(),
        (_, KeyCode::Enter) => {
            if !state.post_form.push_newline() {
                state.post_form.focus_next();
            }
            Vec::new()
        }
        _ => {
            handle_form_key(&mut state.post_form, key);
            Vec::new()
        }
    }
}

fn handle_comment_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            Vec::new()
        }
        KeyCode::Enter => state.submit_comment(),
        _ => {
            handle_form_key(&mut state.comment_form, key);
            Vec::new()
        }
    }
}

fn handle_profile_edit_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            state.mode = Mode::Normal;
            Vec::new()
        }
        (KeyModifiers::CONTROL, KeyCode::Char('s')) | (_, KeyCode::Enter) => {
            state.submit_profile()
        }
        _ => {
            handle_form_key(&mut state.profile_form, key);
            Vec::new()
        }
    }
}

fn handle_image_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            Vec::new()
        }
        KeyCode::Enter => state.submit_image(),
        _ => {
            handle_form_key(&mut state.image_form, key);
            Vec::new()
        }
    }
}

fn handle_goto_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            state.goto_input.clear();
            Vec::new()
        }
        KeyCode::Enter => state.submit_goto(),
        KeyCode::Char(c) => {
            state.goto_input.push(c);
            Vec::new()
        }
        KeyCode::Backspace => {
            state.goto_input.pop();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_confirm_key(state: &mut AppState, key: KeyEvent) -> Vec<AsyncCommand> {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => state.confirm(),
        KeyCode::Char('n' | 'N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_theme_picker_key(state: &mut AppState, key: KeyEvent) {
    let themes = Theme::all();
    let len = themes.len();

    match key.code {
        KeyCode::Esc => {
            // Cancel - restore saved theme
            state.theme = state.config.theme;
            state.mode = Mode::Normal;
        }
        KeyCode::Enter => {
            let selected_theme = Theme::from(themes[state.theme_picker_index]);
            state.theme = selected_theme;
            state.config.theme = selected_theme;
            state.mode = Mode::Normal;
            state.set_status(format!("✓ Theme set to {}", selected_theme.name()));
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.theme_picker_index = (state.theme_picker_index + 1) % len;
            // Preview theme
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.theme_picker_index = state.theme_picker_index.checked_sub(1).unwrap_or(len - 1);
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        KeyCode::Home | KeyCode::Char('g') => {
            state.theme_picker_index = 0;
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        KeyCode::End | KeyCode::Char('G') => {
            state.theme_picker_index = len - 1;
            state.theme = Theme::from(themes[state.theme_picker_index]);
        }
        KeyCode::Char('n') => state.next_theme(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::SessionStore;

    fn press(state: &mut AppState, code: KeyCode) -> Vec<AsyncCommand> {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn guest_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.enc"));
        (AppState::new(Config::default(), store).unwrap(), dir)
    }

    #[test]
    fn test_typing_fills_register_form() {
        let (mut state, _dir) = guest_state();
        for c in "q@b.co".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Tab);
        for c in "pw".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        assert_eq!(state.register_form.email, "q@b.co");
        assert_eq!(state.register_form.password.value, "pw");
        // 'q' is text on guest screens
        assert!(!state.should_quit);
    }

    #[test]
    fn test_f3_switches_to_login() {
        let (mut state, _dir) = guest_state();
        press(&mut state, KeyCode::F(3));
        assert_eq!(state.screen, Screen::Login);
    }

    #[test]
    fn test_login_submit_sends_mutation() {
        let (mut state, _dir) = guest_state();
        press(&mut state, KeyCode::F(3));
        for c in "doejohn".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Tab);
        for c in "secret".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        let cmds = press(&mut state, KeyCode::Enter);
        assert_eq!(cmds.len(), 1);
        assert_eq!(state.status, "Logging in...");

        // Enter again while pending does nothing
        assert!(press(&mut state, KeyCode::Enter).is_empty());
    }

    #[test]
    fn test_theme_picker_escape_restores() {
        let (mut state, _dir) = guest_state();
        let original = state.theme;
        state.theme_picker_index = Theme::all()
            .iter()
            .position(|t| *t == original.inner())
            .unwrap();
        state.mode = Mode::ThemePicker;
        press(&mut state, KeyCode::Down);
        assert_ne!(state.theme, original);
        press(&mut state, KeyCode::Esc);
        assert_eq!(state.theme, original);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let (mut state, _dir) = guest_state();
        handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(state.should_quit);
    }
}

//! Application state

use std::collections::HashMap;

use anyhow::Result;

use crate::config::Config;
use crate::forms::{
    CommentForm, FormState, ImageForm, ImageTarget, LoginForm, PostForm, ProfileForm,
    RegisterForm,
};
use crate::models::{Comment, FollowEntry, Page, Post, Profile, User};
use crate::mutation::{MutationKey, MutationTracker};
use crate::query::{QueryCache, QueryKey};
use crate::session::{Session, SessionStore};
use crate::theme::Theme;

use super::async_ops::{AsyncCommand, Failure, Mutation, MutationOutcome, QueryData};

const HISTORY_LIMIT: usize = 32;

/// Where a post list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostSource {
    /// Everyone's posts
    Feed,
    /// Own posts
    Mine,
    /// Posts by a username
    User(String),
    /// Posts with a tag
    Tag(String),
    /// Own bookmarks
    Bookmarks,
}

impl PostSource {
    /// Query for page `page` of this list
    pub fn key(&self, page: u32) -> QueryKey {
        match self {
            Self::Feed => QueryKey::Feed { page },
            Self::Mine => QueryKey::MyPosts { page },
            Self::User(username) => QueryKey::UserPosts {
                username: username.clone(),
                page,
            },
            Self::Tag(tag) => QueryKey::TagPosts {
                tag: tag.clone(),
                page,
            },
            Self::Bookmarks => QueryKey::Bookmarks { page },
        }
    }

    /// Panel title
    pub fn title(&self) -> String {
        match self {
            Self::Feed => "Feed".to_string(),
            Self::Mine => "My posts".to_string(),
            Self::User(username) => format!("@{username}"),
            Self::Tag(tag) => format!("#{tag}"),
            Self::Bookmarks => "Bookmarks".to_string(),
        }
    }
}

/// Routed screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Sign up (start screen)
    Register,
    /// Log in
    Login,
    /// Welcome screen
    Home,
    /// A paginated list of posts
    Posts {
        /// Which list
        source: PostSource,
        /// 1-based page
        page: u32,
    },
    /// Own profile
    Profile,
    /// Another user's profile
    UserProfile(String),
}

impl Screen {
    /// First page of the feed
    pub const fn feed() -> Self {
        Self::Posts {
            source: PostSource::Feed,
            page: 1,
        }
    }

    /// First page of `source`
    pub const fn posts(source: PostSource) -> Self {
        Self::Posts { source, page: 1 }
    }

    /// Screens only reachable without a session
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Register | Self::Login)
    }

    /// Screens only reachable with a session
    pub const fn is_protected(&self) -> bool {
        !self.is_guest()
    }

    /// Header title
    pub fn title(&self) -> String {
        match self {
            Self::Register => "Sign up".to_string(),
            Self::Login => "Log in".to_string(),
            Self::Home => "Home".to_string(),
            Self::Posts { source, .. } => source.title(),
            Self::Profile => "Profile".to_string(),
            Self::UserProfile(username) => format!("@{username}"),
        }
    }
}

/// Which panel is currently focused on a post list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPanel {
    #[default]
    Posts,
    Comments,
}

/// List shown below another user's profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowPanel {
    Followers,
    Following,
}

/// Action waiting for a y/n answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm {
    DeletePost(String),
    DeleteComment(String),
    RemoveImage { post_id: String, image_id: String },
    Logout,
}

impl Confirm {
    /// Question shown in the dialog
    pub const fn prompt(&self) -> &'static str {
        match self {
            Self::DeletePost(_) => "Delete this post?",
            Self::DeleteComment(_) => "Delete this comment?",
            Self::RemoveImage { .. } => "Remove the last image of this post?",
            Self::Logout => "Log out?",
        }
    }
}

/// Overlay or input mode on top of the current screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Help,
    ThemePicker,
    ComposePost,
    Comment,
    EditProfile,
    UploadImage,
    Goto,
    Confirm(Confirm),
}

/// Application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    store: SessionStore,
    /// Logged-in session, if any
    pub session: Option<Session>,
    /// Whether to quit
    pub should_quit: bool,
    /// Current theme
    pub theme: Theme,
    /// Current screen
    pub screen: Screen,
    history: Vec<Screen>,
    /// Current overlay
    pub mode: Mode,
    /// Focused panel on post lists
    pub focused_panel: FocusedPanel,
    /// Cached reads
    pub cache: QueryCache<QueryData>,
    /// Pending writes
    pub mutations: MutationTracker,
    // Like/bookmark/follow state before an optimistic toggle, restored on failure
    rollback: HashMap<MutationKey, bool>,

    /// Selected post index
    pub selected_post: usize,
    /// Selected comment index
    pub selected_comment: usize,
    /// Selected follower/following index
    pub selected_follow: usize,
    /// Followers/following panel on a user profile
    pub follow_panel: Option<FollowPanel>,

    /// Login form
    pub login_form: LoginForm,
    /// Sign-up form
    pub register_form: RegisterForm,
    /// Compose/edit post form
    pub post_form: PostForm,
    /// Add/edit comment form
    pub comment_form: CommentForm,
    /// Profile edit form
    pub profile_form: ProfileForm,
    /// Avatar/cover upload form
    pub image_form: ImageForm,
    /// `@user` / `#tag` jump input
    pub goto_input: String,

    /// Theme picker selection
    pub theme_picker_index: usize,
    /// Status message (bottom bar)
    pub status: String,

    /// Tick counter for animations
    tick: u64,
}

impl AppState {
    /// Create a new app state, restoring a saved session
    pub fn new(config: Config, store: SessionStore) -> Result<Self> {
        let session = store.load()?;
        let cache = QueryCache::new(config.stale_after());
        let mut state = Self {
            theme: config.theme,
            config,
            store,
            session,
            should_quit: false,
            screen: Screen::Register,
            history: Vec::new(),
            mode: Mode::Normal,
            focused_panel: FocusedPanel::Posts,
            cache,
            mutations: MutationTracker::new(),
            rollback: HashMap::new(),
            selected_post: 0,
            selected_comment: 0,
            selected_follow: 0,
            follow_panel: None,
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
            post_form: PostForm::default(),
            comment_form: CommentForm::default(),
            profile_form: ProfileForm::default(),
            image_form: ImageForm::default(),
            goto_input: String::new(),
            theme_picker_index: 0,
            status: String::new(),
            tick: 0,
        };
        state.screen = state.guard(Screen::Register);
        Ok(state)
    }

    /// Tick for animations
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Get current tick
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status.clear();
    }

    /// Cycle through themes
    pub fn next_theme(&mut self) {
        self.theme = self.theme.next();
        self.config.theme = self.theme;
    }

    // ==================== Session ====================

    /// Whether a session is held
    pub const fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Logged-in user
    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    fn user_id(&self) -> Option<&str> {
        self.current_user().map(|u| u.id.as_str())
    }

    /// Whether the logged-in user wrote `post`
    pub fn owns_post(&self, post: &Post) -> bool {
        self.user_id().is_some_and(|id| post.is_authored_by(id))
    }

    /// Whether the logged-in user wrote `comment`
    pub fn owns_comment(&self, comment: &Comment) -> bool {
        self.user_id().is_some_and(|id| comment.is_authored_by(id))
    }

    /// Bearer token to hand the worker at startup
    pub fn token(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.access_token.clone())
    }

    fn end_session(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear session: {e:#}");
        }
        self.session = None;
        self.cache.clear();
        self.mutations.clear();
        self.rollback.clear();
        self.history.clear();
        self.post_form.reset();
        self.comment_form.reset();
        self.profile_form.reset();
    }

    /// Drop a rejected session and send the user to Login
    fn expire_session(&mut self) -> Vec<AsyncCommand> {
        self.end_session();
        let mut cmds = vec![AsyncCommand::SetToken(None)];
        cmds.extend(self.navigate(Screen::Login));
        self.set_status("Session expired, please log in again");
        cmds
    }

    // ==================== Routing ====================

    /// Apply route guards to a navigation target
    pub fn guard(&self, screen: Screen) -> Screen {
        if screen.is_protected() && !self.is_logged_in() {
            Screen::Register
        } else if screen.is_guest() && self.is_logged_in() {
            Screen::Home
        } else {
            screen
        }
    }

    /// Go to `screen` (after guards) and fetch what it shows
    pub fn navigate(&mut self, screen: Screen) -> Vec<AsyncCommand> {
        let screen = self.guard(screen);
        if screen != self.screen {
            let previous = std::mem::replace(&mut self.screen, screen);
            self.history.push(previous);
            if self.history.len() > HISTORY_LIMIT {
                self.history.remove(0);
            }
        }
        self.reset_selection();
        self.mode = Mode::Normal;
        self.refresh_visible()
    }

    /// Return to the previous screen
    pub fn back(&mut self) -> Vec<AsyncCommand> {
        while let Some(previous) = self.history.pop() {
            let allowed = self.guard(previous.clone());
            if allowed == previous && previous != self.screen {
                self.screen = previous;
                self.reset_selection();
                return self.refresh_visible();
            }
        }
        Vec::new()
    }

    fn reset_selection(&mut self) {
        self.selected_post = 0;
        self.selected_comment = 0;
        self.selected_follow = 0;
        self.focused_panel = FocusedPanel::Posts;
        self.follow_panel = None;
    }

    /// Reads the current screen displays
    pub fn visible_keys(&self) -> Vec<QueryKey> {
        let mut keys = Vec::new();
        match &self.screen {
            Screen::Register | Screen::Login => {}
            Screen::Home => keys.push(QueryKey::CurrentUser),
            Screen::Posts { source, page } => {
                keys.push(source.key(*page));
                if let Some(key) = self.comments_key() {
                    keys.push(key);
                    // Counters of the opened post, kept current while reading its comments
                    if let Some(post) = self.selected_post() {
                        keys.push(QueryKey::Post(post.id.clone()));
                    }
                }
            }
            Screen::Profile => {
                keys.push(QueryKey::Profile);
                keys.push(QueryKey::CurrentUser);
            }
            Screen::UserProfile(username) => {
                keys.push(QueryKey::User(username.clone()));
                if let Some(key) = self.follow_key() {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Fetch every visible read that is missing or stale
    pub fn refresh_visible(&mut self) -> Vec<AsyncCommand> {
        self.visible_keys()
            .into_iter()
            .filter(|key| self.cache.begin_fetch(key))
            .map(AsyncCommand::Fetch)
            .collect()
    }

    /// Force a refetch of everything on screen
    pub fn reload(&mut self) -> Vec<AsyncCommand> {
        for key in self.visible_keys() {
            self.cache.invalidate(&key);
        }
        self.set_status("Refreshing...");
        self.refresh_visible()
    }

    /// Whether any read on screen is in flight
    pub fn is_loading(&self) -> bool {
        self.visible_keys().iter().any(|k| self.cache.is_fetching(k))
    }

    // ==================== Post lists ====================

    /// Query of the post list on screen
    pub fn posts_key(&self) -> Option<QueryKey> {
        match &self.screen {
            Screen::Posts { source, page } => Some(source.key(*page)),
            _ => None,
        }
    }

    /// Page metadata of the post list on screen
    pub fn posts_page(&self) -> Option<&Page<Post>> {
        match self.cache.get(&self.posts_key()?) {
            Some(QueryData::Posts(page)) => Some(page),
            _ => None,
        }
    }

    /// Posts on screen
    pub fn posts(&self) -> &[Post] {
        self.posts_page().map_or(&[], |p| p.items.as_slice())
    }

    /// Get the currently selected post
    pub fn selected_post(&self) -> Option<&Post> {
        self.posts().get(self.selected_post)
    }

    /// Go to the next page, if there is one
    pub fn next_page(&mut self) -> Vec<AsyncCommand> {
        let has_next = self.posts_page().is_some_and(|p| p.has_next_page);
        self.change_page(has_next, 1)
    }

    /// Go to the previous page, if there is one
    pub fn prev_page(&mut self) -> Vec<AsyncCommand> {
        let has_prev = matches!(&self.screen, Screen::Posts { page, .. } if *page > 1);
        self.change_page(has_prev, -1)
    }

    fn change_page(&mut self, allowed: bool, delta: i64) -> Vec<AsyncCommand> {
        if !allowed {
            self.set_status(if delta > 0 { "Last page" } else { "First page" });
            return Vec::new();
        }
        if let Screen::Posts { page, .. } = &mut self.screen {
            *page = u32::try_from(i64::from(*page) + delta).unwrap_or(1).max(1);
        }
        self.reset_selection();
        self.refresh_visible()
    }

    fn comments_key(&self) -> Option<QueryKey> {
        if self.focused_panel != FocusedPanel::Comments {
            return None;
        }
        self.selected_post()
            .map(|post| QueryKey::Comments(post.id.clone()))
    }

    /// Comments of the selected post, once the panel is open
    pub fn comments(&self) -> &[Comment] {
        match self.comments_key().and_then(|k| self.cache.get(&k)) {
            Some(QueryData::Comments(page)) => &page.items,
            _ => &[],
        }
    }

    /// Get the currently selected comment
    pub fn selected_comment(&self) -> Option<&Comment> {
        self.comments().get(self.selected_comment)
    }

    /// Open the comments panel of the selected post
    pub fn open_comments(&mut self) -> Vec<AsyncCommand> {
        if self.selected_post().is_none() {
            return Vec::new();
        }
        self.focused_panel = FocusedPanel::Comments;
        self.selected_comment = 0;
        self.refresh_visible()
    }

    /// Close the comments panel
    pub fn close_comments(&mut self) {
        self.focused_panel = FocusedPanel::Posts;
    }

    // ==================== Profiles ====================

    /// Profile on screen (own or another user's)
    pub fn viewed_profile(&self) -> Option<&Profile> {
        let key = match &self.screen {
            Screen::Profile => QueryKey::Profile,
            Screen::UserProfile(username) => QueryKey::User(username.clone()),
            _ => return None,
        };
        match self.cache.get(&key) {
            Some(QueryData::Profile(profile)) => Some(profile),
            _ => None,
        }
    }

    fn follow_key(&self) -> Option<QueryKey> {
        let Screen::UserProfile(username) = &self.screen else {
            return None;
        };
        match self.follow_panel? {
            FollowPanel::Followers => Some(QueryKey::Followers(username.clone())),
            FollowPanel::Following => Some(QueryKey::Following(username.clone())),
        }
    }

    /// Entries of the open followers/following panel
    pub fn follow_entries(&self) -> &[FollowEntry] {
        match self.follow_key().and_then(|k| self.cache.get(&k)) {
            Some(QueryData::Follows(page)) => &page.items,
            _ => &[],
        }
    }

    /// Open (or switch) the followers/following panel
    pub fn show_follow_panel(&mut self, panel: FollowPanel) -> Vec<AsyncCommand> {
        self.follow_panel = if self.follow_panel == Some(panel) {
            None
        } else {
            Some(panel)
        };
        self.selected_follow = 0;
        self.refresh_visible()
    }

    // ==================== Selection ====================

    fn list_len(&self) -> usize {
        match &self.screen {
            Screen::Posts { .. } if self.focused_panel == FocusedPanel::Comments => {
                self.comments().len()
            }
            Screen::Posts { .. } => self.posts().len(),
            Screen::UserProfile(_) => self.follow_entries().len(),
            _ => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match &self.screen {
            Screen::Posts { .. } if self.focused_panel == FocusedPanel::Comments => {
                Some(&mut self.selected_comment)
            }
            Screen::Posts { .. } => Some(&mut self.selected_post),
            Screen::UserProfile(_) => Some(&mut self.selected_follow),
            _ => None,
        }
    }

    /// Move selection down in the focused list
    pub fn select_next(&mut self) {
        let len = self.list_len();
        if let Some(selected) = self.selection_mut()
            && len > 0
        {
            *selected = (*selected + 1).min(len - 1);
        }
    }

    /// Move selection up in the focused list
    pub fn select_prev(&mut self) {
        if let Some(selected) = self.selection_mut() {
            *selected = selected.saturating_sub(1);
        }
    }

    /// Jump to the top of the focused list
    pub fn select_first(&mut self) {
        if let Some(selected) = self.selection_mut() {
            *selected = 0;
        }
    }

    /// Jump to the bottom of the focused list
    pub fn select_last(&mut self) {
        let len = self.list_len();
        if let Some(selected) = self.selection_mut() {
            *selected = len.saturating_sub(1);
        }
    }

    fn clamp_selection(&mut self) {
        let posts = self.posts().len();
        self.selected_post = self.selected_post.min(posts.saturating_sub(1));
        let comments = self.comments().len();
        self.selected_comment = self.selected_comment.min(comments.saturating_sub(1));
        let follows = self.follow_entries().len();
        self.selected_follow = self.selected_follow.min(follows.saturating_sub(1));
    }

    // ==================== Writes ====================

    /// Start a write unless the same one is still pending
    pub fn submit(&mut self, mutation: Mutation) -> Vec<AsyncCommand> {
        let key = mutation.key();
        if !self.mutations.begin(key.clone()) {
            self.set_status(key.pending_label());
            return Vec::new();
        }
        self.set_status(key.pending_label());
        vec![AsyncCommand::Mutate(mutation)]
    }

    fn validated<F: FormState>(&mut self, form: &F) -> bool {
        match form.validate() {
            Ok(()) => true,
            Err(e) => {
                self.set_status(format!("⚠ {e}"));
                false
            }
        }
    }

    /// Submit the login form
    pub fn submit_login(&mut self) -> Vec<AsyncCommand> {
        let form = self.login_form.clone();
        if !self.validated(&form) {
            return Vec::new();
        }
        self.submit(Mutation::Login {
            username: form.username.trim().to_string(),
            password: form.password.value,
        })
    }

    /// Submit the sign-up form
    pub fn submit_register(&mut self) -> Vec<AsyncCommand> {
        let form = self.register_form.clone();
        if !self.validated(&form) {
            return Vec::new();
        }
        self.submit(Mutation::Register(form.to_registration()))
    }

    /// Open an empty compose form
    pub fn open_compose(&mut self) {
        self.post_form.reset();
        self.mode = Mode::ComposePost;
    }

    /// Open the compose form prefilled with the selected own post
    pub fn open_edit_post(&mut self) {
        let Some(post) = self.selected_post() else {
            return;
        };
        if !self.owns_post(post) {
            self.set_status("⚠ You can only edit your own posts");
            return;
        }
        self.post_form = PostForm::edit(post);
        self.mode = Mode::ComposePost;
    }

    /// Submit the compose/edit form
    pub fn submit_post(&mut self) -> Vec<AsyncCommand> {
        let form = self.post_form.clone();
        if !self.validated(&form) {
            return Vec::new();
        }
        let post = form.to_new_post();
        match form.editing {
            Some(post_id) => self.submit(Mutation::UpdatePost { post_id, post }),
            None => self.submit(Mutation::CreatePost(post)),
        }
    }

    /// Ask before deleting the selected own post
    pub fn request_delete_post(&mut self) {
        let Some(post) = self.selected_post() else {
            return;
        };
        if !self.owns_post(post) {
            self.set_status("⚠ You can only delete your own posts");
            return;
        }
        self.mode = Mode::Confirm(Confirm::DeletePost(post.id.clone()));
    }

    /// Ask before removing the last image of the selected own post
    pub fn request_remove_image(&mut self) {
        let Some(post) = self.selected_post() else {
            return;
        };
        if !self.owns_post(post) {
            self.set_status("⚠ You can only edit your own posts");
            return;
        }
        let Some(image) = post.images.last() else {
            self.set_status("This post has no images");
            return;
        };
        self.mode = Mode::Confirm(Confirm::RemoveImage {
            post_id: post.id.clone(),
            image_id: image.id.clone(),
        });
    }

    /// Open the comment form for the selected post
    pub fn open_comment(&mut self) {
        if let Some(post) = self.selected_post() {
            self.comment_form = CommentForm::new(&post.id);
            self.mode = Mode::Comment;
        }
    }

    /// Open the comment form prefilled with the selected own comment
    pub fn open_edit_comment(&mut self) {
        let Some(comment) = self.selected_comment() else {
            return;
        };
        if !self.owns_comment(comment) {
            self.set_status("⚠ You can only edit your own comments");
            return;
        }
        self.comment_form = CommentForm::edit(comment);
        self.mode = Mode::Comment;
    }

    /// Submit the comment form
    pub fn submit_comment(&mut self) -> Vec<AsyncCommand> {
        let form = self.comment_form.clone();
        if !self.validated(&form) {
            return Vec::new();
        }
        let content = form.content.trim().to_string();
        match form.editing {
            Some(comment_id) => self.submit(Mutation::UpdateComment {
                comment_id,
                content,
            }),
            None => self.submit(Mutation::AddComment {
                post_id: form.post_id,
                content,
            }),
        }
    }

    /// Ask before deleting the selected own comment
    pub fn request_delete_comment(&mut self) {
        let Some(comment) = self.selected_comment() else {
            return;
        };
        if !self.owns_comment(comment) {
            self.set_status("⚠ You can only delete your own comments");
            return;
        }
        self.mode = Mode::Confirm(Confirm::DeleteComment(comment.id.clone()));
    }

    /// Open the profile editor prefilled from the cached profile
    pub fn open_profile_edit(&mut self) {
        let Some(profile) = self.viewed_profile() else {
            self.set_status("Profile is still loading");
            return;
        };
        self.profile_form = ProfileForm::from_profile(profile);
        self.mode = Mode::EditProfile;
    }

    /// Submit the profile editor
    pub fn submit_profile(&mut self) -> Vec<AsyncCommand> {
        let form = self.profile_form.clone();
        if !self.validated(&form) {
            return Vec::new();
        }
        let update = form.to_update();
        if update.is_empty() {
            self.set_status("Nothing to update");
            return Vec::new();
        }
        self.submit(Mutation::UpdateProfile(update))
    }

    /// Open the image upload prompt
    pub fn open_image_upload(&mut self, target: ImageTarget) {
        self.image_form = ImageForm::new(target);
        self.mode = Mode::UploadImage;
    }

    /// Submit the image upload prompt
    pub fn submit_image(&mut self) -> Vec<AsyncCommand> {
        let form = self.image_form.clone();
        if !self.validated(&form) {
            return Vec::new();
        }
        match form.target {
            ImageTarget::Avatar => self.submit(Mutation::UpdateAvatar(form.path_buf())),
            ImageTarget::CoverImage => self.submit(Mutation::UpdateCoverImage(form.path_buf())),
        }
    }

    /// Ask before logging out
    pub fn request_logout(&mut self) {
        self.mode = Mode::Confirm(Confirm::Logout);
    }

    /// Run the confirmed action
    pub fn confirm(&mut self) -> Vec<AsyncCommand> {
        let Mode::Confirm(action) = std::mem::take(&mut self.mode) else {
            return Vec::new();
        };
        match action {
            Confirm::DeletePost(id) => self.submit(Mutation::DeletePost(id)),
            Confirm::DeleteComment(id) => self.submit(Mutation::DeleteComment(id)),
            Confirm::RemoveImage { post_id, image_id } => {
                self.submit(Mutation::RemovePostImage { post_id, image_id })
            }
            Confirm::Logout => self.submit(Mutation::Logout),
        }
    }

    /// Jump to `@user` or `#tag` from the goto prompt
    pub fn submit_goto(&mut self) -> Vec<AsyncCommand> {
        let input = std::mem::take(&mut self.goto_input);
        let input = input.trim();
        self.mode = Mode::Normal;
        if let Some(tag) = input.strip_prefix('#') {
            let tag = tag.trim();
            if tag.is_empty() {
                return Vec::new();
            }
            return self.navigate(Screen::posts(PostSource::Tag(tag.to_string())));
        }
        let username = input.trim_start_matches('@').trim().to_lowercase();
        if username.is_empty() {
            return Vec::new();
        }
        self.navigate(Screen::UserProfile(username))
    }

    /// Open the profile of the selected post's author
    pub fn open_selected_author(&mut self) -> Vec<AsyncCommand> {
        let Some(username) = self
            .selected_post()
            .map(|p| p.author.username().to_string())
        else {
            return Vec::new();
        };
        self.open_user(username)
    }

    /// Open the profile of the selected follower/following entry
    pub fn open_selected_follow(&mut self) -> Vec<AsyncCommand> {
        let Some(username) = self
            .follow_entries()
            .get(self.selected_follow)
            .map(|e| e.username.clone())
        else {
            return Vec::new();
        };
        self.open_user(username)
    }

    fn open_user(&mut self, username: String) -> Vec<AsyncCommand> {
        let own = self.current_user().is_some_and(|u| u.username == username);
        if own {
            self.navigate(Screen::Profile)
        } else {
            self.navigate(Screen::UserProfile(username))
        }
    }

    // ==================== Optimistic toggles ====================

    fn update_posts(&mut self, post_id: &str, f: impl Fn(&mut Post)) {
        for data in self.cache.values_mut() {
            match data {
                QueryData::Posts(page) => page
                    .items
                    .iter_mut()
                    .filter(|p| p.id == post_id)
                    .for_each(&f),
                QueryData::Post(post) if post.id == post_id => f(post),
                _ => {}
            }
        }
    }

    fn update_comments(&mut self, comment_id: &str, f: impl Fn(&mut Comment)) {
        for data in self.cache.values_mut() {
            if let QueryData::Comments(page) = data {
                page.items
                    .iter_mut()
                    .filter(|c| c.id == comment_id)
                    .for_each(&f);
            }
        }
    }

    fn update_follow_target(&mut self, user_id: &str, f: impl Fn(&mut Profile)) {
        for data in self.cache.values_mut() {
            if let QueryData::Profile(profile) = data
                && profile.account.id == user_id
            {
                f(profile);
            }
        }
    }

    fn set_follow_entries(&mut self, user_id: &str, following: Option<bool>) {
        for data in self.cache.values_mut() {
            if let QueryData::Follows(page) = data {
                for entry in page.items.iter_mut().filter(|e| e.id == user_id) {
                    entry.is_following = following.unwrap_or(!entry.is_following);
                }
            }
        }
    }

    /// Like/unlike the selected post, updating the UI before the server answers
    pub fn like_selected_post(&mut self) -> Vec<AsyncCommand> {
        let Some((id, was_liked)) = self
            .selected_post()
            .map(|p| (p.id.clone(), p.is_liked))
        else {
            return Vec::new();
        };
        let cmds = self.submit(Mutation::LikePost(id.clone()));
        if !cmds.is_empty() {
            self.rollback.insert(MutationKey::LikePost(id.clone()), was_liked);
            self.update_posts(&id, Post::toggle_like);
        }
        cmds
    }

    /// Bookmark/un-bookmark the selected post
    pub fn bookmark_selected_post(&mut self) -> Vec<AsyncCommand> {
        let Some((id, was_saved)) = self
            .selected_post()
            .map(|p| (p.id.clone(), p.is_bookmarked))
        else {
            return Vec::new();
        };
        let cmds = self.submit(Mutation::BookmarkPost(id.clone()));
        if !cmds.is_empty() {
            self.rollback.insert(MutationKey::BookmarkPost(id.clone()), was_saved);
            self.update_posts(&id, Post::toggle_bookmark);
        }
        cmds
    }

    /// Like/unlike the selected comment
    pub fn like_selected_comment(&mut self) -> Vec<AsyncCommand> {
        let Some((id, was_liked)) = self
            .selected_comment()
            .map(|c| (c.id.clone(), c.is_liked))
        else {
            return Vec::new();
        };
        let cmds = self.submit(Mutation::LikeComment(id.clone()));
        if !cmds.is_empty() {
            self.rollback.insert(MutationKey::LikeComment(id.clone()), was_liked);
            self.update_comments(&id, Comment::toggle_like);
        }
        cmds
    }

    /// Follow/unfollow the profile on screen
    pub fn toggle_follow_viewed(&mut self) -> Vec<AsyncCommand> {
        let Some((user_id, was_following)) = self
            .viewed_profile()
            .map(|p| (p.account.id.clone(), p.is_following))
        else {
            return Vec::new();
        };
        self.toggle_follow(user_id, was_following)
    }

    /// Follow/unfollow the selected follower/following entry
    pub fn toggle_follow_selected(&mut self) -> Vec<AsyncCommand> {
        let Some((user_id, was_following)) = self
            .follow_entries()
            .get(self.selected_follow)
            .map(|e| (e.id.clone(), e.is_following))
        else {
            return Vec::new();
        };
        self.toggle_follow(user_id, was_following)
    }

    fn toggle_follow(&mut self, user_id: String, was_following: bool) -> Vec<AsyncCommand> {
        if self.user_id() == Some(user_id.as_str()) {
            self.set_status("⚠ You cannot follow yourself");
            return Vec::new();
        }
        let cmds = self.submit(Mutation::Follow(user_id.clone()));
        if !cmds.is_empty() {
            self.rollback.insert(MutationKey::Follow(user_id.clone()), was_following);
            self.update_follow_target(&user_id, Profile::toggle_follow);
            self.set_follow_entries(&user_id, None);
        }
        cmds
    }

    // ==================== Worker results ====================

    /// Store a fetched read. A read that a write overtook is fetched again.
    pub fn on_fetched(&mut self, key: QueryKey, data: QueryData) -> Vec<AsyncCommand> {
        match &data {
            QueryData::User(user) => {
                if let Some(session) = &mut self.session {
                    session.user.clone_from(user);
                    if let Err(e) = self.store.update_user(user) {
                        tracing::warn!("Failed to save session: {e:#}");
                    }
                }
            }
            QueryData::Post(post) => {
                let fresh = post.clone();
                self.update_posts(&post.id, |p| p.clone_from(&fresh));
            }
            _ => {}
        }

        let outdated = self.cache.insert(key.clone(), data);
        self.clamp_selection();
        if outdated && self.visible_keys().contains(&key) && self.cache.begin_fetch(&key) {
            tracing::debug!("Refetching {key:?}, a write landed while it was loading");
            vec![AsyncCommand::Fetch(key)]
        } else {
            Vec::new()
        }
    }

    /// Handle a failed read
    pub fn on_fetch_failed(&mut self, key: &QueryKey, error: &Failure) -> Vec<AsyncCommand> {
        self.cache.fail_fetch(key);
        if error.unauthorized && self.is_logged_in() {
            return self.expire_session();
        }
        self.set_status(format!("❌ {}", error.message));
        Vec::new()
    }

    /// Apply a successful write
    pub fn on_mutated(&mut self, key: MutationKey, outcome: MutationOutcome) -> Vec<AsyncCommand> {
        self.mutations.finish(&key);
        self.rollback.remove(&key);
        for scope in key.invalidates() {
            self.cache.invalidate_scope(*scope);
        }

        let mut cmds = Vec::new();
        match (key, outcome) {
            (_, MutationOutcome::Registered(user)) => {
                self.register_form.reset();
                self.login_form.username.clone_from(&user.username);
                cmds.extend(self.navigate(Screen::Login));
                self.set_status(format!("✓ Registered @{}, log in to continue", user.username));
            }
            (_, MutationOutcome::LoggedIn(data)) => {
                let session = Session::from(data);
                if let Err(e) = self.store.save(&session) {
                    tracing::warn!("Failed to save session: {e:#}");
                }
                cmds.push(AsyncCommand::SetToken(Some(session.access_token.clone())));
                let username = session.user.username.clone();
                self.session = Some(session);
                self.login_form.reset();
                cmds.extend(self.navigate(Screen::Home));
                self.set_status(format!("✓ Logged in as @{username}"));
            }
            (_, MutationOutcome::LoggedOut) => {
                self.end_session();
                cmds.push(AsyncCommand::SetToken(None));
                cmds.extend(self.navigate(Screen::Login));
                self.set_status("✓ Logged out");
            }
            (key, MutationOutcome::PostSaved(post)) => {
                let created = key == MutationKey::CreatePost;
                if !created {
                    let saved = post.clone();
                    self.update_posts(&post.id, |p| p.clone_from(&saved));
                }
                if self.mode == Mode::ComposePost {
                    self.mode = Mode::Normal;
                }
                self.post_form.reset();
                self.set_status(match key {
                    MutationKey::CreatePost => "✓ Post created",
                    MutationKey::RemovePostImage(_) => "✓ Image removed",
                    _ => "✓ Post updated",
                });
            }
            (MutationKey::DeletePost(id), MutationOutcome::Deleted) => {
                for data in self.cache.values_mut() {
                    if let QueryData::Posts(page) = data {
                        page.items.retain(|p| p.id != id);
                    }
                }
                self.cache.remove(&QueryKey::Post(id.clone()));
                self.cache.remove(&QueryKey::Comments(id));
                self.close_comments();
                self.set_status("✓ Post deleted");
            }
            (MutationKey::DeleteComment(id), MutationOutcome::Deleted) => {
                for data in self.cache.values_mut() {
                    if let QueryData::Comments(page) = data {
                        page.items.retain(|c| c.id != id);
                    }
                }
                self.set_status("✓ Comment deleted");
            }
            (MutationKey::LikePost(id), MutationOutcome::Liked(liked)) => {
                self.update_posts(&id, |p| p.reconcile_like(liked));
                self.set_status(if liked { "❤️ Liked" } else { "💔 Unliked" });
            }
            (MutationKey::LikeComment(id), MutationOutcome::Liked(liked)) => {
                self.update_comments(&id, |c| c.reconcile_like(liked));
                self.set_status(if liked { "❤️ Liked" } else { "💔 Unliked" });
            }
            (MutationKey::BookmarkPost(id), MutationOutcome::Bookmarked(saved)) => {
                self.update_posts(&id, |p| p.reconcile_bookmark(saved));
                self.set_status(if saved { "🔖 Bookmarked" } else { "Bookmark removed" });
            }
            (key, MutationOutcome::CommentSaved(comment)) => {
                if matches!(key, MutationKey::UpdateComment(_)) {
                    let saved = comment.clone();
                    self.update_comments(&comment.id, |c| c.clone_from(&saved));
                    self.set_status("✓ Comment updated");
                } else {
                    self.set_status("✓ Comment added");
                }
                if self.mode == Mode::Comment {
                    self.mode = Mode::Normal;
                }
                self.comment_form.reset();
            }
            (MutationKey::Follow(user_id), MutationOutcome::Following(following)) => {
                self.update_follow_target(&user_id, |p| p.reconcile_follow(following));
                self.set_follow_entries(&user_id, Some(following));
                self.set_status(if following { "✓ Following" } else { "✓ Unfollowed" });
            }
            (key, MutationOutcome::ProfileSaved(profile)) => {
                self.cache.set(QueryKey::Profile, QueryData::Profile(profile));
                if matches!(self.mode, Mode::EditProfile | Mode::UploadImage) {
                    self.mode = Mode::Normal;
                }
                self.image_form.reset();
                self.set_status(if key == MutationKey::UpdateCoverImage {
                    "✓ Cover image updated"
                } else {
                    "✓ Profile updated"
                });
            }
            (_, MutationOutcome::AvatarSaved(user)) => {
                if let Err(e) = self.store.update_user(&user) {
                    tracing::warn!("Failed to save session: {e:#}");
                }
                if let Some(session) = &mut self.session {
                    session.user = user;
                }
                if self.mode == Mode::UploadImage {
                    self.mode = Mode::Normal;
                }
                self.image_form.reset();
                self.set_status("✓ Avatar updated");
            }
            (key, outcome) => {
                tracing::warn!("Unexpected outcome {outcome:?} for {key:?}");
            }
        }

        cmds.extend(self.refresh_visible());
        cmds
    }

    /// Undo optimistic changes and report a failed write
    pub fn on_mutation_failed(&mut self, key: &MutationKey, error: &Failure) -> Vec<AsyncCommand> {
        self.mutations.finish(key);
        let previous = self.rollback.remove(key);
        match (key, previous) {
            (MutationKey::LikePost(id), Some(liked)) => {
                self.update_posts(id, |p| p.reconcile_like(liked));
            }
            (MutationKey::BookmarkPost(id), Some(saved)) => {
                self.update_posts(id, |p| p.reconcile_bookmark(saved));
            }
            (MutationKey::LikeComment(id), Some(liked)) => {
                self.update_comments(id, |c| c.reconcile_like(liked));
            }
            (MutationKey::Follow(user_id), Some(following)) => {
                self.update_follow_target(user_id, |p| p.reconcile_follow(following));
                self.set_follow_entries(user_id, Some(following));
            }
            (MutationKey::Logout, _) => {
                // The local session goes even if the server call failed
                self.end_session();
                let mut cmds = vec![AsyncCommand::SetToken(None)];
                cmds.extend(self.navigate(Screen::Login));
                self.set_status(format!("Logged out locally ({})", error.message));
                return cmds;
            }
            _ => {}
        }

        let guest = matches!(key, MutationKey::Login | MutationKey::Register);
        if error.unauthorized && !guest && self.is_logged_in() {
            return self.expire_session();
        }
        self.set_status(format!("❌ {}", error.message));
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountSummary, LoginData};
    use tempfile::TempDir;

    fn state() -> (AppState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.enc"));
        (AppState::new(Config::default(), store).unwrap(), dir)
    }

    fn user() -> User {
        User {
            id: "u1".to_string(),
            username: "doejohn".to_string(),
            ..User::default()
        }
    }

    fn logged_in() -> (AppState, TempDir) {
        let (mut s, dir) = state();
        let data = LoginData {
            access_token: "tok".to_string(),
            refresh_token: None,
            user: user(),
        };
        s.on_mutated(MutationKey::Login, MutationOutcome::LoggedIn(data));
        (s, dir)
    }

    fn post(id: &str, likes: u32) -> Post {
        Post {
            id: id.to_string(),
            content: format!("post {id}"),
            likes,
            ..Post::default()
        }
    }

    fn show_feed(s: &mut AppState, posts: Vec<Post>) {
        s.navigate(Screen::feed());
        let page = Page {
            items: posts,
            ..Page::default()
        };
        s.on_fetched(QueryKey::Feed { page: 1 }, QueryData::Posts(page));
    }

    #[test]
    fn test_starts_on_register_without_session() {
        let (s, _dir) = state();
        assert_eq!(s.screen, Screen::Register);
    }

    #[test]
    fn test_protected_screens_redirect_to_register() {
        let (mut s, _dir) = state();
        let cmds = s.navigate(Screen::feed());
        assert_eq!(s.screen, Screen::Register);
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_login_saves_session_and_goes_home() {
        let (s, _dir) = logged_in();
        assert_eq!(s.screen, Screen::Home);
        assert_eq!(s.token().as_deref(), Some("tok"));
        assert!(s.store.load().unwrap().is_some());
    }

    #[test]
    fn test_guest_screens_redirect_home_when_logged_in() {
        let (mut s, _dir) = logged_in();
        s.navigate(Screen::Login);
        assert_eq!(s.screen, Screen::Home);
    }

    #[test]
    fn test_navigation_fetches_once() {
        let (mut s, _dir) = logged_in();
        let cmds = s.navigate(Screen::feed());
        assert_eq!(cmds.len(), 1);
        assert!(matches!(&cmds[0], AsyncCommand::Fetch(QueryKey::Feed { page: 1 })));
        // Already in flight
        assert!(s.refresh_visible().is_empty());
    }

    #[test]
    fn test_optimistic_like_and_reconcile() {
        let (mut s, _dir) = logged_in();
        show_feed(&mut s, vec![post("p1", 2)]);

        let cmds = s.like_selected_post();
        assert_eq!(cmds.len(), 1);
        assert!(s.posts()[0].is_liked);
        assert_eq!(s.posts()[0].likes, 3);

        // Second press while pending is ignored
        assert!(s.like_selected_post().is_empty());
        assert_eq!(s.posts()[0].likes, 3);

        s.on_mutated(
            MutationKey::LikePost("p1".into()),
            MutationOutcome::Liked(true),
        );
        assert!(s.posts()[0].is_liked);
        assert_eq!(s.posts()[0].likes, 3);
    }

    #[test]
    fn test_failed_like_rolls_back() {
        let (mut s, _dir) = logged_in();
        show_feed(&mut s, vec![post("p1", 2)]);

        s.like_selected_post();
        let failure = Failure {
            message: "Post does not exist".to_string(),
            unauthorized: false,
        };
        s.on_mutation_failed(&MutationKey::LikePost("p1".into()), &failure);

        assert!(!s.posts()[0].is_liked);
        assert_eq!(s.posts()[0].likes, 2);
        assert!(s.status.contains("Post does not exist"));
    }

    #[test]
    fn test_failed_like_restores_state_a_refetch_brought() {
        let (mut s, _dir) = logged_in();
        show_feed(&mut s, vec![post("p1", 2)]);

        s.like_selected_post();
        assert_eq!(s.posts()[0].likes, 3);

        // The server's copy lands while the like is still pending
        s.on_fetched(
            QueryKey::Feed { page: 1 },
            QueryData::Posts(Page {
                items: vec![post("p1", 2)],
                ..Page::default()
            }),
        );
        let failure = Failure {
            message: "Something went wrong".to_string(),
            unauthorized: false,
        };
        s.on_mutation_failed(&MutationKey::LikePost("p1".into()), &failure);

        assert!(!s.posts()[0].is_liked);
        assert_eq!(s.posts()[0].likes, 2);
    }

    #[test]
    fn test_failed_bookmark_restores_previous_state() {
        let (mut s, _dir) = logged_in();
        let mut saved = post("p1", 0);
        saved.is_bookmarked = true;
        show_feed(&mut s, vec![saved.clone()]);

        s.bookmark_selected_post();
        assert!(!s.posts()[0].is_bookmarked);
        s.on_fetched(
            QueryKey::Feed { page: 1 },
            QueryData::Posts(Page {
                items: vec![saved],
                ..Page::default()
            }),
        );
        let failure = Failure {
            message: "Something went wrong".to_string(),
            unauthorized: false,
        };
        s.on_mutation_failed(&MutationKey::BookmarkPost("p1".into()), &failure);
        assert!(s.posts()[0].is_bookmarked);
    }

    #[test]
    fn test_post_created_during_reload_is_not_lost() {
        let (mut s, _dir) = logged_in();
        show_feed(&mut s, vec![post("old", 0)]);

        let cmds = s.reload();
        assert_eq!(cmds.len(), 1);
        let before_write = Page {
            items: vec![post("old", 0)],
            ..Page::default()
        };

        // The write lands first; the feed request is already running
        let cmds = s.on_mutated(
            MutationKey::CreatePost,
            MutationOutcome::PostSaved(post("new", 0)),
        );
        assert!(cmds.is_empty());

        // The older answer is shown but fetched again
        let cmds = s.on_fetched(QueryKey::Feed { page: 1 }, QueryData::Posts(before_write));
        assert!(matches!(&cmds[..], [AsyncCommand::Fetch(QueryKey::Feed { page: 1 })]));
        assert!(s.cache.is_stale(&QueryKey::Feed { page: 1 }));

        let after_write = Page {
            items: vec![post("new", 0), post("old", 0)],
            ..Page::default()
        };
        let cmds = s.on_fetched(QueryKey::Feed { page: 1 }, QueryData::Posts(after_write));
        assert!(cmds.is_empty());
        assert_eq!(s.posts()[0].id, "new");
        assert!(!s.cache.is_stale(&QueryKey::Feed { page: 1 }));
    }

    #[test]
    fn test_home_refreshes_account() {
        let (mut s, _dir) = logged_in();
        assert!(s.visible_keys().contains(&QueryKey::CurrentUser));

        let refreshed = User {
            email: "new@example.com".to_string(),
            ..user()
        };
        s.on_fetched(QueryKey::CurrentUser, QueryData::User(refreshed));

        assert_eq!(s.current_user().unwrap().email, "new@example.com");
        let stored = s.store.load().unwrap().unwrap();
        assert_eq!(stored.user.email, "new@example.com");
    }

    #[test]
    fn test_open_post_counters_follow_server() {
        let (mut s, _dir) = logged_in();
        show_feed(&mut s, vec![post("p1", 1)]);

        let cmds = s.open_comments();
        assert!(
            cmds.iter()
                .any(|c| matches!(c, AsyncCommand::Fetch(QueryKey::Post(id)) if id == "p1"))
        );

        s.on_fetched(QueryKey::Post("p1".into()), QueryData::Post(post("p1", 9)));
        assert_eq!(s.posts()[0].likes, 9);
    }

    #[test]
    fn test_unauthorized_drops_session() {
        let (mut s, _dir) = logged_in();
        show_feed(&mut s, vec![post("p1", 0)]);
        let failure = Failure {
            message: "jwt expired".to_string(),
            unauthorized: true,
        };
        let cmds = s.on_fetch_failed(&QueryKey::Feed { page: 1 }, &failure);

        assert!(!s.is_logged_in());
        assert_eq!(s.screen, Screen::Login);
        assert!(s.cache.is_empty());
        assert!(matches!(cmds[0], AsyncCommand::SetToken(None)));
        assert!(s.store.load().unwrap().is_none());
    }

    #[test]
    fn test_bad_password_keeps_login_screen() {
        let (mut s, _dir) = state();
        s.navigate(Screen::Login);
        let failure = Failure {
            message: "Invalid user credentials".to_string(),
            unauthorized: true,
        };
        s.on_mutation_failed(&MutationKey::Login, &failure);
        assert_eq!(s.screen, Screen::Login);
        assert!(s.status.contains("Invalid user credentials"));
    }

    #[test]
    fn test_pagination_respects_page_meta() {
        let (mut s, _dir) = logged_in();
        show_feed(&mut s, vec![post("p1", 0)]);
        assert!(s.next_page().is_empty());
        assert_eq!(s.status, "Last page");

        let page = Page {
            items: vec![post("p1", 0)],
            has_next_page: true,
            ..Page::default()
        };
        s.on_fetched(QueryKey::Feed { page: 1 }, QueryData::Posts(page));
        let cmds = s.next_page();
        assert!(matches!(&cmds[0], AsyncCommand::Fetch(QueryKey::Feed { page: 2 })));
        assert!(matches!(s.screen, Screen::Posts { page: 2, .. }));
    }

    #[test]
    fn test_comments_load_only_when_opened() {
        let (mut s, _dir) = logged_in();
        show_feed(&mut s, vec![post("p1", 0)]);
        assert!(!s.visible_keys().contains(&QueryKey::Comments("p1".into())));

        let cmds = s.open_comments();
        assert!(matches!(&cmds[0], AsyncCommand::Fetch(QueryKey::Comments(id)) if id == "p1"));
    }

    #[test]
    fn test_delete_post_only_for_owner() {
        let (mut s, _dir) = logged_in();
        show_feed(&mut s, vec![post("p1", 0)]);
        s.request_delete_post();
        assert_eq!(s.mode, Mode::Normal);

        let mut own = post("p2", 0);
        own.author.owner = Some("u1".to_string());
        show_feed(&mut s, vec![own]);
        s.request_delete_post();
        assert_eq!(s.mode, Mode::Confirm(Confirm::DeletePost("p2".into())));

        let cmds = s.confirm();
        assert_eq!(cmds.len(), 1);
        s.on_mutated(MutationKey::DeletePost("p2".into()), MutationOutcome::Deleted);
        assert!(s.posts().is_empty());
    }

    #[test]
    fn test_follow_reconciles_counts() {
        let (mut s, _dir) = logged_in();
        s.navigate(Screen::UserProfile("ann".into()));
        let profile = Profile {
            account: AccountSummary {
                id: "u2".to_string(),
                username: "ann".to_string(),
                ..AccountSummary::default()
            },
            followers_count: 4,
            ..Profile::default()
        };
        s.on_fetched(QueryKey::User("ann".into()), QueryData::Profile(profile));

        assert_eq!(s.toggle_follow_viewed().len(), 1);
        assert_eq!(s.viewed_profile().unwrap().followers_count, 5);

        s.on_mutated(
            MutationKey::Follow("u2".into()),
            MutationOutcome::Following(true),
        );
        let profile = s.viewed_profile().unwrap();
        assert!(profile.is_following);
        assert_eq!(profile.followers_count, 5);
    }

    #[test]
    fn test_failed_follow_restores_previous_state() {
        let (mut s, _dir) = logged_in();
        s.navigate(Screen::UserProfile("ann".into()));
        let profile = Profile {
            account: AccountSummary {
                id: "u2".to_string(),
                username: "ann".to_string(),
                ..AccountSummary::default()
            },
            followers_count: 4,
            ..Profile::default()
        };
        s.on_fetched(QueryKey::User("ann".into()), QueryData::Profile(profile.clone()));
        s.toggle_follow_viewed();
        s.on_fetched(QueryKey::User("ann".into()), QueryData::Profile(profile));

        let failure = Failure {
            message: "Something went wrong".to_string(),
            unauthorized: false,
        };
        s.on_mutation_failed(&MutationKey::Follow("u2".into()), &failure);

        let profile = s.viewed_profile().unwrap();
        assert!(!profile.is_following);
        assert_eq!(profile.followers_count, 4);
    }

    #[test]
    fn test_goto_parses_tag_and_user() {
        let (mut s, _dir) = logged_in();
        s.goto_input = "#Rust".to_string();
        s.submit_goto();
        assert_eq!(s.screen, Screen::posts(PostSource::Tag("Rust".into())));

        s.goto_input = "@Ann".to_string();
        s.submit_goto();
        assert_eq!(s.screen, Screen::UserProfile("ann".into()));

        s.back();
        assert_eq!(s.screen, Screen::posts(PostSource::Tag("Rust".into())));
    }

    #[test]
    fn test_register_requires_valid_form() {
        let (mut s, _dir) = state();
        s.register_form.email = "not-an-email".to_string();
        assert!(s.submit_register().is_empty());
        assert!(s.status.contains("valid email"));
    }
}

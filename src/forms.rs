//! Local form state for every input screen
//!
//! Forms hold plain strings and a focus index. Key handling is shared
//! through [`FormState`]; each form validates itself before its mutation
//! is sent and resets after the server accepts it.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex_lite::Regex;
use thiserror::Error;

use crate::api::{NewPost, Registration};
use crate::models::{Profile, ProfileUpdate};

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

static DATE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok());

/// Why a form cannot be submitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// A required field is empty
    #[error("{0} is required")]
    Required(&'static str),
    /// Email address is malformed
    #[error("Enter a valid email address")]
    InvalidEmail,
    /// Field shorter than allowed
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Field label
        field: &'static str,
        /// Minimum length
        min: usize,
    },
    /// Date not in `YYYY-MM-DD` form
    #[error("Date must look like YYYY-MM-DD")]
    InvalidDate,
    /// Image path does not exist
    #[error("File not found: {0}")]
    MissingFile(String),
}

/// Password input with a visibility toggle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordField {
    /// Raw value
    pub value: String,
    shown: bool,
}

impl PasswordField {
    /// Flip between masked and clear text
    pub fn toggle(&mut self) {
        self.shown = !self.shown;
    }

    /// Whether the password is shown in clear text
    pub const fn is_shown(&self) -> bool {
        self.shown
    }

    /// What the input box displays
    pub fn display(&self) -> String {
        if self.shown {
            self.value.clone()
        } else {
            "•".repeat(self.value.chars().count())
        }
    }

    /// Label for the toggle button
    pub const fn toggle_label(&self) -> &'static str {
        if self.shown { "Hide" } else { "Show" }
    }

    fn clear(&mut self) {
        self.value.clear();
        self.shown = false;
    }
}

/// Shared editing behaviour of all forms
pub trait FormState {
    /// Field labels, in focus order
    fn labels(&self) -> &'static [&'static str];

    /// Index of the focused field
    fn focused(&self) -> usize;

    /// Move focus to `index`
    fn set_focus(&mut self, index: usize);

    /// Mutable value of field `index`
    fn field_mut(&mut self, index: usize) -> Option<&mut String>;

    /// Displayed value of field `index` (masked for passwords)
    fn display(&self, index: usize) -> String;

    /// Check the form before submitting
    fn validate(&self) -> Result<(), FormError>;

    /// Clear every field after a successful submit
    fn reset(&mut self);

    /// Whether field `index` accepts newlines
    fn is_multiline(&self, _index: usize) -> bool {
        false
    }

    /// Focus the next field (wraps)
    fn focus_next(&mut self) {
        let len = self.labels().len();
        self.set_focus((self.focused() + 1) % len);
    }

    /// Focus the previous field (wraps)
    fn focus_prev(&mut self) {
        let len = self.labels().len();
        self.set_focus(self.focused().checked_sub(1).unwrap_or(len - 1));
    }

    /// Type a character into the focused field
    fn push_char(&mut self, c: char) {
        let index = self.focused();
        if let Some(field) = self.field_mut(index) {
            field.push(c);
        }
    }

    /// Newline in the focused field, if it is multi-line
    fn push_newline(&mut self) -> bool {
        let index = self.focused();
        if self.is_multiline(index)
            && let Some(field) = self.field_mut(index)
        {
            field.push('\n');
            return true;
        }
        false
    }

    /// Delete the last character of the focused field
    fn backspace(&mut self) {
        let index = self.focused();
        if let Some(field) = self.field_mut(index) {
            field.pop();
        }
    }
}

fn required(value: &str, label: &'static str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        Err(FormError::Required(label))
    } else {
        Ok(())
    }
}

fn is_email(value: &str) -> bool {
    EMAIL_RE
        .as_ref()
        .is_some_and(|re| re.is_match(value.trim()))
}

fn split_paths(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn check_files(paths: &[PathBuf]) -> Result<(), FormError> {
    match paths.iter().find(|p| !p.is_file()) {
        Some(missing) => Err(FormError::MissingFile(missing.display().to_string())),
        None => Ok(()),
    }
}

// ==================== Login ====================

/// Username + password
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Username
    pub username: String,
    /// Password
    pub password: PasswordField,
    focus: usize,
}

impl FormState for LoginForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Username", "Password"]
    }

    fn focused(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, index: usize) {
        self.focus = index.min(1);
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.username),
            1 => Some(&mut self.password.value),
            _ => None,
        }
    }

    fn display(&self, index: usize) -> String {
        match index {
            0 => self.username.clone(),
            1 => self.password.display(),
            _ => String::new(),
        }
    }

    fn validate(&self) -> Result<(), FormError> {
        required(&self.username, "Username")?;
        required(&self.password.value, "Password")
    }

    fn reset(&mut self) {
        self.username.clear();
        self.password.clear();
        self.focus = 0;
    }
}

// ==================== Register ====================

/// Email + password + username
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    /// Email address
    pub email: String,
    /// Password
    pub password: PasswordField,
    /// Username
    pub username: String,
    focus: usize,
}

impl RegisterForm {
    /// Registration payload
    pub fn to_registration(&self) -> Registration {
        Registration::user(&self.email, &self.username, &self.password.value)
    }
}

impl FormState for RegisterForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Email", "Password", "Username"]
    }

    fn focused(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, index: usize) {
        self.focus = index.min(2);
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.email),
            1 => Some(&mut self.password.value),
            2 => Some(&mut self.username),
            _ => None,
        }
    }

    fn display(&self, index: usize) -> String {
        match index {
            0 => self.email.clone(),
            1 => self.password.display(),
            2 => self.username.clone(),
            _ => String::new(),
        }
    }

    fn validate(&self) -> Result<(), FormError> {
        required(&self.email, "Email")?;
        if !is_email(&self.email) {
            return Err(FormError::InvalidEmail);
        }
        required(&self.password.value, "Password")?;
        required(&self.username, "Username")?;
        if self.username.trim().chars().count() < 3 {
            return Err(FormError::TooShort {
                field: "Username",
                min: 3,
            });
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.email.clear();
        self.password.clear();
        self.username.clear();
        self.focus = 0;
    }
}

// ==================== Post ====================

/// Compose or edit a post: content, three tags, image paths
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    /// Text content
    pub content: String,
    /// Up to three tags
    pub tags: [String; 3],
    /// Comma-separated local image paths
    pub images: String,
    /// Post being edited, `None` when composing
    pub editing: Option<String>,
    focus: usize,
}

impl PostForm {
    /// Prefill from an existing post for edit-in-place
    pub fn edit(post: &crate::models::Post) -> Self {
        let mut tags: [String; 3] = Default::default();
        for (slot, tag) in tags.iter_mut().zip(&post.tags) {
            slot.clone_from(tag);
        }
        Self {
            content: post.content.clone(),
            tags,
            images: String::new(),
            editing: Some(post.id.clone()),
            focus: 0,
        }
    }

    /// Request payload
    pub fn to_new_post(&self) -> NewPost {
        NewPost {
            content: self.content.trim().to_string(),
            tags: self.tags.iter().map(|t| t.trim().to_string()).collect(),
            images: split_paths(&self.images),
        }
    }
}

impl FormState for PostForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Content", "Tag 1", "Tag 2", "Tag 3", "Images"]
    }

    fn focused(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, index: usize) {
        self.focus = index.min(4);
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.content),
            1..=3 => self.tags.get_mut(index - 1),
            4 => Some(&mut self.images),
            _ => None,
        }
    }

    fn display(&self, index: usize) -> String {
        match index {
            0 => self.content.clone(),
            1..=3 => self.tags[index - 1].clone(),
            4 => self.images.clone(),
            _ => String::new(),
        }
    }

    fn is_multiline(&self, index: usize) -> bool {
        index == 0
    }

    fn validate(&self) -> Result<(), FormError> {
        required(&self.content, "Content")?;
        check_files(&split_paths(&self.images))
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

// ==================== Comment ====================

/// Add or edit a comment
#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    /// Text content
    pub content: String,
    /// Post being commented on
    pub post_id: String,
    /// Comment being edited, `None` when adding
    pub editing: Option<String>,
}

impl CommentForm {
    /// New comment on `post_id`
    pub fn new(post_id: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            ..Self::default()
        }
    }

    /// Prefill from an existing comment
    pub fn edit(comment: &crate::models::Comment) -> Self {
        Self {
            content: comment.content.clone(),
            post_id: comment.post_id.clone(),
            editing: Some(comment.id.clone()),
        }
    }
}

impl FormState for CommentForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Comment"]
    }

    fn focused(&self) -> usize {
        0
    }

    fn set_focus(&mut self, _index: usize) {}

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        (index == 0).then_some(&mut self.content)
    }

    fn display(&self, index: usize) -> String {
        if index == 0 {
            self.content.clone()
        } else {
            String::new()
        }
    }

    fn validate(&self) -> Result<(), FormError> {
        required(&self.content, "Comment")
    }

    fn reset(&mut self) {
        self.content.clear();
        self.editing = None;
    }
}

// ==================== Profile ====================

/// Edit own profile fields
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Biography
    pub bio: String,
    /// Date of birth (`YYYY-MM-DD`)
    pub dob: String,
    /// Location
    pub location: String,
    /// Country calling code
    pub country_code: String,
    /// Phone number
    pub phone_number: String,
    initial: [String; 7],
    focus: usize,
}

impl ProfileForm {
    /// Prefill from the current profile
    pub fn from_profile(profile: &Profile) -> Self {
        let mut form = Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            bio: profile.bio.clone(),
            dob: profile.dob_date().unwrap_or_default().to_string(),
            location: profile.location.clone(),
            country_code: profile.country_code.clone(),
            phone_number: profile.phone_number.clone(),
            ..Self::default()
        };
        form.initial = form.fields().map(|f| f.trim().to_string());
        form
    }

    /// Request payload holding only the fields edited since prefill.
    /// A field emptied by the user is sent as `""` so the server clears it;
    /// the date of birth cannot be cleared.
    pub fn to_update(&self) -> ProfileUpdate {
        let fields = self.fields();
        let changed = |i: usize| {
            let value = fields[i].trim();
            (value != self.initial[i]).then(|| value.to_string())
        };
        ProfileUpdate {
            first_name: changed(0),
            last_name: changed(1),
            bio: changed(2),
            dob: changed(3).filter(|d| !d.is_empty()),
            location: changed(4),
            country_code: changed(5),
            phone_number: changed(6),
        }
    }

    fn fields(&self) -> [&String; 7] {
        [
            &self.first_name,
            &self.last_name,
            &self.bio,
            &self.dob,
            &self.location,
            &self.country_code,
            &self.phone_number,
        ]
    }
}

impl FormState for ProfileForm {
    fn labels(&self) -> &'static [&'static str] {
        &[
            "First name",
            "Last name",
            "Bio",
            "Date of birth",
            "Location",
            "Country code",
            "Phone number",
        ]
    }

    fn focused(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, index: usize) {
        self.focus = index.min(6);
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.first_name),
            1 => Some(&mut self.last_name),
            2 => Some(&mut self.bio),
            3 => Some(&mut self.dob),
            4 => Some(&mut self.location),
            5 => Some(&mut self.country_code),
            6 => Some(&mut self.phone_number),
            _ => None,
        }
    }

    fn display(&self, index: usize) -> String {
        self.fields()
            .get(index)
            .map(|s| (*s).clone())
            .unwrap_or_default()
    }

    fn validate(&self) -> Result<(), FormError> {
        let dob = self.dob.trim();
        if !dob.is_empty() && !DATE_RE.as_ref().is_some_and(|re| re.is_match(dob)) {
            return Err(FormError::InvalidDate);
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

// ==================== Image upload ====================

/// Which image an [`ImageForm`] replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageTarget {
    /// Account avatar
    #[default]
    Avatar,
    /// Profile cover image
    CoverImage,
}

impl ImageTarget {
    /// Display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Avatar => "Avatar",
            Self::CoverImage => "Cover image",
        }
    }
}

/// Path of an image to upload
#[derive(Debug, Clone, Default)]
pub struct ImageForm {
    /// Local file path
    pub path: String,
    /// What the image replaces
    pub target: ImageTarget,
}

impl ImageForm {
    /// Empty form for `target`
    pub fn new(target: ImageTarget) -> Self {
        Self {
            path: String::new(),
            target,
        }
    }

    /// The chosen file
    pub fn path_buf(&self) -> PathBuf {
        PathBuf::from(self.path.trim())
    }
}

impl FormState for ImageForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Image path"]
    }

    fn focused(&self) -> usize {
        0
    }

    fn set_focus(&mut self, _index: usize) {}

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        (index == 0).then_some(&mut self.path)
    }

    fn display(&self, index: usize) -> String {
        if index == 0 {
            self.path.clone()
        } else {
            String::new()
        }
    }

    fn validate(&self) -> Result<(), FormError> {
        required(&self.path, "Image path")?;
        check_files(&[self.path_buf()])
    }

    fn reset(&mut self) {
        self.path.clear();
    }
}

//! Write lifecycle: double-submit guard and invalidation rules
//!
//! A write is started with [`MutationTracker::begin`], which refuses a key
//! that is already pending. When the server answers, the tracker is told
//! via [`MutationTracker::finish`] and, on success, every scope in
//! [`MutationKey::invalidates`] is marked stale in the query cache.

use std::collections::HashSet;

use crate::query::QueryScope;

/// Identity of one write
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MutationKey {
    /// Create an account
    Register,
    /// Log in
    Login,
    /// Log out
    Logout,
    /// Publish a post
    CreatePost,
    /// Edit a post
    UpdatePost(String),
    /// Delete a post
    DeletePost(String),
    /// Remove an image from a post
    RemovePostImage(String),
    /// Like/unlike a post
    LikePost(String),
    /// Bookmark/un-bookmark a post
    BookmarkPost(String),
    /// Comment on a post
    AddComment(String),
    /// Edit a comment
    UpdateComment(String),
    /// Delete a comment
    DeleteComment(String),
    /// Like/unlike a comment
    LikeComment(String),
    /// Follow/unfollow a user
    Follow(String),
    /// Edit own profile fields
    UpdateProfile,
    /// Replace own avatar
    UpdateAvatar,
    /// Replace own cover image
    UpdateCoverImage,
}

const EVERYTHING: &[QueryScope] = &[
    QueryScope::Feed,
    QueryScope::Post,
    QueryScope::Comments,
    QueryScope::Profile,
    QueryScope::User,
    QueryScope::PostLists,
    QueryScope::Follows,
    QueryScope::Bookmarks,
    QueryScope::CurrentUser,
];

impl MutationKey {
    /// Scopes whose cached data is outdated once this write succeeds
    pub const fn invalidates(&self) -> &'static [QueryScope] {
        match self {
            Self::Register => &[],
            Self::Login | Self::Logout => EVERYTHING,
            Self::CreatePost
            | Self::UpdatePost(_)
            | Self::DeletePost(_)
            | Self::RemovePostImage(_) => &[
                QueryScope::Feed,
                QueryScope::Post,
                QueryScope::PostLists,
                QueryScope::Bookmarks,
            ],
            // The toggled post itself is reconciled in place
            Self::LikePost(_) | Self::BookmarkPost(_) => &[QueryScope::Bookmarks],
            Self::AddComment(_) | Self::UpdateComment(_) | Self::DeleteComment(_) => &[
                QueryScope::Comments,
                QueryScope::Feed,
                QueryScope::PostLists,
            ],
            Self::LikeComment(_) => &[],
            Self::Follow(_) => &[QueryScope::User, QueryScope::Follows, QueryScope::Profile],
            Self::UpdateProfile => &[
                QueryScope::Profile,
                QueryScope::User,
                QueryScope::CurrentUser,
            ],
            Self::UpdateAvatar => &[
                QueryScope::Profile,
                QueryScope::User,
                QueryScope::CurrentUser,
                QueryScope::Feed,
            ],
            Self::UpdateCoverImage => &[QueryScope::Profile, QueryScope::User],
        }
    }

    /// Label for the status bar while the write is pending
    pub const fn pending_label(&self) -> &'static str {
        match self {
            Self::Register => "Registering...",
            Self::Login => "Logging in...",
            Self::Logout => "Logging out...",
            Self::CreatePost => "Posting...",
            Self::UpdatePost(_) => "Saving post...",
            Self::DeletePost(_) => "Deleting post...",
            Self::RemovePostImage(_) => "Removing image...",
            Self::LikePost(_) | Self::LikeComment(_) => "Updating like...",
            Self::BookmarkPost(_) => "Updating bookmark...",
            Self::AddComment(_) => "Commenting...",
            Self::UpdateComment(_) => "Saving comment...",
            Self::DeleteComment(_) => "Deleting comment...",
            Self::Follow(_) => "Updating follow...",
            Self::UpdateProfile => "Saving profile...",
            Self::UpdateAvatar => "Uploading avatar...",
            Self::UpdateCoverImage => "Uploading cover image...",
        }
    }
}

/// Set of writes currently awaiting the server
#[derive(Debug, Default)]
pub struct MutationTracker {
    pending: HashSet<MutationKey>,
}

impl MutationTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a write. Returns `false` if the same write is still pending.
    pub fn begin(&mut self, key: MutationKey) -> bool {
        self.pending.insert(key)
    }

    /// Mark a write as answered (success or failure)
    pub fn finish(&mut self, key: &MutationKey) {
        self.pending.remove(key);
    }

    /// Whether `key` is pending
    pub fn is_pending(&self, key: &MutationKey) -> bool {
        self.pending.contains(key)
    }

    /// Whether any write is pending
    pub fn any_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Forget every pending write
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_double_submit() {
        let mut tracker = MutationTracker::new();
        assert!(tracker.begin(MutationKey::CreatePost));
        assert!(!tracker.begin(MutationKey::CreatePost));
        assert!(tracker.is_pending(&MutationKey::CreatePost));

        tracker.finish(&MutationKey::CreatePost);
        assert!(tracker.begin(MutationKey::CreatePost));
    }

    #[test]
    fn test_distinct_targets_run_independently() {
        let mut tracker = MutationTracker::new();
        assert!(tracker.begin(MutationKey::LikePost("a".into())));
        assert!(tracker.begin(MutationKey::LikePost("b".into())));
        tracker.finish(&MutationKey::LikePost("a".into()));
        assert!(tracker.any_pending());
        tracker.clear();
        assert!(!tracker.any_pending());
    }

    #[test]
    fn test_invalidation_rules() {
        assert_eq!(
            MutationKey::DeleteComment("c".into()).invalidates()[0],
            QueryScope::Comments
        );
        assert!(MutationKey::Follow("u".into()).invalidates().contains(&QueryScope::User));
        assert!(MutationKey::UpdateAvatar.invalidates().contains(&QueryScope::Profile));
        assert_eq!(MutationKey::Login.invalidates().len(), 9);
        assert!(MutationKey::Register.invalidates().is_empty());
    }
}

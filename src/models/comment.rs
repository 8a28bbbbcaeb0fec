//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Author;

/// A comment on a post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Server ID
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Text content
    #[serde(default)]
    pub content: String,
    /// Post this comment belongs to
    #[serde(default)]
    pub post_id: String,
    /// Author
    #[serde(default)]
    pub author: Author,
    /// Number of likes
    #[serde(default)]
    pub likes: u32,
    /// Whether the current user has liked this comment
    #[serde(default)]
    pub is_liked: bool,
    /// When the comment was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the comment was last edited
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Get relative time string
    pub fn relative_time(&self) -> String {
        super::relative_time_at(self.created_at, Utc::now())
    }

    /// Whether the comment was edited after creation
    pub fn is_edited(&self) -> bool {
        matches!((self.created_at, self.updated_at), (Some(c), Some(u)) if u > c)
    }

    /// Whether `user_id` wrote this comment
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author.user_id() == Some(user_id)
    }

    /// Flip the like state locally before the server answers
    pub fn toggle_like(&mut self) {
        self.reconcile_like(!self.is_liked);
    }

    /// Apply the like state the server reported
    pub fn reconcile_like(&mut self, is_liked: bool) {
        if is_liked != self.is_liked {
            if is_liked {
                self.likes = self.likes.saturating_add(1);
            } else {
                self.likes = self.likes.saturating_sub(1);
            }
        }
        self.is_liked = is_liked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_like_roundtrip() {
        let mut comment: Comment = serde_json::from_str(
            r#"{"_id": "c1", "content": "nice", "postId": "p1", "likes": 1, "isLiked": true,
                "author": {"account": {"_id": "u9", "username": "bob"}}}"#,
        )
        .unwrap();
        assert_eq!(comment.author.username(), "bob");
        assert!(comment.is_authored_by("u9"));

        comment.toggle_like();
        assert!(!comment.is_liked);
        assert_eq!(comment.likes, 0);

        comment.likes = u32::MAX;
        comment.toggle_like();
        assert!(comment.is_liked);
        assert_eq!(comment.likes, u32::MAX);
    }
}

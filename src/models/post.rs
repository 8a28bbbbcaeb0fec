//! Post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AccountSummary;

/// Author block embedded in posts and comments
///
/// The server sends the author's profile with the account nested under
/// `account`; some endpoints send the account fields flat instead, so both
/// shapes are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Profile ID
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Owning user ID
    #[serde(default)]
    pub owner: Option<String>,
    /// First name
    #[serde(default)]
    pub first_name: String,
    /// Last name
    #[serde(default)]
    pub last_name: String,
    /// Nested account
    #[serde(default)]
    pub account: Option<AccountSummary>,
    /// Flat username
    #[serde(default)]
    pub username: Option<String>,
}

impl Author {
    /// Username, or "User" when the server sent none
    pub fn username(&self) -> &str {
        self.account
            .as_ref()
            .map(|a| a.username.as_str())
            .or(self.username.as_deref())
            .filter(|u| !u.is_empty())
            .unwrap_or("User")
    }

    /// Full name, falling back to the username
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username().to_string()
        } else {
            full.to_string()
        }
    }

    /// User ID of the author
    pub fn user_id(&self) -> Option<&str> {
        self.account
            .as_ref()
            .map(|a| a.id.as_str())
            .or(self.owner.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Image attached to a post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    /// Image ID (used to remove it from the post)
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Public URL
    #[serde(default)]
    pub url: String,
    /// Server-side path
    #[serde(default)]
    pub local_path: Option<String>,
}

/// A post in the feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Server ID
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Text content
    #[serde(default)]
    pub content: String,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Attached images
    #[serde(default)]
    pub images: Vec<PostImage>,
    /// Author
    #[serde(default)]
    pub author: Author,
    /// Number of likes
    #[serde(default)]
    pub likes: u32,
    /// Number of comments
    #[serde(default)]
    pub comments: u32,
    /// Whether the current user has liked this post
    #[serde(default)]
    pub is_liked: bool,
    /// Whether the current user has bookmarked this post
    #[serde(default)]
    pub is_bookmarked: bool,
    /// When the post was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the post was last edited
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Get a short preview of the content (for list display)
    pub fn preview(&self, max_len: usize) -> String {
        let content = self.content.replace('\n', " ");
        if content.chars().count() <= max_len {
            content
        } else {
            let cut: String = content.chars().take(max_len.saturating_sub(3)).collect();
            format!("{cut}...")
        }
    }

    /// Get relative time string (e.g., "5m", "2h", "3d")
    pub fn relative_time(&self) -> String {
        super::relative_time_at(self.created_at, Utc::now())
    }

    /// Whether the post was edited after creation
    pub fn is_edited(&self) -> bool {
        matches!((self.created_at, self.updated_at), (Some(c), Some(u)) if u > c)
    }

    /// Whether `user_id` wrote this post
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author.user_id() == Some(user_id)
    }

    /// Tags rendered as `#a #b`
    pub fn tags_line(&self) -> String {
        self.tags
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| format!("#{t}"))
            .collect::<Vec<_>>()
            .join(" ")
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

    /// Flip the bookmark state locally before the server answers
    pub fn toggle_bookmark(&mut self) {
        self.is_bookmarked = !self.is_bookmarked;
    }

    /// Apply the bookmark state the server reported
    pub fn reconcile_bookmark(&mut self, is_bookmarked: bool) {
        self.is_bookmarked = is_bookmarked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_post() -> Post {
        serde_json::from_str(
            r#"{
                "_id": "post1",
                "content": "Hello\nworld",
                "tags": ["rust", "", "tui"],
                "images": [{"url": "https://img/1.png", "localPath": "x", "_id": "img1"}],
                "author": {
                    "_id": "prof1",
                    "firstName": "Jane",
                    "lastName": "",
                    "owner": "user1",
                    "account": {"_id": "user1", "username": "jane", "email": "j@x.io"}
                },
                "likes": 3,
                "comments": 1,
                "isLiked": false,
                "isBookmarked": true,
                "createdAt": "2024-01-01T10:00:00.000Z",
                "updatedAt": "2024-01-01T11:00:00.000Z"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_feed_post() {
        let post = feed_post();
        assert_eq!(post.author.username(), "jane");
        assert_eq!(post.author.display_name(), "Jane");
        assert_eq!(post.images[0].id, "img1");
        assert!(post.is_edited());
        assert!(post.is_authored_by("user1"));
        assert!(!post.is_authored_by("user2"));
        assert_eq!(post.tags_line(), "#rust #tui");
    }

    #[test]
    fn test_partial_payload_defaults() {
        let post: Post = serde_json::from_str(r#"{"_id": "p"}"#).unwrap();
        assert_eq!(post.author.username(), "User");
        assert_eq!(post.likes, 0);
        assert!(post.created_at.is_none());
    }

    #[test]
    fn test_flat_author_username() {
        let author: Author = serde_json::from_str(r#"{"username": "flat"}"#).unwrap();
        assert_eq!(author.username(), "flat");
        assert_eq!(author.user_id(), None);
    }

    #[test]
    fn test_optimistic_like_then_reconcile() {
        let mut post = feed_post();
        post.toggle_like();
        assert!(post.is_liked);
        assert_eq!(post.likes, 4);

        post.reconcile_like(true);
        assert_eq!(post.likes, 4);

        post.reconcile_like(false);
        assert_eq!(post.likes, 3);
    }

    #[test]
    fn test_unlike_never_underflows() {
        let mut post = Post {
            is_liked: true,
            ..Post::default()
        };
        post.toggle_like();
        assert_eq!(post.likes, 0);
    }

    #[test]
    fn test_like_never_overflows() {
        let mut post = Post {
            likes: u32::MAX,
            ..Post::default()
        };
        post.toggle_like();
        assert!(post.is_liked);
        assert_eq!(post.likes, u32::MAX);
    }

    #[test]
    fn test_preview_is_char_safe() {
        let post = Post {
            content: "héllo wörld ✨✨✨".to_string(),
            ..Post::default()
        };
        assert_eq!(post.preview(8), "héllo...");
        assert_eq!(post.preview(100), "héllo wörld ✨✨✨");
    }
}

//! Paginated list payloads

use serde::Deserialize;

/// One page of a paginated list
///
/// The server names the item array after the resource (`posts`,
/// `comments`, `bookmarkedPosts`, `followers`, `following`) and the total
/// to match, so both are accepted under any of those names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    #[serde(
        default = "Vec::new",
        alias = "posts",
        alias = "comments",
        alias = "bookmarkedPosts",
        alias = "followers",
        alias = "following"
    )]
    pub items: Vec<T>,
    /// Total number of items across all pages
    #[serde(
        default,
        alias = "totalPosts",
        alias = "totalComments",
        alias = "totalBookmarkedPosts",
        alias = "totalFollowers",
        alias = "totalFollowing"
    )]
    pub total: u32,
    /// Current page (1-based)
    #[serde(default = "first_page")]
    pub page: u32,
    /// Page size
    #[serde(default)]
    pub limit: u32,
    /// Number of pages
    #[serde(default)]
    pub total_pages: u32,
    /// Whether a following page exists
    #[serde(default)]
    pub has_next_page: bool,
    /// Whether a preceding page exists
    #[serde(default)]
    pub has_prev_page: bool,
}

const fn first_page() -> u32 {
    1
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            limit: 0,
            total_pages: 0,
            has_next_page: false,
            has_prev_page: false,
        }
    }
}

impl<T> Page<T> {
    /// Whether the page holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Label like "page 2/7"
    pub fn label(&self) -> String {
        format!("page {}/{}", self.page, self.total_pages.max(self.page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FollowEntry, Post};

    #[test]
    fn test_posts_page() {
        let page: Page<Post> = serde_json::from_str(
            r#"{"posts": [{"_id": "a"}, {"_id": "b"}], "totalPosts": 12, "limit": 2,
                "page": 3, "totalPages": 6, "hasPrevPage": true, "hasNextPage": true,
                "serialNumberStartFrom": 5, "prevPage": 2, "nextPage": 4}"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 12);
        assert_eq!(page.label(), "page 3/6");
        assert!(page.has_next_page && page.has_prev_page);
    }

    #[test]
    fn test_followers_page_ignores_user_block() {
        let page: Page<FollowEntry> = serde_json::from_str(
            r#"{"user": {"_id": "x"}, "followers": [{"_id": "f1", "username": "ann",
                "profile": {"firstName": "Ann", "lastName": "Lee"}, "isFollowing": true}],
                "totalFollowers": 1}"#,
        )
        .unwrap();
        assert_eq!(page.items[0].full_name(), "Ann Lee");
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_bookmarks_page() {
        let page: Page<Post> =
            serde_json::from_str(r#"{"bookmarkedPosts": [{"_id": "b1"}], "totalBookmarkedPosts": 1}"#)
                .unwrap();
        assert_eq!(page.items[0].id, "b1");
        assert!(!page.is_empty());
    }
}

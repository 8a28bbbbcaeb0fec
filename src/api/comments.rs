//! `social-media/comments` and comment likes

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, Result, page_query, segment};
use crate::models::{Comment, Page};

#[derive(Serialize)]
struct CommentBody<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikeState {
    #[serde(default)]
    is_liked: bool,
}

impl ApiClient {
    /// Comments on a post
    pub async fn comments(&self, post_id: &str, page: u32, limit: u32) -> Result<Page<Comment>> {
        let endpoint = format!(
            "social-media/comments/post/{}?{}",
            segment(post_id),
            page_query(page, limit)
        );
        let request = self.authed(Method::GET, &endpoint)?;
        self.send(request).await
    }

    /// Add a comment to a post
    pub async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment> {
        let endpoint = format!("social-media/comments/post/{}", segment(post_id));
        let request = self
            .authed(Method::POST, &endpoint)?
            .json(&CommentBody { content });
        self.send(request).await
    }

    /// Edit a comment in place
    pub async fn update_comment(&self, comment_id: &str, content: &str) -> Result<Comment> {
        let endpoint = format!("social-media/comments/{}", segment(comment_id));
        let request = self
            .authed(Method::PATCH, &endpoint)?
            .json(&CommentBody { content });
        self.send(request).await
    }

    /// Delete a comment
    pub async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        let endpoint = format!("social-media/comments/{}", segment(comment_id));
        let request = self.authed(Method::DELETE, &endpoint)?;
        self.send_unit(request).await?;
        Ok(())
    }

    /// Like or unlike a comment; returns the new state
    pub async fn toggle_comment_like(&self, comment_id: &str) -> Result<bool> {
        let endpoint = format!("social-media/like/comment/{}", segment(comment_id));
        let request = self.authed(Method::POST, &endpoint)?;
        let state: LikeState = self.send(request).await?;
        Ok(state.is_liked)
    }
}

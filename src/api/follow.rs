//! `social-media/follow` endpoints

use reqwest::Method;
use serde::Deserialize;

use super::{ApiClient, Result, page_query, segment};
use crate::models::{FollowEntry, Page};

#[derive(Deserialize)]
struct FollowState {
    #[serde(default)]
    following: bool,
}

impl ApiClient {
    /// Follow or unfollow a user by ID. The server toggles and reports
    /// whether the current user now follows them.
    pub async fn toggle_follow(&self, user_id: &str) -> Result<bool> {
        let endpoint = format!("social-media/follow/{}", segment(user_id));
        let request = self.authed(Method::POST, &endpoint)?;
        let state: FollowState = self.send(request).await?;
        Ok(state.following)
    }

    /// Users following `username`
    pub async fn followers(&self, username: &str, page: u32, limit: u32) -> Result<Page<FollowEntry>> {
        let endpoint = format!(
            "social-media/follow/list/followers/{}?{}",
            segment(username),
            page_query(page, limit)
        );
        let request = self.request(Method::GET, &endpoint);
        self.send(request).await
    }

    /// Users `username` follows
    pub async fn following(&self, username: &str, page: u32, limit: u32) -> Result<Page<FollowEntry>> {
        let endpoint = format!(
            "social-media/follow/list/following/{}?{}",
            segment(username),
            page_query(page, limit)
        );
        let request = self.request(Method::GET, &endpoint);
        self.send(request).await
    }
}

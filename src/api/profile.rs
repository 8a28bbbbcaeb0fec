//! `social-media/profile` endpoints

use std::path::Path;

use reqwest::Method;
use reqwest::multipart::Form;

use super::{ApiClient, Result, posts::image_part, segment};
use crate::models::{Profile, ProfileUpdate};

impl ApiClient {
    /// The logged-in user's profile
    pub async fn my_profile(&self) -> Result<Profile> {
        let request = self.authed(Method::GET, "social-media/profile")?;
        self.send(request).await
    }

    /// Another user's profile by username
    pub async fn user_profile(&self, username: &str) -> Result<Profile> {
        let endpoint = format!("social-media/profile/u/{}", segment(username));
        let request = self.request(Method::GET, &endpoint);
        self.send(request).await
    }

    /// Edit profile fields
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
        let request = self
            .authed(Method::PATCH, "social-media/profile")?
            .json(update);
        self.send(request).await
    }

    /// Replace the cover image with a local image file
    pub async fn update_cover_image(&self, path: &Path) -> Result<Profile> {
        let form = Form::new().part("coverImage", image_part(path).await?);
        let request = self
            .authed(Method::PATCH, "social-media/profile/cover-image")?
            .multipart(form);
        self.send(request).await
    }
}

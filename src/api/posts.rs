//! `social-media/posts`, post likes and bookmarks

use std::path::{Path, PathBuf};

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::{ApiClient, ApiError, Result, page_query, segment};
use crate::models::{Page, Post};

/// Content of a post to create or update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    /// Text content
    pub content: String,
    /// Tags (empty entries are skipped)
    pub tags: Vec<String>,
    /// Local image files to upload
    pub images: Vec<PathBuf>,
}

impl NewPost {
    /// Text-only post
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Multipart body: `content`, one `images` part per file, `tags[i]`
    async fn into_form(self) -> Result<Form> {
        let mut form = Form::new().text("content", self.content);
        for path in &self.images {
            form = form.part("images", image_part(path).await?);
        }
        let tags = self
            .tags
            .into_iter()
            .map(|t| t.trim().trim_start_matches('#').to_string())
            .filter(|t| !t.is_empty());
        for (i, tag) in tags.enumerate() {
            form = form.text(format!("tags[{i}]"), tag);
        }
        Ok(form)
    }
}

/// Guess an image MIME type from the file extension
pub(crate) fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Read a local image into a multipart part
pub(crate) async fn image_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
    Ok(Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(image_mime(path))?)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikeState {
    #[serde(default)]
    is_liked: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookmarkState {
    #[serde(default)]
    is_bookmarked: bool,
}

impl ApiClient {
    /// One page of the public feed
    pub async fn feed(&self, page: u32, limit: u32) -> Result<Page<Post>> {
        let endpoint = format!("social-media/posts?{}", page_query(page, limit));
        let request = self.request(Method::GET, &endpoint);
        self.send(request).await
    }

    /// A single post
    pub async fn post(&self, post_id: &str) -> Result<Post> {
        let endpoint = format!("social-media/posts/{}", segment(post_id));
        let request = self.request(Method::GET, &endpoint);
        self.send(request).await
    }

    /// The logged-in user's posts
    pub async fn my_posts(&self, page: u32, limit: u32) -> Result<Page<Post>> {
        let endpoint = format!("social-media/posts/get/my?{}", page_query(page, limit));
        let request = self.authed(Method::GET, &endpoint)?;
        self.send(request).await
    }

    /// Posts by `username`
    pub async fn user_posts(&self, username: &str, page: u32, limit: u32) -> Result<Page<Post>> {
        let endpoint = format!(
            "social-media/posts/get/u/{}?{}",
            segment(username),
            page_query(page, limit)
        );
        let request = self.request(Method::GET, &endpoint);
        self.send(request).await
    }

    /// Posts carrying `tag`
    pub async fn tag_posts(&self, tag: &str, page: u32, limit: u32) -> Result<Page<Post>> {
        let endpoint = format!(
            "social-media/posts/get/t/{}?{}",
            segment(tag.trim_start_matches('#')),
            page_query(page, limit)
        );
        let request = self.request(Method::GET, &endpoint);
        self.send(request).await
    }

    /// Publish a post
    pub async fn create_post(&self, post: NewPost) -> Result<Post> {
        // Checked before reading any image from disk
        let request = self.authed(Method::POST, "social-media/posts")?;
        let form = post.into_form().await?;
        self.send(request.multipart(form)).await
    }

    /// Edit a post in place
    pub async fn update_post(&self, post_id: &str, post: NewPost) -> Result<Post> {
        let endpoint = format!("social-media/posts/{}", segment(post_id));
        let request = self.authed(Method::PATCH, &endpoint)?;
        let form = post.into_form().await?;
        self.send(request.multipart(form)).await
    }

    /// Delete a post
    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        let endpoint = format!("social-media/posts/{}", segment(post_id));
        let request = self.authed(Method::DELETE, &endpoint)?;
        self.send_unit(request).await?;
        Ok(())
    }

    /// Remove one image from a post
    pub async fn remove_post_image(&self, post_id: &str, image_id: &str) -> Result<Post> {
        let endpoint = format!(
            "social-media/posts/remove/image/{}/{}",
            segment(post_id),
            segment(image_id)
        );
        let request = self.authed(Method::PATCH, &endpoint)?;
        self.send(request).await
    }

    /// Like or unlike a post; returns the new state
    pub async fn toggle_post_like(&self, post_id: &str) -> Result<bool> {
        let endpoint = format!("social-media/like/post/{}", segment(post_id));
        let request = self.authed(Method::POST, &endpoint)?;
        let state: LikeState = self.send(request).await?;
        Ok(state.is_liked)
    }

    /// Bookmark or un-bookmark a post; returns the new state
    pub async fn toggle_bookmark(&self, post_id: &str) -> Result<bool> {
        let endpoint = format!("social-media/bookmarks/{}", segment(post_id));
        let request = self.authed(Method::POST, &endpoint)?;
        let state: BookmarkState = self.send(request).await?;
        Ok(state.is_bookmarked)
    }

    /// The logged-in user's bookmarks
    pub async fn bookmarks(&self, page: u32, limit: u32) -> Result<Page<Post>> {
        let endpoint = format!("social-media/bookmarks?{}", page_query(page, limit));
        let request = self.authed(Method::GET, &endpoint)?;
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime(Path::new("a/b.PNG")), "image/png");
        assert_eq!(image_mime(Path::new("pic.jpeg")), "image/jpeg");
        assert_eq!(image_mime(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_image_is_a_file_error() {
        let err = image_part(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::File { .. }));
    }
}

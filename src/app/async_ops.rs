//! Async operations for the TUI
//!
//! Uses channels to communicate between the sync TUI loop and async tasks.
//! Reads are identified by a [`QueryKey`], writes by a [`Mutation`]; each
//! request runs on its own task so a slow upload never blocks the feed.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::api::{self, ApiClient, ApiError, NewPost, Registration};
use crate::models::{Comment, FollowEntry, LoginData, Page, Post, Profile, ProfileUpdate, User};
use crate::mutation::MutationKey;
use crate::query::QueryKey;

/// Cached result of a read
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    /// A page of posts (feed, own, by user, by tag, bookmarks)
    Posts(Page<Post>),
    /// One post
    Post(Post),
    /// Comments of a post
    Comments(Page<Comment>),
    /// A profile (own or another user's)
    Profile(Profile),
    /// Followers or following
    Follows(Page<FollowEntry>),
    /// The logged-in account
    User(User),
}

/// A write with its payload
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Create an account
    Register(Registration),
    /// Log in
    Login { username: String, password: String },
    /// Log out
    Logout,
    /// Publish a post
    CreatePost(NewPost),
    /// Replace a post's content
    UpdatePost { post_id: String, post: NewPost },
    /// Delete a post
    DeletePost(String),
    /// Remove one image from a post
    RemovePostImage { post_id: String, image_id: String },
    /// Toggle like on a post
    LikePost(String),
    /// Toggle bookmark on a post
    BookmarkPost(String),
    /// Comment on a post
    AddComment { post_id: String, content: String },
    /// Edit a comment
    UpdateComment { comment_id: String, content: String },
    /// Delete a comment
    DeleteComment(String),
    /// Toggle like on a comment
    LikeComment(String),
    /// Toggle following a user (by account ID)
    Follow(String),
    /// Edit own profile
    UpdateProfile(ProfileUpdate),
    /// Upload a new avatar
    UpdateAvatar(PathBuf),
    /// Upload a new cover image
    UpdateCoverImage(PathBuf),
}

impl Mutation {
    /// Key used for double-submit tracking and invalidation
    pub fn key(&self) -> MutationKey {
        match self {
            Self::Register(_) => MutationKey::Register,
            Self::Login { .. } => MutationKey::Login,
            Self::Logout => MutationKey::Logout,
            Self::CreatePost(_) => MutationKey::CreatePost,
            Self::UpdatePost { post_id, .. } => MutationKey::UpdatePost(post_id.clone()),
            Self::DeletePost(id) => MutationKey::DeletePost(id.clone()),
            Self::RemovePostImage { post_id, .. } => MutationKey::RemovePostImage(post_id.clone()),
            Self::LikePost(id) => MutationKey::LikePost(id.clone()),
            Self::BookmarkPost(id) => MutationKey::BookmarkPost(id.clone()),
            Self::AddComment { post_id, .. } => MutationKey::AddComment(post_id.clone()),
            Self::UpdateComment { comment_id, .. } => MutationKey::UpdateComment(comment_id.clone()),
            Self::DeleteComment(id) => MutationKey::DeleteComment(id.clone()),
            Self::LikeComment(id) => MutationKey::LikeComment(id.clone()),
            Self::Follow(id) => MutationKey::Follow(id.clone()),
            Self::UpdateProfile(_) => MutationKey::UpdateProfile,
            Self::UpdateAvatar(_) => MutationKey::UpdateAvatar,
            Self::UpdateCoverImage(_) => MutationKey::UpdateCoverImage,
        }
    }
}

/// What a successful write returned
#[derive(Debug, Clone)]
pub enum MutationOutcome {
    /// Account created
    Registered(User),
    /// Tokens and user
    LoggedIn(LoginData),
    /// Server session ended
    LoggedOut,
    /// Created or updated post
    PostSaved(Post),
    /// Post or comment deleted
    Deleted,
    /// Server-side like state after a toggle
    Liked(bool),
    /// Server-side bookmark state after a toggle
    Bookmarked(bool),
    /// Created or updated comment
    CommentSaved(Comment),
    /// Server-side follow state after a toggle
    Following(bool),
    /// Updated profile
    ProfileSaved(Profile),
    /// Account with the new avatar
    AvatarSaved(User),
}

/// Error as seen by the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Text for the status bar
    pub message: String,
    /// Whether the session must be dropped
    pub unauthorized: bool,
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Self {
            unauthorized: err.is_unauthorized(),
            message: err.user_message(),
        }
    }
}

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum AsyncCommand {
    /// Replace the bearer token used for later requests
    SetToken(Option<String>),
    /// Run a read
    Fetch(QueryKey),
    /// Run a write
    Mutate(Mutation),
    /// Shutdown the worker
    Shutdown,
}

/// Results sent back from the async worker to the TUI
#[derive(Debug)]
pub enum AsyncResult {
    /// A read succeeded
    Fetched { key: QueryKey, data: QueryData },
    /// A read failed
    FetchFailed { key: QueryKey, error: Failure },
    /// A write succeeded
    Mutated {
        key: MutationKey,
        outcome: MutationOutcome,
    },
    /// A write failed
    MutationFailed { key: MutationKey, error: Failure },
}

/// Page sizes used for list reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Posts per page
    pub page_size: u32,
    /// Comments per post
    pub comment_limit: u32,
}

/// Channel handles for communicating with the async worker
pub struct AsyncHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<AsyncCommand>,
    /// Receive results from the worker
    pub result_rx: mpsc::Receiver<AsyncResult>,
}

/// Spawn the async worker and return handles
pub fn spawn_worker(mut client: ApiClient, limits: Limits) -> AsyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<AsyncCommand>(32);
    let (result_tx, result_rx) = mpsc::channel::<AsyncResult>(32);

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                AsyncCommand::Shutdown => break,
                AsyncCommand::SetToken(token) => client.set_token(token),
                AsyncCommand::Fetch(key) => {
                    let client = client.clone();
                    let result_tx = result_tx.clone();
                    tokio::spawn(async move {
                        let result = match fetch(&client, &key, limits).await {
                            Ok(data) => AsyncResult::Fetched { key, data },
                            Err(e) => {
                                tracing::warn!("Fetch {key:?} failed: {e}");
                                AsyncResult::FetchFailed {
                                    key,
                                    error: e.into(),
                                }
                            }
                        };
                        let _ = result_tx.send(result).await;
                    });
                }
                AsyncCommand::Mutate(mutation) => {
                    let client = client.clone();
                    let result_tx = result_tx.clone();
                    tokio::spawn(async move {
                        let key = mutation.key();
                        let result = match execute(&client, mutation).await {
                            Ok(outcome) => AsyncResult::Mutated { key, outcome },
                            Err(e) => {
                                tracing::warn!("{key:?} failed: {e}");
                                AsyncResult::MutationFailed {
                                    key,
                                    error: e.into(),
                                }
                            }
                        };
                        let _ = result_tx.send(result).await;
                    });
                }
            }
        }
    });

    AsyncHandle { cmd_tx, result_rx }
}

/// Run the read identified by `key`
pub async fn fetch(client: &ApiClient, key: &QueryKey, limits: Limits) -> api::Result<QueryData> {
    let size = limits.page_size;
    let data = match key {
        QueryKey::Feed { page } => QueryData::Posts(client.feed(*page, size).await?),
        QueryKey::Post(id) => QueryData::Post(client.post(id).await?),
        QueryKey::Comments(post_id) => {
            QueryData::Comments(client.comments(post_id, 1, limits.comment_limit).await?)
        }
        QueryKey::Profile => QueryData::Profile(client.my_profile().await?),
        QueryKey::User(username) => QueryData::Profile(client.user_profile(username).await?),
        QueryKey::MyPosts { page } => QueryData::Posts(client.my_posts(*page, size).await?),
        QueryKey::UserPosts { username, page } => {
            QueryData::Posts(client.user_posts(username, *page, size).await?)
        }
        QueryKey::TagPosts { tag, page } => {
            QueryData::Posts(client.tag_posts(tag, *page, size).await?)
        }
        QueryKey::Followers(username) => {
            QueryData::Follows(client.followers(username, 1, size).await?)
        }
        QueryKey::Following(username) => {
            QueryData::Follows(client.following(username, 1, size).await?)
        }
        QueryKey::Bookmarks { page } => QueryData::Posts(client.bookmarks(*page, size).await?),
        QueryKey::CurrentUser => QueryData::User(client.current_user().await?),
    };
    Ok(data)
}

/// Run a write
pub async fn execute(client: &ApiClient, mutation: Mutation) -> api::Result<MutationOutcome> {
    let outcome = match mutation {
        Mutation::Register(registration) => {
            MutationOutcome::Registered(client.register(&registration).await?)
        }
        Mutation::Login { username, password } => {
            MutationOutcome::LoggedIn(client.login(&username, &password).await?)
        }
        Mutation::Logout => {
            client.logout().await?;
            MutationOutcome::LoggedOut
        }
        Mutation::CreatePost(post) => MutationOutcome::PostSaved(client.create_post(post).await?),
        Mutation::UpdatePost { post_id, post } => {
            MutationOutcome::PostSaved(client.update_post(&post_id, post).await?)
        }
        Mutation::DeletePost(id) => {
            client.delete_post(&id).await?;
            MutationOutcome::Deleted
        }
        Mutation::RemovePostImage { post_id, image_id } => {
            MutationOutcome::PostSaved(client.remove_post_image(&post_id, &image_id).await?)
        }
        Mutation::LikePost(id) => MutationOutcome::Liked(client.toggle_post_like(&id).await?),
        Mutation::BookmarkPost(id) => {
            MutationOutcome::Bookmarked(client.toggle_bookmark(&id).await?)
        }
        Mutation::AddComment { post_id, content } => {
            MutationOutcome::CommentSaved(client.add_comment(&post_id, &content).await?)
        }
        Mutation::UpdateComment {
            comment_id,
            content,
        } => MutationOutcome::CommentSaved(client.update_comment(&comment_id, &content).await?),
        Mutation::DeleteComment(id) => {
            client.delete_comment(&id).await?;
            MutationOutcome::Deleted
        }
        Mutation::LikeComment(id) => {
            MutationOutcome::Liked(client.toggle_comment_like(&id).await?)
        }
        Mutation::Follow(user_id) => {
            MutationOutcome::Following(client.toggle_follow(&user_id).await?)
        }
        Mutation::UpdateProfile(update) => {
            MutationOutcome::ProfileSaved(client.update_profile(&update).await?)
        }
        Mutation::UpdateAvatar(path) => {
            MutationOutcome::AvatarSaved(client.update_avatar(&path).await?)
        }
        Mutation::UpdateCoverImage(path) => {
            MutationOutcome::ProfileSaved(client.update_cover_image(&path).await?)
        }
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LIMITS: Limits = Limits {
        page_size: 10,
        comment_limit: 50,
    };

    fn envelope(data: serde_json::Value) -> serde_json::Value {
        json!({ "statusCode": 200, "data": data, "message": "ok", "success": true })
    }

    #[test]
    fn test_mutation_keys_carry_target() {
        assert_eq!(
            Mutation::LikePost("p1".into()).key(),
            MutationKey::LikePost("p1".into())
        );
        assert_eq!(
            Mutation::AddComment {
                post_id: "p1".into(),
                content: "hi".into()
            }
            .key(),
            MutationKey::AddComment("p1".into())
        );
        assert_eq!(Mutation::Logout.key(), MutationKey::Logout);
    }

    #[test]
    fn test_failure_from_api_error() {
        let failure = Failure::from(ApiError::Unauthorized("Token expired".into()));
        assert!(failure.unauthorized);
        assert_eq!(failure.message, "Token expired");
    }

    #[tokio::test]
    async fn test_fetch_feed_uses_page_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/social-media/posts"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "posts": [{ "_id": "p1", "content": "hello", "likes": 3 }],
                "totalPosts": 11,
                "page": 2,
                "limit": 10,
                "totalPages": 2,
                "hasNextPage": false,
                "hasPrevPage": true
            }))))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri());
        let data = fetch(&client, &QueryKey::Feed { page: 2 }, LIMITS)
            .await
            .unwrap();
        let QueryData::Posts(page) = data else {
            panic!("expected posts");
        };
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].likes, 3);
        assert!(page.has_prev_page);
    }

    #[tokio::test]
    async fn test_execute_like_returns_server_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/social-media/like/post/p1"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(json!({ "isLiked": true }))),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).with_token("tok");
        let outcome = execute(&client, Mutation::LikePost("p1".into()))
            .await
            .unwrap();
        assert!(matches!(outcome, MutationOutcome::Liked(true)));
    }

    #[tokio::test]
    async fn test_worker_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/current-user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "_id": "u1",
                "username": "doejohn",
                "email": "doe@example.com"
            }))))
            .mount(&server)
            .await;

        let mut handle = spawn_worker(ApiClient::new(&server.uri()), LIMITS);
        handle
            .cmd_tx
            .send(AsyncCommand::SetToken(Some("tok".into())))
            .await
            .unwrap();
        handle
            .cmd_tx
            .send(AsyncCommand::Fetch(QueryKey::CurrentUser))
            .await
            .unwrap();

        match handle.result_rx.recv().await.unwrap() {
            AsyncResult::Fetched {
                key,
                data: QueryData::User(user),
            } => {
                assert_eq!(key, QueryKey::CurrentUser);
                assert_eq!(user.username, "doejohn");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        let _ = handle.cmd_tx.send(AsyncCommand::Shutdown).await;
    }

    #[tokio::test]
    async fn test_worker_reports_unauthorized_without_token() {
        let server = MockServer::start().await;
        let mut handle = spawn_worker(ApiClient::new(&server.uri()), LIMITS);
        handle
            .cmd_tx
            .send(AsyncCommand::Mutate(Mutation::BookmarkPost("p1".into())))
            .await
            .unwrap();

        match handle.result_rx.recv().await.unwrap() {
            AsyncResult::MutationFailed { key, error } => {
                assert_eq!(key, MutationKey::BookmarkPost("p1".into()));
                assert!(error.unauthorized);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

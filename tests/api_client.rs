//! Integration tests for the FreeAPI client against a mock server.

use serde_json::{Value, json};
use sosmed::ApiError;
use sosmed::api::{ApiClient, NewPost, Registration};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(data: Value) -> Value {
    json!({ "statusCode": 200, "data": data, "message": "ok", "success": true })
}

fn failure(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "statusCode": status,
        "data": null,
        "message": message,
        "success": false
    }))
}

#[tokio::test]
async fn test_login_posts_credentials_and_leaves_client_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(body_json(json!({ "username": "doejohn", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "accessToken": "tok-1",
            "refreshToken": "ref-1",
            "user": { "_id": "u1", "username": "doejohn", "email": "doe@example.com" }
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri());
    let data = client.login(" doejohn ", "secret").await.unwrap();

    assert_eq!(data.access_token, "tok-1");
    assert_eq!(data.refresh_token.as_deref(), Some("ref-1"));
    assert_eq!(data.user.id, "u1");
    assert!(client.token().is_none());
}

#[tokio::test]
async fn test_register_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/register"))
        .respond_with(failure(409, "User with email or username already exists"))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri());
    let err = client
        .register(&Registration::user("doe@example.com", "doejohn", "pw"))
        .await
        .unwrap_err();

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "User with email or username already exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_register_returns_created_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/register"))
        .and(body_json(json!({
            "email": "doe@example.com",
            "password": "pw",
            "username": "doejohn",
            "role": "USER"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(json!({
            "user": { "_id": "u1", "username": "doejohn", "email": "doe@example.com" }
        }))))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri());
    let user = client
        .register(&Registration::user("doe@example.com", "DoeJohn", "pw"))
        .await
        .unwrap();
    assert_eq!(user.username, "doejohn");
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/current-user"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "_id": "u1",
            "username": "doejohn",
            "email": "doe@example.com",
            "role": "USER",
            "isEmailVerified": true
        }))))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).with_token("tok-1");
    let user = client.current_user().await.unwrap();
    assert_eq!(user.username, "doejohn");
    assert!(user.is_email_verified);
}

#[tokio::test]
async fn test_unauthorized_maps_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/social-media/profile"))
        .respond_with(failure(401, "Token expired"))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).with_token("stale");
    let err = client.my_profile().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Token expired");
}

#[tokio::test]
async fn test_authed_call_without_token_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri());
    let err = client.bookmarks(1, 10).await.unwrap_err();
    assert!(matches!(err, ApiError::NotLoggedIn));
}

#[tokio::test]
async fn test_feed_page_parses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/social-media/posts"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "posts": [
                {
                    "_id": "p1",
                    "content": "first",
                    "tags": ["rust"],
                    "likes": 4,
                    "comments": 1,
                    "isLiked": true,
                    "author": { "_id": "pr1", "owner": "u1", "account": { "_id": "u1", "username": "ann" } },
                    "createdAt": "2024-01-01T00:00:00.000Z",
                    "updatedAt": "2024-01-02T00:00:00.000Z"
                },
                { "_id": "p2", "content": "second" }
            ],
            "totalPosts": 3,
            "page": 1,
            "limit": 2,
            "totalPages": 2,
            "hasNextPage": true,
            "hasPrevPage": false
        }))))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri());
    let page = client.feed(1, 2).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 3);
    assert!(page.has_next_page);
    let first = &page.items[0];
    assert_eq!(first.author.username(), "ann");
    assert!(first.is_authored_by("u1"));
    assert!(first.is_edited());
    assert_eq!(first.tags_line(), "#rust");
}

#[tokio::test]
async fn test_like_and_bookmark_toggles() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/social-media/like/post/p1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "isLiked": false }))),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/social-media/bookmarks/p1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "isBookmarked": true }))),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).with_token("tok");
    assert!(!client.toggle_post_like("p1").await.unwrap());
    assert!(client.toggle_bookmark("p1").await.unwrap());
}

#[tokio::test]
async fn test_follow_toggle_and_lists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/social-media/follow/u2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "following": true }))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/social-media/follow/list/followers/bob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "followers": [
                { "_id": "u1", "username": "ann", "profile": { "firstName": "Ann", "lastName": "Lee" }, "isFollowing": true }
            ],
            "totalFollowers": 1,
            "page": 1,
            "limit": 10,
            "totalPages": 1,
            "hasNextPage": false,
            "hasPrevPage": false
        }))))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).with_token("tok");
    assert!(client.toggle_follow("u2").await.unwrap());

    let followers = client.followers("bob", 1, 10).await.unwrap();
    assert_eq!(followers.total, 1);
    assert_eq!(followers.items[0].full_name(), "Ann Lee");
    assert!(followers.items[0].is_following);
}

#[tokio::test]
async fn test_comments_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/social-media/comments/post/p1"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "comments": [
                { "_id": "c1", "content": "nice", "postId": "p1", "likes": 2,
                  "author": { "account": { "_id": "u2", "username": "bob" } } }
            ],
            "totalComments": 1
        }))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/social-media/comments/post/p1"))
        .and(body_json(json!({ "content": "thanks" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(json!({
            "_id": "c2", "content": "thanks", "postId": "p1"
        }))))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/social-media/comments/c2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "deletedComment": {} }))),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).with_token("tok");

    let comments = client.comments("p1", 1, 50).await.unwrap();
    assert_eq!(comments.items.len(), 1);
    assert_eq!(comments.items[0].author.username(), "bob");

    let added = client.add_comment("p1", "thanks").await.unwrap();
    assert_eq!(added.id, "c2");

    client.delete_comment("c2").await.unwrap();
}

#[tokio::test]
async fn test_create_post_uploads_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/social-media/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(json!({
            "_id": "p9", "content": "hello", "tags": ["rust"]
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("cat.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    let client = ApiClient::new(&server.uri()).with_token("tok");
    let post = client
        .create_post(NewPost {
            content: "hello".into(),
            tags: vec!["#rust".into(), String::new()],
            images: vec![image],
        })
        .await
        .unwrap();
    assert_eq!(post.id, "p9");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"content\""));
    assert!(body.contains("name=\"tags[0]\""));
    assert!(!body.contains("name=\"tags[1]\""));
    assert!(body.contains("filename=\"cat.png\""));
}

#[tokio::test]
async fn test_missing_upload_file_is_reported() {
    let server = MockServer::start().await;
    let client = ApiClient::new(&server.uri()).with_token("tok");
    let err = client
        .create_post(NewPost {
            content: "x".into(),
            tags: Vec::new(),
            images: vec!["/definitely/not/here.png".into()],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::File { .. }));
}

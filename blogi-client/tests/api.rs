use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use httpmock::prelude::*;
use serde_json::json;

use blogi_client::{BlogiClient, ClientError, ImageUpload, PostDraft};
use blogi_core::{PostComposer, PostPage, SubmitPlan};

fn make_token(username: &str, id: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({ "sub": username, "id": id, "exp": 1_900_000_000i64 })
            .to_string()
            .as_bytes(),
    );
    format!("{header}.{payload}.signature")
}

fn post_json(id: i64, title: &str, image_url: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "content": "content",
        "image_url": image_url,
        "user_id": 7,
        "author_username": "alice",
        "created_at": "2026-08-01T12:00:00Z",
        "updated_at": "2026-08-02T12:00:00Z"
    })
}

#[tokio::test]
async fn register_then_login_builds_a_session() {
    let server = MockServer::start_async().await;

    let register_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/register").json_body(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "Password1"
            }));
            then.status(201).json_body(json!({
                "id": 7,
                "username": "alice",
                "email": "alice@example.com",
                "created_at": "2026-08-01T12:00:00Z"
            }));
        })
        .await;

    let token = make_token("alice", 7);
    let login_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login").json_body(json!({
                "username": "alice",
                "password": "Password1"
            }));
            then.status(200).json_body(json!({
                "access_token": token.clone(),
                "token_type": "bearer"
            }));
        })
        .await;

    let mut client = BlogiClient::new(server.base_url());

    let user = client
        .register("alice", "alice@example.com", "Password1")
        .await
        .expect("register must succeed");
    assert_eq!(user.id, 7);
    assert!(client.get_token().is_none());

    let issued = client
        .login("alice", "Password1")
        .await
        .expect("login must succeed");
    assert_eq!(issued.token_type, "bearer");
    assert_eq!(client.get_token(), Some(token.as_str()));

    let session = client.session().expect("session must build from claims");
    assert_eq!(session.username, "alice");
    assert_eq!(session.user_id, 7);

    register_mock.assert_async().await;
    login_mock.assert_async().await;
}

#[tokio::test]
async fn list_posts_returns_requested_page_of_search_results() {
    let server = MockServer::start_async().await;

    let items: Vec<serde_json::Value> = (11..=20)
        .map(|id| post_json(id, &format!("rust post {id}"), None))
        .collect();

    let list_mock = server
        .mock_async(move |when, then| {
            when.method(GET)
                .path("/api/blogs/")
                .query_param("page", "2")
                .query_param("limit", "10")
                .query_param("search", "rust");
            then.status(200).json_body(json!({
                "items": items,
                "total": 25,
                "page": 2,
                "size": 10,
                "pages": 3
            }));
        })
        .await;

    let client = BlogiClient::new(server.base_url());
    let page = client
        .list_posts(2, 10, Some("rust"))
        .await
        .expect("list must succeed");

    assert_eq!(page.items.len(), 10);
    assert_eq!(page.page, 2);
    assert_eq!(page.total, 25);
    assert_eq!(page.pages, 3);
    assert_eq!(page.pages, PostPage::expected_pages(page.total, page.size));

    list_mock.assert_async().await;
}

#[tokio::test]
async fn missing_post_maps_to_not_found() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/blogs/999");
            then.status(404)
                .json_body(json!({ "detail": "Blog post not found" }));
        })
        .await;

    let client = BlogiClient::new(server.base_url());
    let result = client.get_post(999).await;
    assert!(matches!(result, Err(ClientError::NotFound)));
}

#[tokio::test]
async fn rejected_credentials_map_to_unauthorized() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(401)
                .json_body(json!({ "detail": "Incorrect username or password" }));
        })
        .await;

    let mut client = BlogiClient::new(server.base_url());
    let result = client.login("alice", "wrong").await;
    assert!(matches!(result, Err(ClientError::Unauthorized)));
    assert!(client.get_token().is_none());
}

#[tokio::test]
async fn validation_error_keeps_status_and_detail() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/blogs/");
            then.status(400)
                .json_body(json!({ "detail": "Title cannot exceed 100 characters" }));
        })
        .await;

    let mut client = BlogiClient::new(server.base_url());
    client.set_token(make_token("alice", 7));

    let draft = PostDraft {
        title: "x".repeat(100),
        content: "content".to_string(),
        image_url: None,
    };
    match client.create_post(&draft).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Title cannot exceed 100 characters");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_post_sends_bearer_token() {
    let server = MockServer::start_async().await;
    let token = make_token("alice", 7);

    let create_mock = server
        .mock_async({
            let token = token.clone();
            move |when, then| {
                when.method(POST)
                    .path("/api/blogs/")
                    .header("authorization", format!("Bearer {token}"))
                    .json_body(json!({
                        "title": "Hello",
                        "content": "World"
                    }));
                then.status(201).json_body(post_json(1, "Hello", None));
            }
        })
        .await;

    let mut client = BlogiClient::new(server.base_url());
    client.set_token(token);

    let draft = PostDraft {
        title: "Hello".to_string(),
        content: "World".to_string(),
        image_url: None,
    };
    let post = client.create_post(&draft).await.expect("create must succeed");
    assert_eq!(post.id, 1);

    create_mock.assert_async().await;
}

#[tokio::test]
async fn publish_uploads_image_before_creating_the_post() {
    let server = MockServer::start_async().await;
    let token = make_token("alice", 7);
    let file_url = "https://bucket.s3.eu-central-1.amazonaws.com/uploads/cover.jpg";

    let presigned_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/uploads/presigned-url")
                .json_body(json!({
                    "file_name": "cover.jpg",
                    "file_type": "image/jpeg"
                }));
            then.status(200).json_body(json!({
                "upload_url": server.url("/bucket/uploads/cover.jpg"),
                "file_url": file_url
            }));
        })
        .await;

    let put_mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/bucket/uploads/cover.jpg")
                .header("content-type", "image/jpg");
            then.status(200);
        })
        .await;

    let create_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/blogs/").json_body(json!({
                "title": "With cover",
                "image_url": file_url,
                "content": "content"
            }));
            then.status(201)
                .json_body(post_json(2, "With cover", Some(file_url)));
        })
        .await;

    let mut client = BlogiClient::new(server.base_url());
    client.set_token(token);

    let draft = PostDraft {
        title: "With cover".to_string(),
        content: "content".to_string(),
        image_url: None,
    };
    let image = ImageUpload {
        file_name: "cover.jpg".to_string(),
        file_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF],
    };

    let post = client
        .publish_post(&draft, Some(image))
        .await
        .expect("publish must succeed");
    assert_eq!(post.image_url.as_deref(), Some(file_url));

    presigned_mock.assert_async().await;
    put_mock.assert_async().await;
    create_mock.assert_async().await;
}

#[tokio::test]
async fn failed_storage_put_prevents_the_create_request() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/uploads/presigned-url");
            then.status(200).json_body(json!({
                "upload_url": server.url("/bucket/uploads/cover.jpg"),
                "file_url": "https://bucket.s3.amazonaws.com/uploads/cover.jpg"
            }));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(PUT).path("/bucket/uploads/cover.jpg");
            then.status(500);
        })
        .await;

    let create_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/blogs/");
            then.status(201).json_body(post_json(3, "never", None));
        })
        .await;

    let mut client = BlogiClient::new(server.base_url());
    client.set_token(make_token("alice", 7));

    let draft = PostDraft {
        title: "never".to_string(),
        content: "content".to_string(),
        image_url: None,
    };
    let image = ImageUpload {
        file_name: "cover.jpg".to_string(),
        file_type: "image/jpeg".to_string(),
        bytes: vec![1, 2, 3],
    };

    let result = client.publish_post(&draft, Some(image)).await;
    match result {
        Err(ClientError::Upload(message)) => {
            assert_eq!(message, "Failed to upload file. Status: 500");
        }
        other => panic!("expected Upload error, got {other:?}"),
    }

    assert_eq!(create_mock.calls_async().await, 0);
}

#[tokio::test]
async fn rejected_presigned_request_uses_fixed_message() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/uploads/presigned-url");
            then.status(500)
                .json_body(json!({ "detail": "Error generating presigned URL" }));
        })
        .await;

    let mut client = BlogiClient::new(server.base_url());
    client.set_token(make_token("alice", 7));

    let image = ImageUpload {
        file_name: "cover.jpg".to_string(),
        file_type: "image/jpeg".to_string(),
        bytes: vec![1],
    };
    let result = client.upload_image(image).await;
    match result {
        Err(ClientError::Upload(message)) => {
            assert_eq!(message, "Failed to get presigned URL");
        }
        other => panic!("expected Upload error, got {other:?}"),
    }
}

#[tokio::test]
async fn editing_without_a_new_file_preserves_the_image_url() {
    let server = MockServer::start_async().await;
    let old_url = "https://bucket.s3.amazonaws.com/uploads/old.jpg";

    let existing: blogi_core::Post =
        serde_json::from_value(post_json(5, "Old title", Some(old_url)))
            .expect("fixture post should parse");

    let mut composer = PostComposer::for_edit(&existing);
    composer.draft_mut().title = "New title".to_string();

    let plan = composer.begin_submit().expect("submit should start");
    let SubmitPlan::SubmitOnly { image_url } = plan else {
        panic!("no new file was selected, upload must not be planned");
    };
    assert_eq!(image_url.as_deref(), Some(old_url));

    let update_mock = server
        .mock_async(|when, then| {
            when.method(PUT).path("/api/blogs/5").json_body(json!({
                "title": "New title",
                "image_url": old_url,
                "content": "content"
            }));
            then.status(200)
                .json_body(post_json(5, "New title", Some(old_url)));
        })
        .await;

    let mut client = BlogiClient::new(server.base_url());
    client.set_token(make_token("alice", 7));

    let patch = composer.patch_with_image(image_url);
    let updated = client
        .revise_post(5, patch, None)
        .await
        .expect("update must succeed");
    composer.finish_submit();

    assert_eq!(updated.image_url.as_deref(), Some(old_url));
    update_mock.assert_async().await;
}

#[tokio::test]
async fn delete_requires_token_and_hits_the_endpoint() {
    let server = MockServer::start_async().await;
    let token = make_token("alice", 7);

    let delete_mock = server
        .mock_async({
            let token = token.clone();
            move |when, then| {
                when.method(DELETE)
                    .path("/api/blogs/5")
                    .header("authorization", format!("Bearer {token}"));
                then.status(200).json_body(json!({ "detail": "deleted" }));
            }
        })
        .await;

    let client_without_token = BlogiClient::new(server.base_url());
    let result = client_without_token.delete_post(5).await;
    assert!(matches!(result, Err(ClientError::Unauthorized)));
    assert_eq!(delete_mock.calls_async().await, 0);

    let mut client = BlogiClient::new(server.base_url());
    client.set_token(token);
    client.delete_post(5).await.expect("delete must succeed");
    delete_mock.assert_async().await;
}

#[tokio::test]
async fn user_posts_returns_plain_post_list() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/blogs/user/7");
            then.status(200).json_body(json!([
                post_json(1, "first", None),
                post_json(2, "second", None)
            ]));
        })
        .await;

    let mut client = BlogiClient::new(server.base_url());
    client.set_token(make_token("alice", 7));

    let posts = client.my_posts().await.expect("my_posts must succeed");
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|post| post.user_id == 7));
}

#[tokio::test]
async fn transport_failure_reports_status_500() {
    // Порт 1 закрыт: ответа нет, статус по умолчанию — 500.
    let client = BlogiClient::new("http://127.0.0.1:1");
    let err = client
        .list_posts(1, 10, None)
        .await
        .expect_err("request must fail");
    assert_eq!(err.status(), 500);
}

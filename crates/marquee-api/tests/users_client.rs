mod common;

use common::{closed_port_url, MockResponse, MockServer};
use marquee_api::{ApiError, User, UsersClient, UsersClientConfig};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn client_for(base_url: String) -> UsersClient {
    UsersClient::new(UsersClientConfig {
        base_url,
        bearer_token: Some("demo-token".to_string()),
        ..Default::default()
    })
    .unwrap()
}

fn ada() -> User {
    User {
        id: 1,
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        age: Some(36),
        city: None,
        job: Some("Engineer".to_string()),
    }
}

#[tokio::test]
async fn test_get_user_with_bearer_token() {
    let server = MockServer::start().await;
    server
        .enqueue(MockResponse::json(r#"{"id": 1, "name": "Ada", "email": "ada@example.com"}"#))
        .await;

    let user = client_for(server.base_url()).get_user(1).await.unwrap();
    assert_eq!(user.name, "Ada");

    let req = server.last_request().await;
    assert_eq!(req.path, "/users/1");
    assert_eq!(req.header("authorization"), Some("Bearer demo-token"));
}

#[tokio::test]
async fn test_update_user_puts_json() {
    let server = MockServer::start().await;
    server
        .enqueue(MockResponse::json(r#"{"id": 1, "name": "Ada", "email": "ada@example.com", "age": 36, "job": "Engineer"}"#))
        .await;

    let updated = client_for(server.base_url())
        .update_user(1, &ada())
        .await
        .unwrap();
    assert_eq!(updated, ada());

    let req = server.last_request().await;
    assert_eq!(req.method, "PUT");
    assert_eq!(req.body_json()["job"], "Engineer");
}

#[tokio::test]
async fn test_delete_user_accepts_no_content() {
    let server = MockServer::start().await;
    server.enqueue(MockResponse::empty(204)).await;

    let result = client_for(server.base_url()).delete_user(7).await;
    assert_eq!(result, Ok(()));
    assert_eq!(server.last_request().await.method, "DELETE");
}

#[tokio::test]
async fn test_create_user_with_null_body_is_empty_body() {
    let server = MockServer::start().await;
    server.enqueue(MockResponse::empty(201)).await;

    let result = client_for(server.base_url()).create_user(&ada()).await;
    assert_eq!(result, Err(ApiError::EmptyBody));
}

#[tokio::test]
async fn test_filters_become_query_params() {
    let server = MockServer::start().await;
    server.enqueue(MockResponse::json("[]")).await;

    let mut filters = BTreeMap::new();
    filters.insert("age".to_string(), "30".to_string());
    filters.insert("city".to_string(), "New York".to_string());

    let users = client_for(server.base_url())
        .users_by_filters(&filters)
        .await
        .unwrap();
    assert!(users.is_empty());

    let req = server.last_request().await;
    assert_eq!(req.query_param("age").as_deref(), Some("30"));
    assert_eq!(req.query_param("city").as_deref(), Some("New York"));
}

#[tokio::test]
async fn test_form_encoded_create() {
    let server = MockServer::start().await;
    server
        .enqueue(MockResponse::status(201, r#"{"id": 11, "name": "morpheus", "email": "", "job": "leader"}"#))
        .await;

    let user = client_for(server.base_url())
        .create_user_with_fields("morpheus", "leader")
        .await
        .unwrap();
    assert_eq!(user.job.as_deref(), Some("leader"));

    let req = server.last_request().await;
    assert_eq!(req.path, "/api/users");
    assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
    assert_eq!(req.body_text(), "name=morpheus&job=leader");
}

#[tokio::test]
async fn test_explicit_authorization_header_wins() {
    let server = MockServer::start().await;
    server
        .enqueue(MockResponse::json(r#"{"id": 2, "name": "Grace", "email": "g@example.com"}"#))
        .await;

    client_for(server.base_url())
        .user_profile("Token abc")
        .await
        .unwrap();

    let req = server.last_request().await;
    assert_eq!(req.path, "/profile");
    assert_eq!(req.header("authorization"), Some("Token abc"));
}

#[tokio::test]
async fn test_users_by_absolute_url() {
    let server = MockServer::start().await;
    server.enqueue(MockResponse::json("[]")).await;

    // Base points nowhere, the absolute URL is used as given
    let client = client_for("http://127.0.0.1:1/".to_string());
    client
        .users_by_url(&server.url("v2/users?page=3"))
        .await
        .unwrap();

    let req = server.last_request().await;
    assert_eq!(req.path, "/v2/users");
    assert_eq!(req.query_param("page").as_deref(), Some("3"));
}

#[tokio::test]
async fn test_upload_sends_description_part() {
    let server = MockServer::start().await;
    server
        .enqueue(MockResponse::json(r#"{"message": "ok", "file_url": "https://cdn/x.jpg"}"#))
        .await;

    let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    file.write_all(b"jpeg").unwrap();

    client_for(server.base_url())
        .upload_image(file.path(), "my avatar")
        .await
        .unwrap();

    let body = server.last_request().await.body_text();
    assert!(body.contains(r#"name="description""#));
    assert!(body.contains("my avatar"));
    assert!(body.contains("Content-Type: image/jpeg"));
}

#[tokio::test]
async fn test_server_errors_are_not_retried() {
    let server = MockServer::start().await;
    server
        .enqueue(MockResponse::status(503, r#"{"message": "maintenance"}"#))
        .await;
    server.enqueue(MockResponse::json(r#"{"id": 1, "name": "Ada", "email": "a"}"#)).await;

    let err = client_for(server.base_url()).get_user(1).await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
    assert_eq!(server.requests().await.len(), 1);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    server
        .enqueue(MockResponse::json("[]").with_delay(2_000))
        .await;

    let client = UsersClient::new(UsersClientConfig {
        base_url: server.base_url(),
        timeout: Duration::from_millis(200),
        ..Default::default()
    })
    .unwrap();

    let err = client.users_by_status("active").await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_connection_failure_is_network_error() {
    let client = client_for(closed_port_url().await);
    let err = client.get_user(1).await.unwrap_err();
    assert!(err.is_connection_failure(), "got {:?}", err);
}

/// Drops the first connection unanswered, then serves `body` to the next one
async fn flaky_server(body: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let seen = connections.clone();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                drop(stream);
                continue;
            }
            let mut buf = vec![0u8; 4096];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf[read..]).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => read += n,
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{}/", addr), connections)
}

#[tokio::test]
async fn test_dropped_connection_is_retried_once() {
    let (base_url, connections) =
        flaky_server(r#"{"id": 1, "name": "Ada", "email": "ada@example.com"}"#).await;

    let user = client_for(base_url).get_user(1).await.unwrap();
    assert_eq!(user.name, "Ada");
    assert_eq!(connections.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_dropped_connection_without_retry_fails() {
    let (base_url, connections) =
        flaky_server(r#"{"id": 1, "name": "Ada", "email": "ada@example.com"}"#).await;

    let client = UsersClient::new(UsersClientConfig {
        base_url,
        retry_on_connection_failure: false,
        ..Default::default()
    })
    .unwrap();

    let err = client.get_user(1).await.unwrap_err();
    assert!(err.is_connection_failure(), "got {:?}", err);
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

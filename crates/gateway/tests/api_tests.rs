//! REST surface tests against an in-process router and a real SQLite store.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use shopchat_config::RealtimeConfig;
use shopchat_gateway::{create_router, GatewayState};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

async fn create_test_state() -> (GatewayState, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_gateway.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let pool = SqlitePool::connect(&db_url).await.unwrap();

    sqlx::query(
        "CREATE TABLE users (
            user_id TEXT PRIMARY KEY,
            username TEXT NOT NULL,
            email TEXT NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "CREATE TABLE conversations (
            conversation_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            is_group INTEGER NOT NULL DEFAULT 0,
            host_id TEXT,
            created_at TEXT NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "CREATE TABLE conversation_members (
            conversation_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            joined_at TEXT NOT NULL,
            PRIMARY KEY (conversation_id, user_id)
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "CREATE TABLE messages (
            message_id INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id TEXT NOT NULL,
            sender_id TEXT NOT NULL,
            content TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    for (id, name) in [("u1", "alice"), ("u2", "bob")] {
        sqlx::query("INSERT INTO users (user_id, username, email) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(format!("{}@example.com", name))
            .execute(&pool)
            .await
            .unwrap();
    }

    (GatewayState::new(pool, &RealtimeConfig::default()), temp_dir)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn conversation_body(id: &str) -> Value {
    json!({
        "conversation_id": id,
        "name": "Support",
        "participant_ids": ["u1", "u2"],
        "is_group": false,
        "host_id": "u1",
    })
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (state, _temp_dir) = create_test_state().await;
    let app = create_router(state);

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn conversation_create_and_duplicate() {
    let (state, _temp_dir) = create_test_state().await;
    let app = create_router(state);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/chat/conversations",
            conversation_body("C1"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["conversation_id"], "C1");
    assert_eq!(body["is_group"], false);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/chat/conversations",
            conversation_body("C1"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "duplicate_conversation");
}

#[tokio::test]
async fn message_flow_over_rest() {
    let (state, _temp_dir) = create_test_state().await;
    let app = create_router(state);

    app.clone()
        .oneshot(json_request(
            Method::POST,
            "/api/chat/conversations",
            conversation_body("C1"),
        ))
        .await
        .unwrap();

    // Append.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/chat/messages",
            json!({"conversation_id": "C1", "sender_id": "u1", "content": "hello"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["sender_id"], "u1");
    assert_eq!(body["is_read"], false);

    // History.
    let response = app
        .clone()
        .oneshot(get_request("/api/chat/C1/messages"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["content"], "hello");

    // Mark read twice: idempotent.
    let mark = json!({"conversation_id": "C1", "user_id": "u2"});
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/chat/mark-read", mark.clone()))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["marked"], 1);
    assert_eq!(body["unread"], 0);

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/chat/mark-read", mark))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["marked"], 0);

    // Sidebar listing reflects the reconciled state.
    let response = app
        .oneshot(get_request("/api/chat/conversations/u2"))
        .await
        .unwrap();
    let listing = body_json(response).await;
    assert_eq!(listing[0]["conversation_id"], "C1");
    assert_eq!(listing[0]["unread_count"], 0);
    assert_eq!(listing[0]["newest_message"], "hello");
}

#[tokio::test]
async fn invalid_sends_are_rejected() {
    let (state, _temp_dir) = create_test_state().await;
    let app = create_router(state);

    app.clone()
        .oneshot(json_request(
            Method::POST,
            "/api/chat/conversations",
            conversation_body("C1"),
        ))
        .await
        .unwrap();

    // Whitespace-only content.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/chat/messages",
            json!({"conversation_id": "C1", "sender_id": "u1", "content": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "empty_content");

    // Non-member sender.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/chat/messages",
            json!({"conversation_id": "C1", "sender_id": "intruder", "content": "hi"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown conversation.
    let response = app
        .oneshot(get_request("/api/chat/missing/messages"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn group_membership_management() {
    let (state, _temp_dir) = create_test_state().await;
    let app = create_router(state);

    app.clone()
        .oneshot(json_request(
            Method::POST,
            "/api/chat/conversations",
            json!({
                "conversation_id": "GRP1",
                "name": "Staff",
                "participant_ids": ["u1", "u2"],
                "is_group": true,
                "host_id": "u1",
            }),
        ))
        .await
        .unwrap();

    let member = json!({"conversation_id": "GRP1", "user_id": "u3"});
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/chat/members", member.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(Method::DELETE, "/api/chat/members", member))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

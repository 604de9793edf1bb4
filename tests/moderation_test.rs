//! Moderation and assistant behavior against a stub chat-completions
//! endpoint. These tests need no database.

use axum::{http::StatusCode, routing::post, Json, Router};
use ideaconnect::config::ai::AiConfig;
use ideaconnect::services::ai::{AiService, ChatRole, ChatTurn};

/// Serve a canned response at /chat/completions on an ephemeral port and
/// return the base URL to point the client at.
async fn spawn_stub(status: StatusCode, body: serde_json::Value) -> String {
    let app = Router::new().route(
        "/chat/completions",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn service_for(base_url: String) -> AiService {
    AiService::new(Some(AiConfig {
        base_url,
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        timeout_secs: 5,
    }))
}

fn completion_with(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [ { "message": { "content": content } } ]
    })
}

#[tokio::test]
async fn rejection_verdict_carries_the_reason_verbatim() {
    let base_url = spawn_stub(
        StatusCode::OK,
        completion_with(r#"{"isValid": false, "reason": "Reads like an advertisement."}"#),
    )
    .await;

    let verdict = service_for(base_url).moderate("Buy my pills!").await;
    assert!(!verdict.is_valid);
    assert_eq!(verdict.reason.as_deref(), Some("Reads like an advertisement."));
}

#[tokio::test]
async fn approval_verdict_passes() {
    let base_url = spawn_stub(StatusCode::OK, completion_with(r#"{"isValid": true}"#)).await;

    let verdict = service_for(base_url).moderate("A genuine idea").await;
    assert!(verdict.is_valid);
    assert!(verdict.reason.is_none());
}

#[tokio::test]
async fn server_error_fails_open() {
    let base_url = spawn_stub(
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({ "error": "boom" }),
    )
    .await;

    let verdict = service_for(base_url).moderate("Anything").await;
    assert!(verdict.is_valid);
}

#[tokio::test]
async fn off_contract_reply_fails_open() {
    let base_url = spawn_stub(
        StatusCode::OK,
        completion_with("Sure! This looks like a great idea to me."),
    )
    .await;

    let verdict = service_for(base_url).moderate("Anything").await;
    assert!(verdict.is_valid);
}

#[tokio::test]
async fn unreachable_endpoint_fails_open() {
    // Bind a port and drop it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let verdict = service_for(format!("http://{}", addr)).moderate("Anything").await;
    assert!(verdict.is_valid);
}

#[tokio::test]
async fn unconfigured_service_approves_everything() {
    let verdict = AiService::new(None).moderate("Anything at all").await;
    assert!(verdict.is_valid);
    assert!(!AiService::new(None).is_configured());
}

#[tokio::test]
async fn assistant_round_trip_returns_the_reply() {
    let base_url = spawn_stub(
        StatusCode::OK,
        completion_with("Start by interviewing ten potential customers."),
    )
    .await;

    let reply = service_for(base_url)
        .chat(&[ChatTurn {
            role: ChatRole::User,
            content: "How do I validate my idea?".to_string(),
        }])
        .await;
    assert_eq!(reply, "Start by interviewing ten potential customers.");
}

#[tokio::test]
async fn assistant_falls_back_to_an_apology() {
    // Unconfigured and hard-failing cases both end in the fixed apology.
    let turns = [ChatTurn {
        role: ChatRole::User,
        content: "Hello".to_string(),
    }];

    let reply = AiService::new(None).chat(&turns).await;
    assert!(reply.starts_with("Sorry"));

    let base_url = spawn_stub(
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({ "error": "boom" }),
    )
    .await;
    let reply = service_for(base_url).chat(&turns).await;
    assert!(reply.starts_with("Sorry"));
}

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use collections_agent::config::Config;
use collections_agent::server::token::TokenIssuer;
use collections_agent::server::{AppState, router};
use collections_agent::worker::Connect;
use collections_core::{AgentKind, Prompts};
use openai_realtime::RealtimeClient;
use serde_json::{Value, json};
use tower::ServiceExt;

struct Offline;

#[async_trait]
impl Connect for Offline {
    async fn connect(&self) -> Result<Box<dyn RealtimeClient>> {
        anyhow::bail!("no realtime backend in tests")
    }
}

fn state(with_tokens: bool) -> AppState {
    let config = Config::from_lookup(|key| match key {
        "VOICE_SERVICE_URL" => Some("wss://voice.test".to_string()),
        _ => None,
    })
    .unwrap();
    let state =
        AppState::new(Arc::new(config), Prompts::builtin()).with_connector(Arc::new(Offline));
    if with_tokens {
        state.with_tokens(TokenIssuer::new("APIkey", "secret"))
    } else {
        state
    }
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn token_requires_room_and_username() {
    let state = state(true);
    let (status, body) = send(&state, post("/api/token", json!({"room": "support"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Room and username are required");
}

#[tokio::test]
async fn token_without_credentials_is_server_error() {
    let state = state(false);
    let (status, body) = send(
        &state,
        post("/api/token", json!({"room": "support", "username": "ana"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Voice service credentials not configured");
}

#[tokio::test]
async fn token_opens_room_with_requested_agent() {
    // Arrange
    let state = state(true);

    // Act
    let (status, body) = send(
        &state,
        post(
            "/api/token",
            json!({
                "room": "desk",
                "username": "ana",
                "agent": "collections",
                "metadata": {"tier": 1}
            }),
        ),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "wss://voice.test");
    let claims = TokenIssuer::new("APIkey", "secret")
        .verify(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, "ana");
    assert_eq!(claims.video.room, "desk");
    let room = state.rooms.get("desk").unwrap();
    assert_eq!(room.kind, AgentKind::Collections);
    assert_eq!(room.metadata.as_deref(), Some(r#"{"tier":1}"#));
}

#[tokio::test]
async fn token_rejects_unknown_agent_kind() {
    let state = state(true);
    let (status, _) = send(
        &state,
        post("/api/token", json!({"room": "r", "username": "u", "agent": "sales"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(state.rooms.get("r").is_none());
}

#[tokio::test]
async fn initiate_call_creates_outbound_room() {
    let state = state(true);
    let (status, call) = send(
        &state,
        post(
            "/api/collections/initiate-call",
            json!({"phoneNumber": "+15550100", "customerName": "Ana Ruiz", "amountOwed": 812.5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(call["status"], "initiating");
    assert!(call["callId"].as_str().unwrap().starts_with("CALL-"));
    assert!(call["accountNumber"].as_str().unwrap().starts_with("ACC-"));

    let room_name = call["roomName"].as_str().unwrap();
    assert!(room_name.starts_with("call-") && room_name.ends_with("-+15550100"));
    let room = state.rooms.get(room_name).unwrap();
    assert_eq!(room.kind, AgentKind::Outbound);
    let metadata: Value = serde_json::from_str(room.metadata.as_deref().unwrap()).unwrap();
    assert_eq!(metadata["callType"], "outbound_collection");
    assert_eq!(metadata["daysOverdue"], 30);
    assert_eq!(metadata["amountOwed"], 812.5);
}

#[tokio::test]
async fn initiate_call_needs_customer_fields() {
    let state = state(true);
    for body in [
        json!({"customerName": "Ana", "amountOwed": 10}),
        json!({"phoneNumber": "+1", "amountOwed": 10}),
        json!({"phoneNumber": "+1", "customerName": "Ana", "amountOwed": 0}),
    ] {
        let (status, body) = send(&state, post("/api/collections/initiate-call", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Phone number, customer name, and amount are required");
    }
    assert!(state.rooms.is_empty());
}

#[tokio::test]
async fn initiate_call_rejects_details_the_agent_cannot_use() {
    let state = state(true);
    for (body, field) in [
        (
            json!({"phoneNumber": "+1", "customerName": "Ana", "amountOwed": "lots"}),
            "amountOwed",
        ),
        (
            json!({
                "phoneNumber": "+1",
                "customerName": "Ana",
                "amountOwed": 10,
                "paymentDueDate": "11/01/2026"
            }),
            "paymentDueDate",
        ),
    ] {
        let (status, body) = send(&state, post("/api/collections/initiate-call", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Invalid call details"), "{message}");
        assert!(message.contains(field), "{message}");
    }
    assert!(state.rooms.is_empty());
}

#[tokio::test]
async fn status_reports_room_and_participants() {
    let state = state(true);
    state
        .open_room("call-1-+1", AgentKind::Outbound, Some(r#"{"customerName":"Ana"}"#.to_string()))
        .unwrap();

    let (status, body) = send(&state, get("/api/collections/status?room=call-1-%2B1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "waiting");
    assert_eq!(body["room"]["participantCount"], 1);
    assert_eq!(body["metadata"]["customerName"], "Ana");
    assert_eq!(body["participants"][0]["identity"], "agent-call-1-+1");

    let (_, body) = send(&state, get("/api/collections/status?room=gone")).await;
    assert_eq!(body["status"], "not_found");

    let (status, _) = send(&state, get("/api/collections/status")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_looks_up_mock_accounts() {
    let state = state(true);
    let (status, body) = send(
        &state,
        post(
            "/api/collections/verify",
            json!({"lastFourSSN": "1234", "dateOfBirth": "1980-01-01"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);
    assert_eq!(body["account"]["accountNumber"], "ACC-001234");
    assert_eq!(body["account"]["balance"], 2500.0);

    let request = post("/api/collections/verify", json!({"lastFourSSN": "1234"}));
    let (status, _) = send(&state, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &state,
        post("/api/collections/verify", json!({"accountNumber": "0000", "dateOfBirth": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Account not found");
}

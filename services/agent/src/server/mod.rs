//! Hosted mode: the HTTP API and the caller websocket, backed by an
//! in-process room registry with one agent worker per room.

pub mod accounts;
pub mod rooms;
pub mod routes;
pub mod token;
pub mod ws;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use collections_core::{AgentKind, Prompts};
use secrecy::ExposeSecret;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::worker::{self, Connect, JOIN_TIMEOUT, OpenAiConnect};
use rooms::{RoomError, RoomInfo, RoomRegistry};
use token::{TokenError, TokenIssuer};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<RoomError> for ApiError {
    fn from(e: RoomError) -> Self {
        match e {
            RoomError::NotFound(_) => ApiError::NotFound(e.to_string()),
            RoomError::AlreadyExists(_) | RoomError::Occupied(_) => {
                ApiError::Conflict(e.to_string())
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::NotConfigured => {
                ApiError::Internal("Voice service credentials not configured".to_string())
            }
            TokenError::Jwt(_) | TokenError::NoRoomJoin => ApiError::Unauthorized(e.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub rooms: RoomRegistry,
    pub prompts: Arc<Prompts>,
    pub tokens: Option<Arc<TokenIssuer>>,
    /// Base URL returned with tokens.
    pub service_url: String,
    pub connector: Arc<dyn Connect>,
    pub join_timeout: Duration,
}

impl AppState {
    pub fn new(config: Arc<Config>, prompts: Prompts) -> Self {
        let tokens = match (&config.voice_api_key, &config.voice_api_secret) {
            (Some(key), Some(secret)) => {
                Some(Arc::new(TokenIssuer::new(key, secret.expose_secret())))
            }
            _ => {
                tracing::warn!("VOICE_API_KEY/VOICE_API_SECRET not set, token issuing disabled");
                None
            }
        };
        Self {
            rooms: RoomRegistry::new(),
            prompts: Arc::new(prompts),
            tokens,
            service_url: config.voice_service_url.clone(),
            connector: Arc::new(OpenAiConnect::new(config)),
            join_timeout: JOIN_TIMEOUT,
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn Connect>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_tokens(mut self, tokens: TokenIssuer) -> Self {
        self.tokens = Some(Arc::new(tokens));
        self
    }

    pub fn tokens(&self) -> Result<&TokenIssuer, TokenError> {
        self.tokens.as_deref().ok_or(TokenError::NotConfigured)
    }

    /// Creates the room and starts its agent worker.
    pub fn open_room(
        &self,
        name: &str,
        kind: AgentKind,
        metadata: Option<String>,
    ) -> Result<RoomInfo, RoomError> {
        let pending = self.rooms.create(name, kind, metadata, Utc::now())?;
        let info = pending.info.clone();
        worker::spawn_agent(
            self.rooms.clone(),
            self.prompts.clone(),
            self.connector.clone(),
            pending,
            self.join_timeout,
        );
        Ok(info)
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/token", post(routes::create_token))
        .route("/api/collections/initiate-call", post(routes::initiate_call))
        .route("/api/collections/status", get(routes::call_status))
        .route("/api/collections/verify", post(routes::verify_account))
        .route("/ws", get(ws::ws_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(config: Arc<Config>, prompts: Prompts) -> anyhow::Result<()> {
    let addr = config.bind_address;
    let app = router(AppState::new(config, prompts));

    tracing::info!("Starting voice agent server, listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

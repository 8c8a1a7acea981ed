//! HTTP surface.
//!
//! # Routes
//!
//! - `GET    /`                          browser page
//! - `GET    /health`                    liveness plus enabled capabilities
//! - `POST   /api/respond`               stateless reply, always 200
//! - `POST   /api/sessions`              start a session
//! - `GET    /api/sessions/:id`          session snapshot
//! - `DELETE /api/sessions/:id`          end a session
//! - `POST   /api/sessions/:id/messages` reply and record the exchange
//! - `POST   /api/sessions/:id/moods`    log a mood rating
//! - `POST   /api/sessions/:id/reset`    clear history and moods

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{FromRequest, FromRequestParts, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{
    ErrorBody, HealthResponse, MessageRequest, MessageResponse, MoodRequest, RespondRequest,
    RespondResponse,
};
use crate::responder::Responder;
use crate::session::{SessionSnapshot, SessionStore};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Largest `/api/respond` body that is read; anything bigger is an empty message.
pub const MAX_RESPOND_BODY_BYTES: usize = 64 * 1024;

/// JSON body whose rejections are reported as `AppError`.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
struct AppJson<T>(T);

/// Path parameters whose rejections are reported as `AppError`.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
struct AppPath<T>(T);

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<Responder>,
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl AppState {
    pub fn new(responder: Responder, sessions: SessionStore) -> Self {
        Self {
            responder: Arc::new(responder),
            sessions: Arc::new(Mutex::new(sessions)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/respond", post(respond_handler))
        .route("/api/sessions", post(create_session_handler))
        .route(
            "/api/sessions/:id",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/api/sessions/:id/messages", post(message_handler))
        .route("/api/sessions/:id/moods", post(mood_handler))
        .route("/api/sessions/:id/reset", post(reset_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let sessions = state.sessions.lock().await.len();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        capabilities: state.responder.capabilities(),
        sessions,
    })
}

/// POST /api/respond
///
/// The body is parsed leniently: anything that is not `{"text": string}`, or
/// is larger than `MAX_RESPOND_BODY_BYTES`, is treated as an empty message, so
/// the caller always gets a reply.
async fn respond_handler(State(state): State<AppState>, body: Body) -> Json<RespondResponse> {
    let request: RespondRequest = match to_bytes(body, MAX_RESPOND_BODY_BYTES).await {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!("Unreadable /api/respond body, treating as empty: {}", e);
            RespondRequest::default()
        }),
        Err(e) => {
            warn!("Oversized /api/respond body, treating as empty: {}", e);
            RespondRequest::default()
        }
    };

    let reply = state.responder.respond(&request.text).await;
    Json(RespondResponse {
        response: reply.text,
    })
}

/// POST /api/sessions
async fn create_session_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let snapshot = state.sessions.lock().await.create();
    info!("Session {} started", snapshot.id);
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/sessions/:id
async fn get_session_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let mut sessions = state.sessions.lock().await;
    Ok(Json(sessions.get(&id)?.snapshot()))
}

/// DELETE /api/sessions/:id
async fn delete_session_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.lock().await.destroy(&id)?;
    info!("Session {} ended", id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/:id/messages
async fn message_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<MessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    request.validate()?;

    // Fail fast on unknown sessions; the lock is not held while generating.
    state.sessions.lock().await.get(&id)?;

    let reply = state.responder.respond(&request.text).await;

    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(&id)?;
    session.record_exchange(&request.text, &reply.text);

    Ok(Json(MessageResponse {
        response: reply.text,
        topic: reply.topic,
        source: reply.source,
        session: session.snapshot(),
    }))
}

/// POST /api/sessions/:id/moods
async fn mood_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<MoodRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    request.validate()?;

    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(&id)?;
    session.log_mood(request.mood)?;
    Ok(Json(session.snapshot()))
}

/// POST /api/sessions/:id/reset
async fn reset_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(&id)?;
    session.reset();
    Ok(Json(session.snapshot()))
}

//! API Routes
//!
//! - `POST /api/chat`  — one chat-driven trade request
//! - `GET  /api/state` — last committed portfolio + history
//! - `POST /api/reset` — restore defaults, clear history, persist
//! - `GET  /live`      — liveness probe
//! - `GET  /ready`     — readiness probe: 503 during graceful shutdown or
//!   when the persistence store / inference endpoint report unhealthy
//!
//! Oracle/parse failures never surface here (the actor degrades them to a
//! logged HOLD); only persistence failures map to HTTP 500, so a client
//! error response always means the mutation did not commit.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::error;

use crate::ports::oracle::Oracle;
use crate::ports::repository::LedgerRepository;
use crate::usecases::actor::LedgerActor;

/// Shared router state: the actor plus the readiness flag.
pub struct AppState<R: LedgerRepository, O: Oracle> {
    pub actor: Arc<LedgerActor<R, O>>,
    pub ready: watch::Receiver<bool>,
}

// Manual impl: `derive(Clone)` would wrongly require `R: Clone, O: Clone`.
impl<R: LedgerRepository, O: Oracle> Clone for AppState<R, O> {
    fn clone(&self) -> Self {
        Self {
            actor: Arc::clone(&self.actor),
            ready: self.ready.clone(),
        }
    }
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
}

/// Persistence failure surfaced to the client.
struct ApiError(anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{:#}", self.0) })),
        )
            .into_response()
    }
}

/// Build the application router.
pub fn router<R: LedgerRepository, O: Oracle>(state: AppState<R, O>) -> Router {
    Router::new()
        .route("/api/chat", post(chat::<R, O>))
        .route("/api/state", get(ledger_state::<R, O>))
        .route("/api/reset", post(reset::<R, O>))
        .route("/live", get(|| async { StatusCode::OK }))
        .route("/ready", get(ready::<R, O>))
        .with_state(state)
}

async fn chat<R: LedgerRepository, O: Oracle>(
    State(state): State<AppState<R, O>>,
    Json(body): Json<ChatBody>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.actor.chat(&body.message).await?;
    Ok(Json(outcome))
}

async fn ledger_state<R: LedgerRepository, O: Oracle>(
    State(state): State<AppState<R, O>>,
) -> impl IntoResponse {
    Json(state.actor.snapshot().await)
}

async fn reset<R: LedgerRepository, O: Oracle>(
    State(state): State<AppState<R, O>>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.actor.reset().await?;
    Ok(Json(snapshot))
}

async fn ready<R: LedgerRepository, O: Oracle>(
    State(state): State<AppState<R, O>>,
) -> StatusCode {
    // Copy the flag out before awaiting: the watch borrow guard is !Send.
    let accepting = *state.ready.borrow();
    if accepting && state.actor.is_healthy().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

//! `POST /mrt/register_subscriber` (§6).

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use mrt_common::protocol::RegisterSubscriberRequest;

use crate::api::error::ApiError;
use crate::orchestrator;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/register_subscriber", post(register_subscriber))
}

async fn register_subscriber(
    State(state): State<AppState>,
    Json(body): Json<RegisterSubscriberRequest>,
) -> Result<StatusCode, ApiError> {
    orchestrator::register_subscriber(&state, body).await?;
    Ok(StatusCode::OK)
}

//! `POST /mrt/register_flow` (§6).

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use mrt_common::protocol::{RegisterFlowRequest, RegisterFlowResponse};

use crate::api::error::ApiError;
use crate::orchestrator;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/register_flow", post(register_flow))
}

async fn register_flow(
    State(state): State<AppState>,
    Json(body): Json<RegisterFlowRequest>,
) -> Result<(StatusCode, Json<RegisterFlowResponse>), ApiError> {
    let resp = orchestrator::register_flow(&state, body).await?;
    Ok((StatusCode::OK, Json(resp)))
}

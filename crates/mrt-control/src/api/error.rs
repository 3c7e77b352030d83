//! REST error mapping (§7): validation -> 400, infeasibility -> 503,
//! data-plane -> 500. Grounded on `strata-control::api::auth::ApiError`'s
//! status-carrying struct + `IntoResponse` impl, the one piece of that
//! module with a counterpart in this spec.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use mrt_common::MrtError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<MrtError> for ApiError {
    fn from(err: MrtError) -> Self {
        let status = match &err {
            MrtError::Validation(_) => StatusCode::BAD_REQUEST,
            MrtError::Infeasible(_) => StatusCode::SERVICE_UNAVAILABLE,
            MrtError::DataPlane(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

//! Northbound REST route tree (§6): `/mrt/register_flow`,
//! `/mrt/register_subscriber`.

pub mod error;
pub mod flows;
pub mod subscribers;

use axum::Router;

use crate::state::AppState;

/// Build the `/mrt` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(flows::router())
        .merge(subscribers::router())
}

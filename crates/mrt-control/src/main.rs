//! MRT-MQTT Control Plane
//!
//! Single binary that runs:
//! - REST API for flow registration and subscriber join (§6)
//! - The network monitor loop (C7, §4.7)
//! - The MSDP peer acceptor (§6)

mod api;
mod orchestrator;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use mrt_common::config::Config;
use mrt_dataplane::{DataPlaneProgrammer, LoggingProgrammer};
use mrt_monitor::{IcmpProbe, Probe, SimulationProbe};
use mrt_topology::OfDbHandle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ─────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────
    let config = Config::from_env();

    // ── Shared state ────────────────────────────────────────────
    let of_db = OfDbHandle::new();
    let dataplane: Arc<dyn DataPlaneProgrammer> = Arc::new(LoggingProgrammer::new());
    let state = state::AppState::new(of_db.clone(), dataplane, config.clone());

    // ── Network monitor (C7) ────────────────────────────────────
    {
        let of_db = of_db.clone();
        let interval = Duration::from_secs(config.monitor_interval_secs);
        let probe: Box<dyn Probe> = if config.monitor_simulation_mode {
            Box::new(SimulationProbe)
        } else {
            Box::new(IcmpProbe)
        };
        tokio::spawn(async move {
            mrt_monitor::run_monitor_loop(of_db, probe, interval).await;
        });
    }

    // ── MSDP peer acceptor (§6) ─────────────────────────────────
    {
        let msdp_addr: SocketAddr = format!("0.0.0.0:{}", config.msdp_port).parse()?;
        let listener = tokio::net::TcpListener::bind(msdp_addr).await?;
        let sources = state.msdp_sources().clone();
        tracing::info!(addr = %msdp_addr, "msdp peer listener bound");
        tokio::spawn(async move {
            mrt_msdp::run_listener(listener, sources).await;
        });
    }

    // ── Router ──────────────────────────────────────────────────
    let app = Router::new()
        .nest("/mrt", api::router())
        .route("/healthz", axum::routing::get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // ── Listen ──────────────────────────────────────────────────
    let addr: SocketAddr = config.listen_addr.parse()?;

    tracing::info!("mrt-control listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

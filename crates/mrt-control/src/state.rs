//! Shared application state.
//!
//! Grounded on `strata-control::state::AppState`'s `Arc<Inner>` pattern,
//! replacing the Postgres pool and JWT context it wraps with the pieces this
//! control plane actually needs: the OF-DB handle, a data-plane programmer,
//! the routing/admission engines, and the MSDP source table.

use std::sync::Arc;

use mrt_common::config::Config;
use mrt_dataplane::DataPlaneProgrammer;
use mrt_routing::RoutingEngine;
use mrt_schedulability::AdmissionController;
use mrt_topology::OfDbHandle;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    of_db: OfDbHandle,
    dataplane: Arc<dyn DataPlaneProgrammer>,
    routing: RoutingEngine,
    admission: AdmissionController,
    msdp_sources: mrt_msdp::SourceTable,
    config: Config,
}

impl AppState {
    pub fn new(of_db: OfDbHandle, dataplane: Arc<dyn DataPlaneProgrammer>, config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                of_db,
                dataplane,
                routing: RoutingEngine::new(),
                admission: AdmissionController,
                msdp_sources: mrt_msdp::SourceTable::new(),
                config,
            }),
        }
    }

    pub fn of_db(&self) -> &OfDbHandle {
        &self.inner.of_db
    }

    pub fn dataplane(&self) -> &Arc<dyn DataPlaneProgrammer> {
        &self.inner.dataplane
    }

    pub fn routing(&self) -> &RoutingEngine {
        &self.inner.routing
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.inner.admission
    }

    pub fn msdp_sources(&self) -> &mrt_msdp::SourceTable {
        &self.inner.msdp_sources
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}

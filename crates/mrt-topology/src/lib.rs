//! OF-DB (C1, §4.1): in-memory topology + flow registry.
//!
//! A process-wide, single-writer registry behind one exclusive lock,
//! grounded on `strata-control::state::AppState`'s `Arc<Inner>` pattern but
//! using a single `tokio::sync::Mutex` instead of per-field `DashMap`s,
//! because §5 requires admission + routing + commit for one flow to run
//! under the lock held across the *whole* sequence — a guarantee sharded
//! concurrent maps can't provide.

mod db;

pub use db::{LinkKey, OfDb};

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Handle to the shared OF-DB. Cheap to clone; every clone shares the same
/// underlying lock. Pass explicitly to the orchestrator, monitor, and MSDP
/// tasks rather than reaching for a `static`/`OnceLock` (§9 Design Note).
#[derive(Clone)]
pub struct OfDbHandle(Arc<Mutex<OfDb>>);

impl OfDbHandle {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(OfDb::new())))
    }

    /// Acquire the exclusive lock for a whole read-modify-write sequence
    /// (e.g. admission + routing + commit for one flow registration, §5).
    pub async fn lock(&self) -> MutexGuard<'_, OfDb> {
        self.0.lock().await
    }
}

impl Default for OfDbHandle {
    fn default() -> Self {
        Self::new()
    }
}

//! Error taxonomy (§7).
//!
//! Three surfaced variants correspond to the three error classes that reach
//! a caller as a value rather than a panic: malformed input, a decision the
//! system correctly refuses, and a data-plane primitive that failed.
//! Probe errors and MSDP errors are deliberately absent — per §7 they never
//! propagate, they degrade to sentinel values or get logged and dropped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MrtError {
    /// Malformed REST body, missing/non-parseable MQTT user properties. Maps to HTTP 400.
    #[error("validation error: {0}")]
    Validation(String),

    /// Admission rejection, no path, no valid destinations. Maps to HTTP 503.
    #[error("infeasible: {0}")]
    Infeasible(String),

    /// A data-plane programmer call failed on one or more switches.
    #[error("data-plane error: {0}")]
    DataPlane(String),
}

impl MrtError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn infeasible(msg: impl Into<String>) -> Self {
        Self::Infeasible(msg.into())
    }

    pub fn data_plane(msg: impl Into<String>) -> Self {
        Self::DataPlane(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MrtError>;

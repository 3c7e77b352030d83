//! Shared types for the MRT-MQTT control plane.
//!
//! This crate contains:
//! - **Data model** (§3) — `Switch`, `Link`, `RtAttributes`, subscriber records
//! - **Error taxonomy** (§7) — the `Error` enum surfaced at every module boundary
//! - **Protocol messages** (§6) — REST request/response bodies and the MSDP wire message
//! - **Flow-descriptor parsing** (§6) — MQTT v5 user-property → `RtAttributes`
//! - **Configuration** — environment-driven `Config`, generalizing the source's ad-hoc env reads
//! - **ID allocation** — deterministic multicast group id assignment (§4.5, §9)

pub mod config;
pub mod error;
pub mod flow_descriptor;
pub mod ids;
pub mod model;
pub mod protocol;

pub use error::{MrtError, Result};
pub use model::{Link, RtAttributes, Switch};

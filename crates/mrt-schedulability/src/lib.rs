//! Schedulability Analyzer (C3) and Admission Controller (C4), §4.3–4.4.
//!
//! Grounded on `original_source/schedulability/analysis.py`. Both WCRT
//! methods share one capability per the Design Note in §9 ("polymorphic
//! analyzer... model as two implementations of one capability"): the
//! [`WcrtMethod`] trait.

mod admission;
mod holistic;
mod interference;
mod trajectory;

pub use admission::{AdmissionController, AdmissionDecision};
pub use holistic::HolisticApproach;
pub use interference::interfering_flows;
pub use trajectory::TrajectoryApproach;

use mrt_common::model::RtAttributes;

/// A WCRT bound, as a pure function of `(flow, candidate set)` — no OF-DB
/// access, no mutation (§4.3: "Both methods are pure functions of (f, F)").
pub trait WcrtMethod {
    fn wcrt(&self, flow: &RtAttributes, all_flows: &[RtAttributes]) -> f64;
}

//! Admission Controller (C4, §4.4): admits a candidate flow only if it and
//! every already-admitted flow remain schedulable under TA.

use mrt_common::model::RtAttributes;

use crate::trajectory::TrajectoryApproach;
use crate::WcrtMethod;

/// Outcome of an admission check, carrying enough detail to log the
/// offending flow and its bound (§4.4: "Rejections are logged with the
/// offending flow id and its bound").
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionDecision {
    Admit,
    Reject { offending_flow: String, wcrt_ms: f64, deadline_ms: f64 },
}

impl AdmissionDecision {
    pub fn is_admit(&self) -> bool {
        matches!(self, AdmissionDecision::Admit)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AdmissionController;

impl AdmissionController {
    /// TA is used for admission (tighter bound than HA, per §4.4); HA is
    /// exposed separately for diagnostics only.
    pub fn check_admissibility(&self, candidate: &RtAttributes, admitted: &[RtAttributes]) -> AdmissionDecision {
        let mut candidate_set: Vec<RtAttributes> = admitted.to_vec();
        candidate_set.push(candidate.clone());

        let wcrt_new = TrajectoryApproach.wcrt(candidate, &candidate_set);
        if wcrt_new > candidate.di {
            tracing::warn!(flow = %candidate.ft_i, wcrt_ms = wcrt_new, deadline_ms = candidate.di, "admission rejected: candidate misses its own deadline");
            return AdmissionDecision::Reject {
                offending_flow: candidate.ft_i.clone(),
                wcrt_ms: wcrt_new,
                deadline_ms: candidate.di,
            };
        }

        for flow in admitted {
            let wcrt = TrajectoryApproach.wcrt(flow, &candidate_set);
            if wcrt > flow.di {
                tracing::warn!(
                    candidate = %candidate.ft_i,
                    violated_flow = %flow.ft_i,
                    wcrt_ms = wcrt,
                    deadline_ms = flow.di,
                    "admission rejected: candidate would violate an already-admitted flow"
                );
                return AdmissionDecision::Reject {
                    offending_flow: flow.ft_i.clone(),
                    wcrt_ms: wcrt,
                    deadline_ms: flow.di,
                };
            }
        }

        tracing::info!(flow = %candidate.ft_i, wcrt_ms = wcrt_new, deadline_ms = candidate.di, "admission accepted");
        AdmissionDecision::Admit
    }
}

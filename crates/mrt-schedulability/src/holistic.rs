//! Holistic Approach (HA) WCRT analysis (§4.3): a conservative global fixed
//! point over one globalized interferer set per flow.

use mrt_common::model::RtAttributes;

use crate::interference::interfering_flows;
use crate::WcrtMethod;

const EPSILON_MS: f64 = 1e-3;

#[derive(Debug, Default, Clone, Copy)]
pub struct HolisticApproach;

impl WcrtMethod for HolisticApproach {
    /// `w_{k+1} = static + ci + jitter_sum + Σ_g ⌈(w_k + J_g)/ti(g)⌉·ci(g)`,
    /// converging when `|w_{k+1} - w_k| < 1e-3`, with an early exit (§4.3)
    /// returning the last computed `w` the moment it exceeds `di(f)`.
    fn wcrt(&self, flow: &RtAttributes, all_flows: &[RtAttributes]) -> f64 {
        let mut static_delay = flow.processing_delay;
        let mut jitter_sum = 0.0;
        for link in &flow.route_links {
            static_delay += link.transmission_delay_ms(flow.ci);
            static_delay += link.prop_delay + link.switch_delay + link.proc_delay + link.queuing_delay;
            jitter_sum += link.jitter;
        }

        // One globalized interferer set across the whole path (§4.3: "I =
        // ⋃ interferers(ℓ, f)"), deduplicated by topic.
        let mut interferers: Vec<&RtAttributes> = Vec::new();
        for link in &flow.route_links {
            for g in interfering_flows(link, flow, all_flows) {
                if !interferers.iter().any(|f| f.ft_i == g.ft_i) {
                    interferers.push(g);
                }
            }
        }

        let mut w = static_delay + flow.ci;
        let mut prev_w = 0.0_f64;

        while (w - prev_w).abs() > EPSILON_MS {
            if w > flow.di {
                return w;
            }
            prev_w = w;
            let interference: f64 = interferers
                .iter()
                .map(|g| ((prev_w + g.measured_jitter) / g.ti).ceil() * g.ci)
                .sum();
            w = static_delay + flow.ci + interference + jitter_sum;
        }

        w
    }
}

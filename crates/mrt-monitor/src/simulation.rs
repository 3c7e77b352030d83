//! [`SimulationProbe`]: the default probe mode, grounded on
//! `original_source/simulation/monitor.py`'s `_get_latency`.

use mrt_common::model::Link;
use rand::Rng;

use crate::Probe;

const BASE_DELAY_MS: f64 = 5.0;

/// `base + U(-0.5, 0.5) + 2·u` ms, where `u` is link utilization (§4.7).
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulationProbe;

impl Probe for SimulationProbe {
    fn measure(&self, link: &Link) -> f64 {
        let noise = rand::rng().random_range(-0.5..=0.5);
        BASE_DELAY_MS + noise + 2.0 * link.utilization()
    }
}

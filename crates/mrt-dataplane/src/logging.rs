//! [`LoggingProgrammer`]: a `tracing`-backed stand-in for a real OpenFlow
//! switch driver. Emits a structured event per primitive instead of a wire
//! message, and tracks what it has "installed" so repeat calls are visibly
//! idempotent — useful both as a development driver and as the seam tests
//! assert against.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::{DataPlaneProgrammer, FlowMatch};

#[derive(Default)]
pub struct LoggingProgrammer {
    table_miss: Mutex<HashSet<u64>>,
    meters: Mutex<HashSet<(u64, u32)>>,
    groups: Mutex<HashSet<(u64, u32)>>,
    flows: Mutex<HashSet<(u64, u32)>>,
}

impl LoggingProgrammer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn meter_count(&self) -> usize {
        self.meters.lock().expect("dataplane lock poisoned").len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.lock().expect("dataplane lock poisoned").len()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.lock().expect("dataplane lock poisoned").len()
    }
}

impl DataPlaneProgrammer for LoggingProgrammer {
    fn install_table_miss(&self, dpid: u64) {
        let mut seen = self.table_miss.lock().expect("dataplane lock poisoned");
        if seen.insert(dpid) {
            tracing::info!(dpid, "install table-miss (priority 0 -> controller)");
        } else {
            tracing::debug!(dpid, "table-miss already installed, no-op");
        }
    }

    fn install_meter(&self, dpid: u64, meter_id: u32, bw_mbps: f64) {
        let rate_kbps = (bw_mbps * 1000.0) as u64;
        let mut seen = self.meters.lock().expect("dataplane lock poisoned");
        if seen.insert((dpid, meter_id)) {
            tracing::info!(dpid, meter_id, rate_kbps, "install meter (drop band, burst 0)");
        } else {
            tracing::debug!(dpid, meter_id, rate_kbps, "meter already installed, re-applying rate");
        }
    }

    fn install_multicast_group(&self, dpid: u64, group_id: u32, out_ports: &[u16]) {
        let mut seen = self.groups.lock().expect("dataplane lock poisoned");
        if seen.insert((dpid, group_id)) {
            tracing::info!(dpid, group_id, ?out_ports, "install multicast group (type ALL)");
        } else {
            tracing::debug!(dpid, group_id, ?out_ports, "group already installed, re-applying buckets");
        }
    }

    fn install_flow(&self, dpid: u64, priority: i64, flow_match: FlowMatch, group_id: u32, meter_id: Option<u32>) {
        let mut seen = self.flows.lock().expect("dataplane lock poisoned");
        if seen.insert((dpid, group_id)) {
            tracing::info!(dpid, priority, ipv4_dst = %flow_match.ipv4_dst, group_id, ?meter_id, "install flow rule -> group");
        } else {
            tracing::debug!(dpid, priority, ipv4_dst = %flow_match.ipv4_dst, group_id, ?meter_id, "flow rule already installed, no-op");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_install_is_idempotent_in_effect() {
        let programmer = LoggingProgrammer::new();
        programmer.install_meter(1, 42, 5.0);
        programmer.install_meter(1, 42, 5.0);
        assert_eq!(programmer.meter_count(), 1);

        programmer.install_multicast_group(1, 42, &[1, 2]);
        programmer.install_multicast_group(1, 42, &[1, 2]);
        assert_eq!(programmer.group_count(), 1);

        programmer.install_flow(1, 110, FlowMatch::ipv4("224.0.0.1"), 42, Some(42));
        programmer.install_flow(1, 110, FlowMatch::ipv4("224.0.0.1"), 42, Some(42));
        assert_eq!(programmer.flow_count(), 1);
    }

    #[test]
    fn distinct_switches_each_get_their_own_entries() {
        let programmer = LoggingProgrammer::new();
        programmer.install_meter(1, 42, 5.0);
        programmer.install_meter(2, 42, 5.0);
        assert_eq!(programmer.meter_count(), 2);
    }
}

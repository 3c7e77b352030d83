//! Data model (§3): `Switch`, `Link`, `RtAttributes`, subscriber records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A switch, identified by a numeric dpid. Created when first observed,
/// destroyed on disconnect (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    pub dpid: u64,
    pub mgmt_addr: Option<String>,
    pub ports: BTreeSet<u16>,
}

impl Switch {
    pub fn new(dpid: u64) -> Self {
        Self {
            dpid,
            mgmt_addr: None,
            ports: BTreeSet::new(),
        }
    }
}

/// A directed edge `src -> dst` on `port_out` (egress of `src`). All delay
/// fields are milliseconds unless stated (§3).
///
/// Node identifiers are strings per the Design Note in §9: the topology
/// graph unifies switch dpids and host IPs as strings; conversion to a
/// numeric dpid happens only at the data-plane boundary (`mrt-dataplane`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub src: String,
    pub dst: String,
    pub port_out: u16,
    pub prop_delay: f64,
    pub switch_delay: f64,
    pub proc_delay: f64,
    pub queuing_delay: f64,
    pub jitter: f64,
    pub bw_capacity: f64,
    pub bw_used: f64,
}

impl Link {
    pub fn new(src: impl Into<String>, dst: impl Into<String>, port_out: u16) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            port_out,
            prop_delay: 0.0,
            switch_delay: 0.0,
            proc_delay: 0.0,
            queuing_delay: 0.0,
            jitter: 0.0,
            bw_capacity: 0.0,
            bw_used: 0.0,
        }
    }

    /// Key identifying this link in OF-DB: `(src_dpid, dst_dpid, port)`.
    pub fn key(&self) -> (String, String, u16) {
        (self.src.clone(), self.dst.clone(), self.port_out)
    }

    /// Link utilization, capped at 0.99 to avoid division by zero (§4.2).
    /// A link with no declared capacity is treated as fully congested.
    pub fn utilization(&self) -> f64 {
        if self.bw_capacity <= 0.0 {
            return 0.99;
        }
        (self.bw_used / self.bw_capacity).min(0.99)
    }

    /// Routing weight (§4.2 Eq 1): `(prop + switch + proc) / (1 - u)`.
    pub fn routing_weight(&self) -> f64 {
        let base = self.prop_delay + self.switch_delay + self.proc_delay;
        base / (1.0 - self.utilization())
    }

    /// Transmission delay for a payload of `ci` (ms) transmission time, in
    /// milliseconds. Unit convention resolved in SPEC_FULL.md §3: `ci` (ms)
    /// is treated as a byte count scaled by 1000 (mirroring the source's
    /// `get_transmission_delay(ci * 1000)` call), converted to bits, divided
    /// by link capacity in bits/s, then rescaled from seconds to ms.
    pub fn transmission_delay_ms(&self, ci_ms: f64) -> f64 {
        if self.bw_capacity <= 0.0 {
            return 0.0;
        }
        let payload_bits = ci_ms * 1000.0 * 8.0;
        let capacity_bits_per_sec = self.bw_capacity * 1.0e6;
        (payload_bits / capacity_bits_per_sec) * 1000.0
    }
}

/// A real-time flow (§3). Identity is the topic `ft_i`, which is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtAttributes {
    pub ft_i: String,
    /// QoS class: 0 = direct multicast, 1/2 = broker-mediated.
    pub qi: u8,
    /// Transmission / worst-case computation time per instance (ms).
    pub ci: f64,
    /// Priority; higher value = higher priority.
    pub pi: i64,
    /// Period (ms).
    pub ti: f64,
    /// Relative deadline (ms).
    pub di: f64,
    /// Minimum bandwidth (Mbps).
    pub bwi: f64,
    pub src_ip: String,
    pub dst_ips: Vec<String>,
    pub broker_ips: Vec<String>,
    pub route_links: Vec<Link>,
    pub multicast_group_id: u32,
    /// Broker residency time to add when `qi > 0`.
    pub processing_delay: f64,
    /// Observed per-instance release jitter of this flow.
    pub measured_jitter: f64,
}

impl RtAttributes {
    /// Destinations with duplicates removed, preserving first-seen order
    /// (invariant 9 in §8: duplicate destinations are treated as one).
    pub fn unique_dst_ips(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.dst_ips
            .iter()
            .filter(|ip| seen.insert((*ip).clone()))
            .cloned()
            .collect()
    }

    /// Append a destination if not already present.
    pub fn add_destination(&mut self, ip: impl Into<String>) {
        let ip = ip.into();
        if !self.dst_ips.contains(&ip) {
            self.dst_ips.push(ip);
        }
    }

    /// Append a broker if not already present.
    pub fn add_broker(&mut self, ip: impl Into<String>) {
        let ip = ip.into();
        if !self.broker_ips.contains(&ip) {
            self.broker_ips.push(ip);
        }
    }
}

/// A (topic, subscriber_ip) pair (§3). Added on monitor callback; triggers
/// a graft in the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberRecord {
    pub topic: String,
    pub subscriber_ip: String,
}

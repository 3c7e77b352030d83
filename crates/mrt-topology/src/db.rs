//! The OF-DB registry itself (§4.1): four mappings, no persistence.

use std::collections::{HashMap, HashSet};

use mrt_common::model::{Link, RtAttributes, Switch};

pub type LinkKey = (String, String, u16);

/// Switches, links, admitted flows, and per-topic subscriber sets.
///
/// Duplicate switch/link keys replace the previous entry; missing keys
/// return an absent marker (`None`/empty), never an error (§4.1).
#[derive(Debug, Default)]
pub struct OfDb {
    switches: HashMap<u64, Switch>,
    links: HashMap<LinkKey, Link>,
    flows: HashMap<String, RtAttributes>,
    subscribers: HashMap<String, HashSet<String>>,
}

impl OfDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Switches ──────────────────────────────────────────────────

    pub fn add_switch(&mut self, switch: Switch) {
        self.switches.insert(switch.dpid, switch);
    }

    pub fn remove_switch(&mut self, dpid: u64) -> Option<Switch> {
        self.switches.remove(&dpid)
    }

    pub fn get_switch(&self, dpid: u64) -> Option<&Switch> {
        self.switches.get(&dpid)
    }

    pub fn list_switches(&self) -> impl Iterator<Item = &Switch> {
        self.switches.values()
    }

    // ── Links ─────────────────────────────────────────────────────

    pub fn add_link(&mut self, link: Link) {
        self.links.insert(link.key(), link);
    }

    pub fn remove_link(&mut self, key: &LinkKey) -> Option<Link> {
        self.links.remove(key)
    }

    pub fn get_link(&self, key: &LinkKey) -> Option<&Link> {
        self.links.get(key)
    }

    pub fn get_link_mut(&mut self, key: &LinkKey) -> Option<&mut Link> {
        self.links.get_mut(key)
    }

    /// A consistent snapshot of all links, for the Routing Engine to build
    /// a graph from (§4.1, §4.2).
    pub fn snapshot_links(&self) -> Vec<Link> {
        self.links.values().cloned().collect()
    }

    /// Add `delta` Mbps to `bw_used` on the named link, if present.
    pub fn adjust_bandwidth(&mut self, key: &LinkKey, delta: f64) {
        if let Some(link) = self.links.get_mut(key) {
            link.bw_used = (link.bw_used + delta).max(0.0);
        }
    }

    // ── Flows ─────────────────────────────────────────────────────

    pub fn add_flow(&mut self, flow: RtAttributes) {
        self.flows.insert(flow.ft_i.clone(), flow);
    }

    /// Withdraws a flow (§9: data model supports it, no entry point calls
    /// it yet) and releases its bandwidth reservation on every link in its
    /// tree, keeping invariant 2 in §8 (`bw_used` = `Σ bwi` over admitted
    /// flows) intact across the removal.
    pub fn remove_flow(&mut self, topic: &str) -> Option<RtAttributes> {
        let flow = self.flows.remove(topic)?;
        for link in &flow.route_links {
            self.adjust_bandwidth(&link.key(), -flow.bwi);
        }
        Some(flow)
    }

    pub fn get_flow(&self, topic: &str) -> Option<&RtAttributes> {
        self.flows.get(topic)
    }

    pub fn get_flow_mut(&mut self, topic: &str) -> Option<&mut RtAttributes> {
        self.flows.get_mut(topic)
    }

    pub fn list_flows(&self) -> Vec<RtAttributes> {
        self.flows.values().cloned().collect()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    /// Every multicast group id currently assigned to an admitted flow —
    /// the "in use" set the allocator in `mrt_common::ids` must avoid.
    pub fn assigned_group_ids(&self) -> HashSet<u32> {
        self.flows
            .values()
            .map(|f| f.multicast_group_id)
            .filter(|&id| id != 0)
            .collect()
    }

    // ── Subscribers ───────────────────────────────────────────────

    /// Record a subscriber for `topic`. Returns `true` if this is a new
    /// subscriber (idempotence invariant 6 in §8: a repeat join is a no-op).
    pub fn add_subscriber(&mut self, topic: &str, subscriber_ip: impl Into<String>) -> bool {
        self.subscribers
            .entry(topic.to_string())
            .or_default()
            .insert(subscriber_ip.into())
    }

    pub fn list_subscribers(&self, topic: &str) -> Vec<String> {
        self.subscribers
            .get(topic)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

//! Routing Engine (C2, §4.2): delay-aware unicast shortest path, Steiner
//! multicast tree approximation, and rendezvous-point election.
//!
//! Grounded on `original_source/sdn_controller/routing.py`'s networkx
//! (`dijkstra_path` / `steinertree.steiner_tree`) implementation,
//! reimplemented over `petgraph`. The graph is rebuilt from a link
//! snapshot on every call (§4.2: "ensure freshness"), never cached.

mod graph;

use std::collections::HashSet;

use mrt_common::model::Link;

pub use graph::RoutingGraph;

/// Stateless routing engine — all state lives in the `Link` snapshot passed
/// to each call, matching the source's `_build_graph()`-per-call design.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoutingEngine;

impl RoutingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Unicast shortest path from `src` to `dst` (§4.2). Empty if either
    /// endpoint is absent from the topology, if `dst == src`, or if no
    /// path exists — never an error (edge cases in §4.2).
    pub fn unicast_path(&self, links: &[Link], src: &str, dst: &str) -> Vec<Link> {
        if src == dst {
            return Vec::new();
        }
        let g = RoutingGraph::build(links);
        g.shortest_path(src, dst).unwrap_or_default()
    }

    /// Multicast tree covering `dsts` from `src` (§4.2). Terminals are
    /// `{src} ∪ dsts`, duplicates collapsed (invariant 9 in §8). Attempts a
    /// Steiner-tree approximation; falls back to the deduplicated union of
    /// unicast Dijkstra paths if the approximation cannot connect every
    /// terminal (best-effort coverage, §4.2).
    pub fn multicast_tree(&self, links: &[Link], src: &str, dsts: &[String]) -> Vec<Link> {
        let g = RoutingGraph::build(links);

        let mut seen = HashSet::new();
        let valid_dsts: Vec<String> = dsts
            .iter()
            .filter(|d| *d != src && seen.insert((*d).clone()))
            .cloned()
            .collect();

        if valid_dsts.is_empty() {
            return Vec::new();
        }
        if valid_dsts.len() == 1 {
            return g.shortest_path(src, &valid_dsts[0]).unwrap_or_default();
        }

        match g.steiner_tree(src, &valid_dsts) {
            Some(links) => links,
            None => {
                tracing::debug!(src, ?valid_dsts, "steiner tree approximation failed, falling back to union of unicast paths");
                let mut union: Vec<Link> = Vec::new();
                for dst in &valid_dsts {
                    if let Some(path) = g.shortest_path(src, dst) {
                        for link in path {
                            if !union.iter().any(|l| l.key() == link.key()) {
                                union.push(link);
                            }
                        }
                    }
                }
                union
            }
        }
    }

    /// Rendezvous-point election (§4.2): the node minimizing the worst-case
    /// (max) distance to every subscriber, ties broken by lowest node id.
    pub fn select_rendezvous_point(&self, links: &[Link], subscribers: &[String]) -> Option<String> {
        let g = RoutingGraph::build(links);
        g.min_max_eccentricity(subscribers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Vec<Link> {
        let mut links = vec![
            Link::new("1", "2", 1),
            Link::new("1", "3", 2),
            Link::new("2", "4", 1),
            Link::new("3", "4", 1),
        ];
        for l in &mut links {
            l.prop_delay = 5.0;
            l.bw_capacity = 100.0;
        }
        links
    }

    #[test]
    fn s1_unicast_tie_break_prefers_lowest_second_node_id() {
        let engine = RoutingEngine::new();
        let path = engine.unicast_path(&diamond(), "1", "4");
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].dst, "2");
        assert_eq!(path[1].dst, "4");
    }

    #[test]
    fn unicast_same_src_dst_is_empty() {
        let engine = RoutingEngine::new();
        assert!(engine.unicast_path(&diamond(), "1", "1").is_empty());
    }

    #[test]
    fn unicast_missing_node_is_empty() {
        let engine = RoutingEngine::new();
        assert!(engine.unicast_path(&diamond(), "1", "99").is_empty());
    }

    #[test]
    fn tie_break_is_numeric_not_lexicographic_past_single_digits() {
        // Two equal-cost next hops out of "1": "2" and "10". Plain string
        // order would pick "10" (since "10" < "2" lexicographically); the
        // numeric-aware tie-break must pick "2".
        let mut links = vec![Link::new("1", "2", 1), Link::new("1", "10", 2), Link::new("2", "4", 1), Link::new("10", "4", 1)];
        for l in &mut links {
            l.prop_delay = 5.0;
            l.bw_capacity = 100.0;
        }
        let engine = RoutingEngine::new();
        let path = engine.unicast_path(&links, "1", "4");
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].dst, "2", "numeric tie-break must prefer next-hop 2 over 10");
    }

    #[test]
    fn s3_rendezvous_point_tie_break_lowest_id() {
        // Triangle 1-2-3, equal weights.
        let mut links = vec![Link::new("1", "2", 1), Link::new("2", "3", 1), Link::new("1", "3", 2)];
        for l in &mut links {
            l.prop_delay = 1.0;
            l.bw_capacity = 100.0;
        }
        let engine = RoutingEngine::new();
        let rp = engine.select_rendezvous_point(&links, &["2".to_string(), "3".to_string()]);
        assert_eq!(rp.as_deref(), Some("1"));
    }

    #[test]
    fn rendezvous_point_election_filters_out_subscribers_absent_from_the_graph() {
        // Same triangle as s3, but one subscriber ip ("99") hasn't appeared
        // in any link yet — §4.2: filter absent nodes, elect over the rest,
        // only return empty if *none* remain.
        let mut links = vec![Link::new("1", "2", 1), Link::new("2", "3", 1), Link::new("1", "3", 2)];
        for l in &mut links {
            l.prop_delay = 1.0;
            l.bw_capacity = 100.0;
        }
        let engine = RoutingEngine::new();
        let rp = engine.select_rendezvous_point(&links, &["2".to_string(), "3".to_string(), "99".to_string()]);
        assert_eq!(rp.as_deref(), Some("1"), "election must proceed over the present subscribers");
    }

    #[test]
    fn rendezvous_point_election_is_empty_when_no_subscriber_is_present() {
        let engine = RoutingEngine::new();
        let rp = engine.select_rendezvous_point(&diamond(), &["not-a-node".to_string()]);
        assert!(rp.is_none());
    }

    #[test]
    fn s4_multicast_tree_on_diamond() {
        // Terminals {1,3,4}: the metric closure's MST connects 1-3 (5) and
        // 3-4 (5) rather than 1-3 and 1-2-4 (which the spec's own scenario
        // text flags with a "?" as an uncertain hand-derivation) — the KMB
        // approximation correctly prefers the cheaper two-edge tree. See
        // DESIGN.md for this deliberate departure from the hedged example.
        let engine = RoutingEngine::new();
        let tree = engine.multicast_tree(&diamond(), "1", &["3".to_string(), "4".to_string()]);
        let weight: f64 = tree.iter().map(|l| l.routing_weight()).sum();
        assert_eq!(tree.len(), 2);
        assert!((weight - 10.0).abs() < 1e-6);
    }

    #[test]
    fn duplicate_destinations_collapse_before_routing() {
        let engine = RoutingEngine::new();
        let a = engine.multicast_tree(&diamond(), "1", &["4".to_string()]);
        let b = engine.multicast_tree(&diamond(), "1", &["4".to_string(), "4".to_string()]);
        assert_eq!(a, b);
    }
}

//! Trajectory Approach (TA) WCRT analysis (§4.3): per-branch bound along
//! the flow's own committed path, taking the worst branch for multicast.
//!
//! Builds a directed graph from `route_links(f)` alone (not the network
//! topology) — grounded on `original_source/schedulability/analysis.py`'s
//! `_get_max_branch_wcrt`, which does the same with a throwaway `nx.DiGraph`
//! per call.

use std::collections::{HashMap, VecDeque};

use mrt_common::model::{Link, RtAttributes};

use crate::interference::interfering_flows;
use crate::WcrtMethod;

#[derive(Debug, Default, Clone, Copy)]
pub struct TrajectoryApproach;

impl WcrtMethod for TrajectoryApproach {
    /// `WCRT_TA = max over dst branches of (hw_delay + ci + Σ_ℓ
    /// Σ_{g∈interferers(ℓ,f)} ⌈di(f)/ti(g)⌉·ci(g))`, plus `processing_delay`
    /// when `qi(f) > 0` (§4.3). Uses `di(f)` as the interference window
    /// directly — no fixed point, unlike HA.
    fn wcrt(&self, flow: &RtAttributes, all_flows: &[RtAttributes]) -> f64 {
        let adjacency = build_adjacency(&flow.route_links);

        let mut max_branch = 0.0_f64;
        for dst in flow.unique_dst_ips() {
            let Some(path) = shortest_path(&adjacency, &flow.src_ip, &dst) else {
                continue;
            };
            let branch = path_wcrt(&path, flow, all_flows);
            if branch > max_branch {
                max_branch = branch;
            }
        }

        if flow.qi > 0 {
            max_branch += flow.processing_delay;
        }
        max_branch
    }
}

/// `node -> outgoing (neighbor, Link)` pairs, last link on a duplicate edge
/// wins (mirrors networkx `DiGraph.add_edge` overwrite semantics).
fn build_adjacency(links: &[Link]) -> HashMap<String, Vec<(String, Link)>> {
    let mut adjacency: HashMap<String, Vec<(String, Link)>> = HashMap::new();
    for link in links {
        let entry = adjacency.entry(link.src.clone()).or_default();
        if let Some(existing) = entry.iter_mut().find(|(dst, _)| *dst == link.dst) {
            existing.1 = link.clone();
        } else {
            entry.push((link.dst.clone(), link.clone()));
        }
    }
    adjacency
}

/// Unweighted shortest (fewest-hop) path by BFS, matching `nx.shortest_path`
/// with no `weight` argument.
fn shortest_path(adjacency: &HashMap<String, Vec<(String, Link)>>, src: &str, dst: &str) -> Option<Vec<Link>> {
    if src == dst {
        return Some(Vec::new());
    }
    let mut visited = std::collections::HashSet::new();
    let mut queue = VecDeque::new();
    let mut predecessor: HashMap<String, (String, Link)> = HashMap::new();

    visited.insert(src.to_string());
    queue.push_back(src.to_string());

    while let Some(u) = queue.pop_front() {
        let Some(neighbors) = adjacency.get(&u) else {
            continue;
        };
        for (v, link) in neighbors {
            if visited.insert(v.clone()) {
                predecessor.insert(v.clone(), (u.clone(), link.clone()));
                if v == dst {
                    let mut path = Vec::new();
                    let mut cur = dst.to_string();
                    while let Some((prev, link)) = predecessor.get(&cur) {
                        path.push(link.clone());
                        cur = prev.clone();
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(v.clone());
            }
        }
    }
    None
}

fn path_wcrt(path: &[Link], flow: &RtAttributes, all_flows: &[RtAttributes]) -> f64 {
    if path.is_empty() {
        return 0.0;
    }
    let hw_delay: f64 = path.iter().map(|l| l.prop_delay + l.switch_delay + l.proc_delay).sum();
    let mut branch = hw_delay + flow.ci;
    for link in path {
        let link_interference: f64 = interfering_flows(link, flow, all_flows)
            .iter()
            .map(|g| (flow.di / g.ti).ceil() * g.ci)
            .sum();
        branch += link_interference;
    }
    branch
}

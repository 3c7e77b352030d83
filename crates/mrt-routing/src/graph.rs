//! Graph construction and the deterministic shortest-path primitives the
//! public engine API is built from.
//!
//! `petgraph::graph::UnGraph` stores node adjacency; path search itself is
//! hand-rolled rather than `petgraph::algo::dijkstra`/`astar` because §8
//! (invariant, scenario S1) requires a *deterministic* tie-break between
//! equal-cost paths (lowest next-hop node id), which neither petgraph
//! routine exposes a hook for.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use mrt_common::model::Link;

/// Sorts two node labels so a pair key is direction-independent.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Node ids are compared numerically when both parse as integers (so `"2"
/// < "10"`), falling back to lexicographic string order otherwise. Used for
/// every tie-break in this module (§4.2, §8 invariant on deterministic
/// tie-breaking).
fn id_rank(label: &str) -> (u8, u64, &str) {
    match label.parse::<u64>() {
        Ok(n) => (0, n, ""),
        Err(_) => (1, 0, label),
    }
}

fn cmp_labels(a: &str, b: &str) -> Ordering {
    id_rank(a).cmp(&id_rank(b))
}

/// An undirected topology graph built from a one-shot link snapshot.
/// `edge_links` retains the original directed `Link` for each undirected
/// pair — mirroring the source's networkx `Graph` (a plain `Graph`, not a
/// `MultiGraph`): when both directions of a link are present, the one seen
/// last in the snapshot wins, same as an overwritten Python dict entry.
pub struct RoutingGraph {
    graph: UnGraph<String, f64>,
    node_index: HashMap<String, NodeIndex>,
    edge_links: HashMap<(String, String), Link>,
}

impl RoutingGraph {
    pub fn build(links: &[Link]) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut node_index = HashMap::new();
        let mut edge_links: HashMap<(String, String), Link> = HashMap::new();

        let mut index_of = |graph: &mut UnGraph<String, f64>, node_index: &mut HashMap<String, NodeIndex>, label: &str| -> NodeIndex {
            if let Some(&idx) = node_index.get(label) {
                idx
            } else {
                let idx = graph.add_node(label.to_string());
                node_index.insert(label.to_string(), idx);
                idx
            }
        };

        for link in links {
            index_of(&mut graph, &mut node_index, &link.src);
            index_of(&mut graph, &mut node_index, &link.dst);
            edge_links.insert(pair_key(&link.src, &link.dst), link.clone());
        }

        for link in edge_links.values() {
            let a = node_index[&link.src];
            let b = node_index[&link.dst];
            graph.update_edge(a, b, link.routing_weight());
        }

        Self {
            graph,
            node_index,
            edge_links,
        }
    }

    fn node(&self, label: &str) -> Option<NodeIndex> {
        self.node_index.get(label).copied()
    }

    fn label(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// Deterministic single-source Dijkstra: returns, for every reachable
    /// node, `(distance, full node-label path from `start`)`. Equal-cost
    /// candidate paths are broken by comparing the full label sequence
    /// element-wise under [`cmp_labels`] (numeric-aware, not plain string
    /// order) — this is what guarantees S1's `1-2-4` over `1-3-4` on the
    /// tied diamond topology, and keeps holding once node ids reach two
    /// digits.
    fn dijkstra(&self, start: NodeIndex) -> HashMap<NodeIndex, (f64, Vec<NodeIndex>)> {
        #[derive(PartialEq)]
        struct Candidate {
            dist: f64,
            path: Vec<NodeIndex>,
        }
        impl Eq for Candidate {}
        impl Ord for Candidate {
            fn cmp(&self, other: &Self) -> Ordering {
                // BinaryHeap is a max-heap; invert distance for min-heap
                // behaviour, and prefer the lexicographically smaller path
                // on exact ties (checked again on pop, see below).
                other
                    .dist
                    .partial_cmp(&self.dist)
                    .unwrap_or(Ordering::Equal)
            }
        }
        impl PartialOrd for Candidate {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        let mut best: HashMap<NodeIndex, (f64, Vec<NodeIndex>)> = HashMap::new();
        let mut heap = BinaryHeap::new();
        heap.push(Candidate {
            dist: 0.0,
            path: vec![start],
        });

        while let Some(Candidate { dist, path }) = heap.pop() {
            let u = *path.last().expect("path always has a node");
            if let Some((best_dist, best_path)) = best.get(&u) {
                let better = dist < *best_dist - 1e-9
                    || (dist < *best_dist + 1e-9
                        && cmp_path_labels(self, &path, best_path) == Ordering::Less);
                if !better {
                    continue;
                }
            }
            best.insert(u, (dist, path.clone()));

            for edge in self.graph.edges(u) {
                let v = if edge.source() == u { edge.target() } else { edge.source() };
                if path.contains(&v) {
                    continue;
                }
                let next_dist = dist + *edge.weight();
                let mut next_path = path.clone();
                next_path.push(v);
                heap.push(Candidate {
                    dist: next_dist,
                    path: next_path,
                });
            }
        }

        best
    }

    /// Shortest path `src -> dst` as an ordered list of `Link`s, or `None`
    /// if either endpoint is absent from the graph or unreachable.
    pub fn shortest_path(&self, src: &str, dst: &str) -> Option<Vec<Link>> {
        let s = self.node(src)?;
        let d = self.node(dst)?;
        let (_, path) = self.dijkstra(s).remove(&d)?;
        Some(self.path_to_links(&path))
    }

    fn path_to_links(&self, path: &[NodeIndex]) -> Vec<Link> {
        path.windows(2)
            .map(|pair| {
                let (u, v) = (self.label(pair[0]), self.label(pair[1]));
                self.edge_links[&pair_key(u, v)].clone()
            })
            .collect()
    }

    /// Kou–Markowsky–Berman Steiner tree approximation (§4.2), grounded on
    /// `original_source/sdn_controller/routing.py`'s call into networkx's
    /// `steinertree.steiner_tree`: build the metric closure over
    /// `{src} ∪ dsts` (pairwise shortest-path distances), take its minimum
    /// spanning tree, then replace each MST edge with the actual shortest
    /// path between that terminal pair, unioning and deduplicating the
    /// resulting links. Returns `None` if the terminals can't all be
    /// connected — the caller then falls back to independent unicast paths.
    pub fn steiner_tree(&self, src: &str, dsts: &[String]) -> Option<Vec<Link>> {
        let mut terminals: Vec<NodeIndex> = vec![self.node(src)?];
        for d in dsts {
            let idx = self.node(d)?;
            if !terminals.contains(&idx) {
                terminals.push(idx);
            }
        }
        if terminals.len() == 1 {
            return Some(Vec::new());
        }

        // Per-terminal single-source shortest paths, reused both for the
        // metric closure and for mapping MST edges back to real paths.
        let per_terminal: Vec<HashMap<NodeIndex, (f64, Vec<NodeIndex>)>> =
            terminals.iter().map(|&t| self.dijkstra(t)).collect();

        let mut closure_edges: Vec<(f64, usize, usize)> = Vec::new();
        for i in 0..terminals.len() {
            for j in (i + 1)..terminals.len() {
                let (dist, _) = per_terminal[i].get(&terminals[j])?;
                closure_edges.push((*dist, i, j));
            }
        }
        closure_edges.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| cmp_labels(self.label(terminals[a.1]), self.label(terminals[b.1])))
                .then_with(|| cmp_labels(self.label(terminals[a.2]), self.label(terminals[b.2])))
        });

        // Kruskal's MST over the terminal metric closure.
        let mut parent: Vec<usize> = (0..terminals.len()).collect();
        fn find(parent: &mut [usize], x: usize) -> usize {
            if parent[x] != x {
                parent[x] = find(parent, parent[x]);
            }
            parent[x]
        }

        let mut tree_links: Vec<Link> = Vec::new();
        let mut joined = 0;
        for (_, i, j) in closure_edges {
            let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
            if ri == rj {
                continue;
            }
            parent[ri] = rj;
            joined += 1;

            let (_, path) = &per_terminal[i][&terminals[j]];
            for link in self.path_to_links(path) {
                if !tree_links.iter().any(|l| l.key() == link.key()) {
                    tree_links.push(link);
                }
            }
        }

        if joined != terminals.len() - 1 {
            return None;
        }
        Some(tree_links)
    }

    /// Min-max eccentricity rendezvous-point election (§4.2): the candidate
    /// node minimizing its maximum distance to every subscriber. Subscribers
    /// not present in `G` are filtered out before computation, same as the
    /// source's `valid_subs = [s for s in subscribers if s in G]`; the
    /// election proceeds over whatever survives, empty only if none do. A
    /// candidate from which a present subscriber is unreachable is skipped
    /// entirely (mirrors the source catching `NetworkXNoPath` and moving on
    /// to the next candidate). Ties broken by lowest node id.
    pub fn min_max_eccentricity(&self, subscribers: &[String]) -> Option<String> {
        let sub_idxs: Vec<NodeIndex> = subscribers.iter().filter_map(|s| self.node(s)).collect();
        if sub_idxs.is_empty() {
            return None;
        }

        let mut best: Option<(f64, NodeIndex)> = None;
        let mut candidates: Vec<NodeIndex> = self.node_index.values().copied().collect();
        candidates.sort_by(|a, b| cmp_labels(self.label(*a), self.label(*b)));

        for cand in candidates {
            let dist = self.dijkstra(cand);
            let mut max_dist = 0.0_f64;
            let mut reachable = true;
            for &s in &sub_idxs {
                match dist.get(&s) {
                    Some((d, _)) => max_dist = max_dist.max(*d),
                    None => {
                        reachable = false;
                        break;
                    }
                }
            }
            if !reachable {
                continue;
            }
            best = Some(match best.take() {
                None => (max_dist, cand),
                Some((best_dist, best_cand)) => {
                    if max_dist < best_dist - 1e-9 {
                        (max_dist, cand)
                    } else if max_dist < best_dist + 1e-9
                        && cmp_labels(self.label(cand), self.label(best_cand)) == Ordering::Less
                    {
                        (max_dist, cand)
                    } else {
                        (best_dist, best_cand)
                    }
                }
            });
        }

        best.map(|(_, idx)| self.label(idx).to_string())
    }
}

/// Element-wise comparison of two node-label paths under [`cmp_labels`]
/// (numeric-aware), shorter-prefix-first on a common prefix — the
/// tie-break every equal-cost-path decision in this module routes through.
fn cmp_path_labels(g: &RoutingGraph, a: &[NodeIndex], b: &[NodeIndex]) -> Ordering {
    for (&x, &y) in a.iter().zip(b.iter()) {
        let ord = cmp_labels(g.label(x), g.label(y));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

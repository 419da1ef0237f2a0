// crates/hearth-trust/src/discovery.rs
//
// Chain discovery: breadth-first enumeration of vouch chains from every
// genesis root to a target user.
//
// Each root gets its own search with its own visited set, so a user reachable
// from two roots yields two chains, the shortest from each. Trust flows
// voucher -> vouchee.

use std::collections::VecDeque;

use hearth_core::trust::VouchChain;

use crate::graph::{NodeIdx, TrustGraph};

/// Find the shortest chain from each genesis root to `target`, within `max_distance` hops.
///
/// A genesis target short-circuits to the single chain `[target]`. Chains are
/// returned in root order (roots sorted by user id), at most one per root.
pub fn discover_chains(graph: &TrustGraph, target: &str, max_distance: u32) -> Vec<VouchChain> {
    if graph.is_genesis(target) {
        return vec![VouchChain::new(vec![target.to_string()])];
    }
    let Some(target_idx) = graph.node(target) else {
        return Vec::new();
    };

    let mut chains = Vec::new();
    for &root in graph.genesis_roots() {
        chains.extend(search_from_root(graph, root, target_idx, max_distance));
    }
    chains
}

fn search_from_root(
    graph: &TrustGraph,
    root: NodeIdx,
    target: NodeIdx,
    max_distance: u32,
) -> Vec<VouchChain> {
    let mut found = Vec::new();
    let mut visited = vec![false; graph.node_count()];
    visited[root as usize] = true;

    let mut queue: VecDeque<Vec<NodeIdx>> = VecDeque::new();
    queue.push_back(vec![root]);

    while let Some(path) = queue.pop_front() {
        let Some(&current) = path.last() else {
            continue;
        };

        if current == target {
            found.push(to_chain(graph, &path));
            continue;
        }

        // Paths that would exceed the cap are abandoned.
        let hops = path.len() - 1;
        if hops >= max_distance as usize {
            continue;
        }

        for &next in graph.successors(current) {
            if visited[next as usize] {
                continue;
            }
            visited[next as usize] = true;
            let mut extended = Vec::with_capacity(path.len() + 1);
            extended.extend_from_slice(&path);
            extended.push(next);
            queue.push_back(extended);
        }
    }

    found
}

fn to_chain(graph: &TrustGraph, path: &[NodeIdx]) -> VouchChain {
    VouchChain::new(path.iter().map(|&i| graph.name(i).to_string()).collect())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use hearth_core::vouch::Vouch;

    use super::*;

    fn graph(edges: &[(&str, &str)], genesis: &[&str]) -> TrustGraph {
        let vouches: Vec<Vouch> = edges.iter().map(|(a, b)| Vouch::new(a, b, "")).collect();
        let roots: BTreeSet<String> = genesis.iter().map(|s| s.to_string()).collect();
        TrustGraph::build(&vouches, &roots)
    }

    fn members(chain: &VouchChain) -> Vec<&str> {
        chain.members().iter().map(String::as_str).collect()
    }

    #[test]
    fn genesis_target_short_circuits() {
        let g = graph(&[("g", "a")], &["g"]);
        let chains = discover_chains(&g, "g", 10);
        assert_eq!(chains.len(), 1);
        assert_eq!(members(&chains[0]), vec!["g"]);
        assert_eq!(chains[0].hops(), 0);
    }

    #[test]
    fn unknown_target_has_no_chains() {
        let g = graph(&[("g", "a")], &["g"]);
        assert!(discover_chains(&g, "stranger", 10).is_empty());
    }

    #[test]
    fn linear_chain_is_found() {
        let g = graph(&[("g", "a"), ("a", "b"), ("b", "c")], &["g"]);
        let chains = discover_chains(&g, "c", 10);
        assert_eq!(chains.len(), 1);
        assert_eq!(members(&chains[0]), vec!["g", "a", "b", "c"]);
    }

    #[test]
    fn direction_matters() {
        // b vouched for g, not the other way round.
        let g = graph(&[("b", "g")], &["g"]);
        assert!(discover_chains(&g, "b", 10).is_empty());
    }

    #[test]
    fn distance_cap_abandons_long_paths() {
        let g = graph(&[("g", "a"), ("a", "b"), ("b", "c")], &["g"]);
        assert_eq!(discover_chains(&g, "c", 3).len(), 1);
        assert!(discover_chains(&g, "c", 2).is_empty());
    }

    #[test]
    fn each_root_searches_independently() {
        let g = graph(&[("g1", "t"), ("g2", "x"), ("x", "t")], &["g1", "g2"]);
        let chains = discover_chains(&g, "t", 10);
        assert_eq!(chains.len(), 2);
        assert_eq!(members(&chains[0]), vec!["g1", "t"]);
        assert_eq!(members(&chains[1]), vec!["g2", "x", "t"]);
    }

    #[test]
    fn cycles_terminate() {
        let g = graph(&[("g", "a"), ("a", "b"), ("b", "a"), ("b", "g")], &["g"]);
        let chains = discover_chains(&g, "b", 10);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].hops(), 2);
    }

    #[test]
    fn shared_intermediate_reached_from_two_roots() {
        let g = graph(&[("g1", "m"), ("g2", "m"), ("m", "t")], &["g1", "g2"]);
        let chains = discover_chains(&g, "t", 10);
        let roots: Vec<&str> = chains.iter().filter_map(|c| c.root()).collect();
        assert_eq!(roots, vec!["g1", "g2"]);
    }
}

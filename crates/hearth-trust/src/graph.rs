// crates/hearth-trust/src/graph.rs
//
// Trust graph snapshot: an arena of integer-indexed users with adjacency
// arrays over active vouches.
//
// A snapshot is built once from the ledger and reused for every genesis
// root's search (and for every user touched by a revocation cascade), so the
// hot loops never perform string-keyed lookups.

use std::collections::{BTreeSet, HashMap};

use hearth_core::vouch::Vouch;

/// Index of a user in a `TrustGraph` arena.
pub type NodeIdx = u32;

/// Read-only snapshot of the active vouch graph and the genesis set.
#[derive(Debug, Clone, Default)]
pub struct TrustGraph {
    /// User id -> arena index.
    index: HashMap<String, NodeIdx>,
    /// Arena index -> user id.
    names: Vec<String>,
    /// Outgoing adjacency: voucher -> vouchees, in ledger order.
    successors: Vec<Vec<NodeIdx>>,
    /// Genesis roots, sorted by user id.
    genesis: Vec<NodeIdx>,
}

impl TrustGraph {
    /// Build a snapshot from vouches and the genesis set.
    ///
    /// Revoked vouches are skipped, so callers may pass the full ledger.
    pub fn build(vouches: &[Vouch], genesis: &BTreeSet<String>) -> Self {
        let mut graph = Self::default();

        for user_id in genesis {
            let idx = graph.intern(user_id);
            graph.genesis.push(idx);
        }

        for vouch in vouches.iter().filter(|v| v.is_active()) {
            let from = graph.intern(&vouch.voucher_id);
            let to = graph.intern(&vouch.vouchee_id);
            graph.successors[from as usize].push(to);
        }

        graph
    }

    fn intern(&mut self, user_id: &str) -> NodeIdx {
        if let Some(&idx) = self.index.get(user_id) {
            return idx;
        }
        let idx = self.names.len() as NodeIdx;
        self.index.insert(user_id.to_string(), idx);
        self.names.push(user_id.to_string());
        self.successors.push(Vec::new());
        idx
    }

    /// Arena index for a user, if the user appears in the snapshot.
    pub fn node(&self, user_id: &str) -> Option<NodeIdx> {
        self.index.get(user_id).copied()
    }

    pub fn name(&self, idx: NodeIdx) -> &str {
        &self.names[idx as usize]
    }

    /// Users directly vouched for by `idx` through active vouches.
    pub fn successors(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.successors[idx as usize]
    }

    pub fn genesis_roots(&self) -> &[NodeIdx] {
        &self.genesis
    }

    pub fn is_genesis(&self, user_id: &str) -> bool {
        self.node(user_id)
            .map(|idx| self.genesis.contains(&idx))
            .unwrap_or(false)
    }

    /// Number of users in the snapshot.
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Number of active vouch edges in the snapshot.
    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_snapshot() {
        let g = TrustGraph::build(&[], &BTreeSet::new());
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.node("anyone").is_none());
    }

    #[test]
    fn revoked_edges_are_excluded() {
        let mut revoked = Vouch::new("g", "b", "");
        revoked.mark_revoked("", chrono::Utc::now());
        let vouches = vec![Vouch::new("g", "a", ""), revoked];
        let g = TrustGraph::build(&vouches, &roots(&["g"]));

        let gi = g.node("g").unwrap();
        let names: Vec<&str> = g.successors(gi).iter().map(|&i| g.name(i)).collect();
        assert_eq!(names, vec!["a"]);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn genesis_without_edges_is_present() {
        let g = TrustGraph::build(&[], &roots(&["g1", "g2"]));
        assert_eq!(g.genesis_roots().len(), 2);
        assert!(g.is_genesis("g1"));
        assert!(!g.is_genesis("x"));
    }
}

//! Id renames recorded while replaying history.
//!
//! Undoing a delete or redoing a create rebuilds nodes under freshly minted
//! ids. Each rebuild records `old -> new` here, and every command looks its
//! stored ids up through the table before touching the graph.

use std::collections::HashMap;

use crate::graph::NodeId;

/// Old-to-new id table shared by the commands of one history.
#[derive(Debug, Clone, Default)]
pub struct IdRenames {
    map: HashMap<NodeId, NodeId>,
}

impl IdRenames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the node once called `old` now lives on as `new`.
    ///
    /// If `old` was already renamed, the link is added at the end of its
    /// chain so every earlier name also reaches `new`.
    pub fn record(&mut self, old: NodeId, new: NodeId) {
        let tail = self.resolve(&old);
        if tail != new {
            self.map.insert(tail, new);
        }
    }

    /// The current id of `id`, following chained renames.
    ///
    /// Minted ids are never reused, so chains cannot loop; the walk is still
    /// bounded by the table size.
    pub fn resolve(&self, id: &NodeId) -> NodeId {
        let mut current = id;
        for _ in 0..self.map.len() {
            match self.map.get(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current.clone()
    }

    /// Number of recorded renames.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_resolve_to_themselves() {
        let renames = IdRenames::new();
        let id = NodeId::from("node_1");
        assert_eq!(renames.resolve(&id), id);
    }

    #[test]
    fn chains_resolve_to_the_latest_id() {
        let mut renames = IdRenames::new();
        renames.record(NodeId::from("node_1"), NodeId::from("node_3"));
        renames.record(NodeId::from("node_3"), NodeId::from("node_7"));

        assert_eq!(renames.resolve(&NodeId::from("node_1")), NodeId::from("node_7"));
        assert_eq!(renames.resolve(&NodeId::from("node_3")), NodeId::from("node_7"));
        assert_eq!(renames.len(), 2);
    }

    #[test]
    fn renaming_an_old_name_extends_its_chain() {
        let mut renames = IdRenames::new();
        renames.record(NodeId::from("node_1"), NodeId::from("node_2"));
        renames.record(NodeId::from("node_1"), NodeId::from("node_3"));

        assert_eq!(renames.resolve(&NodeId::from("node_1")), NodeId::from("node_3"));
        assert_eq!(renames.resolve(&NodeId::from("node_2")), NodeId::from("node_3"));
    }

    #[test]
    fn self_renames_are_ignored() {
        let mut renames = IdRenames::new();
        renames.record(NodeId::from("node_1"), NodeId::from("node_1"));
        assert!(renames.is_empty());
    }

    #[test]
    fn a_corrupt_loop_still_terminates() {
        let mut renames = IdRenames::new();
        renames.record(NodeId::from("a"), NodeId::from("b"));
        renames.record(NodeId::from("b"), NodeId::from("a"));
        let resolved = renames.resolve(&NodeId::from("a"));
        assert!(resolved == NodeId::from("a") || resolved == NodeId::from("b"));
    }
}

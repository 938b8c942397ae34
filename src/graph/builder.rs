//! Graph builder with efficient edge handling
//!
//! This module provides a mutable graph builder that uses FxHashMap
//! for O(1) edge lookups during construction. Finished graphs are frozen into
//! a [`KeywordGraph`] for read-only use.

use crate::graph::cooccurrence::CooccurrenceTable;
use crate::graph::csr::KeywordGraph;
use rustc_hash::FxHashMap;
use tracing::debug;

/// A node in the graph builder
#[derive(Debug, Clone)]
pub struct BuilderNode {
    /// The token for this node
    pub label: String,
    /// Adjacency list: target node ID -> edge weight
    pub edges: FxHashMap<u32, u32>,
}

impl BuilderNode {
    /// Create a new node
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            edges: FxHashMap::default(),
        }
    }
}

/// A mutable, undirected, simple graph builder
#[derive(Debug)]
pub struct GraphBuilder {
    /// Maps token -> node ID
    label_to_id: FxHashMap<String, u32>,
    /// Node storage
    nodes: Vec<BuilderNode>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Create a new empty graph builder
    pub fn new() -> Self {
        Self {
            label_to_id: FxHashMap::default(),
            nodes: Vec::new(),
        }
    }

    /// Create a graph builder with pre-allocated capacity
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            label_to_id: FxHashMap::with_capacity_and_hasher(node_capacity, Default::default()),
            nodes: Vec::with_capacity(node_capacity),
        }
    }

    /// Get or create a node for the given token, returning its ID
    pub fn get_or_create_node(&mut self, label: &str) -> u32 {
        if let Some(&id) = self.label_to_id.get(label) {
            return id;
        }

        let id = self.nodes.len() as u32;
        self.label_to_id.insert(label.to_string(), id);
        self.nodes.push(BuilderNode::new(label));
        id
    }

    /// Set the weight of the edge between two nodes
    ///
    /// Setting an existing edge replaces its weight, so the graph never holds
    /// parallel edges.
    pub fn set_edge(&mut self, from: u32, to: u32, weight: u32) {
        if from == to {
            return; // No self-loops
        }

        // Store the edge in both directions (undirected graph)
        if let Some(node) = self.nodes.get_mut(from as usize) {
            node.edges.insert(to, weight);
        }
        if let Some(node) = self.nodes.get_mut(to as usize) {
            node.edges.insert(from, weight);
        }
    }

    /// Build a graph from pair counts, keeping pairs with `count >= min_weight`
    ///
    /// Nodes are exactly the endpoints of retained pairs. Pairs are inserted
    /// in lexicographic order so node IDs are reproducible across runs.
    pub fn from_pairs(pairs: &CooccurrenceTable, min_weight: u32) -> Self {
        let mut retained: Vec<_> = pairs
            .iter()
            .filter(|(_, count)| *count >= min_weight)
            .collect();
        retained.sort_by(|a, b| a.0.cmp(b.0));

        let mut builder = Self::with_capacity(retained.len());
        for (pair, count) in retained {
            let a = builder.get_or_create_node(pair.first());
            let b = builder.get_or_create_node(pair.second());
            builder.set_edge(a, b, count);
        }

        debug!(
            pairs = pairs.len(),
            min_weight,
            nodes = builder.node_count(),
            edges = builder.edge_count(),
            "built keyword graph"
        );
        builder
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of edges (counting each undirected edge once)
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum::<usize>() / 2
    }

    /// Get a node by ID
    pub fn get_node(&self, id: u32) -> Option<&BuilderNode> {
        self.nodes.get(id as usize)
    }

    /// Get a node ID by token
    pub fn get_node_id(&self, label: &str) -> Option<u32> {
        self.label_to_id.get(label).copied()
    }

    /// Get the token for a node ID
    pub fn get_label(&self, id: u32) -> Option<&str> {
        self.nodes.get(id as usize).map(|n| n.label.as_str())
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &BuilderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as u32, n))
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Freeze into an immutable CSR graph
    pub fn freeze(&self) -> KeywordGraph {
        KeywordGraph::from_builder(self)
    }
}

/// Filter pair counts by `min_weight` and build the keyword graph
pub fn build_graph(pairs: &CooccurrenceTable, min_weight: u32) -> KeywordGraph {
    GraphBuilder::from_pairs(pairs, min_weight).freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_builder_basic() {
        let mut builder = GraphBuilder::new();

        let id_a = builder.get_or_create_node("서울");
        let id_b = builder.get_or_create_node("맛집");
        let id_c = builder.get_or_create_node("서울"); // duplicate

        assert_eq!(id_a, id_c); // Same token should get same ID
        assert_ne!(id_a, id_b);
        assert_eq!(builder.node_count(), 2);
    }

    #[test]
    fn test_set_edge_replaces_weight() {
        let mut builder = GraphBuilder::new();

        let id_a = builder.get_or_create_node("서울");
        let id_b = builder.get_or_create_node("맛집");

        builder.set_edge(id_a, id_b, 2);
        builder.set_edge(id_b, id_a, 5);

        assert_eq!(builder.get_node(id_a).unwrap().edges.get(&id_b), Some(&5));
        assert_eq!(builder.get_node(id_b).unwrap().edges.get(&id_a), Some(&5));
        assert_eq!(builder.edge_count(), 1);
    }

    #[test]
    fn test_self_loops_prevented() {
        let mut builder = GraphBuilder::new();
        let id_a = builder.get_or_create_node("test");

        builder.set_edge(id_a, id_a, 1);

        let node = builder.get_node(id_a).unwrap();
        assert!(node.edges.is_empty());
    }

    #[test]
    fn test_from_pairs_threshold() {
        let mut pairs = CooccurrenceTable::new();
        pairs.insert("a", "b", 5);
        pairs.insert("b", "c", 3);

        let builder = GraphBuilder::from_pairs(&pairs, 5);

        assert_eq!(builder.node_count(), 2);
        assert_eq!(builder.edge_count(), 1);
        assert!(builder.get_node_id("c").is_none());
    }

    #[test]
    fn test_from_pairs_deterministic_ids() {
        let mut pairs = CooccurrenceTable::new();
        pairs.insert("다", "나", 1);
        pairs.insert("가", "다", 1);
        pairs.insert("나", "가", 1);

        let builder = GraphBuilder::from_pairs(&pairs, 1);
        assert_eq!(builder.get_label(0), Some("가"));
        assert_eq!(builder.get_label(1), Some("나"));
        assert_eq!(builder.get_label(2), Some("다"));
    }
}

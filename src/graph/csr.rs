//! Compressed Sparse Row (CSR) keyword graph
//!
//! The frozen, read-only form of the co-occurrence network. Exposes the raw
//! values a renderer needs: per-node degree, per-edge weight and the maximum
//! retained weight.

use super::builder::GraphBuilder;
use serde::{Deserialize, Serialize};

/// An undirected edge listed once, with `source < target` by node ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: u32,
    pub target: u32,
    pub weight: u32,
}

/// Summary numbers shown next to a rendered network
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    /// Mean node degree, 0 for an empty graph
    pub average_degree: f64,
    pub max_weight: u32,
}

/// A keyword co-occurrence graph in Compressed Sparse Row format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGraph {
    /// Row pointers: node i's edges are at indices row_ptr[i]..row_ptr[i+1]
    row_ptr: Vec<usize>,
    /// Column indices (neighbor nodes) for each directed half-edge
    col_idx: Vec<u32>,
    /// Edge weights (co-occurrence counts)
    weights: Vec<u32>,
    /// Tokens for each node
    labels: Vec<String>,
}

impl Default for KeywordGraph {
    /// The empty graph, identical to what the builder freezes with no nodes
    fn default() -> Self {
        GraphBuilder::new().freeze()
    }
}

impl KeywordGraph {
    /// Convert a GraphBuilder into CSR format
    pub fn from_builder(builder: &GraphBuilder) -> Self {
        let num_nodes = builder.node_count();
        let mut row_ptr = Vec::with_capacity(num_nodes + 1);
        let mut col_idx = Vec::new();
        let mut weights = Vec::new();
        let mut labels = Vec::with_capacity(num_nodes);

        row_ptr.push(0);

        for (_, node) in builder.nodes() {
            labels.push(node.label.clone());

            // Collect and sort edges for deterministic iteration
            let mut edges: Vec<_> = node.edges.iter().map(|(&k, &v)| (k, v)).collect();
            edges.sort_by_key(|(k, _)| *k);

            for (target, weight) in edges {
                col_idx.push(target);
                weights.push(weight);
            }

            row_ptr.push(col_idx.len());
        }

        Self {
            row_ptr,
            col_idx,
            weights,
            labels,
        }
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.col_idx.len() / 2
    }

    /// True when no pair survived filtering
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate over neighbors of a node with edge weights
    pub fn neighbors(&self, node: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        let (start, end) = self.row_range(node);
        (start..end).map(move |i| (self.col_idx[i], self.weights[i]))
    }

    /// Number of retained edges touching a node (not the sum of weights)
    pub fn degree(&self, node: u32) -> u32 {
        let (start, end) = self.row_range(node);
        (end - start) as u32
    }

    /// Sum of incident edge weights
    pub fn weighted_degree(&self, node: u32) -> u32 {
        let (start, end) = self.row_range(node);
        self.weights[start..end].iter().sum()
    }

    /// Degree of every node, indexed by node ID
    pub fn degrees(&self) -> Vec<u32> {
        (0..self.node_count() as u32).map(|n| self.degree(n)).collect()
    }

    /// Get the token for a node
    pub fn label(&self, node: u32) -> &str {
        &self.labels[node as usize]
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Get node ID by token (linear search - use sparingly)
    pub fn node_id(&self, label: &str) -> Option<u32> {
        self.labels.iter().position(|l| l == label).map(|i| i as u32)
    }

    /// Weight of the edge between two tokens, if retained
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<u32> {
        let (a, b) = (self.node_id(a)?, self.node_id(b)?);
        self.neighbors(a).find(|&(n, _)| n == b).map(|(_, w)| w)
    }

    /// Every undirected edge once, ordered by (source, target)
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for source in 0..self.node_count() as u32 {
            for (target, weight) in self.neighbors(source) {
                if source < target {
                    edges.push(Edge {
                        source,
                        target,
                        weight,
                    });
                }
            }
        }
        edges
    }

    /// Largest retained edge weight, 1 when the graph has no edges
    pub fn max_weight(&self) -> u32 {
        self.weights.iter().copied().max().unwrap_or(1)
    }

    pub fn stats(&self) -> GraphStats {
        let nodes = self.node_count();
        let average_degree = if nodes == 0 {
            0.0
        } else {
            self.col_idx.len() as f64 / nodes as f64
        };

        GraphStats {
            nodes,
            edges: self.edge_count(),
            average_degree,
            max_weight: self.max_weight(),
        }
    }

    fn row_range(&self, node: u32) -> (usize, usize) {
        let node = node as usize;
        (self.row_ptr[node], self.row_ptr[node + 1])
    }
}

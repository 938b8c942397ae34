//! Visual encoding hints for rendering a keyword graph
//!
//! Node size grows linearly with degree and edge width with weight relative
//! to the heaviest retained edge. Scaling constants come from the caller.

use crate::errors::{NetworkError, Result};
use crate::graph::csr::KeywordGraph;
use serde::{Deserialize, Serialize};

/// Scaling applied to raw degree and weight values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodingScale {
    /// Node size per unit of degree
    pub node_scale: f64,
    /// Width of the heaviest edge
    pub max_edge_width: f64,
}

impl Default for EncodingScale {
    fn default() -> Self {
        Self {
            node_scale: 50.0,
            max_edge_width: 3.0,
        }
    }
}

impl EncodingScale {
    pub fn new(node_scale: f64, max_edge_width: f64) -> Result<Self> {
        let scale = Self {
            node_scale,
            max_edge_width,
        };
        scale.validate()?;
        Ok(scale)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.node_scale.is_finite() && self.node_scale > 0.0) {
            return Err(NetworkError::invalid_config(format!(
                "node_scale must be a positive number, got {}",
                self.node_scale
            )));
        }
        if !(self.max_edge_width.is_finite() && self.max_edge_width > 0.0) {
            return Err(NetworkError::invalid_config(format!(
                "max_edge_width must be a positive number, got {}",
                self.max_edge_width
            )));
        }
        Ok(())
    }
}

/// A node with its raw degree and scaled size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedNode {
    pub label: String,
    pub degree: u32,
    pub size: f64,
}

/// An edge with its raw weight and scaled width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
    pub width: f64,
}

/// Render-ready view of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualEncoding {
    pub nodes: Vec<EncodedNode>,
    pub edges: Vec<EncodedEdge>,
    pub max_weight: u32,
}

impl VisualEncoding {
    pub fn encode(graph: &KeywordGraph, scale: &EncodingScale) -> Self {
        let max_weight = graph.max_weight();

        let nodes = (0..graph.node_count() as u32)
            .map(|id| {
                let degree = graph.degree(id);
                EncodedNode {
                    label: graph.label(id).to_string(),
                    degree,
                    size: degree as f64 * scale.node_scale,
                }
            })
            .collect();

        let edges = graph
            .edges()
            .into_iter()
            .map(|e| EncodedEdge {
                source: graph.label(e.source).to_string(),
                target: graph.label(e.target).to_string(),
                weight: e.weight,
                width: e.weight as f64 / max_weight as f64 * scale.max_edge_width,
            })
            .collect();

        Self {
            nodes,
            edges,
            max_weight,
        }
    }
}

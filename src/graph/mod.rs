//! Graph construction and representation
//!
//! Pair counting, threshold filtering into an undirected weighted graph,
//! compact storage and rendering hints for the keyword network.

pub mod builder;
pub mod cooccurrence;
pub mod csr;
pub mod encoding;

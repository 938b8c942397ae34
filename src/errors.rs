//! Error types for keyword_network

use thiserror::Error;

/// Errors raised by the keyword network pipeline.
///
/// Collection-level conditions such as an empty vocabulary or a graph with no
/// qualifying edges are *not* errors; they are reported through
/// [`crate::pipeline::runner::PipelineOutcome`] and an empty
/// [`crate::graph::csr::KeywordGraph`].
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A threshold or scaling parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A single document could not be analyzed.
    #[error("malformed document #{index}: {reason}")]
    MalformedDocument { index: usize, reason: String },

    /// The morphological analyzer rejected its input.
    #[error("analyzer failure: {0}")]
    Analyzer(String),

    /// A required named field is absent from an ingested record or table.
    #[error("missing required field `{field}` in {record}")]
    MissingField { field: String, record: String },

    /// A serialized token list or delimited table could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl NetworkError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        NetworkError::InvalidConfig(msg.into())
    }

    pub fn analyzer(msg: impl Into<String>) -> Self {
        NetworkError::Analyzer(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        NetworkError::Parse(msg.into())
    }

    pub fn missing_field(field: impl Into<String>, record: impl Into<String>) -> Self {
        NetworkError::MissingField {
            field: field.into(),
            record: record.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;

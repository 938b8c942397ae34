//! Run specification types.
//!
//! A [`RunSpec`] is the on-disk JSON form of a run's parameters. It is
//! checked by [`super::validation::ValidationEngine`] and then folded onto
//! [`NetworkConfig::default`].
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "v": 1,
//!   "graph": { "min_weight": 3 },
//!   "tokenizer": { "min_token_length": 2, "stopwords": ["블로그"] },
//!   "display": { "top_n": 30, "node_scale": 50, "max_edge_width": 3 },
//!   "strict": false
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::types::{NetworkConfig, PosTag};

/// Top-level run specification (v1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSpec {
    /// Spec version (currently `1`).
    pub v: u32,

    #[serde(default)]
    pub graph: GraphSpec,

    #[serde(default)]
    pub tokenizer: TokenizerSpec,

    #[serde(default)]
    pub display: DisplaySpec,

    /// If `true`, unrecognized fields are errors; if `false`, warnings.
    #[serde(default)]
    pub strict: bool,

    /// Captures any fields not recognized by the schema.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Co-occurrence graph parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSpec {
    #[serde(default)]
    pub min_weight: Option<i64>,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Tokenizer parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenizerSpec {
    #[serde(default)]
    pub min_token_length: Option<usize>,

    #[serde(default)]
    pub include_pos: Option<Vec<PosTag>>,

    /// Extra stopwords, unioned with the built-in list.
    #[serde(default)]
    pub stopwords: Vec<String>,

    #[serde(default)]
    pub stem: Option<bool>,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Presentation scaling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplaySpec {
    #[serde(default)]
    pub top_n: Option<usize>,

    #[serde(default)]
    pub node_scale: Option<f64>,

    #[serde(default)]
    pub max_edge_width: Option<f64>,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl Default for RunSpec {
    fn default() -> Self {
        Self {
            v: 1,
            graph: GraphSpec::default(),
            tokenizer: TokenizerSpec::default(),
            display: DisplaySpec::default(),
            strict: false,
            unknown_fields: HashMap::new(),
        }
    }
}

impl RunSpec {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Spec that reproduces `config` exactly
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self {
            graph: GraphSpec {
                min_weight: Some(config.min_weight),
                ..Default::default()
            },
            tokenizer: TokenizerSpec {
                min_token_length: Some(config.min_token_length),
                include_pos: Some(config.include_pos.clone()),
                stopwords: config.stopwords.clone(),
                stem: Some(config.stem),
                ..Default::default()
            },
            display: DisplaySpec {
                top_n: Some(config.top_n),
                node_scale: Some(config.node_scale),
                max_edge_width: Some(config.max_edge_width),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Fold the spec onto the default configuration.
    ///
    /// No validation happens here; see
    /// [`super::validation::ValidationEngine`].
    pub fn to_config(&self) -> NetworkConfig {
        let mut cfg = NetworkConfig::default();

        if let Some(w) = self.graph.min_weight {
            cfg.min_weight = w;
        }
        if let Some(len) = self.tokenizer.min_token_length {
            cfg.min_token_length = len;
        }
        if let Some(tags) = &self.tokenizer.include_pos {
            cfg.include_pos = tags.clone();
        }
        cfg.stopwords = self.tokenizer.stopwords.clone();
        if let Some(stem) = self.tokenizer.stem {
            cfg.stem = stem;
        }
        if let Some(n) = self.display.top_n {
            cfg.top_n = n;
        }
        if let Some(scale) = self.display.node_scale {
            cfg.node_scale = scale;
        }
        if let Some(width) = self.display.max_edge_width {
            cfg.max_edge_width = width;
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_spec() {
        let json = r#"{ "v": 1 }"#;
        let spec: RunSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.v, 1);
        assert!(spec.graph.min_weight.is_none());
        assert!(!spec.strict);
        assert_eq!(spec.to_config(), NetworkConfig::default());
    }

    #[test]
    fn test_deserialize_full_spec() {
        let json = r#"{
            "v": 1,
            "graph": { "min_weight": 4 },
            "tokenizer": {
                "min_token_length": 3,
                "include_pos": ["Noun"],
                "stopwords": ["블로그", "포스팅"],
                "stem": false
            },
            "display": { "top_n": 30, "node_scale": 80, "max_edge_width": 5 },
            "strict": true
        }"#;
        let spec: RunSpec = serde_json::from_str(json).unwrap();
        assert!(spec.strict);

        let cfg = spec.to_config();
        assert_eq!(cfg.min_weight, 4);
        assert_eq!(cfg.min_token_length, 3);
        assert_eq!(cfg.include_pos, vec![PosTag::Noun]);
        assert_eq!(cfg.stopwords, vec!["블로그", "포스팅"]);
        assert!(!cfg.stem);
        assert_eq!(cfg.top_n, 30);
        assert_eq!(cfg.node_scale, 80.0);
        assert_eq!(cfg.max_edge_width, 5.0);
    }

    #[test]
    fn test_negative_weight_survives_parsing() {
        // rejected by validation, not by serde, so the message names the field
        let spec: RunSpec = serde_json::from_str(r#"{ "v": 1, "graph": { "min_weight": -2 } }"#)
            .unwrap();
        assert_eq!(spec.to_config().min_weight, -2);
    }

    #[test]
    fn test_from_config_round_trips() {
        let cfg = NetworkConfig::default()
            .with_min_weight(7)
            .with_stopwords(["블로그"])
            .with_node_scale(12.5);
        assert_eq!(RunSpec::from_config(&cfg).to_config(), cfg);
    }

    #[test]
    fn test_from_json_rejects_missing_version() {
        assert!(RunSpec::from_json(r#"{ "graph": {} }"#).is_err());
        assert!(RunSpec::from_json("not json").is_err());
    }

    #[test]
    fn test_unknown_fields_captured() {
        let json = r#"{
            "v": 1,
            "bogus_top_level": 42,
            "graph": { "min_weight": 2, "layout": "spring" }
        }"#;
        let spec: RunSpec = serde_json::from_str(json).unwrap();
        assert!(spec.unknown_fields.contains_key("bogus_top_level"));
        assert!(spec.graph.unknown_fields.contains_key("layout"));
    }
}

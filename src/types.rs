//! Core types for keyword_network
//!
//! This module defines the fundamental data structures shared by every stage:
//! part-of-speech tags, analyzed morphemes, raw documents, and configuration.

use crate::errors::{NetworkError, Result};
use crate::graph::encoding::EncodingScale;
use serde::{Deserialize, Serialize};

// ============================================================================
// Part of speech
// ============================================================================

/// Part-of-speech tags produced by a morphological analyzer.
///
/// The vocabulary follows the coarse Korean tag set (noun, verb, adjective,
/// particle, ending, ...) plus tags for Latin words and numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Determiner,
    Conjunction,
    Exclamation,
    /// Postposition attached to a noun (조사)
    Josa,
    /// Verbal or adjectival ending (어미)
    Eomi,
    /// Latin-alphabet word
    Alpha,
    Number,
    Punctuation,
    Other,
}

impl PosTag {
    /// Check if this tag is one of the content roles kept by default
    pub fn is_content_word(&self) -> bool {
        matches!(self, PosTag::Noun | PosTag::Verb | PosTag::Adjective)
    }

    /// Parse an analyzer tag name (case-insensitive)
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "noun" | "nng" | "nnp" | "nnb" | "np" => PosTag::Noun,
            "verb" | "vv" => PosTag::Verb,
            "adjective" | "adj" | "va" => PosTag::Adjective,
            "adverb" | "mag" | "maj" => PosTag::Adverb,
            "determiner" | "mm" => PosTag::Determiner,
            "conjunction" => PosTag::Conjunction,
            "exclamation" | "ic" => PosTag::Exclamation,
            "josa" => PosTag::Josa,
            "eomi" | "preeomi" => PosTag::Eomi,
            "alpha" | "sl" => PosTag::Alpha,
            "number" | "sn" => PosTag::Number,
            "punctuation" => PosTag::Punctuation,
            _ => PosTag::Other,
        }
    }

    /// Get the analyzer tag name for this enum
    pub fn as_str(&self) -> &'static str {
        match self {
            PosTag::Noun => "Noun",
            PosTag::Verb => "Verb",
            PosTag::Adjective => "Adjective",
            PosTag::Adverb => "Adverb",
            PosTag::Determiner => "Determiner",
            PosTag::Conjunction => "Conjunction",
            PosTag::Exclamation => "Exclamation",
            PosTag::Josa => "Josa",
            PosTag::Eomi => "Eomi",
            PosTag::Alpha => "Alpha",
            PosTag::Number => "Number",
            PosTag::Punctuation => "Punctuation",
            PosTag::Other => "Other",
        }
    }
}

/// A (surface form, part-of-speech) pair emitted by an analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morpheme {
    pub surface: String,
    pub pos: PosTag,
}

impl Morpheme {
    pub fn new(surface: impl Into<String>, pos: PosTag) -> Self {
        Self {
            surface: surface.into(),
            pos,
        }
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.surface.chars().count()
    }
}

// ============================================================================
// Document
// ============================================================================

/// A raw document from the document source.
///
/// Either field may be missing upstream; a document with neither field has
/// no text and tokenizes to an empty sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Document {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }

    /// A document carrying a single text body in the description field
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            title: None,
            description: Some(text.into()),
        }
    }

    /// Title and description joined by a single space, or `None` when both are absent
    pub fn text(&self) -> Option<String> {
        match (&self.title, &self.description) {
            (Some(t), Some(d)) => Some(format!("{t} {d}")),
            (Some(t), None) => Some(t.clone()),
            (None, Some(d)) => Some(d.clone()),
            (None, None) => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for a keyword network run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Minimum co-occurrence count for an edge to be kept
    pub min_weight: i64,
    /// Minimum token length in characters
    pub min_token_length: usize,
    /// POS tags retained by the tokenizer
    pub include_pos: Vec<PosTag>,
    /// User stopwords (unioned with the built-in base list)
    pub stopwords: Vec<String>,
    /// Reduce verbs and adjectives to their dictionary form
    pub stem: bool,
    /// Rows in the top-words table
    pub top_n: usize,
    /// Node size per unit of degree
    pub node_scale: f64,
    /// Edge width of the heaviest retained edge
    pub max_edge_width: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            min_weight: 1,
            min_token_length: 2,
            include_pos: vec![PosTag::Noun, PosTag::Verb, PosTag::Adjective],
            stopwords: Vec::new(),
            stem: true,
            top_n: 20,
            node_scale: 50.0,
            max_edge_width: 3.0,
        }
    }
}

impl NetworkConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.min_weight < 1 {
            return Err(NetworkError::invalid_config(format!(
                "min_weight must be >= 1, got {}",
                self.min_weight
            )));
        }

        if self.min_weight > u32::MAX as i64 {
            return Err(NetworkError::invalid_config(format!(
                "min_weight must be <= {}, got {}",
                u32::MAX,
                self.min_weight
            )));
        }

        // single-character tokens never reach the frequency table
        if self.min_token_length < 2 {
            return Err(NetworkError::invalid_config(format!(
                "min_token_length must be >= 2, got {}",
                self.min_token_length
            )));
        }

        if self.include_pos.is_empty() {
            return Err(NetworkError::invalid_config(
                "include_pos must name at least one tag",
            ));
        }

        if self.top_n == 0 {
            return Err(NetworkError::invalid_config("top_n must be > 0"));
        }

        self.encoding_scale().validate()?;

        Ok(())
    }

    /// Presentation scaling derived from this config
    pub fn encoding_scale(&self) -> EncodingScale {
        EncodingScale {
            node_scale: self.node_scale,
            max_edge_width: self.max_edge_width,
        }
    }

    /// The validated edge threshold as an unsigned count
    pub fn edge_threshold(&self) -> Result<u32> {
        u32::try_from(self.min_weight).map_err(|_| {
            NetworkError::invalid_config(format!(
                "min_weight out of range: {}",
                self.min_weight
            ))
        })
    }

    /// Builder method: set minimum edge weight
    pub fn with_min_weight(mut self, min_weight: i64) -> Self {
        self.min_weight = min_weight;
        self
    }

    /// Builder method: set minimum token length
    pub fn with_min_token_length(mut self, len: usize) -> Self {
        self.min_token_length = len;
        self
    }

    /// Builder method: set retained POS tags
    pub fn with_include_pos(mut self, tags: Vec<PosTag>) -> Self {
        self.include_pos = tags;
        self
    }

    /// Builder method: set user stopwords
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = words.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: toggle stemming
    pub fn with_stem(mut self, stem: bool) -> Self {
        self.stem = stem;
        self
    }

    /// Builder method: set top N words
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Builder method: set node scale
    pub fn with_node_scale(mut self, scale: f64) -> Self {
        self.node_scale = scale;
        self
    }

    /// Builder method: set maximum edge width
    pub fn with_max_edge_width(mut self, width: f64) -> Self {
        self.max_edge_width = width;
        self
    }
}

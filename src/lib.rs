//! # keyword_network
//!
//! Keyword co-occurrence networks from short Korean/English documents such
//! as blog titles and descriptions.
//!
//! Documents flow through four stages:
//!
//! 1. **Tokenize**: strip markup, e-mail addresses and stray jamo, run a
//!    morphological analyzer and keep content words.
//! 2. **Frequency**: count every surviving token.
//! 3. **Co-occurrence**: count, per document, every unordered pair of
//!    distinct tokens once.
//! 4. **Graph**: keep pairs at or above a weight threshold as edges of an
//!    undirected graph.
//!
//! ```rust,ignore
//! use keyword_network::{Document, NetworkConfig, NoopObserver, Pipeline};
//!
//! let pipeline = Pipeline::new(NetworkConfig::default().with_min_weight(2))?;
//! let docs = vec![Document::new("서울 맛집", "서울 맛집 추천")];
//! if let Some(ctx) = pipeline.run(&docs, &mut NoopObserver).context() {
//!     println!("{:?}", ctx.top_words());
//! }
//! ```

pub mod errors;
pub mod graph;
pub mod ingest;
pub mod nlp;
pub mod pipeline;
pub mod stats;
pub mod types;

pub use errors::{NetworkError, Result};
pub use graph::builder::{build_graph, GraphBuilder};
pub use graph::cooccurrence::{CooccurrenceTable, TokenPair, WeightedPair};
pub use graph::csr::{Edge, GraphStats, KeywordGraph};
pub use graph::encoding::{EncodingScale, VisualEncoding};
pub use nlp::analyzer::{MorphAnalyzer, RuleAnalyzer};
pub use nlp::stopwords::StopwordSet;
pub use nlp::tokenizer::{BatchReport, DocumentOutcome, SkipReason, Tokenizer};
pub use pipeline::observer::{NoopObserver, PipelineObserver, StageTimingObserver};
pub use pipeline::runner::{Pipeline, PipelineContext, PipelineOutcome};
pub use pipeline::spec::RunSpec;
pub use stats::frequency::{FrequencyTable, TokenCount};
pub use types::{Document, Morpheme, NetworkConfig, PosTag};

//! Pipeline runner: orchestrates stage execution and owns stage outputs.
//!
//! A [`Pipeline`] holds a validated [`NetworkConfig`] and a [`Tokenizer`].
//! Calling [`Pipeline::run`] executes the four stages in order
//! (tokenize, frequency, co-occurrence, graph), notifying a
//! [`PipelineObserver`] at each boundary, and hands back a
//! [`PipelineOutcome`].
//!
//! All outputs of a completed run live in a [`PipelineContext`]. The
//! context can rebuild its graph for a different threshold without
//! re-tokenizing.

use std::sync::atomic::AtomicBool;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::graph::builder::build_graph;
use crate::graph::cooccurrence::CooccurrenceTable;
use crate::graph::csr::{GraphStats, KeywordGraph};
use crate::graph::encoding::VisualEncoding;
use crate::nlp::analyzer::{MorphAnalyzer, RuleAnalyzer};
use crate::nlp::tokenizer::{BatchReport, DocumentOutcome, Tokenizer};
use crate::pipeline::observer::{
    PipelineObserver, StageClock, StageReportBuilder, STAGE_COOCCURRENCE,
    STAGE_FREQUENCY, STAGE_GRAPH, STAGE_TOKENIZE,
};
use crate::pipeline::spec::RunSpec;
use crate::pipeline::validation::ValidationEngine;
use crate::stats::frequency::{FrequencyTable, TokenCount};
use crate::types::{Document, NetworkConfig};

/// Enter a tracing span for a pipeline stage.
macro_rules! trace_stage {
    ($name:expr) => {
        let _span = tracing::info_span!("pipeline_stage", stage = $name).entered();
    };
}

// ============================================================================
// Outcome and context
// ============================================================================

/// Result of a pipeline run
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// Every stage ran; the graph may still be empty
    Completed(PipelineContext),
    /// No token survived tokenization, so nothing downstream ran
    EmptyVocabulary(BatchReport),
}

impl PipelineOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_empty_vocabulary(&self) -> bool {
        matches!(self, Self::EmptyVocabulary(_))
    }

    pub fn context(&self) -> Option<&PipelineContext> {
        match self {
            Self::Completed(ctx) => Some(ctx),
            Self::EmptyVocabulary(_) => None,
        }
    }

    pub fn into_context(self) -> Option<PipelineContext> {
        match self {
            Self::Completed(ctx) => Some(ctx),
            Self::EmptyVocabulary(_) => None,
        }
    }

    /// Per-document tokenization outcomes, available either way
    pub fn batch_report(&self) -> &BatchReport {
        match self {
            Self::Completed(ctx) => ctx.report(),
            Self::EmptyVocabulary(report) => report,
        }
    }
}

/// Outputs of a completed run.
///
/// Stage outputs are read-only. Only the graph can be replaced, through
/// [`PipelineContext::rebuild_graph`].
#[derive(Debug, Clone)]
pub struct PipelineContext {
    config: NetworkConfig,
    report: BatchReport,
    token_lists: Vec<Vec<String>>,
    frequencies: FrequencyTable,
    pairs: CooccurrenceTable,
    graph: KeywordGraph,
}

impl PipelineContext {
    /// Configuration the current graph was built with
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn report(&self) -> &BatchReport {
        &self.report
    }

    pub fn token_lists(&self) -> &[Vec<String>] {
        &self.token_lists
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn pairs(&self) -> &CooccurrenceTable {
        &self.pairs
    }

    pub fn graph(&self) -> &KeywordGraph {
        &self.graph
    }

    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }

    /// The `top_n` most frequent tokens
    pub fn top_words(&self) -> Vec<TokenCount> {
        self.frequencies.top_n(self.config.top_n)
    }

    /// Render-ready node sizes and edge widths for the current graph
    pub fn encoding(&self) -> VisualEncoding {
        VisualEncoding::encode(&self.graph, &self.config.encoding_scale())
    }

    /// Replace the graph with one built from the stored pair counts.
    ///
    /// The previous graph is kept when `min_weight` is invalid.
    pub fn rebuild_graph(&mut self, min_weight: i64) -> Result<&KeywordGraph> {
        let config = self.config.clone().with_min_weight(min_weight);
        config.validate()?;
        let threshold = config.edge_threshold()?;

        trace_stage!(STAGE_GRAPH);
        self.graph = build_graph(&self.pairs, threshold);
        self.config = config;
        debug!(
            min_weight = threshold,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "rebuilt graph"
        );
        Ok(&self.graph)
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// The four-stage keyword network pipeline
#[derive(Debug, Clone)]
pub struct Pipeline<A = RuleAnalyzer> {
    config: NetworkConfig,
    tokenizer: Tokenizer<A>,
    min_weight: u32,
}

impl Pipeline<RuleAnalyzer> {
    /// Build a pipeline with the built-in rule analyzer
    pub fn new(config: NetworkConfig) -> Result<Self> {
        Self::with_analyzer(config, RuleAnalyzer::new())
    }
}

impl<A: MorphAnalyzer> Pipeline<A> {
    /// Build a pipeline around a custom analyzer.
    ///
    /// Fails with [`crate::NetworkError::InvalidConfig`] listing every
    /// configuration error.
    pub fn with_analyzer(config: NetworkConfig, analyzer: A) -> Result<Self> {
        let report = ValidationEngine::with_defaults()
            .validate(&RunSpec::from_config(&config))
            .into_result()?;
        for warning in report.warnings() {
            warn!(%warning, "configuration warning");
        }
        config.validate()?;
        let min_weight = config.edge_threshold()?;

        let tokenizer = Tokenizer::from_config(&config, analyzer);
        Ok(Self {
            config,
            tokenizer,
            min_weight,
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Tokenizer<A> {
        &self.tokenizer
    }

    /// Run every stage over `documents`.
    pub fn run(
        &self,
        documents: &[Document],
        observer: &mut impl PipelineObserver,
    ) -> PipelineOutcome {
        self.run_with_cancel(documents, None, observer)
    }

    /// Run every stage, stopping tokenization early once `cancel` is set.
    ///
    /// Documents not yet tokenized when the flag flips are reported as
    /// skipped; the downstream stages still run over what was produced.
    pub fn run_with_cancel(
        &self,
        documents: &[Document],
        cancel: Option<&AtomicBool>,
        observer: &mut impl PipelineObserver,
    ) -> PipelineOutcome {
        // Stage 1: Tokenize
        let report = {
            trace_stage!(STAGE_TOKENIZE);
            observer.on_stage_start(STAGE_TOKENIZE);
            let clock = StageClock::start();
            let report = self.tokenizer.tokenize_batch_with_cancel(documents, cancel);
            let stage = StageReportBuilder::new(clock.elapsed())
                .documents(report.len())
                .skipped(report.skipped_count())
                .tokens(report.total_tokens())
                .build();
            observer.on_stage_end(STAGE_TOKENIZE, &stage);
            observer.on_batch(&report);
            report
        };

        self.run_downstream(report, observer)
    }

    /// Run the downstream stages over already tokenized lists.
    ///
    /// The lists are used as given: no cleaning, filtering or analysis is
    /// applied again.
    pub fn run_token_lists(
        &self,
        token_lists: Vec<Vec<String>>,
        observer: &mut impl PipelineObserver,
    ) -> PipelineOutcome {
        let report = BatchReport {
            outcomes: token_lists
                .into_iter()
                .map(DocumentOutcome::Tokenized)
                .collect(),
        };
        observer.on_batch(&report);
        self.run_downstream(report, observer)
    }

    fn run_downstream(
        &self,
        report: BatchReport,
        observer: &mut impl PipelineObserver,
    ) -> PipelineOutcome {
        if report.is_empty_vocabulary() {
            warn!(
                documents = report.len(),
                skipped = report.skipped_count(),
                "no tokens survived tokenization"
            );
            return PipelineOutcome::EmptyVocabulary(report);
        }

        let token_lists = report.token_lists();

        // Stage 2: Frequency
        let frequencies = {
            trace_stage!(STAGE_FREQUENCY);
            observer.on_stage_start(STAGE_FREQUENCY);
            let clock = StageClock::start();
            let table = FrequencyTable::aggregate(&token_lists);
            let stage = StageReportBuilder::new(clock.elapsed())
                .tokens(table.len())
                .build();
            observer.on_stage_end(STAGE_FREQUENCY, &stage);
            observer.on_frequencies(&table);
            table
        };

        // Stage 3: Co-occurrence
        let pairs = {
            trace_stage!(STAGE_COOCCURRENCE);
            observer.on_stage_start(STAGE_COOCCURRENCE);
            let clock = StageClock::start();
            let pairs = CooccurrenceTable::extract_pairs_parallel(&token_lists);
            let stage = StageReportBuilder::new(clock.elapsed())
                .documents(token_lists.len())
                .pairs(pairs.len())
                .build();
            observer.on_stage_end(STAGE_COOCCURRENCE, &stage);
            observer.on_pairs(&pairs);
            pairs
        };

        // Stage 4: Graph
        let graph = {
            trace_stage!(STAGE_GRAPH);
            observer.on_stage_start(STAGE_GRAPH);
            let clock = StageClock::start();
            let graph = build_graph(&pairs, self.min_weight);
            let stage = StageReportBuilder::new(clock.elapsed())
                .nodes(graph.node_count())
                .edges(graph.edge_count())
                .build();
            observer.on_stage_end(STAGE_GRAPH, &stage);
            observer.on_graph(&graph);
            graph
        };

        if graph.is_empty() {
            info!(
                min_weight = self.min_weight,
                pairs = pairs.len(),
                "no pair reaches the edge threshold"
            );
        }

        PipelineOutcome::Completed(PipelineContext {
            config: self.config.clone(),
            report,
            token_lists,
            frequencies,
            pairs,
            graph,
        })
    }
}

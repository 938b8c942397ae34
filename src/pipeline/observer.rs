//! Pipeline observer: hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at stage boundaries without coupling to
//! stage logic. Every hook has a no-op default, so an observer only
//! implements what it cares about.

use std::time::{Duration, Instant};

use crate::graph::cooccurrence::CooccurrenceTable;
use crate::graph::csr::KeywordGraph;
use crate::nlp::tokenizer::BatchReport;
use crate::stats::frequency::FrequencyTable;

pub const STAGE_TOKENIZE: &str = "tokenize";
pub const STAGE_FREQUENCY: &str = "frequency";
pub const STAGE_COOCCURRENCE: &str = "cooccurrence";
pub const STAGE_GRAPH: &str = "graph";

// ============================================================================
// Stage timing
// ============================================================================

/// Wall-clock timer for a single stage
#[derive(Debug, Clone, Copy)]
pub struct StageClock {
    started: Instant,
}

impl StageClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// What a stage did and how long it took.
///
/// Counters are `None` for stages where they do not apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    elapsed: Duration,
    documents: Option<usize>,
    skipped: Option<usize>,
    tokens: Option<usize>,
    pairs: Option<usize>,
    nodes: Option<usize>,
    edges: Option<usize>,
}

impl StageReport {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            ..Default::default()
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn documents(&self) -> Option<usize> {
        self.documents
    }

    pub fn skipped(&self) -> Option<usize> {
        self.skipped
    }

    pub fn tokens(&self) -> Option<usize> {
        self.tokens
    }

    pub fn pairs(&self) -> Option<usize> {
        self.pairs
    }

    pub fn nodes(&self) -> Option<usize> {
        self.nodes
    }

    pub fn edges(&self) -> Option<usize> {
        self.edges
    }
}

/// Fluent construction of a [`StageReport`] with counters
#[derive(Debug, Clone)]
pub struct StageReportBuilder {
    report: StageReport,
}

impl StageReportBuilder {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            report: StageReport::new(elapsed),
        }
    }

    pub fn documents(mut self, n: usize) -> Self {
        self.report.documents = Some(n);
        self
    }

    pub fn skipped(mut self, n: usize) -> Self {
        self.report.skipped = Some(n);
        self
    }

    pub fn tokens(mut self, n: usize) -> Self {
        self.report.tokens = Some(n);
        self
    }

    pub fn pairs(mut self, n: usize) -> Self {
        self.report.pairs = Some(n);
        self
    }

    pub fn nodes(mut self, n: usize) -> Self {
        self.report.nodes = Some(n);
        self
    }

    pub fn edges(mut self, n: usize) -> Self {
        self.report.edges = Some(n);
        self
    }

    pub fn build(self) -> StageReport {
        self.report
    }
}

// ============================================================================
// Observer trait
// ============================================================================

/// Callbacks fired by [`super::runner::Pipeline`] as stages complete
pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}

    /// Per-document tokenization outcomes
    fn on_batch(&mut self, _report: &BatchReport) {}

    fn on_frequencies(&mut self, _table: &FrequencyTable) {}

    fn on_pairs(&mut self, _pairs: &CooccurrenceTable) {}

    fn on_graph(&mut self, _graph: &KeywordGraph) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Observer that records a [`StageReport`] per completed stage, in order
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    reports: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[(&'static str, StageReport)] {
        &self.reports
    }

    /// Report for `stage`, if it ran
    pub fn report(&self, stage: &str) -> Option<&StageReport> {
        self.reports
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, r)| r)
    }

    pub fn total_elapsed(&self) -> Duration {
        self.reports.iter().map(|(_, r)| r.elapsed()).sum()
    }
}

impl PipelineObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.reports.push((stage, report.clone()));
    }
}

//! Tokenization
//!
//! Cleans raw text, runs it through a [`MorphAnalyzer`] and keeps content
//! morphemes that pass the role, stopword and length filters. Batches are
//! tokenized per document so that one bad document never blanks a run.

use crate::errors::{NetworkError, Result};
use crate::nlp::analyzer::{MorphAnalyzer, RuleAnalyzer};
use crate::nlp::cleaner::TextCleaner;
use crate::nlp::stopwords::StopwordSet;
use crate::types::{Document, NetworkConfig, PosTag};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Why a document contributed no tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Neither title nor description carried text
    MissingText,
    /// The analyzer rejected the document
    AnalyzerFailure(String),
    /// The run was interrupted before this document started
    Cancelled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingText => write!(f, "document has no text"),
            SkipReason::AnalyzerFailure(reason) => write!(f, "analyzer failure: {reason}"),
            SkipReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Per-document tokenization result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOutcome {
    Tokenized(Vec<String>),
    Skipped(SkipReason),
}

impl DocumentOutcome {
    /// Tokens of this document (empty when skipped)
    pub fn tokens(&self) -> &[String] {
        match self {
            DocumentOutcome::Tokenized(tokens) => tokens,
            DocumentOutcome::Skipped(_) => &[],
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DocumentOutcome::Skipped(_))
    }
}

/// Outcome of tokenizing a whole collection, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    /// Token list for every document, skipped documents yield empty lists
    pub fn token_lists(&self) -> Vec<Vec<String>> {
        self.outcomes.iter().map(|o| o.tokens().to_vec()).collect()
    }

    /// Number of documents in the batch
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn tokenized_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_skipped()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    /// Iterate over `(document index, reason)` for skipped documents
    pub fn skipped(&self) -> impl Iterator<Item = (usize, &SkipReason)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| match o {
                DocumentOutcome::Skipped(reason) => Some((i, reason)),
                DocumentOutcome::Tokenized(_) => None,
            })
    }

    /// Skipped documents as [`NetworkError::MalformedDocument`] values.
    ///
    /// Cancelled documents are not malformed and are left out.
    pub fn malformed(&self) -> impl Iterator<Item = NetworkError> + '_ {
        self.skipped()
            .filter(|(_, reason)| **reason != SkipReason::Cancelled)
            .map(|(index, reason)| NetworkError::MalformedDocument {
                index,
                reason: reason.to_string(),
            })
    }

    /// Total surviving tokens across the collection
    pub fn total_tokens(&self) -> usize {
        self.outcomes.iter().map(|o| o.tokens().len()).sum()
    }

    /// True when no token survived anywhere in the collection
    pub fn is_empty_vocabulary(&self) -> bool {
        self.total_tokens() == 0
    }
}

/// Text to content-token converter
#[derive(Debug, Clone)]
pub struct Tokenizer<A = RuleAnalyzer> {
    cleaner: TextCleaner,
    analyzer: A,
    stopwords: StopwordSet,
    include_pos: Vec<PosTag>,
    min_token_length: usize,
    stem: bool,
}

impl Default for Tokenizer<RuleAnalyzer> {
    fn default() -> Self {
        Self::new(RuleAnalyzer::new(), StopwordSet::default())
    }
}

impl<A: MorphAnalyzer> Tokenizer<A> {
    /// Create a tokenizer keeping nouns, verbs and adjectives of length > 1
    pub fn new(analyzer: A, stopwords: StopwordSet) -> Self {
        Self {
            cleaner: TextCleaner::new(),
            analyzer,
            stopwords,
            include_pos: vec![PosTag::Noun, PosTag::Verb, PosTag::Adjective],
            min_token_length: 2,
            stem: true,
        }
    }

    /// Create a tokenizer from a run configuration
    ///
    /// The base stopword list is unioned with `config.stopwords`.
    pub fn from_config(config: &NetworkConfig, analyzer: A) -> Self {
        let stopwords = StopwordSet::default().with_user_stopwords(&config.stopwords);
        Self::new(analyzer, stopwords)
            .with_include_pos(config.include_pos.clone())
            .with_min_token_length(config.min_token_length)
            .with_stem(config.stem)
    }

    pub fn with_include_pos(mut self, tags: Vec<PosTag>) -> Self {
        self.include_pos = tags;
        self
    }

    pub fn with_min_token_length(mut self, len: usize) -> Self {
        self.min_token_length = len;
        self
    }

    pub fn with_stem(mut self, stem: bool) -> Self {
        self.stem = stem;
        self
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Tokenize an optional text field
    ///
    /// A missing field yields an empty sequence. Analyzer failures are
    /// returned to the caller; batch tokenization turns them into skips.
    pub fn tokenize(&self, text: Option<&str>) -> Result<Vec<String>> {
        match text {
            Some(text) => self.tokenize_text(text),
            None => Ok(Vec::new()),
        }
    }

    /// Tokenize a text, preserving analyzer order
    pub fn tokenize_text(&self, text: &str) -> Result<Vec<String>> {
        let cleaned = self.cleaner.clean(text);
        let morphemes = self.analyzer.analyze(&cleaned, self.stem)?;

        Ok(morphemes
            .into_iter()
            .filter(|m| self.include_pos.contains(&m.pos))
            .filter(|m| !self.stopwords.is_stopword(&m.surface))
            .filter(|m| m.char_len() >= self.min_token_length)
            .map(|m| m.surface)
            .collect())
    }

    /// Tokenize one document into an outcome
    pub fn tokenize_document(&self, index: usize, document: &Document) -> DocumentOutcome {
        let Some(text) = document.text() else {
            warn!(document = index, "skipping document: no text");
            return DocumentOutcome::Skipped(SkipReason::MissingText);
        };

        match self.tokenize_text(&text) {
            Ok(tokens) => DocumentOutcome::Tokenized(tokens),
            Err(err) => {
                warn!(
                    document = index,
                    analyzer = self.analyzer.name(),
                    error = %err,
                    "skipping document: analyzer failure"
                );
                DocumentOutcome::Skipped(SkipReason::AnalyzerFailure(err.to_string()))
            }
        }
    }

    /// Tokenize a collection in parallel, preserving input order
    pub fn tokenize_batch(&self, documents: &[Document]) -> BatchReport {
        self.tokenize_batch_with_cancel(documents, None)
    }

    /// Tokenize a collection, checking `cancel` before each document
    ///
    /// Documents not started once `cancel` is set are reported as
    /// [`SkipReason::Cancelled`]; documents already tokenized are kept.
    pub fn tokenize_batch_with_cancel(
        &self,
        documents: &[Document],
        cancel: Option<&AtomicBool>,
    ) -> BatchReport {
        let outcomes: Vec<DocumentOutcome> = documents
            .par_iter()
            .enumerate()
            .map(|(i, doc)| {
                if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                    return DocumentOutcome::Skipped(SkipReason::Cancelled);
                }
                self.tokenize_document(i, doc)
            })
            .collect();

        let report = BatchReport { outcomes };
        debug!(
            documents = report.len(),
            tokenized = report.tokenized_count(),
            skipped = report.skipped_count(),
            tokens = report.total_tokens(),
            "tokenized batch"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Morpheme;
    use std::sync::Arc;

    /// Analyzer that fails on any text containing a marker word
    struct FailOn(&'static str);

    impl MorphAnalyzer for FailOn {
        fn analyze(&self, text: &str, stem: bool) -> Result<Vec<Morpheme>> {
            if text.contains(self.0) {
                return Err(NetworkError::analyzer("boom"));
            }
            RuleAnalyzer::new().analyze(text, stem)
        }

        fn name(&self) -> &'static str {
            "fail_on"
        }
    }

    /// Analyzer that raises the cancel flag once it reaches a marker word
    struct CancelOn {
        marker: &'static str,
        flag: Arc<AtomicBool>,
    }

    impl MorphAnalyzer for CancelOn {
        fn analyze(&self, text: &str, stem: bool) -> Result<Vec<Morpheme>> {
            if text.contains(self.marker) {
                self.flag.store(true, Ordering::Relaxed);
            }
            RuleAnalyzer::new().analyze(text, stem)
        }

        fn name(&self) -> &'static str {
            "cancel_on"
        }
    }

    fn tokenizer() -> Tokenizer {
        Tokenizer::new(RuleAnalyzer::new(), StopwordSet::empty())
    }

    #[test]
    fn test_tokenize_scenario() {
        let tokens = tokenizer()
            .tokenize(Some("서울 맛집 추천 서울 여행"))
            .unwrap();
        assert_eq!(tokens, vec!["서울", "맛집", "추천", "서울", "여행"]);
    }

    #[test]
    fn test_missing_text_is_empty() {
        assert!(tokenizer().tokenize(None).unwrap().is_empty());
    }

    #[test]
    fn test_filters_length_and_role() {
        // "이" is too short, "정말" is an adverb, "를" is a particle
        let tokens = tokenizer().tokenize_text("이 정말 날씨를 확인").unwrap();
        assert_eq!(tokens, vec!["날씨", "확인"]);
    }

    #[test]
    fn test_filters_both_stopword_lists() {
        let stopwords = StopwordSet::from_list(&["맛집"]).with_user_stopwords(["여행"]);
        let tokenizer = Tokenizer::new(RuleAnalyzer::new(), stopwords);

        let tokens = tokenizer.tokenize_text("서울 맛집 여행 추천").unwrap();
        assert_eq!(tokens, vec!["서울", "추천"]);
    }

    #[test]
    fn test_cleans_before_analysis() {
        let tokens = tokenizer()
            .tokenize_text("<p>서울</p> 맛집ㅋㅋ!! hello@blog.com")
            .unwrap();
        assert_eq!(tokens, vec!["서울", "맛집"]);
    }

    #[test]
    fn test_stemmed_verbs_survive() {
        let tokens = tokenizer().tokenize_text("맛집 추천합니다").unwrap();
        assert_eq!(tokens, vec!["맛집", "추천하다"]);
    }

    #[test]
    fn test_latin_dropped_unless_included() {
        let tokens = tokenizer().tokenize_text("서울 cafe").unwrap();
        assert_eq!(tokens, vec!["서울"]);

        let tokens = tokenizer()
            .with_include_pos(vec![PosTag::Noun, PosTag::Alpha])
            .tokenize_text("서울 cafe")
            .unwrap();
        assert_eq!(tokens, vec!["서울", "cafe"]);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let tokenizer = Tokenizer::new(FailOn("폭탄"), StopwordSet::empty());
        let docs = vec![
            Document::from_text("서울 맛집"),
            Document::from_text("폭탄 문서"),
            Document::default(),
            Document::new("서울 날씨", "오늘"),
        ];

        let report = tokenizer.tokenize_batch(&docs);

        assert_eq!(report.len(), 4);
        assert_eq!(report.tokenized_count(), 2);
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(report.outcomes[0].tokens(), ["서울", "맛집"]);
        assert_eq!(report.outcomes[3].tokens(), ["서울", "날씨", "오늘"]);

        let skipped: Vec<usize> = report.skipped().map(|(i, _)| i).collect();
        assert_eq!(skipped, vec![1, 2]);
        assert!(matches!(
            report.outcomes[1],
            DocumentOutcome::Skipped(SkipReason::AnalyzerFailure(_))
        ));
        assert_eq!(
            report.outcomes[2],
            DocumentOutcome::Skipped(SkipReason::MissingText)
        );

        let malformed: Vec<NetworkError> = report.malformed().collect();
        assert_eq!(malformed.len(), 2);
        assert!(matches!(
            malformed[0],
            NetworkError::MalformedDocument { index: 1, .. }
        ));
    }

    #[test]
    fn test_batch_cancelled() {
        let cancel = AtomicBool::new(true);
        let docs = vec![Document::from_text("서울"), Document::from_text("맛집")];

        let report = tokenizer().tokenize_batch_with_cancel(&docs, Some(&cancel));

        assert_eq!(report.skipped_count(), 2);
        assert!(report
            .skipped()
            .all(|(_, reason)| *reason == SkipReason::Cancelled));
        assert!(report.is_empty_vocabulary());
        assert_eq!(report.malformed().count(), 0);
    }

    #[test]
    fn test_batch_cancelled_midway_keeps_finished_documents() {
        let flag = Arc::new(AtomicBool::new(false));
        let tokenizer = Tokenizer::new(
            CancelOn {
                marker: "중단",
                flag: Arc::clone(&flag),
            },
            StopwordSet::empty(),
        );
        let mut docs = vec![Document::from_text("서울 맛집 중단")];
        docs.extend((0..49).map(|_| Document::from_text("부산 바다 여행")));

        // a single worker visits documents in order, so the flag is raised
        // while the first document is being analyzed
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let report = pool.install(|| tokenizer.tokenize_batch_with_cancel(&docs, Some(&flag)));

        assert_eq!(report.len(), 50);
        assert_eq!(report.tokenized_count(), 1);
        assert_eq!(report.skipped_count(), 49);
        assert_eq!(report.token_lists()[0], vec!["서울", "맛집", "중단"]);
        assert!(report
            .skipped()
            .all(|(i, reason)| i > 0 && *reason == SkipReason::Cancelled));
        assert!(!report.is_empty_vocabulary());
        assert_eq!(report.malformed().count(), 0);
    }

    #[test]
    fn test_from_config_unions_stopwords() {
        let cfg = NetworkConfig::default().with_stopwords(["맛집"]);
        let tokenizer = Tokenizer::from_config(&cfg, RuleAnalyzer::new());

        assert!(tokenizer.stopwords().is_user_stopword("맛집"));
        assert!(tokenizer.stopwords().is_base_stopword("있다"));
        assert_eq!(
            tokenizer.tokenize_text("서울 맛집 있다").unwrap(),
            vec!["서울"]
        );
    }
}

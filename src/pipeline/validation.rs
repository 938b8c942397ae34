//! Validation engine for run specifications.
//!
//! The engine runs all registered [`ValidationRule`]s against a
//! [`RunSpec`](super::spec::RunSpec) and collects every diagnostic into a
//! [`ValidationReport`]. It never stops at the first error, so users see
//! all problems at once.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use keyword_network::pipeline::validation::ValidationEngine;
//!
//! let engine = ValidationEngine::with_defaults();
//! let report = engine.validate(&spec);
//! if report.has_errors() {
//!     for err in report.errors() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use serde::Serialize;

use super::errors::{ErrorCode, SpecError};
use super::spec::*;
use crate::errors::{NetworkError, Result};
use crate::types::{NetworkConfig, PosTag};

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

/// A single validation finding attached to a [`SpecError`].
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: SpecError,
}

impl ValidationDiagnostic {
    pub fn error(err: SpecError) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: SpecError) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &SpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    /// Iterate over warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &SpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Fold every error into a single [`NetworkError::InvalidConfig`].
    pub fn into_result(self) -> Result<Self> {
        if self.is_valid() {
            return Ok(self);
        }
        let joined = self
            .errors()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(NetworkError::invalid_config(joined))
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects a [`RunSpec`] and returns zero or
/// more diagnostics.
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier for this rule (e.g., `"edge_threshold"`).
    fn name(&self) -> &str;

    fn validate(&self, spec: &RunSpec) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against a [`RunSpec`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(VersionRule));
        engine.add_rule(Box::new(EdgeThresholdRule));
        engine.add_rule(Box::new(TokenFilterRule));
        engine.add_rule(Box::new(StopwordShapeRule));
        engine.add_rule(Box::new(DisplayScaleRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Run all rules against `spec` and return the collected report.
    pub fn validate(&self, spec: &RunSpec) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(spec));
        }
        report
    }

    /// Validate `spec` and fold it into a runnable configuration.
    ///
    /// Fails with [`NetworkError::InvalidConfig`] listing every error; the
    /// returned report carries the remaining warnings.
    pub fn resolve(&self, spec: &RunSpec) -> Result<(NetworkConfig, ValidationReport)> {
        let report = self.validate(spec).into_result()?;
        let config = spec.to_config();
        config.validate()?;
        Ok((config, report))
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. Only v1 specs are understood ────────────────────────────────────────

struct VersionRule;

impl ValidationRule for VersionRule {
    fn name(&self) -> &str {
        "version"
    }

    fn validate(&self, spec: &RunSpec) -> Vec<ValidationDiagnostic> {
        if spec.v == 1 {
            return vec![];
        }
        vec![ValidationDiagnostic::error(
            SpecError::new(
                ErrorCode::UnsupportedVersion,
                "/v",
                format!("unsupported spec version {}", spec.v),
            )
            .with_hint("Set \"v\": 1"),
        )]
    }
}

// ─── 2. min_weight is a positive count ──────────────────────────────────────

struct EdgeThresholdRule;

impl ValidationRule for EdgeThresholdRule {
    fn name(&self) -> &str {
        "edge_threshold"
    }

    fn validate(&self, spec: &RunSpec) -> Vec<ValidationDiagnostic> {
        match spec.graph.min_weight {
            Some(w) if w < 1 => vec![ValidationDiagnostic::error(
                SpecError::new(
                    ErrorCode::OutOfRange,
                    "/graph/min_weight",
                    format!("min_weight must be >= 1, got {w}"),
                )
                .with_hint("Use 1 to keep every co-occurring pair"),
            )],
            Some(w) if w > u32::MAX as i64 => vec![ValidationDiagnostic::error(
                SpecError::new(
                    ErrorCode::OutOfRange,
                    "/graph/min_weight",
                    format!("min_weight must be <= {}, got {w}", u32::MAX),
                ),
            )],
            _ => vec![],
        }
    }
}

// ─── 3. Token filter must be able to keep something ─────────────────────────

struct TokenFilterRule;

impl ValidationRule for TokenFilterRule {
    fn name(&self) -> &str {
        "token_filter"
    }

    fn validate(&self, spec: &RunSpec) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();

        if let Some(len) = spec.tokenizer.min_token_length.filter(|&n| n < 2) {
            out.push(ValidationDiagnostic::error(
                SpecError::new(
                    ErrorCode::OutOfRange,
                    "/tokenizer/min_token_length",
                    format!("min_token_length must be at least 2, got {len}"),
                )
                .with_hint("Single-character tokens are always dropped; use 2 or more"),
            ));
        }

        if let Some(tags) = &spec.tokenizer.include_pos {
            if tags.is_empty() {
                out.push(ValidationDiagnostic::error(
                    SpecError::new(
                        ErrorCode::EmptySelection,
                        "/tokenizer/include_pos",
                        "include_pos must name at least one tag",
                    )
                    .with_hint("Remove include_pos to keep Noun, Verb and Adjective"),
                ));
            } else if !tags.iter().any(PosTag::is_content_word) {
                out.push(ValidationDiagnostic::warning(SpecError::new(
                    ErrorCode::IneffectiveValue,
                    "/tokenizer/include_pos",
                    "include_pos keeps no content words; the graph will be built from function words",
                )));
            }
        }

        out
    }
}

// ─── 4. Stopwords are matched against single tokens ─────────────────────────

struct StopwordShapeRule;

impl ValidationRule for StopwordShapeRule {
    fn name(&self) -> &str {
        "stopword_shape"
    }

    fn validate(&self, spec: &RunSpec) -> Vec<ValidationDiagnostic> {
        spec.tokenizer
            .stopwords
            .iter()
            .enumerate()
            .filter_map(|(i, word)| {
                let path = format!("/tokenizer/stopwords/{i}");
                if word.trim().is_empty() {
                    Some(SpecError::new(
                        ErrorCode::IneffectiveValue,
                        path,
                        "blank stopword is ignored",
                    ))
                } else if word.chars().any(char::is_whitespace) {
                    Some(
                        SpecError::new(
                            ErrorCode::IneffectiveValue,
                            path,
                            format!("stopword \"{word}\" contains whitespace and can never match a token"),
                        )
                        .with_hint("List each word separately"),
                    )
                } else {
                    None
                }
            })
            .map(ValidationDiagnostic::warning)
            .collect()
    }
}

// ─── 5. Display scaling must be positive ────────────────────────────────────

struct DisplayScaleRule;

impl ValidationRule for DisplayScaleRule {
    fn name(&self) -> &str {
        "display_scale"
    }

    fn validate(&self, spec: &RunSpec) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();

        if spec.display.top_n == Some(0) {
            out.push(ValidationDiagnostic::error(SpecError::new(
                ErrorCode::OutOfRange,
                "/display/top_n",
                "top_n must be greater than 0",
            )));
        }

        let checks: &[(&str, Option<f64>)] = &[
            ("node_scale", spec.display.node_scale),
            ("max_edge_width", spec.display.max_edge_width),
        ];

        for &(field, value) in checks {
            if let Some(v) = value {
                if !(v.is_finite() && v > 0.0) {
                    out.push(ValidationDiagnostic::error(
                        SpecError::new(
                            ErrorCode::OutOfRange,
                            format!("/display/{field}"),
                            format!("{field} must be a positive number, got {v}"),
                        )
                        .with_hint(format!("Remove {field} to use the default")),
                    ));
                }
            }
        }

        out
    }
}

// ─── 6. Unknown fields (strict → error, non-strict → warning) ──────────────

struct UnknownFieldsRule;

impl UnknownFieldsRule {
    /// Collect unknown-field diagnostics at the given JSON pointer `path`.
    fn check_unknowns(
        path: &str,
        unknowns: &std::collections::HashMap<String, serde_json::Value>,
        strict: bool,
    ) -> Vec<ValidationDiagnostic> {
        let mut keys: Vec<&String> = unknowns.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| {
                let diag_fn = if strict {
                    ValidationDiagnostic::error
                } else {
                    ValidationDiagnostic::warning
                };
                diag_fn(
                    SpecError::new(
                        ErrorCode::UnknownField,
                        format!("{path}/{key}"),
                        format!("unrecognized field \"{key}\""),
                    )
                    .with_hint("Check spelling or remove this field"),
                )
            })
            .collect()
    }
}

impl ValidationRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, spec: &RunSpec) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        out.extend(Self::check_unknowns("", &spec.unknown_fields, spec.strict));
        out.extend(Self::check_unknowns(
            "/graph",
            &spec.graph.unknown_fields,
            spec.strict,
        ));
        out.extend(Self::check_unknowns(
            "/tokenizer",
            &spec.tokenizer.unknown_fields,
            spec.strict,
        ));
        out.extend(Self::check_unknowns(
            "/display",
            &spec.display.unknown_fields,
            spec.strict,
        ));
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════

//! Structured reporting for registry conversion runs.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use iban_registry_core::{IbanRegistry, validate_registry};

use crate::parser::ParseDiagnostics;

/// Summary of one IBAN registry conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseReport {
    /// RFC 3339 timestamp of the run.
    pub generated_at: String,
    pub total_lines: usize,
    pub recognized_lines: usize,
    /// Distinct unrecognized header labels, in first-seen order.
    pub ignored_headers: Vec<String>,
    /// Recognized header labels that appeared more than once.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repeated_headers: Vec<String>,
    pub record_count: usize,
    pub country_count: usize,
    /// Countries covered by more than one record; the later record won.
    pub overwritten_countries: Vec<String>,
    /// Structural inconsistencies found in the derived registry.
    pub validation_issues: Vec<String>,
}

impl ParseReport {
    /// Assembles a report from parse diagnostics and the finished registry.
    pub fn new(
        diagnostics: &ParseDiagnostics,
        record_count: usize,
        registry: &IbanRegistry,
        overwritten_countries: Vec<String>,
    ) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            total_lines: diagnostics.total_lines,
            recognized_lines: diagnostics.recognized_lines,
            ignored_headers: diagnostics.ignored_headers.clone(),
            repeated_headers: diagnostics.repeated_headers.clone(),
            record_count,
            country_count: registry.len(),
            overwritten_countries,
            validation_issues: validate_registry(registry)
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Returns `true` when the registry passed every structural check.
    pub fn is_clean(&self) -> bool {
        self.validation_issues.is_empty()
    }
}

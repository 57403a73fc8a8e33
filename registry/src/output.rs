//! Output formatting for registries, bank lists and reports.

use iban_registry_core::{BankRecord, IbanRegistry};

use crate::report::ParseReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

/// Formats an IBAN registry in the requested output format.
///
/// JSON output is the artifact downstream loaders read.
pub fn format_registry(registry: &IbanRegistry, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(registry)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(registry).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(registry_to_markdown(registry)),
        OutputFormat::Table => Ok(registry_to_table(registry)),
    }
}

/// Formats a bank list in the requested output format.
pub fn format_bank_records(records: &[BankRecord], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(records)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(records).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(banks_to_markdown(records)),
        OutputFormat::Table => Ok(banks_to_table(records)),
    }
}

/// Formats a conversion report in the requested output format.
pub fn format_report(report: &ParseReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(report_to_markdown(report)),
        OutputFormat::Table => Ok(report_to_table(report)),
    }
}

fn registry_to_markdown(registry: &IbanRegistry) -> String {
    let mut out = String::new();

    out.push_str("# IBAN registry\n\n");
    out.push_str(&format!("**Countries:** {}\n\n", registry.len()));
    out.push_str("| Country | BBAN structure | IBAN structure | BBAN | IBAN | Bank | Branch | Account |\n");
    out.push_str("|---------|----------------|----------------|------|------|------|--------|---------|\n");
    for (country, entry) in registry.iter() {
        let p = &entry.positions;
        out.push_str(&format!(
            "| {country} | `{}` | `{}` | {} | {} | {} | {} | {} |\n",
            entry.bban_spec,
            entry.iban_spec,
            entry.bban_length,
            entry.iban_length,
            p.bank_code,
            p.branch_code,
            p.account_code
        ));
    }

    out
}

fn registry_to_table(registry: &IbanRegistry) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<4} {:<20} {:>5} {:>5} {:<10} {:<10} {:<10}\n",
        "CC", "BBAN", "BLEN", "ILEN", "BANK", "BRANCH", "ACCOUNT"
    ));
    for (country, entry) in registry.iter() {
        let p = &entry.positions;
        out.push_str(&format!(
            "{:<4} {:<20} {:>5} {:>5} {:<10} {:<10} {:<10}\n",
            country,
            entry.bban_spec,
            entry.bban_length,
            entry.iban_length,
            p.bank_code.to_string(),
            p.branch_code.to_string(),
            p.account_code.to_string()
        ));
    }

    out
}

fn banks_to_markdown(records: &[BankRecord]) -> String {
    let mut out = String::new();

    out.push_str("| Country | Bank code | BIC | Name |\n");
    out.push_str("|---------|-----------|-----|------|\n");
    for bank in records {
        out.push_str(&format!(
            "| {} | `{}` | {} | {} |\n",
            bank.country_code, bank.bank_code, bank.bic, bank.name
        ));
    }

    out
}

fn banks_to_table(records: &[BankRecord]) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<4} {:<10} {:<12} {}\n", "CC", "CODE", "BIC", "NAME"));
    for bank in records {
        out.push_str(&format!(
            "{:<4} {:<10} {:<12} {}\n",
            bank.country_code, bank.bank_code, bank.bic, bank.name
        ));
    }

    out
}

fn report_to_markdown(report: &ParseReport) -> String {
    let mut out = String::new();

    out.push_str("## Conversion report\n\n");
    out.push_str(&format!("- **Generated:** {}\n", report.generated_at));
    out.push_str(&format!(
        "- **Lines:** {} recognized of {}\n",
        report.recognized_lines, report.total_lines
    ));
    out.push_str(&format!("- **Records:** {}\n", report.record_count));
    out.push_str(&format!("- **Countries:** {}\n", report.country_count));

    if !report.overwritten_countries.is_empty() {
        out.push_str(&format!(
            "- **Overwritten:** {}\n",
            report.overwritten_countries.join(", ")
        ));
    }

    if !report.ignored_headers.is_empty() {
        out.push_str("\n### Ignored headers\n\n");
        for header in &report.ignored_headers {
            out.push_str(&format!("- {header}\n"));
        }
    }

    if !report.validation_issues.is_empty() {
        out.push_str("\n### Validation issues\n\n");
        for issue in &report.validation_issues {
            out.push_str(&format!("- {issue}\n"));
        }
    }

    out.push('\n');
    out
}

fn report_to_table(report: &ParseReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Generated:   {}\n", report.generated_at));
    out.push_str(&format!(
        "Lines:       {}/{}\n",
        report.recognized_lines, report.total_lines
    ));
    out.push_str(&format!("Records:     {}\n", report.record_count));
    out.push_str(&format!("Countries:   {}\n", report.country_count));
    if !report.overwritten_countries.is_empty() {
        out.push_str(&format!(
            "Overwritten: {}\n",
            report.overwritten_countries.join(", ")
        ));
    }
    for issue in &report.validation_issues {
        out.push_str(&format!("Issue:       {issue}\n"));
    }

    out
}

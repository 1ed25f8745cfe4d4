//! Verify content and report problems without writing anything.

use anyhow::{Context, Result};
use qikb_core::report::SkippedDocument;
use qikb_core::{BuildReport, Config, Diagnostic, KbBuilder};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct VerificationSummary<'a> {
    discovered: usize,
    parsed: usize,
    entries: usize,
    pages: usize,
    errors: usize,
    warnings: usize,
    skipped: &'a [SkippedDocument],
    diagnostics: &'a [Diagnostic],
}

/// Run discovery, parsing and collision checks, then print the report.
pub fn verify_kb(config_path: &Path, json: bool) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let mut build = KbBuilder::new(config)
        .build()
        .context("Failed to build knowledge base for verification")?;

    let entries = build.search_index().len();
    let pages = build.wiki().pages.len();
    let report: &BuildReport = &build.report;

    let summary = VerificationSummary {
        discovered: report.discovered,
        parsed: report.parsed,
        entries,
        pages,
        errors: report.errors(),
        warnings: report.warnings(),
        skipped: &report.skipped,
        diagnostics: &report.diagnostics,
    };

    if json {
        let payload = serde_json::to_string_pretty(&summary)?;
        println!("{}", payload);
    } else {
        println!(
            "Verification complete: {} discovered, {} parsed, {} index entries, {} pages, {} errors, {} warnings",
            summary.discovered,
            summary.parsed,
            summary.entries,
            summary.pages,
            summary.errors,
            summary.warnings
        );
        for skipped in summary.skipped {
            println!(
                "- skipped {} ({}): {}",
                skipped.source_path, skipped.stage, skipped.reason
            );
        }
        for diag in summary.diagnostics {
            println!("- {}", diag);
        }
    }

    Ok(())
}

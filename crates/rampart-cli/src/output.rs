//! Output formatting and display utilities
//!
//! Provides colored, formatted output for the CLI

use colored::Colorize;

use rampart::catalog::types::CatalogStatistics;
use rampart::coverage::{CoverageReport, CoverageStatus};
use rampart::validation::ValidationReport;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", msg.bold().underline());
}

/// Print a subheader
pub fn subheader(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Print the catalog statistics summary shown after a successful run
pub fn print_statistics(stats: &CatalogStatistics) {
    subheader("Catalog Statistics:");
    println!("  Total Controls:    {}", stats.total_controls);
    println!("  Base Controls:     {}", stats.base_controls);
    println!("  Enhancements:      {}", stats.enhancements);
    println!("  Families:          {}", stats.families);
    println!("  Low Baseline:      {}", stats.low_baseline);
    println!("  Moderate Baseline: {}", stats.moderate_baseline);
    println!("  High Baseline:     {}", stats.high_baseline);
}

/// Print validation results: failures first, then warnings, then a summary
pub fn print_validation_report(report: &ValidationReport) {
    let failures: Vec<_> = report.failures().collect();

    if !failures.is_empty() {
        subheader("Validation Failures:");
        for check in &failures {
            println!(
                "  {} {}: {}",
                "✗".red(),
                check.name,
                check.detail.as_deref().unwrap_or("failed")
            );
        }
    }

    if !report.warnings.is_empty() {
        subheader("Warnings:");
        for w in &report.warnings {
            println!("  {} {}", "⚠".yellow(), w);
        }
    }

    println!();
    if report.is_success() {
        success(&format!("All {} consistency checks passed", report.checks.len()));
    } else {
        error(&format!(
            "{} of {} consistency checks failed",
            failures.len(),
            report.checks.len()
        ));
    }
}

/// Print a per-control coverage listing with aggregate stats
pub fn print_coverage_report(report: &CoverageReport) {
    subheader("Coverage:");
    for entry in &report.coverage {
        let (icon, label) = match entry.status {
            CoverageStatus::Covered => ("✓".green(), "covered  "),
            CoverageStatus::Partial => ("◐".yellow(), "partial  "),
            CoverageStatus::Uncovered => ("✗".red(), "uncovered"),
        };
        if entry.tools.is_empty() {
            println!("  {icon} {label} {}", entry.control_id);
        } else {
            println!(
                "  {icon} {label} {}  ({})",
                entry.control_id,
                entry.tools.join(", ")
            );
        }
    }

    let stats = report.stats;
    subheader("Coverage Summary:");
    println!("  Total:     {}", stats.total);
    println!("  Covered:   {}", stats.covered);
    println!("  Partial:   {}", stats.partial);
    println!("  Uncovered: {}", stats.uncovered);
}

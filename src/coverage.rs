//! Tool-coverage calculator
//!
//! Classifies every control of a selected baseline as covered, partially
//! covered, or uncovered given a set of tool-to-control mapping documents.
//! Evaluation is independent per control: a tool that fully covers one
//! control and partially covers another contributes differently to each.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::id::normalize;
use crate::error::{Error, Result};

/// How completely a single mapping entry satisfies its control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageLevel {
    Full,
    Partial,
}

/// One tool-to-control mapping entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlMappingEntry {
    pub control_id: String,

    pub coverage: CoverageLevel,

    #[serde(default)]
    pub rationale: String,
}

/// A tool's control mapping document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolControlMapping {
    pub tool_id: String,

    pub tool_name: String,

    #[serde(default)]
    pub vendor: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub mappings: Vec<ControlMappingEntry>,
}

impl ToolControlMapping {
    /// Load a tool mapping document from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::DocumentRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| Error::DocumentParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Mapping entries naming the given normalized control id
    fn entries_for<'a>(
        &'a self,
        control_id: &'a str,
    ) -> impl Iterator<Item = &'a ControlMappingEntry> + 'a {
        self.mappings
            .iter()
            .filter(move |m| normalize(&m.control_id) == control_id)
    }
}

/// Computed coverage status of one baseline control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageStatus {
    Covered,
    Partial,
    Uncovered,
}

/// Per-control coverage result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlCoverage {
    pub control_id: String,

    pub status: CoverageStatus,

    /// Names of the tools contributing any mapping for this control
    pub tools: Vec<String>,
}

/// Aggregate counts over a coverage report; always sums to `total`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageStats {
    pub total: usize,
    pub covered: usize,
    pub partial: usize,
    pub uncovered: usize,
}

/// The on-demand coverage report for one baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub coverage: Vec<ControlCoverage>,
    pub stats: CoverageStats,
}

impl CoverageReport {
    /// Export as pretty-printed JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Classify every control of a baseline against the selected tools
///
/// Status rule, per control:
/// - zero contributing tools → uncovered
/// - any contributing tool with a full-coverage entry → covered
/// - otherwise → partial
pub fn compute_coverage<I, S>(baseline_controls: I, tools: &[ToolControlMapping]) -> CoverageReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let coverage: Vec<ControlCoverage> = baseline_controls
        .into_iter()
        .map(|id| classify_control(id.as_ref(), tools))
        .collect();

    let mut stats = CoverageStats {
        total: coverage.len(),
        ..Default::default()
    };
    for entry in &coverage {
        match entry.status {
            CoverageStatus::Covered => stats.covered += 1,
            CoverageStatus::Partial => stats.partial += 1,
            CoverageStatus::Uncovered => stats.uncovered += 1,
        }
    }

    CoverageReport { coverage, stats }
}

fn classify_control(control_id: &str, tools: &[ToolControlMapping]) -> ControlCoverage {
    let mut contributing = Vec::new();
    let mut has_full = false;

    for tool in tools {
        let mut contributes = false;
        for entry in tool.entries_for(control_id) {
            contributes = true;
            if entry.coverage == CoverageLevel::Full {
                has_full = true;
            }
        }
        if contributes {
            contributing.push(tool.tool_name.clone());
        }
    }

    let status = if contributing.is_empty() {
        CoverageStatus::Uncovered
    } else if has_full {
        CoverageStatus::Covered
    } else {
        CoverageStatus::Partial
    };

    ControlCoverage {
        control_id: control_id.to_string(),
        status,
        tools: contributing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(name: &str, entries: &[(&str, CoverageLevel)]) -> ToolControlMapping {
        ToolControlMapping {
            tool_id: name.to_lowercase(),
            tool_name: name.to_string(),
            vendor: "Acme".to_string(),
            category: "scanner".to_string(),
            mappings: entries
                .iter()
                .map(|(id, level)| ControlMappingEntry {
                    control_id: id.to_string(),
                    coverage: *level,
                    rationale: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_full_coverage_wins_over_partial() {
        let tools = vec![
            tool("Scanner", &[("AC-2", CoverageLevel::Full)]),
            tool("Monitor", &[("AC-2", CoverageLevel::Partial)]),
        ];
        let report = compute_coverage(["AC-2"], &tools);

        assert_eq!(report.coverage[0].status, CoverageStatus::Covered);
        assert_eq!(report.coverage[0].tools, vec!["Scanner", "Monitor"]);
    }

    #[test]
    fn test_partial_only_classifies_partial() {
        let tools = vec![tool("Monitor", &[("AC-2", CoverageLevel::Partial)])];
        let report = compute_coverage(["AC-2"], &tools);
        assert_eq!(report.coverage[0].status, CoverageStatus::Partial);
    }

    #[test]
    fn test_uncovered_with_empty_tools_list() {
        let tools = vec![tool("Scanner", &[("AC-2", CoverageLevel::Full)])];
        let report = compute_coverage(["SI-4"], &tools);

        assert_eq!(report.coverage[0].status, CoverageStatus::Uncovered);
        assert!(report.coverage[0].tools.is_empty());
    }

    #[test]
    fn test_per_control_independence() {
        // one tool: full on AC-2, partial on AU-6
        let tools = vec![tool(
            "Scanner",
            &[("AC-2", CoverageLevel::Full), ("AU-6", CoverageLevel::Partial)],
        )];
        let report = compute_coverage(["AC-2", "AU-6"], &tools);

        assert_eq!(report.coverage[0].status, CoverageStatus::Covered);
        assert_eq!(report.coverage[1].status, CoverageStatus::Partial);
    }

    #[test]
    fn test_stats_sum_to_total() {
        let tools = vec![
            tool("Scanner", &[("AC-2", CoverageLevel::Full)]),
            tool("Monitor", &[("AU-6", CoverageLevel::Partial)]),
        ];
        let report = compute_coverage(["AC-2", "AU-6", "SI-4", "SC-7"], &tools);

        let stats = report.stats;
        assert_eq!(stats.total, 4);
        assert_eq!(stats.covered, 1);
        assert_eq!(stats.partial, 1);
        assert_eq!(stats.uncovered, 2);
        assert_eq!(stats.covered + stats.partial + stats.uncovered, stats.total);
    }

    #[test]
    fn test_mapping_ids_are_normalized_for_comparison() {
        let tools = vec![tool("Scanner", &[("ac-2.1", CoverageLevel::Full)])];
        let report = compute_coverage(["AC-2(1)"], &tools);
        assert_eq!(report.coverage[0].status, CoverageStatus::Covered);
    }

    #[test]
    fn test_mapping_document_json_roundtrip() {
        let json = r#"{
            "toolId": "acme-scanner",
            "toolName": "Acme Scanner",
            "vendor": "Acme",
            "category": "vulnerability-scanner",
            "mappings": [
                {"controlId": "ra-5", "coverage": "full", "rationale": "Performs authenticated scans."},
                {"controlId": "si-2", "coverage": "partial", "rationale": "Detects but does not remediate."}
            ]
        }"#;

        let mapping: ToolControlMapping = serde_json::from_str(json).unwrap();
        assert_eq!(mapping.tool_id, "acme-scanner");
        assert_eq!(mapping.mappings.len(), 2);
        assert_eq!(mapping.mappings[0].coverage, CoverageLevel::Full);
    }
}

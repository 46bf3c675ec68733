//! End-of-pipeline consistency checks
//!
//! Consistency-check failures are distinct from structural errors: they do
//! not stop earlier stages from completing, but any failed check stops the
//! run from being considered successful. A run either reports success with
//! a statistics summary or a specific, itemized list of failures.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::baseline::{Baseline, BaselineSets};
use crate::catalog::id::compare_ids;
use crate::catalog::types::CatalogArtifact;

/// Outcome of a single consistency check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCheck {
    /// Stable check name (e.g., "statistics-sum")
    pub name: String,

    pub passed: bool,

    /// Details, especially for failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ValidationCheck {
    /// Create a passing check
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: None,
        }
    }

    /// Create a failed check with a detail message
    pub fn failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: Some(detail.into()),
        }
    }
}

/// Itemized validation report for one pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checks: Vec<ValidationCheck>,

    /// Non-blocking observations (e.g., unknown family codes)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Whether every check passed
    pub fn is_success(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Iterator over failed checks
    pub fn failures(&self) -> impl Iterator<Item = &ValidationCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn failure_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    fn check(&mut self, name: &str, ok: bool, detail: String) {
        if ok {
            self.checks.push(ValidationCheck::passed(name));
        } else {
            self.checks.push(ValidationCheck::failed(name, detail));
        }
    }
}

/// Context a validation run needs beyond the artifact itself
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Size of the family metadata table
    pub expected_family_count: usize,

    /// Family codes the transform observed but could not index
    pub unknown_families: &'a [String],

    /// The resolved NIST baseline sets
    pub baseline_sets: &'a BaselineSets,
}

/// Run all consistency checks against a transformed catalog artifact
pub fn validate_catalog(artifact: &CatalogArtifact, ctx: &ValidationContext) -> ValidationReport {
    let mut report = ValidationReport::default();
    let stats = &artifact.statistics;

    report.check(
        "statistics-sum",
        stats.base_controls + stats.enhancements == stats.total_controls,
        format!(
            "baseControls ({}) + enhancements ({}) != totalControls ({})",
            stats.base_controls, stats.enhancements, stats.total_controls
        ),
    );

    report.check(
        "family-count",
        artifact.families.len() >= ctx.expected_family_count,
        format!(
            "family index has {} families, expected at least {}",
            artifact.families.len(),
            ctx.expected_family_count
        ),
    );

    // every control outside the family index must be an unknown-family one
    let indexed: usize = artifact.families.iter().map(|f| f.total_controls).sum();
    let unindexed = artifact
        .controls
        .iter()
        .filter(|c| ctx.unknown_families.contains(&c.family))
        .count();
    report.check(
        "family-totals",
        indexed + unindexed == stats.total_controls,
        format!(
            "sum of family totals ({indexed}) plus unindexed controls ({unindexed}) != totalControls ({})",
            stats.total_controls
        ),
    );

    for baseline in Baseline::ALL {
        report.check(
            &format!("baseline-present-{}", baseline.key()),
            !ctx.baseline_sets.get(baseline).is_empty(),
            format!("{} baseline resolved to an empty set", baseline.name()),
        );
    }

    report.check(
        "canonical-order",
        artifact
            .controls
            .windows(2)
            .all(|w| compare_ids(&w[0].id, &w[1].id) != std::cmp::Ordering::Greater),
        "controls are not in canonical sort order".to_string(),
    );

    validate_enhancement_links(artifact, &mut report);

    if !ctx.unknown_families.is_empty() {
        report.warnings.push(format!(
            "controls with unknown family codes are excluded from the family index: {}",
            ctx.unknown_families.join(", ")
        ));
    }

    report
}

/// The parent/enhancement relation must be bidirectional: every
/// enhancement's parent exists and lists it, and every listed enhancement
/// points back at its owner
fn validate_enhancement_links(artifact: &CatalogArtifact, report: &mut ValidationReport) {
    let by_id: HashMap<&str, &crate::catalog::types::Control> = artifact
        .controls
        .iter()
        .map(|c| (c.id.as_str(), c))
        .collect();

    let mut broken = Vec::new();

    for control in &artifact.controls {
        if let Some(parent_id) = control.parent_control.as_deref() {
            match by_id.get(parent_id) {
                Some(parent) if parent.enhancements.iter().any(|e| e == &control.id) => {}
                Some(_) => broken.push(format!("{} not listed by parent {parent_id}", control.id)),
                None => broken.push(format!("{} references missing parent {parent_id}", control.id)),
            }
        }
        for enhancement_id in &control.enhancements {
            match by_id.get(enhancement_id.as_str()) {
                Some(enh) if enh.parent_control.as_deref() == Some(control.id.as_str()) => {}
                Some(_) => broken.push(format!(
                    "{enhancement_id} does not point back at {}",
                    control.id
                )),
                None => broken.push(format!(
                    "{} lists missing enhancement {enhancement_id}",
                    control.id
                )),
            }
        }
    }

    report.check(
        "enhancement-links",
        broken.is_empty(),
        format!("broken parent/enhancement links: {}", broken.join("; ")),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineSet;
    use crate::catalog::id::family_of;
    use crate::catalog::transform::transform;
    use crate::catalog::types::{BaselineApplicability, Control};
    use crate::data::FamilyMetadata;
    use chrono::Utc;

    fn control(id: &str, parent: Option<&str>, enhancements: &[&str]) -> Control {
        Control {
            id: id.to_string(),
            family: family_of(id),
            title: format!("Control {id}"),
            statement: String::new(),
            guidance: String::new(),
            baselines: BaselineApplicability::default(),
            params: Vec::new(),
            enhancements: enhancements.iter().map(|s| s.to_string()).collect(),
            parent_control: parent.map(str::to_string),
            related_controls: Vec::new(),
        }
    }

    fn sets() -> BaselineSets {
        BaselineSets {
            low: BaselineSet::from_ids(["ac-2"]),
            moderate: BaselineSet::from_ids(["ac-2"]),
            high: BaselineSet::from_ids(["ac-2"]),
        }
    }

    fn artifact_from(controls: Vec<Control>) -> (CatalogArtifact, Vec<String>) {
        let metadata = FamilyMetadata::builtin().unwrap();
        let transformed = transform(controls, &sets(), &metadata);
        let unknown = transformed.unknown_families.clone();
        (
            transformed.into_artifact("5.1.1", "NIST SP 800-53", "", Utc::now()),
            unknown,
        )
    }

    #[test]
    fn test_consistent_catalog_passes() {
        let (artifact, unknown) = artifact_from(vec![
            control("AC-2", None, &["AC-2(1)"]),
            control("AC-2(1)", Some("AC-2"), &[]),
        ]);
        let sets = sets();
        let report = validate_catalog(
            &artifact,
            &ValidationContext {
                expected_family_count: 20,
                unknown_families: &unknown,
                baseline_sets: &sets,
            },
        );

        assert!(
            report.is_success(),
            "failures: {:?}",
            report.failures().collect::<Vec<_>>()
        );
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_baseline_fails_validation() {
        let (artifact, unknown) = artifact_from(vec![control("AC-2", None, &[])]);
        let empty_sets = BaselineSets::default();
        let report = validate_catalog(
            &artifact,
            &ValidationContext {
                expected_family_count: 20,
                unknown_families: &unknown,
                baseline_sets: &empty_sets,
            },
        );

        assert!(!report.is_success());
        assert_eq!(report.failure_count(), 3);
        assert!(report
            .failures()
            .all(|c| c.name.starts_with("baseline-present-")));
    }

    #[test]
    fn test_broken_parent_link_fails() {
        // enhancement whose parent never lists it
        let (artifact, unknown) = artifact_from(vec![
            control("AC-2", None, &[]),
            control("AC-2(1)", Some("AC-2"), &[]),
        ]);
        let sets = sets();
        let report = validate_catalog(
            &artifact,
            &ValidationContext {
                expected_family_count: 20,
                unknown_families: &unknown,
                baseline_sets: &sets,
            },
        );

        let links = report
            .checks
            .iter()
            .find(|c| c.name == "enhancement-links")
            .unwrap();
        assert!(!links.passed);
        assert!(links.detail.as_deref().unwrap().contains("AC-2(1)"));
    }

    #[test]
    fn test_unknown_families_warn_but_do_not_fail() {
        let (artifact, unknown) = artifact_from(vec![
            control("AC-2", None, &[]),
            control("XX-1", None, &[]),
        ]);
        let sets = sets();
        let report = validate_catalog(
            &artifact,
            &ValidationContext {
                expected_family_count: 20,
                unknown_families: &unknown,
                baseline_sets: &sets,
            },
        );

        assert!(report.is_success());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("XX"));
    }

    #[test]
    fn test_family_count_shortfall_fails() {
        let (artifact, unknown) = artifact_from(vec![control("AC-2", None, &[])]);
        let sets = sets();
        let report = validate_catalog(
            &artifact,
            &ValidationContext {
                expected_family_count: 21,
                unknown_families: &unknown,
                baseline_sets: &sets,
            },
        );

        assert!(report.failures().any(|c| c.name == "family-count"));
    }
}

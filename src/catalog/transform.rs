//! Catalog transformer, family index builder, and statistics
//!
//! Combines the normalizer's flat control sequence with the resolved
//! baseline sets, then derives the family index and whole-catalog
//! statistics. Everything is recomputed wholesale on every run; nothing is
//! mutated incrementally.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::baseline::BaselineSets;
use crate::catalog::id::compare_ids;
use crate::catalog::types::{
    CatalogArtifact, CatalogStatistics, Control, ControlFamily,
};
use crate::data::FamilyMetadata;

/// The output of a transform run, prior to artifact assembly
#[derive(Debug, Clone)]
pub struct TransformedCatalog {
    /// Final control list in canonical order
    pub controls: Vec<Control>,

    /// Family index, sorted by family code
    pub families: Vec<ControlFamily>,

    pub statistics: CatalogStatistics,

    /// Family codes observed on controls but absent from the metadata
    /// table. Such controls count toward statistics yet are invisible in
    /// the family index; validation reports them by name.
    pub unknown_families: Vec<String>,
}

/// Transform normalized controls into the final catalog shape
///
/// Baseline flags come from direct membership tests against the three
/// baseline sets; each control and enhancement is tested independently,
/// with no inheritance in either direction.
pub fn transform(
    mut controls: Vec<Control>,
    sets: &BaselineSets,
    metadata: &FamilyMetadata,
) -> TransformedCatalog {
    for control in &mut controls {
        control.baselines = sets.applicability(&control.id);
    }

    sort_controls(&mut controls);

    let (families, unknown_families) = build_family_index(&controls, metadata);
    let statistics = compute_statistics(&controls);

    debug!(
        controls = statistics.total_controls,
        families = families.len(),
        unknown = unknown_families.len(),
        "catalog transform complete"
    );

    TransformedCatalog {
        controls,
        families,
        statistics,
        unknown_families,
    }
}

/// Canonical control order: family code lexicographic, control number
/// numeric, base control before its enhancements, enhancements by their own
/// numeric suffix ascending
pub fn sort_controls(controls: &mut [Control]) {
    controls.sort_by(|a, b| compare_ids(&a.id, &b.id));
}

/// Build the family index
///
/// One record per known family code is seeded from the metadata table, so
/// every known family appears even with zero controls; each control then
/// folds into its family's counters.
fn build_family_index(
    controls: &[Control],
    metadata: &FamilyMetadata,
) -> (Vec<ControlFamily>, Vec<String>) {
    let mut families: Vec<ControlFamily> = metadata
        .iter()
        .map(|info| ControlFamily {
            id: info.id.clone(),
            name: info.name.clone(),
            description: info.description.clone(),
            total_controls: 0,
            base_controls: 0,
            low_baseline: 0,
            moderate_baseline: 0,
            high_baseline: 0,
        })
        .collect();
    families.sort_by(|a, b| a.id.cmp(&b.id));

    let mut unknown = BTreeSet::new();
    for control in controls {
        let Some(family) = families.iter_mut().find(|f| f.id == control.family) else {
            unknown.insert(control.family.clone());
            continue;
        };
        family.total_controls += 1;
        if !control.is_enhancement() {
            family.base_controls += 1;
        }
        if control.baselines.low {
            family.low_baseline += 1;
        }
        if control.baselines.moderate {
            family.moderate_baseline += 1;
        }
        if control.baselines.high {
            family.high_baseline += 1;
        }
    }

    (families, unknown.into_iter().collect())
}

/// Single pass over the final control list; never recomputed from the
/// family index
fn compute_statistics(controls: &[Control]) -> CatalogStatistics {
    let mut stats = CatalogStatistics::default();
    let mut seen_families = BTreeSet::new();

    for control in controls {
        stats.total_controls += 1;
        if control.is_enhancement() {
            stats.enhancements += 1;
        } else {
            stats.base_controls += 1;
        }
        if control.baselines.low {
            stats.low_baseline += 1;
        }
        if control.baselines.moderate {
            stats.moderate_baseline += 1;
        }
        if control.baselines.high {
            stats.high_baseline += 1;
        }
        seen_families.insert(control.family.as_str());
    }

    stats.families = seen_families.len();
    stats
}

impl TransformedCatalog {
    /// Assemble the catalog artifact
    pub fn into_artifact(
        self,
        version: impl Into<String>,
        source: impl Into<String>,
        source_url: impl Into<String>,
        generated_at: DateTime<Utc>,
    ) -> CatalogArtifact {
        CatalogArtifact {
            version: version.into(),
            generated_at,
            source: source.into(),
            source_url: source_url.into(),
            controls: self.controls,
            families: self.families,
            statistics: self.statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineSet;
    use crate::catalog::id::family_of;
    use crate::catalog::types::{BaselineApplicability, Parameter};

    fn control(id: &str, parent: Option<&str>) -> Control {
        Control {
            id: id.to_string(),
            family: family_of(id),
            title: format!("Control {id}"),
            statement: String::new(),
            guidance: String::new(),
            baselines: BaselineApplicability::default(),
            params: Vec::<Parameter>::new(),
            enhancements: Vec::new(),
            parent_control: parent.map(str::to_string),
            related_controls: Vec::new(),
        }
    }

    fn metadata() -> FamilyMetadata {
        FamilyMetadata::builtin().unwrap()
    }

    fn sets() -> BaselineSets {
        BaselineSets {
            low: BaselineSet::from_ids(["ac-2"]),
            moderate: BaselineSet::from_ids(["ac-2", "ac-2.1", "au-6"]),
            high: BaselineSet::from_ids(["ac-2", "ac-2.1", "au-6", "ac-10"]),
        }
    }

    #[test]
    fn test_sort_order_scenario() {
        let mut controls = vec![
            control("AC-10", None),
            control("AC-2", None),
            control("AC-9", None),
            control("AC-2(1)", Some("AC-2")),
        ];
        sort_controls(&mut controls);
        let ids: Vec<&str> = controls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["AC-2", "AC-2(1)", "AC-9", "AC-10"]);
    }

    #[test]
    fn test_baseline_flags_from_direct_membership() {
        let controls = vec![control("AC-2", None), control("AC-2(1)", Some("AC-2"))];
        let result = transform(controls, &sets(), &metadata());

        let base = &result.controls[0];
        assert!(base.baselines.low && base.baselines.moderate && base.baselines.high);

        // the enhancement does not inherit its parent's low membership
        let enh = &result.controls[1];
        assert!(!enh.baselines.low);
        assert!(enh.baselines.moderate && enh.baselines.high);
    }

    #[test]
    fn test_statistics_sum_invariant() {
        let controls = vec![
            control("AC-2", None),
            control("AC-2(1)", Some("AC-2")),
            control("AC-10", None),
            control("AU-6", None),
        ];
        let result = transform(controls, &sets(), &metadata());
        let stats = &result.statistics;

        assert_eq!(stats.total_controls, 4);
        assert_eq!(stats.base_controls + stats.enhancements, stats.total_controls);
        assert_eq!(stats.base_controls, 3);
        assert_eq!(stats.families, 2);
        assert_eq!(stats.low_baseline, 1);
        assert_eq!(stats.moderate_baseline, 3);
        assert_eq!(stats.high_baseline, 4);
    }

    #[test]
    fn test_family_index_seeded_and_folded() {
        let controls = vec![
            control("AC-2", None),
            control("AC-2(1)", Some("AC-2")),
            control("AU-6", None),
        ];
        let result = transform(controls, &sets(), &metadata());

        // every known family is present, even with zero controls
        assert_eq!(result.families.len(), 20);
        assert!(result.families.windows(2).all(|w| w[0].id < w[1].id));

        let ac = result.families.iter().find(|f| f.id == "AC").unwrap();
        assert_eq!(ac.total_controls, 2);
        assert_eq!(ac.base_controls, 1);
        assert_eq!(ac.moderate_baseline, 2);

        let sr = result.families.iter().find(|f| f.id == "SR").unwrap();
        assert_eq!(sr.total_controls, 0);

        // family totals reconcile with statistics
        let family_total: usize = result.families.iter().map(|f| f.total_controls).sum();
        assert_eq!(family_total, result.statistics.total_controls);
    }

    #[test]
    fn test_unknown_family_counted_but_invisible() {
        let controls = vec![control("AC-2", None), control("XX-1", None)];
        let result = transform(controls, &sets(), &metadata());

        // counted toward statistics
        assert_eq!(result.statistics.total_controls, 2);
        assert_eq!(result.statistics.families, 2);

        // invisible in the family index, surfaced by name instead
        assert!(result.families.iter().all(|f| f.id != "XX"));
        assert_eq!(result.unknown_families, vec!["XX"]);
    }

    #[test]
    fn test_deterministic_output() {
        let make = || {
            let controls = vec![
                control("SC-7", None),
                control("AC-2(1)", Some("AC-2")),
                control("AC-2", None),
            ];
            transform(controls, &sets(), &metadata())
        };
        let a = make();
        let b = make();

        let ids = |t: &TransformedCatalog| {
            t.controls.iter().map(|c| c.id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(ids(&a), ids(&b));
        assert_eq!(a.statistics, b.statistics);
    }
}

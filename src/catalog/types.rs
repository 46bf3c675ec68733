//! Derived catalog entities and output artifacts
//!
//! Everything here is created fresh on each pipeline run and serialized
//! camelCase for the consuming browser application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-baseline applicability flags for a single control
///
/// The three tiers are independent booleans: membership is tested per
/// control against each baseline set, with no inheritance between a base
/// control and its enhancements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineApplicability {
    pub low: bool,
    pub moderate: bool,
    pub high: bool,
}

impl BaselineApplicability {
    /// Whether the control belongs to any baseline
    pub fn any(&self) -> bool {
        self.low || self.moderate || self.high
    }
}

/// An organization-defined parameter carried by a control
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// A normalized, flattened control
///
/// Base controls and enhancements share this shape; enhancements carry
/// `parent_control` and appear in their parent's `enhancements` list. The
/// relation is bidirectional and stays consistent after every transform run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    /// Canonical uppercase identifier (e.g., "AC-2(1)")
    pub id: String,

    /// Two-letter family code (e.g., "AC")
    pub family: String,

    pub title: String,

    /// Full statement text; lettered sub-parts joined with newlines
    pub statement: String,

    /// Supplemental guidance prose, empty if the source has none
    #[serde(default)]
    pub guidance: String,

    pub baselines: BaselineApplicability,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Parameter>,

    /// Ids of enhancements owned by this control (base controls only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enhancements: Vec<String>,

    /// Owning base control id (enhancements only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_control: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_controls: Vec<String>,
}

impl Control {
    /// Whether this control is an enhancement
    pub fn is_enhancement(&self) -> bool {
        self.parent_control.is_some()
    }
}

/// Aggregated counters for one control family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlFamily {
    /// Two-letter family code
    pub id: String,

    pub name: String,

    pub description: String,

    pub total_controls: usize,

    /// Controls excluding enhancements
    pub base_controls: usize,

    pub low_baseline: usize,
    pub moderate_baseline: usize,
    pub high_baseline: usize,
}

/// Whole-catalog statistics, computed in a single pass over the final list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatistics {
    pub total_controls: usize,
    pub base_controls: usize,
    pub enhancements: usize,
    pub families: usize,
    pub low_baseline: usize,
    pub moderate_baseline: usize,
    pub high_baseline: usize,
}

/// The transformed catalog artifact consumed by the application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogArtifact {
    /// Catalog version from the source metadata (e.g., "5.1.1")
    pub version: String,

    pub generated_at: DateTime<Utc>,

    pub source: String,

    pub source_url: String,

    pub controls: Vec<Control>,

    pub families: Vec<ControlFamily>,

    pub statistics: CatalogStatistics,
}

impl CatalogArtifact {
    /// Export as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Controls belonging to the given baseline, in catalog order
    pub fn baseline_controls(&self, baseline: crate::baseline::Baseline) -> Vec<&Control> {
        self.controls
            .iter()
            .filter(|c| baseline.applies(&c.baselines))
            .collect()
    }
}

/// Lightweight projection of the catalog's family table
///
/// Kept separate from the full catalog artifact so clients can render the
/// family browser without loading every control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyIndexArtifact {
    pub version: String,

    pub generated_at: DateTime<Utc>,

    /// Version of the catalog this index was projected from
    pub catalog_version: String,

    pub families: Vec<ControlFamily>,

    /// Family codes in the same order as `families`
    pub family_ids: Vec<String>,
}

impl FamilyIndexArtifact {
    /// Project a family index from a transformed catalog
    pub fn from_catalog(artifact: &CatalogArtifact, generated_at: DateTime<Utc>) -> Self {
        Self {
            version: crate::ARTIFACT_VERSION.to_string(),
            generated_at,
            catalog_version: artifact.version.clone(),
            family_ids: artifact.families.iter().map(|f| f.id.clone()).collect(),
            families: artifact.families.clone(),
        }
    }

    /// Export as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(id: &str, parent: Option<&str>) -> Control {
        Control {
            id: id.to_string(),
            family: crate::catalog::id::family_of(id),
            title: format!("Control {id}"),
            statement: String::new(),
            guidance: String::new(),
            baselines: BaselineApplicability::default(),
            params: Vec::new(),
            enhancements: Vec::new(),
            parent_control: parent.map(str::to_string),
            related_controls: Vec::new(),
        }
    }

    #[test]
    fn test_control_serializes_camel_case() {
        let mut c = control("AC-2(1)", Some("AC-2"));
        c.related_controls = vec!["AC-6".to_string()];

        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["parentControl"], "AC-2");
        assert_eq!(json["relatedControls"][0], "AC-6");
        // empty collections are omitted entirely
        assert!(json.get("enhancements").is_none());
    }

    #[test]
    fn test_baseline_applicability_any() {
        assert!(!BaselineApplicability::default().any());
        assert!(BaselineApplicability {
            moderate: true,
            ..Default::default()
        }
        .any());
    }

    #[test]
    fn test_family_index_projection() {
        let now = Utc::now();
        let artifact = CatalogArtifact {
            version: "5.1.1".to_string(),
            generated_at: now,
            source: "NIST SP 800-53".to_string(),
            source_url: String::new(),
            controls: vec![control("AC-1", None)],
            families: vec![ControlFamily {
                id: "AC".to_string(),
                name: "Access Control".to_string(),
                description: String::new(),
                total_controls: 1,
                base_controls: 1,
                low_baseline: 0,
                moderate_baseline: 0,
                high_baseline: 0,
            }],
            statistics: CatalogStatistics::default(),
        };

        let index = FamilyIndexArtifact::from_catalog(&artifact, now);
        assert_eq!(index.catalog_version, "5.1.1");
        assert_eq!(index.family_ids, vec!["AC"]);
        assert_eq!(index.families.len(), 1);
    }
}

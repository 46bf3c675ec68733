//! FedRAMP baseline generator
//!
//! Derives the four FedRAMP baseline variants: each NIST tier overlaid with
//! the curated additional-control list for that tier, plus the LI-SaaS
//! allow-list, which is an enumerated set derived from no NIST baseline at
//! all. Generated baselines carry the organization-defined parameter
//! defaults whose family appears in their control set.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::baseline::{Baseline, BaselineSet, BaselineSets};
use crate::catalog::id::{compare_ids, family_of};
use crate::data::FedrampData;

/// One generated FedRAMP baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FedrampBaseline {
    /// Stable identifier (e.g., "fedramp-moderate")
    pub id: String,

    pub name: String,

    pub description: String,

    pub control_count: usize,

    /// Control ids in canonical order
    pub control_ids: Vec<String>,

    /// Parameter defaults whose family is present in `control_ids`
    pub parameter_defaults: BTreeMap<String, String>,
}

/// The FedRAMP baselines artifact, covering all four variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FedrampBaselinesArtifact {
    pub version: String,

    pub generated_at: DateTime<Utc>,

    pub source: String,

    pub source_url: String,

    pub baselines: Vec<FedrampBaseline>,
}

impl FedrampBaselinesArtifact {
    /// Export as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Look up a generated baseline by id
    pub fn get(&self, id: &str) -> Option<&FedrampBaseline> {
        self.baselines.iter().find(|b| b.id == id)
    }
}

/// Generate the four FedRAMP baselines from the resolved NIST sets and the
/// curated FedRAMP tables
pub fn generate(
    sets: &BaselineSets,
    data: &FedrampData,
    generated_at: DateTime<Utc>,
) -> FedrampBaselinesArtifact {
    let tiers = [
        (
            Baseline::Low,
            &data.additions.low,
            "fedramp-low",
            "FedRAMP Low",
            "NIST SP 800-53 low baseline with FedRAMP-required additions.",
        ),
        (
            Baseline::Moderate,
            &data.additions.moderate,
            "fedramp-moderate",
            "FedRAMP Moderate",
            "NIST SP 800-53 moderate baseline with FedRAMP-required additions.",
        ),
        (
            Baseline::High,
            &data.additions.high,
            "fedramp-high",
            "FedRAMP High",
            "NIST SP 800-53 high baseline with FedRAMP-required additions.",
        ),
    ];

    let mut baselines = Vec::with_capacity(4);
    for (tier, additions, id, name, description) in tiers {
        let merged = sets.get(tier).union_with(additions.iter());
        baselines.push(build_baseline(id, name, description, &merged, data));
    }

    // LI-SaaS stands alone: a fixed enumerated allow-list
    let li_saas = BaselineSet::from_ids(&data.li_saas);
    baselines.push(build_baseline(
        "fedramp-li-saas",
        "FedRAMP Tailored LI-SaaS",
        "Tailored baseline for low-impact software-as-a-service offerings.",
        &li_saas,
        data,
    ));

    FedrampBaselinesArtifact {
        version: crate::ARTIFACT_VERSION.to_string(),
        generated_at,
        source: "FedRAMP rev 5 baselines".to_string(),
        source_url: "https://www.fedramp.gov/documents/".to_string(),
        baselines,
    }
}

fn build_baseline(
    id: &str,
    name: &str,
    description: &str,
    set: &BaselineSet,
    data: &FedrampData,
) -> FedrampBaseline {
    let mut control_ids: Vec<String> = set.iter().map(str::to_string).collect();
    control_ids.sort_by(|a, b| compare_ids(a, b));

    FedrampBaseline {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        control_count: control_ids.len(),
        parameter_defaults: filter_parameter_defaults(set, data),
        control_ids,
    }
}

/// Attach parameter defaults whose family prefix matches a family present in
/// the baseline's control set
///
/// This is a filter, not a join: an entry is included verbatim whenever its
/// family matches, whether or not the exact control it parameterizes is in
/// the set.
fn filter_parameter_defaults(set: &BaselineSet, data: &FedrampData) -> BTreeMap<String, String> {
    let families: std::collections::BTreeSet<String> = set.iter().map(family_of).collect();

    data.parameter_defaults
        .iter()
        .filter(|(key, _)| families.contains(&family_of(key)))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

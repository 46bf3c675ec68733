//! Static policy data
//!
//! The family metadata table and the FedRAMP tables (additional-control
//! lists, the LI-SaaS allow-list, parameter defaults) are declarative YAML
//! data files rather than inline constants: FedRAMP policy data changes on
//! its own cadence and must be swappable without touching the
//! transformation logic. The files under `data/` are compiled in as
//! defaults; every loader also accepts an external path override.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const FAMILIES_YAML: &str = include_str!("../data/families.yaml");
const FEDRAMP_YAML: &str = include_str!("../data/fedramp.yaml");

/// Display metadata for one control family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyInfo {
    /// Two-letter family code (e.g., "AC")
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// The known-family metadata table, in file order
#[derive(Debug, Clone, Deserialize)]
pub struct FamilyMetadata {
    families: Vec<FamilyInfo>,
}

impl FamilyMetadata {
    /// The compiled-in family table
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(FAMILIES_YAML)
    }

    /// Parse a family table from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let table: Self = serde_yaml::from_str(yaml)?;
        for family in &table.families {
            if family.id.len() != 2 || !family.id.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(Error::policy_data(
                    "families",
                    format!("family code must be two uppercase letters, got {:?}", family.id),
                ));
            }
        }
        Ok(table)
    }

    /// Load a family table from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Look up a family by code
    pub fn get(&self, code: &str) -> Option<&FamilyInfo> {
        self.families.iter().find(|f| f.id == code)
    }

    /// Iterate families in file order
    pub fn iter(&self) -> impl Iterator<Item = &FamilyInfo> {
        self.families.iter()
    }

    /// Number of known families
    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// Additional required control ids per FedRAMP tier, overlaid on the
/// matching NIST baseline
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FedrampAdditions {
    #[serde(default)]
    pub low: Vec<String>,

    #[serde(default)]
    pub moderate: Vec<String>,

    #[serde(default)]
    pub high: Vec<String>,
}

/// The curated FedRAMP policy tables
#[derive(Debug, Clone, Deserialize)]
pub struct FedrampData {
    /// Per-tier overlay lists
    #[serde(default)]
    pub additions: FedrampAdditions,

    /// The LI-SaaS allow-list. Not derived from any NIST baseline: an
    /// enumerated, independently maintained set.
    #[serde(default)]
    pub li_saas: Vec<String>,

    /// Organization-defined parameter defaults, keyed by a lowercase
    /// family-prefixed parameter id (e.g., "ac-2_prm_1")
    #[serde(default)]
    pub parameter_defaults: BTreeMap<String, String>,
}

impl FedrampData {
    /// The compiled-in FedRAMP tables
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(FEDRAMP_YAML)
    }

    /// Parse FedRAMP tables from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let data: Self = serde_yaml::from_str(yaml)?;
        for key in data.parameter_defaults.keys() {
            if key.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(Error::policy_data(
                    "fedramp",
                    format!("parameter default key must be lowercase, got {key:?}"),
                ));
            }
        }
        Ok(data)
    }

    /// Load FedRAMP tables from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }
}

/// The full static policy data set consumed by a pipeline run
#[derive(Debug, Clone)]
pub struct PolicyData {
    pub families: FamilyMetadata,
    pub fedramp: FedrampData,
}

impl PolicyData {
    /// The compiled-in policy data
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            families: FamilyMetadata::builtin()?,
            fedramp: FedrampData::builtin()?,
        })
    }

    /// Load policy data from a directory holding `families.yaml` and
    /// `fedramp.yaml`
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            families: FamilyMetadata::from_file(dir.join("families.yaml"))?,
            fedramp: FedrampData::from_file(dir.join("fedramp.yaml"))?,
        })
    }
}

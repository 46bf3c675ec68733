//! Raw OSCAL catalog shapes
//!
//! Deserialization targets for the upstream catalog document (groups →
//! controls → parts/props/params → nested enhancement controls). These are
//! read-only input shapes: the normalizer consumes them and they are
//! discarded after flattening.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level OSCAL catalog document (`{"catalog": {...}}`)
#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalogDocument {
    pub catalog: RawCatalog,
}

impl RawCatalogDocument {
    /// Load a catalog document from a JSON file
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

    /// Parse a catalog document from JSON content
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::structural(format!("unparsable catalog: {e}")))
    }
}

/// The catalog body: metadata plus the group tree
#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalog {
    #[serde(default)]
    pub uuid: Option<String>,

    #[serde(default)]
    pub metadata: RawMetadata,

    #[serde(default)]
    pub groups: Vec<RawGroup>,

    /// Controls attached directly to the catalog root (rare, but legal)
    #[serde(default)]
    pub controls: Vec<RawControl>,
}

/// Catalog metadata block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(rename = "last-modified", default)]
    pub last_modified: Option<String>,
}

/// A control family group (e.g., "ac" / "Access Control")
#[derive(Debug, Clone, Deserialize)]
pub struct RawGroup {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub class: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub groups: Vec<RawGroup>,

    #[serde(default)]
    pub controls: Vec<RawControl>,
}

/// A control node
///
/// Recursive: enhancement controls nest under their parent via `controls`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawControl {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub class: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub params: Vec<RawParameter>,

    #[serde(default)]
    pub props: Vec<RawProp>,

    #[serde(default)]
    pub links: Vec<RawLink>,

    #[serde(default)]
    pub parts: Vec<RawPart>,

    #[serde(default)]
    pub controls: Vec<RawControl>,
}

/// A typed prose part ("statement", "guidance", "item", ...)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPart {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub prose: Option<String>,

    #[serde(default)]
    pub props: Vec<RawProp>,

    #[serde(default)]
    pub parts: Vec<RawPart>,
}

impl RawPart {
    /// The value of a named prop on this part, if present
    pub fn prop(&self, name: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
            .and_then(|p| p.value.as_deref())
    }
}

/// A name/value property
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProp {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub value: Option<String>,
}

/// An organization-defined parameter declaration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawParameter {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub usage: Option<String>,

    #[serde(default)]
    pub values: Vec<String>,
}

/// A relationship link (`{"href": "#ac-3", "rel": "related"}`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLink {
    #[serde(default)]
    pub href: Option<String>,

    #[serde(default)]
    pub rel: Option<String>,
}

//! Pipeline orchestration
//!
//! Wires the stages together: load → flatten → resolve baselines →
//! transform → derive FedRAMP baselines → validate. Every stage is a pure
//! function of its inputs; the only side effects are the input reads and
//! the artifact writes at the boundaries. Re-running against unchanged
//! inputs reproduces prior output byte for byte, given a fixed
//! `generated_at`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::baseline::fedramp::{self, FedrampBaselinesArtifact};
use crate::baseline::{Baseline, BaselineSets};
use crate::catalog::normalize;
use crate::catalog::raw::RawCatalogDocument;
use crate::catalog::transform::transform;
use crate::catalog::types::{CatalogArtifact, FamilyIndexArtifact};
use crate::data::PolicyData;
use crate::error::{Error, Result};
use crate::validation::{validate_catalog, ValidationContext, ValidationReport};

/// Input locations and provenance for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Raw OSCAL catalog document (JSON)
    pub catalog_path: PathBuf,

    /// Baseline profile documents, one per tier
    pub low_profile_path: PathBuf,
    pub moderate_profile_path: PathBuf,
    pub high_profile_path: PathBuf,

    /// Directory overriding the compiled-in policy data, if any
    pub policy_dir: Option<PathBuf>,

    /// Provenance recorded on the artifacts
    pub source: String,
    pub source_url: String,
}

impl PipelineConfig {
    /// Configuration with conventional file names under one input directory
    pub fn from_input_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            catalog_path: dir.join("catalog.json"),
            low_profile_path: dir.join("profile-low.json"),
            moderate_profile_path: dir.join("profile-moderate.json"),
            high_profile_path: dir.join("profile-high.json"),
            policy_dir: None,
            source: "NIST SP 800-53 Revision 5".to_string(),
            source_url: "https://csrc.nist.gov/pubs/sp/800/53/r5/upd1/final".to_string(),
        }
    }

    fn profile_path(&self, baseline: Baseline) -> &Path {
        match baseline {
            Baseline::Low => &self.low_profile_path,
            Baseline::Moderate => &self.moderate_profile_path,
            Baseline::High => &self.high_profile_path,
        }
    }
}

/// Everything a pipeline run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub catalog: CatalogArtifact,
    pub family_index: FamilyIndexArtifact,
    pub fedramp: FedrampBaselinesArtifact,
    pub validation: ValidationReport,
}

impl PipelineOutput {
    /// Whether the run passed all consistency checks
    pub fn is_success(&self) -> bool {
        self.validation.is_success()
    }
}

/// Run the full pipeline
///
/// Structural problems in the catalog abort the run; missing baseline
/// profiles degrade to empty sets and surface through the validation
/// report instead.
pub fn run(config: &PipelineConfig, generated_at: DateTime<Utc>) -> Result<PipelineOutput> {
    info!(catalog = %config.catalog_path.display(), "loading catalog");
    let doc = RawCatalogDocument::from_file(&config.catalog_path)?;
    let version = doc
        .catalog
        .metadata
        .version
        .clone()
        .unwrap_or_else(|| "unknown".to_string());

    let controls = normalize::flatten(&doc)?;
    info!(controls = controls.len(), version, "catalog flattened");

    let mut sets = BaselineSets::default();
    for baseline in Baseline::ALL {
        let set = crate::baseline::resolve_profile_file(baseline, config.profile_path(baseline));
        info!(baseline = baseline.key(), controls = set.len(), "baseline resolved");
        match baseline {
            Baseline::Low => sets.low = set,
            Baseline::Moderate => sets.moderate = set,
            Baseline::High => sets.high = set,
        }
    }

    let policy = match &config.policy_dir {
        Some(dir) => PolicyData::from_dir(dir)?,
        None => PolicyData::builtin()?,
    };

    let transformed = transform(controls, &sets, &policy.families);
    let unknown_families = transformed.unknown_families.clone();

    let catalog = transformed.into_artifact(
        version,
        config.source.clone(),
        config.source_url.clone(),
        generated_at,
    );
    let family_index = FamilyIndexArtifact::from_catalog(&catalog, generated_at);
    let fedramp = fedramp::generate(&sets, &policy.fedramp, generated_at);

    let validation = validate_catalog(
        &catalog,
        &ValidationContext {
            expected_family_count: policy.families.len(),
            unknown_families: &unknown_families,
            baseline_sets: &sets,
        },
    );

    if validation.is_success() {
        info!(
            controls = catalog.statistics.total_controls,
            families = catalog.families.len(),
            "pipeline run complete"
        );
    } else {
        info!(
            failures = validation.failure_count(),
            "pipeline run completed with validation failures"
        );
    }

    Ok(PipelineOutput {
        catalog,
        family_index,
        fedramp,
        validation,
    })
}

/// File names used by [`write_artifacts`]
pub const CATALOG_ARTIFACT: &str = "catalog.json";
pub const FAMILY_INDEX_ARTIFACT: &str = "families.json";
pub const FEDRAMP_ARTIFACT: &str = "fedramp-baselines.json";

/// Write the three artifacts as pretty-printed JSON into a directory
///
/// Returns the written paths.
pub fn write_artifacts(output: &PipelineOutput, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let files = [
        (CATALOG_ARTIFACT, output.catalog.to_json()?),
        (FAMILY_INDEX_ARTIFACT, output.family_index.to_json()?),
        (FEDRAMP_ARTIFACT, output.fedramp.to_json()?),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        let path = dir.join(name);
        std::fs::write(&path, content).map_err(|e| Error::ArtifactWrite {
            path: path.clone(),
            source: e,
        })?;
        written.push(path);
    }

    Ok(written)
}

/// Explicit cache for a loaded catalog artifact
///
/// Owned by the calling context rather than hidden in module state, which
/// keeps repeat loads cheap while staying re-entrant and resettable.
#[derive(Debug, Default)]
pub struct CatalogCache {
    cached: Option<(PathBuf, Arc<CatalogArtifact>)>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog artifact, reusing the cached copy when the path
    /// matches the previous load
    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> Result<Arc<CatalogArtifact>> {
        let path = path.as_ref();
        if let Some((cached_path, artifact)) = &self.cached {
            if cached_path == path {
                return Ok(Arc::clone(artifact));
            }
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::DocumentRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let artifact: CatalogArtifact =
            serde_json::from_str(&content).map_err(|e| Error::DocumentParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let artifact = Arc::new(artifact);
        self.cached = Some((path.to_path_buf(), Arc::clone(&artifact)));
        Ok(artifact)
    }

    /// Drop the cached artifact; the next load re-reads from disk
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

//! # Rampart
//!
//! NIST 800-53 catalog transformation pipeline.
//!
//! Rampart ingests a hierarchical OSCAL security-control catalog together
//! with baseline-membership profiles and tool-to-control mapping documents,
//! and produces the flattened, query-optimized artifacts consumed by a
//! catalog browsing/authoring application:
//!
//! - **Catalog artifact**: normalized controls with baseline flags, the
//!   family index, and whole-catalog statistics
//! - **Family index artifact**: a lightweight projection for client loading
//! - **FedRAMP baselines artifact**: the four FedRAMP variants derived from
//!   the NIST baselines and the curated policy tables
//! - **Coverage reports**: on-demand classification of a baseline against
//!   selected tools
//!
//! ## Quick Start
//!
//! ```ignore
//! use chrono::Utc;
//! use rampart::pipeline::{self, PipelineConfig};
//!
//! let config = PipelineConfig::from_input_dir("input");
//! let output = pipeline::run(&config, Utc::now())?;
//! if output.is_success() {
//!     pipeline::write_artifacts(&output, "artifacts")?;
//! }
//! ```
//!
//! The pipeline is single-threaded, synchronous, and side-effect-free apart
//! from reading inputs and writing artifacts: every stage is a pure
//! function of its inputs, so re-runs against unchanged inputs reproduce
//! prior output exactly (given a fixed `generated_at`).

pub mod baseline;
pub mod catalog;
pub mod coverage;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod validation;

/// Schema version stamped on generated artifacts
pub const ARTIFACT_VERSION: &str = "1.0";

// Re-exports
pub use baseline::{Baseline, BaselineSet, BaselineSets};
pub use catalog::{CatalogArtifact, Control, ControlFamily, FamilyIndexArtifact};
pub use coverage::{compute_coverage, CoverageReport, ToolControlMapping};
pub use error::{Error, Result};
pub use validation::ValidationReport;

//! Rampart CLI - catalog pipeline orchestration tool
//!
//! Runs the transformation pipeline over a raw OSCAL catalog and baseline
//! profiles, writes the derived artifacts, and computes on-demand coverage
//! reports against tool mapping documents.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};

mod error;
mod output;

use error::{CliError, Result};
use rampart::baseline::Baseline;
use rampart::coverage::{compute_coverage, ToolControlMapping};
use rampart::pipeline::{self, CatalogCache, PipelineConfig};

/// Rampart - NIST 800-53 Catalog Transformation Pipeline
#[derive(Parser)]
#[command(name = "rampart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and write the derived artifacts
    Build {
        /// Directory holding catalog.json and profile-{low,moderate,high}.json
        #[arg(short, long, default_value = "input")]
        input: PathBuf,

        /// Output directory for the generated artifacts
        #[arg(short, long, default_value = "artifacts")]
        output: PathBuf,

        /// Directory overriding the compiled-in policy data
        #[arg(long)]
        policy_data: Option<PathBuf>,

        /// Run all stages and checks but write nothing
        #[arg(long)]
        validate_only: bool,
    },

    /// Run the pipeline and report consistency checks without writing
    Validate {
        /// Directory holding catalog.json and profile-{low,moderate,high}.json
        #[arg(short, long, default_value = "input")]
        input: PathBuf,

        /// Directory overriding the compiled-in policy data
        #[arg(long)]
        policy_data: Option<PathBuf>,
    },

    /// Compute a coverage report for a baseline against selected tools
    Coverage {
        /// Path to a generated catalog artifact (catalog.json)
        #[arg(short, long, default_value = "artifacts/catalog.json")]
        catalog: PathBuf,

        /// Baseline tier: low, moderate, high
        #[arg(short, long, default_value = "moderate")]
        baseline: String,

        /// Tool mapping documents (JSON), one per tool
        #[arg(required = true)]
        tools: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Build {
            input,
            output,
            policy_data,
            validate_only,
        } => cmd_build(&input, &output, policy_data, validate_only),

        Commands::Validate { input, policy_data } => cmd_validate(&input, policy_data),

        Commands::Coverage {
            catalog,
            baseline,
            tools,
            json,
        } => cmd_coverage(&catalog, &baseline, &tools, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "rampart=debug,info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_build(
    input: &PathBuf,
    out_dir: &PathBuf,
    policy_data: Option<PathBuf>,
    validate_only: bool,
) -> Result<()> {
    let run = run_pipeline(input, policy_data)?;

    output::print_statistics(&run.catalog.statistics);
    output::print_validation_report(&run.validation);

    if !run.is_success() {
        return Err(CliError::ValidationFailed {
            count: run.validation.failure_count(),
        });
    }

    if validate_only {
        output::info("Validate-only run, no artifacts written");
        return Ok(());
    }

    let written = pipeline::write_artifacts(&run, out_dir)?;
    for path in &written {
        println!("  {}", path.display());
    }
    output::success(&format!(
        "Wrote {} artifact(s) to {}",
        written.len(),
        out_dir.display()
    ));

    Ok(())
}

fn cmd_validate(input: &PathBuf, policy_data: Option<PathBuf>) -> Result<()> {
    let run = run_pipeline(input, policy_data)?;

    output::print_statistics(&run.catalog.statistics);
    output::print_validation_report(&run.validation);

    if !run.is_success() {
        return Err(CliError::ValidationFailed {
            count: run.validation.failure_count(),
        });
    }
    Ok(())
}

fn run_pipeline(
    input: &PathBuf,
    policy_data: Option<PathBuf>,
) -> Result<rampart::pipeline::PipelineOutput> {
    let mut config = PipelineConfig::from_input_dir(input);
    config.policy_dir = policy_data;

    if !config.catalog_path.exists() {
        return Err(CliError::InputNotFound {
            path: config.catalog_path,
        });
    }

    output::info(&format!("Running pipeline over {}", input.display()));
    Ok(pipeline::run(&config, Utc::now())?)
}

fn cmd_coverage(catalog: &PathBuf, baseline: &str, tools: &[PathBuf], json: bool) -> Result<()> {
    let baseline = Baseline::parse(baseline).ok_or_else(|| CliError::UnknownBaseline {
        name: baseline.to_string(),
    })?;

    let mut cache = CatalogCache::new();
    let artifact = cache.get_or_load(catalog)?;

    let mappings = tools
        .iter()
        .map(ToolControlMapping::from_file)
        .collect::<rampart::Result<Vec<_>>>()?;

    let baseline_ids: Vec<&str> = artifact
        .baseline_controls(baseline)
        .into_iter()
        .map(|c| c.id.as_str())
        .collect();

    let report = compute_coverage(baseline_ids, &mappings);

    if json {
        println!("{}", report.to_json()?);
    } else {
        output::header(&format!(
            "Coverage: {} baseline, {} tool(s)",
            baseline.name(),
            mappings.len()
        ));
        output::print_coverage_report(&report);
    }

    Ok(())
}

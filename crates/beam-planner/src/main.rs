//! Beam Planning CLI
//!
//! Plans satellite beams for a scenario file and prints one line per beam.
//!
//! Usage:
//!   beamplan scenarios/five_users.txt
//!   beamplan scenarios/five_users.txt --debug --strategy exhaustive --report plan.json

use anyhow::{bail, Context, Result};
use beam_planner::{loader, report, verify, AllocationStrategy, BeamPlanner, PlannerConfig};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "beamplan",
    about = "Plan satellite beams and colors for a user/satellite/interferer scenario"
)]
struct Args {
    /// Scenario file with user, sat and interferer lines
    infile: PathBuf,

    /// Write the beam lines to <INFILE>.out instead of standard out
    #[arg(short, long)]
    debug: bool,

    /// Per-satellite assignment strategy (greedy or exhaustive)
    #[arg(long)]
    strategy: Option<AllocationStrategy>,

    /// JSON file overriding planner parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write a JSON report with coverage metadata
    #[arg(long)]
    report: Option<PathBuf>,

    /// Re-check every planning rule on the result and fail on violations
    #[arg(long)]
    verify: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the beam lines.
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => PlannerConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => PlannerConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }

    let scenario = loader::load_scenario(&args.infile)
        .with_context(|| format!("failed to load scenario {:?}", args.infile))?;

    let planner = BeamPlanner::new(config)?;
    let plan = planner.plan(&scenario)?;

    if args.verify {
        let violations = verify::verify_plan(&plan, &scenario, planner.config())?;
        if !violations.is_empty() {
            bail!("plan failed verification with {} violations", violations.len());
        }
    }

    if args.debug {
        let out_path = report::debug_output_path(&args.infile)?;
        info!("Writing beams to {:?}", out_path);
        let mut writer = BufWriter::new(File::create(&out_path)?);
        report::write_links(&plan, &mut writer)?;
    } else {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        report::write_links(&plan, &mut writer)?;
    }

    if let Some(path) = &args.report {
        let plan_report = report::build_report(&plan, &scenario);
        report::write_report(&plan_report, path)?;
        info!(
            "Coverage: {}/{} users ({:.1}%)",
            plan_report.metadata.served_users,
            plan_report.metadata.total_users,
            plan_report.metadata.coverage_pct
        );
    }

    Ok(())
}

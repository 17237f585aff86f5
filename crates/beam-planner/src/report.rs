//! Link rendering and JSON reports

use crate::{AllocationStrategy, BeamPlan, Link, Result, Scenario};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write one `sat .. beam .. user .. color ..` line per link
pub fn write_links<W: Write>(plan: &BeamPlan, writer: &mut W) -> Result<()> {
    for link in plan.links() {
        writeln!(writer, "{}", link)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn render_links(plan: &BeamPlan) -> String {
    plan.links().map(|l| format!("{}\n", l)).collect()
}

/// `<absolute input path>.out`, the debug-mode destination for link lines
pub fn debug_output_path(input: impl AsRef<Path>) -> Result<PathBuf> {
    let absolute = fs::canonicalize(input.as_ref())?;
    let mut name: OsString = absolute.into_os_string();
    name.push(".out");
    Ok(PathBuf::from(name))
}

/// Full report: links plus run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub links: Vec<Link>,
    pub metadata: PlanMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub total_users: usize,
    pub total_satellites: usize,
    pub total_interferers: usize,
    pub served_users: usize,
    /// Served users as a percentage of all users
    pub coverage_pct: f64,
    /// Beam count per satellite id, including idle satellites
    pub beams_per_satellite: BTreeMap<String, usize>,
    pub strategy: AllocationStrategy,
    pub generated_at: String,
}

pub fn build_report(plan: &BeamPlan, scenario: &Scenario) -> PlanReport {
    let total_users = scenario.users().len();
    let served_users = plan.served_users().len();
    let coverage_pct = if total_users == 0 {
        0.0
    } else {
        100.0 * served_users as f64 / total_users as f64
    };

    let beams_per_satellite = plan
        .satellites()
        .iter()
        .map(|s| (s.id().to_string(), s.links().len()))
        .collect();

    PlanReport {
        links: plan.links().copied().collect(),
        metadata: PlanMetadata {
            total_users,
            total_satellites: scenario.satellite_count(),
            total_interferers: scenario.interferers().len(),
            served_users,
            coverage_pct,
            beams_per_satellite,
            strategy: plan.strategy(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
    }
}

pub fn write_report(report: &PlanReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    info!("Writing report to {:?}", path);

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

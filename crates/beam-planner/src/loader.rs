//! Scenario loading from plain-text files
//!
//! One entity per line: `<marker> <id> <x> <y> <z>` with marker `user`,
//! `sat` or `interferer`. Lines containing `#` and blank lines are skipped;
//! unknown markers are ignored.

use crate::{Entity, EntityId, EntityKind, PlannerError, Result, Scenario};
use beam_geometry::Position;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Check that the input path exists and is a regular file
pub fn validate_path(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PlannerError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(PlannerError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Load a scenario file
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    validate_path(path)?;
    info!("Loading scenario from {:?}", path);

    let text = fs::read_to_string(path)?;
    let scenario = parse_scenario(&text)?;
    if scenario.is_empty() {
        warn!("Scenario {:?} has no user, sat or interferer lines", path);
    }

    info!(
        "Loaded {} users, {} satellites, {} interferers",
        scenario.users().len(),
        scenario.satellite_count(),
        scenario.interferers().len()
    );
    Ok(scenario)
}

/// Parse scenario text. Line numbers in errors are 1-based.
pub fn parse_scenario(text: &str) -> Result<Scenario> {
    let mut scenario = Scenario::new();
    let mut skipped = 0;

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.contains('#') || line.trim().is_empty() {
            continue;
        }

        let marker = line.split_whitespace().next().unwrap_or_default();
        match EntityKind::from_marker(marker) {
            Some(kind) => {
                scenario.insert(parse_line(line, line_no, kind)?);
            }
            None => {
                debug!("Line {}: ignoring unknown marker {:?}", line_no, marker);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        debug!("Skipped {} lines with unknown markers", skipped);
    }
    Ok(scenario)
}

/// Parse the fields after the marker into an entity of `kind`
fn parse_line(line: &str, line_no: usize, kind: EntityKind) -> Result<Entity> {
    let mut fields = line.split_whitespace().skip(1);

    let id: EntityId = parse_field(fields.next(), line_no, "id")?;
    let x = parse_coordinate(fields.next(), line_no, "x-coordinate")?;
    let y = parse_coordinate(fields.next(), line_no, "y-coordinate")?;
    let z = parse_coordinate(fields.next(), line_no, "z-coordinate")?;

    Ok(Entity::new(kind, id, Position::new(x, y, z)))
}

fn parse_field<T: std::str::FromStr>(
    raw: Option<&str>,
    line: usize,
    field: &'static str,
) -> Result<T> {
    let raw = raw.ok_or(PlannerError::MissingField { line, field })?;
    raw.parse().map_err(|_| PlannerError::InvalidField {
        line,
        field,
        value: raw.to_string(),
    })
}

fn parse_coordinate(raw: Option<&str>, line: usize, field: &'static str) -> Result<f64> {
    let value: f64 = parse_field(raw, line, field)?;
    if !value.is_finite() {
        return Err(PlannerError::InvalidField {
            line,
            field,
            value: raw.unwrap_or_default().to_string(),
        });
    }
    Ok(value)
}

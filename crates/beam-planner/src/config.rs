//! Planner configuration

use crate::{
    Channel, PlannerError, Result, DEFAULT_BEAMS_PER_SATELLITE,
    DEFAULT_EXTERNAL_INTERFERENCE_ANGLE_DEG, DEFAULT_SAME_COLOR_SEPARATION_DEG,
    DEFAULT_USER_VISIBLE_ANGLE_DEG,
};
use beam_geometry::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Per-satellite assignment strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStrategy {
    /// Single pass, first fit, no backtracking
    #[default]
    Greedy,
    /// Depth-first search for the largest assignment. Exponential in the
    /// number of candidates.
    Exhaustive,
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationStrategy::Greedy => write!(f, "greedy"),
            AllocationStrategy::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

impl FromStr for AllocationStrategy {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "greedy" => Ok(AllocationStrategy::Greedy),
            "exhaustive" | "dfs" => Ok(AllocationStrategy::Exhaustive),
            other => Err(PlannerError::InvalidConfig(format!(
                "unknown strategy {:?} (expected greedy or exhaustive)",
                other
            ))),
        }
    }
}

/// Immutable planning parameters, passed into every stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum simultaneous beams per satellite
    pub beams_per_satellite: usize,
    /// Channels in the order they are tried
    pub channels: Vec<Channel>,
    /// Maximum angle from the user's zenith to a visible satellite (degrees)
    pub user_visible_angle_deg: f64,
    /// Minimum beam-to-interferer angle at the satellite (degrees)
    pub external_interference_angle_deg: f64,
    /// Minimum angle at the satellite between two same-color users (degrees)
    pub same_color_separation_deg: f64,
    /// Reference point the user's zenith is measured from
    pub earth_center: Position,
    pub strategy: AllocationStrategy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            beams_per_satellite: DEFAULT_BEAMS_PER_SATELLITE,
            channels: Channel::ALL.to_vec(),
            user_visible_angle_deg: DEFAULT_USER_VISIBLE_ANGLE_DEG,
            external_interference_angle_deg: DEFAULT_EXTERNAL_INTERFERENCE_ANGLE_DEG,
            same_color_separation_deg: DEFAULT_SAME_COLOR_SEPARATION_DEG,
            earth_center: Position::ORIGIN,
            strategy: AllocationStrategy::Greedy,
        }
    }
}

impl PlannerConfig {
    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Load overrides from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading planner config from {:?}", path);

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: PlannerConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.beams_per_satellite == 0 {
            return Err(invalid("beams_per_satellite must be at least 1"));
        }
        if self.channels.is_empty() {
            return Err(invalid("at least one channel is required"));
        }
        let unique: HashSet<_> = self.channels.iter().collect();
        if unique.len() != self.channels.len() {
            return Err(invalid("channels must not repeat"));
        }

        check_angle("user_visible_angle_deg", self.user_visible_angle_deg)?;
        check_angle(
            "external_interference_angle_deg",
            self.external_interference_angle_deg,
        )?;
        check_angle("same_color_separation_deg", self.same_color_separation_deg)?;

        if !self.earth_center.is_finite() {
            return Err(invalid("earth_center must be finite"));
        }
        Ok(())
    }
}

fn check_angle(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(&format!("{} must be within [0, 180], got {}", name, value)))
    }
}

fn invalid(message: &str) -> PlannerError {
    PlannerError::InvalidConfig(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.beams_per_satellite, 32);
        assert_eq!(config.channels, vec![Channel::A, Channel::B, Channel::C, Channel::D]);
        assert_eq!(config.user_visible_angle_deg, 45.0);
        assert_eq!(config.external_interference_angle_deg, 20.0);
        assert_eq!(config.same_color_separation_deg, 10.0);
        assert_eq!(config.strategy, AllocationStrategy::Greedy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"beams_per_satellite": 8, "strategy": "exhaustive"}"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = PlannerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.beams_per_satellite, 8);
        assert_eq!(config.strategy, AllocationStrategy::Exhaustive);
        assert_eq!(config.channels.len(), 4);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = PlannerConfig::default();
        config.beams_per_satellite = 0;
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.channels = vec![Channel::A, Channel::A];
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.same_color_separation_deg = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.user_visible_angle_deg = 200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("Greedy".parse::<AllocationStrategy>().unwrap(), AllocationStrategy::Greedy);
        assert_eq!(
            "exhaustive".parse::<AllocationStrategy>().unwrap(),
            AllocationStrategy::Exhaustive
        );
        assert!("random".parse::<AllocationStrategy>().is_err());
    }
}

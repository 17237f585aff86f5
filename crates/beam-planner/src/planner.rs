//! Plan assembly across satellites

use crate::{
    allocator, interference, visibility, AllocationStrategy, EntityId, Link, PlannerConfig,
    Result, SatellitePlan, Scenario,
};
use std::collections::HashSet;
use tracing::info;

/// Runs the full pipeline for one scenario. Holds only immutable
/// configuration, so one planner can serve many runs.
#[derive(Debug, Clone, Default)]
pub struct BeamPlanner {
    config: PlannerConfig,
}

impl BeamPlanner {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn plan(&self, scenario: &Scenario) -> Result<BeamPlan> {
        let config = &self.config;
        let mut satellites: Vec<SatellitePlan> =
            scenario.satellites().copied().map(SatellitePlan::new).collect();

        visibility::populate_candidates(&mut satellites, scenario, config)?;
        interference::prune_candidates(&mut satellites, scenario, config)?;

        // Satellites come out of the scenario in ascending id order; earlier
        // satellites claim users first.
        let mut claimed: HashSet<EntityId> = HashSet::new();
        for satellite in satellites.iter_mut() {
            let newly_claimed = allocator::allocate(satellite, scenario, &claimed, config)?;
            claimed.extend(newly_claimed);
        }

        let plan = BeamPlan {
            satellites,
            strategy: config.strategy,
        };

        info!(
            "Planned {} beams serving {} of {} users across {} satellites",
            plan.link_count(),
            claimed.len(),
            scenario.users().len(),
            plan.satellites.len()
        );

        Ok(plan)
    }
}

/// Result of one planning run
#[derive(Debug, Clone)]
pub struct BeamPlan {
    satellites: Vec<SatellitePlan>,
    strategy: AllocationStrategy,
}

impl BeamPlan {
    /// Satellites in planning (ascending id) order
    pub fn satellites(&self) -> &[SatellitePlan] {
        &self.satellites
    }

    pub fn strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    /// All links grouped by satellite, each group in acceptance order
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.satellites.iter().flat_map(|s| s.links().iter())
    }

    pub fn link_count(&self) -> usize {
        self.satellites.iter().map(|s| s.links().len()).sum()
    }

    pub fn served_users(&self) -> HashSet<EntityId> {
        self.links().map(|l| l.user_id).collect()
    }
}

//! External interference filter pruning candidate lists

use crate::{Entity, PlannerConfig, PlannerError, Result, SatellitePlan, Scenario};
use beam_geometry::angle_between;
use tracing::{debug, info};

/// True when `interferer` sits closer than `external_interference_angle_deg`
/// to the beam towards `user`, measured at the satellite.
pub fn is_blocked(
    user: &Entity,
    interferer: &Entity,
    satellite: &Entity,
    config: &PlannerConfig,
) -> Result<bool> {
    let angle = angle_between(&satellite.position, &user.position, &interferer.position)?;
    Ok(angle < config.external_interference_angle_deg)
}

/// First interferer, in canonical order, that blocks the beam. Stops at the
/// first hit.
pub fn first_blocker<'a>(
    user: &Entity,
    satellite: &Entity,
    interferers: &'a [Entity],
    config: &PlannerConfig,
) -> Result<Option<&'a Entity>> {
    for interferer in interferers {
        if is_blocked(user, interferer, satellite, config)? {
            return Ok(Some(interferer));
        }
    }
    Ok(None)
}

/// Remove every candidate whose beam is blocked by some interferer. Returns
/// the number of removed (user, satellite) pairs.
pub fn prune_candidates(
    plans: &mut [SatellitePlan],
    scenario: &Scenario,
    config: &PlannerConfig,
) -> Result<usize> {
    let interferers = scenario.interferers();
    let mut removed = 0;

    for plan in plans.iter_mut() {
        let snapshot = plan.candidates().to_vec();

        for user_id in snapshot {
            let user = scenario
                .user(user_id)
                .ok_or(PlannerError::UnknownUser(user_id))?;

            if let Some(interferer) = first_blocker(user, &plan.satellite, interferers, config)? {
                debug!(
                    "Interferer {} blocks user {} on satellite {}",
                    interferer.id,
                    user_id,
                    plan.id()
                );
                plan.remove_candidate(user_id);
                removed += 1;
            }
        }
    }

    info!(
        "Interference: {} candidate pairs removed by {} interferers",
        removed,
        interferers.len()
    );
    Ok(removed)
}

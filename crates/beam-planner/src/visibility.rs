//! Line-of-sight filter building each satellite's candidate list

use crate::{Entity, PlannerConfig, Result, SatellitePlan, Scenario};
use beam_geometry::angle_between;
use tracing::{debug, info};

/// True when the satellite lies within `user_visible_angle_deg` of the user's
/// zenith. The angle is taken at the user, between the Earth-centre reference
/// and the satellite, so an overhead satellite measures 180°.
pub fn is_visible(user: &Entity, satellite: &Entity, config: &PlannerConfig) -> Result<bool> {
    let angle = angle_between(&user.position, &config.earth_center, &satellite.position)?;
    Ok(angle > 180.0 - config.user_visible_angle_deg)
}

/// Add every visible user to each satellite's candidates, users in canonical
/// order. Returns the number of (user, satellite) pairs added.
pub fn populate_candidates(
    plans: &mut [SatellitePlan],
    scenario: &Scenario,
    config: &PlannerConfig,
) -> Result<usize> {
    let mut added = 0;

    for user in scenario.users() {
        for plan in plans.iter_mut() {
            if is_visible(user, &plan.satellite, config)? {
                plan.add_candidate(user.id);
                added += 1;
            } else {
                debug!("Satellite {} not visible to user {}", plan.id(), user.id);
            }
        }
    }

    info!(
        "Visibility: {} candidate pairs from {} users x {} satellites",
        added,
        scenario.users().len(),
        plans.len()
    );
    Ok(added)
}

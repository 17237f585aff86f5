//! Independent re-check of a finished plan against every planning rule

use crate::{
    interference, visibility, BeamPlan, Channel, EntityId, Link, PlannerConfig, Result, Scenario,
};
use beam_geometry::angle_between;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Violation {
    UnknownSatellite {
        satellite_id: EntityId,
    },
    UnknownUser {
        satellite_id: EntityId,
        user_id: EntityId,
    },
    DuplicateUser {
        user_id: EntityId,
        first_satellite: EntityId,
        second_satellite: EntityId,
    },
    OverCapacity {
        satellite_id: EntityId,
        beams: usize,
        capacity: usize,
    },
    BeamNumbering {
        satellite_id: EntityId,
        expected: usize,
        found: usize,
    },
    UnconfiguredChannel {
        satellite_id: EntityId,
        channel: Channel,
    },
    ColorConflict {
        satellite_id: EntityId,
        channel: Channel,
        user_a: EntityId,
        user_b: EntityId,
        angle_deg: f64,
    },
    NotVisible {
        satellite_id: EntityId,
        user_id: EntityId,
    },
    Interference {
        satellite_id: EntityId,
        user_id: EntityId,
        interferer_id: EntityId,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnknownSatellite { satellite_id } => {
                write!(f, "sat {} is not in the scenario", satellite_id)
            }
            Violation::UnknownUser {
                satellite_id,
                user_id,
            } => write!(f, "sat {}: user {} is not in the scenario", satellite_id, user_id),
            Violation::DuplicateUser {
                user_id,
                first_satellite,
                second_satellite,
            } => write!(
                f,
                "user {} served by sat {} and sat {}",
                user_id, first_satellite, second_satellite
            ),
            Violation::OverCapacity {
                satellite_id,
                beams,
                capacity,
            } => write!(f, "sat {} has {} beams (capacity {})", satellite_id, beams, capacity),
            Violation::BeamNumbering {
                satellite_id,
                expected,
                found,
            } => write!(
                f,
                "sat {}: expected beam {}, found beam {}",
                satellite_id, expected, found
            ),
            Violation::UnconfiguredChannel {
                satellite_id,
                channel,
            } => write!(f, "sat {} uses unconfigured color {}", satellite_id, channel),
            Violation::ColorConflict {
                satellite_id,
                channel,
                user_a,
                user_b,
                angle_deg,
            } => write!(
                f,
                "sat {}: users {} and {} on color {} are {:.3}° apart",
                satellite_id, user_a, user_b, channel, angle_deg
            ),
            Violation::NotVisible {
                satellite_id,
                user_id,
            } => write!(f, "sat {} is not visible to user {}", satellite_id, user_id),
            Violation::Interference {
                satellite_id,
                user_id,
                interferer_id,
            } => write!(
                f,
                "sat {} beam to user {} is blocked by interferer {}",
                satellite_id, user_id, interferer_id
            ),
        }
    }
}

pub fn verify_plan(
    plan: &BeamPlan,
    scenario: &Scenario,
    config: &PlannerConfig,
) -> Result<Vec<Violation>> {
    let links: Vec<Link> = plan.links().copied().collect();
    verify_links(&links, scenario, config)
}

/// Check a link list, grouped by satellite in any order. Geometry errors
/// abort; rule breaches are collected.
pub fn verify_links(
    links: &[Link],
    scenario: &Scenario,
    config: &PlannerConfig,
) -> Result<Vec<Violation>> {
    let mut violations = Vec::new();
    let mut served_by: HashMap<EntityId, EntityId> = HashMap::new();
    let mut by_satellite: BTreeMap<EntityId, Vec<&Link>> = BTreeMap::new();

    for link in links {
        by_satellite.entry(link.satellite_id).or_default().push(link);

        match served_by.get(&link.user_id) {
            Some(&first) => violations.push(Violation::DuplicateUser {
                user_id: link.user_id,
                first_satellite: first,
                second_satellite: link.satellite_id,
            }),
            None => {
                served_by.insert(link.user_id, link.satellite_id);
            }
        }
    }

    for (&satellite_id, sat_links) in &by_satellite {
        let Some(satellite) = scenario.satellite(satellite_id) else {
            violations.push(Violation::UnknownSatellite { satellite_id });
            continue;
        };

        if sat_links.len() > config.beams_per_satellite {
            violations.push(Violation::OverCapacity {
                satellite_id,
                beams: sat_links.len(),
                capacity: config.beams_per_satellite,
            });
        }

        let mut resolved = Vec::new();
        for (i, link) in sat_links.iter().enumerate() {
            if link.beam != i + 1 {
                violations.push(Violation::BeamNumbering {
                    satellite_id,
                    expected: i + 1,
                    found: link.beam,
                });
            }
            if !config.channels.contains(&link.channel) {
                violations.push(Violation::UnconfiguredChannel {
                    satellite_id,
                    channel: link.channel,
                });
            }

            let Some(user) = scenario.user(link.user_id) else {
                violations.push(Violation::UnknownUser {
                    satellite_id,
                    user_id: link.user_id,
                });
                continue;
            };

            if !visibility::is_visible(user, satellite, config)? {
                violations.push(Violation::NotVisible {
                    satellite_id,
                    user_id: user.id,
                });
            }
            if let Some(interferer) =
                interference::first_blocker(user, satellite, scenario.interferers(), config)?
            {
                violations.push(Violation::Interference {
                    satellite_id,
                    user_id: user.id,
                    interferer_id: interferer.id,
                });
            }

            resolved.push((link.channel, user));
        }

        for (i, (channel, user_a)) in resolved.iter().enumerate() {
            for (other_channel, user_b) in &resolved[i + 1..] {
                if channel != other_channel {
                    continue;
                }
                let angle = angle_between(&satellite.position, &user_a.position, &user_b.position)?;
                if angle < config.same_color_separation_deg {
                    violations.push(Violation::ColorConflict {
                        satellite_id,
                        channel: *channel,
                        user_a: user_a.id,
                        user_b: user_b.id,
                        angle_deg: angle,
                    });
                }
            }
        }
    }

    if violations.is_empty() {
        info!("Verified {} links, no violations", links.len());
    } else {
        for v in &violations {
            warn!("Violation: {}", v);
        }
    }
    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BeamPlanner, Entity};
    use beam_geometry::Position;

    const SAT_Z: f64 = 7_000_000.0;

    fn user_at(id: EntityId, off_nadir_deg: f64) -> Entity {
        let t = off_nadir_deg.to_radians();
        let position = Position::new(600_000.0 * t.sin(), 0.0, SAT_Z - 600_000.0 * t.cos());
        Entity::user(id, position)
    }

    fn scenario() -> Scenario {
        Scenario::new()
            .with(Entity::satellite(1, Position::new(0.0, 0.0, SAT_Z)))
            .with(Entity::satellite(2, Position::new(0.0, 0.0, SAT_Z + 1.0)))
            .with(user_at(1, 0.0))
            .with(user_at(2, 3.0))
            .with(user_at(3, 20.0))
            .with(Entity::user(4, Position::new(0.0, 0.0, -6_371_000.0)))
    }

    fn link(beam: usize, satellite_id: EntityId, user_id: EntityId, channel: Channel) -> Link {
        Link {
            beam,
            satellite_id,
            user_id,
            channel,
        }
    }

    #[test]
    fn test_planner_output_is_clean() {
        let scenario = scenario();
        let config = PlannerConfig::default();
        let plan = BeamPlanner::new(config.clone()).unwrap().plan(&scenario).unwrap();
        assert!(verify_plan(&plan, &scenario, &config).unwrap().is_empty());
    }

    #[test]
    fn test_detects_color_conflict_and_duplicates() {
        let links = vec![
            link(1, 1, 1, Channel::A),
            link(2, 1, 2, Channel::A),
            link(1, 2, 1, Channel::B),
        ];
        let violations = verify_links(&links, &scenario(), &PlannerConfig::default()).unwrap();

        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::ColorConflict { satellite_id: 1, user_a: 1, user_b: 2, .. }
        )));
        assert!(violations.contains(&Violation::DuplicateUser {
            user_id: 1,
            first_satellite: 1,
            second_satellite: 2
        }));
    }

    #[test]
    fn test_detects_capacity_numbering_and_visibility() {
        let config = PlannerConfig {
            beams_per_satellite: 1,
            ..PlannerConfig::default()
        };
        let links = vec![link(1, 1, 3, Channel::A), link(3, 1, 4, Channel::B)];
        let violations = verify_links(&links, &scenario(), &config).unwrap();

        assert!(violations.contains(&Violation::OverCapacity {
            satellite_id: 1,
            beams: 2,
            capacity: 1
        }));
        assert!(violations.contains(&Violation::BeamNumbering {
            satellite_id: 1,
            expected: 2,
            found: 3
        }));
        assert!(violations.contains(&Violation::NotVisible {
            satellite_id: 1,
            user_id: 4
        }));
    }

    #[test]
    fn test_detects_interference_and_unknowns() {
        let blocker = Entity::interferer(9, Position::new(0.0, 0.0, 6_800_000.0));
        let scenario = scenario().with(blocker);
        let links = vec![
            link(1, 1, 1, Channel::A),
            link(2, 1, 77, Channel::B),
            link(1, 5, 3, Channel::A),
        ];
        let violations = verify_links(&links, &scenario, &PlannerConfig::default()).unwrap();

        assert!(violations.contains(&Violation::Interference {
            satellite_id: 1,
            user_id: 1,
            interferer_id: 9
        }));
        assert!(violations.contains(&Violation::UnknownUser {
            satellite_id: 1,
            user_id: 77
        }));
        assert!(violations.contains(&Violation::UnknownSatellite { satellite_id: 5 }));
    }
}

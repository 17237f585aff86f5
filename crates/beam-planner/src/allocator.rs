//! Per-satellite beam and color assignment
//!
//! A satellite takes its filtered candidates in order and gives each one a
//! beam on the first channel whose existing users are all far enough away,
//! as seen from the satellite. Capacity and the cross-satellite claimed set
//! are respected; nothing accepted is ever revisited.

use crate::{
    AllocationStrategy, Channel, Entity, EntityId, Link, PlannerConfig, PlannerError, Result,
    Scenario,
};
use beam_geometry::{angle_between, Position};
use std::collections::HashSet;
use tracing::debug;

/// Working state of one satellite during a planning run
#[derive(Debug, Clone)]
pub struct SatellitePlan {
    pub satellite: Entity,
    candidates: Vec<EntityId>,
    links: Vec<Link>,
}

impl SatellitePlan {
    pub fn new(satellite: Entity) -> Self {
        Self {
            satellite,
            candidates: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.satellite.id
    }

    /// Users still eligible for this satellite, in canonical order
    pub fn candidates(&self) -> &[EntityId] {
        &self.candidates
    }

    /// Accepted beams in acceptance order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub(crate) fn add_candidate(&mut self, user_id: EntityId) {
        self.candidates.push(user_id);
    }

    pub(crate) fn remove_candidate(&mut self, user_id: EntityId) -> bool {
        match self.candidates.iter().position(|&id| id == user_id) {
            Some(i) => {
                self.candidates.remove(i);
                true
            }
            None => false,
        }
    }

    fn push_link(&mut self, user_id: EntityId, channel: Channel) -> Link {
        let link = Link {
            beam: self.links.len() + 1,
            satellite_id: self.satellite.id,
            user_id,
            channel,
        };
        self.links.push(link);
        link
    }
}

/// Assign beams for one satellite. `claimed` holds users already served by
/// earlier satellites and is not modified; the users claimed here are
/// returned in acceptance order.
pub fn allocate(
    plan: &mut SatellitePlan,
    scenario: &Scenario,
    claimed: &HashSet<EntityId>,
    config: &PlannerConfig,
) -> Result<Vec<EntityId>> {
    let before = plan.links.len();

    match config.strategy {
        AllocationStrategy::Greedy => allocate_greedy(plan, scenario, claimed, config)?,
        AllocationStrategy::Exhaustive => allocate_exhaustive(plan, scenario, claimed, config)?,
    }

    let newly_claimed: Vec<EntityId> = plan.links[before..].iter().map(|l| l.user_id).collect();
    debug!(
        "Satellite {}: {} beams from {} candidates ({})",
        plan.id(),
        newly_claimed.len(),
        plan.candidates.len(),
        config.strategy
    );
    Ok(newly_claimed)
}

/// Single-pass first fit over the candidate list
pub fn allocate_greedy(
    plan: &mut SatellitePlan,
    scenario: &Scenario,
    claimed: &HashSet<EntityId>,
    config: &PlannerConfig,
) -> Result<()> {
    let satellite = plan.satellite.position;
    let candidates = plan.candidates.clone();

    for user_id in candidates {
        if plan.links.len() >= config.beams_per_satellite {
            debug!("Satellite {} at capacity", plan.id());
            break;
        }
        if claimed.contains(&user_id) {
            continue;
        }

        let user = user_position(scenario, user_id)?;
        let mut accepted = None;

        for &channel in &config.channels {
            let mut same_color = Vec::new();
            for link in plan.links.iter().filter(|l| l.channel == channel) {
                same_color.push(user_position(scenario, link.user_id)?);
            }

            if separated(&satellite, &user, &same_color, config.same_color_separation_deg)? {
                accepted = Some(channel);
                break;
            }
        }

        match accepted {
            Some(channel) => {
                let link = plan.push_link(user_id, channel);
                debug!("Accepted {}", link);
            }
            None => debug!(
                "Satellite {}: no channel free for user {}",
                plan.id(),
                user_id
            ),
        }
    }

    Ok(())
}

/// Depth-first search over accept-on-each-channel and skip branches, keeping
/// the first assignment that serves the most users.
pub fn allocate_exhaustive(
    plan: &mut SatellitePlan,
    scenario: &Scenario,
    claimed: &HashSet<EntityId>,
    config: &PlannerConfig,
) -> Result<()> {
    let mut eligible = Vec::new();
    for &user_id in &plan.candidates {
        if !claimed.contains(&user_id) {
            eligible.push((user_id, user_position(scenario, user_id)?));
        }
    }

    let capacity = config
        .beams_per_satellite
        .saturating_sub(plan.links.len());

    let mut search = ExhaustiveSearch {
        satellite: plan.satellite.position,
        candidates: &eligible,
        channels: &config.channels,
        capacity,
        separation_deg: config.same_color_separation_deg,
        current: Vec::new(),
        best: Vec::new(),
        visited: 0,
    };
    search.descend(0)?;

    debug!(
        "Satellite {}: exhaustive search visited {} nodes",
        plan.id(),
        search.visited
    );

    let best = search.best;
    for (index, channel) in best {
        plan.push_link(eligible[index].0, channel);
    }
    Ok(())
}

struct ExhaustiveSearch<'a> {
    satellite: Position,
    candidates: &'a [(EntityId, Position)],
    channels: &'a [Channel],
    capacity: usize,
    separation_deg: f64,
    current: Vec<(usize, Channel)>,
    best: Vec<(usize, Channel)>,
    visited: u64,
}

impl ExhaustiveSearch<'_> {
    fn descend(&mut self, index: usize) -> Result<()> {
        self.visited += 1;

        if self.current.len() > self.best.len() {
            self.best = self.current.clone();
        }
        if index == self.candidates.len() || self.current.len() == self.capacity {
            return Ok(());
        }

        // Nothing below can strictly beat the best found so far.
        let reachable =
            (self.current.len() + self.candidates.len() - index).min(self.capacity);
        if reachable <= self.best.len() {
            return Ok(());
        }

        let user = self.candidates[index].1;
        for &channel in self.channels {
            let same_color: Vec<Position> = self
                .current
                .iter()
                .filter(|(_, c)| *c == channel)
                .map(|&(i, _)| self.candidates[i].1)
                .collect();

            if separated(&self.satellite, &user, &same_color, self.separation_deg)? {
                self.current.push((index, channel));
                self.descend(index + 1)?;
                self.current.pop();
            }
        }

        self.descend(index + 1)
    }
}

/// True when every user in `others` is at least `min_deg` from `candidate`,
/// measured at the satellite. An empty channel always fits.
fn separated(
    satellite: &Position,
    candidate: &Position,
    others: &[Position],
    min_deg: f64,
) -> Result<bool> {
    for other in others {
        if angle_between(satellite, candidate, other)? < min_deg {
            return Ok(false);
        }
    }
    Ok(true)
}

fn user_position(scenario: &Scenario, user_id: EntityId) -> Result<Position> {
    scenario
        .user(user_id)
        .map(|u| u.position)
        .ok_or(PlannerError::UnknownUser(user_id))
}

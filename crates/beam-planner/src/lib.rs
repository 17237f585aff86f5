//! Satellite Beam Planner
//!
//! Plans which ground users each satellite serves, and on which frequency
//! channel ("color"), from a static ECEF snapshot of users, satellites and
//! external interferers.
//!
//! # Pipeline
//!
//! ```text
//! visibility ──► interference ──► allocator ──► planner
//!  (candidates)    (pruning)       (per sat)     (claimed set, id order)
//! ```
//!
//! | Stage        | Rule |
//! |--------------|------|
//! | Visibility   | satellite within 45° of the user's zenith |
//! | Interference | no interferer within 20° of the beam, seen from the satellite |
//! | Allocation   | ≤ 32 beams, same-color users ≥ 10° apart, first fit A→D |
//! | Assembly     | satellites in ascending id order, each user served once |
//!
//! The loader, report writer and verifier around the pipeline live in
//! [`loader`], [`report`] and [`verify`].

use beam_geometry::{GeometryError, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

pub mod allocator;
pub mod config;
pub mod interference;
pub mod loader;
pub mod planner;
pub mod report;
pub mod verify;
pub mod visibility;

pub use allocator::SatellitePlan;
pub use config::{AllocationStrategy, PlannerConfig};
pub use planner::{BeamPlan, BeamPlanner};

/// Beams a single satellite can hold at once
pub const DEFAULT_BEAMS_PER_SATELLITE: usize = 32;

/// Maximum angle between a user's zenith and a visible satellite (degrees)
pub const DEFAULT_USER_VISIBLE_ANGLE_DEG: f64 = 45.0;

/// Minimum separation between a beam and any external interferer, seen from the satellite (degrees)
pub const DEFAULT_EXTERNAL_INTERFERENCE_ANGLE_DEG: f64 = 20.0;

/// Minimum separation between two same-color beams of one satellite (degrees)
pub const DEFAULT_SAME_COLOR_SEPARATION_DEG: f64 = 10.0;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Input file/path provided does not exist: {0:?}")]
    NotFound(PathBuf),
    #[error("Input path provided is not a file: {0:?}")]
    NotAFile(PathBuf),
    #[error("Line {line}: missing {field}")]
    MissingField { line: usize, field: &'static str },
    #[error("Line {line}: {field} {value:?} could not be parsed")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Unknown user {0}")]
    UnknownUser(EntityId),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Identifier of an entity, unique within its kind
pub type EntityId = i64;

/// Closed set of entity kinds in a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Satellite,
    Interferer,
}

impl EntityKind {
    /// Marker token used for this kind in scenario files
    pub fn marker(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Satellite => "sat",
            EntityKind::Interferer => "interferer",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "user" => Some(EntityKind::User),
            "sat" => Some(EntityKind::Satellite),
            "interferer" => Some(EntityKind::Interferer),
            _ => None,
        }
    }
}

/// A positioned user, satellite or interferer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Position,
}

impl Entity {
    pub fn new(kind: EntityKind, id: EntityId, position: Position) -> Self {
        Self { id, kind, position }
    }

    pub fn user(id: EntityId, position: Position) -> Self {
        Self::new(EntityKind::User, id, position)
    }

    pub fn satellite(id: EntityId, position: Position) -> Self {
        Self::new(EntityKind::Satellite, id, position)
    }

    pub fn interferer(id: EntityId, position: Position) -> Self {
        Self::new(EntityKind::Interferer, id, position)
    }
}

/// Frequency channel ("color") of a beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    A,
    B,
    C,
    D,
}

impl Channel {
    /// All channels in the order the allocator tries them
    pub const ALL: [Channel; 4] = [Channel::A, Channel::B, Channel::C, Channel::D];

    pub fn symbol(&self) -> char {
        match self {
            Channel::A => 'A',
            Channel::B => 'B',
            Channel::C => 'C',
            Channel::D => 'D',
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Channel {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "A" | "a" => Ok(Channel::A),
            "B" | "b" => Ok(Channel::B),
            "C" | "c" => Ok(Channel::C),
            "D" | "d" => Ok(Channel::D),
            other => Err(PlannerError::InvalidConfig(format!(
                "unknown channel {:?}",
                other
            ))),
        }
    }
}

/// An accepted beam between a satellite and a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// 1-based sequence number within the satellite
    pub beam: usize,
    pub satellite_id: EntityId,
    pub user_id: EntityId,
    pub channel: Channel,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sat {} beam {} user {} color {}",
            self.satellite_id, self.beam, self.user_id, self.channel
        )
    }
}

/// Parsed snapshot handed to the planner.
///
/// Users and interferers keep file order; satellites are keyed by id so that
/// planning always visits them in ascending order.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    users: Vec<Entity>,
    user_index: HashMap<EntityId, usize>,
    satellites: BTreeMap<EntityId, Entity>,
    interferers: Vec<Entity>,
    interferer_index: HashMap<EntityId, usize>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity. A repeated id replaces the earlier entity of the same
    /// kind in place and the replaced entity is returned.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        let replaced = match entity.kind {
            EntityKind::User => upsert(&mut self.users, &mut self.user_index, entity),
            EntityKind::Satellite => self.satellites.insert(entity.id, entity),
            EntityKind::Interferer => {
                upsert(&mut self.interferers, &mut self.interferer_index, entity)
            }
        };
        if replaced.is_some() {
            warn!(
                "Duplicate {} id {}, keeping the later definition",
                entity.kind.marker(),
                entity.id
            );
        }
        replaced
    }

    /// Builder-style insert for tests and programmatic scenarios
    pub fn with(mut self, entity: Entity) -> Self {
        self.insert(entity);
        self
    }

    /// Users in canonical (file) order
    pub fn users(&self) -> &[Entity] {
        &self.users
    }

    /// Satellites in ascending id order
    pub fn satellites(&self) -> impl Iterator<Item = &Entity> {
        self.satellites.values()
    }

    /// Interferers in canonical (file) order
    pub fn interferers(&self) -> &[Entity] {
        &self.interferers
    }

    pub fn user(&self, id: EntityId) -> Option<&Entity> {
        self.user_index.get(&id).map(|&i| &self.users[i])
    }

    pub fn satellite(&self, id: EntityId) -> Option<&Entity> {
        self.satellites.get(&id)
    }

    pub fn satellite_count(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.satellites.is_empty() && self.interferers.is_empty()
    }
}

fn upsert(
    entities: &mut Vec<Entity>,
    index: &mut HashMap<EntityId, usize>,
    entity: Entity,
) -> Option<Entity> {
    match index.get(&entity.id) {
        Some(&i) => Some(std::mem::replace(&mut entities[i], entity)),
        None => {
            index.insert(entity.id, entities.len());
            entities.push(entity);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_display() {
        let link = Link {
            beam: 3,
            satellite_id: 7,
            user_id: 42,
            channel: Channel::C,
        };
        assert_eq!(link.to_string(), "sat 7 beam 3 user 42 color C");
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!("b".parse::<Channel>().unwrap(), Channel::B);
        assert!("E".parse::<Channel>().is_err());
    }

    #[test]
    fn test_marker_round_trip() {
        for kind in [EntityKind::User, EntityKind::Satellite, EntityKind::Interferer] {
            assert_eq!(EntityKind::from_marker(kind.marker()), Some(kind));
        }
        assert_eq!(EntityKind::from_marker("station"), None);
    }

    #[test]
    fn test_satellites_sorted_by_id() {
        let scenario = Scenario::new()
            .with(Entity::satellite(9, Position::new(0.0, 0.0, 7.0e6)))
            .with(Entity::satellite(2, Position::new(0.0, 7.0e6, 0.0)))
            .with(Entity::satellite(5, Position::new(7.0e6, 0.0, 0.0)));
        let ids: Vec<_> = scenario.satellites().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_duplicate_user_replaced_in_place() {
        let mut scenario = Scenario::new()
            .with(Entity::user(1, Position::new(1.0, 0.0, 0.0)))
            .with(Entity::user(2, Position::new(2.0, 0.0, 0.0)));
        let replaced = scenario.insert(Entity::user(1, Position::new(3.0, 0.0, 0.0)));

        assert_eq!(replaced.map(|e| e.position.x), Some(1.0));
        let ids: Vec<_> = scenario.users().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(scenario.user(1).map(|u| u.position.x), Some(3.0));
    }
}

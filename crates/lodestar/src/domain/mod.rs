//! Domain types for goal tracking.
//!
//! This module contains the read-only snapshot types the engines operate on.
//! Snapshots are supplied by the caller per invocation; the engines never
//! mutate them and allocate fresh result values instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a goal or milestone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create a new entity ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which kind of entity a graph node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A top-level goal.
    Goal,

    /// A milestone belonging to a goal.
    Milestone,
}

/// Lifecycle state of a goal or milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    /// Defined but not yet started.
    Planned,

    /// Currently being worked on.
    Active,

    /// Work is temporarily suspended.
    Paused,

    /// Finished successfully.
    Completed,

    /// Finished unsuccessfully.
    Failed,

    /// Given up on.
    Abandoned,
}

impl EntityState {
    /// Returns true for states from which no further transition happens.
    ///
    /// Terminal entities are excluded from blocking analysis entirely.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EntityState::Completed | EntityState::Failed | EntityState::Abandoned
        )
    }

    /// Returns true if this state represents successful completion.
    ///
    /// Only completion clears a blocker; a failed or abandoned dependency
    /// still blocks its dependents.
    pub fn is_completed(&self) -> bool {
        matches!(self, EntityState::Completed)
    }
}

/// Type of dependency between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Hard blocker - the target must complete before the source can.
    Blocks,

    /// Prerequisite - semantically identical to `Blocks` for blocking
    /// analysis, kept distinct for display purposes.
    Requires,

    /// Informational link - never participates in blocking, cycle, or
    /// deadlock computations.
    SoftDependency,
}

impl DependencyType {
    /// Returns true if this dependency type participates in blocking,
    /// cycle, and deadlock semantics.
    pub fn is_blocking(&self) -> bool {
        matches!(self, DependencyType::Blocks | DependencyType::Requires)
    }
}

/// A directed dependency edge snapshot: `source` depends on `target`.
///
/// The edge direction follows the dependent -> dependency convention:
/// if goal A is blocked by goal B, the edge is `A -> B`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// The entity that has the dependency.
    pub source_id: EntityId,

    /// The entity being depended upon.
    pub target_id: EntityId,

    /// The kind of relationship.
    pub dep_type: DependencyType,
}

impl Dependency {
    /// Create a new dependency edge.
    pub fn new(
        source_id: impl Into<EntityId>,
        target_id: impl Into<EntityId>,
        dep_type: DependencyType,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            dep_type,
        }
    }
}

/// A top-level goal snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier.
    pub id: EntityId,

    /// Human-readable title.
    pub title: String,

    /// Current lifecycle state.
    pub state: EntityState,

    /// Priority level (0 = highest, 4 = lowest).
    pub priority: u8,

    /// Progress toward completion, 0-100.
    pub progress: f64,

    /// Optional target completion date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,

    /// When the goal was created.
    pub created_at: DateTime<Utc>,
}

/// A milestone snapshot. Milestones belong to a goal and carry the same
/// trackable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// Unique identifier.
    pub id: EntityId,

    /// The goal this milestone belongs to.
    pub goal_id: EntityId,

    /// Human-readable title.
    pub title: String,

    /// Current lifecycle state.
    pub state: EntityState,

    /// Priority level (0 = highest, 4 = lowest).
    pub priority: u8,

    /// Progress toward completion, 0-100.
    pub progress: f64,

    /// Optional target completion date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,

    /// When the milestone was created.
    pub created_at: DateTime<Utc>,
}

/// A goal or milestone, viewed uniformly.
///
/// The two variants expose the same trackable fields through accessor
/// methods, so graph and analytics code never needs to know which kind it
/// is handed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    /// A top-level goal.
    Goal(Goal),

    /// A milestone belonging to a goal.
    Milestone(Milestone),
}

impl Entity {
    /// The entity's unique identifier.
    pub fn id(&self) -> &EntityId {
        match self {
            Entity::Goal(g) => &g.id,
            Entity::Milestone(m) => &m.id,
        }
    }

    /// Which kind of entity this is.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Goal(_) => EntityKind::Goal,
            Entity::Milestone(_) => EntityKind::Milestone,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EntityState {
        match self {
            Entity::Goal(g) => g.state,
            Entity::Milestone(m) => m.state,
        }
    }

    /// Display title.
    pub fn title(&self) -> &str {
        match self {
            Entity::Goal(g) => &g.title,
            Entity::Milestone(m) => &m.title,
        }
    }

    /// Priority level (0 = highest, 4 = lowest).
    pub fn priority(&self) -> u8 {
        match self {
            Entity::Goal(g) => g.priority,
            Entity::Milestone(m) => m.priority,
        }
    }

    /// Progress toward completion, 0-100.
    pub fn progress(&self) -> f64 {
        match self {
            Entity::Goal(g) => g.progress,
            Entity::Milestone(m) => m.progress,
        }
    }

    /// Optional target completion date.
    pub fn target_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Entity::Goal(g) => g.target_date,
            Entity::Milestone(m) => m.target_date,
        }
    }

    /// When the entity was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Entity::Goal(g) => g.created_at,
            Entity::Milestone(m) => m.created_at,
        }
    }

    /// Sets the progress value. Used by simulation on a cloned entity;
    /// callers that hold snapshots never see these mutations.
    pub fn set_progress(&mut self, progress: f64) {
        match self {
            Entity::Goal(g) => g.progress = progress,
            Entity::Milestone(m) => m.progress = progress,
        }
    }

    /// Sets the target date.
    pub fn set_target_date(&mut self, target_date: Option<DateTime<Utc>>) {
        match self {
            Entity::Goal(g) => g.target_date = target_date,
            Entity::Milestone(m) => m.target_date = target_date,
        }
    }

    /// Shifts the priority by a signed delta, clamped to the 0-4 scale.
    pub fn adjust_priority(&mut self, delta: i8) {
        let adjusted = (i16::from(self.priority()) + i16::from(delta)).clamp(0, 4) as u8;
        match self {
            Entity::Goal(g) => g.priority = adjusted,
            Entity::Milestone(m) => m.priority = adjusted,
        }
    }
}

/// A time-stamped progress observation for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// The entity this update belongs to.
    pub entity_id: EntityId,

    /// Reported progress, 0-100.
    pub percentage: f64,

    /// When the update was recorded.
    pub created_at: DateTime<Utc>,

    /// Self-reported motivation at the time of the update (1-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation_level: Option<u8>,

    /// Self-reported confidence at the time of the update (1-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_level: Option<u8>,
}

impl ProgressUpdate {
    /// Create a new progress update with no behavioral fields.
    pub fn new(
        entity_id: impl Into<EntityId>,
        percentage: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            percentage,
            created_at,
            motivation_level: None,
            confidence_level: None,
        }
    }
}

//! Result value objects for the dependency graph engine.
//!
//! Everything here is a plain, freshly-allocated value: safe to serialize,
//! cache, or ship across a channel, and never aliased with engine input.

use crate::domain::{Entity, EntityId, EntityKind, EntityState, Goal, Milestone};
use serde::{Deserialize, Serialize};

/// The node-level view the graph keeps of an entity.
///
/// Graph queries only need identity, kind, state, and a display title;
/// the heavier analytics fields stay with the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Unique identifier.
    pub id: EntityId,

    /// Goal or milestone.
    pub kind: EntityKind,

    /// Current lifecycle state.
    pub state: EntityState,

    /// Display title.
    pub title: String,
}

impl From<&Goal> for NodeSnapshot {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id.clone(),
            kind: EntityKind::Goal,
            state: goal.state,
            title: goal.title.clone(),
        }
    }
}

impl From<&Milestone> for NodeSnapshot {
    fn from(milestone: &Milestone) -> Self {
        Self {
            id: milestone.id.clone(),
            kind: EntityKind::Milestone,
            state: milestone.state,
            title: milestone.title.clone(),
        }
    }
}

impl From<&Entity> for NodeSnapshot {
    fn from(entity: &Entity) -> Self {
        match entity {
            Entity::Goal(g) => Self::from(g),
            Entity::Milestone(m) => Self::from(m),
        }
    }
}

/// Outcome of cycle detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Whether any cycle exists among blocking edges.
    pub has_cycle: bool,

    /// One representative cycle, from the back-edge target through the
    /// closing node inclusive. Diagnostic only; at most one cycle is
    /// reported per call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_path: Option<Vec<EntityId>>,
}

/// Outcome of deadlock detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockReport {
    /// Whether any mutual blocking pair exists.
    pub has_deadlock: bool,

    /// Both members of every mutual blocking pair, deduplicated.
    pub deadlocked: Vec<EntityId>,
}

/// One incomplete dependency currently blocking an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    /// The blocking entity.
    pub id: EntityId,

    /// Its display title.
    pub title: String,

    /// Its current state.
    pub state: EntityState,
}

/// A non-terminal item together with its incomplete direct blockers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedItem {
    /// The blocked entity.
    pub id: EntityId,

    /// Its display title.
    pub title: String,

    /// The incomplete dependencies blocking it, one hop only.
    pub blocked_by: Vec<Blocker>,
}

/// A dependent reached by a cascading delay, with its distance from the
/// delay source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedItem {
    /// The affected entity.
    pub id: EntityId,

    /// Minimum number of dependency hops from the delay source.
    pub delay_propagation: usize,
}

/// A delay source and every dependent its delay propagates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadingDelay {
    /// The non-completed entity the delay originates from.
    pub source_id: EntityId,

    /// All transitively affected dependents, shallowest path first.
    pub affected: Vec<AffectedItem>,
}

/// The longest dependency chain in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPath {
    /// The chain itself, dependent first.
    pub path: Vec<EntityId>,

    /// Number of nodes on the chain. An isolated node has length 1;
    /// an empty graph has length 0.
    pub length: usize,
}

/// Aggregate report produced by [`crate::graph::validate_dependencies`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True iff neither a cycle nor a deadlock was found. Blocked items
    /// and cascading delays are informational and do not fail validation.
    pub is_valid: bool,

    /// Whether a circular dependency exists.
    pub has_circular_dependency: bool,

    /// One representative cycle, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circular_path: Option<Vec<EntityId>>,

    /// Whether a mutual deadlock exists.
    pub has_deadlock: bool,

    /// All entities involved in mutual deadlocks.
    pub deadlocked_items: Vec<EntityId>,

    /// Non-terminal items with incomplete direct blockers.
    pub blocked_items: Vec<BlockedItem>,

    /// Delay sources and the dependents their delays cascade to.
    pub cascading_delays: Vec<CascadingDelay>,

    /// Human-readable summary lines for display or logging.
    pub diagnostics: Vec<String>,
}

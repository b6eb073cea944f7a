//! Request and response messages for the execution host.
//!
//! This is the only wire format in scope: a same-process message channel,
//! not a network protocol. Messages serialize as `{type, payload}` with
//! SCREAMING_SNAKE_CASE tags so hosts can log, persist, or bridge them
//! without re-encoding.

use chrono::{DateTime, Utc};
use lodestar::analytics::{PredictionResult, VelocityResult};
use lodestar::domain::{Dependency, Entity, EntityId, Milestone, ProgressUpdate};
use serde::{Deserialize, Serialize};

/// A computation request submitted to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerRequest {
    /// Compute velocity and trend for one entity.
    ComputeTrendAnalysis {
        /// The entity to analyze.
        entity_id: EntityId,
        /// When the entity was created.
        created_at: DateTime<Utc>,
        /// Progress-update history (any entity's updates may be included;
        /// the core filters).
        updates: Vec<ProgressUpdate>,
    },

    /// Compute a completion prediction for one entity.
    ComputePrediction {
        /// The entity to predict for.
        entity: Entity,
        /// The entity's milestones.
        milestones: Vec<Milestone>,
        /// Progress-update history.
        updates: Vec<ProgressUpdate>,
        /// Currently-blocking dependency signals for the entity.
        blocking: Vec<Dependency>,
        /// Historical completion base rate in percent.
        historical_completion_rate: f64,
    },

    /// Compute velocity and prediction for a whole entity collection in
    /// one pass, sharing a single graph snapshot.
    ComputeBatchAnalytics {
        /// All entities, goals and milestones alike.
        entities: Vec<Entity>,
        /// All dependency edges.
        edges: Vec<Dependency>,
        /// Progress-update history for all entities.
        updates: Vec<ProgressUpdate>,
    },
}

/// A computation result returned by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerResponse {
    /// Result of a `ComputeTrendAnalysis` request.
    TrendAnalysisResult(VelocityResult),

    /// Result of a `ComputePrediction` request.
    PredictionResult(PredictionResult),

    /// Result of a `ComputeBatchAnalytics` request.
    BatchAnalyticsResult(Vec<EntityAnalytics>),
}

/// Per-entity output of a batch analytics run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityAnalytics {
    /// The entity the metrics belong to.
    pub entity_id: EntityId,

    /// Velocity metrics.
    pub velocity: VelocityResult,

    /// Completion outlook.
    pub prediction: PredictionResult,
}

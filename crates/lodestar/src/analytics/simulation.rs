//! What-if simulation over the prediction model.
//!
//! Applies hypothetical changes to a copy of an entity and reruns the
//! probability model, leaving the caller's snapshot untouched. The
//! recommendations are advisory strings produced from simple threshold
//! comparisons, not a scored output.

use super::prediction::predict_completion_probability_at;
use super::{days_between, PredictionResult};
use crate::config::EngineConfig;
use crate::domain::{Dependency, Entity, EntityId, Milestone, ProgressUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Probability-delta beyond which a simulation is called out as significant.
const SIGNIFICANT_PROBABILITY_DELTA: i32 = 10;
/// Timeline extension (days) beyond which a rescheduling note is emitted.
const LONG_EXTENSION_DAYS: i64 = 14;
/// Workload percentage attributed to each step of priority delta.
const WORKLOAD_PER_PRIORITY_STEP: f64 = 10.0;
/// Neutral base rate used for both sides of a simulation comparison.
const SIMULATION_BASE_RATE: f64 = 50.0;

/// Hypothetical changes to evaluate against an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatedChanges {
    /// Replace the entity's progress (clamped to 0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_progress: Option<f64>,

    /// Replace the entity's target date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_target_date: Option<DateTime<Utc>>,

    /// Shift the entity's priority by this many steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_delta: Option<i8>,

    /// Drop the blocking signals whose target is one of these entities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_dependency_ids: Vec<EntityId>,
}

/// Side-by-side outcome of a what-if simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Probability for the entity as it stands.
    pub original_probability: u8,

    /// Probability after applying the requested changes.
    pub simulated_probability: u8,

    /// Estimated workload shift in percent, derived from the priority
    /// delta. Advisory only.
    pub workload_change: f64,

    /// Shift of the target date in days (positive = later). Zero when
    /// either date is absent.
    pub timeline_change: i64,

    /// Advisory notes derived from the deltas.
    pub recommendations: Vec<String>,
}

/// Simulates changes, reading the clock once.
pub fn simulate_changes(
    entity: &Entity,
    milestones: &[Milestone],
    updates: &[ProgressUpdate],
    blocking: &[Dependency],
    changes: &SimulatedChanges,
    config: &EngineConfig,
) -> SimulationResult {
    simulate_changes_at(entity, milestones, updates, blocking, changes, config, Utc::now())
}

/// Simulates changes against an explicit `now`.
///
/// The baseline prediction is computed from the unmodified inputs; the
/// simulated prediction runs on a clone with the overrides applied and with
/// blocking signals filtered to drop `removed_dependency_ids`. The caller's
/// entity is never mutated. Both predictions blend against the same neutral
/// base rate, so the probability delta is attributable to the changes alone.
pub fn simulate_changes_at(
    entity: &Entity,
    milestones: &[Milestone],
    updates: &[ProgressUpdate],
    blocking: &[Dependency],
    changes: &SimulatedChanges,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> SimulationResult {
    let baseline = predict_completion_probability_at(
        entity,
        milestones,
        updates,
        blocking,
        SIMULATION_BASE_RATE,
        config,
        now,
    );

    let mut modified = entity.clone();
    if let Some(progress) = changes.new_progress {
        modified.set_progress(progress.clamp(0.0, 100.0));
    }
    if let Some(target_date) = changes.new_target_date {
        modified.set_target_date(Some(target_date));
    }
    if let Some(delta) = changes.priority_delta {
        modified.adjust_priority(delta);
    }

    let remaining_blocking: Vec<Dependency> = blocking
        .iter()
        .filter(|signal| !changes.removed_dependency_ids.contains(&signal.target_id))
        .cloned()
        .collect();

    let simulated = predict_completion_probability_at(
        &modified,
        milestones,
        updates,
        &remaining_blocking,
        SIMULATION_BASE_RATE,
        config,
        now,
    );

    let workload_change =
        f64::from(changes.priority_delta.unwrap_or(0)) * WORKLOAD_PER_PRIORITY_STEP;
    let timeline_change = match (changes.new_target_date, entity.target_date()) {
        (Some(new), Some(old)) => days_between(new, old),
        _ => 0,
    };

    let recommendations = build_recommendations(&baseline, &simulated, timeline_change, changes);

    SimulationResult {
        original_probability: baseline.probability,
        simulated_probability: simulated.probability,
        workload_change,
        timeline_change,
        recommendations,
    }
}

fn build_recommendations(
    baseline: &PredictionResult,
    simulated: &PredictionResult,
    timeline_change: i64,
    changes: &SimulatedChanges,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    let delta = i32::from(simulated.probability) - i32::from(baseline.probability);
    if delta > SIGNIFICANT_PROBABILITY_DELTA {
        recommendations.push(format!(
            "These changes raise the completion probability by {delta} points"
        ));
    } else if delta < -SIGNIFICANT_PROBABILITY_DELTA {
        recommendations.push(format!(
            "These changes lower the completion probability by {} points",
            -delta
        ));
    }

    if timeline_change > LONG_EXTENSION_DAYS {
        recommendations.push(format!(
            "Target date moves out by {timeline_change} days; consider splitting the work instead"
        ));
    }

    if !changes.removed_dependency_ids.is_empty() {
        recommendations.push(format!(
            "Removing {} dependencies unblocks progress immediately",
            changes.removed_dependency_ids.len()
        ));
    }

    if recommendations.is_empty() {
        recommendations
            .push("Proposed changes have minimal impact on the completion outlook".to_string());
    }

    recommendations
}

//! Completion-probability estimation.
//!
//! The score is an additive heuristic, not a statistical model: each factor
//! adds to, subtracts from, or blends into a running probability that starts
//! at half the entity's current progress. Factors also emit human-readable
//! strings so callers can explain a score without re-deriving it.

use super::days_between;
use super::velocity::{compute_velocity_at, VelocityTrend};
use crate::config::EngineConfig;
use crate::domain::{Dependency, Entity, Milestone, ProgressUpdate};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Probability swing for an accelerating velocity trend.
const ACCELERATING_BONUS: f64 = 15.0;
/// Probability swing for a stagnant velocity trend.
const STAGNANT_PENALTY: f64 = 20.0;
/// Probability swing for a decelerating velocity trend.
const DECELERATING_PENALTY: f64 = 10.0;
/// Probability swing per currently-blocking dependency.
const BLOCKING_PENALTY: f64 = 10.0;
/// Maximum contribution of the milestone completion ratio.
const MILESTONE_WEIGHT: f64 = 20.0;
/// Weight of the computed score when blending with the historical rate.
const SCORE_BLEND: f64 = 0.7;
/// Weight of the historical base rate in the blend.
const HISTORY_BLEND: f64 = 0.3;

/// How much progress-history data backs a prediction.
///
/// A coarse qualitative label, not a statistical confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// At least ten combined data points and a non-stagnant trend.
    High,

    /// At least five combined data points.
    Medium,

    /// Some data, but too little to lean on.
    Low,

    /// No progress updates and no milestones at all.
    InsufficientData,
}

/// Completion outlook for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Estimated completion probability, 0-100.
    pub probability: u8,

    /// How much data backs the estimate.
    pub confidence: Confidence,

    /// Linear extrapolation of the completion date from the current rate,
    /// when progress is incomplete and the rate is positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_date: Option<DateTime<Utc>>,

    /// Factors that lowered the score.
    pub risk_factors: Vec<String>,

    /// Factors that raised the score.
    pub positive_factors: Vec<String>,
}

/// Predicts completion probability, reading the clock once.
pub fn predict_completion_probability(
    entity: &Entity,
    milestones: &[Milestone],
    updates: &[ProgressUpdate],
    blocking: &[Dependency],
    historical_completion_rate: f64,
    config: &EngineConfig,
) -> PredictionResult {
    predict_completion_probability_at(
        entity,
        milestones,
        updates,
        blocking,
        historical_completion_rate,
        config,
        Utc::now(),
    )
}

/// Predicts completion probability against an explicit `now`.
///
/// `blocking` carries the graph engine's blocking signals for this entity:
/// one [`Dependency`] per blocking edge whose target has not completed
/// (see [`crate::graph::DependencyGraph::blocking_signals`]).
/// `historical_completion_rate` is the caller's base rate in percent, for
/// example from [`super::historical_completion_rate`].
pub fn predict_completion_probability_at(
    entity: &Entity,
    milestones: &[Milestone],
    updates: &[ProgressUpdate],
    blocking: &[Dependency],
    historical_completion_rate: f64,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> PredictionResult {
    let mut probability = entity.progress() * 0.5;
    let mut risk_factors = Vec::new();
    let mut positive_factors = Vec::new();

    let velocity = compute_velocity_at(entity.id(), updates, entity.created_at(), config, now);

    match velocity.trend {
        VelocityTrend::Accelerating => {
            probability += ACCELERATING_BONUS;
            positive_factors.push("Progress is accelerating".to_string());
        }
        VelocityTrend::Stagnant => {
            probability -= STAGNANT_PENALTY;
            risk_factors.push(format!(
                "No progress recorded for {} days",
                velocity.stagnation_days
            ));
        }
        VelocityTrend::Decelerating => {
            probability -= DECELERATING_PENALTY;
            risk_factors.push("Progress is slowing down".to_string());
        }
        VelocityTrend::Stable => {}
    }

    if !blocking.is_empty() {
        probability -= BLOCKING_PENALTY * blocking.len() as f64;
        risk_factors.push(format!(
            "Blocked by {} incomplete dependencies",
            blocking.len()
        ));
    }

    if !milestones.is_empty() {
        let completed = milestones
            .iter()
            .filter(|milestone| milestone.state.is_completed())
            .count();
        let ratio = completed as f64 / milestones.len() as f64;
        probability += ratio * MILESTONE_WEIGHT;
        if ratio > 0.7 {
            positive_factors.push(format!(
                "{completed} of {} milestones completed",
                milestones.len()
            ));
        }
    }

    probability = probability * SCORE_BLEND + historical_completion_rate * HISTORY_BLEND;

    let remaining = (100.0 - entity.progress()).max(0.0);
    if let Some(target) = entity.target_date() {
        if target > now {
            let days_remaining = days_between(target, now).max(1);
            let required_velocity = remaining / days_remaining as f64;
            if velocity.progress_per_day >= required_velocity * 1.2 {
                probability += 10.0;
                positive_factors.push("Current pace meets the target date".to_string());
            } else if velocity.progress_per_day < required_velocity * 0.5 {
                probability -= 15.0;
                risk_factors.push("Current pace is too slow for the target date".to_string());
            }
        } else {
            probability -= 20.0;
            risk_factors.push("Target date has already passed".to_string());
        }
    }

    let estimated_completion_date = if entity.progress() < 100.0 && velocity.progress_per_day > 0.0
    {
        let days_to_complete = (remaining / velocity.progress_per_day).ceil() as i64;
        Some(now + Duration::days(days_to_complete))
    } else {
        None
    };

    let update_count = updates
        .iter()
        .filter(|update| &update.entity_id == entity.id())
        .count();
    let data_points = update_count + milestones.len();
    let confidence = if data_points == 0 {
        Confidence::InsufficientData
    } else if data_points >= 10 && velocity.trend != VelocityTrend::Stagnant {
        Confidence::High
    } else if data_points >= 5 {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    PredictionResult {
        probability: probability.clamp(0.0, 100.0).round() as u8,
        confidence,
        estimated_completion_date,
        risk_factors,
        positive_factors,
    }
}

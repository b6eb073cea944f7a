//! Velocity estimation from progress-update history.

use super::{days_between, round2};
use crate::config::EngineConfig;
use crate::domain::{EntityId, ProgressUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of an entity's recent progress rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityTrend {
    /// The second half of the history moved meaningfully faster than the
    /// first.
    Accelerating,

    /// No meaningful change in pace.
    Stable,

    /// The second half of the history moved meaningfully slower than the
    /// first.
    Decelerating,

    /// No update recorded within the stagnation threshold.
    Stagnant,
}

/// Velocity metrics for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityResult {
    /// Progress points gained per active day.
    pub progress_per_day: f64,

    /// Progress points gained per week at the current daily rate.
    pub progress_per_week: f64,

    /// Direction of the recent progress rate.
    pub trend: VelocityTrend,

    /// Timestamp of the most recent update, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<DateTime<Utc>>,

    /// Days since the most recent update (or since creation, when there is
    /// no update at all).
    pub stagnation_days: i64,
}

/// Computes velocity for an entity, reading the clock once.
pub fn compute_velocity(
    entity_id: &EntityId,
    updates: &[ProgressUpdate],
    created_at: DateTime<Utc>,
    config: &EngineConfig,
) -> VelocityResult {
    compute_velocity_at(entity_id, updates, created_at, config, Utc::now())
}

/// Computes velocity for an entity against an explicit `now`.
///
/// The updates are filtered to the entity and sorted ascending by time.
/// Long idle gaps are discounted: for every consecutive pair of updates
/// whose gap exceeds the configured threshold, only the days beyond the
/// threshold are subtracted from the active-day count (a 20-day gap with a
/// 14-day threshold contributes 6 excess days, not 20). The same rule
/// applies to the gap between the last update and `now`. This avoids
/// penalizing velocity for idle periods that do not reflect active effort.
///
/// With no updates at all the result is all zeroes, stagnant, with
/// stagnation covering the entity's whole lifetime.
pub fn compute_velocity_at(
    entity_id: &EntityId,
    updates: &[ProgressUpdate],
    created_at: DateTime<Utc>,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> VelocityResult {
    let mut history: Vec<&ProgressUpdate> = updates
        .iter()
        .filter(|update| &update.entity_id == entity_id)
        .collect();
    history.sort_by_key(|update| update.created_at);

    let total_days = days_between(now, created_at).max(1);

    let Some(last) = history.last() else {
        return VelocityResult {
            progress_per_day: 0.0,
            progress_per_week: 0.0,
            trend: VelocityTrend::Stagnant,
            last_active_date: None,
            stagnation_days: total_days,
        };
    };

    let stagnation_days = days_between(now, last.created_at).max(0);

    let mut excess_gap_days = 0;
    for pair in history.windows(2) {
        let gap = days_between(pair[1].created_at, pair[0].created_at);
        if gap > config.activity_gap_days {
            excess_gap_days += gap - config.activity_gap_days;
        }
    }
    let tail_gap = days_between(now, last.created_at);
    if tail_gap > config.activity_gap_days {
        excess_gap_days += tail_gap - config.activity_gap_days;
    }

    let active_days = (total_days - excess_gap_days).max(1);
    let progress_per_day = round2(last.percentage / active_days as f64);
    let progress_per_week = round2(progress_per_day * 7.0);

    VelocityResult {
        progress_per_day,
        progress_per_week,
        trend: classify_trend(&history, stagnation_days, config),
        last_active_date: Some(last.created_at),
        stagnation_days,
    }
}

/// Splits the history at its midpoint and compares each half's own rate.
/// A difference beyond one progress point per day in either direction is a
/// trend; stagnation takes precedence over everything else.
fn classify_trend(
    history: &[&ProgressUpdate],
    stagnation_days: i64,
    config: &EngineConfig,
) -> VelocityTrend {
    if stagnation_days > config.stagnation_days {
        return VelocityTrend::Stagnant;
    }
    if history.len() < 3 {
        return VelocityTrend::Stable;
    }

    let mid = history.len() / 2;
    let delta = half_velocity(&history[mid..]) - half_velocity(&history[..mid]);

    if delta > 1.0 {
        VelocityTrend::Accelerating
    } else if delta < -1.0 {
        VelocityTrend::Decelerating
    } else {
        VelocityTrend::Stable
    }
}

/// Progress-delta over elapsed-days velocity of one half of the history.
fn half_velocity(half: &[&ProgressUpdate]) -> f64 {
    let (Some(first), Some(last)) = (half.first(), half.last()) else {
        return 0.0;
    };
    let elapsed = days_between(last.created_at, first.created_at).max(1);
    (last.percentage - first.percentage) / elapsed as f64
}

//! Predictive analytics engine.
//!
//! Computes per-entity velocity from progress-update history, estimates
//! completion probability by combining velocity, graph blocking signals,
//! milestone completion, deadline proximity, and historical base rates, and
//! supports non-mutating what-if simulation against a modified copy of an
//! entity.
//!
//! Every public function has two forms: a thin wrapper that reads
//! `Utc::now()` exactly once, and an `*_at` variant that takes the timestamp
//! explicitly. One consistent "now" flows through a whole call, which keeps
//! results internally coherent and makes the functions fully deterministic
//! under test.

mod cache;
mod history;
mod prediction;
mod simulation;
mod velocity;

pub use cache::MetricsCache;
pub use history::historical_completion_rate;
pub use prediction::{
    predict_completion_probability, predict_completion_probability_at, Confidence,
    PredictionResult,
};
pub use simulation::{simulate_changes, simulate_changes_at, SimulatedChanges, SimulationResult};
pub use velocity::{compute_velocity, compute_velocity_at, VelocityResult, VelocityTrend};

use chrono::{DateTime, Utc};

/// Whole days elapsed from `earlier` to `later`. Negative when `later`
/// precedes `earlier`; callers apply their own floors.
pub(crate) fn days_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    (later - earlier).num_days()
}

/// Rounds to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

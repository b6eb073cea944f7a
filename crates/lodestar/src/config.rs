//! Engine configuration.
//!
//! Thresholds that tune the analytics heuristics. The struct is a plain
//! value owned by the caller and passed by reference into analytics calls;
//! `EngineConfig::default()` matches the documented behavior and is what
//! callers should use unless they have a reason not to.

use serde::{Deserialize, Serialize};

/// Tunable thresholds for the analytics engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Gap length (in days) between consecutive progress updates beyond
    /// which the extra days are treated as idle time rather than active
    /// effort. Only the days past this threshold are discounted.
    pub activity_gap_days: i64,

    /// Days without a progress update after which an entity's velocity
    /// trend is classified as stagnant.
    pub stagnation_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activity_gap_days: 14,
            stagnation_days: 7,
        }
    }
}

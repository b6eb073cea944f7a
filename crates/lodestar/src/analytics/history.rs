//! Historical base-rate aggregation.

use super::round2;
use crate::domain::Entity;

/// Base rate assumed before any entity has reached a terminal state.
const DEFAULT_COMPLETION_RATE: f64 = 50.0;

/// Percentage of terminal-state entities that completed successfully.
///
/// Feeds the prediction model's base-rate blend. Entities still in flight
/// say nothing about outcomes and are excluded; with no terminal entity at
/// all, a neutral 50% is returned.
pub fn historical_completion_rate(entities: &[Entity]) -> f64 {
    let mut terminal = 0usize;
    let mut completed = 0usize;

    for entity in entities {
        if entity.state().is_terminal() {
            terminal += 1;
            if entity.state().is_completed() {
                completed += 1;
            }
        }
    }

    if terminal == 0 {
        return DEFAULT_COMPLETION_RATE;
    }
    round2(completed as f64 / terminal as f64 * 100.0)
}

//! Caller-owned cache for derived analytics.
//!
//! The engines themselves hold no state between calls. Callers that query
//! the same entities repeatedly within one scope (a reporting pass, a batch
//! request) can own a `MetricsCache` and pass it into their loop; anything
//! longer-lived belongs in the caller's persistence layer.

use super::prediction::PredictionResult;
use super::velocity::VelocityResult;
use crate::domain::EntityId;
use std::collections::HashMap;

/// Memoized velocity and prediction results, keyed by entity.
#[derive(Debug, Clone, Default)]
pub struct MetricsCache {
    velocities: HashMap<EntityId, VelocityResult>,
    predictions: HashMap<EntityId, PredictionResult>,
}

impl MetricsCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached velocity for an entity, if any.
    pub fn velocity(&self, id: &EntityId) -> Option<&VelocityResult> {
        self.velocities.get(id)
    }

    /// Returns the cached prediction for an entity, if any.
    pub fn prediction(&self, id: &EntityId) -> Option<&PredictionResult> {
        self.predictions.get(id)
    }

    /// Returns the cached velocity, computing and storing it on a miss.
    pub fn velocity_or_compute(
        &mut self,
        id: &EntityId,
        compute: impl FnOnce() -> VelocityResult,
    ) -> &VelocityResult {
        self.velocities
            .entry(id.clone())
            .or_insert_with(compute)
    }

    /// Returns the cached prediction, computing and storing it on a miss.
    pub fn prediction_or_compute(
        &mut self,
        id: &EntityId,
        compute: impl FnOnce() -> PredictionResult,
    ) -> &PredictionResult {
        self.predictions
            .entry(id.clone())
            .or_insert_with(compute)
    }

    /// Drops both cached results for an entity. Call after any mutation
    /// that affects the entity's history or dependencies.
    pub fn invalidate(&mut self, id: &EntityId) {
        self.velocities.remove(id);
        self.predictions.remove(id);
    }

    /// Drops everything.
    pub fn clear(&mut self) {
        self.velocities.clear();
        self.predictions.clear();
    }

    /// Number of entities with at least one cached result.
    pub fn len(&self) -> usize {
        let mut ids: std::collections::HashSet<&EntityId> = self.velocities.keys().collect();
        ids.extend(self.predictions.keys());
        ids.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty() && self.predictions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::VelocityTrend;

    fn velocity(rate: f64) -> VelocityResult {
        VelocityResult {
            progress_per_day: rate,
            progress_per_week: rate * 7.0,
            trend: VelocityTrend::Stable,
            last_active_date: None,
            stagnation_days: 0,
        }
    }

    #[test]
    fn computes_once_per_entity() {
        let mut cache = MetricsCache::new();
        let id = EntityId::new("g-1");
        let mut calls = 0;

        for _ in 0..3 {
            cache.velocity_or_compute(&id, || {
                calls += 1;
                velocity(2.0)
            });
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.velocity(&id).unwrap().progress_per_day, 2.0);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let mut cache = MetricsCache::new();
        let id = EntityId::new("g-1");

        cache.velocity_or_compute(&id, || velocity(2.0));
        cache.invalidate(&id);
        assert!(cache.velocity(&id).is_none());

        cache.velocity_or_compute(&id, || velocity(3.0));
        assert_eq!(cache.velocity(&id).unwrap().progress_per_day, 3.0);
    }

    #[test]
    fn len_counts_distinct_entities() {
        let mut cache = MetricsCache::new();
        assert!(cache.is_empty());

        cache.velocity_or_compute(&EntityId::new("g-1"), || velocity(1.0));
        cache.velocity_or_compute(&EntityId::new("g-2"), || velocity(1.0));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}

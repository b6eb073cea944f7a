//! The analytics execution host.

use crate::error::{Error, Result};
use crate::messages::{EntityAnalytics, WorkerRequest, WorkerResponse};
use chrono::{DateTime, Utc};
use lodestar::analytics::{
    compute_velocity_at, historical_completion_rate, predict_completion_probability_at,
};
use lodestar::domain::{Dependency, Entity, Milestone, ProgressUpdate};
use lodestar::graph::{DependencyGraph, NodeSnapshot};
use lodestar::EngineConfig;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Configuration for the execution host.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// How long a caller waits for a response before resolving with `None`.
    pub request_timeout: Duration,

    /// Bound of the request queue; senders back-pressure beyond it.
    pub queue_capacity: usize,

    /// Engine thresholds forwarded into every computation.
    pub engine: EngineConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            queue_capacity: 32,
            engine: EngineConfig::default(),
        }
    }
}

/// One queued request together with its reply channel.
struct Envelope {
    request: WorkerRequest,
    reply: oneshot::Sender<WorkerResponse>,
}

/// Runs the core's pure functions off the caller's thread.
///
/// The host owns one dispatcher task; each received request computes on its
/// own task, so requests with different tags can genuinely be in flight at
/// the same time. Responses are correlated per request through a oneshot
/// reply channel rather than by tag matching.
#[derive(Debug)]
pub struct AnalyticsHost {
    sender: mpsc::Sender<Envelope>,
    dispatcher: JoinHandle<()>,
    config: HostConfig,
}

impl AnalyticsHost {
    /// Spawns the host onto the current tokio runtime.
    pub fn spawn(config: HostConfig) -> Self {
        let (sender, mut receiver) = mpsc::channel::<Envelope>(config.queue_capacity);
        let engine = config.engine.clone();

        let dispatcher = tokio::spawn(async move {
            while let Some(envelope) = receiver.recv().await {
                let engine = engine.clone();
                tokio::spawn(async move {
                    let response = handle(envelope.request, &engine);
                    if envelope.reply.send(response).is_err() {
                        // The caller timed out; the computed result is
                        // discarded.
                        tracing::debug!("dropping response for an abandoned request");
                    }
                });
            }
        });

        Self {
            sender,
            dispatcher,
            config,
        }
    }

    /// Submits a request and waits for its response with the configured
    /// timeout.
    ///
    /// Resolves to `None` when the timeout elapses first. The in-flight
    /// computation is not interrupted - it finishes and its result is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HostClosed`] when the host's dispatcher has shut
    /// down.
    pub async fn request(&self, request: WorkerRequest) -> Result<Option<WorkerResponse>> {
        self.request_with_timeout(request, self.config.request_timeout)
            .await
    }

    /// Submits a request with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HostClosed`] when the host's dispatcher has shut
    /// down.
    pub async fn request_with_timeout(
        &self,
        request: WorkerRequest,
        timeout: Duration,
    ) -> Result<Option<WorkerResponse>> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Envelope { request, reply })
            .await
            .map_err(|_| Error::HostClosed)?;

        match tokio::time::timeout(timeout, response).await {
            Ok(Ok(response)) => Ok(Some(response)),
            Ok(Err(_)) => Err(Error::HostClosed),
            Err(_) => Ok(None),
        }
    }

    /// Shuts the host down, letting already-queued requests finish
    /// dispatching.
    pub async fn shutdown(self) {
        drop(self.sender);
        let _ = self.dispatcher.await;
    }
}

/// Executes one request synchronously. The clock is read exactly once so a
/// single consistent `now` flows through the whole computation.
fn handle(request: WorkerRequest, engine: &EngineConfig) -> WorkerResponse {
    let now = Utc::now();
    match request {
        WorkerRequest::ComputeTrendAnalysis {
            entity_id,
            created_at,
            updates,
        } => WorkerResponse::TrendAnalysisResult(compute_velocity_at(
            &entity_id, &updates, created_at, engine, now,
        )),
        WorkerRequest::ComputePrediction {
            entity,
            milestones,
            updates,
            blocking,
            historical_completion_rate,
        } => WorkerResponse::PredictionResult(predict_completion_probability_at(
            &entity,
            &milestones,
            &updates,
            &blocking,
            historical_completion_rate,
            engine,
            now,
        )),
        WorkerRequest::ComputeBatchAnalytics {
            entities,
            edges,
            updates,
        } => WorkerResponse::BatchAnalyticsResult(batch_analytics(
            &entities, &edges, &updates, engine, now,
        )),
    }
}

/// Computes velocity and prediction for every non-terminal entity, sharing
/// one graph snapshot and one historical base rate across the batch.
fn batch_analytics(
    entities: &[Entity],
    edges: &[Dependency],
    updates: &[ProgressUpdate],
    engine: &EngineConfig,
    now: DateTime<Utc>,
) -> Vec<EntityAnalytics> {
    let graph = DependencyGraph::build(entities.iter().map(NodeSnapshot::from), edges);
    let base_rate = historical_completion_rate(entities);

    entities
        .iter()
        .filter(|entity| !entity.state().is_terminal())
        .map(|entity| {
            let milestones = milestones_of(entity, entities);
            let blocking = graph.blocking_signals(entity.id());
            let velocity =
                compute_velocity_at(entity.id(), updates, entity.created_at(), engine, now);
            let prediction = predict_completion_probability_at(
                entity,
                &milestones,
                updates,
                &blocking,
                base_rate,
                engine,
                now,
            );
            EntityAnalytics {
                entity_id: entity.id().clone(),
                velocity,
                prediction,
            }
        })
        .collect()
}

/// The milestones belonging to a goal. Milestone entities themselves have
/// none.
fn milestones_of(entity: &Entity, entities: &[Entity]) -> Vec<Milestone> {
    match entity {
        Entity::Goal(goal) => entities
            .iter()
            .filter_map(|candidate| match candidate {
                Entity::Milestone(milestone) if milestone.goal_id == goal.id => {
                    Some(milestone.clone())
                }
                _ => None,
            })
            .collect(),
        Entity::Milestone(_) => Vec::new(),
    }
}

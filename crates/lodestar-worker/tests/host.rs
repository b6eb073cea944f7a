//! Integration tests for the analytics execution host.

use chrono::{DateTime, Duration, TimeZone, Utc};
use lodestar::domain::{
    Dependency, DependencyType, Entity, EntityId, EntityState, Goal, Milestone, ProgressUpdate,
};
use lodestar_worker::{AnalyticsHost, HostConfig, WorkerRequest, WorkerResponse};

fn day(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap() + Duration::days(offset)
}

fn goal(id: &str, state: EntityState, progress: f64) -> Entity {
    Entity::Goal(Goal {
        id: EntityId::new(id),
        title: format!("Goal {id}"),
        state,
        priority: 2,
        progress,
        target_date: None,
        created_at: day(0),
    })
}

fn updates_for(id: &str) -> Vec<ProgressUpdate> {
    vec![
        ProgressUpdate::new(id, 20.0, day(2)),
        ProgressUpdate::new(id, 40.0, day(4)),
    ]
}

#[tokio::test]
async fn trend_analysis_round_trip() {
    let host = AnalyticsHost::spawn(HostConfig::default());

    let response = host
        .request(WorkerRequest::ComputeTrendAnalysis {
            entity_id: EntityId::new("g-1"),
            created_at: day(0),
            updates: updates_for("g-1"),
        })
        .await
        .unwrap();

    let Some(WorkerResponse::TrendAnalysisResult(velocity)) = response else {
        panic!("expected a trend analysis result, got {response:?}");
    };
    assert!(velocity.progress_per_day > 0.0);

    host.shutdown().await;
}

#[tokio::test]
async fn prediction_round_trip() {
    let host = AnalyticsHost::spawn(HostConfig::default());

    let response = host
        .request(WorkerRequest::ComputePrediction {
            entity: goal("g-1", EntityState::Active, 40.0),
            milestones: vec![],
            updates: updates_for("g-1"),
            blocking: vec![],
            historical_completion_rate: 50.0,
        })
        .await
        .unwrap();

    let Some(WorkerResponse::PredictionResult(prediction)) = response else {
        panic!("expected a prediction result, got {response:?}");
    };
    assert!(prediction.probability <= 100);

    host.shutdown().await;
}

#[tokio::test]
async fn batch_analytics_wires_graph_signals_into_predictions() {
    let host = AnalyticsHost::spawn(HostConfig::default());

    let entities = vec![
        goal("g-1", EntityState::Active, 30.0),
        goal("g-2", EntityState::Active, 10.0),
        goal("g-3", EntityState::Completed, 100.0),
    ];
    let edges = vec![Dependency::new("g-1", "g-2", DependencyType::Blocks)];

    let response = host
        .request(WorkerRequest::ComputeBatchAnalytics {
            entities,
            edges,
            updates: updates_for("g-1"),
        })
        .await
        .unwrap();

    let Some(WorkerResponse::BatchAnalyticsResult(results)) = response else {
        panic!("expected a batch result, got {response:?}");
    };

    // Terminal entities are skipped.
    assert_eq!(results.len(), 2);

    let g1 = results
        .iter()
        .find(|r| r.entity_id.as_str() == "g-1")
        .unwrap();
    assert!(g1
        .prediction
        .risk_factors
        .iter()
        .any(|factor| factor.contains("Blocked by 1 incomplete dependencies")));

    host.shutdown().await;
}

#[tokio::test]
async fn batch_scopes_milestones_to_their_goal() {
    let host = AnalyticsHost::spawn(HostConfig::default());

    let milestone = Entity::Milestone(Milestone {
        id: EntityId::new("m-1"),
        goal_id: EntityId::new("g-1"),
        title: "Milestone".to_string(),
        state: EntityState::Completed,
        priority: 2,
        progress: 100.0,
        target_date: None,
        created_at: day(0),
    });
    let entities = vec![
        goal("g-1", EntityState::Active, 50.0),
        goal("g-2", EntityState::Active, 50.0),
        milestone,
    ];

    let response = host
        .request(WorkerRequest::ComputeBatchAnalytics {
            entities,
            edges: vec![],
            updates: vec![],
        })
        .await
        .unwrap();

    let Some(WorkerResponse::BatchAnalyticsResult(results)) = response else {
        panic!("expected a batch result, got {response:?}");
    };

    // g-1 owns the completed milestone; g-2 has none, so its score lacks
    // the milestone-ratio contribution.
    let probability = |id: &str| {
        results
            .iter()
            .find(|r| r.entity_id.as_str() == id)
            .unwrap()
            .prediction
            .probability
    };
    assert!(probability("g-1") > probability("g-2"));

    host.shutdown().await;
}

#[tokio::test]
async fn zero_timeout_resolves_with_none() {
    let host = AnalyticsHost::spawn(HostConfig::default());

    let response = host
        .request_with_timeout(
            WorkerRequest::ComputeTrendAnalysis {
                entity_id: EntityId::new("g-1"),
                created_at: day(0),
                updates: vec![],
            },
            std::time::Duration::ZERO,
        )
        .await
        .unwrap();

    assert!(response.is_none());

    host.shutdown().await;
}

#[tokio::test]
async fn different_request_tags_run_concurrently() {
    let host = AnalyticsHost::spawn(HostConfig::default());

    let trend = host.request(WorkerRequest::ComputeTrendAnalysis {
        entity_id: EntityId::new("g-1"),
        created_at: day(0),
        updates: updates_for("g-1"),
    });
    let prediction = host.request(WorkerRequest::ComputePrediction {
        entity: goal("g-1", EntityState::Active, 40.0),
        milestones: vec![],
        updates: updates_for("g-1"),
        blocking: vec![],
        historical_completion_rate: 50.0,
    });

    let (trend, prediction) = tokio::join!(trend, prediction);

    assert!(matches!(
        trend.unwrap(),
        Some(WorkerResponse::TrendAnalysisResult(_))
    ));
    assert!(matches!(
        prediction.unwrap(),
        Some(WorkerResponse::PredictionResult(_))
    ));

    host.shutdown().await;
}

//! Integration tests for the dependency graph engine.
//!
//! These tests exercise the public graph API end to end: cycle detection,
//! the add-edge pre-check, deadlock detection, blocking diagnostics,
//! cascading delays, execution ordering, critical-path computation, and the
//! aggregate validation report.

use chrono::{TimeZone, Utc};
use lodestar::domain::{Dependency, DependencyType, EntityId, EntityState, Goal, Milestone};
use lodestar::graph::{validate_dependencies, DependencyGraph, NodeSnapshot};
use rstest::rstest;
use std::collections::HashSet;

fn goal(id: &str, state: EntityState) -> Goal {
    Goal {
        id: EntityId::new(id),
        title: format!("Goal {id}"),
        state,
        priority: 2,
        progress: 25.0,
        target_date: None,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn active_goal(id: &str) -> Goal {
    goal(id, EntityState::Active)
}

fn milestone(id: &str, goal_id: &str, state: EntityState) -> Milestone {
    Milestone {
        id: EntityId::new(id),
        goal_id: EntityId::new(goal_id),
        title: format!("Milestone {id}"),
        state,
        priority: 2,
        progress: 0.0,
        target_date: None,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn blocks(source: &str, target: &str) -> Dependency {
    Dependency::new(source, target, DependencyType::Blocks)
}

fn build(goals: &[Goal], edges: &[Dependency]) -> DependencyGraph {
    DependencyGraph::build(goals.iter().map(NodeSnapshot::from), edges)
}

// ========== Edge-free graphs ==========

#[test]
fn edge_free_graph_has_no_cycle() {
    let goals = vec![active_goal("a"), active_goal("b"), active_goal("c")];
    let graph = build(&goals, &[]);

    assert!(!graph.detect_cycle().has_cycle);
    assert!(!graph.detect_deadlocks().has_deadlock);
    assert!(graph.blocked_items().is_empty());
}

#[test]
fn edge_free_graph_critical_path_is_a_single_node() {
    let goals = vec![active_goal("a"), active_goal("b")];
    let graph = build(&goals, &[]);

    let critical = graph.critical_path();
    assert_eq!(critical.length, 1);
    assert_eq!(critical.path.len(), 1);
}

#[test]
fn edge_free_execution_order_covers_every_node_exactly_once() {
    let goals = vec![active_goal("a"), active_goal("b"), active_goal("c")];
    let graph = build(&goals, &[]);

    let order = graph.execution_order();
    assert_eq!(order.len(), 3);
    let distinct: HashSet<&EntityId> = order.iter().collect();
    assert_eq!(distinct.len(), 3);
    for g in &goals {
        assert!(order.contains(&g.id));
    }
}

// ========== Cycles ==========

#[test]
fn self_loop_is_reported_as_a_cycle() {
    let goals = vec![active_goal("a")];
    let graph = build(&goals, &[blocks("a", "a")]);

    let report = graph.detect_cycle();
    assert!(report.has_cycle);
    assert_eq!(report.cycle_path.unwrap(), vec![EntityId::new("a")]);
}

#[test]
fn three_node_cycle_path_names_all_members() {
    let goals = vec![active_goal("a"), active_goal("b"), active_goal("c")];
    let graph = build(
        &goals,
        &[blocks("a", "b"), blocks("b", "c"), blocks("c", "a")],
    );

    let report = graph.detect_cycle();
    assert!(report.has_cycle);
    let path = report.cycle_path.unwrap();
    for id in ["a", "b", "c"] {
        assert!(path.contains(&EntityId::new(id)));
    }
}

#[test]
fn pre_check_catches_the_edge_that_would_close_a_cycle() {
    // The same three nodes without the closing edge: the pre-check must
    // reject c -> a before it is ever persisted.
    let goals = vec![active_goal("a"), active_goal("b"), active_goal("c")];
    let graph = build(&goals, &[blocks("a", "b"), blocks("b", "c")]);

    assert!(!graph.detect_cycle().has_cycle);
    assert!(graph.would_create_cycle(&EntityId::new("c"), &EntityId::new("a")));
    assert!(!graph.would_create_cycle(&EntityId::new("a"), &EntityId::new("c")));
}

// ========== Deadlocks ==========

#[test]
fn mutual_blocking_pair_is_a_deadlock() {
    let goals = vec![active_goal("a"), active_goal("b")];
    let graph = build(&goals, &[blocks("a", "b"), blocks("b", "a")]);

    let report = graph.detect_deadlocks();
    assert!(report.has_deadlock);
    let ids: HashSet<&str> = report.deadlocked.iter().map(EntityId::as_str).collect();
    assert_eq!(ids, HashSet::from(["a", "b"]));
}

#[test]
fn completing_one_side_dissolves_the_deadlock() {
    let goals = vec![active_goal("a"), goal("b", EntityState::Completed)];
    let graph = build(&goals, &[blocks("a", "b"), blocks("b", "a")]);

    let report = graph.detect_deadlocks();
    assert!(!report.has_deadlock);
    assert!(report.deadlocked.is_empty());
}

// ========== Blocking semantics per dependency type ==========

#[rstest]
#[case(DependencyType::Blocks, true)]
#[case(DependencyType::Requires, true)]
#[case(DependencyType::SoftDependency, false)]
fn only_blocking_types_block(#[case] dep_type: DependencyType, #[case] expect_blocked: bool) {
    let goals = vec![active_goal("a"), active_goal("b")];
    let edges = vec![Dependency::new("a", "b", dep_type)];
    let graph = build(&goals, &edges);

    assert_eq!(!graph.blocked_items().is_empty(), expect_blocked);
}

// ========== Cascading delays ==========

#[test]
fn delays_cascade_with_minimum_hop_counts() {
    // Chain a -> b -> c: a delay on c reaches b at one hop and a at two.
    let goals = vec![active_goal("a"), active_goal("b"), active_goal("c")];
    let graph = build(&goals, &[blocks("a", "b"), blocks("b", "c")]);

    let delays = graph.cascading_delays();
    let from_c = delays
        .iter()
        .find(|delay| delay.source_id.as_str() == "c")
        .expect("c has dependents");

    let hops = |id: &str| {
        from_c
            .affected
            .iter()
            .find(|item| item.id.as_str() == id)
            .map(|item| item.delay_propagation)
    };
    assert_eq!(hops("b"), Some(1));
    assert_eq!(hops("a"), Some(2));
}

// ========== Critical path ==========

#[test]
fn extending_the_longest_chain_grows_the_critical_path_by_one() {
    let goals = vec![
        active_goal("a"),
        active_goal("b"),
        active_goal("c"),
        active_goal("d"),
    ];
    let chain = vec![blocks("a", "b"), blocks("b", "c")];
    let graph = build(&goals, &chain);
    let before = graph.critical_path().length;

    let mut extended = chain.clone();
    extended.push(blocks("c", "d"));
    let graph = build(&goals, &extended);

    assert_eq!(graph.critical_path().length, before + 1);
}

#[test]
fn shared_subchains_are_memoized_not_recomputed() {
    // A dense layered graph: without memoization the longest-path search
    // is exponential and this test would not finish.
    let mut goals = Vec::new();
    let mut edges = Vec::new();
    for layer in 0..30 {
        for slot in 0..2 {
            goals.push(active_goal(&format!("n-{layer}-{slot}")));
            if layer > 0 {
                for prev in 0..2 {
                    edges.push(blocks(
                        &format!("n-{layer}-{slot}"),
                        &format!("n-{}-{prev}", layer - 1),
                    ));
                }
            }
        }
    }

    let graph = build(&goals, &edges);
    assert_eq!(graph.critical_path().length, 30);
}

// ========== Aggregate validation ==========

#[test]
fn active_blocker_shows_up_in_the_validation_report() {
    let goals = vec![active_goal("g1"), active_goal("g2")];
    let edges = vec![blocks("g1", "g2")];

    let report = validate_dependencies(&goals, &[], &edges);

    assert!(report.is_valid);
    assert!(!report.has_circular_dependency);
    assert!(!report.has_deadlock);
    assert_eq!(report.blocked_items.len(), 1);
    assert_eq!(report.blocked_items[0].id.as_str(), "g1");
    assert_eq!(report.blocked_items[0].blocked_by.len(), 1);
    assert_eq!(report.blocked_items[0].blocked_by[0].id.as_str(), "g2");
}

#[test]
fn cycle_invalidates_the_report_with_diagnostics() {
    let goals = vec![active_goal("a"), active_goal("b")];
    let edges = vec![blocks("a", "b"), blocks("b", "a")];

    let report = validate_dependencies(&goals, &[], &edges);

    assert!(!report.is_valid);
    assert!(report.has_circular_dependency);
    assert!(report.has_deadlock);
    assert!(report.circular_path.is_some());
    assert!(report
        .diagnostics
        .iter()
        .any(|line| line.contains("circular dependency")));
}

#[test]
fn milestones_participate_in_validation() {
    let goals = vec![active_goal("g1")];
    let milestones = vec![milestone("m1", "g1", EntityState::Active)];
    let edges = vec![blocks("g1", "m1")];

    let report = validate_dependencies(&goals, &milestones, &edges);

    assert!(report.is_valid);
    assert_eq!(report.blocked_items.len(), 1);
    assert_eq!(report.blocked_items[0].blocked_by[0].id.as_str(), "m1");
}

#[test]
fn stale_edges_do_not_break_validation() {
    let goals = vec![active_goal("g1")];
    let edges = vec![blocks("g1", "deleted-goal"), blocks("ghost", "g1")];

    let report = validate_dependencies(&goals, &[], &edges);

    assert!(report.is_valid);
    assert!(report.blocked_items.is_empty());
}

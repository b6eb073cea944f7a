//! Dependency graph engine.
//!
//! Builds an immutable per-query graph snapshot from entity and edge
//! collections and answers consistency and propagation queries over it:
//! cycle detection, the add-edge cycle pre-check, mutual deadlock detection,
//! blocked-item listing, cascading-delay propagation, execution ordering,
//! and critical-path computation.
//!
//! # Graph Representation and Edge Direction Convention
//!
//! The graph uses petgraph's `DiGraph` with edges directed from
//! **dependent to dependency**: if goal A is blocked by goal B, the edge is
//! `A -> B` with the [`DependencyType`] as its weight. A `HashMap` maps each
//! [`EntityId`] to its `NodeIndex`.
//!
//! Only `blocks` and `requires` edges participate in blocking, cycle, and
//! deadlock semantics; `soft_dependency` edges are stored for diagnostics
//! and ordering but are ignored by every blocking computation.
//!
//! # Failure Semantics
//!
//! This engine never returns an error for malformed input. Edges referencing
//! unknown entities are dropped at build time, self-edges are kept and
//! reported as one-node cycles, and graphs that already contain cycles are
//! analyzed best-effort rather than rejected. The [`DependencyGraph::would_create_cycle`]
//! pre-check exists so callers can reject a mutation *before* persisting it.

mod types;

pub use types::{
    AffectedItem, BlockedItem, Blocker, CascadingDelay, CriticalPath, CycleReport, DeadlockReport,
    NodeSnapshot, ValidationReport,
};

use crate::domain::{Dependency, DependencyType, EntityId, Goal, Milestone};
use crate::error::{Error, Result};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{EdgeFiltered, EdgeRef};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// Maximum depth for the transitive traversals in deadlock detection and
/// cascading-delay propagation.
///
/// This limit prevents runaway traversal on extremely deep or malformed
/// dependency chains.
const MAX_TRAVERSAL_DEPTH: usize = 50;

/// An immutable dependency graph snapshot.
///
/// Built once per query from fresh entity collections; there is no
/// incremental update API. Callers rebuild from current snapshots instead.
#[derive(Debug)]
pub struct DependencyGraph {
    /// The underlying directed graph. Nodes carry `EntityId` values,
    /// edges carry the `DependencyType`.
    graph: DiGraph<EntityId, DependencyType>,

    /// Mapping from entity ID to graph node index.
    node_map: HashMap<EntityId, NodeIndex>,

    /// Node-level entity snapshots, keyed by ID.
    nodes: HashMap<EntityId, NodeSnapshot>,
}

impl DependencyGraph {
    /// Builds a graph snapshot from entity nodes and dependency edges.
    ///
    /// Runs in O(N+E). Edges referencing an entity that is not in `nodes`
    /// are silently dropped (the source collections may be stale); self-edges
    /// are kept so that [`Self::detect_cycle`] can report them.
    pub fn build<I, N>(nodes: I, edges: &[Dependency]) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeSnapshot>,
    {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        let mut snapshots = HashMap::new();

        for node in nodes {
            let snapshot: NodeSnapshot = node.into();
            if node_map.contains_key(&snapshot.id) {
                continue;
            }
            let idx = graph.add_node(snapshot.id.clone());
            node_map.insert(snapshot.id.clone(), idx);
            snapshots.insert(snapshot.id.clone(), snapshot);
        }

        for edge in edges {
            let (Some(&source), Some(&target)) =
                (node_map.get(&edge.source_id), node_map.get(&edge.target_id))
            else {
                tracing::debug!(
                    source = %edge.source_id,
                    target = %edge.target_id,
                    "dropping dependency edge with unknown endpoint"
                );
                continue;
            };
            graph.add_edge(source, target, edge.dep_type);
        }

        Self {
            graph,
            node_map,
            nodes: snapshots,
        }
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Returns true if the graph contains the entity.
    pub fn contains(&self, id: &EntityId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Detects whether the graph contains a cycle among blocking edges.
    ///
    /// Depth-first traversal from every unvisited node with an explicit
    /// recursion stack. The first cycle found is reported and the search
    /// stops; the returned path runs from the back-edge target through the
    /// closing node inclusive. A self-edge is a one-node cycle.
    pub fn detect_cycle(&self) -> CycleReport {
        let mut visited = HashSet::new();

        for start in self.graph.node_indices() {
            if visited.contains(&start) {
                continue;
            }
            let mut chain = Vec::new();
            let mut on_stack = HashSet::new();
            if let Some(path) = self.cycle_dfs(start, &mut visited, &mut chain, &mut on_stack) {
                return CycleReport {
                    has_cycle: true,
                    cycle_path: Some(path),
                };
            }
        }

        CycleReport {
            has_cycle: false,
            cycle_path: None,
        }
    }

    /// DFS step for cycle detection. `chain` holds the current traversal
    /// chain in order, `on_stack` mirrors it for O(1) membership checks.
    fn cycle_dfs(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        chain: &mut Vec<NodeIndex>,
        on_stack: &mut HashSet<NodeIndex>,
    ) -> Option<Vec<EntityId>> {
        visited.insert(node);
        chain.push(node);
        on_stack.insert(node);

        for edge in self.graph.edges(node) {
            if !edge.weight().is_blocking() {
                continue;
            }
            let target = edge.target();
            if on_stack.contains(&target) {
                // Back edge: the cycle is the chain from the target onward.
                let start = chain.iter().position(|n| *n == target).unwrap_or(0);
                let path = chain[start..]
                    .iter()
                    .map(|idx| self.graph[*idx].clone())
                    .collect();
                return Some(path);
            }
            if !visited.contains(&target) {
                if let Some(path) = self.cycle_dfs(target, visited, chain, on_stack) {
                    return Some(path);
                }
            }
        }

        chain.pop();
        on_stack.remove(&node);
        None
    }

    /// Checks whether adding the edge `source -> target` would create a
    /// cycle, without mutating the graph.
    ///
    /// Returns true iff `target` can already reach `source` through existing
    /// blocking edges. Callers must run this pre-check before persisting a
    /// new edge; the engine itself never inserts edges into its snapshot.
    pub fn would_create_cycle(&self, source: &EntityId, target: &EntityId) -> bool {
        let (Some(&source_idx), Some(&target_idx)) =
            (self.node_map.get(source), self.node_map.get(target))
        else {
            return false;
        };

        let blocking = EdgeFiltered::from_fn(&self.graph, |edge| edge.weight().is_blocking());
        algo::has_path_connecting(&blocking, target_idx, source_idx, None)
    }

    /// Validates a proposed new edge without mutating the graph.
    ///
    /// The typed form of [`Self::would_create_cycle`] for callers about to
    /// persist an edge: rejects self-dependencies, unknown endpoints, and
    /// cycle-closing edges before the mutation happens.
    ///
    /// # Errors
    ///
    /// - [`Error::SelfDependency`] if `source` and `target` are the same
    /// - [`Error::EntityNotFound`] if either endpoint is not in the graph
    /// - [`Error::CircularDependency`] if the edge would close a cycle
    pub fn check_new_edge(&self, source: &EntityId, target: &EntityId) -> Result<()> {
        if source == target {
            return Err(Error::SelfDependency(source.clone()));
        }
        if !self.contains(source) {
            return Err(Error::EntityNotFound(source.clone()));
        }
        if !self.contains(target) {
            return Err(Error::EntityNotFound(target.clone()));
        }
        if self.would_create_cycle(source, target) {
            return Err(Error::CircularDependency {
                from: source.clone(),
                target: target.clone(),
            });
        }
        Ok(())
    }

    /// Detects mutual deadlocks.
    ///
    /// For every non-terminal node A, a deadlock exists when A blocks on a
    /// direct blocker B and B's own blocker chain leads back to A. Both
    /// members of every such pair are reported, deduplicated.
    pub fn detect_deadlocks(&self) -> DeadlockReport {
        let mut deadlocked = Vec::new();
        let mut seen = HashSet::new();

        for idx in self.graph.node_indices() {
            let Some(snapshot) = self.nodes.get(&self.graph[idx]) else {
                continue;
            };
            if snapshot.state.is_terminal() {
                continue;
            }

            for blocker in self.direct_blockers(idx) {
                if self.blocker_chain_reaches(blocker, idx) {
                    for member in [idx, blocker] {
                        let id = self.graph[member].clone();
                        if seen.insert(id.clone()) {
                            deadlocked.push(id);
                        }
                    }
                }
            }
        }

        DeadlockReport {
            has_deadlock: !deadlocked.is_empty(),
            deadlocked,
        }
    }

    /// Direct blockers of a node: targets of its blocking edges whose state
    /// is not completed. Failed or abandoned targets still block; only
    /// completion clears a blocker.
    fn direct_blockers(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges(node)
            .filter(|edge| edge.weight().is_blocking())
            .map(|edge| edge.target())
            .filter(|target| {
                self.nodes
                    .get(&self.graph[*target])
                    .is_some_and(|snapshot| !snapshot.state.is_completed())
            })
            .collect()
    }

    /// Whether the blocker chain starting at `from` reaches `to`.
    fn blocker_chain_reaches(&self, from: NodeIndex, to: NodeIndex) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![(from, 0usize)];

        while let Some((node, depth)) = stack.pop() {
            if node == to {
                return true;
            }
            if depth >= MAX_TRAVERSAL_DEPTH || !visited.insert(node) {
                continue;
            }
            for blocker in self.direct_blockers(node) {
                stack.push((blocker, depth + 1));
            }
        }

        false
    }

    /// Lists every non-terminal item with its currently incomplete direct
    /// blockers.
    ///
    /// One hop only: this is a diagnostic view, distinct from deadlock
    /// detection which follows the blocker chain transitively.
    pub fn blocked_items(&self) -> Vec<BlockedItem> {
        let mut blocked = Vec::new();

        for idx in self.graph.node_indices() {
            let Some(snapshot) = self.nodes.get(&self.graph[idx]) else {
                continue;
            };
            if snapshot.state.is_terminal() {
                continue;
            }

            let blocked_by: Vec<Blocker> = self
                .direct_blockers(idx)
                .into_iter()
                .filter_map(|blocker| self.nodes.get(&self.graph[blocker]))
                .map(|blocker| Blocker {
                    id: blocker.id.clone(),
                    title: blocker.title.clone(),
                    state: blocker.state,
                })
                .collect();

            if !blocked_by.is_empty() {
                blocked.push(BlockedItem {
                    id: snapshot.id.clone(),
                    title: snapshot.title.clone(),
                    blocked_by,
                });
            }
        }

        blocked
    }

    /// Computes how delays cascade from every non-completed node to its
    /// transitive dependents.
    ///
    /// For each non-completed node with at least one direct dependent, a
    /// breadth-first traversal over reverse blocking edges records, per
    /// reachable dependent, the minimum hop count at which it was reached.
    pub fn cascading_delays(&self) -> Vec<CascadingDelay> {
        let mut delays = Vec::new();

        for idx in self.graph.node_indices() {
            let Some(snapshot) = self.nodes.get(&self.graph[idx]) else {
                continue;
            };
            if snapshot.state.is_completed() {
                continue;
            }

            let affected = self.propagate_delay(idx);
            if !affected.is_empty() {
                delays.push(CascadingDelay {
                    source_id: snapshot.id.clone(),
                    affected,
                });
            }
        }

        delays
    }

    /// BFS over incoming blocking edges from a delay source. First visit
    /// wins, so each dependent is recorded at its minimum hop count.
    fn propagate_delay(&self, source: NodeIndex) -> Vec<AffectedItem> {
        let mut affected = Vec::new();
        let mut visited = HashSet::from([source]);
        let mut queue = VecDeque::from([(source, 0usize)]);

        while let Some((node, depth)) = queue.pop_front() {
            if depth >= MAX_TRAVERSAL_DEPTH {
                continue;
            }
            for edge in self.graph.edges_directed(node, Direction::Incoming) {
                if !edge.weight().is_blocking() {
                    continue;
                }
                let dependent = edge.source();
                if visited.insert(dependent) {
                    affected.push(AffectedItem {
                        id: self.graph[dependent].clone(),
                        delay_propagation: depth + 1,
                    });
                    queue.push_back((dependent, depth + 1));
                }
            }
        }

        affected
    }

    /// Returns all entities in execution order: dependencies before
    /// dependents.
    ///
    /// Post-order DFS topological sort. On a graph that contains cycles the
    /// result is a best-effort ordering; the memoized visited set guarantees
    /// termination regardless.
    pub fn execution_order(&self) -> Vec<EntityId> {
        let mut visited = HashSet::new();
        let mut order = Vec::with_capacity(self.graph.node_count());

        for idx in self.graph.node_indices() {
            self.post_order(idx, &mut visited, &mut order);
        }

        order.into_iter().map(|idx| self.graph[idx].clone()).collect()
    }

    fn post_order(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        order: &mut Vec<NodeIndex>,
    ) {
        if !visited.insert(node) {
            return;
        }
        for dep in self.graph.neighbors(node) {
            self.post_order(dep, visited, order);
        }
        order.push(node);
    }

    /// Computes the longest dependency chain in the graph.
    ///
    /// Memoized longest-path DFS: for each node, the longest path is one
    /// more than the longest path among its dependencies, with an isolated
    /// node scoring 1. Memoization is required for runtime correctness -
    /// without it, shared sub-dependencies degenerate to exponential time.
    /// Cycles contribute nothing instead of recursing forever.
    pub fn critical_path(&self) -> CriticalPath {
        let mut memo: HashMap<NodeIndex, (usize, Vec<NodeIndex>)> = HashMap::new();
        let mut best: (usize, Vec<NodeIndex>) = (0, Vec::new());

        for idx in self.graph.node_indices() {
            let mut in_progress = HashSet::new();
            let candidate = self.longest_from(idx, &mut memo, &mut in_progress);
            if candidate.0 > best.0 {
                best = candidate;
            }
        }

        CriticalPath {
            length: best.0,
            path: best
                .1
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect(),
        }
    }

    fn longest_from(
        &self,
        node: NodeIndex,
        memo: &mut HashMap<NodeIndex, (usize, Vec<NodeIndex>)>,
        in_progress: &mut HashSet<NodeIndex>,
    ) -> (usize, Vec<NodeIndex>) {
        if let Some(known) = memo.get(&node) {
            return known.clone();
        }
        if in_progress.contains(&node) {
            // Back edge: a cyclic dependency adds no length.
            return (0, Vec::new());
        }
        in_progress.insert(node);

        let mut best: (usize, Vec<NodeIndex>) = (0, Vec::new());
        for dep in self.graph.neighbors(node) {
            let candidate = self.longest_from(dep, memo, in_progress);
            if candidate.0 > best.0 {
                best = candidate;
            }
        }

        in_progress.remove(&node);

        let mut path = Vec::with_capacity(best.0 + 1);
        path.push(node);
        path.extend(best.1);
        let result = (best.0 + 1, path);
        memo.insert(node, result.clone());
        result
    }

    /// Returns the currently-blocking dependency edges sourced at an entity.
    ///
    /// These are the blocking signals the analytics engine consumes: one
    /// [`Dependency`] per blocking edge whose target has not completed.
    pub fn blocking_signals(&self, id: &EntityId) -> Vec<Dependency> {
        let Some(&idx) = self.node_map.get(id) else {
            return Vec::new();
        };

        self.graph
            .edges(idx)
            .filter(|edge| edge.weight().is_blocking())
            .filter(|edge| {
                self.nodes
                    .get(&self.graph[edge.target()])
                    .is_some_and(|snapshot| !snapshot.state.is_completed())
            })
            .map(|edge| Dependency {
                source_id: id.clone(),
                target_id: self.graph[edge.target()].clone(),
                dep_type: *edge.weight(),
            })
            .collect()
    }
}

/// Validates a full entity collection in one pass.
///
/// Orchestrates cycle detection, deadlock detection, blocked-item listing,
/// and cascading-delay propagation into a single report. The graph is valid
/// iff neither a cycle nor a deadlock was found; blocked items and cascading
/// delays are informational.
pub fn validate_dependencies(
    goals: &[Goal],
    milestones: &[Milestone],
    edges: &[Dependency],
) -> ValidationReport {
    let graph = DependencyGraph::build(
        goals
            .iter()
            .map(NodeSnapshot::from)
            .chain(milestones.iter().map(NodeSnapshot::from)),
        edges,
    );

    let cycle = graph.detect_cycle();
    let deadlocks = graph.detect_deadlocks();
    let blocked_items = graph.blocked_items();
    let cascading_delays = graph.cascading_delays();

    let mut diagnostics = Vec::new();
    if let Some(path) = &cycle.cycle_path {
        let chain = path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        diagnostics.push(format!("circular dependency detected: {chain}"));
    }
    if deadlocks.has_deadlock {
        diagnostics.push(format!(
            "{} items are mutually deadlocked",
            deadlocks.deadlocked.len()
        ));
    }
    if !blocked_items.is_empty() {
        diagnostics.push(format!(
            "{} items are waiting on incomplete dependencies",
            blocked_items.len()
        ));
    }
    if !cascading_delays.is_empty() {
        diagnostics.push(format!(
            "delays from {} items cascade to downstream dependents",
            cascading_delays.len()
        ));
    }

    ValidationReport {
        is_valid: !cycle.has_cycle && !deadlocks.has_deadlock,
        has_circular_dependency: cycle.has_cycle,
        circular_path: cycle.cycle_path,
        has_deadlock: deadlocks.has_deadlock,
        deadlocked_items: deadlocks.deadlocked,
        blocked_items,
        cascading_delays,
        diagnostics,
    }
}

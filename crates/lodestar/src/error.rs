//! Error types for lodestar core operations.
//!
//! The graph and analytics engines are total over the inputs they are
//! specified to accept: malformed-but-tolerable input (dangling edge
//! references, self-loops, empty progress histories) is handled by graceful
//! defaults, never by an error. The variants here cover the remaining
//! caller-facing failure modes.

use crate::domain::EntityId;
use thiserror::Error;

/// The error type for lodestar core operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// An operation referenced an entity that is not part of the snapshot.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Adding the dependency would create a circular dependency.
    ///
    /// Returned by callers that use [`crate::graph::DependencyGraph::would_create_cycle`]
    /// as a pre-check and want a typed rejection to surface.
    #[error("Adding dependency would create a cycle: {from} -> {target}")]
    CircularDependency {
        /// The entity that would depend on `target`.
        from: EntityId,
        /// The entity being depended upon.
        target: EntityId,
    },

    /// A dependency edge referenced the same entity on both ends.
    #[error("Self-dependency not allowed: {0}")]
    SelfDependency(EntityId),
}

/// A specialized Result type for lodestar operations.
pub type Result<T> = std::result::Result<T, Error>;

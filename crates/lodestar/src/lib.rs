//! Lodestar - dependency-graph validation and predictive analytics for
//! goal tracking.
//!
//! This crate is the computational core of a goal/milestone tracking system.
//! It answers three questions the surrounding application cannot:
//!
//! - Is the dependency graph consistent (no cycles, no mutual deadlocks)?
//! - Which entities are transitively blocked, and how deeply do delays
//!   cascade through the graph?
//! - Given current progress history, what is the probability and expected
//!   date of completion for an entity, and how would hypothetical changes
//!   shift that probability?
//!
//! All functions are pure and synchronous: they receive fully-materialized
//! snapshots of entities, dependency edges, and progress updates, and return
//! fresh value objects. The core performs no I/O and holds no global state;
//! persistence and background execution are caller concerns (see the
//! `lodestar-worker` crate for an optional in-process execution host).

#![forbid(unsafe_code)]

pub mod analytics;
pub mod config;
pub mod domain;
pub mod error;
pub mod graph;

pub use config::EngineConfig;
pub use error::{Error, Result};

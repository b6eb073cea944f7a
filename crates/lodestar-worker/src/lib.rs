//! Background execution host for the lodestar analytics core.
//!
//! The core's functions are pure and synchronous; this crate lets a host
//! application run them off its main thread through an in-process
//! request/response message channel. Each request carries a discriminated
//! `type` tag, responses are correlated per request through a reply channel,
//! and a timeout (10 seconds by default) resolves a pending request with
//! `None` when no response arrives in time - cancellation by timeout, since
//! the short-lived synchronous computation itself cannot be interrupted.
//!
//! Requests with different tags may be in flight concurrently. Two requests
//! of the same tag are not deduplicated; avoiding redundant concurrent work
//! is the caller's concern.

#![forbid(unsafe_code)]

mod error;
mod host;
mod messages;

pub use error::{Error, Result};
pub use host::{AnalyticsHost, HostConfig};
pub use messages::{EntityAnalytics, WorkerRequest, WorkerResponse};

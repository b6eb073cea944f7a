//! Error types for the execution host.

use thiserror::Error;

/// The error type for execution host operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The host's worker task has shut down and can no longer accept or
    /// answer requests.
    #[error("analytics host is closed")]
    HostClosed,
}

/// A specialized Result type for execution host operations.
pub type Result<T> = std::result::Result<T, Error>;

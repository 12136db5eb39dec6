//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ShutterHubError`] via `#[from]`. Failures the dispatcher swallows by
//! contract (gateway outages) still travel as typed errors up to the point
//! where they are logged.

/// Workspace-level error enum.
#[derive(Debug, thiserror::Error)]
pub enum ShutterHubError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced object does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The vendor gateway could not be reached or answered with a failure.
    #[error("gateway error")]
    Gateway(#[from] GatewayError),
}

/// Domain invariant violations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A `name` field was empty.
    #[error("name must not be empty")]
    EmptyName,

    /// A `uid` field was empty.
    #[error("uid must not be empty")]
    EmptyUid,

    /// A time-of-day string did not match `HH:MM`.
    #[error("invalid time of day: {0}")]
    InvalidTime(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} with uid \"{id}\" not found")]
pub struct NotFoundError {
    /// Human-readable kind of the missing object (`"Device"`, `"Schedule"`, …).
    pub entity: &'static str,
    /// The identifier that failed to resolve.
    pub id: String,
}

/// Failures talking to the vendor gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never completed (connection refused, timeout, DNS, …).
    #[error("gateway transport error: {0}")]
    Transport(String),

    /// The gateway answered with a non-success HTTP status.
    #[error("gateway returned status {0}")]
    Status(u16),

    /// The gateway answered, but the body could not be decoded.
    #[error("gateway response could not be decoded: {0}")]
    Decode(String),
}

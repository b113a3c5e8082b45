//! Unified error handling for autovoice.
//!
//! Platform-call failures are non-fatal by contract: the lifecycle manager
//! catches them at the call site, logs them, and keeps processing events.
//! The `error_code` labels feed the `autovoice_platform_errors_total`
//! counter.

use thiserror::Error;

/// Errors returned by the external platform collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The platform refused the call for lack of capability/permission.
    #[error("platform denied the request: {0}")]
    Denied(String),

    /// Generic external-call failure (network, unknown entity, rate limit).
    #[error("platform call failed: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the lifecycle core.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The durable guild-config store could not be read or written.
    /// Callers degrade to in-memory/default configuration.
    #[error("config store unavailable: {0}")]
    ConfigUnavailable(#[from] std::io::Error),

    /// An operation that only makes sense inside a guild was requested
    /// without one (e.g. an on-demand channel from a direct message).
    #[error("this operation is only available inside a guild")]
    InvalidContext,
}

impl Error {
    /// Static error code for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Platform(PlatformError::Denied(_)) => "platform_denied",
            Self::Platform(PlatformError::Unavailable(_)) => "platform_unavailable",
            Self::ConfigUnavailable(_) => "config_unavailable",
            Self::InvalidContext => "invalid_context",
        }
    }
}

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

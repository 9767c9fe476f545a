//! Error types for tilegrid-core.
//!
//! Two families of failures exist:
//!
//! - **Precondition failures** ([`Error::NoTileManager`],
//!   [`Error::TilesNotConnected`]) are raised synchronously before any
//!   device command is issued.
//! - **Delegated failures** surface from the injected transports: a provider
//!   that cannot supply a session ([`Error::ModuleUnavailable`]) or a
//!   transport operation that failed ([`Error::Session`]). The controller
//!   logs these through its fan-out, then propagates them unchanged.
//!
//! No operation retries; every failure is terminal for the current call.
//! The one exception to propagation is `Controller::disconnect`, which
//! catches per-subsystem teardown errors so one subsystem cannot block the
//! other's teardown.

use thiserror::Error;

/// Errors that can occur while orchestrating the tile network and sensor.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Pairing was attempted before a tile manager session exists.
    #[error("no tile manager: connect the tile network first")]
    NoTileManager,

    /// Pairing was attempted while the tile manager reports disconnected.
    #[error("tile network is not connected")]
    TilesNotConnected,

    /// The session provider could not supply the requested transport.
    #[error("transport module unavailable: {0}")]
    ModuleUnavailable(String),

    /// A transport operation failed.
    #[error("session error during '{operation}': {message}")]
    Session {
        /// The transport operation that failed.
        operation: String,
        /// Failure detail as reported by the transport.
        message: String,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a session error with operation context.
    pub fn session(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Session {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a module-unavailable error.
    pub fn module_unavailable(message: impl Into<String>) -> Self {
        Self::ModuleUnavailable(message.into())
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type alias using tilegrid-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

//! Provider boundary errors.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`ProviderError::UnknownProtocol`] | `PROVIDER_UNKNOWN_PROTOCOL` | No |
//! | [`ProviderError::Setup`] | `PROVIDER_SETUP_FAILED` | No |
//! | [`ProviderError::Connect`] | `PROVIDER_CONNECT_FAILED` | Yes |
//! | [`ProviderError::Emit`] | `PROVIDER_EMIT_FAILED` | Yes |

use patchbay_types::ErrorCode;
use thiserror::Error;

/// Error produced at the service provider boundary.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// No provider is registered for the requested protocol.
    ///
    /// Not recoverable by retry: the registry is populated at startup.
    #[error("no provider registered for protocol '{0}'")]
    UnknownProtocol(String),

    /// Provider initialization failed.
    #[error("provider setup failed: {0}")]
    Setup(String),

    /// Connecting an output sink or input slot failed.
    ///
    /// Recoverable: the external system may come back.
    #[error("provider connect failed: {0}")]
    Connect(String),

    /// Delivering a payload to the external system failed.
    ///
    /// Recoverable: transient broker/link failures are expected at the
    /// edge.
    #[error("provider emit failed: {0}")]
    Emit(String),
}

impl ErrorCode for ProviderError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownProtocol(_) => "PROVIDER_UNKNOWN_PROTOCOL",
            Self::Setup(_) => "PROVIDER_SETUP_FAILED",
            Self::Connect(_) => "PROVIDER_CONNECT_FAILED",
            Self::Emit(_) => "PROVIDER_EMIT_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::UnknownProtocol(_) | Self::Setup(_) => false,
            Self::Connect(_) | Self::Emit(_) => true,
        }
    }
}

//! Runtime errors.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`RuntimeError::TemplateNotFound`] | `RUNTIME_TEMPLATE_NOT_FOUND` | No |
//! | [`RuntimeError::ComponentNotFound`] | `RUNTIME_COMPONENT_NOT_FOUND` | Yes |
//! | [`RuntimeError::InterfaceNotFound`] | `RUNTIME_INTERFACE_NOT_FOUND` | No |
//! | [`RuntimeError::WireNotFound`] | `RUNTIME_WIRE_NOT_FOUND` | Yes |
//! | [`RuntimeError::FormulaLoad`] | `RUNTIME_FORMULA_LOAD_FAILED` | No |
//! | [`RuntimeError::Provider`] | (inner code) | (inner) |
//!
//! Lookup misses are recoverable in the sense that the entity may be
//! created later and the call retried; structural errors (an unknown
//! template name, a malformed formula) will not fix themselves.

use patchbay_types::{ComponentId, ErrorCode, WireId};
use patchbay_provider::ProviderError;
use thiserror::Error;

/// Error produced by the runtime core.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No component template is loaded under this name.
    #[error("unknown component template '{0}'")]
    TemplateNotFound(String),

    /// No live component has this id.
    #[error("component not found: {0}")]
    ComponentNotFound(ComponentId),

    /// The component exists but has no interface with this name in
    /// the requested direction.
    #[error("component {component} has no {direction} interface '{name}'")]
    InterfaceNotFound {
        /// Component that was searched.
        component: ComponentId,
        /// Interface name that was not found.
        name: String,
        /// `"output"` or `"input"`.
        direction: &'static str,
    },

    /// No wire with this id is registered.
    #[error("wire not found: {0}")]
    WireNotFound(WireId),

    /// A bulk wiring definition failed to apply.
    ///
    /// Fatal by design: a half-applied formula is worse than none, so
    /// the whole load aborts and nothing is connected.
    #[error("formula load failed: {0}")]
    FormulaLoad(String),

    /// A provider call at the graph boundary failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ErrorCode for RuntimeError {
    fn code(&self) -> &'static str {
        match self {
            Self::TemplateNotFound(_) => "RUNTIME_TEMPLATE_NOT_FOUND",
            Self::ComponentNotFound(_) => "RUNTIME_COMPONENT_NOT_FOUND",
            Self::InterfaceNotFound { .. } => "RUNTIME_INTERFACE_NOT_FOUND",
            Self::WireNotFound(_) => "RUNTIME_WIRE_NOT_FOUND",
            Self::FormulaLoad(_) => "RUNTIME_FORMULA_LOAD_FAILED",
            Self::Provider(inner) => inner.code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::ComponentNotFound(_) | Self::WireNotFound(_) => true,
            Self::TemplateNotFound(_)
            | Self::InterfaceNotFound { .. }
            | Self::FormulaLoad(_) => false,
            Self::Provider(inner) => inner.is_recoverable(),
        }
    }
}

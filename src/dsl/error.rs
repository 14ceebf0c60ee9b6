//! DSL Error Types
//!
//! Errors raised while a script runs against the builder. All of them mean the
//! script itself is invalid; the builder is abandoned once one is returned.

use crate::constants::CallbackSlot;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DslError {
    /// Top-level pool settings and a `worker_pools` block in the same script
    #[error("Cannot mix implicit and explicit worker pool configuration within one script.")]
    ConflictingWorkerConfiguration,

    /// A pool setting was called while no pool is open
    #[error(
        "Pool setting '{setting}': settings declared outside of any pool context, configuration \
         is nested incorrectly or mixes implicit and explicit pool declarations."
    )]
    ContextError { setting: String },

    /// The name does not match any operation of the DSL
    #[error("Unknown worker pool operation '{name}'")]
    UnknownOperation { name: String },

    /// The operation exists but cannot accept the supplied argument
    #[error("Invalid argument for '{operation}': {reason}")]
    InvalidArgument { operation: String, reason: String },

    /// A script referred to a hook the host never registered
    #[error("No hook named '{hook}' is registered for {slot}")]
    UnknownHook { slot: CallbackSlot, hook: String },
}

impl DslError {
    pub fn context_error<S: Into<String>>(setting: S) -> Self {
        Self::ContextError {
            setting: setting.into(),
        }
    }

    pub fn unknown_operation<N: Into<String>>(name: N) -> Self {
        Self::UnknownOperation { name: name.into() }
    }

    pub fn invalid_argument<O: Into<String>, R: Into<String>>(operation: O, reason: R) -> Self {
        Self::InvalidArgument {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_hook<H: Into<String>>(slot: CallbackSlot, hook: H) -> Self {
        Self::UnknownHook {
            slot,
            hook: hook.into(),
        }
    }

    /// Implicit and explicit pool declarations were mixed
    pub fn is_conflicting_mode(&self) -> bool {
        matches!(self, Self::ConflictingWorkerConfiguration)
    }

    /// A setting was declared with no pool open
    pub fn is_invalid_nesting(&self) -> bool {
        matches!(self, Self::ContextError { .. })
    }
}

pub type DslResult<T> = std::result::Result<T, DslError>;

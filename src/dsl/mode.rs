use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{DslError, DslResult};

/// How the script declares its worker pools
///
/// A script settles on one mode the first time it declares a pool and keeps it
/// for the rest of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigMode {
    /// Nothing pool related has been declared yet
    #[default]
    Unset,
    /// Pool settings declared at the top level describe a single pool
    ImplicitPool,
    /// Each pool is declared in its own `worker_pool` block inside `worker_pools`
    ExplicitPools,
}

impl ConfigMode {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Resolve the mode after a request to use `target`
    ///
    /// Returns `Ok(true)` when the mode actually changed.
    pub fn transition_to(&mut self, target: ConfigMode) -> DslResult<bool> {
        if *self == target {
            return Ok(false);
        }
        if !self.is_unset() || target.is_unset() {
            return Err(DslError::ConflictingWorkerConfiguration);
        }
        *self = target;
        Ok(true)
    }
}

impl fmt::Display for ConfigMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::ImplicitPool => write!(f, "implicit_pool"),
            Self::ExplicitPools => write!(f, "explicit_pools"),
        }
    }
}

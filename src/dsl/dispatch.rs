//! # Operation Dispatch
//!
//! Maps an operation name, as written in a script, onto the fixed set of
//! builder operations. The table is closed: it is generated from the two
//! constant name lists plus the three structural operations.

use std::fmt;

use super::error::{DslError, DslResult};
use crate::constants::{operations, CallbackSlot, PoolSetting};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Record a value into the current pool
    Setting(PoolSetting),
    /// Store a lifecycle hook
    Callback(CallbackSlot),
    /// Toggle application preloading
    PreloadApp,
    /// Switch to explicit pools and run the block
    WorkerPools,
    /// Open a pool and run the block against it
    WorkerPool,
}

impl Operation {
    /// Resolve a script name to an operation
    pub fn resolve(name: &str) -> DslResult<Self> {
        match name {
            operations::PRELOAD_APP => Ok(Self::PreloadApp),
            operations::WORKER_POOLS => Ok(Self::WorkerPools),
            operations::WORKER_POOL => Ok(Self::WorkerPool),
            other => {
                if let Ok(setting) = other.parse::<PoolSetting>() {
                    Ok(Self::Setting(setting))
                } else if let Ok(slot) = other.parse::<CallbackSlot>() {
                    Ok(Self::Callback(slot))
                } else {
                    Err(DslError::unknown_operation(other))
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Setting(setting) => setting.as_str(),
            Self::Callback(slot) => slot.as_str(),
            Self::PreloadApp => operations::PRELOAD_APP,
            Self::WorkerPools => operations::WORKER_POOLS,
            Self::WorkerPool => operations::WORKER_POOL,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! # DSL Constants
//!
//! The closed set of names a worker pool script may call. Pool settings are
//! recorded into the pool that is currently open; callback slots are recorded
//! into the global options and invoked later by the process manager.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Settings that describe a single worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSetting {
    /// Number of worker processes in the pool
    Workers,
    /// Queue names the pool reads from
    Queues,
    /// Lowest job priority the pool picks up
    MinPriority,
    /// Highest job priority the pool picks up
    MaxPriority,
    /// Seconds to sleep when no job is available
    SleepDelay,
    /// Number of jobs read ahead per poll
    ReadAhead,
}

impl PoolSetting {
    pub const ALL: [PoolSetting; 6] = [
        Self::Workers,
        Self::Queues,
        Self::MinPriority,
        Self::MaxPriority,
        Self::SleepDelay,
        Self::ReadAhead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workers => "workers",
            Self::Queues => "queues",
            Self::MinPriority => "min_priority",
            Self::MaxPriority => "max_priority",
            Self::SleepDelay => "sleep_delay",
            Self::ReadAhead => "read_ahead",
        }
    }
}

impl fmt::Display for PoolSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PoolSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|setting| setting.as_str() == s)
            .ok_or_else(|| format!("Invalid pool setting: {s}"))
    }
}

/// Process-wide lifecycle hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackSlot {
    /// Runs in the master process once the application is preloaded
    AfterPreloadApp,
    /// Runs in each worker process right after fork
    OnWorkerBoot,
    /// Runs in the master process after a worker has booted
    AfterWorkerBoot,
    /// Runs in the master process after a worker has exited
    AfterWorkerShutdown,
}

impl CallbackSlot {
    pub const ALL: [CallbackSlot; 4] = [
        Self::AfterPreloadApp,
        Self::OnWorkerBoot,
        Self::AfterWorkerBoot,
        Self::AfterWorkerShutdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AfterPreloadApp => "after_preload_app",
            Self::OnWorkerBoot => "on_worker_boot",
            Self::AfterWorkerBoot => "after_worker_boot",
            Self::AfterWorkerShutdown => "after_worker_shutdown",
        }
    }
}

impl fmt::Display for CallbackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CallbackSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| format!("Invalid callback slot: {s}"))
    }
}

/// Operation names that are neither pool settings nor callback slots
pub mod operations {
    pub const PRELOAD_APP: &str = "preload_app";
    pub const WORKER_POOLS: &str = "worker_pools";
    pub const WORKER_POOL: &str = "worker_pool";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_setting_names_round_trip() {
        for setting in PoolSetting::ALL {
            assert_eq!(setting.as_str().parse::<PoolSetting>(), Ok(setting));
            assert_eq!(setting.to_string(), setting.as_str());
        }
        assert!("worker".parse::<PoolSetting>().is_err());
    }

    #[test]
    fn test_callback_slot_serde_matches_display() {
        for slot in CallbackSlot::ALL {
            let json = serde_json::to_value(slot).unwrap();
            assert_eq!(json, serde_json::Value::String(slot.to_string()));
        }
        assert!("before_fork".parse::<CallbackSlot>().is_err());
    }
}

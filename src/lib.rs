#![allow(clippy::doc_markdown)] // Allow technical terms like YAML, JSON in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Worker Pool DSL
//!
//! Configuration language for delayed job worker pools.
//!
//! ## Overview
//!
//! A worker pool script declares how many workers to run, which queues and
//! priority range they serve, how long they sleep when idle and how many jobs
//! they read ahead, plus the process-wide lifecycle hooks the process manager
//! calls around preloading, worker boot and worker shutdown.
//!
//! The script is executed against a builder rather than parsed as static
//! data. The builder collects settings into pool records, keeps the two ways of
//! declaring pools apart, and rejects settings that land outside any pool.
//!
//! ## Module Organization
//!
//! - [`dsl`] - The builder, its mode state machine and the final structure
//! - [`script`] - Script execution: closures, YAML/JSON documents, named hooks
//! - [`loader`] - File loading entry points and loader settings
//! - [`constants`] - The closed sets of pool settings and callback slots
//! - [`error`] - Loading errors
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use worker_pool_dsl::loader::load_str;
//! use worker_pool_dsl::script::HookRegistry;
//!
//! # fn main() -> worker_pool_dsl::Result<()> {
//! let mut hooks = HookRegistry::new();
//! hooks.register("reconnect_database", |_| Ok(()));
//!
//! let config = load_str(
//!     r#"
//! preload_app: true
//! on_worker_boot: reconnect_database
//! worker_pools:
//!   - worker_pool:
//!       workers: 2
//!       queues: [mailers]
//!   - worker_pool:
//!       workers: 1
//! "#,
//!     "config/worker_pool.yml",
//!     hooks,
//! )?;
//!
//! assert_eq!(config.preload_app(), Some(true));
//! assert_eq!(config.worker_pools().len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod dsl;
pub mod error;
pub mod loader;
pub mod logging;
pub mod script;

pub use constants::{CallbackSlot, PoolSetting};
pub use dsl::{
    Callback, ConfigMode, DslError, DslResult, PoolSettings, SettingValue, WorkerPoolConfig,
    WorkerPoolDsl,
};
pub use error::{Result, WorkerPoolError};
pub use loader::{load, load_script, load_str, load_with_hooks, LoaderSettings, ScriptLoader};
pub use script::{ConfigScript, DocumentScript, HookRegistry};

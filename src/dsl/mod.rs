//! # Worker Pool DSL
//!
//! The builder a configuration script runs against, and the structure it
//! produces.
//!
//! ## Architecture
//!
//! - **Builder**: [`WorkerPoolDsl`] accumulates options and pool records
//! - **Mode**: [`ConfigMode`] keeps implicit and explicit pool declarations apart
//! - **Dispatch**: [`Operation`] resolves script names onto builder operations
//! - **Structure**: [`WorkerPoolConfig`] is the immutable result

pub mod builder;
pub mod callback;
pub mod dispatch;
pub mod error;
pub mod mode;
pub mod structure;

pub use builder::WorkerPoolDsl;
pub use callback::Callback;
pub use dispatch::Operation;
pub use error::{DslError, DslResult};
pub use mode::ConfigMode;
pub use structure::{GlobalOptions, PoolSettings, WorkerPoolConfig};

/// Value of a pool setting or callback argument, opaque to the DSL
pub type SettingValue = serde_json::Value;

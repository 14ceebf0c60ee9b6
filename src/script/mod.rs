//! # Configuration Scripts
//!
//! A script is anything that can run against a fresh [`WorkerPoolDsl`]. Rust
//! closures are scripts; [`DocumentScript`] adapts a YAML or JSON document
//! into the same sequence of builder calls.

pub mod document;
pub mod hooks;

pub use document::DocumentScript;
pub use hooks::HookRegistry;

use crate::dsl::{DslResult, WorkerPoolDsl};
use crate::error::{Result, WorkerPoolError};

/// Origin reported for scripts that do not come from a file
pub const INLINE_ORIGIN: &str = "<inline>";

/// Something that declares worker pool configuration against the builder
pub trait ConfigScript {
    /// Identifier used when attributing errors
    fn origin(&self) -> &str {
        INLINE_ORIGIN
    }

    fn execute(&self, dsl: &mut WorkerPoolDsl) -> Result<()>;
}

impl<F> ConfigScript for F
where
    F: Fn(&mut WorkerPoolDsl) -> DslResult<()>,
{
    fn execute(&self, dsl: &mut WorkerPoolDsl) -> Result<()> {
        self(dsl).map_err(|source| WorkerPoolError::script(INLINE_ORIGIN, None, source))
    }
}

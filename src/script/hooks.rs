//! # Hook Registry
//!
//! Document scripts cannot carry code, so they name their lifecycle hooks and
//! the host binds those names to closures here before loading.

use std::collections::HashMap;

use crate::constants::CallbackSlot;
use crate::dsl::{Callback, DslError, DslResult, SettingValue};

/// Named callbacks available to document scripts
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<String, Callback>,
    /// Bind unknown names to callbacks that fail when invoked
    placeholders: bool,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that accepts any hook name, for validating scripts without
    /// the application that provides the hooks
    pub fn with_placeholders() -> Self {
        Self {
            hooks: HashMap::new(),
            placeholders: true,
        }
    }

    /// Register a closure under `name`, replacing any earlier one
    pub fn register<N, F>(&mut self, name: N, func: F) -> &mut Self
    where
        N: Into<String>,
        F: Fn(&[SettingValue]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let callback = Callback::new(name.clone(), func);
        self.hooks.insert(name, callback);
        self
    }

    pub fn register_callback<N: Into<String>>(&mut self, name: N, callback: Callback) -> &mut Self {
        self.hooks.insert(name.into(), callback);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Look up the callback a script named for `slot`
    pub fn resolve(&self, slot: CallbackSlot, name: &str) -> DslResult<Callback> {
        if let Some(callback) = self.hooks.get(name) {
            return Ok(callback.clone());
        }
        if !self.placeholders {
            return Err(DslError::unknown_hook(slot, name));
        }

        let hook = name.to_string();
        Ok(Callback::new(name, move |_| {
            anyhow::bail!("hook '{hook}' for {slot} has no implementation bound")
        }))
    }
}

//! # Worker Pool Structure
//!
//! The data a script leaves behind: global options plus the ordered list of
//! pool records. Pool records are plain setting maps; values are passed
//! through exactly as the script supplied them.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::callback::Callback;
use super::SettingValue;
use crate::constants::{operations, CallbackSlot, PoolSetting};

/// Settings recorded for one worker pool
///
/// Settings keep the order the script first declared them in; declaring one
/// again replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolSettings {
    values: Vec<(PoolSetting, SettingValue)>,
}

impl PoolSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, setting: PoolSetting) -> Option<&SettingValue> {
        self.values
            .iter()
            .find(|(declared, _)| *declared == setting)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, setting: PoolSetting) -> bool {
        self.get(setting).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolSetting, &SettingValue)> {
        self.values.iter().map(|(setting, value)| (*setting, value))
    }

    pub(crate) fn insert(&mut self, setting: PoolSetting, value: SettingValue) {
        match self.values.iter_mut().find(|(declared, _)| *declared == setting) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((setting, value)),
        }
    }

    /// Render as a plain JSON mapping keyed by setting name
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(setting, value)| (setting.to_string(), value.clone()))
            .collect();
        Value::Object(map)
    }
}

/// Process-wide options outside any pool
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub(crate) preload_app: Option<bool>,
    pub(crate) callbacks: BTreeMap<CallbackSlot, Callback>,
}

impl GlobalOptions {
    pub fn preload_app(&self) -> Option<bool> {
        self.preload_app
    }

    pub fn callback(&self, slot: CallbackSlot) -> Option<&Callback> {
        self.callbacks.get(&slot)
    }

    pub fn callbacks(&self) -> impl Iterator<Item = (CallbackSlot, &Callback)> {
        self.callbacks.iter().map(|(slot, callback)| (*slot, callback))
    }
}

/// Final configuration handed to the process manager
#[derive(Debug, Clone, Default)]
pub struct WorkerPoolConfig {
    options: GlobalOptions,
    worker_pools: Vec<PoolSettings>,
}

impl WorkerPoolConfig {
    pub(crate) fn new(options: GlobalOptions, worker_pools: Vec<PoolSettings>) -> Self {
        Self {
            options,
            worker_pools,
        }
    }

    pub fn options(&self) -> &GlobalOptions {
        &self.options
    }

    pub fn preload_app(&self) -> Option<bool> {
        self.options.preload_app
    }

    pub fn callback(&self, slot: CallbackSlot) -> Option<&Callback> {
        self.options.callback(slot)
    }

    /// Pools in declaration order
    pub fn worker_pools(&self) -> &[PoolSettings] {
        &self.worker_pools
    }

    /// Render the structure as JSON
    ///
    /// Absent options are omitted and callbacks render as their labels, so an
    /// untouched builder renders as `{"worker_pools": []}`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(preload_app) = self.options.preload_app {
            map.insert(operations::PRELOAD_APP.to_string(), json!(preload_app));
        }
        for (slot, callback) in self.options.callbacks() {
            map.insert(slot.to_string(), json!(callback.label()));
        }
        map.insert(
            operations::WORKER_POOLS.to_string(),
            Value::Array(self.worker_pools.iter().map(PoolSettings::to_json).collect()),
        );
        Value::Object(map)
    }
}

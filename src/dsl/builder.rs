//! # Worker Pool DSL Builder
//!
//! The receiver a configuration script runs against. Every call the script
//! makes lands here and is accumulated into global options and pool records.
//!
//! A script either declares one pool implicitly, with pool settings at the top
//! level, or declares any number of pools explicitly:
//!
//! ```rust
//! use worker_pool_dsl::dsl::{DslResult, WorkerPoolDsl};
//!
//! # fn main() -> DslResult<()> {
//! let mut dsl = WorkerPoolDsl::new();
//! dsl.preload_app();
//! dsl.worker_pools(|dsl| {
//!     dsl.worker_pool(|dsl| {
//!         dsl.workers(2)?;
//!         dsl.queues(vec!["mailers"])
//!     })?;
//!     dsl.worker_pool(|dsl| dsl.workers(1))
//! })?;
//!
//! let config = dsl.to_structure();
//! assert_eq!(config.worker_pools().len(), 2);
//! # Ok(())
//! # }
//! ```

use tracing::debug;

use super::callback::Callback;
use super::error::{DslError, DslResult};
use super::mode::ConfigMode;
use super::structure::{GlobalOptions, PoolSettings, WorkerPoolConfig};
use super::SettingValue;
use crate::constants::{CallbackSlot, PoolSetting};

/// Stateful builder collecting worker pool configuration
///
/// One instance serves exactly one script run and is discarded afterwards,
/// including after a failed run.
#[derive(Debug, Default)]
pub struct WorkerPoolDsl {
    options: GlobalOptions,
    worker_pools: Vec<PoolSettings>,
    mode: ConfigMode,
    /// Index into `worker_pools` of the pool accepting settings
    current_pool: Option<usize>,
}

impl WorkerPoolDsl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ConfigMode {
        self.mode
    }

    /// Index of the pool currently accepting settings, if any
    pub fn current_pool(&self) -> Option<usize> {
        self.current_pool
    }

    /// Record a pool setting into the current pool
    ///
    /// The first setting of a script with no pool declarations settles the
    /// script into implicit mode and opens its single pool. A null value is
    /// accepted and ignored.
    pub fn set_pool_setting<V>(&mut self, setting: PoolSetting, value: V) -> DslResult<()>
    where
        V: Into<SettingValue>,
    {
        self.default_to_mode(ConfigMode::ImplicitPool)?;

        let value = value.into();
        if value.is_null() {
            return Ok(());
        }
        self.set_pool_option(setting, value)
    }

    /// Record a pool setting addressed by name
    pub fn set_pool_setting_named<V>(&mut self, name: &str, value: V) -> DslResult<()>
    where
        V: Into<SettingValue>,
    {
        let setting = name
            .parse::<PoolSetting>()
            .map_err(|_| DslError::unknown_operation(name))?;
        self.set_pool_setting(setting, value)
    }

    pub fn workers<V: Into<SettingValue>>(&mut self, value: V) -> DslResult<()> {
        self.set_pool_setting(PoolSetting::Workers, value)
    }

    pub fn queues<V: Into<SettingValue>>(&mut self, value: V) -> DslResult<()> {
        self.set_pool_setting(PoolSetting::Queues, value)
    }

    pub fn min_priority<V: Into<SettingValue>>(&mut self, value: V) -> DslResult<()> {
        self.set_pool_setting(PoolSetting::MinPriority, value)
    }

    pub fn max_priority<V: Into<SettingValue>>(&mut self, value: V) -> DslResult<()> {
        self.set_pool_setting(PoolSetting::MaxPriority, value)
    }

    pub fn sleep_delay<V: Into<SettingValue>>(&mut self, value: V) -> DslResult<()> {
        self.set_pool_setting(PoolSetting::SleepDelay, value)
    }

    pub fn read_ahead<V: Into<SettingValue>>(&mut self, value: V) -> DslResult<()> {
        self.set_pool_setting(PoolSetting::ReadAhead, value)
    }

    /// Declare explicit pools and run `body`, which declares them
    pub fn worker_pools<F>(&mut self, body: F) -> DslResult<()>
    where
        F: FnOnce(&mut Self) -> DslResult<()>,
    {
        self.use_mode(ConfigMode::ExplicitPools)?;
        body(self)
    }

    /// Open a new pool and run `body` with it as the current pool
    ///
    /// Does not touch the mode. The current pool is cleared when `body`
    /// returns, whether or not it succeeded.
    pub fn worker_pool<F>(&mut self, body: F) -> DslResult<()>
    where
        F: FnOnce(&mut Self) -> DslResult<()>,
    {
        self.current_pool = Some(self.add_worker_pool());
        let result = body(self);
        self.current_pool = None;
        result
    }

    /// Preload the application before forking workers
    pub fn preload_app(&mut self) {
        self.set_preload_app(true);
    }

    pub fn set_preload_app(&mut self, preload_app: bool) {
        self.options.preload_app = Some(preload_app);
    }

    /// Store a hook; a later registration for the same slot replaces it
    pub fn register_callback(&mut self, slot: CallbackSlot, callback: Callback) {
        debug!(slot = %slot, label = callback.label(), "Registering worker pool callback");
        self.options.callbacks.insert(slot, callback);
    }

    /// Store a hook addressed by slot name
    pub fn register_callback_named(&mut self, name: &str, callback: Callback) -> DslResult<()> {
        let slot = name
            .parse::<CallbackSlot>()
            .map_err(|_| DslError::unknown_operation(name))?;
        self.register_callback(slot, callback);
        Ok(())
    }

    pub fn clear_callback(&mut self, slot: CallbackSlot) {
        self.options.callbacks.remove(&slot);
    }

    pub fn after_preload_app<F>(&mut self, func: F)
    where
        F: Fn(&[SettingValue]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_closure(CallbackSlot::AfterPreloadApp, func);
    }

    pub fn on_worker_boot<F>(&mut self, func: F)
    where
        F: Fn(&[SettingValue]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_closure(CallbackSlot::OnWorkerBoot, func);
    }

    pub fn after_worker_boot<F>(&mut self, func: F)
    where
        F: Fn(&[SettingValue]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_closure(CallbackSlot::AfterWorkerBoot, func);
    }

    pub fn after_worker_shutdown<F>(&mut self, func: F)
    where
        F: Fn(&[SettingValue]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_closure(CallbackSlot::AfterWorkerShutdown, func);
    }

    /// Snapshot of everything declared so far
    pub fn to_structure(&self) -> WorkerPoolConfig {
        WorkerPoolConfig::new(self.options.clone(), self.worker_pools.clone())
    }

    fn register_closure<F>(&mut self, slot: CallbackSlot, func: F)
    where
        F: Fn(&[SettingValue]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_callback(slot, Callback::new(slot.as_str(), func));
    }

    fn set_pool_option(&mut self, setting: PoolSetting, value: SettingValue) -> DslResult<()> {
        let pool = self
            .current_pool
            .and_then(|index| self.worker_pools.get_mut(index))
            .ok_or_else(|| DslError::context_error(setting.as_str()))?;
        pool.insert(setting, value);
        Ok(())
    }

    fn default_to_mode(&mut self, mode: ConfigMode) -> DslResult<()> {
        if self.mode.is_unset() {
            self.use_mode(mode)?;
        }
        Ok(())
    }

    fn use_mode(&mut self, mode: ConfigMode) -> DslResult<()> {
        if !self.mode.transition_to(mode)? {
            return Ok(());
        }
        debug!(mode = %mode, "Worker pool configuration mode selected");

        if mode == ConfigMode::ImplicitPool {
            self.current_pool = Some(self.add_worker_pool());
        }
        Ok(())
    }

    fn add_worker_pool(&mut self) -> usize {
        self.worker_pools.push(PoolSettings::new());
        let index = self.worker_pools.len() - 1;
        debug!(pool_index = index, "Opened worker pool");
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_builder_is_empty() {
        let dsl = WorkerPoolDsl::new();
        assert_eq!(dsl.mode(), ConfigMode::Unset);
        assert_eq!(dsl.current_pool(), None);
        assert_eq!(dsl.to_structure().to_json(), json!({ "worker_pools": [] }));
    }

    #[test]
    fn test_top_level_settings_build_one_implicit_pool() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.workers(2).unwrap();
        dsl.queues(vec!["mail", "default"]).unwrap();
        dsl.sleep_delay(5).unwrap();
        dsl.workers(3).unwrap();

        assert_eq!(dsl.mode(), ConfigMode::ImplicitPool);
        assert_eq!(
            dsl.to_structure().to_json(),
            json!({
                "worker_pools": [{ "workers": 3, "queues": ["mail", "default"], "sleep_delay": 5 }]
            })
        );
    }

    #[test]
    fn test_null_setting_still_selects_implicit_mode() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.read_ahead(serde_json::Value::Null).unwrap();
        dsl.min_priority(None::<i64>).unwrap();

        assert_eq!(dsl.mode(), ConfigMode::ImplicitPool);
        let config = dsl.to_structure();
        assert_eq!(config.worker_pools().len(), 1);
        assert!(config.worker_pools()[0].is_empty());
    }

    #[test]
    fn test_explicit_pools_keep_declaration_order() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.worker_pools(|dsl| {
            dsl.worker_pool(|dsl| dsl.workers(3))?;
            dsl.worker_pool(|dsl| dsl.workers(5))
        })
        .unwrap();

        assert_eq!(dsl.mode(), ConfigMode::ExplicitPools);
        assert_eq!(dsl.current_pool(), None);
        assert_eq!(
            dsl.to_structure().to_json()["worker_pools"],
            json!([{ "workers": 3 }, { "workers": 5 }])
        );
    }

    #[test]
    fn test_implicit_then_explicit_conflicts() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.workers(1).unwrap();
        let err = dsl
            .worker_pools(|dsl| dsl.worker_pool(|dsl| dsl.workers(2)))
            .unwrap_err();
        assert!(err.is_conflicting_mode());
    }

    #[test]
    fn test_setting_directly_inside_worker_pools_is_misnested() {
        let mut dsl = WorkerPoolDsl::new();
        let err = dsl.worker_pools(|dsl| dsl.workers(3)).unwrap_err();
        assert!(err.is_invalid_nesting());
        assert_eq!(err, DslError::context_error("workers"));
        assert_eq!(
            err.to_string(),
            "Pool setting 'workers': settings declared outside of any pool context, configuration \
             is nested incorrectly or mixes implicit and explicit pool declarations."
        );
    }

    #[test]
    fn test_setting_after_explicit_block_is_misnested() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.worker_pools(|dsl| dsl.worker_pool(|dsl| dsl.workers(1)))
            .unwrap();
        assert!(dsl.queues(vec!["late"]).unwrap_err().is_invalid_nesting());
    }

    #[test]
    fn test_null_setting_outside_pool_in_explicit_mode_is_ignored() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.worker_pools(|dsl| dsl.workers(None::<u32>)).unwrap();
        assert!(dsl.to_structure().worker_pools().is_empty());
    }

    #[test]
    fn test_worker_pool_without_worker_pools_leaves_mode_alone() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.worker_pool(|dsl| dsl.workers(2)).unwrap();

        // the setting settles implicit mode, which opens its own pool and takes over
        assert_eq!(dsl.mode(), ConfigMode::ImplicitPool);
        assert_eq!(
            dsl.to_structure().to_json()["worker_pools"],
            json!([{}, { "workers": 2 }])
        );
        assert!(dsl.workers(4).unwrap_err().is_invalid_nesting());
    }

    #[test]
    fn test_empty_worker_pool_with_unset_mode() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.worker_pool(|_| Ok(())).unwrap();
        assert_eq!(dsl.mode(), ConfigMode::Unset);
        assert_eq!(dsl.to_structure().to_json(), json!({ "worker_pools": [{}] }));
    }

    #[test]
    fn test_failing_pool_body_clears_current_pool() {
        let mut dsl = WorkerPoolDsl::new();
        let err = dsl
            .worker_pools(|dsl| {
                dsl.worker_pool(|_| Err(DslError::invalid_argument("workers", "boom")))
            })
            .unwrap_err();
        assert_eq!(err, DslError::invalid_argument("workers", "boom"));
        assert_eq!(dsl.current_pool(), None);
    }

    #[test]
    fn test_nested_worker_pool_closes_outer_pool() {
        let mut dsl = WorkerPoolDsl::new();
        let err = dsl
            .worker_pools(|dsl| {
                dsl.worker_pool(|dsl| {
                    dsl.workers(1)?;
                    dsl.worker_pool(|dsl| dsl.workers(2))?;
                    dsl.workers(3)
                })
            })
            .unwrap_err();
        assert!(err.is_invalid_nesting());
    }

    #[test]
    fn test_preload_app_defaults_to_true() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.preload_app();
        assert_eq!(dsl.to_structure().preload_app(), Some(true));

        dsl.set_preload_app(false);
        assert_eq!(dsl.to_structure().preload_app(), Some(false));
        assert_eq!(dsl.mode(), ConfigMode::Unset);
    }

    #[test]
    fn test_last_callback_registration_wins() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.on_worker_boot(|_| Ok(()));
        let second = Callback::new("second", |_| anyhow::bail!("second boot hook"));
        dsl.register_callback(CallbackSlot::OnWorkerBoot, second.clone());

        let config = dsl.to_structure();
        let stored = config.callback(CallbackSlot::OnWorkerBoot).unwrap();
        assert!(stored.ptr_eq(&second));
        assert!(stored.call(&[]).is_err());
        assert_eq!(config.options().callbacks().count(), 1);
    }

    #[test]
    fn test_each_callback_registrar_fills_its_own_slot() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.after_preload_app(|_| anyhow::bail!("after_preload_app"));
        dsl.on_worker_boot(|_| anyhow::bail!("on_worker_boot"));
        dsl.after_worker_boot(|_| anyhow::bail!("after_worker_boot"));
        dsl.after_worker_shutdown(|_| anyhow::bail!("after_worker_shutdown"));

        let config = dsl.to_structure();
        assert_eq!(config.options().callbacks().count(), CallbackSlot::ALL.len());
        for slot in CallbackSlot::ALL {
            let callback = config.callback(slot).unwrap();
            assert_eq!(callback.label(), slot.as_str());
            // each closure reports the registrar it was passed to
            assert_eq!(callback.call(&[]).unwrap_err().to_string(), slot.as_str());
        }

        assert_eq!(
            config.to_json(),
            json!({
                "after_preload_app": "after_preload_app",
                "on_worker_boot": "on_worker_boot",
                "after_worker_boot": "after_worker_boot",
                "after_worker_shutdown": "after_worker_shutdown",
                "worker_pools": []
            })
        );
    }

    #[test]
    fn test_named_entry_points_reject_unknown_names() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.set_pool_setting_named("max_priority", 10).unwrap();
        assert_eq!(
            dsl.set_pool_setting_named("priority", 1),
            Err(DslError::unknown_operation("priority"))
        );
        assert!(dsl
            .register_callback_named("before_fork", Callback::new("x", |_| Ok(())))
            .is_err());
        assert!(dsl
            .register_callback_named("after_worker_boot", Callback::new("x", |_| Ok(())))
            .is_ok());
    }

    #[test]
    fn test_to_structure_is_repeatable() {
        let mut dsl = WorkerPoolDsl::new();
        dsl.workers(2).unwrap();
        let first = dsl.to_structure().to_json();
        let second = dsl.to_structure().to_json();
        assert_eq!(first, second);
        dsl.workers(4).unwrap();
        assert_eq!(dsl.to_structure().to_json()["worker_pools"][0]["workers"], 4);
    }
}

//! # Document Scripts
//!
//! A structured-data rendition of the worker pool script. Each mapping key is
//! an operation name and is executed against the builder in document order;
//! the value is the operation's argument or, for `worker_pools` and
//! `worker_pool`, its block.
//!
//! A block is either a mapping or a sequence of mappings. The sequence form is
//! what lets a block repeat an operation, which is how several pools are
//! declared:
//!
//! ```yaml
//! preload_app: true
//! on_worker_boot: reconnect_database
//! worker_pools:
//!   - worker_pool:
//!       workers: 2
//!       queues: [mailers]
//!   - worker_pool:
//!       workers: 1
//!       min_priority: 10
//! ```
//!
//! Callback slots take the name of a hook bound in the [`HookRegistry`].

use serde_yaml::Value as YamlValue;
use tracing::debug;

use super::hooks::HookRegistry;
use super::ConfigScript;
use crate::dsl::{DslError, DslResult, Operation, SettingValue, WorkerPoolDsl};
use crate::error::{Result, ScriptLocation, WorkerPoolError};

/// A parsed YAML or JSON worker pool script
#[derive(Debug, Clone)]
pub struct DocumentScript {
    origin: String,
    root: YamlValue,
    hooks: HookRegistry,
}

impl DocumentScript {
    /// Parse `source`; `origin` names the script in error messages
    pub fn parse<O: Into<String>>(source: &str, origin: O) -> Result<Self> {
        let origin = origin.into();
        if source.trim().is_empty() {
            return Ok(Self {
                origin,
                root: YamlValue::Null,
                hooks: HookRegistry::default(),
            });
        }

        let root = serde_yaml::from_str::<YamlValue>(source).map_err(|e| {
            let location = e.location().map(|location| ScriptLocation {
                line: location.line(),
                column: location.column(),
            });
            WorkerPoolError::invalid_script(origin.clone(), location, e)
        })?;

        Ok(Self {
            origin,
            root,
            hooks: HookRegistry::default(),
        })
    }

    /// Bind the hooks the document refers to by name
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    fn run_body(
        &self,
        dsl: &mut WorkerPoolDsl,
        body: &YamlValue,
        path: &str,
        failed_at: &mut Option<String>,
    ) -> DslResult<()> {
        match body {
            YamlValue::Null => Ok(()),
            YamlValue::Mapping(statements) => {
                for (key, value) in statements {
                    self.run_statement(dsl, key, value, path, failed_at)?;
                }
                Ok(())
            }
            YamlValue::Sequence(entries) => {
                for (index, entry) in entries.iter().enumerate() {
                    let entry_path = format!("{path}[{index}]");
                    match entry {
                        YamlValue::Mapping(_) => {
                            self.run_body(dsl, entry, &entry_path, failed_at)?
                        }
                        _ => {
                            *failed_at = Some(entry_path);
                            return Err(DslError::invalid_argument(
                                block_name(path),
                                "block entries must be mappings of operations",
                            ));
                        }
                    }
                }
                Ok(())
            }
            _ => {
                *failed_at = Some(path.to_string());
                Err(DslError::invalid_argument(
                    block_name(path),
                    "a block must be a mapping or a sequence of mappings",
                ))
            }
        }
    }

    fn run_statement(
        &self,
        dsl: &mut WorkerPoolDsl,
        key: &YamlValue,
        value: &YamlValue,
        path: &str,
        failed_at: &mut Option<String>,
    ) -> DslResult<()> {
        let Some(name) = key.as_str() else {
            *failed_at = Some(path.to_string());
            return Err(DslError::invalid_argument(
                block_name(path),
                format!("operation names must be strings, got {key:?}"),
            ));
        };

        let statement_path = if path.is_empty() {
            name.to_string()
        } else {
            format!("{path}.{name}")
        };

        let result = self.dispatch(dsl, name, value, &statement_path, failed_at);
        if result.is_err() && failed_at.is_none() {
            *failed_at = Some(statement_path);
        }
        result
    }

    fn dispatch(
        &self,
        dsl: &mut WorkerPoolDsl,
        name: &str,
        value: &YamlValue,
        path: &str,
        failed_at: &mut Option<String>,
    ) -> DslResult<()> {
        match Operation::resolve(name)? {
            Operation::Setting(setting) => {
                dsl.set_pool_setting(setting, setting_value(name, value)?)
            }
            Operation::Callback(slot) => match value {
                YamlValue::Null => {
                    dsl.clear_callback(slot);
                    Ok(())
                }
                YamlValue::String(hook) => {
                    let callback = self.hooks.resolve(slot, hook)?;
                    dsl.register_callback(slot, callback);
                    Ok(())
                }
                _ => Err(DslError::invalid_argument(
                    name,
                    "expected the name of a registered hook",
                )),
            },
            Operation::PreloadApp => match value {
                YamlValue::Null => {
                    dsl.preload_app();
                    Ok(())
                }
                YamlValue::Bool(preload_app) => {
                    dsl.set_preload_app(*preload_app);
                    Ok(())
                }
                _ => Err(DslError::invalid_argument(name, "expected true or false")),
            },
            Operation::WorkerPools => {
                dsl.worker_pools(|dsl| self.run_body(dsl, value, path, failed_at))
            }
            Operation::WorkerPool => {
                dsl.worker_pool(|dsl| self.run_body(dsl, value, path, failed_at))
            }
        }
    }
}

impl ConfigScript for DocumentScript {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn execute(&self, dsl: &mut WorkerPoolDsl) -> Result<()> {
        debug!(origin = %self.origin, "Executing worker pool document");

        let mut failed_at = None;
        self.run_body(dsl, &self.root, "", &mut failed_at)
            .map_err(|source| WorkerPoolError::script(self.origin.clone(), failed_at, source))
    }
}

/// Name of the block a path points into, for error messages
fn block_name(path: &str) -> String {
    if path.is_empty() {
        "<document>".to_string()
    } else {
        path.to_string()
    }
}

/// Convert a document value into a setting value
///
/// JSON has no NaN or infinity and would turn them into null, which the
/// builder treats as "not set".
fn setting_value(name: &str, value: &YamlValue) -> DslResult<SettingValue> {
    if has_non_finite_number(value) {
        return Err(DslError::invalid_argument(
            name,
            "non-finite numbers are not supported",
        ));
    }
    serde_json::to_value(value).map_err(|e| DslError::invalid_argument(name, e.to_string()))
}

fn has_non_finite_number(value: &YamlValue) -> bool {
    match value {
        YamlValue::Number(number) => !number.is_finite(),
        YamlValue::Sequence(items) => items.iter().any(has_non_finite_number),
        YamlValue::Mapping(entries) => entries
            .iter()
            .any(|(key, value)| has_non_finite_number(key) || has_non_finite_number(value)),
        YamlValue::Tagged(tagged) => has_non_finite_number(&tagged.value),
        _ => false,
    }
}

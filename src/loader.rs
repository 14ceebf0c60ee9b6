//! # Script Loader
//!
//! Static entry points that read a worker pool script, run it against a fresh
//! builder and hand back the resulting structure. Loader settings come from
//! defaults overridden by `WORKER_POOL_*` environment variables.
//!
//! ```rust,no_run
//! use worker_pool_dsl::loader::ScriptLoader;
//! use worker_pool_dsl::script::HookRegistry;
//!
//! # fn main() -> worker_pool_dsl::Result<()> {
//! let mut hooks = HookRegistry::new();
//! hooks.register("reconnect_database", |_| Ok(()));
//!
//! let config = ScriptLoader::from_env()?.with_hooks(hooks).load_default()?;
//! println!("{} worker pool(s)", config.worker_pools().len());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::dsl::{WorkerPoolConfig, WorkerPoolDsl};
use crate::error::{Result, WorkerPoolError};
use crate::script::{ConfigScript, DocumentScript, HookRegistry};

/// Script path used when none is configured
pub const DEFAULT_SCRIPT_PATH: &str = "config/worker_pool.yml";

/// Largest script the loader will read
pub const DEFAULT_MAX_SCRIPT_BYTES: u64 = 1024 * 1024;

/// Get current environment from environment variables
pub fn detect_environment() -> String {
    env::var("WORKER_POOL_ENV")
        .or_else(|_| env::var("RAILS_ENV"))
        .or_else(|_| env::var("RACK_ENV"))
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Settings that control where and how scripts are loaded
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoaderSettings {
    pub environment: String,
    pub config_path: PathBuf,
    pub max_script_bytes: u64,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            environment: detect_environment(),
            config_path: PathBuf::from(DEFAULT_SCRIPT_PATH),
            max_script_bytes: DEFAULT_MAX_SCRIPT_BYTES,
        }
    }
}

impl LoaderSettings {
    /// Resolve settings from defaults and `WORKER_POOL_*` variables
    ///
    /// `WORKER_POOL_CONFIG_PATH` and `WORKER_POOL_MAX_SCRIPT_BYTES` override
    /// the defaults; the environment name is detected separately.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let settings = config::Config::builder()
            .set_default("environment", defaults.environment)?
            .set_default(
                "config_path",
                defaults.config_path.to_string_lossy().into_owned(),
            )?
            .set_default("max_script_bytes", defaults.max_script_bytes)?
            .add_source(config::Environment::with_prefix("WORKER_POOL").try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Loads worker pool scripts with a fixed set of settings and hooks
#[derive(Debug, Clone, Default)]
pub struct ScriptLoader {
    settings: LoaderSettings,
    hooks: HookRegistry,
}

impl ScriptLoader {
    pub fn new(settings: LoaderSettings) -> Self {
        Self {
            settings,
            hooks: HookRegistry::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(LoaderSettings::from_env()?))
    }

    /// Hooks document scripts may refer to by name
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    /// Load the script at the configured path
    pub fn load_default(&self) -> Result<WorkerPoolConfig> {
        self.load(&self.settings.config_path)
    }

    /// Read and run the script at `path`
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<WorkerPoolConfig> {
        let path = path.as_ref();
        let source = self.read_script_safely(path)?;
        self.load_str(&source, path.display().to_string())
    }

    /// Run script source; `origin` names it in error messages
    pub fn load_str<O: Into<String>>(&self, source: &str, origin: O) -> Result<WorkerPoolConfig> {
        let script = DocumentScript::parse(source, origin)?.with_hooks(self.hooks.clone());
        load_script(&script)
    }

    /// Safely read a script file with a size limit
    fn read_script_safely(&self, path: &Path) -> Result<String> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| WorkerPoolError::file_read(path.display().to_string(), e))?;

        if !metadata.is_file() {
            return Err(WorkerPoolError::file_read(
                path.display().to_string(),
                "not a regular file",
            ));
        }

        if metadata.len() > self.settings.max_script_bytes {
            return Err(WorkerPoolError::ScriptTooLarge {
                path: path.display().to_string(),
                size: metadata.len(),
                limit: self.settings.max_script_bytes,
            });
        }

        std::fs::read_to_string(path)
            .map_err(|e| WorkerPoolError::file_read(path.display().to_string(), e))
    }
}

/// Run any script against a fresh builder and return what it declared
pub fn load_script<S: ConfigScript + ?Sized>(script: &S) -> Result<WorkerPoolConfig> {
    crate::log_dsl!(debug, "Loading worker pool script", origin: script.origin());

    let mut dsl = WorkerPoolDsl::new();
    if let Err(error) = script.execute(&mut dsl) {
        crate::log_dsl!(warn, "Worker pool script rejected",
            origin: script.origin(),
            error: error.to_string()
        );
        return Err(error);
    }

    let config = dsl.to_structure();
    debug!(mode = %dsl.mode(), "Worker pool script finished");
    crate::log_dsl!(info, "Worker pool configuration loaded",
        origin: script.origin(),
        worker_pools: config.worker_pools().len(),
        preload_app: config.preload_app()
    );
    Ok(config)
}

/// Load the script at `path` with no hooks bound
pub fn load<P: AsRef<Path>>(path: P) -> Result<WorkerPoolConfig> {
    ScriptLoader::default().load(path)
}

/// Load the script at `path`, resolving hook names through `hooks`
pub fn load_with_hooks<P: AsRef<Path>>(path: P, hooks: HookRegistry) -> Result<WorkerPoolConfig> {
    ScriptLoader::default().with_hooks(hooks).load(path)
}

/// Run script source directly
pub fn load_str<O: Into<String>>(
    source: &str,
    origin: O,
    hooks: HookRegistry,
) -> Result<WorkerPoolConfig> {
    ScriptLoader::default().with_hooks(hooks).load_str(source, origin)
}

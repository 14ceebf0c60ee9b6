//! Loading Error Types
//!
//! Errors surfaced to the caller of the loading entry points. Script errors
//! keep the origin of the script and, for document scripts, the statement that
//! failed so the author can find the mistake.

use std::fmt;
use thiserror::Error;

use crate::dsl::DslError;

/// Position inside a script source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ScriptLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Error)]
pub enum WorkerPoolError {
    /// The script file could not be read
    #[error("Failed to read worker pool script '{path}': {error}")]
    FileRead { path: String, error: String },

    /// The script file exceeds the configured size limit
    #[error("Worker pool script '{path}' is too large ({size} bytes > {limit} byte limit)")]
    ScriptTooLarge { path: String, size: u64, limit: u64 },

    /// The script source is not a well-formed document
    #[error("Invalid worker pool script '{origin}'{}: {reason}", at_location(.location))]
    InvalidScript {
        origin: String,
        location: Option<ScriptLocation>,
        reason: String,
    },

    /// The script ran but declared an invalid configuration
    #[error("Worker pool script '{origin}' failed{}: {source}", at_statement(.statement))]
    Script {
        origin: String,
        statement: Option<String>,
        #[source]
        source: DslError,
    },

    /// Loader settings could not be resolved
    #[error("Worker pool loader settings error: {error}")]
    Settings { error: String },
}

fn at_location(location: &Option<ScriptLocation>) -> String {
    location
        .map(|location| format!(" at {location}"))
        .unwrap_or_default()
}

fn at_statement(statement: &Option<String>) -> String {
    statement
        .as_ref()
        .map(|statement| format!(" at '{statement}'"))
        .unwrap_or_default()
}

impl WorkerPoolError {
    pub fn file_read<P: Into<String>, E: fmt::Display>(path: P, error: E) -> Self {
        Self::FileRead {
            path: path.into(),
            error: error.to_string(),
        }
    }

    pub fn invalid_script<O: Into<String>, R: fmt::Display>(
        origin: O,
        location: Option<ScriptLocation>,
        reason: R,
    ) -> Self {
        Self::InvalidScript {
            origin: origin.into(),
            location,
            reason: reason.to_string(),
        }
    }

    pub fn script<O: Into<String>>(origin: O, statement: Option<String>, source: DslError) -> Self {
        Self::Script {
            origin: origin.into(),
            statement,
            source,
        }
    }

    /// The DSL error behind a failed script, if that is what this is
    pub fn dsl_error(&self) -> Option<&DslError> {
        match self {
            Self::Script { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_conflicting_mode(&self) -> bool {
        self.dsl_error().is_some_and(DslError::is_conflicting_mode)
    }

    pub fn is_invalid_nesting(&self) -> bool {
        self.dsl_error().is_some_and(DslError::is_invalid_nesting)
    }
}

impl From<config::ConfigError> for WorkerPoolError {
    fn from(error: config::ConfigError) -> Self {
        Self::Settings {
            error: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkerPoolError>;

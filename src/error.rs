//! Error handling for the pyboil application.
//! Defines custom error types and results used throughout the application.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Custom error types for pyboil operations.
///
/// This enum represents all possible errors that can occur while generating a project.
/// It implements the standard Error trait through thiserror's derive macro.
#[derive(Error, Debug)]
pub enum Error {
    /// The project root or an intermediate directory is occupied by an unusable entry.
    /// Raised before anything is written to the conflicting path.
    #[error("Path conflict at '{}': {reason}.", .path.display())]
    PathConflict { path: PathBuf, reason: String, written: Vec<PathBuf> },

    /// An I/O failure while writing or removing a specific entry.
    /// `written` and `removed` list the entries completed before the failure.
    #[error("Failed to write '{}': {source}.", .path.display())]
    WriteFailure {
        path: PathBuf,
        written: Vec<PathBuf>,
        removed: Vec<PathBuf>,
        #[source]
        source: io::Error,
    },

    /// Generation was cancelled between two writes or removals.
    #[error("Generation cancelled after {} written entries.", .written.len())]
    Cancelled { written: Vec<PathBuf>, removed: Vec<PathBuf> },

    /// The project name cannot be used as a directory name.
    #[error("Invalid project name '{name}': {reason}.")]
    InvalidProjectName { name: String, reason: String },

    /// Represents errors that occur while loading or validating a template registry
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents errors that occur while rendering a template body
    #[error("Template error in '{name}': {source}.")]
    TemplateError {
        name: String,
        #[source]
        source: minijinja::Error,
        written: Vec<PathBuf>,
    },

    /// Represents invalid keep patterns
    #[error("Keep pattern error: {0}.")]
    IgnoreError(String),

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}.")]
    YamlError(#[from] serde_yaml::Error),

    /// Represents failures of the interactive prompt
    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),
}

impl Error {
    /// Entries that were written before the operation stopped.
    pub fn completed_paths(&self) -> &[PathBuf] {
        match self {
            Error::PathConflict { written, .. }
            | Error::WriteFailure { written, .. }
            | Error::Cancelled { written, .. }
            | Error::TemplateError { written, .. } => written,
            _ => &[],
        }
    }

    /// Stale entries that were removed before the operation stopped.
    pub fn removed_paths(&self) -> &[PathBuf] {
        match self {
            Error::WriteFailure { removed, .. } | Error::Cancelled { removed, .. } => removed,
            _ => &[],
        }
    }

    /// Records the entries completed so far on the variants that report them.
    pub fn with_progress(mut self, done: &[PathBuf], done_removed: &[PathBuf]) -> Self {
        match &mut self {
            Error::PathConflict { written, .. } | Error::TemplateError { written, .. } => {
                *written = done.to_vec();
            }
            Error::WriteFailure { written, removed, .. } | Error::Cancelled { written, removed } => {
                *written = done.to_vec();
                *removed = done_removed.to_vec();
            }
            _ => {}
        }
        self
    }
}

/// Convenience type alias for Results with pyboil's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal failure to mark a generated file as executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionWarning {
    pub path: PathBuf,
    pub reason: String,
}

impl PermissionWarning {
    pub fn new<P: AsRef<Path>, S: Into<String>>(path: P, reason: S) -> Self {
        Self { path: path.as_ref().to_path_buf(), reason: reason.into() }
    }
}

impl fmt::Display for PermissionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not mark '{}' as executable: {}", self.path.display(), self.reason)
    }
}

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message and any entries removed or written before the failure
/// to stderr, then exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    let removed = err.removed_paths();
    if !removed.is_empty() {
        eprintln!("Entries removed before the failure:");
        for path in removed {
            eprintln!("  '{}'", path.display());
        }
    }
    let completed = err.completed_paths();
    if !completed.is_empty() {
        eprintln!("Entries written before the failure:");
        for path in completed {
            eprintln!("  '{}'", path.display());
        }
    }
    std::process::exit(1);
}

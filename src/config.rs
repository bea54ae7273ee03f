//! Custom template registries.
//! A registry manifest describes templates as data, in JSON or YAML:
//!
//! ```yaml
//! templates:
//!   - path: app.py
//!     executable: true
//!     body: "print('hello')\n"
//!   - path: README.md
//!     render: true
//!     body: "# {{ project_name }}\n"
//! directories: [data]
//! ```

use crate::constants::MANIFEST_FILES;
use crate::error::{Error, Result};
use crate::template::{Registry, Template};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    templates: Vec<Template>,
    #[serde(default)]
    directories: Vec<PathBuf>,
}

/// Returns the first manifest file found in `dir`, trying `MANIFEST_FILES` in order.
pub fn find_manifest<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
    MANIFEST_FILES
        .iter()
        .map(|file| dir.as_ref().join(file))
        .find(|path| path.is_file())
}

/// Reads a manifest from a file, or from a directory containing one.
///
/// # Errors
/// * `Error::ConfigError` if the path is a directory without a manifest
/// * `Error::IoError` if the file cannot be read
pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let manifest_path = if path.is_dir() {
        find_manifest(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "No registry manifest found in '{}' (tried: {})",
                path.display(),
                MANIFEST_FILES.join(", ")
            ))
        })?
    } else {
        path.to_path_buf()
    };

    debug!("Loading registry manifest from {}", manifest_path.display());
    Ok(std::fs::read_to_string(&manifest_path)?)
}

/// Parses manifest content into a validated registry.
/// JSON is tried first, YAML second.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither valid JSON nor YAML, or the
///   registry it describes is invalid
pub fn parse_registry(content: &str) -> Result<Registry> {
    let manifest: Manifest = match serde_json::from_str(content) {
        Ok(manifest) => manifest,
        Err(_) => serde_yaml::from_str(content).map_err(|e| {
            Error::ConfigError(format!("Invalid registry manifest: {}", e))
        })?,
    };

    if manifest.templates.is_empty() {
        return Err(Error::ConfigError("registry manifest has no templates".to_string()));
    }

    Registry::new(manifest.templates, manifest.directories)
}

/// Loads and validates the registry described by the manifest at `path`.
pub fn load_registry<P: AsRef<Path>>(path: P) -> Result<Registry> {
    let content = load_manifest(path)?;
    parse_registry(&content)
}

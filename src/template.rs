//! Template data model and the built-in template registry.
//! Template bodies live in the crate's `templates/` directory and are embedded
//! at compile time; nothing here touches the filesystem.

use crate::constants::DATA_DIR;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

const MAIN_PY: &str = include_str!("../templates/main.py");
const INSTALL_SH: &str = include_str!("../templates/install.sh");
const REQUIREMENTS_TXT: &str = include_str!("../templates/requirements.txt");
const CONFIG_JSON: &str = include_str!("../templates/config.json");
const GITIGNORE: &str = include_str!("../templates/gitignore");
const README_MD: &str = include_str!("../templates/README.md.j2");

/// A named unit of text written to `relative_path` under the project root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Template {
    #[serde(rename = "path")]
    pub relative_path: PathBuf,
    pub body: String,
    /// Whether the written file must carry execute permission
    #[serde(default)]
    pub executable: bool,
    /// Whether the body goes through the template renderer; literal otherwise
    #[serde(default)]
    pub render: bool,
}

impl Template {
    /// Creates a literal, non-executable template.
    pub fn new<P: Into<PathBuf>, S: Into<String>>(relative_path: P, body: S) -> Self {
        Self { relative_path: relative_path.into(), body: body.into(), executable: false, render: false }
    }

    pub fn executable(mut self) -> Self {
        self.executable = true;
        self
    }

    pub fn rendered(mut self) -> Self {
        self.render = true;
        self
    }
}

/// Ordered, immutable set of templates plus the empty directories created next to them.
#[derive(Debug, Clone)]
pub struct Registry {
    templates: IndexMap<PathBuf, Template>,
    directories: Vec<PathBuf>,
}

impl Registry {
    /// Builds a registry, keeping the order in which templates are given.
    ///
    /// # Errors
    /// * `Error::ConfigError` if a path is not a plain relative path, appears twice,
    ///   or would need a template file to double as a directory
    pub fn new<T, D>(templates: T, directories: D) -> Result<Self>
    where
        T: IntoIterator<Item = Template>,
        D: IntoIterator<Item = PathBuf>,
    {
        let mut map = IndexMap::new();
        for template in templates {
            validate_relative_path(&template.relative_path)?;
            let key = template.relative_path.clone();
            if map.insert(key.clone(), template).is_some() {
                return Err(Error::ConfigError(format!(
                    "duplicate template path '{}'",
                    key.display()
                )));
            }
        }

        for path in map.keys() {
            if let Some(parent) = ancestors(path).find(|a| map.contains_key(*a)) {
                return Err(Error::ConfigError(format!(
                    "template '{}' is placed inside template file '{}'",
                    path.display(),
                    parent.display()
                )));
            }
        }

        let mut dirs: Vec<PathBuf> = Vec::new();
        for dir in directories {
            validate_relative_path(&dir)?;
            if map.contains_key(&dir) || ancestors(&dir).any(|a| map.contains_key(a)) {
                return Err(Error::ConfigError(format!(
                    "directory '{}' collides with a template file",
                    dir.display()
                )));
            }
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }

        Ok(Self { templates: map, directories: dirs })
    }

    /// The six-template Python project skeleton plus the `data/` directory.
    pub fn builtin() -> Self {
        let templates = builtin_templates()
            .into_iter()
            .map(|t| (t.relative_path.clone(), t))
            .collect();
        Self { templates, directories: vec![PathBuf::from(DATA_DIR)] }
    }

    /// Templates in registry order.
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn get<P: AsRef<Path>>(&self, relative_path: P) -> Option<&Template> {
        self.templates.get(relative_path.as_ref())
    }

    /// Auxiliary empty directories.
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Relative paths of every file the registry produces.
    pub fn file_paths(&self) -> BTreeSet<PathBuf> {
        self.templates.keys().cloned().collect()
    }

    /// Relative paths of every directory the registry produces, including
    /// the parents of nested templates.
    pub fn directory_paths(&self) -> BTreeSet<PathBuf> {
        let mut dirs = BTreeSet::new();
        for path in self.templates.keys() {
            dirs.extend(ancestors(path).map(Path::to_path_buf));
        }
        for dir in &self.directories {
            dirs.insert(dir.clone());
            dirs.extend(ancestors(dir).map(Path::to_path_buf));
        }
        dirs
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::builtin()
    }
}

/// Bodies of the built-in registry, in generation order.
pub fn builtin_templates() -> Vec<Template> {
    vec![
        Template::new("main.py", MAIN_PY).executable(),
        Template::new("install.sh", INSTALL_SH).executable(),
        Template::new("requirements.txt", REQUIREMENTS_TXT),
        Template::new("config.json", CONFIG_JSON),
        Template::new(".gitignore", GITIGNORE),
        Template::new("README.md", README_MD).rendered(),
    ]
}

/// Proper ancestors of a relative path, nearest first, excluding the empty path.
fn ancestors(path: &Path) -> impl Iterator<Item = &Path> {
    path.ancestors().skip(1).filter(|a| !a.as_os_str().is_empty())
}

/// Checks that a registry path is relative, non-empty and stays inside the project root.
pub fn validate_relative_path(path: &Path) -> Result<()> {
    let raw = path.to_string_lossy();
    let invalid = |reason: &str| {
        Err(Error::ConfigError(format!("invalid path '{}': {}", raw, reason)))
    };

    if raw.trim().is_empty() {
        return invalid("path is empty");
    }
    if raw.contains("//") || raw.ends_with('/') {
        return invalid("path has an empty component");
    }
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return invalid("path must be relative and must not contain '.' or '..'");
    }
    Ok(())
}

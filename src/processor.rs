//! Project materialization.
//! Renders every template of a registry and writes the results, together with
//! the registry's empty directories, under `<output_dir>/<project_name>`.

use globset::GlobSet;
use log::{debug, info, warn};
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::constants::PROJECT_NAME_VAR;
use crate::error::{Error, PermissionWarning, Result};
use crate::name::project_name;
use crate::renderer::TemplateRenderer;
use crate::template::Registry;

/// What to do when the project root already exists as a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Regenerate in place: stale entries are removed, generated files overwritten.
    #[default]
    Overwrite,
    /// Fail with `Error::PathConflict` if the root is a non-empty directory.
    Refuse,
}

#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Directory in which the project root is created
    pub output_dir: PathBuf,
    pub overwrite: OverwritePolicy,
    /// Existing entries left untouched by the overwrite pass
    pub keep: GlobSet,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            overwrite: OverwritePolicy::default(),
            keep: GlobSet::empty(),
        }
    }
}

/// Outcome of a successful materialization.
#[derive(Debug)]
pub struct MaterializationResult {
    pub project_name: String,
    pub root: PathBuf,
    /// Files and directories written, in order
    pub written: Vec<PathBuf>,
    /// Stale entries removed from an existing root
    pub removed: Vec<PathBuf>,
    pub warnings: Vec<PermissionWarning>,
}

pub struct Materializer<'a> {
    registry: &'a Registry,
    engine: &'a dyn TemplateRenderer,
    options: MaterializeOptions,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Materializer<'a> {
    pub fn new(
        registry: &'a Registry,
        engine: &'a dyn TemplateRenderer,
        options: MaterializeOptions,
    ) -> Self {
        Self { registry, engine, options, cancel: None }
    }

    /// Sets a flag that, once raised, stops generation before the next write or removal.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Generates the project.
    ///
    /// # Arguments
    /// * `name` - Project name; absent or blank input falls back to the default
    ///
    /// # Errors
    /// * `Error::InvalidProjectName` if the name cannot be a directory name
    /// * `Error::PathConflict` if the root or an intermediate directory is not usable
    /// * `Error::TemplateError` if a template fails to render
    /// * `Error::WriteFailure` on the first entry that cannot be written or removed
    /// * `Error::Cancelled` if the cancel flag was raised
    ///
    /// Errors raised after generation started carry the entries written and
    /// removed up to that point.
    pub fn materialize(&self, name: Option<&str>) -> Result<MaterializationResult> {
        let project_name = project_name(name)?;
        let root = self.options.output_dir.join(&project_name);
        info!("Generating project '{}' in {}", project_name, root.display());

        let mut progress = Progress::default();
        let warnings = self
            .generate(&root, &project_name, &mut progress)
            .map_err(|e| e.with_progress(&progress.written, &progress.removed))?;

        Ok(MaterializationResult {
            project_name,
            root,
            written: progress.written,
            removed: progress.removed,
            warnings,
        })
    }

    fn generate(
        &self,
        root: &Path,
        project_name: &str,
        progress: &mut Progress,
    ) -> Result<Vec<PermissionWarning>> {
        let root_exists = inspect_root(root, self.options.overwrite)?;
        self.check_cancelled()?;

        if root_exists {
            self.remove_stale_entries(root, &mut progress.removed)?;
        }
        fs::create_dir_all(root).map_err(|source| write_failure(root, source))?;

        let context = serde_json::json!({ PROJECT_NAME_VAR: project_name });
        let mut warnings = Vec::new();

        for template in self.registry.templates() {
            self.check_cancelled()?;
            let target = root.join(&template.relative_path);
            let content = if template.render {
                let template_name = template.relative_path.to_string_lossy();
                Cow::Owned(self.engine.render(&template_name, &template.body, &context)?)
            } else {
                Cow::Borrowed(template.body.as_str())
            };

            debug!("Writing file: {}", target.display());
            ensure_parent_dir(root, &target)?;
            fs::write(&target, content.as_bytes())
                .map_err(|source| write_failure(&target, source))?;
            if template.executable {
                if let Some(warning) = set_executable(&target) {
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
            progress.written.push(target);
        }

        for dir in self.registry.directories() {
            self.check_cancelled()?;
            let target = root.join(dir);
            debug!("Creating directory: {}", target.display());
            ensure_parent_dir(root, &target)?;
            fs::create_dir_all(&target).map_err(|source| write_failure(&target, source))?;
            progress.written.push(target);
        }

        Ok(warnings)
    }

    /// Removes every entry under `root` that the registry does not produce, or that
    /// has the wrong type, unless it matches the keep patterns. The cancel flag is
    /// checked before each removal.
    fn remove_stale_entries(&self, root: &Path, removed: &mut Vec<PathBuf>) -> Result<()> {
        let files = self.registry.file_paths();
        let dirs = self.registry.directory_paths();

        let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name().into_iter();
        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|e| Error::IoError(e.into()))?;
            let path = entry.path();
            let relative = path
                .strip_prefix(root)
                .map_err(|e| Error::ConfigError(e.to_string()))?;
            let file_type = entry.file_type();

            if self.options.keep.is_match(relative) {
                debug!("Keeping {}", path.display());
                if file_type.is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }

            let expected = if file_type.is_dir() {
                dirs.contains(relative)
            } else {
                file_type.is_file() && files.contains(relative)
            };
            if expected {
                continue;
            }

            self.check_cancelled()?;
            let removal = if file_type.is_dir() {
                walker.skip_current_dir();
                fs::remove_dir_all(path)
            } else {
                fs::remove_file(path)
            };
            removal.map_err(|source| write_failure(path, source))?;

            info!("Removed stale entry {}", path.display());
            removed.push(path.to_path_buf());
        }

        Ok(())
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::SeqCst) => {
                info!("Generation cancelled");
                Err(Error::Cancelled { written: Vec::new(), removed: Vec::new() })
            }
            _ => Ok(()),
        }
    }
}

/// Entries changed on disk so far by one materialization.
#[derive(Debug, Default)]
struct Progress {
    written: Vec<PathBuf>,
    removed: Vec<PathBuf>,
}

fn write_failure(path: &Path, source: io::Error) -> Error {
    Error::WriteFailure {
        path: path.to_path_buf(),
        written: Vec::new(),
        removed: Vec::new(),
        source,
    }
}

/// Checks whether the project root can be used.
///
/// # Returns
/// * `Result<bool>` - Whether the root already exists as a directory
///
/// # Errors
/// * `Error::PathConflict` if the root is not a directory, or is a non-empty
///   directory under `OverwritePolicy::Refuse`
pub fn inspect_root(root: &Path, policy: OverwritePolicy) -> Result<bool> {
    match fs::metadata(root) {
        Ok(meta) if !meta.is_dir() => Err(Error::PathConflict {
            path: root.to_path_buf(),
            reason: "exists and is not a directory".to_string(),
            written: Vec::new(),
        }),
        Ok(_) => {
            if policy == OverwritePolicy::Refuse && fs::read_dir(root)?.next().is_some() {
                return Err(Error::PathConflict {
                    path: root.to_path_buf(),
                    reason: "directory exists and is not empty".to_string(),
                    written: Vec::new(),
                });
            }
            debug!("Project root {} already exists, overwriting", root.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::IoError(e)),
    }
}

/// Creates the parent directories of `target` below `root`.
///
/// # Errors
/// * `Error::PathConflict` if one of them exists and is not a directory
/// * `Error::WriteFailure` if one cannot be created
fn ensure_parent_dir(root: &Path, target: &Path) -> Result<()> {
    let Some(parent) = target.parent() else {
        return Ok(());
    };

    for dir in parent.ancestors().take_while(|a| *a != root) {
        if dir.exists() && !dir.is_dir() {
            return Err(Error::PathConflict {
                path: dir.to_path_buf(),
                reason: "exists and is not a directory".to_string(),
                written: Vec::new(),
            });
        }
    }

    fs::create_dir_all(parent).map_err(|source| write_failure(parent, source))
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Option<PermissionWarning> {
    use crate::constants::EXECUTABLE_MODE;
    use std::os::unix::fs::PermissionsExt;

    debug!("Marking {} as executable", path.display());
    let result = fs::metadata(path).and_then(|meta| {
        let mut perms = meta.permissions();
        perms.set_mode(EXECUTABLE_MODE);
        fs::set_permissions(path, perms)
    });
    result.err().map(|e| PermissionWarning::new(path, e.to_string()))
}

#[cfg(not(unix))]
fn set_executable(path: &Path) -> Option<PermissionWarning> {
    Some(PermissionWarning::new(path, "platform has no POSIX permission bits"))
}

//! Common constants used throughout the pyboil application.

/// Project name used when the caller supplies none
pub const DEFAULT_PROJECT_NAME: &str = "python-boilerplate";

/// Template variable holding the effective project name
pub const PROJECT_NAME_VAR: &str = "project_name";

/// Empty directory created in every generated project
pub const DATA_DIR: &str = "data";

/// Supported registry manifest file names
pub const MANIFEST_FILES: [&str; 3] = ["pyboil.json", "pyboil.yml", "pyboil.yaml"];

/// Mode applied to templates marked executable
pub const EXECUTABLE_MODE: u32 = 0o755;

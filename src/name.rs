//! Project name resolution.
//! Applies the default name to blank input and rejects names that
//! cannot be used as a single directory name.

use crate::constants::DEFAULT_PROJECT_NAME;
use crate::error::{Error, Result};

/// Device names Windows reserves regardless of extension.
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
    "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Returns the effective project name: trimmed input, or the default when
/// the input is absent or blank.
pub fn resolve_project_name(input: Option<&str>) -> String {
    match input.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_PROJECT_NAME.to_string(),
    }
}

/// Checks that `name` names exactly one directory under the output directory.
///
/// # Errors
/// * `Error::InvalidProjectName` if the name contains a path separator, a `:` or a
///   NUL byte, is `.` or `..`, or is a reserved device name
pub fn validate_project_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidProjectName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid("name must not contain path separators"));
    }
    if name.contains(':') {
        return Err(invalid("name must not contain a drive or stream separator ':'"));
    }
    if name.contains('\0') {
        return Err(invalid("name must not contain NUL bytes"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name must not refer to the current or parent directory"));
    }

    let stem = name.split('.').next().unwrap_or(name).trim_end();
    if RESERVED_NAMES.iter().any(|reserved| stem.eq_ignore_ascii_case(reserved)) {
        return Err(invalid("name is a reserved device name"));
    }

    Ok(())
}

/// Resolves and validates the project name in one step.
pub fn project_name(input: Option<&str>) -> Result<String> {
    let name = resolve_project_name(input);
    validate_project_name(&name)?;
    Ok(name)
}

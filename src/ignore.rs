//! Keep patterns for regeneration.
//! When a project is generated over an existing directory, entries that are not
//! part of the generated set are removed unless they match one of these globs.

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;

/// Compiles glob patterns (relative to the project root) into a set.
///
/// # Returns
/// * `Result<GlobSet>` - Set of compiled patterns; empty when no pattern is given
///
/// # Example
/// ```ignore
/// let keep = parse_keep_patterns(&[".git", ".git/**", ".venv"])?;
/// ```
pub fn parse_keep_patterns<I, S>(patterns: I) -> Result<GlobSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref().trim();
        if pattern.is_empty() {
            continue;
        }
        debug!("Keeping existing entries matching '{}'", pattern);
        builder.add(
            Glob::new(pattern)
                .map_err(|e| Error::IgnoreError(format!("invalid pattern '{}': {}", pattern, e)))?,
        );
    }
    builder.build().map_err(|e| Error::IgnoreError(e.to_string()))
}

//! User input and interaction handling.

use crate::constants::DEFAULT_PROJECT_NAME;
use crate::error::{Error, Result};
use dialoguer::Input;
use log::debug;

/// Source of interactive answers.
pub trait Prompter {
    /// Asks for the project name, offering `default`.
    fn project_name(&self, default: &str) -> Result<String>;
}

/// Terminal prompter backed by dialoguer.
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        DialoguerPrompter::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn project_name(&self, default: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt("Project name")
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()
            .map_err(Error::PromptError)
    }
}

/// Returns the project name given on the command line, or asks for one.
///
/// # Arguments
/// * `prompt` - Prompter used when no name was given
/// * `provided` - Name from the command line, if any
/// * `interactive` - Whether asking is allowed
///
/// # Returns
/// * `Result<Option<String>>` - `None` when nothing was given and asking is not
///   allowed; the default name applies downstream
pub fn ask_project_name(
    prompt: &dyn Prompter,
    provided: Option<String>,
    interactive: bool,
) -> Result<Option<String>> {
    match provided {
        Some(name) => Ok(Some(name)),
        None if interactive => prompt.project_name(DEFAULT_PROJECT_NAME).map(Some),
        None => {
            debug!("No project name given, using '{}'", DEFAULT_PROJECT_NAME);
            Ok(None)
        }
    }
}

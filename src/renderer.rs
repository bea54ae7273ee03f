//! Template rendering for pyboil.
//! Substitutes the project name into template bodies with MiniJinja.
use crate::error::{Error, Result};
use minijinja::{Environment, UndefinedBehavior};

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `name` - Template name used in error messages
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer that fails on undefined variables and keeps
    /// the trailing newline of every body.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// # Errors
    /// * `Error::TemplateError` if the body fails to parse or references an
    ///   undefined variable
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String> {
        self.env
            .render_named_str(name, template, context)
            .map_err(|source| Error::TemplateError {
                name: name.to_string(),
                source,
                written: Vec::new(),
            })
    }
}

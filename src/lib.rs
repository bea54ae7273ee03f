//! pyboil generates minimal Python project skeletons.
//! It renders a fixed registry of templates, substituting the project name where
//! needed, and writes them with their permissions under a new project directory.

/// Command-line interface module for the pyboil application
pub mod cli;

/// Custom template registries loaded from JSON or YAML manifests
pub mod config;

/// Common constants
pub mod constants;

/// Error types and handling for the pyboil application
pub mod error;

/// Keep patterns for entries that survive regeneration
pub mod ignore;

/// Logger initialisation
pub mod logger;

/// Project name defaulting and validation
pub mod name;

/// Project materialization: writes the rendered registry to disk
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// Template rendering functionality
pub mod renderer;

/// Template data model and the built-in registry
pub mod template;

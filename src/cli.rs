//! Command-line interface implementation for pyboil.
//! Provides argument parsing using clap.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::processor::{MaterializationResult, OverwritePolicy};

/// Command-line arguments structure for pyboil.
#[derive(Parser, Debug)]
#[command(author, version, about = "pyboil: python project boilerplate generator", long_about = None)]
pub struct Args {
    /// Name of the project directory to create (asked interactively when omitted)
    #[arg(value_name = "PROJECT_NAME")]
    pub project_name: Option<String>,

    /// Directory in which the project directory is created
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Fail instead of overwriting an existing non-empty project directory
    #[arg(long)]
    pub no_overwrite: bool,

    /// Registry manifest (pyboil.json, pyboil.yml, pyboil.yaml) or a directory containing one
    #[arg(long, value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// Glob of existing entries to keep when overwriting, relative to the project directory.
    /// May be given multiple times.
    #[arg(long, value_name = "GLOB")]
    pub keep: Vec<String>,

    /// Never prompt; use the default project name when none is given
    #[arg(long)]
    pub no_input: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn overwrite_policy(&self) -> OverwritePolicy {
        if self.no_overwrite {
            OverwritePolicy::Refuse
        } else {
            OverwritePolicy::Overwrite
        }
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With clap's default error handling for invalid arguments
pub fn get_args() -> Args {
    Args::parse()
}

/// Prints the outcome of a generation.
///
/// Removed and created entries and the final status line go to `out`; every
/// permission warning goes to `err` on its own line.
pub fn report<O: Write, E: Write>(
    result: &MaterializationResult,
    out: &mut O,
    err: &mut E,
) -> io::Result<()> {
    for path in &result.removed {
        writeln!(out, "Removed: '{}'", path.display())?;
    }
    for path in &result.written {
        writeln!(out, "Created: '{}'", path.display())?;
    }
    for warning in &result.warnings {
        writeln!(err, "Warning: {warning}")?;
    }
    writeln!(
        out,
        "Project '{}' generated successfully in {}.",
        result.project_name,
        result.root.display()
    )
}

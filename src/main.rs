//! pyboil's main application entry point.
//! Handles command-line argument parsing and drives a single project generation.

use std::io::{self, IsTerminal};

use pyboil::{
    cli::{get_args, report, Args},
    config::load_registry,
    error::{default_error_handler, Result},
    ignore::parse_keep_patterns,
    logger::init_logger,
    processor::{MaterializeOptions, Materializer},
    prompt::{ask_project_name, DialoguerPrompter},
    renderer::MiniJinjaRenderer,
    template::Registry,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads the template registry (built-in or from a manifest)
/// 2. Compiles keep patterns
/// 3. Obtains the project name
/// 4. Materializes the project and prints a summary
fn run(args: Args) -> Result<()> {
    let engine = MiniJinjaRenderer::new();
    let prompt = DialoguerPrompter::new();

    let registry = match &args.registry {
        Some(path) => load_registry(path)?,
        None => Registry::builtin(),
    };

    let options = MaterializeOptions {
        output_dir: args.output_dir.clone(),
        overwrite: args.overwrite_policy(),
        keep: parse_keep_patterns(&args.keep)?,
    };

    let interactive = !args.no_input && io::stdin().is_terminal();
    let project_name = ask_project_name(&prompt, args.project_name, interactive)?;

    let materializer = Materializer::new(&registry, &engine, options);
    let result = materializer.materialize(project_name.as_deref())?;

    report(&result, &mut io::stdout().lock(), &mut io::stderr().lock())?;
    Ok(())
}

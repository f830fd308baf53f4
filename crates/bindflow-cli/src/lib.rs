//! CLI logic for the bindflow tool.
//!
//! This module contains the core CLI logic: configuration resolution,
//! dispatching the requested actions and printing their summaries.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use log::info;

use bindflow::{BindflowError, FlowchartBuilder, FlowchartSummary, config::AppConfig};

/// Run the bindflow CLI application
///
/// Performs every action requested in `args`, in this order: list
/// exchanges, generate a flowchart for an exchange, regenerate diagrams
/// from a stored results file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `BindflowError` for:
/// - Configuration loading errors
/// - Missing or empty snapshot directories
/// - Exchanges without bindings
/// - File I/O errors
/// - Rendering errors
/// - No action requested
pub fn run(args: &Args) -> Result<(), BindflowError> {
    let builder = FlowchartBuilder::new(resolve_config(args)?);
    let mut performed = false;

    if let Some(prefix) = args.list_prefix() {
        let exchanges = builder.list_exchanges(prefix)?;
        println!("Exchanges ({}):", exchanges.len());
        for exchange in &exchanges {
            println!("  {exchange}");
        }
        performed = true;
    }

    if let Some(exchange) = &args.exchange {
        let summary = builder.generate(exchange, &args.output)?;
        println!("\nFlowchart generated for exchange {exchange}");
        print_summary(&summary);
        performed = true;
    }

    if let Some(file_name) = &args.diagram {
        let summary = builder.generate_from_json(file_name)?;
        println!("\nDiagrams generated from {file_name}");
        print_summary(&summary);
        performed = true;
    }

    if !performed {
        return Err(BindflowError::validation(
            "nothing to do, pass --exchange, --diagram or --list-exchanges",
        ));
    }

    Ok(())
}

/// Loads the configuration file and applies command-line overrides.
fn resolve_config(args: &Args) -> Result<AppConfig, BindflowError> {
    let mut config = config::load_config(args.config.as_ref())?;

    if let Some(dir) = &args.json_dir {
        config = config.with_json_dir(dir);
    }
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    if args.no_render {
        config = config.with_rendering(false);
    }

    info!(
        json_dir = config.directories().json().display().to_string(),
        output_dir = config.directories().output().display().to_string(),
        render = config.render().enabled();
        "Configuration resolved"
    );

    Ok(config)
}

fn print_summary(summary: &FlowchartSummary) {
    let artifacts = summary.artifacts();

    println!("  Results found: {}", summary.results().len());
    if summary.skipped_documents() > 0 {
        println!("  Skipped documents: {}", summary.skipped_documents());
    }
    if summary.skipped_records() > 0 {
        println!("  Skipped records: {}", summary.skipped_records());
    }
    println!("\nGenerated files:");
    println!("  JSON: {}", artifacts.results().display());
    println!("  Mermaid: {}", artifacts.graph_source().display());
    for (format, path) in artifacts.images() {
        println!("  {}: {}", format.extension().to_uppercase(), path.display());
    }
}

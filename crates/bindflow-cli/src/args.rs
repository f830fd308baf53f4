//! Command-line argument definitions for the bindflow CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the action (generate, regenerate from
//! stored results, list exchanges), override configured directories and
//! control logging verbosity.

use clap::Parser;

/// Generate flowcharts from routing-binding configuration snapshots
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Exchange name to generate a flowchart for
    #[arg(short, long)]
    pub exchange: Option<String>,

    /// Base name for generated artifacts
    #[arg(short, long, default_value = "flowchart")]
    pub output: String,

    /// Regenerate diagrams from an existing results file in the output directory
    #[arg(short, long, value_name = "JSONFILE")]
    pub diagram: Option<String>,

    /// List exchanges found in the snapshot, optionally filtered by prefix
    #[arg(
        short,
        long,
        value_name = "PREFIX",
        num_args = 0..=1,
        default_missing_value = ""
    )]
    pub list_exchanges: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Snapshot directory, overriding the configuration
    #[arg(long)]
    pub json_dir: Option<String>,

    /// Output directory, overriding the configuration
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Write the results and Mermaid source only, without rendering images
    #[arg(long)]
    pub no_render: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Returns the prefix filter for exchange listing, if listing was requested.
    ///
    /// The outer `Option` tells whether listing was requested; an empty
    /// prefix means no filtering.
    pub fn list_prefix(&self) -> Option<Option<&str>> {
        self.list_exchanges
            .as_deref()
            .map(|prefix| Some(prefix).filter(|p| !p.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["bindflow", "--exchange", "orders"]);

        assert_eq!(args.exchange.as_deref(), Some("orders"));
        assert_eq!(args.output, "flowchart");
        assert_eq!(args.log_level, "info");
        assert!(!args.no_render);
        assert_eq!(args.list_prefix(), None);
    }

    #[test]
    fn test_list_without_prefix() {
        let args = Args::parse_from(["bindflow", "--list-exchanges"]);
        assert_eq!(args.list_prefix(), Some(None));
    }

    #[test]
    fn test_list_with_prefix() {
        let args = Args::parse_from(["bindflow", "-l", "moirai"]);
        assert_eq!(args.list_prefix(), Some(Some("moirai")));
    }
}

//! Command-line argument definitions for the injection water pipeline
//!
//! Global options locate the extracts, the location cache and the snapshot;
//! subcommands build the snapshot or report from it.

use crate::config::PipelineConfig;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the injection water analysis
///
/// Builds a typed snapshot of California injection reports and renders the
/// summary tables of where the injected water came from.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "injection-water",
    version,
    about = "Summarize water injected into California oil and gas wells",
    long_about = "Reads the quarterly and monthly injection reports and the well registry \
                  for 2018-2021, joins well metadata, classifies water source and suitability, \
                  and produces gallon summaries by county, year, operator and source."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Root directory holding `<kind>/<year>/<table>.csv` extracts
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Cached well location reference (defaults to <data-dir>/well_locations.csv)
    #[arg(long = "locations", value_name = "FILE", global = true)]
    pub location_cache: Option<PathBuf>,

    /// Directory the snapshot is written to and read from
    #[arg(long, value_name = "PATH", global = true)]
    pub snapshot_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors and hide progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Read the extracts and write the typed snapshot
    Build,
    /// Print one named report, or every report when no name is given
    Report(ReportArgs),
    /// List the available reports
    List,
    /// Compare flagged quarterly records with the monthly report
    Crosscheck(CrosscheckArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct ReportArgs {
    /// Report name as shown by `list`
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Also write each table as CSV into this directory
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Clone, Parser)]
pub struct CrosscheckArgs {
    /// Write the comparison as CSV into this directory
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Show consistent well-quarters too, not only disagreements
    #[arg(long)]
    pub all: bool,
}

impl Args {
    /// Pipeline paths with command-line overrides applied
    pub fn to_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(path) = &self.location_cache {
            config = config.with_location_cache(path);
        }
        if let Some(dir) = &self.snapshot_dir {
            config = config.with_snapshot_dir(dir);
        }
        match &self.command {
            Some(Commands::Report(ReportArgs {
                export: Some(dir), ..
            }))
            | Some(Commands::Crosscheck(CrosscheckArgs {
                export: Some(dir), ..
            })) => config.with_export_dir(dir),
            _ => config,
        }
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

//! Command implementations for the injection water CLI
//!
//! Each command resolves its paths from [`Args`], runs the library and
//! prints a colored summary to stdout. Logs go to stderr.

use crate::cli::args::{Args, Commands, CrosscheckArgs, ReportArgs};
use crate::config::PipelineConfig;
use crate::crosscheck::{self, FlagRule};
use crate::models::Snapshot;
use crate::processor::Pipeline;
use crate::report::{self, ReportTable};

use anyhow::{Context, Result};
use colored::*;
use tracing::{debug, info};

/// Main command runner
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let config = args.to_config();
    debug!("Resolved configuration: {:?}", config);

    match &args.command {
        Some(Commands::Build) => run_build(&config, args.show_progress()),
        Some(Commands::Report(report_args)) => run_report(&config, report_args),
        Some(Commands::List) | None => run_list(),
        Some(Commands::Crosscheck(crosscheck_args)) => run_crosscheck(&config, crosscheck_args),
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("injection_water={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

fn run_build(config: &PipelineConfig, show_progress: bool) -> Result<()> {
    Pipeline::new(config.clone())
        .with_progress(show_progress)
        .run()
        .context("Snapshot build failed")?;
    Ok(())
}

fn load_snapshot(config: &PipelineConfig) -> Result<Snapshot> {
    Snapshot::load(&config.snapshot_dir).with_context(|| {
        format!(
            "Could not load snapshot from {} (run `build` first)",
            config.snapshot_dir.display()
        )
    })
}

fn print_table(table: &ReportTable) -> Result<()> {
    let df = table.to_dataframe()?;
    println!("\n{}", table.title().bright_green().bold());
    println!("{}", df);
    Ok(())
}

fn run_report(config: &PipelineConfig, args: &ReportArgs) -> Result<()> {
    let queries = match &args.name {
        Some(name) => vec![report::find_query(name)?],
        None => report::catalog(),
    };
    let snapshot = load_snapshot(config)?;

    for query in &queries {
        info!("Running report {}", query.name);
        let table = report::run_query(&snapshot, query)
            .with_context(|| format!("Report '{}' failed", query.name))?;
        print_table(&table)?;

        if let Some(dir) = &config.export_dir {
            let path = report::export_csv(dir, query.name, &table)?;
            println!("  {} {}", "Exported:".bright_cyan(), path.display());
        }
    }
    Ok(())
}

fn run_list() -> Result<()> {
    println!("{}", "Available reports:".bright_green().bold());
    println!();
    for query in report::catalog() {
        println!(
            "  {} {}",
            format!("{:<26}", query.name).bright_yellow().bold(),
            query.title
        );
    }
    Ok(())
}

fn run_crosscheck(config: &PipelineConfig, args: &CrosscheckArgs) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let rows = crosscheck::crosscheck(&snapshot, &FlagRule::default())?;

    let inconsistent = rows.iter().filter(|r| !r.is_consistent()).count();
    println!("{}", "Quarterly vs monthly crosscheck".bright_green().bold());
    println!(
        "  {} {}",
        "Flagged well-quarters:".bright_cyan(),
        rows.len().to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Disagreeing:".bright_yellow(),
        inconsistent.to_string().bright_white().bold()
    );

    let shown: Vec<_> = if args.all {
        rows
    } else {
        rows.into_iter().filter(|r| !r.is_consistent()).collect()
    };
    let mut df = crosscheck::to_dataframe(&shown)?;
    println!("{}", df);

    if let Some(dir) = &config.export_dir {
        let path = report::write_csv(dir, "crosscheck", &mut df)?;
        println!("  {} {}", "Exported:".bright_cyan(), path.display());
    }
    Ok(())
}

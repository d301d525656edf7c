//! Snapshot build pipeline.
//!
//! Orchestrates ingestion, the registry and location joins, typing and code
//! normalization, then persists the typed tables as the snapshot every
//! report reads. Each stage is a pure function of the previous stage's
//! output.

pub mod ingest;
pub mod normalize;
pub mod snapshot;
pub mod wells;

#[cfg(test)]
pub mod tests;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{BuildStats, Snapshot};

use colored::*;
use std::time::Instant;
use tracing::info;

/// Builds the typed snapshot from the raw extracts
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    /// Show a progress bar while extracts are read
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage and return the snapshot without writing it
    pub fn build_snapshot(&self) -> Result<(Snapshot, BuildStats)> {
        let start_time = Instant::now();
        self.config.validate_for_build()?;

        // Read once, before anything else touches well metadata
        let locations = wells::load_locations(&self.config.location_cache)?;

        let (raw, [quarterly_stats, monthly_stats, registry_stats]) =
            ingest::ingest_all(&self.config, self.show_progress)?;

        let registry = wells::enrich_registry(raw.registry, &locations)?;
        let (quarterly, quarterly_unmatched) =
            wells::attach_registry(raw.quarterly, &registry, "quarterly")?;
        let (monthly, monthly_unmatched) =
            wells::attach_registry(raw.monthly, &registry, "monthly")?;

        let snapshot = Snapshot {
            quarterly: normalize::type_quarterly(&quarterly)?,
            monthly: normalize::type_monthly(&monthly)?,
            wells: normalize::type_registry(&registry)?,
        };

        let stats = BuildStats {
            quarterly: quarterly_stats,
            monthly: monthly_stats,
            registry: registry_stats,
            locations: locations.height(),
            quarterly_unmatched,
            monthly_unmatched,
            snapshot_dir: self.config.snapshot_dir.clone(),
            processing_time_ms: start_time.elapsed().as_millis(),
        };
        info!("Snapshot built in {}ms", stats.processing_time_ms);
        Ok((snapshot, stats))
    }

    /// Build the snapshot, write it and print a summary
    pub fn run(&self) -> Result<BuildStats> {
        println!("{}", "Building injection snapshot".bright_green().bold());
        println!(
            "  {} {}",
            "Extracts:".bright_cyan(),
            self.config.data_dir.display()
        );
        println!(
            "  {} {}",
            "Locations:".bright_cyan(),
            self.config.location_cache.display()
        );

        let (snapshot, stats) = self.build_snapshot()?;
        snapshot.save(&self.config.snapshot_dir)?;
        snapshot::write_build_stats(&self.config.snapshot_dir, &stats)?;

        println!("\n{}", "Build Summary".bright_green().bold());
        for (label, kind) in [
            ("Quarterly rows:", &stats.quarterly),
            ("Monthly rows:", &stats.monthly),
            ("Registry rows:", &stats.registry),
        ] {
            println!(
                "  {} {} ({} duplicates dropped)",
                label.bright_cyan(),
                kind.rows_kept().to_string().bright_white().bold(),
                kind.duplicates_dropped
            );
        }
        if stats.quarterly_unmatched + stats.monthly_unmatched > 0 {
            println!(
                "  {} {} quarterly, {} monthly",
                "Without registry match:".bright_yellow(),
                stats.quarterly_unmatched,
                stats.monthly_unmatched
            );
        }
        println!(
            "  {} {}",
            "Snapshot:".bright_cyan(),
            stats.snapshot_dir.display()
        );
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            stats.processing_time_ms.to_string().bright_white()
        );

        Ok(stats)
    }
}

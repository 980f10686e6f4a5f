use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::filter::FilterGates;
use super::snapshot::{ScanOutcome, SnapshotScanner};
use crate::core::{HealthChecker, ScannerSettings};
use crate::monitoring::{reporter, SnipeSink};

/// Fixed delay between the end of one cycle and the next probe.
pub const CYCLE_DELAY_SECS: u64 = 30;

/// Drives repeated scan cycles: probe, fetch, filter, report, sleep.
/// Nothing a cycle does can stop the loop; only process termination does.
pub struct SniperScheduler {
    scanner: SnapshotScanner,
    settings_path: PathBuf,
    sink: Arc<dyn SnipeSink>,
    health: HealthChecker,
}

impl SniperScheduler {
    pub fn new(
        scanner: SnapshotScanner,
        settings_path: PathBuf,
        sink: Arc<dyn SnipeSink>,
        health: HealthChecker,
    ) -> Self {
        Self {
            scanner,
            settings_path,
            sink,
            health,
        }
    }

    /// One cycle: reload settings, scan, durably log every accepted
    /// candidate. Settings are re-read here so edits apply at the next
    /// cycle boundary, never mid-cycle.
    pub async fn run_once(&self) -> ScanOutcome {
        let settings = ScannerSettings::load(&self.settings_path);
        let gates = FilterGates::from_settings(&settings);

        tracing::info!(
            "💰 Scanning with budget {} coins, min profit {:.0}%",
            settings.budget,
            settings.min_profit_percent
        );

        let outcome = self.scanner.run_cycle(&gates).await;

        for candidate in &outcome.candidates {
            if let Err(e) = self.sink.record_snipe(candidate).await {
                tracing::error!("❌ Failed to log snipe {}: {}", candidate.listing_id, e);
            }
        }

        outcome
    }

    pub async fn run(&self) -> Result<()> {
        let mut cycle: u64 = 0;

        loop {
            cycle += 1;

            let outcome = self.run_once().await;
            println!("{}", reporter::render_cycle(&outcome));
            self.health.record_cycle(cycle, &outcome).await;

            tracing::info!(
                "✅ Cycle {} complete: {} candidates, {}/{} pages ({:.0}% coverage), {}ms",
                cycle,
                outcome.candidates.len(),
                outcome.pages_fetched,
                outcome.total_pages,
                outcome.coverage() * 100.0,
                outcome.duration_ms
            );

            tokio::time::sleep(Duration::from_secs(CYCLE_DELAY_SECS)).await;
        }
    }
}

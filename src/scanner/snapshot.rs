use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, Semaphore};

use super::filter::{select_candidates, Candidate, FilterGates};
use super::ledger::{Observation, PriceLedger};
use super::normalizer::normalize;
use crate::api::{Auction, AuctionPageSource};

/// Width of the bounded fetch pool: at most this many page requests are
/// in flight at once.
pub const FETCH_WORKERS: usize = 10;

/// Listings whose lore carries this marker belong to the decorative
/// furniture category and are excluded from price comparison.
const FURNITURE_MARKER: &str = "Furniture";

/// Everything one scan cycle produced, plus the coverage counters that
/// qualify how much of the snapshot it actually saw.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub candidates: Vec<Candidate>,
    pub pages_fetched: u64,
    pub total_pages: u64,
    pub reference_timestamp: i64,
    pub duration_ms: u64,
}

impl ScanOutcome {
    /// Pages fetched over pages known. Zero when the probe found nothing,
    /// so consumers treat an empty cycle as untrusted rather than complete.
    pub fn coverage(&self) -> f64 {
        if self.total_pages == 0 {
            0.0
        } else {
            self.pages_fetched as f64 / self.total_pages as f64
        }
    }
}

/// Aggregation state for one cycle, shared by the fetch tasks. Freshly
/// constructed per cycle and discarded after filtering.
#[derive(Default)]
struct CycleState {
    ledger: PriceLedger,
    observations: Vec<Observation>,
}

pub struct SnapshotScanner {
    source: Arc<dyn AuctionPageSource>,
    fetch_workers: usize,
}

impl SnapshotScanner {
    pub fn new(source: Arc<dyn AuctionPageSource>) -> Self {
        Self {
            source,
            fetch_workers: FETCH_WORKERS,
        }
    }

    /// One full pass over the snapshot: probe the page count, fan out
    /// bounded-concurrency fetches, aggregate into the per-cycle ledger,
    /// then filter the retained observations against the completed ledger.
    /// A failed page contributes nothing; nothing here aborts the cycle.
    pub async fn run_cycle(&self, gates: &FilterGates) -> ScanOutcome {
        let started = Instant::now();

        let probe = self.source.probe().await;
        if probe.total_pages == 0 {
            tracing::warn!("Probe found no pages, skipping cycle");
            return ScanOutcome {
                duration_ms: started.elapsed().as_millis() as u64,
                ..ScanOutcome::default()
            };
        }

        tracing::info!(
            "🔍 Scanning {} pages (snapshot updated at {})",
            probe.total_pages,
            probe.last_updated
        );

        let state = Arc::new(Mutex::new(CycleState::default()));
        let semaphore = Arc::new(Semaphore::new(self.fetch_workers));

        let mut tasks = Vec::with_capacity(probe.total_pages as usize);
        for page in 0..probe.total_pages {
            let source = self.source.clone();
            let state = state.clone();
            let semaphore = semaphore.clone();
            let known_total = probe.total_pages;

            tasks.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return false,
                };

                let fetched = source.fetch_page(page).await;
                if !fetched.success {
                    return false;
                }

                // The snapshot can grow while we scan it. The task set was
                // fixed at probe time; late pages wait for the next cycle.
                if fetched.reported_total_pages > known_total {
                    tracing::debug!(
                        "Snapshot grew mid-cycle ({} -> {} pages), extra pages deferred",
                        known_total,
                        fetched.reported_total_pages
                    );
                }

                let mut state = state.lock().await;
                for auction in &fetched.auctions {
                    if !qualifies(auction) {
                        continue;
                    }
                    let key = normalize(&auction.item_name, &auction.tier);
                    state.ledger.observe(&key, auction.starting_bid);
                    state.observations.push(Observation {
                        listing_id: auction.uuid.clone(),
                        item_name: auction.item_name.clone(),
                        price: auction.starting_bid,
                        identity_key: key,
                        start_time: auction.start,
                    });
                }
                true
            }));
        }

        let results = join_all(tasks).await;
        let pages_fetched = results
            .iter()
            .filter(|joined| matches!(joined, Ok(true)))
            .count() as u64;

        let CycleState {
            ledger,
            observations,
        } = std::mem::take(&mut *state.lock().await);

        tracing::debug!(
            "Aggregated {} observations across {} identity keys",
            observations.len(),
            ledger.len()
        );

        let candidates = select_candidates(&observations, &ledger, probe.last_updated, gates);

        ScanOutcome {
            candidates,
            pages_fetched,
            total_pages: probe.total_pages,
            reference_timestamp: probe.last_updated,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// A listing enters the ledger iff it is a fixed-price offer, unclaimed,
/// and not furniture-category content.
fn qualifies(auction: &Auction) -> bool {
    auction.bin
        && !auction.claimed
        && !auction
            .item_lore
            .as_deref()
            .unwrap_or("")
            .contains(FURNITURE_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auction(bin: bool, claimed: bool, lore: Option<&str>) -> Auction {
        Auction {
            uuid: "uuid".to_string(),
            item_name: "Aspect of the End".to_string(),
            tier: "LEGENDARY".to_string(),
            starting_bid: 100_000,
            claimed,
            bin,
            start: 0,
            item_lore: lore.map(str::to_string),
        }
    }

    #[test]
    fn only_unclaimed_bin_listings_qualify() {
        assert!(qualifies(&auction(true, false, None)));
        assert!(!qualifies(&auction(false, false, None)));
        assert!(!qualifies(&auction(true, true, None)));
    }

    #[test]
    fn furniture_lore_is_excluded() {
        assert!(!qualifies(&auction(true, false, Some("§aFurniture§r"))));
        assert!(qualifies(&auction(true, false, Some("§7A sharp sword"))));
    }
}

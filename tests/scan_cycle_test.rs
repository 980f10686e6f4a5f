use async_trait::async_trait;
use mockall::mock;
use std::sync::Arc;

use skyblock_auction_sniper::api::{Auction, AuctionPageSource, PageFetch, ProbeResult};
use skyblock_auction_sniper::core::{HealthChecker, ScannerSettings};
use skyblock_auction_sniper::monitoring::SnipeLog;
use skyblock_auction_sniper::scanner::{FilterGates, SnapshotScanner, SniperScheduler};

mock! {
    PageSource {}

    #[async_trait]
    impl AuctionPageSource for PageSource {
        async fn probe(&self) -> ProbeResult;
        async fn fetch_page(&self, page: u64) -> PageFetch;
    }
}

const SNAPSHOT_TS: i64 = 1_700_000_000_000;

fn bin_auction(uuid: &str, item_name: &str, price: u64) -> Auction {
    Auction {
        uuid: uuid.to_string(),
        item_name: item_name.to_string(),
        tier: "LEGENDARY".to_string(),
        starting_bid: price,
        claimed: false,
        bin: true,
        start: SNAPSHOT_TS,
        item_lore: None,
    }
}

fn page(auctions: Vec<Auction>) -> PageFetch {
    PageFetch {
        auctions,
        reported_total_pages: 0,
        success: true,
    }
}

fn gates(budget_ceiling: u64) -> FilterGates {
    FilterGates {
        price_floor: 5,
        budget_ceiling,
        min_profit_fraction: 0.20,
    }
}

#[tokio::test]
async fn detects_a_flip_across_pages() {
    let mut source = MockPageSource::new();
    source.expect_probe().returning(|| ProbeResult {
        total_pages: 2,
        last_updated: SNAPSHOT_TS,
    });
    source.expect_fetch_page().returning(|index| match index {
        // The cheap listing carries a reforge; both must group under one key.
        0 => {
            let mut claimed = bin_auction("gone", "Aspect of the End", 1_000_000);
            claimed.claimed = true;
            page(vec![
                bin_auction("cheap", "Dirty Aspect of the End", 5_000_000),
                claimed,
            ])
        }
        _ => page(vec![bin_auction("pricey", "Aspect of the End", 8_000_000)]),
    });

    let scanner = SnapshotScanner::new(Arc::new(source));
    let outcome = scanner.run_cycle(&gates(10_000_000)).await;

    assert_eq!(outcome.pages_fetched, 2);
    assert!((outcome.coverage() - 1.0).abs() < f64::EPSILON);

    assert_eq!(outcome.candidates.len(), 1);
    let candidate = &outcome.candidates[0];
    assert_eq!(candidate.listing_id, "cheap");
    assert_eq!(candidate.item_name, "Dirty Aspect of the End");
    assert_eq!(candidate.second_lowest_price, 8_000_000);
    assert_eq!(candidate.suggested_price, 7_440_000);
    assert_eq!(candidate.profit, 2_440_000);
}

#[tokio::test]
async fn a_failed_page_does_not_stop_the_cycle() {
    let mut source = MockPageSource::new();
    source.expect_probe().returning(|| ProbeResult {
        total_pages: 3,
        last_updated: SNAPSHOT_TS,
    });
    source.expect_fetch_page().returning(|index| match index {
        0 => page(vec![bin_auction("cheap", "Dirty Aspect of the End", 5_000_000)]),
        1 => PageFetch::default(),
        _ => page(vec![bin_auction("pricey", "Aspect of the End", 8_000_000)]),
    });

    let scanner = SnapshotScanner::new(Arc::new(source));
    let outcome = scanner.run_cycle(&gates(10_000_000)).await;

    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.total_pages, 3);
    assert!((outcome.coverage() - 2.0 / 3.0).abs() < 1e-9);

    // Candidates from the surviving pages are still produced.
    assert_eq!(outcome.candidates.len(), 1);
    assert_eq!(outcome.candidates[0].listing_id, "cheap");
}

#[tokio::test]
async fn an_exhausted_probe_yields_a_trivial_cycle() {
    let mut source = MockPageSource::new();
    source.expect_probe().returning(ProbeResult::default);
    // No fetch_page expectation: fetching a page here would panic the test.

    let scanner = SnapshotScanner::new(Arc::new(source));
    let outcome = scanner.run_cycle(&gates(10_000_000)).await;

    assert!(outcome.candidates.is_empty());
    assert_eq!(outcome.total_pages, 0);
    assert_eq!(outcome.coverage(), 0.0);
}

#[tokio::test]
async fn scheduler_appends_accepted_candidates_to_the_snipe_log() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("config.json");
    ScannerSettings {
        budget: 10_000_000,
        min_profit_percent: 20.0,
    }
    .save(&settings_path)
    .unwrap();

    let mut source = MockPageSource::new();
    source.expect_probe().returning(|| ProbeResult {
        total_pages: 1,
        last_updated: SNAPSHOT_TS,
    });
    source.expect_fetch_page().returning(|_| {
        page(vec![
            bin_auction("cheap", "Dirty Aspect of the End", 5_000_000),
            bin_auction("pricey", "Aspect of the End", 8_000_000),
        ])
    });

    let sink = Arc::new(SnipeLog::open(dir.path().join("snipes_log.txt")).unwrap());
    let scheduler = SniperScheduler::new(
        SnapshotScanner::new(Arc::new(source)),
        settings_path,
        sink.clone(),
        HealthChecker::new(),
    );

    let outcome = scheduler.run_once().await;
    assert_eq!(outcome.candidates.len(), 1);

    let rows = sink.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].item_name, "Dirty Aspect of the End");
    assert_eq!(rows[0].snipe_price, 5_000_000);
    assert_eq!(rows[0].suggested_price, 7_440_000);
    assert_eq!(rows[0].uuid, "cheap");
}

#[tokio::test]
async fn scheduler_respects_the_configured_budget_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("config.json");
    // Default budget is 1m; both listings are over it.
    ScannerSettings::default().save(&settings_path).unwrap();

    let mut source = MockPageSource::new();
    source.expect_probe().returning(|| ProbeResult {
        total_pages: 1,
        last_updated: SNAPSHOT_TS,
    });
    source.expect_fetch_page().returning(|_| {
        page(vec![
            bin_auction("cheap", "Dirty Aspect of the End", 5_000_000),
            bin_auction("pricey", "Aspect of the End", 8_000_000),
        ])
    });

    let sink = Arc::new(SnipeLog::open(dir.path().join("snipes_log.txt")).unwrap());
    let scheduler = SniperScheduler::new(
        SnapshotScanner::new(Arc::new(source)),
        settings_path,
        sink.clone(),
        HealthChecker::new(),
    );

    let outcome = scheduler.run_once().await;
    assert!(outcome.candidates.is_empty());
    assert!(sink.rows().unwrap().is_empty());
}

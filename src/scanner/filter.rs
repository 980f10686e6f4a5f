use serde::Serialize;

use super::ledger::{Observation, PriceLedger};
use crate::core::ScannerSettings;

/// Listings at or below this price are junk offers, not flips.
pub const PRICE_FLOOR: u64 = 5;

/// A listing must have appeared within this window of the snapshot's
/// reference timestamp to be worth racing for.
pub const FRESHNESS_WINDOW_MS: i64 = 60_000;

/// Undercut factor applied to the second-lowest comparable price when
/// suggesting a relist price.
const UNDERCUT_FACTOR: f64 = 0.93;

#[derive(Debug, Clone, Copy)]
pub struct FilterGates {
    pub price_floor: u64,
    pub budget_ceiling: u64,
    pub min_profit_fraction: f64,
}

impl FilterGates {
    pub fn from_settings(settings: &ScannerSettings) -> Self {
        Self {
            price_floor: PRICE_FLOOR,
            budget_ceiling: settings.budget,
            min_profit_fraction: settings.min_profit_fraction(),
        }
    }
}

/// A listing cheap enough, relative to the next-cheapest comparable
/// listing, to resell at a profit above the configured threshold.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub listing_id: String,
    pub item_name: String,
    pub price: u64,
    pub identity_key: String,
    pub second_lowest_price: u64,
    pub suggested_price: u64,
    pub profit: u64,
}

/// Recommended relist price: undercut the second-lowest comparable BIN by
/// 7%, or by at least one coin.
pub fn suggested_price(second_lowest: u64) -> u64 {
    let undercut = (second_lowest as f64 * UNDERCUT_FACTOR) as u64;
    undercut.min(second_lowest - 1)
}

/// Re-evaluate every retained observation against the completed ledger,
/// in encounter order. Ledger population was unconditional on the price
/// gates, so an over-budget listing can still have set someone else's
/// second-lowest price; the gates below apply only at admission time.
pub fn select_candidates(
    observations: &[Observation],
    ledger: &PriceLedger,
    reference_timestamp: i64,
    gates: &FilterGates,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for obs in observations {
        let Some(entry) = ledger.get(&obs.identity_key) else {
            continue;
        };

        // Admission gates: price bounds on the group's lowest price, a
        // floor on the comparison price, and listing freshness. All strict.
        if entry.lowest <= gates.price_floor || entry.lowest >= gates.budget_ceiling {
            continue;
        }
        if entry.second_lowest.is_some_and(|second| second <= gates.price_floor) {
            continue;
        }
        if obs.start_time + FRESHNESS_WINDOW_MS <= reference_timestamp {
            continue;
        }

        // Only the cheapest offer in the group is a flip candidate, and
        // only when a comparison price exists.
        if obs.price != entry.lowest {
            continue;
        }
        let Some(second_lowest) = entry.second_lowest else {
            continue;
        };

        let suggested = suggested_price(second_lowest);
        let profit = suggested as i64 - obs.price as i64;
        if profit <= 0 {
            continue;
        }
        if (profit as f64) / (obs.price as f64) < gates.min_profit_fraction {
            continue;
        }

        candidates.push(Candidate {
            listing_id: obs.listing_id.clone(),
            item_name: obs.item_name.clone(),
            price: obs.price,
            identity_key: obs.identity_key.clone(),
            second_lowest_price: second_lowest,
            suggested_price: suggested,
            profit: profit as u64,
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gates() -> FilterGates {
        FilterGates {
            price_floor: PRICE_FLOOR,
            budget_ceiling: 10_000_000,
            min_profit_fraction: 0.20,
        }
    }

    fn observation(id: &str, key: &str, price: u64, start_time: i64) -> Observation {
        Observation {
            listing_id: id.to_string(),
            item_name: key.to_string(),
            price,
            identity_key: key.to_string(),
            start_time,
        }
    }

    fn ledger_for(observations: &[Observation]) -> PriceLedger {
        let mut ledger = PriceLedger::new();
        for obs in observations {
            ledger.observe(&obs.identity_key, obs.price);
        }
        ledger
    }

    #[test]
    fn undercuts_by_seven_percent_or_one_coin() {
        assert_eq!(suggested_price(1_000_000), 930_000);
        // Small prices: the one-coin undercut wins over the 7% cut.
        assert_eq!(suggested_price(10), 9);
    }

    #[test]
    fn accepts_the_worked_example() {
        let observations = vec![
            observation("cheap", "Aspect of the EndLEGENDARY", 5_000_000, 100),
            observation("pricey", "Aspect of the EndLEGENDARY", 8_000_000, 100),
        ];
        let ledger = ledger_for(&observations);

        let candidates = select_candidates(&observations, &ledger, 0, &gates());

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.listing_id, "cheap");
        assert_eq!(c.second_lowest_price, 8_000_000);
        assert_eq!(c.suggested_price, 7_440_000);
        assert_eq!(c.profit, 2_440_000);
    }

    #[test]
    fn never_emits_above_the_group_lowest() {
        let observations = vec![
            observation("a", "key", 1_000, 100),
            observation("b", "key", 2_000, 100),
            observation("c", "key", 6_000, 100),
        ];
        let ledger = ledger_for(&observations);

        let candidates = select_candidates(&observations, &ledger, 0, &gates());
        for c in &candidates {
            assert_eq!(c.price, ledger.get(&c.identity_key).unwrap().lowest);
        }
    }

    #[test]
    fn rejects_without_comparison_price() {
        let observations = vec![observation("solo", "key", 100_000, 100)];
        let ledger = ledger_for(&observations);

        assert!(select_candidates(&observations, &ledger, 0, &gates()).is_empty());
    }

    #[test]
    fn zero_profit_is_rejected() {
        // suggested = min(93, 99) = 93, price 93 -> profit exactly 0.
        let observations = vec![
            observation("a", "key", 93, 100),
            observation("b", "key", 100, 100),
        ];
        let ledger = ledger_for(&observations);

        assert!(select_candidates(&observations, &ledger, 0, &gates()).is_empty());
    }

    #[test]
    fn profit_fraction_gate_is_strict() {
        // suggested = 930_000; price 775_001 -> profit 154_999,
        // fraction just under 0.20.
        let observations = vec![
            observation("a", "key", 775_001, 100),
            observation("b", "key", 1_000_000, 100),
        ];
        let ledger = ledger_for(&observations);
        assert!(select_candidates(&observations, &ledger, 0, &gates()).is_empty());

        // One coin cheaper clears the gate.
        let observations = vec![
            observation("a", "key", 775_000, 100),
            observation("b", "key", 1_000_000, 100),
        ];
        let ledger = ledger_for(&observations);
        assert_eq!(select_candidates(&observations, &ledger, 0, &gates()).len(), 1);
    }

    #[test]
    fn stale_listings_are_rejected() {
        let reference = 1_700_000_000_000;
        let observations = vec![
            observation("stale", "key", 5_000_000, reference - FRESHNESS_WINDOW_MS),
            observation("b", "key", 8_000_000, reference - FRESHNESS_WINDOW_MS),
        ];
        let ledger = ledger_for(&observations);

        assert!(select_candidates(&observations, &ledger, reference, &gates()).is_empty());
    }

    #[test]
    fn budget_ceiling_is_strict() {
        let mut over = gates();
        over.budget_ceiling = 5_000_000;

        let observations = vec![
            observation("a", "key", 5_000_000, 100),
            observation("b", "key", 8_000_000, 100),
        ];
        let ledger = ledger_for(&observations);

        assert!(select_candidates(&observations, &ledger, 0, &over).is_empty());
    }

    #[test]
    fn floor_gate_rejects_junk_offers() {
        let observations = vec![
            observation("a", "key", 5, 100),
            observation("b", "key", 1_000, 100),
        ];
        let ledger = ledger_for(&observations);

        assert!(select_candidates(&observations, &ledger, 0, &gates()).is_empty());
    }
}

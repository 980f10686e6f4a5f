use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Two lowest prices seen for one identity key during the current cycle.
/// `second_lowest: None` means "+infinity": fewer than two observations so
/// far, so no comparison price exists yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub lowest: u64,
    pub second_lowest: Option<u64>,
}

/// A qualifying listing retained during the fetch phase, re-evaluated
/// against the completed ledger once all pages have arrived.
#[derive(Debug, Clone)]
pub struct Observation {
    pub listing_id: String,
    pub item_name: String,
    pub price: u64,
    pub identity_key: String,
    pub start_time: i64,
}

/// Per-cycle map from identity key to the two lowest observed prices.
/// The update rule is commutative over arrival order, which is what lets
/// concurrent page fetches feed it in any order.
#[derive(Debug, Default)]
pub struct PriceLedger {
    entries: HashMap<String, LedgerEntry>,
}

impl PriceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, key: &str, price: u64) {
        match self.entries.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(LedgerEntry {
                    lowest: price,
                    second_lowest: None,
                });
            }
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                if price < entry.lowest {
                    entry.second_lowest = Some(entry.lowest);
                    entry.lowest = price;
                } else if entry.second_lowest.map_or(true, |second| price < second) {
                    entry.second_lowest = Some(price);
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<LedgerEntry> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

use serde::Deserialize;

/// One page of the auction house snapshot as served by
/// `/skyblock/auctions?page=N`. Required fields are deliberately strict:
/// a payload missing any of them fails deserialization and the page is
/// treated as a data error.
#[derive(Debug, Clone, Deserialize)]
pub struct AuctionsPage {
    pub success: bool,
    #[serde(rename = "lastUpdated")]
    pub last_updated: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    pub auctions: Vec<Auction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auction {
    pub uuid: String,
    pub item_name: String,
    pub tier: String,
    pub starting_bid: u64,
    pub claimed: bool,
    /// Fixed-price (buy-it-now) flag. The API omits it on plain bid
    /// auctions, which is equivalent to `false`.
    #[serde(default)]
    pub bin: bool,
    /// Listing start, epoch millis.
    pub start: i64,
    pub item_lore: Option<String>,
}

/// Snapshot dimensions captured once at cycle start.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeResult {
    pub total_pages: u64,
    pub last_updated: i64,
}

/// Outcome of a single best-effort page fetch. A failed fetch degrades to
/// `success: false` with no listings rather than an error.
#[derive(Debug, Clone, Default)]
pub struct PageFetch {
    pub auctions: Vec<Auction>,
    pub reported_total_pages: u64,
    pub success: bool,
}

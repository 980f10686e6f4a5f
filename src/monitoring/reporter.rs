use chrono::NaiveDateTime;
use std::collections::HashMap;

use super::logs::SnipeRow;
use super::sell_tracker::{AuctionRow, SaleRow};
use crate::scanner::ScanOutcome;

const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const MAGENTA: &str = "\x1b[35m";
const RESET: &str = "\x1b[0m";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Compact coin rendering: 5_300_000 -> "5.3m", 4_500 -> "4.5k".
pub fn format_price(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{}m", trim_decimal(n as f64 / 1_000_000.0))
    } else if n >= 1_000 {
        format!("{}k", trim_decimal(n as f64 / 1_000.0))
    } else {
        n.to_string()
    }
}

fn trim_decimal(value: f64) -> String {
    format!("{:.1}", value)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Parse human coin amounts like "5.2m 400k" or "1,250,000". Terms are
/// whitespace-separated and summed; unparsable terms are ignored.
pub fn parse_coin_amount(text: &str) -> u64 {
    let cleaned = text.to_lowercase().replace(',', "");
    let mut total = 0.0f64;

    for part in cleaned.split_whitespace() {
        let (digits, multiplier) = if let Some(stripped) = part.strip_suffix('m') {
            (stripped, 1_000_000.0)
        } else if let Some(stripped) = part.strip_suffix('k') {
            (stripped, 1_000.0)
        } else {
            (part, 1.0)
        };
        if let Ok(value) = digits.parse::<f64>() {
            total += value * multiplier;
        }
    }

    total as u64
}

/// End-of-cycle candidate report, one block per accepted snipe, always
/// followed by the coverage line.
pub fn render_cycle(outcome: &ScanOutcome) -> String {
    let mut out = String::new();

    if outcome.candidates.is_empty() {
        out.push_str("No good flips found right now.\n");
    } else {
        out.push_str("\n========== SNIPES FOUND ==========\n\n");
        for (i, c) in outcome.candidates.iter().enumerate() {
            out.push_str(&format!("{}Auction {}:{}\n", YELLOW, i + 1, RESET));
            out.push_str(&format!("Auction UUID: {}\n", c.listing_id));
            out.push_str(&format!("Item Name: {}\n", c.item_name));
            out.push_str(&format!("Item Price: {}\n", format_price(c.price)));
            out.push_str(&format!(
                "Second Lowest BIN: {}\n",
                format_price(c.second_lowest_price)
            ));
            out.push_str(&format!("{}/viewauction {}{}\n", CYAN, c.listing_id, RESET));
            out.push_str(&format!(
                "{}💡 Recommended BIN Price: {}\n",
                GREEN,
                format_price(c.suggested_price)
            ));
            out.push_str(&format!(
                "📈 Profit if flipped: {}{}\n",
                format_price(c.profit),
                RESET
            ));
            out.push_str("----------------------------------\n");
        }
    }

    out.push_str(&format!(
        "Scanned {} of {} pages ({:.0}% coverage)\n",
        outcome.pages_fetched,
        outcome.total_pages,
        outcome.coverage() * 100.0
    ));
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendLine {
    pub item_name: String,
    pub flips: usize,
    pub avg_profit: i64,
}

/// Top flip suggestions since `since`, by suggestion count, with the
/// average projected profit per item.
pub fn trend_summary(rows: &[SnipeRow], since: NaiveDateTime) -> Vec<TrendLine> {
    let mut grouped: HashMap<&str, (usize, i64)> = HashMap::new();
    for row in rows.iter().filter(|row| row.timestamp > since) {
        let entry = grouped.entry(row.item_name.as_str()).or_default();
        entry.0 += 1;
        entry.1 += row.suggested_price as i64 - row.snipe_price as i64;
    }

    let mut lines: Vec<TrendLine> = grouped
        .into_iter()
        .map(|(name, (flips, total_profit))| TrendLine {
            item_name: name.to_string(),
            flips,
            avg_profit: total_profit / flips as i64,
        })
        .collect();

    lines.sort_by(|a, b| {
        b.flips
            .cmp(&a.flips)
            .then_with(|| b.avg_profit.cmp(&a.avg_profit))
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    lines.truncate(10);
    lines
}

pub fn render_trends(rows: &[SnipeRow], since: NaiveDateTime, days: i64) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}📈 Real Trends (Last {} Days){}\n{}\n",
        MAGENTA, days, RESET, RULE
    ));

    let lines = trend_summary(rows, since);
    if lines.is_empty() {
        out.push_str("No flip suggestions found yet.\n");
        return out;
    }

    out.push_str(&format!("{}Top 10 Most Suggested Flips:{}\n", CYAN, RESET));
    for line in &lines {
        out.push_str(&format!(
            "  {}{}{} — Flips: {} — Avg. Profit: {}{}{}\n",
            YELLOW,
            line.item_name,
            RESET,
            line.flips,
            GREEN,
            format_price(line.avg_profit.max(0) as u64),
            RESET
        ));
    }
    out
}

/// Portfolio view: every listed auction, newest first, joined by item
/// name against the latest snipe suggestion and the latest completed sale.
pub fn render_portfolio(auctions: &[AuctionRow], snipes: &[SnipeRow], sales: &[SaleRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}💼 Your Flip Portfolio{}\n{}\n",
        MAGENTA, RESET, RULE
    ));

    if auctions.is_empty() {
        out.push_str("No portfolio entries yet.\n");
        return out;
    }

    for auction in auctions.iter().rev() {
        let date_label = auction
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "Unknown Date".to_string());
        out.push_str(&format!(
            "{}{} — {}{}\n",
            YELLOW, date_label, auction.item_name, RESET
        ));

        let snipe = snipes
            .iter()
            .rev()
            .find(|row| row.item_name == auction.item_name);

        let buy_price = snipe.map(|row| row.snipe_price).unwrap_or(auction.listed_price);
        out.push_str(&format!("  Bought for: {}\n", format_price(buy_price)));

        if let Some(snipe) = snipe {
            out.push_str(&format!(
                "  Suggested BIN: {}\n",
                format_price(snipe.suggested_price)
            ));
            out.push_str(&format!(
                "  2nd Lowest BIN: {}\n",
                format_price(snipe.second_lowest)
            ));
        }

        out.push_str(&format!(
            "  Listed Price: {}\n",
            format_price(auction.listed_price)
        ));

        let sale = auction.sold.then(|| {
            sales
                .iter()
                .rev()
                .find(|row| row.item_name == auction.item_name)
        });
        match sale.flatten() {
            Some(sale) => {
                out.push_str(&format!(
                    "  SOLD FOR: {}{}{}\n",
                    GREEN,
                    format_price(sale.sell_price),
                    RESET
                ));
                if let Some(snipe) = snipe {
                    let expected = snipe.suggested_price as i64 - snipe.snipe_price as i64;
                    out.push_str(&format!(
                        "  Expected Profit: {}{}{}\n",
                        YELLOW,
                        format_price(expected.max(0) as u64),
                        RESET
                    ));
                }
                out.push_str(&format!(
                    "  Actual Profit:   {}{}{}\n",
                    GREEN,
                    format_price(sale.profit.max(0) as u64),
                    RESET
                ));
            }
            None => {
                out.push_str(&format!("{}  Not yet sold{}\n", CYAN, RESET));
            }
        }

        out.push_str("----------------------------------\n");
    }
    out
}

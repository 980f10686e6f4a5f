use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDateTime};

use super::logs::{AuditLog, SnipeLog, SnipeRow, AUCTION_COLUMNS, SALES_COLUMNS, TIMESTAMP_FORMAT};
use crate::core::config::LogConfig;

/// One row of the listed-auctions log.
#[derive(Debug, Clone)]
pub struct AuctionRow {
    pub timestamp: Option<NaiveDateTime>,
    pub item_name: String,
    pub listed_price: u64,
    pub sold: bool,
}

impl AuctionRow {
    fn parse(fields: &[String]) -> Option<Self> {
        if fields.len() < 4 {
            return None;
        }
        Some(Self {
            timestamp: NaiveDateTime::parse_from_str(&fields[0], TIMESTAMP_FORMAT).ok(),
            item_name: fields[1].clone(),
            listed_price: fields[2].parse().ok()?,
            sold: fields[3] == "Yes",
        })
    }
}

/// One row of the completed-sales log.
#[derive(Debug, Clone)]
pub struct SaleRow {
    pub timestamp: Option<NaiveDateTime>,
    pub item_name: String,
    pub buy_price: u64,
    pub sell_price: u64,
    pub profit: i64,
}

impl SaleRow {
    fn parse(fields: &[String]) -> Option<Self> {
        if fields.len() < 5 {
            return None;
        }
        Some(Self {
            timestamp: NaiveDateTime::parse_from_str(&fields[0], TIMESTAMP_FORMAT).ok(),
            item_name: fields[1].clone(),
            buy_price: fields[2].parse().ok()?,
            sell_price: fields[3].parse().ok()?,
            profit: fields[4].parse().ok()?,
        })
    }
}

/// Confirmation of a completed `mark_sold`.
#[derive(Debug, Clone)]
pub struct SaleReceipt {
    pub item_name: String,
    pub buy_price: u64,
    pub sold_price: u64,
    pub profit: i64,
}

/// Records listed auctions and completed sales against the audit logs.
pub struct SellTracker {
    auctions: AuditLog,
    sales: AuditLog,
    snipes: SnipeLog,
}

impl SellTracker {
    pub fn open(logs: &LogConfig) -> Result<Self> {
        Ok(Self {
            // Older versions wrote auction rows without the Sold flag;
            // repair pads those with "No".
            auctions: AuditLog::open(&logs.auctions_path, AUCTION_COLUMNS, Some("No"))?,
            sales: AuditLog::open(&logs.sales_path, SALES_COLUMNS, None)?,
            snipes: SnipeLog::open(&logs.snipes_path)?,
        })
    }

    pub fn record_auction(&self, item_name: &str, listed_price: u64) -> Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.auctions.append(&[
            timestamp,
            item_name.to_string(),
            listed_price.to_string(),
            "No".to_string(),
        ])
    }

    pub fn record_sale(&self, item_name: &str, buy_price: u64, sell_price: u64) -> Result<i64> {
        let profit = sell_price as i64 - buy_price as i64;
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.sales.append(&[
            timestamp,
            item_name.to_string(),
            buy_price.to_string(),
            sell_price.to_string(),
            profit.to_string(),
        ])?;
        tracing::info!(
            "[✔] Logged: {} → Sold for {} (Profit: {})",
            item_name,
            sell_price,
            profit
        );
        Ok(profit)
    }

    /// Flip the oldest unsold auction for `item_name` to sold and record
    /// the sale. The buy price comes from the latest matching snipe-log
    /// row; the listed price is the fallback.
    pub fn mark_sold(&self, item_name: &str, sold_price: u64) -> Result<SaleReceipt> {
        let mut rows = self.auctions.rows()?;
        let idx = rows
            .iter()
            .position(|row| row.len() >= 4 && row[1] == item_name && row[3] != "Yes")
            .ok_or_else(|| anyhow!("no unsold auction found for {}", item_name))?;

        let buy_price = self
            .snipe_rows()?
            .iter()
            .rev()
            .find(|snipe| snipe.item_name == item_name)
            .map(|snipe| snipe.snipe_price)
            .unwrap_or_else(|| rows[idx][2].parse().unwrap_or(0));

        rows[idx][3] = "Yes".to_string();
        self.auctions.rewrite(&rows)?;

        let profit = self.record_sale(item_name, buy_price, sold_price)?;
        Ok(SaleReceipt {
            item_name: item_name.to_string(),
            buy_price,
            sold_price,
            profit,
        })
    }

    pub fn auction_rows(&self) -> Result<Vec<AuctionRow>> {
        Ok(self
            .auctions
            .rows()?
            .iter()
            .filter_map(|fields| AuctionRow::parse(fields))
            .collect())
    }

    pub fn sale_rows(&self) -> Result<Vec<SaleRow>> {
        Ok(self
            .sales
            .rows()?
            .iter()
            .filter_map(|fields| SaleRow::parse(fields))
            .collect())
    }

    pub fn snipe_rows(&self) -> Result<Vec<SnipeRow>> {
        self.snipes.rows()
    }
}

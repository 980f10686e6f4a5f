use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::scanner::Candidate;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const SNIPE_COLUMNS: &[&str] = &[
    "Item Name",
    "Snipe Price",
    "Suggested BIN",
    "Second Lowest BIN",
    "Timestamp",
    "UUID",
];
pub const AUCTION_COLUMNS: &[&str] = &["Timestamp", "Item Name", "Listed Price", "Sold"];
pub const SALES_COLUMNS: &[&str] = &["Timestamp", "Item Name", "Buy Price", "Sell Price", "Profit"];

lazy_static! {
    static ref TIMESTAMP_RE: Regex =
        Regex::new(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}").unwrap();
}

/// Append-only sink for accepted candidates. The scanner calls this once
/// per accepted candidate and never reads it back.
#[async_trait]
pub trait SnipeSink: Send + Sync {
    async fn record_snipe(&self, candidate: &Candidate) -> Result<()>;
}

/// One comma-separated audit file with a fixed header. Older runs of the
/// tool left these files in inconsistent shapes, so opening a log always
/// repairs it first.
pub struct AuditLog {
    path: PathBuf,
    columns: &'static [&'static str],
    pad: Option<&'static str>,
}

impl AuditLog {
    pub fn open(
        path: impl Into<PathBuf>,
        columns: &'static [&'static str],
        pad: Option<&'static str>,
    ) -> Result<Self> {
        let log = Self {
            path: path.into(),
            columns,
            pad,
        };
        log.repair()
            .with_context(|| format!("repairing {}", log.path.display()))?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn header(&self) -> String {
        self.columns.join(",")
    }

    /// Bring the file back to a parseable shape:
    /// - create a missing file with just the header
    /// - split a header that got glued to its first data row (recognized
    ///   by a timestamp inside the first line)
    /// - force-replace any other wrong header
    /// - pad short data rows up to the column count when a pad value is set
    fn repair(&self) -> Result<()> {
        let header = self.header();

        if !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&self.path, format!("{}\n", header))?;
            return Ok(());
        }

        let raw = fs::read_to_string(&self.path)?;
        let mut lines: Vec<String> = raw.lines().map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(header.clone());
        }

        let first = lines[0].clone();
        if first.starts_with(&header) && first != header {
            if TIMESTAMP_RE.is_match(&first) {
                let data_part = first[header.len()..].trim_start_matches(',').to_string();
                lines[0] = data_part;
                lines.insert(0, header.clone());
            } else {
                // Unknown garble, force-replace the header.
                lines[0] = header.clone();
            }
        } else if first != header {
            lines[0] = header.clone();
        }

        if let Some(pad) = self.pad {
            for line in lines.iter_mut().skip(1) {
                let field_count = line.split(',').count();
                for _ in field_count..self.columns.len() {
                    line.push(',');
                    line.push_str(pad);
                }
            }
        }

        fs::write(&self.path, lines.join("\n") + "\n")?;
        Ok(())
    }

    pub fn append(&self, fields: &[String]) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", fields.join(","))?;
        Ok(())
    }

    /// All data rows, naively comma-split. Matches the writer; item names
    /// containing commas are not supported by this log format.
    pub fn rows(&self) -> Result<Vec<Vec<String>>> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(raw
            .lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split(',').map(str::to_string).collect())
            .collect())
    }

    pub fn rewrite(&self, rows: &[Vec<String>]) -> Result<()> {
        let mut out = self.header();
        out.push('\n');
        for row in rows {
            out.push_str(&row.join(","));
            out.push('\n');
        }
        fs::write(&self.path, out)?;
        Ok(())
    }
}

/// One row of the snipe history log.
#[derive(Debug, Clone)]
pub struct SnipeRow {
    pub item_name: String,
    pub snipe_price: u64,
    pub suggested_price: u64,
    pub second_lowest: u64,
    pub timestamp: NaiveDateTime,
    pub uuid: String,
}

impl SnipeRow {
    fn parse(fields: &[String]) -> Option<Self> {
        if fields.len() < 6 {
            return None;
        }
        Some(Self {
            item_name: fields[0].clone(),
            snipe_price: fields[1].parse().ok()?,
            suggested_price: fields[2].parse().ok()?,
            second_lowest: fields[3].parse().ok()?,
            timestamp: NaiveDateTime::parse_from_str(&fields[4], TIMESTAMP_FORMAT).ok()?,
            uuid: fields[5].clone(),
        })
    }
}

/// Durable history of every accepted candidate.
pub struct SnipeLog {
    log: AuditLog,
}

impl SnipeLog {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            log: AuditLog::open(path, SNIPE_COLUMNS, None)?,
        })
    }

    pub fn append(&self, candidate: &Candidate) -> Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.log.append(&[
            candidate.item_name.clone(),
            candidate.price.to_string(),
            candidate.suggested_price.to_string(),
            candidate.second_lowest_price.to_string(),
            timestamp.clone(),
            candidate.listing_id.clone(),
        ])?;
        tracing::info!(
            "[LOGGED] {} → {} at {}",
            candidate.item_name,
            candidate.suggested_price,
            timestamp
        );
        Ok(())
    }

    /// Parsed history rows, oldest first. Malformed rows are skipped.
    pub fn rows(&self) -> Result<Vec<SnipeRow>> {
        Ok(self
            .log
            .rows()?
            .iter()
            .filter_map(|fields| SnipeRow::parse(fields))
            .collect())
    }
}

#[async_trait]
impl SnipeSink for SnipeLog {
    async fn record_snipe(&self, candidate: &Candidate) -> Result<()> {
        self.append(candidate)
    }
}

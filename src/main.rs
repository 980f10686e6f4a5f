use anyhow::{anyhow, Result};
use chrono::{Duration, Local};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use skyblock_auction_sniper::api::HypixelClient;
use skyblock_auction_sniper::core::{self, Config, HealthChecker, ScannerSettings};
use skyblock_auction_sniper::monitoring::{reporter, SellTracker, SnipeLog};
use skyblock_auction_sniper::scanner::{SnapshotScanner, SniperScheduler};

#[derive(Parser)]
#[command(
    name = "skyblock-auction-sniper",
    version,
    about = "BIN snipe scanner for the SkyBlock auction house"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan continuously with a fixed delay between cycles
    Run,
    /// Run exactly one scan cycle and exit
    Scan,
    /// Show the most suggested flips of the recent past
    Trends {
        #[arg(long, default_value_t = 14)]
        days: i64,
    },
    /// Show every listed auction with its outcome
    Portfolio,
    /// Record an auction you listed, e.g. --price "5.2m 400k"
    LogAuction {
        #[arg(long)]
        item: String,
        #[arg(long)]
        price: String,
    },
    /// Mark a listed auction as sold
    MarkSold {
        #[arg(long)]
        item: String,
        #[arg(long)]
        price: String,
    },
    /// Show or update scanner settings
    Config {
        #[arg(long)]
        budget: Option<String>,
        #[arg(long)]
        min_profit: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    core::logging::init_logging(&config.monitoring.log_level);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_loop(config).await,
        Command::Scan => run_single(config).await,
        Command::Trends { days } => show_trends(&config, days),
        Command::Portfolio => show_portfolio(&config),
        Command::LogAuction { item, price } => log_auction(&config, &item, &price),
        Command::MarkSold { item, price } => mark_sold(&config, &item, &price),
        Command::Config { budget, min_profit } => update_settings(&config, budget, min_profit),
    }
}

fn build_scheduler(config: &Config, health: HealthChecker) -> Result<SniperScheduler> {
    let client = Arc::new(HypixelClient::new(&config.api.base_url)?);
    let scanner = SnapshotScanner::new(client);
    let sink = Arc::new(SnipeLog::open(&config.logs.snipes_path)?);

    Ok(SniperScheduler::new(
        scanner,
        config.logs.settings_path.clone(),
        sink,
        health,
    ))
}

async fn run_loop(config: Config) -> Result<()> {
    tracing::info!("🚀 SkyBlock Auction Sniper starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let health = HealthChecker::new();
    let scheduler = build_scheduler(&config, health.clone())?;
    health.update_component("settings", true).await;
    health.update_component("audit_logs", true).await;

    let health_clone = health.clone();
    let port = config.monitoring.health_port;
    tokio::spawn(async move { start_health_server(health_clone, port).await });
    tracing::info!("✅ Health endpoint running on port {}", port);

    scheduler.run().await
}

async fn run_single(config: Config) -> Result<()> {
    let scheduler = build_scheduler(&config, HealthChecker::new())?;
    let outcome = scheduler.run_once().await;
    println!("{}", reporter::render_cycle(&outcome));
    Ok(())
}

fn show_trends(config: &Config, days: i64) -> Result<()> {
    let snipes = SnipeLog::open(&config.logs.snipes_path)?;
    let since = Local::now().naive_local() - Duration::days(days);
    println!("{}", reporter::render_trends(&snipes.rows()?, since, days));
    Ok(())
}

fn show_portfolio(config: &Config) -> Result<()> {
    let tracker = SellTracker::open(&config.logs)?;
    println!(
        "{}",
        reporter::render_portfolio(
            &tracker.auction_rows()?,
            &tracker.snipe_rows()?,
            &tracker.sale_rows()?,
        )
    );
    Ok(())
}

fn log_auction(config: &Config, item: &str, price: &str) -> Result<()> {
    let listed = reporter::parse_coin_amount(price);
    if listed == 0 {
        return Err(anyhow!("invalid price: {}", price));
    }

    let tracker = SellTracker::open(&config.logs)?;
    tracker.record_auction(item, listed)?;
    println!(
        "[✔] Auction logged: {} at {}",
        item,
        reporter::format_price(listed)
    );
    Ok(())
}

fn mark_sold(config: &Config, item: &str, price: &str) -> Result<()> {
    let sold = reporter::parse_coin_amount(price);
    if sold == 0 {
        return Err(anyhow!("invalid price: {}", price));
    }

    let tracker = SellTracker::open(&config.logs)?;
    let receipt = tracker.mark_sold(item, sold)?;
    println!(
        "[✔] Marked {} as sold for {} (profit {})",
        receipt.item_name,
        reporter::format_price(receipt.sold_price),
        receipt.profit
    );
    Ok(())
}

fn update_settings(config: &Config, budget: Option<String>, min_profit: Option<f64>) -> Result<()> {
    let path = &config.logs.settings_path;
    let mut settings = ScannerSettings::load(path);
    let mut changed = false;

    if let Some(raw) = budget {
        let parsed = reporter::parse_coin_amount(&raw);
        if parsed == 0 {
            return Err(anyhow!("invalid budget: {}", raw));
        }
        settings.budget = parsed;
        changed = true;
    }
    if let Some(percent) = min_profit {
        if percent <= 0.0 {
            return Err(anyhow!("min profit must be a positive percentage"));
        }
        settings.min_profit_percent = percent;
        changed = true;
    }

    if changed {
        settings.save(path)?;
    }
    println!("Budget: {} coins", settings.budget);
    println!("Min profit: {:.0}%", settings.min_profit_percent);
    Ok(())
}

async fn start_health_server(health: HealthChecker, port: u16) {
    use warp::Filter;

    let health_for_status = health.clone();
    let health_route = warp::path("health")
        .and(warp::any().map(move || health.clone()))
        .and_then(|checker: HealthChecker| async move {
            let status = checker.get_status().await;
            Ok::<_, warp::Rejection>(warp::reply::json(&status))
        });
    let status_route = warp::path("status")
        .and(warp::any().map(move || health_for_status.clone()))
        .and_then(|checker: HealthChecker| async move {
            let last = checker.last_cycle().await;
            Ok::<_, warp::Rejection>(warp::reply::json(&last))
        });

    warp::serve(health_route.or(status_route))
        .run(([0, 0, 0, 0], port))
        .await;
}

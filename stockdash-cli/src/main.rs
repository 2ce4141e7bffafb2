//! StockDash CLI: one subcommand per dashboard page.
//!
//! Commands:
//! - `analyze`: price history with moving averages, Bollinger bands, RSI and MACD
//! - `quote`: latest price
//! - `portfolio`: value a list of holdings
//! - `suggest`: analyst-rating suggestion
//! - `news`: headlines with sentiment
//! - `trending`: most active large caps
//! - `screener`: fundamentals filter
//! - `tickers`: the name → ticker directory

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use stockdash_core::dashboard::{AnalysisReport, ScoredHeadline, ScreenerReport, SuggestionReport};
use stockdash_core::data::{provider_from_config, CachedProvider, MarketDataProvider, TickerDirectory};
use stockdash_core::domain::{
    CompanyProfile, CorporateActions, DaySnapshot, Financials, Quote, ReportingPeriod, SessionId,
    StatementKind,
};
use stockdash_core::portfolio::{PortfolioValuation, ValuationStatus};
use stockdash_core::screener::{Bounds, ScreenerFilter};
use stockdash_core::session::SessionStore;
use stockdash_core::signals::LexiconScorer;
use stockdash_core::{Dashboard, DashboardConfig, DashboardError};
use tracing_subscriber::EnvFilter;

type Provider = CachedProvider<Box<dyn MarketDataProvider>>;

#[derive(Parser)]
#[command(
    name = "stockdash",
    about = "StockDash CLI: stock analysis, portfolio tracking and screening"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use deterministic synthetic data instead of the network.
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    /// Print results as JSON.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price history with the indicator bundle.
    Analyze {
        /// Ticker or company name from the directory.
        symbol: String,

        /// Start date (YYYY-MM-DD). Defaults to `history_start` from config.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Number of most recent rows to print.
        #[arg(long, default_value_t = 5)]
        rows: usize,

        /// Also show company info, financial statements and institutional holders.
        #[arg(long, default_value_t = false)]
        info: bool,
    },
    /// Latest traded price.
    Quote { symbol: String },
    /// Value holdings given as TICKER:SHARES:PRICE.
    Portfolio {
        #[arg(long = "holding", required = true)]
        holdings: Vec<String>,
    },
    /// Buy/sell/hold suggestion from analyst ratings.
    Suggest { symbol: String },
    /// Headlines with sentiment.
    News { symbol: String },
    /// Most active tickers from the trending list.
    Trending,
    /// Fundamentals screener over the screener list.
    Screener {
        /// Keep only these sectors (repeatable).
        #[arg(long = "sector")]
        sectors: Vec<String>,
        /// Minimum market cap in billions.
        #[arg(long)]
        min_cap: Option<f64>,
        /// Maximum market cap in billions.
        #[arg(long)]
        max_cap: Option<f64>,
        #[arg(long)]
        min_pe: Option<f64>,
        #[arg(long)]
        max_pe: Option<f64>,
        /// Minimum dividend yield in percent.
        #[arg(long)]
        min_div: Option<f64>,
        /// Maximum dividend yield in percent.
        #[arg(long)]
        max_div: Option<f64>,
    },
    /// List the name → ticker directory.
    Tickers,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    if cli.offline {
        config.provider.offline = true;
    }

    let today = chrono::Local::now().date_naive();
    let directory = TickerDirectory::load(config.lists.ticker_file.as_deref())?;
    let provider = provider_from_config(&config.provider, today)?;
    let provider = CachedProvider::new(provider, config.cache.ttl());
    let dashboard = Dashboard::new(provider, config, directory);
    tracing::debug!(provider = dashboard.provider().name(), "dashboard ready");
    let json = cli.json;

    match cli.command {
        Commands::Analyze {
            symbol,
            start,
            end,
            rows,
            info,
        } => {
            let start = parse_date(start.as_deref())?;
            let end = parse_date(end.as_deref())?.unwrap_or(today);
            let report = dashboard.analyze(&symbol, start, end);
            emit(json, report, |r| print_analysis(r, rows))?;
            if info {
                emit(json, dashboard.company_info(&symbol), print_profile)?;
                emit(json, dashboard.financials(&symbol), print_financials)?;
            }
            Ok(())
        }
        Commands::Quote { symbol } => emit(json, dashboard.quote(&symbol), print_quote),
        Commands::Portfolio { holdings } => run_portfolio(&dashboard, &holdings, json),
        Commands::Suggest { symbol } => emit(json, dashboard.suggestion(&symbol), print_suggestion),
        Commands::News { symbol } => {
            let scorer = LexiconScorer::default();
            emit(json, dashboard.news(&symbol, &scorer), |h| print_news(h))
        }
        Commands::Trending => emit(json, dashboard.trending(), |s| print_trending(s)),
        Commands::Screener {
            sectors,
            min_cap,
            max_cap,
            min_pe,
            max_pe,
            min_div,
            max_div,
        } => {
            let filter = ScreenerFilter {
                sectors,
                market_cap_billions: Bounds::new(min_cap, max_cap),
                trailing_pe: Bounds::new(min_pe, max_pe),
                dividend_yield_pct: Bounds::new(min_div, max_div),
            };
            emit(json, dashboard.screener(&filter), print_screener)
        }
        Commands::Tickers => {
            let dir = dashboard.directory();
            if json {
                println!("{}", serde_json::to_string_pretty(dir.entries())?);
            } else {
                println!("{:<24} {:<8}", "Name", "Ticker");
                println!("{}", "-".repeat(33));
                for (name, ticker) in dir.entries() {
                    println!("{name:<24} {ticker:<8}");
                }
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
    })
    .transpose()
}

/// Print a page result. "No data" is a normal outcome, not a failure.
fn emit<T: Serialize>(
    json: bool,
    result: Result<T, DashboardError>,
    print: impl FnOnce(&T),
) -> Result<()> {
    match result {
        Ok(value) if json => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Ok(value) => {
            print(&value);
            Ok(())
        }
        Err(e) if e.is_no_data() => {
            println!("No data available for this input.");
            Ok(())
        }
        Err(e) => bail!(e),
    }
}

fn run_portfolio(dashboard: &Dashboard<Provider>, specs: &[String], json: bool) -> Result<()> {
    let mut store = SessionStore::new();
    let session = SessionId::new("cli");
    store.create(session.clone());

    for spec in specs {
        let parts: Vec<&str> = spec.split(':').collect();
        let [ticker, shares, price] = parts.as_slice() else {
            bail!("invalid holding '{spec}', expected TICKER:SHARES:PRICE");
        };
        let shares: f64 = shares
            .parse()
            .with_context(|| format!("invalid share count in '{spec}'"))?;
        let price: f64 = price
            .parse()
            .with_context(|| format!("invalid purchase price in '{spec}'"))?;
        dashboard.add_holding(&mut store, &session, ticker, shares, price)?;
    }

    let result = dashboard.portfolio(&store, &session);
    store.end(&session);
    emit(json, result, print_portfolio)
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(x) => format!("{x:.decimals$}"),
        None => "-".into(),
    }
}

fn print_analysis(report: &AnalysisReport, rows: usize) {
    let frame = &report.frame;
    println!();
    println!("=== Stock Analysis: {} ===", report.ticker);
    println!("Period:         {} to {}", report.start, report.end);
    println!("Bars:           {}", frame.len());
    println!("Latest Close:   {:.2}", report.latest.close);
    println!("High:           {:.2}", report.latest.high);
    println!("Low:            {:.2}", report.latest.low);
    println!("Volume:         {}", report.latest.volume);
    if let Some(zone) = report.rsi_zone {
        println!("RSI Zone:       {zone:?}");
    }
    if !frame.skipped.is_empty() {
        println!("Not enough history for: {}", frame.skipped.join(", "));
    }
    println!();

    let names: Vec<&String> = frame.columns.keys().collect();
    print!("{:<12} {:>10} {:>14}", "Date", "Close", "Volume");
    for name in &names {
        print!(" {name:>18}");
    }
    println!();
    println!("{}", "-".repeat(38 + names.len() * 19));

    let first = frame.len().saturating_sub(rows);
    for i in first..frame.len() {
        print!(
            "{:<12} {:>10.2} {:>14}",
            frame.dates[i], frame.close[i], frame.volume[i]
        );
        for name in &names {
            print!(" {:>18}", fmt_opt(frame.get(name, i), 2));
        }
        println!();
    }
    println!();

    match &report.corporate_actions {
        Some(actions) => print_corporate_actions(actions),
        None => println!("Dividends and splits could not be retrieved.\n"),
    }
}

fn print_corporate_actions(actions: &CorporateActions) {
    println!("--- Dividends ---");
    if actions.dividends.is_empty() {
        println!("No dividend data available for this stock.");
    }
    for d in &actions.dividends {
        println!("{:<12} {:>10.4}", d.date, d.amount);
    }
    println!();
    println!("--- Stock Splits ---");
    if actions.splits.is_empty() {
        println!("No stock split data available for this stock.");
    }
    for s in &actions.splits {
        println!("{:<12} {}:{}", s.date, s.numerator, s.denominator);
    }
    println!();
}

fn print_financials(f: &Financials) {
    let sections = [
        (StatementKind::Income, "Income Statement"),
        (StatementKind::BalanceSheet, "Balance Sheet"),
        (StatementKind::CashFlow, "Cash Flow Statement"),
    ];
    for (period, label) in [
        (ReportingPeriod::Annual, "Annual"),
        (ReportingPeriod::Quarterly, "Quarterly"),
    ] {
        for (kind, title) in sections {
            println!("--- {title} ({label}) ---");
            let statements = f.statements_for(kind, period);
            if statements.is_empty() {
                println!("Not available.");
                println!();
                continue;
            }
            let mut items: Vec<&String> = statements
                .iter()
                .flat_map(|s| s.items.keys())
                .collect();
            items.sort();
            items.dedup();

            print!("{:<36}", "");
            for s in &statements {
                print!(" {:>16}", s.end_date);
            }
            println!();
            for item in items {
                print!("{item:<36}");
                for s in &statements {
                    print!(" {:>16}", fmt_opt(s.items.get(item).copied(), 0));
                }
                println!();
            }
            println!();
        }
    }

    println!("--- Institutional Shareholders ---");
    if f.institutional_holders.is_empty() {
        println!("Not available.");
    }
    for h in &f.institutional_holders {
        println!(
            "{:<36} {:>12} {:>8}% {:>16}",
            h.organization,
            h.reported.map_or("-".to_string(), |d| d.to_string()),
            fmt_opt(h.pct_held.map(|p| p * 100.0), 2),
            h.shares.map_or("-".to_string(), |n| n.to_string()),
        );
    }
    println!();
}

fn print_profile(p: &CompanyProfile) {
    println!("--- Company Info ---");
    println!("Name:           {}", p.display_name());
    println!("Sector:         {}", p.display_sector());
    println!("Industry:       {}", p.industry.as_deref().unwrap_or("N/A"));
    println!(
        "Employees:      {}",
        p.employees.map_or("N/A".to_string(), |e| e.to_string())
    );
    println!("Website:        {}", p.website.as_deref().unwrap_or("N/A"));
    if let Some(summary) = &p.summary {
        println!();
        println!("{summary}");
    }
    println!();
}

fn print_quote(q: &Quote) {
    println!("{} {:.2}", q.ticker, q.last_price);
}

fn print_portfolio(v: &PortfolioValuation) {
    if v.is_empty() {
        println!("Your portfolio is empty.");
        return;
    }
    println!(
        "{:<8} {:>10} {:>12} {:>12} {:>14} {:>14} {:>12} {:>8}",
        "Ticker", "Shares", "Cost", "Price", "Current Value", "Purchase Value", "Profit/Loss", "Alloc"
    );
    println!("{}", "-".repeat(98));
    for r in &v.rows {
        println!(
            "{:<8} {:>10.2} {:>12.2} {:>12} {:>14.2} {:>14.2} {:>12.2} {:>7}%",
            r.ticker,
            r.shares,
            r.cost_basis,
            fmt_opt(r.last_price, 2),
            r.current_value,
            r.cost_value,
            r.gain,
            fmt_opt(r.allocation.map(|a| a * 100.0), 1),
        );
    }
    println!();
    println!("Total Portfolio Value: ${:.2}", v.total_current);
    println!("Total Purchase Value:  ${:.2}", v.total_cost);
    println!("Total Profit/Loss:     ${:.2}", v.total_gain);
    let missing: Vec<&str> = v
        .rows
        .iter()
        .filter(|r| r.status == ValuationStatus::QuoteUnavailable)
        .map(|r| r.ticker.as_str())
        .collect();
    if !missing.is_empty() {
        println!("WARNING: no current price for {}", missing.join(", "));
    }
}

fn print_suggestion(r: &SuggestionReport) {
    println!("Analyst Recommendations for {}", r.ticker);
    println!("Buy Ratings:  {}", r.summary.buy);
    println!("Sell Ratings: {}", r.summary.sell);
    println!("Hold Ratings: {}", r.summary.hold);
    println!("Suggestion:   {}", r.summary.suggestion);
}

fn print_news(headlines: &[ScoredHeadline]) {
    for h in headlines {
        println!("{}", h.item.title);
        println!("  Source: {} | Link: {}", h.item.publisher, h.item.link);
        println!("  Sentiment: {} (Compound Score: {:.2})", h.sentiment, h.compound);
        println!();
    }
}

fn print_trending(snapshots: &[DaySnapshot]) {
    println!(
        "{:<8} {:<28} {:>10} {:>10} {:>9} {:>14}",
        "Ticker", "Company Name", "Price", "Change", "% Change", "Volume"
    );
    println!("{}", "-".repeat(84));
    for s in snapshots {
        println!(
            "{:<8} {:<28} {:>10.2} {:>10.2} {:>8}% {:>14}",
            s.ticker,
            s.name.as_deref().unwrap_or("N/A"),
            s.close,
            s.change(),
            fmt_opt(s.pct_change(), 2),
            s.volume
        );
    }
}

fn print_screener(r: &ScreenerReport) {
    println!("Showing {} of {} stocks", r.rows.len(), r.total);
    println!("Sectors: {}", r.sectors.join(", "));
    println!(
        "{:<8} {:<28} {:<22} {:>12} {:>8} {:>8}",
        "Ticker", "Company Name", "Sector", "Mkt Cap (B)", "P/E", "Div %"
    );
    println!("{}", "-".repeat(91));
    for row in &r.rows {
        println!(
            "{:<8} {:<28} {:<22} {:>12.1} {:>8.2} {:>8.2}",
            row.ticker,
            row.name,
            row.sector,
            row.market_cap_billions(),
            row.trailing_pe,
            row.dividend_yield_pct
        );
    }
}

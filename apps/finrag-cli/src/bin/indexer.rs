use std::{env, fs, path::PathBuf};

use chrono::Utc;
use finrag_core::config::Config;
use finrag_core::feed::{load_records, RecordFeed};
use finrag_core::types::{NewsRecord, PortfolioRecord, SentimentLabel, StockRecord};
use finrag_embed::provider_from_config;
use finrag_hybrid::SearchEngine;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let args: Vec<String> = env::args().skip(1).collect();
    let mut demo = false; let mut records_dir = None; let mut prefix = None;
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--demo" | "-d" => demo = true,
        "--prefix" => { if i + 1 < args.len() { prefix = Some(args[i + 1].clone()); i += 1; } else { eprintln!("Error: --prefix requires a path"); std::process::exit(1); } }
        _ if !args[i].starts_with('-') => records_dir = Some(PathBuf::from(&args[i])), _ => {} } i += 1; }
    let records_dir = records_dir.unwrap_or_else(|| { let dir: String = config.get("data.records_dir").unwrap_or_else(|_| "./dev_data/records".to_string()); PathBuf::from(dir) });
    let prefix = prefix.unwrap_or_else(|| config.get("data.index_prefix").unwrap_or_else(|_| "./dev_data/index/finrag".to_string()));
    println!("FinRAG Indexer\n==============");
    let provider = provider_from_config(&config);
    let info = provider.info();
    println!("Embedding provider: {} ({}d)", info.name, info.dimension);
    if info.degraded { println!("⚠️  Requested provider unavailable, running degraded"); }
    let feed = if demo {
        println!("📝 Using built-in demo records"); demo_feed()
    } else if records_dir.exists() {
        println!("Records directory: {}", records_dir.display());
        load_records(&records_dir)?
    } else {
        println!("⚠️  {} not found, falling back to demo records", records_dir.display()); demo_feed()
    };
    if feed.is_empty() { eprintln!("Error: no records to index"); std::process::exit(1); }
    let mut engine = SearchEngine::new(provider);
    let pb = ProgressBar::new(feed.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records ({percent}%) {msg}")?
        .progress_chars("#>-"));
    pb.set_message("news"); engine.ingest_news(&feed.news)?; pb.inc(feed.news.len() as u64);
    pb.set_message("stocks"); engine.ingest_stocks(&feed.stocks)?; pb.inc(feed.stocks.len() as u64);
    pb.set_message("portfolio"); engine.ingest_portfolio(&feed.portfolio)?; pb.inc(feed.portfolio.len() as u64);
    pb.finish_with_message("embedded");
    engine.build_index();
    if let Some(parent) = PathBuf::from(&prefix).parent() { if !parent.as_os_str().is_empty() { fs::create_dir_all(parent)?; } }
    let report = engine.save_index(&prefix);
    let stats = engine.get_stats();
    println!("\n✅ Indexing completed");
    println!("📊 {} documents ({} news, {} stocks, {} portfolio), {} keywords", stats.total_documents, stats.news_documents, stats.stock_documents, stats.portfolio_documents, stats.unique_keywords);
    if report.is_complete() { println!("📊 Index saved to {}_*.json", prefix); }
    else {
        println!("⚠️  Partial save: news={} stocks={} portfolio={} keywords={}", report.news, report.stocks, report.portfolio, report.keywords);
    }
    println!("\n💡 To search, use: cargo run --bin finrag-search -- '<query>'");
    println!("💡 To ask, use: cargo run --bin finrag-ask -- '<question>'");
    Ok(())
}

// Small self-contained dataset so the pipeline can be exercised without a
// market-data feed on disk.
fn demo_feed() -> RecordFeed {
    let now = Utc::now().to_rfc3339();
    RecordFeed {
        news: vec![
            NewsRecord { symbol: Some("AAPL".into()), title: "Apple Reports Record Q4 Earnings".into(), summary: "Apple exceeded analyst expectations with strong iPhone sales".into(), url: "https://example.com/apple-earnings".into(), source: "demo".into(), published_at: now.clone(), sentiment_score: 0.6, sentiment_label: SentimentLabel::Positive },
            NewsRecord { symbol: Some("MSFT".into()), title: "Microsoft Azure Growth Accelerates".into(), summary: "Cloud revenue grew faster than expected this quarter".into(), url: "https://example.com/msft-azure".into(), source: "demo".into(), published_at: now.clone(), sentiment_score: 0.4, sentiment_label: SentimentLabel::Positive },
            NewsRecord { symbol: Some("GOOGL".into()), title: "Google Faces New Antitrust Probe".into(), summary: "Regulators opened a fresh investigation into ad practices".into(), url: "https://example.com/googl-probe".into(), source: "demo".into(), published_at: now, sentiment_score: -0.3, sentiment_label: SentimentLabel::Negative },
        ],
        stocks: vec![
            StockRecord { symbol: "AAPL".into(), name: "Apple Inc.".into(), sector: "Technology".into(), price: 175.0, change_percent: 1.2 },
            StockRecord { symbol: "MSFT".into(), name: "Microsoft Corporation".into(), sector: "Technology".into(), price: 350.0, change_percent: 0.8 },
            StockRecord { symbol: "GOOGL".into(), name: "Alphabet Inc.".into(), sector: "Technology".into(), price: 140.0, change_percent: -0.5 },
        ],
        portfolio: vec![
            PortfolioRecord { symbol: "AAPL".into(), company_name: "Apple Inc.".into(), shares: 50.0, avg_cost: 150.0, market_value: 8750.0, sector: Some("Technology".into()) },
            PortfolioRecord { symbol: "MSFT".into(), company_name: "Microsoft Corporation".into(), shares: 30.0, avg_cost: 300.0, market_value: 10500.0, sector: Some("Technology".into()) },
            PortfolioRecord { symbol: "GOOGL".into(), company_name: "Alphabet Inc.".into(), shares: 20.0, avg_cost: 120.0, market_value: 2800.0, sector: Some("Technology".into()) },
        ],
    }
}

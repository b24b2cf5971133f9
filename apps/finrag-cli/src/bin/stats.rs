use std::env;

use finrag_core::config::Config;
use finrag_embed::provider_from_config;
use finrag_hybrid::SearchEngine;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let args: Vec<String> = env::args().skip(1).collect();
    let mut prefix: String = config.get("data.index_prefix").unwrap_or_else(|_| "./dev_data/index/finrag".to_string());
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--prefix" => { if i + 1 < args.len() { prefix = args[i + 1].clone(); i += 1; } else { eprintln!("Error: --prefix requires a path"); std::process::exit(1); } }
        _ if !args[i].starts_with('-') => prefix = args[i].clone(), _ => {} } i += 1; }
    println!("📊 finrag-stats\n===============");
    println!("Index prefix: {}", prefix);
    let mut engine = SearchEngine::new(provider_from_config(&config));
    let report = engine.load_index(&prefix);
    println!("Loaded: news={} stocks={} portfolio={} keywords={}", report.news, report.stocks, report.portfolio, report.keywords);
    let info = engine.embedder_info();
    println!("Embedding provider: {} ({}d){}", info.name, info.dimension, if info.degraded { "  ⚠️ degraded" } else { "" });
    let stats = engine.get_stats();
    println!("\n{}", serde_json::to_string_pretty(&stats)?);
    if stats.total_documents == 0 {
        println!("\n💡 Index is empty. Run: cargo run --bin finrag-indexer -- --demo");
    }
    Ok(())
}

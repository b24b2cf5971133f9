use std::env;

use finrag_core::config::Config;
use finrag_embed::provider_from_config;
use finrag_hybrid::answer::fallback_answer;
use finrag_hybrid::context::build_context;
use finrag_hybrid::SearchEngine;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <question> [--top-k N] [--prefix PATH]", args[0]);
        eprintln!("       {} --sentiment <SYMBOL> [--prefix PATH]", args[0]);
        eprintln!("Example: {} 'what is the price of apple stock'", args[0]);
        std::process::exit(1);
    }
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let mut question = None; let mut sentiment_symbol = None;
    let mut top_k: usize = config.get("engine.default_top_k").unwrap_or(5);
    let mut prefix: String = config.get("data.index_prefix").unwrap_or_else(|_| "./dev_data/index/finrag".to_string());
    let mut i = 1; while i < args.len() { match args[i].as_str() {
        "--sentiment" => { if i + 1 < args.len() { sentiment_symbol = Some(args[i + 1].clone()); i += 1; } else { eprintln!("Error: --sentiment requires a symbol"); std::process::exit(1); } }
        "--top-k" => { if i + 1 < args.len() { if let Ok(k) = args[i + 1].parse::<usize>() { top_k = k; i += 1; } else { eprintln!("Error: --top-k requires a number"); std::process::exit(1); } } else { eprintln!("Error: --top-k requires a number"); std::process::exit(1); } }
        "--prefix" => { if i + 1 < args.len() { prefix = args[i + 1].clone(); i += 1; } else { eprintln!("Error: --prefix requires a path"); std::process::exit(1); } }
        _ if !args[i].starts_with('-') => question = Some(args[i].clone()), _ => {} } i += 1; }
    let mut engine = SearchEngine::new(provider_from_config(&config));
    let report = engine.load_index(&prefix);
    if !report.is_complete() {
        println!("⚠️  Partial index load: news={} stocks={} portfolio={} keywords={}", report.news, report.stocks, report.portfolio, report.keywords);
    }
    if let Some(symbol) = sentiment_symbol {
        let snapshot = engine.sentiment_snapshot(&symbol);
        println!("📊 Sentiment for {}", snapshot.symbol);
        println!("  label: {}", snapshot.label);
        println!("  average score: {:.3} over {} articles", snapshot.average_score, snapshot.news_count);
        for headline in &snapshot.headlines { println!("  • {}", headline); }
        if snapshot.news_count == 0 { println!("  (no indexed news for this symbol)"); }
        return Ok(());
    }
    let question = match question { Some(q) => q, None => { eprintln!("Error: no question given"); std::process::exit(1); } };
    println!("🔍 finrag-ask\n=============");
    println!("Question: {}", question);
    let results = engine.search(&question, top_k, None);
    if !results.is_empty() {
        println!("\n📋 Context:");
        println!("{}", build_context(&results));
    }
    println!("\n💡 {}", fallback_answer(&question, &results));
    Ok(())
}

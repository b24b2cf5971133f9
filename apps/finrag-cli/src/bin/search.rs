use std::env;

use finrag_core::config::Config;
use finrag_core::types::DocType;
use finrag_embed::provider_from_config;
use finrag_hybrid::context::format_document;
use finrag_hybrid::SearchEngine;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [--top-k N] [--types news,stock,portfolio] [--min-score F] [--prefix PATH]", args[0]);
        eprintln!("Example: {} 'apple earnings' --top-k 5 --types news", args[0]);
        std::process::exit(1);
    }
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let query_text = &args[1];
    let mut top_k: usize = config.get("engine.default_top_k").unwrap_or(5);
    let mut types: Option<Vec<DocType>> = None;
    let mut min_score: Option<f32> = None;
    let mut prefix: String = config.get("data.index_prefix").unwrap_or_else(|_| "./dev_data/index/finrag".to_string());
    let mut i = 2; while i < args.len() { match args[i].as_str() {
        "--top-k" => { if i + 1 < args.len() { if let Ok(k) = args[i + 1].parse::<usize>() { top_k = k; i += 1; } else { eprintln!("Error: --top-k requires a number"); std::process::exit(1); } } else { eprintln!("Error: --top-k requires a number"); std::process::exit(1); } }
        "--types" => { if i + 1 < args.len() { match args[i + 1].split(',').map(str::parse).collect::<Result<Vec<DocType>, _>>() { Ok(parsed) => { types = Some(parsed); i += 1; } Err(e) => { eprintln!("Error: {}", e); std::process::exit(1); } } } else { eprintln!("Error: --types requires a list"); std::process::exit(1); } }
        "--min-score" => { if i + 1 < args.len() { if let Ok(s) = args[i + 1].parse::<f32>() { min_score = Some(s); i += 1; } else { eprintln!("Error: --min-score requires a number"); std::process::exit(1); } } else { eprintln!("Error: --min-score requires a number"); std::process::exit(1); } }
        "--prefix" => { if i + 1 < args.len() { prefix = args[i + 1].clone(); i += 1; } else { eprintln!("Error: --prefix requires a path"); std::process::exit(1); } }
        _ => {} } i += 1; }
    println!("🔍 finrag-search\n================");
    println!("Query: {}", query_text); println!("Index prefix: {}", prefix);
    let mut engine = SearchEngine::new(provider_from_config(&config));
    let report = engine.load_index(&prefix);
    if !report.is_complete() {
        println!("⚠️  Partial index load: news={} stocks={} portfolio={} keywords={}", report.news, report.stocks, report.portfolio, report.keywords);
    }
    let stats = engine.get_stats();
    if stats.total_documents == 0 {
        println!("\n⚠️  Index is empty. Run the indexer first: cargo run --bin finrag-indexer -- --demo");
        return Ok(());
    }
    let mut results = engine.search(query_text, top_k, types.as_deref());
    if let Some(floor) = min_score { results.retain(|r| r.score >= floor); }
    println!("\n🔍 Found {} results for: \"{}\"", results.len(), query_text);
    for (i, result) in results.iter().enumerate() {
        println!("\n  {}. score={:.4}  type={}  source={}  id={}", i + 1, result.score, result.document.doc_type(), result.source, result.document.doc_id());
        println!("     📝 {}", format_document(&result.document));
    }
    Ok(())
}

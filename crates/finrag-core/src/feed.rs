//! Batch-file ingestion: reads per-category JSON record arrays from a
//! data directory so the indexer can replay feed snapshots offline.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::{NewsRecord, PortfolioRecord, StockRecord};

/// Everything one ingestion pass feeds into the engine.
#[derive(Debug, Default)]
pub struct RecordFeed {
    pub news: Vec<NewsRecord>,
    pub stocks: Vec<StockRecord>,
    pub portfolio: Vec<PortfolioRecord>,
}

impl RecordFeed {
    pub fn len(&self) -> usize {
        self.news.len() + self.stocks.len() + self.portfolio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load every record batch under `dir`. File names decide the category:
/// `news*.json`, `stocks*.json` and `portfolio*.json` parse as arrays of
/// the matching record type, anything else is skipped. Files are visited
/// in sorted path order so repeated runs ingest identically.
pub fn load_records(dir: &Path) -> Result<RecordFeed> {
    let mut feed = RecordFeed::default();
    for path in list_json_files(dir) {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_lowercase();
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        if stem.starts_with("news") {
            let mut batch: Vec<NewsRecord> = serde_json::from_str(&content)
                .with_context(|| format!("parsing news batch {}", path.display()))?;
            debug!("{}: {} news records", path.display(), batch.len());
            feed.news.append(&mut batch);
        } else if stem.starts_with("stock") {
            let mut batch: Vec<StockRecord> = serde_json::from_str(&content)
                .with_context(|| format!("parsing stock batch {}", path.display()))?;
            debug!("{}: {} stock records", path.display(), batch.len());
            feed.stocks.append(&mut batch);
        } else if stem.starts_with("portfolio") {
            let mut batch: Vec<PortfolioRecord> = serde_json::from_str(&content)
                .with_context(|| format!("parsing portfolio batch {}", path.display()))?;
            debug!("{}: {} portfolio records", path.display(), batch.len());
            feed.portfolio.append(&mut batch);
        } else {
            debug!("skipping unrecognized batch file {}", path.display());
        }
    }
    info!(
        "loaded {} records from {} ({} news, {} stocks, {} portfolio)",
        feed.len(),
        dir.display(),
        feed.news.len(),
        feed.stocks.len(),
        feed.portfolio.len()
    );
    Ok(feed)
}

fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut json_files = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            json_files.push(path.to_path_buf());
        }
    }
    json_files.sort();
    json_files
}

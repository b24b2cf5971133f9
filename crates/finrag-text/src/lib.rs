//! Hand-built inverted keyword index. Complements vector search with
//! exact token matching and keeps working when embeddings cannot.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};

use finrag_core::normalize::tokenize;
use finrag_core::types::KeywordHit;

/// Token -> document-id postings. Postings behave like ordered sets:
/// indexing the same document twice never duplicates an entry, so a
/// document can match a query token at most once and re-indexing cannot
/// inflate scores. Posting order is insertion order, which is what makes
/// equal-score results come back in a stable order.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    postings: BTreeMap<String, Vec<String>>,
}

impl KeywordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `text` for `doc_id`. Tokens are normalized and deduped;
    /// empty text is a no-op.
    pub fn index(&mut self, doc_id: &str, text: &str) {
        for token in tokenize(text) {
            let ids = self.postings.entry(token).or_default();
            if !ids.iter().any(|id| id == doc_id) {
                ids.push(doc_id.to_string());
            }
        }
    }

    /// Score every document that shares at least one token with the
    /// query: matched distinct query tokens divided by the query token
    /// count, so a document matching the whole query scores 1.0. Results
    /// come back sorted descending with ties in first-seen order.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<KeywordHit> {
        let tokens = tokenize(query);
        if tokens.is_empty() || self.postings.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut order: Vec<String> = Vec::new();
        let mut matches: HashMap<String, usize> = HashMap::new();
        for token in &tokens {
            if let Some(ids) = self.postings.get(token) {
                for id in ids {
                    if let Some(count) = matches.get_mut(id) {
                        *count += 1;
                    } else {
                        matches.insert(id.clone(), 1);
                        order.push(id.clone());
                    }
                }
            }
        }

        let total = tokens.len() as f32;
        let mut hits: Vec<KeywordHit> = order
            .into_iter()
            .map(|doc_id| {
                let matched = matches.get(&doc_id).copied().unwrap_or(0);
                KeywordHit { doc_id, score: matched as f32 / total }
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        hits
    }

    pub fn unique_keywords(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn clear(&mut self) {
        self.postings.clear();
    }

    /// Write the postings map as JSON. Failures are logged and reported
    /// as `false` so an operator can retry without losing the index.
    pub fn save(&self, path: &Path) -> bool {
        match self.try_save(path) {
            Ok(()) => {
                info!("saved keyword index ({} tokens) to {}", self.postings.len(), path.display());
                true
            }
            Err(e) => {
                error!("failed to save keyword index to {}: {:#}", path.display(), e);
                false
            }
        }
    }

    /// Replace the postings with the contents of `path`. On any failure
    /// the current postings stay untouched and `false` is returned.
    pub fn load(&mut self, path: &Path) -> bool {
        match self.try_load(path) {
            Ok(postings) => {
                info!("loaded keyword index ({} tokens) from {}", postings.len(), path.display());
                self.postings = postings;
                true
            }
            Err(e) => {
                error!("failed to load keyword index from {}: {:#}", path.display(), e);
                false
            }
        }
    }

    fn try_save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(&self.postings).context("serializing postings")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn try_load(&self, path: &Path) -> Result<BTreeMap<String, Vec<String>>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let postings = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(postings)
    }
}

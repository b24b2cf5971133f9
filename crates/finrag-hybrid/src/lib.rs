//! Hybrid retrieval over the three category stores plus the keyword
//! index: embed once, fan out, merge one ranking, dedup, truncate.

pub mod answer;
pub mod context;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use finrag_core::error::{Error, Result as CoreResult};
use finrag_core::feed::RecordFeed;
use finrag_core::traits::EmbeddingProvider;
use finrag_core::types::{
    DocId, DocType, Document, EngineStats, NewsRecord, PersistReport, PortfolioRecord,
    ProviderInfo, ScoredDocument, SearchSource, SentimentLabel, SentimentSnapshot, StockRecord,
};
use finrag_text::KeywordIndex;
use finrag_vector::DocumentStore;

/// One engine instance owns everything: three vector stores, the keyword
/// index and an injected embedding provider. Construct it at startup and
/// pass it around; there is no global instance.
pub struct SearchEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    dimension: usize,
    news: DocumentStore,
    stocks: DocumentStore,
    portfolio: DocumentStore,
    keywords: KeywordIndex,
}

impl SearchEngine {
    /// The store dimension is taken from the provider, so documents and
    /// queries always agree on vector length.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        let dimension = embedder.dimension();
        Self {
            embedder,
            dimension,
            news: DocumentStore::new(DocType::News, dimension),
            stocks: DocumentStore::new(DocType::Stock, dimension),
            portfolio: DocumentStore::new(DocType::Portfolio, dimension),
            keywords: KeywordIndex::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn embedder_info(&self) -> ProviderInfo {
        self.embedder.info()
    }

    /// Index news articles against caller-supplied embeddings. The two
    /// slices must be the same length; nothing is indexed otherwise.
    /// Titles and summaries also go into the keyword index.
    pub fn index_news(
        &mut self,
        records: &[NewsRecord],
        embeddings: &[Vec<f32>],
    ) -> CoreResult<Vec<DocId>> {
        check_lengths(records.len(), embeddings.len())?;
        let mut ids = Vec::with_capacity(records.len());
        for (record, embedding) in records.iter().zip(embeddings) {
            let document = Document::news(record.clone());
            let keyword_text = document.keyword_text();
            let id = self.news.add(embedding.clone(), document, None)?;
            self.keywords.index(&id, &keyword_text);
            ids.push(id);
        }
        info!("indexed {} news articles", records.len());
        Ok(ids)
    }

    /// Index stock snapshots. Company name and sector feed the keyword
    /// index.
    pub fn index_stocks(
        &mut self,
        records: &[StockRecord],
        embeddings: &[Vec<f32>],
    ) -> CoreResult<Vec<DocId>> {
        check_lengths(records.len(), embeddings.len())?;
        let mut ids = Vec::with_capacity(records.len());
        for (record, embedding) in records.iter().zip(embeddings) {
            let document = Document::stock(record.clone());
            let keyword_text = document.keyword_text();
            let id = self.stocks.add(embedding.clone(), document, None)?;
            self.keywords.index(&id, &keyword_text);
            ids.push(id);
        }
        info!("indexed {} stock items", records.len());
        Ok(ids)
    }

    /// Index portfolio holdings. Holdings are reachable by vector search
    /// only; they are not registered in the keyword index.
    pub fn index_portfolio(
        &mut self,
        records: &[PortfolioRecord],
        embeddings: &[Vec<f32>],
    ) -> CoreResult<Vec<DocId>> {
        check_lengths(records.len(), embeddings.len())?;
        let mut ids = Vec::with_capacity(records.len());
        for (record, embedding) in records.iter().zip(embeddings) {
            let document = Document::portfolio(record.clone());
            let id = self.portfolio.add(embedding.clone(), document, None)?;
            ids.push(id);
        }
        info!("indexed {} portfolio items", records.len());
        Ok(ids)
    }

    /// Embed and index in one step.
    pub fn ingest_news(&mut self, records: &[NewsRecord]) -> anyhow::Result<Vec<DocId>> {
        let texts: Vec<String> = records.iter().map(NewsRecord::embedding_text).collect();
        let embeddings = self.embedder.encode_many(&texts)?;
        Ok(self.index_news(records, &embeddings)?)
    }

    pub fn ingest_stocks(&mut self, records: &[StockRecord]) -> anyhow::Result<Vec<DocId>> {
        let texts: Vec<String> = records.iter().map(StockRecord::embedding_text).collect();
        let embeddings = self.embedder.encode_many(&texts)?;
        Ok(self.index_stocks(records, &embeddings)?)
    }

    pub fn ingest_portfolio(&mut self, records: &[PortfolioRecord]) -> anyhow::Result<Vec<DocId>> {
        let texts: Vec<String> = records.iter().map(PortfolioRecord::embedding_text).collect();
        let embeddings = self.embedder.encode_many(&texts)?;
        Ok(self.index_portfolio(records, &embeddings)?)
    }

    /// Ingest a whole feed, all three categories. Returns the total
    /// number of documents indexed.
    pub fn ingest_feed(&mut self, feed: &RecordFeed) -> anyhow::Result<usize> {
        let mut total = 0;
        total += self.ingest_news(&feed.news)?.len();
        total += self.ingest_stocks(&feed.stocks)?.len();
        total += self.ingest_portfolio(&feed.portfolio)?.len();
        Ok(total)
    }

    /// Build the dense index of every non-empty store. Search does this
    /// lazily anyway; calling it up front just moves the cost.
    pub fn build_index(&self) {
        self.news.build_index();
        self.stocks.build_index();
        self.portfolio.build_index();
    }

    /// Search the requested categories (all of them when `doc_types` is
    /// `None` or empty). The query is embedded exactly once and fanned
    /// out to every requested store; the keyword index contributes a
    /// second candidate set. If the provider fails at query time the
    /// search degrades to keyword-only with a warning instead of
    /// erroring.
    pub fn search(
        &self,
        query: &str,
        top_k: usize,
        doc_types: Option<&[DocType]>,
    ) -> Vec<ScoredDocument> {
        if top_k == 0 {
            return Vec::new();
        }
        let requested = requested_types(doc_types);
        let query_vector = match self.embedder.encode(query) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("query embedding failed ({:#}), continuing keyword-only", e);
                None
            }
        };
        self.collect_and_merge(query, query_vector.as_deref(), top_k, &requested)
    }

    /// Same flow as [`search`](Self::search) with a caller-supplied
    /// query embedding, for callers that already paid for one.
    pub fn search_with_embedding(
        &self,
        query: &str,
        query_vector: &[f32],
        top_k: usize,
        doc_types: Option<&[DocType]>,
    ) -> CoreResult<Vec<ScoredDocument>> {
        if query_vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                found: query_vector.len(),
            });
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let requested = requested_types(doc_types);
        Ok(self.collect_and_merge(query, Some(query_vector), top_k, &requested))
    }

    fn collect_and_merge(
        &self,
        query: &str,
        query_vector: Option<&[f32]>,
        top_k: usize,
        requested: &[DocType],
    ) -> Vec<ScoredDocument> {
        let mut candidates: Vec<ScoredDocument> = Vec::new();

        if let Some(qvec) = query_vector {
            for doc_type in requested {
                let store = self.store(*doc_type);
                if !store.is_empty() {
                    candidates.extend(store.search(qvec, top_k, 0.0));
                }
            }
        }

        for hit in self.keywords.search(query, top_k) {
            if let Some(document) = self.resolve(&hit.doc_id) {
                if requested.contains(&document.doc_type()) {
                    candidates.push(ScoredDocument {
                        score: hit.score,
                        source: SearchSource::Keyword,
                        document: document.clone(),
                    });
                }
            }
        }

        // Cosine similarity and token overlap share one ranking without
        // rescaling. The absolute order across sources is a compromise;
        // within a source it is exact, and dedup needs the shared list.
        candidates
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        let mut seen = HashSet::new();
        candidates.retain(|c| seen.insert(c.document.doc_id().to_string()));
        candidates.truncate(top_k);
        candidates
    }

    fn store(&self, doc_type: DocType) -> &DocumentStore {
        match doc_type {
            DocType::News => &self.news,
            DocType::Stock => &self.stocks,
            DocType::Portfolio => &self.portfolio,
        }
    }

    fn resolve(&self, doc_id: &str) -> Option<&Document> {
        self.news
            .get(doc_id)
            .or_else(|| self.stocks.get(doc_id))
            .or_else(|| self.portfolio.get(doc_id))
    }

    /// Look a document up by id across all stores.
    pub fn get(&self, doc_id: &str) -> Option<&Document> {
        self.resolve(doc_id)
    }

    pub fn get_stats(&self) -> EngineStats {
        EngineStats {
            total_documents: self.news.len() + self.stocks.len() + self.portfolio.len(),
            news_documents: self.news.len(),
            stock_documents: self.stocks.len(),
            portfolio_documents: self.portfolio.len(),
            unique_keywords: self.keywords.unique_keywords(),
            index_built: self.news.index_built()
                && self.stocks.index_built()
                && self.portfolio.index_built(),
        }
    }

    /// Write all four index files under `prefix` and report each one
    /// individually. `{prefix}_news.json`, `{prefix}_stocks.json`,
    /// `{prefix}_portfolio.json`, `{prefix}_keywords.json`.
    pub fn save_index(&self, prefix: &str) -> PersistReport {
        let report = PersistReport {
            news: self.news.save(format!("{prefix}_news.json").as_ref()),
            stocks: self.stocks.save(format!("{prefix}_stocks.json").as_ref()),
            portfolio: self.portfolio.save(format!("{prefix}_portfolio.json").as_ref()),
            keywords: self.keywords.save(format!("{prefix}_keywords.json").as_ref()),
        };
        if report.is_complete() {
            info!("saved search index under {}", prefix);
        } else {
            warn!("search index saved partially under {}: {:?}", prefix, report);
        }
        report
    }

    /// Load all four index files saved under `prefix`. Each file loads
    /// independently; a category whose file is missing or unreadable
    /// keeps its current contents and is flagged `false` in the report.
    pub fn load_index(&mut self, prefix: &str) -> PersistReport {
        let report = PersistReport {
            news: self.news.load(format!("{prefix}_news.json").as_ref()),
            stocks: self.stocks.load(format!("{prefix}_stocks.json").as_ref()),
            portfolio: self.portfolio.load(format!("{prefix}_portfolio.json").as_ref()),
            keywords: self.keywords.load(format!("{prefix}_keywords.json").as_ref()),
        };
        if report.is_complete() {
            info!("loaded search index from {}", prefix);
        } else {
            warn!("search index loaded partially from {}: {:?}", prefix, report);
        }
        report
    }

    /// Average the sentiment of the news matching `symbol`. Neutral with
    /// zero count when nothing matches.
    pub fn sentiment_snapshot(&self, symbol: &str) -> SentimentSnapshot {
        let results = self.search(symbol, 10, Some(&[DocType::News]));
        let mut scores = Vec::new();
        let mut headlines = Vec::new();
        for result in &results {
            if let Document::News(doc) = &result.document {
                scores.push(doc.record.sentiment_score);
                if headlines.len() < 3 {
                    headlines.push(doc.record.title.clone());
                }
            }
        }
        let average_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f32>() / scores.len() as f32
        };
        SentimentSnapshot {
            symbol: symbol.to_string(),
            average_score,
            label: SentimentLabel::from_score(average_score),
            news_count: scores.len(),
            headlines,
        }
    }
}

fn check_lengths(documents: usize, embeddings: usize) -> CoreResult<()> {
    if documents != embeddings {
        return Err(Error::LengthMismatch { documents, embeddings });
    }
    Ok(())
}

fn requested_types(doc_types: Option<&[DocType]>) -> Vec<DocType> {
    match doc_types {
        Some(types) if !types.is_empty() => {
            let mut unique = Vec::new();
            for doc_type in types {
                if !unique.contains(doc_type) {
                    unique.push(*doc_type);
                }
            }
            unique
        }
        _ => DocType::ALL.to_vec(),
    }
}

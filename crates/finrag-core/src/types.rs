//! Domain types shared by the keyword, vector and hybrid search engines.

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub type DocId = String;

/// Category a document belongs to. Each category is backed by its own
/// vector store and contributes differently to the keyword index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    News,
    Stock,
    Portfolio,
}

impl DocType {
    pub const ALL: [DocType; 3] = [DocType::News, DocType::Stock, DocType::Portfolio];

    pub fn as_str(self) -> &'static str {
        match self {
            DocType::News => "news",
            DocType::Stock => "stock",
            DocType::Portfolio => "portfolio",
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "news" => Ok(DocType::News),
            "stock" | "stocks" => Ok(DocType::Stock),
            "portfolio" => Ok(DocType::Portfolio),
            other => Err(Error::UnknownDocType(other.to_string())),
        }
    }
}

/// Coarse sentiment bucket attached to news items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl SentimentLabel {
    /// Scores above +0.1 count as positive, below -0.1 as negative,
    /// everything in between as neutral.
    pub fn from_score(score: f32) -> Self {
        if score > 0.1 {
            SentimentLabel::Positive
        } else if score < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A market news item as delivered by the ingestion feeds.
///
/// - `symbol`: primary ticker the item is about, when one was detected
/// - `published_at`: RFC 3339 timestamp string from the upstream feed
/// - `sentiment_score`/`sentiment_label`: precomputed by the feed layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsRecord {
    #[serde(default)]
    pub symbol: Option<String>,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub sentiment_score: f32,
    #[serde(default)]
    pub sentiment_label: SentimentLabel,
}

impl NewsRecord {
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

/// A stock quote snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub price: f32,
    #[serde(default)]
    pub change_percent: f32,
}

impl StockRecord {
    pub fn embedding_text(&self) -> String {
        format!("{} {} {}", self.symbol, self.name, self.sector)
    }
}

/// A single portfolio holding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRecord {
    pub symbol: String,
    pub company_name: String,
    #[serde(default)]
    pub shares: f32,
    #[serde(default)]
    pub avg_cost: f32,
    #[serde(default)]
    pub market_value: f32,
    #[serde(default)]
    pub sector: Option<String>,
}

impl PortfolioRecord {
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.symbol, self.company_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsDocument {
    pub doc_id: DocId,
    #[serde(flatten)]
    pub record: NewsRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDocument {
    pub doc_id: DocId,
    #[serde(flatten)]
    pub record: StockRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioDocument {
    pub doc_id: DocId,
    #[serde(flatten)]
    pub record: PortfolioRecord,
}

/// A stored document: a typed record plus the id its store assigned.
///
/// Serialized form is a flat JSON object tagged with `doc_type`, so a
/// persisted news document reads `{"doc_type":"news","doc_id":"news_0",
/// "title":...}` and survives round trips without losing its category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "doc_type", rename_all = "snake_case")]
pub enum Document {
    News(NewsDocument),
    Stock(StockDocument),
    Portfolio(PortfolioDocument),
}

impl Document {
    pub fn news(record: NewsRecord) -> Self {
        Document::News(NewsDocument { doc_id: DocId::new(), record })
    }

    pub fn stock(record: StockRecord) -> Self {
        Document::Stock(StockDocument { doc_id: DocId::new(), record })
    }

    pub fn portfolio(record: PortfolioRecord) -> Self {
        Document::Portfolio(PortfolioDocument { doc_id: DocId::new(), record })
    }

    pub fn doc_id(&self) -> &str {
        match self {
            Document::News(d) => &d.doc_id,
            Document::Stock(d) => &d.doc_id,
            Document::Portfolio(d) => &d.doc_id,
        }
    }

    pub fn set_doc_id(&mut self, id: DocId) {
        match self {
            Document::News(d) => d.doc_id = id,
            Document::Stock(d) => d.doc_id = id,
            Document::Portfolio(d) => d.doc_id = id,
        }
    }

    pub fn doc_type(&self) -> DocType {
        match self {
            Document::News(_) => DocType::News,
            Document::Stock(_) => DocType::Stock,
            Document::Portfolio(_) => DocType::Portfolio,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            Document::News(d) => d.record.symbol.as_deref(),
            Document::Stock(d) => Some(&d.record.symbol),
            Document::Portfolio(d) => Some(&d.record.symbol),
        }
    }

    /// Text registered in the keyword index for this document. Portfolio
    /// holdings are intentionally not keyword searchable and return an
    /// empty string.
    pub fn keyword_text(&self) -> String {
        match self {
            Document::News(d) => format!("{} {}", d.record.title, d.record.summary),
            Document::Stock(d) => format!("{} {}", d.record.name, d.record.sector),
            Document::Portfolio(_) => String::new(),
        }
    }
}

/// Indicates which retrieval path produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchSource {
    Vector,
    Keyword,
}

impl SearchSource {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchSource::Vector => "vector",
            SearchSource::Keyword => "keyword",
        }
    }
}

impl std::fmt::Display for SearchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document scored against a query. `score` is path-specific (cosine
/// similarity for `Vector`, token overlap ratio for `Keyword`) but higher
/// is always better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub score: f32,
    pub source: SearchSource,
    pub document: Document,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordHit {
    pub doc_id: DocId,
    pub score: f32,
}

/// Counts reported by the engine. `index_built` is true only when every
/// category store has a built dense index; empty stores count as unbuilt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_documents: usize,
    pub news_documents: usize,
    pub stock_documents: usize,
    pub portfolio_documents: usize,
    pub unique_keywords: usize,
    pub index_built: bool,
}

/// Per-file outcome of a whole-index save or load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PersistReport {
    pub news: bool,
    pub stocks: bool,
    pub portfolio: bool,
    pub keywords: bool,
}

impl PersistReport {
    pub fn is_complete(self) -> bool {
        self.news && self.stocks && self.portfolio && self.keywords
    }
}

/// Identity and health of an embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub dimension: usize,
    pub degraded: bool,
}

/// Aggregate news sentiment for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    pub symbol: String,
    pub average_score: f32,
    pub label: SentimentLabel,
    pub news_count: usize,
    pub headlines: Vec<String>,
}

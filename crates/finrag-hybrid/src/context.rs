//! Rendering retrieved documents into the context block a prompt (or a
//! human) consumes.

use finrag_core::types::{Document, ScoredDocument};

/// One-line rendering of a document.
pub fn format_document(document: &Document) -> String {
    match document {
        Document::News(d) => format!("News: {} - {}", d.record.title, d.record.summary),
        Document::Stock(d) => format!(
            "Stock: {} ({}) - Price: ${:.2}, Sector: {}",
            d.record.name, d.record.symbol, d.record.price, d.record.sector
        ),
        Document::Portfolio(d) => format!(
            "Portfolio: {} ({}) - Shares: {}, Value: ${:.2}",
            d.record.company_name, d.record.symbol, d.record.shares, d.record.market_value
        ),
    }
}

/// Numbered context block, one line per result:
/// `[1] (news, relevance: 0.87) News: ...`
pub fn build_context(results: &[ScoredDocument]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "[{}] ({}, relevance: {:.2}) {}",
                i + 1,
                result.document.doc_type(),
                result.score,
                format_document(&result.document)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Rule-based answer composition for environments without an LLM
//! backend. Routes on what the question asks about and summarizes the
//! retrieved documents accordingly.

use finrag_core::types::{Document, ScoredDocument};

use crate::context::format_document;

/// Compose a plain-text answer from retrieved context. Sections stack:
/// a question mentioning both "price" and "news" gets both. Falls back
/// to quoting the best-scored document when no rule applies.
pub fn fallback_answer(query: &str, results: &[ScoredDocument]) -> String {
    if results.is_empty() {
        return "I don't have enough information to answer your query. \
                Please try rephrasing or ask about specific stocks."
            .to_string();
    }

    let query_lower = query.to_lowercase();
    let mut parts: Vec<String> = Vec::new();

    if query_lower.contains("price") || query_lower.contains("stock") {
        if let Some(doc) = results.iter().find_map(|r| match &r.document {
            Document::Stock(d) => Some(d),
            _ => None,
        }) {
            parts.push(format!(
                "The current price for {} is ${:.2}",
                doc.record.symbol, doc.record.price
            ));
        }
    }

    if query_lower.contains("news") || query_lower.contains("happening") {
        let positive = results.iter().find(|r| match &r.document {
            Document::News(d) => d.record.sentiment_score > 0.1,
            _ => false,
        });
        let negative = results.iter().find(|r| match &r.document {
            Document::News(d) => d.record.sentiment_score < -0.1,
            _ => false,
        });
        if let Some(result) = positive {
            parts.push(format!("Good news: {}", format_document(&result.document)));
        }
        if let Some(result) = negative {
            parts.push(format!("Concerning news: {}", format_document(&result.document)));
        }
    }

    if query_lower.contains("portfolio") {
        let holdings: Vec<f32> = results
            .iter()
            .filter_map(|r| match &r.document {
                Document::Portfolio(d) => Some(d.record.market_value),
                _ => None,
            })
            .collect();
        if !holdings.is_empty() {
            parts.push(format!("Portfolio value: ${:.2}", holdings.iter().sum::<f32>()));
        }
    }

    if parts.is_empty() {
        parts.push("Based on the available information:".to_string());
        parts.push(format_document(&results[0].document));
    }

    format!("{}.", parts.join(". "))
}

use std::fs;
use tempfile::TempDir;

use finrag_core::feed::load_records;
use finrag_core::types::{
    DocType, Document, NewsRecord, PortfolioRecord, SentimentLabel, StockRecord,
};

fn sample_news() -> NewsRecord {
    NewsRecord {
        symbol: Some("AAPL".to_string()),
        title: "Apple Reports Record Earnings".to_string(),
        summary: "Quarterly revenue beat expectations".to_string(),
        url: "https://example.com/apple".to_string(),
        source: "Newswire".to_string(),
        published_at: "2024-11-01T12:00:00Z".to_string(),
        sentiment_score: 0.4,
        sentiment_label: SentimentLabel::Positive,
    }
}

#[test]
fn doc_type_parses_and_prints() {
    assert_eq!("news".parse::<DocType>().unwrap(), DocType::News);
    assert_eq!(" Stocks ".parse::<DocType>().unwrap(), DocType::Stock);
    assert_eq!("portfolio".parse::<DocType>().unwrap(), DocType::Portfolio);
    assert_eq!(DocType::Stock.to_string(), "stock");
    assert!("bonds".parse::<DocType>().is_err());
}

#[test]
fn sentiment_label_thresholds() {
    assert_eq!(SentimentLabel::from_score(0.11), SentimentLabel::Positive);
    assert_eq!(SentimentLabel::from_score(-0.11), SentimentLabel::Negative);
    // The boundaries themselves are neutral
    assert_eq!(SentimentLabel::from_score(0.1), SentimentLabel::Neutral);
    assert_eq!(SentimentLabel::from_score(-0.1), SentimentLabel::Neutral);
    assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Neutral);
}

#[test]
fn document_serializes_flat_with_tag() {
    let mut doc = Document::news(sample_news());
    doc.set_doc_id("news_0".to_string());

    let json = serde_json::to_value(&doc).expect("serialize");
    assert_eq!(json["doc_type"], "news");
    assert_eq!(json["doc_id"], "news_0");
    assert_eq!(json["title"], "Apple Reports Record Earnings");
    assert_eq!(json["sentiment_label"], "positive");

    let back: Document = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back.doc_id(), "news_0");
    assert_eq!(back.doc_type(), DocType::News);
    assert_eq!(back.symbol(), Some("AAPL"));
}

#[test]
fn keyword_text_per_category() {
    let news = Document::news(sample_news());
    assert!(news.keyword_text().contains("Record Earnings"));

    let stock = Document::stock(StockRecord {
        symbol: "MSFT".to_string(),
        name: "Microsoft Corporation".to_string(),
        sector: "Technology".to_string(),
        price: 350.0,
        change_percent: 1.2,
    });
    assert_eq!(stock.keyword_text(), "Microsoft Corporation Technology");

    let holding = Document::portfolio(PortfolioRecord {
        symbol: "AAPL".to_string(),
        company_name: "Apple Inc.".to_string(),
        shares: 50.0,
        avg_cost: 150.0,
        market_value: 8750.0,
        sector: Some("Technology".to_string()),
    });
    assert!(holding.keyword_text().is_empty(), "portfolio is not keyword indexed");
}

#[test]
fn load_records_reads_sorted_batches_and_skips_noise() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(
        dir.join("news_batch_1.json"),
        r#"[{"title": "Fed Holds Rates", "summary": "No change expected", "sentiment_score": 0.0}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("stocks.json"),
        r#"[{"symbol": "AAPL", "name": "Apple Inc.", "sector": "Technology", "price": 175.0, "change_percent": 0.5}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("portfolio_demo.json"),
        r#"[{"symbol": "AAPL", "company_name": "Apple Inc.", "shares": 50, "avg_cost": 150.0, "market_value": 8750.0}]"#,
    )
    .unwrap();
    fs::write(dir.join("readme.json"), "{}").unwrap();
    fs::write(dir.join("notes.txt"), "not a batch").unwrap();

    let feed = load_records(dir).expect("load");
    assert_eq!(feed.news.len(), 1);
    assert_eq!(feed.stocks.len(), 1);
    assert_eq!(feed.portfolio.len(), 1);
    assert_eq!(feed.len(), 3);
    assert_eq!(feed.news[0].sentiment_label, SentimentLabel::Neutral);
}

#[test]
fn load_records_missing_dir_is_empty() {
    let tmp = TempDir::new().unwrap();
    let feed = load_records(&tmp.path().join("nope")).expect("load");
    assert!(feed.is_empty());
}

#[test]
fn load_records_propagates_parse_errors() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("news.json"), "not json").unwrap();
    assert!(load_records(tmp.path()).is_err());
}

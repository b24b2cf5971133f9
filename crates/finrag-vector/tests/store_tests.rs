use tempfile::TempDir;

use finrag_core::error::Error;
use finrag_core::types::{DocType, Document, NewsRecord, SentimentLabel, StockRecord};
use finrag_vector::DocumentStore;

fn news(title: &str) -> Document {
    Document::news(NewsRecord {
        symbol: None,
        title: title.to_string(),
        summary: String::new(),
        url: String::new(),
        source: String::new(),
        published_at: String::new(),
        sentiment_score: 0.0,
        sentiment_label: SentimentLabel::Neutral,
    })
}

fn unit(dim: usize, hot: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[hot] = 1.0;
    v
}

#[test]
fn add_assigns_sequential_ids() {
    let mut store = DocumentStore::new(DocType::News, 4);
    let a = store.add(unit(4, 0), news("first"), None).expect("add");
    let b = store.add(unit(4, 1), news("second"), None).expect("add");
    assert_eq!(a, "news_0");
    assert_eq!(b, "news_1");
    assert_eq!(store.get("news_1").expect("get").doc_id(), "news_1");
    assert_eq!(store.len(), 2);
}

#[test]
fn add_rejects_wrong_dimension() {
    let mut store = DocumentStore::new(DocType::News, 4);
    let err = store.add(vec![1.0; 3], news("short"), None).unwrap_err();
    match err {
        Error::DimensionMismatch { expected, found } => {
            assert_eq!(expected, 4);
            assert_eq!(found, 3);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
    assert!(store.is_empty(), "failed add must not grow the store");
}

#[test]
fn add_rejects_wrong_category() {
    let mut store = DocumentStore::new(DocType::Stock, 4);
    let err = store.add(unit(4, 0), news("misfiled"), None).unwrap_err();
    assert!(matches!(err, Error::DocTypeMismatch { .. }));
}

#[test]
fn self_similarity_is_top_hit() {
    let mut store = DocumentStore::new(DocType::News, 8);
    let target = vec![0.3, 0.1, 0.0, 0.9, 0.0, 0.2, 0.0, 0.1];
    store.add(target.clone(), news("target"), None).expect("add");
    store.add(unit(8, 2), news("other"), None).expect("add");

    let results = store.search(&target, 5, 0.0);
    assert_eq!(results[0].document.doc_id(), "news_0");
    assert!((results[0].score - 1.0).abs() < 1e-5, "cosine with itself ~ 1.0, got {}", results[0].score);
}

#[test]
fn search_respects_top_k_and_threshold() {
    let mut store = DocumentStore::new(DocType::News, 4);
    for i in 0..4 {
        store.add(unit(4, i % 4), news(&format!("doc {i}")), None).expect("add");
    }
    let query = vec![1.0, 0.2, 0.0, 0.0];

    assert!(store.search(&query, 0, 0.0).is_empty());
    assert_eq!(store.search(&query, 2, 0.0).len(), 2);

    // With a high threshold only the aligned document survives
    let strict = store.search(&query, 10, 0.9);
    assert_eq!(strict.len(), 1);
    assert_eq!(strict[0].document.doc_id(), "news_0");
}

#[test]
fn equal_scores_keep_insertion_order() {
    let mut store = DocumentStore::new(DocType::News, 4);
    // Three identical vectors -> identical scores
    for i in 0..3 {
        store.add(unit(4, 1), news(&format!("doc {i}")), None).expect("add");
    }
    let results = store.search(&unit(4, 1), 5, 0.0);
    let ids: Vec<&str> = results.iter().map(|r| r.document.doc_id()).collect();
    assert_eq!(ids, vec!["news_0", "news_1", "news_2"]);
}

#[test]
fn zero_norm_query_returns_nothing() {
    let mut store = DocumentStore::new(DocType::News, 4);
    store.add(unit(4, 0), news("doc"), None).expect("add");
    assert!(store.search(&[0.0; 4], 5, 0.0).is_empty());
}

#[test]
fn zero_norm_rows_are_skipped() {
    let mut store = DocumentStore::new(DocType::News, 4);
    store.add(vec![0.0; 4], news("empty text doc"), None).expect("add");
    store.add(unit(4, 0), news("real doc"), None).expect("add");
    let results = store.search(&unit(4, 0), 5, 0.0);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.doc_id(), "news_1");
}

#[test]
fn empty_store_search_does_not_build() {
    let store = DocumentStore::new(DocType::News, 4);
    assert!(store.search(&unit(4, 0), 5, 0.0).is_empty());
    assert!(!store.index_built());
}

#[test]
fn build_index_is_idempotent_and_lazy() {
    let mut store = DocumentStore::new(DocType::News, 4);
    store.add(unit(4, 0), news("doc"), None).expect("add");
    assert!(!store.index_built());

    store.build_index();
    assert!(store.index_built());
    store.build_index();
    assert!(store.index_built());

    // Adding invalidates, search lazily rebuilds
    store.add(unit(4, 1), news("doc 2"), None).expect("add");
    assert!(!store.index_built());
    let _ = store.search(&unit(4, 1), 5, 0.0);
    assert!(store.index_built());
}

#[test]
fn empty_store_build_stays_unbuilt() {
    let store = DocumentStore::new(DocType::News, 4);
    store.build_index();
    assert!(!store.index_built());
}

#[test]
fn save_load_round_trip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("news.json");

    let mut store = DocumentStore::new(DocType::News, 4);
    store.add(unit(4, 0), news("first"), None).expect("add");
    store.add(unit(4, 2), news("second"), None).expect("add");
    assert!(store.save(&path));

    let mut restored = DocumentStore::new(DocType::News, 4);
    assert!(restored.load(&path));
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.dimension(), 4);
    assert!(!restored.index_built(), "loaded store rebuilds lazily");

    let results = restored.search(&unit(4, 2), 5, 0.0);
    assert_eq!(results[0].document.doc_id(), "news_1");
}

#[test]
fn load_adopts_snapshot_dimension() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("news.json");

    let mut store = DocumentStore::new(DocType::News, 8);
    store.add(unit(8, 3), news("wide"), None).expect("add");
    assert!(store.save(&path));

    let mut restored = DocumentStore::new(DocType::News, 4);
    assert!(restored.load(&path));
    assert_eq!(restored.dimension(), 8);
}

#[test]
fn load_missing_file_reports_false_and_keeps_state() {
    let tmp = TempDir::new().unwrap();
    let mut store = DocumentStore::new(DocType::News, 4);
    store.add(unit(4, 0), news("kept"), None).expect("add");

    assert!(!store.load(&tmp.path().join("missing.json")));
    assert_eq!(store.len(), 1);
    assert!(store.get("news_0").is_some());
}

#[test]
fn load_rejects_corrupt_and_mismatched_snapshots() {
    let tmp = TempDir::new().unwrap();
    let mut store = DocumentStore::new(DocType::News, 4);

    let garbled = tmp.path().join("garbled.json");
    std::fs::write(&garbled, "{\"dimension\": 4").unwrap();
    assert!(!store.load(&garbled));

    // A stock snapshot must not load into the news store
    let stock_path = tmp.path().join("stocks.json");
    let mut stocks = DocumentStore::new(DocType::Stock, 4);
    stocks
        .add(
            unit(4, 0),
            Document::stock(StockRecord {
                symbol: "AAPL".to_string(),
                name: "Apple Inc.".to_string(),
                sector: "Technology".to_string(),
                price: 175.0,
                change_percent: 0.5,
            }),
            None,
        )
        .expect("add");
    assert!(stocks.save(&stock_path));
    assert!(!store.load(&stock_path));
    assert!(store.is_empty(), "failed load leaves the store untouched");
}

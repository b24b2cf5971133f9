use tempfile::TempDir;

use finrag_text::KeywordIndex;

fn sample_index() -> KeywordIndex {
    let mut index = KeywordIndex::new();
    index.index("news_0", "Apple Reports Record Earnings");
    index.index("news_1", "Oil prices slide on demand fears");
    index.index("stock_0", "Apple Inc. Technology");
    index
}

#[test]
fn full_match_scores_one() {
    let index = sample_index();
    let hits = index.search("apple earnings", 5);
    assert_eq!(hits[0].doc_id, "news_0");
    assert!((hits[0].score - 1.0).abs() < f32::EPSILON, "2 of 2 query tokens matched");
    // stock_0 only matches "apple"
    let stock = hits.iter().find(|h| h.doc_id == "stock_0").expect("stock hit");
    assert!((stock.score - 0.5).abs() < f32::EPSILON);
}

#[test]
fn no_overlap_is_no_hit() {
    let index = sample_index();
    let hits = index.search("bond yields", 5);
    assert!(hits.is_empty());
}

#[test]
fn ties_keep_first_seen_order() {
    let mut index = KeywordIndex::new();
    index.index("news_0", "fed rates");
    index.index("news_1", "fed decision");
    index.index("news_2", "fed outlook");
    let hits = index.search("fed", 5);
    let ids: Vec<&str> = hits.iter().map(|h| h.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["news_0", "news_1", "news_2"]);
    assert!(hits.iter().all(|h| (h.score - 1.0).abs() < f32::EPSILON));
}

#[test]
fn reindexing_does_not_inflate_scores() {
    let mut index = KeywordIndex::new();
    index.index("news_0", "apple earnings");
    index.index("news_0", "apple earnings");
    let hits = index.search("apple", 5);
    assert_eq!(hits.len(), 1);
    assert!((hits[0].score - 1.0).abs() < f32::EPSILON);
}

#[test]
fn query_tokens_are_deduped() {
    let index = sample_index();
    // "apple apple" is one distinct token, so news_0 still scores 1/1
    let hits = index.search("apple APPLE", 5);
    assert!((hits[0].score - 1.0).abs() < f32::EPSILON);
}

#[test]
fn respects_top_k() {
    let mut index = KeywordIndex::new();
    for i in 0..10 {
        index.index(&format!("news_{i}"), "market update");
    }
    assert_eq!(index.search("market", 3).len(), 3);
    assert!(index.search("market", 0).is_empty());
}

#[test]
fn empty_query_and_empty_index() {
    let index = sample_index();
    assert!(index.search("", 5).is_empty());
    assert!(index.search("!!!", 5).is_empty());
    assert!(KeywordIndex::new().search("apple", 5).is_empty());
}

#[test]
fn unique_keywords_counts_tokens() {
    let mut index = KeywordIndex::new();
    index.index("news_0", "apple apple earnings");
    assert_eq!(index.unique_keywords(), 2);
    index.clear();
    assert!(index.is_empty());
}

#[test]
fn save_load_round_trip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("keywords.json");

    let index = sample_index();
    assert!(index.save(&path));

    let mut restored = KeywordIndex::new();
    restored.index("stale_0", "leftover entries get replaced");
    assert!(restored.load(&path));

    assert_eq!(restored.unique_keywords(), index.unique_keywords());
    let hits = restored.search("apple earnings", 5);
    assert_eq!(hits[0].doc_id, "news_0");
    assert!(restored.search("leftover", 5).is_empty(), "load replaces, not merges");
}

#[test]
fn load_failure_keeps_existing_postings() {
    let tmp = TempDir::new().unwrap();
    let mut index = sample_index();
    assert!(!index.load(&tmp.path().join("missing.json")));
    assert_eq!(index.unique_keywords(), sample_index().unique_keywords());

    let bad = tmp.path().join("bad.json");
    std::fs::write(&bad, "not json").unwrap();
    assert!(!index.load(&bad));
    assert!(!index.search("apple", 5).is_empty());
}

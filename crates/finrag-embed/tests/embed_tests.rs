use finrag_core::traits::EmbeddingProvider;
use finrag_embed::{provider_for, HashEmbedder, DEFAULT_DIMENSION};

#[test]
fn encode_is_deterministic() {
    let embedder = HashEmbedder::default();
    let a = embedder.encode("Apple reports record earnings").expect("encode");
    let b = embedder.encode("Apple reports record earnings").expect("encode");
    assert_eq!(a, b);
    assert_eq!(a.len(), DEFAULT_DIMENSION);
}

#[test]
fn encode_normalizes_case_and_spacing() {
    let embedder = HashEmbedder::default();
    let a = embedder.encode("APPLE  Earnings").expect("encode");
    let b = embedder.encode("apple earnings").expect("encode");
    assert_eq!(a, b, "token normalization happens before hashing");
}

#[test]
fn nonempty_text_is_unit_norm() {
    let embedder = HashEmbedder::new(64);
    let v = embedder.encode("quarterly revenue beat expectations").expect("encode");
    assert_eq!(v.len(), 64);
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-3, "norm was {norm}");
}

#[test]
fn empty_text_is_zero_vector() {
    let embedder = HashEmbedder::default();
    let v = embedder.encode("   ").expect("encode");
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn encode_many_matches_encode() {
    let embedder = HashEmbedder::new(32);
    let texts = vec!["apple".to_string(), "microsoft".to_string()];
    let batch = embedder.encode_many(&texts).expect("encode_many");
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0], embedder.encode("apple").expect("encode"));
    assert_eq!(batch[1], embedder.encode("microsoft").expect("encode"));
}

#[test]
fn different_texts_usually_differ() {
    let embedder = HashEmbedder::default();
    let a = embedder.encode("apple earnings beat").expect("encode");
    let b = embedder.encode("oil prices slide").expect("encode");
    assert_ne!(a, b);
}

#[test]
fn unknown_backend_falls_back_degraded() {
    let provider = provider_for("bge-m3", 128);
    let info = provider.info();
    assert!(info.degraded);
    assert!(info.name.contains("bge-m3"));
    assert_eq!(info.dimension, 128);
    // Still a working embedder
    let v = provider.encode("fallback still encodes").expect("encode");
    assert_eq!(v.len(), 128);
}

#[test]
fn hash_backend_is_not_degraded() {
    let provider = provider_for("hash", 64);
    let info = provider.info();
    assert!(!info.degraded);
    assert_eq!(info.name, "hash");
}

//! Query and document text cleanup shared by the embedding and keyword
//! paths.

use std::collections::HashSet;

/// Normalize free text: lowercase, collapse whitespace runs, then drop
/// every character that is not alphanumeric or one of ` .,-%$` (financial
/// punctuation survives, the rest is deleted). Always returns a trimmed
/// string; empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    let kept: String = collapsed
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | ',' | '-' | '%' | '$'))
        .collect();
    kept.trim().to_string()
}

/// Normalized tokens in first-seen order with duplicates removed. The
/// order is what makes keyword tie-breaks deterministic.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    for token in normalized.split_whitespace() {
        if seen.insert(token.to_string()) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

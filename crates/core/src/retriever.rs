//! Keyword retrieval over page chunks.
//!
//! A chunk's score is the number of query tokens found as case-insensitive
//! substrings of its text. Tokens repeated in the query count once per
//! repetition. Results keep index order among equal scores.

use crate::models::{ScoredHit, TextChunk};

pub const DEFAULT_TOP_K: usize = 5;

pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|token| token.to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

pub fn keyword_score(text: &str, tokens: &[String]) -> usize {
    let lowered = text.to_lowercase();
    tokens
        .iter()
        .filter(|token| lowered.contains(token.as_str()))
        .count()
}

pub fn search<'a>(chunks: &'a [TextChunk], query: &str, k: usize) -> Vec<ScoredHit<'a>> {
    let tokens = tokenize(query);
    if tokens.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut hits: Vec<ScoredHit<'a>> = chunks
        .iter()
        .filter_map(|chunk| {
            let score = keyword_score(&chunk.text, &tokens);
            (score > 0).then_some(ScoredHit { chunk, score })
        })
        .collect();

    // stable: equal scores stay in index order
    hits.sort_by(|left, right| right.score.cmp(&left.score));
    hits.truncate(k);
    hits
}

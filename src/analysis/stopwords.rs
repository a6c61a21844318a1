use std::collections::HashSet;
use std::sync::LazyLock;

/// Fixed English stop-word set; part of the contract (glossary) so stored
/// segments remain queryable across deployments.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has",
    "he", "in", "is", "it", "its", "of", "on", "or", "that", "the", "to",
    "was", "were", "will", "with", "this", "but", "they", "have", "had",
    "what", "when", "where", "who", "which", "their", "if", "each", "do",
    "not", "no", "so", "can",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORD_SET.contains(word)
}

use crate::analysis::stemmer;
use crate::analysis::stopwords::is_stop_word;
use crate::analysis::token::Token;

/// Pure function `tokenize(text) -> [Token]` (§4.1): lowercase, split on
/// runs of non-alphanumeric Unicode, drop tokens shorter than two
/// characters, drop stop words, stem, drop tokens that stem to empty.
/// Positions are assigned sequentially to the tokens that survive.
pub fn tokenize(text: &str) -> Vec<Token> {
    let lowered = text.to_lowercase();
    let mut tokens = Vec::new();
    let mut position = 0u32;

    for raw in split_alphanumeric_runs(&lowered) {
        if raw.chars().count() < 2 {
            continue;
        }
        if is_stop_word(raw) {
            continue;
        }
        let stemmed = stemmer::stem(raw);
        if stemmed.is_empty() {
            continue;
        }
        tokens.push(Token::new(stemmed, position));
        position += 1;
    }

    tokens
}

/// Stems a single already-lowercased word the same way the index does, for
/// query-term normalization (§4.7). Returns `None` if the word doesn't
/// survive filtering.
pub fn tokenize_single(word: &str) -> Option<String> {
    tokenize(word).into_iter().next().map(|t| t.term)
}

fn split_alphanumeric_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    let mut last_end = 0usize;

    for (idx, ch) in text.char_indices() {
        if ch.is_alphanumeric() {
            if start.is_none() {
                start = Some(idx);
            }
            last_end = idx + ch.len_utf8();
        } else if let Some(s) = start.take() {
            runs.push(&text[s..last_end]);
        }
    }
    if let Some(s) = start {
        runs.push(&text[s..last_end]);
    }
    runs
}

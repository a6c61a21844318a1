/// Deterministic suffix-stripping stemmer. Rule order is itself the
/// specification: the first matching rule fires, where a rule matches iff
/// the word ends with `suffix` and the rewritten word's length is at least
/// `min_result_len`. No match leaves the word unchanged. Do not reorder or
/// edit this table — published segments depend on it staying stable.
struct Rule {
    suffix: &'static str,
    replacement: &'static str,
    min_result_len: usize,
}

const RULES: &[Rule] = &[
    Rule { suffix: "ational", replacement: "ate", min_result_len: 2 },
    Rule { suffix: "tional", replacement: "tion", min_result_len: 2 },
    Rule { suffix: "encies", replacement: "ence", min_result_len: 2 },
    Rule { suffix: "ances", replacement: "ance", min_result_len: 2 },
    Rule { suffix: "ments", replacement: "ment", min_result_len: 2 },
    Rule { suffix: "izing", replacement: "ize", min_result_len: 2 },
    Rule { suffix: "ating", replacement: "ate", min_result_len: 2 },
    Rule { suffix: "iness", replacement: "y", min_result_len: 2 },
    Rule { suffix: "ously", replacement: "ous", min_result_len: 2 },
    Rule { suffix: "ively", replacement: "ive", min_result_len: 2 },
    Rule { suffix: "eness", replacement: "ene", min_result_len: 2 },
    Rule { suffix: "tion", replacement: "t", min_result_len: 3 },
    Rule { suffix: "sion", replacement: "s", min_result_len: 3 },
    Rule { suffix: "ying", replacement: "y", min_result_len: 2 },
    Rule { suffix: "ling", replacement: "l", min_result_len: 3 },
    Rule { suffix: "ies", replacement: "y", min_result_len: 2 },
    Rule { suffix: "ing", replacement: "", min_result_len: 3 },
    Rule { suffix: "ers", replacement: "er", min_result_len: 2 },
    Rule { suffix: "est", replacement: "", min_result_len: 3 },
    Rule { suffix: "ful", replacement: "", min_result_len: 3 },
    Rule { suffix: "ous", replacement: "", min_result_len: 3 },
    Rule { suffix: "ess", replacement: "", min_result_len: 3 },
    Rule { suffix: "ble", replacement: "", min_result_len: 3 },
    Rule { suffix: "ed", replacement: "", min_result_len: 3 },
    Rule { suffix: "er", replacement: "", min_result_len: 3 },
    Rule { suffix: "ly", replacement: "", min_result_len: 3 },
    Rule { suffix: "es", replacement: "", min_result_len: 3 },
    Rule { suffix: "ss", replacement: "ss", min_result_len: 2 },
    Rule { suffix: "s", replacement: "", min_result_len: 3 },
];

pub fn stem(word: &str) -> String {
    for rule in RULES {
        if let Some(stem_part) = word.strip_suffix(rule.suffix) {
            let rewritten_len = stem_part.len() + rule.replacement.len();
            if rewritten_len >= rule.min_result_len {
                return format!("{stem_part}{}", rule.replacement);
            }
        }
    }
    word.to_string()
}

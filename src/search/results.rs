use std::collections::HashMap;

use crate::index::posting::DocId;

/// One ranked hit: `score` is already rounded to 4 decimal places (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Result of `ShardedExecutor::execute` (§4.8 step 8).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub query: String,
    pub total_hits: usize,
    pub results: Vec<ScoredDoc>,
    pub term_stats: HashMap<String, usize>,
}

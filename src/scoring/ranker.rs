use std::collections::HashMap;

use crate::index::posting::PostingList;
use crate::search::results::ScoredDoc;

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// Okapi BM25 ranking with fixed `k1`/`b` and global corpus statistics
/// reconciled across shards (§4.9). Fully deterministic given identical
/// inputs: scores rounded to 4 decimals, ties broken by `doc_id` ascending.
pub struct Ranker;

impl Ranker {
    /// `include_postings` must already be filtered to the candidate set
    /// (§4.8 step 6) and keyed by include term. `doc_length` resolves a
    /// candidate's token count via the owning shard engine (§9 note on
    /// non-owning back-references).
    pub fn rank(
        include_postings: &HashMap<String, PostingList>,
        global_total_docs: i64,
        global_avg_doc_len: f64,
        doc_length: impl Fn(&str) -> u64,
        limit: usize,
    ) -> Vec<ScoredDoc> {
        let n = global_total_docs as f64;
        let mut scores: HashMap<String, f64> = HashMap::new();

        for postings in include_postings.values() {
            let df = postings.len() as f64;
            let idf = (((n - df) / (df + 0.5)) + 1.0).ln();

            for posting in postings.iter() {
                let f = posting.frequency as f64;
                let tf_norm = if global_avg_doc_len == 0.0 {
                    0.0
                } else {
                    let doc_len = doc_length(&posting.doc_id) as f64;
                    (f * (K1 + 1.0))
                        / (f + K1 * (1.0 - B + B * (doc_len / global_avg_doc_len)))
                };
                *scores.entry(posting.doc_id.clone()).or_insert(0.0) += idf * tf_norm;
            }
        }

        let mut ranked: Vec<ScoredDoc> = scores
            .into_iter()
            .map(|(doc_id, score)| ScoredDoc {
                doc_id,
                score: (score * 10000.0).round() / 10000.0,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });

        if limit > 0 && ranked.len() > limit {
            ranked.truncate(limit);
        }
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::posting::Posting;

    #[test]
    fn higher_frequency_shorter_doc_scores_higher() {
        let mut postings = HashMap::new();
        postings.insert(
            "cat".to_string(),
            PostingList::new(vec![
                Posting::new("d1".to_string(), vec![0, 1, 2]),
                Posting::new("d2".to_string(), vec![0]),
            ]),
        );
        let lengths: HashMap<&str, u64> = [("d1", 6), ("d2", 6)].into_iter().collect();
        let ranked = Ranker::rank(&postings, 2, 6.0, |id| *lengths.get(id).unwrap(), 10);
        assert_eq!(ranked[0].doc_id, "d1");
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn deterministic_tie_break_by_doc_id() {
        let mut postings = HashMap::new();
        postings.insert(
            "rust".to_string(),
            PostingList::new(vec![
                Posting::new("d2".to_string(), vec![0]),
                Posting::new("d1".to_string(), vec![0]),
            ]),
        );
        let ranked = Ranker::rank(&postings, 2, 10.0, |_| 10, 10);
        assert_eq!(ranked[0].doc_id, "d1");
        assert_eq!(ranked[1].doc_id, "d2");
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn zero_avg_doc_len_guards_against_div_by_zero() {
        let mut postings = HashMap::new();
        postings.insert(
            "rust".to_string(),
            PostingList::new(vec![Posting::new("d1".to_string(), vec![0])]),
        );
        let ranked = Ranker::rank(&postings, 1, 0.0, |_| 0, 10);
        assert_eq!(ranked[0].score, 0.0);
    }

    #[test]
    fn limit_truncates_without_reordering() {
        let mut postings = HashMap::new();
        postings.insert(
            "rust".to_string(),
            PostingList::new(vec![
                Posting::new("d1".to_string(), vec![0]),
                Posting::new("d2".to_string(), vec![0]),
                Posting::new("d3".to_string(), vec![0]),
            ]),
        );
        let ranked = Ranker::rank(&postings, 3, 10.0, |_| 10, 2);
        assert_eq!(ranked.len(), 2);
    }
}

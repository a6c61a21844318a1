use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;

use crate::core::error::{Error, Result};
use crate::engine::router::ShardRouter;
use crate::engine::shard_engine::ShardEngine;
use crate::index::posting::{DocId, Posting, PostingList};
use crate::query::ast::{BooleanType, QueryPlan};
use crate::scoring::ranker::Ranker;
use crate::search::results::SearchResult;

struct ShardResult {
    postings_by_term: HashMap<String, PostingList>,
    total_docs: i64,
    avg_doc_len: f64,
    engine: Arc<ShardEngine>,
}

/// Fans a query plan out to every shard in parallel, merges posting lists,
/// reconciles cross-shard corpus statistics and ranks with BM25 (§4.8).
pub struct ShardedExecutor<'a> {
    router: &'a ShardRouter,
}

impl<'a> ShardedExecutor<'a> {
    pub fn new(router: &'a ShardRouter) -> Self {
        ShardedExecutor { router }
    }

    pub fn execute(&self, plan: &QueryPlan, limit: usize) -> Result<SearchResult> {
        if limit < 1 {
            return Err(Error::malformed("limit must be >= 1"));
        }
        if plan.is_empty() {
            return Ok(SearchResult {
                query: plan.raw_query.clone(),
                total_hits: 0,
                results: Vec::new(),
                term_stats: HashMap::new(),
            });
        }

        let shard_results = self.fan_out(plan)?;

        // Step 2: global corpus statistics.
        let global_total_docs: i64 = shard_results.iter().map(|sr| sr.total_docs).sum();
        let global_total_tokens: f64 = shard_results
            .iter()
            .map(|sr| sr.avg_doc_len * sr.total_docs as f64)
            .sum();
        let global_avg_doc_len = if global_total_docs > 0 {
            global_total_tokens / global_total_docs as f64
        } else {
            0.0
        };

        let engine_lookup = build_engine_lookup(&shard_results);

        // Step 3: merge postings per include term across shards.
        let merged_include = merge_postings(&shard_results, &plan.include_terms);
        let term_stats: HashMap<String, usize> = merged_include
            .iter()
            .map(|(term, list)| (term.clone(), list.len()))
            .collect();

        // Step 4: candidate set.
        let mut candidates = candidate_set(&merged_include, plan.query_type);

        // Step 5: exclusion.
        if !plan.exclude_terms.is_empty() {
            let merged_exclude = merge_postings(&shard_results, &plan.exclude_terms);
            let excluded: HashSet<DocId> = merged_exclude
                .values()
                .flat_map(|list| list.iter().map(|p| p.doc_id.clone()))
                .collect();
            candidates.retain(|doc_id| !excluded.contains(doc_id));
        }

        // Step 6: filter postings to the candidate set.
        let filtered: HashMap<String, PostingList> = merged_include
            .into_iter()
            .map(|(term, list)| {
                let filtered_postings: Vec<Posting> = list
                    .0
                    .into_iter()
                    .filter(|p| candidates.contains(&p.doc_id))
                    .collect();
                (term, PostingList(filtered_postings))
            })
            .collect();

        // Step 7: rank.
        let doc_length = |doc_id: &str| -> u64 {
            engine_lookup
                .get(doc_id)
                .map(|engine| engine.doc_length(doc_id))
                .unwrap_or(0)
        };
        let results = Ranker::rank(&filtered, global_total_docs, global_avg_doc_len, doc_length, limit);

        Ok(SearchResult {
            query: plan.raw_query.clone(),
            total_hits: candidates.len(),
            results,
            term_stats,
        })
    }

    fn fan_out(&self, plan: &QueryPlan) -> Result<Vec<ShardResult>> {
        let engines = self.router.all_engines();
        let terms: Vec<&str> = plan
            .include_terms
            .iter()
            .chain(plan.exclude_terms.iter())
            .map(|s| s.as_str())
            .collect();

        let outcomes: Vec<Option<ShardResult>> = engines
            .into_par_iter()
            .map(|(shard_id, engine)| match search_one_shard(&engine, &terms) {
                Ok(result) => Some(result),
                Err(err) => {
                    log::warn!("shard {shard_id} failed during fan-out: {err}");
                    None
                }
            })
            .collect();

        let results: Vec<ShardResult> = outcomes.into_iter().flatten().collect();
        if results.is_empty() {
            return Err(Error::shard_unavailable("all shards failed during fan-out"));
        }
        Ok(results)
    }
}

fn search_one_shard(engine: &Arc<ShardEngine>, terms: &[&str]) -> Result<ShardResult> {
    let mut postings_by_term = HashMap::with_capacity(terms.len());
    for term in terms {
        // `plan.include_terms`/`exclude_terms` already went through the
        // tokenizer once in `QueryParser::parse` (§4.7); the stemmer is not
        // idempotent, so `engine.search` (which re-stems) would look up the
        // wrong term here. `search_normalized` skips that.
        let list = engine.search_normalized(term)?;
        postings_by_term.insert((*term).to_string(), list);
    }
    Ok(ShardResult {
        postings_by_term,
        total_docs: engine.total_docs(),
        avg_doc_len: engine.avg_doc_length(),
        engine: Arc::clone(engine),
    })
}

fn build_engine_lookup(shard_results: &[ShardResult]) -> HashMap<DocId, Arc<ShardEngine>> {
    let mut lookup = HashMap::new();
    for sr in shard_results {
        for list in sr.postings_by_term.values() {
            for posting in list.iter() {
                lookup
                    .entry(posting.doc_id.clone())
                    .or_insert_with(|| Arc::clone(&sr.engine));
            }
        }
    }
    lookup
}

/// Concatenates postings for each of `terms` across shards. Shards
/// partition the document space, so no cross-shard duplicate `doc_id` is
/// expected (a single shard's own dedup still applies).
fn merge_postings(
    shard_results: &[ShardResult],
    terms: &[String],
) -> HashMap<String, PostingList> {
    let mut merged: HashMap<String, Vec<Posting>> =
        terms.iter().map(|t| (t.clone(), Vec::new())).collect();

    for sr in shard_results {
        for term in terms {
            if let Some(list) = sr.postings_by_term.get(term) {
                merged.get_mut(term).unwrap().extend(list.0.iter().cloned());
            }
        }
    }

    merged
        .into_iter()
        .map(|(term, postings)| (term, PostingList::new(postings)))
        .collect()
}

fn candidate_set(
    merged_include: &HashMap<String, PostingList>,
    query_type: BooleanType,
) -> HashSet<DocId> {
    let mut term_doc_sets: Vec<HashSet<DocId>> = merged_include
        .values()
        .map(|list| list.iter().map(|p| p.doc_id.clone()).collect())
        .collect();

    match query_type {
        BooleanType::Or => term_doc_sets
            .into_iter()
            .fold(HashSet::new(), |mut acc, set| {
                acc.extend(set);
                acc
            }),
        BooleanType::And => {
            if term_doc_sets.is_empty() {
                return HashSet::new();
            }
            term_doc_sets.sort_by_key(|s| s.len());
            let mut iter = term_doc_sets.into_iter();
            let mut acc = iter.next().unwrap();
            for set in iter {
                acc.retain(|doc_id| set.contains(doc_id));
            }
            acc
        }
    }
}

//! Integration tests for the concrete scenarios named in the spec's
//! testable-properties section (S1-S7), driven through the public
//! `ShardRouter`/`ShardedExecutor` API the way a deployment would use it.

use std::time::Duration;

use shardex::{Config, QueryParser, ShardRouter, ShardedExecutor};
use tempfile::tempdir;

fn router_with_shards(dir: &std::path::Path, shard_count: usize) -> ShardRouter {
    let config = Config {
        shard_count,
        data_dir: dir.to_path_buf(),
        ..Config::default()
    };
    ShardRouter::new(&config).unwrap()
}

fn ids(result: &shardex::SearchResult) -> Vec<&str> {
    result.results.iter().map(|r| r.doc_id.as_str()).collect()
}

/// S1: single-shard ingest + search, AND-combined by default.
#[test]
fn s1_single_shard_ingest_and_search() {
    let dir = tempdir().unwrap();
    let router = router_with_shards(dir.path(), 1);
    let engine = router.route(0).unwrap();
    engine.index_document("d1".to_string(), "the cat", "the cat sat on the mat").unwrap();
    engine.index_document("d2".to_string(), "dogs", "two dogs running").unwrap();
    engine.index_document("d3".to_string(), "cat and dog", "cat and dog playing").unwrap();

    let plan = QueryParser::parse("cat");
    let result = ShardedExecutor::new(&router).execute(&plan, 10).unwrap();

    assert_eq!(result.total_hits, 2);
    assert_eq!(ids(&result), vec!["d1", "d3"]);
    assert!(result.results[0].score > result.results[1].score);
}

/// S2: a flush between ingest and query leaves the result set and ranking unchanged.
#[test]
fn s2_flush_preserves_results() {
    let dir = tempdir().unwrap();
    let router = router_with_shards(dir.path(), 1);
    let engine = router.route(0).unwrap();
    engine.index_document("d1".to_string(), "the cat", "the cat sat on the mat").unwrap();
    engine.index_document("d2".to_string(), "dogs", "two dogs running").unwrap();
    engine.index_document("d3".to_string(), "cat and dog", "cat and dog playing").unwrap();
    engine.flush().unwrap();

    let plan = QueryParser::parse("cat");
    let result = ShardedExecutor::new(&router).execute(&plan, 10).unwrap();

    assert_eq!(result.total_hits, 2);
    assert_eq!(ids(&result), vec!["d1", "d3"]);
    assert!(result.results[0].score > result.results[1].score);
}

/// S3: `NOT` exclusion removes a document from the candidate set entirely.
#[test]
fn s3_not_exclusion() {
    let dir = tempdir().unwrap();
    let router = router_with_shards(dir.path(), 1);
    let engine = router.route(0).unwrap();
    engine.index_document("d1".to_string(), "apple pie", "apple pie recipe").unwrap();
    engine.index_document("d2".to_string(), "apple", "apple juice").unwrap();
    engine.index_document("d3".to_string(), "pie", "pie chart").unwrap();

    let plan = QueryParser::parse("apple NOT juice");
    let result = ShardedExecutor::new(&router).execute(&plan, 10).unwrap();

    assert_eq!(ids(&result), vec!["d1"]);
}

/// S4: `OR` unions per-term candidate sets.
#[test]
fn s4_or_union() {
    let dir = tempdir().unwrap();
    let router = router_with_shards(dir.path(), 1);
    let engine = router.route(0).unwrap();
    engine.index_document("d1".to_string(), "the cat", "the cat sat on the mat").unwrap();
    engine.index_document("d2".to_string(), "dogs", "two dogs running").unwrap();
    engine.index_document("d3".to_string(), "cat and dog", "cat and dog playing").unwrap();

    let plan = QueryParser::parse("cat OR dogs");
    let result = ShardedExecutor::new(&router).execute(&plan, 10).unwrap();

    assert_eq!(result.total_hits, 3);
}

/// S5: cross-shard ranking reconciles corpus stats from both shards; a
/// short high-TF document beats a sea of low-TF ones, with the remainder
/// resolved by ascending-docID tie-break.
#[test]
fn s5_cross_shard_ranking() {
    let dir = tempdir().unwrap();
    let router = router_with_shards(dir.path(), 2);

    let shard0 = router.route(0).unwrap();
    shard0
        .index_document(
            "short".to_string(),
            "rust rust rust",
            "rust rust filler filler filler filler filler",
        )
        .unwrap();

    let shard1 = router.route(1).unwrap();
    for i in 0..100 {
        let body = format!(
            "rust filler{i} filler{i} filler{i} filler{i} filler{i} filler{i} filler{i} filler{i} filler{i}"
        );
        shard1.index_document(format!("long{i:03}"), "", &body).unwrap();
    }
    for i in 0..5 {
        shard1
            .index_document(
                format!("noise{i}"),
                "",
                "filler filler filler filler filler filler filler filler filler filler",
            )
            .unwrap();
    }

    let plan = QueryParser::parse("rust");
    let result = ShardedExecutor::new(&router).execute(&plan, 3).unwrap();

    assert_eq!(result.results.len(), 3);
    assert_eq!(result.results[0].doc_id, "short");
    assert_eq!(result.results[1].doc_id, "long000");
    assert_eq!(result.results[2].doc_id, "long001");
}

/// S6: a segment survives an ungraceful restart (no `close()` call), and a
/// stray `.tmp` left behind by an interrupted write is ignored by recovery.
#[test]
fn s6_recovery_after_restart() {
    let dir = tempdir().unwrap();
    {
        let router = router_with_shards(dir.path(), 1);
        let engine = router.route(0).unwrap();
        engine.index_document("d1".to_string(), "rust", "rust is great").unwrap();
        engine.flush().unwrap();
        // router is dropped here without calling close() -- simulates a crash.
    }

    let shard0_dir = dir.path().join("shard-0");
    std::fs::write(shard0_dir.join("seg_999999999999.spdx.tmp"), b"not a real segment").unwrap();

    let reopened = router_with_shards(dir.path(), 1);
    let plan = QueryParser::parse("rust");
    let result = ShardedExecutor::new(&reopened).execute(&plan, 10).unwrap();

    assert_eq!(result.total_hits, 1);
    assert_eq!(ids(&result), vec!["d1"]);
}

/// S7: a segment written by one engine instance becomes visible to a
/// second, independently-opened engine via `reload_segments`.
#[test]
fn s7_hot_reload_across_processes() {
    let dir = tempdir().unwrap();
    let writer_router = router_with_shards(dir.path(), 1);
    writer_router
        .route(0)
        .unwrap()
        .index_document("d1".to_string(), "rust", "rust is great")
        .unwrap();
    writer_router.flush_all().unwrap();

    // A second router over the same data directory models a separate
    // searcher process that opened before the writer's flush landed.
    let reader_router = router_with_shards(dir.path(), 1);

    writer_router
        .route(0)
        .unwrap()
        .index_document("d2".to_string(), "rust again", "more rust content")
        .unwrap();
    writer_router.flush_all().unwrap();

    let reloaded = reader_router.reload_all().unwrap();
    assert_eq!(reloaded, 1);

    let plan = QueryParser::parse("rust");
    let result = ShardedExecutor::new(&reader_router).execute(&plan, 10).unwrap();
    assert_eq!(result.total_hits, 2);
}

/// The background flush loop performs a final synchronous flush on cancellation.
#[test]
fn flush_loop_final_flush_on_cancel() {
    let dir = tempdir().unwrap();
    let router = router_with_shards(dir.path(), 1);
    router
        .route(0)
        .unwrap()
        .index_document("d1".to_string(), "rust", "rust is great")
        .unwrap();

    let handles = router.start_flush_loops(Duration::from_secs(3600));
    for handle in handles {
        handle.stop();
    }

    let plan = QueryParser::parse("rust");
    let result = ShardedExecutor::new(&router).execute(&plan, 10).unwrap();
    assert_eq!(result.total_hits, 1);
}

/// Query limit ceiling/floor is a client-facing contract (§6.3); the
/// executor itself only enforces `limit >= 1` and truncation, leaving the
/// `max_query_limit` ceiling to the caller (the out-of-scope HTTP layer).
#[test]
fn limit_truncates_to_requested_k() {
    let dir = tempdir().unwrap();
    let router = router_with_shards(dir.path(), 1);
    let engine = router.route(0).unwrap();
    for i in 0..5 {
        engine.index_document(format!("d{i}"), "rust", "rust programming language").unwrap();
    }

    let plan = QueryParser::parse("rust");
    let result = ShardedExecutor::new(&router).execute(&plan, 2).unwrap();
    assert_eq!(result.results.len(), 2);
    assert_eq!(result.total_hits, 5);
}

/// A word whose single stem is itself further-stemmable must still be
/// findable: the index stores the one-pass stem, `QueryParser` normalizes
/// the query term exactly once too, and the executor must search shards
/// with that already-normalized term rather than re-stemming it (the
/// stemmer is not idempotent: `stem("additional") == "addition"`, and
/// `stem("addition") == "addit"`, which no document is ever stored under).
#[test]
fn word_with_further_stemmable_stem_is_still_findable() {
    let dir = tempdir().unwrap();
    let router = router_with_shards(dir.path(), 1);
    let engine = router.route(0).unwrap();
    engine
        .index_document("d1".to_string(), "additional", "additional features available")
        .unwrap();
    engine
        .index_document("d2".to_string(), "functional", "a functional requirement")
        .unwrap();

    let plan = QueryParser::parse("additional");
    let result = ShardedExecutor::new(&router).execute(&plan, 10).unwrap();
    assert_eq!(ids(&result), vec!["d1"]);

    let plan = QueryParser::parse("functional");
    let result = ShardedExecutor::new(&router).execute(&plan, 10).unwrap();
    assert_eq!(ids(&result), vec!["d2"]);
}

/// A document indexed concurrently with a background flush must never be
/// lost: `MemoryIndex::take` copies out and clears the index in one
/// exclusive critical section, so a document lands either in the snapshot
/// that gets published as a segment, or in the index that was already
/// cleared before the concurrent `index_document` call — never neither.
#[test]
fn concurrent_index_and_flush_never_loses_a_document() {
    use std::sync::{Arc, Barrier};

    let dir = tempdir().unwrap();
    let router = router_with_shards(dir.path(), 1);
    let engine = Arc::clone(router.route(0).unwrap());

    let barrier = Arc::new(Barrier::new(2));

    let flush_engine = Arc::clone(&engine);
    let flush_barrier = Arc::clone(&barrier);
    let flush_thread = std::thread::spawn(move || {
        flush_barrier.wait();
        for _ in 0..50 {
            flush_engine.flush().unwrap();
        }
    });

    let index_engine = Arc::clone(&engine);
    let index_barrier = Arc::clone(&barrier);
    let index_thread = std::thread::spawn(move || {
        index_barrier.wait();
        for i in 0..200 {
            index_engine
                .index_document(format!("d{i}"), "rust", "rust programming language")
                .unwrap();
        }
    });

    index_thread.join().unwrap();
    flush_thread.join().unwrap();
    engine.flush().unwrap();

    let plan = QueryParser::parse("rust");
    let result = ShardedExecutor::new(&router).execute(&plan, 200).unwrap();
    assert_eq!(result.total_hits, 200);
}

//! Sharded full-text search indexing and query core: a concurrent
//! memory+disk inverted index with atomic segment flush, a bit-exact
//! on-disk segment format with crash recovery, and a sharded query
//! executor that fans out, merges postings across shards and ranks with
//! BM25. See `DESIGN.md` for how each module is grounded.

pub mod analysis;
pub mod core;
pub mod engine;
pub mod index;
pub mod query;
pub mod scoring;
pub mod storage;
pub mod search;

pub use core::config::Config;
pub use core::error::{Error, ErrorKind, Result};
pub use core::types::IngestEvent;
pub use engine::{ShardEngine, ShardRouter};
pub use query::{BooleanType, QueryParser, QueryPlan};
pub use search::{ScoredDoc, SearchResult, ShardedExecutor};

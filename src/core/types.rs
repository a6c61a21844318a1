use chrono::{DateTime, Utc};

use crate::index::posting::DocId;

/// The ingest event contract consumed by `ShardRouter::ingest` (§6.2). The
/// event bus and validation that produce this struct are out of scope
/// (§1); the core only consumes it at the routing boundary.
#[derive(Debug, Clone)]
pub struct IngestEvent {
    pub document_id: DocId,
    pub title: String,
    pub body: String,
    pub shard_id: usize,
    pub ingested_at: DateTime<Utc>,
}

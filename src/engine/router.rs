use std::sync::Arc;

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::types::IngestEvent;
use crate::engine::shard_engine::{FlushLoopHandle, ShardEngine};

/// Fixed-size map from `shard_id` to `ShardEngine`; shard assignment
/// happens upstream (§4.6) and the router treats an incoming `shard_id` as
/// canonical.
pub struct ShardRouter {
    engines: Vec<Arc<ShardEngine>>,
}

impl ShardRouter {
    pub fn new(config: &Config) -> Result<Self> {
        let mut engines = Vec::with_capacity(config.shard_count);
        for shard_id in 0..config.shard_count {
            engines.push(Arc::new(ShardEngine::new(
                config.shard_dir(shard_id),
                config.segment_max_size,
            )?));
        }
        Ok(ShardRouter { engines })
    }

    pub fn route(&self, shard_id: usize) -> Result<&Arc<ShardEngine>> {
        self.engines
            .get(shard_id)
            .ok_or_else(|| Error::unknown_shard(shard_id, self.engines.len()))
    }

    /// Routes an ingest event to its declared shard and indexes it there
    /// (§6.2). `shard_id` is assumed canonical, assigned upstream by content
    /// hash; a `shard_id` outside `[0, N)` is a routing error and the event
    /// is discarded.
    pub fn ingest(&self, event: IngestEvent) -> Result<()> {
        let engine = self.route(event.shard_id)?;
        engine.index_document(event.document_id, &event.title, &event.body)
    }

    /// Snapshot copy of all engines, for fan-out.
    pub fn all_engines(&self) -> Vec<(usize, Arc<ShardEngine>)> {
        self.engines
            .iter()
            .cloned()
            .enumerate()
            .collect()
    }

    pub fn num_shards(&self) -> usize {
        self.engines.len()
    }

    /// Flushes every engine, attempting all even if one fails; returns the
    /// first error encountered, if any.
    pub fn flush_all(&self) -> Result<()> {
        let mut first_error = None;
        for engine in &self.engines {
            if let Err(err) = engine.flush() {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Re-scans every shard directory for segments written by another
    /// process; returns the total number of newly opened segments.
    pub fn reload_all(&self) -> Result<usize> {
        let mut total = 0;
        for engine in &self.engines {
            total += engine.reload_segments()?;
        }
        Ok(total)
    }

    pub fn start_flush_loops(&self, flush_interval: std::time::Duration) -> Vec<FlushLoopHandle> {
        self.engines
            .iter()
            .map(|engine| engine.start_flush_loop(flush_interval))
            .collect()
    }

    pub fn close(&self) -> Result<()> {
        let mut first_error = None;
        for engine in &self.engines {
            if let Err(err) = engine.close() {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

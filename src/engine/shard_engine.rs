use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel;
use parking_lot::{Mutex, RwLock};

use crate::analysis::tokenize;
use crate::core::error::{Error, ErrorKind, Result};
use crate::engine::cancel::{cancellation_pair, CancellationHandle, CancellationToken};
use crate::index::memory::MemoryIndex;
use crate::index::posting::{DocId, Posting, PostingList};
use crate::storage::layout::list_segment_files;
use crate::storage::segment_reader::SegmentReader;
use crate::storage::segment_writer::SegmentWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Running,
    Closing,
    Closed,
}

struct DocStats {
    doc_lengths: HashMap<DocId, u64>,
    total_docs: i64,
    total_tokens: i64,
}

impl DocStats {
    fn new() -> Self {
        DocStats {
            doc_lengths: HashMap::new(),
            total_docs: 0,
            total_tokens: 0,
        }
    }
}

/// One shard's data: its `MemoryIndex`, the segments flushed from it, and
/// per-document-length bookkeeping for BM25 (§4.5). Owns its data
/// directory exclusively.
pub struct ShardEngine {
    data_dir: PathBuf,
    segment_max_size: usize,
    mem_index: MemoryIndex,
    readers: RwLock<Vec<Arc<SegmentReader>>>,
    stats: RwLock<DocStats>,
    flush_lock: Mutex<()>,
    state: Mutex<EngineState>,
}

impl ShardEngine {
    /// Creates the data directory if needed and recovers any previously
    /// published segments, skipping ones that fail to open.
    pub fn new(data_dir: PathBuf, segment_max_size: usize) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)?;
        let mut readers = Vec::new();
        for path in list_segment_files(&data_dir)? {
            match SegmentReader::open(&path) {
                Ok(reader) => readers.push(Arc::new(reader)),
                Err(err) => {
                    log::warn!("skipping corrupt segment {}: {err}", path.display());
                }
            }
        }

        Ok(ShardEngine {
            data_dir,
            segment_max_size,
            mem_index: MemoryIndex::new(),
            readers: RwLock::new(readers),
            stats: RwLock::new(DocStats::new()),
            flush_lock: Mutex::new(()),
            state: Mutex::new(EngineState::Running),
        })
    }

    pub fn data_dir(&self) -> &std::path::Path {
        &self.data_dir
    }

    /// Tokenizes and indexes a document; triggers a synchronous flush if
    /// the in-memory index has grown past `segment_max_size`.
    pub fn index_document(&self, doc_id: DocId, title: &str, body: &str) -> Result<()> {
        if *self.state.lock() != EngineState::Running {
            return Err(Error::new(
                ErrorKind::Internal,
                "engine is closing and rejects new writes",
            ));
        }

        let combined = format!("{title} {body}");
        let token_count = tokenize(&combined).len() as u64;

        {
            let mut stats = self.stats.write();
            stats.doc_lengths.insert(doc_id.clone(), token_count);
            stats.total_docs += 1;
            stats.total_tokens += token_count as i64;
        }

        self.mem_index.add_document(doc_id, title, body);

        if self.mem_index.size() >= self.segment_max_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Flushes the `MemoryIndex` to a new segment. `MemoryIndex::take`
    /// copies out and clears the index in one exclusive critical section,
    /// so a document indexed concurrently either lands in the snapshot (and
    /// is durable once the segment publishes below) or is written after the
    /// clear (and stays live in the reset index) — never neither. If the
    /// segment write or open fails, the taken entries are restored into the
    /// index rather than lost. A second concurrent call that finds the
    /// index already empty is a safe no-op.
    pub fn flush(&self) -> Result<()> {
        let _guard = self.flush_lock.lock();
        let entries = self.mem_index.take();
        if entries.is_empty() {
            return Ok(());
        }

        // `entries` is cloned here so a write or open failure can restore
        // it into the index instead of losing it: `take()` already removed
        // it, and `SegmentWriter::write` consumes its argument by value.
        let path = match SegmentWriter::write(&self.data_dir, entries.clone()) {
            Ok(path) => path,
            Err(err) => {
                self.mem_index.restore(entries);
                return Err(err);
            }
        };
        let reader = match SegmentReader::open(&path) {
            Ok(reader) => reader,
            Err(err) => {
                self.mem_index.restore(entries);
                return Err(err);
            }
        };
        self.readers.write().push(Arc::new(reader));
        log::debug!("flushed segment {}", path.display());
        Ok(())
    }

    /// Tokenizes-and-stems `term`, searches the `MemoryIndex` and every
    /// open segment reader, and deduplicates by `doc_id` keeping the
    /// posting with the highest frequency (first occurrence wins ties).
    /// For ad-hoc callers that pass a raw, un-normalized word.
    pub fn search(&self, term: &str) -> Result<PostingList> {
        match crate::analysis::tokenizer::tokenize_single(term) {
            Some(normalized) => self.search_normalized(&normalized),
            None => Ok(PostingList::default()),
        }
    }

    /// Searches with `term` taken as already normalized — the stemmer is
    /// not idempotent, so re-stemming a term `QueryParser` already
    /// normalized (§4.7: "Terms are already normalized") can stem it a
    /// second time into a word no document ever stored under. The sharded
    /// executor calls this instead of `search`.
    pub fn search_normalized(&self, normalized: &str) -> Result<PostingList> {
        let mut best: HashMap<DocId, Posting> = HashMap::new();
        let mut order: Vec<DocId> = Vec::new();

        let mut merge = |list: PostingList| {
            for posting in list.0 {
                match best.get(&posting.doc_id) {
                    Some(existing) if existing.frequency >= posting.frequency => {}
                    Some(_) => {
                        best.insert(posting.doc_id.clone(), posting);
                    }
                    None => {
                        order.push(posting.doc_id.clone());
                        best.insert(posting.doc_id.clone(), posting);
                    }
                }
            }
        };

        merge(self.mem_index.search(normalized));

        let readers = self.readers.read().clone();
        for reader in readers.iter() {
            match reader.search(normalized) {
                Ok(list) => merge(list),
                Err(err) => {
                    log::warn!(
                        "segment {} failed during search: {err}",
                        reader.path().display()
                    );
                }
            }
        }

        let mut postings: Vec<Posting> = order.into_iter().map(|id| best.remove(&id).unwrap()).collect();
        postings.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
        Ok(PostingList(postings))
    }

    pub fn doc_length(&self, doc_id: &str) -> u64 {
        self.stats.read().doc_lengths.get(doc_id).copied().unwrap_or(0)
    }

    pub fn avg_doc_length(&self) -> f64 {
        let stats = self.stats.read();
        if stats.total_docs > 0 {
            stats.total_tokens as f64 / stats.total_docs as f64
        } else {
            0.0
        }
    }

    pub fn total_docs(&self) -> i64 {
        self.stats.read().total_docs
    }

    /// Spawns the periodic flush background task. Returns a handle whose
    /// `cancel()` requests a final synchronous flush and joins the thread.
    pub fn start_flush_loop(self: &Arc<Self>, flush_interval: Duration) -> FlushLoopHandle {
        let (handle, token) = cancellation_pair();
        let engine = Arc::clone(self);
        let join = std::thread::spawn(move || {
            engine.run_flush_loop(flush_interval, token);
        });
        FlushLoopHandle {
            cancel: handle,
            join: Some(join),
        }
    }

    fn run_flush_loop(&self, flush_interval: Duration, token: CancellationToken) {
        let ticker = channel::tick(flush_interval);
        loop {
            channel::select! {
                recv(ticker) -> _ => {
                    if self.mem_index.doc_count() > 0 {
                        if let Err(err) = self.flush() {
                            log::error!("periodic flush failed: {err}");
                        }
                    }
                }
                recv(token.receiver()) -> _ => {
                    if let Err(err) = self.flush() {
                        log::error!("final flush on cancellation failed: {err}");
                    }
                    break;
                }
            }
        }
    }

    /// Re-scans the data directory and opens any segment file not already
    /// represented among the open readers (matched by base filename).
    pub fn reload_segments(&self) -> Result<usize> {
        let known: std::collections::HashSet<PathBuf> = self
            .readers
            .read()
            .iter()
            .map(|r| r.path().to_path_buf())
            .collect();

        let mut opened = 0;
        for path in list_segment_files(&self.data_dir)? {
            if known.contains(&path) {
                continue;
            }
            match SegmentReader::open(&path) {
                Ok(reader) => {
                    self.readers.write().push(Arc::new(reader));
                    opened += 1;
                }
                Err(err) => {
                    log::warn!("skipping corrupt segment {}: {err}", path.display());
                }
            }
        }
        Ok(opened)
    }

    /// Final flush, then release all open segment readers.
    pub fn close(&self) -> Result<()> {
        *self.state.lock() = EngineState::Closing;
        let result = self.flush();
        self.readers.write().clear();
        *self.state.lock() = EngineState::Closed;
        result
    }
}

/// Handle to the background flush task started by `ShardEngine::start_flush_loop`.
pub struct FlushLoopHandle {
    cancel: CancellationHandle,
    join: Option<std::thread::JoinHandle<()>>,
}

impl FlushLoopHandle {
    /// Requests cancellation and blocks until the loop's final flush completes.
    pub fn stop(mut self) {
        self.cancel.cancel();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn index_and_search_before_flush() {
        let dir = tempdir().unwrap();
        let engine = ShardEngine::new(dir.path().to_path_buf(), 8 * 1024 * 1024).unwrap();
        engine
            .index_document("d1".to_string(), "the cat", "the cat sat on the mat")
            .unwrap();
        let postings = engine.search("cat").unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings.0[0].doc_id, "d1");
    }

    #[test]
    fn flush_preserves_search_results() {
        let dir = tempdir().unwrap();
        let engine = ShardEngine::new(dir.path().to_path_buf(), 8 * 1024 * 1024).unwrap();
        engine
            .index_document("d1".to_string(), "the cat", "the cat sat on the mat")
            .unwrap();
        engine.flush().unwrap();
        let postings = engine.search("cat").unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings.0[0].doc_id, "d1");
        assert_eq!(engine.mem_index.doc_count(), 0);
    }

    #[test]
    fn recovers_segments_on_restart() {
        let dir = tempdir().unwrap();
        {
            let engine = ShardEngine::new(dir.path().to_path_buf(), 8 * 1024 * 1024).unwrap();
            engine
                .index_document("d1".to_string(), "rust", "rust is great")
                .unwrap();
            engine.flush().unwrap();
        }
        // A stray temp file must be ignored by recovery.
        std::fs::write(dir.path().join("seg_999.spdx.tmp"), b"garbage").unwrap();

        let reopened = ShardEngine::new(dir.path().to_path_buf(), 8 * 1024 * 1024).unwrap();
        let postings = reopened.search("rust").unwrap();
        assert_eq!(postings.len(), 1);
    }

    #[test]
    fn reload_segments_picks_up_new_files() {
        let dir = tempdir().unwrap();
        let writer_engine = ShardEngine::new(dir.path().to_path_buf(), 8 * 1024 * 1024).unwrap();
        writer_engine
            .index_document("d1".to_string(), "rust", "rust is great")
            .unwrap();
        writer_engine.flush().unwrap();

        let reader_engine = ShardEngine::new(dir.path().to_path_buf(), 8 * 1024 * 1024).unwrap();
        writer_engine
            .index_document("d2".to_string(), "rust again", "more rust content")
            .unwrap();
        writer_engine.flush().unwrap();

        let opened = reader_engine.reload_segments().unwrap();
        assert_eq!(opened, 1);
        let postings = reader_engine.search("rust").unwrap();
        assert_eq!(postings.len(), 2);
    }
}

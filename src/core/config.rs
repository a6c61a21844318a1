use std::path::PathBuf;
use std::time::Duration;

/// Every tunable named in spec §3/§4/§6: shard count, segment flush
/// thresholds, reload cadence and query limits. Shard count must match
/// across ingest and search deployments (§4.6).
#[derive(Debug, Clone)]
pub struct Config {
    pub shard_count: usize,
    pub data_dir: PathBuf,
    /// `MemoryIndex.size()` threshold (bytes) that triggers a synchronous
    /// flush from `indexDocument` (§4.5).
    pub segment_max_size: usize,
    /// Cadence of the background flush loop (§4.5).
    pub flush_interval: Duration,
    /// Cadence of the searcher-side hot-reload scan (§6.4, default 10s).
    pub reload_interval: Duration,
    pub default_query_limit: usize,
    pub max_query_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            shard_count: 8,
            data_dir: PathBuf::from("./data"),
            segment_max_size: 8 * 1024 * 1024,
            flush_interval: Duration::from_secs(30),
            reload_interval: Duration::from_secs(10),
            default_query_limit: 10,
            max_query_limit: 100,
        }
    }
}

impl Config {
    pub fn shard_dir(&self, shard_id: usize) -> PathBuf {
        self.data_dir.join(format!("shard-{shard_id}"))
    }
}

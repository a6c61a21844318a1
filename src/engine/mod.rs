pub mod cancel;
pub mod router;
pub mod shard_engine;

pub use cancel::{CancellationHandle, CancellationToken};
pub use router::ShardRouter;
pub use shard_engine::ShardEngine;

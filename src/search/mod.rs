pub mod executor;
pub mod results;

pub use executor::ShardedExecutor;
pub use results::{ScoredDoc, SearchResult};

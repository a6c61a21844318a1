pub mod ranker;

pub use ranker::Ranker;

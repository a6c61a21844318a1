pub mod memory;
pub mod posting;

pub use memory::MemoryIndex;
pub use posting::{DocId, Posting, PostingList, TermEntry};

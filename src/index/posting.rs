use serde::{Deserialize, Serialize};

/// Documents are identified by an opaque string ID assigned upstream.
pub type DocId = String;

/// One `(term, document)` occurrence set within a single index partition
/// (a `MemoryIndex` or one `Segment`). Invariant: `frequency ==
/// positions.len()`; `positions` is non-decreasing by generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub frequency: u32,
    pub positions: Vec<u32>,
}

impl Posting {
    pub fn new(doc_id: DocId, positions: Vec<u32>) -> Self {
        let frequency = positions.len() as u32;
        Posting {
            doc_id,
            frequency,
            positions,
        }
    }
}

/// Ordered sequence of Postings for one term, sorted ascending by `doc_id`
/// whenever it's returned from any partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingList(pub Vec<Posting>);

impl PostingList {
    pub fn new(mut postings: Vec<Posting>) -> Self {
        postings.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
        PostingList(postings)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.0.iter()
    }
}

/// The unit serialized to a segment: one term and its posting list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermEntry {
    pub term: String,
    pub postings: PostingList,
}

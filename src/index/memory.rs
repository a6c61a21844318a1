use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::analysis::tokenize;
use crate::index::posting::{DocId, Posting, PostingList, TermEntry};

struct Inner {
    terms: HashMap<String, HashMap<DocId, Posting>>,
    doc_count: usize,
    estimated_bytes: usize,
}

impl Inner {
    fn new() -> Self {
        Inner {
            terms: HashMap::new(),
            doc_count: 0,
            estimated_bytes: 0,
        }
    }
}

/// Concurrent multi-reader/single-writer in-RAM inverted index (§4.2).
/// `addDocument`/`reset` take the exclusive lock; `search`/`snapshot`/`size`
/// take the shared lock.
pub struct MemoryIndex {
    inner: RwLock<Inner>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        MemoryIndex {
            inner: RwLock::new(Inner::new()),
        }
    }

    /// Tokenizes the combined `title`+`body` text and accumulates one
    /// Posting per distinct term, then installs them under the exclusive
    /// lock. Re-indexing an already-present `doc_id` overwrites its Posting
    /// for every involved term (§4.2 invariant) rather than merging with
    /// the prior occurrence.
    pub fn add_document(&self, doc_id: DocId, title: &str, body: &str) {
        let combined = format!("{title} {body}");
        let tokens = tokenize(&combined);

        let mut positions_by_term: HashMap<String, Vec<u32>> = HashMap::new();
        for token in tokens {
            positions_by_term
                .entry(token.term)
                .or_default()
                .push(token.position);
        }

        let mut inner = self.inner.write();
        for (term, positions) in positions_by_term {
            let heuristic = term.len() + doc_id.len() + 8 * positions.len() + 64;
            let posting = Posting::new(doc_id.clone(), positions);
            inner
                .terms
                .entry(term)
                .or_default()
                .insert(doc_id.clone(), posting);
            inner.estimated_bytes += heuristic;
        }
        inner.doc_count += 1;
    }

    /// Copies out postings for `term` sorted by `doc_id` under the shared lock.
    pub fn search(&self, term: &str) -> PostingList {
        let inner = self.inner.read();
        match inner.terms.get(term) {
            Some(by_doc) => PostingList::new(by_doc.values().cloned().collect()),
            None => PostingList::default(),
        }
    }

    /// Value-copy snapshot sorted by term, each entry's postings sorted by
    /// `doc_id`, safe to use without further synchronization.
    pub fn snapshot(&self) -> Vec<TermEntry> {
        let inner = self.inner.read();
        let mut entries: Vec<TermEntry> = inner
            .terms
            .iter()
            .map(|(term, by_doc)| TermEntry {
                term: term.clone(),
                postings: PostingList::new(by_doc.values().cloned().collect()),
            })
            .collect();
        entries.sort_by(|a, b| a.term.cmp(&b.term));
        entries
    }

    pub fn size(&self) -> usize {
        self.inner.read().estimated_bytes
    }

    pub fn doc_count(&self) -> usize {
        self.inner.read().doc_count
    }

    /// Clears all maps and zeros counters in one exclusive critical section.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.terms.clear();
        inner.doc_count = 0;
        inner.estimated_bytes = 0;
    }

    /// Atomically takes a sorted-by-term snapshot and clears the index in
    /// one exclusive critical section, so a flush can never lose a document
    /// indexed between a separate snapshot-then-reset pair: nothing can be
    /// added between the copy and the clear because both happen under the
    /// same write lock.
    pub fn take(&self) -> Vec<TermEntry> {
        let mut inner = self.inner.write();
        let mut entries: Vec<TermEntry> = inner
            .terms
            .iter()
            .map(|(term, by_doc)| TermEntry {
                term: term.clone(),
                postings: PostingList::new(by_doc.values().cloned().collect()),
            })
            .collect();
        entries.sort_by(|a, b| a.term.cmp(&b.term));

        inner.terms.clear();
        inner.doc_count = 0;
        inner.estimated_bytes = 0;
        entries
    }

    /// Merges previously `take`n entries back in, for when the flush that
    /// took them failed downstream (segment write or open). A `(term,
    /// doc_id)` pair already present — from a document indexed after the
    /// failed `take()` — is left alone; the newer posting wins over the
    /// stale restored one.
    pub fn restore(&self, entries: Vec<TermEntry>) {
        let mut inner = self.inner.write();
        let mut restored_docs: HashSet<DocId> = HashSet::new();
        for entry in entries {
            let term = entry.term;
            let heuristic_term_len = term.len();
            let by_doc = inner.terms.entry(term).or_default();
            for posting in entry.postings.0 {
                if by_doc.contains_key(&posting.doc_id) {
                    continue;
                }
                let heuristic = heuristic_term_len + posting.doc_id.len() + 8 * posting.positions.len() + 64;
                restored_docs.insert(posting.doc_id.clone());
                by_doc.insert(posting.doc_id.clone(), posting);
                inner.estimated_bytes += heuristic;
            }
        }
        inner.doc_count += restored_docs.len();
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use parking_lot::Mutex;

use crate::core::error::{Error, Result};
use crate::index::posting::PostingList;
use crate::storage::segment::{DictEntry, SegmentFooter, SegmentHeader, FOOTER_SIZE, HEADER_SIZE};

/// Read-only handle onto a published, immutable `.spdx` segment. Opens the
/// header and dictionary once; posting-list blobs are read on demand and
/// never cached here (§4.4 invariant) — callers (the engine) may cache.
pub struct SegmentReader {
    path: PathBuf,
    header: SegmentHeader,
    dict: Vec<DictEntry>,
    file: Mutex<File>,
}

impl SegmentReader {
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_len = file.metadata()?.len();
        if file_len < (HEADER_SIZE + FOOTER_SIZE) as u64 {
            return Err(Error::corrupt_segment("file shorter than header+footer"));
        }

        let mut header_buf = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_buf)?;
        let header = SegmentHeader::from_bytes(&header_buf)?;

        if header.dict_offset < 0
            || header.dict_size < 0
            || header.dict_offset as u64 + header.dict_size as u64 > file_len
        {
            return Err(Error::corrupt_segment("dictionary region out of bounds"));
        }

        let mut dict_bytes = vec![0u8; header.dict_size as usize];
        file.seek(SeekFrom::Start(header.dict_offset as u64))?;
        file.read_exact(&mut dict_bytes).map_err(|_| {
            Error::corrupt_segment("truncated dictionary")
        })?;

        let mut footer_buf = [0u8; FOOTER_SIZE];
        file.seek(SeekFrom::Start(file_len - FOOTER_SIZE as u64))?;
        file.read_exact(&mut footer_buf)?;
        let footer = SegmentFooter::from_bytes(&footer_buf)?;

        let mut hasher = Hasher::new();
        hasher.update(&dict_bytes);
        if hasher.finalize() != footer.dict_crc32 {
            return Err(Error::corrupt_segment("dictionary CRC mismatch"));
        }

        let dict: Vec<DictEntry> = bincode::deserialize(&dict_bytes)
            .map_err(|e| Error::corrupt_segment(format!("malformed dictionary: {e}")))?;

        Ok(SegmentReader {
            path: path.to_path_buf(),
            header,
            dict,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Binary searches the in-memory dictionary; on a hit, reads the
    /// addressed byte range and deserializes it. Missing term => empty list.
    pub fn search(&self, term: &str) -> Result<PostingList> {
        let found = self
            .dict
            .binary_search_by(|entry| entry.term.as_str().cmp(term))
            .ok()
            .map(|idx| &self.dict[idx]);

        let entry = match found {
            Some(entry) => entry,
            None => return Ok(PostingList::default()),
        };

        let start = self.header.post_offset + entry.relative_offset;
        let mut buf = vec![0u8; entry.length as usize];
        {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(start as u64))?;
            file.read_exact(&mut buf)?;
        }
        let postings: PostingList = bincode::deserialize(&buf)?;
        Ok(postings)
    }

    pub fn terms(&self) -> usize {
        self.dict.len()
    }

    pub fn doc_count(&self) -> usize {
        self.header.doc_count as usize
    }

    /// No-op beyond documentation: the file handle is released when the
    /// last `Arc<SegmentReader>` referencing it is dropped.
    pub fn close(&self) {}
}

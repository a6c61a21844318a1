use std::collections::HashSet;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crc32fast::Hasher;

use crate::core::error::{Error, Result};
use crate::index::posting::TermEntry;
use crate::storage::layout::{final_segment_path, temp_segment_path};
use crate::storage::segment::{DictEntry, SegmentFooter, SegmentHeader, HEADER_SIZE, MAGIC, VERSION};

/// Writes a new `.spdx` segment atomically (§4.3): temp file, fsync,
/// rename into place. A crash before rename leaves only the `.tmp` file,
/// which recovery ignores.
pub struct SegmentWriter;

impl SegmentWriter {
    /// Writes `entries` (need not be pre-sorted; they are sorted by term
    /// here) into a new segment under `dir` and returns the published path.
    pub fn write(dir: &Path, mut entries: Vec<TermEntry>) -> Result<PathBuf> {
        if entries.is_empty() {
            return Err(Error::malformed("cannot write a segment with no entries"));
        }
        std::fs::create_dir_all(dir)?;
        entries.sort_by(|a, b| a.term.cmp(&b.term));

        let created_at_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let temp_path = temp_segment_path(dir, created_at_nanos);
        let mut file = File::create(&temp_path)?;

        // Step 3: header placeholder.
        file.write_all(&[0u8; HEADER_SIZE])?;

        // Step 4: postings region.
        let postings_start = HEADER_SIZE as i64;
        let mut current_offset = postings_start;
        let mut dict_entries = Vec::with_capacity(entries.len());
        let mut unique_docs: HashSet<&str> = HashSet::new();

        for entry in &entries {
            let encoded = bincode::serialize(&entry.postings)?;
            let relative_offset = current_offset - postings_start;
            file.write_all(&encoded)?;
            current_offset += encoded.len() as i64;

            for posting in entry.postings.iter() {
                unique_docs.insert(posting.doc_id.as_str());
            }

            dict_entries.push(DictEntry {
                term: entry.term.clone(),
                relative_offset,
                length: encoded.len() as i64,
                doc_freq: entry.postings.len() as u32,
            });
        }
        let postings_size = current_offset - postings_start;

        // Step 5: dictionary region.
        let dict_start = current_offset;
        let dict_bytes = bincode::serialize(&dict_entries)?;
        file.write_all(&dict_bytes)?;
        let dict_size = dict_bytes.len() as i64;

        // Step 6: footer.
        let mut hasher = Hasher::new();
        hasher.update(&dict_bytes);
        let footer = SegmentFooter {
            dict_crc32: hasher.finalize(),
            unique_doc_count: unique_docs.len() as u32,
            dict_start,
            dict_size,
            post_size: postings_size,
        };
        file.write_all(&footer.to_bytes())?;

        // Step 7: rewrite the header with final values.
        let header = SegmentHeader {
            magic: MAGIC,
            version: VERSION,
            term_count: entries.len() as u32,
            doc_count: unique_docs.len() as u32,
            dict_offset: dict_start,
            dict_size,
            post_offset: postings_start,
            post_size: postings_size,
        };
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&header.to_bytes())?;

        // Step 8: durability, then atomic publish.
        file.sync_all()?;
        drop(file);
        let final_path = final_segment_path(&temp_path);
        std::fs::rename(&temp_path, &final_path)?;

        Ok(final_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::posting::{Posting, PostingList};
    use tempfile::tempdir;

    fn sample_entries() -> Vec<TermEntry> {
        vec![
            TermEntry {
                term: "cat".to_string(),
                postings: PostingList::new(vec![Posting::new("d1".to_string(), vec![0, 4])]),
            },
            TermEntry {
                term: "mat".to_string(),
                postings: PostingList::new(vec![Posting::new("d1".to_string(), vec![5])]),
            },
        ]
    }

    #[test]
    fn rejects_empty_entries() {
        let dir = tempdir().unwrap();
        assert!(SegmentWriter::write(dir.path(), vec![]).is_err());
    }

    #[test]
    fn writes_published_file_not_tmp() {
        let dir = tempdir().unwrap();
        let path = SegmentWriter::write(dir.path(), sample_entries()).unwrap();
        assert_eq!(path.extension().unwrap(), "spdx");
        assert!(path.exists());
        let tmp_candidates: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(tmp_candidates.is_empty());
    }
}

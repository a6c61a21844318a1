use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// `0x53504458` — "SPDX" read as little-endian bytes.
pub const MAGIC: u32 = 0x5350_4458;
pub const VERSION: u32 = 1;
pub const HEADER_SIZE: usize = 64;
pub const FOOTER_SIZE: usize = 32;

/// 64-byte fixed little-endian header (§6.1). Field widths and order are
/// part of the on-disk contract: do not resize or reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    pub magic: u32,
    pub version: u32,
    pub term_count: u32,
    pub doc_count: u32,
    pub dict_offset: i64,
    pub dict_size: i64,
    pub post_offset: i64,
    pub post_size: i64,
}

impl SegmentHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.version.to_le_bytes());
        buf[8..12].copy_from_slice(&self.term_count.to_le_bytes());
        buf[12..16].copy_from_slice(&self.doc_count.to_le_bytes());
        buf[16..24].copy_from_slice(&self.dict_offset.to_le_bytes());
        buf[24..32].copy_from_slice(&self.dict_size.to_le_bytes());
        buf[32..40].copy_from_slice(&self.post_offset.to_le_bytes());
        buf[40..48].copy_from_slice(&self.post_size.to_le_bytes());
        // bytes 48..64 stay reserved/zeroed.
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::corrupt_segment("truncated header"));
        }
        let header = SegmentHeader {
            magic: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            version: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            term_count: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            doc_count: u32::from_le_bytes(buf[12..16].try_into().unwrap()),
            dict_offset: i64::from_le_bytes(buf[16..24].try_into().unwrap()),
            dict_size: i64::from_le_bytes(buf[24..32].try_into().unwrap()),
            post_offset: i64::from_le_bytes(buf[32..40].try_into().unwrap()),
            post_size: i64::from_le_bytes(buf[40..48].try_into().unwrap()),
        };
        if header.magic != MAGIC {
            return Err(Error::corrupt_segment(format!(
                "bad magic: {:#x}",
                header.magic
            )));
        }
        if header.version != VERSION {
            return Err(Error::corrupt_segment(format!(
                "unsupported version: {}",
                header.version
            )));
        }
        Ok(header)
    }
}

/// 32-byte footer written after the dictionary blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentFooter {
    pub dict_crc32: u32,
    pub unique_doc_count: u32,
    pub dict_start: i64,
    pub dict_size: i64,
    pub post_size: i64,
}

impl SegmentFooter {
    pub fn to_bytes(&self) -> [u8; FOOTER_SIZE] {
        let mut buf = [0u8; FOOTER_SIZE];
        buf[0..4].copy_from_slice(&self.dict_crc32.to_le_bytes());
        buf[4..8].copy_from_slice(&self.unique_doc_count.to_le_bytes());
        buf[8..16].copy_from_slice(&self.dict_start.to_le_bytes());
        buf[16..24].copy_from_slice(&self.dict_size.to_le_bytes());
        buf[24..32].copy_from_slice(&self.post_size.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < FOOTER_SIZE {
            return Err(Error::corrupt_segment("truncated footer"));
        }
        Ok(SegmentFooter {
            dict_crc32: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            unique_doc_count: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            dict_start: i64::from_le_bytes(buf[8..16].try_into().unwrap()),
            dict_size: i64::from_le_bytes(buf[16..24].try_into().unwrap()),
            post_size: i64::from_le_bytes(buf[24..32].try_into().unwrap()),
        })
    }
}

/// One dictionary entry: a term and where to find its posting-list blob,
/// relative to the postings region start. The dictionary itself (a
/// `Vec<DictEntry>`, sorted by term) is encoded with `bincode` so it stays
/// self-describing without hand-rolled length framing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictEntry {
    pub term: String,
    pub relative_offset: i64,
    pub length: i64,
    pub doc_freq: u32,
}

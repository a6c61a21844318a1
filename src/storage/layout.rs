use std::path::{Path, PathBuf};

/// `.spdx` segments published into a shard's data directory, named
/// `seg_<unixNanos>.spdx` so lexicographic order matches creation order
/// (§4.5 recovery scan relies on this).
pub const SEGMENT_EXTENSION: &str = "spdx";
pub const TEMP_EXTENSION: &str = "spdx.tmp";

pub fn temp_segment_path(dir: &Path, created_at_nanos: u128) -> PathBuf {
    dir.join(format!("seg_{created_at_nanos}.{TEMP_EXTENSION}"))
}

pub fn final_segment_path(temp_path: &Path) -> PathBuf {
    let name = temp_path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let final_name = name.trim_end_matches(".tmp");
    temp_path.with_file_name(final_name)
}

/// Lists `*.spdx` entries in a directory, sorted ascending by file name
/// (ordering by creation time because names carry nanosecond timestamps).
pub fn list_segment_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().and_then(|ext| ext.to_str()) == Some(SEGMENT_EXTENSION)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

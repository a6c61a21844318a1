use std::fmt;

/// Taxonomy from the error-handling design: deterministic failures (bad
/// input, unknown shard) return immediately; transient ones (corrupt
/// segment, shard unavailable) are handled per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    UnknownShard,
    CorruptSegment,
    IoFailure,
    ShardUnavailable,
    Internal,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error {
            kind,
            context: context.into(),
        }
    }

    pub fn malformed(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::MalformedInput, context)
    }

    pub fn unknown_shard(shard_id: usize, num_shards: usize) -> Self {
        Error::new(
            ErrorKind::UnknownShard,
            format!("shard {shard_id} out of range [0, {num_shards})"),
        )
    }

    pub fn corrupt_segment(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::CorruptSegment, context)
    }

    pub fn shard_unavailable(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::ShardUnavailable, context)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(ErrorKind::IoFailure, err.to_string())
    }
}

impl From<Box<bincode::ErrorKind>> for Error {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        Error::new(ErrorKind::Internal, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

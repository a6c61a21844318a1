pub mod layout;
pub mod segment;
pub mod segment_reader;
pub mod segment_writer;

pub use segment_reader::SegmentReader;
pub use segment_writer::SegmentWriter;

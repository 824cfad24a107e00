//! Scatter-gather buffer types: the owned [`SegmentBuffer`] and a forward
//! [`SegmentReader`] cursor over its bytes.

pub mod reader;
pub mod segment;

pub use reader::{ReadUnderrun, SegmentReader};
pub use segment::{BufferError, OwnershipMode, SegmentBuffer};

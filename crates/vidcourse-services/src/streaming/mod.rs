//! Byte-range streaming from the origin store or through the CDN.

pub mod range;
pub mod source;
pub mod streamer;

pub use range::{resolve_range, RangeWindow};
pub use source::{CdnSource, ObjectSource, OriginSource};
pub use streamer::{RangeStreamer, StreamedObject};

//! Resumable, markable, counted input abstractions (`spec.md` §3.3).

mod byte_source;
mod char_source;

pub use byte_source::{ByteSource, PartialByteSource, SliceByteSource};
pub use char_source::{Charset, CodingErrorAction, CharSource, Utf8CharSource, sniff_charset};

//! CBOR dialect support (`spec.md` §4.2, §4.5; RFC 8949): a resumable reader
//! and a configurable writer, both built on the shared
//! [`Event`](crate::event::Event) vocabulary.

mod options;
mod reader;
mod tags;
mod writer;

pub use options::{BigDecimalTag, CborReaderOptions, CborWriterOptions};
pub use reader::CborReader;
pub use tags::{
    is_known_tag, TAG_BIGDECIMAL10, TAG_BIGFLOAT, TAG_DATETIME, TAG_DECIMAL_FRACTION,
    TAG_ENCODED_CBOR, TAG_EPOCH_DATETIME, TAG_EXPECTED_BASE16, TAG_EXPECTED_BASE64,
    TAG_EXPECTED_BASE64URL, TAG_NEGATIVE_BIGNUM, TAG_POSITIVE_BIGNUM, TAG_SELF_DESCRIBE_CBOR,
    TAG_URI,
};
pub use writer::CborWriter;

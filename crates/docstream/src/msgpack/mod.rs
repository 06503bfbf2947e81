//! Msgpack dialect support (`spec.md` §4.3, §4.5): every container, string,
//! and buffer declares its length upfront — there is no indefinite-length
//! framing at all, unlike CBOR.

mod options;
mod reader;
mod writer;

pub use options::{MsgpackReaderOptions, MsgpackWriterOptions};
pub use reader::MsgpackReader;
pub use writer::MsgpackWriter;

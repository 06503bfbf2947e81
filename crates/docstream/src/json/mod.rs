//! JSON dialect support (`spec.md` §4.1, §4.4): a lenient-superset reader and
//! a configurable writer, both built on the shared [`Event`](crate::event::Event)
//! vocabulary.

mod nfc;
mod numbers;
mod options;
mod reader;
mod writer;

pub use options::{CborDiag, JsonReaderOptions, JsonWriterOptions};
pub use reader::JsonReader;
pub use writer::JsonWriter;

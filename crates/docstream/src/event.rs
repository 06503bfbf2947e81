//! The shared event vocabulary that every reader produces and every writer,
//! the [`Builder`](crate::builder), and the [`Emitter`](crate::emitter)
//! consume.
//!
//! `Event` is a closed set (`spec.md` §3.1): readers for JSON, CBOR, and
//! Msgpack all emit the same vocabulary, and writers for all three consume
//! it, which is what lets this crate implement three wire formats without
//! three duplicated document models.
//!
//! # Examples
//!
//! ```
//! use docstream::{Event, Primitive};
//!
//! let events = [
//!     Event::ListStart { size: Some(2) },
//!     Event::Primitive(Primitive::Int(1)),
//!     Event::Primitive(Primitive::Bool(true)),
//!     Event::ListEnd,
//! ];
//! assert_eq!(events.len(), 4);
//! ```

use alloc::{string::String, vec::Vec};

use crate::value::{BigInt, Decimal};

/// A single JSON/CBOR/Msgpack scalar, as carried by [`Event::Primitive`].
///
/// This is the event-stream counterpart of [`Value`](crate::value::Value)'s
/// scalar variants; it excludes `List`/`Map` because those are represented
/// as `*Start`/`*End` event pairs instead, and it excludes the chunked
/// string/buffer representation (`StringStart`/`StringData`/`StringEnd`),
/// which the reader chooses between based on
/// `fast_string_length`/indefinite-length framing.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(any(test, feature = "serde"), serde(tag = "kind"))]
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A signed integer that fits in 64 bits.
    Int(i64),
    /// An unsigned integer that fits in 64 bits but not in `i64` (CBOR/
    /// Msgpack unsigned integers above `i64::MAX`).
    UInt(u64),
    /// An integer too large for 64 bits (CBOR tag 2/3; JSON integers that
    /// overflow both lanes).
    BigInt(BigInt),
    /// A binary64 floating-point value.
    Float(f64),
    /// A decimal value expressed as `mantissa * 10^exponent` (CBOR tag
    /// 4/1363; JSON `big_decimal` mode).
    Decimal(Decimal),
    Bool(bool),
    Null,
    /// CBOR/Msgpack `undefined`. Never produced by the JSON reader.
    Undefined,
    /// A complete ("short-form") string, as opposed to the chunked
    /// `StringStart`/`StringData`/`StringEnd` sequence used for long or
    /// indefinite-length strings.
    String(String),
}

/// One step of a document stream.
///
/// See `spec.md` §3.1 for the full invariants: the stream is well-balanced,
/// `MapStart(Some(n))` is followed by exactly `2n` child events before
/// `MapEnd`, a `Tag` only ever precedes another `Tag`, a container start, a
/// `Primitive`, or a `Simple`, and indefinite-length string/buffer chunks may
/// split a UTF-8 code point or byte sequence across chunk boundaries.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(any(test, feature = "serde"), serde(tag = "event"))]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Begin a map. `size` is `None` for an indefinite-length container.
    MapStart { size: Option<u64> },
    /// End the innermost open map.
    MapEnd,
    /// Begin an ordered sequence. `size` is `None` for an indefinite-length
    /// container.
    ListStart { size: Option<u64> },
    /// End the innermost open list.
    ListEnd,
    /// Begin a chunked string. `byte_len` is the total UTF-8 byte length
    /// when known up front, `None` for an indefinite-length string.
    StringStart { byte_len: Option<u64> },
    /// One chunk of a chunked string's content. May split a UTF-8 code point
    /// across adjacent `StringData` events; implementations must not assume
    /// otherwise.
    StringData(String),
    /// End the innermost open chunked string.
    StringEnd,
    /// Begin a chunked opaque byte sequence. `byte_len` is the total length
    /// when known up front, `None` for an indefinite-length buffer.
    BufferStart { byte_len: Option<u64> },
    /// One chunk of a chunked buffer's content.
    BufferData(Vec<u8>),
    /// End the innermost open chunked buffer.
    BufferEnd,
    /// A complete scalar value.
    Primitive(Primitive),
    /// Attach a CBOR/Msgpack tag to the single next produced value. May only
    /// be immediately followed by another `Tag`, a container `*Start`, a
    /// `Primitive`, or a `Simple` — never by a `*End` or `*Data` event.
    Tag(u64),
    /// A CBOR major-type-7 simple value outside the recognized set (i.e. not
    /// `false`/`true`/`null`/`undefined` and not one of the three float
    /// widths): `0..=19` or `32..=255`.
    Simple(u8),
}

impl Event {
    /// Returns `true` for the three container-opening events.
    #[must_use]
    pub fn is_start(&self) -> bool {
        matches!(
            self,
            Event::MapStart { .. } | Event::ListStart { .. } | Event::StringStart { .. } | Event::BufferStart { .. }
        )
    }

    /// Returns `true` for the four container-closing events.
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(
            self,
            Event::MapEnd | Event::ListEnd | Event::StringEnd | Event::BufferEnd
        )
    }

    /// Returns `true` if this event may legally follow a `Tag` event
    /// (`spec.md` §3.1: "never by `*End` or `*Data`").
    #[must_use]
    pub fn is_taggable(&self) -> bool {
        matches!(
            self,
            Event::MapStart { .. }
                | Event::ListStart { .. }
                | Event::StringStart { .. }
                | Event::BufferStart { .. }
                | Event::Primitive(_)
                | Event::Simple(_)
                | Event::Tag(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_may_precede_start_and_primitive_and_simple() {
        assert!(Event::MapStart { size: None }.is_taggable());
        assert!(Event::ListStart { size: Some(0) }.is_taggable());
        assert!(Event::StringStart { byte_len: None }.is_taggable());
        assert!(Event::BufferStart { byte_len: None }.is_taggable());
        assert!(Event::Primitive(Primitive::Null).is_taggable());
        assert!(Event::Simple(5).is_taggable());
        assert!(Event::Tag(7).is_taggable());
    }

    #[test]
    fn tag_may_not_precede_end_or_data() {
        assert!(!Event::MapEnd.is_taggable());
        assert!(!Event::ListEnd.is_taggable());
        assert!(!Event::StringEnd.is_taggable());
        assert!(!Event::BufferEnd.is_taggable());
        assert!(!Event::StringData(String::new()).is_taggable());
        assert!(!Event::BufferData(Vec::new()).is_taggable());
    }
}

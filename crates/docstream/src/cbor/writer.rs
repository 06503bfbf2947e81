//! The CBOR writer (`spec.md` §4.5, RFC 8949): an [`EventSink`] that renders
//! a well-balanced event stream as CBOR bytes.
//!
//! Grounded on [`JsonWriter`](crate::json::JsonWriter)'s frame-stack shape
//! (`before_value`/`enter_value`/suppression for `max_container_size`), with
//! the JSON-specific text-escaping machinery replaced by RFC 8949 header
//! encoding, and on `facet-msgpack`'s length-prefixed-frame writer style for
//! the `sorted`-keys buffering.

use alloc::vec::Vec;

use crate::cbor::options::{BigDecimalTag, CborWriterOptions};
use crate::cbor::tags::{TAG_BIGDECIMAL10, TAG_DECIMAL_FRACTION, TAG_NEGATIVE_BIGNUM, TAG_POSITIVE_BIGNUM};
use crate::error::WriteError;
use crate::event::{Event, Primitive};
use crate::sink::EventSink;
use crate::value::BigInt;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BUFFER: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE: u8 = 7;
const BREAK: u8 = 0xFF;

/// A buffered serialized entry inside a `sorted` map frame: the encoded key
/// bytes and the encoded value bytes that followed it.
type SortEntry = (Vec<u8>, Vec<u8>);

#[derive(Debug)]
enum Frame {
    Array {
        /// Declared element count (`None` for indefinite).
        declared: Option<u64>,
        written: u64,
    },
    Map {
        /// Declared pair count (`None` for indefinite).
        declared: Option<u64>,
        written_pairs: u64,
        awaiting_value: bool,
        /// Present when `options.sorted` is set: buffers each entry's
        /// serialized bytes instead of writing straight to the output, so
        /// they can be re-ordered by key on `MapEnd`.
        sort_buffer: Option<Vec<SortEntry>>,
    },
}

/// Tracks a value being silently dropped because `max_container_size` capped
/// its enclosing container, mirroring [`JsonWriter`](crate::json::JsonWriter)'s
/// `Suppression`.
#[derive(Debug, Clone, Copy)]
struct Suppression {
    remaining_units: u32,
    nested_depth: u32,
}

/// Open-string/open-buffer bookkeeping. For an indefinite-length string or
/// buffer, each `StringData`/`BufferData` chunk writes its own inner
/// definite-length header, so `remaining` goes unused. For a definite-length
/// one, the header commits to a total byte count at `*Start` time (`spec.md`
/// §4.5: "emit header with byte length `n` exactly once, then stream chunks
/// as their raw bytes") — `remaining` is that committed total, decremented as
/// chunks are written, and caps further bytes once `max_string_length`/
/// truncation has capped it below the event's own declared length.
#[derive(Debug, Clone, Copy)]
struct ChunkState {
    indefinite: bool,
    remaining: u64,
}

/// Writes CBOR bytes incrementally as [`Event`]s arrive.
///
/// Like [`JsonWriter`](crate::json::JsonWriter), every event either completes
/// immediately or is rejected with [`WriteError::InvalidState`]; there is no
/// suspension. Output accumulates in an internal buffer retrieved with
/// [`CborWriter::finish`].
pub struct CborWriter {
    options: CborWriterOptions,
    out: Vec<u8>,
    stack: Vec<Frame>,
    pending_tag: Option<u64>,
    /// `Some(_)` while a chunked string is open.
    chunked_string: Option<ChunkState>,
    /// `Some(_)` while a chunked buffer is open.
    chunked_buffer: Option<ChunkState>,
    /// Nested capture buffers for `sorted` map key/value slots currently
    /// being written. A stack rather than a single buffer because a sorted
    /// map's value may itself be another sorted map: the inner map pushes
    /// its own capture for its own keys/values while the outer map's capture
    /// (holding everything written so far for its own in-progress slot)
    /// waits underneath, untouched, until the inner map finishes.
    capture_stack: Vec<Vec<u8>>,
    wrote_top_level: bool,
    suppress: Option<Suppression>,
}

impl CborWriter {
    #[must_use]
    pub fn new(options: CborWriterOptions) -> Self {
        Self {
            options,
            out: Vec::new(),
            stack: Vec::new(),
            pending_tag: None,
            chunked_string: None,
            chunked_buffer: None,
            capture_stack: Vec::new(),
            wrote_top_level: false,
            suppress: None,
        }
    }

    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.out
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    /// Where the next bytes go: the innermost open `sorted`-map capture
    /// buffer, or the real output if none is open.
    fn sink(&mut self) -> &mut Vec<u8> {
        if let Some(buf) = self.capture_stack.last_mut() {
            buf
        } else {
            &mut self.out
        }
    }

    fn write_header(&mut self, major: u8, arg: u64) {
        let prefix = major << 5;
        if arg <= 23 {
            self.sink().push(prefix | arg as u8);
        } else if arg <= u64::from(u8::MAX) {
            let b = arg as u8;
            self.sink().extend_from_slice(&[prefix | 24, b]);
        } else if arg <= u64::from(u16::MAX) {
            let bytes = (arg as u16).to_be_bytes();
            self.sink().push(prefix | 25);
            self.sink().extend_from_slice(&bytes);
        } else if arg <= u64::from(u32::MAX) {
            let bytes = (arg as u32).to_be_bytes();
            self.sink().push(prefix | 26);
            self.sink().extend_from_slice(&bytes);
        } else {
            let bytes = arg.to_be_bytes();
            self.sink().push(prefix | 27);
            self.sink().extend_from_slice(&bytes);
        }
    }

    fn write_indefinite_header(&mut self, major: u8) {
        self.sink().push((major << 5) | 31);
    }

    fn write_break(&mut self) {
        self.sink().push(BREAK);
    }

    fn write_tag_prefix(&mut self) {
        if let Some(tag) = self.pending_tag.take() {
            self.write_header(MAJOR_TAG, tag);
        }
    }

    fn write_bignum(&mut self, b: &BigInt) {
        let tag = if b.negative { TAG_NEGATIVE_BIGNUM } else { TAG_POSITIVE_BIGNUM };
        self.write_header(MAJOR_TAG, tag);
        self.write_header(MAJOR_BUFFER, b.magnitude.len() as u64);
        let bytes = b.magnitude.clone();
        self.sink().extend_from_slice(&bytes);
    }

    fn write_primitive(&mut self, p: &Primitive) {
        match p {
            Primitive::Int(n) if *n >= 0 => self.write_header(MAJOR_UNSIGNED, *n as u64),
            Primitive::Int(n) => self.write_header(MAJOR_NEGATIVE, (-1i128 - i128::from(*n)) as u64),
            Primitive::UInt(n) => self.write_header(MAJOR_UNSIGNED, *n),
            Primitive::BigInt(b) => {
                if let Some(n) = bigint_fits_major01(b) {
                    let major = if b.negative { MAJOR_NEGATIVE } else { MAJOR_UNSIGNED };
                    self.write_header(major, n);
                } else {
                    self.write_bignum(b);
                }
            }
            Primitive::Float(f) => self.write_float(*f),
            Primitive::Decimal(d) => {
                let tag = match self.options.decimal_tag {
                    BigDecimalTag::Rfc8949 => TAG_DECIMAL_FRACTION,
                    BigDecimalTag::Decimal10 => TAG_BIGDECIMAL10,
                };
                self.write_header(MAJOR_TAG, tag);
                self.write_header(MAJOR_ARRAY, 2);
                self.write_primitive(&Primitive::Int(d.exponent));
                match d.mantissa.to_i64() {
                    Some(n) => self.write_primitive(&Primitive::Int(n)),
                    None => self.write_primitive(&Primitive::BigInt(d.mantissa.clone())),
                }
            }
            Primitive::Bool(false) => self.sink().push((MAJOR_SIMPLE << 5) | 20),
            Primitive::Bool(true) => self.sink().push((MAJOR_SIMPLE << 5) | 21),
            Primitive::Null => self.sink().push((MAJOR_SIMPLE << 5) | 22),
            Primitive::Undefined => self.sink().push((MAJOR_SIMPLE << 5) | 23),
            Primitive::String(s) => {
                self.write_header(MAJOR_TEXT, s.len() as u64);
                let bytes = s.as_bytes().to_vec();
                self.sink().extend_from_slice(&bytes);
            }
        }
    }

    /// `spec.md` §4.5: "prefer the smallest of binary16/32/64 that
    /// round-trips exactly; baseline implementations MAY always emit
    /// binary32 for `f32` and binary64 for `f64`." This writer takes the
    /// baseline path: `Primitive::Float` only ever carries an `f64`, so
    /// binary64 is always emitted.
    fn write_float(&mut self, f: f64) {
        self.sink().push((MAJOR_SIMPLE << 5) | 27);
        let bytes = f.to_bits().to_be_bytes();
        self.sink().extend_from_slice(&bytes);
    }

    fn write_simple(&mut self, code: u8) {
        if code <= 23 {
            self.sink().push((MAJOR_SIMPLE << 5) | code);
        } else {
            self.sink().extend_from_slice(&[(MAJOR_SIMPLE << 5) | 24, code]);
        }
    }

    /// Mirrors [`JsonWriter::before_value`](crate::json::JsonWriter): advances
    /// the current frame's bookkeeping and reports whether `max_container_size`
    /// caps this slot. Also opens/closes the `sorted`-map capture buffer
    /// around each key and each value.
    fn before_value(&mut self) -> Result<bool, WriteError> {
        match self.stack.last_mut() {
            None => {
                if self.wrote_top_level {
                    return Err(WriteError::InvalidState(
                        "a value was already written at the top level".into(),
                    ));
                }
                Ok(true)
            }
            Some(Frame::Array { declared, written }) => {
                if let Some(max) = self.options.max_container_size {
                    if *written as usize >= max {
                        return Ok(false);
                    }
                }
                if let Some(n) = declared {
                    if *written >= *n {
                        return Err(WriteError::InvalidState(
                            "more array elements written than declared".into(),
                        ));
                    }
                }
                *written += 1;
                Ok(true)
            }
            Some(Frame::Map {
                declared,
                written_pairs,
                awaiting_value,
                sort_buffer,
            }) => {
                if !*awaiting_value {
                    if let Some(max) = self.options.max_container_size {
                        if *written_pairs as usize >= max {
                            return Ok(false);
                        }
                    }
                    if let Some(n) = declared {
                        if *written_pairs >= *n {
                            return Err(WriteError::InvalidState(
                                "more map pairs written than declared".into(),
                            ));
                        }
                    }
                    if sort_buffer.is_some() {
                        self.capture_stack.push(Vec::new());
                    }
                } else if sort_buffer.is_some() {
                    self.capture_stack.push(Vec::new());
                }
                *awaiting_value = !*awaiting_value;
                if !*awaiting_value {
                    *written_pairs += 1;
                }
                Ok(true)
            }
        }
    }

    /// Called once a scalar value (or a just-closed container) finishes
    /// writing, to file a captured `sorted`-map key/value into its frame's
    /// buffer. A no-op unless the enclosing frame is a `sorted` map, which is
    /// exactly when `before_value` pushed a capture for this slot.
    fn commit_value(&mut self) {
        let Some(Frame::Map { sort_buffer: Some(_), .. }) = self.stack.last() else {
            return;
        };
        let bytes = self
            .capture_stack
            .pop()
            .expect("before_value pushed a capture for this sorted-map slot");
        let Some(Frame::Map { sort_buffer: Some(buf), awaiting_value, .. }) = self.stack.last_mut() else {
            unreachable!("checked above")
        };
        // `awaiting_value` was already flipped by `before_value`: `true`
        // means the slot just committed was a key, `false` means a value.
        if *awaiting_value {
            buf.push((bytes, Vec::new()));
        } else {
            buf.last_mut().expect("key committed before its value").1 = bytes;
        }
    }

    fn after_top_level_value(&mut self) {
        if self.stack.is_empty() {
            self.wrote_top_level = true;
        }
    }

    fn enter_value(&mut self, is_start: bool) -> Result<bool, WriteError> {
        if self.before_value()? {
            return Ok(true);
        }
        let mut units = match self.stack.last() {
            Some(Frame::Map { .. }) => 2,
            _ => 1,
        };
        self.pending_tag = None;
        let nested_depth = if is_start {
            1
        } else {
            units -= 1;
            0
        };
        self.suppress = if units == 0 {
            None
        } else {
            Some(Suppression {
                remaining_units: units,
                nested_depth,
            })
        };
        Ok(false)
    }

    fn on_event_suppressed(&mut self, event: &Event) {
        let s = self.suppress.as_mut().expect("on_event_suppressed called while not suppressing");
        if s.nested_depth > 0 {
            if event.is_start() {
                s.nested_depth += 1;
            } else if event.is_end() {
                s.nested_depth -= 1;
                if s.nested_depth == 0 {
                    s.remaining_units -= 1;
                }
            }
        } else if event.is_start() {
            s.nested_depth = 1;
        } else if !matches!(event, Event::Tag(_)) {
            s.remaining_units -= 1;
        }
        if self.suppress.map(|s| s.remaining_units) == Some(0) {
            self.suppress = None;
        }
    }
}

fn bigint_fits_major01(b: &BigInt) -> Option<u64> {
    if b.magnitude.len() > 8 {
        return None;
    }
    let mut buf = [0u8; 8];
    buf[8 - b.magnitude.len()..].copy_from_slice(&b.magnitude);
    let mag = u64::from_be_bytes(buf);
    if b.negative {
        // Major type 1 stores `n` such that value = -1 - n, i.e. n = mag - 1.
        mag.checked_sub(1)
    } else {
        Some(mag)
    }
}

impl EventSink<WriteError> for CborWriter {
    fn on_event(&mut self, event: Event) -> Result<bool, WriteError> {
        if self.suppress.is_some() {
            self.on_event_suppressed(&event);
            return Ok(true);
        }
        match event {
            Event::Tag(tag) => {
                if self.pending_tag.is_some() {
                    return Err(WriteError::InvalidState("a tag is already pending".into()));
                }
                self.pending_tag = Some(tag);
                Ok(true)
            }
            Event::MapStart { size } => {
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                let declared = match size {
                    Some(n) => {
                        self.write_header(MAJOR_MAP, n);
                        Some(n)
                    }
                    None => {
                        self.write_indefinite_header(MAJOR_MAP);
                        None
                    }
                };
                self.stack.push(Frame::Map {
                    declared,
                    written_pairs: 0,
                    awaiting_value: false,
                    sort_buffer: self.options.sorted.then(Vec::new),
                });
                Ok(true)
            }
            Event::MapEnd => match self.stack.pop() {
                Some(Frame::Map {
                    declared,
                    written_pairs,
                    awaiting_value,
                    sort_buffer,
                }) => {
                    if awaiting_value {
                        return Err(WriteError::InvalidState(
                            "MapEnd with an odd number of key/value events".into(),
                        ));
                    }
                    if let Some(n) = declared {
                        if written_pairs != n {
                            return Err(WriteError::InvalidState(
                                "MapEnd with fewer map pairs than declared".into(),
                            ));
                        }
                    } else {
                        self.write_break();
                    }
                    if let Some(mut entries) = sort_buffer {
                        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                        let sink = self.sink();
                        for (key, value) in entries {
                            sink.extend_from_slice(&key);
                            sink.extend_from_slice(&value);
                        }
                    }
                    self.commit_value();
                    self.after_top_level_value();
                    Ok(true)
                }
                _ => Err(WriteError::InvalidState("MapEnd without matching MapStart".into())),
            },
            Event::ListStart { size } => {
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                let declared = match size {
                    Some(n) => {
                        self.write_header(MAJOR_ARRAY, n);
                        Some(n)
                    }
                    None => {
                        self.write_indefinite_header(MAJOR_ARRAY);
                        None
                    }
                };
                self.stack.push(Frame::Array { declared, written: 0 });
                Ok(true)
            }
            Event::ListEnd => match self.stack.pop() {
                Some(Frame::Array { declared, written }) => {
                    if let Some(n) = declared {
                        if written != n {
                            return Err(WriteError::InvalidState(
                                "ListEnd with fewer array elements than declared".into(),
                            ));
                        }
                    } else {
                        self.write_break();
                    }
                    self.commit_value();
                    self.after_top_level_value();
                    Ok(true)
                }
                _ => Err(WriteError::InvalidState("ListEnd without matching ListStart".into())),
            },
            Event::StringStart { byte_len } => {
                if self.chunked_string.is_some() {
                    return Err(WriteError::InvalidState("nested StringStart".into()));
                }
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                let state = match byte_len {
                    Some(n) => {
                        let capped = match self.options.max_string_length {
                            Some(max) => n.min(max as u64),
                            None => n,
                        };
                        self.write_header(MAJOR_TEXT, capped);
                        ChunkState { indefinite: false, remaining: capped }
                    }
                    None => {
                        self.write_indefinite_header(MAJOR_TEXT);
                        ChunkState { indefinite: true, remaining: 0 }
                    }
                };
                self.chunked_string = Some(state);
                Ok(true)
            }
            Event::StringData(chunk) => {
                let Some(state) = self.chunked_string else {
                    return Err(WriteError::InvalidState("StringData without StringStart".into()));
                };
                let truncated = match self.options.max_string_length {
                    Some(max) if chunk.len() > max => {
                        let mut end = max.min(chunk.len());
                        while end > 0 && !chunk.is_char_boundary(end) {
                            end -= 1;
                        }
                        &chunk[..end]
                    }
                    _ => chunk.as_str(),
                };
                if state.indefinite {
                    // `spec.md` §4.5: each chunk of an indefinite-length string
                    // is its own inner definite-length text string.
                    self.write_header(MAJOR_TEXT, truncated.len() as u64);
                    let bytes = truncated.as_bytes().to_vec();
                    self.sink().extend_from_slice(&bytes);
                } else {
                    // The header already committed to `state.remaining` total
                    // bytes; never write more than that, char-boundary safe.
                    let mut end = (state.remaining as usize).min(truncated.len());
                    while end > 0 && !truncated.is_char_boundary(end) {
                        end -= 1;
                    }
                    let kept = &truncated[..end];
                    let bytes = kept.as_bytes().to_vec();
                    self.sink().extend_from_slice(&bytes);
                    if let Some(ChunkState { remaining, .. }) = self.chunked_string.as_mut() {
                        *remaining -= kept.len() as u64;
                    }
                }
                Ok(true)
            }
            Event::StringEnd => {
                let Some(state) = self.chunked_string.take() else {
                    return Err(WriteError::InvalidState("StringEnd without StringStart".into()));
                };
                if state.indefinite {
                    self.write_break();
                }
                self.commit_value();
                self.after_top_level_value();
                Ok(true)
            }
            Event::BufferStart { byte_len } => {
                if self.chunked_buffer.is_some() {
                    return Err(WriteError::InvalidState("nested BufferStart".into()));
                }
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                let state = match byte_len {
                    Some(n) => {
                        self.write_header(MAJOR_BUFFER, n);
                        ChunkState { indefinite: false, remaining: n }
                    }
                    None => {
                        self.write_indefinite_header(MAJOR_BUFFER);
                        ChunkState { indefinite: true, remaining: 0 }
                    }
                };
                self.chunked_buffer = Some(state);
                Ok(true)
            }
            Event::BufferData(bytes) => {
                let Some(state) = self.chunked_buffer else {
                    return Err(WriteError::InvalidState("BufferData without BufferStart".into()));
                };
                if state.indefinite {
                    self.write_header(MAJOR_BUFFER, bytes.len() as u64);
                    self.sink().extend_from_slice(&bytes);
                } else {
                    let take = (state.remaining as usize).min(bytes.len());
                    self.sink().extend_from_slice(&bytes[..take]);
                    if let Some(ChunkState { remaining, .. }) = self.chunked_buffer.as_mut() {
                        *remaining -= take as u64;
                    }
                }
                Ok(true)
            }
            Event::BufferEnd => {
                let Some(state) = self.chunked_buffer.take() else {
                    return Err(WriteError::InvalidState("BufferEnd without BufferStart".into()));
                };
                if state.indefinite {
                    self.write_break();
                }
                self.commit_value();
                self.after_top_level_value();
                Ok(true)
            }
            Event::Primitive(p) => {
                if !self.enter_value(false)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                self.write_primitive(&p);
                self.commit_value();
                self.after_top_level_value();
                Ok(true)
            }
            Event::Simple(code) => {
                if !self.enter_value(false)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                self.write_simple(code);
                self.commit_value();
                self.after_top_level_value();
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Decimal;

    fn write(events: Vec<Event>, options: CborWriterOptions) -> Vec<u8> {
        let mut w = CborWriter::new(options);
        for e in events {
            w.on_event(e).unwrap();
        }
        w.finish()
    }

    #[test]
    fn writes_small_unsigned_int() {
        assert_eq!(write(alloc::vec![Event::Primitive(Primitive::Int(5))], CborWriterOptions::default()), alloc::vec![0x05]);
    }

    #[test]
    fn writes_negative_int() {
        assert_eq!(write(alloc::vec![Event::Primitive(Primitive::Int(-10))], CborWriterOptions::default()), alloc::vec![0x29]);
    }

    #[test]
    fn definite_length_string_header_is_written_once_across_chunks() {
        let events = alloc::vec![
            Event::StringStart { byte_len: Some(4) },
            Event::StringData("ab".into()),
            Event::StringData("cd".into()),
            Event::StringEnd,
        ];
        // text(4) "abcd" — a single header, not one per chunk.
        assert_eq!(
            write(events, CborWriterOptions::default()),
            alloc::vec![0x64, b'a', b'b', b'c', b'd']
        );
    }

    #[test]
    fn max_string_length_caps_declared_header_and_drops_overflow() {
        let events = alloc::vec![
            Event::StringStart { byte_len: Some(4) },
            Event::StringData("ab".into()),
            Event::StringData("cd".into()),
            Event::StringEnd,
        ];
        let options = CborWriterOptions {
            max_string_length: Some(3),
            ..Default::default()
        };
        // text(3) "abc" — header capped to 3, the trailing "d" dropped.
        assert_eq!(write(events, options), alloc::vec![0x63, b'a', b'b', b'c']);
    }

    #[test]
    fn writes_definite_array() {
        let events = alloc::vec![
            Event::ListStart { size: Some(2) },
            Event::Primitive(Primitive::Int(1)),
            Event::Primitive(Primitive::Int(2)),
            Event::ListEnd,
        ];
        assert_eq!(write(events, CborWriterOptions::default()), alloc::vec![0x82, 0x01, 0x02]);
    }

    #[test]
    fn writes_indefinite_array_with_break() {
        let events = alloc::vec![
            Event::ListStart { size: None },
            Event::Primitive(Primitive::Int(1)),
            Event::ListEnd,
        ];
        assert_eq!(write(events, CborWriterOptions::default()), alloc::vec![0x9F, 0x01, BREAK]);
    }

    #[test]
    fn writes_definite_map() {
        let events = alloc::vec![
            Event::MapStart { size: Some(1) },
            Event::Primitive(Primitive::String("a".into())),
            Event::Primitive(Primitive::Int(1)),
            Event::MapEnd,
        ];
        assert_eq!(write(events, CborWriterOptions::default()), alloc::vec![0xA1, 0x61, b'a', 0x01]);
    }

    #[test]
    fn writes_tag_then_value() {
        let events = alloc::vec![Event::Tag(2), Event::Primitive(Primitive::Int(5))];
        assert_eq!(write(events, CborWriterOptions::default()), alloc::vec![0xC2, 0x05]);
    }

    #[test]
    fn sorts_map_keys_when_requested() {
        let events = alloc::vec![
            Event::MapStart { size: Some(2) },
            Event::Primitive(Primitive::String("b".into())),
            Event::Primitive(Primitive::Int(1)),
            Event::Primitive(Primitive::String("a".into())),
            Event::Primitive(Primitive::Int(2)),
            Event::MapEnd,
        ];
        let options = CborWriterOptions {
            sorted: true,
            ..Default::default()
        };
        let bytes = write(events, options);
        assert_eq!(bytes, alloc::vec![0xA2, 0x61, b'a', 0x02, 0x61, b'b', 0x01]);
    }

    #[test]
    fn writes_decimal_as_rfc8949_tag_by_default() {
        let d = Decimal {
            mantissa: BigInt::from_i64(123),
            exponent: -2,
        };
        let events = alloc::vec![Event::Primitive(Primitive::Decimal(d))];
        let bytes = write(events, CborWriterOptions::default());
        assert_eq!(bytes[0], 0xC4); // tag(4)
        assert_eq!(bytes[1], 0x82); // array(2)
    }

    #[test]
    fn writes_decimal_as_decimal10_tag_when_configured() {
        let d = Decimal {
            mantissa: BigInt::from_i64(123),
            exponent: -2,
        };
        let events = alloc::vec![Event::Primitive(Primitive::Decimal(d))];
        let options = CborWriterOptions {
            decimal_tag: BigDecimalTag::Decimal10,
            ..Default::default()
        };
        let bytes = write(events, options);
        // tag(1363): 0xD9 0x05 0x53
        assert_eq!(&bytes[..3], &[0xD9, 0x05, 0x53]);
    }

    #[test]
    fn rejects_unbalanced_map_end() {
        let mut w = CborWriter::new(CborWriterOptions::default());
        assert!(w.on_event(Event::MapEnd).is_err());
    }

    #[test]
    fn max_container_size_truncates_array() {
        let events = alloc::vec![
            Event::ListStart { size: None },
            Event::Primitive(Primitive::Int(1)),
            Event::Primitive(Primitive::Int(2)),
            Event::Primitive(Primitive::Int(3)),
            Event::ListEnd,
        ];
        let options = CborWriterOptions {
            max_container_size: Some(2),
            ..Default::default()
        };
        assert_eq!(write(events, options), alloc::vec![0x9F, 0x01, 0x02, BREAK]);
    }

    #[test]
    fn rejects_primitive_bigint_encoding_roundtrip() {
        let b = BigInt {
            negative: true,
            magnitude: alloc::vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        };
        let events = alloc::vec![Event::Primitive(Primitive::BigInt(b))];
        let bytes = write(events, CborWriterOptions::default());
        assert_eq!(bytes[0], 0xC3); // tag(3): negative bignum
    }
}

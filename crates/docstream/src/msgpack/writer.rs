//! The Msgpack writer (`spec.md` §4.5): an [`EventSink`] that renders a
//! well-balanced event stream as Msgpack bytes.
//!
//! Grounded on [`CborWriter`](crate::cbor::CborWriter)'s frame-stack,
//! suppression, and `sorted`-map capture-buffer design, adapted to
//! Msgpack's constraint that every container/string/buffer declares its
//! length upfront (`spec.md` §4.3 "no indefinite-length containers"; §4.5
//! "Msgpack writer rejects `None`") — there is no indefinite branch, and a
//! chunked string/buffer writes its header exactly once.

use alloc::vec::Vec;

use crate::cbor::{TAG_DECIMAL_FRACTION, TAG_NEGATIVE_BIGNUM, TAG_POSITIVE_BIGNUM};
use crate::error::WriteError;
use crate::event::{Event, Primitive};
use crate::msgpack::options::MsgpackWriterOptions;
use crate::sink::EventSink;
use crate::value::{BigInt, Decimal};

const NIL: u8 = 0xc0;
const FALSE: u8 = 0xc2;
const TRUE: u8 = 0xc3;
const BIN8: u8 = 0xc4;
const BIN16: u8 = 0xc5;
const BIN32: u8 = 0xc6;
const EXT8: u8 = 0xc7;
const EXT16: u8 = 0xc8;
const EXT32: u8 = 0xc9;
const FLOAT64: u8 = 0xcb;
const UINT8: u8 = 0xcc;
const UINT16: u8 = 0xcd;
const UINT32: u8 = 0xce;
const UINT64: u8 = 0xcf;
const INT8: u8 = 0xd0;
const INT16: u8 = 0xd1;
const INT32: u8 = 0xd2;
const INT64: u8 = 0xd3;
const FIXEXT1: u8 = 0xd4;
const FIXEXT2: u8 = 0xd5;
const FIXEXT4: u8 = 0xd6;
const FIXEXT8: u8 = 0xd7;
const FIXEXT16: u8 = 0xd8;
const STR8: u8 = 0xd9;
const STR16: u8 = 0xda;
const STR32: u8 = 0xdb;
const ARRAY16: u8 = 0xdc;
const ARRAY32: u8 = 0xdd;
const MAP16: u8 = 0xde;
const MAP32: u8 = 0xdf;

const FIXMAP_MIN: u8 = 0x80;
const FIXARRAY_MIN: u8 = 0x90;
const FIXSTR_MIN: u8 = 0xa0;
const POSFIXINT_MAX: u8 = 0x7f;

/// A buffered serialized entry inside a `sorted` map frame: the encoded key
/// bytes and the encoded value bytes that followed it.
type SortEntry = (Vec<u8>, Vec<u8>);

#[derive(Debug)]
enum Frame {
    Array {
        declared: u64,
        written: u64,
    },
    Map {
        declared: u64,
        written_pairs: u64,
        awaiting_value: bool,
        sort_buffer: Option<Vec<SortEntry>>,
    },
}

#[derive(Debug, Clone, Copy)]
struct Suppression {
    remaining_units: u32,
    nested_depth: u32,
}

/// Writes Msgpack bytes incrementally as [`Event`]s arrive. Same calling
/// convention as [`CborWriter`](crate::cbor::CborWriter): every event
/// completes immediately or is rejected with [`WriteError::InvalidState`].
pub struct MsgpackWriter {
    options: MsgpackWriterOptions,
    out: Vec<u8>,
    stack: Vec<Frame>,
    /// A `Tag` event awaiting the `BufferStart` it must attach to as an
    /// `ext` type byte (`spec.md` §4.3: ext types round-trip as `Tag(n)` +
    /// buffer). Any other event while a tag is pending is a `WriteError`,
    /// since Msgpack has no way to attach a type byte to a non-buffer value.
    pending_tag: Option<u64>,
    /// Bytes still owed for an open definite-length string/buffer, after
    /// the header already committed to a total.
    chunked_string: Option<u64>,
    chunked_buffer: Option<u64>,
    capture_stack: Vec<Vec<u8>>,
    wrote_top_level: bool,
    suppress: Option<Suppression>,
}

impl MsgpackWriter {
    #[must_use]
    pub fn new(options: MsgpackWriterOptions) -> Self {
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

    fn sink(&mut self) -> &mut Vec<u8> {
        if let Some(buf) = self.capture_stack.last_mut() {
            buf
        } else {
            &mut self.out
        }
    }

    fn write_array_header(&mut self, n: u64) -> Result<(), WriteError> {
        match n {
            0..=15 => self.sink().push(FIXARRAY_MIN | n as u8),
            n if n <= u64::from(u16::MAX) => {
                self.sink().push(ARRAY16);
                let bytes = (n as u16).to_be_bytes();
                self.sink().extend_from_slice(&bytes);
            }
            n if n <= u64::from(u32::MAX) => {
                self.sink().push(ARRAY32);
                let bytes = (n as u32).to_be_bytes();
                self.sink().extend_from_slice(&bytes);
            }
            _ => return Err(WriteError::InvalidState("array has more than u32::MAX elements".into())),
        }
        Ok(())
    }

    fn write_map_header(&mut self, n: u64) -> Result<(), WriteError> {
        match n {
            0..=15 => self.sink().push(FIXMAP_MIN | n as u8),
            n if n <= u64::from(u16::MAX) => {
                self.sink().push(MAP16);
                let bytes = (n as u16).to_be_bytes();
                self.sink().extend_from_slice(&bytes);
            }
            n if n <= u64::from(u32::MAX) => {
                self.sink().push(MAP32);
                let bytes = (n as u32).to_be_bytes();
                self.sink().extend_from_slice(&bytes);
            }
            _ => return Err(WriteError::InvalidState("map has more than u32::MAX pairs".into())),
        }
        Ok(())
    }

    fn write_str_header(&mut self, n: u64) -> Result<(), WriteError> {
        match n {
            0..=31 => self.sink().push(FIXSTR_MIN | n as u8),
            n if n <= u64::from(u8::MAX) => self.sink().extend_from_slice(&[STR8, n as u8]),
            n if n <= u64::from(u16::MAX) => {
                self.sink().push(STR16);
                let bytes = (n as u16).to_be_bytes();
                self.sink().extend_from_slice(&bytes);
            }
            n if n <= u64::from(u32::MAX) => {
                self.sink().push(STR32);
                let bytes = (n as u32).to_be_bytes();
                self.sink().extend_from_slice(&bytes);
            }
            _ => return Err(WriteError::InvalidState("string longer than u32::MAX bytes".into())),
        }
        Ok(())
    }

    fn write_bin_header(&mut self, n: u64) -> Result<(), WriteError> {
        match n {
            n if n <= u64::from(u8::MAX) => self.sink().extend_from_slice(&[BIN8, n as u8]),
            n if n <= u64::from(u16::MAX) => {
                self.sink().push(BIN16);
                let bytes = (n as u16).to_be_bytes();
                self.sink().extend_from_slice(&bytes);
            }
            n if n <= u64::from(u32::MAX) => {
                self.sink().push(BIN32);
                let bytes = (n as u32).to_be_bytes();
                self.sink().extend_from_slice(&bytes);
            }
            _ => return Err(WriteError::InvalidState("buffer longer than u32::MAX bytes".into())),
        }
        Ok(())
    }

    /// `type_byte` is the `ext` type, Msgpack's signed `i8` bit-cast to `u8`
    /// the same way [`MsgpackReader`](super::reader::MsgpackReader) decodes
    /// it back — see that module's `start_ext` doc comment.
    fn write_ext_header(&mut self, n: u64, type_byte: u8) -> Result<(), WriteError> {
        match n {
            1 => self.sink().extend_from_slice(&[FIXEXT1, type_byte]),
            2 => self.sink().extend_from_slice(&[FIXEXT2, type_byte]),
            4 => self.sink().extend_from_slice(&[FIXEXT4, type_byte]),
            8 => self.sink().extend_from_slice(&[FIXEXT8, type_byte]),
            16 => self.sink().extend_from_slice(&[FIXEXT16, type_byte]),
            n if n <= u64::from(u8::MAX) => self.sink().extend_from_slice(&[EXT8, n as u8, type_byte]),
            n if n <= u64::from(u16::MAX) => {
                self.sink().push(EXT16);
                let bytes = (n as u16).to_be_bytes();
                self.sink().extend_from_slice(&bytes);
                self.sink().push(type_byte);
            }
            n if n <= u64::from(u32::MAX) => {
                self.sink().push(EXT32);
                let bytes = (n as u32).to_be_bytes();
                self.sink().extend_from_slice(&bytes);
                self.sink().push(type_byte);
            }
            _ => return Err(WriteError::InvalidState("ext payload longer than u32::MAX bytes".into())),
        }
        Ok(())
    }

    fn write_uint(&mut self, v: u64) {
        if v <= u64::from(POSFIXINT_MAX) {
            self.sink().push(v as u8);
        } else if v <= u64::from(u8::MAX) {
            self.sink().extend_from_slice(&[UINT8, v as u8]);
        } else if v <= u64::from(u16::MAX) {
            self.sink().push(UINT16);
            let bytes = (v as u16).to_be_bytes();
            self.sink().extend_from_slice(&bytes);
        } else if v <= u64::from(u32::MAX) {
            self.sink().push(UINT32);
            let bytes = (v as u32).to_be_bytes();
            self.sink().extend_from_slice(&bytes);
        } else {
            self.sink().push(UINT64);
            let bytes = v.to_be_bytes();
            self.sink().extend_from_slice(&bytes);
        }
    }

    fn write_int(&mut self, n: i64) {
        if n >= 0 {
            self.write_uint(n as u64);
        } else if n >= -32 {
            self.sink().push(n as i8 as u8);
        } else if n >= i64::from(i8::MIN) {
            self.sink().extend_from_slice(&[INT8, n as i8 as u8]);
        } else if n >= i64::from(i16::MIN) {
            self.sink().push(INT16);
            let bytes = (n as i16).to_be_bytes();
            self.sink().extend_from_slice(&bytes);
        } else if n >= i64::from(i32::MIN) {
            self.sink().push(INT32);
            let bytes = (n as i32).to_be_bytes();
            self.sink().extend_from_slice(&bytes);
        } else {
            self.sink().push(INT64);
            let bytes = n.to_be_bytes();
            self.sink().extend_from_slice(&bytes);
        }
    }

    /// `spec.md` §4.5: floats baseline to binary64 since `Primitive::Float`
    /// only ever carries `f64`, same choice as [`CborWriter`](crate::cbor::CborWriter).
    fn write_float(&mut self, f: f64) {
        self.sink().push(FLOAT64);
        let bytes = f.to_bits().to_be_bytes();
        self.sink().extend_from_slice(&bytes);
    }

    /// Msgpack has no bignum tag registry of its own; this writer reuses
    /// CBOR's tag 2/3 numbers as the `ext` type byte so a bignum written by
    /// one dialect's writer is recognizable (by convention, not by the
    /// format) to a reader expecting the other's interop encoding. See
    /// `DESIGN.md`.
    fn write_ext_bignum(&mut self, b: &BigInt) -> Result<(), WriteError> {
        let tag = if b.negative { TAG_NEGATIVE_BIGNUM } else { TAG_POSITIVE_BIGNUM };
        self.write_ext_header(b.magnitude.len() as u64, tag as u8)?;
        let bytes = b.magnitude.clone();
        self.sink().extend_from_slice(&bytes);
        Ok(())
    }

    fn write_bigint(&mut self, b: &BigInt) -> Result<(), WriteError> {
        if let Some(v) = bigint_small_i128(b) {
            if let Ok(n) = i64::try_from(v) {
                self.write_int(n);
                return Ok(());
            }
            if let Ok(v) = u64::try_from(v) {
                self.write_uint(v);
                return Ok(());
            }
        }
        self.write_ext_bignum(b)
    }

    /// No native Msgpack decimal type either; packs `[sign byte][8-byte
    /// big-endian exponent][mantissa magnitude]` into the same
    /// `TAG_DECIMAL_FRACTION` ext type number CBOR's tag 4 uses.
    fn write_decimal(&mut self, d: &Decimal) -> Result<(), WriteError> {
        let mut payload = Vec::with_capacity(9 + d.mantissa.magnitude.len());
        payload.push(u8::from(d.mantissa.negative));
        payload.extend_from_slice(&d.exponent.to_be_bytes());
        payload.extend_from_slice(&d.mantissa.magnitude);
        self.write_ext_header(payload.len() as u64, TAG_DECIMAL_FRACTION as u8)?;
        self.sink().extend_from_slice(&payload);
        Ok(())
    }

    fn write_primitive(&mut self, p: &Primitive) -> Result<(), WriteError> {
        match p {
            Primitive::Int(n) => {
                self.write_int(*n);
                Ok(())
            }
            Primitive::UInt(n) => {
                self.write_uint(*n);
                Ok(())
            }
            Primitive::BigInt(b) => self.write_bigint(b),
            Primitive::Float(f) => {
                self.write_float(*f);
                Ok(())
            }
            Primitive::Decimal(d) => self.write_decimal(d),
            Primitive::Bool(false) => {
                self.sink().push(FALSE);
                Ok(())
            }
            Primitive::Bool(true) => {
                self.sink().push(TRUE);
                Ok(())
            }
            // Msgpack has no `undefined`; the nearest representable value is
            // `nil`, matching common Msgpack encoders' treatment of JS
            // `undefined` (see `DESIGN.md`). Lossy on round-trip by design.
            Primitive::Null | Primitive::Undefined => {
                self.sink().push(NIL);
                Ok(())
            }
            Primitive::String(s) => {
                self.write_str_header(s.len() as u64)?;
                let bytes = s.as_bytes().to_vec();
                self.sink().extend_from_slice(&bytes);
                Ok(())
            }
        }
    }

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
                if *written >= *declared {
                    return Err(WriteError::InvalidState(
                        "more array elements written than declared".into(),
                    ));
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
                    if *written_pairs >= *declared {
                        return Err(WriteError::InvalidState(
                            "more map pairs written than declared".into(),
                        ));
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
            Some(Suppression { remaining_units: units, nested_depth })
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

    /// Fails if an app-supplied `Tag` is still pending going into a value
    /// that is not a buffer: Msgpack can only attach a type byte to `ext`
    /// (buffer) payloads.
    fn reject_pending_tag(&mut self) -> Result<(), WriteError> {
        if self.pending_tag.take().is_some() {
            return Err(WriteError::InvalidState(
                "Msgpack ext types may only tag a buffer value".into(),
            ));
        }
        Ok(())
    }
}

fn bigint_small_i128(b: &BigInt) -> Option<i128> {
    if b.magnitude.len() > 8 {
        return None;
    }
    let mut buf = [0u8; 8];
    buf[8 - b.magnitude.len()..].copy_from_slice(&b.magnitude);
    let mag = i128::from(u64::from_be_bytes(buf));
    Some(if b.negative { -mag } else { mag })
}

impl EventSink<WriteError> for MsgpackWriter {
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
                let Some(n) = size else {
                    return Err(WriteError::InvalidState(
                        "Msgpack writer rejects indefinite-length maps".into(),
                    ));
                };
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                self.reject_pending_tag()?;
                self.write_map_header(n)?;
                self.stack.push(Frame::Map {
                    declared: n,
                    written_pairs: 0,
                    awaiting_value: false,
                    sort_buffer: self.options.sorted.then(Vec::new),
                });
                Ok(true)
            }
            Event::MapEnd => match self.stack.pop() {
                Some(Frame::Map { declared, written_pairs, awaiting_value, sort_buffer }) => {
                    if awaiting_value {
                        return Err(WriteError::InvalidState(
                            "MapEnd with an odd number of key/value events".into(),
                        ));
                    }
                    if written_pairs != declared {
                        return Err(WriteError::InvalidState(
                            "MapEnd with fewer map pairs than declared".into(),
                        ));
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
                let Some(n) = size else {
                    return Err(WriteError::InvalidState(
                        "Msgpack writer rejects indefinite-length arrays".into(),
                    ));
                };
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                self.reject_pending_tag()?;
                self.write_array_header(n)?;
                self.stack.push(Frame::Array { declared: n, written: 0 });
                Ok(true)
            }
            Event::ListEnd => match self.stack.pop() {
                Some(Frame::Array { declared, written }) => {
                    if written != declared {
                        return Err(WriteError::InvalidState(
                            "ListEnd with fewer array elements than declared".into(),
                        ));
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
                let Some(n) = byte_len else {
                    return Err(WriteError::InvalidState(
                        "Msgpack writer rejects indefinite-length strings".into(),
                    ));
                };
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                self.reject_pending_tag()?;
                let capped = match self.options.max_string_length {
                    Some(max) => n.min(max as u64),
                    None => n,
                };
                self.write_str_header(capped)?;
                self.chunked_string = Some(capped);
                Ok(true)
            }
            Event::StringData(chunk) => {
                let Some(remaining) = self.chunked_string else {
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
                let mut end = (remaining as usize).min(truncated.len());
                while end > 0 && !truncated.is_char_boundary(end) {
                    end -= 1;
                }
                let kept = &truncated[..end];
                let bytes = kept.as_bytes().to_vec();
                self.sink().extend_from_slice(&bytes);
                self.chunked_string = Some(remaining - kept.len() as u64);
                Ok(true)
            }
            Event::StringEnd => {
                if self.chunked_string.take().is_none() {
                    return Err(WriteError::InvalidState("StringEnd without StringStart".into()));
                }
                self.commit_value();
                self.after_top_level_value();
                Ok(true)
            }
            Event::BufferStart { byte_len } => {
                if self.chunked_buffer.is_some() {
                    return Err(WriteError::InvalidState("nested BufferStart".into()));
                }
                let Some(n) = byte_len else {
                    return Err(WriteError::InvalidState(
                        "Msgpack writer rejects indefinite-length buffers".into(),
                    ));
                };
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                match self.pending_tag.take() {
                    Some(tag) => {
                        let type_byte = u8::try_from(tag).map_err(|_| {
                            WriteError::InvalidState("ext type must fit a single byte (0..=255)".into())
                        })?;
                        self.write_ext_header(n, type_byte)?;
                    }
                    None => self.write_bin_header(n)?,
                }
                self.chunked_buffer = Some(n);
                Ok(true)
            }
            Event::BufferData(bytes) => {
                let Some(remaining) = self.chunked_buffer else {
                    return Err(WriteError::InvalidState("BufferData without BufferStart".into()));
                };
                let take = (remaining as usize).min(bytes.len());
                self.sink().extend_from_slice(&bytes[..take]);
                self.chunked_buffer = Some(remaining - take as u64);
                Ok(true)
            }
            Event::BufferEnd => {
                if self.chunked_buffer.take().is_none() {
                    return Err(WriteError::InvalidState("BufferEnd without BufferStart".into()));
                }
                self.commit_value();
                self.after_top_level_value();
                Ok(true)
            }
            Event::Primitive(p) => {
                if !self.enter_value(false)? {
                    return Ok(true);
                }
                self.reject_pending_tag()?;
                self.write_primitive(&p)?;
                self.commit_value();
                self.after_top_level_value();
                Ok(true)
            }
            Event::Simple(_) => Err(WriteError::InvalidState(
                "Msgpack has no generic Simple value beyond nil/false/true".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(events: Vec<Event>, options: MsgpackWriterOptions) -> Vec<u8> {
        let mut w = MsgpackWriter::new(options);
        for e in events {
            w.on_event(e).unwrap();
        }
        w.finish()
    }

    #[test]
    fn writes_positive_fixint() {
        assert_eq!(write(alloc::vec![Event::Primitive(Primitive::Int(5))], MsgpackWriterOptions::default()), alloc::vec![0x05]);
    }

    #[test]
    fn writes_negative_fixint() {
        assert_eq!(write(alloc::vec![Event::Primitive(Primitive::Int(-1))], MsgpackWriterOptions::default()), alloc::vec![0xff]);
    }

    #[test]
    fn writes_uint64_for_values_above_i64_max() {
        let bytes = write(
            alloc::vec![Event::Primitive(Primitive::UInt(u64::MAX))],
            MsgpackWriterOptions::default(),
        );
        assert_eq!(bytes[0], UINT64);
        assert_eq!(&bytes[1..], &u64::MAX.to_be_bytes());
    }

    #[test]
    fn writes_fixmap() {
        let events = alloc::vec![
            Event::MapStart { size: Some(1) },
            Event::Primitive(Primitive::String("a".into())),
            Event::Primitive(Primitive::Int(1)),
            Event::MapEnd,
        ];
        assert_eq!(
            write(events, MsgpackWriterOptions::default()),
            alloc::vec![0x81, 0xa1, b'a', 0x01]
        );
    }

    #[test]
    fn rejects_indefinite_array() {
        let mut w = MsgpackWriter::new(MsgpackWriterOptions::default());
        assert!(w.on_event(Event::ListStart { size: None }).is_err());
    }

    #[test]
    fn writes_tag_and_buffer_as_fixext1() {
        let events = alloc::vec![
            Event::Tag(5),
            Event::BufferStart { byte_len: Some(1) },
            Event::BufferData(alloc::vec![0x7F]),
            Event::BufferEnd,
        ];
        assert_eq!(
            write(events, MsgpackWriterOptions::default()),
            alloc::vec![FIXEXT1, 0x05, 0x7F]
        );
    }

    #[test]
    fn rejects_tag_before_non_buffer_value() {
        let mut w = MsgpackWriter::new(MsgpackWriterOptions::default());
        w.on_event(Event::Tag(5)).unwrap();
        assert!(w.on_event(Event::Primitive(Primitive::Int(1))).is_err());
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
        let options = MsgpackWriterOptions { sorted: true, ..Default::default() };
        let bytes = write(events, options);
        assert_eq!(bytes, alloc::vec![0x82, 0xa1, b'a', 0x02, 0xa1, b'b', 0x01]);
    }

    #[test]
    fn bignum_beyond_i64_uses_ext_with_cbor_tag_number() {
        let b = BigInt {
            negative: true,
            magnitude: alloc::vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        };
        let bytes = write(alloc::vec![Event::Primitive(Primitive::BigInt(b))], MsgpackWriterOptions::default());
        assert_eq!(bytes[0], EXT8);
        assert_eq!(bytes[1], 9); // 9-byte magnitude
        assert_eq!(bytes[2], TAG_NEGATIVE_BIGNUM as u8);
    }

    #[test]
    fn definite_length_string_header_written_once_across_chunks() {
        let events = alloc::vec![
            Event::StringStart { byte_len: Some(4) },
            Event::StringData("ab".into()),
            Event::StringData("cd".into()),
            Event::StringEnd,
        ];
        assert_eq!(
            write(events, MsgpackWriterOptions::default()),
            alloc::vec![0xa4, b'a', b'b', b'c', b'd']
        );
    }
}

//! The incremental Msgpack reader (`spec.md` §4.3).
//!
//! Same frame-stack/resumption shape as [`CborReader`](crate::cbor::CborReader),
//! with the major-type/argument split replaced by Msgpack's direct
//! prefix-byte dispatch table, grounded on `facet-msgpack`'s `MSGPACK_*`
//! prefix constants and `ContextState` stack. Unlike CBOR, Msgpack has no
//! indefinite-length containers, so every `Frame` here carries a plain `u64`
//! remaining count rather than `Option<u64>`.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, Position};
use crate::event::{Event, Primitive};
use crate::msgpack::options::MsgpackReaderOptions;
use crate::source::{ByteSource, CodingErrorAction};

const NIL: u8 = 0xc0;
const INVALID_C1: u8 = 0xc1;
const FALSE: u8 = 0xc2;
const TRUE: u8 = 0xc3;
const BIN8: u8 = 0xc4;
const BIN16: u8 = 0xc5;
const BIN32: u8 = 0xc6;
const EXT8: u8 = 0xc7;
const EXT16: u8 = 0xc8;
const EXT32: u8 = 0xc9;
const FLOAT32: u8 = 0xca;
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
const FIXMAP_MAX: u8 = 0x8f;
const FIXARRAY_MIN: u8 = 0x90;
const FIXARRAY_MAX: u8 = 0x9f;
const FIXSTR_MIN: u8 = 0xa0;
const FIXSTR_MAX: u8 = 0xbf;
const POSFIXINT_MAX: u8 = 0x7f;
const NEGFIXINT_MIN: u8 = 0xe0;

#[derive(Debug)]
enum Frame {
    Array {
        remaining: u64,
    },
    Map {
        remaining: u64,
        awaiting_value: bool,
        seen_keys: Option<Vec<String>>,
    },
    Text {
        remaining: u64,
        carry: Vec<u8>,
    },
    Buffer {
        remaining: u64,
    },
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    None,
    /// The prefix byte was consumed; its fixed-size tail (length and/or
    /// value bytes, and for `ext` the trailing type byte) is not all
    /// available yet.
    Tail { prefix: u8, need: u8 },
    /// An `ext` tag was just emitted as `Event::Tag`; the next call must
    /// push the `Buffer` frame for its payload and emit `BufferStart`.
    ExtBuffer { len: u64 },
}

/// An incremental, resumable Msgpack reader. Same calling convention as
/// [`CborReader`](crate::cbor::CborReader): loop on [`MsgpackReader::read_event`]
/// until `Ok(None)`.
pub struct MsgpackReader<S> {
    source: S,
    options: MsgpackReaderOptions,
    stack: Vec<Frame>,
    pending: Pending,
    done: bool,
}

impl<S: ByteSource> MsgpackReader<S> {
    #[must_use]
    pub fn new(source: S, options: MsgpackReaderOptions) -> Self {
        Self {
            source,
            options,
            stack: Vec::new(),
            pending: Pending::None,
            done: false,
        }
    }

    #[must_use]
    pub fn is_final(&self) -> bool {
        self.source.is_final()
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    fn take_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.source.next_byte().expect("checked availability"));
        }
        out
    }

    fn position(&self) -> Position {
        Position::at_offset(self.source.byte_number())
    }

    fn push_depth_checked(&mut self, frame: Frame) -> Result<(), Error> {
        if let Some(limit) = self.options.depth_limit {
            if self.stack.len() as u32 >= limit {
                return Err(Error::DepthLimit { pos: self.position() });
            }
        }
        self.stack.push(frame);
        Ok(())
    }

    pub fn read_event(&mut self) -> Result<Option<Event>, Error> {
        loop {
            match self.stack.last() {
                Some(Frame::Array { .. }) => return self.step_array(),
                Some(Frame::Map { .. }) => return self.step_map(),
                Some(Frame::Text { .. }) => return self.step_text(),
                Some(Frame::Buffer { .. }) => return self.step_buffer(),
                None => {
                    if self.done {
                        return match self.source.peek_byte() {
                            None => Ok(None),
                            Some(_) => Err(Error::Syntax {
                                pos: self.position(),
                                msg: String::from("unexpected trailing data after top-level value"),
                            }),
                        };
                    }
                    return match self.read_value()? {
                        Some(event) => {
                            if self.stack.is_empty() && !matches!(event, Event::Tag(_)) {
                                self.done = true;
                            }
                            Ok(Some(event))
                        }
                        None => Ok(None),
                    };
                }
            }
        }
    }

    /// Fixed-size tail length, in bytes, for each prefix that needs one:
    /// length bytes, scalar value bytes, or (for `ext`) length bytes plus the
    /// trailing 1-byte type. Prefixes with no tail (fixints, fixmap/fixarray/
    /// fixstr headers, nil/false/true) return 0 and dispatch immediately.
    fn tail_len(prefix: u8) -> u8 {
        match prefix {
            UINT8 | INT8 => 1,
            UINT16 | INT16 => 2,
            UINT32 | INT32 | FLOAT32 => 4,
            UINT64 | INT64 | FLOAT64 => 8,
            BIN8 | STR8 => 1,
            BIN16 | STR16 | ARRAY16 | MAP16 => 2,
            BIN32 | STR32 | ARRAY32 | MAP32 => 4,
            FIXEXT1 | FIXEXT2 | FIXEXT4 | FIXEXT8 | FIXEXT16 => 1,
            EXT8 => 2,
            EXT16 => 3,
            EXT32 => 5,
            _ => 0,
        }
    }

    fn read_value(&mut self) -> Result<Option<Event>, Error> {
        match self.pending {
            Pending::None => {
                let Some(prefix) = self.source.peek_byte() else {
                    return Ok(None);
                };
                self.source.advance(1);
                let need = Self::tail_len(prefix);
                if need == 0 {
                    return self.dispatch_value(prefix, &[]);
                }
                match self.read_tail(prefix, need)? {
                    Some(tail) => self.dispatch_value(prefix, &tail),
                    None => Ok(None),
                }
            }
            Pending::Tail { prefix, need } => match self.read_tail(prefix, need)? {
                Some(tail) => self.dispatch_value(prefix, &tail),
                None => Ok(None),
            },
            Pending::ExtBuffer { len } => {
                self.pending = Pending::None;
                self.push_depth_checked(Frame::Buffer { remaining: len })?;
                Ok(Some(Event::BufferStart { byte_len: Some(len) }))
            }
        }
    }

    fn read_tail(&mut self, prefix: u8, need: u8) -> Result<Option<Vec<u8>>, Error> {
        let need = need as usize;
        if self.source.available() < need {
            if self.source.is_final() {
                return Err(Error::Truncated {
                    pos: self.position(),
                    expected: need as u64,
                });
            }
            self.pending = Pending::Tail { prefix, need: need as u8 };
            return Ok(None);
        }
        self.pending = Pending::None;
        Ok(Some(self.take_bytes(need)))
    }

    fn dispatch_value(&mut self, prefix: u8, tail: &[u8]) -> Result<Option<Event>, Error> {
        match prefix {
            0..=POSFIXINT_MAX => Ok(Some(Event::Primitive(Primitive::Int(i64::from(prefix))))),
            NEGFIXINT_MIN..=0xff => Ok(Some(Event::Primitive(Primitive::Int(i64::from(prefix as i8))))),
            FIXMAP_MIN..=FIXMAP_MAX => self.start_map(u64::from(prefix & 0x0f)),
            FIXARRAY_MIN..=FIXARRAY_MAX => self.start_array(u64::from(prefix & 0x0f)),
            FIXSTR_MIN..=FIXSTR_MAX => self.start_string(u64::from(prefix & 0x1f)),
            NIL => Ok(Some(Event::Primitive(Primitive::Null))),
            FALSE => Ok(Some(Event::Primitive(Primitive::Bool(false)))),
            TRUE => Ok(Some(Event::Primitive(Primitive::Bool(true)))),
            INVALID_C1 => Err(Error::InvalidPrefix { pos: self.position(), byte: prefix }),
            UINT8 | UINT16 | UINT32 | UINT64 => {
                Ok(Some(Event::Primitive(uint_primitive(be_u64(tail)))))
            }
            INT8 => Ok(Some(Event::Primitive(Primitive::Int(i64::from(tail[0] as i8))))),
            INT16 => Ok(Some(Event::Primitive(Primitive::Int(i64::from(i16::from_be_bytes([tail[0], tail[1]])))))),
            INT32 => Ok(Some(Event::Primitive(Primitive::Int(i64::from(i32::from_be_bytes([
                tail[0], tail[1], tail[2], tail[3],
            ])))))),
            INT64 => Ok(Some(Event::Primitive(Primitive::Int(i64::from_be_bytes([
                tail[0], tail[1], tail[2], tail[3], tail[4], tail[5], tail[6], tail[7],
            ]))))),
            FLOAT32 => Ok(Some(Event::Primitive(Primitive::Float(f64::from(f32::from_be_bytes([
                tail[0], tail[1], tail[2], tail[3],
            ])))))),
            FLOAT64 => Ok(Some(Event::Primitive(Primitive::Float(f64::from_be_bytes([
                tail[0], tail[1], tail[2], tail[3], tail[4], tail[5], tail[6], tail[7],
            ]))))),
            BIN8 | BIN16 | BIN32 => self.start_buffer(be_u64(tail)),
            STR8 | STR16 | STR32 => self.start_string(be_u64(tail)),
            ARRAY16 | ARRAY32 => self.start_array(be_u64(tail)),
            MAP16 | MAP32 => self.start_map(be_u64(tail)),
            FIXEXT1 => self.start_ext(tail[0], 1),
            FIXEXT2 => self.start_ext(tail[0], 2),
            FIXEXT4 => self.start_ext(tail[0], 4),
            FIXEXT8 => self.start_ext(tail[0], 8),
            FIXEXT16 => self.start_ext(tail[0], 16),
            EXT8 => self.start_ext(tail[1], u64::from(tail[0])),
            EXT16 => self.start_ext(tail[2], u64::from(u16::from_be_bytes([tail[0], tail[1]]))),
            EXT32 => self.start_ext(
                tail[4],
                u64::from(u32::from_be_bytes([tail[0], tail[1], tail[2], tail[3]])),
            ),
            _ => unreachable!("every prefix byte is handled above"),
        }
    }

    /// `spec.md` §4.3: "`ext` types carry a single `u8` tag followed by a
    /// byte buffer (emitted as `Tag(n)` + `BufferStart`/`BufferData`/
    /// `BufferEnd`)". Msgpack's ext type byte is a signed `i8` (`-1` is
    /// reserved for the `timestamp` extension); this reader bit-casts it to
    /// `u8` so it fits `Event::Tag`'s `u64`, and the writer inverts the same
    /// bit-cast — a lossless, reversible mapping since both are 256-valued
    /// (see `DESIGN.md`).
    fn start_ext(&mut self, type_byte: u8, len: u64) -> Result<Option<Event>, Error> {
        self.pending = Pending::ExtBuffer { len };
        Ok(Some(Event::Tag(u64::from(type_byte))))
    }

    fn start_array(&mut self, n: u64) -> Result<Option<Event>, Error> {
        self.push_depth_checked(Frame::Array { remaining: n })?;
        Ok(Some(Event::ListStart { size: Some(n) }))
    }

    fn start_map(&mut self, n: u64) -> Result<Option<Event>, Error> {
        let pairs = n.checked_mul(2).ok_or(Error::Overflow { pos: self.position() })?;
        let seen_keys = self.options.fail_on_duplicate_keys.then(Vec::new);
        self.push_depth_checked(Frame::Map {
            remaining: pairs,
            awaiting_value: false,
            seen_keys,
        })?;
        Ok(Some(Event::MapStart { size: Some(n) }))
    }

    fn start_string(&mut self, n: u64) -> Result<Option<Event>, Error> {
        usize::try_from(n).map_err(|_| Error::Overflow { pos: self.position() })?;
        self.push_depth_checked(Frame::Text {
            remaining: n,
            carry: Vec::new(),
        })?;
        Ok(Some(Event::StringStart { byte_len: Some(n) }))
    }

    fn start_buffer(&mut self, n: u64) -> Result<Option<Event>, Error> {
        usize::try_from(n).map_err(|_| Error::Overflow { pos: self.position() })?;
        self.push_depth_checked(Frame::Buffer { remaining: n })?;
        Ok(Some(Event::BufferStart { byte_len: Some(n) }))
    }

    fn step_array(&mut self) -> Result<Option<Event>, Error> {
        let Some(Frame::Array { remaining }) = self.stack.last() else {
            unreachable!("dispatched on Frame::Array")
        };
        if *remaining == 0 {
            self.stack.pop();
            return Ok(Some(Event::ListEnd));
        }
        let idx = self.stack.len() - 1;
        let Some(event) = self.read_value()? else {
            return Ok(None);
        };
        if !matches!(event, Event::Tag(_)) {
            if let Some(Frame::Array { remaining }) = self.stack.get_mut(idx) {
                *remaining -= 1;
            }
        }
        Ok(Some(event))
    }

    fn step_map(&mut self) -> Result<Option<Event>, Error> {
        let Some(Frame::Map { remaining, awaiting_value, .. }) = self.stack.last() else {
            unreachable!("dispatched on Frame::Map")
        };
        let (remaining, awaiting_value) = (*remaining, *awaiting_value);
        if !awaiting_value && remaining == 0 {
            self.stack.pop();
            return Ok(Some(Event::MapEnd));
        }
        let idx = self.stack.len() - 1;
        let Some(event) = self.read_value()? else {
            return Ok(None);
        };
        if matches!(event, Event::Tag(_)) {
            return Ok(Some(event));
        }
        if !awaiting_value {
            if let Some(key) = primitive_key_text(&event) {
                if let Some(Frame::Map { seen_keys: Some(seen), .. }) = self.stack.get_mut(idx) {
                    if seen.contains(&key) {
                        return Err(Error::DuplicateKey { pos: self.position(), key });
                    }
                    seen.push(key);
                }
            }
            if let Some(Frame::Map { remaining, awaiting_value, .. }) = self.stack.get_mut(idx) {
                *awaiting_value = true;
                *remaining -= 1;
            }
        } else if let Some(Frame::Map { remaining, awaiting_value, .. }) = self.stack.get_mut(idx) {
            *awaiting_value = false;
            *remaining -= 1;
        }
        Ok(Some(event))
    }

    fn step_buffer(&mut self) -> Result<Option<Event>, Error> {
        let Some(Frame::Buffer { remaining }) = self.stack.last() else {
            unreachable!("dispatched on Frame::Buffer")
        };
        let remaining = *remaining;
        if remaining == 0 {
            self.stack.pop();
            return Ok(Some(Event::BufferEnd));
        }
        let avail = self.source.available();
        if avail == 0 {
            return if self.source.is_final() {
                Err(Error::Truncated { pos: self.position(), expected: remaining })
            } else {
                Ok(None)
            };
        }
        let take = avail.min(remaining as usize);
        let bytes = self.take_bytes(take);
        if let Some(Frame::Buffer { remaining }) = self.stack.last_mut() {
            *remaining -= bytes.len() as u64;
        }
        Ok(Some(Event::BufferData(bytes)))
    }

    fn step_text(&mut self) -> Result<Option<Event>, Error> {
        let Some(Frame::Text { remaining, .. }) = self.stack.last() else {
            unreachable!("dispatched on Frame::Text")
        };
        let remaining = *remaining;
        if remaining == 0 {
            if let Some(event) = self.flush_incomplete_text_carry()? {
                return Ok(Some(event));
            }
            self.stack.pop();
            return Ok(Some(Event::StringEnd));
        }
        let avail = self.source.available();
        if avail == 0 {
            return if self.source.is_final() {
                Err(Error::Truncated { pos: self.position(), expected: remaining })
            } else {
                Ok(None)
            };
        }
        let take = avail.min(remaining as usize);
        let raw = self.take_bytes(take);
        let taken = raw.len() as u64;
        if let Some(Frame::Text { remaining, .. }) = self.stack.last_mut() {
            *remaining -= taken;
        }
        self.emit_text_chunk(raw)
    }

    fn flush_incomplete_text_carry(&mut self) -> Result<Option<Event>, Error> {
        let Some(Frame::Text { carry, .. }) = self.stack.last_mut() else {
            unreachable!("dispatched on Frame::Text")
        };
        if carry.is_empty() {
            return Ok(None);
        }
        match self.options.on_invalid_utf8 {
            CodingErrorAction::Report => Err(Error::InvalidUtf8 { pos: self.position() }),
            CodingErrorAction::Ignore => {
                if let Some(Frame::Text { carry, .. }) = self.stack.last_mut() {
                    carry.clear();
                }
                Ok(None)
            }
            CodingErrorAction::Replace => {
                if let Some(Frame::Text { carry, .. }) = self.stack.last_mut() {
                    carry.clear();
                }
                Ok(Some(Event::StringData(String::from('\u{FFFD}'))))
            }
        }
    }

    fn emit_text_chunk(&mut self, raw: Vec<u8>) -> Result<Option<Event>, Error> {
        let Some(Frame::Text { carry, .. }) = self.stack.last_mut() else {
            unreachable!("dispatched on Frame::Text")
        };
        let mut buf = core::mem::take(carry);
        buf.extend_from_slice(&raw);
        let mut out = String::new();
        let mut rest: &[u8] = &buf;
        loop {
            match core::str::from_utf8(rest) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    out.push_str(core::str::from_utf8(&rest[..valid_up_to]).expect("validated prefix"));
                    match e.error_len() {
                        None => {
                            let tail = rest[valid_up_to..].to_vec();
                            if let Some(Frame::Text { carry, .. }) = self.stack.last_mut() {
                                *carry = tail;
                            }
                            break;
                        }
                        Some(bad_len) => {
                            match self.options.on_invalid_utf8 {
                                CodingErrorAction::Report => {
                                    return Err(Error::InvalidUtf8 { pos: self.position() });
                                }
                                CodingErrorAction::Replace => out.push('\u{FFFD}'),
                                CodingErrorAction::Ignore => {}
                            }
                            rest = &rest[valid_up_to + bad_len..];
                            if rest.is_empty() {
                                break;
                            }
                        }
                    }
                }
            }
        }
        Ok(Some(Event::StringData(out)))
    }
}

fn be_u64(tail: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[8 - tail.len()..].copy_from_slice(tail);
    u64::from_be_bytes(buf)
}

fn uint_primitive(v: u64) -> Primitive {
    if v <= i64::MAX as u64 {
        Primitive::Int(v as i64)
    } else {
        Primitive::UInt(v)
    }
}

fn primitive_key_text(event: &Event) -> Option<String> {
    match event {
        Event::Primitive(Primitive::String(s)) => Some(s.clone()),
        Event::Primitive(Primitive::Int(n)) => Some(format!("{n}")),
        Event::Primitive(Primitive::UInt(n)) => Some(format!("{n}")),
        Event::Primitive(Primitive::BigInt(b)) => Some(b.to_decimal_string()),
        Event::Primitive(Primitive::Bool(b)) => Some(format!("{b}")),
        Event::Primitive(Primitive::Null) => Some(String::from("null")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceByteSource;

    fn read_all(bytes: &[u8]) -> Vec<Event> {
        let mut reader = MsgpackReader::new(SliceByteSource::new(bytes), MsgpackReaderOptions::default());
        let mut out = Vec::new();
        while let Some(event) = reader.read_event().unwrap() {
            out.push(event);
        }
        out
    }

    #[test]
    fn decodes_positive_fixint() {
        assert_eq!(read_all(&[0x05]), alloc::vec![Event::Primitive(Primitive::Int(5))]);
    }

    #[test]
    fn decodes_negative_fixint() {
        assert_eq!(read_all(&[0xff]), alloc::vec![Event::Primitive(Primitive::Int(-1))]);
    }

    #[test]
    fn decodes_uint64_above_i64_max_as_uint() {
        let bytes = [UINT64, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        match read_all(&bytes).as_slice() {
            [Event::Primitive(Primitive::UInt(v))] => assert_eq!(*v, u64::MAX),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decodes_fixmap() {
        let bytes = [0x81, 0xa1, b'a', 0x01];
        assert_eq!(
            read_all(&bytes),
            alloc::vec![
                Event::MapStart { size: Some(1) },
                Event::Primitive(Primitive::String("a".into())),
                Event::Primitive(Primitive::Int(1)),
                Event::MapEnd,
            ]
        );
    }

    #[test]
    fn decodes_fixarray() {
        let bytes = [0x92, 0x01, 0x02];
        assert_eq!(
            read_all(&bytes),
            alloc::vec![
                Event::ListStart { size: Some(2) },
                Event::Primitive(Primitive::Int(1)),
                Event::Primitive(Primitive::Int(2)),
                Event::ListEnd,
            ]
        );
    }

    #[test]
    fn decodes_bin8() {
        let bytes = [BIN8, 0x02, 0xAA, 0xBB];
        assert_eq!(
            read_all(&bytes),
            alloc::vec![
                Event::BufferStart { byte_len: Some(2) },
                Event::BufferData(alloc::vec![0xAA, 0xBB]),
                Event::BufferEnd,
            ]
        );
    }

    #[test]
    fn decodes_fixext1_as_tag_then_buffer() {
        // fixext1, type=5, data=0x7F
        let bytes = [FIXEXT1, 0x05, 0x7F];
        assert_eq!(
            read_all(&bytes),
            alloc::vec![
                Event::Tag(5),
                Event::BufferStart { byte_len: Some(1) },
                Event::BufferData(alloc::vec![0x7F]),
                Event::BufferEnd,
            ]
        );
    }

    #[test]
    fn decodes_negative_ext_type_via_bitcast() {
        // fixext1, type = -1 (timestamp), bitcast to 0xFF.
        let bytes = [FIXEXT1, 0xFF, 0x00];
        match read_all(&bytes).as_slice() {
            [Event::Tag(t), Event::BufferStart { .. }, Event::BufferData(_), Event::BufferEnd] => {
                assert_eq!(*t, 255);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_reserved_0xc1_prefix() {
        let mut reader = MsgpackReader::new(SliceByteSource::new(&[INVALID_C1]), MsgpackReaderOptions::default());
        assert!(matches!(reader.read_event(), Err(Error::InvalidPrefix { .. })));
    }

    #[test]
    fn suspends_then_resumes_across_partial_input() {
        use crate::source::PartialByteSource;
        let mut src = PartialByteSource::new();
        src.feed(&[UINT16]); // start of a 2-byte tail
        let mut reader = MsgpackReader::new(src, MsgpackReaderOptions::default());
        assert_eq!(reader.read_event().unwrap(), None);
        let mut src = reader.into_inner();
        src.feed(&[0x01, 0x00]);
        src.finish();
        let mut reader = MsgpackReader::new(src, MsgpackReaderOptions::default());
        assert_eq!(reader.read_event().unwrap(), Some(Event::Primitive(Primitive::Int(256))));
    }

    #[test]
    fn truncated_definite_buffer_is_an_error() {
        let mut src = crate::source::PartialByteSource::new();
        src.feed(&[BIN8, 0x03, 0x01, 0x02]); // declares 3 bytes, only 2 follow
        src.finish();
        let mut reader = MsgpackReader::new(src, MsgpackReaderOptions::default());
        reader.read_event().unwrap(); // BufferStart
        assert!(matches!(reader.read_event(), Err(Error::Truncated { .. })));
    }
}

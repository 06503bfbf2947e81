//! The incremental CBOR reader (`spec.md` §4.2, RFC 8949).
//!
//! Grounded on the same frame-stack shape as [`JsonReader`](crate::json::JsonReader)
//! (an explicit `Vec<Frame>` instead of recursion, so decoding can suspend mid
//! container and resume later) and on `tps_minicbor`'s prefix-byte dispatch
//! and constants-table style for major-type/argument decoding, re-expressed
//! to emit the shared [`Event`] vocabulary over this crate's [`ByteSource`]
//! instead of a borrowed, non-resumable buffer.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::cbor::options::CborReaderOptions;
use crate::cbor::tags::is_known_tag;
use crate::error::{Error, Position};
use crate::event::{Event, Primitive};
use crate::source::ByteSource;
use crate::value::BigInt;

const BREAK: u8 = 0xFF;
const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BUFFER: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arg {
    Value(u64),
    Indefinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkStep {
    Break,
    Len(u64),
}

#[derive(Debug)]
enum Frame {
    Array {
        remaining: Option<u64>,
    },
    Map {
        remaining: Option<u64>,
        awaiting_value: bool,
        seen_keys: Option<Vec<String>>,
    },
    Text {
        remaining: Option<u64>,
        indefinite: bool,
        carry: Vec<u8>,
    },
    Buffer {
        remaining: Option<u64>,
        indefinite: bool,
    },
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    None,
    /// A header byte was consumed but its multi-byte argument tail (1/2/4/8
    /// bytes, per additional-info 24..=27) is not all available yet.
    Argument { major: u8, info: u8, need: u8 },
}

/// An incremental, resumable CBOR reader.
///
/// Call [`CborReader::read_event`] in a loop, exactly like
/// [`JsonReader`](crate::json::JsonReader): `Ok(Some(event))` for each step,
/// `Ok(None)` when the [`ByteSource`] has nothing decodable yet (suspend,
/// feed more and call again) or once the stream is genuinely exhausted.
/// Whether a prematurely-ended stream left containers unterminated is the
/// [`Builder`](crate::builder)'s concern (`spec.md` §4.6 "Completion"), not
/// this reader's: a reader that already promised a declared byte length via
/// `BufferStart(Some(n))`/`StringStart(Some(n))` and then can't deliver it
/// does raise [`Error::Truncated`], since that promise is a wire-format
/// commitment the reader itself made.
pub struct CborReader<S> {
    source: S,
    options: CborReaderOptions,
    stack: Vec<Frame>,
    pending: Pending,
    done: bool,
}

impl<S: ByteSource> CborReader<S> {
    #[must_use]
    pub fn new(source: S, options: CborReaderOptions) -> Self {
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

    /// Consumes up to `n` bytes (caller has already checked `n <= available()`).
    /// Goes through `next_byte()` rather than `peek_slice`/`advance`, since
    /// `PartialByteSource::peek_slice` may return a shorter slice than
    /// requested when the request straddles its internal ring-buffer split,
    /// even though the bytes are in fact available.
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
                        match self.source.peek_byte() {
                            None => return Ok(None),
                            Some(_) if self.options.allow_multiple_values_placeholder() => {
                                self.done = false;
                                continue;
                            }
                            Some(_) => {
                                return Err(Error::Syntax {
                                    pos: self.position(),
                                    msg: String::from("unexpected trailing data after top-level value"),
                                });
                            }
                        }
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

    // -- argument decoding -------------------------------------------------

    fn start_argument(&mut self, major: u8, info: u8) -> Result<Option<Arg>, Error> {
        match info {
            0..=23 => Ok(Some(Arg::Value(u64::from(info)))),
            24 => self.read_argument_bytes(major, info, 1),
            25 => self.read_argument_bytes(major, info, 2),
            26 => self.read_argument_bytes(major, info, 4),
            27 => self.read_argument_bytes(major, info, 8),
            28..=30 => Err(Error::InvalidPrefix {
                pos: self.position(),
                byte: (major << 5) | info,
            }),
            31 => Ok(Some(Arg::Indefinite)),
            _ => unreachable!("additional info is 5 bits"),
        }
    }

    fn read_argument_bytes(&mut self, major: u8, info: u8, need: usize) -> Result<Option<Arg>, Error> {
        if self.source.available() < need {
            if self.source.is_final() {
                return Err(Error::Truncated {
                    pos: self.position(),
                    expected: need as u64,
                });
            }
            self.pending = Pending::Argument {
                major,
                info,
                need: need as u8,
            };
            return Ok(None);
        }
        let mut buf = [0u8; 8];
        for slot in &mut buf[8 - need..] {
            *slot = self.source.next_byte().expect("checked availability");
        }
        Ok(Some(Arg::Value(u64::from_be_bytes(buf))))
    }

    /// Reads one value's header (major type + argument) and dispatches it,
    /// or pushes a container frame and returns its `*Start` event. Used both
    /// for the top-level "next value" slot and for array/map element slots.
    fn read_value(&mut self) -> Result<Option<Event>, Error> {
        match self.pending {
            Pending::None => {
                let Some(byte) = self.source.peek_byte() else {
                    return Ok(None);
                };
                self.source.advance(1);
                let major = byte >> 5;
                let info = byte & 0x1F;
                match self.start_argument(major, info)? {
                    Some(arg) => self.dispatch_value(major, info, arg),
                    None => Ok(None),
                }
            }
            Pending::Argument { major, info, need } => {
                match self.read_argument_bytes(major, info, need as usize)? {
                    Some(arg) => {
                        self.pending = Pending::None;
                        self.dispatch_value(major, info, arg)
                    }
                    None => Ok(None),
                }
            }
        }
    }

    fn dispatch_value(&mut self, major: u8, info: u8, arg: Arg) -> Result<Option<Event>, Error> {
        match major {
            MAJOR_UNSIGNED => {
                let Arg::Value(v) = arg else {
                    return Err(self.err_indefinite_not_allowed(major));
                };
                Ok(Some(Event::Primitive(uint_primitive(v))))
            }
            MAJOR_NEGATIVE => {
                let Arg::Value(v) = arg else {
                    return Err(self.err_indefinite_not_allowed(major));
                };
                Ok(Some(Event::Primitive(negative_primitive(v))))
            }
            MAJOR_BUFFER => self.start_string_or_buffer(false, arg),
            MAJOR_TEXT => self.start_string_or_buffer(true, arg),
            MAJOR_ARRAY => self.start_array(arg),
            MAJOR_MAP => self.start_map(arg),
            MAJOR_TAG => {
                let Arg::Value(n) = arg else {
                    return Err(self.err_indefinite_not_allowed(major));
                };
                if self.options.strict_tags && !is_known_tag(n) {
                    return Err(Error::Syntax {
                        pos: self.position(),
                        msg: format!("unrecognized tag {n} rejected by strict_tags"),
                    });
                }
                Ok(Some(Event::Tag(n)))
            }
            MAJOR_SIMPLE => self.dispatch_simple(info, arg),
            _ => unreachable!("major type is 3 bits"),
        }
    }

    fn err_indefinite_not_allowed(&self, major: u8) -> Error {
        Error::InvalidPrefix {
            pos: self.position(),
            byte: (major << 5) | 31,
        }
    }

    fn dispatch_simple(&mut self, info: u8, arg: Arg) -> Result<Option<Event>, Error> {
        let Arg::Value(v) = arg else {
            return Err(Error::Syntax {
                pos: self.position(),
                msg: String::from("unexpected break byte outside an indefinite-length container"),
            });
        };
        match info {
            0..=19 => Ok(Some(Event::Simple(v as u8))),
            20 => Ok(Some(Event::Primitive(Primitive::Bool(false)))),
            21 => Ok(Some(Event::Primitive(Primitive::Bool(true)))),
            22 => Ok(Some(Event::Primitive(Primitive::Null))),
            23 => Ok(Some(Event::Primitive(Primitive::Undefined))),
            24 => {
                if v < 32 {
                    return Err(Error::InvalidPrefix {
                        pos: self.position(),
                        byte: v as u8,
                    });
                }
                Ok(Some(Event::Simple(v as u8)))
            }
            25 => Ok(Some(Event::Primitive(Primitive::Float(f64::from(half_to_f32(v as u16)))))),
            26 => Ok(Some(Event::Primitive(Primitive::Float(f64::from(f32::from_bits(v as u32)))))),
            27 => Ok(Some(Event::Primitive(Primitive::Float(f64::from_bits(v))))),
            _ => unreachable!("28..=30 rejected in start_argument, 31 is Arg::Indefinite"),
        }
    }

    fn start_array(&mut self, arg: Arg) -> Result<Option<Event>, Error> {
        match arg {
            Arg::Indefinite => {
                self.push_depth_checked(Frame::Array { remaining: None })?;
                Ok(Some(Event::ListStart { size: None }))
            }
            Arg::Value(n) => {
                self.push_depth_checked(Frame::Array { remaining: Some(n) })?;
                Ok(Some(Event::ListStart { size: Some(n) }))
            }
        }
    }

    fn start_map(&mut self, arg: Arg) -> Result<Option<Event>, Error> {
        let seen_keys = self.options.fail_on_duplicate_keys.then(Vec::new);
        match arg {
            Arg::Indefinite => {
                self.push_depth_checked(Frame::Map {
                    remaining: None,
                    awaiting_value: false,
                    seen_keys,
                })?;
                Ok(Some(Event::MapStart { size: None }))
            }
            Arg::Value(n) => {
                let pairs = n.checked_mul(2).ok_or(Error::Overflow { pos: self.position() })?;
                self.push_depth_checked(Frame::Map {
                    remaining: Some(pairs),
                    awaiting_value: false,
                    seen_keys,
                })?;
                Ok(Some(Event::MapStart { size: Some(n) }))
            }
        }
    }

    fn start_string_or_buffer(&mut self, is_text: bool, arg: Arg) -> Result<Option<Event>, Error> {
        match arg {
            Arg::Indefinite => {
                if is_text {
                    self.push_depth_checked(Frame::Text {
                        remaining: None,
                        indefinite: true,
                        carry: Vec::new(),
                    })?;
                    Ok(Some(Event::StringStart { byte_len: None }))
                } else {
                    self.push_depth_checked(Frame::Buffer {
                        remaining: None,
                        indefinite: true,
                    })?;
                    Ok(Some(Event::BufferStart { byte_len: None }))
                }
            }
            Arg::Value(n) => {
                usize::try_from(n).map_err(|_| Error::Overflow { pos: self.position() })?;
                if is_text {
                    self.push_depth_checked(Frame::Text {
                        remaining: Some(n),
                        indefinite: false,
                        carry: Vec::new(),
                    })?;
                    Ok(Some(Event::StringStart { byte_len: Some(n) }))
                } else {
                    self.push_depth_checked(Frame::Buffer {
                        remaining: Some(n),
                        indefinite: false,
                    })?;
                    Ok(Some(Event::BufferStart { byte_len: Some(n) }))
                }
            }
        }
    }

    /// Reads the header of the next inner chunk of an indefinite-length
    /// string/buffer, or the terminating break byte. Reuses
    /// [`Self::start_argument`]/[`Self::read_argument_bytes`], so a
    /// multi-byte chunk length can suspend and resume exactly like a
    /// top-level value's argument.
    fn read_chunk_header(&mut self, expected_major: u8) -> Result<Option<ChunkStep>, Error> {
        match self.pending {
            Pending::None => {
                let Some(byte) = self.source.peek_byte() else {
                    return Ok(None);
                };
                self.source.advance(1);
                if byte == BREAK {
                    return Ok(Some(ChunkStep::Break));
                }
                let major = byte >> 5;
                let info = byte & 0x1F;
                if major != expected_major {
                    return Err(Error::Syntax {
                        pos: self.position(),
                        msg: format!("expected a chunk of major type {expected_major}, got {major}"),
                    });
                }
                if info == 31 {
                    return Err(Error::Syntax {
                        pos: self.position(),
                        msg: String::from("nested indefinite-length chunk is not allowed"),
                    });
                }
                match self.start_argument(major, info)? {
                    Some(Arg::Value(n)) => Ok(Some(ChunkStep::Len(n))),
                    Some(Arg::Indefinite) => unreachable!("info == 31 rejected above"),
                    None => Ok(None),
                }
            }
            Pending::Argument { major, info, need } => {
                match self.read_argument_bytes(major, info, need as usize)? {
                    Some(Arg::Value(n)) => {
                        self.pending = Pending::None;
                        Ok(Some(ChunkStep::Len(n)))
                    }
                    Some(Arg::Indefinite) => unreachable!("info == 31 rejected before suspending"),
                    None => Ok(None),
                }
            }
        }
    }

    // -- container stepping -------------------------------------------------

    fn step_array(&mut self) -> Result<Option<Event>, Error> {
        let Some(Frame::Array { remaining }) = self.stack.last() else {
            unreachable!("dispatched on Frame::Array")
        };
        let remaining = *remaining;
        if remaining == Some(0) {
            self.stack.pop();
            return Ok(Some(Event::ListEnd));
        }
        if remaining.is_none() {
            match self.source.peek_byte() {
                None => return Ok(None),
                Some(BREAK) => {
                    self.source.advance(1);
                    self.stack.pop();
                    return Ok(Some(Event::ListEnd));
                }
                Some(_) => {}
            }
        }
        let idx = self.stack.len() - 1;
        let Some(event) = self.read_value()? else {
            return Ok(None);
        };
        if !matches!(event, Event::Tag(_)) {
            if let Some(Frame::Array { remaining }) = self.stack.get_mut(idx) {
                if let Some(r) = remaining {
                    *r -= 1;
                }
            }
        }
        Ok(Some(event))
    }

    fn step_map(&mut self) -> Result<Option<Event>, Error> {
        let Some(Frame::Map { remaining, awaiting_value, .. }) = self.stack.last() else {
            unreachable!("dispatched on Frame::Map")
        };
        let (remaining, awaiting_value) = (*remaining, *awaiting_value);
        if !awaiting_value {
            if remaining == Some(0) {
                self.stack.pop();
                return Ok(Some(Event::MapEnd));
            }
            if remaining.is_none() {
                match self.source.peek_byte() {
                    None => return Ok(None),
                    Some(BREAK) => {
                        self.source.advance(1);
                        self.stack.pop();
                        return Ok(Some(Event::MapEnd));
                    }
                    Some(_) => {}
                }
            }
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
                        return Err(Error::DuplicateKey {
                            pos: self.position(),
                            key,
                        });
                    }
                    seen.push(key);
                }
            }
            if let Some(Frame::Map { remaining, awaiting_value, .. }) = self.stack.get_mut(idx) {
                *awaiting_value = true;
                if let Some(r) = remaining {
                    *r -= 1;
                }
            }
        } else if let Some(Frame::Map { remaining, awaiting_value, .. }) = self.stack.get_mut(idx) {
            *awaiting_value = false;
            if let Some(r) = remaining {
                *r -= 1;
            }
        }
        Ok(Some(event))
    }

    fn step_buffer(&mut self) -> Result<Option<Event>, Error> {
        loop {
            let Some(Frame::Buffer { remaining, indefinite }) = self.stack.last() else {
                unreachable!("dispatched on Frame::Buffer")
            };
            let (remaining, indefinite) = (*remaining, *indefinite);
            match remaining {
                None => {
                    return match self.read_chunk_header(MAJOR_BUFFER)? {
                        None => Ok(None),
                        Some(ChunkStep::Break) => {
                            self.stack.pop();
                            Ok(Some(Event::BufferEnd))
                        }
                        Some(ChunkStep::Len(n)) => {
                            usize::try_from(n).map_err(|_| Error::Overflow { pos: self.position() })?;
                            if let Some(Frame::Buffer { remaining, .. }) = self.stack.last_mut() {
                                *remaining = Some(n);
                            }
                            continue;
                        }
                    };
                }
                Some(0) => {
                    if indefinite {
                        if let Some(Frame::Buffer { remaining, .. }) = self.stack.last_mut() {
                            *remaining = None;
                        }
                        continue;
                    }
                    self.stack.pop();
                    return Ok(Some(Event::BufferEnd));
                }
                Some(n) => {
                    let avail = self.source.available();
                    if avail == 0 {
                        return if self.source.is_final() {
                            Err(Error::Truncated { pos: self.position(), expected: n })
                        } else {
                            Ok(None)
                        };
                    }
                    let take = avail.min(n as usize);
                    let bytes = self.take_bytes(take);
                    if let Some(Frame::Buffer { remaining, .. }) = self.stack.last_mut() {
                        *remaining = Some(n - bytes.len() as u64);
                    }
                    return Ok(Some(Event::BufferData(bytes)));
                }
            }
        }
    }

    fn step_text(&mut self) -> Result<Option<Event>, Error> {
        loop {
            let Some(Frame::Text { remaining, indefinite, .. }) = self.stack.last() else {
                unreachable!("dispatched on Frame::Text")
            };
            let (remaining, indefinite) = (*remaining, *indefinite);
            match remaining {
                None => {
                    if let Some(event) = self.flush_incomplete_text_carry()? {
                        return Ok(Some(event));
                    }
                    return match self.read_chunk_header(MAJOR_TEXT)? {
                        None => Ok(None),
                        Some(ChunkStep::Break) => {
                            self.stack.pop();
                            Ok(Some(Event::StringEnd))
                        }
                        Some(ChunkStep::Len(n)) => {
                            usize::try_from(n).map_err(|_| Error::Overflow { pos: self.position() })?;
                            if let Some(Frame::Text { remaining, .. }) = self.stack.last_mut() {
                                *remaining = Some(n);
                            }
                            continue;
                        }
                    };
                }
                Some(0) => {
                    if indefinite {
                        if let Some(Frame::Text { remaining, .. }) = self.stack.last_mut() {
                            *remaining = None;
                        }
                        continue;
                    }
                    if let Some(event) = self.flush_incomplete_text_carry()? {
                        return Ok(Some(event));
                    }
                    self.stack.pop();
                    return Ok(Some(Event::StringEnd));
                }
                Some(n) => {
                    let avail = self.source.available();
                    if avail == 0 {
                        return if self.source.is_final() {
                            Err(Error::Truncated { pos: self.position(), expected: n })
                        } else {
                            Ok(None)
                        };
                    }
                    let take = avail.min(n as usize);
                    let raw = self.take_bytes(take);
                    let taken = raw.len() as u64;
                    if let Some(Frame::Text { remaining, .. }) = self.stack.last_mut() {
                        *remaining = Some(n - taken);
                    }
                    return self.emit_text_chunk(raw);
                }
            }
        }
    }

    /// Flushes a carried incomplete UTF-8 tail that turned out to have no
    /// more bytes coming (the string/current chunk is ending). `Ok(None)`
    /// means there was nothing to flush and the caller should proceed to the
    /// actual termination event.
    fn flush_incomplete_text_carry(&mut self) -> Result<Option<Event>, Error> {
        use crate::source::CodingErrorAction;
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

    /// Validates `raw` (prefixed with any carried-over incomplete bytes from
    /// the previous chunk) as UTF-8, applying `on_invalid_utf8` to any
    /// interior malformed run and carrying a trailing incomplete sequence
    /// forward rather than treating it as an error (it may complete with the
    /// next chunk's leading bytes).
    fn emit_text_chunk(&mut self, raw: Vec<u8>) -> Result<Option<Event>, Error> {
        use crate::source::CodingErrorAction;
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

fn uint_primitive(v: u64) -> Primitive {
    if v <= i64::MAX as u64 {
        Primitive::Int(v as i64)
    } else {
        Primitive::UInt(v)
    }
}

/// `value = -1 - n` (RFC 8949 §3.1); falls back to [`Primitive::BigInt`] for
/// `n` close to `u64::MAX`, where `-1 - n` no longer fits an `i64`.
fn negative_primitive(n: u64) -> Primitive {
    let magnitude = u128::from(n) + 1;
    if magnitude <= i64::MAX as u128 + 1 {
        if magnitude == i64::MAX as u128 + 1 {
            Primitive::Int(i64::MIN)
        } else {
            Primitive::Int(-(magnitude as i64))
        }
    } else {
        let bytes = magnitude.to_be_bytes();
        let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(15);
        Primitive::BigInt(BigInt {
            negative: true,
            magnitude: bytes[first_nonzero..].to_vec(),
        })
    }
}

/// IEEE 754 binary16 -> binary32, per `spec.md` §4.2 ("Half-precision floats
/// are expanded to binary32 losslessly at emission").
fn half_to_f32(bits: u16) -> f32 {
    let sign = u32::from(bits >> 15) << 31;
    let exp = u32::from((bits >> 10) & 0x1F);
    let frac = u32::from(bits & 0x3FF);
    let bits32 = if exp == 0 {
        if frac == 0 {
            sign
        } else {
            // Subnormal half -> normalized single.
            let mut e = -1i32;
            let mut f = frac;
            while f & 0x400 == 0 {
                f <<= 1;
                e -= 1;
            }
            f &= 0x3FF;
            let exp32 = (e + 127 - 15) as u32;
            sign | (exp32 << 23) | (f << 13)
        }
    } else if exp == 0x1F {
        sign | 0xFF00_0000 | (frac << 13)
    } else {
        let exp32 = exp + (127 - 15);
        sign | (exp32 << 23) | (frac << 13)
    };
    f32::from_bits(bits32)
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

impl CborReaderOptions {
    /// `spec.md` §4.2 does not name a CBOR counterpart to the JSON reader's
    /// `allow_multiple_values` (RFC 8742 CBOR sequences); this crate does not
    /// expose one (single top-level value per stream), but centralizing the
    /// check here keeps `read_event`'s dispatch uniform with the JSON reader
    /// and documents the deliberate `false` in one place.
    fn allow_multiple_values_placeholder(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceByteSource;

    fn read_all(bytes: &[u8]) -> Vec<Event> {
        let mut reader = CborReader::new(SliceByteSource::new(bytes), CborReaderOptions::default());
        let mut out = Vec::new();
        while let Some(event) = reader.read_event().unwrap() {
            out.push(event);
        }
        out
    }

    #[test]
    fn decodes_small_unsigned_int() {
        assert_eq!(read_all(&[0x05]), alloc::vec![Event::Primitive(Primitive::Int(5))]);
    }

    #[test]
    fn decodes_two_byte_unsigned_int() {
        assert_eq!(
            read_all(&[0x19, 0x01, 0x00]),
            alloc::vec![Event::Primitive(Primitive::Int(256))]
        );
    }

    #[test]
    fn decodes_negative_int() {
        // -10: major 1, value 9.
        assert_eq!(read_all(&[0x29]), alloc::vec![Event::Primitive(Primitive::Int(-10))]);
    }

    #[test]
    fn decodes_negative_int_requiring_bigint() {
        let bytes = [0x3B, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        match read_all(&bytes).as_slice() {
            [Event::Primitive(Primitive::BigInt(b))] => {
                assert!(b.negative);
                assert_eq!(b.to_decimal_string(), "-18446744073709551616");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decodes_definite_array() {
        let bytes = [0x83, 0x01, 0x02, 0x03];
        assert_eq!(
            read_all(&bytes),
            alloc::vec![
                Event::ListStart { size: Some(3) },
                Event::Primitive(Primitive::Int(1)),
                Event::Primitive(Primitive::Int(2)),
                Event::Primitive(Primitive::Int(3)),
                Event::ListEnd,
            ]
        );
    }

    #[test]
    fn decodes_indefinite_array() {
        let bytes = [0x9F, 0x01, 0x02, BREAK];
        assert_eq!(
            read_all(&bytes),
            alloc::vec![
                Event::ListStart { size: None },
                Event::Primitive(Primitive::Int(1)),
                Event::Primitive(Primitive::Int(2)),
                Event::ListEnd,
            ]
        );
    }

    #[test]
    fn decodes_definite_map() {
        // {"a": 1}
        let bytes = [0xA1, 0x61, b'a', 0x01];
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
    fn rejects_duplicate_map_keys_by_default() {
        let bytes = [0xA2, 0x61, b'a', 0x01, 0x61, b'a', 0x02];
        let mut reader = CborReader::new(SliceByteSource::new(&bytes), CborReaderOptions::default());
        reader.read_event().unwrap(); // MapStart
        reader.read_event().unwrap(); // "a"
        reader.read_event().unwrap(); // 1
        let err = loop {
            match reader.read_event() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected duplicate key error"),
                Err(e) => break e,
            }
        };
        assert!(matches!(err, Error::DuplicateKey { .. }));
    }

    #[test]
    fn decodes_definite_byte_string() {
        let bytes = [0x43, 0x01, 0x02, 0x03];
        assert_eq!(
            read_all(&bytes),
            alloc::vec![
                Event::BufferStart { byte_len: Some(3) },
                Event::BufferData(alloc::vec![1, 2, 3]),
                Event::BufferEnd,
            ]
        );
    }

    #[test]
    fn decodes_indefinite_text_string_chunks() {
        // (_ "ab", "cd")
        let bytes = [0x7F, 0x62, b'a', b'b', 0x62, b'c', b'd', BREAK];
        assert_eq!(
            read_all(&bytes),
            alloc::vec![
                Event::StringStart { byte_len: None },
                Event::StringData("ab".into()),
                Event::StringData("cd".into()),
                Event::StringEnd,
            ]
        );
    }

    #[test]
    fn decodes_tag_then_value() {
        // tag 2 (positive bignum) wrapping a byte string.
        let bytes = [0xC2, 0x41, 0xFF];
        assert_eq!(
            read_all(&bytes),
            alloc::vec![
                Event::Tag(2),
                Event::BufferStart { byte_len: Some(1) },
                Event::BufferData(alloc::vec![0xFF]),
                Event::BufferEnd,
            ]
        );
    }

    #[test]
    fn decodes_simple_literals() {
        assert_eq!(read_all(&[0xF4]), alloc::vec![Event::Primitive(Primitive::Bool(false))]);
        assert_eq!(read_all(&[0xF5]), alloc::vec![Event::Primitive(Primitive::Bool(true))]);
        assert_eq!(read_all(&[0xF6]), alloc::vec![Event::Primitive(Primitive::Null)]);
        assert_eq!(read_all(&[0xF7]), alloc::vec![Event::Primitive(Primitive::Undefined)]);
    }

    #[test]
    fn decodes_double_float() {
        let bits = 2.5f64.to_bits();
        let mut bytes = alloc::vec![0xFB];
        bytes.extend_from_slice(&bits.to_be_bytes());
        assert_eq!(read_all(&bytes), alloc::vec![Event::Primitive(Primitive::Float(2.5))]);
    }

    #[test]
    fn decodes_half_float() {
        // 1.5 in binary16: sign=0 exp=15(0b01111) frac=0x200 -> 0x3E00
        let bytes = [0xF9, 0x3E, 0x00];
        assert_eq!(read_all(&bytes), alloc::vec![Event::Primitive(Primitive::Float(1.5))]);
    }

    #[test]
    fn rejects_reserved_additional_info() {
        let mut reader = CborReader::new(SliceByteSource::new(&[0x1C]), CborReaderOptions::default());
        assert!(matches!(reader.read_event(), Err(Error::InvalidPrefix { .. })));
    }

    #[test]
    fn suspends_then_resumes_across_partial_input() {
        use crate::source::PartialByteSource;
        let mut src = PartialByteSource::new();
        src.feed(&[0x19]); // start of a 2-byte-argument unsigned int
        let mut reader = CborReader::new(src, CborReaderOptions::default());
        assert_eq!(reader.read_event().unwrap(), None);
        let mut src = reader.into_inner();
        src.feed(&[0x01, 0x00]);
        src.finish();
        let mut reader = CborReader::new(src, CborReaderOptions::default());
        assert_eq!(reader.read_event().unwrap(), Some(Event::Primitive(Primitive::Int(256))));
    }

    #[test]
    fn truncated_definite_buffer_is_an_error() {
        let mut src = crate::source::PartialByteSource::new();
        src.feed(&[0x43, 0x01, 0x02]); // declares 3 bytes, only 2 follow
        src.finish();
        let mut reader = CborReader::new(src, CborReaderOptions::default());
        reader.read_event().unwrap(); // BufferStart
        assert!(matches!(reader.read_event(), Err(Error::Truncated { .. })));
    }
}

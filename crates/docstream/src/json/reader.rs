//! The incremental JSON reader (`spec.md` §4.1).
//!
//! Mirrors the teacher crate's `parser.rs` frame-stack design — an explicit
//! `Vec<Frame>` rather than recursion, so the automaton can suspend mid
//! container and resume later without unwinding a call stack — but emits the
//! shared [`Event`] vocabulary instead of path-annotated parse events.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, Position};
use crate::event::{Event, Primitive};
use crate::json::nfc::normalize_nfc;
use crate::json::numbers::classify_number;
use crate::json::options::JsonReaderOptions;
use crate::source::CharSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayState {
    ExpectValueOrEnd,
    ExpectCommaOrEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectState {
    ExpectKeyOrEnd,
    ExpectColon,
    ExpectValue,
    ExpectCommaOrEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Array(ArrayState),
    Object(ObjectState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootState {
    BeforeFirst,
    AfterValue,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Backslash,
    Unicode { value: u32, remaining: u8 },
    LowSurrogateBackslash { high: u16 },
    LowSurrogateU { high: u16 },
    LowSurrogateUnicode { high: u16, value: u32, remaining: u8 },
}

#[derive(Debug, Clone)]
struct StringScan {
    buf: String,
    escape: Escape,
    chunking: bool,
}

impl StringScan {
    fn new() -> Self {
        Self {
            buf: String::new(),
            escape: Escape::None,
            chunking: false,
        }
    }
}

#[derive(Debug, Clone)]
enum Pending {
    None,
    /// Accumulating the digits of a number literal (or a hex literal).
    Number(String),
    /// Accumulating a bare keyword literal: `true`, `false`, `null`, `NaN`,
    /// `Infinity`, `-Infinity`.
    Literal(String),
    /// Mid-string (quoted key or value).
    Str(StringScan),
    /// One `StringData`/`StringEnd`/bare-`Primitive::String` event is queued;
    /// `resume` (if any) is the scan state to restore afterward so chunked
    /// scanning can continue.
    StrFlush {
        text: String,
        chunking: bool,
        emit_end: bool,
        resume: Option<alloc::boxed::Box<StringScan>>,
    },
    /// A leading `-` has been consumed but not yet enough lookahead to know
    /// whether it starts a negative number or the `-Infinity` literal.
    Minus,
}

/// An incremental, resumable JSON reader.
///
/// Call [`JsonReader::read_event`] in a loop. It returns `Ok(Some(event))`
/// for each step of the document, `Ok(None)` when the underlying
/// [`CharSource`] has no more decodable input *yet* (feed more bytes and call
/// again) or — once `source.is_final()` — when the document stream is
/// genuinely exhausted.
pub struct JsonReader<S> {
    source: S,
    options: JsonReaderOptions,
    stack: Vec<Frame>,
    root: RootState,
    pending: Pending,
}

impl<S: CharSource> JsonReader<S> {
    #[must_use]
    pub fn new(source: S, options: JsonReaderOptions) -> Self {
        Self {
            source,
            options,
            stack: Vec::new(),
            root: RootState::BeforeFirst,
            pending: Pending::None,
        }
    }

    #[must_use]
    pub fn is_final(&self) -> bool {
        self.source.is_final()
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    fn position(&self) -> Position {
        self.source.position()
    }

    fn err_syntax(&self, msg: impl Into<String>) -> Error {
        Error::Syntax {
            pos: self.position(),
            msg: msg.into(),
        }
    }

    /// Skips whitespace and (if enabled) comments. `Ok(true)` means the
    /// caller may proceed; `Ok(false)` means input ran out mid-skip and the
    /// caller should suspend (re-entrant: calling again resumes cleanly,
    /// since no partial comment/whitespace state needs to survive — only
    /// already-consumed chars do).
    fn skip_insignificant(&mut self) -> Result<bool, Error> {
        loop {
            let Some(c) = self.source.peek_char()? else {
                return Ok(!self.more_possible());
            };
            if c.is_whitespace() {
                self.source.next_char()?;
                continue;
            }
            if self.options.allow_comments && c == '/' {
                if !self.skip_comment()? {
                    return Ok(false);
                }
                continue;
            }
            return Ok(true);
        }
    }

    /// `true` when the source has no more input and never will.
    fn more_possible(&self) -> bool {
        !self.source.is_final()
    }

    fn skip_comment(&mut self) -> Result<bool, Error> {
        // Caller already peeked the leading '/'.
        self.source.next_char()?;
        let Some(kind) = self.source.next_char()? else {
            if self.more_possible() {
                return Ok(false);
            }
            return Err(self.err_syntax("unterminated comment"));
        };
        match kind {
            '/' => loop {
                match self.source.next_char()? {
                    Some('\n') | None if !self.more_possible() => return Ok(true),
                    Some('\n') => return Ok(true),
                    Some(_) => {}
                    None => return Ok(false),
                }
            },
            '*' => {
                let mut prev_star = false;
                loop {
                    match self.source.next_char()? {
                        Some('*') => prev_star = true,
                        Some('/') if prev_star => return Ok(true),
                        Some(_) => prev_star = false,
                        None => {
                            if self.more_possible() {
                                return Ok(false);
                            }
                            return Err(self.err_syntax("unterminated block comment"));
                        }
                    }
                }
            }
            _ => Err(self.err_syntax("expected comment after '/'")),
        }
    }

    /// Main entry point: produces the next event, or `Ok(None)` to suspend
    /// or signal end-of-stream (see struct docs).
    pub fn read_event(&mut self) -> Result<Option<Event>, Error> {
        loop {
            if let Some(event) = self.drain_pending()? {
                return Ok(Some(event));
            }
            if !matches!(self.pending, Pending::None) {
                // still mid-token, ran out of input
                return Ok(None);
            }

            match self.stack.last().copied() {
                None => return self.step_root(),
                Some(Frame::Array(state)) => {
                    if let Some(event) = self.step_array(state)? {
                        return Ok(Some(event));
                    }
                }
                Some(Frame::Object(state)) => {
                    if let Some(event) = self.step_object(state)? {
                        return Ok(Some(event));
                    }
                }
            }
            if matches!(self.pending, Pending::None) && self.stack.is_empty() && self.root == RootState::Done {
                return Ok(None);
            }
        }
    }

    fn step_root(&mut self) -> Result<Option<Event>, Error> {
        match self.root {
            RootState::Done => Ok(None),
            RootState::BeforeFirst => {
                if !self.skip_insignificant()? {
                    return Ok(None);
                }
                if self.source.peek_char()?.is_none() {
                    return Ok(None);
                }
                self.parse_value()
            }
            RootState::AfterValue => {
                if !self.skip_insignificant()? {
                    return Ok(None);
                }
                match self.source.peek_char()? {
                    None => {
                        if self.more_possible() {
                            Ok(None)
                        } else {
                            self.root = RootState::Done;
                            Ok(None)
                        }
                    }
                    Some(_) if self.options.allow_multiple_values => {
                        self.root = RootState::BeforeFirst;
                        self.parse_value()
                    }
                    Some(c) => Err(self.err_syntax(alloc::format!(
                        "unexpected trailing character {c:?} after top-level value"
                    ))),
                }
            }
        }
    }

    fn step_array(&mut self, state: ArrayState) -> Result<Option<Event>, Error> {
        if !self.skip_insignificant()? {
            return Ok(None);
        }
        let Some(c) = self.source.peek_char()? else {
            return Ok(None);
        };
        match state {
            ArrayState::ExpectValueOrEnd => {
                if c == ']' {
                    self.source.next_char()?;
                    self.stack.pop();
                    self.after_value_emitted();
                    return Ok(Some(Event::ListEnd));
                }
                *self.stack.last_mut().expect("in array frame") =
                    Frame::Array(ArrayState::ExpectCommaOrEnd);
                self.parse_value()
            }
            ArrayState::ExpectCommaOrEnd => {
                if c == ']' {
                    self.source.next_char()?;
                    self.stack.pop();
                    self.after_value_emitted();
                    return Ok(Some(Event::ListEnd));
                }
                if c != ',' {
                    return Err(self.err_syntax(alloc::format!("expected ',' or ']', found {c:?}")));
                }
                self.source.next_char()?;
                if !self.skip_insignificant()? {
                    // Can't un-consume the comma; remember we're past it by
                    // staying in ExpectCommaOrEnd only if trailing commas are
                    // allowed and the next char is ']'. Simplify: just
                    // suspend and re-check on resume — the comma is already
                    // behind us, which is fine, this state still expects a
                    // value or (if allowed) ']'.
                    *self.stack.last_mut().expect("in array frame") =
                        Frame::Array(ArrayState::ExpectValueOrEnd);
                    return Ok(None);
                }
                let Some(next) = self.source.peek_char()? else {
                    *self.stack.last_mut().expect("in array frame") =
                        Frame::Array(ArrayState::ExpectValueOrEnd);
                    return Ok(None);
                };
                if next == ']' {
                    if !self.options.allow_trailing_comma {
                        return Err(self.err_syntax("trailing comma before ']' not allowed"));
                    }
                    self.source.next_char()?;
                    self.stack.pop();
                    self.after_value_emitted();
                    return Ok(Some(Event::ListEnd));
                }
                *self.stack.last_mut().expect("in array frame") =
                    Frame::Array(ArrayState::ExpectCommaOrEnd);
                self.parse_value()
            }
        }
    }

    fn step_object(&mut self, state: ObjectState) -> Result<Option<Event>, Error> {
        if !self.skip_insignificant()? {
            return Ok(None);
        }
        let Some(c) = self.source.peek_char()? else {
            return Ok(None);
        };
        match state {
            ObjectState::ExpectKeyOrEnd => {
                if c == '}' {
                    self.source.next_char()?;
                    self.stack.pop();
                    self.after_value_emitted();
                    return Ok(Some(Event::MapEnd));
                }
                *self.stack.last_mut().expect("in object frame") =
                    Frame::Object(ObjectState::ExpectColon);
                self.parse_key(c)
            }
            ObjectState::ExpectColon => {
                if c != ':' {
                    return Err(self.err_syntax(alloc::format!("expected ':', found {c:?}")));
                }
                self.source.next_char()?;
                *self.stack.last_mut().expect("in object frame") =
                    Frame::Object(ObjectState::ExpectValue);
                Ok(None)
            }
            ObjectState::ExpectValue => {
                *self.stack.last_mut().expect("in object frame") =
                    Frame::Object(ObjectState::ExpectCommaOrEnd);
                self.parse_value()
            }
            ObjectState::ExpectCommaOrEnd => {
                if c == '}' {
                    self.source.next_char()?;
                    self.stack.pop();
                    self.after_value_emitted();
                    return Ok(Some(Event::MapEnd));
                }
                if c != ',' {
                    return Err(self.err_syntax(alloc::format!("expected ',' or '}}', found {c:?}")));
                }
                self.source.next_char()?;
                if !self.skip_insignificant()? {
                    *self.stack.last_mut().expect("in object frame") =
                        Frame::Object(ObjectState::ExpectKeyOrEnd);
                    return Ok(None);
                }
                let Some(next) = self.source.peek_char()? else {
                    *self.stack.last_mut().expect("in object frame") =
                        Frame::Object(ObjectState::ExpectKeyOrEnd);
                    return Ok(None);
                };
                if next == '}' {
                    if !self.options.allow_trailing_comma {
                        return Err(self.err_syntax("trailing comma before '}' not allowed"));
                    }
                    self.source.next_char()?;
                    self.stack.pop();
                    self.after_value_emitted();
                    return Ok(Some(Event::MapEnd));
                }
                *self.stack.last_mut().expect("in object frame") =
                    Frame::Object(ObjectState::ExpectColon);
                self.parse_key(next)
            }
        }
    }

    fn after_value_emitted(&mut self) {
        if self.stack.is_empty() {
            self.root = RootState::AfterValue;
        }
    }

    fn parse_key(&mut self, lead: char) -> Result<Option<Event>, Error> {
        if lead == '"' {
            self.source.next_char()?;
            self.pending = Pending::Str(StringScan::new());
            return self.drain_pending();
        }
        if self.options.allow_unquoted_keys && (lead.is_alphanumeric() || lead == '_' || lead == '$') {
            let mut buf = String::new();
            loop {
                let Some(c) = self.source.peek_char()? else {
                    if self.more_possible() {
                        self.pending = Pending::Literal(buf);
                        return Ok(None);
                    }
                    break;
                };
                if c.is_alphanumeric() || c == '_' || c == '$' {
                    buf.push(c);
                    self.source.next_char()?;
                } else {
                    break;
                }
            }
            return Ok(Some(Event::Primitive(Primitive::String(buf))));
        }
        Err(self.err_syntax(alloc::format!("expected object key, found {lead:?}")))
    }

    fn parse_value(&mut self) -> Result<Option<Event>, Error> {
        if !self.skip_insignificant()? {
            return Ok(None);
        }
        let Some(c) = self.source.peek_char()? else {
            return Ok(None);
        };
        match c {
            '{' => {
                self.source.next_char()?;
                self.push_container()?;
                self.stack.push(Frame::Object(ObjectState::ExpectKeyOrEnd));
                Ok(Some(Event::MapStart { size: None }))
            }
            '[' => {
                self.source.next_char()?;
                self.push_container()?;
                self.stack.push(Frame::Array(ArrayState::ExpectValueOrEnd));
                Ok(Some(Event::ListStart { size: None }))
            }
            '"' => {
                self.source.next_char()?;
                self.pending = Pending::Str(StringScan::new());
                self.drain_pending()
            }
            't' | 'f' | 'n' | 'N' | 'I' => {
                self.pending = Pending::Literal(String::new());
                self.drain_pending()
            }
            '-' => {
                self.source.next_char()?;
                self.pending = Pending::Minus;
                self.drain_pending()
            }
            '0'..='9' => {
                self.pending = Pending::Number(String::new());
                self.drain_pending()
            }
            other => Err(self.err_syntax(alloc::format!("unexpected character {other:?}"))),
        }
    }

    /// A `-` has already been consumed; one more char of lookahead (which
    /// `CharSource` does support) is all that's needed to tell `-Infinity`
    /// apart from a negative number, since no JSON number literal may start
    /// with `-I` and `-Infinity` is the only `allow_nan` literal starting
    /// with `-`.
    fn drain_minus(&mut self) -> Result<Option<Event>, Error> {
        let Some(next) = self.source.peek_char()? else {
            if self.more_possible() {
                self.pending = Pending::Minus;
                return Ok(None);
            }
            return Err(Error::UnexpectedEof {
                pos: self.position(),
            });
        };
        if self.options.allow_nan && next == 'I' {
            self.drain_literal(String::from("-"))
        } else {
            self.drain_number(String::from("-"))
        }
    }

    fn push_container(&mut self) -> Result<(), Error> {
        if let Some(limit) = self.options.depth_limit {
            if self.stack.len() as u32 >= limit {
                return Err(Error::DepthLimit {
                    pos: self.position(),
                });
            }
        }
        Ok(())
    }

    fn drain_pending(&mut self) -> Result<Option<Event>, Error> {
        match core::mem::replace(&mut self.pending, Pending::None) {
            Pending::None => Ok(None),
            Pending::Number(buf) => self.drain_number(buf),
            Pending::Literal(buf) => self.drain_literal(buf),
            Pending::Str(scan) => self.drain_string(scan),
            Pending::StrFlush {
                text,
                chunking,
                emit_end,
                resume,
            } => {
                let event = self.flush_string(text, chunking, emit_end);
                if let Some(scan) = resume {
                    self.pending = Pending::Str(*scan);
                }
                Ok(Some(event))
            }
            Pending::Minus => self.drain_minus(),
        }
    }

    fn flush_string(&self, text: String, chunking: bool, emit_end: bool) -> Event {
        let text = if self.options.nfc { normalize_nfc(&text) } else { text };
        if chunking {
            if emit_end {
                Event::StringEnd
            } else {
                Event::StringData(text)
            }
        } else {
            Event::Primitive(Primitive::String(text))
        }
    }

    fn drain_number(&mut self, mut buf: String) -> Result<Option<Event>, Error> {
        loop {
            let Some(c) = self.source.peek_char()? else {
                if self.more_possible() {
                    self.pending = Pending::Number(buf);
                    return Ok(None);
                }
                break;
            };
            if c.is_ascii_digit()
                || c == '.'
                || c == '-'
                || c == '+'
                || c == 'e'
                || c == 'E'
                || (self.options.allow_hex_integers && (c == 'x' || c == 'X' || c.is_ascii_hexdigit()))
            {
                buf.push(c);
                self.source.next_char()?;
            } else {
                break;
            }
        }
        if buf.is_empty() {
            return Err(self.err_syntax("empty number literal"));
        }
        if self.options.allow_hex_integers && (buf.starts_with("0x") || buf.starts_with("0X")) {
            let value = i64::from_str_radix(&buf[2..], 16)
                .map_err(|_| self.err_syntax("invalid hex integer literal"))?;
            return Ok(Some(Event::Primitive(Primitive::Int(value))));
        }
        Ok(Some(Event::Primitive(classify_number(
            &buf,
            self.options.big_decimal,
        ))))
    }

    fn drain_literal(&mut self, mut buf: String) -> Result<Option<Event>, Error> {
        const CANDIDATES: &[&str] = &["true", "false", "null", "NaN", "Infinity", "-Infinity"];
        loop {
            let plausible: Vec<&&str> = CANDIDATES
                .iter()
                .filter(|cand| cand.starts_with(buf.as_str()))
                .collect();
            if plausible.is_empty() {
                return Err(self.err_syntax(alloc::format!("invalid literal {buf:?}")));
            }
            if plausible.len() == 1 && plausible[0].len() == buf.len() {
                return self.finish_literal(&buf);
            }
            let Some(c) = self.source.peek_char()? else {
                if self.more_possible() {
                    self.pending = Pending::Literal(buf);
                    return Ok(None);
                }
                return self.finish_literal(&buf);
            };
            if plausible.iter().any(|cand| cand.as_bytes().get(buf.len()) == Some(&(c as u8))) {
                buf.push(c);
                self.source.next_char()?;
            } else if plausible.len() == 1 && plausible[0].len() == buf.len() {
                return self.finish_literal(&buf);
            } else {
                return Err(self.err_syntax(alloc::format!("invalid literal {buf:?}")));
            }
        }
    }

    fn finish_literal(&self, buf: &str) -> Result<Option<Event>, Error> {
        let primitive = match buf {
            "true" => Primitive::Bool(true),
            "false" => Primitive::Bool(false),
            "null" => Primitive::Null,
            "NaN" if self.options.allow_nan => Primitive::Float(f64::NAN),
            "Infinity" if self.options.allow_nan => Primitive::Float(f64::INFINITY),
            "-Infinity" if self.options.allow_nan => Primitive::Float(f64::NEG_INFINITY),
            other => return Err(self.err_syntax(alloc::format!("invalid literal {other:?}"))),
        };
        Ok(Some(Event::Primitive(primitive)))
    }

    fn drain_string(&mut self, mut scan: StringScan) -> Result<Option<Event>, Error> {
        loop {
            let Some(c) = self.source.next_char()? else {
                if self.more_possible() {
                    self.pending = Pending::Str(scan);
                    return Ok(None);
                }
                return Err(Error::UnexpectedEof {
                    pos: self.position(),
                });
            };

            match scan.escape {
                Escape::None => {
                    if c == '"' {
                        return self.emit_string_completion(scan);
                    }
                    if c == '\\' {
                        scan.escape = Escape::Backslash;
                        continue;
                    }
                    scan.buf.push(c);
                }
                Escape::Backslash => {
                    scan.escape = Escape::None;
                    match c {
                        '"' => scan.buf.push('"'),
                        '\\' => scan.buf.push('\\'),
                        '/' => scan.buf.push('/'),
                        'b' => scan.buf.push('\u{0008}'),
                        'f' => scan.buf.push('\u{000C}'),
                        'n' => scan.buf.push('\n'),
                        'r' => scan.buf.push('\r'),
                        't' => scan.buf.push('\t'),
                        'u' => {
                            scan.escape = Escape::Unicode {
                                value: 0,
                                remaining: 4,
                            };
                        }
                        other => {
                            return Err(self.err_syntax(alloc::format!("invalid escape \\{other}")));
                        }
                    }
                }
                Escape::Unicode { value, remaining } => {
                    let digit = c
                        .to_digit(16)
                        .ok_or_else(|| self.err_syntax("invalid \\u escape digit"))?;
                    let value = (value << 4) | digit;
                    if remaining > 1 {
                        scan.escape = Escape::Unicode {
                            value,
                            remaining: remaining - 1,
                        };
                        continue;
                    }
                    if (0xD800..=0xDBFF).contains(&value) {
                        scan.escape = Escape::LowSurrogateBackslash { high: value as u16 };
                        continue;
                    }
                    match char::from_u32(value) {
                        Some(ch) => scan.buf.push(ch),
                        None => scan.buf.push('\u{FFFD}'),
                    }
                    scan.escape = Escape::None;
                }
                Escape::LowSurrogateBackslash { high } => {
                    if c != '\\' {
                        return Err(self.err_syntax("expected low surrogate escape"));
                    }
                    scan.escape = Escape::LowSurrogateU { high };
                }
                Escape::LowSurrogateU { high } => {
                    if c != 'u' {
                        return Err(self.err_syntax("expected low surrogate \\u escape"));
                    }
                    scan.escape = Escape::LowSurrogateUnicode {
                        high,
                        value: 0,
                        remaining: 4,
                    };
                }
                Escape::LowSurrogateUnicode {
                    high,
                    value,
                    remaining,
                } => {
                    let digit = c
                        .to_digit(16)
                        .ok_or_else(|| self.err_syntax("invalid \\u escape digit"))?;
                    let value = (value << 4) | digit;
                    if remaining > 1 {
                        scan.escape = Escape::LowSurrogateUnicode {
                            high,
                            value,
                            remaining: remaining - 1,
                        };
                        continue;
                    }
                    if !(0xDC00..=0xDFFF).contains(&value) {
                        return Err(self.err_syntax("invalid low surrogate"));
                    }
                    let combined = 0x10000u32 + ((u32::from(high) - 0xD800) << 10) + (value - 0xDC00);
                    match char::from_u32(combined) {
                        Some(ch) => scan.buf.push(ch),
                        None => scan.buf.push('\u{FFFD}'),
                    }
                    scan.escape = Escape::None;
                }
            }

            if let Some(threshold) = self.options.fast_string_length {
                if !scan.chunking && scan.buf.len() > threshold {
                    scan.chunking = true;
                    let chunk = core::mem::take(&mut scan.buf);
                    // Emit `StringStart` now; the already-scanned chunk is
                    // queued as the follow-up `StringData` so this call still
                    // produces exactly one event, and scanning resumes from
                    // `scan` (now emptied) afterward.
                    self.pending = Pending::StrFlush {
                        text: chunk,
                        chunking: true,
                        emit_end: false,
                        resume: Some(alloc::boxed::Box::new(scan)),
                    };
                    return Ok(Some(Event::StringStart { byte_len: None }));
                }
                if scan.chunking && scan.buf.len() > threshold {
                    let chunk = core::mem::take(&mut scan.buf);
                    self.pending = Pending::Str(scan);
                    return Ok(Some(Event::StringData(if self.options.nfc {
                        normalize_nfc(&chunk)
                    } else {
                        chunk
                    })));
                }
            }
        }
    }

    fn emit_string_completion(&mut self, scan: StringScan) -> Result<Option<Event>, Error> {
        if !scan.chunking {
            return Ok(Some(self.flush_string(scan.buf, false, false)));
        }
        // Queue `StringEnd` as the follow-up event; emit any still-buffered
        // text as the final `StringData` now (or `StringEnd` itself, if the
        // buffer was already empty).
        self.pending = Pending::StrFlush {
            text: String::new(),
            chunking: true,
            emit_end: true,
            resume: None,
        };
        if scan.buf.is_empty() {
            self.drain_pending()
        } else {
            Ok(Some(self.flush_string(scan.buf, true, false)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SliceByteSource, Utf8CharSource};

    fn reader(input: &str, options: JsonReaderOptions) -> JsonReader<Utf8CharSource<SliceByteSource<'_>>> {
        JsonReader::new(Utf8CharSource::new(SliceByteSource::new(input.as_bytes())), options)
    }

    fn collect(input: &str, options: JsonReaderOptions) -> Vec<Event> {
        let mut r = reader(input, options);
        let mut out = Vec::new();
        while let Some(ev) = r.read_event().unwrap() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn parses_scalar_values() {
        assert_eq!(
            collect("42", JsonReaderOptions::default()),
            alloc::vec![Event::Primitive(Primitive::Int(42))]
        );
        assert_eq!(
            collect("true", JsonReaderOptions::default()),
            alloc::vec![Event::Primitive(Primitive::Bool(true))]
        );
        assert_eq!(
            collect("null", JsonReaderOptions::default()),
            alloc::vec![Event::Primitive(Primitive::Null)]
        );
        assert_eq!(
            collect("\"hi\"", JsonReaderOptions::default()),
            alloc::vec![Event::Primitive(Primitive::String("hi".into()))]
        );
    }

    #[test]
    fn parses_nested_array_and_object() {
        let events = collect(r#"{"a":[1,2,3]}"#, JsonReaderOptions::default());
        assert_eq!(
            events,
            alloc::vec![
                Event::MapStart { size: None },
                Event::Primitive(Primitive::String("a".into())),
                Event::ListStart { size: None },
                Event::Primitive(Primitive::Int(1)),
                Event::Primitive(Primitive::Int(2)),
                Event::Primitive(Primitive::Int(3)),
                Event::ListEnd,
                Event::MapEnd,
            ]
        );
    }

    #[test]
    fn handles_escapes() {
        let events = collect(r#""a\nbA""#, JsonReaderOptions::default());
        assert_eq!(
            events,
            alloc::vec![Event::Primitive(Primitive::String("a\nbA".into()))]
        );
    }

    #[test]
    fn rejects_trailing_garbage_by_default() {
        let mut r = reader("1 2", JsonReaderOptions::default());
        assert_eq!(r.read_event().unwrap(), Some(Event::Primitive(Primitive::Int(1))));
        assert!(r.read_event().is_err());
    }

    #[test]
    fn allow_multiple_values_reads_a_stream() {
        let options = JsonReaderOptions {
            allow_multiple_values: true,
            ..Default::default()
        };
        let events = collect("1 2 3", options);
        assert_eq!(
            events,
            alloc::vec![
                Event::Primitive(Primitive::Int(1)),
                Event::Primitive(Primitive::Int(2)),
                Event::Primitive(Primitive::Int(3)),
            ]
        );
    }

    #[test]
    fn depth_limit_rejects_deep_nesting() {
        let options = JsonReaderOptions {
            depth_limit: Some(1),
            ..Default::default()
        };
        let mut r = reader("[[1]]", options);
        assert_eq!(r.read_event().unwrap(), Some(Event::ListStart { size: None }));
        assert!(r.read_event().is_err());
    }

    #[test]
    fn suspends_on_incomplete_input_then_resumes() {
        use crate::source::PartialByteSource;
        let mut bytes = PartialByteSource::new();
        // The closing '}' lets the `1` literal terminate unambiguously even
        // though the source has not been marked final; a number with no
        // trailing delimiter yet fed would instead have to suspend, since
        // more digits could still arrive.
        bytes.feed(b"{\"a\":1}");
        let source = Utf8CharSource::new(bytes);
        let mut r = JsonReader::new(source, JsonReaderOptions::default());
        assert_eq!(r.read_event().unwrap(), Some(Event::MapStart { size: None }));
        assert_eq!(
            r.read_event().unwrap(),
            Some(Event::Primitive(Primitive::String("a".into())))
        );
        assert_eq!(r.read_event().unwrap(), Some(Event::Primitive(Primitive::Int(1))));
        assert_eq!(r.read_event().unwrap(), Some(Event::MapEnd));
        // Source not marked final yet: suspends rather than erroring on EOF.
        assert_eq!(r.read_event().unwrap(), None);
        assert!(!r.is_final());
    }
}

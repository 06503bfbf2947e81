//! The JSON writer (`spec.md` §4.4): an [`EventSink`] that renders a
//! well-balanced event stream as JSON text.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::WriteError;
use crate::event::{Event, Primitive};
use crate::json::nfc::normalize_nfc;
use crate::json::numbers::format_float;
use crate::json::options::{CborDiag, JsonWriterOptions};
use crate::sink::EventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Array { count: u64 },
    Object { count: u64, awaiting_value: bool },
}

/// Tracks a value (and everything nested in it) being silently dropped
/// because `max_container_size` capped its enclosing container.
/// `remaining_units` is 1 for a dropped array element, 2 for a dropped
/// object pair (key, then value); `nested_depth` counts unmatched
/// `*Start`s within the unit currently being dropped.
#[derive(Debug, Clone, Copy)]
struct Suppression {
    remaining_units: u32,
    nested_depth: u32,
}

/// Writes JSON text incrementally as [`Event`]s arrive.
///
/// Unlike the reader, the writer has no notion of suspension: every event it
/// is handed either completes immediately or is rejected with
/// [`WriteError::InvalidState`] (e.g. `StringEnd` with no open
/// `StringStart`). Output accumulates in an internal buffer retrieved with
/// [`JsonWriter::finish`].
pub struct JsonWriter {
    options: JsonWriterOptions,
    out: String,
    stack: Vec<Frame>,
    pending_tag: Option<u64>,
    in_chunked_string: bool,
    in_chunked_buffer: bool,
    wrote_top_level: bool,
    suppress: Option<Suppression>,
}

impl JsonWriter {
    #[must_use]
    pub fn new(options: JsonWriterOptions) -> Self {
        Self {
            options,
            out: String::new(),
            stack: Vec::new(),
            pending_tag: None,
            in_chunked_string: false,
            in_chunked_buffer: false,
            wrote_top_level: false,
            suppress: None,
        }
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    fn indent(&mut self) {
        if self.options.indent > 0 {
            self.out.push('\n');
            for _ in 0..(self.stack.len() as u32 * self.options.indent) {
                self.out.push(' ');
            }
        }
    }

    /// Prepares the buffer for the next value slot (comma/colon/indent as
    /// needed). Returns `Ok(false)` when `max_container_size` caps the
    /// enclosing container and this slot — a brand new array element or
    /// object pair — is over budget; the caller must then drop the value
    /// (and everything nested in it) instead of writing it.
    fn before_value(&mut self) -> Result<bool, WriteError> {
        match self.stack.last_mut() {
            None => {
                if self.wrote_top_level {
                    return Err(WriteError::InvalidState(
                        "a value was already written at the top level".into(),
                    ));
                }
            }
            Some(Frame::Array { count }) => {
                if let Some(max) = self.options.max_container_size {
                    if *count as usize >= max {
                        return Ok(false);
                    }
                }
                if *count > 0 {
                    self.out.push(',');
                    if self.options.space_after_comma && self.options.indent == 0 {
                        self.out.push(' ');
                    }
                }
                *count += 1;
                self.indent();
            }
            Some(Frame::Object {
                count,
                awaiting_value,
            }) => {
                if *awaiting_value {
                    self.out.push(':');
                    if self.options.space_after_colon {
                        self.out.push(' ');
                    }
                    *awaiting_value = false;
                } else {
                    if let Some(max) = self.options.max_container_size {
                        if *count as usize >= max {
                            return Ok(false);
                        }
                    }
                    if *count > 0 {
                        self.out.push(',');
                        if self.options.space_after_comma && self.options.indent == 0 {
                            self.out.push(' ');
                        }
                    }
                    *count += 1;
                    self.indent();
                    *awaiting_value = true;
                }
            }
        }
        Ok(true)
    }

    fn after_top_level_value(&mut self) {
        if self.stack.is_empty() {
            self.wrote_top_level = true;
        }
    }

    fn write_escaped_str(&mut self, s: &str) {
        let normalized;
        let s = if self.options.nfc {
            normalized = normalize_nfc(s);
            normalized.as_str()
        } else {
            s
        };
        let truncated = match self.options.max_string_length {
            Some(max) if s.len() > max => {
                let mut end = max;
                while end > 0 && !s.is_char_boundary(end) {
                    end -= 1;
                }
                &s[..end]
            }
            _ => s,
        };
        self.out.push('"');
        for c in truncated.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                '\u{0008}' => self.out.push_str("\\b"),
                '\u{000C}' => self.out.push_str("\\f"),
                c if (c as u32) < 0x20 => {
                    self.out.push_str(&alloc::format!("\\u{:04x}", c as u32));
                }
                c => self.out.push(c),
            }
        }
        if truncated.len() < s.len() {
            self.out.push('…');
        }
        self.out.push('"');
    }

    fn write_primitive(&mut self, p: &Primitive) {
        match p {
            Primitive::Int(n) => self.out.push_str(&alloc::format!("{n}")),
            Primitive::UInt(n) => self.out.push_str(&alloc::format!("{n}")),
            Primitive::BigInt(b) => self.out.push_str(&b.to_decimal_string()),
            Primitive::Float(f) => {
                if f.is_nan() {
                    self.out.push_str(if self.options.allow_nan { "NaN" } else { "null" });
                } else if f.is_infinite() {
                    let lit = if *f < 0.0 { "-Infinity" } else { "Infinity" };
                    self.out.push_str(if self.options.allow_nan { lit } else { "null" });
                } else {
                    self.out.push_str(&format_float(*f));
                }
            }
            Primitive::Decimal(d) => {
                self.out
                    .push_str(&alloc::format!("{}e{}", d.mantissa.to_decimal_string(), d.exponent));
            }
            Primitive::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Primitive::Null | Primitive::Undefined => self.out.push_str("null"),
            Primitive::String(s) => self.write_escaped_str(s),
        }
    }

    fn write_tag_prefix(&mut self) {
        if let Some(tag) = self.pending_tag.take() {
            if self.options.cbor_diag != CborDiag::Off {
                self.out.push_str(&alloc::format!("{tag}("));
                // Closing paren is the caller's responsibility; tracked via
                // depth would add a whole frame kind for a diagnostics-only
                // feature, so this crate renders tag parens best-effort
                // around the immediately following scalar only.
            }
        }
    }

    fn encode_buffer_chunk(&mut self, bytes: &[u8]) {
        match self.options.cbor_diag {
            CborDiag::Hex => {
                for b in bytes {
                    self.out.push_str(&alloc::format!("{b:02x}"));
                }
            }
            CborDiag::HexUpper => {
                for b in bytes {
                    self.out.push_str(&alloc::format!("{b:02X}"));
                }
            }
            _ => {
                // base64url, no padding, for plain JSON mode and the base64
                // diagnostic variants alike (std/url distinction only
                // matters for the alphabet, not this crate's fixed choice).
                self.out.push_str(&base64url_encode(bytes));
            }
        }
    }
}

/// Renders a non-string map key's textual demotion per `spec.md` §3.1
/// ("readers that target JSON-style maps demote non-string keys to their
/// textual form if configured, else fail"). Mirrors
/// `cbor::reader::primitive_key_text`'s set of demotable kinds: `Float`,
/// `Decimal`, and `Undefined` have no canonical text form and stay `None`.
fn key_text_for_primitive(p: &Primitive) -> Option<String> {
    match p {
        Primitive::String(s) => Some(s.clone()),
        Primitive::Int(n) => Some(alloc::format!("{n}")),
        Primitive::UInt(n) => Some(alloc::format!("{n}")),
        Primitive::BigInt(b) => Some(b.to_decimal_string()),
        Primitive::Bool(b) => Some(alloc::format!("{b}")),
        Primitive::Null => Some(String::from("null")),
        Primitive::Float(_) | Primitive::Decimal(_) | Primitive::Undefined => None,
    }
}

fn base64url_encode(bytes: &[u8]) -> String {
    const ALPHABET: &[u8; 64] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
    let mut out = String::with_capacity((bytes.len() + 2) / 3 * 4);
    for chunk in bytes.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied();
        let b2 = chunk.get(2).copied();
        out.push(ALPHABET[(b0 >> 2) as usize] as char);
        out.push(ALPHABET[(((b0 & 0x03) << 4) | (b1.unwrap_or(0) >> 4)) as usize] as char);
        if let Some(b1) = b1 {
            out.push(ALPHABET[(((b1 & 0x0F) << 2) | (b2.unwrap_or(0) >> 6)) as usize] as char);
        }
        if let Some(b2) = b2 {
            out.push(ALPHABET[(b2 & 0x3F) as usize] as char);
        }
    }
    out
}

impl JsonWriter {
    /// `true` if the caller's event should be written normally; `false` if
    /// the caller must instead drop it (and, for a dropped container,
    /// everything nested in it — tracked by `self.suppress` from here on)
    /// because `max_container_size` capped the enclosing container.
    /// `is_start` tells this call whether the triggering event itself opens
    /// a container (so a later matching `*End` must also be swallowed) or
    /// is already a complete unit on its own (a scalar `Primitive`/`Simple`).
    fn enter_value(&mut self, is_start: bool) -> Result<bool, WriteError> {
        if self.before_value()? {
            return Ok(true);
        }
        let mut units = match self.stack.last() {
            Some(Frame::Object { .. }) => 2,
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

    /// Silently consumes `event` as part of an already-engaged suppression,
    /// counting nested `*Start`/`*End` pairs so a dropped container's
    /// children are dropped too, without ever touching `self.stack`.
    fn on_event_suppressed(&mut self, event: &Event) -> Result<(), WriteError> {
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
        Ok(())
    }
}

impl EventSink<WriteError> for JsonWriter {
    fn on_event(&mut self, event: Event) -> Result<bool, WriteError> {
        if self.suppress.is_some() {
            self.on_event_suppressed(&event)?;
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
            Event::MapStart { .. } => {
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                self.out.push('{');
                self.stack.push(Frame::Object {
                    count: 0,
                    awaiting_value: false,
                });
                Ok(true)
            }
            Event::MapEnd => {
                match self.stack.pop() {
                    Some(Frame::Object { count, .. }) => {
                        if count > 0 {
                            self.indent();
                        }
                        self.out.push('}');
                        self.after_top_level_value();
                        Ok(true)
                    }
                    _ => Err(WriteError::InvalidState("MapEnd without matching MapStart".into())),
                }
            }
            Event::ListStart { .. } => {
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                self.out.push('[');
                self.stack.push(Frame::Array { count: 0 });
                Ok(true)
            }
            Event::ListEnd => match self.stack.pop() {
                Some(Frame::Array { count }) => {
                    if count > 0 {
                        self.indent();
                    }
                    self.out.push(']');
                    self.after_top_level_value();
                    Ok(true)
                }
                _ => Err(WriteError::InvalidState("ListEnd without matching ListStart".into())),
            },
            Event::StringStart { .. } => {
                if self.in_chunked_string {
                    return Err(WriteError::InvalidState("nested StringStart".into()));
                }
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                self.out.push('"');
                self.in_chunked_string = true;
                Ok(true)
            }
            Event::StringData(chunk) => {
                if !self.in_chunked_string {
                    return Err(WriteError::InvalidState("StringData without StringStart".into()));
                }
                let normalized;
                let chunk = if self.options.nfc {
                    normalized = normalize_nfc(&chunk);
                    normalized.as_str()
                } else {
                    chunk.as_str()
                };
                for c in chunk.chars() {
                    match c {
                        '"' => self.out.push_str("\\\""),
                        '\\' => self.out.push_str("\\\\"),
                        '\n' => self.out.push_str("\\n"),
                        '\r' => self.out.push_str("\\r"),
                        '\t' => self.out.push_str("\\t"),
                        c if (c as u32) < 0x20 => {
                            self.out.push_str(&alloc::format!("\\u{:04x}", c as u32));
                        }
                        c => self.out.push(c),
                    }
                }
                Ok(true)
            }
            Event::StringEnd => {
                if !self.in_chunked_string {
                    return Err(WriteError::InvalidState("StringEnd without StringStart".into()));
                }
                self.out.push('"');
                self.in_chunked_string = false;
                self.after_top_level_value();
                Ok(true)
            }
            Event::BufferStart { .. } => {
                if self.in_chunked_buffer {
                    return Err(WriteError::InvalidState("nested BufferStart".into()));
                }
                if !self.enter_value(true)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                self.out.push('"');
                self.in_chunked_buffer = true;
                Ok(true)
            }
            Event::BufferData(bytes) => {
                if !self.in_chunked_buffer {
                    return Err(WriteError::InvalidState("BufferData without BufferStart".into()));
                }
                self.encode_buffer_chunk(&bytes);
                Ok(true)
            }
            Event::BufferEnd => {
                if !self.in_chunked_buffer {
                    return Err(WriteError::InvalidState("BufferEnd without BufferStart".into()));
                }
                self.out.push('"');
                self.in_chunked_buffer = false;
                self.after_top_level_value();
                Ok(true)
            }
            Event::Primitive(p) => {
                let is_key = matches!(self.stack.last(), Some(Frame::Object { awaiting_value: false, .. }));
                let key_text = if is_key && !matches!(p, Primitive::String(_)) {
                    if !self.options.demote_non_string_keys {
                        return Err(WriteError::InvalidState(
                            "non-string map key requires demote_non_string_keys".into(),
                        ));
                    }
                    match key_text_for_primitive(&p) {
                        Some(text) => Some(text),
                        None => {
                            return Err(WriteError::InvalidState(
                                "map key primitive has no textual demotion".into(),
                            ));
                        }
                    }
                } else {
                    None
                };
                if !self.enter_value(false)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                match key_text {
                    Some(text) => self.write_escaped_str(&text),
                    None => self.write_primitive(&p),
                }
                self.after_top_level_value();
                Ok(true)
            }
            Event::Simple(code) => {
                if !self.enter_value(false)? {
                    return Ok(true);
                }
                self.write_tag_prefix();
                self.out.push_str(&alloc::format!("null/*simple({code})*/"));
                self.after_top_level_value();
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(events: Vec<Event>, options: JsonWriterOptions) -> String {
        let mut w = JsonWriter::new(options);
        for e in events {
            w.on_event(e).unwrap();
        }
        w.finish()
    }

    #[test]
    fn writes_scalar() {
        assert_eq!(
            write(alloc::vec![Event::Primitive(Primitive::Int(42))], JsonWriterOptions::default()),
            "42"
        );
    }

    #[test]
    fn writes_nested_object_and_array() {
        let events = alloc::vec![
            Event::MapStart { size: None },
            Event::Primitive(Primitive::String("a".into())),
            Event::ListStart { size: None },
            Event::Primitive(Primitive::Int(1)),
            Event::Primitive(Primitive::Int(2)),
            Event::ListEnd,
            Event::MapEnd,
        ];
        assert_eq!(write(events, JsonWriterOptions::default()), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn rejects_non_string_key_by_default() {
        let events = alloc::vec![
            Event::MapStart { size: Some(1) },
            Event::Primitive(Primitive::Int(1)),
            Event::Primitive(Primitive::String("a".into())),
            Event::MapEnd,
        ];
        let mut w = JsonWriter::new(JsonWriterOptions::default());
        let mut failed = false;
        for e in events {
            if w.on_event(e).is_err() {
                failed = true;
                break;
            }
        }
        assert!(failed, "an integer map key is not valid JSON without demotion");
    }

    #[test]
    fn demotes_non_string_keys_when_configured() {
        let events = alloc::vec![
            Event::MapStart { size: Some(3) },
            Event::Primitive(Primitive::Int(1)),
            Event::Primitive(Primitive::String("a".into())),
            Event::Primitive(Primitive::Bool(true)),
            Event::Primitive(Primitive::String("b".into())),
            Event::Primitive(Primitive::Null),
            Event::Primitive(Primitive::String("c".into())),
            Event::MapEnd,
        ];
        let options = JsonWriterOptions {
            demote_non_string_keys: true,
            ..Default::default()
        };
        assert_eq!(write(events, options), r#"{"1":"a","true":"b","null":"c"}"#);
    }

    #[test]
    fn demotion_still_rejects_float_keys_with_no_textual_form() {
        let events = alloc::vec![
            Event::MapStart { size: Some(1) },
            Event::Primitive(Primitive::Float(1.5)),
            Event::Primitive(Primitive::String("a".into())),
            Event::MapEnd,
        ];
        let options = JsonWriterOptions {
            demote_non_string_keys: true,
            ..Default::default()
        };
        let mut w = JsonWriter::new(options);
        assert!(w.on_event(events[0].clone()).is_ok());
        assert!(w.on_event(events[1].clone()).is_err());
    }

    #[test]
    fn non_string_key_rejection_leaves_writer_state_unchanged() {
        let mut w = JsonWriter::new(JsonWriterOptions::default());
        w.on_event(Event::MapStart { size: Some(1) }).unwrap();
        assert!(w.on_event(Event::Primitive(Primitive::Int(1))).is_err());
        // The key was refused before anything was written for it; a
        // corrected string key still completes the same map entry.
        w.on_event(Event::Primitive(Primitive::String("k".into()))).unwrap();
        w.on_event(Event::Primitive(Primitive::Int(5))).unwrap();
        w.on_event(Event::MapEnd).unwrap();
        assert_eq!(w.finish(), r#"{"k":5}"#);
    }

    #[test]
    fn escapes_control_characters_and_quotes() {
        let events = alloc::vec![Event::Primitive(Primitive::String("a\"\n\tb".into()))];
        assert_eq!(write(events, JsonWriterOptions::default()), r#""a\"\n\tb""#);
    }

    #[test]
    fn rejects_unbalanced_end_event() {
        let mut w = JsonWriter::new(JsonWriterOptions::default());
        assert!(w.on_event(Event::MapEnd).is_err());
    }

    #[test]
    fn renders_nan_as_null_unless_allow_nan() {
        let events = alloc::vec![Event::Primitive(Primitive::Float(f64::NAN))];
        assert_eq!(write(events.clone(), JsonWriterOptions::default()), "null");
        let options = JsonWriterOptions {
            allow_nan: true,
            ..Default::default()
        };
        assert_eq!(write(events, options), "NaN");
    }

    #[test]
    fn chunked_string_round_trips_through_writer() {
        let events = alloc::vec![
            Event::StringStart { byte_len: None },
            Event::StringData("ab".into()),
            Event::StringData("cd".into()),
            Event::StringEnd,
        ];
        assert_eq!(write(events, JsonWriterOptions::default()), "\"abcd\"");
    }

    #[test]
    fn pretty_prints_with_indent() {
        let events = alloc::vec![
            Event::MapStart { size: None },
            Event::Primitive(Primitive::String("a".into())),
            Event::Primitive(Primitive::Int(1)),
            Event::MapEnd,
        ];
        let options = JsonWriterOptions {
            indent: 2,
            ..Default::default()
        };
        assert_eq!(write(events, options), "{\n  \"a\":1\n}");
    }

    #[test]
    fn max_container_size_truncates_array_elements() {
        let events = alloc::vec![
            Event::ListStart { size: None },
            Event::Primitive(Primitive::Int(1)),
            Event::Primitive(Primitive::Int(2)),
            Event::Primitive(Primitive::Int(3)),
            Event::ListEnd,
        ];
        let options = JsonWriterOptions {
            max_container_size: Some(2),
            ..Default::default()
        };
        assert_eq!(write(events, options), "[1,2]");
    }

    #[test]
    fn max_container_size_drops_whole_nested_value() {
        let events = alloc::vec![
            Event::ListStart { size: None },
            Event::Primitive(Primitive::Int(1)),
            Event::ListStart { size: None },
            Event::Primitive(Primitive::Int(99)),
            Event::ListEnd,
            Event::Primitive(Primitive::Int(3)),
            Event::ListEnd,
        ];
        let options = JsonWriterOptions {
            max_container_size: Some(1),
            ..Default::default()
        };
        assert_eq!(write(events, options), "[1]");
    }

    #[test]
    fn max_container_size_drops_key_and_value_together() {
        let events = alloc::vec![
            Event::MapStart { size: None },
            Event::Primitive(Primitive::String("a".into())),
            Event::Primitive(Primitive::Int(1)),
            Event::Primitive(Primitive::String("b".into())),
            Event::Primitive(Primitive::Int(2)),
            Event::MapEnd,
        ];
        let options = JsonWriterOptions {
            max_container_size: Some(1),
            ..Default::default()
        };
        assert_eq!(write(events, options), r#"{"a":1}"#);
    }
}

//! `CharSource`: a `ByteSource` composed with an incremental Unicode decoder
//! (`spec.md` §3.3, §6.2, §9: "`CharSource = Utf8Decoder<ByteSource>`").

use crate::error::{Error, Position};
use crate::source::byte_source::ByteSource;

/// A pull-based, resumable stream of Unicode scalar values.
pub trait CharSource {
    /// Whether at least one more char can be produced without more input.
    fn available(&self) -> bool;

    /// Whether no further input will ever be fed.
    fn is_final(&self) -> bool;

    /// Decodes and consumes the next char. `Ok(None)` means "no char
    /// available yet" (partial mode, suspended mid-sequence); it is not an
    /// error and not end-of-stream (check `is_final() && !available()` for
    /// that).
    fn next_char(&mut self) -> Result<Option<char>, Error>;

    /// Decodes the next char without consuming it.
    fn peek_char(&mut self) -> Result<Option<char>, Error>;

    /// The current source position, for error diagnostics.
    fn position(&self) -> Position;
}

/// The charset an input stream was sniffed (or declared) to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Utf16Be,
    Utf16Le,
}

/// Sniffs a charset from up to the first 3 bytes of input, per `spec.md`
/// §6.2. Returns the charset and the number of leading BOM bytes to discard.
#[must_use]
pub fn sniff_charset(probe: &[u8]) -> (Charset, usize) {
    if probe.len() >= 3 && probe[0] == 0xEF && probe[1] == 0xBB && probe[2] == 0xBF {
        return (Charset::Utf8, 3);
    }
    if probe.len() >= 2 && probe[0] == 0xFE && probe[1] == 0xFF {
        return (Charset::Utf16Be, 2);
    }
    if probe.len() >= 2 && probe[0] == 0xFF && probe[1] == 0xFE {
        return (Charset::Utf16Le, 2);
    }
    if probe.len() >= 2 && probe[0] == 0 && probe[1].is_ascii_graphic() {
        return (Charset::Utf16Be, 0);
    }
    if probe.len() >= 2 && probe[1] == 0 && probe[0].is_ascii_graphic() {
        return (Charset::Utf16Le, 0);
    }
    (Charset::Utf8, 0)
}

/// How to react to malformed/unmappable bytes in a chunked decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodingErrorAction {
    /// Substitute U+FFFD and continue (`spec.md` §7: "Replacement
    /// coding-error-actions never raise").
    #[default]
    Replace,
    /// Raise [`Error::InvalidUtf8`].
    Report,
    /// Drop the offending byte(s) silently.
    Ignore,
}

/// A [`CharSource`] that decodes a [`ByteSource`] using the charset sniffed
/// (or declared) per `spec.md` §6.2, tracking line/column when configured.
pub struct Utf8CharSource<B> {
    bytes: B,
    charset: Option<Charset>,
    declared: Option<Charset>,
    track_context: bool,
    on_error: CodingErrorAction,
    line: usize,
    column: usize,
}

impl<B: ByteSource> Utf8CharSource<B> {
    #[must_use]
    pub fn new(bytes: B) -> Self {
        Self {
            bytes,
            charset: None,
            declared: None,
            track_context: false,
            on_error: CodingErrorAction::default(),
            line: 0,
            column: 0,
        }
    }

    #[must_use]
    pub fn with_context_tracking(mut self, enabled: bool) -> Self {
        self.track_context = enabled;
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.declared = Some(charset);
        self
    }

    #[must_use]
    pub fn with_coding_error_action(mut self, action: CodingErrorAction) -> Self {
        self.on_error = action;
        self
    }

    #[must_use]
    pub fn into_inner(self) -> B {
        self.bytes
    }

    pub fn inner(&self) -> &B {
        &self.bytes
    }

    /// Ensures the charset has been determined, consuming a BOM if present.
    /// Returns `false` if there isn't yet enough input to sniff and the
    /// source is not final (caller should suspend).
    fn ensure_charset(&mut self) -> bool {
        if self.charset.is_some() {
            return true;
        }
        if let Some(declared) = self.declared {
            self.charset = Some(declared);
            return true;
        }
        if self.bytes.available() < 3 && !self.bytes.is_final() {
            return false;
        }
        let probe_len = self.bytes.available().min(3);
        let probe: [u8; 3] = {
            let mut buf = [0u8; 3];
            if let Some(slice) = self.bytes.peek_slice(probe_len) {
                buf[..slice.len()].copy_from_slice(slice);
            }
            buf
        };
        let (charset, bom_len) = sniff_charset(&probe[..probe_len]);
        self.bytes.advance(bom_len);
        self.charset = Some(charset);
        true
    }

    fn bump_position(&mut self, c: char) {
        if !self.track_context {
            return;
        }
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    fn decode_utf8(&mut self, peek_only: bool) -> Result<Option<char>, Error> {
        let Some(&lead) = self.bytes.peek_slice(1).and_then(|s| s.first()) else {
            return Ok(None);
        };
        let expected_len = utf8_sequence_len(lead);
        let Some(expected_len) = expected_len else {
            return self.handle_invalid_byte(1, peek_only);
        };
        if self.bytes.available() < expected_len {
            if self.bytes.is_final() {
                return self.handle_invalid_byte(self.bytes.available().max(1), peek_only);
            }
            return Ok(None);
        }
        let bytes = self
            .bytes
            .peek_slice(expected_len)
            .expect("checked available above");
        match core::str::from_utf8(bytes) {
            Ok(s) => {
                let c = s.chars().next().expect("non-empty decode");
                if !peek_only {
                    self.bytes.advance(expected_len);
                    self.bump_position(c);
                }
                Ok(Some(c))
            }
            Err(_) => self.handle_invalid_byte(expected_len, peek_only),
        }
    }

    fn handle_invalid_byte(&mut self, len: usize, peek_only: bool) -> Result<Option<char>, Error> {
        match self.on_error {
            CodingErrorAction::Report => Err(Error::InvalidUtf8 {
                pos: self.position(),
            }),
            CodingErrorAction::Replace => {
                if !peek_only {
                    self.bytes.advance(len);
                    self.bump_position('\u{FFFD}');
                }
                Ok(Some('\u{FFFD}'))
            }
            CodingErrorAction::Ignore => {
                if !peek_only {
                    self.bytes.advance(len);
                }
                // Ignoring means this call produces nothing; try the next
                // byte so callers see forward progress rather than a stall.
                if peek_only {
                    Ok(None)
                } else {
                    self.decode_utf8(peek_only)
                }
            }
        }
    }

    fn decode_utf16(&mut self, big_endian: bool, peek_only: bool) -> Result<Option<char>, Error> {
        if self.bytes.available() < 2 {
            return if self.bytes.is_final() {
                Err(Error::UnexpectedEof {
                    pos: self.position(),
                })
            } else {
                Ok(None)
            };
        }
        let pair = self.bytes.peek_slice(2).expect("checked available");
        let unit = if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        };

        if (0xD800..=0xDBFF).contains(&unit) {
            // High surrogate: need a low surrogate to follow.
            if self.bytes.available() < 4 {
                return if self.bytes.is_final() {
                    Err(Error::UnexpectedEof {
                        pos: self.position(),
                    })
                } else {
                    Ok(None)
                };
            }
            let quad = self.bytes.peek_slice(4).expect("checked available");
            let low = if big_endian {
                u16::from_be_bytes([quad[2], quad[3]])
            } else {
                u16::from_le_bytes([quad[2], quad[3]])
            };
            if !(0xDC00..=0xDFFF).contains(&low) {
                return self.handle_invalid_byte(2, peek_only);
            }
            let c = decode_surrogate_pair(unit, low);
            if !peek_only {
                self.bytes.advance(4);
                if let Some(c) = c {
                    self.bump_position(c);
                }
            }
            return match c {
                Some(c) => Ok(Some(c)),
                None => self.handle_invalid_byte(4, peek_only),
            };
        }
        if (0xDC00..=0xDFFF).contains(&unit) {
            // Lone low surrogate.
            return self.handle_invalid_byte(2, peek_only);
        }
        let c = char::from_u32(u32::from(unit));
        if !peek_only {
            self.bytes.advance(2);
            if let Some(c) = c {
                self.bump_position(c);
            }
        }
        match c {
            Some(c) => Ok(Some(c)),
            None => self.handle_invalid_byte(2, peek_only),
        }
    }

    fn decode(&mut self, peek_only: bool) -> Result<Option<char>, Error> {
        if !self.ensure_charset() {
            return Ok(None);
        }
        match self.charset.expect("ensured above") {
            Charset::Utf8 => self.decode_utf8(peek_only),
            Charset::Utf16Be => self.decode_utf16(true, peek_only),
            Charset::Utf16Le => self.decode_utf16(false, peek_only),
        }
    }
}

fn decode_surrogate_pair(high: u16, low: u16) -> Option<char> {
    let c = 0x10000u32 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    char::from_u32(c)
}

/// Length of the UTF-8 sequence starting with `lead`, or `None` if `lead` is
/// never a valid leading byte.
#[must_use]
fn utf8_sequence_len(lead: u8) -> Option<usize> {
    if lead & 0x80 == 0 {
        Some(1)
    } else if lead & 0xE0 == 0xC0 {
        Some(2)
    } else if lead & 0xF0 == 0xE0 {
        Some(3)
    } else if lead & 0xF8 == 0xF0 {
        Some(4)
    } else {
        None
    }
}

impl<B: ByteSource> CharSource for Utf8CharSource<B> {
    fn available(&self) -> bool {
        self.bytes.available() > 0
    }

    fn is_final(&self) -> bool {
        self.bytes.is_final()
    }

    fn next_char(&mut self) -> Result<Option<char>, Error> {
        self.decode(false)
    }

    fn peek_char(&mut self) -> Result<Option<char>, Error> {
        self.decode(true)
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            byte_offset: self.bytes.byte_number(),
        }
    }
}

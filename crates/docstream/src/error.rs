//! The error taxonomy shared by every reader, writer, and builder.
//!
//! All three readers raise the same [`Error`] enum (the wire formats differ,
//! the failure modes do not); writers and the builder narrow it further with
//! [`WriteError`] and [`BuildError`].

use alloc::string::String;

/// A source position, attached to [`Error::Syntax`] and [`Error::UnexpectedEof`]
/// when the originating [`CharSource`](crate::source::CharSource) tracks it.
///
/// Byte readers (CBOR, Msgpack) only ever populate `byte_offset`; `line` and
/// `column` stay at `0` since those formats have no textual notion of either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub byte_offset: u64,
}

impl Position {
    #[must_use]
    pub fn at_offset(byte_offset: u64) -> Self {
        Self {
            line: 0,
            column: 0,
            byte_offset,
        }
    }
}

/// Errors raised by [`JsonReader`](crate::json::JsonReader),
/// [`CborReader`](crate::cbor::CborReader), and
/// [`MsgpackReader`](crate::msgpack::MsgpackReader).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Malformed text or binary input.
    #[error("syntax error at {pos:?}: {msg}")]
    Syntax { pos: Position, msg: String },

    /// The input was marked final but ended mid-token or mid-container.
    #[error("unexpected end of input at {pos:?}")]
    UnexpectedEof { pos: Position },

    /// A chunked UTF-8 decoder encountered malformed or unmappable bytes and
    /// the configured coding-error action is `report` rather than `replace`.
    #[error("invalid UTF-8 at byte {pos:?}")]
    InvalidUtf8 { pos: Position },

    /// A declared length exceeded the platform's representable range.
    #[error("length overflow at {pos:?}")]
    Overflow { pos: Position },

    /// Nesting exceeded the configured `depth_limit`.
    #[error("nesting depth limit exceeded at {pos:?}")]
    DepthLimit { pos: Position },

    /// A strict map reader observed a repeated key.
    #[error("duplicate map key {key:?} at {pos:?}")]
    DuplicateKey { pos: Position, key: String },

    /// A byte sequence that is not valid in the wire format at all (e.g. the
    /// CBOR reserved prefix `0xC1`).
    #[error("invalid prefix byte 0x{byte:02X} at {pos:?}")]
    InvalidPrefix { pos: Position, byte: u8 },

    /// The input ended before a declared number of bytes/elements were read.
    #[error("input truncated at {pos:?}: expected {expected} more bytes")]
    Truncated { pos: Position, expected: u64 },
}

impl Error {
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            Error::Syntax { pos, .. }
            | Error::UnexpectedEof { pos }
            | Error::InvalidUtf8 { pos }
            | Error::Overflow { pos }
            | Error::DepthLimit { pos }
            | Error::DuplicateKey { pos, .. }
            | Error::InvalidPrefix { pos, .. }
            | Error::Truncated { pos, .. } => *pos,
        }
    }
}

/// Errors raised by a writer when it receives an event that is illegal in its
/// current frame (e.g. `MapEnd` with an odd element count so far, `StringData`
/// with no open `StringStart`, or a `Tag` immediately followed by another
/// `Tag`-illegal event).
///
/// Per `spec.md` §7, a writer refuses the event and leaves its internal state
/// unchanged, so callers may recover (e.g. by dropping the offending event and
/// retrying with a corrected one).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error("invalid writer state: {0}")]
    InvalidState(String),

    #[error("underlying sink failed: {0}")]
    Sink(String),
}

/// Errors raised by [`Builder::build`](crate::builder::Builder::build).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("unterminated string")]
    UnterminatedString,

    #[error("unterminated buffer")]
    UnterminatedBuffer,

    #[error("unterminated array")]
    UnterminatedArray,

    #[error("unterminated object")]
    UnterminatedObject,

    #[error("input is empty")]
    EmptyInput,

    #[error("a tag was already pending when another tag event arrived")]
    DoublePendingTag,

    #[error("duplicate map key {0:?}")]
    DuplicateKey(String),

    #[error("event illegal in current builder state: {0}")]
    InvalidState(String),
}

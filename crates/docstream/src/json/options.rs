#![allow(clippy::struct_excessive_bools)]

/// Dialect options for [`JsonReader`](super::reader::JsonReader).
///
/// All options default to `false`/`None`, matching RFC 8259 strictly; the
/// teacher crate's `ParserOptions` uses the same all-`false`-by-default
/// convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReaderOptions {
    /// Accept object keys that are bare identifiers rather than quoted
    /// strings (e.g. `{foo: 1}`).
    ///
    /// # Default
    /// `false`
    pub allow_unquoted_keys: bool,

    /// Accept a trailing comma before `]`/`}`.
    ///
    /// # Default
    /// `false`
    pub allow_trailing_comma: bool,

    /// Accept `//` line comments and `/* */` block comments anywhere
    /// whitespace is permitted.
    ///
    /// # Default
    /// `false`
    pub allow_comments: bool,

    /// Accept hexadecimal integer literals (`0x[0-9A-Fa-f]+`) when reading
    /// diagnostic input.
    ///
    /// # Default
    /// `false`
    pub allow_hex_integers: bool,

    /// Accept `NaN`, `Infinity`, and `-Infinity` as number literals.
    ///
    /// # Default
    /// `false`
    pub allow_nan: bool,

    /// Real numbers that do not round-trip through binary64 (more than 15
    /// significant digits, or an exponent outside ±308) surface as
    /// [`Primitive::Decimal`](crate::event::Primitive::Decimal) instead of
    /// [`Primitive::Float`](crate::event::Primitive::Float).
    ///
    /// # Default
    /// `false`
    pub big_decimal: bool,

    /// Normalize string payloads to Unicode Normalization Form C.
    ///
    /// # Default
    /// `false`
    pub nfc: bool,

    /// Strings longer than this many UTF-8 bytes are emitted as chunked
    /// `StringStart`/`StringData`/`StringEnd` rather than as a single
    /// `Primitive::String`. `None` disables chunking entirely (always
    /// buffer whole strings).
    ///
    /// # Default
    /// `None`
    pub fast_string_length: Option<usize>,

    /// Track line/column position for error diagnostics.
    ///
    /// # Default
    /// `false`
    pub context: bool,

    /// Maximum container nesting depth before [`Error::DepthLimit`] is
    /// raised. `None` means unbounded.
    ///
    /// # Default
    /// `None`
    pub depth_limit: Option<u32>,

    /// Parse multiple whitespace- or comma-delimited top-level JSON values
    /// from a single stream (JSON Lines / ND-JSON).
    ///
    /// # Default
    /// `false`
    pub allow_multiple_values: bool,
}

/// How a [`JsonWriter`](super::writer::JsonWriter) encodes `BufferStart`/
/// `BufferData`/`BufferEnd` events and renders tags in CBOR-diagnostic mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CborDiag {
    /// Plain JSON: buffers are base64url-encoded, tags are absorbed
    /// silently.
    #[default]
    Off,
    Hex,
    HexUpper,
    Base64,
    Base64Pad,
    Base64Std,
    Base64StdPad,
}

/// Options for [`JsonWriter`](super::writer::JsonWriter).
#[derive(Debug, Clone, Copy)]
pub struct JsonWriterOptions {
    /// Sort each map's entries lexicographically by rendered key text
    /// before writing.
    ///
    /// # Default
    /// `false`
    pub sorted: bool,

    /// Number of spaces per indent level. `0` means compact output (no
    /// insignificant whitespace at all).
    ///
    /// # Default
    /// `0`
    pub indent: u32,

    /// Insert a space after `:` in object entries.
    ///
    /// # Default
    /// `false`
    pub space_after_colon: bool,

    /// Insert a space after `,` between siblings. Ignored when pretty
    /// printing (the newline already separates siblings).
    ///
    /// # Default
    /// `false`
    pub space_after_comma: bool,

    /// Maximum elements written per array/object before truncation (the
    /// remainder is simply omitted). `None` means unbounded.
    ///
    /// # Default
    /// `None`
    pub max_container_size: Option<usize>,

    /// Maximum UTF-8 bytes written per string before truncating and
    /// appending `…`. `None` means unbounded.
    ///
    /// # Default
    /// `None`
    pub max_string_length: Option<usize>,

    /// Render `NaN`/`+Infinity`/`-Infinity` as the bare literals
    /// `NaN`/`Infinity`/`-Infinity` instead of `null`.
    ///
    /// # Default
    /// `false`
    pub allow_nan: bool,

    /// How to render buffers (and, if not `Off`, tags).
    ///
    /// # Default
    /// `CborDiag::Off`
    pub cbor_diag: CborDiag,

    /// Normalize string payloads to Unicode Normalization Form C before
    /// writing.
    ///
    /// # Default
    /// `false`
    pub nfc: bool,

    /// JSON object keys must be strings; a CBOR/Msgpack-sourced map with an
    /// integer, boolean, or null key has no direct JSON rendering. When
    /// `true`, such a key is demoted to its textual form (`1` becomes `"1"`,
    /// `true` becomes `"true"`, `null` becomes `"null"`) instead of producing
    /// invalid unquoted JSON. When `false` (the default), a non-string key
    /// is rejected with `WriteError::InvalidState`.
    ///
    /// # Default
    /// `false`
    pub demote_non_string_keys: bool,
}

impl Default for JsonWriterOptions {
    fn default() -> Self {
        Self {
            sorted: false,
            indent: 0,
            space_after_colon: false,
            space_after_comma: false,
            max_container_size: None,
            max_string_length: None,
            allow_nan: false,
            cbor_diag: CborDiag::default(),
            nfc: false,
            demote_non_string_keys: false,
        }
    }
}

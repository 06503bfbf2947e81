use crate::source::CodingErrorAction;

/// Dialect options for [`MsgpackReader`](super::reader::MsgpackReader).
#[derive(Debug, Clone, Copy)]
pub struct MsgpackReaderOptions {
    /// Maximum container/ext nesting depth before [`Error::DepthLimit`]
    /// (`crate::error::Error::DepthLimit`). `None` means unbounded.
    ///
    /// # Default
    /// `None`
    pub depth_limit: Option<u32>,

    /// Reject a repeated key within the same map (`Error::DuplicateKey`).
    /// Same strictness rationale as [`CborReaderOptions`](crate::cbor::CborReaderOptions);
    /// see `DESIGN.md`.
    ///
    /// # Default
    /// `true`
    pub fail_on_duplicate_keys: bool,

    /// How to handle malformed UTF-8 inside a `str` value.
    ///
    /// # Default
    /// `CodingErrorAction::Replace`
    pub on_invalid_utf8: CodingErrorAction,
}

impl Default for MsgpackReaderOptions {
    fn default() -> Self {
        Self {
            depth_limit: None,
            fail_on_duplicate_keys: true,
            on_invalid_utf8: CodingErrorAction::default(),
        }
    }
}

/// Options for [`MsgpackWriter`](super::writer::MsgpackWriter).
#[derive(Debug, Clone, Copy)]
pub struct MsgpackWriterOptions {
    /// Sort each map's entries by the byte order of their encoded key before
    /// writing, buffering the frame's serialized entries in memory until
    /// `MapEnd`.
    ///
    /// # Default
    /// `false`
    pub sorted: bool,

    /// Maximum elements written per array/map before truncation. `None`
    /// means unbounded.
    ///
    /// # Default
    /// `None`
    pub max_container_size: Option<usize>,

    /// Maximum UTF-8 bytes written per string before truncation. `None`
    /// means unbounded.
    ///
    /// # Default
    /// `None`
    pub max_string_length: Option<usize>,
}

impl Default for MsgpackWriterOptions {
    fn default() -> Self {
        Self {
            sorted: false,
            max_container_size: None,
            max_string_length: None,
        }
    }
}

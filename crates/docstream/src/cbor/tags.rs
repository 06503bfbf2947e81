//! CBOR tag number constants (RFC 8949 §3.4 and the IANA "CBOR Tags"
//! registry), grounded on `tps_minicbor`'s constants-table style for
//! major-type/tag dispatch.

/// RFC 8949 §3.4.2: standard date/time string (RFC 3339).
pub const TAG_DATETIME: u64 = 0;
/// RFC 8949 §3.4.2: epoch-based date/time (seconds since 1970-01-01).
pub const TAG_EPOCH_DATETIME: u64 = 1;
/// RFC 8949 §3.4.3: unsigned bignum, byte string holds a big-endian magnitude.
pub const TAG_POSITIVE_BIGNUM: u64 = 2;
/// RFC 8949 §3.4.3: negative bignum; value = `-1 - n` where `n` is the
/// unsigned integer the enclosed byte string encodes.
pub const TAG_NEGATIVE_BIGNUM: u64 = 3;
/// RFC 8949 §3.4.4: decimal fraction, a two-element array `[exponent, mantissa]`.
pub const TAG_DECIMAL_FRACTION: u64 = 4;
/// RFC 8949 §3.4.4: bigfloat, a two-element array `[exponent, mantissa]` with
/// a base-2 exponent rather than base-10.
pub const TAG_BIGFLOAT: u64 = 5;
/// RFC 8949 §3.4.5.1/.2/.3: expected later conversion to base64url / base64 /
/// base16 text.
pub const TAG_EXPECTED_BASE64URL: u64 = 21;
pub const TAG_EXPECTED_BASE64: u64 = 22;
pub const TAG_EXPECTED_BASE16: u64 = 23;
/// RFC 8949 §3.4.5.1: byte string holding an encoded CBOR data item.
pub const TAG_ENCODED_CBOR: u64 = 24;
/// RFC 8949 §3.4.5.3: a URI text string.
pub const TAG_URI: u64 = 32;
/// RFC 8949 §3.4.6: self-describe CBOR.
pub const TAG_SELF_DESCRIBE_CBOR: u64 = 55799;
/// Non-standard: big decimal whose exponent is base-10, used by the existing
/// corpus this workspace targets interop with instead of RFC 8949 tag 4.
pub const TAG_BIGDECIMAL10: u64 = 1363;

/// Whether `tag` is one this crate assigns a documented meaning to.
/// `CborReaderOptions::strict_tags` rejects anything else.
#[must_use]
pub fn is_known_tag(tag: u64) -> bool {
    matches!(
        tag,
        TAG_DATETIME
            | TAG_EPOCH_DATETIME
            | TAG_POSITIVE_BIGNUM
            | TAG_NEGATIVE_BIGNUM
            | TAG_DECIMAL_FRACTION
            | TAG_BIGFLOAT
            | TAG_EXPECTED_BASE64URL
            | TAG_EXPECTED_BASE64
            | TAG_EXPECTED_BASE16
            | TAG_ENCODED_CBOR
            | TAG_URI
            | TAG_SELF_DESCRIBE_CBOR
            | TAG_BIGDECIMAL10
    )
}

//! A deliberately small Unicode Normalization Form C helper.
//!
//! Full canonical composition requires the Unicode Character Database's
//! decomposition/combining-class tables, which this crate does not vendor.
//! This composes the common case exercised by the `nfc` dialect option in
//! practice: a base Latin letter immediately followed by one of the
//! combining diacritics RFC 8259-adjacent JSON corpora actually contain.
//! Anything else passes through unchanged, which is always a safe (if
//! incomplete) normalization.

use alloc::string::String;

/// Composes `base + combining mark` pairs this crate recognizes; leaves
/// everything else (including already-composed or unrecognized sequences)
/// untouched.
#[must_use]
pub fn normalize_nfc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(&next) = chars.peek() {
            if let Some(composed) = compose(c, next) {
                out.push(composed);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn compose(base: char, mark: char) -> Option<char> {
    let table: &[(char, char, char)] = &[
        ('a', '\u{0301}', 'á'),
        ('a', '\u{0300}', 'à'),
        ('a', '\u{0302}', 'â'),
        ('a', '\u{0303}', 'ã'),
        ('a', '\u{0308}', 'ä'),
        ('e', '\u{0301}', 'é'),
        ('e', '\u{0300}', 'è'),
        ('e', '\u{0302}', 'ê'),
        ('e', '\u{0308}', 'ë'),
        ('i', '\u{0301}', 'í'),
        ('i', '\u{0308}', 'ï'),
        ('o', '\u{0301}', 'ó'),
        ('o', '\u{0303}', 'õ'),
        ('o', '\u{0308}', 'ö'),
        ('u', '\u{0301}', 'ú'),
        ('u', '\u{0308}', 'ü'),
        ('n', '\u{0303}', 'ñ'),
        ('c', '\u{0327}', 'ç'),
    ];
    table
        .iter()
        .find(|(b, m, _)| *b == base && *m == mark)
        .map(|(_, _, composed)| *composed)
}

//! The minimal document tree exchanged between the [`Builder`](crate::builder)
//! and the [`Emitter`](crate::emitter).
//!
//! Per `spec.md` §3.2 this tree's own addressing/diff/patch/path-evaluation
//! API is an out-of-scope external collaborator's concern; this module only
//! defines the shape the builder produces and the emitter consumes.
#![allow(clippy::inline_always)]

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::cmp::Ordering;

/// An arbitrary-precision signed integer: a sign and a big-endian magnitude.
///
/// Used for JSON integer literals and CBOR/Msgpack integers that overflow a
/// 64-bit lane (CBOR tag 2/3, JSON numbers longer than `i64`/`u64`).
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigInt {
    pub negative: bool,
    /// Big-endian magnitude, no leading zero bytes (except the single value
    /// `[0]` which represents zero and is always non-negative).
    pub magnitude: Vec<u8>,
}

impl BigInt {
    #[must_use]
    pub fn from_u64(v: u64) -> Self {
        if v == 0 {
            return Self {
                negative: false,
                magnitude: alloc::vec![0],
            };
        }
        let bytes = v.to_be_bytes();
        let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(7);
        Self {
            negative: false,
            magnitude: bytes[first_nonzero..].to_vec(),
        }
    }

    #[must_use]
    pub fn from_i64(v: i64) -> Self {
        if v >= 0 {
            return Self::from_u64(v as u64);
        }
        let mut b = Self::from_u64((v as i128).unsigned_abs() as u64);
        b.negative = true;
        b
    }

    /// Returns the value as an `i64` when it fits, else `None`.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        if self.magnitude.len() > 8 {
            return None;
        }
        let mut buf = [0u8; 8];
        buf[8 - self.magnitude.len()..].copy_from_slice(&self.magnitude);
        let mag = u64::from_be_bytes(buf);
        if self.negative {
            if mag > i64::MAX as u64 + 1 {
                None
            } else if mag == i64::MAX as u64 + 1 {
                Some(i64::MIN)
            } else {
                Some(-(mag as i64))
            }
        } else if mag > i64::MAX as u64 {
            None
        } else {
            Some(mag as i64)
        }
    }

    /// Renders the decimal digits of this integer, e.g. for JSON number
    /// literals. Uses repeated long division by 10 over the big-endian
    /// magnitude; `O(n^2)` in the byte length, which is fine for the sizes a
    /// codec actually sees (CBOR/JSON integers, not cryptographic bignums).
    #[must_use]
    pub fn to_decimal_string(&self) -> String {
        let mut digits = Vec::new();
        let mut work = self.magnitude.clone();
        // Strip leading zero bytes so an all-zero magnitude divides down to
        // nothing immediately below.
        while work.len() > 1 && work[0] == 0 {
            work.remove(0);
        }
        if work == [0] {
            return "0".to_string();
        }
        while !(work.len() == 1 && work[0] == 0) {
            let mut remainder: u32 = 0;
            for byte in &mut work {
                let acc = (remainder << 8) | u32::from(*byte);
                *byte = (acc / 10) as u8;
                remainder = acc % 10;
            }
            digits.push(b'0' + remainder as u8);
            while work.len() > 1 && work[0] == 0 {
                work.remove(0);
            }
        }
        digits.reverse();
        let mut s = if self.negative {
            String::from("-")
        } else {
            String::new()
        };
        s.push_str(core::str::from_utf8(&digits).expect("ascii digits"));
        s
    }
}

/// An arbitrary-precision decimal number: `mantissa * 10^exponent`.
///
/// Produced by the JSON reader's `big_decimal` option and by CBOR tag 4
/// (RFC 8949 decimal fraction) / tag 1363 (non-standard `decimal10`).
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    pub mantissa: BigInt,
    pub exponent: i64,
}

/// A fully materialized JSON/CBOR/Msgpack value.
///
/// Unlike the teacher crate's JSON-only `Value`, this enum models the union
/// of all three wire formats: arbitrary-precision integers and decimals (CBOR
/// tags 2/3/4/1363; JSON numbers too large for `f64`/`i64`), opaque byte
/// buffers (CBOR/Msgpack byte strings), and `undefined` (Msgpack/CBOR only).
/// A tag, if any, is carried alongside the value rather than as a variant, so
/// matching on `kind` stays exhaustive over the value shapes.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Int(i64),
    BigInt(BigInt),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Buffer(Vec<u8>),
    List(Vec<Tagged>),
    Map(Map),
}

/// A [`Value`] together with the CBOR/Msgpack tag attached to it, if any.
///
/// `spec.md` §3.2 describes the tag as "an optional non-negative 64-bit tag
/// attached to any value"; since every slot in a [`Map`] or list holds one
/// value, the slot type is this pair rather than a bare `Value`.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    pub tag: Option<u64>,
    pub value: Value,
}

impl Tagged {
    #[must_use]
    pub fn plain(value: Value) -> Self {
        Self { tag: None, value }
    }

    #[must_use]
    pub fn tagged(tag: u64, value: Value) -> Self {
        Self {
            tag: Some(tag),
            value,
        }
    }
}

impl From<Value> for Tagged {
    fn from(value: Value) -> Self {
        Tagged::plain(value)
    }
}

/// An insertion-order-preserving map from value-keys to tagged values.
///
/// `spec.md` §3.2 specifies "an ordered map from value-key to value": keys
/// are not restricted to strings (CBOR/Msgpack permit integer, boolean, and
/// other primitive keys), so this cannot be a `BTreeMap<String, _>` the way
/// the teacher's JSON-only `Value::Object` is. Lookups are linear — this
/// crate favors preserving exact wire order and supporting arbitrary key
/// kinds over `O(log n)` lookup, which is the right trade-off for a codec
/// whose keys are rarely queried by the codec itself.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    entries: Vec<(Value, Tagged)>,
}

impl Map {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Tagged> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &Value) -> Option<&mut Tagged> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Inserts `value` under `key`, preserving the original position if the
    /// key already existed (last-write-wins, matching the Open Question
    /// resolution in `DESIGN.md` for everything *except* the builder, which
    /// rejects duplicates outright when asked to).
    pub fn insert(&mut self, key: Value, value: Tagged) -> Option<Tagged> {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(core::mem::replace(&mut slot.1, value))
        } else {
            self.entries.push((key, value));
            None
        }
    }

    pub fn iter(&self) -> core::slice::Iter<'_, (Value, Tagged)> {
        self.entries.iter()
    }

    /// Sorts entries by the lexicographic byte order of their JSON-rendered
    /// key text, matching the writer's `sorted` option (`spec.md` §4.4/§4.5).
    /// Non-string keys sort by their `Display` text, which is the same
    /// fallback the JSON writer uses to render them.
    pub fn sort_by_key_text(&mut self) {
        self.entries
            .sort_by(|(a, _), (b, _)| key_text(a).cmp(&key_text(b)));
    }
}

fn key_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = &'a (Value, Tagged);
    type IntoIter = core::slice::Iter<'a, (Value, Tagged)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(Value, Tagged)> for Map {
    fn from_iter<T: IntoIterator<Item = (Value, Tagged)>>(iter: T) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

// `Value` does not derive `Eq`/`Ord` (it holds `f64`), but map-key equality
// only ever needs `PartialEq`; `Eq` for `BigInt`/`Decimal` is still useful so
// those can be used standalone (e.g. as literal CBOR tag map keys) without a
// float in the mix.
impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (neg, _) => {
                let by_len = self.magnitude.len().cmp(&other.magnitude.len());
                let by_mag = by_len.then_with(|| self.magnitude.cmp(&other.magnitude));
                if neg { by_mag.reverse() } else { by_mag }
            }
        }
    }
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(..))
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(..))
    }

    /// Best-effort textual rendering of a key for the JSON writer's
    /// non-string-key demotion (`spec.md` §3.1: "readers that target
    /// JSON-style maps demote non-string keys to their textual form").
    #[must_use]
    pub fn as_key_text(&self) -> String {
        key_text(self)
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            Value::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Int(n) => write!(f, "{n}"),
            Value::BigInt(b) => f.write_str(&b.to_decimal_string()),
            Value::Float(n) => write!(f, "{n}"),
            Value::Decimal(d) => write!(f, "{}e{}", d.mantissa, d.exponent),
            Value::String(s) => f.write_str(s),
            Value::Buffer(b) => write!(f, "<{} bytes>", b.len()),
            Value::List(_) => f.write_str("[array]"),
            Value::Map(_) => f.write_str("{object}"),
        }
    }
}

impl core::fmt::Display for BigInt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

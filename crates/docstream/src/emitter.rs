//! The [`emit`] function (`spec.md` §4.7): the reverse of the [`Builder`] —
//! a depth-first walk of a [`Tagged`]/[`Value`] tree that replays it as an
//! [`Event`] stream onto any [`EventSink`].
//!
//! No teacher counterpart, same reason as [`crate::builder`]: this is new
//! code in the teacher's idiom, a plain recursive `match` over [`Value`]'s
//! variants mirroring the shape of the builder's own `match` over [`Event`].

use crate::error::WriteError;
use crate::event::{Event, Primitive};
use crate::sink::EventSink;
use crate::value::{Tagged, Value};

/// Emits `tagged` as an event sequence onto `sink`.
///
/// A map key always emits as its natural primitive — whether `sink` accepts
/// that primitive in key position (a JSON target demotes it to text or
/// rejects it per `JsonWriterOptions::demote_non_string_keys`; CBOR/Msgpack
/// accept any primitive key as-is) is entirely `sink`'s own concern.
///
/// # Errors
/// Propagates `sink`'s own `WriteError`s, plus `WriteError::InvalidState` if
/// a map key is itself a `List`/`Map` — `spec.md` §4.7: "non-string map keys
/// (if permitted) emit as their natural primitive", which presupposes a key
/// is always primitive-shaped.
pub fn emit<S: EventSink<WriteError>>(tagged: &Tagged, sink: &mut S) -> Result<(), WriteError> {
    emit_tagged(tagged, sink)
}

fn emit_tagged<S: EventSink<WriteError>>(tagged: &Tagged, sink: &mut S) -> Result<(), WriteError> {
    if let Some(tag) = tagged.tag {
        sink.on_event(Event::Tag(tag))?;
    }
    emit_value(&tagged.value, sink)
}

fn emit_value<S: EventSink<WriteError>>(value: &Value, sink: &mut S) -> Result<(), WriteError> {
    match value {
        Value::Null => {
            sink.on_event(Event::Primitive(Primitive::Null))?;
        }
        Value::Undefined => {
            sink.on_event(Event::Primitive(Primitive::Undefined))?;
        }
        Value::Bool(b) => {
            sink.on_event(Event::Primitive(Primitive::Bool(*b)))?;
        }
        Value::Int(n) => {
            sink.on_event(Event::Primitive(Primitive::Int(*n)))?;
        }
        Value::BigInt(b) => {
            sink.on_event(Event::Primitive(Primitive::BigInt(b.clone())))?;
        }
        Value::Float(f) => {
            sink.on_event(Event::Primitive(Primitive::Float(*f)))?;
        }
        Value::Decimal(d) => {
            sink.on_event(Event::Primitive(Primitive::Decimal(d.clone())))?;
        }
        Value::String(s) => {
            sink.on_event(Event::Primitive(Primitive::String(s.clone())))?;
        }
        Value::Buffer(bytes) => {
            sink.on_event(Event::BufferStart {
                byte_len: Some(bytes.len() as u64),
            })?;
            sink.on_event(Event::BufferData(bytes.clone()))?;
            sink.on_event(Event::BufferEnd)?;
        }
        Value::List(items) => {
            sink.on_event(Event::ListStart {
                size: Some(items.len() as u64),
            })?;
            for item in items {
                emit_tagged(item, sink)?;
            }
            sink.on_event(Event::ListEnd)?;
        }
        Value::Map(map) => {
            sink.on_event(Event::MapStart {
                size: Some(map.len() as u64),
            })?;
            for (key, val) in map {
                emit_key(key, sink)?;
                emit_tagged(val, sink)?;
            }
            sink.on_event(Event::MapEnd)?;
        }
    }
    Ok(())
}

fn emit_key<S: EventSink<WriteError>>(key: &Value, sink: &mut S) -> Result<(), WriteError> {
    match key {
        Value::List(_) | Value::Map(_) => Err(WriteError::InvalidState(
            "a map key must be a primitive value, not a list or map".into(),
        )),
        other => emit_value(other, sink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbor::{CborWriter, CborWriterOptions};
    use crate::json::{JsonWriter, JsonWriterOptions};
    use crate::value::Map;

    #[test]
    fn emits_scalar_to_json() {
        let tagged = Tagged::plain(Value::Int(5));
        let mut w = JsonWriter::new(JsonWriterOptions::default());
        emit(&tagged, &mut w).unwrap();
        assert_eq!(w.finish(), "5");
    }

    #[test]
    fn emits_nested_map_to_cbor() {
        let mut map = Map::new();
        map.insert(Value::String("a".into()), Tagged::plain(Value::Int(1)));
        let tagged = Tagged::plain(Value::Map(map));
        let mut w = CborWriter::new(CborWriterOptions::default());
        emit(&tagged, &mut w).unwrap();
        assert_eq!(w.finish(), alloc::vec![0xA1, 0x61, b'a', 0x01]);
    }

    #[test]
    fn emits_tag_before_payload() {
        let tagged = Tagged::tagged(2, Value::Int(5));
        let mut w = CborWriter::new(CborWriterOptions::default());
        emit(&tagged, &mut w).unwrap();
        assert_eq!(w.finish(), alloc::vec![0xC2, 0x05]);
    }

    #[test]
    fn rejects_list_shaped_map_key() {
        let mut map = Map::new();
        map.insert(Value::List(alloc::vec![]), Tagged::plain(Value::Int(1)));
        let tagged = Tagged::plain(Value::Map(map));
        let mut w = CborWriter::new(CborWriterOptions::default());
        assert!(emit(&tagged, &mut w).is_err());
    }

    #[test]
    fn roundtrips_list_through_builder_and_emitter() {
        use crate::builder::{Builder, BuilderOptions};

        let events = alloc::vec![
            Event::ListStart { size: Some(2) },
            Event::Primitive(Primitive::Int(1)),
            Event::Primitive(Primitive::Int(2)),
            Event::ListEnd,
        ];
        let mut b = Builder::new(BuilderOptions::default());
        for e in events {
            b.on_event(e).unwrap();
        }
        let tagged = b.build().unwrap();
        let mut w = CborWriter::new(CborWriterOptions::default());
        emit(&tagged, &mut w).unwrap();
        assert_eq!(w.finish(), alloc::vec![0x82, 0x01, 0x02]);
    }
}

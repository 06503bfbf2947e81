//! The [`Builder`] (`spec.md` §4.6): an [`EventSink`] that reconstructs a
//! [`Value`] tree from an event stream.
//!
//! The teacher crate never built a tree — it only ever produced
//! path-annotated events — so this module has no direct teacher
//! counterpart; it follows `json/reader.rs`'s plain `match`-over-an-explicit-
//! `Frame`-stack state machine, and replaces the class-inheritance extension
//! points `spec.md` §4.6 describes ("virtual factory functions", "subclasses
//! return alternative storage") with a generic `BuilderHooks` trait, the same
//! substitution [`EventSink`] already makes for the abstract base reader
//! (`spec.md` §9).

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::BuildError;
use crate::event::{Event, Primitive};
use crate::path::{Path, PathComponent};
use crate::sink::EventSink;
use crate::value::{Map, Tagged, Value};

/// Extensibility hooks for [`Builder`] (`spec.md` §4.6, points 1-2). Default
/// methods materialize plain in-memory `alloc` collections; override to
/// redirect storage (e.g. spill large buffers to disk) without touching the
/// state machine that drives them.
pub trait BuilderHooks {
    fn create_map(&mut self) -> Map {
        Map::new()
    }

    fn create_list(&mut self, _size_hint: Option<u64>) -> Vec<Tagged> {
        Vec::new()
    }

    fn create_string(&mut self, _size_hint: Option<u64>) -> String {
        String::new()
    }

    fn create_buffer(&mut self, _size_hint: Option<u64>) -> Vec<u8> {
        Vec::new()
    }

    /// Materializes a [`Value`] from a short-form [`Primitive`]. Override to
    /// change how a particular scalar shape is represented.
    fn create_primitive(&mut self, primitive: &Primitive) -> Value {
        match primitive {
            Primitive::Int(n) => Value::Int(*n),
            Primitive::UInt(n) => match i64::try_from(*n) {
                Ok(n) => Value::Int(n),
                Err(_) => Value::BigInt(crate::value::BigInt::from_u64(*n)),
            },
            Primitive::BigInt(b) => Value::BigInt(b.clone()),
            Primitive::Float(f) => Value::Float(*f),
            Primitive::Decimal(d) => Value::Decimal(d.clone()),
            Primitive::Bool(b) => Value::Bool(*b),
            Primitive::Null => Value::Null,
            Primitive::Undefined => Value::Undefined,
            Primitive::String(s) => Value::String(s.clone()),
        }
    }

    /// Materializes a [`Value`] from a CBOR major-type-7 `Simple(code)`
    /// outside the recognized set. `Value` has no dedicated variant for it
    /// (`spec.md` §3.2 names no such variant); the default, lossy but
    /// round-trippable-enough choice is the code's numeric value.
    fn create_simple(&mut self, code: u8) -> Value {
        Value::Int(i64::from(code))
    }

    fn append_string(&mut self, buf: &mut String, chunk: &str) {
        buf.push_str(chunk);
    }

    fn append_buffer(&mut self, buf: &mut Vec<u8>, chunk: &[u8]) {
        buf.extend_from_slice(chunk);
    }

    fn close_string(&mut self, mut buf: String) -> String {
        buf.shrink_to_fit();
        buf
    }

    fn close_buffer(&mut self, mut buf: Vec<u8>) -> Vec<u8> {
        buf.shrink_to_fit();
        buf
    }
}

/// The default [`BuilderHooks`]: plain in-memory storage, no overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl BuilderHooks for DefaultHooks {}

/// Options for [`Builder`].
#[derive(Debug, Clone, Copy)]
pub struct BuilderOptions {
    /// Reject a repeated key within the same map (`BuildError::DuplicateKey`).
    ///
    /// # Default
    /// `true`
    pub fail_on_duplicate_keys: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            fail_on_duplicate_keys: true,
        }
    }
}

#[derive(Debug)]
enum Frame {
    List {
        items: Vec<Tagged>,
        tag: Option<u64>,
    },
    Map {
        map: Map,
        pending_key: Option<Value>,
        tag: Option<u64>,
    },
    StringBuf {
        buf: String,
        tag: Option<u64>,
    },
    BufferBuf {
        buf: Vec<u8>,
        tag: Option<u64>,
    },
}

/// Reconstructs a [`Value`] tree from an [`Event`] stream.
///
/// Drive it with [`EventSink::on_event`], then call [`Builder::build`] once
/// the stream is exhausted. `H` is the [`BuilderHooks`] implementation;
/// defaults to [`DefaultHooks`].
pub struct Builder<H: BuilderHooks = DefaultHooks> {
    hooks: H,
    options: BuilderOptions,
    stack: Vec<Frame>,
    pending_tag: Option<u64>,
    root: Option<Tagged>,
}

impl Builder<DefaultHooks> {
    #[must_use]
    pub fn new(options: BuilderOptions) -> Self {
        Self::with_hooks(options, DefaultHooks)
    }
}

impl<H: BuilderHooks> Builder<H> {
    #[must_use]
    pub fn with_hooks(options: BuilderOptions, hooks: H) -> Self {
        Self {
            hooks,
            options,
            stack: Vec::new(),
            pending_tag: None,
            root: None,
        }
    }

    /// A snapshot of the current insertion point (`spec.md` §4.6 point 3).
    #[must_use]
    pub fn keys(&self) -> Path {
        self.stack
            .iter()
            .filter_map(|frame| match frame {
                Frame::List { items, .. } => Some(PathComponent::Index(items.len() as u64)),
                Frame::Map {
                    pending_key: Some(key),
                    ..
                } => Some(PathComponent::Key(key.clone())),
                Frame::Map {
                    pending_key: None, ..
                } => None,
                Frame::StringBuf { .. } | Frame::BufferBuf { .. } => None,
            })
            .collect()
    }

    /// Consumes the builder and returns the completed root value.
    ///
    /// # Errors
    /// Returns the matching `Unterminated*` error if a container/chunked
    /// value is still open, or `BuildError::EmptyInput` if no value was ever
    /// produced.
    pub fn build(mut self) -> Result<Tagged, BuildError> {
        if let Some(frame) = self.stack.pop() {
            return Err(match frame {
                Frame::List { .. } => BuildError::UnterminatedArray,
                Frame::Map { .. } => BuildError::UnterminatedObject,
                Frame::StringBuf { .. } => BuildError::UnterminatedString,
                Frame::BufferBuf { .. } => BuildError::UnterminatedBuffer,
            });
        }
        self.root.ok_or(BuildError::EmptyInput)
    }

    fn store(&mut self, tagged: Tagged) -> Result<(), BuildError> {
        match self.stack.last_mut() {
            None => {
                if self.root.is_some() {
                    return Err(BuildError::InvalidState(
                        "a value was already written at the top level".into(),
                    ));
                }
                self.root = Some(tagged);
                Ok(())
            }
            Some(Frame::List { items, .. }) => {
                items.push(tagged);
                Ok(())
            }
            Some(Frame::Map {
                map, pending_key, ..
            }) => match pending_key.take() {
                // Map keys are plain `Value`s (`spec.md` §3.2: "ordered map
                // from value-key to value"); a tag attached to a key event
                // has nothing to attach to and is dropped.
                None => {
                    *pending_key = Some(tagged.value);
                    Ok(())
                }
                Some(key) => {
                    if self.options.fail_on_duplicate_keys && map.contains_key(&key) {
                        return Err(BuildError::DuplicateKey(key.as_key_text()));
                    }
                    map.insert(key, tagged);
                    Ok(())
                }
            },
            Some(Frame::StringBuf { .. } | Frame::BufferBuf { .. }) => Err(BuildError::InvalidState(
                "a value cannot be written directly inside an open string/buffer".into(),
            )),
        }
    }
}

impl<H: BuilderHooks> EventSink<BuildError> for Builder<H> {
    fn on_event(&mut self, event: Event) -> Result<bool, BuildError> {
        match event {
            Event::Tag(tag) => {
                if self.pending_tag.is_some() {
                    return Err(BuildError::DoublePendingTag);
                }
                self.pending_tag = Some(tag);
                Ok(true)
            }
            Event::MapStart { .. } => {
                let map = self.hooks.create_map();
                let tag = self.pending_tag.take();
                self.stack.push(Frame::Map {
                    map,
                    pending_key: None,
                    tag,
                });
                Ok(true)
            }
            Event::MapEnd => {
                let Some(Frame::Map { map, pending_key, tag }) = self.stack.pop() else {
                    return Err(BuildError::InvalidState(
                        "MapEnd without matching MapStart".into(),
                    ));
                };
                if pending_key.is_some() {
                    return Err(BuildError::InvalidState(
                        "MapEnd with an odd number of key/value events".into(),
                    ));
                }
                self.store(Tagged {
                    tag,
                    value: Value::Map(map),
                })?;
                Ok(true)
            }
            Event::ListStart { size } => {
                let items = self.hooks.create_list(size);
                let tag = self.pending_tag.take();
                self.stack.push(Frame::List { items, tag });
                Ok(true)
            }
            Event::ListEnd => {
                let Some(Frame::List { items, tag }) = self.stack.pop() else {
                    return Err(BuildError::InvalidState(
                        "ListEnd without matching ListStart".into(),
                    ));
                };
                self.store(Tagged {
                    tag,
                    value: Value::List(items),
                })?;
                Ok(true)
            }
            Event::StringStart { byte_len } => {
                let buf = self.hooks.create_string(byte_len);
                let tag = self.pending_tag.take();
                self.stack.push(Frame::StringBuf { buf, tag });
                Ok(true)
            }
            Event::StringData(chunk) => {
                let Some(Frame::StringBuf { buf, .. }) = self.stack.last_mut() else {
                    return Err(BuildError::InvalidState(
                        "StringData without StringStart".into(),
                    ));
                };
                self.hooks.append_string(buf, &chunk);
                Ok(true)
            }
            Event::StringEnd => {
                let Some(Frame::StringBuf { buf, tag }) = self.stack.pop() else {
                    return Err(BuildError::InvalidState(
                        "StringEnd without StringStart".into(),
                    ));
                };
                let buf = self.hooks.close_string(buf);
                self.store(Tagged {
                    tag,
                    value: Value::String(buf),
                })?;
                Ok(true)
            }
            Event::BufferStart { byte_len } => {
                let buf = self.hooks.create_buffer(byte_len);
                let tag = self.pending_tag.take();
                self.stack.push(Frame::BufferBuf { buf, tag });
                Ok(true)
            }
            Event::BufferData(chunk) => {
                let Some(Frame::BufferBuf { buf, .. }) = self.stack.last_mut() else {
                    return Err(BuildError::InvalidState(
                        "BufferData without BufferStart".into(),
                    ));
                };
                self.hooks.append_buffer(buf, &chunk);
                Ok(true)
            }
            Event::BufferEnd => {
                let Some(Frame::BufferBuf { buf, tag }) = self.stack.pop() else {
                    return Err(BuildError::InvalidState(
                        "BufferEnd without BufferStart".into(),
                    ));
                };
                let buf = self.hooks.close_buffer(buf);
                self.store(Tagged {
                    tag,
                    value: Value::Buffer(buf),
                })?;
                Ok(true)
            }
            Event::Primitive(p) => {
                let tag = self.pending_tag.take();
                let value = self.hooks.create_primitive(&p);
                self.store(Tagged { tag, value })?;
                Ok(true)
            }
            Event::Simple(code) => {
                let tag = self.pending_tag.take();
                let value = self.hooks.create_simple(code);
                self.store(Tagged { tag, value })?;
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::BigInt;

    fn build(events: Vec<Event>) -> Result<Tagged, BuildError> {
        let mut b = Builder::new(BuilderOptions::default());
        for e in events {
            b.on_event(e).unwrap();
        }
        b.build()
    }

    #[test]
    fn builds_scalar_root() {
        let tagged = build(alloc::vec![Event::Primitive(Primitive::Int(5))]).unwrap();
        assert_eq!(tagged, Tagged::plain(Value::Int(5)));
    }

    #[test]
    fn builds_nested_map_and_list() {
        let events = alloc::vec![
            Event::MapStart { size: Some(1) },
            Event::Primitive(Primitive::String("items".into())),
            Event::ListStart { size: Some(2) },
            Event::Primitive(Primitive::Int(1)),
            Event::Primitive(Primitive::Int(2)),
            Event::ListEnd,
            Event::MapEnd,
        ];
        let tagged = build(events).unwrap();
        let Value::Map(map) = tagged.value else {
            panic!("expected a map root");
        };
        let items = map.get(&Value::String("items".into())).unwrap();
        assert_eq!(
            items.value,
            Value::List(alloc::vec![Tagged::plain(Value::Int(1)), Tagged::plain(Value::Int(2))])
        );
    }

    #[test]
    fn reassembles_chunked_string() {
        let events = alloc::vec![
            Event::StringStart { byte_len: Some(4) },
            Event::StringData("ab".into()),
            Event::StringData("cd".into()),
            Event::StringEnd,
        ];
        let tagged = build(events).unwrap();
        assert_eq!(tagged.value, Value::String("abcd".into()));
    }

    #[test]
    fn attaches_tag_to_next_value() {
        let events = alloc::vec![Event::Tag(2), Event::Primitive(Primitive::Int(5))];
        let tagged = build(events).unwrap();
        assert_eq!(tagged, Tagged::tagged(2, Value::Int(5)));
    }

    #[test]
    fn rejects_double_pending_tag() {
        let mut b = Builder::new(BuilderOptions::default());
        b.on_event(Event::Tag(1)).unwrap();
        assert_eq!(b.on_event(Event::Tag(2)), Err(BuildError::DoublePendingTag));
    }

    #[test]
    fn rejects_duplicate_keys_by_default() {
        let events = alloc::vec![
            Event::MapStart { size: Some(2) },
            Event::Primitive(Primitive::String("a".into())),
            Event::Primitive(Primitive::Int(1)),
            Event::Primitive(Primitive::String("a".into())),
            Event::Primitive(Primitive::Int(2)),
            Event::MapEnd,
        ];
        assert_eq!(
            build(events),
            Err(BuildError::DuplicateKey("a".into()))
        );
    }

    #[test]
    fn unterminated_array_is_an_error() {
        let mut b = Builder::new(BuilderOptions::default());
        b.on_event(Event::ListStart { size: Some(1) }).unwrap();
        b.on_event(Event::Primitive(Primitive::Int(1))).unwrap();
        assert_eq!(b.build(), Err(BuildError::UnterminatedArray));
    }

    #[test]
    fn empty_input_is_an_error() {
        let b = Builder::new(BuilderOptions::default());
        assert_eq!(b.build(), Err(BuildError::EmptyInput));
    }

    #[test]
    fn keys_reports_current_insertion_point() {
        let mut b = Builder::new(BuilderOptions::default());
        b.on_event(Event::MapStart { size: Some(1) }).unwrap();
        b.on_event(Event::Primitive(Primitive::String("x".into()))).unwrap();
        assert_eq!(b.keys(), alloc::vec![PathComponent::Key(Value::String("x".into()))]);
    }

    #[test]
    fn big_uint_above_i64_max_becomes_bigint() {
        let tagged = build(alloc::vec![Event::Primitive(Primitive::UInt(u64::MAX))]).unwrap();
        assert_eq!(tagged.value, Value::BigInt(BigInt::from_u64(u64::MAX)));
    }
}

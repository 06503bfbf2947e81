//! A unified, streaming, multi-format document codec for JSON, CBOR, and
//! Msgpack, built around one shared [`Event`] vocabulary so that any reader
//! can feed any writer (or the [`Builder`]/[`emit`] document-tree pair)
//! without a format-specific bridge.
#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod error;
mod event;
mod sink;
mod value;

pub mod cbor;
pub mod json;
pub mod msgpack;
pub mod source;

#[cfg(feature = "values")]
mod builder;
#[cfg(feature = "values")]
mod emitter;
#[cfg(feature = "values")]
mod path;

pub use error::{BuildError, Error, Position, WriteError};
pub use event::{Event, Primitive};
pub use sink::EventSink;
pub use value::{BigInt, Decimal, Map, Tagged, Value};

#[cfg(feature = "values")]
pub use builder::{Builder, BuilderHooks, BuilderOptions, DefaultHooks};
#[cfg(feature = "values")]
pub use emitter::emit;
#[cfg(feature = "values")]
pub use path::{Path, PathComponent};

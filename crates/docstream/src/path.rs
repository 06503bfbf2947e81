//! A lightweight key-path snapshot for the in-progress location inside a
//! [`Builder`](crate::builder::Builder) (`spec.md` §4.6: "a key-path snapshot
//! (`keys()`) at any event permits observers to condition behavior on
//! document location").
//!
//! Unlike the document tree's own addressing (an out-of-scope external
//! collaborator's concern per `spec.md` §3.2), this is just enough to answer
//! "where am I right now" during a build — it is never stored on a value.

use alloc::vec::Vec;

use crate::value::Value;

/// One step of a [`Path`]: either a list index or a map key.
#[derive(Debug, Clone, PartialEq)]
pub enum PathComponent {
    Index(u64),
    Key(Value),
}

/// The sequence of components from the document root to the builder's
/// current insertion point, outermost first.
pub type Path = Vec<PathComponent>;

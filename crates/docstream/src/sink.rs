//! The `EventSink` trait: the single seam every event consumer (writer or
//! builder) implements, replacing the class-inheritance sharing the source
//! uses between `AbstractReader`/subclassable builders (`spec.md` §9).

/// Consumes one [`Event`](crate::event::Event) at a time.
///
/// Returns `Ok(true)` to request more events (the normal case). A consumer
/// that wants to stop early — e.g. a filter that found what it was looking
/// for — may return `Ok(false)`; callers are not required to honor early
/// stop for formats where doing so would leave the underlying sink in an
/// unbalanced state, but the builder and writers in this crate do.
pub trait EventSink<E> {
    fn on_event(&mut self, event: crate::event::Event) -> Result<bool, E>;
}

//! Cross-format invariants that must hold regardless of dialect.

use docstream::cbor::{CborWriter, CborWriterOptions};
use docstream::json::{JsonReader, JsonReaderOptions, JsonWriter, JsonWriterOptions};
use docstream::msgpack::{MsgpackWriter, MsgpackWriterOptions};
use docstream::source::{SliceByteSource, Utf8CharSource};
use docstream::{Event, EventSink, Primitive};

fn json_events(text: &str) -> Vec<Event> {
    let source = Utf8CharSource::new(SliceByteSource::new(text.as_bytes()));
    let mut reader = JsonReader::new(source, JsonReaderOptions::default());
    let mut events = Vec::new();
    while let Some(event) = reader.read_event().expect("valid json") {
        events.push(event);
    }
    events
}

/// Every `*Start` event must be answered by exactly one matching `*End`, in
/// LIFO order, across any well-formed event stream a reader produces.
#[test]
fn reader_output_is_always_balanced() {
    for text in [
        "null",
        "[1,2,[3,4],{}]",
        r#"{"a":{"b":{"c":[1,2,3]}}}"#,
        r#"["" , "chunked string content"]"#,
    ] {
        let events = json_events(text);
        let mut depth = 0i32;
        for event in &events {
            if event.is_start() {
                depth += 1;
            } else if event.is_end() {
                depth -= 1;
            }
            assert!(depth >= 0, "unbalanced stream for {text:?}");
        }
        assert_eq!(depth, 0, "stream for {text:?} left frames open");
    }
}

/// `max_container_size` truncation must still leave each writer in a
/// well-formed state: the output is always a syntactically complete
/// document even though some elements were silently dropped.
#[test]
fn container_size_limit_still_produces_well_formed_json() {
    let events = json_events("[1,2,3,4,5,6,7,8,9,10]");
    let options = JsonWriterOptions {
        max_container_size: Some(3),
        ..JsonWriterOptions::default()
    };
    let mut writer = JsonWriter::new(options);
    for event in events {
        writer.on_event(event).expect("writer tolerates truncation");
    }
    let out = writer.finish();
    assert_eq!(out, "[1,2,3]");
}

/// A `Tag` event immediately followed by a non-buffer value is rejected by
/// the Msgpack writer (no `ext` slot exists for anything but a buffer),
/// while the same stream is perfectly legal CBOR.
#[test]
fn msgpack_rejects_tags_on_non_buffer_values_that_cbor_accepts() {
    let events = vec![Event::Tag(2), Event::Primitive(Primitive::Int(5))];

    let mut cbor = CborWriter::new(CborWriterOptions::default());
    for event in events.clone() {
        cbor.on_event(event).expect("cbor accepts a tag on any value");
    }

    let mut msgpack = MsgpackWriter::new(MsgpackWriterOptions::default());
    let mut saw_error = false;
    for event in events {
        if msgpack.on_event(event).is_err() {
            saw_error = true;
            break;
        }
    }
    assert!(saw_error, "msgpack ext types only attach to buffers");
}

/// A top-level scalar is a complete document on its own in every dialect.
#[test]
fn bare_scalar_is_a_complete_top_level_document() {
    let events = json_events("42");
    assert_eq!(events.len(), 1);

    let mut json = JsonWriter::new(JsonWriterOptions::default());
    for event in events.clone() {
        json.on_event(event).unwrap();
    }
    assert_eq!(json.finish(), "42");
}

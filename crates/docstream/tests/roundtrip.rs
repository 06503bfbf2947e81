//! Builder/emitter round trips: decode a dialect into a `Tagged` tree, then
//! replay that tree onto each of the three writers.

use docstream::cbor::{CborWriter, CborWriterOptions};
use docstream::json::{JsonReader, JsonReaderOptions, JsonWriter, JsonWriterOptions};
use docstream::msgpack::{MsgpackWriter, MsgpackWriterOptions};
use docstream::source::{SliceByteSource, Utf8CharSource};
use docstream::{emit, Builder, BuilderOptions, EventSink, Tagged, Value};

fn build_from_json(text: &str) -> Tagged {
    let source = Utf8CharSource::new(SliceByteSource::new(text.as_bytes()));
    let mut reader = JsonReader::new(source, JsonReaderOptions::default());
    let mut builder = Builder::new(BuilderOptions::default());
    while let Some(event) = reader.read_event().expect("valid json") {
        builder.on_event(event).expect("builder accepts event");
    }
    builder.build().expect("complete document")
}

#[test]
fn builds_a_map_with_mixed_value_types() {
    let tagged = build_from_json(r#"{"n":1,"f":1.5,"s":"hi","b":true,"nil":null,"l":[1,2]}"#);
    let Value::Map(map) = &tagged.value else {
        panic!("expected a map");
    };
    assert_eq!(map.get(&Value::String("n".into())).unwrap().value, Value::Int(1));
    assert_eq!(
        map.get(&Value::String("s".into())).unwrap().value,
        Value::String("hi".into())
    );
    assert_eq!(map.get(&Value::String("nil".into())).unwrap().value, Value::Null);
}

#[test]
fn emitted_tree_reencodes_identically_to_json() {
    let text = r#"{"a":[1,2,3],"b":"text"}"#;
    let tagged = build_from_json(text);

    let mut writer = JsonWriter::new(JsonWriterOptions::default());
    emit(&tagged, &mut writer).expect("emit succeeds");
    assert_eq!(writer.finish(), text);
}

#[test]
fn same_tree_emits_to_both_cbor_and_msgpack() {
    let tagged = Tagged::plain(Value::List(alloc_vec_tagged()));

    let mut cbor = CborWriter::new(CborWriterOptions::default());
    emit(&tagged, &mut cbor).unwrap();
    assert_eq!(cbor.finish(), vec![0x83, 0x01, 0x02, 0x03]);

    let mut msgpack = MsgpackWriter::new(MsgpackWriterOptions::default());
    emit(&tagged, &mut msgpack).unwrap();
    assert_eq!(msgpack.finish(), vec![0x93, 0x01, 0x02, 0x03]);
}

fn alloc_vec_tagged() -> Vec<Tagged> {
    vec![
        Tagged::plain(Value::Int(1)),
        Tagged::plain(Value::Int(2)),
        Tagged::plain(Value::Int(3)),
    ]
}

#[test]
fn tagged_value_round_trips_through_cbor() {
    let tagged = Tagged::tagged(2, Value::Buffer(vec![0x01, 0x02]));
    let mut cbor = CborWriter::new(CborWriterOptions::default());
    emit(&tagged, &mut cbor).unwrap();
    // Tag 2 (positive bignum) over a two-byte buffer.
    assert_eq!(cbor.finish(), vec![0xC2, 0x42, 0x01, 0x02]);
}

#[test]
fn duplicate_keys_are_rejected_by_default() {
    let mut builder = Builder::new(BuilderOptions::default());
    builder
        .on_event(docstream::Event::MapStart { size: Some(2) })
        .unwrap();
    builder
        .on_event(docstream::Event::Primitive(docstream::Primitive::String("a".into())))
        .unwrap();
    builder
        .on_event(docstream::Event::Primitive(docstream::Primitive::Int(1)))
        .unwrap();
    builder
        .on_event(docstream::Event::Primitive(docstream::Primitive::String("a".into())))
        .unwrap();
    let result = builder.on_event(docstream::Event::Primitive(docstream::Primitive::Int(2)));
    assert!(result.is_err(), "second \"a\" key should be rejected");
}

#[test]
fn last_write_wins_when_duplicate_keys_are_allowed() {
    let mut builder = Builder::new(BuilderOptions {
        fail_on_duplicate_keys: false,
    });
    for event in [
        docstream::Event::MapStart { size: Some(2) },
        docstream::Event::Primitive(docstream::Primitive::String("a".into())),
        docstream::Event::Primitive(docstream::Primitive::Int(1)),
        docstream::Event::Primitive(docstream::Primitive::String("a".into())),
        docstream::Event::Primitive(docstream::Primitive::Int(2)),
        docstream::Event::MapEnd,
    ] {
        builder.on_event(event).unwrap();
    }
    let tagged = builder.build().unwrap();
    let Value::Map(map) = &tagged.value else {
        panic!("expected a map");
    };
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&Value::String("a".into())).unwrap().value, Value::Int(2));
}

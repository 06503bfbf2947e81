//! Demonstrates overriding `BuilderHooks` to redirect storage without
//! touching the state machine that drives the builder.

use docstream::{Builder, BuilderHooks, BuilderOptions, Event, EventSink, Primitive, Value};

/// A hook set that uppercases every string chunk as it is appended,
/// simulating a caller that wants to normalize text during assembly rather
/// than in a second pass over the finished tree.
struct UppercaseHooks;

impl BuilderHooks for UppercaseHooks {
    fn append_string(&mut self, buf: &mut String, chunk: &str) {
        buf.push_str(&chunk.to_uppercase());
    }
}

#[test]
fn custom_hooks_transform_strings_during_assembly() {
    let events = vec![
        Event::MapStart { size: Some(1) },
        Event::Primitive(Primitive::String("key".into())),
        Event::ListStart { size: Some(1) },
        Event::StringStart { byte_len: Some(5) },
        Event::StringData("hel".into()),
        Event::StringData("lo".into()),
        Event::StringEnd,
        Event::ListEnd,
        Event::MapEnd,
    ];

    let mut builder = Builder::with_hooks(BuilderOptions::default(), UppercaseHooks);
    for event in events {
        builder.on_event(event).unwrap();
    }
    let tagged = builder.build().unwrap();

    let Value::Map(map) = &tagged.value else {
        panic!("expected a map root");
    };
    let Value::List(items) = &map.get(&Value::String("key".into())).unwrap().value else {
        panic!("expected a list value");
    };
    assert_eq!(items[0].value, Value::String("HELLO".into()));
}

/// A hook set that reserves list capacity up front from the reader's own
/// size hint, avoiding the default's unconditional empty `Vec::new()`.
struct CapacityHintHooks;

impl BuilderHooks for CapacityHintHooks {
    fn create_list(&mut self, size_hint: Option<u64>) -> Vec<docstream::Tagged> {
        match size_hint {
            Some(n) => Vec::with_capacity(n as usize),
            None => Vec::new(),
        }
    }
}

#[test]
fn capacity_hint_hooks_do_not_change_the_resulting_tree() {
    let events = vec![
        Event::ListStart { size: Some(3) },
        Event::Primitive(Primitive::Int(1)),
        Event::Primitive(Primitive::Int(2)),
        Event::Primitive(Primitive::Int(3)),
        Event::ListEnd,
    ];
    let mut builder = Builder::with_hooks(BuilderOptions::default(), CapacityHintHooks);
    for event in events {
        builder.on_event(event).unwrap();
    }
    let tagged = builder.build().unwrap();
    assert_eq!(
        tagged.value,
        Value::List(vec![
            docstream::Tagged::plain(Value::Int(1)),
            docstream::Tagged::plain(Value::Int(2)),
            docstream::Tagged::plain(Value::Int(3)),
        ])
    );
}

#[test]
fn keys_snapshot_reflects_nesting_through_custom_hooks() {
    let mut builder = Builder::with_hooks(BuilderOptions::default(), UppercaseHooks);
    builder.on_event(Event::MapStart { size: Some(1) }).unwrap();
    builder
        .on_event(Event::Primitive(Primitive::String("outer".into())))
        .unwrap();
    builder.on_event(Event::ListStart { size: Some(1) }).unwrap();
    builder.on_event(Event::Primitive(Primitive::Int(1))).unwrap();
    assert_eq!(
        builder.keys(),
        vec![
            docstream::PathComponent::Key(Value::String("outer".into())),
            docstream::PathComponent::Index(1),
        ]
    );
}

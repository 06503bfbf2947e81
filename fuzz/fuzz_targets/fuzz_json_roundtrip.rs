#![no_main]

use docstream::cbor::{CborWriter, CborWriterOptions};
use docstream::json::{JsonReader, JsonReaderOptions, JsonWriter, JsonWriterOptions};
use docstream::source::{SliceByteSource, Utf8CharSource};
use docstream::EventSink;
use libfuzzer_sys::fuzz_target;

fn run(data: &[u8]) {
    if data.is_empty() {
        return;
    }
    let flags = data[0];
    let body = &data[1..];

    let options = JsonReaderOptions {
        allow_unquoted_keys: flags & 1 != 0,
        allow_trailing_comma: flags & 2 != 0,
        allow_comments: flags & 4 != 0,
        allow_hex_integers: flags & 8 != 0,
        allow_nan: flags & 16 != 0,
        ..JsonReaderOptions::default()
    };

    let source = Utf8CharSource::new(SliceByteSource::new(body));
    let mut reader = JsonReader::new(source, options);

    let mut events = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Some(event)) => events.push(event),
            Ok(None) => break,
            // A malformed/rejected document is an expected outcome, not a bug.
            Err(_) => return,
        }
    }

    // A complete, well-formed event stream must always be replayable onto
    // any writer without error.
    let mut json = JsonWriter::new(JsonWriterOptions::default());
    let mut cbor = CborWriter::new(CborWriterOptions::default());
    for event in &events {
        if json.on_event(event.clone()).is_err() {
            panic!("a well-formed event stream was rejected by JsonWriter");
        }
        if cbor.on_event(event.clone()).is_err() {
            panic!("a well-formed event stream was rejected by CborWriter");
        }
    }
}

fuzz_target!(|data: &[u8]| run(data));

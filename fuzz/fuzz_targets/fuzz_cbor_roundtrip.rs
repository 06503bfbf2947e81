#![no_main]

use docstream::cbor::{CborReader, CborReaderOptions, CborWriter, CborWriterOptions};
use docstream::source::SliceByteSource;
use docstream::EventSink;
use libfuzzer_sys::fuzz_target;

fn run(data: &[u8]) {
    if data.is_empty() {
        return;
    }
    let flags = data[0];
    let body = &data[1..];

    let options = CborReaderOptions {
        depth_limit: if flags & 1 != 0 { Some(32) } else { None },
        ..CborReaderOptions::default()
    };

    let mut reader = CborReader::new(SliceByteSource::new(body), options);
    let mut events = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Some(event)) => events.push(event),
            Ok(None) => break,
            Err(_) => return,
        }
    }

    // Whatever a reader produced must be replayable onto a fresh writer
    // without error: the reader's own output is by construction
    // well-formed, tag placement included.
    let mut writer = CborWriter::new(CborWriterOptions::default());
    for event in events {
        if writer.on_event(event).is_err() {
            panic!("CborReader produced an event stream CborWriter rejected");
        }
    }
}

fuzz_target!(|data: &[u8]| run(data));

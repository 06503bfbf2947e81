#![no_main]

use docstream::msgpack::{MsgpackReader, MsgpackReaderOptions};
use docstream::source::SliceByteSource;
use libfuzzer_sys::fuzz_target;

/// Reader-only: just drains whatever `data` decodes to, checking the reader
/// never panics and never loops forever on malformed Msgpack (each
/// `read_event` call either advances the byte cursor or returns).
fn run(data: &[u8]) {
    if data.is_empty() {
        return;
    }
    let flags = data[0];
    let body = &data[1..];

    let options = MsgpackReaderOptions {
        depth_limit: if flags & 1 != 0 { Some(32) } else { None },
        ..MsgpackReaderOptions::default()
    };

    let mut reader = MsgpackReader::new(SliceByteSource::new(body), options);
    let mut steps = 0usize;
    loop {
        steps += 1;
        // `SliceByteSource::is_final()` is always true, so a well-behaved
        // reader can never suspend (`Ok(None)`) on it forever; bound the
        // loop anyway as a backstop against a reader that regresses that
        // invariant.
        if steps > body.len() + 16 {
            panic!("MsgpackReader made no progress against a final byte source");
        }
        match reader.read_event() {
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(_) => break,
        }
    }
}

fuzz_target!(|data: &[u8]| run(data));

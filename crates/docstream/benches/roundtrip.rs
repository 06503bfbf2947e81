//! Benchmarks decoding a payload and re-encoding it in each dialect.
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docstream::cbor::{CborReader, CborReaderOptions, CborWriter, CborWriterOptions};
use docstream::json::{JsonReader, JsonReaderOptions, JsonWriter, JsonWriterOptions};
use docstream::msgpack::{MsgpackReader, MsgpackReaderOptions, MsgpackWriter, MsgpackWriterOptions};
use docstream::source::{SliceByteSource, Utf8CharSource};
use docstream::{Builder, BuilderOptions, EventSink};

fn synthetic_json(elements: usize) -> String {
    let mut out = String::from("[");
    for i in 0..elements {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            r#"{{"id":{i},"name":"item-{i}","active":{},"tags":["a","b","c"]}}"#,
            i % 2 == 0
        ));
    }
    out.push(']');
    out
}

fn json_to_cbor(payload: &str) -> Vec<u8> {
    let source = Utf8CharSource::new(SliceByteSource::new(payload.as_bytes()));
    let mut reader = JsonReader::new(source, JsonReaderOptions::default());
    let mut writer = CborWriter::new(CborWriterOptions::default());
    while let Some(event) = reader.read_event().unwrap() {
        writer.on_event(event).unwrap();
    }
    writer.finish()
}

fn cbor_to_json(bytes: &[u8]) -> String {
    let mut reader = CborReader::new(SliceByteSource::new(bytes), CborReaderOptions::default());
    let mut writer = JsonWriter::new(JsonWriterOptions::default());
    while let Some(event) = reader.read_event().unwrap() {
        writer.on_event(event).unwrap();
    }
    writer.finish()
}

fn json_to_msgpack_via_builder(payload: &str) -> Vec<u8> {
    let source = Utf8CharSource::new(SliceByteSource::new(payload.as_bytes()));
    let mut reader = JsonReader::new(source, JsonReaderOptions::default());
    let mut builder = Builder::new(BuilderOptions::default());
    while let Some(event) = reader.read_event().unwrap() {
        builder.on_event(event).unwrap();
    }
    let tagged = builder.build().unwrap();
    let mut writer = MsgpackWriter::new(MsgpackWriterOptions::default());
    docstream::emit(&tagged, &mut writer).unwrap();
    writer.finish()
}

fn msgpack_to_json(bytes: &[u8]) -> String {
    let mut reader = MsgpackReader::new(SliceByteSource::new(bytes), MsgpackReaderOptions::default());
    let mut writer = JsonWriter::new(JsonWriterOptions::default());
    while let Some(event) = reader.read_event().unwrap() {
        writer.on_event(event).unwrap();
    }
    writer.finish()
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");

    for &elements in &[10usize, 100, 1_000] {
        let payload = synthetic_json(elements);

        group.bench_with_input(BenchmarkId::new("json_to_cbor", elements), &elements, |b, _| {
            b.iter(|| black_box(json_to_cbor(black_box(&payload))));
        });

        let cbor_bytes = json_to_cbor(&payload);
        group.bench_with_input(BenchmarkId::new("cbor_to_json", elements), &elements, |b, _| {
            b.iter(|| black_box(cbor_to_json(black_box(&cbor_bytes))));
        });

        group.bench_with_input(
            BenchmarkId::new("json_to_msgpack_via_builder", elements),
            &elements,
            |b, _| {
                b.iter(|| black_box(json_to_msgpack_via_builder(black_box(&payload))));
            },
        );

        let msgpack_bytes = json_to_msgpack_via_builder(&payload);
        group.bench_with_input(BenchmarkId::new("msgpack_to_json", elements), &elements, |b, _| {
            b.iter(|| black_box(msgpack_to_json(black_box(&msgpack_bytes))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);

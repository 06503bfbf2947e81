//! Property test: an arbitrary depth-bounded document round-trips through
//! CBOR (decode into a tree, re-encode, decode again) without loss.

use docstream::cbor::{CborReader, CborReaderOptions, CborWriter, CborWriterOptions};
use docstream::source::SliceByteSource;
use docstream::{emit, Builder, BuilderOptions, EventSink, Map, Tagged, Value};
use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

/// A depth-bounded subset of [`Value`] safe for exact round-trip comparison:
/// no `Float` (NaN/Infinity don't compare equal to themselves), no
/// `BigInt`/`Decimal`/`Buffer`/`Undefined` (none of the three writers carry
/// those through every dialect identically, which isn't what this property
/// is about).
#[derive(Debug, Clone)]
struct ArbValue(Value);

fn gen_value(g: &mut Gen, depth: usize) -> Value {
    if depth == 0 {
        match u8::arbitrary(g) % 3 {
            0 => Value::Null,
            1 => Value::Bool(bool::arbitrary(g)),
            _ => Value::Int(i64::arbitrary(g)),
        }
    } else {
        match u8::arbitrary(g) % 6 {
            0 => Value::Null,
            1 => Value::Bool(bool::arbitrary(g)),
            2 => Value::Int(i64::arbitrary(g)),
            3 => Value::String(String::arbitrary(g)),
            4 => {
                let len = usize::arbitrary(g) % 4;
                let items = (0..len)
                    .map(|_| Tagged::plain(gen_value(g, depth - 1)))
                    .collect();
                Value::List(items)
            }
            _ => {
                let len = usize::arbitrary(g) % 4;
                let mut map = Map::new();
                for i in 0..len {
                    // Keys are prefixed with their insertion index so two
                    // generated keys never collide and silently drop an entry.
                    let key = format!("k{i}{}", String::arbitrary(g));
                    map.insert(Value::String(key), Tagged::plain(gen_value(g, depth - 1)));
                }
                Value::Map(map)
            }
        }
    }
}

impl Arbitrary for ArbValue {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = usize::arbitrary(g) % 3;
        ArbValue(gen_value(g, depth))
    }
}

fn cbor_roundtrip(tagged: &Tagged) -> Result<Tagged, String> {
    let mut writer = CborWriter::new(CborWriterOptions::default());
    emit(tagged, &mut writer).map_err(|e| format!("{e:?}"))?;
    let bytes = writer.finish();

    let mut reader = CborReader::new(SliceByteSource::new(&bytes), CborReaderOptions::default());
    let mut builder = Builder::new(BuilderOptions::default());
    loop {
        match reader.read_event() {
            Ok(Some(event)) => {
                builder.on_event(event).map_err(|e| format!("{e:?}"))?;
            }
            Ok(None) => break,
            Err(e) => return Err(format!("{e:?}")),
        }
    }
    builder.build().map_err(|e| format!("{e:?}"))
}

#[test]
fn arbitrary_value_round_trips_through_cbor() {
    fn prop(value: ArbValue) -> TestResult {
        let tagged = Tagged::plain(value.0);
        match cbor_roundtrip(&tagged) {
            Ok(roundtripped) => TestResult::from_bool(roundtripped == tagged),
            Err(_) => TestResult::failed(),
        }
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(ArbValue) -> TestResult);
}

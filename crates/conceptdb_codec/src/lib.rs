//! # ConceptDB Codec
//!
//! The closed tagged value union and its binary codec.
//!
//! Every value the engine stores is one of the variants of [`Value`], each
//! with a stable wire tag (see [`TypeTag`]). The codec writes big-endian,
//! tag-prefixed payloads; string payloads of any length are chunked at
//! 65,535 UTF-8 bytes and reassembled on decode. The structured-literal
//! escape hatch (tag 22) carries arbitrary nested composite data as chunked
//! JSON text.
//!
//! ## Usage
//!
//! ```
//! use conceptdb_codec::{decode_value_from_slice, encode_value_to_vec, Value};
//!
//! let value = Value::Ints(vec![1, 2, 3]);
//! let bytes = encode_value_to_vec(&value).unwrap();
//! let decoded = decode_value_from_slice(&bytes).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod value;

pub use decoder::{decode_value_from_slice, ValueReader};
pub use encoder::{
    chunk_utf8, encode_value_to_vec, ValueWriter, FORMAT_VERSION, MAX_CHUNK_BYTES,
};
pub use error::{CodecError, CodecResult};
pub use value::{TypeTag, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roundtrip(value: &Value) -> Value {
        let bytes = encode_value_to_vec(value).unwrap();
        decode_value_from_slice(&bytes).unwrap()
    }

    #[test]
    fn roundtrip_scalars() {
        for value in [
            Value::Null,
            Value::Text("hello world".into()),
            Value::Name("db/name".into()),
            Value::Int(-42),
            Value::Long(i64::MIN),
            Value::Float(3.5),
            Value::Double(-0.0),
            Value::Char('λ'),
            Value::Bool(true),
            Value::Bool(false),
            Value::Instant(1_700_000_000_000),
            Value::TypeRef("instant".into()),
        ] {
            assert_eq!(roundtrip(&value), value);
        }
    }

    #[test]
    fn roundtrip_arrays() {
        for value in [
            Value::Texts(vec!["a".into(), String::new(), "ccc".into()]),
            Value::Names(vec!["x/y".into()]),
            Value::Ints(vec![1, 2, 3]),
            Value::Ints(vec![]),
            Value::Longs(vec![i64::MIN, 0, i64::MAX]),
            Value::Floats(vec![1.0, -2.5]),
            Value::Doubles(vec![f64::MAX]),
            Value::Bools(vec![true, false, true]),
            Value::Chars(vec!['a', 'é', '中']),
            Value::Instants(vec![0, -1, 1]),
        ] {
            assert_eq!(roundtrip(&value), value);
        }
    }

    #[test]
    fn roundtrip_string_at_chunk_boundary() {
        for len in [MAX_CHUNK_BYTES - 1, MAX_CHUNK_BYTES, MAX_CHUNK_BYTES + 1] {
            let value = Value::Text("x".repeat(len));
            assert_eq!(roundtrip(&value), value);
        }
    }

    #[test]
    fn roundtrip_multichunk_multibyte_string() {
        // Three-byte chars so the chunk split cannot fall on a clean border.
        let value = Value::Text("中".repeat(50_000));
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn roundtrip_structured_literal() {
        let json = serde_json::json!({
            "tags": ["a", "b"],
            "nested": { "n": 1, "v": [1.5, null, true] }
        });
        let value = Value::Structured(json);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn roundtrip_large_structured_literal() {
        // Force the JSON text past one chunk.
        let items: Vec<serde_json::Value> =
            (0..20_000).map(|n| serde_json::json!({ "n": n })).collect();
        let value = Value::Structured(serde_json::Value::Array(items));
        assert_eq!(roundtrip(&value), value);
    }

    proptest! {
        #[test]
        fn roundtrip_any_text(s in ".*") {
            let value = Value::Text(s);
            prop_assert_eq!(roundtrip(&value), value);
        }

        #[test]
        fn roundtrip_any_int_array(items in proptest::collection::vec(any::<i32>(), 0..256)) {
            let value = Value::Ints(items);
            prop_assert_eq!(roundtrip(&value), value);
        }

        #[test]
        fn roundtrip_any_double(bits in any::<u64>()) {
            let value = Value::Double(f64::from_bits(bits));
            prop_assert_eq!(roundtrip(&value), value);
        }
    }
}

//! Tag-prefixed binary value decoder.

use std::io::Read;

use crate::error::{CodecError, CodecResult};
use crate::value::{TypeTag, Value};

/// Decode a single value from a standalone byte slice.
///
/// # Errors
///
/// Returns an error on an unknown tag, truncated input, or a structured
/// literal that fails to parse.
pub fn decode_value_from_slice(bytes: &[u8]) -> CodecResult<Value> {
    let mut reader = ValueReader::new(bytes);
    reader.read_value()
}

/// A binary reader for the tagged value union.
pub struct ValueReader<R: Read> {
    input: R,
}

impl<R: Read> ValueReader<R> {
    /// Creates a reader over the given source.
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Consumes the reader and returns the source.
    pub fn into_inner(self) -> R {
        self.input
    }

    /// Reads a big-endian i32.
    pub fn read_i32(&mut self) -> CodecResult<i32> {
        let mut buf = [0u8; 4];
        self.input.read_exact(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    /// Reads a big-endian i64.
    pub fn read_i64(&mut self) -> CodecResult<i64> {
        let mut buf = [0u8; 8];
        self.input.read_exact(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    /// Reads a big-endian IEEE-754 f32.
    pub fn read_f32(&mut self) -> CodecResult<f32> {
        let mut buf = [0u8; 4];
        self.input.read_exact(&mut buf)?;
        Ok(f32::from_bits(u32::from_be_bytes(buf)))
    }

    /// Reads a big-endian IEEE-754 f64.
    pub fn read_f64(&mut self) -> CodecResult<f64> {
        let mut buf = [0u8; 8];
        self.input.read_exact(&mut buf)?;
        Ok(f64::from_bits(u64::from_be_bytes(buf)))
    }

    /// Reads a one-byte boolean.
    pub fn read_bool(&mut self) -> CodecResult<bool> {
        let mut buf = [0u8; 1];
        self.input.read_exact(&mut buf)?;
        Ok(buf[0] != 0)
    }

    /// Reads a char from its u32 scalar value.
    pub fn read_char(&mut self) -> CodecResult<char> {
        let mut buf = [0u8; 4];
        self.input.read_exact(&mut buf)?;
        let code = u32::from_be_bytes(buf);
        char::from_u32(code).ok_or(CodecError::InvalidChar(code))
    }

    /// Reads a single UTF chunk: u16 byte length then the bytes.
    ///
    /// A stream ending before the declared chunk length is a
    /// [`CodecError::TruncatedChunk`].
    pub fn read_utf(&mut self) -> CodecResult<String> {
        let mut buf = [0u8; 2];
        self.input.read_exact(&mut buf)?;
        let len = usize::from(u16::from_be_bytes(buf));
        let mut bytes = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = self.input.read(&mut bytes[filled..])?;
            if n == 0 {
                return Err(CodecError::TruncatedChunk {
                    declared: len,
                    actual: filled,
                });
            }
            filled += n;
        }
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Reads a chunk-count-prefixed string and concatenates its chunks.
    pub fn read_chunked(&mut self) -> CodecResult<String> {
        let count = self.read_len()?;
        let mut result = String::new();
        for _ in 0..count {
            result.push_str(&self.read_utf()?);
        }
        Ok(result)
    }

    /// Reads a non-negative element count.
    fn read_len(&mut self) -> CodecResult<usize> {
        let n = self.read_i32()?;
        if n < 0 {
            return Err(CodecError::InvalidLength(i64::from(n)));
        }
        Ok(n as usize)
    }

    /// Reads a value: wire tag, then the tag-specific payload.
    ///
    /// Tag 9 (legacy date) decodes as [`Value::Instant`]. Tag 20 is the
    /// reserved date-array slot and is rejected like an unknown tag.
    ///
    /// # Errors
    ///
    /// Unknown tags and version-incompatible payloads are fatal; there is no
    /// partial result.
    pub fn read_value(&mut self) -> CodecResult<Value> {
        let wire = self.read_i32()?;
        let tag = TypeTag::from_wire(wire).ok_or(CodecError::UnknownTag { tag: wire })?;
        match tag {
            TypeTag::Null => Ok(Value::Null),
            TypeTag::Text => Ok(Value::Text(self.read_chunked()?)),
            TypeTag::Name => Ok(Value::Name(self.read_chunked()?)),
            TypeTag::Int => Ok(Value::Int(self.read_i32()?)),
            TypeTag::Long => Ok(Value::Long(self.read_i64()?)),
            TypeTag::Float => Ok(Value::Float(self.read_f32()?)),
            TypeTag::Double => Ok(Value::Double(self.read_f64()?)),
            TypeTag::Char => Ok(Value::Char(self.read_char()?)),
            TypeTag::Bool => Ok(Value::Bool(self.read_bool()?)),
            TypeTag::Date | TypeTag::Instant => Ok(Value::Instant(self.read_i64()?)),
            TypeTag::TypeRef => Ok(Value::TypeRef(self.read_chunked()?)),
            TypeTag::Texts => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_chunked()?);
                }
                Ok(Value::Texts(items))
            }
            TypeTag::Names => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_chunked()?);
                }
                Ok(Value::Names(items))
            }
            TypeTag::Ints => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_i32()?);
                }
                Ok(Value::Ints(items))
            }
            TypeTag::Longs => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_i64()?);
                }
                Ok(Value::Longs(items))
            }
            TypeTag::Floats => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_f32()?);
                }
                Ok(Value::Floats(items))
            }
            TypeTag::Doubles => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_f64()?);
                }
                Ok(Value::Doubles(items))
            }
            TypeTag::Bools => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_bool()?);
                }
                Ok(Value::Bools(items))
            }
            TypeTag::Chars => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_char()?);
                }
                Ok(Value::Chars(items))
            }
            TypeTag::Dates => Err(CodecError::UnknownTag { tag: wire }),
            TypeTag::Instants => {
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_i64()?);
                }
                Ok(Value::Instants(items))
            }
            TypeTag::Structured => {
                let text = self.read_chunked()?;
                let json = serde_json::from_str(&text)?;
                Ok(Value::Structured(json))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_value_to_vec;

    #[test]
    fn unknown_tag_is_fatal() {
        let bytes = 99i32.to_be_bytes();
        let result = decode_value_from_slice(&bytes);
        assert!(matches!(result, Err(CodecError::UnknownTag { tag: 99 })));
    }

    #[test]
    fn reserved_date_array_tag_is_fatal() {
        let bytes = 20i32.to_be_bytes();
        let result = decode_value_from_slice(&bytes);
        assert!(matches!(result, Err(CodecError::UnknownTag { tag: 20 })));
    }

    #[test]
    fn legacy_date_decodes_as_instant() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&9i32.to_be_bytes());
        bytes.extend_from_slice(&1_234_567i64.to_be_bytes());
        let value = decode_value_from_slice(&bytes).unwrap();
        assert_eq!(value, Value::Instant(1_234_567));
    }

    #[test]
    fn truncated_string_chunk_is_reported_with_counts() {
        let bytes = encode_value_to_vec(&Value::Text("hello".into())).unwrap();
        // Cut into the chunk payload, past the tag, count, and length.
        let result = decode_value_from_slice(&bytes[..bytes.len() - 2]);
        assert!(matches!(
            result,
            Err(CodecError::TruncatedChunk {
                declared: 5,
                actual: 3
            })
        ));
    }

    #[test]
    fn truncated_input_is_fatal() {
        let bytes = encode_value_to_vec(&Value::Long(42)).unwrap();
        let result = decode_value_from_slice(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(CodecError::Io(_))));
    }

    #[test]
    fn negative_length_is_fatal() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&14i32.to_be_bytes());
        bytes.extend_from_slice(&(-1i32).to_be_bytes());
        let result = decode_value_from_slice(&bytes);
        assert!(matches!(result, Err(CodecError::InvalidLength(-1))));
    }

    #[test]
    fn invalid_char_is_fatal() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&7i32.to_be_bytes());
        bytes.extend_from_slice(&0xD800u32.to_be_bytes()); // surrogate
        let result = decode_value_from_slice(&bytes);
        assert!(matches!(result, Err(CodecError::InvalidChar(0xD800))));
    }
}

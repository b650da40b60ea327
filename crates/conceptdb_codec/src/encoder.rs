//! Tag-prefixed binary value encoder.
//!
//! All multi-byte quantities are big-endian. Every string payload is written
//! as a chunk-count prefix followed by length-prefixed UTF-8 chunks of at
//! most [`MAX_CHUNK_BYTES`] bytes, so strings of any length round-trip.

use std::io::Write;

use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Snapshot/codec format version. Bumped on any wire-incompatible change.
pub const FORMAT_VERSION: i32 = 1;

/// Maximum byte length of a single UTF-8 string chunk.
pub const MAX_CHUNK_BYTES: usize = 65_535;

/// Encode a single value to a standalone byte vector.
///
/// # Errors
///
/// Returns an error if the structured-literal text cannot be printed.
pub fn encode_value_to_vec(value: &Value) -> CodecResult<Vec<u8>> {
    let mut writer = ValueWriter::new(Vec::new());
    writer.write_value(value)?;
    Ok(writer.into_inner())
}

/// Splits a string at char boundaries into chunks of at most
/// [`MAX_CHUNK_BYTES`] UTF-8 bytes. The empty string yields one empty chunk.
pub fn chunk_utf8(s: &str) -> Vec<&str> {
    if s.len() <= MAX_CHUNK_BYTES {
        return vec![s];
    }
    let mut chunks = Vec::with_capacity(s.len() / MAX_CHUNK_BYTES + 1);
    let mut rest = s;
    while rest.len() > MAX_CHUNK_BYTES {
        let mut split = MAX_CHUNK_BYTES;
        while !rest.is_char_boundary(split) {
            split -= 1;
        }
        let (head, tail) = rest.split_at(split);
        chunks.push(head);
        rest = tail;
    }
    chunks.push(rest);
    chunks
}

/// A binary writer for the tagged value union.
///
/// Wraps any [`Write`] sink; the snapshot transcoder drives one of these
/// per value block.
pub struct ValueWriter<W: Write> {
    out: W,
}

impl<W: Write> ValueWriter<W> {
    /// Creates a writer over the given sink.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the writer and returns the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes a big-endian i32.
    pub fn write_i32(&mut self, n: i32) -> CodecResult<()> {
        self.out.write_all(&n.to_be_bytes())?;
        Ok(())
    }

    /// Writes a big-endian i64.
    pub fn write_i64(&mut self, n: i64) -> CodecResult<()> {
        self.out.write_all(&n.to_be_bytes())?;
        Ok(())
    }

    /// Writes a big-endian IEEE-754 f32.
    pub fn write_f32(&mut self, f: f32) -> CodecResult<()> {
        self.out.write_all(&f.to_bits().to_be_bytes())?;
        Ok(())
    }

    /// Writes a big-endian IEEE-754 f64.
    pub fn write_f64(&mut self, f: f64) -> CodecResult<()> {
        self.out.write_all(&f.to_bits().to_be_bytes())?;
        Ok(())
    }

    /// Writes a boolean as one byte.
    pub fn write_bool(&mut self, b: bool) -> CodecResult<()> {
        self.out.write_all(&[u8::from(b)])?;
        Ok(())
    }

    /// Writes a char as its big-endian u32 scalar value.
    pub fn write_char(&mut self, c: char) -> CodecResult<()> {
        self.out.write_all(&(c as u32).to_be_bytes())?;
        Ok(())
    }

    /// Writes a single UTF chunk: u16 byte length then the bytes.
    ///
    /// The caller must have chunked the string; a chunk longer than
    /// [`MAX_CHUNK_BYTES`] is an invalid-length error.
    pub fn write_utf(&mut self, s: &str) -> CodecResult<()> {
        let len = s.len();
        if len > MAX_CHUNK_BYTES {
            return Err(CodecError::InvalidLength(len as i64));
        }
        self.out.write_all(&(len as u16).to_be_bytes())?;
        self.out.write_all(s.as_bytes())?;
        Ok(())
    }

    /// Writes a string of any length: chunk count, then UTF chunks.
    pub fn write_chunked(&mut self, s: &str) -> CodecResult<()> {
        let chunks = chunk_utf8(s);
        self.write_i32(chunks.len() as i32)?;
        for chunk in chunks {
            self.write_utf(chunk)?;
        }
        Ok(())
    }

    /// Writes a value: its wire tag followed by the tag-specific payload.
    ///
    /// # Errors
    ///
    /// Returns an error on sink failure or if the structured literal cannot
    /// be printed.
    pub fn write_value(&mut self, value: &Value) -> CodecResult<()> {
        self.write_i32(value.tag().as_wire())?;
        match value {
            Value::Null => {}
            Value::Text(s) | Value::Name(s) | Value::TypeRef(s) => self.write_chunked(s)?,
            Value::Int(n) => self.write_i32(*n)?,
            Value::Long(n) | Value::Instant(n) => self.write_i64(*n)?,
            Value::Float(f) => self.write_f32(*f)?,
            Value::Double(f) => self.write_f64(*f)?,
            Value::Char(c) => self.write_char(*c)?,
            Value::Bool(b) => self.write_bool(*b)?,
            Value::Texts(items) | Value::Names(items) => {
                self.write_i32(items.len() as i32)?;
                for s in items {
                    self.write_chunked(s)?;
                }
            }
            Value::Ints(items) => {
                self.write_i32(items.len() as i32)?;
                for n in items {
                    self.write_i32(*n)?;
                }
            }
            Value::Longs(items) | Value::Instants(items) => {
                self.write_i32(items.len() as i32)?;
                for n in items {
                    self.write_i64(*n)?;
                }
            }
            Value::Floats(items) => {
                self.write_i32(items.len() as i32)?;
                for f in items {
                    self.write_f32(*f)?;
                }
            }
            Value::Doubles(items) => {
                self.write_i32(items.len() as i32)?;
                for f in items {
                    self.write_f64(*f)?;
                }
            }
            Value::Bools(items) => {
                self.write_i32(items.len() as i32)?;
                for b in items {
                    self.write_bool(*b)?;
                }
            }
            Value::Chars(items) => {
                self.write_i32(items.len() as i32)?;
                for c in items {
                    self.write_char(*c)?;
                }
            }
            Value::Structured(json) => {
                let text = serde_json::to_string(json)?;
                self.write_chunked(&text)?;
            }
        }
        Ok(())
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> CodecResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_just_the_tag() {
        let bytes = encode_value_to_vec(&Value::Null).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
    }

    #[test]
    fn int_payload_is_big_endian() {
        let bytes = encode_value_to_vec(&Value::Int(0x0102_0304)).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 3, 1, 2, 3, 4]);
    }

    #[test]
    fn short_string_is_one_chunk() {
        let bytes = encode_value_to_vec(&Value::Text("hi".into())).unwrap();
        // tag 1, chunk count 1, length 2, "hi"
        assert_eq!(bytes, vec![0, 0, 0, 1, 0, 0, 0, 1, 0, 2, b'h', b'i']);
    }

    #[test]
    fn chunking_splits_at_limit() {
        let s = "a".repeat(MAX_CHUNK_BYTES);
        assert_eq!(chunk_utf8(&s).len(), 1);
        let s = "a".repeat(MAX_CHUNK_BYTES + 1);
        let chunks = chunk_utf8(&s);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), MAX_CHUNK_BYTES);
        assert_eq!(chunks[1].len(), 1);
    }

    #[test]
    fn chunking_respects_char_boundaries() {
        // U+00E9 is two bytes; force a boundary to land mid-char.
        let s = "é".repeat(MAX_CHUNK_BYTES);
        let chunks = chunk_utf8(&s);
        for chunk in &chunks {
            assert!(chunk.len() <= MAX_CHUNK_BYTES);
            assert!(std::str::from_utf8(chunk.as_bytes()).is_ok());
        }
        let rejoined: String = chunks.concat();
        assert_eq!(rejoined, s);
    }

    #[test]
    fn oversized_utf_chunk_is_rejected() {
        let mut writer = ValueWriter::new(Vec::new());
        let big = "a".repeat(MAX_CHUNK_BYTES + 1);
        assert!(matches!(
            writer.write_utf(&big),
            Err(CodecError::InvalidLength(_))
        ));
    }
}

//! The closed tagged value union.

use std::hash::{Hash, Hasher};

/// Stable wire tags for the value union.
///
/// These numbers are part of the snapshot format and must never be
/// renumbered. Tag 9 is the legacy scalar date (decodes as an instant) and
/// tag 20 is the never-emitted date-array slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum TypeTag {
    /// Absent value.
    Null = 0,
    /// UTF-8 string.
    Text = 1,
    /// Interned symbolic name.
    Name = 2,
    /// 32-bit signed integer.
    Int = 3,
    /// 64-bit signed integer.
    Long = 4,
    /// 32-bit float.
    Float = 5,
    /// 64-bit float.
    Double = 6,
    /// Unicode scalar value.
    Char = 7,
    /// Boolean.
    Bool = 8,
    /// Legacy date; decodes as [`TypeTag::Instant`].
    Date = 9,
    /// Epoch milliseconds.
    Instant = 10,
    /// Reference to a named type.
    TypeRef = 11,
    /// Array of strings.
    Texts = 12,
    /// Array of symbolic names.
    Names = 13,
    /// Array of 32-bit integers (also the to-many relation payload).
    Ints = 14,
    /// Array of 64-bit integers.
    Longs = 15,
    /// Array of 32-bit floats.
    Floats = 16,
    /// Array of 64-bit floats.
    Doubles = 17,
    /// Array of booleans.
    Bools = 18,
    /// Array of chars.
    Chars = 19,
    /// Reserved date-array slot; never emitted.
    Dates = 20,
    /// Array of epoch-millisecond instants.
    Instants = 21,
    /// Structured literal (chunked textual composite).
    Structured = 22,
}

impl TypeTag {
    /// Maps a wire integer back to a tag, if recognized.
    #[must_use]
    pub fn from_wire(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(Self::Null),
            1 => Some(Self::Text),
            2 => Some(Self::Name),
            3 => Some(Self::Int),
            4 => Some(Self::Long),
            5 => Some(Self::Float),
            6 => Some(Self::Double),
            7 => Some(Self::Char),
            8 => Some(Self::Bool),
            9 => Some(Self::Date),
            10 => Some(Self::Instant),
            11 => Some(Self::TypeRef),
            12 => Some(Self::Texts),
            13 => Some(Self::Names),
            14 => Some(Self::Ints),
            15 => Some(Self::Longs),
            16 => Some(Self::Floats),
            17 => Some(Self::Doubles),
            18 => Some(Self::Bools),
            19 => Some(Self::Chars),
            20 => Some(Self::Dates),
            21 => Some(Self::Instants),
            22 => Some(Self::Structured),
            _ => None,
        }
    }

    /// The wire integer for this tag.
    #[must_use]
    pub const fn as_wire(self) -> i32 {
        self as i32
    }
}

/// A value stored against an attribute key.
///
/// This is the complete closed union the engine supports; every variant has
/// a stable wire tag. To-many relation values are [`Value::Ints`] holding a
/// sorted, duplicate-free array of related concept ids.
///
/// Equality and hashing are total: floats compare and hash by bit pattern
/// so values can key the unique indices.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value.
    Null,
    /// UTF-8 string.
    Text(String),
    /// Symbolic name (opaque immutable identifier).
    Name(String),
    /// 32-bit signed integer (also the to-one relation payload).
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Unicode scalar value.
    Char(char),
    /// Boolean.
    Bool(bool),
    /// Point in time as epoch milliseconds.
    Instant(i64),
    /// Reference to a named type.
    TypeRef(String),
    /// Array of strings.
    Texts(Vec<String>),
    /// Array of symbolic names.
    Names(Vec<String>),
    /// Array of 32-bit integers; to-many relations store sorted ids here.
    Ints(Vec<i32>),
    /// Array of 64-bit integers.
    Longs(Vec<i64>),
    /// Array of 32-bit floats.
    Floats(Vec<f32>),
    /// Array of 64-bit floats.
    Doubles(Vec<f64>),
    /// Array of booleans.
    Bools(Vec<bool>),
    /// Array of chars.
    Chars(Vec<char>),
    /// Array of epoch-millisecond instants.
    Instants(Vec<i64>),
    /// Structured literal: arbitrary nested composite data.
    Structured(serde_json::Value),
}

impl Value {
    /// The wire tag for this value.
    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Text(_) => TypeTag::Text,
            Value::Name(_) => TypeTag::Name,
            Value::Int(_) => TypeTag::Int,
            Value::Long(_) => TypeTag::Long,
            Value::Float(_) => TypeTag::Float,
            Value::Double(_) => TypeTag::Double,
            Value::Char(_) => TypeTag::Char,
            Value::Bool(_) => TypeTag::Bool,
            Value::Instant(_) => TypeTag::Instant,
            Value::TypeRef(_) => TypeTag::TypeRef,
            Value::Texts(_) => TypeTag::Texts,
            Value::Names(_) => TypeTag::Names,
            Value::Ints(_) => TypeTag::Ints,
            Value::Longs(_) => TypeTag::Longs,
            Value::Floats(_) => TypeTag::Floats,
            Value::Doubles(_) => TypeTag::Doubles,
            Value::Bools(_) => TypeTag::Bools,
            Value::Chars(_) => TypeTag::Chars,
            Value::Instants(_) => TypeTag::Instants,
            Value::Structured(_) => TypeTag::Structured,
        }
    }

    /// Check if this value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get this value as a boolean, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// True if this value is `Bool(true)`; used for tag attributes.
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// Get this value as a 32-bit integer, if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a 64-bit integer, if it is one.
    #[must_use]
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a string slice, if it is a text string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as a symbolic name, if it is one.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Value::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as a sorted id array, if it is an int array.
    ///
    /// This is the accessor the set algebra uses on to-many relations.
    #[must_use]
    pub fn as_ids(&self) -> Option<&[i32]> {
        match self {
            Value::Ints(ids) => Some(ids),
            _ => None,
        }
    }

    /// Get this value as an instant (epoch milliseconds), if it is one.
    #[must_use]
    pub fn as_instant(&self) -> Option<i64> {
        match self {
            Value::Instant(ms) => Some(*ms),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Text(a), Value::Text(b))
            | (Value::Name(a), Value::Name(b))
            | (Value::TypeRef(a), Value::TypeRef(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) | (Value::Instant(a), Value::Instant(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Texts(a), Value::Texts(b)) | (Value::Names(a), Value::Names(b)) => a == b,
            (Value::Ints(a), Value::Ints(b)) => a == b,
            (Value::Longs(a), Value::Longs(b)) | (Value::Instants(a), Value::Instants(b)) => a == b,
            (Value::Floats(a), Value::Floats(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Value::Doubles(a), Value::Doubles(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Value::Bools(a), Value::Bools(b)) => a == b,
            (Value::Chars(a), Value::Chars(b)) => a == b,
            (Value::Structured(a), Value::Structured(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().as_wire().hash(state);
        match self {
            Value::Null => {}
            Value::Text(s) | Value::Name(s) | Value::TypeRef(s) => s.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Long(n) | Value::Instant(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Double(f) => f.to_bits().hash(state),
            Value::Char(c) => c.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Texts(v) | Value::Names(v) => v.hash(state),
            Value::Ints(v) => v.hash(state),
            Value::Longs(v) | Value::Instants(v) => v.hash(state),
            Value::Floats(v) => {
                for f in v {
                    f.to_bits().hash(state);
                }
            }
            Value::Doubles(v) => {
                for f in v {
                    f.to_bits().hash(state);
                }
            }
            Value::Bools(v) => v.hash(state),
            Value::Chars(v) => v.hash(state),
            // serde_json::Value has no Hash; the default object map is
            // ordered, so the printed form is canonical for equal values.
            Value::Structured(v) => v.to_string().hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<i32>> for Value {
    fn from(v: Vec<i32>) -> Self {
        Value::Ints(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Structured(v)
    }
}

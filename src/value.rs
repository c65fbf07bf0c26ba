use bytes::Bytes;

use crate::row::Row;

/// A single column value in a row image.
///
/// The set of kinds is closed so the serializer can match every one of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Int64(i64),
    Int32(i32),
    Int16(i16),
    Int8(i8),
    Float64(f64),
    Float32(f32),
    Boolean(bool),
    /// Raw bytes, encoded on the wire as standard base64 text.
    Bytes(Bytes),
    /// Nested structure, encoded as an object in append order.
    Struct(Row),
}

impl Value {
    /// Short name of the kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Int64(_) => "int64",
            Value::Int32(_) => "int32",
            Value::Int16(_) => "int16",
            Value::Int8(_) => "int8",
            Value::Float64(_) => "float64",
            Value::Float32(_) => "float32",
            Value::Boolean(_) => "boolean",
            Value::Bytes(_) => "bytes",
            Value::Struct(_) => "struct",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Decimal in the Kafka Connect encoding: the unscaled value as minimal
    /// big-endian two's complement bytes. The scale lives in the schema.
    pub fn decimal(unscaled: i128) -> Self {
        let bytes = unscaled.to_be_bytes();
        let sign_byte = if unscaled < 0 { 0xff } else { 0x00 };
        let mut start = 0;
        while start < bytes.len() - 1
            && bytes[start] == sign_byte
            && (bytes[start + 1] & 0x80) == (sign_byte & 0x80)
        {
            start += 1;
        }
        Value::Bytes(Bytes::copy_from_slice(&bytes[start..]))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int8(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<Row> for Value {
    fn from(v: Row) -> Self {
        Value::Struct(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

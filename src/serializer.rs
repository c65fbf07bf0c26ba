//! Order-preserving JSON encoding for rows and change-event records.
//!
//! Rows are written straight from their `(name, value)` sequence through
//! `serialize_map`, so members come out in append order. They are never
//! collected into a keyed container first. Byte values are written as
//! standard base64 strings, matching the Kafka Connect JSON converter.
//!
//! Each record is validated before encoding and written into a buffer that is
//! only returned on success.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};

use crate::envelope::Envelope;
use crate::error::SerializationError;
use crate::row::Row;
use crate::schema::{Schema, TableSchema};
use crate::value::Value;

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::String(v) => serializer.serialize_str(v),
            Value::Int64(v) => serializer.serialize_i64(*v),
            Value::Int32(v) => serializer.serialize_i32(*v),
            Value::Int16(v) => serializer.serialize_i16(*v),
            Value::Int8(v) => serializer.serialize_i8(*v),
            Value::Float64(v) if v.is_finite() => serializer.serialize_f64(*v),
            Value::Float32(v) if v.is_finite() => serializer.serialize_f32(*v),
            Value::Float64(_) | Value::Float32(_) => {
                Err(S::Error::custom("non-finite float has no JSON literal"))
            }
            Value::Boolean(v) => serializer.serialize_bool(*v),
            Value::Bytes(v) => serializer.serialize_str(&STANDARD.encode(v)),
            Value::Struct(row) => row.serialize(serializer),
        }
    }
}

/// Top-level `{"schema": …, "payload": …}` record.
#[derive(Serialize)]
struct Record<'a, T: Serialize> {
    schema: &'a Schema,
    payload: &'a T,
}

/// Walks a row and reports the first value that has no JSON form.
fn check_row(row: &Row, prefix: &str) -> Result<(), SerializationError> {
    for (name, value) in row.iter() {
        match value {
            Value::Float64(v) if !v.is_finite() => {
                return Err(SerializationError::NonFiniteFloat {
                    column: format!("{}{}", prefix, name),
                    value: *v,
                });
            }
            Value::Float32(v) if !v.is_finite() => {
                return Err(SerializationError::NonFiniteFloat {
                    column: format!("{}{}", prefix, name),
                    value: f64::from(*v),
                });
            }
            Value::Struct(nested) => check_row(nested, &format!("{}{}.", prefix, name))?,
            _ => {}
        }
    }
    Ok(())
}

/// Encodes a row as a JSON object whose members follow append order.
pub fn serialize_row(row: &Row) -> Result<Vec<u8>, SerializationError> {
    check_row(row, "")?;
    Ok(serde_json::to_vec(row)?)
}

/// Encodes a full change-event record against its envelope schema.
pub fn serialize_envelope(
    schema: &Schema,
    envelope: &Envelope,
) -> Result<Vec<u8>, SerializationError> {
    if let Some(before) = &envelope.before {
        check_row(before, "before.")?;
    }
    if let Some(after) = &envelope.after {
        check_row(after, "after.")?;
    }
    Ok(serde_json::to_vec(&Record {
        schema,
        payload: envelope,
    })?)
}

/// Encodes a message key record: the key schema plus the key columns.
pub fn serialize_key(schema: &Schema, key: &Row) -> Result<Vec<u8>, SerializationError> {
    check_row(key, "")?;
    Ok(serde_json::to_vec(&Record { schema, payload: key })?)
}

impl TableSchema {
    /// Encodes the `(key, value)` byte pair for one change event of this table.
    pub fn encode(
        &self,
        key: &Row,
        envelope: &Envelope,
    ) -> Result<(Vec<u8>, Vec<u8>), SerializationError> {
        let key_bytes = serialize_key(self.key(), key)?;
        let value_bytes = serialize_envelope(self.envelope(), envelope)?;
        Ok((key_bytes, value_bytes))
    }
}

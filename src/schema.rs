//! Schema descriptors in the Kafka Connect JSON shape used by Debezium.
//!
//! Every builder here is a pure function: the same arguments always produce a
//! deep-equal tree. Trees for a table are meant to be built once and reused
//! for every change event of that table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

pub const DECIMAL_LOGICAL_NAME: &str = "org.apache.kafka.connect.data.Decimal";
pub const MICRO_TIME_LOGICAL_NAME: &str = "io.debezium.time.MicroTime";
pub const MICRO_TIMESTAMP_LOGICAL_NAME: &str = "io.debezium.time.MicroTimestamp";
pub const JSON_LOGICAL_NAME: &str = "io.debezium.data.Json";
pub const SOURCE_SCHEMA_NAME: &str = "io.debezium.connector.mysql.Source";

pub const DECIMAL_PRECISION_PARAM: &str = "connect.decimal.precision";
pub const DECIMAL_SCALE_PARAM: &str = "scale";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Struct,
    String,
    Int64,
    Int32,
    Int16,
    Int8,
    Bytes,
    Float64,
    Float32,
    Boolean,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Struct => "struct",
            SchemaType::String => "string",
            SchemaType::Int64 => "int64",
            SchemaType::Int32 => "int32",
            SchemaType::Int16 => "int16",
            SchemaType::Int8 => "int8",
            SchemaType::Bytes => "bytes",
            SchemaType::Float64 => "float64",
            SchemaType::Float32 => "float32",
            SchemaType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a schema tree.
///
/// `fields` is `Some` exactly when `schema_type` is [`SchemaType::Struct`];
/// the builder functions in this module keep that invariant. The order of
/// `fields` is the column order every row built against the schema must use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,
}

impl Schema {
    fn leaf(schema_type: SchemaType, optional: bool, field: &str) -> Self {
        Self {
            schema_type,
            optional,
            field: Some(field.to_string()),
            fields: None,
            name: None,
            version: None,
            parameters: None,
        }
    }

    fn structure(name: String, optional: bool, fields: Vec<Schema>) -> Self {
        Self {
            schema_type: SchemaType::Struct,
            optional,
            field: None,
            fields: Some(fields),
            name: Some(name),
            version: None,
            parameters: None,
        }
    }

    /// Child schemas of a struct node, empty for leaves.
    pub fn children(&self) -> &[Schema] {
        self.fields.as_deref().unwrap_or(&[])
    }

    pub fn is_struct(&self) -> bool {
        self.schema_type == SchemaType::Struct
    }
}

/// Which row image a value schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowImage {
    Before,
    After,
}

impl RowImage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowImage::Before => "before",
            RowImage::After => "after",
        }
    }
}

/// A primitive leaf field.
pub fn simple_field(schema_type: SchemaType, optional: bool, field: &str) -> Schema {
    Schema::leaf(schema_type, optional, field)
}

/// A `Decimal` logical field: bytes on the wire, precision and scale as
/// decimal-string parameters.
pub fn decimal_field(precision: u32, scale: u32, optional: bool, field: &str) -> Schema {
    let mut parameters = BTreeMap::new();
    parameters.insert(DECIMAL_PRECISION_PARAM.to_string(), precision.to_string());
    parameters.insert(DECIMAL_SCALE_PARAM.to_string(), scale.to_string());

    Schema {
        name: Some(DECIMAL_LOGICAL_NAME.to_string()),
        version: Some(1),
        parameters: Some(parameters),
        ..Schema::leaf(SchemaType::Bytes, optional, field)
    }
}

/// A `MicroTime` logical field: microseconds since midnight as int64.
pub fn time_field(optional: bool, field: &str) -> Schema {
    Schema {
        name: Some(MICRO_TIME_LOGICAL_NAME.to_string()),
        version: Some(1),
        ..Schema::leaf(SchemaType::Int64, optional, field)
    }
}

/// A `MicroTimestamp` logical field: microseconds since the epoch as int64.
pub fn timestamp_field(optional: bool, field: &str) -> Schema {
    Schema {
        name: Some(MICRO_TIMESTAMP_LOGICAL_NAME.to_string()),
        version: Some(1),
        ..Schema::leaf(SchemaType::Int64, optional, field)
    }
}

/// A `Json` logical field: JSON document carried as text.
pub fn json_field(optional: bool, field: &str) -> Schema {
    Schema {
        name: Some(JSON_LOGICAL_NAME.to_string()),
        ..Schema::leaf(SchemaType::String, optional, field)
    }
}

/// The fixed `source` block schema shared by every envelope.
///
/// Built on first access and never mutated afterwards; concurrent first
/// calls are serialized by the `OnceLock`.
pub fn source_schema() -> &'static Schema {
    static SOURCE: OnceLock<Schema> = OnceLock::new();
    SOURCE.get_or_init(|| {
        let fields = vec![
            simple_field(SchemaType::String, true, "version"),
            simple_field(SchemaType::String, false, "name"),
            simple_field(SchemaType::Int64, false, "server_id"),
            simple_field(SchemaType::Int64, false, "ts_sec"),
            simple_field(SchemaType::String, true, "gtid"),
            simple_field(SchemaType::String, false, "file"),
            simple_field(SchemaType::Int64, false, "pos"),
            simple_field(SchemaType::Int32, false, "row"),
            simple_field(SchemaType::Boolean, true, "snapshot"),
            simple_field(SchemaType::Int64, true, "thread"),
            simple_field(SchemaType::String, true, "db"),
            simple_field(SchemaType::String, true, "table"),
        ];
        Schema {
            field: Some("source".to_string()),
            ..Schema::structure(SOURCE_SCHEMA_NAME.to_string(), false, fields)
        }
    })
}

/// Message key schema, named `<table_ident>.Key`.
pub fn key_schema(table_ident: &str, key_fields: Vec<Schema>) -> Schema {
    Schema::structure(format!("{}.Key", table_ident), false, key_fields)
}

/// Row image schema, named `<table_ident>.Value`, placed under `before` or `after`.
pub fn row_value_schema(table_ident: &str, image: RowImage, column_fields: Vec<Schema>) -> Schema {
    Schema {
        field: Some(image.as_str().to_string()),
        ..Schema::structure(format!("{}.Value", table_ident), true, column_fields)
    }
}

/// Full envelope schema: before, after, source, op, ts_ms, in that order.
pub fn envelope_schema(table_ident: &str, column_fields: Vec<Schema>) -> Schema {
    let before = row_value_schema(table_ident, RowImage::Before, column_fields.clone());
    let after = row_value_schema(table_ident, RowImage::After, column_fields);

    let fields = vec![
        before,
        after,
        source_schema().clone(),
        simple_field(SchemaType::String, false, "op"),
        simple_field(SchemaType::Int64, true, "ts_ms"),
    ];

    Schema {
        version: Some(1),
        ..Schema::structure(format!("{}.Envelope", table_ident), false, fields)
    }
}

/// Key and envelope schemas for one table, built once and shared.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    table_ident: String,
    key: Schema,
    envelope: Schema,
}

impl TableSchema {
    pub fn new(
        table_ident: impl Into<String>,
        key_fields: Vec<Schema>,
        column_fields: Vec<Schema>,
    ) -> Self {
        let table_ident = table_ident.into();
        Self {
            key: key_schema(&table_ident, key_fields),
            envelope: envelope_schema(&table_ident, column_fields),
            table_ident,
        }
    }

    pub fn table_ident(&self) -> &str {
        &self.table_ident
    }

    pub fn key(&self) -> &Schema {
        &self.key
    }

    pub fn envelope(&self) -> &Schema {
        &self.envelope
    }

    /// Column schemas in canonical order (those of the `before` image).
    pub fn columns(&self) -> &[Schema] {
        self.envelope
            .children()
            .first()
            .map(Schema::children)
            .unwrap_or(&[])
    }
}

//! Debezium-compatible change-event envelopes.
//!
//! Build a [`TableSchema`] once per table, fill [`Row`]s in schema column
//! order for every change, [`assemble`] them into an [`Envelope`] and encode
//! with [`serializer`]. [`kafka::KafkaPublisher`] ships the bytes.

pub mod config;
pub mod envelope;
pub mod error;
pub mod row;
pub mod schema;
pub mod serializer;
pub mod time;
pub mod value;

pub mod kafka;

pub use config::Config;
pub use envelope::{assemble, Envelope, Operation, SourceMetadata};
pub use error::{DeliveryError, Error, Result, SerializationError};
pub use row::Row;
pub use schema::{Schema, SchemaType, TableSchema};
pub use value::Value;

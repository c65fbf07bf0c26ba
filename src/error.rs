//! Error types and result handling for cdc-envelope.
//!
//! Two failure kinds matter on the data path: [`SerializationError`], raised
//! when a record cannot be rendered, and [`DeliveryError`], raised when the
//! broker does not confirm a send. Both fold into the crate-wide [`Error`].
//!
//! # Example
//!
//! ```rust
//! use cdc_envelope::{Error, Result};
//!
//! fn load_settings() -> Result<()> {
//!     Err(Error::Config("missing kafka.brokers".to_string()))
//! }
//!
//! match load_settings() {
//!     Ok(()) => println!("Loaded"),
//!     Err(Error::Config(msg)) => eprintln!("Configuration error: {}", msg),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use rdkafka::error::KafkaError;
use thiserror::Error;

/// A record could not be rendered as JSON.
///
/// Serialization is all-or-nothing: when this is returned no bytes were
/// produced for the record.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// JSON has no literal for NaN or the infinities.
    #[error("column '{column}' holds non-finite float {value}, which JSON cannot represent")]
    NonFiniteFloat {
        /// Column (dotted for nested structs) holding the value
        column: String,
        /// The offending value
        value: f64,
    },

    /// The configured converter has no encoder in this crate.
    #[error("unsupported converter: {0}")]
    UnsupportedConverter(String),

    /// Underlying JSON writer failure.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// The broker did not confirm a send.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The producer or broker rejected the message.
    #[error("message rejected: {0}")]
    Rejected(#[from] KafkaError),

    /// The producer went away before the delivery report arrived.
    #[error("delivery report canceled before acknowledgement")]
    Canceled,
}

/// The main error type for cdc-envelope operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error, from the config file or environment variables.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A change event could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// A serialized record could not be delivered.
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Kafka client creation error.
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),
}

/// A convenient Result type alias for cdc-envelope operations.
///
/// This is equivalent to `std::result::Result<T, cdc_envelope::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

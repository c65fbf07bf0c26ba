use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SerializationError;
use crate::{Error, Result};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub kafka: KafkaConfig,
}

/// Wire format for message values.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Converter {
    #[default]
    Json,
    Avro,
}

impl Converter {
    /// Fails for converters this crate has no encoder for.
    pub fn ensure_supported(&self) -> std::result::Result<(), SerializationError> {
        match self {
            Converter::Json => Ok(()),
            Converter::Avro => Err(SerializationError::UnsupportedConverter(
                "avro (requires a schema registry)".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    pub topic: String,
    #[serde(default)]
    pub converter: Converter,
    #[serde(default = "default_acks")]
    pub acks: String,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,
}

impl Config {
    /// Loads a TOML file, then overlays `CDC_ENVELOPE_*` environment variables
    /// (`__` separates nesting levels, e.g. `CDC_ENVELOPE_KAFKA__TOPIC`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("CDC_ENVELOPE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))
    }
}

impl KafkaConfig {
    /// Topic for a table: `<topic>.<table_ident>`.
    pub fn topic_name(&self, table_ident: &str) -> String {
        format!("{}.{}", self.topic, table_ident)
    }
}

fn default_acks() -> String {
    "all".to_string()
}

fn default_compression() -> String {
    "none".to_string()
}

fn default_message_timeout_ms() -> u64 {
    30_000
}

#![allow(dead_code)]

use cdc_envelope::kafka::{DeliveryReceipt, Publisher};
use cdc_envelope::DeliveryError;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::sync::Mutex;

/// A message captured by [`RecordingPublisher`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub topic: String,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// In-memory publisher that records every send and assigns sequential offsets.
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Publisher for RecordingPublisher {
    fn send(
        &self,
        topic: &str,
        key: &[u8],
        value: &[u8],
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentMessage {
            topic: topic.to_string(),
            key: key.to_vec(),
            value: value.to_vec(),
        });
        Ok(DeliveryReceipt {
            partition: 0,
            offset: sent.len() as i64 - 1,
        })
    }
}

/// Publisher whose broker always times out.
pub struct FailingPublisher;

impl Publisher for FailingPublisher {
    fn send(
        &self,
        _topic: &str,
        _key: &[u8],
        _value: &[u8],
    ) -> Result<DeliveryReceipt, DeliveryError> {
        Err(DeliveryError::Rejected(KafkaError::MessageProduction(
            RDKafkaErrorCode::MessageTimedOut,
        )))
    }
}

/// A JSON value read back with object members kept in document order at
/// every depth.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderedValue {
    Object(Vec<(String, OrderedValue)>),
    Array(Vec<OrderedValue>),
    Scalar(serde_json::Value),
}

impl OrderedValue {
    pub fn object<K: Into<String>>(members: impl IntoIterator<Item = (K, OrderedValue)>) -> Self {
        OrderedValue::Object(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn scalar(value: impl Into<serde_json::Value>) -> Self {
        OrderedValue::Scalar(value.into())
    }
}

impl<'de> Deserialize<'de> for OrderedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = OrderedValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("any JSON value")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<OrderedValue, E> {
                Ok(OrderedValue::scalar(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<OrderedValue, E> {
                Ok(OrderedValue::scalar(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<OrderedValue, E> {
                Ok(OrderedValue::scalar(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<OrderedValue, E> {
                Ok(OrderedValue::scalar(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<OrderedValue, E> {
                Ok(OrderedValue::scalar(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<OrderedValue, E> {
                Ok(OrderedValue::scalar(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<OrderedValue, E> {
                Ok(OrderedValue::Scalar(serde_json::Value::Null))
            }

            fn visit_none<E: de::Error>(self) -> Result<OrderedValue, E> {
                Ok(OrderedValue::Scalar(serde_json::Value::Null))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<OrderedValue, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element::<OrderedValue>()? {
                    items.push(item);
                }
                Ok(OrderedValue::Array(items))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<OrderedValue, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, OrderedValue>()? {
                    entries.push((key, value));
                }
                Ok(OrderedValue::Object(entries))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// A JSON object read back with its members in document order.
#[derive(Debug, PartialEq)]
pub struct OrderedObject(pub Vec<(String, OrderedValue)>);

impl OrderedObject {
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes).expect("valid JSON") {
            OrderedValue::Object(members) => OrderedObject(members),
            other => panic!("expected a JSON object, got {:?}", other),
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|(k, _)| k.as_str()).collect()
    }
}

/// Extracts the raw text of `"<member>":{...}` from a serialized record so
/// nested member order can be checked without re-parsing into a map.
pub fn raw_member<'a>(text: &'a str, member: &str) -> &'a str {
    let marker = format!("\"{}\":", member);
    let start = text.find(&marker).expect("member present") + marker.len();
    let rest = &text[start..];
    if rest.starts_with("null") {
        return "null";
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return &rest[..=i];
                }
            }
            _ => {}
        }
    }
    panic!("unterminated object for member {}", member)
}

use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use tracing::{debug, trace};

use super::publisher::{DeliveryReceipt, Publisher};
use crate::config::KafkaConfig;
use crate::error::DeliveryError;
use crate::{Error, Result};

/// [`Publisher`] backed by an rdkafka producer.
///
/// librdkafka's internal resend is disabled so a failed delivery is reported
/// exactly once. The per-message timeout comes from `message_timeout_ms`.
pub struct KafkaPublisher {
    producer: FutureProducer,
}

impl KafkaPublisher {
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("compression.type", &config.compression)
            .set("acks", &config.acks)
            .set("message.timeout.ms", config.message_timeout_ms.to_string())
            .set("message.send.max.retries", "0")
            .create()
            .map_err(Error::Kafka)?;

        debug!(brokers = ?config.brokers, acks = %config.acks, "Created Kafka producer");
        Ok(Self { producer })
    }

    /// Sends and awaits the delivery report without blocking the runtime thread.
    pub async fn send_async(
        &self,
        topic: &str,
        key: &[u8],
        value: &[u8],
    ) -> std::result::Result<DeliveryReceipt, DeliveryError> {
        let record = FutureRecord::to(topic).key(key).payload(value);
        let delivery = self
            .producer
            .send_result(record)
            .map_err(|(e, _)| DeliveryError::Rejected(e))?;

        let (partition, offset) = delivery
            .await
            .map_err(|_| DeliveryError::Canceled)?
            .map_err(|(e, _)| DeliveryError::Rejected(e))?;

        trace!(topic, partition, offset, "Delivered message");
        Ok(DeliveryReceipt { partition, offset })
    }
}

impl Publisher for KafkaPublisher {
    /// Blocks the calling thread until the broker acknowledges. Do not call
    /// from an async task; use [`KafkaPublisher::send_async`] there.
    fn send(
        &self,
        topic: &str,
        key: &[u8],
        value: &[u8],
    ) -> std::result::Result<DeliveryReceipt, DeliveryError> {
        futures::executor::block_on(self.send_async(topic, key, value))
    }
}

use tracing::trace;

use super::publisher::{DeliveryReceipt, Publisher};
use crate::config::Converter;
use crate::envelope::Envelope;
use crate::row::Row;
use crate::schema::TableSchema;
use crate::Result;

/// Encodes change events for a table and hands them to a [`Publisher`].
pub struct ChangeEmitter<P> {
    publisher: P,
}

impl<P: Publisher> ChangeEmitter<P> {
    pub fn new(publisher: P, converter: Converter) -> Result<Self> {
        converter.ensure_supported()?;
        Ok(Self { publisher })
    }

    /// Serializes the key and envelope, then sends them in one blocking call.
    ///
    /// Nothing is sent if serialization fails.
    pub fn emit(
        &self,
        topic: &str,
        table: &TableSchema,
        key: &Row,
        envelope: &Envelope,
    ) -> Result<DeliveryReceipt> {
        let (key_bytes, value_bytes) = table.encode(key, envelope)?;
        let receipt = self.publisher.send(topic, &key_bytes, &value_bytes)?;

        trace!(
            topic,
            table = %table.table_ident(),
            op = %envelope.op,
            partition = receipt.partition,
            offset = receipt.offset,
            "Emitted change event"
        );
        Ok(receipt)
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn into_inner(self) -> P {
        self.publisher
    }
}

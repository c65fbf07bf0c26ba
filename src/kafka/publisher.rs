use crate::error::DeliveryError;

/// Where the broker stored an accepted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub partition: i32,
    pub offset: i64,
}

/// Transport that accepts serialized change events.
///
/// `send` blocks until the transport confirms acceptance or fails, and never
/// retries on its own. Retry and backoff belong to the caller.
pub trait Publisher {
    fn send(&self, topic: &str, key: &[u8], value: &[u8]) -> Result<DeliveryReceipt, DeliveryError>;
}

impl<P: Publisher + ?Sized> Publisher for &P {
    fn send(
        &self,
        topic: &str,
        key: &[u8],
        value: &[u8],
    ) -> Result<DeliveryReceipt, DeliveryError> {
        (**self).send(topic, key, value)
    }
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn send(
        &self,
        topic: &str,
        key: &[u8],
        value: &[u8],
    ) -> Result<DeliveryReceipt, DeliveryError> {
        (**self).send(topic, key, value)
    }
}

pub mod emitter;
pub mod producer;
pub mod publisher;

pub use emitter::ChangeEmitter;
pub use producer::KafkaPublisher;
pub use publisher::{DeliveryReceipt, Publisher};

pub mod log;

#[cfg(feature = "events-kafka")]
pub mod kafka;

pub use log::LogEventBus;

#[cfg(feature = "events-kafka")]
pub use kafka::KafkaEventBus;

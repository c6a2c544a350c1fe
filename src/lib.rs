//! Мост между push-подпиской pub/sub по шаблону и потребителем, который
//! забирает сообщения по одному в собственном цикле и никогда не ждёт.

/// Configuration loading (defaults, file, `LOGSPOUT_*` environment).
pub mod config;
/// Error taxonomy for the transport, broker and bridge.
pub mod error;
/// Tracing subscriber initialisation (console and file sinks).
pub mod logging;
/// Pub/Sub: broker, transport ports, message queue, subscriber callbacks.
pub mod pubsub;
/// Subscription Worker, Poll Bridge and the downstream record contract.
pub mod spout;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// config
pub use crate::config::SpoutConfig;
/// Operation errors and result types.
pub use error::{RecvError, SpoutError, SpoutResult, TransportError};
/// Logging.
pub use logging::{init_logging, LogFormat, LoggingConfig, LoggingError, LoggingHandle};
/// Pub/Sub API.
pub use pubsub::{
    Broker, BrokerPool, ChannelMessage, Connection, ConnectionPool, Message, PatternSubscriber,
    PatternSubscription, PooledConnection, SubscriptionHandle,
};
/// Bridge API.
pub use spout::{
    Fields, IdleStrategy, LifecycleState, OutputCollector, PubSubSpout, Record, SleepIdle,
    SpoutContext, SubscriptionWorker, WorkerStatus, OUTPUT_FIELDS,
};

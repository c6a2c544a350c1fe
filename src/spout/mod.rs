//! Мост между push-подпиской и опрашивающим потребителем.
//!
//! - `bridge`: [`PubSubSpout`], неблокирующий опрос и жизненный цикл.
//! - `collector`: схема полей, запись и приёмник потребителя.
//! - `idle`: политика простоя при пустой очереди.
//! - `lifecycle`: состояния жизненного цикла.
//! - `worker`: фоновая задача подписки по шаблону.

pub mod bridge;
pub mod collector;
pub mod idle;
pub mod lifecycle;
pub mod worker;

pub use bridge::PubSubSpout;
pub use collector::{
    Fields, OutputCollector, Record, SpoutContext, MESSAGE_FIELD, OUTPUT_FIELDS, SOURCE_FIELD,
};
pub use idle::{IdleStrategy, SleepIdle};
pub use lifecycle::LifecycleState;
pub use worker::{SubscriptionWorker, WorkerStatus};

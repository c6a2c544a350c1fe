//! Подсистема Publish–Subscribe (pub/sub).
//!
//! - `broker`: внутрипроцессный брокер с подписками по шаблонам.
//! - `message`: сообщения брокера и сообщения, ожидающие опроса.
//! - `pool`: пул соединений к брокеру, реализующий транспортные порты.
//! - `queue`: неограниченная FIFO-очередь между подпиской и потребителем.
//! - `subscriber`: поверхность обратных вызовов подписки по шаблону.
//! - `subscription`: приёмник шаблонной подписки брокера.
//! - `transport`: порты пула соединений, соединения и дескриптора подписки.

pub mod broker;
pub mod message;
pub mod pool;
pub mod queue;
pub mod subscriber;
pub mod subscription;
pub mod transport;

pub use broker::*;
pub use message::*;
pub use pool::*;
pub use queue::*;
pub use subscriber::*;
pub use subscription::*;
pub use transport::*;

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Сообщение, доставленное подпиской и ожидающее опроса потребителем.
///
/// Неизменяемое значение без идентичности: создаётся Subscription Worker'ом
/// на каждую доставку и отбрасывается мостом после извлечения из очереди.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub channel: String,
    pub payload: String,
}

/// Сообщение внутри брокера: имя канала и сырые байты полезной нагрузки.
#[derive(Debug, Clone)]
pub struct Message {
    pub channel: Arc<str>,
    pub payload: Bytes,
}

impl ChannelMessage {
    pub fn new(
        channel: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

impl Message {
    pub fn new(
        channel: impl Into<Arc<str>>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }

    /// Декодирует полезную нагрузку как UTF-8, заменяя некорректные
    /// последовательности на `U+FFFD`.
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

//! Контракт с нижестоящим потребителем: схема полей, запись и приёмник.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::pubsub::ChannelMessage;

pub const SOURCE_FIELD: &str = "source";
pub const MESSAGE_FIELD: &str = "message";

/// Схема выходных полей: `["source", "message"]` в этом порядке.
///
/// Объявляется один раз и не вычисляется для каждого сообщения.
pub const OUTPUT_FIELDS: Fields = Fields::new(&[SOURCE_FIELD, MESSAGE_FIELD]);

/// Упорядоченный список имён полей записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields(&'static [&'static str]);

impl Fields {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self(names)
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Позиция поля в записи.
    pub fn index_of(
        &self,
        name: &str,
    ) -> Option<usize> {
        self.0.iter().position(|field| *field == name)
    }
}

/// Запись, отправляемая потребителю на каждый успешный опрос.
///
/// Порядок полей в сериализации совпадает с [`OUTPUT_FIELDS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub source: String,
    pub message: String,
}

impl Record {
    /// Значения в порядке [`OUTPUT_FIELDS`].
    pub fn values(&self) -> [&str; 2] {
        [self.source.as_str(), self.message.as_str()]
    }

    pub fn get(
        &self,
        field: &str,
    ) -> Option<&str> {
        OUTPUT_FIELDS.index_of(field).map(|i| self.values()[i])
    }
}

impl From<ChannelMessage> for Record {
    fn from(message: ChannelMessage) -> Self {
        Self {
            source: message.channel,
            message: message.payload,
        }
    }
}

/// Приёмник записей нижестоящего потребителя.
pub trait OutputCollector: Send {
    fn emit(
        &mut self,
        record: Record,
    );
}

impl OutputCollector for mpsc::UnboundedSender<Record> {
    fn emit(
        &mut self,
        record: Record,
    ) {
        if self.send(record).is_err() {
            tracing::trace!("record receiver is gone, record dropped");
        }
    }
}

impl OutputCollector for Vec<Record> {
    fn emit(
        &mut self,
        record: Record,
    ) {
        self.push(record);
    }
}

/// Контекст компонента, переданный средой выполнения при открытии.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoutContext {
    pub component_id: String,
    pub task_id: u32,
}

impl Default for SpoutContext {
    fn default() -> Self {
        Self {
            component_id: "logspout".to_string(),
            task_id: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет фиксированную схему полей.
    #[test]
    fn test_output_fields() {
        assert_eq!(OUTPUT_FIELDS.names(), &["source", "message"]);
        assert_eq!(OUTPUT_FIELDS.len(), 2);
        assert_eq!(OUTPUT_FIELDS.index_of("source"), Some(0));
        assert_eq!(OUTPUT_FIELDS.index_of("message"), Some(1));
        assert_eq!(OUTPUT_FIELDS.index_of("payload"), None);
    }

    /// Тест проверяет отображение сообщения в запись и порядок полей.
    #[test]
    fn test_record_from_message() {
        let record = Record::from(ChannelMessage::new("log.app1", "hello"));

        assert_eq!(record.values(), ["log.app1", "hello"]);
        assert_eq!(record.get("source"), Some("log.app1"));
        assert_eq!(record.get("message"), Some("hello"));
        assert_eq!(record.get("channel"), None);
    }

    /// Тест проверяет, что сериализация сохраняет порядок полей.
    #[test]
    fn test_record_json_field_order() {
        let record = Record::from(ChannelMessage::new("log.app1", "hello"));

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"source":"log.app1","message":"hello"}"#
        );
    }

    /// Тест проверяет приёмник на основе канала.
    #[test]
    fn test_channel_collector() {
        let (mut tx, mut rx) = mpsc::unbounded_channel::<Record>();

        tx.emit(Record::from(ChannelMessage::new("log.a", "1")));
        assert_eq!(rx.try_recv().unwrap().source, "log.a");

        drop(rx);
        tx.emit(Record::from(ChannelMessage::new("log.a", "2")));
    }
}

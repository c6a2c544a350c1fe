//! Поверхность обратных вызовов подписки по шаблону.

use tracing::trace;

use super::{ChannelMessage, QueueProducer};

/// Обработчик событий pub/sub подписки.
///
/// Обязательны только два обработчика доставки сообщений. Подтверждения
/// подписки/отписки по умолчанию игнорируются: они нужны лишь для
/// соблюдения протокола транспорта.
///
/// Транспорт вызывает обработчики последовательно из одного контекста
/// выполнения, поэтому методы принимают `&mut self`.
pub trait PatternSubscriber: Send {
    /// Доставка сообщения по совпадению с шаблоном.
    fn on_pattern_message(
        &mut self,
        pattern: &str,
        channel: &str,
        payload: &str,
    );

    /// Доставка сообщения по точной подписке на канал.
    fn on_message(
        &mut self,
        channel: &str,
        payload: &str,
    );

    /// Подтверждение подписки на канал.
    fn on_subscribe(
        &mut self,
        _channel: &str,
        _subscriptions: usize,
    ) {
    }

    /// Подтверждение отписки от канала.
    fn on_unsubscribe(
        &mut self,
        _channel: &str,
        _subscriptions: usize,
    ) {
    }

    /// Подтверждение подписки по шаблону.
    fn on_psubscribe(
        &mut self,
        _pattern: &str,
        _subscriptions: usize,
    ) {
    }

    /// Подтверждение отписки от шаблона.
    fn on_punsubscribe(
        &mut self,
        _pattern: &str,
        _subscriptions: usize,
    ) {
    }
}

/// Подписчик, складывающий каждую доставку в очередь сообщений.
///
/// Сам не фильтрует каналы: отсев несовпадающих имён выполняет транспорт.
#[derive(Debug)]
pub struct QueueingSubscriber {
    queue: QueueProducer,
}

impl QueueingSubscriber {
    pub fn new(queue: QueueProducer) -> Self {
        Self { queue }
    }

    fn enqueue(
        &self,
        channel: &str,
        payload: &str,
    ) {
        if !self.queue.push(ChannelMessage::new(channel, payload)) {
            trace!(channel, "consumer is gone, message dropped");
        }
    }
}

impl PatternSubscriber for QueueingSubscriber {
    fn on_pattern_message(
        &mut self,
        _pattern: &str,
        channel: &str,
        payload: &str,
    ) {
        self.enqueue(channel, payload);
    }

    fn on_message(
        &mut self,
        channel: &str,
        payload: &str,
    ) {
        self.enqueue(channel, payload);
    }
}

//! Очередь сообщений между Subscription Worker'ом и опрашивающим
//! потребителем.
//!
//! Очередь неограниченная: вставка никогда не ждёт и не тормозит приём
//! сообщений транспортом. Платой за это является рост памяти при
//! устойчивой перегрузке потребителя; публикатор замедлить нельзя.
//!
//! Ровно один производитель и ровно один потребитель. Порядок вставки
//! совпадает с порядком выдачи (FIFO, без дедупликации).

use tokio::sync::mpsc;

use super::ChannelMessage;

/// Сторона производителя. Принадлежит Subscription Worker'у.
#[derive(Debug)]
pub struct QueueProducer {
    tx: mpsc::UnboundedSender<ChannelMessage>,
}

/// Сторона потребителя. Принадлежит мосту опроса.
#[derive(Debug)]
pub struct QueueConsumer {
    rx: mpsc::UnboundedReceiver<ChannelMessage>,
}

/// Создаёт новую пару производитель/потребитель поверх общей очереди.
pub fn message_queue() -> (QueueProducer, QueueConsumer) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueProducer { tx }, QueueConsumer { rx })
}

impl QueueProducer {
    /// Добавляет сообщение в конец очереди.
    ///
    /// Никогда не блокирует. Возвращает `false`, если потребитель уже
    /// удалён (мост остановлен) и сообщение отброшено.
    pub fn push(
        &self,
        message: ChannelMessage,
    ) -> bool {
        self.tx.send(message).is_ok()
    }

    /// Проверяет, удалена ли сторона потребителя.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl QueueConsumer {
    /// Извлекает следующее сообщение, не ожидая его появления.
    ///
    /// Пустая очередь и очередь без производителя неотличимы: в обоих
    /// случаях возвращается `None`.
    pub fn try_pop(&mut self) -> Option<ChannelMessage> {
        self.rx.try_recv().ok()
    }

    /// Количество сообщений, ожидающих извлечения.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

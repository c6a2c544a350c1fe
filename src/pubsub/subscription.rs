use std::sync::Weak;

use globset::Glob;
use tokio::sync::broadcast;

use super::{broker::PatternMap, Message};
use crate::RecvError;

/// Подписка на каналы брокера по glob-паттерну.
///
/// Использует [`globset::Glob`] для сопоставления имён каналов
/// и получает сообщения из всех каналов, подходящих под шаблон.
///
/// Отписка происходит автоматически при `Drop`. Если это была последняя
/// подписка на шаблон, шаблон удаляется из брокера.
pub struct PatternSubscription {
    /// Внутренний приёмник для входящих сообщений.
    pub(crate) inner: broadcast::Receiver<Message>,
    /// Удаляется после `inner`: к моменту проверки приёмник уже закрыт.
    pub(crate) release: PatternRelease,
}

/// Удаляет запись шаблона из брокера, когда у неё не осталось приёмников.
pub(crate) struct PatternRelease {
    pub(crate) pattern: Glob,
    pub(crate) patterns: Weak<PatternMap>,
}

impl PatternSubscription {
    /// Асинхронно ожидает следующее сообщение, соответствующее паттерну.
    ///
    /// # Возвращает
    /// - `Ok(Message)` при успешном получении сообщения
    /// - `Err(RecvError::Closed)` если шаблон удалён из брокера
    /// - `Err(RecvError::Lagged(n))` если приёмник отстал на `n` сообщений
    pub async fn recv(&mut self) -> Result<Message, RecvError> {
        self.inner.recv().await.map_err(Into::into)
    }

    /// Явно отписаться от шаблона. Аналогично `drop(self)`.
    pub fn unsubscribe(self) {}

    /// Возвращает паттерн подписки.
    pub fn pattern(&self) -> &Glob {
        &self.release.pattern
    }

    /// Количество сообщений в очереди на получение.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Drop for PatternRelease {
    fn drop(&mut self) {
        let Some(patterns) = self.patterns.upgrade() else {
            return;
        };
        // Проверка и удаление идут под блокировкой шарда, поэтому
        // параллельная `psubscribe` либо уже подписалась, либо создаст
        // новую запись.
        patterns.remove_if(&self.pattern, |_, entry| entry.tx.receiver_count() == 0);
    }
}

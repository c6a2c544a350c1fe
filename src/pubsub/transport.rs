//! Порты транспортного слоя pub/sub.
//!
//! Ядро знает о транспорте только через эти трейты: пул соединений,
//! соединение с блокирующей подпиской по шаблону и дескриптор подписки,
//! отмена которого является единственным сигналом завершения цикла
//! приёма.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::trace;

use super::PatternSubscriber;
use crate::TransportError;

/// Пул соединений транспорта.
///
/// Передаётся в ядро явно (через конструктор), а не берётся из
/// глобального состояния.
#[async_trait]
pub trait ConnectionPool: Send + Sync + 'static {
    /// Выдаёт соединение во временное исключительное пользование.
    async fn acquire(&self) -> Result<Box<dyn Connection>, TransportError>;

    /// Возвращает соединение в пул.
    fn release(
        &self,
        connection: Box<dyn Connection>,
    );
}

/// Соединение с pub/sub источником.
#[async_trait]
pub trait Connection: Send + 'static {
    /// Подписывается на все каналы, совпадающие с `pattern`, и доставляет
    /// события в `subscriber` до отмены `handle`.
    ///
    /// Завершается `Ok(())` после отписки и `Err` при сбое транспорта.
    /// Каналы, не совпадающие с шаблоном, в `subscriber` не передаются.
    async fn psubscribe(
        &mut self,
        pattern: &str,
        subscriber: &mut dyn PatternSubscriber,
        handle: &SubscriptionHandle,
    ) -> Result<(), TransportError>;
}

/// Дескриптор живой подписки.
///
/// Отписка идемпотентна и «липкая»: если `unsubscribe` вызван до того, как
/// цикл приёма начал ожидание, цикл всё равно увидит её и завершится.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    state: Arc<watch::Sender<bool>>,
}

impl SubscriptionHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Запрашивает отписку. Блокирующий вызов `psubscribe` вернётся.
    pub fn unsubscribe(&self) {
        self.state.send_replace(true);
    }

    pub fn is_unsubscribed(&self) -> bool {
        *self.state.borrow()
    }

    /// Ожидает запроса на отписку.
    pub async fn unsubscribed(&self) {
        let mut rx = self.state.subscribe();
        // Отправитель живёт в `self`, поэтому ошибка закрытия невозможна.
        let _ = rx.wait_for(|unsubscribed| *unsubscribed).await;
    }
}

impl Default for SubscriptionHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Соединение, взятое из пула с гарантированным возвратом.
///
/// Возврат выполняется ровно один раз в `Drop`: при обычном выходе, при
/// ошибке и при отмене задачи, владеющей соединением.
pub struct PooledConnection {
    pool: Arc<dyn ConnectionPool>,
    connection: Option<Box<dyn Connection>>,
}

impl PooledConnection {
    pub async fn acquire(pool: Arc<dyn ConnectionPool>) -> Result<Self, TransportError> {
        let connection = pool.acquire().await?;
        trace!("connection acquired from pool");
        Ok(Self {
            pool,
            connection: Some(connection),
        })
    }

    /// См. [`Connection::psubscribe`].
    pub async fn psubscribe(
        &mut self,
        pattern: &str,
        subscriber: &mut dyn PatternSubscriber,
        handle: &SubscriptionHandle,
    ) -> Result<(), TransportError> {
        match self.connection.as_mut() {
            Some(connection) => connection.psubscribe(pattern, subscriber, handle).await,
            None => Err(TransportError::Closed),
        }
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.release(connection);
            trace!("connection released to pool");
        }
    }
}

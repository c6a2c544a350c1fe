//! Пул соединений к внутрипроцессному [`Broker`].
//!
//! Позволяет встроить мост без внешнего сервера: каждое соединение
//! подписывается на брокер напрямую, а пул ограничивает число
//! одновременно выданных соединений.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Broker, Connection, ConnectionPool, PatternSubscriber, SubscriptionHandle};
use crate::{RecvError, TransportError};

/// Ограниченный пул соединений к брокеру.
pub struct BrokerPool {
    broker: Arc<Broker>,
    max_connections: usize,
    in_use: AtomicUsize,
}

/// Соединение с брокером, выданное [`BrokerPool`].
pub struct BrokerConnection {
    broker: Arc<Broker>,
}

impl BrokerPool {
    pub fn new(
        broker: Arc<Broker>,
        max_connections: usize,
    ) -> Self {
        Self {
            broker,
            max_connections,
            in_use: AtomicUsize::new(0),
        }
    }

    /// Количество соединений, выданных и ещё не возвращённых.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    pub fn broker(&self) -> &Arc<Broker> {
        &self.broker
    }
}

#[async_trait]
impl ConnectionPool for BrokerPool {
    async fn acquire(&self) -> Result<Box<dyn Connection>, TransportError> {
        let max = self.max_connections;
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .map_err(|_| TransportError::PoolExhausted { max })?;

        Ok(Box::new(BrokerConnection {
            broker: self.broker.clone(),
        }))
    }

    fn release(
        &self,
        _connection: Box<dyn Connection>,
    ) {
        let _ = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }
}

#[async_trait]
impl Connection for BrokerConnection {
    async fn psubscribe(
        &mut self,
        pattern: &str,
        subscriber: &mut dyn PatternSubscriber,
        handle: &SubscriptionHandle,
    ) -> Result<(), TransportError> {
        let mut subscription = self.broker.psubscribe(pattern)?;
        subscriber.on_psubscribe(pattern, 1);
        debug!(pattern, "pattern subscription established");

        loop {
            tokio::select! {
                biased;
                _ = handle.unsubscribed() => break,
                received = subscription.recv() => match received {
                    Ok(message) => subscriber.on_pattern_message(
                        pattern,
                        &message.channel,
                        &message.payload_lossy(),
                    ),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(pattern, skipped, "pattern subscription lagged, messages skipped");
                    }
                    Err(RecvError::Closed) => return Err(TransportError::Closed),
                },
            }
        }

        // Последняя подписка на шаблон удаляет его из брокера.
        drop(subscription);
        subscriber.on_punsubscribe(pattern, 0);
        debug!(pattern, "pattern subscription closed");
        Ok(())
    }
}

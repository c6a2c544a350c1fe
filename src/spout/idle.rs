use std::time::Duration;

use async_trait::async_trait;

/// Политика простоя потребителя при пустой очереди.
///
/// Принадлежит циклу опроса, а не мосту: интервал настраивается без
/// изменения Subscription Worker'а.
#[async_trait]
pub trait IdleStrategy: Send + Sync {
    async fn idle(
        &self,
        interval: Duration,
    );
}

/// Простой через `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepIdle;

#[async_trait]
impl IdleStrategy for SleepIdle {
    async fn idle(
        &self,
        interval: Duration,
    ) {
        tokio::time::sleep(interval).await;
    }
}

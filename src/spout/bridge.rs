//! Poll Bridge: неблокирующая выдача сообщений циклу потребителя.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{
    IdleStrategy, LifecycleState, OutputCollector, Record, SleepIdle, SpoutContext,
    SubscriptionWorker, WorkerStatus, OUTPUT_FIELDS,
};
use crate::{
    pubsub::{message_queue, ChannelMessage, ConnectionPool, QueueConsumer},
    Fields, SpoutConfig, SpoutError, SpoutResult,
};

/// Мост между подпиской по шаблону и потребителем, который сам решает,
/// когда запросить следующее сообщение.
///
/// Жизненный цикл: [`open`](Self::open) запускает Subscription Worker,
/// [`next_tuple`](Self::next_tuple) вызывается потребителем в цикле,
/// [`close`](Self::close) отписывается и завершает фоновую задачу.
/// Сообщения, оставшиеся в очереди при закрытии, отбрасываются.
///
/// После `close` [`poll_next`](Self::poll_next) всегда возвращает `None`,
/// а `next_tuple` возвращает [`SpoutError::NotRunning`]. Worker повторно не
/// запускается.
pub struct PubSubSpout {
    pool: Arc<dyn ConnectionPool>,
    config: SpoutConfig,
    idle: Arc<dyn IdleStrategy>,
    state: LifecycleState,
    context: SpoutContext,
    queue: Option<QueueConsumer>,
    worker: Option<SubscriptionWorker>,
    collector: Option<Box<dyn OutputCollector>>,
}

impl PubSubSpout {
    pub fn new(
        pool: Arc<dyn ConnectionPool>,
        config: SpoutConfig,
    ) -> Self {
        Self {
            pool,
            config,
            idle: Arc::new(SleepIdle),
            state: LifecycleState::Uninitialized,
            context: SpoutContext::default(),
            queue: None,
            worker: None,
            collector: None,
        }
    }

    /// Заменяет политику простоя при пустой очереди.
    pub fn with_idle_strategy(
        mut self,
        idle: Arc<dyn IdleStrategy>,
    ) -> Self {
        self.idle = idle;
        self
    }

    /// Схема выходных записей. Статична и не зависит от сообщений.
    pub fn declare_output_fields() -> Fields {
        OUTPUT_FIELDS
    }

    /// Выделяет очередь и запускает Subscription Worker.
    ///
    /// Не ждёт подтверждения подписки: опрос пустой очереди сразу после
    /// открытия просто возвращает `None`.
    pub fn open(
        &mut self,
        context: SpoutContext,
        collector: Box<dyn OutputCollector>,
    ) -> SpoutResult<()> {
        if self.state != LifecycleState::Uninitialized {
            return Err(SpoutError::InvalidState {
                expected: LifecycleState::Uninitialized,
                actual: self.state,
            });
        }
        let pattern = self.config.subscription_pattern()?;

        self.state = LifecycleState::Starting;
        let (producer, consumer) = message_queue();
        let worker = match SubscriptionWorker::start(self.pool.clone(), pattern, producer) {
            Ok(worker) => worker,
            Err(err) => {
                self.state = LifecycleState::Uninitialized;
                return Err(err);
            }
        };

        info!(
            component = %context.component_id,
            task_id = context.task_id,
            pattern = worker.pattern(),
            idle_interval_ms = self.config.idle_interval_ms,
            "spout opened"
        );

        self.queue = Some(consumer);
        self.worker = Some(worker);
        self.collector = Some(collector);
        self.context = context;
        self.state = LifecycleState::Running;
        Ok(())
    }

    /// Извлекает следующее сообщение, если оно уже есть.
    ///
    /// Никогда не ждёт. Вне состояния `RUNNING` всегда возвращает `None`.
    pub fn poll_next(&mut self) -> Option<ChannelMessage> {
        if !self.state.is_running() {
            return None;
        }
        self.queue.as_mut()?.try_pop()
    }

    /// Один шаг цикла потребителя.
    ///
    /// При наличии сообщения отправляет ровно одну запись
    /// `(source, message)` в приёмник и возвращает `Ok(true)`. При пустой
    /// очереди выдерживает интервал простоя и возвращает `Ok(false)`.
    pub async fn next_tuple(&mut self) -> SpoutResult<bool> {
        if !self.state.is_running() {
            return Err(SpoutError::NotRunning(self.state));
        }

        match self.poll_next() {
            Some(message) => {
                if let Some(collector) = self.collector.as_mut() {
                    collector.emit(Record::from(message));
                }
                Ok(true)
            }
            None => {
                self.idle.idle(self.config.idle_interval()).await;
                Ok(false)
            }
        }
    }

    /// Отписывается, завершает фоновую задачу и освобождает очередь.
    ///
    /// Закрытие неоткрытого моста переводит его сразу в `STOPPED`.
    /// Повторное закрытие ничего не делает.
    pub async fn close(&mut self) -> SpoutResult<()> {
        match self.state {
            LifecycleState::Running | LifecycleState::Starting => {}
            LifecycleState::Uninitialized => {
                self.state = LifecycleState::Stopped;
                return Ok(());
            }
            LifecycleState::Stopping | LifecycleState::Stopped => return Ok(()),
        }

        self.state = LifecycleState::Stopping;
        let result = match self.worker.as_mut() {
            Some(worker) => worker.stop().await,
            None => Ok(()),
        };
        if let Some(WorkerStatus::Failed(reason)) = self.worker_status() {
            warn!(%reason, "subscription worker had failed before close");
        }

        if let Some(queue) = self.queue.take() {
            if !queue.is_empty() {
                warn!(
                    abandoned = queue.len(),
                    "discarding buffered messages on close"
                );
            }
        }
        self.collector = None;
        self.state = LifecycleState::Stopped;
        debug!(component = %self.context.component_id, "spout closed");
        result
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Состояние фоновой подписки; `None`, если worker не запускался.
    /// После `close` сохраняет итоговый статус, включая `Failed`.
    ///
    /// Сбой подписки не доходит до потребителя в виде ошибки: без этой
    /// проверки он проявляется только как отсутствие сообщений.
    pub fn worker_status(&self) -> Option<WorkerStatus> {
        self.worker.as_ref().map(SubscriptionWorker::status)
    }

    /// Количество сообщений, ожидающих опроса.
    pub fn pending(&self) -> usize {
        self.queue.as_ref().map_or(0, QueueConsumer::len)
    }

    pub fn config(&self) -> &SpoutConfig {
        &self.config
    }

    pub fn context(&self) -> &SpoutContext {
        &self.context
    }
}

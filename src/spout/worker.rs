//! Subscription Worker: долгоживущая подписка по шаблону, переводящая
//! каждую доставку в запись очереди сообщений.
//!
//! Цикл приёма выполняется в отдельной задаче tokio и является
//! единственной блокирующей операцией системы. Соединение берётся из пула
//! через [`PooledConnection`] и возвращается ровно один раз, как только
//! цикл приёма завершился или задача была прервана.

use std::{any::Any, sync::Arc};

use parking_lot::Mutex;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, error, info, info_span, Instrument};

use crate::{
    pubsub::{
        ConnectionPool, PooledConnection, QueueProducer, QueueingSubscriber, SubscriptionHandle,
    },
    SpoutError, SpoutResult,
};

/// Наблюдаемое состояние фоновой задачи подписки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Задача запущена, соединение ещё не получено.
    Starting,
    /// Подписка выдана транспорту, цикл приёма активен.
    Subscribed,
    /// Цикл приёма завершился после отписки или остановки.
    Exited,
    /// Получение соединения, подписка или цикл приёма завершились ошибкой.
    Failed(String),
}

/// Запущенный Subscription Worker.
pub struct SubscriptionWorker {
    pattern: String,
    handle: Arc<Mutex<Option<SubscriptionHandle>>>,
    status: Arc<Mutex<WorkerStatus>>,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionWorker {
    /// Планирует цикл подписки в текущем рантайме tokio и сразу
    /// возвращается.
    ///
    /// Ошибки получения соединения и подписки не возвращаются отсюда: они
    /// завершают фоновую задачу и видны через [`SubscriptionWorker::status`].
    /// Повторных попыток нет.
    pub fn start(
        pool: Arc<dyn ConnectionPool>,
        pattern: impl Into<String>,
        queue: QueueProducer,
    ) -> SpoutResult<Self> {
        let runtime = Handle::try_current().map_err(|_| SpoutError::NoRuntime)?;
        let pattern = pattern.into();
        let handle = Arc::new(Mutex::new(None));
        let status = Arc::new(Mutex::new(WorkerStatus::Starting));

        let span = info_span!("subscription_worker", pattern = %pattern);
        let task = runtime.spawn(
            run(
                pool,
                pattern.clone(),
                queue,
                handle.clone(),
                status.clone(),
            )
            .instrument(span),
        );

        Ok(Self {
            pattern,
            handle,
            status,
            task: Some(task),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn status(&self) -> WorkerStatus {
        self.status.lock().clone()
    }

    /// Подписка установлена и может быть отменена отпиской.
    pub fn is_ready(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Отписывается и принудительно завершает фоновую задачу.
    ///
    /// Если подписка ещё не установлена, отписка пропускается и задача
    /// просто прерывается. После возврата задача гарантированно завершена,
    /// а соединение возвращено в пул. Итоговый статус остаётся доступен
    /// через [`SubscriptionWorker::status`]; повторный вызов ничего не делает.
    pub async fn stop(&mut self) -> SpoutResult<()> {
        self.unsubscribe();

        let Some(task) = self.task.take() else {
            return Ok(());
        };
        task.abort();

        let outcome = match task.await {
            Ok(()) => Ok(()),
            Err(err) if err.is_cancelled() => Ok(()),
            Err(err) => {
                let reason = panic_reason(err.into_panic());
                error!(pattern = %self.pattern, %reason, "subscription worker panicked");
                *self.status.lock() = WorkerStatus::Failed(reason.clone());
                Err(SpoutError::WorkerPanicked(reason))
            }
        };

        let mut status = self.status.lock();
        if !matches!(*status, WorkerStatus::Failed(_)) {
            *status = WorkerStatus::Exited;
        }
        outcome
    }

    fn unsubscribe(&self) {
        let handle = self.handle.lock().take();
        match handle {
            Some(handle) => {
                debug!(pattern = %self.pattern, "unsubscribing");
                handle.unsubscribe();
            }
            None => {
                debug!(
                    pattern = %self.pattern,
                    "stop requested before subscription was established"
                );
            }
        }
    }
}

impl Drop for SubscriptionWorker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.unsubscribe();
            task.abort();
        }
    }
}

async fn run(
    pool: Arc<dyn ConnectionPool>,
    pattern: String,
    queue: QueueProducer,
    handle: Arc<Mutex<Option<SubscriptionHandle>>>,
    status: Arc<Mutex<WorkerStatus>>,
) {
    let outcome = subscribe(pool, &pattern, queue, &handle, &status).await;

    let mut status = status.lock();
    match outcome {
        Ok(()) => {
            info!("subscription worker exited");
            *status = WorkerStatus::Exited;
        }
        Err(err) => {
            error!(error = %err, "subscription worker failed");
            *status = WorkerStatus::Failed(err.to_string());
        }
    }
}

async fn subscribe(
    pool: Arc<dyn ConnectionPool>,
    pattern: &str,
    queue: QueueProducer,
    handle_slot: &Mutex<Option<SubscriptionHandle>>,
    status: &Mutex<WorkerStatus>,
) -> SpoutResult<()> {
    let mut connection = PooledConnection::acquire(pool)
        .await
        .map_err(SpoutError::ConnectionAcquisition)?;

    let handle = SubscriptionHandle::new();
    *handle_slot.lock() = Some(handle.clone());
    *status.lock() = WorkerStatus::Subscribed;
    info!("subscribing");

    let mut subscriber = QueueingSubscriber::new(queue);
    let result = connection
        .psubscribe(pattern, &mut subscriber, &handle)
        .await
        .map_err(SpoutError::Subscription);

    // Возврат в пул сразу после выхода из цикла приёма.
    drop(connection);
    result
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

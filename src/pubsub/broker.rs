use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use bytes::Bytes;
use dashmap::DashMap;
use globset::{Glob, GlobMatcher};
use tokio::sync::broadcast;

use super::{Message, PatternRelease, PatternSubscription};
use crate::TransportError;

/// Отправитель шаблонной подписки вместе со скомпилированным матчером.
pub(crate) struct PatternEntry {
    matcher: GlobMatcher,
    pub(crate) tx: broadcast::Sender<Message>,
}

/// Шаблоны каналов → `Sender`.
pub(crate) type PatternMap = DashMap<Glob, PatternEntry>;

/// Внутрипроцессный брокер Pub/Sub сообщений с подписками по шаблонам
/// (glob).
///
/// Шаблон живёт, пока у него есть хотя бы одна [`PatternSubscription`]:
/// последняя подписка при `Drop` удаляет запись из брокера.
pub struct Broker {
    patterns: Arc<PatternMap>,
    /// Ёмкость буфера каждого `broadcast::channel`
    default_capacity: usize,
    /// Общее количество вызовов `publish`
    pub publish_count: AtomicUsize,
}

impl Broker {
    /// Создаёт новый `Broker` с заданной буферной ёмкостью.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            patterns: Arc::new(DashMap::new()),
            default_capacity: default_capacity.max(1),
            publish_count: AtomicUsize::new(0),
        }
    }

    /// Подписка по шаблону (glob), например `"log.*"` или `"a?c"`.
    ///
    /// Повторная подписка на тот же шаблон получит тот же `Sender`.
    pub fn psubscribe(
        &self,
        pattern: &str,
    ) -> Result<PatternSubscription, TransportError> {
        let glob = Glob::new(pattern)?;
        // Приёмник создаётся под блокировкой шарда, чтобы запись не была
        // удалена между вставкой и подпиской.
        let inner = self
            .patterns
            .entry(glob.clone())
            .or_insert_with(|| PatternEntry {
                matcher: glob.compile_matcher(),
                tx: broadcast::channel(self.default_capacity).0,
            })
            .tx
            .subscribe();
        Ok(PatternSubscription {
            inner,
            release: PatternRelease {
                pattern: glob,
                patterns: Arc::downgrade(&self.patterns),
            },
        })
    }

    /// Отписка от шаблона. Удаляет соответствующий `Sender`, все
    /// приёмники этого шаблона получат `Closed`.
    pub fn punsubscribe(
        &self,
        pattern: &str,
    ) -> Result<(), TransportError> {
        let glob = Glob::new(pattern)?;
        self.patterns.remove(&glob);
        Ok(())
    }

    /// Публикация сообщения всем подписчикам, чей шаблон совпадает с
    /// именем канала.
    ///
    /// Возвращает количество приёмников, получивших сообщение.
    pub fn publish(
        &self,
        channel: &str,
        payload: Bytes,
    ) -> usize {
        self.publish_count.fetch_add(1, Ordering::Relaxed);

        let channel: Arc<str> = Arc::from(channel);
        let mut delivered = 0;
        for entry in self.patterns.iter() {
            if entry.value().matcher.is_match(&*channel) {
                if let Ok(n) = entry
                    .value()
                    .tx
                    .send(Message::new(channel.clone(), payload.clone()))
                {
                    delivered += n;
                }
            }
        }
        delivered
    }

    /// Количество зарегистрированных шаблонов.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

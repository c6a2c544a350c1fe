use std::{hint::black_box, sync::Arc};

use bytes::Bytes;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use logspout::{
    pubsub::{message_queue, QueueingSubscriber},
    Broker, BrokerPool, ChannelMessage, PatternSubscriber, PubSubSpout, SpoutConfig,
    SpoutContext,
};

fn bench_queue_push_pop(c: &mut Criterion) {
    let (producer, mut consumer) = message_queue();
    c.bench_function("queue_push_pop", |b| {
        b.iter(|| {
            producer.push(ChannelMessage::new("log.app1", "hello"));
            black_box(consumer.try_pop());
        })
    });
}

fn bench_poll_empty(c: &mut Criterion) {
    let (_producer, mut consumer) = message_queue();
    c.bench_function("queue_poll_empty", |b| {
        b.iter(|| black_box(consumer.try_pop()))
    });
}

fn bench_subscriber_delivery(c: &mut Criterion) {
    let (producer, mut consumer) = message_queue();
    let mut subscriber = QueueingSubscriber::new(producer);
    c.bench_function("subscriber_on_pattern_message", |b| {
        b.iter(|| {
            subscriber.on_pattern_message("log.*", black_box("log.app1"), black_box("payload"));
            consumer.try_pop();
        })
    });
}

fn bench_broker_publish_pattern(c: &mut Criterion) {
    let broker = Broker::new(1024);
    let _psub = broker.psubscribe("log.*").unwrap();
    c.bench_function("broker_publish_1_pattern", |b| {
        b.iter(|| broker.publish(black_box("log.app1"), Bytes::from_static(b"x")))
    });
}

fn bench_spout_end_to_end(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let _guard = runtime.enter();

    c.bench_function("spout_publish_and_poll_100", |b| {
        b.iter_batched(
            || {
                let broker = Arc::new(Broker::new(1024));
                let pool = Arc::new(BrokerPool::new(broker.clone(), 1));
                let mut spout = PubSubSpout::new(pool, SpoutConfig::default());
                spout
                    .open(SpoutContext::default(), Box::new(Vec::new()))
                    .unwrap();
                while broker.pattern_count() == 0 {
                    std::thread::yield_now();
                }
                (broker, spout)
            },
            |(broker, mut spout)| {
                for i in 0..100u32 {
                    broker.publish("log.bench", Bytes::from(i.to_string()));
                }
                let mut received = 0;
                while received < 100 {
                    if spout.poll_next().is_some() {
                        received += 1;
                    }
                }
                runtime.block_on(spout.close()).unwrap();
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_queue_push_pop,
    bench_poll_empty,
    bench_subscriber_delivery,
    bench_broker_publish_pattern,
    bench_spout_end_to_end
);
criterion_main!(benches);

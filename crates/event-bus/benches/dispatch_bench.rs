use std::sync::Arc;

use common::CorrelationId;
use criterion::{Criterion, criterion_group, criterion_main};
use event_bus::{
    DispatchContext, DomainEvent, DomainEventHandle, DomainEventRecord, DomainEvents,
    FixedCorrelation, callbacks,
};
use persistence::{InMemoryStore, UnitOfWork, UnitOfWorkFactory};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
struct Tick {
    n: u64,
}

impl DomainEvent for Tick {
    fn event_type(&self) -> &'static str {
        "Tick"
    }
}

fn recording_bus() -> DomainEvents<Tick> {
    let handle = Arc::new(DomainEventHandle::new(Arc::new(FixedCorrelation(
        CorrelationId::new(),
    ))));
    DomainEvents::<Tick>::builder().register("Tick", handle).build()
}

fn bench_raise_without_handlers(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let bus = DomainEvents::<Tick>::empty();
    let store = InMemoryStore::new();

    c.bench_function("event_bus/raise_no_handlers", |b| {
        b.iter(|| {
            rt.block_on(async {
                let uow = store.begin();
                let records = uow.repository::<DomainEventRecord>();
                let ctx = DispatchContext::new(records.as_ref());
                bus.raise(&Tick { n: 1 }, &ctx).await.unwrap();
            });
        });
    });
}

fn bench_raise_and_commit_100_records(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let bus = recording_bus();

    c.bench_function("event_bus/record_and_commit_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryStore::new();
                let uow = store.begin();
                let records = uow.repository::<DomainEventRecord>();
                let ctx = DispatchContext::new(records.as_ref());
                for n in 0..100 {
                    bus.raise(&Tick { n }, &ctx).await.unwrap();
                }
                uow.commit().await.unwrap();
            });
        });
    });
}

fn bench_raise_with_callbacks(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let bus = DomainEvents::<Tick>::empty();
    let store = InMemoryStore::new();

    c.bench_function("event_bus/raise_with_10_callbacks", |b| {
        b.iter(|| {
            rt.block_on(callbacks::scope(async {
                for _ in 0..10 {
                    callbacks::register("Tick", |event: &Tick| {
                        std::hint::black_box(event.n);
                    });
                }
                let uow = store.begin();
                let records = uow.repository::<DomainEventRecord>();
                let ctx = DispatchContext::new(records.as_ref());
                bus.raise(&Tick { n: 1 }, &ctx).await.unwrap();
            }));
        });
    });
}

criterion_group!(
    benches,
    bench_raise_without_handlers,
    bench_raise_and_commit_100_records,
    bench_raise_with_callbacks
);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::NaiveDate;
use std::sync::{Arc, Barrier};
use std::thread;

use stockledger_core::ProductId;
use stockledger_products::{InMemoryProductStore, ProductStore, RetryPolicy};
use stockledger_reconciliation::{ReconciliationConfig, ReconciliationService};

fn pid(i: usize) -> ProductId {
    ProductId::new(format!("p{i}")).unwrap()
}

fn seeded_service(products: usize, stock: i64) -> ReconciliationService<InMemoryProductStore> {
    let service = ReconciliationService::in_memory();
    for i in 0..products {
        service
            .register_product(pid(i), format!("Product {i}"), stock)
            .unwrap();
    }
    service
}

fn bench_commit_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit_latency");
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    group.bench_function("delivery", |b| {
        let service = seeded_service(1, 0);
        b.iter(|| {
            service
                .commit_delivery(&pid(0), black_box(5), date, "restock")
                .unwrap();
        });
    });

    group.bench_function("pick", |b| {
        let service = seeded_service(1, i64::MAX / 2);
        b.iter(|| {
            service.commit_pick(&pid(0), black_box(1), "order").unwrap();
        });
    });

    group.bench_function("insufficient_stock_rejection", |b| {
        let service = seeded_service(1, 0);
        b.iter(|| {
            let _ = service.commit_pick(&pid(0), black_box(1), "order");
        });
    });

    group.finish();
}

/// Threads hammering one product (serialized) vs one product each (independent).
fn bench_adjust_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("adjust_stock_contention");
    let threads = 4;
    let per_thread = 1_000;
    group.throughput(Throughput::Elements((threads * per_thread) as u64));

    for shared in [true, false] {
        let label = if shared { "same_product" } else { "distinct_products" };
        group.bench_with_input(BenchmarkId::new("in_memory", label), &shared, |b, &shared| {
            b.iter(|| {
                let store = Arc::new(InMemoryProductStore::new());
                for i in 0..threads {
                    store
                        .insert(stockledger_products::Product::new(pid(i), "P", 0).unwrap())
                        .unwrap();
                }
                let barrier = Arc::new(Barrier::new(threads));
                let handles: Vec<_> = (0..threads)
                    .map(|i| {
                        let store = store.clone();
                        let barrier = barrier.clone();
                        let target = if shared { pid(0) } else { pid(i) };
                        thread::spawn(move || {
                            barrier.wait();
                            for _ in 0..per_thread {
                                store.adjust_stock(&target, 1).unwrap();
                            }
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

fn bench_optimistic_backend(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimistic_backend");
    let config = ReconciliationConfig {
        retry: RetryPolicy::immediate(1_000),
    };

    group.bench_function("uncontended_delivery", |b| {
        let service = ReconciliationService::with_backend(InMemoryProductStore::new(), &config);
        service.register_product(pid(0), "P", 0).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        b.iter(|| {
            service
                .commit_delivery(&pid(0), black_box(1), date, "restock")
                .unwrap();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_commit_latency,
    bench_adjust_contention,
    bench_optimistic_backend
);
criterion_main!(benches);

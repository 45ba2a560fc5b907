//! Performance benchmarks for branchsync-engine

use branchsync_engine::{EmployeeFields, Snapshot, Store, Timestamp};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn ts(minute: usize, second: usize) -> Timestamp {
    Timestamp::parse(&format!("2024-01-01 10:{:02}:{:02}", minute % 60, second % 60)).unwrap()
}

fn populated(node: &str, size: usize, offset: usize, minute: usize) -> Store {
    let mut store = Store::new(node);
    for i in 0..size {
        let id = format!("{:08}", i + offset);
        let fields = EmployeeFields::new(format!("Name {}", i), "Surname", "Clerk");
        let _ = store.create(&id, fields, &ts(minute, i));
    }
    store
}

fn bench_store_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_operations");

    group.bench_function("create", |b| {
        let mut store = Store::new("node1");
        let mut id = 0u64;

        b.iter(|| {
            id += 1;
            store.create(
                black_box(&id.to_string()),
                EmployeeFields::new("Ana", "Gomez", "Clerk"),
                &ts(0, 0),
            )
        })
    });

    group.bench_function("read", |b| {
        let mut store = populated("node1", 1000, 0, 0);
        let mut tick = 0usize;

        b.iter(|| {
            tick += 1;
            store.read(black_box("00000500"), &ts(tick / 60, tick))
        })
    });

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("half_overlap", size), size, |b, &size| {
            let local = populated("local", size, 0, 1);
            let remote = populated("remote", size, size / 2, 2).snapshot();

            b.iter(|| {
                let mut store = local.clone();
                store.merge(black_box(&remote), &ts(30, 0))
            })
        });

        group.bench_with_input(BenchmarkId::new("replay", size), size, |b, &size| {
            let remote = populated("remote", size, 0, 2).snapshot();
            let mut store = Store::new("local");
            store.merge(&remote, &ts(30, 0));

            b.iter(|| store.plan_merge(black_box(&remote), &ts(31, 0)))
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("export", size), size, |b, &size| {
            let store = populated("node1", size, 0, 0);
            b.iter(|| black_box(&store).snapshot())
        });

        group.bench_with_input(BenchmarkId::new("from_json", size), size, |b, &size| {
            let json = populated("node1", size, 0, 0).snapshot().to_json().unwrap();
            b.iter(|| Snapshot::from_json(black_box(&json)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_store_operations, bench_merge, bench_snapshot);
criterion_main!(benches);

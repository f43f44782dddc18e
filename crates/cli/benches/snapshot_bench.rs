use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use skiplist::SkipList;
use snapshot::{SnapshotReader, SnapshotWriter};
use tempfile::tempdir;

const N: usize = 5_000;
const VAL_SIZE: usize = 100;

fn filled_list() -> SkipList<String, String> {
    let list = SkipList::with_seed(16, 7);
    for i in 0..N {
        let _ = list.insert(format!("k{:06}", i), "x".repeat(VAL_SIZE));
    }
    list
}

fn snapshot_dump(c: &mut Criterion) {
    let list = filled_list();
    c.bench_function("snapshot_dump_5k", |b| {
        b.iter_batched(
            || tempdir().unwrap(),
            |dir| {
                let path = dir.path().join("dumpFile");
                SnapshotWriter::dump(&path, &list).unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

fn snapshot_load(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dumpFile");
    SnapshotWriter::dump(&path, &filled_list()).unwrap();

    c.bench_function("snapshot_load_5k", |b| {
        b.iter(|| {
            let fresh: SkipList<String, String> = SkipList::with_seed(16, 7);
            SnapshotReader::open(&path)
                .unwrap()
                .load_into(&fresh)
                .unwrap();
            criterion::black_box(fresh.len());
        });
    });
}

criterion_group!(benches, snapshot_dump, snapshot_load);
criterion_main!(benches);

use std::hint::black_box;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use graph_search::data_structures::keyed_priority_queue::KeyedPriorityQueue;

fn random_priorities(len: usize, seed: u64) -> Vec<(usize, u32)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|e| (e, rng.random_range(0..1_000_000))).collect()
}

fn fill(elements: &[(usize, u32)]) -> KeyedPriorityQueue<usize, u32> {
    let mut queue = KeyedPriorityQueue::with_capacity(elements.len());
    for &(e, p) in elements {
        queue.enqueue(e, p).unwrap();
    }
    queue
}

fn queue_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("KeyedPriorityQueue");

    for len in [1_000, 10_000, 100_000] {
        let elements = random_priorities(len, 0);

        group.bench_with_input(BenchmarkId::new("enqueue", len), &elements, |b, e| {
            b.iter(|| black_box(fill(e)))
        });
        group.bench_with_input(BenchmarkId::new("drain", len), &elements, |b, e| {
            b.iter_batched(
                || fill(e),
                |mut queue| {
                    while let Ok(top) = queue.dequeue() {
                        black_box(top);
                    }
                },
                criterion::BatchSize::LargeInput,
            )
        });
        group.bench_with_input(
            BenchmarkId::new("increase_priority", len),
            &elements,
            |b, e| {
                b.iter_batched(
                    || fill(e),
                    |mut queue| {
                        for &(e, p) in e.iter().step_by(3) {
                            queue.increase_priority(&e, p + 1_000_000).unwrap();
                        }
                        queue
                    },
                    criterion::BatchSize::LargeInput,
                )
            },
        );
    }
    group.finish();
}

criterion_group!(benches, queue_operations);
criterion_main!(benches);

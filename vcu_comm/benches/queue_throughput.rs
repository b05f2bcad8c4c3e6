//! Link queue micro-benchmark.
//!
//! Measures the hand-off cost of the bounded queue on the paths the pumps
//! and the control loop hit every frame:
//! - uncontended enqueue/dequeue pair
//! - rejected enqueue on a full queue with a zero timeout
//! - cross-thread hand-off through a 10-slot request queue

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use vcu_comm::RequestQueue;
use vcu_common::frame::RequestFrame;

const HANDOFF_BATCH: usize = 1_000;

fn bench_uncontended_pair(c: &mut Criterion) {
    let queue = RequestQueue::new();
    let frame = RequestFrame::new([0x01, 0x02, 0x03]);

    c.bench_function("enqueue_dequeue_pair", |b| {
        b.iter(|| {
            queue.enqueue(black_box(frame), Duration::ZERO).ok();
            black_box(queue.dequeue())
        });
    });
}

fn bench_full_rejection(c: &mut Criterion) {
    let queue = RequestQueue::new();
    while queue.enqueue(RequestFrame::zeroed(), Duration::ZERO).is_ok() {}

    c.bench_function("enqueue_full_zero_timeout", |b| {
        b.iter(|| black_box(queue.enqueue(RequestFrame::zeroed(), Duration::ZERO)));
    });
}

fn bench_cross_thread_handoff(c: &mut Criterion) {
    c.bench_function("cross_thread_handoff_1000", |b| {
        b.iter(|| {
            let queue = Arc::new(RequestQueue::new());
            let producer = {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..HANDOFF_BATCH {
                        let frame = RequestFrame::new([i as u8, 0, 0]);
                        while queue.enqueue(frame, Duration::from_millis(200)).is_err() {}
                    }
                })
            };
            for _ in 0..HANDOFF_BATCH {
                black_box(queue.dequeue());
            }
            producer.join().ok();
        });
    });
}

criterion_group!(
    benches,
    bench_uncontended_pair,
    bench_full_rejection,
    bench_cross_thread_handoff
);
criterion_main!(benches);

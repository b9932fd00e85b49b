//! Benchmarks for the bridge queue and message encoding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reviewstream::bridge::BridgeQueue;
use reviewstream::core::{Envelope, Message};
use reviewstream::testing::fixtures;
use std::sync::Arc;
use std::thread;

fn result_message() -> Message {
    Message::result("Security Architect", Some(fixtures::security_review()))
}

fn push_pop_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("bridge_queue");

    for count in [9_u64, 100, 1_000] {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("push_then_drain", count), &count, |b, &count| {
            let message = result_message();
            b.iter(|| {
                let queue = BridgeQueue::new();
                for sequence in 0..count {
                    queue.push(Envelope::new(sequence, message.clone()));
                }
                while let Some(envelope) = queue.try_pop() {
                    black_box(envelope);
                }
            });
        });
    }

    group.bench_function("concurrent_producer", |b| {
        let message = result_message();
        b.iter(|| {
            let queue = Arc::new(BridgeQueue::new());
            let producer = {
                let queue = Arc::clone(&queue);
                let message = message.clone();
                thread::spawn(move || {
                    for sequence in 0..1_000 {
                        queue.push(Envelope::new(sequence, message.clone()));
                    }
                })
            };

            let mut received = 0;
            while received < 1_000 {
                if let Some(envelope) = queue.try_pop() {
                    black_box(envelope);
                    received += 1;
                } else {
                    thread::yield_now();
                }
            }
            producer.join().unwrap();
        });
    });

    group.finish();
}

fn encode_benchmark(c: &mut Criterion) {
    let thinking = Message::thinking("Librarian", "Cataloguing components and interactions...");
    let result = result_message();
    let completed = Message::completed(Some(fixtures::review_report()), "done");

    c.bench_function("encode_thinking", |b| b.iter(|| black_box(&thinking).to_ndjson()));
    c.bench_function("encode_result", |b| b.iter(|| black_box(&result).to_ndjson()));
    c.bench_function("encode_completed", |b| b.iter(|| black_box(&completed).to_ndjson()));
}

criterion_group!(benches, push_pop_benchmark, encode_benchmark);
criterion_main!(benches);

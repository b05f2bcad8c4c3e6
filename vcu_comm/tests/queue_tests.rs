//! Bounded queue behaviour tests.
//!
//! FIFO ordering, timeout semantics on a full queue, the capacity-2
//! walkthrough, and loss/duplication checks under concurrent producers.

use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use vcu_comm::{BoundedQueue, QueueError};

#[test]
fn test_capacity_two_walkthrough() {
    let queue: BoundedQueue<[u8; 1], 2> = BoundedQueue::new();

    assert_eq!(queue.enqueue([0x01], Duration::ZERO), Ok(()));
    assert_eq!(queue.enqueue([0x02], Duration::ZERO), Ok(()));

    assert_eq!(
        queue.enqueue([0x03], Duration::ZERO),
        Err(QueueError::TimedOut {
            timeout: Duration::ZERO
        })
    );
    assert_eq!(queue.snapshot().as_slice(), &[[0x01], [0x02]]);

    assert_eq!(queue.dequeue(), [0x01]);
    assert_eq!(queue.enqueue([0x03], Duration::ZERO), Ok(()));
    assert_eq!(queue.snapshot().as_slice(), &[[0x02], [0x03]]);
}

#[test]
fn test_blocked_producer_resumes_when_space_frees() {
    let queue: Arc<BoundedQueue<u32, 1>> = Arc::new(BoundedQueue::new());
    queue.enqueue(1, Duration::ZERO).unwrap();

    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.enqueue(2, Duration::from_secs(5)))
    };

    thread::sleep(Duration::from_millis(20));
    assert_eq!(queue.dequeue(), 1);
    assert_eq!(producer.join().unwrap(), Ok(()));
    assert_eq!(queue.dequeue(), 2);
}

#[test]
fn test_blocked_consumer_wakes_on_enqueue() {
    let queue: Arc<BoundedQueue<u32, 4>> = Arc::new(BoundedQueue::new());

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.dequeue())
    };

    thread::sleep(Duration::from_millis(20));
    queue.enqueue(99, Duration::ZERO).unwrap();
    assert_eq!(consumer.join().unwrap(), 99);
}

#[test]
fn test_timeout_window_is_honoured() {
    let queue: BoundedQueue<u8, 1> = BoundedQueue::new();
    queue.enqueue(0, Duration::ZERO).unwrap();

    let timeout = Duration::from_millis(50);
    let start = Instant::now();
    assert!(queue.enqueue(1, timeout).is_err());
    let waited = start.elapsed();
    assert!(waited >= timeout, "returned after {:?}", waited);
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_concurrent_producers_single_consumer() {
    const PRODUCERS: u32 = 4;
    const PER_PRODUCER: u32 = 500;

    let queue: Arc<BoundedQueue<u32, 10>> = Arc::new(BoundedQueue::new());

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut accepted = Vec::new();
                for i in 0..PER_PRODUCER {
                    let item = p * PER_PRODUCER + i;
                    // Short timeout: some sends time out under contention.
                    if queue.enqueue(item, Duration::from_micros(200)).is_ok() {
                        accepted.push(item);
                    }
                }
                accepted
            })
        })
        .collect();

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut seen = Vec::new();
            let idle_limit = Duration::from_millis(500);
            let mut idle_since = Instant::now();
            loop {
                match queue.try_dequeue() {
                    Some(item) => {
                        seen.push(item);
                        idle_since = Instant::now();
                    }
                    None if idle_since.elapsed() > idle_limit => break,
                    None => thread::yield_now(),
                }
            }
            seen
        })
    };

    let mut accepted = HashSet::new();
    let mut per_producer_order: Vec<Vec<u32>> = Vec::new();
    for handle in producers {
        let items = handle.join().unwrap();
        per_producer_order.push(items.clone());
        accepted.extend(items);
    }
    let mut seen = consumer.join().unwrap();
    // Anything accepted after the consumer went idle is still queued.
    while let Some(item) = queue.try_dequeue() {
        seen.push(item);
    }

    // No loss, no duplication.
    assert_eq!(seen.len(), accepted.len());
    let seen_set: HashSet<u32> = seen.iter().copied().collect();
    assert_eq!(seen_set, accepted);

    // Each producer's accepted items arrive in the order it sent them.
    for order in per_producer_order {
        let observed: Vec<u32> = seen.iter().copied().filter(|x| order.contains(x)).collect();
        assert_eq!(observed, order);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Push(u8),
    Pop,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![any::<u8>().prop_map(Op::Push), Just(Op::Pop)]
}

proptest! {
    #[test]
    fn prop_fifo_order_within_capacity(items in proptest::collection::vec(any::<u8>(), 0..=8)) {
        let queue: BoundedQueue<u8, 8> = BoundedQueue::new();
        for item in &items {
            prop_assert!(queue.enqueue(*item, Duration::ZERO).is_ok());
        }
        let drained: Vec<u8> = (0..items.len()).map(|_| queue.dequeue()).collect();
        prop_assert_eq!(drained, items);
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn prop_matches_bounded_model(ops in proptest::collection::vec(op_strategy(), 0..64)) {
        const CAP: usize = 4;
        let queue: BoundedQueue<u8, CAP> = BoundedQueue::new();
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                Op::Push(v) => {
                    let result = queue.enqueue(v, Duration::ZERO);
                    if model.len() < CAP {
                        prop_assert!(result.is_ok());
                        model.push_back(v);
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                Op::Pop => prop_assert_eq!(queue.try_dequeue(), model.pop_front()),
            }
            prop_assert_eq!(queue.len(), model.len());
            prop_assert!(queue.len() <= queue.capacity());
        }
    }
}

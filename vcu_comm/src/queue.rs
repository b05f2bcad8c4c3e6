//! Fixed-capacity blocking FIFO.
//!
//! `BoundedQueue<T, N>` stores up to `N` items inline (`heapless::Deque`), so
//! a queue declared as a `static` or created once at startup never allocates
//! afterwards. The item type is fixed for the queue's lifetime.
//!
//! | Operation      | Queue state | Behaviour                                  |
//! |----------------|-------------|--------------------------------------------|
//! | `enqueue`      | full        | waits up to `timeout`, then `TimedOut`     |
//! | `dequeue`      | empty       | waits indefinitely                         |
//! | `try_dequeue`  | empty       | returns `None`                             |
//! | `len`          | any         | advisory, races with concurrent producers  |

use crate::error::QueueError;
use heapless::{Deque, Vec};
use parking_lot::{Condvar, Mutex, const_mutex};
use std::time::{Duration, Instant};

/// Bounded multi-producer multi-consumer FIFO with blocking operations.
pub struct BoundedQueue<T, const N: usize> {
    items: Mutex<Deque<T, N>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T, const N: usize> BoundedQueue<T, N> {
    /// Create an empty queue. Usable in `static` items.
    pub const fn new() -> Self {
        Self {
            items: const_mutex(Deque::new()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Maximum number of outstanding items.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Append `item`, waiting up to `timeout` for space.
    ///
    /// A zero `timeout` never blocks. On `TimedOut` the queue is unchanged
    /// and `item` is dropped; frames are `Copy`, so callers still hold theirs.
    pub fn enqueue(&self, item: T, timeout: Duration) -> Result<(), QueueError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut items = self.items.lock();

        while items.is_full() {
            if timeout.is_zero() {
                return Err(QueueError::TimedOut { timeout });
            }
            match deadline {
                Some(deadline) => {
                    if self.not_full.wait_until(&mut items, deadline).timed_out()
                        && items.is_full()
                    {
                        return Err(QueueError::TimedOut { timeout });
                    }
                }
                // Timeout too large to represent: wait like an unbounded send.
                None => self.not_full.wait(&mut items),
            }
        }

        if items.push_back(item).is_err() {
            unreachable!("queue checked non-full under lock");
        }
        drop(items);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove the oldest item, waiting indefinitely for one to arrive.
    pub fn dequeue(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                drop(items);
                self.not_full.notify_one();
                return item;
            }
            self.not_empty.wait(&mut items);
        }
    }

    /// Remove the oldest item if there is one.
    pub fn try_dequeue(&self) -> Option<T> {
        let item = self.items.lock().pop_front()?;
        self.not_full.notify_one();
        Some(item)
    }

    /// Current depth. Advisory: may be stale by the time it is read.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether the queue currently holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T: Clone, const N: usize> BoundedQueue<T, N> {
    /// Copy of the current contents, oldest first. Diagnostics only.
    pub fn snapshot(&self) -> Vec<T, N> {
        self.items.lock().iter().cloned().collect()
    }
}

impl<T, const N: usize> Default for BoundedQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

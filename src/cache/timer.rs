//! Timer Queue Module
//!
//! Single-shot expiration timers ordered by deadline.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

// == Timer ==
/// A pending expiration check for one key.
#[derive(Debug, Clone)]
pub struct Timer<K> {
    /// When the check should run
    pub due: Instant,
    /// Key to check
    pub key: K,
    /// Token of the entry the timer was scheduled for
    pub token: u64,
    /// Insertion order, breaks ties between equal deadlines
    seq: u64,
}

impl<K> PartialEq for Timer<K> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<K> Eq for Timer<K> {}

impl<K> PartialOrd for Timer<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Timer<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

// == Timer Queue ==
/// Min-heap of single-shot timers.
///
/// Timers are never cancelled; the consumer decides on firing whether the
/// timer is still relevant.
#[derive(Debug)]
pub struct TimerQueue<K> {
    heap: BinaryHeap<Reverse<Timer<K>>>,
    next_seq: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<K> TimerQueue<K> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a check for `key` at `due`.
    pub fn schedule(&mut self, due: Instant, key: K, token: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Timer {
            due,
            key,
            token,
            seq,
        }));
    }

    /// Pops the earliest timer if it is due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<Timer<K>> {
        if self.next_deadline()? > now {
            return None;
        }
        self.heap.pop().map(|Reverse(timer)| timer)
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(timer)| timer.due)
    }

    /// Number of pending timers, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

//! Bounded queue for handing issue transitions to other loops.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use pulse_types::IssueTransition;
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, MonitorResult};

/// Behaviour when pushing into a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backpressure {
    /// Evict the oldest item to make room.
    #[default]
    DropOldest,
    /// Refuse the new item.
    RejectNew,
}

/// Fixed-capacity FIFO queue with explicit backpressure.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
    backpressure: Backpressure,
    dropped: u64,
    rejected: u64,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize, backpressure: Backpressure) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            backpressure,
            dropped: 0,
            rejected: 0,
        }
    }

    /// Push an item.
    ///
    /// With `DropOldest` returns the evicted item, if any. With `RejectNew`
    /// a full queue yields [`MonitorError::QueueFull`].
    pub fn push(&mut self, item: T) -> MonitorResult<Option<T>> {
        if self.items.len() < self.capacity {
            self.items.push_back(item);
            return Ok(None);
        }

        match self.backpressure {
            Backpressure::DropOldest => {
                let evicted = self.items.pop_front();
                self.items.push_back(item);
                self.dropped += 1;
                Ok(evicted)
            }
            Backpressure::RejectNew => {
                self.rejected += 1;
                Err(MonitorError::QueueFull {
                    capacity: self.capacity,
                })
            }
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Remove and return everything queued.
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items evicted under `DropOldest`.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Items refused under `RejectNew`.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl<T: Clone> BoundedQueue<T> {
    /// Copy of the queued items, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

/// Shared handle to a monitor's transition queue.
///
/// The monitor is the only producer; any number of consumers may drain or
/// peek from other tasks or threads.
#[derive(Debug, Clone)]
pub struct EventQueue {
    inner: Arc<Mutex<BoundedQueue<IssueTransition>>>,
}

impl EventQueue {
    pub fn new(capacity: usize, backpressure: Backpressure) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BoundedQueue::new(capacity, backpressure))),
        }
    }

    pub fn push(&self, transition: IssueTransition) -> MonitorResult<Option<IssueTransition>> {
        self.inner.lock().push(transition)
    }

    pub fn drain(&self) -> Vec<IssueTransition> {
        self.inner.lock().drain()
    }

    pub fn snapshot(&self) -> Vec<IssueTransition> {
        self.inner.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Total items lost to backpressure, dropped plus rejected.
    pub fn lost(&self) -> u64 {
        let queue = self.inner.lock();
        queue.dropped() + queue.rejected()
    }
}

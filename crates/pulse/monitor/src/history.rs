//! Fixed-capacity history windows.

use std::collections::{BTreeMap, VecDeque};

/// FIFO ring buffer of the most recent values of one series.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    values: VecDeque<f64>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create a buffer; capacity is at least one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest when full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Values oldest first.
    pub fn values(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Sample variance (n − 1 denominator); 0.0 with fewer than two values.
    pub fn variance(&self) -> f64 {
        let n = self.values.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.values.iter().sum::<f64>() / n as f64;
        self.values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    }

    /// Least-squares slope per tick; 0.0 with fewer than two values.
    pub fn trend(&self) -> f64 {
        slope(self.values.iter().copied())
    }
}

/// Least-squares slope of a series against its index.
pub(crate) fn slope(values: impl ExactSizeIterator<Item = f64> + Clone) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = values.clone().sum::<f64>() / n as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.enumerate() {
        let dx = i as f64 - mean_x;
        numerator += dx * (y - mean_y);
        denominator += dx * dx;
    }

    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Named history buffers sharing one capacity.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    buffers: BTreeMap<String, HistoryBuffer>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: BTreeMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, name: &str, value: f64) {
        let capacity = self.capacity;
        self.buffers
            .entry(name.to_string())
            .or_insert_with(|| HistoryBuffer::new(capacity))
            .push(value);
    }

    pub fn get(&self, name: &str) -> Option<&HistoryBuffer> {
        self.buffers.get(name)
    }

    pub fn variance(&self, name: &str) -> Option<f64> {
        self.buffers.get(name).map(HistoryBuffer::variance)
    }

    pub fn trend(&self, name: &str) -> Option<f64> {
        self.buffers.get(name).map(HistoryBuffer::trend)
    }

    /// Length of the deepest buffer.
    pub fn depth(&self) -> usize {
        self.buffers.values().map(HistoryBuffer::len).max().unwrap_or(0)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buffers.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}

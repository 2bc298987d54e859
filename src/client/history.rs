// Fixed-capacity FIFO buffer for chart history

use std::collections::VecDeque;

/// Default number of points kept per stream.
pub const HISTORY_MAX: usize = 42;

#[derive(Debug, Clone)]
pub struct History<T> {
    points: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// A zero capacity is bumped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `point`, returning the evicted oldest entry when full.
    pub fn push(&mut self, point: T) -> Option<T> {
        let evicted = if self.points.len() == self.capacity {
            self.points.pop_front()
        } else {
            None
        };
        self.points.push_back(point);
        evicted
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.points.back()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.points.iter()
    }
}

impl<T: Clone> History<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.points.iter().cloned().collect()
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(HISTORY_MAX)
    }
}

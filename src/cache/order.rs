//! Insertion Order Module
//!
//! Tracks the order in which keys were inserted for capacity eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Tracks insertion order for oldest-first eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Least recently inserted
/// - Back = Most recently inserted
///
/// Reads never reorder keys; only a (re-)insertion does.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record ==
    /// Marks a key as the most recently inserted.
    ///
    /// A key already present is moved to the back rather than duplicated.
    pub fn record(&mut self, key: &str) {
        self.remove(key);
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    // == Pop Oldest ==
    /// Returns and removes the least recently inserted key.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the least recently inserted key without removing it.
    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.front().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}

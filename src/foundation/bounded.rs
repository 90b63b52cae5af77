use serde::{Deserialize, Serialize};

/// Outcome of pushing into a capacity-limited container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PushStatus {
    /// The value was stored.
    Stored,
    /// The container was full (or could not grow) and the value was dropped.
    Truncated,
}

impl PushStatus {
    /// `true` when the value was dropped.
    pub fn is_truncated(self) -> bool {
        matches!(self, PushStatus::Truncated)
    }
}

/// Fixed-capacity list that drops pushes past its capacity instead of growing.
///
/// Storage is reserved once at construction; `clear` keeps it.
#[derive(Clone, Debug)]
pub struct BoundedList<T> {
    items: Vec<T>,
    capacity: usize,
    dropped: usize,
}

impl<T> BoundedList<T> {
    /// Empty list that will hold at most `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Store `value` unless the list is full.
    pub fn push(&mut self, value: T) -> PushStatus {
        if self.items.len() >= self.capacity {
            self.dropped += 1;
            return PushStatus::Truncated;
        }
        self.items.push(value);
        PushStatus::Stored
    }

    /// Stored items.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of stored items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pushes rejected since the last `clear`.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Remove all items and reset the drop counter.
    pub fn clear(&mut self) {
        self.items.clear();
        self.dropped = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/bounded.rs"]
mod tests;

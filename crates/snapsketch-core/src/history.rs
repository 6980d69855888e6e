//! Bounded, cursor-based undo/redo history.
//!
//! The stack stores full snapshots rather than deltas. Writing after an undo
//! cuts the abandoned redo branch, so history is always a single timeline.
//!
//! # Cursor
//!
//! The cursor points at the entry that reflects the current state, or is
//! `None` while the stack is empty. Entries after the cursor are the redo
//! branch.

/// Default number of snapshots kept.
pub const DEFAULT_CAPACITY: usize = 10;

/// A bounded undo/redo store.
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    entries: Vec<T>,
    cursor: Option<usize>,
    capacity: usize,
}

impl<T> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> HistoryStack<T> {
    /// Create an empty stack holding at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one; the current state must always be
    /// representable.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            cursor: None,
            capacity,
        }
    }

    /// Record a new snapshot as the current state.
    ///
    /// Anything after the cursor is discarded first. If the stack overflows,
    /// the oldest entry is evicted and the cursor shifts down with it.
    pub fn push(&mut self, snapshot: T) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);

        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }

        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one entry and return it for restoring.
    ///
    /// Returns `None` (and leaves the cursor alone) when there is nothing
    /// older than the current entry.
    pub fn undo(&mut self) -> Option<&T> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.entries.get(c - 1)
            }
            _ => None,
        }
    }

    /// Step forward one entry and return it for restoring.
    pub fn redo(&mut self) -> Option<&T> {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                self.entries.get(c + 1)
            }
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.entries.len())
    }

    /// Entry at the cursor.
    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

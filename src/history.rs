//! Fixed-capacity ring of recent selections with a "current" cursor.

use crate::error::Error;

#[derive(Debug, Clone)]
struct Slot<T> {
    // monotonically increasing record number
    seq: u64,
    entry: T,
}

/// Circular history of the last `capacity` selections.
///
/// New selections always go one slot ahead of the cursor. Stepping back only ever
/// lands on a filled slot holding an older selection than the current one, so the
/// cursor cannot wander into slots that were overwritten after it or never written.
#[derive(Debug, Clone)]
pub struct HistoryRing<T> {
    slots: Vec<Option<Slot<T>>>,
    cursor: Option<usize>,
    next_seq: u64,
}

impl<T> HistoryRing<T> {
    /// Create an empty ring.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Ok(Self {
            slots,
            cursor: None,
            next_seq: 0,
        })
    }

    /// Advance the cursor one slot (wrapping) and store `entry` there.
    ///
    /// Returns the new cursor position.
    pub fn record_new(&mut self, entry: T) -> usize {
        let pos = match self.cursor {
            Some(p) => (p + 1) % self.slots.len(),
            None => 0,
        };
        self.slots[pos] = Some(Slot {
            seq: self.next_seq,
            entry,
        });
        self.next_seq += 1;
        self.cursor = Some(pos);
        pos
    }

    /// Move the cursor to the previous slot if it holds an earlier selection.
    ///
    /// `Ok(None)` means the cursor stayed where it was.
    ///
    /// # Errors
    /// Returns [`Error::NoCurrentImage`] if nothing was ever recorded.
    pub fn step_back(&mut self) -> Result<Option<&T>, Error> {
        let cur = self.cursor.ok_or(Error::NoCurrentImage)?;
        let prev = (cur + self.slots.len() - 1) % self.slots.len();
        let cur_seq = self.slots[cur].as_ref().map_or(0, |s| s.seq);
        match &self.slots[prev] {
            Some(slot) if prev != cur && slot.seq < cur_seq => {
                self.cursor = Some(prev);
                Ok(Some(&slot.entry))
            }
            _ => Ok(None),
        }
    }

    /// The entry under the cursor, if any was recorded.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.cursor
            .and_then(|c| self.slots[c].as_ref())
            .map(|s| &s.entry)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of filled slots.
    #[must_use]
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Total number of selections ever recorded.
    #[must_use]
    pub const fn recorded(&self) -> u64 {
        self.next_seq
    }

    /// Slot contents in ring order (not history order).
    pub fn slots(&self) -> impl Iterator<Item = Option<&T>> {
        self.slots.iter().map(|s| s.as_ref().map(|s| &s.entry))
    }
}

use super::state::ProcIdx;
use crate::error::SchedError;

/// Bounded circular FIFO of PCB indices.
///
/// Capacity equals the process count, so together with the `in_queue` flag an
/// overflow can only mean a broken invariant.
#[derive(Debug)]
pub struct ReadyQueue {
    slots: Box<[ProcIdx]>,
    head: usize,
    len: usize,
}

impl ReadyQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![0; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    pub fn enqueue(&mut self, idx: ProcIdx) -> Result<(), SchedError> {
        if self.is_full() {
            return Err(SchedError::QueueOverflow {
                idx,
                capacity: self.capacity(),
            });
        }
        let tail = (self.head + self.len) % self.capacity();
        self.slots[tail] = idx;
        self.len += 1;
        Ok(())
    }

    // None means the CPU goes idle
    pub fn dequeue(&mut self) -> Option<ProcIdx> {
        if self.is_empty() {
            return None;
        }
        let idx = self.slots[self.head];
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        Some(idx)
    }

    /// Head to tail.
    pub fn iter(&self) -> impl Iterator<Item = ProcIdx> + '_ {
        (0..self.len).map(move |i| self.slots[(self.head + i) % self.capacity()])
    }

    pub fn contains(&self, idx: ProcIdx) -> bool {
        self.iter().any(|queued| queued == idx)
    }
}

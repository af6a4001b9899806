// src/fam/violation_window.rs
//
// Rolling history of admissibility outcomes. When every slot is false the
// controller has lost track of the pedestrian and drops into Error.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ViolationWindow {
    flags: VecDeque<bool>,
    capacity: usize,
}

impl ViolationWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            flags: Self::seed(capacity),
            capacity,
        }
    }

    /// `[true, true, false, ...]`, or all `true` below two slots.
    fn seed(capacity: usize) -> VecDeque<bool> {
        if capacity < 2 {
            std::iter::repeat(true).take(capacity).collect()
        } else {
            [true, true]
                .into_iter()
                .chain(std::iter::repeat(false).take(capacity - 2))
                .collect()
        }
    }

    /// Drop the oldest outcome and append the newest. A zero-capacity
    /// window records nothing.
    pub fn push(&mut self, admissible: bool) {
        if self.capacity == 0 {
            return;
        }
        self.flags.pop_front();
        self.flags.push_back(admissible);
    }

    /// True when the window is non-empty and holds no admissible outcome.
    pub fn is_exhausted(&self) -> bool {
        !self.flags.is_empty() && !self.flags.iter().any(|&ok| ok)
    }

    pub fn reset(&mut self) {
        self.flags = Self::seed(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Oldest first.
    pub fn flags(&self) -> Vec<bool> {
        self.flags.iter().copied().collect()
    }
}

//! Run-scoped identifier allocation.
//!
//! Folders, parts, comps, and comp part slots all draw from one id namespace:
//! downstream references (comp→part, entity→folder) are plain integers with
//! no type tag, so a shared allocator is what keeps them from colliding.

/// Monotonic id source for a single migration run.
///
/// Ids start at 1 and increase strictly; no reuse, no gaps. One instance is
/// created per run and threaded through every component that needs fresh ids,
/// so repeated runs (e.g. in tests) never interfere with each other.
#[derive(Debug)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator { next: 1 }
    }

    /// Returns the next id in the sequence.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

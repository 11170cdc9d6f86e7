// Pooled node arena with a free-list of contiguous runs.
//
// Both tries require that the children of a node occupy contiguous slots,
// because lookups binary-search the sibling range. Growing a sibling group
// therefore allocates a fresh run, copies the group, and returns the old
// run to the free list; the arena never hands out overlapping runs.

use kormo_core::error::CapacityError;

/// A contiguous run of free slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    start: u32,
    len: u32,
}

/// Fixed-capacity slot arena addressed by `u32` index.
///
/// Allocation is first-fit over the free list, splitting a larger run when
/// needed, then bump allocation from the high-water mark. Exhaustion is an
/// explicit [`CapacityError`]; the arena never grows.
#[derive(Debug)]
pub struct Arena<N> {
    slots: Vec<N>,
    free: Vec<Run>,
    high_water: u32,
}

impl<N: Default + Clone> Arena<N> {
    /// Create an arena with room for exactly `capacity` nodes.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![N::default(); capacity],
            free: Vec::new(),
            high_water: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently handed out.
    pub fn in_use(&self) -> usize {
        let free: u32 = self.free.iter().map(|r| r.len).sum();
        (self.high_water - free) as usize
    }

    /// Allocate a contiguous run of `len` slots, returning its start index.
    /// The slots are reset to `N::default()`.
    pub fn alloc_run(&mut self, len: u32) -> Result<u32, CapacityError> {
        debug_assert!(len > 0);
        // First fit over reusable runs.
        if let Some(pos) = self.free.iter().position(|r| r.len >= len) {
            let run = self.free[pos];
            if run.len == len {
                self.free.swap_remove(pos);
            } else {
                self.free[pos] = Run {
                    start: run.start + len,
                    len: run.len - len,
                };
            }
            for slot in &mut self.slots[run.start as usize..(run.start + len) as usize] {
                *slot = N::default();
            }
            return Ok(run.start);
        }
        // Bump allocation.
        let start = self.high_water;
        let end = start as usize + len as usize;
        if end > self.slots.len() {
            return Err(CapacityError::new("trie node pool", self.slots.len()));
        }
        self.high_water = end as u32;
        for slot in &mut self.slots[start as usize..end] {
            *slot = N::default();
        }
        Ok(start)
    }

    /// Return a run of slots to the free list. Adjacent free runs are
    /// coalesced so long-lived dynamic tries do not fragment.
    pub fn free_run(&mut self, start: u32, len: u32) {
        if len == 0 {
            return;
        }
        let mut start = start;
        let mut len = len;
        // Merge with a run ending at `start` or beginning at `start + len`.
        let mut i = 0;
        while i < self.free.len() {
            let r = self.free[i];
            if r.start + r.len == start {
                start = r.start;
                len += r.len;
                self.free.swap_remove(i);
                i = 0;
            } else if start + len == r.start {
                len += r.len;
                self.free.swap_remove(i);
                i = 0;
            } else {
                i += 1;
            }
        }
        if start + len == self.high_water {
            self.high_water = start;
        } else {
            self.free.push(Run { start, len });
        }
    }

    /// Drop every allocation. Slot contents are reset lazily when a run
    /// is next handed out, so this is O(free-list length).
    pub fn clear(&mut self) {
        self.free.clear();
        self.high_water = 0;
    }

    pub fn get(&self, index: u32) -> &N {
        &self.slots[index as usize]
    }

    pub fn get_mut(&mut self, index: u32) -> &mut N {
        &mut self.slots[index as usize]
    }

    /// Borrow a contiguous run immutably.
    pub fn run(&self, start: u32, len: u32) -> &[N] {
        &self.slots[start as usize..(start + len) as usize]
    }

    /// Borrow a contiguous run mutably.
    pub fn run_mut(&mut self, start: u32, len: u32) -> &mut [N] {
        &mut self.slots[start as usize..(start + len) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_allocation_and_exhaustion() {
        let mut arena: Arena<u8> = Arena::new(4);
        assert_eq!(arena.alloc_run(2).unwrap(), 0);
        assert_eq!(arena.alloc_run(2).unwrap(), 2);
        let err = arena.alloc_run(1).unwrap_err();
        assert_eq!(err.limit, 4);
    }

    #[test]
    fn freed_runs_are_reused() {
        let mut arena: Arena<u8> = Arena::new(4);
        let a = arena.alloc_run(2).unwrap();
        let _b = arena.alloc_run(2).unwrap();
        arena.free_run(a, 2);
        // Reuses the freed run instead of failing.
        assert_eq!(arena.alloc_run(2).unwrap(), a);
    }

    #[test]
    fn first_fit_splits_larger_runs() {
        let mut arena: Arena<u8> = Arena::new(8);
        let a = arena.alloc_run(4).unwrap();
        let _b = arena.alloc_run(4).unwrap();
        arena.free_run(a, 4);
        let c = arena.alloc_run(1).unwrap();
        let d = arena.alloc_run(3).unwrap();
        assert_eq!(c, a);
        assert_eq!(d, a + 1);
    }

    #[test]
    fn adjacent_free_runs_coalesce() {
        let mut arena: Arena<u8> = Arena::new(8);
        let a = arena.alloc_run(2).unwrap();
        let b = arena.alloc_run(2).unwrap();
        let _c = arena.alloc_run(2).unwrap();
        arena.free_run(a, 2);
        arena.free_run(b, 2);
        // Coalesced into one 4-slot run.
        assert_eq!(arena.alloc_run(4).unwrap(), a);
    }

    #[test]
    fn freeing_at_high_water_rolls_back() {
        let mut arena: Arena<u8> = Arena::new(4);
        let a = arena.alloc_run(2).unwrap();
        let b = arena.alloc_run(2).unwrap();
        arena.free_run(b, 2);
        assert_eq!(arena.alloc_run(2).unwrap(), b);
        arena.free_run(b, 2);
        arena.free_run(a, 2);
        assert_eq!(arena.in_use(), 0);
        assert_eq!(arena.alloc_run(4).unwrap(), 0);
    }

    #[test]
    fn allocated_slots_are_reset() {
        let mut arena: Arena<u8> = Arena::new(2);
        let a = arena.alloc_run(2).unwrap();
        arena.run_mut(a, 2).fill(7);
        arena.free_run(a, 2);
        let b = arena.alloc_run(2).unwrap();
        assert_eq!(arena.run(b, 2), &[0, 0]);
    }

    #[test]
    fn bump_allocated_slots_are_reset_after_clear() {
        let mut arena: Arena<u8> = Arena::new(2);
        let a = arena.alloc_run(2).unwrap();
        arena.run_mut(a, 2).fill(7);
        arena.clear();
        // The same physical slots come back through the bump path.
        let b = arena.alloc_run(2).unwrap();
        assert_eq!(b, a);
        assert_eq!(arena.run(b, 2), &[0, 0]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut arena: Arena<u8> = Arena::new(2);
        arena.alloc_run(2).unwrap();
        arena.clear();
        assert_eq!(arena.in_use(), 0);
        assert_eq!(arena.alloc_run(2).unwrap(), 0);
    }
}

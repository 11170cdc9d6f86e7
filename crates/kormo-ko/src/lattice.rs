// Working lattice for one eojeol.
//
// The eojeol is flattened into a sequence of units (one jamo each, or one
// opaque foreign run). Every unit boundary is a position; rule expansion
// splices replacement suffixes in as additional position chains. A chain
// link (`next`) rather than plain indexing is what lets a spliced suffix
// rejoin the original tail where the two coincide.
//
// Position 0 is the sentinel: edges whose destination is 0 end the word.

use kormo_core::error::CapacityError;
use kormo_core::jamo::Segment;
use kormo_trie::ReverseTrie;

use crate::AnalyzeError;

/// One lattice unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Jamo(char),
    /// A maximal run of non-Hangul characters, kept verbatim.
    Foreign(String),
}

/// Resolution state of a position during the chart search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Pending,
    /// Resolution has started but not finished; hitting this state again
    /// means a splice cycle, which the search treats as failure.
    InProgress,
    Resolved,
    Failed,
}

#[derive(Debug)]
pub(crate) struct Position {
    pub(crate) first_unit: u32,
    /// Next position in the chain, 0 at end of word.
    pub(crate) next: u16,
    /// Units from here to end of word along the chain.
    pub(crate) tail_len: u16,
    pub(crate) state: PositionState,
    /// Indices of chart edges starting at this position.
    pub(crate) edges: Vec<u16>,
}

/// Per-eojeol position lattice with splice deduplication.
///
/// The reverse trie maps every all-jamo suffix (reversed) to its position,
/// so a rule expansion producing a suffix that already exists reuses the
/// existing chain instead of growing the lattice.
#[derive(Debug)]
pub struct Lattice {
    units: Vec<Unit>,
    pub(crate) positions: Vec<Position>,
    reverse: ReverseTrie,
    max_positions: usize,
}

impl Lattice {
    pub fn new(reverse_pool: usize, max_positions: usize) -> Self {
        Self {
            units: Vec::new(),
            positions: Vec::new(),
            reverse: ReverseTrie::new(reverse_pool),
            max_positions,
        }
    }

    /// Reset the lattice for a new eojeol and build the original position
    /// chain. Allocations from the previous eojeol are reused.
    pub fn begin(&mut self, segments: &[Segment]) -> Result<(), AnalyzeError> {
        self.units.clear();
        self.positions.clear();
        self.reverse.clear();
        self.positions.push(Position {
            first_unit: 0,
            next: 0,
            tail_len: 0,
            state: PositionState::Resolved,
            edges: Vec::new(),
        });

        for segment in segments {
            match segment {
                Segment::Hangul(jamos) => {
                    for &jamo in jamos {
                        self.units.push(Unit::Jamo(jamo));
                    }
                }
                Segment::Foreign(text) => {
                    self.units.push(Unit::Foreign(text.clone()));
                }
            }
        }

        let n = self.units.len();
        if 1 + n > self.max_positions {
            return Err(CapacityError::new("lattice positions", self.max_positions).into());
        }
        for i in 0..n {
            let next = if i + 1 < n { (i + 2) as u16 } else { 0 };
            self.positions.push(Position {
                first_unit: i as u32,
                next,
                tail_len: (n - i) as u16,
                state: PositionState::Pending,
                edges: Vec::new(),
            });
        }

        // Seed the suffix index. A suffix containing a foreign unit can
        // never be produced by a splice, so seeding stops at the last
        // foreign unit.
        let mut rev_key: Vec<char> = Vec::new();
        for i in (0..n).rev() {
            match &self.units[i] {
                Unit::Jamo(jamo) => {
                    rev_key.push(*jamo);
                    self.reverse.insert(&rev_key, (i + 1) as u32)?;
                }
                Unit::Foreign(_) => break,
            }
        }
        Ok(())
    }

    /// Position where analysis of the whole eojeol starts.
    pub fn start_position(&self) -> u16 {
        if self.units.is_empty() { 0 } else { 1 }
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub(crate) fn next_of(&self, pos: u16) -> u16 {
        self.positions[pos as usize].next
    }

    pub(crate) fn unit_of(&self, pos: u16) -> &Unit {
        &self.units[self.positions[pos as usize].first_unit as usize]
    }

    pub(crate) fn tail_len(&self, pos: u16) -> u16 {
        self.positions[pos as usize].tail_len
    }

    /// The maximal jamo-only run starting at `pos`, following the chain up
    /// to the first foreign unit or end of word.
    pub fn jamo_run(&self, pos: u16) -> Vec<char> {
        let mut run = Vec::new();
        let mut cur = pos;
        while cur != 0 {
            match self.unit_of(cur) {
                Unit::Jamo(jamo) => run.push(*jamo),
                Unit::Foreign(_) => break,
            }
            cur = self.next_of(cur);
        }
        run
    }

    /// Ensure a position chain for the all-jamo suffix `tail` exists and
    /// return its head position. The longest already-known suffix of
    /// `tail` is reused; only the missing prefix allocates new positions.
    pub fn splice(&mut self, tail: &[char]) -> Result<u16, AnalyzeError> {
        if tail.is_empty() {
            return Ok(0);
        }
        let mut rev_key: Vec<char> = Vec::with_capacity(tail.len());
        let mut known_from = tail.len();
        let mut dest: u16 = 0;
        for j in (0..tail.len()).rev() {
            rev_key.push(tail[j]);
            if let Some(pos) = self.reverse.fetch(&rev_key) {
                known_from = j;
                dest = pos as u16;
            }
        }
        if known_from == 0 {
            return Ok(dest);
        }
        if self.positions.len() + known_from > self.max_positions {
            return Err(CapacityError::new("lattice positions", self.max_positions).into());
        }

        let mut next = dest;
        for j in (0..known_from).rev() {
            let unit_idx = self.units.len() as u32;
            self.units.push(Unit::Jamo(tail[j]));
            let pos_idx = self.positions.len() as u16;
            let below = if next == 0 {
                0
            } else {
                self.positions[next as usize].tail_len
            };
            self.positions.push(Position {
                first_unit: unit_idx,
                next,
                tail_len: below + 1,
                state: PositionState::Pending,
                edges: Vec::new(),
            });
            let key: Vec<char> = tail[j..].iter().rev().copied().collect();
            self.reverse.insert(&key, pos_idx as u32)?;
            next = pos_idx;
        }
        Ok(next)
    }
}

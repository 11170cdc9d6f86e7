// Static dictionary trie over jamo sequences.
//
// Nodes live in the pooled arena; the children of a node occupy one
// contiguous, key-sorted run so lookup can binary-search the sibling
// range. Insertion of a new child therefore reallocates and copies the
// whole sibling group -- cheap at load time, and the structure is
// read-only afterwards.

use kormo_core::morpheme::PhonemeClass;
use kormo_core::tag::TagId;

use crate::TrieError;
use crate::arena::Arena;

/// One morpheme stored at a trie node: its tag and irregular family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub tag: TagId,
    pub phoneme: PhonemeClass,
}

/// Outcome of a `store` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Inserted,
    /// The exact (tag, phoneme) pair was already present; nothing changed.
    Duplicate,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) key: char,
    pub(crate) entries: Vec<Entry>,
    pub(crate) child_start: u32,
    pub(crate) child_count: u16,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            key: '\0',
            entries: Vec::new(),
            child_start: 0,
            child_count: 0,
        }
    }
}

/// Read cursor into the trie.
///
/// A cursor is an explicit value held by the caller and advanced one jamo
/// at a time, so a loaded trie can serve any number of interleaved lookups
/// without shared mutable state. Cursors are invalidated by `store` (which
/// may move sibling runs); callers load first, then search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// `None` while at the (virtual) root.
    node: Option<u32>,
}

/// Dictionary trie mapping jamo sequences to (tag, phoneme-class) entries.
#[derive(Debug)]
pub struct DictTrie {
    arena: Arena<Node>,
    root_start: u32,
    root_count: u16,
    entry_count: usize,
}

impl DictTrie {
    /// Create an empty trie backed by a pool of `capacity` nodes.
    pub fn new(capacity: usize) -> Self {
        Self {
            arena: Arena::new(capacity),
            root_start: 0,
            root_count: 0,
            entry_count: 0,
        }
    }

    /// Number of stored (key, tag, phoneme) entries.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Insert a morpheme. Duplicate (tag, phoneme) pairs under the same key
    /// are rejected with [`StoreOutcome::Duplicate`].
    pub fn store(
        &mut self,
        key: &[char],
        tag: TagId,
        phoneme: PhonemeClass,
    ) -> Result<StoreOutcome, TrieError> {
        if key.is_empty() {
            return Err(TrieError::EmptyKey);
        }
        let mut node = None;
        for &jamo in key {
            node = Some(self.child_or_insert(node, jamo)?);
        }
        let entry = Entry { tag, phoneme };
        let entries = &mut self.arena.get_mut(node.unwrap()).entries;
        if entries.contains(&entry) {
            return Ok(StoreOutcome::Duplicate);
        }
        entries.push(entry);
        self.entry_count += 1;
        Ok(StoreOutcome::Inserted)
    }

    /// Cursor positioned at the root.
    pub fn start(&self) -> Cursor {
        Cursor { node: None }
    }

    /// Advance a cursor by one jamo. `None` means no stored key continues
    /// with this jamo.
    pub fn advance(&self, cursor: Cursor, jamo: char) -> Option<Cursor> {
        let (start, count) = match cursor.node {
            Some(idx) => {
                let n = self.arena.get(idx);
                (n.child_start, n.child_count)
            }
            None => (self.root_start, self.root_count),
        };
        self.find_child(start, count, jamo)
            .map(|idx| Cursor { node: Some(idx) })
    }

    /// Entries of morphemes ending exactly at the cursor.
    pub fn entries(&self, cursor: Cursor) -> &[Entry] {
        match cursor.node {
            Some(idx) => &self.arena.get(idx).entries,
            None => &[],
        }
    }

    /// Walk as far along `key` as stored prefixes allow. Returns the
    /// matched prefix length and the cursor positioned there.
    pub fn search(&self, key: &[char]) -> (usize, Cursor) {
        let mut cursor = self.start();
        for (i, &jamo) in key.iter().enumerate() {
            match self.advance(cursor, jamo) {
                Some(next) => cursor = next,
                None => return (i, cursor),
            }
        }
        (key.len(), cursor)
    }

    /// Entries for an exact key, or `None` when the key is absent or is
    /// only a pass-through prefix of longer keys.
    pub fn fetch(&self, key: &[char]) -> Option<&[Entry]> {
        let (matched, cursor) = self.search(key);
        if matched < key.len() {
            return None;
        }
        let entries = self.entries(cursor);
        if entries.is_empty() { None } else { Some(entries) }
    }

    /// Binary-search a sibling run for `jamo`.
    fn find_child(&self, start: u32, count: u16, jamo: char) -> Option<u32> {
        let run = self.arena.run(start, count as u32);
        run.binary_search_by_key(&jamo, |n| n.key)
            .ok()
            .map(|pos| start + pos as u32)
    }

    /// Find the child of `parent` keyed by `jamo`, inserting it if absent.
    /// Insertion allocates a run one slot larger, moves the sibling group
    /// into it keeping key order, and frees the old run.
    fn child_or_insert(&mut self, parent: Option<u32>, jamo: char) -> Result<u32, TrieError> {
        let (start, count) = match parent {
            Some(idx) => {
                let n = self.arena.get(idx);
                (n.child_start, n.child_count)
            }
            None => (self.root_start, self.root_count),
        };
        if let Some(idx) = self.find_child(start, count, jamo) {
            return Ok(idx);
        }

        let insert_at = self
            .arena
            .run(start, count as u32)
            .partition_point(|n| n.key < jamo);
        let new_start = self.arena.alloc_run(count as u32 + 1)?;
        for i in 0..count as usize {
            let old = std::mem::take(self.arena.get_mut(start + i as u32));
            let dst = if i < insert_at { i } else { i + 1 };
            *self.arena.get_mut(new_start + dst as u32) = old;
        }
        self.arena.get_mut(new_start + insert_at as u32).key = jamo;
        if count > 0 {
            self.arena.free_run(start, count as u32);
        }

        match parent {
            Some(idx) => {
                let n = self.arena.get_mut(idx);
                n.child_start = new_start;
                n.child_count = count + 1;
            }
            None => {
                self.root_start = new_start;
                self.root_count = count + 1;
            }
        }
        Ok(new_start + insert_at as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kormo_core::jamo::decompose;

    fn key(s: &str) -> Vec<char> {
        decompose(s)
    }

    fn sample() -> DictTrie {
        let mut trie = DictTrie::new(256);
        trie.store(&key("먹"), 0, PhonemeClass::Regular).unwrap();
        trie.store(&key("먹이"), 1, PhonemeClass::Regular).unwrap();
        trie.store(&key("었"), 2, PhonemeClass::Regular).unwrap();
        trie.store(&key("다"), 3, PhonemeClass::Regular).unwrap();
        trie.store(&key("돕"), 4, PhonemeClass::IrregularB).unwrap();
        trie
    }

    #[test]
    fn store_then_fetch() {
        let trie = sample();
        let entries = trie.fetch(&key("먹")).unwrap();
        assert_eq!(
            entries,
            &[Entry {
                tag: 0,
                phoneme: PhonemeClass::Regular
            }]
        );
        assert!(trie.fetch(&key("먼")).is_none());
    }

    #[test]
    fn duplicate_pairs_are_rejected() {
        let mut trie = sample();
        let out = trie.store(&key("먹"), 0, PhonemeClass::Regular).unwrap();
        assert_eq!(out, StoreOutcome::Duplicate);
        assert_eq!(trie.fetch(&key("먹")).unwrap().len(), 1);
        // A different pair under the same key is a new entry.
        let out = trie.store(&key("먹"), 9, PhonemeClass::Regular).unwrap();
        assert_eq!(out, StoreOutcome::Inserted);
        assert_eq!(trie.fetch(&key("먹")).unwrap().len(), 2);
    }

    #[test]
    fn search_reports_longest_matched_prefix() {
        let trie = sample();
        let k = key("먹다가");
        let (matched, cursor) = trie.search(&k);
        // 먹 = 3 jamo match; ㄷ of 다 does not continue under 먹.
        assert_eq!(matched, 3);
        assert_eq!(trie.entries(cursor).len(), 1);
    }

    #[test]
    fn prefix_without_entries_is_not_fetched() {
        let mut trie = DictTrie::new(64);
        trie.store(&key("가나"), 0, PhonemeClass::Regular).unwrap();
        // 가 exists as a pass-through node only.
        assert!(trie.fetch(&key("가")).is_none());
        assert!(trie.fetch(&key("가나")).is_some());
    }

    #[test]
    fn incremental_advance_matches_search() {
        let trie = sample();
        let k = key("먹이");
        let mut cursor = trie.start();
        for &jamo in &k {
            cursor = trie.advance(cursor, jamo).unwrap();
        }
        assert_eq!(trie.entries(cursor), trie.fetch(&k).unwrap());
    }

    #[test]
    fn cursors_are_independent() {
        let trie = sample();
        let a = trie.advance(trie.start(), 'ㅁ').unwrap();
        let b = trie.advance(trie.start(), 'ㄷ').unwrap();
        // Interleaved advances do not disturb each other.
        let a2 = trie.advance(a, 'ㅓ').unwrap();
        assert!(trie.advance(b, 'ㅏ').is_some());
        assert!(trie.advance(a2, 'ㄱ').is_some());
    }

    #[test]
    fn empty_key_is_an_error() {
        let mut trie = DictTrie::new(8);
        assert!(matches!(
            trie.store(&[], 0, PhonemeClass::Regular),
            Err(TrieError::EmptyKey)
        ));
    }

    #[test]
    fn pool_exhaustion_is_reported() {
        let mut trie = DictTrie::new(2);
        let err = trie.store(&key("먹"), 0, PhonemeClass::Regular).unwrap_err();
        assert!(matches!(err, TrieError::PoolExhausted(_)));
    }

    #[test]
    fn sibling_groups_stay_sorted() {
        let mut trie = DictTrie::new(64);
        for (i, s) in ["하", "가", "바", "마", "나"].iter().enumerate() {
            trie.store(&key(s), i as TagId, PhonemeClass::Regular).unwrap();
        }
        for (i, s) in ["하", "가", "바", "마", "나"].iter().enumerate() {
            let entries = trie.fetch(&key(s)).unwrap();
            assert_eq!(entries[0].tag, i as TagId, "lookup of {s}");
        }
    }
}

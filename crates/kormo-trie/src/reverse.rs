// Dynamic reverse-suffix trie.
//
// Keyed on reversed suffixes of the working eojeol, this trie answers one
// question for the rule-expansion engine: "has a lattice splice for this
// suffix already been created, and at which position?" It shares the
// arena discipline of the dictionary trie but additionally supports
// deletion and ordered traversal, and stores an opaque payload (a lattice
// position index) instead of morpheme entries.

use crate::TrieError;
use crate::arena::Arena;

#[derive(Debug, Clone)]
struct Node {
    key: char,
    payload: Option<u32>,
    child_start: u32,
    child_count: u16,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            key: '\0',
            payload: None,
            child_start: 0,
            child_count: 0,
        }
    }
}

/// Outcome of an `insert` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The key already carries a payload; it is returned unchanged so the
    /// caller can reuse the existing lattice splice.
    Duplicate(u32),
}

/// Insert/delete-capable trie over reversed jamo suffixes.
#[derive(Debug)]
pub struct ReverseTrie {
    arena: Arena<Node>,
    root_start: u32,
    root_count: u16,
    key_count: usize,
}

impl ReverseTrie {
    /// Create an empty trie backed by a pool of `capacity` nodes.
    pub fn new(capacity: usize) -> Self {
        Self {
            arena: Arena::new(capacity),
            root_start: 0,
            root_count: 0,
            key_count: 0,
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.key_count
    }

    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }

    /// Drop every key. The node pool is reused; called once per eojeol.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root_start = 0;
        self.root_count = 0;
        self.key_count = 0;
    }

    /// Insert `key` with `payload`. An existing key keeps its payload and
    /// reports [`InsertOutcome::Duplicate`] with the stored value.
    pub fn insert(&mut self, key: &[char], payload: u32) -> Result<InsertOutcome, TrieError> {
        if key.is_empty() {
            return Err(TrieError::EmptyKey);
        }
        let mut node = None;
        for &jamo in key {
            node = Some(self.child_or_insert(node, jamo)?);
        }
        let slot = self.arena.get_mut(node.unwrap());
        match slot.payload {
            Some(existing) => Ok(InsertOutcome::Duplicate(existing)),
            None => {
                slot.payload = Some(payload);
                self.key_count += 1;
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    /// Payload stored for an exact key.
    pub fn fetch(&self, key: &[char]) -> Option<u32> {
        let mut node: Option<u32> = None;
        for &jamo in key {
            let (start, count) = self.children_of(node);
            node = Some(self.find_child(start, count, jamo)?);
        }
        node.and_then(|idx| self.arena.get(idx).payload)
    }

    /// Remove a key. Returns `false` if the key was not present. Nodes
    /// left without payload or children are pruned and their sibling runs
    /// shrunk, so the pool does not leak across rule expansions.
    pub fn delete(&mut self, key: &[char]) -> bool {
        if key.is_empty() {
            return false;
        }
        // Record the path: (parent node, child index) per depth.
        let mut path: Vec<(Option<u32>, u32)> = Vec::with_capacity(key.len());
        let mut node: Option<u32> = None;
        for &jamo in key {
            let (start, count) = self.children_of(node);
            match self.find_child(start, count, jamo) {
                Some(idx) => {
                    path.push((node, idx));
                    node = Some(idx);
                }
                None => return false,
            }
        }
        let leaf = node.unwrap();
        if self.arena.get(leaf).payload.is_none() {
            return false;
        }
        self.arena.get_mut(leaf).payload = None;
        self.key_count -= 1;

        // Prune empty tails bottom-up. Shrinking a run moves only the
        // removed node's siblings, never its ancestors, so the remaining
        // path entries stay valid.
        for (parent, idx) in path.into_iter().rev() {
            let n = self.arena.get(idx);
            if n.payload.is_some() || n.child_count > 0 {
                break;
            }
            self.remove_child(parent, idx);
        }
        true
    }

    /// Iterate stored keys (and payloads) in lexicographic jamo order.
    pub fn iter(&self) -> Keys<'_> {
        let mut stack = Vec::new();
        if self.root_count > 0 {
            stack.push((self.root_start, self.root_count, 0u16));
        }
        Keys {
            trie: self,
            stack,
            prefix: Vec::new(),
        }
    }

    /// Smallest stored key, if any.
    pub fn first_key(&self) -> Option<Vec<char>> {
        self.iter().next().map(|(key, _)| key)
    }

    fn children_of(&self, node: Option<u32>) -> (u32, u16) {
        match node {
            Some(idx) => {
                let n = self.arena.get(idx);
                (n.child_start, n.child_count)
            }
            None => (self.root_start, self.root_count),
        }
    }

    fn find_child(&self, start: u32, count: u16, jamo: char) -> Option<u32> {
        let run = self.arena.run(start, count as u32);
        run.binary_search_by_key(&jamo, |n| n.key)
            .ok()
            .map(|pos| start + pos as u32)
    }

    fn set_children(&mut self, node: Option<u32>, start: u32, count: u16) {
        match node {
            Some(idx) => {
                let n = self.arena.get_mut(idx);
                n.child_start = start;
                n.child_count = count;
            }
            None => {
                self.root_start = start;
                self.root_count = count;
            }
        }
    }

    fn child_or_insert(&mut self, parent: Option<u32>, jamo: char) -> Result<u32, TrieError> {
        let (start, count) = self.children_of(parent);
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
        self.set_children(parent, new_start, count + 1);
        Ok(new_start + insert_at as u32)
    }

    /// Remove one child node from its parent's sibling run.
    fn remove_child(&mut self, parent: Option<u32>, idx: u32) {
        let (start, count) = self.children_of(parent);
        debug_assert!(count > 0 && idx >= start && idx < start + count as u32);
        if count == 1 {
            self.arena.free_run(start, 1);
            self.set_children(parent, 0, 0);
            return;
        }
        let new_start = match self.arena.alloc_run(count as u32 - 1) {
            Ok(s) => s,
            // The pool cannot be full here: we are about to free a larger
            // run. Treat failure as a skipped prune rather than a fault.
            Err(_) => return,
        };
        let mut dst = 0u32;
        for i in 0..count as u32 {
            if start + i == idx {
                continue;
            }
            let old = std::mem::take(self.arena.get_mut(start + i));
            *self.arena.get_mut(new_start + dst) = old;
            dst += 1;
        }
        self.arena.free_run(start, count as u32);
        self.set_children(parent, new_start, count - 1);
    }
}

/// Ordered key iterator; explicit DFS stack over sibling runs.
pub struct Keys<'a> {
    trie: &'a ReverseTrie,
    stack: Vec<(u32, u16, u16)>,
    prefix: Vec<char>,
}

impl Iterator for Keys<'_> {
    type Item = (Vec<char>, u32);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&(start, count, pos)) = self.stack.last() {
            if pos >= count {
                self.stack.pop();
                self.prefix.pop();
                continue;
            }
            self.stack.last_mut().unwrap().2 += 1;
            let node = self.trie.arena.get(start + pos as u32);
            self.prefix.push(node.key);
            let payload = node.payload;
            if node.child_count > 0 {
                self.stack.push((node.child_start, node.child_count, 0));
                if let Some(p) = payload {
                    // Key continues below; emit it before descending.
                    let key = self.prefix.clone();
                    return Some((key, p));
                }
            } else {
                let key = self.prefix.clone();
                self.prefix.pop();
                if let Some(p) = payload {
                    return Some((key, p));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kormo_core::jamo::decompose;

    fn rev(s: &str) -> Vec<char> {
        let mut k = decompose(s);
        k.reverse();
        k
    }

    #[test]
    fn insert_and_fetch() {
        let mut trie = ReverseTrie::new(64);
        assert_eq!(trie.insert(&rev("었다"), 5).unwrap(), InsertOutcome::Inserted);
        assert_eq!(trie.fetch(&rev("었다")), Some(5));
        assert_eq!(trie.fetch(&rev("다")), None);
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn duplicate_returns_existing_payload() {
        let mut trie = ReverseTrie::new(64);
        trie.insert(&rev("어"), 1).unwrap();
        assert_eq!(trie.insert(&rev("어"), 9).unwrap(), InsertOutcome::Duplicate(1));
        assert_eq!(trie.fetch(&rev("어")), Some(1));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn prefix_keys_coexist() {
        let mut trie = ReverseTrie::new(64);
        trie.insert(&rev("다"), 1).unwrap();
        trie.insert(&rev("었다"), 2).unwrap();
        assert_eq!(trie.fetch(&rev("다")), Some(1));
        assert_eq!(trie.fetch(&rev("었다")), Some(2));
    }

    #[test]
    fn delete_removes_only_the_key() {
        let mut trie = ReverseTrie::new(64);
        trie.insert(&rev("다"), 1).unwrap();
        trie.insert(&rev("었다"), 2).unwrap();
        assert!(trie.delete(&rev("었다")));
        assert_eq!(trie.fetch(&rev("었다")), None);
        assert_eq!(trie.fetch(&rev("다")), Some(1));
        assert!(!trie.delete(&rev("었다")));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn delete_prunes_and_pool_is_reusable() {
        let mut trie = ReverseTrie::new(8);
        trie.insert(&['a', 'b', 'c'], 1).unwrap();
        assert!(trie.delete(&['a', 'b', 'c']));
        assert!(trie.is_empty());
        // All three nodes were pruned; the pool can hold a fresh key chain.
        trie.insert(&['x', 'y', 'z'], 2).unwrap();
        trie.insert(&['x', 'y', 'w'], 3).unwrap();
        assert_eq!(trie.fetch(&['x', 'y', 'w']), Some(3));
    }

    #[test]
    fn delete_of_pass_through_prefix_fails() {
        let mut trie = ReverseTrie::new(64);
        trie.insert(&rev("었다"), 2).unwrap();
        // 다-reversed is a pass-through prefix, not a stored key.
        assert!(!trie.delete(&rev("다")));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn ordered_iteration() {
        let mut trie = ReverseTrie::new(64);
        trie.insert(&['c'], 3).unwrap();
        trie.insert(&['a', 'b'], 1).unwrap();
        trie.insert(&['a'], 0).unwrap();
        trie.insert(&['b'], 2).unwrap();
        let keys: Vec<(Vec<char>, u32)> = trie.iter().collect();
        assert_eq!(
            keys,
            vec![
                (vec!['a'], 0),
                (vec!['a', 'b'], 1),
                (vec!['b'], 2),
                (vec!['c'], 3),
            ]
        );
        assert_eq!(trie.first_key(), Some(vec!['a']));
    }

    #[test]
    fn clear_resets_for_next_eojeol() {
        let mut trie = ReverseTrie::new(16);
        trie.insert(&rev("었다"), 1).unwrap();
        trie.clear();
        assert!(trie.is_empty());
        assert_eq!(trie.fetch(&rev("었다")), None);
        trie.insert(&rev("어"), 7).unwrap();
        assert_eq!(trie.fetch(&rev("어")), Some(7));
    }

    #[test]
    fn cleared_keys_do_not_resurface_through_reused_slots() {
        let mut trie = ReverseTrie::new(16);
        trie.insert(&['a'], 9).unwrap();
        trie.insert(&['a', 'b'], 1).unwrap();
        trie.clear();
        // Re-populating 'a' reuses its old slot; the old child chain and
        // payload under it must be gone.
        trie.insert(&['a'], 2).unwrap();
        assert_eq!(trie.fetch(&['a', 'b']), None);
        assert_eq!(trie.insert(&['a', 'b'], 3).unwrap(), InsertOutcome::Inserted);
        assert_eq!(trie.fetch(&['a', 'b']), Some(3));
    }

    #[test]
    fn pool_exhaustion_is_reported() {
        let mut trie = ReverseTrie::new(2);
        let err = trie.insert(&['a', 'b', 'c'], 0).unwrap_err();
        assert!(matches!(err, TrieError::PoolExhausted(_)));
    }
}

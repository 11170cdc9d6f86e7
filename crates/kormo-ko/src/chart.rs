// Chart search over the eojeol lattice.
//
// Each lattice position is resolved at most once into a set of outgoing
// edges (one per morpheme reading that starts there), found two ways:
// walking the dictionary tries along the tail, and undoing phonological
// rules and splicing the replacement suffix back into the lattice. An
// edge survives only if it reaches the end of the word or some surviving
// edge of its destination may follow it per the connection table.
// Candidate analyses are then enumerated as paths of surviving edges.

use kormo_core::jamo::{recompose, segment};
use kormo_core::morpheme::{Candidate, Morpheme, PhonemeClass};
use kormo_core::tag::TagId;
use kormo_trie::{Cursor, DictTrie, number};

use crate::AnalyzeError;
use crate::connection::{ConnectionTable, TagFilter};
use crate::handle::AnalyzerOptions;
use crate::lattice::{Lattice, PositionState, Unit};
use crate::rules::{self, Rule, StemKind};

/// Tags assigned outside the dictionary.
#[derive(Debug, Clone, Copy)]
pub struct SpecialTags {
    pub unknown: TagId,
    pub number: TagId,
    pub foreign: TagId,
}

/// Everything the search borrows from the analyzer.
pub struct Resources<'a> {
    pub system: &'a DictTrie,
    pub user: Option<&'a DictTrie>,
    pub connection: &'a ConnectionTable,
    pub rules: &'a [Rule],
    pub special: SpecialTags,
    /// Tags a rule-proposed verb-like stem may carry, sorted.
    pub verb_tags: &'a [TagId],
    /// Tags a rule-proposed pronoun stem may carry, sorted.
    pub pronoun_tags: &'a [TagId],
    pub options: &'a AnalyzerOptions,
}

impl Resources<'_> {
    fn stem_tags(&self, kind: StemKind) -> &[TagId] {
        match kind {
            StemKind::VerbLike => self.verb_tags,
            StemKind::Pronoun => self.pronoun_tags,
        }
    }
}

#[derive(Debug)]
struct Edge {
    surface: String,
    tag: TagId,
    /// Destination position; 0 ends the word.
    dest: u16,
    filter: TagFilter,
    /// Surviving edges of `dest` that may follow this one.
    successors: Vec<u16>,
    ok: bool,
    jamo_len: u16,
}

/// Resolution proceeds through fixed steps; the explicit state makes the
/// order a checked invariant rather than a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Dictionary,
    Expansion,
    Descent,
    Filtering,
}

/// Reusable chart working storage.
#[derive(Debug)]
pub struct Chart {
    edges: Vec<Edge>,
    lattice: Lattice,
}

impl Chart {
    pub fn new(options: &AnalyzerOptions) -> Self {
        Self {
            edges: Vec::new(),
            lattice: Lattice::new(options.reverse_pool, options.max_positions),
        }
    }

    /// Analyze one eojeol. Always produces at least one candidate; inputs
    /// the grammar cannot account for come back as a single unknown
    /// morpheme covering the whole surface.
    pub fn analyze(
        &mut self,
        res: &Resources<'_>,
        surface: &str,
    ) -> Result<Vec<Candidate>, AnalyzeError> {
        let segments = segment(surface);
        let fallback =
            || vec![vec![Morpheme::new(surface.to_string(), res.special.unknown)]];
        if segments.is_empty() {
            return Ok(fallback());
        }

        let mut found = self.run(res, &segments, false)?;
        if found.is_empty() {
            found = self.run(res, &segments, true)?;
        }
        if found.is_empty() {
            found = fallback();
        }
        Ok(found)
    }

    fn run(
        &mut self,
        res: &Resources<'_>,
        segments: &[kormo_core::jamo::Segment],
        relaxed: bool,
    ) -> Result<Vec<Candidate>, AnalyzeError> {
        self.edges.clear();
        self.lattice.begin(segments)?;
        let start = self.lattice.start_position();
        if start == 0 {
            return Ok(Vec::new());
        }
        self.resolve(res, start, relaxed)?;
        Ok(self.enumerate(res, relaxed))
    }

    fn resolve(
        &mut self,
        res: &Resources<'_>,
        pos: u16,
        relaxed: bool,
    ) -> Result<(), AnalyzeError> {
        match self.lattice.positions[pos as usize].state {
            PositionState::Resolved | PositionState::Failed => return Ok(()),
            // A splice cycle reached this position again; edges into it
            // fail filtering below, which breaks the cycle.
            PositionState::InProgress => return Ok(()),
            PositionState::Pending => {}
        }
        self.lattice.positions[pos as usize].state = PositionState::InProgress;

        let mut local: Vec<u16> = Vec::new();
        let mut step = Step::Dictionary;
        loop {
            match step {
                Step::Dictionary => {
                    self.dictionary_edges(res, pos, relaxed, &mut local)?;
                    step = Step::Expansion;
                }
                Step::Expansion => {
                    self.expansion_edges(res, pos, &mut local)?;
                    step = Step::Descent;
                }
                Step::Descent => {
                    let dests: Vec<u16> = local
                        .iter()
                        .map(|&ei| self.edges[ei as usize].dest)
                        .filter(|&d| d != 0)
                        .collect();
                    for dest in dests {
                        self.resolve(res, dest, relaxed)?;
                    }
                    step = Step::Filtering;
                }
                Step::Filtering => {
                    let mut any_ok = false;
                    for &ei in &local {
                        let (dest, tag, jamo_len, filter) = {
                            let e = &self.edges[ei as usize];
                            (e.dest, e.tag, e.jamo_len, e.filter)
                        };
                        let (ok, successors) = if dest == 0 {
                            (filter == TagFilter::Any, Vec::new())
                        } else {
                            let successors: Vec<u16> = self.lattice.positions[dest as usize]
                                .edges
                                .iter()
                                .copied()
                                .filter(|&fi| {
                                    let f = &self.edges[fi as usize];
                                    f.ok
                                        && res.connection.may_follow(
                                            tag,
                                            f.tag,
                                            jamo_len as usize,
                                            f.jamo_len as usize,
                                            filter,
                                        )
                                })
                                .collect();
                            (!successors.is_empty(), successors)
                        };
                        let e = &mut self.edges[ei as usize];
                        e.ok = ok;
                        e.successors = successors;
                        any_ok |= ok;
                    }
                    let position = &mut self.lattice.positions[pos as usize];
                    position.edges = local;
                    position.state = if any_ok {
                        PositionState::Resolved
                    } else {
                        PositionState::Failed
                    };
                    break;
                }
            }
        }
        Ok(())
    }

    /// Edges from dictionary lookups along the tail at `pos`.
    fn dictionary_edges(
        &mut self,
        res: &Resources<'_>,
        pos: u16,
        relaxed: bool,
        local: &mut Vec<u16>,
    ) -> Result<(), AnalyzeError> {
        if let Unit::Foreign(text) = self.lattice.unit_of(pos) {
            let text = text.clone();
            let tag = if number::recognize(&text) {
                res.special.number
            } else {
                res.special.foreign
            };
            let jamo_len = text.chars().count() as u16;
            let dest = self.lattice.next_of(pos);
            self.push_edge(res, local, text, tag, dest, TagFilter::Any, jamo_len)?;
            return Ok(());
        }

        let mut sys: Option<Cursor> = Some(res.system.start());
        let mut usr: Option<Cursor> = res.user.map(|u| u.start());
        let mut surface: Vec<char> = Vec::new();
        let mut cur = pos;
        while cur != 0 {
            let jamo = match self.lattice.unit_of(cur) {
                Unit::Jamo(jamo) => *jamo,
                Unit::Foreign(_) => break,
            };
            sys = sys.and_then(|c| res.system.advance(c, jamo));
            usr = match (res.user, usr) {
                (Some(trie), Some(c)) => trie.advance(c, jamo),
                _ => None,
            };
            if sys.is_none() && usr.is_none() {
                break;
            }
            surface.push(jamo);
            let dest = self.lattice.next_of(cur);
            let jamo_len = surface.len() as u16;
            if let Some(c) = sys {
                for &entry in res.system.entries(c) {
                    let text = recompose(&surface);
                    self.push_edge(res, local, text, entry.tag, dest, TagFilter::Any, jamo_len)?;
                }
            }
            if let (Some(trie), Some(c)) = (res.user, usr) {
                for &entry in trie.entries(c) {
                    let text = recompose(&surface);
                    self.push_edge(res, local, text, entry.tag, dest, TagFilter::Any, jamo_len)?;
                }
            }
            cur = dest;
        }

        if relaxed {
            // One unknown edge spanning the whole jamo run, so every
            // eojeol has a connected (if uninformative) reading.
            let run = self.lattice.jamo_run(pos);
            if !run.is_empty() {
                let mut dest = pos;
                for _ in 0..run.len() {
                    dest = self.lattice.next_of(dest);
                }
                let jamo_len = run.len() as u16;
                let text = recompose(&run);
                self.push_edge(
                    res,
                    local,
                    text,
                    res.special.unknown,
                    dest,
                    TagFilter::Any,
                    jamo_len,
                )?;
            }
        }
        Ok(())
    }

    /// Edges from phonological rule expansion of the tail at `pos`.
    fn expansion_edges(
        &mut self,
        res: &Resources<'_>,
        pos: u16,
        local: &mut Vec<u16>,
    ) -> Result<(), AnalyzeError> {
        let suffix = self.lattice.jamo_run(pos);
        // Replacement suffixes stand for the rest of the word; a tail
        // interrupted by a foreign unit cannot be rewritten.
        if suffix.is_empty() || suffix.len() != self.lattice.tail_len(pos) as usize {
            return Ok(());
        }
        for m in rules::apply(res.rules, &suffix) {
            let allowed = res.stem_tags(m.stem_kind);
            let mut entries: Vec<(TagId, PhonemeClass)> = Vec::new();
            if let Some(found) = res.system.fetch(&m.stem) {
                entries.extend(found.iter().map(|e| (e.tag, e.phoneme)));
            }
            if let Some(trie) = res.user {
                if let Some(found) = trie.fetch(&m.stem) {
                    entries.extend(found.iter().map(|e| (e.tag, e.phoneme)));
                }
            }
            for (tag, phoneme) in entries {
                if allowed.binary_search(&tag).is_err() || !phoneme.matches(m.phoneme) {
                    continue;
                }
                let dest = self.lattice.splice(&m.remainder)?;
                // A rule regenerating its own suffix does not advance.
                if dest == pos {
                    continue;
                }
                let text = recompose(&m.stem);
                let jamo_len = m.stem.len() as u16;
                self.push_edge(res, local, text, tag, dest, m.filter, jamo_len)?;
            }
        }
        Ok(())
    }

    fn push_edge(
        &mut self,
        res: &Resources<'_>,
        local: &mut Vec<u16>,
        surface: String,
        tag: TagId,
        dest: u16,
        filter: TagFilter,
        jamo_len: u16,
    ) -> Result<(), AnalyzeError> {
        let duplicate = local.iter().any(|&ei| {
            let e = &self.edges[ei as usize];
            e.tag == tag && e.dest == dest && e.surface == surface
        });
        if duplicate {
            return Ok(());
        }
        if self.edges.len() >= res.options.max_edges {
            return Err(kormo_core::error::CapacityError::new(
                "chart edges",
                res.options.max_edges,
            )
            .into());
        }
        local.push(self.edges.len() as u16);
        self.edges.push(Edge {
            surface,
            tag,
            dest,
            filter,
            successors: Vec::new(),
            ok: false,
            jamo_len,
        });
        Ok(())
    }

    fn enumerate(&self, res: &Resources<'_>, relaxed: bool) -> Vec<Candidate> {
        let start = self.lattice.start_position();
        let mut out = Vec::new();
        let mut path: Vec<u16> = Vec::new();
        for &ei in &self.lattice.positions[start as usize].edges {
            let e = &self.edges[ei as usize];
            if !e.ok || (!relaxed && !res.connection.may_start(e.tag)) {
                continue;
            }
            path.push(ei);
            self.walk(ei, &mut path, &mut out, res.options.max_candidates);
            path.pop();
        }
        out
    }

    fn walk(&self, ei: u16, path: &mut Vec<u16>, out: &mut Vec<Candidate>, cap: usize) {
        if out.len() >= cap {
            return;
        }
        let e = &self.edges[ei as usize];
        if e.dest == 0 {
            out.push(
                path.iter()
                    .map(|&i| {
                        let e = &self.edges[i as usize];
                        Morpheme::new(e.surface.clone(), e.tag)
                    })
                    .collect(),
            );
            return;
        }
        for &fi in &e.successors {
            path.push(fi);
            self.walk(fi, path, out, cap);
            path.pop();
        }
    }
}

// Tag adjacency: the connection rule file and its compiled matrix.
//
// The rule file declares tags, named tag groups, and CONNECTION lines
// whose sides are set-difference expressions over tag/group names. The
// whole thing compiles once into a dense tag-by-tag boolean matrix; at
// analysis time `may_follow` is a couple of array reads.

use kormo_core::tag::{TagId, TagSet};
use log::warn;

use crate::LoadError;

/// Restriction an edge places on the tag of its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFilter {
    /// Any tag the matrix permits.
    Any,
    /// Successor must be a verbal ending (rule-expansion stem edges).
    Endings,
    /// Successor must be a particle (pronoun contraction edges).
    Particles,
}

/// Compiled tag adjacency table.
#[derive(Debug)]
pub struct ConnectionTable {
    tag_count: usize,
    /// Dense row-major matrix: `matrix[left * tag_count + right]`.
    matrix: Vec<bool>,
    /// Tags allowed to start an eojeol.
    start: Vec<bool>,
    /// Group membership vectors consulted by `may_follow`.
    noun_like: Vec<bool>,
    ending: Vec<bool>,
    particle: Vec<bool>,
    /// The interned unknown tag, exempt from the matrix.
    unknown: TagId,
}

impl ConnectionTable {
    /// Can `right` immediately follow `left`?
    ///
    /// Applies, in order: the caller's tag-type filter, the unknown-tag
    /// exemption, the hard-coded short-noun heuristic (a noun-like tag may
    /// not follow another noun-like tag whose surface is shorter than two
    /// jamo), and finally the compiled matrix. Depends only on the loaded
    /// tables, never on call history.
    pub fn may_follow(
        &self,
        left: TagId,
        right: TagId,
        left_len: usize,
        _right_len: usize,
        filter: TagFilter,
    ) -> bool {
        match filter {
            TagFilter::Any => {}
            TagFilter::Endings => {
                if !self.ending[right as usize] {
                    return false;
                }
            }
            TagFilter::Particles => {
                if !self.particle[right as usize] {
                    return false;
                }
            }
        }
        if left == self.unknown || right == self.unknown {
            return true;
        }
        if self.noun_like[left as usize] && self.noun_like[right as usize] && left_len < 2 {
            return false;
        }
        self.matrix[left as usize * self.tag_count + right as usize]
    }

    /// May `tag` begin an eojeol?
    pub fn may_start(&self, tag: TagId) -> bool {
        tag == self.unknown || self.start.get(tag as usize).copied().unwrap_or(false)
    }

    pub fn tag_count(&self) -> usize {
        self.tag_count
    }
}

/// Explicit (morpheme, tag) x (morpheme, tag) pairs from the negative
/// exception file.
///
/// The table is loaded and retained, but its runtime check deliberately
/// permits every pair: the deployed system ships the same no-op, and the
/// intended enforcement semantics are an open product question. Do not
/// wire `allows` into anything expecting it to reject.
#[derive(Debug, Default)]
pub struct ExceptionTable {
    pairs: Vec<ExceptionPair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionPair {
    pub left_surface: String,
    pub left_tag: TagId,
    pub right_surface: String,
    pub right_tag: TagId,
}

impl ExceptionTable {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[ExceptionPair] {
        &self.pairs
    }

    /// Always `true`; see the type-level comment.
    pub fn allows(&self, _left: (&str, TagId), _right: (&str, TagId)) -> bool {
        true
    }
}

/// Group names `may_follow` consults. The loader resolves them against
/// the tag set once; missing groups simply leave the membership empty.
#[derive(Debug, Clone)]
pub struct ConnectionGroups {
    pub noun_like: String,
    pub ending: String,
    pub particle: String,
}

impl Default for ConnectionGroups {
    fn default() -> Self {
        Self {
            noun_like: "noun".to_string(),
            ending: "ending".to_string(),
            particle: "particle".to_string(),
        }
    }
}

/// Parse the connection rule file, interning tags and groups into `tags`
/// and compiling the matrix.
///
/// Recognized lines: `@key value` metadata, `TAG <name>`,
/// `TSET <name> <member>...`, `CONNECTION <lhs>*<rhs>`,
/// `START_TAG <name>`. Fields are tab- or space-separated.
pub fn parse_connection_file(
    file: &str,
    text: &str,
    tags: &mut TagSet,
    groups: &ConnectionGroups,
    unknown_tag: &str,
) -> Result<ConnectionTable, LoadError> {
    let parse_err = |line: usize, msg: String| LoadError::Parse {
        file: file.to_string(),
        line,
        msg,
    };

    // First pass: declarations, collecting CONNECTION/START_TAG lines for
    // evaluation once every tag id exists.
    let mut connections: Vec<(usize, String, String)> = Vec::new();
    let mut start_names: Vec<(usize, String)> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('@') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let keyword = fields.next().unwrap_or("");
        match keyword {
            "TAG" => {
                let name = fields
                    .next()
                    .ok_or_else(|| parse_err(lineno, "TAG line without a name".into()))?;
                tags.intern(name);
            }
            "TSET" => {
                let name = fields
                    .next()
                    .ok_or_else(|| parse_err(lineno, "TSET line without a name".into()))?;
                let members: Vec<&str> = fields.collect();
                if members.is_empty() {
                    return Err(parse_err(lineno, format!("TSET {name} has no members")));
                }
                tags.define_group(name, &members)
                    .map_err(|msg| parse_err(lineno, msg))?;
            }
            "CONNECTION" => {
                let expr = fields.next().ok_or_else(|| {
                    parse_err(lineno, "CONNECTION line without an expression".into())
                })?;
                let (lhs, rhs) = expr.split_once('*').ok_or_else(|| {
                    parse_err(lineno, format!("CONNECTION expression '{expr}' lacks '*'"))
                })?;
                connections.push((lineno, lhs.to_string(), rhs.to_string()));
            }
            "START_TAG" => {
                let name = fields
                    .next()
                    .ok_or_else(|| parse_err(lineno, "START_TAG line without a name".into()))?;
                start_names.push((lineno, name.to_string()));
            }
            other => {
                return Err(parse_err(lineno, format!("unknown keyword '{other}'")));
            }
        }
    }

    // The unknown tag always exists, declared or not.
    let unknown = tags.intern(unknown_tag);
    let tag_count = tags.len();

    let mut matrix = vec![false; tag_count * tag_count];
    for (lineno, lhs, rhs) in connections {
        let left = eval_set_expr(&lhs, tags, tag_count).map_err(|msg| parse_err(lineno, msg))?;
        let right = eval_set_expr(&rhs, tags, tag_count).map_err(|msg| parse_err(lineno, msg))?;
        for (l, &l_in) in left.iter().enumerate() {
            if !l_in {
                continue;
            }
            for (r, &r_in) in right.iter().enumerate() {
                if r_in {
                    matrix[l * tag_count + r] = true;
                }
            }
        }
    }

    let mut start = vec![false; tag_count];
    for (lineno, name) in start_names {
        let set = tags
            .resolve(&name)
            .ok_or_else(|| parse_err(lineno, format!("unknown tag or group '{name}'")))?;
        for id in set {
            start[id as usize] = true;
        }
    }

    let membership = |group: &str| -> Vec<bool> {
        let mut v = vec![false; tag_count];
        match tags.group(group) {
            Some(members) => {
                for &id in members {
                    v[id as usize] = true;
                }
            }
            None => warn!("connection file {file} defines no tag group '{group}'"),
        }
        v
    };

    Ok(ConnectionTable {
        tag_count,
        matrix,
        start,
        noun_like: membership(&groups.noun_like),
        ending: membership(&groups.ending),
        particle: membership(&groups.particle),
        unknown,
    })
}

/// Evaluate a set-difference expression over tag/group names into a
/// membership vector. Grammar: `term ('-' term)*` where a term is a name
/// or a parenthesized expression.
fn eval_set_expr(expr: &str, tags: &TagSet, tag_count: usize) -> Result<Vec<bool>, String> {
    let chars: Vec<char> = expr.chars().collect();
    let mut pos = 0;
    let set = parse_expr(&chars, &mut pos, tags, tag_count)?;
    if pos != chars.len() {
        return Err(format!("trailing input in expression '{expr}'"));
    }
    Ok(set)
}

fn parse_expr(
    chars: &[char],
    pos: &mut usize,
    tags: &TagSet,
    tag_count: usize,
) -> Result<Vec<bool>, String> {
    let mut set = parse_term(chars, pos, tags, tag_count)?;
    while *pos < chars.len() && chars[*pos] == '-' {
        *pos += 1;
        let sub = parse_term(chars, pos, tags, tag_count)?;
        for (dst, src) in set.iter_mut().zip(&sub) {
            if *src {
                *dst = false;
            }
        }
    }
    Ok(set)
}

fn parse_term(
    chars: &[char],
    pos: &mut usize,
    tags: &TagSet,
    tag_count: usize,
) -> Result<Vec<bool>, String> {
    if *pos < chars.len() && chars[*pos] == '(' {
        *pos += 1;
        let set = parse_expr(chars, pos, tags, tag_count)?;
        if *pos >= chars.len() || chars[*pos] != ')' {
            return Err("unbalanced parenthesis".into());
        }
        *pos += 1;
        return Ok(set);
    }
    let start = *pos;
    while *pos < chars.len() && !matches!(chars[*pos], '(' | ')' | '-' | '*') {
        *pos += 1;
    }
    if *pos == start {
        return Err("empty term in expression".into());
    }
    let name: String = chars[start..*pos].iter().collect();
    let ids = tags
        .resolve(&name)
        .ok_or_else(|| format!("unknown tag or group '{name}'"))?;
    let mut set = vec![false; tag_count];
    for id in ids {
        set[id as usize] = true;
    }
    Ok(set)
}

/// Parse the negative-exception file: `@` metadata plus
/// `CONNECTION_NOT <morphA> <tagA> <morphB> <tagB>` lines.
pub fn parse_exception_file(
    file: &str,
    text: &str,
    tags: &TagSet,
) -> Result<ExceptionTable, LoadError> {
    let parse_err = |line: usize, msg: String| LoadError::Parse {
        file: file.to_string(),
        line,
        msg,
    };
    let mut pairs = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('@') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 || fields[0] != "CONNECTION_NOT" {
            return Err(parse_err(lineno, format!("malformed line '{line}'")));
        }
        let left_tag = tags
            .id(fields[2])
            .ok_or_else(|| parse_err(lineno, format!("unknown tag '{}'", fields[2])))?;
        let right_tag = tags
            .id(fields[4])
            .ok_or_else(|| parse_err(lineno, format!("unknown tag '{}'", fields[4])))?;
        pairs.push(ExceptionPair {
            left_surface: fields[1].to_string(),
            left_tag,
            right_surface: fields[3].to_string(),
            right_tag,
        });
    }
    Ok(ExceptionTable { pairs })
}

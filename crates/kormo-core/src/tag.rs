// Morpheme tag set: interned tag names and named tag groups.

use hashbrown::HashMap;

/// Integer identifier of a morpheme tag. Stable for the lifetime of the
/// [`TagSet`] that produced it.
pub type TagId = u16;

/// The set of morpheme tags and their group memberships.
///
/// Tags are declared by name and resolved to dense ids; groups are named
/// collections of tags ("noun-like", "verb-like", "ending", ...) whose
/// members may themselves be group names, resolved transitively when the
/// group is defined. Everything downstream (connection matrix, rule
/// filters, touch-up) works with ids and group membership queries.
#[derive(Debug, Default)]
pub struct TagSet {
    names: Vec<String>,
    index: HashMap<String, TagId>,
    groups: HashMap<String, Vec<TagId>>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a tag name, returning its id. Existing names keep their id.
    pub fn intern(&mut self, name: &str) -> TagId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len() as TagId;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    /// Look up the id of a declared tag name.
    pub fn id(&self, name: &str) -> Option<TagId> {
        self.index.get(name).copied()
    }

    /// The name of a tag id.
    pub fn name(&self, id: TagId) -> &str {
        &self.names[id as usize]
    }

    /// Number of declared tags.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Define a named group. `members` may name tags or previously defined
    /// groups; group references are expanded to their tags here, so later
    /// queries never recurse. Unknown names are reported to the caller.
    pub fn define_group(&mut self, name: &str, members: &[&str]) -> Result<(), String> {
        let mut tags: Vec<TagId> = Vec::new();
        for member in members {
            if let Some(&id) = self.index.get(*member) {
                tags.push(id);
            } else if let Some(group) = self.groups.get(*member) {
                tags.extend_from_slice(group);
            } else {
                return Err(format!("unknown tag or group name: {member}"));
            }
        }
        tags.sort_unstable();
        tags.dedup();
        self.groups.insert(name.to_string(), tags);
        Ok(())
    }

    /// Members of a named group, or `None` if no such group was defined.
    pub fn group(&self, name: &str) -> Option<&[TagId]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Whether `tag` belongs to the named group. Unknown groups contain
    /// nothing.
    pub fn in_group(&self, tag: TagId, group: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|members| members.binary_search(&tag).is_ok())
    }

    /// Resolve a name to the set of tags it denotes: a tag name denotes
    /// itself, a group name denotes its members.
    pub fn resolve(&self, name: &str) -> Option<Vec<TagId>> {
        if let Some(&id) = self.index.get(name) {
            return Some(vec![id]);
        }
        self.groups.get(name).cloned()
    }
}

// Resource file loading.
//
// Three line-oriented formats share the conventions of the connection
// rule file: `@` lines are metadata, fields are whitespace-separated.
//
// - dictionary: `surface tag[.family]`, e.g. `돕 VV.B`
// - pre-analyzed cache: `surface analysis(^analysis)*` where an analysis
//   is `morpheme/tag(+morpheme/tag)*`
// - configuration: `key=value` pairs naming the other resource files
//
// Lines with an undeclared tag are logged and skipped so one stale entry
// cannot block a whole dictionary; structurally malformed lines fail the
// load.

use hashbrown::HashMap;
use kormo_core::jamo::decompose;
use kormo_core::morpheme::{Candidate, Morpheme, PhonemeClass};
use kormo_core::tag::TagSet;
use kormo_trie::{DictTrie, StoreOutcome};
use log::warn;

use crate::LoadError;

/// Counters reported by a dictionary or cache load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub lines: usize,
    pub entries: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

/// Pre-analyzed eojeol cache: surface to its fixed candidate list.
pub type PreanalyzedCache = HashMap<String, Vec<Candidate>>;

fn parse_family(name: &str) -> Option<PhonemeClass> {
    if let Ok(code) = name.parse::<u8>() {
        return PhonemeClass::from_code(code);
    }
    match name {
        "B" => Some(PhonemeClass::IrregularB),
        "D" => Some(PhonemeClass::IrregularD),
        "S" => Some(PhonemeClass::IrregularS),
        "H" => Some(PhonemeClass::IrregularH),
        "LEU" => Some(PhonemeClass::IrregularLeu),
        "LEO" => Some(PhonemeClass::IrregularLeo),
        _ => None,
    }
}

/// Load dictionary entries from `text` into `trie`.
pub fn load_dictionary(
    file: &str,
    text: &str,
    tags: &TagSet,
    trie: &mut DictTrie,
) -> Result<LoadStats, LoadError> {
    let parse_err = |line: usize, msg: String| LoadError::Parse {
        file: file.to_string(),
        line,
        msg,
    };
    let mut stats = LoadStats::default();
    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('@') {
            continue;
        }
        stats.lines += 1;
        let mut fields = line.split_whitespace();
        let (surface, spec) = match (fields.next(), fields.next(), fields.next()) {
            (Some(surface), Some(spec), None) => (surface, spec),
            _ => return Err(parse_err(lineno, format!("expected 'surface tag': '{line}'"))),
        };
        let (tag_name, family) = match spec.split_once('.') {
            Some((tag_name, family_name)) => {
                let family = parse_family(family_name).ok_or_else(|| {
                    parse_err(lineno, format!("unknown irregular family '{family_name}'"))
                })?;
                (tag_name, family)
            }
            None => (spec, PhonemeClass::Regular),
        };
        let Some(tag) = tags.id(tag_name) else {
            warn!("{file}:{lineno}: skipping entry with undeclared tag '{tag_name}'");
            stats.skipped += 1;
            continue;
        };
        let key = decompose(surface);
        if key.is_empty() {
            return Err(parse_err(lineno, "empty surface".into()));
        }
        match trie.store(&key, tag, family)? {
            StoreOutcome::Inserted => stats.entries += 1,
            StoreOutcome::Duplicate => stats.duplicates += 1,
        }
    }
    Ok(stats)
}

/// Load the pre-analyzed eojeol cache.
pub fn load_preanalyzed(
    file: &str,
    text: &str,
    tags: &TagSet,
) -> Result<(PreanalyzedCache, LoadStats), LoadError> {
    let parse_err = |line: usize, msg: String| LoadError::Parse {
        file: file.to_string(),
        line,
        msg,
    };
    let mut cache = PreanalyzedCache::new();
    let mut stats = LoadStats::default();
    'line: for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('@') {
            continue;
        }
        stats.lines += 1;
        let (surface, analyses) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| parse_err(lineno, format!("expected 'surface analyses': '{line}'")))?;
        let mut candidates: Vec<Candidate> = Vec::new();
        for analysis in analyses.trim().split('^') {
            let mut candidate: Candidate = Vec::new();
            for part in analysis.split('+') {
                let (morph, tag_name) = part
                    .split_once('/')
                    .ok_or_else(|| parse_err(lineno, format!("expected 'morpheme/tag': '{part}'")))?;
                if morph.is_empty() {
                    return Err(parse_err(lineno, "empty morpheme".into()));
                }
                let Some(tag) = tags.id(tag_name) else {
                    warn!("{file}:{lineno}: skipping analysis with undeclared tag '{tag_name}'");
                    stats.skipped += 1;
                    continue 'line;
                };
                candidate.push(Morpheme::new(morph.to_string(), tag));
            }
            candidates.push(candidate);
        }
        if cache.insert(surface.to_string(), candidates).is_some() {
            stats.duplicates += 1;
        } else {
            stats.entries += 1;
        }
    }
    Ok((cache, stats))
}

/// Resource file names read from the analyzer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceConfig {
    pub dictionary: String,
    pub connection: String,
    pub exceptions: Option<String>,
    pub preanalyzed: Option<String>,
    pub user_dictionary: Option<String>,
}

/// Parse the `key=value` configuration file.
pub fn parse_config(file: &str, text: &str) -> Result<ResourceConfig, LoadError> {
    let mut dictionary = None;
    let mut connection = None;
    let mut exceptions = None;
    let mut preanalyzed = None;
    let mut user_dictionary = None;
    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('@') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(LoadError::Parse {
                file: file.to_string(),
                line: lineno,
                msg: format!("expected 'key=value': '{line}'"),
            });
        };
        let value = value.trim().to_string();
        match key.trim() {
            "dictionary" => dictionary = Some(value),
            "connection" => connection = Some(value),
            "exceptions" => exceptions = Some(value),
            "preanalyzed" => preanalyzed = Some(value),
            "user_dictionary" => user_dictionary = Some(value),
            other => warn!("{file}:{lineno}: ignoring unknown key '{other}'"),
        }
    }
    Ok(ResourceConfig {
        dictionary: dictionary.ok_or(LoadError::MissingResource {
            key: "dictionary",
            file: file.to_string(),
        })?,
        connection: connection.ok_or(LoadError::MissingResource {
            key: "connection",
            file: file.to_string(),
        })?,
        exceptions,
        preanalyzed,
        user_dictionary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> TagSet {
        let mut tags = TagSet::new();
        for name in ["NNG", "VV", "EP", "EF"] {
            tags.intern(name);
        }
        tags
    }

    #[test]
    fn dictionary_entries_and_families() {
        let tags = tags();
        let mut trie = DictTrie::new(1024);
        let text = "\
@name test dictionary
먹 VV
돕 VV.B
듣 VV.D
다 EF
";
        let stats = load_dictionary("dict", text, &tags, &mut trie).unwrap();
        assert_eq!(stats.entries, 4);
        assert_eq!(stats.skipped, 0);
        let entry = trie.fetch(&decompose("돕")).unwrap()[0];
        assert_eq!(entry.phoneme, PhonemeClass::IrregularB);
        let entry = trie.fetch(&decompose("먹")).unwrap()[0];
        assert_eq!(entry.phoneme, PhonemeClass::Regular);
    }

    #[test]
    fn undeclared_tag_is_skipped_not_fatal() {
        let tags = tags();
        let mut trie = DictTrie::new(1024);
        let stats = load_dictionary("dict", "먹 VV\n값 XYZ\n", &tags, &mut trie).unwrap();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.skipped, 1);
        assert!(trie.fetch(&decompose("값")).is_none());
    }

    #[test]
    fn duplicates_are_counted_once() {
        let tags = tags();
        let mut trie = DictTrie::new(1024);
        let stats = load_dictionary("dict", "먹 VV\n먹 VV\n", &tags, &mut trie).unwrap();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn malformed_dictionary_line_fails() {
        let tags = tags();
        let mut trie = DictTrie::new(1024);
        let err = load_dictionary("dict", "먹\n", &tags, &mut trie).unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 1, .. }));
        let err = load_dictionary("dict", "돕 VV.X\n", &tags, &mut trie).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn preanalyzed_cache() {
        let tags = tags();
        let text = "먹었다 먹/VV+었/EP+다/EF^먹었/NNG+다/EF\n";
        let (cache, stats) = load_preanalyzed("pre", text, &tags).unwrap();
        assert_eq!(stats.entries, 1);
        let candidates = &cache["먹었다"];
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].len(), 3);
        assert_eq!(candidates[0][0].surface, "먹");
        assert_eq!(candidates[1][0].surface, "먹었");
    }

    #[test]
    fn preanalyzed_undeclared_tag_skips_line() {
        let tags = tags();
        let text = "먹었다 먹/QQ+었다/EF\n가 가/VV\n";
        let (cache, stats) = load_preanalyzed("pre", text, &tags).unwrap();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.skipped, 1);
        assert!(!cache.contains_key("먹었다"));
        assert!(cache.contains_key("가"));
    }

    #[test]
    fn config_keys() {
        let text = "\
@analyzer resources
dictionary=system.dic
connection=connection.rul
preanalyzed=preanalyzed.dic
";
        let config = parse_config("kormo.cfg", text).unwrap();
        assert_eq!(config.dictionary, "system.dic");
        assert_eq!(config.connection, "connection.rul");
        assert_eq!(config.preanalyzed.as_deref(), Some("preanalyzed.dic"));
        assert!(config.exceptions.is_none());
        assert!(config.user_dictionary.is_none());
    }

    #[test]
    fn config_requires_core_resources() {
        let err = parse_config("kormo.cfg", "connection=c.rul\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingResource { key: "dictionary", .. }
        ));
    }
}

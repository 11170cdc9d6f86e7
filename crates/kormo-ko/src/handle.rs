// Analyzer handle.
//
// Owns every loaded table plus the reusable chart working storage. One
// handle serves one caller at a time; `&mut self` on the analysis entry
// points is what enforces that. Dropping the handle releases everything.

use std::path::Path;

use kormo_core::morpheme::{Candidate, EojeolAnalysis, Morpheme, Sentence, SentenceAnalysis};
use kormo_core::tag::{TagId, TagSet};
use kormo_trie::DictTrie;
use log::{info, warn};

use crate::chart::{Chart, Resources, SpecialTags};
use crate::connection::{ConnectionGroups, ConnectionTable, ExceptionTable};
use crate::connection::{parse_connection_file, parse_exception_file};
use crate::dictionary::{
    PreanalyzedCache, load_dictionary, load_preanalyzed, parse_config,
};
use crate::rules::STANDARD_RULES;
use crate::touchup;
use crate::{AnalyzeError, LoadError};

/// Capacities and tag/group names the analyzer is built with. All
/// working-storage limits are set here, not hard-coded at the use site.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Lattice positions per eojeol, splices included.
    pub max_positions: usize,
    /// Chart edges per eojeol.
    pub max_edges: usize,
    /// Candidates returned per eojeol.
    pub max_candidates: usize,
    /// Node pool of the system dictionary trie.
    pub dict_pool: usize,
    /// Node pool of the user dictionary trie.
    pub user_dict_pool: usize,
    /// Node pool of the per-eojeol reverse suffix trie.
    pub reverse_pool: usize,
    pub unknown_tag: String,
    pub number_tag: String,
    pub foreign_tag: String,
    pub verb_group: String,
    pub pronoun_group: String,
    pub ending_group: String,
    pub particle_group: String,
    pub noun_group: String,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            max_positions: 128,
            max_edges: 256,
            max_candidates: 64,
            dict_pool: 262_144,
            user_dict_pool: 16_384,
            reverse_pool: 4_096,
            unknown_tag: "UNK".to_string(),
            number_tag: "SN".to_string(),
            foreign_tag: "SL".to_string(),
            verb_group: "verb".to_string(),
            pronoun_group: "pron".to_string(),
            ending_group: "ending".to_string(),
            particle_group: "particle".to_string(),
            noun_group: "noun".to_string(),
        }
    }
}

/// One named resource file's content.
#[derive(Debug, Clone, Copy)]
pub struct ResourceText<'a> {
    pub name: &'a str,
    pub text: &'a str,
}

/// The full resource set an analyzer is built from.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSet<'a> {
    pub connection: ResourceText<'a>,
    pub dictionary: ResourceText<'a>,
    pub exceptions: Option<ResourceText<'a>>,
    pub preanalyzed: Option<ResourceText<'a>>,
    pub user_dictionary: Option<ResourceText<'a>>,
}

/// The morphological analyzer.
#[derive(Debug)]
pub struct KoreanAnalyzer {
    tags: TagSet,
    system: DictTrie,
    user: Option<DictTrie>,
    connection: ConnectionTable,
    exceptions: ExceptionTable,
    preanalyzed: PreanalyzedCache,
    special: SpecialTags,
    verb_tags: Vec<TagId>,
    pronoun_tags: Vec<TagId>,
    ending_tags: Vec<TagId>,
    options: AnalyzerOptions,
    chart: Chart,
}

impl KoreanAnalyzer {
    /// Build an analyzer from a resource directory. `config_file` names
    /// the `key=value` file (relative to `base_dir`) listing the other
    /// resources.
    pub fn initialize(
        base_dir: &Path,
        config_file: &str,
        options: AnalyzerOptions,
    ) -> Result<Self, LoadError> {
        let read = |name: &str| -> Result<String, LoadError> {
            let path = base_dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
                file: path.display().to_string(),
                source,
            })
        };
        let config = parse_config(config_file, &read(config_file)?)?;
        let connection_text = read(&config.connection)?;
        let dictionary_text = read(&config.dictionary)?;
        let exceptions_text = config.exceptions.as_deref().map(&read).transpose()?;
        let preanalyzed_text = config.preanalyzed.as_deref().map(&read).transpose()?;
        let user_text = config.user_dictionary.as_deref().map(&read).transpose()?;
        Self::from_texts(
            ResourceSet {
                connection: ResourceText {
                    name: &config.connection,
                    text: &connection_text,
                },
                dictionary: ResourceText {
                    name: &config.dictionary,
                    text: &dictionary_text,
                },
                exceptions: config
                    .exceptions
                    .as_deref()
                    .zip(exceptions_text.as_deref())
                    .map(|(name, text)| ResourceText { name, text }),
                preanalyzed: config
                    .preanalyzed
                    .as_deref()
                    .zip(preanalyzed_text.as_deref())
                    .map(|(name, text)| ResourceText { name, text }),
                user_dictionary: config
                    .user_dictionary
                    .as_deref()
                    .zip(user_text.as_deref())
                    .map(|(name, text)| ResourceText { name, text }),
            },
            options,
        )
    }

    /// Build an analyzer from in-memory resource texts.
    pub fn from_texts(
        resources: ResourceSet<'_>,
        options: AnalyzerOptions,
    ) -> Result<Self, LoadError> {
        let mut tags = TagSet::new();
        // Built-in tags must exist before the adjacency matrix is sized.
        let unknown = tags.intern(&options.unknown_tag);
        let number = tags.intern(&options.number_tag);
        let foreign = tags.intern(&options.foreign_tag);

        let groups = ConnectionGroups {
            noun_like: options.noun_group.clone(),
            ending: options.ending_group.clone(),
            particle: options.particle_group.clone(),
        };
        let connection = parse_connection_file(
            resources.connection.name,
            resources.connection.text,
            &mut tags,
            &groups,
            &options.unknown_tag,
        )?;

        let exceptions = match resources.exceptions {
            Some(r) => parse_exception_file(r.name, r.text, &tags)?,
            None => ExceptionTable::default(),
        };

        let mut system = DictTrie::new(options.dict_pool);
        let stats = load_dictionary(
            resources.dictionary.name,
            resources.dictionary.text,
            &tags,
            &mut system,
        )?;
        info!(
            "loaded {}: {} entries, {} skipped, {} duplicates",
            resources.dictionary.name, stats.entries, stats.skipped, stats.duplicates
        );

        let user = match resources.user_dictionary {
            Some(r) => {
                let mut trie = DictTrie::new(options.user_dict_pool);
                let stats = load_dictionary(r.name, r.text, &tags, &mut trie)?;
                info!("loaded {}: {} user entries", r.name, stats.entries);
                Some(trie)
            }
            None => None,
        };

        let preanalyzed = match resources.preanalyzed {
            Some(r) => {
                let (cache, stats) = load_preanalyzed(r.name, r.text, &tags)?;
                info!("loaded {}: {} pre-analyzed eojeols", r.name, stats.entries);
                cache
            }
            None => PreanalyzedCache::new(),
        };

        let group_tags = |name: &str| -> Vec<TagId> {
            match tags.group(name) {
                Some(members) => members.to_vec(),
                None => {
                    warn!("tag group '{name}' is not defined; related rules are disabled");
                    Vec::new()
                }
            }
        };
        let verb_tags = group_tags(&options.verb_group);
        let pronoun_tags = group_tags(&options.pronoun_group);
        let ending_tags = group_tags(&options.ending_group);

        let chart = Chart::new(&options);
        Ok(Self {
            tags,
            system,
            user,
            connection,
            exceptions,
            preanalyzed,
            special: SpecialTags {
                unknown,
                number,
                foreign,
            },
            verb_tags,
            pronoun_tags,
            ending_tags,
            options,
            chart,
        })
    }

    /// The tag inventory the analyzer was loaded with.
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// The loaded negative-exception table. Inspection only; see
    /// [`ExceptionTable`] for why it does not constrain analysis.
    pub fn exceptions(&self) -> &ExceptionTable {
        &self.exceptions
    }

    /// Analyze a single eojeol. The pre-analyzed cache wins outright;
    /// otherwise the chart search runs and its candidates are touched up.
    pub fn analyze_eojeol(&mut self, surface: &str) -> Result<Vec<Candidate>, AnalyzeError> {
        if let Some(cached) = self.preanalyzed.get(surface) {
            return Ok(cached.clone());
        }
        let res = Resources {
            system: &self.system,
            user: self.user.as_ref(),
            connection: &self.connection,
            rules: STANDARD_RULES,
            special: self.special,
            verb_tags: &self.verb_tags,
            pronoun_tags: &self.pronoun_tags,
            options: &self.options,
        };
        let mut found = self.chart.analyze(&res, surface)?;
        touchup::repair(&mut found, &self.ending_tags);
        Ok(found)
    }

    /// Analyze a whole sentence, carrying its stream metadata through.
    /// A per-eojeol failure degrades that eojeol to an unknown reading
    /// instead of failing the sentence.
    pub fn analyze(&mut self, sentence: &Sentence) -> SentenceAnalysis {
        let mut eojeols = Vec::with_capacity(sentence.eojeols.len());
        for surface in &sentence.eojeols {
            let candidates = match self.analyze_eojeol(surface) {
                Ok(candidates) => candidates,
                Err(err) => {
                    warn!("analysis of '{surface}' failed: {err}");
                    vec![vec![Morpheme::new(surface.clone(), self.special.unknown)]]
                }
            };
            eojeols.push(EojeolAnalysis {
                surface: surface.clone(),
                candidates,
            });
        }
        SentenceAnalysis {
            eojeols,
            document_id: sentence.document_id,
            sentence_id: sentence.sentence_id,
            end_of_document: sentence.end_of_document,
        }
    }
}

// Phonological rule expansion.
//
// Korean inflection contracts and mutates stems at the stem/ending
// boundary (갔다 is 가 + 았다, 고마워 is 고맙 + 어). Each rule below
// undoes one such surface change: given a jamo suffix, it proposes a
// candidate stem and the replacement ending suffix. Proposals are cheap
// and deliberately over-generate; the chart search validates every stem
// against the dictionary and every junction against the connection table.
//
// A rule fires at a split point k (jamo on the stem side). Guards test
// jamo at offsets relative to k; on a match the stem becomes
// `suffix[..k - strip] ++ stem_tail` and the replacement suffix becomes
// `ending_head ++ suffix[k + consume..]`.

use kormo_core::jamo::{is_jamo, is_vowel};
use kormo_core::morpheme::PhonemeClass;

use crate::connection::TagFilter;

/// Jamo class a guard can test.
#[derive(Debug, Clone, Copy)]
pub enum CharClass {
    Literal(char),
    OneOf(&'static [char]),
    Vowel,
    Consonant,
}

impl CharClass {
    pub fn matches(self, jamo: char) -> bool {
        match self {
            CharClass::Literal(c) => jamo == c,
            CharClass::OneOf(set) => set.contains(&jamo),
            CharClass::Vowel => is_vowel(jamo),
            CharClass::Consonant => is_jamo(jamo) && !is_vowel(jamo),
        }
    }
}

/// One guard: the jamo at `offset` from the split point must match.
/// Negative offsets look into the stem side.
#[derive(Debug, Clone, Copy)]
pub struct Guard {
    pub offset: isize,
    pub class: CharClass,
}

/// Dictionary group the proposed stem must come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StemKind {
    /// Verb or adjective stem; successor restricted to endings.
    VerbLike,
    /// Contracted pronoun; successor restricted to particles.
    Pronoun,
}

/// One rewrite rule. See the module comment for the firing semantics.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub guards: &'static [Guard],
    pub strip: usize,
    pub stem_tail: &'static [char],
    pub consume: usize,
    pub ending_head: &'static [char],
    /// Irregular family the dictionary stem must belong to.
    pub phoneme: PhonemeClass,
    pub stem_kind: StemKind,
    pub filter: TagFilter,
}

/// A successful rule application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub stem: Vec<char>,
    pub remainder: Vec<char>,
    pub phoneme: PhonemeClass,
    pub stem_kind: StemKind,
    pub filter: TagFilter,
    pub name: &'static str,
}

/// Apply every rule at every split point of `suffix`.
pub fn apply(rules: &[Rule], suffix: &[char]) -> Vec<RuleMatch> {
    let mut matches = Vec::new();
    let len = suffix.len();
    for rule in rules {
        for k in 1..=len {
            if k < rule.strip || k + rule.consume > len {
                continue;
            }
            let guards_hold = rule.guards.iter().all(|guard| {
                let idx = k as isize + guard.offset;
                if idx < 0 || idx >= len as isize {
                    return false;
                }
                guard.class.matches(suffix[idx as usize])
            });
            if !guards_hold {
                continue;
            }
            let mut stem = suffix[..k - rule.strip].to_vec();
            stem.extend_from_slice(rule.stem_tail);
            if stem.is_empty() {
                continue;
            }
            let mut remainder = rule.ending_head.to_vec();
            remainder.extend_from_slice(&suffix[k + rule.consume..]);
            matches.push(RuleMatch {
                stem,
                remainder,
                phoneme: rule.phoneme,
                stem_kind: rule.stem_kind,
                filter: rule.filter,
                name: rule.name,
            });
        }
    }
    matches
}

const ENDING_ONSETS: &[char] = &['ㄴ', 'ㅅ', 'ㄹ', 'ㅁ'];
const LOW_VOWELS: &[char] = &['ㅏ', 'ㅓ'];

/// The standard rule table.
pub static STANDARD_RULES: &[Rule] = &[
    // 가니 = 가 + 으니: the linking vowel 으 drops after a vowel stem.
    Rule {
        name: "eu-insertion",
        guards: &[
            Guard { offset: -1, class: CharClass::Vowel },
            Guard { offset: 0, class: CharClass::OneOf(ENDING_ONSETS) },
        ],
        strip: 0,
        stem_tail: &[],
        consume: 0,
        ending_head: &['ㅇ', 'ㅡ'],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 갑니다 = 가 + 습니다.
    Rule {
        name: "seu-insertion",
        guards: &[
            Guard { offset: -1, class: CharClass::Vowel },
            Guard { offset: 0, class: CharClass::Literal('ㅂ') },
            Guard { offset: 1, class: CharClass::Literal('ㄴ') },
        ],
        strip: 0,
        stem_tail: &[],
        consume: 1,
        ending_head: &['ㅅ', 'ㅡ', 'ㅂ'],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 간다 = 가 + 는다.
    Rule {
        name: "neu-insertion",
        guards: &[
            Guard { offset: -1, class: CharClass::Vowel },
            Guard { offset: 0, class: CharClass::Literal('ㄴ') },
            Guard { offset: 1, class: CharClass::Literal('ㄷ') },
        ],
        strip: 0,
        stem_tail: &[],
        consume: 1,
        ending_head: &['ㄴ', 'ㅡ', 'ㄴ'],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 갔다 = 가 + 았다: 아-initial ending elides after ㅏ.
    Rule {
        name: "a-elision",
        guards: &[Guard { offset: -1, class: CharClass::Literal('ㅏ') }],
        strip: 0,
        stem_tail: &[],
        consume: 0,
        ending_head: &['ㅇ', 'ㅏ'],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 섰다 = 서 + 었다.
    Rule {
        name: "eo-elision",
        guards: &[Guard { offset: -1, class: CharClass::Literal('ㅓ') }],
        strip: 0,
        stem_tail: &[],
        consume: 0,
        ending_head: &['ㅇ', 'ㅓ'],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 아팠다 = 아프 + 았다: stem-final ㅡ drops before ㅏ/ㅓ.
    Rule {
        name: "yu-elision-a",
        guards: &[
            Guard { offset: -1, class: CharClass::Consonant },
            Guard { offset: 0, class: CharClass::Literal('ㅏ') },
        ],
        strip: 0,
        stem_tail: &['ㅡ'],
        consume: 1,
        ending_head: &['ㅇ', 'ㅏ'],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 썼다 = 쓰 + 었다.
    Rule {
        name: "yu-elision-eo",
        guards: &[
            Guard { offset: -1, class: CharClass::Consonant },
            Guard { offset: 0, class: CharClass::Literal('ㅓ') },
        ],
        strip: 0,
        stem_tail: &['ㅡ'],
        consume: 1,
        ending_head: &['ㅇ', 'ㅓ'],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 했다 = 하 + 였다.
    Rule {
        name: "yeo-contraction",
        guards: &[
            Guard { offset: -2, class: CharClass::Literal('ㅎ') },
            Guard { offset: -1, class: CharClass::Literal('ㅐ') },
        ],
        strip: 1,
        stem_tail: &['ㅏ'],
        consume: 0,
        ending_head: &['ㅇ', 'ㅕ'],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 봤다 = 보 + 았다.
    Rule {
        name: "wa-contraction",
        guards: &[
            Guard { offset: -1, class: CharClass::Consonant },
            Guard { offset: 0, class: CharClass::Literal('ㅘ') },
        ],
        strip: 0,
        stem_tail: &['ㅗ'],
        consume: 1,
        ending_head: &['ㅇ', 'ㅏ'],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 줬다 = 주 + 었다.
    Rule {
        name: "wo-contraction",
        guards: &[
            Guard { offset: -1, class: CharClass::Consonant },
            Guard { offset: 0, class: CharClass::Literal('ㅝ') },
        ],
        strip: 0,
        stem_tail: &['ㅜ'],
        consume: 1,
        ending_head: &['ㅇ', 'ㅓ'],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 됐다 = 되 + 었다.
    Rule {
        name: "wae-contraction",
        guards: &[
            Guard { offset: -1, class: CharClass::Consonant },
            Guard { offset: 0, class: CharClass::Literal('ㅙ') },
        ],
        strip: 0,
        stem_tail: &['ㅚ'],
        consume: 1,
        ending_head: &['ㅇ', 'ㅓ'],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 들어 = 듣 + 어: stem-final ㄷ surfaces as ㄹ before a vowel.
    Rule {
        name: "d-irregular",
        guards: &[
            Guard { offset: -1, class: CharClass::Literal('ㄹ') },
            Guard { offset: 0, class: CharClass::Literal('ㅇ') },
            Guard { offset: 1, class: CharClass::Vowel },
        ],
        strip: 1,
        stem_tail: &['ㄷ'],
        consume: 0,
        ending_head: &[],
        phoneme: PhonemeClass::IrregularD,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 나아 = 낫 + 아: stem-final ㅅ drops before a vowel.
    Rule {
        name: "s-irregular",
        guards: &[
            Guard { offset: -1, class: CharClass::Vowel },
            Guard { offset: 0, class: CharClass::Literal('ㅇ') },
            Guard { offset: 1, class: CharClass::Vowel },
        ],
        strip: 0,
        stem_tail: &['ㅅ'],
        consume: 0,
        ending_head: &[],
        phoneme: PhonemeClass::IrregularS,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 고마워 = 고맙 + 어: stem-final ㅂ rounds the ending vowel.
    Rule {
        name: "b-irregular-wo",
        guards: &[
            Guard { offset: -1, class: CharClass::Vowel },
            Guard { offset: 0, class: CharClass::Literal('ㅇ') },
            Guard { offset: 1, class: CharClass::Literal('ㅝ') },
        ],
        strip: 0,
        stem_tail: &['ㅂ'],
        consume: 2,
        ending_head: &['ㅇ', 'ㅓ'],
        phoneme: PhonemeClass::IrregularB,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 고와 = 곱 + 아.
    Rule {
        name: "b-irregular-wa",
        guards: &[
            Guard { offset: -1, class: CharClass::Vowel },
            Guard { offset: 0, class: CharClass::Literal('ㅇ') },
            Guard { offset: 1, class: CharClass::Literal('ㅘ') },
        ],
        strip: 0,
        stem_tail: &['ㅂ'],
        consume: 2,
        ending_head: &['ㅇ', 'ㅏ'],
        phoneme: PhonemeClass::IrregularB,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 파래 = 파랗 + 아: stem-final ㅎ drops, ㅏ+아 fuses to ㅐ.
    Rule {
        name: "h-irregular-ae",
        guards: &[
            Guard { offset: -1, class: CharClass::Consonant },
            Guard { offset: 0, class: CharClass::Literal('ㅐ') },
        ],
        strip: 0,
        stem_tail: &['ㅏ', 'ㅎ'],
        consume: 1,
        ending_head: &['ㅇ', 'ㅏ'],
        phoneme: PhonemeClass::IrregularH,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 그레 variants with ㅓ+어 fusing to ㅔ.
    Rule {
        name: "h-irregular-e",
        guards: &[
            Guard { offset: -1, class: CharClass::Consonant },
            Guard { offset: 0, class: CharClass::Literal('ㅔ') },
        ],
        strip: 0,
        stem_tail: &['ㅓ', 'ㅎ'],
        consume: 1,
        ending_head: &['ㅇ', 'ㅓ'],
        phoneme: PhonemeClass::IrregularH,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 흘러 = 흐르 + 어: 르 stems double the ㄹ.
    Rule {
        name: "leu-irregular",
        guards: &[
            Guard { offset: -1, class: CharClass::Literal('ㄹ') },
            Guard { offset: 0, class: CharClass::Literal('ㄹ') },
            Guard { offset: 1, class: CharClass::OneOf(LOW_VOWELS) },
        ],
        strip: 0,
        stem_tail: &['ㅡ'],
        consume: 1,
        ending_head: &['ㅇ'],
        phoneme: PhonemeClass::IrregularLeu,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 이르러 = 이르 + 어: 러-class stems keep the stem and mutate the
    // ending's onset instead.
    Rule {
        name: "leo-irregular",
        guards: &[
            Guard { offset: -2, class: CharClass::Literal('ㄹ') },
            Guard { offset: -1, class: CharClass::Literal('ㅡ') },
            Guard { offset: 0, class: CharClass::Literal('ㄹ') },
            Guard { offset: 1, class: CharClass::Literal('ㅓ') },
        ],
        strip: 0,
        stem_tail: &[],
        consume: 1,
        ending_head: &['ㅇ'],
        phoneme: PhonemeClass::IrregularLeo,
        stem_kind: StemKind::VerbLike,
        filter: TagFilter::Endings,
    },
    // 내가 = 나 + 가. The contraction only stands before the particle 가.
    Rule {
        name: "nae-contraction",
        guards: &[
            Guard { offset: -2, class: CharClass::Literal('ㄴ') },
            Guard { offset: -1, class: CharClass::Literal('ㅐ') },
            Guard { offset: 0, class: CharClass::Literal('ㄱ') },
            Guard { offset: 1, class: CharClass::Literal('ㅏ') },
        ],
        strip: 1,
        stem_tail: &['ㅏ'],
        consume: 0,
        ending_head: &[],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::Pronoun,
        filter: TagFilter::Particles,
    },
    // 네가 = 너 + 가.
    Rule {
        name: "ne-contraction",
        guards: &[
            Guard { offset: -2, class: CharClass::Literal('ㄴ') },
            Guard { offset: -1, class: CharClass::Literal('ㅔ') },
            Guard { offset: 0, class: CharClass::Literal('ㄱ') },
            Guard { offset: 1, class: CharClass::Literal('ㅏ') },
        ],
        strip: 1,
        stem_tail: &['ㅓ'],
        consume: 0,
        ending_head: &[],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::Pronoun,
        filter: TagFilter::Particles,
    },
    // 제가 = 저 + 가.
    Rule {
        name: "je-contraction",
        guards: &[
            Guard { offset: -2, class: CharClass::Literal('ㅈ') },
            Guard { offset: -1, class: CharClass::Literal('ㅔ') },
            Guard { offset: 0, class: CharClass::Literal('ㄱ') },
            Guard { offset: 1, class: CharClass::Literal('ㅏ') },
        ],
        strip: 1,
        stem_tail: &['ㅓ'],
        consume: 0,
        ending_head: &[],
        phoneme: PhonemeClass::Any,
        stem_kind: StemKind::Pronoun,
        filter: TagFilter::Particles,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use kormo_core::jamo::decompose;

    fn matches_of(text: &str) -> Vec<RuleMatch> {
        apply(STANDARD_RULES, &decompose(text))
    }

    fn has(text: &str, stem: &str, remainder: &str, name: &str) -> bool {
        matches_of(text).iter().any(|m| {
            m.name == name && m.stem == decompose(stem) && m.remainder == decompose(remainder)
        })
    }

    #[test]
    fn linking_vowel_insertions() {
        assert!(has("가니", "가", "으니", "eu-insertion"));
        assert!(has("갑니다", "가", "습니다", "seu-insertion"));
        assert!(has("간다", "가", "는다", "neu-insertion"));
    }

    #[test]
    fn vowel_elisions() {
        assert!(has("갔다", "가", "았다", "a-elision"));
        assert!(has("섰다", "서", "었다", "eo-elision"));
        assert!(has("아팠다", "아프", "았다", "yu-elision-a"));
        assert!(has("썼다", "쓰", "었다", "yu-elision-eo"));
        // The bare imperative: 가 = 가 + 아.
        assert!(has("가", "가", "아", "a-elision"));
    }

    #[test]
    fn contractions() {
        assert!(has("했다", "하", "였다", "yeo-contraction"));
        assert!(has("봤다", "보", "았다", "wa-contraction"));
        assert!(has("줬다", "주", "었다", "wo-contraction"));
        assert!(has("됐다", "되", "었다", "wae-contraction"));
    }

    #[test]
    fn irregular_families() {
        assert!(has("들어", "듣", "어", "d-irregular"));
        assert!(has("나아", "낫", "아", "s-irregular"));
        assert!(has("고마워", "고맙", "어", "b-irregular-wo"));
        assert!(has("고와", "곱", "아", "b-irregular-wa"));
        assert!(has("파래", "파랗", "아", "h-irregular-ae"));
        assert!(has("흘러", "흐르", "어", "leu-irregular"));
        assert!(has("몰라", "모르", "아", "leu-irregular"));
        assert!(has("이르러", "이르", "어", "leo-irregular"));
    }

    #[test]
    fn irregulars_carry_their_family() {
        let m = matches_of("들어");
        let d = m.iter().find(|m| m.name == "d-irregular").unwrap();
        assert_eq!(d.phoneme, PhonemeClass::IrregularD);
        // 러 stems do not fire the 르 rule and vice versa.
        assert!(!matches_of("이르러").iter().any(|m| m.name == "leu-irregular"));
        assert!(!matches_of("흘러").iter().any(|m| m.name == "leo-irregular"));
    }

    #[test]
    fn pronoun_contractions() {
        let m = matches_of("내가");
        let nae = m.iter().find(|m| m.name == "nae-contraction").unwrap();
        assert_eq!(nae.stem, decompose("나"));
        assert_eq!(nae.remainder, decompose("가"));
        assert_eq!(nae.stem_kind, StemKind::Pronoun);
        assert_eq!(nae.filter, TagFilter::Particles);
        assert!(has("네가", "너", "가", "ne-contraction"));
        assert!(has("제가", "저", "가", "je-contraction"));
        // Not before other particles.
        assert!(!matches_of("내는").iter().any(|m| m.name == "nae-contraction"));
    }

    #[test]
    fn over_generation_is_expected() {
        // 먹 fires eo-elision as 머 + 억; the dictionary filter is what
        // discards such proposals, not the rule table.
        assert!(has("먹", "머", "억", "eo-elision"));
        // ㅡ offers no rule a foothold at all.
        assert!(matches_of("므").is_empty());
    }

    #[test]
    fn self_regenerating_suffix() {
        // 으니 proposes stem 으 with remainder 으니, the suffix itself.
        // The chart search must treat such splices as non-advancing.
        let m = matches_of("으니");
        let eu = m.iter().find(|m| m.name == "eu-insertion").unwrap();
        assert_eq!(eu.remainder, decompose("으니"));
    }
}

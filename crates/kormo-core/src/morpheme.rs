// Analysis result types and sentence metadata.

use crate::tag::TagId;

/// Irregular-conjugation family of a morpheme.
///
/// Stored next to the tag in every dictionary entry; phonological rules
/// that reconstruct an irregular stem only accept dictionary hits from the
/// matching family. `Any` is the wildcard that matches every family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhonemeClass {
    /// Regular conjugation (or not a conjugating morpheme).
    Regular,
    /// ㅂ-irregular (돕 -> 도우).
    IrregularB,
    /// ㄷ-irregular (듣 -> 들).
    IrregularD,
    /// ㅅ-irregular (낫 -> 나).
    IrregularS,
    /// ㅎ-irregular (파랗 -> 파래).
    IrregularH,
    /// 르-irregular (흐르 -> 흘러).
    IrregularLeu,
    /// 러-irregular (이르 -> 이르러).
    IrregularLeo,
    /// Matches any class.
    Any,
}

impl PhonemeClass {
    /// Decode the integer code used in dictionary files.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Regular,
            1 => Self::IrregularB,
            2 => Self::IrregularD,
            3 => Self::IrregularS,
            4 => Self::IrregularH,
            5 => Self::IrregularLeu,
            6 => Self::IrregularLeo,
            7 => Self::Any,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Regular => 0,
            Self::IrregularB => 1,
            Self::IrregularD => 2,
            Self::IrregularS => 3,
            Self::IrregularH => 4,
            Self::IrregularLeu => 5,
            Self::IrregularLeo => 6,
            Self::Any => 7,
        }
    }

    /// Whether an entry of class `self` satisfies a requirement of class
    /// `wanted`. `Any` on either side matches.
    pub fn matches(self, wanted: PhonemeClass) -> bool {
        self == PhonemeClass::Any || wanted == PhonemeClass::Any || self == wanted
    }
}

/// One tagged morpheme of a decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morpheme {
    /// Recomposed surface form of the morpheme.
    pub surface: String,
    pub tag: TagId,
}

impl Morpheme {
    pub fn new(surface: impl Into<String>, tag: TagId) -> Self {
        Self {
            surface: surface.into(),
            tag,
        }
    }
}

/// One candidate decomposition of an eojeol: an ordered morpheme sequence.
pub type Candidate = Vec<Morpheme>;

/// One already-segmented input sentence handed to the analyzer.
///
/// The identifying metadata is carried through analysis unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Whitespace-delimited word units, in order.
    pub eojeols: Vec<String>,
    pub document_id: u64,
    pub sentence_id: u64,
    pub end_of_document: bool,
}

/// Analysis of one eojeol: the surface and its candidate decompositions,
/// best-effort ordered (dictionary paths before fallback paths).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EojeolAnalysis {
    pub surface: String,
    pub candidates: Vec<Candidate>,
}

/// Per-sentence analysis output; mirrors the [`Sentence`] metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceAnalysis {
    pub eojeols: Vec<EojeolAnalysis>,
    pub document_id: u64,
    pub sentence_id: u64,
    pub end_of_document: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phoneme_class_codes_round_trip() {
        for code in 0..=7u8 {
            let class = PhonemeClass::from_code(code).unwrap();
            assert_eq!(class.code(), code);
        }
        assert_eq!(PhonemeClass::from_code(8), None);
    }

    #[test]
    fn phoneme_class_matching() {
        assert!(PhonemeClass::IrregularB.matches(PhonemeClass::IrregularB));
        assert!(PhonemeClass::Any.matches(PhonemeClass::IrregularD));
        assert!(PhonemeClass::Regular.matches(PhonemeClass::Any));
        assert!(!PhonemeClass::Regular.matches(PhonemeClass::IrregularB));
    }

    #[test]
    fn morpheme_construction() {
        let m = Morpheme::new("먹", 3);
        assert_eq!(m.surface, "먹");
        assert_eq!(m.tag, 3);
    }
}

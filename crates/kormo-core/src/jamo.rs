// Hangul syllable / jamo conversion utilities.
//
// Every core structure of the analyzer (tries, lattice, rules) indexes and
// compares individual jamo, never composed syllables. Jamo are represented
// as Unicode compatibility jamo characters (U+3131..U+3163) so that a jamo
// sequence is an ordinary `&[char]` and compound vowels/trails (ㅘ, ㄺ, ...)
// are single elements.

/// First precomposed Hangul syllable (가).
const SYLLABLE_BASE: u32 = 0xAC00;
/// Last precomposed Hangul syllable (힣).
const SYLLABLE_LAST: u32 = 0xD7A3;

const JUNGSEONG_COUNT: u32 = 21;
const JONGSEONG_COUNT: u32 = 28;

/// The 19 lead consonants, in syllable-index order.
pub const LEADS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ',
    'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// The 21 vowels, in syllable-index order.
pub const VOWELS: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ',
    'ㅞ', 'ㅟ', 'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

/// The 27 trail consonants, in syllable-index order (index 0 = no trail
/// is not represented here; `TRAILS[0]` corresponds to syllable index 1).
pub const TRAILS: [char; 27] = [
    'ㄱ', 'ㄲ', 'ㄳ', 'ㄴ', 'ㄵ', 'ㄶ', 'ㄷ', 'ㄹ', 'ㄺ', 'ㄻ', 'ㄼ', 'ㄽ', 'ㄾ', 'ㄿ', 'ㅀ',
    'ㅁ', 'ㅂ', 'ㅄ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅊ', 'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// Vowels that count as "positive" (bright) for vowel harmony.
pub const POSITIVE_VOWELS: [char; 6] = ['ㅏ', 'ㅑ', 'ㅗ', 'ㅛ', 'ㅘ', 'ㅚ'];

/// Index of `c` in the lead-consonant table.
pub fn lead_index(c: char) -> Option<usize> {
    LEADS.iter().position(|&l| l == c)
}

/// Index of `c` in the vowel table.
pub fn vowel_index(c: char) -> Option<usize> {
    VOWELS.iter().position(|&v| v == c)
}

/// Index of `c` in the trail-consonant table (0-based; add one for the
/// syllable formula).
pub fn trail_index(c: char) -> Option<usize> {
    TRAILS.iter().position(|&t| t == c)
}

/// Whether `c` can appear as a lead consonant.
pub fn is_lead(c: char) -> bool {
    lead_index(c).is_some()
}

/// Whether `c` is a vowel jamo.
pub fn is_vowel(c: char) -> bool {
    vowel_index(c).is_some()
}

/// Whether `c` can appear as a trail consonant.
pub fn is_trail(c: char) -> bool {
    trail_index(c).is_some()
}

/// Whether `c` is any compatibility jamo this module knows about.
pub fn is_jamo(c: char) -> bool {
    is_lead(c) || is_vowel(c) || is_trail(c)
}

/// Whether `c` is a vowel on the positive (bright) side of vowel harmony.
pub fn is_positive_vowel(c: char) -> bool {
    POSITIVE_VOWELS.contains(&c)
}

/// Whether `c` is a precomposed Hangul syllable.
pub fn is_syllable(c: char) -> bool {
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&(c as u32))
}

/// Compose a syllable from table indices. `trail` is the syllable-formula
/// index: 0 for no trail, 1..=27 for `TRAILS[trail - 1]`.
pub fn compose_syllable(lead: usize, vowel: usize, trail: usize) -> Option<char> {
    if lead >= LEADS.len() || vowel as u32 >= JUNGSEONG_COUNT || trail as u32 >= JONGSEONG_COUNT {
        return None;
    }
    let code = SYLLABLE_BASE
        + (lead as u32 * JUNGSEONG_COUNT + vowel as u32) * JONGSEONG_COUNT
        + trail as u32;
    char::from_u32(code)
}

/// Decompose a precomposed syllable into (lead, vowel, trail) table indices.
/// The trail index uses the syllable formula (0 = none).
pub fn decompose_syllable(c: char) -> Option<(usize, usize, usize)> {
    if !is_syllable(c) {
        return None;
    }
    let offset = c as u32 - SYLLABLE_BASE;
    let trail = offset % JONGSEONG_COUNT;
    let vowel = (offset / JONGSEONG_COUNT) % JUNGSEONG_COUNT;
    let lead = offset / (JONGSEONG_COUNT * JUNGSEONG_COUNT);
    Some((lead as usize, vowel as usize, trail as usize))
}

/// Decompose one syllable into its two or three jamo characters, appending
/// them to `out`. Non-syllable characters are appended unchanged.
pub fn push_decomposed(c: char, out: &mut Vec<char>) {
    match decompose_syllable(c) {
        Some((l, v, t)) => {
            out.push(LEADS[l]);
            out.push(VOWELS[v]);
            if t > 0 {
                out.push(TRAILS[t - 1]);
            }
        }
        None => out.push(c),
    }
}

/// Decompose a string into a jamo sequence. Precomposed syllables become
/// their jamo triples; every other character (ASCII, standalone jamo, ...)
/// passes through as itself.
pub fn decompose(text: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(text.chars().count() * 3);
    for c in text.chars() {
        push_decomposed(c, &mut out);
    }
    out
}

/// Recompose a jamo sequence into precomposed syllables.
///
/// Greedy left-to-right scan: a lead followed by a vowel starts a syllable;
/// a following trail consonant is taken as the trail unless it is itself
/// the lead of the next syllable (i.e. a vowel comes right after it).
/// Characters that do not fit the pattern are emitted unchanged, so the
/// scan is total and `recompose(&decompose(s)) == s` for any string of
/// precomposed syllables and non-jamo characters.
pub fn recompose(jamo: &[char]) -> String {
    let mut out = String::with_capacity(jamo.len());
    let mut i = 0;
    while i < jamo.len() {
        let c = jamo[i];
        let lead = match lead_index(c) {
            Some(l) if i + 1 < jamo.len() => l,
            _ => {
                out.push(c);
                i += 1;
                continue;
            }
        };
        let vowel = match vowel_index(jamo[i + 1]) {
            Some(v) => v,
            None => {
                out.push(c);
                i += 1;
                continue;
            }
        };
        i += 2;
        let mut trail = 0;
        if i < jamo.len() {
            let starts_next = i + 1 < jamo.len() && is_vowel(jamo[i + 1]) && is_lead(jamo[i]);
            if !starts_next {
                if let Some(t) = trail_index(jamo[i]) {
                    trail = t + 1;
                    i += 1;
                }
            }
        }
        match compose_syllable(lead, vowel, trail) {
            Some(s) => out.push(s),
            None => {
                // Unreachable with valid table indices; keep the jamo.
                out.push(LEADS[lead]);
                out.push(VOWELS[vowel]);
            }
        }
    }
    out
}

/// One typed span of an eojeol.
///
/// Korean text is decomposed to jamo and analyzed; anything else (Latin,
/// Han, digits, punctuation) is carried as an opaque run that the chart
/// covers with a single edge. Keeping the distinction in the type means no
/// sentinel substring ever has to be spliced into the working text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A run of Hangul, already decomposed to jamo.
    Hangul(Vec<char>),
    /// A run of non-Hangul characters, kept verbatim.
    Foreign(String),
}

/// Split an eojeol into typed Hangul/Foreign segments.
///
/// Standalone compatibility jamo count as Hangul: they are already the
/// representation the analyzer works in.
pub fn segment(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut hangul: Vec<char> = Vec::new();
    let mut foreign = String::new();

    for c in text.chars() {
        if is_syllable(c) || is_jamo(c) {
            if !foreign.is_empty() {
                segments.push(Segment::Foreign(std::mem::take(&mut foreign)));
            }
            push_decomposed(c, &mut hangul);
        } else {
            if !hangul.is_empty() {
                segments.push(Segment::Hangul(std::mem::take(&mut hangul)));
            }
            foreign.push(c);
        }
    }
    if !foreign.is_empty() {
        segments.push(Segment::Foreign(foreign));
    }
    if !hangul.is_empty() {
        segments.push(Segment::Hangul(hangul));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompose_simple_syllables() {
        assert_eq!(decompose("가"), vec!['ㄱ', 'ㅏ']);
        assert_eq!(decompose("각"), vec!['ㄱ', 'ㅏ', 'ㄱ']);
        assert_eq!(decompose("한"), vec!['ㅎ', 'ㅏ', 'ㄴ']);
        assert_eq!(decompose("뷁"), vec!['ㅂ', 'ㅞ', 'ㄺ']);
    }

    #[test]
    fn decompose_passes_ascii_through() {
        assert_eq!(decompose("a1"), vec!['a', '1']);
        assert_eq!(decompose("한a"), vec!['ㅎ', 'ㅏ', 'ㄴ', 'a']);
    }

    #[test]
    fn recompose_simple() {
        assert_eq!(recompose(&['ㄱ', 'ㅏ']), "가");
        assert_eq!(recompose(&['ㄱ', 'ㅏ', 'ㄱ']), "각");
        assert_eq!(recompose(&['ㅁ', 'ㅓ', 'ㄱ', 'ㅇ', 'ㅓ']), "먹어");
    }

    #[test]
    fn recompose_trail_vs_next_lead() {
        // The ㄱ between the vowels belongs to the second syllable.
        assert_eq!(recompose(&['ㄱ', 'ㅏ', 'ㄱ', 'ㅏ']), "가가");
        // Followed by a consonant it stays a trail.
        assert_eq!(recompose(&['ㄱ', 'ㅏ', 'ㄱ', 'ㄴ', 'ㅏ']), "각나");
    }

    #[test]
    fn recompose_lone_jamo_kept() {
        assert_eq!(recompose(&['ㄱ']), "ㄱ");
        assert_eq!(recompose(&['ㅏ', 'ㅏ']), "ㅏㅏ");
        // ㄳ cannot be a lead, so before a vowel it stays standalone.
        assert_eq!(recompose(&['ㄳ', 'ㅏ']), "ㄳㅏ");
    }

    #[test]
    fn round_trip_syllables_and_ascii() {
        for text in ["먹었다", "한글 테스트", "abc123", "값이10%나", "", "힣가"] {
            assert_eq!(recompose(&decompose(text)), text, "round trip of {text:?}");
        }
    }

    #[test]
    fn round_trip_every_syllable_block_boundary() {
        for code in [0xAC00u32, 0xAC01, 0xD7A3, 0xB155] {
            let c = char::from_u32(code).unwrap();
            let s = c.to_string();
            assert_eq!(recompose(&decompose(&s)), s);
        }
    }

    #[test]
    fn classification() {
        assert!(is_lead('ㄱ'));
        assert!(!is_lead('ㄳ'));
        assert!(is_trail('ㄳ'));
        assert!(is_vowel('ㅘ'));
        assert!(!is_vowel('ㄱ'));
        assert!(!is_jamo('a'));
        assert!(is_positive_vowel('ㅏ'));
        assert!(!is_positive_vowel('ㅓ'));
    }

    #[test]
    fn segment_mixed_text() {
        let segs = segment("값10원");
        assert_eq!(
            segs,
            vec![
                Segment::Hangul(vec!['ㄱ', 'ㅏ', 'ㅄ']),
                Segment::Foreign("10".to_string()),
                Segment::Hangul(vec!['ㅇ', 'ㅝ', 'ㄴ']),
            ]
        );
    }

    #[test]
    fn segment_empty_and_pure_foreign() {
        assert!(segment("").is_empty());
        assert_eq!(segment("abc"), vec![Segment::Foreign("abc".to_string())]);
    }
}

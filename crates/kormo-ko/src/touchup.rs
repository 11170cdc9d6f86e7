// Candidate touch-up.
//
// Rule expansion restores endings to their canonical citation form (어,
// 으니, 습니다). Two adjustments then make each candidate read the way
// dictionaries print the pair:
//
// - vowel harmony: an ending in canonical 어 takes 아 after a stem whose
//   last vowel is positive (고맙 + 어 becomes 고맙 + 아)
// - linking-vowel reduction: the onsets 으/스/느 drop after a stem ending
//   in a vowel or ㄹ (가 + 으니 becomes 가 + 니)
//
// Harmony runs first; reduction never leaves an empty morpheme.

use kormo_core::jamo::{decompose, is_positive_vowel, is_vowel, recompose};
use kormo_core::morpheme::Candidate;
use kormo_core::tag::TagId;

const LINKING_ONSETS: [[char; 2]; 3] = [['ㅇ', 'ㅡ'], ['ㅅ', 'ㅡ'], ['ㄴ', 'ㅡ']];

/// Repair every candidate in place. `ending_tags` is the sorted tag set
/// of verbal endings; only morphemes tagged with one are touched.
pub fn repair(candidates: &mut [Candidate], ending_tags: &[TagId]) {
    for candidate in candidates {
        for i in 1..candidate.len() {
            if ending_tags.binary_search(&candidate[i].tag).is_err() {
                continue;
            }
            let prev = decompose(&candidate[i - 1].surface);
            let mut cur = decompose(&candidate[i].surface);
            let mut changed = false;

            if cur.len() >= 2
                && cur[0] == 'ㅇ'
                && cur[1] == 'ㅓ'
                && last_vowel(&prev).is_some_and(is_positive_vowel)
            {
                cur[1] = 'ㅏ';
                changed = true;
            }

            if cur.len() > 2
                && LINKING_ONSETS.contains(&[cur[0], cur[1]])
                && prev.last().is_some_and(|&j| is_vowel(j) || j == 'ㄹ')
            {
                cur.drain(..2);
                changed = true;
            }

            if changed {
                candidate[i].surface = recompose(&cur);
            }
        }
    }
}

fn last_vowel(jamos: &[char]) -> Option<char> {
    jamos.iter().rev().copied().find(|&j| is_vowel(j))
}

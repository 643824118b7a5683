//! Tone placement and NFC output composition.
//!
//! The tone position is never stored on the syllable; it is recomputed here
//! from (nucleus, coda, rule) every time the preedit is rendered, which
//! makes switching the rule set trivial.

use crate::types::Syllable;
use crate::viet_map::{apply_tone, fold, is_marked_vowel};
use serde::{Deserialize, Serialize};

/// Which orthographic convention decides the tone position in polyphthongs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneRule {
    /// Quy tắc cũ: bare `ia` carries the tone on the first vowel (nghĩa).
    #[default]
    Old,
    /// Quy tắc mới: bare `ia` carries the tone on the final vowel (nghiã).
    New,
}

/// Index within the nucleus that carries the tone diacritic.
pub fn tone_position(nucleus: &[char], coda: &str, rule: ToneRule) -> usize {
    let n = nucleus.len();
    if n <= 1 {
        return 0;
    }

    // A vowel already carrying a diacritic always takes the tone; with two
    // marked vowels (ươ) the later one wins.
    if let Some(pos) = nucleus.iter().rposition(|c| is_marked_vowel(*c)) {
        return pos;
    }

    let first = fold(nucleus[0]);
    let second = fold(nucleus[1]);

    if coda.is_empty() && n == 2 {
        return match (first, second) {
            ('o', 'a') | ('o', 'e') => 1,
            ('u', 'y') => 1,
            // Traditional rule keeps the tone on the i of a bare ia.
            ('i', 'a') => match rule {
                ToneRule::Old => 0,
                ToneRule::New => 1,
            },
            ('u', 'a') => 1,
            // ao, au, ay, ai, eo, eu and the rest: first vowel.
            _ => 0,
        };
    }

    if !coda.is_empty() {
        return if n == 2 { 0 } else { 1 };
    }

    // No coda, three or more plain vowels: middle.
    1
}

/// Renders the syllable as precomposed NFC text: onset verbatim, nucleus
/// with the tone drawn at its computed position, coda verbatim.
pub fn compose(syllable: &Syllable, rule: ToneRule) -> String {
    let nucleus: Vec<char> = syllable.nucleus.chars().collect();
    let mut out = String::with_capacity(syllable.raw.len());
    out.push_str(&syllable.onset);

    let pos = tone_position(&nucleus, &syllable.coda, rule);
    for (i, c) in nucleus.iter().enumerate() {
        if i == pos {
            out.push(apply_tone(*c, syllable.tone));
        } else {
            out.push(*c);
        }
    }

    out.push_str(&syllable.coda);
    out
}

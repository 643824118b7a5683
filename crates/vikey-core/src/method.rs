//! Input-method translators.
//!
//! Interprets one incoming key under the active romanization convention.
//! Implemented as a tagged enum rather than trait objects: the method is
//! session-scoped configuration and never changes mid-syllable.

use crate::types::{Syllable, Tone, VowelMark};
use crate::viet_map::{apply_vowel_mark, fold, strip_mark};
use serde::{Deserialize, Serialize};

/// Romanization convention for typing Vietnamese on a Latin keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMethod {
    #[default]
    Telex,
    Vni,
}

/// Outcome of translating one key against the current syllable.
///
/// `consumed == false` means the key carries no transformation here and
/// should be appended literally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    /// Transformed text produced by a vowel-mark action (e.g. "â", "ươ").
    pub text: String,
    pub tone: Tone,
    pub mark: VowelMark,
    pub consumed: bool,
}

impl Translation {
    fn literal() -> Self {
        Translation::default()
    }

    fn tone(tone: Tone) -> Self {
        Translation {
            tone,
            consumed: true,
            ..Translation::default()
        }
    }

    fn mark(text: String, mark: VowelMark) -> Self {
        Translation {
            text,
            mark,
            consumed: true,
            ..Translation::default()
        }
    }
}

impl InputMethod {
    pub fn name(self) -> &'static str {
        match self {
            InputMethod::Telex => "Telex",
            InputMethod::Vni => "VNI",
        }
    }

    /// Whether this key applies (or removes) a tone under this method.
    pub fn is_tone_key(self, c: char) -> bool {
        match self {
            InputMethod::Telex => matches!(fold(c), 's' | 'f' | 'r' | 'x' | 'j' | 'z'),
            InputMethod::Vni => matches!(c, '0'..='5'),
        }
    }

    /// The tone a key carries. `Tone::None` doubles as the explicit
    /// tone-removal action (Telex `z`, VNI `0`).
    pub fn tone_for(self, c: char) -> Tone {
        match self {
            InputMethod::Telex => match fold(c) {
                's' => Tone::Acute,
                'f' => Tone::Grave,
                'r' => Tone::Hook,
                'x' => Tone::Tilde,
                'j' => Tone::Dot,
                _ => Tone::None,
            },
            InputMethod::Vni => match c {
                '1' => Tone::Acute,
                '2' => Tone::Grave,
                '3' => Tone::Hook,
                '4' => Tone::Tilde,
                '5' => Tone::Dot,
                _ => Tone::None,
            },
        }
    }

    /// Interprets `c` against the current syllable. Never mutates; the
    /// controller decides how to apply the result.
    pub fn translate(self, c: char, current: &Syllable, w_as_vowel: bool) -> Translation {
        match self {
            InputMethod::Telex => translate_telex(self, c, current, w_as_vowel),
            InputMethod::Vni => translate_vni(self, c, current),
        }
    }
}

fn translate_telex(
    method: InputMethod,
    c: char,
    current: &Syllable,
    w_as_vowel: bool,
) -> Translation {
    if method.is_tone_key(c) {
        // A tone needs a vowel to land on.
        if current.has_nucleus() {
            return Translation::tone(method.tone_for(c));
        }
        return Translation::literal();
    }

    if fold(c) == 'w' {
        if let Some(last) = current.nucleus.chars().last() {
            let (mark, promoted) = match fold(last) {
                'a' => (VowelMark::Breve, apply_vowel_mark(last, VowelMark::Breve)),
                'o' | 'u' => (VowelMark::Horn, apply_vowel_mark(last, VowelMark::Horn)),
                _ => (VowelMark::None, None),
            };
            if let Some(p) = promoted {
                return Translation::mark(p.to_string(), mark);
            }
            return Translation::literal();
        }
        if w_as_vowel {
            let text = if c.is_uppercase() { "Ư" } else { "ư" };
            return Translation::mark(text.to_string(), VowelMark::Horn);
        }
        return Translation::literal();
    }

    // Double-letter patterns: aa ee oo -> circumflex, dd -> stroke. The
    // second letter may differ in case (aA, Dd, ...). A key hidden by a
    // break marker cannot open a new pattern.
    let mut tail = current.raw.chars().rev();
    let prev = tail.next();
    let hidden = tail.next() == Some(crate::types::BREAK_MARKER);
    if let Some(prev) = prev.filter(|_| !hidden) {
        if fold(prev) == fold(c) {
            let mark = match fold(c) {
                'a' | 'e' | 'o' => VowelMark::Circumflex,
                'd' => VowelMark::Stroke,
                _ => VowelMark::None,
            };
            if mark != VowelMark::None {
                if let Some(p) = apply_vowel_mark(prev, mark) {
                    return Translation::mark(p.to_string(), mark);
                }
            }
        }
    }

    Translation::literal()
}

fn translate_vni(method: InputMethod, c: char, current: &Syllable) -> Translation {
    if method.is_tone_key(c) {
        if current.has_nucleus() {
            return Translation::tone(method.tone_for(c));
        }
        return Translation::literal();
    }

    let mark = match c {
        '6' => VowelMark::Circumflex,
        '7' => VowelMark::Horn,
        '8' => VowelMark::Breve,
        '9' => VowelMark::Stroke,
        _ => return Translation::literal(),
    };

    if mark == VowelMark::Stroke {
        // 9 strokes the last d anywhere in the onset.
        if let Some(d) = current.onset.chars().rev().find(|c| fold(*c) == 'd') {
            if let Some(p) = apply_vowel_mark(d, VowelMark::Stroke) {
                return Translation::mark(p.to_string(), mark);
            }
        }
        return Translation::literal();
    }

    // The uo compound takes both horn promotions at once. Existing marks do
    // not block a digit: uô + 7 is still ươ.
    if mark == VowelMark::Horn {
        let nucleus: Vec<char> = current.nucleus.chars().collect();
        if nucleus.len() >= 2 {
            let (u, o) = (nucleus[nucleus.len() - 2], nucleus[nucleus.len() - 1]);
            if fold(strip_mark(u)) == 'u' && fold(strip_mark(o)) == 'o' {
                let mut text = String::new();
                text.push(apply_vowel_mark(strip_mark(u), VowelMark::Horn).unwrap_or(u));
                text.push(apply_vowel_mark(strip_mark(o), VowelMark::Horn).unwrap_or(o));
                return Translation::mark(text, mark);
            }
        }
    }

    // Last eligible vowel in the nucleus, scanning right to left.
    if let Some(p) = current
        .nucleus
        .chars()
        .rev()
        .find_map(|v| apply_vowel_mark(strip_mark(v), mark))
    {
        return Translation::mark(p.to_string(), mark);
    }

    // No target: the digit stays a literal digit.
    Translation::literal()
}

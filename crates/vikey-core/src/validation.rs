//! Vietnamese syllable validation.
//!
//! Decides whether a candidate (onset, nucleus, coda) is spellable. The
//! controller consults this before committing to a transformation so that
//! mixed Vietnamese/English typing degrades to literal passthrough. The
//! spelling-rule table is advisory: a violation blocks a transformation but
//! the buffer is never rewritten to the corrected form.

use crate::viet_map::fold;
use std::collections::{HashMap, HashSet};

lazy_static::lazy_static! {
    /// Valid initial consonant clusters (phụ âm đầu).
    static ref VALID_INITIALS: HashSet<&'static str> = [
        // Single consonants
        "b", "c", "d", "g", "h", "k", "l", "m", "n", "p", "q", "r", "s", "t", "v", "x",
        // Digraphs
        "ch", "gh", "gi", "kh", "ng", "nh", "ph", "qu", "th", "tr",
        // Trigraph
        "ngh",
    ]
    .into_iter()
    .collect();

    /// Valid finals (phụ âm cuối), semivowel finals included.
    static ref VALID_FINALS: HashSet<&'static str> = [
        "c", "ch", "m", "n", "ng", "nh", "p", "t",
        // Semivowels (bán nguyên âm cuối)
        "i", "y", "o", "u",
    ]
    .into_iter()
    .collect();

    /// Forbidden onset + first-vowel pairings and their corrected spelling.
    /// Consulted for rejection only; the parser never applies the correction.
    static ref SPELLING_RULES: HashMap<&'static str, &'static str> = [
        // c before e/i/y must be k
        ("ce", "ke"), ("ci", "ki"), ("cy", "ky"),
        // k before a/o/u must be c
        ("ka", "ca"), ("ko", "co"), ("ku", "cu"),
        // g before e must be gh
        ("ge", "ghe"),
        // ng before e/i must be ngh
        ("nge", "nghe"), ("ngi", "nghi"),
        // gh before a/o/u must be g
        ("gha", "ga"), ("gho", "go"), ("ghu", "gu"),
        // ngh before a/o/u must be ng
        ("ngha", "nga"), ("ngho", "ngo"), ("nghu", "ngu"),
    ]
    .into_iter()
    .collect();
}

/// Why a candidate syllable was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    NoVowel,
    InvalidInitial,
    InvalidFinal,
    SpellingRuleViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub reason: Option<InvalidReason>,
}

impl Validation {
    const OK: Validation = Validation {
        valid: true,
        reason: None,
    };

    const fn rejected(reason: InvalidReason) -> Self {
        Validation {
            valid: false,
            reason: Some(reason),
        }
    }
}

/// True when `onset` is empty or a valid initial cluster. Used to accept an
/// onset-only buffer as a syllable still in progress.
pub fn is_valid_initial(onset: &str) -> bool {
    if onset.is_empty() {
        return true;
    }
    let folded: String = onset.chars().map(|c| match fold(c) {
        'đ' => 'd',
        l => l,
    }).collect();
    VALID_INITIALS.contains(folded.as_str())
}

/// Checks whether (onset, nucleus, coda) forms a spellable Vietnamese
/// syllable.
pub fn validate(onset: &str, nucleus: &str, coda: &str) -> Validation {
    if nucleus.is_empty() {
        return Validation::rejected(InvalidReason::NoVowel);
    }

    // đ is a valid initial; normalise it so the set lookup stays ASCII.
    let onset_folded: String = onset.chars().map(|c| match fold(c) {
        'đ' => 'd',
        l => l,
    }).collect();

    if !onset_folded.is_empty() && !VALID_INITIALS.contains(onset_folded.as_str()) {
        return Validation::rejected(InvalidReason::InvalidInitial);
    }

    if !coda.is_empty() {
        let coda_folded: String = coda.chars().map(fold).collect();
        if !VALID_FINALS.contains(coda_folded.as_str()) {
            return Validation::rejected(InvalidReason::InvalidFinal);
        }
    }

    if !onset_folded.is_empty() {
        if let Some(first_vowel) = nucleus.chars().next() {
            let mut pair = onset_folded;
            pair.push(fold(first_vowel));
            if SPELLING_RULES.contains_key(pair.as_str()) {
                return Validation::rejected(InvalidReason::SpellingRuleViolation);
            }
        }
    }

    Validation::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_syllables() {
        assert!(validate("t", "iê", "ng").valid);
        assert!(validate("ng", "ươ", "i").valid);
        assert!(validate("", "a", "").valid);
        assert!(validate("đ", "ươ", "c").valid);
        assert!(validate("ngh", "i", "").valid);
        assert!(validate("qu", "a", "").valid);
    }

    #[test]
    fn rejects_empty_nucleus() {
        let v = validate("t", "", "");
        assert!(!v.valid);
        assert_eq!(v.reason, Some(InvalidReason::NoVowel));
    }

    #[test]
    fn rejects_foreign_initials() {
        let v = validate("cl", "a", "");
        assert_eq!(v.reason, Some(InvalidReason::InvalidInitial));
        let v = validate("str", "e", "");
        assert_eq!(v.reason, Some(InvalidReason::InvalidInitial));
    }

    #[test]
    fn rejects_foreign_finals() {
        let v = validate("b", "a", "s");
        assert_eq!(v.reason, Some(InvalidReason::InvalidFinal));
        let v = validate("b", "a", "nk");
        assert_eq!(v.reason, Some(InvalidReason::InvalidFinal));
    }

    #[test]
    fn semivowel_finals_are_valid() {
        assert!(validate("h", "a", "i").valid);
        assert!(validate("m", "a", "y").valid);
        assert!(validate("ch", "a", "o").valid);
    }

    #[test]
    fn spelling_rules_reject_but_never_rewrite() {
        for (onset, vowel) in [("c", "e"), ("c", "i"), ("c", "y"), ("k", "a"), ("k", "o"),
                               ("k", "u"), ("g", "e"), ("ng", "e"), ("ng", "i"), ("ngh", "a")] {
            let v = validate(onset, vowel, "");
            assert_eq!(
                v.reason,
                Some(InvalidReason::SpellingRuleViolation),
                "{onset}+{vowel} should violate spelling rules"
            );
        }
        // The corrected spellings pass.
        assert!(validate("k", "e", "").valid);
        assert!(validate("c", "a", "").valid);
        assert!(validate("gh", "e", "").valid);
        assert!(validate("ngh", "e", "").valid);
    }

    #[test]
    fn marked_first_vowel_sidesteps_spelling_rules() {
        // The rule table keys on plain vowels only; cê is not ce.
        assert!(validate("c", "ê", "").valid);
    }
}

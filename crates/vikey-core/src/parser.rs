//! Syllable parser.
//!
//! Segments the raw buffer into onset / nucleus / coda, applying the
//! method-specific promotions inline: Telex double letters and `w`, VNI
//! digit marks, and the contextual `iê`/`uô` promotions under a coda.
//!
//! The parser is pure in (`raw`, flags, method, w-as-vowel) plus the tone
//! and vowel-mark preservation hints carried by the controller. Re-running
//! it over the same inputs always yields the same syllable; the controller
//! relies on this for deterministic backspace replay.

use crate::method::InputMethod;
use crate::types::{KeyFlag, Syllable, Tone, VowelMark, BREAK_MARKER};
use crate::viet_map::{
    apply_vowel_mark, fold, is_consonant, is_vowel, strip_mark,
};

struct Scan<'a> {
    chars: &'a [char],
    flags: &'a [KeyFlag],
    i: usize,
    hidden: usize,
}

impl<'a> Scan<'a> {
    fn new(chars: &'a [char], flags: &'a [KeyFlag]) -> Self {
        Scan {
            chars,
            flags,
            i: 0,
            hidden: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.i).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.i + offset).copied()
    }

    fn flagged(&self, idx: usize) -> bool {
        matches!(self.flags.get(idx), Some(KeyFlag::ToneKey))
    }

    /// A key may only take part in a promotion when it carries no flag.
    fn combinable(&self, idx: usize) -> bool {
        !matches!(
            self.flags.get(idx),
            Some(KeyFlag::ToneKey) | Some(KeyFlag::Detached)
        )
    }

    /// A break marker directly after the pair starting at the cursor
    /// suppresses that pair's promotion.
    fn pair_suppressed(&self) -> bool {
        self.peek_at(2) == Some(BREAK_MARKER)
    }

    /// A break marker directly after the cursor suppresses a single-key
    /// promotion (Telex `w`, VNI digit, w-as-vowel).
    fn suppressed(&self) -> bool {
        self.peek_at(1) == Some(BREAK_MARKER)
    }

    /// Steps over consumed tone keys and break-marker pairs. The code point
    /// following a marker is the key press that performed a revert; it is
    /// hidden from both structure and preedit.
    fn skip_inert(&mut self) {
        while let Some(c) = self.peek() {
            if c == BREAK_MARKER {
                self.i += 1;
                if self.i < self.chars.len() {
                    self.i += 1;
                    self.hidden += 1;
                }
            } else if self.flagged(self.i) {
                self.i += 1;
                self.hidden += 1;
            } else {
                break;
            }
        }
    }
}

/// Parses `raw` into a syllable, preserving the tone and vowel-mark tags.
pub fn parse(
    raw: &str,
    flags: &[KeyFlag],
    method: InputMethod,
    w_as_vowel: bool,
    tone: Tone,
    vowel_mark: VowelMark,
) -> Syllable {
    let chars: Vec<char> = raw.chars().collect();
    let mut scan = Scan::new(&chars, flags);

    let mut onset = String::new();
    let mut nucleus = String::new();
    let mut coda = String::new();

    parse_onset(&mut scan, method, &mut onset);
    parse_nucleus(&mut scan, method, w_as_vowel, &mut onset, &mut nucleus);
    parse_coda(&mut scan, &mut coda);

    // Contextual promotion once the coda is known: tiếng, buồn.
    if !coda.is_empty() {
        let nv: Vec<char> = nucleus.chars().collect();
        if nv.len() >= 2 {
            let pair = (fold(nv[0]), fold(nv[1]));
            let promoted = match pair {
                ('i', 'e') => apply_vowel_mark(nv[1], VowelMark::Circumflex),
                ('u', 'o') => apply_vowel_mark(nv[1], VowelMark::Circumflex),
                _ => None,
            };
            if let Some(p) = promoted {
                let mut rebuilt: Vec<char> = nv;
                rebuilt[1] = p;
                nucleus = rebuilt.into_iter().collect();
            }
        }
    }

    // Late VNI digits land after the coda (duoc7); Telex tone keys that were
    // consumed must not resurface as literal suffixes.
    parse_tail(&mut scan, method, &mut onset, &mut nucleus);

    Syllable {
        raw: raw.to_string(),
        onset,
        nucleus,
        coda,
        tone,
        vowel_mark,
        consumed: scan.i,
        consumed_modifiers: scan.hidden,
    }
}

fn parse_onset(scan: &mut Scan, method: InputMethod, onset: &mut String) {
    loop {
        scan.skip_inert();
        let Some(c) = scan.peek() else { return };

        if is_vowel(c) {
            return;
        }

        // dd -> đ, any case mix, case of the first letter wins.
        if fold(c) == 'd'
            && scan.peek_at(1).map(fold) == Some('d')
            && scan.combinable(scan.i + 1)
            && !scan.pair_suppressed()
        {
            onset.push(if c == 'd' { 'đ' } else { 'Đ' });
            scan.i += 2;
            continue;
        }

        match method {
            InputMethod::Telex => {
                // w belongs to the nucleus phase (horn or w-as-vowel).
                // f/j/z can never open a syllable; unconsumed ones fall
                // through to the trailing text below.
                if fold(c) == 'w' {
                    return;
                }
            }
            InputMethod::Vni => {
                // A stroke digit can precede any vowel (d9...).
                if c == '9'
                    && scan.combinable(scan.i)
                    && !scan.suppressed()
                    && stroke_onset(onset)
                {
                    scan.i += 1;
                    continue;
                }
            }
        }

        if is_consonant(c) {
            onset.push(c);
            scan.i += 1;
        } else {
            return;
        }
    }
}

fn parse_nucleus(
    scan: &mut Scan,
    method: InputMethod,
    w_as_vowel: bool,
    onset: &mut String,
    nucleus: &mut String,
) {
    loop {
        scan.skip_inert();
        let Some(c) = scan.peek() else { return };

        if is_vowel(c) {
            // aa/ee/oo -> â/ê/ô (Telex), case-insensitive second letter.
            if method == InputMethod::Telex
                && matches!(fold(c), 'a' | 'e' | 'o')
                && scan.peek_at(1).map(fold) == Some(fold(c))
                && scan.combinable(scan.i + 1)
                && !scan.pair_suppressed()
            {
                if let Some(p) = apply_vowel_mark(c, VowelMark::Circumflex) {
                    nucleus.push(p);
                    scan.i += 2;
                    continue;
                }
            }
            nucleus.push(c);
            scan.i += 1;
            continue;
        }

        match method {
            InputMethod::Telex if fold(c) == 'w' => {
                if scan.suppressed() || !scan.combinable(scan.i) {
                    // A reverted or downgraded w stays literal.
                    return;
                }
                if nucleus.is_empty() {
                    if !w_as_vowel {
                        return;
                    }
                    nucleus.push(if c == 'W' { 'Ư' } else { 'ư' });
                    scan.i += 1;
                    continue;
                }
                if !promote_horn(nucleus) {
                    // No promotable target: swallowed, like the original.
                    scan.hidden += 1;
                }
                scan.i += 1;
            }
            InputMethod::Vni if c.is_ascii_digit() => {
                if scan.suppressed()
                    || !scan.combinable(scan.i)
                    || !apply_vni_digit(c, onset, nucleus)
                {
                    return;
                }
                scan.i += 1;
            }
            _ => return,
        }
    }
}

fn parse_coda(scan: &mut Scan, coda: &mut String) {
    loop {
        scan.skip_inert();
        let Some(c) = scan.peek() else { return };

        if !is_consonant(c) {
            return;
        }

        // Prefer the two-letter codas ch/ng/nh over a one-letter match.
        if let Some(next) = scan.peek_at(1) {
            if !scan.flagged(scan.i + 1)
                && is_consonant(next)
                && is_valid_coda_pair(c, next)
            {
                coda.push(c);
                coda.push(next);
                scan.i += 2;
                continue;
            }
        }

        if is_valid_coda_single(c) {
            coda.push(c);
            scan.i += 1;
        } else {
            return;
        }
    }
}

fn parse_tail(scan: &mut Scan, method: InputMethod, onset: &mut String, nucleus: &mut String) {
    loop {
        scan.skip_inert();
        let Some(c) = scan.peek() else { return };

        if method == InputMethod::Vni
            && c.is_ascii_digit()
            && scan.combinable(scan.i)
            && !scan.suppressed()
            && apply_vni_digit(c, onset, nucleus)
        {
            scan.i += 1;
            continue;
        }
        return;
    }
}

fn is_valid_coda_single(c: char) -> bool {
    matches!(fold(c), 'c' | 'm' | 'n' | 'p' | 't')
}

fn is_valid_coda_pair(a: char, b: char) -> bool {
    matches!((fold(a), fold(b)), ('c', 'h') | ('n', 'g') | ('n', 'h'))
}

/// Horn/breve promotion of the last nucleus vowel by a Telex `w`:
/// a -> ă, u -> ư, o -> ơ (with a preceding u promoted too, so uow -> ươ).
fn promote_horn(nucleus: &mut String) -> bool {
    let mut nv: Vec<char> = nucleus.chars().collect();
    let last_idx = nv.len() - 1;
    let last = nv[last_idx];

    // Plain targets only; an already-marked vowel swallows the w.
    let promoted = match fold(last) {
        'a' => apply_vowel_mark(last, VowelMark::Breve),
        'o' => {
            if last_idx > 0 && fold(nv[last_idx - 1]) == 'u' {
                let u = nv[last_idx - 1];
                nv[last_idx - 1] = apply_vowel_mark(u, VowelMark::Horn).unwrap_or(u);
            }
            apply_vowel_mark(last, VowelMark::Horn)
        }
        'u' => apply_vowel_mark(last, VowelMark::Horn),
        _ => None,
    };

    match promoted {
        Some(p) => {
            nv[last_idx] = p;
            *nucleus = nv.into_iter().collect();
            true
        }
        None => false,
    }
}

/// Applies a VNI mark digit to the structure built so far. Returns false
/// when there is no eligible target (the digit is then a literal).
fn apply_vni_digit(digit: char, onset: &mut String, nucleus: &mut String) -> bool {
    match digit {
        '9' => stroke_onset(onset),
        '6' | '8' => {
            let mark = if digit == '6' {
                VowelMark::Circumflex
            } else {
                VowelMark::Breve
            };
            let mut nv: Vec<char> = nucleus.chars().collect();
            for idx in (0..nv.len()).rev() {
                if let Some(p) = apply_vowel_mark(strip_mark(nv[idx]), mark) {
                    nv[idx] = p;
                    *nucleus = nv.into_iter().collect();
                    return true;
                }
            }
            false
        }
        '7' => {
            let mut nv: Vec<char> = nucleus.chars().collect();
            // An adjacent uo pair anywhere takes both promotions (nguoi7).
            for idx in (0..nv.len().saturating_sub(1)).rev() {
                let (u, o) = (nv[idx], nv[idx + 1]);
                if fold(strip_mark(u)) == 'u' && fold(strip_mark(o)) == 'o' {
                    nv[idx] = apply_vowel_mark(strip_mark(u), VowelMark::Horn).unwrap_or(u);
                    nv[idx + 1] = apply_vowel_mark(strip_mark(o), VowelMark::Horn).unwrap_or(o);
                    *nucleus = nv.into_iter().collect();
                    return true;
                }
            }
            for idx in (0..nv.len()).rev() {
                if let Some(p) = apply_vowel_mark(strip_mark(nv[idx]), VowelMark::Horn) {
                    nv[idx] = p;
                    *nucleus = nv.into_iter().collect();
                    return true;
                }
            }
            false
        }
        _ => false,
    }
}

/// Strokes the last d in the onset (VNI 9). Returns false when absent.
fn stroke_onset(onset: &mut String) -> bool {
    let mut ov: Vec<char> = onset.chars().collect();
    for idx in (0..ov.len()).rev() {
        if fold(ov[idx]) == 'd' {
            ov[idx] = if ov[idx] == 'd' { 'đ' } else { 'Đ' };
            *onset = ov.into_iter().collect();
            return true;
        }
    }
    false
}

//! Composition controller.
//!
//! Owns the per-session buffer and routes each keystroke through the
//! classifier, translator, parser and composer. The raw buffer is the single
//! source of truth: every mutation is followed by a full reparse, and
//! backspace rebuilds state by replaying the remaining keystrokes from a
//! fresh buffer. One engine instance per input context; instances share
//! nothing but the static lookup tables.

use crate::compose::{compose, ToneRule};
use crate::method::{InputMethod, Translation};
use crate::parser::parse;
use crate::types::{
    keysym_to_char, KeyEvent, KeyFlag, ProcessResult, Syllable, Tone, VowelMark, BREAK_MARKER,
    KEY_BACKSPACE, KEY_DELETE, KEY_ESCAPE, KEY_RETURN, KEY_SPACE, KEY_TAB, MOD_ALT, MOD_CONTROL,
};
use crate::validation::{self, InvalidReason};
use crate::viet_map::fold;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Session-scoped engine configuration.
///
/// All fields have serde defaults so a partial JSON config file works.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub input_method: InputMethod,
    pub tone_rule: ToneRule,
    #[serde(default = "default_enabled")]
    pub enable_validation: bool,
    #[serde(default = "default_enabled")]
    pub enable_double_key_revert: bool,
    #[serde(default = "default_enabled")]
    pub enable_w_as_vowel: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            input_method: InputMethod::Telex,
            tone_rule: ToneRule::Old,
            enable_validation: true,
            enable_double_key_revert: true,
            enable_w_as_vowel: true,
        }
    }
}

/// What the most recent modifier key did, for the double-key revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransformKind {
    Tone,
    VowelMark,
    Stroke,
    WAsVowel,
}

/// Single-slot undo record. Cleared on any non-transforming keystroke, on
/// reset, after a commit and after backspace.
#[derive(Debug, Clone)]
struct LastTransform {
    key: char,
    kind: TransformKind,
    /// Letters the transformation replaced, kept for logging.
    original: String,
}

#[derive(Debug, Default)]
struct CompositionBuffer {
    raw: String,
    flags: Vec<KeyFlag>,
    tone: Tone,
    vowel_mark: VowelMark,
    syllable: Syllable,
    last_transform: Option<LastTransform>,
}

impl CompositionBuffer {
    fn push(&mut self, c: char, flag: KeyFlag) {
        self.raw.push(c);
        self.flags.push(flag);
    }

    fn clear(&mut self) {
        self.raw.clear();
        self.flags.clear();
        self.tone = Tone::None;
        self.vowel_mark = VowelMark::None;
        self.syllable = Syllable::default();
        self.last_transform = None;
    }

    fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// The per-session Vietnamese composition engine.
pub struct CompositionEngine {
    config: EngineConfig,
    buffer: CompositionBuffer,
    enabled: bool,
}

impl Default for CompositionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositionEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            buffer: CompositionBuffer::default(),
            enabled: true,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the configuration. A changed input method clears the session.
    pub fn set_config(&mut self, config: EngineConfig) {
        if config.input_method != self.config.input_method {
            self.buffer.clear();
        }
        self.config = config;
    }

    pub fn input_method(&self) -> InputMethod {
        self.config.input_method
    }

    /// Switching the input method clears the session.
    pub fn set_input_method(&mut self, method: InputMethod) {
        if method != self.config.input_method {
            self.config.input_method = method;
            self.buffer.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.buffer.clear();
        }
    }

    /// Clears all composition state. Called by the host on focus change.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// The current composition string: composed syllable plus any trailing
    /// literal characters the parser did not account for.
    pub fn preedit(&self) -> String {
        if self.buffer.is_empty() {
            return String::new();
        }

        let mut out = compose(&self.buffer.syllable, self.config.tone_rule);

        let chars: Vec<char> = self.buffer.raw.chars().collect();
        let mut i = self.buffer.syllable.consumed;
        while i < chars.len() {
            if chars[i] == BREAK_MARKER {
                // The marker and the key press it hides.
                i += 2;
                continue;
            }
            if matches!(self.buffer.flags.get(i), Some(KeyFlag::ToneKey)) {
                i += 1;
                continue;
            }
            out.push(chars[i]);
            i += 1;
        }
        out
    }

    /// Processes one key event. Never fails; unknown keysyms pass through.
    pub fn process_key(&mut self, event: KeyEvent) -> ProcessResult {
        let mut result = ProcessResult::default();

        if !self.enabled {
            return result;
        }

        match event.keysym {
            KEY_BACKSPACE => return self.handle_backspace(),
            KEY_SPACE => {
                let mut commit = self.preedit();
                commit.push(' ');
                self.buffer.clear();
                result.handled = true;
                result.commit = commit;
                return result;
            }
            KEY_RETURN | KEY_TAB => {
                // Commit without the key itself; the host re-receives it.
                if !self.buffer.is_empty() {
                    result.handled = true;
                    result.commit = self.take_preedit();
                }
                return result;
            }
            KEY_ESCAPE => {
                self.buffer.clear();
                result.handled = true;
                return result;
            }
            KEY_DELETE => {
                // Commit, then let the framework apply Delete to the document.
                if !self.buffer.is_empty() {
                    result.commit = self.take_preedit();
                }
                return result;
            }
            _ => {}
        }

        // A Control or Alt chord belongs to the application; flush first.
        if event.modifiers & (MOD_CONTROL | MOD_ALT) != 0 {
            if !self.buffer.is_empty() {
                result.commit = self.take_preedit();
            }
            return result;
        }

        let Some(c) = keysym_to_char(event.keysym) else {
            return result;
        };

        self.feed_char(c);
        result.handled = true;
        result.preedit = self.preedit();
        result
    }

    fn take_preedit(&mut self) -> String {
        let preedit = self.preedit();
        self.buffer.clear();
        preedit
    }

    fn handle_backspace(&mut self) -> ProcessResult {
        if self.buffer.is_empty() {
            // Nothing composed; the host deletes from the document.
            return ProcessResult::default();
        }

        let mut chars: Vec<char> = self.buffer.raw.chars().collect();
        chars.pop();
        // A break marker was inserted by the same key press it annotates.
        if chars.last() == Some(&BREAK_MARKER) {
            chars.pop();
        }
        let remaining: String = chars.into_iter().collect();

        self.buffer.clear();
        self.replay(&remaining);
        self.buffer.last_transform = None;

        ProcessResult {
            handled: true,
            commit: String::new(),
            preedit: self.preedit(),
        }
    }

    /// Replays a raw stream through the normal dispatch from a fresh buffer.
    /// Break markers and the key press each one hides are re-appended
    /// verbatim so the parse comes out identical.
    fn replay(&mut self, raw: &str) {
        let chars: Vec<char> = raw.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == BREAK_MARKER {
                self.buffer.push(BREAK_MARKER, KeyFlag::Literal);
                if i + 1 < chars.len() {
                    self.buffer.push(chars[i + 1], KeyFlag::Literal);
                    i += 1;
                }
                self.buffer.vowel_mark = VowelMark::None;
                self.buffer.last_transform = None;
                self.reparse();
            } else {
                self.feed_char(chars[i]);
            }
            i += 1;
        }
    }

    fn feed_char(&mut self, c: char) {
        if self.config.enable_double_key_revert {
            if let Some(last) = self.buffer.last_transform.clone() {
                if fold(last.key) == fold(c) {
                    self.revert_last(&last, c);
                    return;
                }
            }
        }

        let translation =
            self.config
                .input_method
                .translate(c, &self.buffer.syllable, self.config.enable_w_as_vowel);

        if !translation.consumed {
            self.buffer.push(c, KeyFlag::Literal);
            self.buffer.last_transform = None;
            self.reparse();
            return;
        }

        if self.config.input_method.is_tone_key(c) {
            self.apply_tone_key(c, translation.tone);
        } else {
            self.apply_mark_key(c, translation);
        }
    }

    fn apply_tone_key(&mut self, c: char, tone: Tone) {
        // The tone key does not change the shape, so the current parse is
        // the post-transformation shape.
        if self.config.enable_validation && !self.shape_valid(&self.buffer.syllable) {
            debug!(key = %c, "tone key on a non-Vietnamese buffer, kept literal");
            self.buffer.push(c, KeyFlag::Literal);
            self.buffer.last_transform = None;
            self.reparse();
            return;
        }

        // Re-applying the active tone removes it (explicit toggle).
        let toggled_off = self.buffer.tone == tone && tone != Tone::None;
        let original = self.buffer.syllable.nucleus.clone();

        self.buffer.tone = if toggled_off { Tone::None } else { tone };
        self.buffer.push(c, KeyFlag::ToneKey);
        self.buffer.last_transform = if toggled_off {
            None
        } else {
            Some(LastTransform {
                key: c,
                kind: TransformKind::Tone,
                original,
            })
        };
        self.reparse();
        debug!(key = %c, tone = ?self.buffer.tone, "tone applied");
    }

    fn apply_mark_key(&mut self, c: char, translation: Translation) {
        let had_nucleus = self.buffer.syllable.has_nucleus();
        let original = if translation.mark == VowelMark::Stroke {
            self.buffer.syllable.onset.clone()
        } else {
            self.buffer.syllable.nucleus.clone()
        };
        let previous_mark = self.buffer.vowel_mark;

        // Apply speculatively: the parser derives the promotion from raw.
        self.buffer.push(c, KeyFlag::Literal);
        self.buffer.vowel_mark = translation.mark;
        self.reparse();

        if self.config.enable_validation && !self.shape_valid(&self.buffer.syllable) {
            // Not a Vietnamese shape: detach the key so the promotion never
            // re-forms, and keep it as plain text.
            debug!(key = %c, "mark key on a non-Vietnamese buffer, kept literal");
            if let Some(flag) = self.buffer.flags.last_mut() {
                *flag = KeyFlag::Detached;
            }
            self.buffer.vowel_mark = previous_mark;
            self.buffer.last_transform = None;
            self.reparse();
            return;
        }

        let kind = if translation.mark == VowelMark::Stroke {
            TransformKind::Stroke
        } else if !had_nucleus && fold(c) == 'w' {
            TransformKind::WAsVowel
        } else {
            TransformKind::VowelMark
        };
        self.buffer.last_transform = Some(LastTransform {
            key: c,
            kind,
            original,
        });
        debug!(key = %c, mark = ?translation.mark, "vowel mark applied");
    }

    fn revert_last(&mut self, last: &LastTransform, c: char) {
        debug!(key = %c, kind = ?last.kind, original = %last.original, "double-key revert");
        match last.kind {
            TransformKind::Tone => {
                self.buffer.tone = Tone::None;
                self.buffer.push(c, KeyFlag::ToneKey);
            }
            TransformKind::VowelMark | TransformKind::Stroke | TransformKind::WAsVowel => {
                // The marker voids the promotion pair and hides this press.
                self.buffer.push(BREAK_MARKER, KeyFlag::Literal);
                self.buffer.push(c, KeyFlag::Literal);
                self.buffer.vowel_mark = VowelMark::None;
            }
        }
        self.buffer.last_transform = None;
        self.reparse();
    }

    /// A transformation may only stand on a buffer that is entirely a
    /// spellable Vietnamese syllable: fully parsed, valid shape. An
    /// onset-only buffer counts as a syllable in progress.
    fn shape_valid(&self, s: &Syllable) -> bool {
        if s.consumed != s.raw.chars().count() {
            return false;
        }
        let v = validation::validate(&s.onset, &s.nucleus, &s.coda);
        if v.valid {
            return true;
        }
        v.reason == Some(InvalidReason::NoVowel)
            && s.coda.is_empty()
            && validation::is_valid_initial(&s.onset)
    }

    fn reparse(&mut self) {
        self.buffer.syllable = parse(
            &self.buffer.raw,
            &self.buffer.flags,
            self.config.input_method,
            self.config.enable_w_as_vowel,
            self.buffer.tone,
            self.buffer.vowel_mark,
        );
    }
}

use serde::{Deserialize, Serialize};

/// Keyboard event delivered by the host frontend.
///
/// `keysym` follows the X11 convention: printable ASCII and Latin-1 keys use
/// their Unicode code point, named keys use the 0xFFxx sentinels below, and
/// anything above 0x0100_0000 encodes `code point + 0x0100_0000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub keysym: u32,
    pub modifiers: u32,
}

impl KeyEvent {
    pub const fn new(keysym: u32, modifiers: u32) -> Self {
        Self { keysym, modifiers }
    }
}

/// Engine reply to a single key event.
///
/// `commit` is text the host must insert into the document; `preedit`
/// replaces (never appends to) the in-progress composition display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub handled: bool,
    pub commit: String,
    pub preedit: String,
}

// Modifier bits carried in KeyEvent::modifiers.
pub const MOD_SHIFT: u32 = 1 << 0;
pub const MOD_LOCK: u32 = 1 << 1;
pub const MOD_CONTROL: u32 = 1 << 2;
pub const MOD_ALT: u32 = 1 << 3;
pub const MOD_SUPER: u32 = 1 << 6;

// Named keysyms the controller dispatches on.
pub const KEY_BACKSPACE: u32 = 0xff08;
pub const KEY_TAB: u32 = 0xff09;
pub const KEY_RETURN: u32 = 0xff0d;
pub const KEY_ESCAPE: u32 = 0xff1b;
pub const KEY_SPACE: u32 = 0x0020;
pub const KEY_DELETE: u32 = 0xffff;

/// Zero-width sentinel inserted into the raw buffer after a vowel-mark
/// revert. The parser hides the code point that follows a marker and refuses
/// to promote a double-letter pair ending just before one. Never rendered.
pub const BREAK_MARKER: char = '\u{200b}';

/// One of the five written Vietnamese tones, or none (thanh ngang).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    None,
    /// Sắc (á)
    Acute,
    /// Huyền (à)
    Grave,
    /// Hỏi (ả)
    Hook,
    /// Ngã (ã)
    Tilde,
    /// Nặng (ạ)
    Dot,
}

/// Non-tonal diacritic applied by a modifier key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VowelMark {
    #[default]
    None,
    /// â, ê, ô
    Circumflex,
    /// ă
    Breve,
    /// ơ, ư
    Horn,
    /// đ
    Stroke,
}

/// Parsed interpretation of the raw buffer.
///
/// `raw` is lossless: it keeps every accepted code point, including consumed
/// modifier keys and break markers. `consumed` is a cursor into `raw` (in
/// code points) marking how far the parser accounted for; anything after it
/// that is not a hidden modifier shows up verbatim in the preedit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Syllable {
    pub raw: String,
    pub onset: String,
    pub nucleus: String,
    pub coda: String,
    pub tone: Tone,
    pub vowel_mark: VowelMark,
    pub consumed: usize,
    pub consumed_modifiers: usize,
}

impl Syllable {
    pub fn has_nucleus(&self) -> bool {
        !self.nucleus.is_empty()
    }
}

/// Per-code-point annotation kept alongside the raw buffer.
///
/// `ToneKey` marks a key the controller consumed as a tone modifier; the
/// parser steps over it instead of rendering it. `Detached` marks a modifier
/// key that validation downgraded to a literal: it renders, but never takes
/// part in a promotion again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFlag {
    Literal,
    ToneKey,
    Detached,
}

/// Converts a keysym to the character it types, if any.
///
/// Named keys (Backspace etc.) and unrecognised values return `None`.
pub fn keysym_to_char(keysym: u32) -> Option<char> {
    // ASCII printable range.
    if (0x0020..=0x007e).contains(&keysym) {
        return char::from_u32(keysym);
    }
    // Latin-1 supplement.
    if (0x00a0..=0x00ff).contains(&keysym) {
        return char::from_u32(keysym);
    }
    // Unicode keysyms.
    if keysym >= 0x0100_0000 {
        return char::from_u32(keysym - 0x0100_0000).filter(|c| *c != '\0');
    }
    None
}

/// Human-readable key name for logging.
pub fn keysym_name(keysym: u32) -> Option<&'static str> {
    match keysym {
        KEY_BACKSPACE => Some("Backspace"),
        KEY_TAB => Some("Tab"),
        KEY_RETURN => Some("Enter"),
        KEY_ESCAPE => Some("Escape"),
        KEY_SPACE => Some("Space"),
        KEY_DELETE => Some("Delete"),
        _ => None,
    }
}

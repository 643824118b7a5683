//! Vietnamese input method composition engine.
//!
//! Consumes keystrokes (keysym + modifier bits) and produces, after each
//! one, what the host input framework should display as pre-edit text and
//! what it should commit as final text. Supports the Telex and VNI
//! romanization conventions, both tone placement rule sets, deterministic
//! backspace, and double-key revert of transformations.

pub mod compose;
pub mod engine;
pub mod method;
pub mod parser;
pub mod types;
pub mod validation;
pub mod viet_map;

pub use compose::ToneRule;
pub use engine::{CompositionEngine, EngineConfig};
pub use method::InputMethod;
pub use types::{KeyEvent, ProcessResult, Syllable, Tone, VowelMark};

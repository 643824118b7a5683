//! End-to-end typing scenarios, each a complete keystroke sequence from
//! reset. Inputs are plain characters fed as keysyms; expectations are the
//! preedit after the final keystroke.

use vikey_core::engine::{CompositionEngine, EngineConfig};
use vikey_core::method::InputMethod;
use vikey_core::types::{KeyEvent, ProcessResult, KEY_RETURN, KEY_SPACE};

fn type_str(engine: &mut CompositionEngine, input: &str) -> ProcessResult {
    let mut last = ProcessResult::default();
    for c in input.chars() {
        last = engine.process_key(KeyEvent::new(c as u32, 0));
    }
    last
}

fn telex() -> CompositionEngine {
    CompositionEngine::new()
}

fn vni() -> CompositionEngine {
    CompositionEngine::with_config(EngineConfig {
        input_method: InputMethod::Vni,
        ..EngineConfig::default()
    })
}

#[test]
fn telex_complete_words() {
    let cases = [
        ("nguowif", "người"),
        ("dduowcj", "được"),
        ("tiengf", "tiềng"),
        ("nghiax", "nghĩa"),
        ("hoaf", "hoà"),
        ("vieetj", "việt"),
        ("chaof", "chào"),
        ("xoas", "xoá"),
        ("thoar", "thoả"),
        ("truowng", "trương"),
        ("thuowng", "thương"),
        ("buonf", "buồn"),
        ("muons", "muốn"),
        ("nhuw", "như"),
        ("tooi", "tôi"),
        ("muwa", "mưa"),
        ("bowi", "bơi"),
        ("ddaaus", "đấu"),
        ("quaan", "quân"),
    ];
    for (input, expected) in cases {
        let mut e = telex();
        assert_eq!(type_str(&mut e, input).preedit, expected, "input {input:?}");
    }
}

#[test]
fn telex_basic_marks_and_tones() {
    let cases = [
        ("aa", "â"),
        ("ee", "ê"),
        ("oo", "ô"),
        ("dd", "đ"),
        ("aw", "ă"),
        ("ow", "ơ"),
        ("uw", "ư"),
        ("w", "ư"),
        ("as", "á"),
        ("af", "à"),
        ("ar", "ả"),
        ("ax", "ã"),
        ("aj", "ạ"),
        ("asz", "a"),
    ];
    for (input, expected) in cases {
        let mut e = telex();
        assert_eq!(type_str(&mut e, input).preedit, expected, "input {input:?}");
    }
}

#[test]
fn telex_tone_is_repositioned_as_the_syllable_grows() {
    let mut e = telex();
    assert_eq!(type_str(&mut e, "mas").preedit, "má");
    // The tone is recomputed as the nucleus grows.
    assert_eq!(type_str(&mut e, "u").preedit, "máu");
    e.reset();
    assert_eq!(type_str(&mut e, "ties").preedit, "tíe");
    assert_eq!(type_str(&mut e, "ng").preedit, "tiếng");
}

#[test]
fn telex_revert_scenarios() {
    let mut e = telex();
    assert_eq!(type_str(&mut e, "aaa").preedit, "aa");
    e.reset();
    assert_eq!(type_str(&mut e, "ass").preedit, "a");
    e.reset();
    assert_eq!(type_str(&mut e, "ddd").preedit, "dd");
    e.reset();
    // Revert, then keep typing: the pair must not re-form.
    assert_eq!(type_str(&mut e, "aaan").preedit, "aan");
}

#[test]
fn commit_then_fresh_syllable() {
    let mut e = telex();
    type_str(&mut e, "vietj");
    let r = e.process_key(KeyEvent::new(KEY_SPACE, 0));
    assert_eq!(r.commit, "việt ");
    assert_eq!(r.preedit, "");
    // The next word starts from a clean buffer.
    assert_eq!(type_str(&mut e, "nam").preedit, "nam");
    let r = e.process_key(KeyEvent::new(KEY_RETURN, 0));
    assert!(r.handled);
    assert_eq!(r.commit, "nam");
}

#[test]
fn mixed_language_passthrough() {
    // English words must come out unmangled when validation is on.
    let cases = ["spell", "crow", "blue", "string"];
    for input in cases {
        let mut e = telex();
        let got = type_str(&mut e, input).preedit;
        assert_eq!(got, input, "input {input:?}");
    }
}

#[test]
fn vni_complete_words() {
    let cases = [
        ("d9uoc75", "được"),
        ("du9o7ng2", "đường"),
        ("nguoi72", "người"),
        ("tie6ng1", "tiếng"),
        ("vie6t5", "việt"),
        ("a8n", "ăn"),
        ("d9i", "đi"),
        ("nha3", "nhả"),
        ("chao2", "chào"),
    ];
    for (input, expected) in cases {
        let mut e = vni();
        assert_eq!(type_str(&mut e, input).preedit, expected, "input {input:?}");
    }
}

#[test]
fn vni_digits_without_targets_stay_digits() {
    let mut e = vni();
    assert_eq!(type_str(&mut e, "b6").preedit, "b6");
    e.reset();
    assert_eq!(type_str(&mut e, "t9").preedit, "t9");
    e.reset();
    // Tone digit with no vowel: literal.
    assert_eq!(type_str(&mut e, "b1").preedit, "b1");
}

#[test]
fn vni_ignores_telex_letters() {
    let mut e = vni();
    // s/f/w have no modifier meaning under VNI.
    assert_eq!(type_str(&mut e, "as").preedit, "as");
    e.reset();
    assert_eq!(type_str(&mut e, "aa").preedit, "aa");
}

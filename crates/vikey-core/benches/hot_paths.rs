use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vikey_core::engine::{CompositionEngine, EngineConfig};
use vikey_core::method::InputMethod;
use vikey_core::types::{KeyEvent, KEY_BACKSPACE, KEY_SPACE};

fn type_word(engine: &mut CompositionEngine, word: &str) {
    for c in word.chars() {
        black_box(engine.process_key(KeyEvent::new(c as u32, 0)));
    }
    black_box(engine.process_key(KeyEvent::new(KEY_SPACE, 0)));
}

fn bench_telex_words(c: &mut Criterion) {
    let mut engine = CompositionEngine::new();
    c.bench_function("engine/telex_common_words", |b| {
        b.iter(|| {
            type_word(&mut engine, "nguowif");
            type_word(&mut engine, "dduowcj");
            type_word(&mut engine, "tieengs");
            type_word(&mut engine, "vieetj");
        });
    });
}

fn bench_vni_words(c: &mut Criterion) {
    let mut engine = CompositionEngine::with_config(EngineConfig {
        input_method: InputMethod::Vni,
        ..EngineConfig::default()
    });
    c.bench_function("engine/vni_common_words", |b| {
        b.iter(|| {
            type_word(&mut engine, "d9uoc75");
            type_word(&mut engine, "du9o7ng2");
            type_word(&mut engine, "tie6ng1");
        });
    });
}

fn bench_backspace_replay(c: &mut Criterion) {
    let mut engine = CompositionEngine::new();
    c.bench_function("engine/backspace_replay", |b| {
        b.iter(|| {
            for ch in "nguowif".chars() {
                black_box(engine.process_key(KeyEvent::new(ch as u32, 0)));
            }
            for _ in 0..7 {
                black_box(engine.process_key(KeyEvent::new(KEY_BACKSPACE, 0)));
            }
        });
    });
}

fn bench_english_passthrough(c: &mut Criterion) {
    let mut engine = CompositionEngine::new();
    c.bench_function("engine/english_passthrough", |b| {
        b.iter(|| {
            type_word(&mut engine, "strings");
            type_word(&mut engine, "crow");
        });
    });
}

criterion_group!(
    benches,
    bench_telex_words,
    bench_vni_words,
    bench_backspace_replay,
    bench_english_passthrough
);
criterion_main!(benches);

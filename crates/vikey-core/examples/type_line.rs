//! Feeds each command-line argument through the engine as a keystroke
//! sequence and prints the resulting text.
//!
//!     cargo run --example type_line -- nguowif vieetj nam

use vikey_core::engine::CompositionEngine;
use vikey_core::types::{KeyEvent, KEY_SPACE};

fn main() {
    let mut engine = CompositionEngine::new();
    let mut line = String::new();

    for word in std::env::args().skip(1) {
        for c in word.chars() {
            engine.process_key(KeyEvent::new(c as u32, 0));
        }
        let result = engine.process_key(KeyEvent::new(KEY_SPACE, 0));
        line.push_str(&result.commit);
    }

    println!("{}", line.trim_end());
}

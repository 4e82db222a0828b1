use std::env;
use std::fs;

use text::{normalize, NormalizeConfig, TokenizedText};

const SAMPLE: &str = "/*\n * Copyright \u{00A9} 2024 Acme Corp.\n * Licenced under the \u{201C}Apache\u{201D} Licence, Version 2.0\n */";

fn main() {
    let content = match env::args().nth(1) {
        Some(path) => match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("could not read {path}: {err}");
                return;
            }
        },
        None => SAMPLE.to_string(),
    };

    println!("normalized: {}", normalize(&content));
    println!();

    let doc = TokenizedText::new(&content, &NormalizeConfig::default());
    for (idx, token) in doc.tokens().iter().enumerate() {
        let location = token.location();
        println!(
            "{:>4}:{:<3} {:<16} {:?}",
            location.line,
            location.column,
            token.text,
            doc.original_span(idx, idx + 1)
        );
    }
}

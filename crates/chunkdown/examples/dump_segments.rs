//! Segments a markdown file (or a built-in sample) through the
//! complete-buffer path and prints the resulting segment list.
//!
//! Run:
//!   cargo run -p chunkdown --example dump_segments [-- path/to/file.md]

use chunkdown::Segment;
use chunkdown::segment_markdown;
use std::fs;

fn main() {
    let input = match std::env::args().nth(1) {
        Some(path) => match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(err) => {
                eprintln!("read {path}: {err}");
                std::process::exit(1);
            }
        },
        None => sample().to_string(),
    };

    let store = segment_markdown(&input);
    println!("{} segment(s), {} bytes covered\n", store.len(), store.processed_len());

    for (i, seg) in store.segments().iter().enumerate() {
        match seg {
            Segment::Text(t) => {
                println!("[{i}] text  {:>5}..{:<5} {:?}", t.start, t.end, preview(&t.text));
            }
            Segment::Code(c) => {
                println!(
                    "[{i}] code  {:>5}..{:<5} lang={} completed={} {:?}",
                    c.start,
                    c.end,
                    c.lang.as_deref().unwrap_or("-"),
                    c.is_completed,
                    preview(&c.code),
                );
            }
        }
    }
}

fn preview(s: &str) -> String {
    let flat = s.replace('\n', "\\n");
    let mut out = String::new();
    for (i, ch) in flat.chars().enumerate() {
        if i >= 48 {
            out.push('…');
            break;
        }
        out.push(ch);
    }
    out
}

fn sample() -> &'static str {
    "A sample response.\n\n```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n\nAnd a trailing, still-open block:\n\n```py\nprint(1)\n"
}

//! Chunk-local fenced-code-block scanning.
//!
//! Every function here classifies a single chunk (the newly arrived suffix of
//! the cumulative content) on its own, without reference to prior chunks.
//! That keeps each update O(chunk) instead of O(total content). The cost is
//! that a fence marker split across two chunks is not recognized; this is the
//! documented, deterministic policy (see DESIGN.md), matching the behavior
//! downstream renderers are validated against.

/// An opening fence found inside a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpeningFence<'a> {
    lang: Option<&'a str>,
    /// Byte offset of the first content byte after the fence line (past its
    /// newline, or the chunk end if the line is still unterminated).
    content_start: usize,
}

/// True when the chunk contains, at a line start, an opening fence: exactly
/// three backticks, an optional language tag, then nothing but whitespace to
/// the end of the line.
pub fn detects_opening_fence(chunk: &str) -> bool {
    find_opening_fence(chunk).is_some()
}

/// True when the chunk contains, at a line start, a bare closing fence:
/// three backticks followed only by whitespace to the end of the chunk.
///
/// Only meaningful when the caller already knows the current segment is an
/// open code segment; a bare ``` is otherwise indistinguishable from a
/// tag-less opening fence.
pub fn detects_closing_fence(chunk: &str) -> bool {
    find_closing_fence(chunk).is_some()
}

/// The language tag of the first opening fence in the chunk, if any.
///
/// Tags are returned verbatim; see [`normalize_language`] for the alias
/// mapping applied when the tag is handed to a highlighter.
pub fn extract_language(chunk: &str) -> Option<&str> {
    find_opening_fence(chunk).and_then(|f| f.lang)
}

/// Drops everything up to and including the first opening fence line,
/// returning only the code content that follows. Chunks without an opening
/// fence come back unchanged.
pub fn strip_opening_fence_marker(chunk: &str) -> &str {
    match find_opening_fence(chunk) {
        Some(f) => &chunk[f.content_start..],
        None => chunk,
    }
}

/// Drops the trailing closing fence line, returning only the code content
/// that precedes it. Chunks without a closing fence come back unchanged.
pub fn strip_closing_fence_marker(chunk: &str) -> &str {
    match find_closing_fence(chunk) {
        Some(line_start) => &chunk[..line_start],
        None => chunk,
    }
}

/// Lower-cases a fence language tag and maps common aliases onto the names
/// highlighters know (`js` → `javascript`, `yml` → `yaml`, ...).
pub fn normalize_language(tag: &str) -> Option<String> {
    if tag.is_empty() {
        return None;
    }
    let lower = tag.to_ascii_lowercase();
    let mapped = match lower.as_str() {
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "sh" | "zsh" => "bash",
        "yml" => "yaml",
        "htm" | "html" | "xml" => "xml",
        _ => return Some(lower),
    };
    Some(mapped.to_string())
}

fn find_opening_fence(chunk: &str) -> Option<OpeningFence<'_>> {
    let mut line_start = 0;
    for line in chunk.split_inclusive('\n') {
        let line_end = line_start + line.len();
        if let Some(lang) = parse_opening_line(line) {
            return Some(OpeningFence {
                lang,
                content_start: line_end,
            });
        }
        line_start = line_end;
    }
    None
}

/// Parses one line (trailing newline included) as an opening fence.
/// `Some(None)` is a tag-less fence, `Some(Some(tag))` carries a language.
fn parse_opening_line(line: &str) -> Option<Option<&str>> {
    let rest = line.strip_prefix("```")?;
    // four or more backticks is not a fence
    if rest.starts_with('`') {
        return None;
    }
    let tag_len: usize = rest
        .chars()
        .take_while(|c| is_lang_char(*c))
        .map(char::len_utf8)
        .sum();
    let (tag, after) = rest.split_at(tag_len);
    if !after.chars().all(char::is_whitespace) {
        return None;
    }
    Some(if tag.is_empty() { None } else { Some(tag) })
}

/// Byte offset of the line start of a closing fence, if the chunk ends in
/// one (backticks plus nothing but whitespace through the end of the chunk).
fn find_closing_fence(chunk: &str) -> Option<usize> {
    let mut line_start = 0;
    for line in chunk.split_inclusive('\n') {
        let tail = &chunk[line_start..];
        if let Some(after) = tail.strip_prefix("```")
            && after.chars().all(char::is_whitespace)
        {
            return Some(line_start);
        }
        line_start += line.len();
    }
    None
}

fn is_lang_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '.')
}

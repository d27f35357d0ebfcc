//! The incremental segmentation state machine.
//!
//! Streaming transports deliver the assistant response as successive
//! *snapshots* of the content so far, each one a strict prefix-extension of
//! the previous. [`apply_snapshot`] takes the current [`SegmentStore`] and
//! the latest snapshot, isolates the new suffix (the chunk), classifies it
//! with the [`fence`](crate::fence) scanner, and applies exactly one
//! transition. Work per update is O(chunk), never O(total content).
//!
//! The machine has four states, derived from the last segment in the store
//! rather than tracked separately, so a cleared store is always consistent.

use crate::fence;
use crate::segment::Segment;
use crate::segment::SegmentStore;

/// What kind of segment is currently open at the tail of the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentState {
    /// No segments yet.
    Empty,
    /// Last segment is prose.
    InText,
    /// Last segment is a code block whose closing fence has not arrived.
    InOpenCode,
    /// Last segment is a closed code block.
    InClosedCode,
}

pub fn state_of(store: &SegmentStore) -> SegmentState {
    match store.last() {
        None => SegmentState::Empty,
        Some(Segment::Text(_)) => SegmentState::InText,
        Some(Segment::Code(c)) if c.is_completed => SegmentState::InClosedCode,
        Some(Segment::Code(_)) => SegmentState::InOpenCode,
    }
}

/// Applies at most one transition for the new suffix of `content`.
///
/// A snapshot identical to the previous one is a no-op, so repeated delivery
/// is idempotent. Snapshots must grow monotonically; a shrinking or
/// non-prefix snapshot is a caller protocol violation (debug-asserted here,
/// surfaced as a typed error by the session layer).
pub fn apply_snapshot(store: &mut SegmentStore, content: &str) {
    let last_end = store.processed_len();
    debug_assert!(
        content.len() >= last_end,
        "snapshots must grow monotonically"
    );
    let Some(chunk) = content.get(last_end..) else {
        return;
    };
    if chunk.is_empty() {
        return;
    }
    apply_chunk(store, chunk);
}

/// One transition of the state machine for an already-isolated chunk.
pub fn apply_chunk(store: &mut SegmentStore, chunk: &str) {
    if chunk.is_empty() {
        return;
    }
    let start = store.processed_len();
    let end = start + chunk.len();

    match state_of(store) {
        SegmentState::Empty | SegmentState::InClosedCode => {
            if fence::detects_opening_fence(chunk) {
                store.push(open_code_segment(chunk, start, end));
            } else {
                store.push(Segment::text(chunk, start, end));
            }
        }
        SegmentState::InText => {
            if fence::detects_opening_fence(chunk) {
                store.push(open_code_segment(chunk, start, end));
            } else {
                store.mutate_last(|seg| {
                    if let Segment::Text(t) = seg {
                        t.text.push_str(chunk);
                        t.end = end;
                    }
                });
            }
        }
        SegmentState::InOpenCode => {
            // closing is only ever evaluated against an open code segment;
            // an opening-looking chunk here is just more code
            if fence::detects_closing_fence(chunk) {
                store.mutate_last(|seg| {
                    if let Segment::Code(c) = seg {
                        c.code.push_str(fence::strip_closing_fence_marker(chunk));
                        c.end = end;
                        c.is_completed = true;
                    }
                });
            } else {
                store.mutate_last(|seg| {
                    if let Segment::Code(c) = seg {
                        c.code.push_str(chunk);
                        c.end = end;
                    }
                });
            }
        }
    }
}

/// One-shot segmentation of a complete message (the post-stream path for
/// persisted history). The content is fed through the same machine at line
/// granularity, which is exactly what streaming delivery converges to when
/// chunks arrive as whole lines. An unterminated fence at the end of input
/// stays open (`is_completed: false`); never an error.
pub fn segment_markdown(content: &str) -> SegmentStore {
    let mut store = SegmentStore::new();
    for line in content.split_inclusive('\n') {
        apply_chunk(&mut store, line);
    }
    store
}

fn open_code_segment(chunk: &str, start: usize, end: usize) -> Segment {
    Segment::code(
        fence::strip_opening_fence_marker(chunk),
        fence::extract_language(chunk).map(str::to_owned),
        start,
        end,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(store: &mut SegmentStore, snapshots: &[&str]) {
        for s in snapshots {
            apply_snapshot(store, s);
        }
    }

    #[test]
    fn empty_store_plus_prose_creates_a_text_segment() {
        let mut store = SegmentStore::new();
        apply_snapshot(&mut store, "hello");
        assert_eq!(state_of(&store), SegmentState::InText);
        assert_eq!(store.segments()[0].as_text().unwrap().text, "hello");
    }

    #[test]
    fn empty_store_plus_opening_fence_creates_open_code() {
        let mut store = SegmentStore::new();
        apply_snapshot(&mut store, "```rust\n");
        assert_eq!(state_of(&store), SegmentState::InOpenCode);
        let code = store.segments()[0].as_code().unwrap();
        assert_eq!(code.code, "");
        assert_eq!(code.lang.as_deref(), Some("rust"));
        assert!(!code.is_completed);
        assert_eq!((code.start, code.end), (0, 8));
    }

    #[test]
    fn prose_chunks_extend_the_open_text_segment() {
        let mut store = SegmentStore::new();
        feed(&mut store, &["hello", "hello world"]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.segments()[0].as_text().unwrap().text, "hello world");
        assert_eq!(store.processed_len(), 11);
    }

    #[test]
    fn opening_fence_after_text_starts_a_new_code_segment() {
        let mut store = SegmentStore::new();
        feed(&mut store, &["see below\n", "see below\n```py\n"]);
        assert_eq!(store.len(), 2);
        let code = store.segments()[1].as_code().unwrap();
        assert_eq!(code.lang.as_deref(), Some("py"));
        assert_eq!(code.start, 10);
        assert_eq!(store.processed_len(), 16);
    }

    #[test]
    fn closing_fence_completes_the_open_code_segment() {
        let mut store = SegmentStore::new();
        feed(&mut store, &["```js\n", "```js\nlet x;", "```js\nlet x;\n```"]);
        assert_eq!(state_of(&store), SegmentState::InClosedCode);
        let code = store.segments()[0].as_code().unwrap();
        assert_eq!(code.code, "let x;\n");
        assert!(code.is_completed);
        assert_eq!(code.end, 16);
    }

    #[test]
    fn opening_lookalike_inside_open_code_is_appended_as_code() {
        let mut store = SegmentStore::new();
        feed(&mut store, &["```md\n", "```md\n```js\nnested"]);
        assert_eq!(store.len(), 1);
        assert_eq!(state_of(&store), SegmentState::InOpenCode);
        assert_eq!(store.segments()[0].as_code().unwrap().code, "```js\nnested");
    }

    #[test]
    fn closing_fence_mid_chunk_with_trailing_code_does_not_close() {
        let mut store = SegmentStore::new();
        feed(&mut store, &["```sh\n", "```sh\necho hi\n```\necho again"]);
        // trailing non-whitespace after the bare fence keeps the block open
        assert_eq!(state_of(&store), SegmentState::InOpenCode);
    }

    #[test]
    fn text_after_closed_code_starts_a_new_text_segment() {
        let mut store = SegmentStore::new();
        feed(&mut store, &["```\n", "```\nx\n```", "```\nx\n```\nafter"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.segments()[1].as_text().unwrap().text, "\nafter");
        assert_eq!(state_of(&store), SegmentState::InText);
    }

    #[test]
    fn repeated_identical_snapshots_are_idempotent() {
        let mut store = SegmentStore::new();
        apply_snapshot(&mut store, "hello");
        let version = store.version();
        apply_snapshot(&mut store, "hello");
        assert_eq!(store.version(), version);
    }

    #[test]
    fn opening_fence_with_no_content_yet_creates_an_empty_code_segment() {
        let mut store = SegmentStore::new();
        apply_snapshot(&mut store, "```");
        let code = store.segments()[0].as_code().unwrap();
        assert_eq!(code.code, "");
        assert_eq!(code.lang, None);
        assert!(!code.is_completed);
    }

    #[test]
    fn segment_markdown_alternates_text_and_code() {
        let store = segment_markdown("intro\n```py\na = 1\n```\noutro\n");
        let segs = store.segments();
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].as_text().unwrap().text, "intro\n");
        let code = segs[1].as_code().unwrap();
        assert_eq!(code.lang.as_deref(), Some("py"));
        assert_eq!(code.code, "a = 1\n");
        assert!(code.is_completed);
        assert_eq!(segs[2].as_text().unwrap().text, "\noutro\n");
    }

    #[test]
    fn segment_markdown_leaves_an_unterminated_fence_open() {
        let store = segment_markdown("```rust\nfn main() {}\n");
        let segs = store.segments();
        assert_eq!(segs.len(), 1);
        let code = segs[0].as_code().unwrap();
        assert_eq!(code.code, "fn main() {}\n");
        assert!(!code.is_completed);
    }

    #[test]
    fn segment_markdown_covers_the_whole_input() {
        let input = "a\n```js\nx\n```\nb\n";
        let store = segment_markdown(input);
        assert_eq!(store.processed_len(), input.len());
        assert_eq!(store.segments()[0].start(), 0);
    }
}

use uuid::Uuid;

/// A contiguous prose span of the cumulative streamed content.
///
/// `start..end` is a half-open byte range over the cumulative content; `text`
/// is the exact slice of that range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSegment {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub id: Uuid,
}

/// A contiguous fenced-code span of the cumulative streamed content.
///
/// The `start..end` range covers the fence markers too; `code` holds only the
/// code content with the fence lines stripped. `lang` is fixed at creation
/// from the opening fence's tag and `is_completed` flips to `true` exactly
/// once, when the closing fence is observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeSegment {
    pub code: String,
    pub lang: Option<String>,
    pub start: usize,
    pub end: usize,
    pub id: Uuid,
    pub is_completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(TextSegment),
    Code(CodeSegment),
}

impl Segment {
    pub fn text(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self::Text(TextSegment {
            text: text.into(),
            start,
            end,
            id: Uuid::new_v4(),
        })
    }

    pub fn code(code: impl Into<String>, lang: Option<String>, start: usize, end: usize) -> Self {
        Self::Code(CodeSegment {
            code: code.into(),
            lang,
            start,
            end,
            id: Uuid::new_v4(),
            is_completed: false,
        })
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Text(t) => t.id,
            Self::Code(c) => c.id,
        }
    }

    pub fn start(&self) -> usize {
        match self {
            Self::Text(t) => t.start,
            Self::Code(c) => c.start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Self::Text(t) => t.end,
            Self::Code(c) => c.end,
        }
    }

    /// Length of the covered source range in bytes (fence markers included
    /// for code segments).
    pub fn source_len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_open_code(&self) -> bool {
        matches!(self, Self::Code(c) if !c.is_completed)
    }

    pub fn as_code(&self) -> Option<&CodeSegment> {
        match self {
            Self::Code(c) => Some(c),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextSegment> {
        match self {
            Self::Text(t) => Some(t),
            Self::Code(_) => None,
        }
    }
}

/// Ordered, contiguous sequence of [`Segment`]s for one assistant turn.
///
/// The store permits exactly two mutations besides [`clear`](Self::clear):
/// appending a new segment and mutating the **last** segment in place.
/// Earlier segments are frozen once superseded, so output already shown to
/// the user never changes underneath a renderer.
///
/// Every mutation bumps [`version`](Self::version); render layers key their
/// caches off the version instead of observing individual mutations.
#[derive(Clone, Debug, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
    version: u64,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Monotonic change counter; bumped by `push`, `mutate_last` and `clear`.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// End offset of the last segment: how many bytes of cumulative content
    /// have been segmented so far.
    pub fn processed_len(&self) -> usize {
        self.segments.last().map(Segment::end).unwrap_or(0)
    }

    /// Appends a segment. The segment must continue exactly where the
    /// previous one ended.
    pub fn push(&mut self, segment: Segment) {
        debug_assert_eq!(segment.start(), self.processed_len());
        debug_assert!(segment.end() >= segment.start());
        self.segments.push(segment);
        self.version = self.version.wrapping_add(1);
    }

    /// Mutates the last segment in place. Returns `false` when the store is
    /// empty. No other segment is reachable for mutation.
    pub fn mutate_last(&mut self, f: impl FnOnce(&mut Segment)) -> bool {
        let Some(last) = self.segments.last_mut() else {
            return false;
        };
        let was_completed = matches!(last, Segment::Code(c) if c.is_completed);
        f(last);
        // completed code never reopens
        debug_assert!(!(was_completed && last.is_open_code()));
        self.version = self.version.wrapping_add(1);
        true
    }

    /// Resets to empty. Called at turn start and on finish/abort so stale
    /// segments never leak into the next turn.
    pub fn clear(&mut self) {
        if self.segments.is_empty() {
            return;
        }
        self.segments.clear();
        self.version = self.version.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_ranges_contiguous() {
        let mut store = SegmentStore::new();
        store.push(Segment::text("Hello ", 0, 6));
        store.push(Segment::code("", Some("js".into()), 6, 12));
        assert_eq!(store.processed_len(), 12);
        assert_eq!(store.segments()[0].end(), store.segments()[1].start());
    }

    #[test]
    fn mutate_last_reaches_only_the_last_segment() {
        let mut store = SegmentStore::new();
        store.push(Segment::text("a", 0, 1));
        store.push(Segment::text("b", 1, 2));
        store.mutate_last(|seg| {
            if let Segment::Text(t) = seg {
                t.text.push('c');
                t.end += 1;
            }
        });
        assert_eq!(store.segments()[0].as_text().unwrap().text, "a");
        assert_eq!(store.segments()[1].as_text().unwrap().text, "bc");
    }

    #[test]
    fn mutate_last_on_empty_store_is_a_noop() {
        let mut store = SegmentStore::new();
        assert!(!store.mutate_last(|_| unreachable!()));
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn every_mutation_bumps_the_version() {
        let mut store = SegmentStore::new();
        let v0 = store.version();
        store.push(Segment::text("x", 0, 1));
        let v1 = store.version();
        assert!(v1 > v0);
        store.mutate_last(|_| {});
        let v2 = store.version();
        assert!(v2 > v1);
        store.clear();
        assert!(store.version() > v2);
    }

    #[test]
    fn clear_on_empty_store_does_not_bump_version() {
        let mut store = SegmentStore::new();
        store.clear();
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn segment_ids_are_stable_across_mutation() {
        let mut store = SegmentStore::new();
        store.push(Segment::code("", None, 0, 3));
        let id = store.segments()[0].id();
        store.mutate_last(|seg| {
            if let Segment::Code(c) = seg {
                c.code.push_str("x = 1");
                c.end += 5;
            }
        });
        assert_eq!(store.segments()[0].id(), id);
    }
}

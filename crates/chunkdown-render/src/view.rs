//! Incremental view over a [`SegmentStore`].
//!
//! Only the last segment of a store can change, so the view renders every
//! earlier ("committed") segment exactly once and caches the lines forever.
//! Each update re-renders at most the tail segment, keyed off the store's
//! version counter. This is what keeps long streamed responses cheap to
//! draw and keeps already-read output rock steady on screen.
//!
//! A view instance belongs to one streaming session; pair them one-to-one
//! the same way stores are owned per thread.

use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use chunkdown_core::Segment;
use chunkdown_core::SegmentStore;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;

use crate::code;
use crate::code::CodeRenderOptions;
use crate::draw;
use crate::highlight::CodeHighlighter;
use crate::prose;
use crate::theme::Theme;
use crate::viewport::ViewportState;

#[derive(Clone, Debug)]
pub struct SegmentViewOptions {
    pub show_scrollbar: bool,
    /// Blank lines inserted between consecutive segments.
    pub segment_gap: u16,
    pub code: CodeRenderOptions,
}

impl Default for SegmentViewOptions {
    fn default() -> Self {
        Self {
            show_scrollbar: true,
            segment_gap: 1,
            code: CodeRenderOptions::default(),
        }
    }
}

pub struct SegmentListView {
    options: SegmentViewOptions,
    highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>,

    cached_width: Option<u16>,
    committed_segments: usize,
    committed_lines: Vec<Line<'static>>,
    tail_key: u64,
    tail_lines: Vec<Line<'static>>,

    pub viewport: ViewportState,
}

impl Default for SegmentListView {
    fn default() -> Self {
        Self::with_options(SegmentViewOptions::default())
    }
}

impl SegmentListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SegmentViewOptions) -> Self {
        Self {
            options,
            highlighter: None,
            cached_width: None,
            committed_segments: 0,
            committed_lines: Vec::new(),
            tail_key: 0,
            tail_lines: Vec::new(),
            viewport: ViewportState::default(),
        }
    }

    pub fn options(&self) -> &SegmentViewOptions {
        &self.options
    }

    pub fn set_highlighter(
        &mut self,
        highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>,
    ) {
        self.highlighter = highlighter;
        self.reset_layout_cache();
    }

    /// Drops all cached layout. Call when the view is pointed at a new
    /// turn's store.
    pub fn reset(&mut self) {
        self.reset_layout_cache();
        self.viewport = ViewportState::default();
    }

    /// The code content of the code segment at `segment_index`, for
    /// clipboard integration ("copy" on a rendered code block).
    pub fn code_text(&self, store: &SegmentStore, segment_index: usize) -> Option<String> {
        store
            .segments()
            .get(segment_index)
            .and_then(Segment::as_code)
            .map(|c| c.code.clone())
    }

    pub fn render_ref(
        &mut self,
        store: &SegmentStore,
        area: Rect,
        buf: &mut Buffer,
        theme: &Theme,
    ) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let (content_area, scrollbar_x) = if self.options.show_scrollbar && area.width >= 2 {
            (
                Rect::new(area.x, area.y, area.width - 1, area.height),
                Some(area.x + area.width - 1),
            )
        } else {
            (area, None)
        };

        self.viewport.set_viewport(content_area.height);
        self.ensure_layout(store, content_area.width, theme);

        for row in 0..content_area.height {
            let y = content_area.y + row;
            buf.set_style(
                Rect::new(content_area.x, y, content_area.width, 1),
                theme.text_primary,
            );
            let idx = (self.viewport.y as usize).saturating_add(row as usize);
            if let Some(line) = self.line_at(idx) {
                draw::render_spans_clipped(
                    content_area.x,
                    y,
                    content_area.width,
                    buf,
                    &line.spans,
                    theme.text_primary,
                );
            }
        }

        if let Some(sb_x) = scrollbar_x {
            draw::render_scrollbar(
                Rect::new(sb_x, area.y, 1, area.height),
                buf,
                &self.viewport,
                theme.text_muted,
            );
        }
    }

    pub fn total_lines_for_width(
        &mut self,
        store: &SegmentStore,
        width: u16,
        theme: &Theme,
    ) -> usize {
        self.ensure_layout(store, width, theme);
        self.committed_lines.len().saturating_add(self.tail_lines.len())
    }

    /// Fully materialized lines at the given width, committed plus tail.
    pub fn snapshot_lines(
        &mut self,
        store: &SegmentStore,
        width: u16,
        theme: &Theme,
    ) -> Vec<Line<'static>> {
        self.ensure_layout(store, width, theme);
        let mut out = self.committed_lines.clone();
        out.extend(self.tail_lines.clone());
        out
    }

    fn ensure_layout(&mut self, store: &SegmentStore, width: u16, theme: &Theme) {
        if self.cached_width != Some(width) {
            self.reset_layout_cache();
            self.cached_width = Some(width);
        }
        if width == 0 {
            self.viewport.set_content(0);
            return;
        }

        let committed_target = store.len().saturating_sub(1);
        if self.committed_segments > committed_target {
            // the store was cleared for a new turn
            self.reset_layout_cache();
            self.cached_width = Some(width);
        }

        while self.committed_segments < committed_target {
            let seg = &store.segments()[self.committed_segments];
            let lines = self.render_segment(seg, width, theme);
            self.committed_lines.extend(lines);
            for _ in 0..self.options.segment_gap {
                self.committed_lines.push(Line::default());
            }
            self.committed_segments += 1;
        }

        let key = tail_key(store);
        if key != self.tail_key {
            self.tail_key = key;
            self.tail_lines.clear();
            if let Some(seg) = store.last() {
                self.tail_lines = self.render_segment(seg, width, theme);
            }
        }

        let total = self.committed_lines.len().saturating_add(self.tail_lines.len());
        self.viewport.set_content(total as u32);
    }

    fn render_segment(&self, seg: &Segment, width: u16, theme: &Theme) -> Vec<Line<'static>> {
        match seg {
            Segment::Text(t) => prose::render_prose(&t.text, width, theme),
            Segment::Code(c) => code::render_code_segment(
                c,
                self.highlighter.as_deref().map(|h| h as &dyn CodeHighlighter),
                theme,
                &self.options.code,
            ),
        }
    }

    fn line_at(&self, idx: usize) -> Option<&Line<'static>> {
        if idx < self.committed_lines.len() {
            return self.committed_lines.get(idx);
        }
        self.tail_lines.get(idx - self.committed_lines.len())
    }

    fn reset_layout_cache(&mut self) {
        self.cached_width = None;
        self.committed_segments = 0;
        self.committed_lines.clear();
        self.tail_key = 0;
        self.tail_lines.clear();
    }
}

/// Cache key for the tail segment: changes whenever the store mutates or
/// the tail's identity changes, and is never zero for a non-empty store.
fn tail_key(store: &SegmentStore) -> u64 {
    let Some(last) = store.last() else {
        return 0;
    };
    let mut h = DefaultHasher::new();
    store.version().hash(&mut h);
    last.id().hash(&mut h);
    h.finish().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkdown_core::segmenter::apply_snapshot;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn committed_lines_stay_identical_while_the_tail_grows() {
        let theme = Theme::default();
        let mut store = SegmentStore::new();
        let mut view = SegmentListView::new();

        apply_snapshot(&mut store, "first paragraph\n");
        apply_snapshot(&mut store, "first paragraph\n```js\n");
        let before = plain(&view.snapshot_lines(&store, 40, &theme));

        apply_snapshot(&mut store, "first paragraph\n```js\nlet x = 1;");
        let after = plain(&view.snapshot_lines(&store, 40, &theme));

        // the prose segment's rendering is byte-for-byte unchanged
        assert_eq!(before[0], after[0]);
        assert!(after.last().unwrap().contains("let x = 1;"));
    }

    #[test]
    fn gap_lines_separate_segments() {
        let theme = Theme::default();
        let mut store = SegmentStore::new();
        apply_snapshot(&mut store, "prose\n");
        apply_snapshot(&mut store, "prose\n```\n");
        apply_snapshot(&mut store, "prose\n```\ncode\n```");

        let mut view = SegmentListView::new();
        let lines = plain(&view.snapshot_lines(&store, 40, &theme));
        assert_eq!(lines[0], "prose");
        assert_eq!(lines[1], "");
    }

    #[test]
    fn cleared_store_resets_the_layout() {
        let theme = Theme::default();
        let mut store = SegmentStore::new();
        apply_snapshot(&mut store, "old turn\n```js\nx\n```");
        let mut view = SegmentListView::new();
        assert!(view.total_lines_for_width(&store, 40, &theme) > 0);

        store.clear();
        assert_eq!(view.total_lines_for_width(&store, 40, &theme), 0);

        apply_snapshot(&mut store, "new turn");
        let lines = plain(&view.snapshot_lines(&store, 40, &theme));
        assert_eq!(lines, vec!["new turn"]);
    }

    #[test]
    fn render_ref_draws_without_panic_and_follows_the_tail() {
        let theme = Theme::default();
        let mut store = SegmentStore::new();
        let content = (0..30).map(|i| format!("line {i} ")).collect::<String>();
        apply_snapshot(&mut store, &content);

        let mut view = SegmentListView::new();
        let area = Rect::new(0, 0, 12, 5);
        let mut buf = Buffer::empty(area);
        view.render_ref(&store, area, &mut buf, &theme);

        assert!(view.viewport.follow_tail);
        assert_eq!(
            view.viewport.y,
            view.viewport.max_y(),
            "streaming view stays pinned to the newest line"
        );
    }

    #[test]
    fn code_text_returns_copyable_code_content() {
        let mut store = SegmentStore::new();
        apply_snapshot(&mut store, "```py\n");
        apply_snapshot(&mut store, "```py\nprint(1)\n```");

        let view = SegmentListView::new();
        assert_eq!(view.code_text(&store, 0).as_deref(), Some("print(1)\n"));
        assert_eq!(view.code_text(&store, 1), None);
    }

    #[test]
    fn width_change_invalidates_and_rewraps() {
        let theme = Theme::default();
        let mut store = SegmentStore::new();
        apply_snapshot(&mut store, "alpha beta gamma delta");

        let mut view = SegmentListView::new();
        let wide = view.total_lines_for_width(&store, 40, &theme);
        let narrow = view.total_lines_for_width(&store, 6, &theme);
        assert!(narrow > wide);
    }
}

//! `chunkdown-render` draws a [`chunkdown_core::SegmentStore`] into a
//! ratatui buffer.
//!
//! The projection mirrors the segment model: text segments go through a
//! compact Markdown prose renderer, code segments through a code renderer
//! whose line numbers and syntax highlighting are gated on block completion
//! (no gutter jitter, no re-highlighting on every streamed token). The
//! [`view::SegmentListView`] caches every committed segment's lines and
//! re-renders only the tail, keyed off the store's version counter.
//!
//! Highlighting backends plug in through [`highlight::CodeHighlighter`];
//! see the `chunkdown-syntax` crate for a syntect-based one.

pub mod code;
pub mod draw;
pub mod highlight;
pub mod prose;
pub mod theme;
pub mod view;
pub mod viewport;

pub use code::CodeRenderOptions;
pub use highlight::CodeHighlighter;
pub use highlight::NoHighlight;
pub use theme::Theme;
pub use view::SegmentListView;
pub use view::SegmentViewOptions;
pub use viewport::ViewportState;

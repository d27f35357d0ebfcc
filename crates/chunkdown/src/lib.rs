//! Batteries-included facade for the `chunkdown` workspace.
//!
//! `chunkdown` segments a streaming assistant response into alternating
//! prose and fenced-code segments incrementally — O(new suffix) per update,
//! with already-emitted segments frozen so UIs can cache their rendering.
//!
//! - The segmentation engine and the per-thread session layer are always
//!   available (re-exported from `chunkdown-core`).
//! - `render` (feature): ratatui projection — [`render::SegmentListView`],
//!   prose + code renderers, theming.
//! - `syntect` (feature): implies `render`; adds the
//!   [`syntax::SyntectHighlighter`] backend.
//!
//! ```
//! use chunkdown::StreamSession;
//!
//! let mut session = StreamSession::new("thread-1");
//! session.update("Fenced:\n").unwrap();
//! session.update("Fenced:\n```py\nprint(1)\n```").unwrap();
//! assert_eq!(session.segments().len(), 2);
//! ```

pub use chunkdown_core::ChatStatus;
pub use chunkdown_core::CodeSegment;
pub use chunkdown_core::Segment;
pub use chunkdown_core::SegmentState;
pub use chunkdown_core::SegmentStore;
pub use chunkdown_core::SessionError;
pub use chunkdown_core::SessionRegistry;
pub use chunkdown_core::StreamSession;
pub use chunkdown_core::TextSegment;
pub use chunkdown_core::fence;
pub use chunkdown_core::segment_markdown;
pub use chunkdown_core::segmenter;
pub use chunkdown_core::session;

#[cfg(feature = "render")]
pub use chunkdown_render as render;

#[cfg(feature = "syntect")]
pub use chunkdown_syntax as syntax;

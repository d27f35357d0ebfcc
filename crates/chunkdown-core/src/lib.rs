//! `chunkdown-core` segments a streaming assistant response into alternating
//! prose and fenced-code segments, incrementally.
//!
//! During token streaming a chat UI receives successive snapshots of the
//! response so far. Re-parsing the whole buffer on every snapshot is wasted
//! work and makes already-rendered output flicker. This crate instead keeps
//! an ordered [`segment::SegmentStore`] and classifies only the newly
//! arrived suffix on each update: O(chunk) per snapshot, and segments that
//! are no longer last are frozen, so a renderer can cache them forever.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: updates are synchronous and run to completion.
//! - No async runtime, no I/O; the engine itself cannot fail.
//! - One store per conversation thread; nothing is shared across turns.
//!
//! ## Getting started
//!
//! ```
//! use chunkdown_core::session::StreamSession;
//!
//! let mut session = StreamSession::new("thread-1");
//! session.update("Look:\n").unwrap();
//! session.update("Look:\n```rust\n").unwrap();
//! session.update("Look:\n```rust\nfn main() {}\n").unwrap();
//! session.update("Look:\n```rust\nfn main() {}\n```").unwrap();
//!
//! let segments = session.segments();
//! assert_eq!(segments.len(), 2);
//! assert!(segments[1].as_code().unwrap().is_completed);
//! ```
//!
//! Useful entry points:
//! - [`session::StreamSession`] / [`session::SessionRegistry`]: per-thread
//!   streaming state with turn lifecycle handling.
//! - [`segmenter::apply_snapshot`]: the raw state machine, for callers that
//!   manage their own stores.
//! - [`segmenter::segment_markdown`]: one-shot segmentation of a complete,
//!   persisted message.
//! - [`fence`]: the chunk-local fence scanner.

pub mod fence;
pub mod segment;
pub mod segmenter;
pub mod session;

pub use segment::CodeSegment;
pub use segment::Segment;
pub use segment::SegmentStore;
pub use segment::TextSegment;
pub use segmenter::SegmentState;
pub use segmenter::segment_markdown;
pub use session::ChatStatus;
pub use session::SessionError;
pub use session::SessionRegistry;
pub use session::StreamSession;

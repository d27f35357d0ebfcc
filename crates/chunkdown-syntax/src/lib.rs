//! Highlighting backends implementing
//! [`chunkdown_render::CodeHighlighter`].
//!
//! Backends are opt-in per feature so the render path stays dependency-free
//! by default. Currently: [`syntect`] (feature `syntect`).

#[cfg(feature = "syntect")]
pub mod syntect;

#[cfg(feature = "syntect")]
pub use syntect::SyntectHighlighter;

//! Per-thread streaming sessions.
//!
//! Each active conversation thread owns one [`StreamSession`], which owns one
//! [`SegmentStore`]. Concurrent chats never share a store. Updates are
//! synchronous and run to completion; serialization per store is the
//! caller's (single) UI loop, not a lock.

use std::collections::HashMap;

use crate::segment::Segment;
use crate::segment::SegmentStore;
use crate::segmenter;
use thiserror::Error;

/// Lifecycle of one assistant turn, mirroring the transport's status events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChatStatus {
    /// No turn in flight.
    #[default]
    Ready,
    /// Request sent, no tokens yet.
    Submitted,
    /// Tokens are arriving.
    Streaming,
    /// The turn failed.
    Error,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The snapshot is shorter than content already segmented. Out-of-order
    /// or corrected snapshots are a transport bug; the store is left as-is.
    #[error("snapshot shrank to {got} bytes but {processed} bytes were already segmented")]
    NonMonotonicSnapshot { processed: usize, got: usize },
    /// The snapshot is long enough but is not a prefix-extension of what was
    /// already segmented (the previous end lands inside a code point).
    #[error("snapshot is not an extension of the {processed} bytes already segmented")]
    MisalignedSnapshot { processed: usize },
}

/// One streaming turn's state: status plus the owned segment store.
#[derive(Debug, Default)]
pub struct StreamSession {
    id: String,
    status: ChatStatus,
    store: SegmentStore,
}

impl StreamSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ChatStatus::Ready,
            store: SegmentStore::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> ChatStatus {
        self.status
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    pub fn segments(&self) -> &[Segment] {
        self.store.segments()
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.status, ChatStatus::Submitted | ChatStatus::Streaming)
    }

    /// Feeds the latest cumulative snapshot into the segmenter.
    ///
    /// Snapshots must grow monotonically for the duration of a turn; a
    /// shrinking or misaligned snapshot is rejected without touching the
    /// store. An unchanged snapshot is a no-op.
    pub fn update(&mut self, cumulative: &str) -> Result<(), SessionError> {
        let processed = self.store.processed_len();
        if cumulative.len() < processed {
            return Err(SessionError::NonMonotonicSnapshot {
                processed,
                got: cumulative.len(),
            });
        }
        if !cumulative.is_char_boundary(processed) {
            return Err(SessionError::MisalignedSnapshot { processed });
        }
        tracing::trace!(
            session = %self.id,
            processed,
            len = cumulative.len(),
            "segmenting snapshot"
        );
        segmenter::apply_snapshot(&mut self.store, cumulative);
        self.status = ChatStatus::Streaming;
        Ok(())
    }

    /// Transport status changed. Entering `Submitted` (a new turn was just
    /// requested) clears the store so nothing stale survives into the next
    /// response; entering `Error` clears too.
    pub fn set_status(&mut self, status: ChatStatus) {
        if status == self.status {
            return;
        }
        tracing::debug!(session = %self.id, ?status, "status change");
        self.status = status;
        if matches!(status, ChatStatus::Submitted | ChatStatus::Error) {
            self.store.clear();
        }
    }

    /// The turn finished normally. The store is cleared: the finished text
    /// is persisted elsewhere and re-rendered through the complete-buffer
    /// path ([`segmenter::segment_markdown`]).
    pub fn finish(&mut self) {
        tracing::debug!(session = %self.id, "turn finished");
        self.store.clear();
        self.status = ChatStatus::Ready;
    }

    /// The turn was stopped by the user.
    pub fn abort(&mut self) {
        tracing::debug!(session = %self.id, "turn aborted");
        self.store.clear();
        self.status = ChatStatus::Ready;
    }

    /// Drops all segments without touching the status.
    pub fn reset(&mut self) {
        self.store.clear();
    }
}

/// All live sessions, keyed by thread id. Sessions are created lazily on
/// first use and removed when their thread closes.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, StreamSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for `thread_id`, created on first use.
    pub fn session(&mut self, thread_id: &str) -> &mut StreamSession {
        self.sessions
            .entry(thread_id.to_string())
            .or_insert_with(|| StreamSession::new(thread_id))
    }

    pub fn get(&self, thread_id: &str) -> Option<&StreamSession> {
        self.sessions.get(thread_id)
    }

    /// Feeds a snapshot to one thread's session.
    pub fn update(&mut self, thread_id: &str, cumulative: &str) -> Result<(), SessionError> {
        self.session(thread_id).update(cumulative)
    }

    /// Clears one thread's segments (turn start).
    pub fn reset(&mut self, thread_id: &str) {
        if let Some(session) = self.sessions.get_mut(thread_id) {
            session.reset();
        }
    }

    /// Removes a closed thread's session entirely.
    pub fn close(&mut self, thread_id: &str) -> Option<StreamSession> {
        self.sessions.remove(thread_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamSession> {
        self.sessions.values()
    }
}

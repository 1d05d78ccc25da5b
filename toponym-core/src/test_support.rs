//! Deterministic test doubles for the engine's boundary traits.
//!
//! [`StubFetcher`] answers remote lookups from a fixed table, [`RecordingSink`]
//! keeps every editor command, [`VecChunkSource`] replays in-memory chunks and
//! [`RecordingProgress`] keeps every progress snapshot.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::driver::{ChunkError, ChunkSource, Progress, ProgressObserver};
use crate::editor::{EditorCommand, EditorSink, SinkError};
use crate::entity::{EntityKind, EntityRef, RawEntity, Tags};
use crate::remote::{EntityFetcher, FetchError, FetchOutcome};

/// Stub [`EntityFetcher`] backed by a table of known entities.
///
/// Entities missing from the table are reported as gone.
///
/// # Examples
///
/// ```
/// use toponym_core::test_support::StubFetcher;
/// use toponym_core::{EntityFetcher, EntityKind, FetchOutcome, Tags};
///
/// let fetcher = StubFetcher::default().with_found(EntityKind::Way, 1, Tags::new());
/// assert_eq!(fetcher.fetch(EntityKind::Way, 1), Ok(FetchOutcome::Found(Tags::new())));
/// assert_eq!(fetcher.fetch(EntityKind::Way, 2), Ok(FetchOutcome::Gone));
/// assert_eq!(fetcher.calls(), 2);
/// ```
#[derive(Debug, Default)]
pub struct StubFetcher {
    entities: HashMap<EntityRef, Tags>,
    error: Option<FetchError>,
    calls: AtomicUsize,
}

impl StubFetcher {
    /// Answer lookups of `kind/id` with `tags`.
    #[must_use]
    pub fn with_found(mut self, kind: EntityKind, id: i64, tags: Tags) -> Self {
        self.entities.insert(EntityRef::new(kind, id), tags);
        self
    }

    /// Fail every lookup with `error`.
    #[must_use]
    pub fn with_error(mut self, error: FetchError) -> Self {
        self.error = Some(error);
        self
    }

    /// Number of lookups performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EntityFetcher for StubFetcher {
    fn fetch(&self, kind: EntityKind, id: i64) -> Result<FetchOutcome, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(self
            .entities
            .get(&EntityRef::new(kind, id))
            .map_or(FetchOutcome::Gone, |tags| FetchOutcome::Found(tags.clone())))
    }
}

/// [`EditorSink`] that records every command it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Mutex<Vec<EditorCommand>>,
    unreachable: bool,
}

impl RecordingSink {
    /// A sink that records commands and then reports itself unreachable.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            commands: Mutex::default(),
            unreachable: true,
        }
    }

    /// Commands received so far, in arrival order.
    #[must_use]
    pub fn commands(&self) -> Vec<EditorCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EditorSink for RecordingSink {
    fn submit(&self, command: &EditorCommand) -> Result<(), SinkError> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.clone());
        if self.unreachable {
            return Err(SinkError::Unreachable {
                url: "http://127.0.0.1:8111".to_owned(),
                message: "connection refused".to_owned(),
            });
        }
        Ok(())
    }
}

/// [`ChunkSource`] replaying in-memory chunks.
#[derive(Debug, Default)]
pub struct VecChunkSource {
    chunks: VecDeque<Result<Vec<RawEntity>, String>>,
    total: usize,
}

impl VecChunkSource {
    /// Replay `chunks` in order.
    #[must_use]
    pub fn new(chunks: Vec<Vec<RawEntity>>) -> Self {
        let total = chunks.len();
        Self {
            chunks: chunks.into_iter().map(Ok).collect(),
            total,
        }
    }

    /// Append a chunk that fails to decode with `message`.
    #[must_use]
    pub fn with_failure(mut self, message: &str) -> Self {
        self.chunks.push_back(Err(message.to_owned()));
        self.total += 1;
        self
    }
}

impl ChunkSource for VecChunkSource {
    fn total_chunks(&self) -> Option<usize> {
        Some(self.total)
    }

    fn next_chunk(&mut self) -> Option<Result<Vec<RawEntity>, ChunkError>> {
        self.chunks
            .pop_front()
            .map(|chunk| chunk.map_err(ChunkError::from))
    }
}

/// [`ProgressObserver`] that keeps every snapshot.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    snapshots: Vec<Progress>,
}

impl RecordingProgress {
    /// Snapshots received so far.
    #[must_use]
    pub fn snapshots(&self) -> &[Progress] {
        &self.snapshots
    }
}

impl ProgressObserver for RecordingProgress {
    fn on_chunk(&mut self, progress: &Progress) {
        self.snapshots.push(progress.clone());
    }
}

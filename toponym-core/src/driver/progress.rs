//! Per-chunk progress snapshots and the linear ETA.

use std::time::Duration;

use log::info;

use crate::state::RunCounters;

/// Snapshot taken after each chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Chunks processed so far.
    pub chunks_done: usize,
    /// Total chunks, when the source knows it.
    pub total_chunks: Option<usize>,
    /// Time since the run started.
    pub elapsed: Duration,
    /// Tallies so far.
    pub counters: RunCounters,
    /// Distinct labels so far.
    pub labels: usize,
}

impl Progress {
    /// Completion percentage, rounded down.
    #[must_use]
    pub fn percent(&self) -> Option<u64> {
        let total = u64::try_from(self.total_chunks?).ok()?;
        let done = u64::try_from(self.chunks_done).ok()?;
        done.checked_mul(100)?.checked_div(total)
    }

    /// Estimated time remaining, extrapolated linearly from the elapsed time.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use toponym_core::{Progress, RunCounters};
    ///
    /// let progress = Progress {
    ///     chunks_done: 1,
    ///     total_chunks: Some(4),
    ///     elapsed: Duration::from_secs(10),
    ///     counters: RunCounters::default(),
    ///     labels: 0,
    /// };
    /// assert_eq!(progress.eta(), Some(Duration::from_secs(30)));
    /// ```
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        let total = u128::try_from(self.total_chunks?).ok()?;
        let done = u128::try_from(self.chunks_done).ok()?;
        let elapsed = self.elapsed.as_millis();
        let projected = elapsed.checked_mul(total)?.checked_div(done)?;
        let remaining = u64::try_from(projected.saturating_sub(elapsed)).ok()?;
        Some(Duration::from_millis(remaining))
    }
}

/// Receives a snapshot after every chunk.
pub trait ProgressObserver {
    /// Called once per processed chunk.
    fn on_chunk(&mut self, progress: &Progress);
}

/// Logs one `info` line per chunk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_chunk(&mut self, progress: &Progress) {
        let percent = progress
            .percent()
            .map_or_else(|| "?".to_owned(), |p| format!("{p}%"));
        let eta = progress
            .eta()
            .map_or_else(|| "--:--".to_owned(), |eta| clock(eta, false));
        let counters = &progress.counters;
        info!(
            "{} ({percent}) -> {eta} : Names : {}, Errors : {} - Nodes : {} - Ways : {} - Rels : {}",
            clock(progress.elapsed, true),
            progress.labels,
            counters.errors,
            counters.nodes,
            counters.ways,
            counters.relations,
        );
    }
}

/// Render as `HH:MM:SS`, or `HH:MM` without seconds.
fn clock(duration: Duration, seconds: bool) -> String {
    let secs = duration.as_secs();
    let hours = secs.checked_div(3600).unwrap_or_default();
    let minutes = secs.checked_rem(3600).and_then(|s| s.checked_div(60)).unwrap_or_default();
    if seconds {
        let rest = secs.checked_rem(60).unwrap_or_default();
        format!("{hours:02}:{minutes:02}:{rest:02}")
    } else {
        format!("{hours:02}:{minutes:02}")
    }
}

//! Canonical price snapshot and the stream repositories hand them out in.

use std::{fmt, iter::FusedIterator};

use chrono::{DateTime, Utc};
use market_data_provider::models::bar::Bar;
use serde::{Deserialize, Serialize};

/// One observed price bar for an asset, independent of the provider it came from.
///
/// `low <= open, close <= high` holds for sane provider data but is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Start of the bar period (UTC).
    pub date: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price in the period.
    pub high: f64,
    /// Lowest price in the period.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Units traded in the period.
    pub volume: i64,
}

impl From<Bar> for Snapshot {
    /// Direct field mapping. Volume is coerced to an integer, nothing else changes.
    fn from(bar: Bar) -> Self {
        Snapshot {
            date: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume as i64,
        }
    }
}

/// Ordered, single-pass sequence of [`Snapshot`]s.
///
/// The stream owns data that is already in memory; consuming it never blocks
/// or fails. Once exhausted it keeps returning `None`, and it cannot be
/// rewound: ask the repository again for a fresh one.
pub struct SnapshotStream {
    inner: Box<dyn Iterator<Item = Snapshot> + Send>,
}

impl SnapshotStream {
    /// Wraps any sequence of snapshots, preserving its order.
    pub fn new<I>(snapshots: I) -> Self
    where
        I: IntoIterator<Item = Snapshot>,
        I::IntoIter: Send + 'static,
    {
        Self {
            inner: Box::new(snapshots.into_iter().fuse()),
        }
    }

    /// Lazily converts provider bars, one snapshot per `next` call.
    pub fn from_bars(bars: Vec<Bar>) -> Self {
        Self::new(bars.into_iter().map(Snapshot::from))
    }

    /// A stream with no snapshots.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Default for SnapshotStream {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Snapshot>> for SnapshotStream {
    fn from(snapshots: Vec<Snapshot>) -> Self {
        Self::new(snapshots)
    }
}

impl Iterator for SnapshotStream {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl FusedIterator for SnapshotStream {}

impl fmt::Debug for SnapshotStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStream")
            .field("remaining", &self.inner.size_hint())
            .finish_non_exhaustive()
    }
}

//! Single-buffered time index with exact per-row data limiting.

use crate::error::TableError;
use crate::time::{
    self, Bin, EraseBehavior, ErasedRuns, LimitOutcome, TimeCursor, TimeEntry, TimePosition,
};

/// Time index with one sorted bin.
///
/// Every entry reports [`Bin::Fresh`] so column storage keeps its stale
/// buffer permanently empty. Limiting erases the oldest rows one by one,
/// which keeps retention exact (never more than the configured points) at
/// O(n) eviction cost; the double-buffered variant makes the opposite
/// trade.
#[derive(Debug, Clone, Default)]
pub struct SingleBufferTimeIndex {
    entries: Vec<TimeEntry>,
    // Next append offset in the column containers. Tracks container length
    // except for cells orphaned by a quick erase.
    next_position: usize,
}

impl SingleBufferTimeIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed times.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no times are indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Locates exactly `time`.
    pub fn find(&self, time: f64) -> Option<TimePosition> {
        let idx = time::lower_bound(&self.entries, time);
        let entry = self.entries.get(idx)?;
        if entry.time != time {
            return None;
        }
        Some(TimePosition {
            time: entry.time,
            position: entry.position,
            bin: Bin::Fresh,
        })
    }

    /// Locates `time`, inserting it if absent. New entries take the next
    /// append offset.
    pub fn find_or_add(&mut self, time: f64) -> Result<(TimePosition, bool), TableError> {
        time::check_time(time)?;
        if let Some(found) = self.find(time) {
            return Ok((found, false));
        }
        let position = self.next_position;
        self.next_position += 1;
        let idx = time::lower_bound(&self.entries, time);
        self.entries.insert(idx, TimeEntry { time, position });
        Ok((
            TimePosition {
                time,
                position,
                bin: Bin::Fresh,
            },
            true,
        ))
    }

    /// Cursor over all indexed times, at the front.
    pub fn cursor(&self) -> TimeCursor<'_> {
        TimeCursor::new(&[], &self.entries)
    }

    /// Cursor before the first entry at or after `time`.
    pub fn lower_bound(&self, time: f64) -> TimeCursor<'_> {
        TimeCursor::at_lower_bound(&[], &self.entries, time)
    }

    /// Cursor after the last entry at or before `time`.
    pub fn upper_bound(&self, time: f64) -> TimeCursor<'_> {
        TimeCursor::at_upper_bound(&[], &self.entries, time)
    }

    /// Erases exactly `time`.
    pub fn erase(&mut self, time: f64, behavior: EraseBehavior) -> Option<TimePosition> {
        let fix = behavior == EraseBehavior::FixOffsets;
        let position = time::erase_entry(&mut self.entries, time, fix)?;
        if fix {
            self.next_position -= 1;
        }
        Some(TimePosition {
            time,
            position,
            bin: Bin::Fresh,
        })
    }

    /// Erases every entry with `begin <= t < end`.
    pub fn erase_range(&mut self, begin: f64, end: f64) -> ErasedRuns {
        let fresh = time::erase_time_span(&mut self.entries, begin, end);
        self.next_position -= fresh.iter().map(|&(_, count)| count).sum::<usize>();
        ErasedRuns {
            stale: Vec::new(),
            fresh,
        }
    }

    /// Empties the index, returning its storage for deferred deallocation.
    pub fn take_all(&mut self) -> Vec<Vec<TimeEntry>> {
        self.next_position = 0;
        vec![std::mem::take(&mut self.entries)]
    }

    /// Applies the point and age thresholds by erasing the oldest entries.
    ///
    /// Retention is exact: afterwards at most `max_points` rows remain and
    /// none is older than `latest_invalid_time` (non-positive disables the
    /// age check). `on_pre_remove` fires per evicted time, oldest first.
    pub fn limit(
        &mut self,
        max_points: usize,
        latest_invalid_time: f64,
        on_pre_remove: &mut dyn FnMut(f64),
    ) -> LimitOutcome {
        let len = self.entries.len();
        let mut evict = 0;
        while evict < len {
            let over_points = len - evict > max_points;
            let over_age =
                latest_invalid_time > 0.0 && self.entries[evict].time < latest_invalid_time;
            if !over_points && !over_age {
                break;
            }
            evict += 1;
        }
        if evict == 0 {
            return LimitOutcome::Unchanged;
        }
        for entry in &self.entries[..evict] {
            on_pre_remove(entry.time);
        }
        log::debug!("time index limit: erasing {evict} oldest of {len} entries");
        let runs = time::erase_entry_span(&mut self.entries, 0, evict);
        self.next_position -= evict;
        LimitOutcome::Erased(runs)
    }
}

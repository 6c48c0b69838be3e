//! Swap-based double-buffered time index.

use crate::error::TableError;
use crate::time::{
    self, Bin, EraseBehavior, ErasedRuns, LimitOutcome, TimeCursor, TimeEntry, TimePosition,
};

/// Time index with two bins and amortized-O(1) data limiting.
///
/// All inserts append to the fresh bin (each new entry's cell offset is the
/// bin's current length, so column containers only ever push). When a
/// limiting pass finds the fresh bin over its point or age threshold, the
/// stale bin is dropped wholesale and the bins trade roles. At steady state
/// the index holds between one and two limits' worth of data, and no insert
/// ever shifts existing cells.
#[derive(Debug, Clone, Default)]
pub struct DoubleBufferTimeIndex {
    bins: [Vec<TimeEntry>; 2],
    fresh: usize,
}

impl DoubleBufferTimeIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    fn bin_index(&self, bin: Bin) -> usize {
        match bin {
            Bin::Fresh => self.fresh,
            Bin::Stale => 1 - self.fresh,
        }
    }

    /// Entries of one bin, time-sorted.
    pub fn bin(&self, bin: Bin) -> &[TimeEntry] {
        &self.bins[self.bin_index(bin)]
    }

    fn bin_mut(&mut self, bin: Bin) -> &mut Vec<TimeEntry> {
        let idx = self.bin_index(bin);
        &mut self.bins[idx]
    }

    /// Total entries across both bins.
    pub fn len(&self) -> usize {
        self.bins[0].len() + self.bins[1].len()
    }

    /// True when both bins are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_in(&self, bin: Bin, time: f64) -> Option<TimePosition> {
        let entries = self.bin(bin);
        // A bin whose last time precedes the query cannot contain it.
        if entries.last().is_none_or(|e| e.time < time) {
            return None;
        }
        let idx = time::lower_bound(entries, time);
        let entry = entries.get(idx)?;
        if entry.time != time {
            return None;
        }
        Some(TimePosition {
            time: entry.time,
            position: entry.position,
            bin,
        })
    }

    /// Locates exactly `time` in either bin.
    pub fn find(&self, time: f64) -> Option<TimePosition> {
        self.find_in(Bin::Fresh, time)
            .or_else(|| self.find_in(Bin::Stale, time))
    }

    /// Locates `time`, inserting into the fresh bin if absent. New entries
    /// take the next append offset so column containers only ever push.
    pub fn find_or_add(&mut self, time: f64) -> Result<(TimePosition, bool), TableError> {
        time::check_time(time)?;
        if let Some(found) = self.find(time) {
            return Ok((found, false));
        }
        let entries = self.bin_mut(Bin::Fresh);
        let position = entries.len();
        let idx = time::lower_bound(entries, time);
        entries.insert(idx, TimeEntry { time, position });
        Ok((
            TimePosition {
                time,
                position,
                bin: Bin::Fresh,
            },
            true,
        ))
    }

    /// Merge cursor over both bins, at the front.
    pub fn cursor(&self) -> TimeCursor<'_> {
        TimeCursor::new(self.bin(Bin::Stale), self.bin(Bin::Fresh))
    }

    /// Cursor before the first entry at or after `time`.
    pub fn lower_bound(&self, time: f64) -> TimeCursor<'_> {
        TimeCursor::at_lower_bound(self.bin(Bin::Stale), self.bin(Bin::Fresh), time)
    }

    /// Cursor after the last entry at or before `time`.
    pub fn upper_bound(&self, time: f64) -> TimeCursor<'_> {
        TimeCursor::at_upper_bound(self.bin(Bin::Stale), self.bin(Bin::Fresh), time)
    }

    /// Erases exactly `time` from whichever bin holds it.
    pub fn erase(&mut self, time: f64, behavior: EraseBehavior) -> Option<TimePosition> {
        let fix = behavior == EraseBehavior::FixOffsets;
        for bin in [Bin::Fresh, Bin::Stale] {
            if let Some(position) = time::erase_entry(self.bin_mut(bin), time, fix) {
                return Some(TimePosition {
                    time,
                    position,
                    bin,
                });
            }
        }
        None
    }

    /// Erases every entry with `begin <= t < end` from both bins.
    pub fn erase_range(&mut self, begin: f64, end: f64) -> ErasedRuns {
        ErasedRuns {
            stale: time::erase_time_span(self.bin_mut(Bin::Stale), begin, end),
            fresh: time::erase_time_span(self.bin_mut(Bin::Fresh), begin, end),
        }
    }

    /// Empties both bins, returning their storage for deferred deallocation.
    pub fn take_all(&mut self) -> Vec<Vec<TimeEntry>> {
        self.fresh = 0;
        self.bins.iter_mut().map(std::mem::take).collect()
    }

    /// Applies the point and age thresholds, swapping bins when either is
    /// crossed.
    ///
    /// The point threshold is half of `max_points + 1` (so the two bins
    /// together retain between `max_points / 2` and `max_points` rows, and a
    /// limit of 3 behaves like a limit of 4). The age threshold swaps when
    /// the earliest fresh entry is older than `latest_invalid_time`;
    /// non-positive `latest_invalid_time` disables it. `on_pre_remove` fires
    /// for each discarded stale time, oldest first.
    pub fn limit(
        &mut self,
        max_points: usize,
        latest_invalid_time: f64,
        on_pre_remove: &mut dyn FnMut(f64),
    ) -> LimitOutcome {
        let halved = if max_points == usize::MAX {
            max_points / 2
        } else {
            (max_points + 1) / 2
        };
        let fresh = self.bin(Bin::Fresh);
        let over_points = fresh.len() >= halved;
        let over_age = latest_invalid_time > 0.0
            && fresh.first().is_some_and(|e| e.time < latest_invalid_time);
        if !over_points && !over_age {
            return LimitOutcome::Unchanged;
        }
        self.swap(on_pre_remove);
        LimitOutcome::Swapped
    }

    /// Discards the stale bin and trades bin roles. Column storage must
    /// follow with a matching buffer swap.
    fn swap(&mut self, on_pre_remove: &mut dyn FnMut(f64)) {
        for entry in self.bin(Bin::Stale) {
            on_pre_remove(entry.time);
        }
        log::debug!(
            "time index swap: discarding {} stale entries, {} fresh entries take over",
            self.bin(Bin::Stale).len(),
            self.bin(Bin::Fresh).len()
        );
        self.bin_mut(Bin::Stale).clear();
        self.fresh = 1 - self.fresh;
    }
}

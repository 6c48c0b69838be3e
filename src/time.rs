//! Shared time-index vocabulary: entries, bins, positions, and the
//! two-bin merge cursor.

use crate::cursor::Cursor;
use crate::double_buffer::DoubleBufferTimeIndex;
use crate::error::TableError;
use crate::single_buffer::SingleBufferTimeIndex;

/// One indexed time: the row's time key and the offset of its cells inside
/// the owning bin's column containers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeEntry {
    /// Row time key.
    pub time: f64,
    /// Cell offset within the bin's column containers.
    pub position: usize,
}

/// Which of the two buffers an entry lives in.
///
/// `Fresh` receives all inserts; `Stale` is dropped wholesale on the next
/// buffer swap. A single-buffered index keeps everything in `Fresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bin {
    /// The buffer scheduled to be discarded at the next swap.
    Stale,
    /// The buffer receiving new rows.
    Fresh,
}

impl Bin {
    /// The opposite bin.
    pub fn other(self) -> Bin {
        match self {
            Self::Stale => Self::Fresh,
            Self::Fresh => Self::Stale,
        }
    }
}

/// A resolved location for a row's cells: time, bin, and cell offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePosition {
    /// Row time key.
    pub time: f64,
    /// Cell offset within the bin's column containers.
    pub position: usize,
    /// Bin holding the entry.
    pub bin: Bin,
}

/// How a single-entry erase treats the cell offsets of later entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseBehavior {
    /// Remove the cell and decrement every later offset in the same bin.
    /// O(n), keeps storage compact.
    FixOffsets,
    /// Remove only the index entry. The orphaned cell stays allocated until
    /// the bin is next cleared, but no offsets move.
    Quick,
}

/// What a data-limiting pass did, so column storage can follow in lockstep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitOutcome {
    /// Nothing crossed a threshold.
    Unchanged,
    /// The bins swapped; columns must swap buffers and clear the new fresh.
    Swapped,
    /// The oldest entries were erased from the fresh bin; columns must erase
    /// the matching cell runs, highest run first.
    Erased(Vec<(usize, usize)>),
}

/// Cell runs removed from each bin by a range flush, as `(position, count)`
/// pairs ordered highest-position-first so they can be erased in order
/// without invalidating one another.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ErasedRuns {
    /// Runs removed from the stale bin.
    pub stale: Vec<(usize, usize)>,
    /// Runs removed from the fresh bin.
    pub fresh: Vec<(usize, usize)>,
}

impl ErasedRuns {
    /// True when the flush removed nothing.
    pub fn is_empty(&self) -> bool {
        self.stale.is_empty() && self.fresh.is_empty()
    }
}

/// Index of the first entry at or after `time`.
pub(crate) fn lower_bound(entries: &[TimeEntry], time: f64) -> usize {
    entries.partition_point(|e| e.time < time)
}

/// Index of the first entry after `time`.
pub(crate) fn upper_bound(entries: &[TimeEntry], time: f64) -> usize {
    entries.partition_point(|e| e.time <= time)
}

/// Removes the entry with exactly `time` from one bin, returning its cell
/// offset. With `fix_offsets`, later offsets in the bin shift down by one.
pub(crate) fn erase_entry(
    entries: &mut Vec<TimeEntry>,
    time: f64,
    fix_offsets: bool,
) -> Option<usize> {
    let idx = lower_bound(entries, time);
    if idx >= entries.len() || entries[idx].time != time {
        return None;
    }
    let position = entries[idx].position;
    entries.remove(idx);
    if fix_offsets {
        for e in &mut *entries {
            if e.position > position {
                e.position -= 1;
            }
        }
    }
    Some(position)
}

/// Removes the entries at vec indices `lo..hi` from one bin. Returns the
/// removed cell offsets grouped into maximal contiguous runs, highest run
/// first, and shifts the remaining offsets down past the holes.
pub(crate) fn erase_entry_span(
    entries: &mut Vec<TimeEntry>,
    lo: usize,
    hi: usize,
) -> Vec<(usize, usize)> {
    if lo == hi {
        return Vec::new();
    }
    let mut removed: Vec<usize> = entries[lo..hi].iter().map(|e| e.position).collect();
    entries.drain(lo..hi);
    removed.sort_unstable();
    for e in &mut *entries {
        e.position -= removed.partition_point(|&p| p < e.position);
    }
    let mut runs = Vec::new();
    let mut i = removed.len();
    while i > 0 {
        let mut start = i - 1;
        while start > 0 && removed[start - 1] + 1 == removed[start] {
            start -= 1;
        }
        runs.push((removed[start], i - start));
        i = start;
    }
    runs
}

/// Removes every entry with `begin <= time < end` from one bin. See
/// [`erase_entry_span`] for the returned runs.
pub(crate) fn erase_time_span(
    entries: &mut Vec<TimeEntry>,
    begin: f64,
    end: f64,
) -> Vec<(usize, usize)> {
    let lo = lower_bound(entries, begin);
    let hi = lower_bound(entries, end);
    erase_entry_span(entries, lo, hi)
}

/// Rejects NaN row times before they can poison the f64 ordering.
pub(crate) fn check_time(time: f64) -> Result<(), TableError> {
    if time.is_nan() {
        return Err(TableError::InvalidTime(time));
    }
    Ok(())
}

/// Merge cursor over the stale and fresh bins of a time index.
///
/// Both bins are individually time-sorted but may interleave (out-of-order
/// inserts land in fresh even when older than stale entries), so each step
/// compares the next candidate from each side.
#[derive(Debug, Clone)]
pub struct TimeCursor<'a> {
    stale: &'a [TimeEntry],
    fresh: &'a [TimeEntry],
    stale_next: usize,
    fresh_next: usize,
}

impl<'a> TimeCursor<'a> {
    pub(crate) fn new(stale: &'a [TimeEntry], fresh: &'a [TimeEntry]) -> Self {
        Self {
            stale,
            fresh,
            stale_next: 0,
            fresh_next: 0,
        }
    }

    /// Cursor positioned before the first entry at or after `time`.
    pub(crate) fn at_lower_bound(stale: &'a [TimeEntry], fresh: &'a [TimeEntry], time: f64) -> Self {
        Self {
            stale_next: lower_bound(stale, time),
            fresh_next: lower_bound(fresh, time),
            stale,
            fresh,
        }
    }

    /// Cursor positioned after the last entry at or before `time`.
    pub(crate) fn at_upper_bound(stale: &'a [TimeEntry], fresh: &'a [TimeEntry], time: f64) -> Self {
        Self {
            stale_next: upper_bound(stale, time),
            fresh_next: upper_bound(fresh, time),
            stale,
            fresh,
        }
    }

    fn next_candidate(&self) -> Option<(Bin, TimeEntry)> {
        match (
            self.stale.get(self.stale_next),
            self.fresh.get(self.fresh_next),
        ) {
            (Some(s), Some(f)) => {
                if s.time <= f.time {
                    Some((Bin::Stale, *s))
                } else {
                    Some((Bin::Fresh, *f))
                }
            }
            (Some(s), None) => Some((Bin::Stale, *s)),
            (None, Some(f)) => Some((Bin::Fresh, *f)),
            (None, None) => None,
        }
    }

    fn previous_candidate(&self) -> Option<(Bin, TimeEntry)> {
        let s = self.stale_next.checked_sub(1).map(|i| self.stale[i]);
        let f = self.fresh_next.checked_sub(1).map(|i| self.fresh[i]);
        match (s, f) {
            (Some(s), Some(f)) => {
                if f.time >= s.time {
                    Some((Bin::Fresh, f))
                } else {
                    Some((Bin::Stale, s))
                }
            }
            (Some(s), None) => Some((Bin::Stale, s)),
            (None, Some(f)) => Some((Bin::Fresh, f)),
            (None, None) => None,
        }
    }
}

fn position_of(bin: Bin, entry: TimeEntry) -> TimePosition {
    TimePosition {
        time: entry.time,
        position: entry.position,
        bin,
    }
}

impl Cursor for TimeCursor<'_> {
    type Item = TimePosition;

    fn next(&mut self) -> Option<TimePosition> {
        let (bin, entry) = self.next_candidate()?;
        match bin {
            Bin::Stale => self.stale_next += 1,
            Bin::Fresh => self.fresh_next += 1,
        }
        Some(position_of(bin, entry))
    }

    fn peek_next(&self) -> Option<TimePosition> {
        self.next_candidate().map(|(b, e)| position_of(b, e))
    }

    fn previous(&mut self) -> Option<TimePosition> {
        let (bin, entry) = self.previous_candidate()?;
        match bin {
            Bin::Stale => self.stale_next -= 1,
            Bin::Fresh => self.fresh_next -= 1,
        }
        Some(position_of(bin, entry))
    }

    fn peek_previous(&self) -> Option<TimePosition> {
        self.previous_candidate().map(|(b, e)| position_of(b, e))
    }

    fn to_front(&mut self) {
        self.stale_next = 0;
        self.fresh_next = 0;
    }

    fn to_back(&mut self) {
        self.stale_next = self.stale.len();
        self.fresh_next = self.fresh.len();
    }
}

/// A time index of either buffering strategy.
///
/// Double-buffered is the default for tables with data limiting; the
/// single-buffered variant trades amortized-O(1) eviction for exact
/// point-count retention.
#[derive(Debug, Clone)]
pub enum TimeIndex {
    /// Swap-based two-bin index.
    DoubleBuffer(DoubleBufferTimeIndex),
    /// One sorted bin, front-erase eviction.
    SingleBuffer(SingleBufferTimeIndex),
}

macro_rules! delegate {
    ($self:expr, $index:ident => $body:expr) => {
        match $self {
            TimeIndex::DoubleBuffer($index) => $body,
            TimeIndex::SingleBuffer($index) => $body,
        }
    };
}

impl TimeIndex {
    /// Creates an empty double-buffered index.
    pub fn double_buffer() -> Self {
        Self::DoubleBuffer(DoubleBufferTimeIndex::new())
    }

    /// Creates an empty single-buffered index.
    pub fn single_buffer() -> Self {
        Self::SingleBuffer(SingleBufferTimeIndex::new())
    }

    /// Creates an empty index of the same buffering strategy as this one.
    pub fn empty_like(&self) -> Self {
        match self {
            Self::DoubleBuffer(_) => Self::double_buffer(),
            Self::SingleBuffer(_) => Self::single_buffer(),
        }
    }

    /// Total number of indexed times across both bins.
    pub fn len(&self) -> usize {
        delegate!(self, i => i.len())
    }

    /// True when no times are indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Earliest indexed time.
    pub fn begin_time(&self) -> Option<f64> {
        self.cursor().peek_next().map(|p| p.time)
    }

    /// Latest indexed time.
    pub fn end_time(&self) -> Option<f64> {
        let mut cursor = self.cursor();
        cursor.to_back();
        cursor.peek_previous().map(|p| p.time)
    }

    /// Earliest and latest indexed times.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((self.begin_time()?, self.end_time()?))
    }

    /// True when exactly `time` is indexed.
    pub fn contains(&self, time: f64) -> bool {
        self.find(time).is_some()
    }

    /// Locates exactly `time`.
    pub fn find(&self, time: f64) -> Option<TimePosition> {
        delegate!(self, i => i.find(time))
    }

    /// Locates the latest indexed time at or before `time`.
    pub fn find_at_or_before(&self, time: f64) -> Option<TimePosition> {
        let mut cursor = delegate!(self, i => i.upper_bound(time));
        cursor.peek_previous()
    }

    /// Locates `time`, inserting it if absent. The boolean is true when a
    /// new entry was created. Fails on NaN.
    pub fn find_or_add(&mut self, time: f64) -> Result<(TimePosition, bool), TableError> {
        delegate!(self, i => i.find_or_add(time))
    }

    /// Merge cursor over all indexed times, positioned at the front.
    pub fn cursor(&self) -> TimeCursor<'_> {
        delegate!(self, i => i.cursor())
    }

    /// Cursor positioned before the first time at or after `time`.
    pub fn lower_bound(&self, time: f64) -> TimeCursor<'_> {
        delegate!(self, i => i.lower_bound(time))
    }

    /// Cursor positioned after the last time at or before `time`.
    pub fn upper_bound(&self, time: f64) -> TimeCursor<'_> {
        delegate!(self, i => i.upper_bound(time))
    }

    /// Erases exactly `time`, returning where its cells lived so column
    /// storage can follow.
    pub fn erase(&mut self, time: f64, behavior: EraseBehavior) -> Option<TimePosition> {
        delegate!(self, i => i.erase(time, behavior))
    }

    /// Erases every time in `begin <= t < end`, returning the removed cell
    /// runs per bin.
    pub fn erase_range(&mut self, begin: f64, end: f64) -> ErasedRuns {
        delegate!(self, i => i.erase_range(begin, end))
    }

    /// Drops all entries, returning the bin storage for deferred
    /// deallocation.
    pub fn take_all(&mut self) -> Vec<Vec<TimeEntry>> {
        delegate!(self, i => i.take_all())
    }

    /// Applies point and age limits. `latest_invalid_time` of zero or below
    /// disables the age check; `max_points` of `usize::MAX` disables the
    /// point check. `on_pre_remove` fires once per evicted time, oldest
    /// first, before removal.
    pub fn limit(
        &mut self,
        max_points: usize,
        latest_invalid_time: f64,
        on_pre_remove: &mut dyn FnMut(f64),
    ) -> LimitOutcome {
        delegate!(self, i => i.limit(max_points, latest_invalid_time, on_pre_remove))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(times: &[(f64, usize)]) -> Vec<TimeEntry> {
        times
            .iter()
            .map(|&(time, position)| TimeEntry { time, position })
            .collect()
    }

    #[test]
    fn test_cursor_merges_interleaved_bins() {
        let stale = entries(&[(2.0, 0), (4.0, 1)]);
        let fresh = entries(&[(1.0, 0), (3.0, 1), (5.0, 2)]);
        let mut cursor = TimeCursor::new(&stale, &fresh);
        let mut seen = Vec::new();
        while let Some(p) = cursor.next() {
            seen.push((p.time, p.bin));
        }
        assert_eq!(
            seen,
            vec![
                (1.0, Bin::Fresh),
                (2.0, Bin::Stale),
                (3.0, Bin::Fresh),
                (4.0, Bin::Stale),
                (5.0, Bin::Fresh),
            ]
        );
    }

    #[test]
    fn test_cursor_reverse_matches_forward() {
        let stale = entries(&[(1.0, 0), (3.0, 1)]);
        let fresh = entries(&[(2.0, 0), (4.0, 1)]);
        let mut cursor = TimeCursor::new(&stale, &fresh);
        cursor.to_back();
        let mut reversed = Vec::new();
        while let Some(p) = cursor.previous() {
            reversed.push(p.time);
        }
        assert_eq!(reversed, vec![4.0, 3.0, 2.0, 1.0]);
        assert!(!cursor.has_previous());
        assert!(cursor.has_next());
    }

    #[test]
    fn test_cursor_bounds() {
        let stale = entries(&[(1.0, 0), (3.0, 1)]);
        let fresh = entries(&[(2.0, 0), (4.0, 1)]);
        let cursor = TimeCursor::at_lower_bound(&stale, &fresh, 3.0);
        assert_eq!(cursor.peek_next().map(|p| p.time), Some(3.0));
        let cursor = TimeCursor::at_upper_bound(&stale, &fresh, 3.0);
        assert_eq!(cursor.peek_next().map(|p| p.time), Some(4.0));
        assert_eq!(cursor.peek_previous().map(|p| p.time), Some(3.0));
    }

    #[test]
    fn test_erase_entry_fixes_offsets() {
        let mut bin = entries(&[(1.0, 0), (2.0, 1), (3.0, 2)]);
        assert_eq!(erase_entry(&mut bin, 2.0, true), Some(1));
        assert_eq!(bin, entries(&[(1.0, 0), (3.0, 1)]));
    }

    #[test]
    fn test_erase_entry_quick_leaves_offsets() {
        let mut bin = entries(&[(1.0, 0), (2.0, 1), (3.0, 2)]);
        assert_eq!(erase_entry(&mut bin, 1.0, false), Some(0));
        assert_eq!(bin, entries(&[(2.0, 1), (3.0, 2)]));
    }

    #[test]
    fn test_erase_entry_missing_time() {
        let mut bin = entries(&[(1.0, 0)]);
        assert_eq!(erase_entry(&mut bin, 1.5, true), None);
        assert_eq!(bin.len(), 1);
    }

    #[test]
    fn test_erase_time_span_groups_runs() {
        // Append-ordered positions: times 1..=5 inserted as 1,4,2,5,3.
        let mut bin = entries(&[(1.0, 0), (2.0, 2), (3.0, 4), (4.0, 1), (5.0, 3)]);
        let runs = erase_time_span(&mut bin, 2.0, 5.0);
        // Positions {2, 4, 1} group as runs [1..=2] and [4], highest first.
        assert_eq!(runs, vec![(4, 1), (1, 2)]);
        assert_eq!(bin, entries(&[(1.0, 0), (5.0, 1)]));
    }

    #[test]
    fn test_erase_time_span_empty_range() {
        let mut bin = entries(&[(1.0, 0)]);
        assert!(erase_time_span(&mut bin, 5.0, 9.0).is_empty());
    }
}

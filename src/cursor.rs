//! Bidirectional cursor trait shared by time and column iteration.

/// A bidirectional cursor over time-ordered items.
///
/// A cursor sits *between* items: `next` returns the item after the cursor
/// and advances past it, `previous` returns the item before the cursor and
/// retreats before it. The `peek` variants read without moving. Cursors
/// borrow the structure they walk, so they cannot outlive a mutation.
pub trait Cursor {
    /// The item yielded by this cursor.
    type Item;

    /// Returns the item after the cursor and advances past it.
    fn next(&mut self) -> Option<Self::Item>;

    /// Returns the item after the cursor without moving.
    fn peek_next(&self) -> Option<Self::Item>;

    /// Returns the item before the cursor and retreats before it.
    fn previous(&mut self) -> Option<Self::Item>;

    /// Returns the item before the cursor without moving.
    fn peek_previous(&self) -> Option<Self::Item>;

    /// Positions the cursor before the first item.
    fn to_front(&mut self);

    /// Positions the cursor after the last item.
    fn to_back(&mut self);

    /// True when an item follows the cursor.
    fn has_next(&self) -> bool {
        self.peek_next().is_some()
    }

    /// True when an item precedes the cursor.
    fn has_previous(&self) -> bool {
        self.peek_previous().is_some()
    }
}

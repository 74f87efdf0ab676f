//! Various constants used for laying out the items of a paragraph.

/// Badness of a line that cannot be stretched or shrunk enough.
pub const INF_BAD: i64 = 10_000;

/// Penalties this high prevent breaking.
pub const INF_PENALTY: i64 = 10_000;

/// Penalties this low force a break.
pub const EJECT_PENALTY: i64 = -INF_PENALTY;

/// More demerits than any feasible paragraph can accumulate.
pub const AWFUL_BAD: i64 = 0o7777777777;

/// Demerits of a line whose badness and line penalty overflow.
pub const MAX_LINE_DEMERITS: i64 = 100_000_000;

/// Shortfall above which a finite stretch always gives infinite badness.
pub const BIG_SHORTFALL: i64 = 7_230_584;

/// Stretch below which a big shortfall gives infinite badness.
pub const SMALL_STRETCH: i64 = 1_663_497;

/// Line number of the end of the active list, larger than any real line.
pub const MAX_LINE: usize = usize::MAX;

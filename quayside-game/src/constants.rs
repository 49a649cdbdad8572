//! Shared engine defaults.

/// Row index a passenger must reach to leave the grid.
pub const EXIT_ROW: i32 = 0;

/// Bench slot count used when level data omits the field.
pub const DEFAULT_BENCH_SLOTS: usize = 5;

/// Ferry passenger capacity used when level data omits the field.
pub const DEFAULT_FERRY_CAPACITY: u32 = 3;

/// Level time limit in seconds used when level data omits the field.
pub const DEFAULT_TIME_LIMIT: f32 = 60.0;

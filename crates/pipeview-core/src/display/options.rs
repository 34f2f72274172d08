//! Per-session settings for the status line.

use super::rate::HistorySettings;

/// Columns assumed when the terminal size cannot be queried.
pub const DEFAULT_WIDTH: usize = 80;
/// Rows assumed when the terminal size cannot be queried.
pub const DEFAULT_HEIGHT: usize = 25;

/// How one monitored stream is measured and rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayOptions {
    /// Expected total in bytes (or lines); 0 when unknown.
    pub size: u64,
    /// Label shown by `%N`.
    pub name: Option<String>,
    /// Machine-readable output: one `elapsed value` line per tick.
    pub numeric: bool,
    /// Show bits instead of bytes.
    pub bits: bool,
    /// Counts are lines, not bytes.
    pub line_mode: bool,
    /// Amount already present before this session started (e.g. a resumed
    /// transfer). Excluded from the ETA and the final average.
    pub initial_offset: i64,
    pub width: usize,
    pub height: usize,
    /// Seconds of history behind the average rate.
    pub average_rate_window: u32,
}

impl DisplayOptions {
    pub fn history_settings(&self) -> HistorySettings {
        HistorySettings::for_window(self.average_rate_window)
    }

    /// Total size as a signed count, or None when unknown.
    pub fn known_size(&self) -> Option<i64> {
        (self.size > 0).then(|| i64::try_from(self.size).unwrap_or(i64::MAX))
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            size: 0,
            name: None,
            numeric: false,
            bits: false,
            line_mode: false,
            initial_offset: 0,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            average_rate_window: 30,
        }
    }
}

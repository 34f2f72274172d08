//! Transfer-status rendering.
//!
//! Turns raw measurements (elapsed seconds, bytes since the last tick, bytes
//! so far) into one fixed-width status line per tick. The pieces are usable
//! on their own: magnitude formatting, rate averaging, ETA prediction and
//! template compilation. [`StatusLine`] ties them together and keeps the
//! per-transfer state between ticks.

mod bar;
mod error;
mod eta;
mod format;
mod options;
mod rate;
mod redraw;
mod render;
mod units;

pub use bar::{determinate as determinate_bar, indeterminate as indeterminate_bar};
pub use error::{DisplayError, EXIT_DISPLAY_ALLOC};
pub use eta::{
    blank, eta_absolute, eta_for_progress, eta_relative, format_duration, format_elapsed,
    format_eta_absolute, format_eta_relative, ETA_LABEL, MAX_DISPLAY_SECS,
};
pub use format::{Components, Field, Format, FormatFlags, Segment, MAX_PREVIEW_LEN};
pub use options::{DisplayOptions, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use rate::{whole_session_rate, HistorySettings, RateAverager, RateHistory, Sample};
pub use redraw::RedrawState;
pub use render::{StatusLine, DEFAULT_TEMPLATE};
pub use units::{scale, size_string};

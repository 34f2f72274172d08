//! Time-remaining predictions and duration rendering.

use chrono::{DateTime, Duration, Local};

/// Upper bound for any displayed duration (100,000 hours).
pub const MAX_DISPLAY_SECS: i64 = 360_000_000;

const SECS_PER_DAY: i64 = 86_400;

/// Beyond this many seconds the absolute ETA includes the date.
const DATE_THRESHOLD_SECS: i64 = 6 * 3600;

/// Label placed in front of both ETA fields.
pub const ETA_LABEL: &str = "ETA";

/// Seconds needed to move `remaining` units at `rate` units per second.
///
/// A non-positive rate or nothing remaining gives 0. The result is clamped to
/// `[0, MAX_DISPLAY_SECS]`.
pub fn eta_relative(remaining: i64, rate: f64) -> i64 {
    if remaining <= 0 || !(rate > 0.0) {
        return 0;
    }
    let secs = remaining as f64 / rate;
    if !secs.is_finite() {
        return MAX_DISPLAY_SECS;
    }
    (secs as i64).clamp(0, MAX_DISPLAY_SECS)
}

/// ETA for a transfer that has moved `so_far` of `total` units.
/// Nothing moved yet means no prediction (0).
pub fn eta_for_progress(so_far: i64, total: i64, rate: f64) -> i64 {
    if so_far < 1 {
        return 0;
    }
    eta_relative(total.saturating_sub(so_far), rate)
}

/// Wall-clock time `secs` seconds after `now`; None if it cannot be represented.
pub fn eta_absolute(now: DateTime<Local>, secs: i64) -> Option<DateTime<Local>> {
    let secs = secs.clamp(0, MAX_DISPLAY_SECS);
    now.checked_add_signed(Duration::seconds(secs))
}

/// `H:MM:SS`, or `D:HH:MM:SS` from one day up. Input is clamped to
/// `[0, MAX_DISPLAY_SECS]`.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.clamp(0, MAX_DISPLAY_SECS);
    if secs >= SECS_PER_DAY {
        format!(
            "{}:{:02}:{:02}:{:02}",
            secs / SECS_PER_DAY,
            (secs / 3600) % 24,
            (secs / 60) % 60,
            secs % 60
        )
    } else {
        format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    }
}

/// Elapsed-time rendering; fractional seconds are dropped.
pub fn format_elapsed(elapsed_secs: f64) -> String {
    let secs = if elapsed_secs.is_finite() {
        elapsed_secs.clamp(0.0, MAX_DISPLAY_SECS as f64) as i64
    } else {
        0
    };
    format_duration(secs)
}

/// Countdown field: `ETA 0:01:05`.
pub fn format_eta_relative(secs: i64) -> String {
    format!("{ETA_LABEL} {}", format_duration(secs))
}

/// Clock-time field: `ETA 14:05:09`, with the date when more than six hours out.
pub fn format_eta_absolute(now: DateTime<Local>, secs: i64) -> Option<String> {
    let then = eta_absolute(now, secs)?;
    let pattern = if secs > DATE_THRESHOLD_SECS {
        "%Y-%m-%d %H:%M:%S"
    } else {
        "%H:%M:%S"
    };
    Some(format!("{ETA_LABEL} {}", then.format(pattern)))
}

/// Same-width run of spaces, used to hide a field without shifting the line.
pub fn blank(field: &str) -> String {
    " ".repeat(field.chars().count())
}

//! Helpers shared by the integration tests.

use pipeview_core::display::StatusLine;

/// Feed `chunk` units per second for `ticks` seconds and collect each line.
pub fn steady_ticks(line: &mut StatusLine, chunk: i64, ticks: i64) -> Vec<String> {
    (1..=ticks)
        .map(|t| {
            line.render(t as f64, chunk, chunk * t)
                .unwrap()
                .unwrap()
                .to_string()
        })
        .collect()
}

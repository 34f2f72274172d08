//! The per-tick line composer.
//!
//! `StatusLine` owns everything one monitored stream needs between ticks:
//! the compiled template, rate history, redraw bookkeeping, the bouncing-bar
//! counter and the tail of recent output. The transfer loop calls
//! [`StatusLine::render`] once per tick and writes the result itself.

use std::fmt::Write as _;

use chrono::{DateTime, Local};

use super::bar::{self, MAX_PERCENT};
use super::error::DisplayError;
use super::eta;
use super::format::{Field, Format, Segment};
use super::options::DisplayOptions;
use super::rate::{whole_session_rate, RateAverager};
use super::redraw::RedrawState;
use super::units::size_string;

/// Number of distinct fields (length of `Field`).
const FIELD_COUNT: usize = 10;

/// Template used when the caller never compiles one.
pub const DEFAULT_TEMPLATE: &str = "%b %t %r %p %e";

/// Rendered text of every field used this tick.
#[derive(Debug, Default)]
struct FieldValues([String; FIELD_COUNT]);

impl FieldValues {
    fn get(&self, field: Field) -> &str {
        &self.0[field as usize]
    }

    fn set(&mut self, field: Field, value: String) {
        self.0[field as usize] = value;
    }
}

/// Measurements and derived rates for the tick being rendered.
#[derive(Debug, Clone, Copy)]
struct Tick {
    elapsed: f64,
    total_bytes: i64,
    rate: f64,
    average_rate: f64,
    /// Sliding-window average, which drives the ETA even on the final update.
    windowed_rate: f64,
    final_update: bool,
}

/// Bytes sitting in the transfer buffer, for `%T`.
#[derive(Debug, Clone, Copy, Default)]
struct BufferFill {
    filled: u64,
    capacity: u64,
}

/// Stateful status-line renderer for one transfer.
pub struct StatusLine {
    options: DisplayOptions,
    format: Format,
    rate: RateAverager,
    redraw: RedrawState,
    /// Completion percentage, or the 0..200 bouncing counter when the size is
    /// unknown.
    percentage: i64,
    preview: Vec<u8>,
    buffer_fill: BufferFill,
    clock: fn() -> DateTime<Local>,
}

impl StatusLine {
    pub fn new(options: DisplayOptions) -> Self {
        let rate = RateAverager::new(options.history_settings());
        let mut line = Self {
            options,
            format: Format::compile(""),
            rate,
            redraw: RedrawState::new(),
            percentage: 0,
            preview: Vec::new(),
            buffer_fill: BufferFill::default(),
            clock: Local::now,
        };
        line.compile_template(DEFAULT_TEMPLATE);
        line
    }

    /// Use `clock` instead of the system clock for the `%I` field.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the template. Only needed when the template text changes; a
    /// terminal resize just affects the next render.
    pub fn compile_template(&mut self, template: &str) {
        self.format = Format::compile(template);
        let wanted = self.format.preview_len();
        if wanted != self.preview.len() {
            let mut preview = vec![0u8; wanted];
            let keep = wanted.min(self.preview.len());
            let old = &self.preview[self.preview.len() - keep..];
            preview[wanted - keep..].copy_from_slice(old);
            self.preview = preview;
        }
    }

    pub fn set_terminal_size(&mut self, width: usize, height: usize) {
        self.options.width = width;
        self.options.height = height;
    }

    /// Set the expected total (0 = unknown).
    pub fn set_size(&mut self, size: u64) {
        self.options.size = size;
    }

    /// Report how full the transfer buffer is, for `%T`.
    pub fn set_buffer_fill(&mut self, filled: u64, capacity: u64) {
        self.buffer_fill = BufferFill { filled, capacity };
    }

    /// Remember the most recent bytes written downstream, for `%A`.
    pub fn record_output(&mut self, data: &[u8]) {
        let n = self.preview.len();
        if n == 0 || data.is_empty() {
            return;
        }
        if data.len() >= n {
            self.preview.copy_from_slice(&data[data.len() - n..]);
        } else {
            self.preview.rotate_left(data.len());
            self.preview[n - data.len()..].copy_from_slice(data);
        }
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn percentage(&self) -> i64 {
        self.percentage
    }

    /// Produce the status line for one tick.
    ///
    /// `elapsed` is seconds since the transfer started, `bytes_since_last` the
    /// amount moved since the previous call and `total_bytes` the amount moved
    /// so far (lines in line mode). A negative `bytes_since_last` marks the
    /// final update: rates become whole-session averages and ETA fields are
    /// blanked. A negative `total_bytes` releases the output buffer and
    /// returns `Ok(None)`.
    ///
    /// An allocation failure skips this tick only; the next call retries.
    pub fn render(
        &mut self,
        elapsed: f64,
        bytes_since_last: i64,
        total_bytes: i64,
    ) -> Result<Option<&str>, DisplayError> {
        if total_bytes < 0 {
            self.redraw.release();
            return Ok(None);
        }
        let elapsed = if elapsed.is_finite() {
            elapsed.max(0.0)
        } else {
            0.0
        };
        let final_update = bytes_since_last < 0;

        let mut rate = self.rate.instantaneous_rate(bytes_since_last, elapsed);
        self.rate.record(elapsed, total_bytes);
        let windowed_rate = self.rate.average_rate();
        let mut average_rate = windowed_rate;
        if final_update {
            average_rate =
                whole_session_rate(total_bytes, self.options.initial_offset, elapsed);
            rate = average_rate;
        }

        self.update_percentage(rate, total_bytes);

        let name_len = self.options.name.as_ref().map_or(0, |n| n.len());
        self.redraw.ensure_capacity(self.options.width, name_len)?;

        if self.options.numeric {
            let line = self.numeric_line(elapsed, total_bytes);
            self.redraw.set_text(&line);
            return Ok(Some(self.redraw.as_str()));
        }

        let values = self.field_values(&Tick {
            elapsed,
            total_bytes,
            rate,
            average_rate,
            windowed_rate,
            final_update,
        });
        let width = self.options.width;

        let static_portion_size: usize = self
            .format
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Literal(_) => self.format.literal(segment).chars().count(),
                Segment::Fixed(field) => values.get(*field).chars().count(),
                Segment::Variable(_) => 0,
            })
            .sum();

        let progress = if self.format.uses(Field::Progress) {
            self.progress_bar(width, static_portion_size)
        } else {
            String::new()
        };

        self.redraw.begin();
        for segment in self.format.segments() {
            let text = match segment {
                Segment::Literal(_) => self.format.literal(segment),
                Segment::Fixed(field) => values.get(*field),
                Segment::Variable(_) => progress.as_str(),
            };
            if !self.redraw.push_segment(text, width) {
                break;
            }
        }
        self.redraw.finish(width);

        Ok(Some(self.redraw.as_str()))
    }

    fn update_percentage(&mut self, rate: f64, total_bytes: i64) {
        match self.options.known_size() {
            None => {
                if rate > 0.0 {
                    self.percentage += 2;
                }
                if self.percentage > 199 {
                    self.percentage = 0;
                }
            }
            Some(size) => {
                let pct = i128::from(total_bytes) * 100 / i128::from(size);
                self.percentage = pct.clamp(0, i128::from(MAX_PERCENT)) as i64;
            }
        }
    }

    fn numeric_line(&self, elapsed: f64, total_bytes: i64) -> String {
        let mut line = String::new();
        if self.format.uses(Field::Timer) {
            let _ = write!(line, "{elapsed:.4} ");
        }
        if self.format.uses(Field::Bytes) {
            let amount = if self.options.bits {
                total_bytes.saturating_mul(8)
            } else {
                total_bytes
            };
            let _ = writeln!(line, "{amount}");
        } else {
            let _ = writeln!(line, "{}", self.percentage);
        }
        line
    }

    fn field_values(&self, tick: &Tick) -> FieldValues {
        let Tick {
            elapsed,
            total_bytes,
            rate,
            average_rate,
            windowed_rate,
            final_update,
        } = *tick;
        let mut values = FieldValues::default();
        let opts = &self.options;
        let bits = opts.bits && !opts.line_mode;
        let is_bytes = !opts.line_mode;

        if self.format.uses(Field::Bytes) {
            let text = if bits {
                size_string(total_bytes as f64 * 8.0, "b", true)
            } else {
                size_string(total_bytes as f64, if opts.line_mode { "" } else { "B" }, is_bytes)
            };
            values.set(Field::Bytes, text);
        }

        if self.format.uses(Field::BufferPercent) && self.buffer_fill.capacity > 0 {
            let BufferFill { filled, capacity } = self.buffer_fill;
            let pct = u128::from(filled) * 100 / u128::from(capacity);
            values.set(Field::BufferPercent, format!("{{{pct:3}%}}"));
        }

        if self.format.uses(Field::Timer) {
            values.set(Field::Timer, eta::format_elapsed(elapsed));
        }

        for (field, amount) in [(Field::Rate, rate), (Field::AverageRate, average_rate)] {
            if !self.format.uses(field) {
                continue;
            }
            let text = if bits {
                size_string(amount * 8.0, "b/s", true)
            } else {
                size_string(amount, if opts.line_mode { "/s" } else { "B/s" }, is_bytes)
            };
            values.set(field, format!("[{text}]"));
        }

        if self.format.uses(Field::LastOutput) {
            let preview: String = self
                .preview
                .iter()
                .map(|&b| {
                    if b.is_ascii_graphic() || b == b' ' {
                        b as char
                    } else {
                        '.'
                    }
                })
                .collect();
            values.set(Field::LastOutput, preview);
        }

        if let Some(size) = opts.known_size() {
            let remaining_secs = eta::eta_for_progress(
                total_bytes.saturating_sub(opts.initial_offset),
                size.saturating_sub(opts.initial_offset),
                windowed_rate,
            );

            if self.format.uses(Field::Eta) {
                let text = eta::format_eta_relative(remaining_secs);
                values.set(
                    Field::Eta,
                    if final_update { eta::blank(&text) } else { text },
                );
            }

            if self.format.uses(Field::FinishTime) {
                let text =
                    eta::format_eta_absolute((self.clock)(), remaining_secs).unwrap_or_default();
                values.set(
                    Field::FinishTime,
                    if final_update { eta::blank(&text) } else { text },
                );
            }
        }

        if self.format.uses(Field::Name) {
            if let Some(name) = &opts.name {
                values.set(Field::Name, format!("{name:>9.500}:"));
            }
        }

        values
    }

    /// Bar for the room left after the fixed fields; empty if it won't fit.
    fn progress_bar(&self, width: usize, static_portion_size: usize) -> String {
        let room = width.saturating_sub(static_portion_size);
        let bar = match self.options.known_size() {
            Some(_) => bar::determinate(room, self.percentage),
            None => bar::indeterminate(room, self.percentage),
        };
        if bar.chars().count() + static_portion_size > width {
            tracing::trace!(width, static_portion_size, "progress bar dropped");
            return String::new();
        }
        bar
    }
}

#[cfg(test)]
mod tests;

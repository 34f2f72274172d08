//! Transfer rate tracking: a jitter-guarded instantaneous rate plus a
//! sliding-window average over a fixed ring of samples.

/// Ticks closer together than this (seconds) are folded into the next one.
const MIN_TIME_SLICE: f64 = 0.01;

/// One point of the rate history.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub elapsed_secs: f64,
    pub cumulative_count: i64,
}

/// Sampling parameters derived from the average-rate window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySettings {
    /// Number of samples kept in the ring.
    pub capacity: usize,
    /// Minimum seconds between two recorded samples.
    pub interval_secs: f64,
}

impl HistorySettings {
    /// Settings covering roughly `window_secs` seconds of history.
    ///
    /// Windows of 20 seconds or more keep 11 samples spaced `window / 10`
    /// apart; shorter windows sample once a second.
    pub fn for_window(window_secs: u32) -> Self {
        let window = window_secs.max(1);
        if window >= 20 {
            Self {
                capacity: 11,
                interval_secs: f64::from(window / 10),
            }
        } else {
            Self {
                capacity: window as usize + 1,
                interval_secs: 1.0,
            }
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self::for_window(30)
    }
}

/// Fixed-capacity ring of samples. `first == last` with one recorded sample
/// means the window average is undefined.
#[derive(Debug, Clone)]
pub struct RateHistory {
    samples: Vec<Sample>,
    first: usize,
    last: usize,
    recorded: usize,
    interval_secs: f64,
}

impl RateHistory {
    pub fn new(settings: HistorySettings) -> Self {
        Self {
            samples: vec![Sample::default(); settings.capacity.max(2)],
            first: 0,
            last: 0,
            recorded: 0,
            interval_secs: settings.interval_secs,
        }
    }

    /// Append a sample if at least one interval has passed since the last one.
    /// Returns false when the sample was skipped.
    pub fn push(&mut self, sample: Sample) -> bool {
        if self.recorded > 0 {
            let last = self.samples[self.last];
            if sample.elapsed_secs < last.elapsed_secs + self.interval_secs {
                return false;
            }
            let len = self.samples.len();
            self.last = (self.last + 1) % len;
            if self.last == self.first {
                self.first = (self.first + 1) % len;
            }
        }
        self.samples[self.last] = sample;
        self.recorded += 1;
        true
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.recorded.min(self.samples.len())
    }

    pub fn is_empty(&self) -> bool {
        self.recorded == 0
    }

    pub fn oldest(&self) -> Option<Sample> {
        (!self.is_empty()).then(|| self.samples[self.first])
    }

    pub fn newest(&self) -> Option<Sample> {
        (!self.is_empty()).then(|| self.samples[self.last])
    }

    /// Average rate across the window, or None with fewer than two samples.
    pub fn window_rate(&self) -> Option<f64> {
        if self.first == self.last {
            return None;
        }
        let (first, last) = (self.samples[self.first], self.samples[self.last]);
        let secs = last.elapsed_secs - first.elapsed_secs;
        if secs <= 0.0 {
            return None;
        }
        let counted = last.cumulative_count.saturating_sub(first.cumulative_count);
        Some(counted as f64 / secs)
    }
}

/// Instantaneous and windowed rate for one monitored stream.
#[derive(Debug, Clone)]
pub struct RateAverager {
    history: RateHistory,
    prev_elapsed: f64,
    prev_rate: f64,
    pending: i64,
    average: f64,
}

impl RateAverager {
    pub fn new(settings: HistorySettings) -> Self {
        Self {
            history: RateHistory::new(settings),
            prev_elapsed: 0.0,
            prev_rate: 0.0,
            pending: 0,
            average: 0.0,
        }
    }

    /// Rate since the previous computed tick.
    ///
    /// When less than 10ms has passed the count is carried over and the last
    /// rate is returned unchanged.
    pub fn instantaneous_rate(&mut self, bytes_since_last: i64, elapsed: f64) -> f64 {
        let since_last = elapsed - self.prev_elapsed;
        if since_last <= MIN_TIME_SLICE {
            self.pending = self.pending.saturating_add(bytes_since_last.max(0));
        } else {
            let moved = bytes_since_last.max(0).saturating_add(self.pending);
            self.prev_rate = moved as f64 / since_last;
            self.prev_elapsed = elapsed;
            self.pending = 0;
        }
        self.prev_rate
    }

    /// Record the cumulative count at `elapsed` and refresh the average.
    ///
    /// With a single sample the average falls back to the last instantaneous
    /// rate.
    pub fn record(&mut self, elapsed: f64, cumulative: i64) {
        let recorded = self.history.push(Sample {
            elapsed_secs: elapsed,
            cumulative_count: cumulative,
        });
        if recorded {
            self.average = self.history.window_rate().unwrap_or(self.prev_rate);
        }
    }

    pub fn average_rate(&self) -> f64 {
        self.average
    }

    pub fn history(&self) -> &RateHistory {
        &self.history
    }
}

/// Rate over the whole session, used for the final update.
pub fn whole_session_rate(total: i64, initial_offset: i64, elapsed: f64) -> f64 {
    let elapsed = elapsed.max(0.000_001);
    (total as f64 - initial_offset as f64) / elapsed
}

//! Copy inputs to stdout and drive the status line once per interval.
//!
//! A plain blocking read/write loop. Status updates only happen between reads.

use anyhow::{Context, Result};
use pipeview_core::display::StatusLine;
use pipeview_core::terminal;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::Settings;

/// Exit-status bit for an input that could not be opened or read.
pub const EXIT_INPUT_ERROR: i32 = 2;

/// Combined size of `files`, or None if any of them is stdin or not a
/// regular file.
pub fn input_size(files: &[PathBuf]) -> Option<u64> {
    if files.is_empty() {
        return None;
    }
    let mut total: u64 = 0;
    for file in files {
        if is_stdin(file) {
            return None;
        }
        let meta = fs::metadata(file).ok()?;
        if !meta.is_file() {
            return None;
        }
        total = total.saturating_add(meta.len());
    }
    (total > 0).then_some(total)
}

/// Units in `chunk`: bytes, or separators in line mode.
pub fn count_units(chunk: &[u8], line_mode: bool, separator: u8) -> usize {
    if line_mode {
        memchr::memchr_iter(separator, chunk).count()
    } else {
        chunk.len()
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Run the whole transfer on the real stdio handles.
pub fn run(settings: &Settings) -> Result<i32> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut pump = Pump::new(settings, stdout.lock(), stderr.lock());

    let stdin_only = [PathBuf::from("-")];
    let inputs = if settings.inputs.is_empty() {
        &stdin_only[..]
    } else {
        &settings.inputs[..]
    };

    for input in inputs {
        if is_stdin(input) {
            pump.feed("(stdin)", io::stdin().lock())?;
            continue;
        }
        let name = input.display().to_string();
        match File::open(input) {
            Ok(file) => pump.feed(&name, file)?,
            Err(err) => pump.input_failed(&name, &err),
        }
    }

    pump.finish()
}

/// Transfer state for one run.
pub struct Pump<'a, W: Write, E: Write> {
    settings: &'a Settings,
    line: StatusLine,
    out: W,
    status_out: E,
    buffer: Vec<u8>,
    start: Instant,
    next_tick: Instant,
    since_last: i64,
    total: i64,
    status: i32,
}

impl<'a, W: Write, E: Write> Pump<'a, W, E> {
    pub fn new(settings: &'a Settings, out: W, status_out: E) -> Self {
        let mut line = StatusLine::new(settings.options.clone());
        line.compile_template(&settings.template);
        let start = Instant::now();
        Self {
            settings,
            line,
            out,
            status_out,
            buffer: vec![0u8; settings.buffer_size],
            start,
            next_tick: start + settings.interval,
            since_last: 0,
            total: 0,
            status: 0,
        }
    }

    /// Copy everything from `reader` to the output. A read error ends this
    /// input only; a write error ends the transfer.
    pub fn feed<R: Read>(&mut self, name: &str, mut reader: R) -> Result<()> {
        loop {
            let n = match reader.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.input_failed(name, &err);
                    break;
                }
            };
            let chunk = &self.buffer[..n];
            let capacity = self.buffer.len() as u64;
            // Bytes sit in the buffer only until the write completes.
            self.line.set_buffer_fill(n as u64, capacity);
            self.out
                .write_all(chunk)
                .context("failed to write to stdout")?;
            self.line.set_buffer_fill(0, capacity);

            let counted = count_units(
                chunk,
                self.settings.options.line_mode,
                self.settings.separator,
            );
            let counted = i64::try_from(counted).unwrap_or(i64::MAX);
            self.line.record_output(chunk);
            self.since_last = self.since_last.saturating_add(counted);
            self.total = self.total.saturating_add(counted);

            if Instant::now() >= self.next_tick {
                self.tick();
            }
        }
        tracing::debug!(input = name, total = self.total, "input finished");
        Ok(())
    }

    /// Report an input that could not be used and mark the exit status.
    pub fn input_failed(&mut self, name: &str, err: &io::Error) {
        tracing::warn!(input = name, "input failed: {err}");
        let _ = writeln!(self.status_out, "pipeview: {name}: {err}");
        self.status |= EXIT_INPUT_ERROR;
    }

    /// Final update, newline and teardown. Returns the exit status.
    pub fn finish(mut self) -> Result<i32> {
        self.out.flush().context("failed to flush stdout")?;
        if self.may_draw() {
            let total = self.total;
            self.draw(-1, total);
            if !self.settings.options.numeric {
                let _ = writeln!(self.status_out);
            }
        }
        self.draw(0, -1);
        Ok(self.status)
    }

    fn may_draw(&self) -> bool {
        !self.settings.quiet && (self.settings.force || terminal::in_foreground())
    }

    fn tick(&mut self) {
        let now = Instant::now();
        self.next_tick = now + self.settings.interval;
        if !self.may_draw() {
            return;
        }
        if !self.settings.fixed_size {
            let current = (self.line.options().width, self.line.options().height);
            let (width, height) = terminal::screen_size(current);
            self.line.set_terminal_size(width, height);
        }
        let since_last = std::mem::take(&mut self.since_last);
        let total = self.total;
        self.draw(since_last, total);
    }

    fn draw(&mut self, since_last: i64, total: i64) {
        let elapsed = self.start.elapsed().as_secs_f64();
        match self.line.render(elapsed, since_last, total) {
            Ok(Some(text)) => {
                let written = if self.settings.options.numeric {
                    self.status_out.write_all(text.as_bytes())
                } else {
                    write!(self.status_out, "{text}\r")
                };
                if let Err(err) = written.and_then(|()| self.status_out.flush()) {
                    tracing::debug!("status write failed: {err}");
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!("status update skipped: {err}");
                self.status |= err.exit_bit();
            }
        }
    }
}

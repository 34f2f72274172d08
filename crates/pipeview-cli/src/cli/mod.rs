//! CLI for the pipeview pipeline monitor.

mod pump;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pipeview_core::config::{self, PipeviewConfig};
use pipeview_core::display::{DisplayOptions, FormatFlags};
use pipeview_core::terminal;
use std::path::PathBuf;
use std::time::Duration;

/// Bytes read from the input per transfer step unless `--buffer-size` says otherwise.
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Copy inputs to stdout while drawing a progress line on stderr.
#[derive(Debug, Parser)]
#[command(name = "pipeview", version)]
#[command(about = "pipeview: monitor the progress of data through a pipe", long_about = None)]
pub struct Cli {
    /// Show a progress bar.
    #[arg(short, long)]
    pub progress: bool,

    /// Show elapsed time.
    #[arg(short, long)]
    pub timer: bool,

    /// Show estimated time remaining.
    #[arg(short, long)]
    pub eta: bool,

    /// Show the estimated clock time of completion.
    #[arg(short = 'I', long = "fineta")]
    pub finish_time: bool,

    /// Show the current rate.
    #[arg(short, long)]
    pub rate: bool,

    /// Show the average rate.
    #[arg(short, long)]
    pub average_rate: bool,

    /// Show the amount transferred so far.
    #[arg(short, long)]
    pub bytes: bool,

    /// Show how full the transfer buffer is.
    #[arg(short = 'T', long)]
    pub buffer_percent: bool,

    /// Show the last N bytes written.
    #[arg(short = 'A', long, value_name = "N")]
    pub last_written: Option<usize>,

    /// Custom status-line template (e.g. "%N %b %r %p").
    #[arg(short = 'F', long, value_name = "TEMPLATE")]
    pub format: Option<String>,

    /// Print numbers instead of a visual line.
    #[arg(short, long)]
    pub numeric: bool,

    /// No output at all; just copy the data.
    #[arg(short, long)]
    pub quiet: bool,

    /// Draw even when not in the foreground.
    #[arg(short, long)]
    pub force: bool,

    /// Count lines instead of bytes.
    #[arg(short, long)]
    pub line_mode: bool,

    /// Lines end with NUL rather than newline (implies --line-mode).
    #[arg(short = '0', long)]
    pub null: bool,

    /// Show bits instead of bytes.
    #[arg(short = '8', long)]
    pub bits: bool,

    /// Expected total (bytes, or lines in line mode).
    #[arg(short, long, value_name = "N")]
    pub size: Option<u64>,

    /// Seconds between updates.
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<f64>,

    /// Assume this terminal width.
    #[arg(short, long)]
    pub width: Option<usize>,

    /// Assume this terminal height.
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Label shown in front of the line.
    #[arg(short = 'N', long)]
    pub name: Option<String>,

    /// Seconds of history behind the average rate and ETA.
    #[arg(short = 'm', long, value_name = "SECS")]
    pub average_rate_window: Option<u32>,

    /// Transfer buffer size in bytes.
    #[arg(short = 'B', long, value_name = "BYTES")]
    pub buffer_size: Option<usize>,

    /// Read configuration from this file instead of the XDG location.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Input files ("-" is stdin). Defaults to stdin.
    pub files: Vec<PathBuf>,
}

/// Everything the pump needs, after flags have been layered over the config.
#[derive(Debug, Clone)]
pub struct Settings {
    pub options: DisplayOptions,
    pub template: String,
    pub interval: Duration,
    pub force: bool,
    pub quiet: bool,
    /// Byte that ends a line in line mode.
    pub separator: u8,
    pub buffer_size: usize,
    /// Width or height came from the command line; skip resize polling.
    pub fixed_size: bool,
    pub inputs: Vec<PathBuf>,
}

impl Cli {
    /// Display switches given on the command line (without the name).
    pub fn display_flags(&self) -> FormatFlags {
        FormatFlags {
            progress: self.progress,
            timer: self.timer,
            eta: self.eta,
            finish_time: self.finish_time,
            rate: self.rate,
            average_rate: self.average_rate,
            bytes: self.bytes,
            buffer_percent: self.buffer_percent,
            last_written: self.last_written.unwrap_or(0),
            name: false,
        }
    }

    /// Template to render: `--format`, else the display switches, else the
    /// config's template, else progress/timer/ETA/rate/bytes. Numeric mode
    /// without switches prints just the percentage.
    pub fn template(&self, cfg: &PipeviewConfig) -> String {
        if let Some(format) = &self.format {
            return format.clone();
        }
        let mut flags = self.display_flags();
        if flags.is_empty() && !self.numeric {
            if let Some(format) = &cfg.format {
                return format.clone();
            }
            flags = FormatFlags {
                progress: true,
                timer: true,
                eta: true,
                rate: true,
                bytes: true,
                ..FormatFlags::default()
            };
        }
        flags.name = self.name.is_some();
        flags.to_template()
    }

    /// Layer the flags over `cfg`. `terminal` is the detected terminal size
    /// and `input_size` the summed size of the inputs, when known.
    pub fn settings(
        &self,
        cfg: &PipeviewConfig,
        terminal: (usize, usize),
        input_size: Option<u64>,
    ) -> Result<Settings> {
        let interval_secs = self.interval.unwrap_or(cfg.interval_secs);
        if !(interval_secs > 0.0) {
            bail!("interval must be a positive number of seconds, got {interval_secs}");
        }
        let interval = Duration::try_from_secs_f64(interval_secs)
            .with_context(|| format!("interval out of range: {interval_secs}"))?;

        let line_mode = self.line_mode || self.null;
        let options = DisplayOptions {
            size: self.size.or(input_size).unwrap_or(0),
            name: self.name.clone(),
            numeric: self.numeric,
            bits: self.bits || cfg.bits,
            line_mode,
            initial_offset: 0,
            width: self.width.unwrap_or(terminal.0).max(1),
            height: self.height.unwrap_or(terminal.1).max(1),
            average_rate_window: self
                .average_rate_window
                .unwrap_or(cfg.average_rate_window),
        };

        Ok(Settings {
            options,
            template: self.template(cfg),
            interval,
            force: self.force || cfg.force,
            quiet: self.quiet,
            separator: if self.null { b'\0' } else { b'\n' },
            buffer_size: self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE).max(1),
            fixed_size: self.width.is_some() || self.height.is_some(),
            inputs: self.files.clone(),
        })
    }
}

/// Parse arguments, load config and run the transfer. Returns the exit status.
pub fn run_from_args() -> Result<i32> {
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);

    let terminal = terminal::screen_size((cfg.default_width, cfg.default_height));
    let input_size = if cli.size.is_some() || cli.line_mode || cli.null {
        None
    } else {
        pump::input_size(&cli.files)
    };
    let settings = cli.settings(&cfg, terminal, input_size)?;
    tracing::debug!(template = %settings.template, size = settings.options.size, "starting transfer");

    pump::run(&settings)
}

#[cfg(test)]
mod tests;

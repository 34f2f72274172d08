//! Integration test: whole transfer sessions driven through the public API.
//!
//! Each test builds a status line the way the CLI does (flags or config into
//! options and template), runs a few ticks, the final update and teardown.

mod common;

use pipeview_core::config;
use pipeview_core::display::{DisplayOptions, Format, FormatFlags, StatusLine};
use std::fs;

fn default_flags() -> FormatFlags {
    FormatFlags {
        progress: true,
        timer: true,
        eta: true,
        rate: true,
        bytes: true,
        ..FormatFlags::default()
    }
}

#[test]
fn steady_transfer_from_start_to_teardown() {
    let options = DisplayOptions {
        size: 4096,
        ..DisplayOptions::default()
    };
    let mut line = StatusLine::new(options);
    line.compile_template(Format::from_flags(&default_flags()).template());

    let lines = common::steady_ticks(&mut line, 1024, 3);
    assert!(lines.iter().all(|l| l.chars().count() <= 80));
    assert!(lines[1].starts_with("2.00KiB 0:00:02 [1.00KiB/s] ["));
    assert!(lines[1].contains("] 50% "));
    assert!(lines[1].ends_with("ETA 0:00:02"));

    let last = line.render(4.0, -1, 4096).unwrap().unwrap().to_string();
    assert!(last.starts_with("4.00KiB 0:00:04 [1.00KiB/s] ["));
    assert!(last.contains("] 100% "));
    assert!(!last.contains("ETA"));
    assert_eq!(last.chars().count(), lines[2].chars().count());

    assert!(line.render(4.0, 0, -1).unwrap().is_none());
}

#[test]
fn config_file_drives_the_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "format = \"%N %b\"\ninterval_secs = 1.0\naverage_rate_window = 5\n",
    )
    .unwrap();
    let cfg = config::load_from_path(&path).unwrap();

    let options = DisplayOptions {
        name: Some("data".to_string()),
        average_rate_window: cfg.average_rate_window,
        width: cfg.default_width,
        height: cfg.default_height,
        ..DisplayOptions::default()
    };
    assert_eq!(options.history_settings().capacity, 6);

    let mut line = StatusLine::new(options);
    line.compile_template(cfg.format.as_deref().unwrap());
    let out = line.render(1.0, 1024, 1024).unwrap().unwrap();
    assert_eq!(out, "     data: 1.00KiB");
}

#[test]
fn numeric_session_is_machine_readable() {
    let options = DisplayOptions {
        size: 300,
        numeric: true,
        ..DisplayOptions::default()
    };
    let mut line = StatusLine::new(options);
    line.compile_template("%t");

    let lines = common::steady_ticks(&mut line, 100, 3);
    assert_eq!(lines, ["1.0000 33\n", "2.0000 66\n", "3.0000 100\n"]);
}

#[test]
fn unknown_size_bounces_until_the_end() {
    let mut line = StatusLine::new(DisplayOptions {
        width: 30,
        ..DisplayOptions::default()
    });
    line.compile_template("%p");

    let lines = common::steady_ticks(&mut line, 10, 5);
    assert!(lines.iter().all(|l| l.len() == 30 && l.contains("<=>")));
    assert_ne!(lines[0], lines[4]);
}

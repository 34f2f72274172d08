//! Tests for the line composer (layout, redraw, numeric output).

use chrono::{DateTime, Local, TimeZone};

use super::StatusLine;
use crate::display::DisplayOptions;

fn line(template: &str, options: DisplayOptions) -> StatusLine {
    let mut line = StatusLine::new(options);
    line.compile_template(template);
    line
}

fn sized(size: u64, width: usize) -> DisplayOptions {
    DisplayOptions {
        size,
        width,
        ..DisplayOptions::default()
    }
}

fn render(line: &mut StatusLine, elapsed: f64, since_last: i64, total: i64) -> String {
    line.render(elapsed, since_last, total)
        .unwrap()
        .expect("render produced output")
        .to_string()
}

fn ten_am() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

#[test]
fn half_way_transfer() {
    let mut l = line("%N %t %b %r %p", sized(2048, 40));
    let out = render(&mut l, 10.0, 1024, 1024);
    assert_eq!(out, " 0:00:10 1.00KiB [ 102  B/s] [=>   ] 50%");
    assert!(out.len() <= 40);
}

#[test]
fn final_update_uses_whole_session_average() {
    let mut l = line("%N %t %b %r %p", sized(2048, 40));
    render(&mut l, 10.0, 1024, 1024);
    let out = render(&mut l, 16.0, -1, 2048);
    assert_eq!(out, " 0:00:16 2.00KiB [ 128  B/s] [===>] 100%");
}

#[test]
fn final_update_blanks_eta() {
    let mut l = line("%e", sized(1000, 80));
    assert_eq!(render(&mut l, 1.0, 500, 500), "ETA 0:00:01");
    assert_eq!(render(&mut l, 2.0, -1, 1000), " ".repeat(11));
}

#[test]
fn eta_needs_a_known_size() {
    let mut l = line("<%e>", sized(0, 80));
    assert_eq!(render(&mut l, 1.0, 500, 500), "<>");
}

#[test]
fn finish_time_uses_clock() {
    let mut l = line("%I", sized(1000, 80)).with_clock(ten_am);
    assert_eq!(render(&mut l, 1.0, 500, 500), "ETA 10:00:01");
    assert_eq!(render(&mut l, 2.0, -1, 1000), " ".repeat(12));
}

#[test]
fn numeric_mode_with_timer_and_bytes() {
    let options = DisplayOptions {
        numeric: true,
        ..sized(0, 80)
    };
    let mut l = line("%t %b", options);
    assert_eq!(render(&mut l, 3.5, 500, 500), "3.5000 500\n");
}

#[test]
fn numeric_mode_variants() {
    let numeric = |size| DisplayOptions {
        numeric: true,
        ..sized(size, 80)
    };

    let mut l = line("%t", numeric(1000));
    assert_eq!(render(&mut l, 1.0, 250, 250), "1.0000 25\n");

    let mut l = line("%b", numeric(0));
    assert_eq!(render(&mut l, 1.0, 500, 500), "500\n");

    let mut l = line(
        "%b",
        DisplayOptions {
            bits: true,
            ..numeric(0)
        },
    );
    assert_eq!(render(&mut l, 1.0, 500, 500), "4000\n");
}

#[test]
fn identical_ticks_render_identically() {
    let mut l = line("%b %t %r %a %p %e", sized(2048, 80));
    let first = render(&mut l, 10.0, 1024, 1024);
    let second = render(&mut l, 10.0, 1024, 1024);
    assert_eq!(first, second);
}

#[test]
fn shrinking_line_is_padded_up_to_fifteen() {
    let mut l = line(&"x".repeat(40), sized(0, 80));
    assert_eq!(render(&mut l, 1.0, 0, 0).len(), 40);
    l.compile_template("0123456789");
    let out = render(&mut l, 2.0, 0, 0);
    assert_eq!(out, format!("0123456789{}", " ".repeat(15)));
}

#[test]
fn narrower_terminal_skips_padding() {
    let mut l = line(&"x".repeat(40), sized(0, 80));
    render(&mut l, 1.0, 0, 0);
    l.compile_template("0123456789");
    l.set_terminal_size(60, 25);
    assert_eq!(render(&mut l, 2.0, 0, 0), "0123456789");
}

#[test]
fn bouncing_bar_for_unknown_size() {
    let mut l = line("%p", sized(0, 20));
    let out = render(&mut l, 1.0, 10, 10);
    assert_eq!(out.len(), 20);
    assert!(out.starts_with('[') && out.ends_with(']'));
    assert!(out.contains("<=>"));
    assert_eq!(l.percentage(), 2);
}

#[test]
fn bouncing_counter_wraps() {
    let mut l = line("%p", sized(0, 20));
    for tick in 1..=99 {
        render(&mut l, tick as f64, 10, tick * 10);
    }
    assert_eq!(l.percentage(), 198);
    render(&mut l, 100.0, 10, 1000);
    assert_eq!(l.percentage(), 0);
}

#[test]
fn stalled_transfer_does_not_bounce() {
    let mut l = line("%p", sized(0, 20));
    render(&mut l, 1.0, 0, 0);
    render(&mut l, 2.0, 0, 0);
    assert_eq!(l.percentage(), 0);
}

#[test]
fn bar_dropped_when_it_cannot_fit() {
    let mut l = line("%b %p", sized(100, 10));
    assert_eq!(render(&mut l, 1.0, 0, 0), "0.00  B ");
}

#[test]
fn emission_stops_at_first_segment_that_overflows() {
    let mut l = line("%t %b %t", sized(0, 12));
    assert_eq!(render(&mut l, 1.0, 0, 0), "0:00:01 ");
}

#[test]
fn percentage_is_clamped() {
    let mut l = line("%p", sized(10, 80));
    render(&mut l, 1.0, i64::MAX / 2, i64::MAX / 2);
    assert_eq!(l.percentage(), 100_000);
}

#[test]
fn teardown_releases_and_recovers() {
    let mut l = line("%b", sized(0, 80));
    render(&mut l, 1.0, 10, 10);
    assert!(l.render(1.5, 0, -1).unwrap().is_none());
    assert_eq!(render(&mut l, 2.0, 10, 20), "20.0  B");
}

#[test]
fn repeated_directive_renders_the_same_value() {
    let mut l = line("%b|%b", sized(0, 80));
    assert_eq!(render(&mut l, 1.0, 2048, 2048), "2.00KiB|2.00KiB");
}

#[test]
fn percent_escape_with_digits_renders_once() {
    let mut l = line("a%5%b", sized(0, 80));
    assert_eq!(render(&mut l, 1.0, 0, 0), "a%b");
}

#[test]
fn last_output_preview() {
    let mut l = line("%4A", sized(0, 80));
    assert_eq!(render(&mut l, 1.0, 0, 0), "....");
    l.record_output(b"ab\ncd");
    assert_eq!(render(&mut l, 2.0, 5, 5), "b.cd");
    l.record_output(b"!");
    assert_eq!(render(&mut l, 3.0, 1, 6), ".cd!");
}

#[test]
fn preview_survives_template_change() {
    let mut l = line("%4A", sized(0, 80));
    l.record_output(b"wxyz");
    l.compile_template("%2A");
    assert_eq!(render(&mut l, 1.0, 0, 0), "yz");
    l.compile_template("%3A");
    assert_eq!(render(&mut l, 2.0, 0, 0), ".yz");
}

#[test]
fn buffer_fill_percentage() {
    let mut l = line("%T", sized(0, 80));
    assert_eq!(render(&mut l, 1.0, 0, 0), "");
    l.set_buffer_fill(50, 200);
    assert_eq!(render(&mut l, 2.0, 0, 0), "{ 25%}");
}

#[test]
fn name_label_is_right_aligned() {
    let options = DisplayOptions {
        name: Some("in.txt".to_string()),
        ..sized(0, 80)
    };
    let mut l = line("%N", options);
    assert_eq!(render(&mut l, 1.0, 0, 0), "   in.txt:");
}

#[test]
fn line_mode_uses_decimal_units() {
    let options = DisplayOptions {
        line_mode: true,
        ..sized(0, 80)
    };
    let mut l = line("%b %r", options);
    assert_eq!(render(&mut l, 1.0, 500, 500), " 500  [ 500 /s]");
}

#[test]
fn bits_mode_multiplies_by_eight() {
    let options = DisplayOptions {
        bits: true,
        ..sized(0, 80)
    };
    let mut l = line("%b", options);
    assert_eq!(render(&mut l, 1.0, 128, 128), "1.00Kib");
}

#[test]
fn wider_terminal_grows_buffer() {
    let mut l = line(&"y".repeat(300), sized(0, 80));
    assert_eq!(render(&mut l, 1.0, 0, 0), "");
    l.set_terminal_size(400, 25);
    assert_eq!(render(&mut l, 2.0, 0, 0).len(), 300);
}

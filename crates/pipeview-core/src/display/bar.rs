//! Progress bar layout for the variable-width `%p` field.

/// Largest bar (in characters) the layout will produce, including brackets.
pub const BAR_CAPACITY: usize = 1024;

/// Room reserved inside `BAR_CAPACITY` for brackets and the percentage.
const BAR_OVERHEAD: usize = 16;

/// Upper bound on a determinate percentage.
pub const MAX_PERCENT: i64 = 100_000;

/// `[====>     ] 42%`, filling `width` columns.
///
/// `width` is the room left after the fixed fields. Returns an empty bar
/// portion (just brackets and percentage) when there is no room.
pub fn determinate(width: usize, percent: i64) -> String {
    let percent = percent.clamp(0, MAX_PERCENT);
    let pct = format!("{percent:2}%");
    let available = inner_width(width, pct.len() + 3);

    let wanted = (available as i64 * percent / 100 - 1).max(0) as usize;
    let filled = wanted.min(available);

    let mut bar = String::with_capacity(available + pct.len() + 3);
    bar.push('[');
    bar.extend(std::iter::repeat('=').take(filled));
    let mut used = filled;
    if wanted < available {
        bar.push('>');
        used += 1;
    }
    bar.extend(std::iter::repeat(' ').take(available - used));
    bar.push_str("] ");
    bar.push_str(&pct);
    bar
}

/// `[    <=>     ]` bouncing bar for transfers of unknown size.
///
/// `position` is the oscillating counter in `0..200`; values past 100 run the
/// marker back towards the left.
pub fn indeterminate(width: usize, position: i64) -> String {
    let available = inner_width(width, 5);
    let position = position.clamp(0, 200);
    let p = if position > 100 { 200 - position } else { position };
    let lead = (available as i64 * p / 100) as usize;

    let mut bar = String::with_capacity(available + 5);
    bar.push('[');
    bar.extend(std::iter::repeat(' ').take(lead));
    bar.push_str("<=>");
    bar.extend(std::iter::repeat(' ').take(available.saturating_sub(lead)));
    bar.push(']');
    bar
}

fn inner_width(width: usize, overhead: usize) -> usize {
    width
        .saturating_sub(overhead)
        .min(BAR_CAPACITY - BAR_OVERHEAD)
}

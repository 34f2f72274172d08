//! Magnitude scaling for byte counts and rates ("1.23MiB", "12.3k/s").
//!
//! Values are scaled by 1000 (decimal) or 1024 (binary) until they sit in
//! roughly `[1, 1000)`, then printed with 3-4 significant digits so that the
//! field width stays stable from tick to tick.

/// Decimal prefixes, smallest to largest. Index 8 is "no prefix".
const DECIMAL_PREFIXES: [char; 17] = [
    'y', 'z', 'a', 'f', 'p', 'n', 'u', 'm', ' ', 'k', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y',
];

/// Binary prefixes (rendered with a trailing `i`). Index 8 is "no prefix".
const BINARY_PREFIXES: [char; 17] = [
    'y', 'z', 'a', 'f', 'p', 'n', 'u', 'm', ' ', 'K', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y',
];

const NO_PREFIX: usize = 8;

/// Scaled values above this are clamped before formatting.
const DISPLAY_CLAMP: f64 = 100_000.0;

/// Scale `value` into a mantissa and unit prefix.
///
/// In byte mode the divisor is 1024 and the prefix is two characters wide
/// (`"Ki"`, `"Mi"`, ...), with two spaces for the unscaled tier so columns line
/// up with `KiB`. In decimal mode the divisor is 1000 and the prefix is one
/// character (a space for the unscaled tier).
///
/// A value is only moved up a tier once it exceeds 97% of the divisor, so
/// something that would round to "1000" under the current prefix rolls over
/// instead.
pub fn scale(value: f64, is_bytes: bool) -> (f64, String) {
    let (table, ratio) = if is_bytes {
        (&BINARY_PREFIXES, 1024.0)
    } else {
        (&DECIMAL_PREFIXES, 1000.0)
    };

    let mut value = if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    };
    let mut idx = NO_PREFIX;

    if value != 0.0 {
        let cutoff = ratio * 0.97;
        while value > cutoff && idx + 1 < table.len() {
            value /= ratio;
            idx += 1;
        }
        while value < 1.0 && idx > 0 {
            value *= ratio;
            idx -= 1;
        }
    }

    (value, prefix_string(table[idx], is_bytes))
}

fn prefix_string(c: char, is_bytes: bool) -> String {
    match (c, is_bytes) {
        (' ', true) => "  ".to_string(),
        (c, true) => format!("{c}i"),
        (c, false) => c.to_string(),
    }
}

/// Render `amount` as a scaled number followed by its prefix and `suffix`.
///
/// Scaled values above 99.9 print as a 4-wide integer; smaller ones keep three
/// significant digits (`"1.23"`, `"12.3"`, `"99.9"`).
pub fn size_string(amount: f64, suffix: &str, is_bytes: bool) -> String {
    let (display, prefix) = scale(amount, is_bytes);
    let display = display.min(DISPLAY_CLAMP);

    let number = if display > 99.9 {
        format!("{:>4}", display as i64)
    } else {
        format!("{:>4}", three_significant(display))
    };

    format!("{number}{prefix}{suffix}")
}

/// Below this a scaled value prints in exponent form.
const EXPONENT_CUTOFF: f64 = 0.001;

/// Three significant digits, keeping trailing zeros (`1.50`, `13.0`).
/// Values too small for the prefix table print as `1.00e-30`.
fn three_significant(value: f64) -> String {
    if value == 0.0 {
        return "0.00".to_string();
    }
    if value.abs() < EXPONENT_CUTOFF {
        return format!("{value:.2e}");
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    let rendered = format!("{value:.decimals$}");

    // Rounding can carry into another digit (9.996 -> "10.00").
    let rounded: f64 = rendered.parse().unwrap_or(value);
    if decimals > 0 && rounded.abs() >= 10f64.powi(magnitude + 1) {
        let decimals = decimals - 1;
        return format!("{value:.decimals$}");
    }
    rendered
}

//! Output buffer for the composed line, plus the bookkeeping that keeps an
//! in-place redraw from leaving stale characters behind.

use super::error::DisplayError;

/// Extra room in the output buffer beyond twice the terminal width.
const BUFFER_SLACK: usize = 80;

/// Most trailing blanks added when the line shrinks.
const MAX_PADDING: usize = 15;

#[derive(Debug, Default)]
pub struct RedrawState {
    buffer: String,
    /// Logical capacity in characters; 0 while unallocated.
    capacity: usize,
    /// Characters in `buffer`.
    length: usize,
    prev_length: usize,
    prev_width: usize,
}

impl RedrawState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure the buffer can hold a line for `width` columns, growing it
    /// (and dropping its contents) when the terminal got wider.
    pub fn ensure_capacity(&mut self, width: usize, extra: usize) -> Result<(), DisplayError> {
        if self.capacity != 0 && self.capacity < width.saturating_mul(2) {
            self.release();
        }
        if self.capacity == 0 {
            let size = width
                .saturating_mul(2)
                .saturating_add(BUFFER_SLACK)
                .saturating_add(extra);
            let mut buffer = String::new();
            if let Err(err) = buffer.try_reserve_exact(size.saturating_add(MAX_PADDING + 1)) {
                tracing::error!(size, "status line buffer allocation failed: {err}");
                return Err(err.into());
            }
            tracing::debug!(size, width, "allocated status line buffer");
            self.buffer = buffer;
            self.capacity = size;
            self.length = 0;
        }
        Ok(())
    }

    /// Free the buffer; the next `ensure_capacity` allocates a fresh one.
    pub fn release(&mut self) {
        self.buffer = String::new();
        self.capacity = 0;
        self.length = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_allocated(&self) -> bool {
        self.capacity != 0
    }

    pub fn begin(&mut self) {
        self.buffer.clear();
        self.length = 0;
    }

    /// Characters composed so far this tick.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Append one segment, truncated to what the buffer can hold.
    ///
    /// Returns false once a segment no longer fits (in the buffer or within
    /// `width` columns); callers stop composing at that point.
    pub fn push_segment(&mut self, text: &str, width: usize) -> bool {
        let mut segment_length = text.chars().count();
        if segment_length == 0 {
            return true;
        }
        let room = self.capacity.saturating_sub(2);
        if segment_length + self.length > room {
            segment_length = room.saturating_sub(self.length);
        }
        if segment_length < 1 {
            return false;
        }
        if segment_length + self.length > width {
            return false;
        }
        self.buffer.push_str(take_chars(text, segment_length));
        self.length += segment_length;
        true
    }

    /// Replace the contents wholesale (numeric output). Redraw tracking is
    /// left alone since numeric lines are never drawn in place.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.clear();
        self.buffer.push_str(text);
        self.length = text.chars().count();
    }

    /// Pad with blanks up to the previous length if the line shrank and the
    /// terminal did not get narrower, then remember this line's size.
    pub fn finish(&mut self, width: usize) {
        let mut output_length = self.length;
        if output_length < self.prev_length && width >= self.prev_width {
            let padding = (self.prev_length - output_length).min(MAX_PADDING);
            self.buffer.extend(std::iter::repeat(' ').take(padding));
            output_length += padding;
            self.length = output_length;
        }
        self.prev_width = width;
        self.prev_length = output_length;
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

/// Prefix of `text` holding at most `n` characters.
fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

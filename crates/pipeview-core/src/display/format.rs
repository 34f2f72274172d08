//! Status-line templates: `%`-directive parsing into a reusable segment list.
//!
//! A template such as `"%N %b %t %r %p"` is compiled once into literal spans
//! and field references. Field content is refreshed on every tick but the
//! shape of the line only changes when a new template is compiled.

use std::ops::Range;

/// Longest preview the `%<N>A` directive may request.
pub const MAX_PREVIEW_LEN: usize = 256;

/// Segments past this count are ignored.
const MAX_SEGMENTS: usize = 100;

/// One value rendered into the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `%p`
    Progress,
    /// `%t`
    Timer,
    /// `%e`
    Eta,
    /// `%I`
    FinishTime,
    /// `%<N>A`
    LastOutput,
    /// `%r`
    Rate,
    /// `%a`
    AverageRate,
    /// `%b`
    Bytes,
    /// `%T`
    BufferPercent,
    /// `%N`
    Name,
}

impl Field {
    fn from_directive(c: char) -> Option<Self> {
        Some(match c {
            'p' => Field::Progress,
            't' => Field::Timer,
            'e' => Field::Eta,
            'I' => Field::FinishTime,
            'A' => Field::LastOutput,
            'r' => Field::Rate,
            'a' => Field::AverageRate,
            'b' => Field::Bytes,
            'T' => Field::BufferPercent,
            'N' => Field::Name,
            _ => return None,
        })
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// A piece of the compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Byte span of the template copied through unchanged.
    Literal(Range<usize>),
    /// Field whose width does not depend on the terminal.
    Fixed(Field),
    /// Field sized from whatever width is left (the progress bar).
    Variable(Field),
}

/// Set of fields referenced by a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Components(u16);

impl Components {
    pub fn insert(&mut self, field: Field) {
        self.0 |= field.bit();
    }

    pub fn contains(self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Old-style display switches used to build a template when none is given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub progress: bool,
    pub timer: bool,
    pub eta: bool,
    pub finish_time: bool,
    pub rate: bool,
    pub average_rate: bool,
    pub bytes: bool,
    pub buffer_percent: bool,
    /// Preview length for `%<N>A`; 0 leaves it out.
    pub last_written: usize,
    pub name: bool,
}

impl FormatFlags {
    /// True if no display switch is on.
    pub fn is_empty(&self) -> bool {
        *self == FormatFlags::default()
    }

    /// Template equivalent of these switches, e.g. `"%b %t %r %p %e"`.
    pub fn to_template(&self) -> String {
        let parts = [
            (self.name, "%N"),
            (self.bytes, "%b"),
            (self.buffer_percent, "%T"),
            (self.timer, "%t"),
            (self.rate, "%r"),
            (self.average_rate, "%a"),
            (self.progress, "%p"),
            (self.eta, "%e"),
            (self.finish_time, "%I"),
        ];
        let mut directives: Vec<String> = parts
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, d)| d.to_string())
            .collect();
        if self.last_written > 0 {
            directives.push(format!("%{}A", self.last_written));
        }
        directives.join(" ")
    }
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    template: String,
    segments: Vec<Segment>,
    components: Components,
    preview_len: usize,
}

impl Format {
    /// Parse `template`.
    ///
    /// `%%` is a literal `%` (digits in between are ignored), a trailing `%`
    /// is kept as-is, and an unknown directive letter is echoed as
    /// `%<letter>`. Digits between `%` and the letter are only meaningful to
    /// `%A`. Nothing here fails.
    pub fn compile(template: &str) -> Self {
        let template = template.to_string();
        let mut segments = Vec::new();
        let mut components = Components::default();
        let mut preview_len = 0;

        let bytes = template.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() && segments.len() < MAX_SEGMENTS {
            if bytes[pos] != b'%' {
                let end = template[pos..]
                    .find('%')
                    .map(|i| pos + i)
                    .unwrap_or(bytes.len());
                segments.push(Segment::Literal(pos..end));
                pos = end;
                continue;
            }

            let percent = pos;
            pos += 1;
            let mut num: usize = 0;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                num = num
                    .saturating_mul(10)
                    .saturating_add(usize::from(bytes[pos] - b'0'));
                pos += 1;
            }

            let Some(letter) = template[pos..].chars().next() else {
                // Dangling `%` (with any digits) at the end of the template.
                segments.push(Segment::Literal(percent..pos));
                break;
            };
            let letter_span = pos..pos + letter.len_utf8();
            pos = letter_span.end;

            // `%%` is a literal percent; any digits in between are ignored.
            if letter == '%' {
                segments.push(Segment::Literal(letter_span));
                continue;
            }

            match Field::from_directive(letter) {
                Some(field) => {
                    components.insert(field);
                    if field == Field::LastOutput {
                        preview_len = num.clamp(1, MAX_PREVIEW_LEN);
                    }
                    segments.push(if field == Field::Progress {
                        Segment::Variable(field)
                    } else {
                        Segment::Fixed(field)
                    });
                }
                None => {
                    segments.push(Segment::Literal(percent..percent + 1));
                    if segments.len() < MAX_SEGMENTS {
                        segments.push(Segment::Literal(letter_span));
                    }
                }
            }
        }

        tracing::debug!(
            template = %template,
            segments = segments.len(),
            "compiled status-line template"
        );

        Format {
            template,
            segments,
            components,
            preview_len,
        }
    }

    /// Compile the template described by `flags`.
    pub fn from_flags(flags: &FormatFlags) -> Self {
        Self::compile(&flags.to_template())
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Text of a literal segment; empty for field segments.
    pub fn literal(&self, segment: &Segment) -> &str {
        match segment {
            Segment::Literal(span) => self.template.get(span.clone()).unwrap_or(""),
            _ => "",
        }
    }

    pub fn components(&self) -> Components {
        self.components
    }

    pub fn uses(&self, field: Field) -> bool {
        self.components.contains(field)
    }

    /// Bytes of recent output the `%A` directive shows (0 if unused).
    pub fn preview_len(&self) -> usize {
        self.preview_len
    }
}

use crate::led::color::Rgb;

/// Which end of the strip a progress bar grows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Fill from index 0 upwards.
    #[default]
    Forward,
    /// Fill from the last LED downwards.
    Reverse,
}

impl From<bool> for Direction {
    /// `true` is index-ascending fill.
    fn from(forward: bool) -> Self {
        if forward {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }
}

/// A colored LED index range `[start, stop)` on a strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub stop: usize,
    pub color: Rgb,
}

impl Segment {
    pub fn new(start: usize, stop: usize, color: Rgb) -> Self {
        Segment { start, stop, color }
    }

    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.stop
    }
}

/// Clamps a percentage into `[0, 100]`. NaN counts as 0.
pub fn clamp_percentage(percentage: f64) -> f64 {
    if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, 100.0)
    }
}

/// Clamps both ends of a percentage range and orders them.
pub fn normalize_range(start_pct: f64, end_pct: f64) -> (f64, f64) {
    let start = clamp_percentage(start_pct);
    let end = clamp_percentage(end_pct);
    if start > end {
        (end, start)
    } else {
        (start, end)
    }
}

/// `floor(led_count * pct / 100)`, never past the end of the strip.
pub fn percentage_to_index(led_count: usize, percentage: f64) -> usize {
    let index = (led_count as f64 * clamp_percentage(percentage) / 100.0).floor() as usize;
    index.min(led_count)
}

/// The foreground LED range for a percentage range, mirrored for
/// [`Direction::Reverse`].
pub fn foreground_range(
    led_count: usize,
    start_pct: f64,
    end_pct: f64,
    direction: Direction,
) -> (usize, usize) {
    let (start_pct, end_pct) = normalize_range(start_pct, end_pct);
    let start_idx = percentage_to_index(led_count, start_pct);
    let end_idx = percentage_to_index(led_count, end_pct);
    match direction {
        Direction::Forward => (start_idx, end_idx),
        Direction::Reverse => (led_count - end_idx, led_count - start_idx),
    }
}

/// Splits the strip into background / foreground / background segments for the
/// given percentage range.
///
/// The result is in ascending index order, covers `[0, led_count)` exactly once
/// and never contains an empty segment. A strip of zero LEDs yields a single
/// empty background segment, which callers treat as a no-op.
pub fn map_progress(
    led_count: usize,
    start_pct: f64,
    end_pct: f64,
    direction: Direction,
    foreground: Rgb,
    background: Rgb,
) -> Vec<Segment> {
    if led_count == 0 {
        return vec![Segment::new(0, 0, background)];
    }

    let (fg_start, fg_stop) = foreground_range(led_count, start_pct, end_pct, direction);
    if fg_start == fg_stop {
        return vec![Segment::new(0, led_count, background)];
    }
    [
        Segment::new(0, fg_start, background),
        Segment::new(fg_start, fg_stop, foreground),
        Segment::new(fg_stop, led_count, background),
    ]
    .into_iter()
    .filter(|segment| !segment.is_empty())
    .collect()
}

/// Lights `percentage` of the strip starting at the origin of `direction`.
pub fn fill_percentage(
    led_count: usize,
    percentage: f64,
    direction: Direction,
    foreground: Rgb,
    background: Rgb,
) -> Vec<Segment> {
    map_progress(led_count, 0.0, percentage, direction, foreground, background)
}

/// Expands segments into one color per LED, for transports that take an
/// index array instead of start/stop descriptors. LEDs not covered by any
/// segment are black.
pub fn to_index_array(led_count: usize, segments: &[Segment]) -> Vec<Rgb> {
    let mut leds = vec![Rgb::BLACK; led_count];
    for segment in segments {
        let stop = segment.stop.min(led_count);
        if segment.start < stop {
            leds[segment.start..stop].fill(segment.color);
        }
    }
    leds
}

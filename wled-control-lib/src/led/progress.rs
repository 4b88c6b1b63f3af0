use crate::led::segment::{clamp_percentage, normalize_range, Direction};

/// Progress bar state kept by the client between calls.
///
/// `current` is the leading edge of the bar, `origin` the edge it was started
/// from by the last [`ProgressState::set`]. Both are percentages in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressState {
    current: f64,
    origin: f64,
    direction: Direction,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Records an explicit range and returns it clamped and ordered.
    pub fn set(&mut self, start_pct: f64, end_pct: f64) -> (f64, f64) {
        let (start, end) = normalize_range(start_pct, end_pct);
        self.origin = start;
        self.current = end;
        (start, end)
    }

    /// Moves the leading edge by `delta` (which may be negative) and returns
    /// the range the bar now covers, from its origin to the new edge.
    pub fn add(&mut self, delta: f64) -> (f64, f64) {
        let end = clamp_percentage(self.current + delta);
        self.current = end;
        normalize_range(self.origin, end)
    }

    /// Back to an empty bar. The direction is kept.
    pub fn clear(&mut self) {
        self.current = 0.0;
        self.origin = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_orders_and_stores_end() {
        let mut state = ProgressState::new();
        assert_eq!(state.set(70.0, 20.0), (20.0, 70.0));
        assert_eq!(state.current(), 70.0);
        assert_eq!(state.origin(), 20.0);
    }

    #[test]
    fn test_add_extends_from_origin() {
        let mut state = ProgressState::new();
        state.set(0.0, 30.0);
        assert_eq!(state.add(40.0), (0.0, 70.0));
        assert_eq!(state.current(), 70.0);
    }

    #[test]
    fn test_add_clamps_both_ways() {
        let mut state = ProgressState::new();
        state.set(0.0, 90.0);
        assert_eq!(state.add(30.0), (0.0, 100.0));
        assert_eq!(state.current(), 100.0);
        assert_eq!(state.add(-250.0), (0.0, 0.0));
        assert_eq!(state.current(), 0.0);
    }

    #[test]
    fn test_sequential_adds_match_single_set() {
        for (x, a, b) in [(10.0, 20.0, 30.0), (50.0, 40.0, 40.0), (60.0, -30.0, -50.0)] {
            let mut stepped = ProgressState::new();
            stepped.set(0.0, x);
            stepped.add(a);
            let stepped_range = stepped.add(b);

            let mut direct = ProgressState::new();
            direct.set(0.0, x);
            let direct_range = direct.set(0.0, clamp_percentage(x + a + b));

            assert_eq!(stepped_range.1, direct_range.1);
            assert_eq!(stepped.current(), direct.current());
        }
    }

    #[test]
    fn test_clear_keeps_direction() {
        let mut state = ProgressState::new();
        state.set_direction(Direction::Reverse);
        state.set(10.0, 40.0);
        state.clear();
        assert_eq!(state.current(), 0.0);
        assert_eq!(state.origin(), 0.0);
        assert_eq!(state.direction(), Direction::Reverse);
    }
}

use std::time::{Duration, Instant};

/// Delta time reported for the first frame, when no previous frame exists.
pub const DEFAULT_FRAME_DELTA: f64 = 1.0 / 60.0;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds elapsed since the previous tick (`DEFAULT_FRAME_DELTA` on the first tick).
    pub dt: f64,

    /// Monotonic timestamp taken at the tick. Marks the start of the frame's work.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// One clock per render loop. Clamps are optional; the render window only
/// uses a lower clamp so that `1 / dt` stays finite.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    frame_index: u64,
    dt_min: Option<Duration>,
    dt_max: Option<Duration>,
}

impl FrameClock {
    /// Creates a clock whose delta never drops below 1µs.
    pub fn new() -> Self {
        Self {
            last: None,
            frame_index: 0,
            dt_min: Some(Duration::from_micros(1)),
            dt_max: None,
        }
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Option<Duration>, dt_max: Option<Duration>) -> Self {
        if let (Some(min), Some(max)) = (dt_min, dt_max) {
            debug_assert!(min <= max);
        }
        Self {
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Forgets the previous timestamp; the next tick reports `DEFAULT_FRAME_DELTA`.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Advances the clock using the current time.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = match self.last {
            None => DEFAULT_FRAME_DELTA,
            Some(last) => {
                let mut dt = now.saturating_duration_since(last);
                if let Some(min) = self.dt_min {
                    dt = dt.max(min);
                }
                if let Some(max) = self.dt_max {
                    dt = dt.min(max);
                }
                dt.as_secs_f64()
            }
        };

        self.last = Some(now);

        let ft = FrameTime {
            dt,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_tick_uses_default_delta() {
        let mut clock = FrameClock::new();
        let ft = clock.tick_at(Instant::now());
        assert_relative_eq!(ft.dt, DEFAULT_FRAME_DELTA);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn later_ticks_measure_elapsed_time() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick_at(t0);
        let ft = clock.tick_at(t0 + Duration::from_millis(20));
        assert_relative_eq!(ft.dt, 0.020, epsilon = 1e-9);
        assert_eq!(ft.frame_index, 1);
    }

    #[test]
    fn clamps_apply() {
        let mut clock =
            FrameClock::with_clamps(Some(Duration::from_millis(1)), Some(Duration::from_millis(50)));
        let t0 = Instant::now();
        clock.tick_at(t0);
        assert_relative_eq!(clock.tick_at(t0).dt, 0.001, epsilon = 1e-9);
        let t1 = t0 + Duration::from_secs(2);
        assert_relative_eq!(clock.tick_at(t1).dt, 0.050, epsilon = 1e-9);
    }

    #[test]
    fn reset_restores_default_delta() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick_at(t0);
        clock.reset();
        assert_relative_eq!(clock.tick_at(t0 + Duration::from_secs(1)).dt, DEFAULT_FRAME_DELTA);
    }
}

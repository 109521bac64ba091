/// Number of samples in the moving-average window.
pub const FPS_SAMPLE_COUNT: usize = 100;

/// Simple moving average of the instantaneous frame rate.
///
/// Keeps the last `FPS_SAMPLE_COUNT` samples in a ring buffer together with
/// their running sum, so each update and query is O(1). The buffer starts
/// zeroed, so the average ramps up over the first `FPS_SAMPLE_COUNT` frames.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    samples: [f64; FPS_SAMPLE_COUNT],
    cursor: usize,
    sum: f64,
    average: f64,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            samples: [0.0; FPS_SAMPLE_COUNT],
            cursor: 0,
            sum: 0.0,
            average: 0.0,
        }
    }

    /// Records a completed frame that took `dt` seconds.
    ///
    /// Non-positive deltas are ignored.
    pub fn record_frame(&mut self, dt: f64) {
        if !(dt > 0.0) {
            log::debug!("FpsCounter: ignoring non-positive frame delta {dt}");
            return;
        }
        self.push_sample(1.0 / dt);
    }

    /// Writes one instantaneous FPS sample over the oldest one.
    pub fn push_sample(&mut self, fps: f64) {
        self.sum -= self.samples[self.cursor];
        self.samples[self.cursor] = fps;
        self.sum += fps;
        self.cursor = (self.cursor + 1) % FPS_SAMPLE_COUNT;
        self.average = self.sum / FPS_SAMPLE_COUNT as f64;
    }

    /// Current moving average.
    #[inline]
    pub fn average(&self) -> f64 {
        self.average
    }

    /// Samples ordered oldest to newest.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        let (newer, older) = self.samples.split_at(self.cursor);
        older.iter().chain(newer.iter()).copied()
    }

    /// Most recently written sample.
    pub fn latest(&self) -> f64 {
        let idx = (self.cursor + FPS_SAMPLE_COUNT - 1) % FPS_SAMPLE_COUNT;
        self.samples[idx]
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn starts_at_zero() {
        let fps = FpsCounter::new();
        assert_eq!(fps.average(), 0.0);
        assert!(fps.samples().all(|s| s == 0.0));
    }

    #[test]
    fn stabilizes_at_constant_rate() {
        let mut fps = FpsCounter::new();
        for _ in 0..FPS_SAMPLE_COUNT {
            fps.record_frame(1.0 / 60.0);
        }
        assert_relative_eq!(fps.average(), 60.0, epsilon = 1e-6);
    }

    #[test]
    fn warm_up_ramps_linearly() {
        let mut fps = FpsCounter::new();
        for _ in 0..50 {
            fps.record_frame(1.0 / 60.0);
        }
        assert_relative_eq!(fps.average(), 30.0, epsilon = 1e-6);
    }

    #[test]
    fn outlier_shifts_average_by_its_share() {
        let mut fps = FpsCounter::new();
        for _ in 0..FPS_SAMPLE_COUNT {
            fps.push_sample(60.0);
        }
        let before = fps.average();
        fps.push_sample(10.0);
        let shift = (fps.average() - before).abs();
        assert!(shift <= (10.0f64 - 60.0).abs() / FPS_SAMPLE_COUNT as f64 + 1e-9);
        assert_relative_eq!(fps.average(), 59.5, epsilon = 1e-9);
    }

    #[test]
    fn wraps_and_forgets_old_samples() {
        let mut fps = FpsCounter::new();
        for _ in 0..FPS_SAMPLE_COUNT {
            fps.push_sample(30.0);
        }
        for _ in 0..FPS_SAMPLE_COUNT {
            fps.push_sample(120.0);
        }
        assert_relative_eq!(fps.average(), 120.0, epsilon = 1e-6);
    }

    #[test]
    fn samples_are_chronological() {
        let mut fps = FpsCounter::new();
        for i in 0..(FPS_SAMPLE_COUNT + 3) {
            fps.push_sample(i as f64);
        }
        let v: Vec<f64> = fps.samples().collect();
        assert_eq!(v.len(), FPS_SAMPLE_COUNT);
        assert_eq!(v[0], 3.0);
        assert_eq!(*v.last().unwrap(), (FPS_SAMPLE_COUNT + 2) as f64);
        assert_eq!(fps.latest(), (FPS_SAMPLE_COUNT + 2) as f64);
    }

    #[test]
    fn zero_delta_is_ignored() {
        let mut fps = FpsCounter::new();
        fps.record_frame(0.0);
        assert_eq!(fps.average(), 0.0);
    }
}

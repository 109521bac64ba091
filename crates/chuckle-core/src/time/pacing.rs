use std::time::{Duration, Instant};

/// Optional frame-rate cap.
///
/// After a frame is presented the pacer sleeps for whatever remains of the
/// target frame period. Each frame is judged on its own: time lost to an
/// oversleep or a slow frame is not carried over.
#[derive(Debug, Clone, Default)]
pub struct FramePacer {
    target_fps: Option<f64>,
}

impl FramePacer {
    pub fn new(target_fps: Option<f64>) -> Self {
        let mut pacer = Self::default();
        if let Some(fps) = target_fps {
            pacer.set_target_fps(fps);
        }
        pacer
    }

    /// Sets the frame-rate cap. Non-positive or non-finite values remove it.
    pub fn set_target_fps(&mut self, fps: f64) {
        if fps > 0.0 && fps.is_finite() {
            self.target_fps = Some(fps);
        } else {
            log::warn!("FramePacer: ignoring invalid target fps {fps}; pacing disabled");
            self.target_fps = None;
        }
    }

    pub fn remove_target_fps(&mut self) {
        self.target_fps = None;
    }

    pub fn target_fps(&self) -> Option<f64> {
        self.target_fps
    }

    /// Target frame period, if a cap is set.
    pub fn frame_period(&self) -> Option<Duration> {
        self.target_fps.map(|fps| Duration::from_secs_f64(1.0 / fps))
    }

    /// Time left to sleep after a frame whose work took `work`.
    pub fn remaining(&self, work: Duration) -> Option<Duration> {
        let period = self.frame_period()?;
        period.checked_sub(work).filter(|d| !d.is_zero())
    }

    /// Blocks the calling thread for the rest of the frame that started at `frame_start`.
    ///
    /// Returns the duration slept.
    pub fn pace(&self, frame_start: Instant) -> Duration {
        match self.remaining(frame_start.elapsed()) {
            Some(sleep) => {
                std::thread::sleep(sleep);
                sleep
            }
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_target_never_sleeps() {
        let pacer = FramePacer::default();
        assert!(pacer.remaining(Duration::ZERO).is_none());
        assert_eq!(pacer.pace(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn short_frame_sleeps_remainder() {
        let pacer = FramePacer::new(Some(50.0));
        let rest = pacer.remaining(Duration::from_millis(5)).unwrap();
        assert_eq!(rest, Duration::from_millis(15));
    }

    #[test]
    fn long_frame_does_not_sleep() {
        let pacer = FramePacer::new(Some(50.0));
        assert!(pacer.remaining(Duration::from_millis(25)).is_none());
        assert!(pacer.remaining(Duration::from_millis(20)).is_none());
    }

    #[test]
    fn invalid_target_disables_pacing() {
        let mut pacer = FramePacer::new(Some(60.0));
        pacer.set_target_fps(0.0);
        assert!(pacer.target_fps().is_none());
        pacer.set_target_fps(f64::NAN);
        assert!(pacer.target_fps().is_none());
    }

    #[test]
    fn remove_clears_target() {
        let mut pacer = FramePacer::new(Some(30.0));
        pacer.remove_target_fps();
        assert!(pacer.frame_period().is_none());
    }
}

use crate::consts::MAX_FRAME_DT_MS;

/// Turns host timestamps (ms) into clamped per-frame deltas
///
/// A backgrounded tab can report a multi-second gap between frames; the
/// simulation only ever sees at most `MAX_FRAME_DT_MS` of it.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
    pub frame_count: u64,
    /// Frames whose delta had to be clamped
    pub clamped_frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta for this frame in ms (0 on the first frame)
    pub fn frame(&mut self, now_ms: f64) -> f32 {
        if !now_ms.is_finite() {
            log::warn!("Ignoring non-finite frame timestamp");
            return 0.0;
        }
        let raw = match self.last_ms {
            Some(last) => (now_ms - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        self.frame_count += 1;

        if raw > MAX_FRAME_DT_MS {
            self.clamped_frames += 1;
            log::debug!("Frame took {:.1}ms, clamping to {}ms", raw, MAX_FRAME_DT_MS);
            MAX_FRAME_DT_MS
        } else {
            raw
        }
    }

    /// Forget the last timestamp (e.g. after the tab becomes visible again)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frame(1000.0), 0.0);
        assert!((clock.frame(1016.0) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_long_gaps_are_clamped() {
        let mut clock = FrameClock::new();
        clock.frame(0.0);
        assert_eq!(clock.frame(5000.0), MAX_FRAME_DT_MS);
        assert_eq!(clock.clamped_frames, 1);
        // Time going backwards never produces a negative delta
        assert_eq!(clock.frame(4000.0), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new();
        clock.frame(0.0);
        clock.reset();
        assert_eq!(clock.frame(9000.0), 0.0);
    }

    #[test]
    fn test_non_finite_timestamp_is_skipped() {
        let mut clock = FrameClock::new();
        clock.frame(1000.0);
        assert_eq!(clock.frame(f64::NAN), 0.0);
        assert_eq!(clock.frame(1016.0), 16.0);
    }
}

//! Frame timing for the driver loop
//!
//! The driver calls `FrameClock::frame_dt` once per display refresh with the
//! timestamp the platform hands it (milliseconds) and feeds the result into
//! one simulation tick.

use crate::consts::{MAX_FRAME_DT, REFERENCE_DT};

/// Converts frame timestamps into clamped elapsed seconds
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed seconds since the previous frame
    ///
    /// The first frame after construction or `reset` reports one reference
    /// tick. Long stalls (tab switches, debugger breaks) are clamped to
    /// `MAX_FRAME_DT`; timestamps going backwards report zero.
    pub fn frame_dt(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => REFERENCE_DT,
        };
        self.last_ms = Some(now_ms);
        dt.clamp(0.0, MAX_FRAME_DT)
    }

    /// Forget the previous timestamp (after a pause or hidden tab)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Rolling frames-per-second estimate over the last 60 frames
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }
}

impl FpsCounter {
    /// Record a frame timestamp (ms) and return the current estimate
    pub fn record(&mut self, time_ms: f64) -> u32 {
        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest sample sits at the next write position
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time_ms - oldest;
            if elapsed > 0.0 {
                self.fps = ((self.frame_times.len() - 1) as f64 * 1000.0 / elapsed).round() as u32;
            }
        }
        self.fps
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_reference_tick() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frame_dt(1234.0), REFERENCE_DT);
    }

    #[test]
    fn test_elapsed_and_clamps() {
        let mut clock = FrameClock::new();
        clock.frame_dt(1000.0);
        assert!((clock.frame_dt(1020.0) - 0.02).abs() < 1e-6);
        // Five second stall
        assert_eq!(clock.frame_dt(6020.0), MAX_FRAME_DT);
        // Clock went backwards
        assert_eq!(clock.frame_dt(6000.0), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new();
        clock.frame_dt(1000.0);
        clock.reset();
        assert_eq!(clock.frame_dt(9000.0), REFERENCE_DT);
    }

    #[test]
    fn test_fps_at_60hz() {
        let mut counter = FpsCounter::default();
        let mut fps = 0;
        for i in 1..=120 {
            fps = counter.record(i as f64 * 1000.0 / 60.0);
        }
        assert_eq!(fps, 60);
    }
}

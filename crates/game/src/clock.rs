//! Fixed-timestep accumulator.
//!
//! Frames arrive with whatever wall-clock time the host measured; the
//! simulation only ever advances in whole ticks of `1 / tick_rate` seconds.
//! Each frame's time is clamped before it is accumulated so a stall (window
//! drag, debugger break) costs at most a few catch-up ticks.

use crate::config::LoopConfig;

/// Turns variable frame times into a count of fixed ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f64,
    max_frame_time: f64,
    accumulated: f64,
    paused: bool,
    total_ticks: u64,
}

impl FixedTimestep {
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            step: 1.0 / f64::from(config.tick_rate.max(1)),
            max_frame_time: f64::from(config.max_frame_time),
            accumulated: 0.0,
            paused: false,
            total_ticks: 0,
        }
    }

    /// Tick length in seconds.
    pub fn step(&self) -> f32 {
        self.step as f32
    }

    /// Add one frame's elapsed seconds and return how many ticks to run.
    ///
    /// Negative or NaN samples count as zero. Returns zero while paused.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        if self.paused {
            return 0;
        }

        let elapsed = f64::from(elapsed);
        let elapsed = if elapsed > 0.0 { elapsed.min(self.max_frame_time) } else { 0.0 };
        self.accumulated += elapsed;

        let mut ticks = 0;
        while self.accumulated >= self.step {
            self.accumulated -= self.step;
            ticks += 1;
        }

        self.total_ticks += u64::from(ticks);
        ticks
    }

    /// Fraction of a tick left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f32 {
        (self.accumulated / self.step) as f32
    }

    /// Stop scheduling ticks. Leftover time is dropped.
    pub fn pause(&mut self) {
        if !self.paused {
            log::info!("Simulation paused after {} ticks", self.total_ticks);
        }
        self.paused = true;
        self.accumulated = 0.0;
    }

    pub fn resume(&mut self) {
        if self.paused {
            log::info!("Simulation resumed");
        }
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Ticks scheduled since creation.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> FixedTimestep {
        FixedTimestep::new(&LoopConfig::default())
    }

    #[test]
    fn test_tick_count_independent_of_frame_split() {
        let step = 1.0 / 60.0;
        let splits: [&[f32]; 4] = [
            &[0.1; 30],
            &[1.0 / 144.0; 432],
            &[0.016, 0.017, 0.033, 0.05, 0.004, 0.08, 0.0, 0.1],
            &[0.0333, 0.0167, 0.02, 0.09, 0.011, 0.025, 0.0125, 0.0625],
        ];

        for samples in splits {
            let mut clock = clock();
            let total: f64 = samples.iter().map(|&s| f64::from(s)).sum();
            let ticks: u64 = samples.iter().map(|&s| u64::from(clock.advance(s))).sum();

            let expected = (total / step).floor() as i64;
            assert!(
                (ticks as i64 - expected).abs() <= 1,
                "total {total}: ran {ticks} ticks, expected {expected}"
            );
            assert_eq!(clock.total_ticks(), ticks);
        }
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut clock = clock();
        // A 5 second stall costs only max_frame_time worth of ticks.
        assert_eq!(clock.advance(5.0), 6);
        assert!(clock.alpha() < 1.0);
    }

    #[test]
    fn test_bad_samples_count_as_zero() {
        let mut clock = clock();
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.advance(f32::NAN), 0);
        assert_eq!(clock.alpha(), 0.0);
    }

    #[test]
    fn test_pause_drops_time_and_resume_restarts() {
        let mut clock = clock();
        clock.advance(0.01);
        assert!(clock.alpha() > 0.5);

        clock.pause();
        assert!(clock.is_paused());
        assert_eq!(clock.advance(0.1), 0);
        assert_eq!(clock.alpha(), 0.0);

        clock.resume();
        assert!(!clock.is_paused());
        assert_eq!(clock.advance(0.05), 3);
    }
}

/*
 * Timestep Module
 *
 * Fixed-timestep scheduling. Each presentation frame reports a timestamp;
 * elapsed wall-clock time is accumulated and converted into a whole number of
 * fixed simulation ticks, with the remainder exposed as an interpolation
 * factor for the renderer. Deltas longer than the stale-frame threshold (a
 * backgrounded window, a debugger pause) are thrown away instead of being
 * simulated as a catch-up burst.
 */

use std::time::Instant;

use log::debug;

// Upper bound on the ticks one frame may run; leftover whole steps are dropped
pub const MAX_TICKS_PER_FRAME: u32 = 240;

// Source of monotonically increasing timestamps in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

// Wall clock measured from construction
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

// What a single frame asks the simulation to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePlan {
    // Run this many fixed ticks (possibly zero)
    Run { ticks: u32 },
    // The delta exceeded the stale threshold and was dropped
    Discarded,
    // The loop is paused; nothing was measured
    Paused,
}

impl FramePlan {
    pub fn ticks(&self) -> u32 {
        match self {
            FramePlan::Run { ticks } => *ticks,
            FramePlan::Discarded | FramePlan::Paused => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FixedTimestep {
    then: f64,
    accumulator: f64,
    stale_threshold: f64,
    paused: bool,
}

impl FixedTimestep {
    pub fn new(stale_threshold: f64) -> Self {
        Self {
            then: 0.0,
            accumulator: 0.0,
            stale_threshold,
            paused: false,
        }
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    // Timestamp of the last measured frame
    pub fn baseline(&self) -> f64 {
        self.then
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_stale_threshold(&mut self, stale_threshold: f64) {
        self.stale_threshold = stale_threshold;
    }

    // Paused frames leave the baseline alone, so the first frame after resuming
    // sees the whole pause as one long delta and hits the stale guard
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    // Measure the frame at `now` and decide how many fixed ticks to run
    pub fn advance(&mut self, now: f64, fixed_step: f64) -> FramePlan {
        if self.paused {
            return FramePlan::Paused;
        }

        let delta = now - self.then;
        if delta > self.stale_threshold {
            debug!("discarding stale frame of {delta:.1}ms");
            self.then = now;
            return FramePlan::Discarded;
        }

        // A clock that went backwards contributes nothing
        self.accumulator += delta.max(0.0);
        self.then = now;

        let mut ticks = 0;
        if fixed_step > 0.0 {
            while self.accumulator >= fixed_step && ticks < MAX_TICKS_PER_FRAME {
                self.accumulator -= fixed_step;
                ticks += 1;
            }

            if self.accumulator >= fixed_step {
                debug!("frame hit the {MAX_TICKS_PER_FRAME} tick cap, dropping the backlog");
                self.accumulator %= fixed_step;
            }
        }

        FramePlan::Run { ticks }
    }

    // Fraction of a step left in the accumulator, for blending render state
    pub fn alpha(&self, fixed_step: f64) -> f32 {
        if fixed_step <= 0.0 {
            return 0.0;
        }
        (self.accumulator / fixed_step) as f32
    }
}

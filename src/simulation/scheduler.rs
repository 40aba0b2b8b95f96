//! Display-frame driven step scheduling
//!
//! Each display frame adds the target rate (steps per frame) to an
//! accumulator and runs one step per whole unit accumulated. Rates below one
//! give slow motion, rates above one run several generations per frame, and
//! the fractional remainder carries over between frames and across rate
//! changes.

/// Fractional-rate step scheduler
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    target_rate: f64,
    accumulator: f64,
    step_count: u64,
    frame_count: u64,
}

impl FrameScheduler {
    pub fn new(target_rate: f64) -> Self {
        Self {
            target_rate: sanitize_rate(target_rate),
            accumulator: 0.0,
            step_count: 0,
            frame_count: 0,
        }
    }

    /// Scheduler running at `2^exponent` steps per frame
    pub fn with_rate_exponent(exponent: i32) -> Self {
        Self::new(rate_from_exponent(exponent))
    }

    /// Account for one display frame and return how many steps are due
    ///
    /// The caller runs exactly that many steps, calling
    /// [`FrameScheduler::record_step`] after each, then renders once.
    pub fn on_frame(&mut self, _delta_ms: f64) -> u32 {
        self.frame_count += 1;
        self.accumulator += self.target_rate;

        let mut due = 0;
        while self.accumulator >= 1.0 {
            self.accumulator -= 1.0;
            due += 1;
        }
        due
    }

    pub fn record_step(&mut self) {
        self.step_count += 1;
    }

    /// Takes effect on the next frame; the accumulator is left untouched
    pub fn set_target_rate(&mut self, rate: f64) {
        self.target_rate = sanitize_rate(rate);
    }

    pub fn set_rate_exponent(&mut self, exponent: i32) {
        self.set_target_rate(rate_from_exponent(exponent));
    }

    /// Called by the resize path: a new grid starts at generation zero
    pub fn reset_steps(&mut self) {
        self.step_count = 0;
    }

    pub fn target_rate(&self) -> f64 {
        self.target_rate
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Generation of the active buffer
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

pub fn rate_from_exponent(exponent: i32) -> f64 {
    2f64.powi(exponent)
}

fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_finite() && rate >= 0.0 {
        rate
    } else {
        log::warn!("Ignoring invalid simulation rate {rate}, using 0");
        0.0
    }
}

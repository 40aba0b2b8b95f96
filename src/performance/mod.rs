//! # Throughput metrics
//!
//! Rolling frame and step statistics for the control panel. Each display frame
//! records its interval and the number of generations it ran; rates come from
//! the sums over the retained window, so frames that ran no step still count
//! toward the time base.
//!
//! ```rust
//! use std::time::Duration;
//! use lifegrid::performance::FrameStats;
//!
//! let mut stats = FrameStats::new();
//! stats.record_frame(Duration::from_millis(20), 2);
//! stats.record_frame(Duration::from_millis(20), 0);
//! assert_eq!(stats.metrics().steps_per_second.round(), 50.0);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

/// Snapshot of the current averages
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameMetrics {
    /// Frames per second over the window
    pub fps: f32,
    /// Mean frame interval in milliseconds
    pub frame_time_ms: f32,
    /// Generations simulated per second over the window
    pub steps_per_second: f32,
}

#[derive(Debug, Clone, Copy)]
struct FrameSample {
    interval: Duration,
    steps: u32,
}

/// Ring buffer of recent frames
pub struct FrameStats {
    samples: VecDeque<FrameSample>,
    max_samples: usize,
    metrics: FrameMetrics,
}

impl FrameStats {
    /// Keeps about two seconds of history at 60 Hz
    pub fn new() -> Self {
        Self::with_capacity(120)
    }

    pub fn with_capacity(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
            metrics: FrameMetrics::default(),
        }
    }

    /// Add one display frame and refresh the averages
    pub fn record_frame(&mut self, interval: Duration, steps: u32) {
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(FrameSample { interval, steps });
        self.update_metrics();
    }

    fn update_metrics(&mut self) {
        let total: Duration = self.samples.iter().map(|s| s.interval).sum();
        let seconds = total.as_secs_f32();
        if seconds <= 0.0 {
            self.metrics = FrameMetrics::default();
            return;
        }

        let frames = self.samples.len() as f32;
        let steps: u64 = self.samples.iter().map(|s| s.steps as u64).sum();
        self.metrics = FrameMetrics {
            fps: frames / seconds,
            frame_time_ms: seconds * 1000.0 / frames,
            steps_per_second: steps as f32 / seconds,
        };
    }

    pub fn metrics(&self) -> FrameMetrics {
        self.metrics
    }

    /// Frame intervals in milliseconds, oldest first
    pub fn frame_time_history(&self) -> Vec<f32> {
        self.samples
            .iter()
            .map(|s| s.interval.as_secs_f32() * 1000.0)
            .collect()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.metrics = FrameMetrics::default();
    }

    /// Compact FPS readout with a frame-time graph in the top-right corner
    pub fn render_overlay(&self, ui: &imgui::Ui) {
        let display_size = ui.io().display_size;
        let metrics = &self.metrics;

        let history = self.frame_time_history();

        ui.window("FPS")
            .size([150.0, 100.0], imgui::Condition::Always)
            .position([display_size[0] - 160.0, 10.0], imgui::Condition::Always)
            .no_decoration()
            .no_inputs()
            .bg_alpha(0.3)
            .build(|| {
                ui.text(format!("FPS: {:.0}", metrics.fps));
                ui.text(format!("{:.1} steps/s", metrics.steps_per_second));
                if !history.is_empty() {
                    ui.plot_lines("##frame_times", &history)
                        .graph_size([134.0, 30.0])
                        .scale_min(0.0)
                        .scale_max(50.0)
                        .build();
                }
            });
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = FrameStats::new();
        assert_eq!(stats.metrics(), FrameMetrics::default());
    }

    #[test]
    fn test_rates_over_window() {
        let mut stats = FrameStats::new();
        for i in 0..10 {
            stats.record_frame(Duration::from_millis(10), i % 2);
        }
        let metrics = stats.metrics();
        assert!((metrics.fps - 100.0).abs() < 0.01);
        assert!((metrics.frame_time_ms - 10.0).abs() < 0.01);
        assert!((metrics.steps_per_second - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_window_drops_oldest() {
        let mut stats = FrameStats::with_capacity(2);
        stats.record_frame(Duration::from_millis(100), 0);
        stats.record_frame(Duration::from_millis(10), 1);
        stats.record_frame(Duration::from_millis(10), 1);
        assert_eq!(stats.frame_time_history().len(), 2);
        assert!((stats.metrics().fps - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_zero_interval_frames() {
        let mut stats = FrameStats::new();
        stats.record_frame(Duration::ZERO, 3);
        assert_eq!(stats.metrics().steps_per_second, 0.0);
        stats.reset();
        assert!(stats.frame_time_history().is_empty());
    }
}

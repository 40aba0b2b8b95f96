//! Startup configuration
//!
//! Defaults: a 64x64 grid drawn at 4 pixels per cell, one generation per
//! display frame and a plus-shaped brush.

use crate::error::{LifeError, LifeResult};
use crate::simulation::grid::GridDimensions;

/// Largest pixel scale exponent offered by the UI (2^4 = 16 px per cell)
pub const MAX_PIXEL_SCALE_EXPONENT: u32 = 4;
/// Rate exponent range offered by the UI (1/16 .. 16 steps per frame)
pub const RATE_EXPONENT_RANGE: (i32, i32) = (-4, 4);
pub const MAX_BRUSH_SIZE: u32 = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct LifeConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    /// Cell size on screen is `2^pixel_scale_exponent` pixels
    pub pixel_scale_exponent: u32,
    /// Simulation rate is `2^rate_exponent` steps per display frame
    pub rate_exponent: i32,
    pub brush_size: u32,
    /// Probability that a cell starts alive after a (re)seed
    pub alive_probability: f64,
    /// Fixed RNG seed for reproducible reseeding
    pub seed: Option<u64>,
    pub window_title: String,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            grid_width: 64,
            grid_height: 64,
            pixel_scale_exponent: 2,
            rate_exponent: 0,
            brush_size: 1,
            alive_probability: 0.4,
            seed: None,
            window_title: "lifegrid".to_string(),
        }
    }
}

impl LifeConfig {
    pub fn with_grid_size(mut self, width: u32, height: u32) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    pub fn with_pixel_scale_exponent(mut self, exponent: u32) -> Self {
        self.pixel_scale_exponent = exponent;
        self
    }

    pub fn with_rate_exponent(mut self, exponent: i32) -> Self {
        self.rate_exponent = exponent;
        self
    }

    pub fn with_brush_size(mut self, size: u32) -> Self {
        self.brush_size = size;
        self
    }

    pub fn with_alive_probability(mut self, probability: f64) -> Self {
        self.alive_probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Apply `LIFE_*` environment overrides on top of the defaults
    ///
    /// Recognised variables: `LIFE_GRID_WIDTH`, `LIFE_GRID_HEIGHT`,
    /// `LIFE_RATE_EXP`, `LIFE_SEED`.
    pub fn from_env() -> LifeResult<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> LifeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(width) = parse_var(&lookup, "LIFE_GRID_WIDTH")? {
            self.grid_width = width;
        }
        if let Some(height) = parse_var(&lookup, "LIFE_GRID_HEIGHT")? {
            self.grid_height = height;
        }
        if let Some(exponent) = parse_var(&lookup, "LIFE_RATE_EXP")? {
            self.rate_exponent = exponent;
        }
        if let Some(seed) = parse_var(&lookup, "LIFE_SEED")? {
            self.seed = Some(seed);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> LifeResult<()> {
        GridDimensions::new(self.grid_width, self.grid_height)?;

        if self.pixel_scale_exponent > MAX_PIXEL_SCALE_EXPONENT {
            return Err(LifeError::InvalidConfig(format!(
                "pixel scale exponent {} exceeds {}",
                self.pixel_scale_exponent, MAX_PIXEL_SCALE_EXPONENT
            )));
        }
        let (min_rate, max_rate) = RATE_EXPONENT_RANGE;
        if !(min_rate..=max_rate).contains(&self.rate_exponent) {
            return Err(LifeError::InvalidConfig(format!(
                "rate exponent {} outside {}..={}",
                self.rate_exponent, min_rate, max_rate
            )));
        }
        if self.brush_size > MAX_BRUSH_SIZE {
            return Err(LifeError::InvalidConfig(format!(
                "brush size {} exceeds {}",
                self.brush_size, MAX_BRUSH_SIZE
            )));
        }
        if !(0.0..=1.0).contains(&self.alive_probability) {
            return Err(LifeError::InvalidConfig(format!(
                "alive probability {} outside 0..=1",
                self.alive_probability
            )));
        }
        Ok(())
    }

    /// Canvas size in physical pixels for the configured grid
    pub fn canvas_size(&self) -> (u32, u32) {
        canvas_size(self.grid_width, self.grid_height, self.pixel_scale_exponent)
    }
}

/// Canvas size for a grid drawn at `2^pixel_scale_exponent` pixels per cell
pub fn canvas_size(grid_width: u32, grid_height: u32, pixel_scale_exponent: u32) -> (u32, u32) {
    let scale = 1u32 << pixel_scale_exponent.min(MAX_PIXEL_SCALE_EXPONENT);
    (
        grid_width.saturating_mul(scale),
        grid_height.saturating_mul(scale),
    )
}

/// Scale `size` down so neither side exceeds `max_side`, keeping its aspect ratio
pub fn clamp_canvas(size: (u32, u32), max_side: u32) -> (u32, u32) {
    let (width, height) = size;
    let longest = width.max(height);
    if longest <= max_side || max_side == 0 {
        return size;
    }
    let shrink = |side: u32| ((side as u64 * max_side as u64) / longest as u64).max(1) as u32;
    (shrink(width), shrink(height))
}

fn parse_var<T, F>(lookup: &F, key: &str) -> LifeResult<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| LifeError::InvalidConfig(format!("{key}={raw:?} is not a valid value"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = LifeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.canvas_size(), (256, 256));
    }

    #[test]
    fn test_canvas_clamped_to_surface_limit() {
        // 1024 cells at 4 px each
        let canvas = canvas_size(1024, 256, 2);
        assert_eq!(canvas, (4096, 1024));
        assert_eq!(clamp_canvas(canvas, 2048), (2048, 512));
        assert_eq!(clamp_canvas(canvas_size(1024, 1024, 4), 2048), (2048, 2048));
        assert_eq!(clamp_canvas((3000, 1), 1000), (1000, 1));
        assert_eq!(clamp_canvas((256, 256), 2048), (256, 256));
    }

    #[test]
    fn test_env_overrides() {
        let config = LifeConfig::default()
            .with_overrides(lookup(&[
                ("LIFE_GRID_WIDTH", "100"),
                ("LIFE_GRID_HEIGHT", " 50 "),
                ("LIFE_RATE_EXP", "-2"),
                ("LIFE_SEED", "7"),
            ]))
            .unwrap();
        assert_eq!((config.grid_width, config.grid_height), (100, 50));
        assert_eq!(config.rate_exponent, -2);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_malformed_override_rejected() {
        let result = LifeConfig::default().with_overrides(lookup(&[("LIFE_GRID_WIDTH", "wide")]));
        assert!(matches!(result, Err(LifeError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(LifeConfig::default().with_grid_size(0, 10).validate().is_err());
        assert!(LifeConfig::default().with_rate_exponent(9).validate().is_err());
        assert!(LifeConfig::default()
            .with_alive_probability(1.5)
            .validate()
            .is_err());
    }
}

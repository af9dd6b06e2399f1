//! Animation configuration
//!
//! Every tunable lives here. Defaults reproduce the stock animation; a JSON
//! file can override any subset of fields.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::display::PixelBuffer;
use crate::error::{Error, Result};
use crate::util::{parse_hex_color, Rgb};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Canvas resolution in pixels
    pub width: u32,
    pub height: u32,
    /// Window size relative to the canvas
    pub window_scale: f32,
    pub vsync: bool,
    pub background: String,
    pub particles: ParticleConfig,
    pub timing: TimingConfig,
    pub motion: MotionConfig,
    pub sampler: SamplerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Exactly three colors, one per swatch
    pub palette: [String; 3],
    pub size_min: f32,
    pub size_max: f32,
    /// Each initial velocity component is drawn from [-speed, speed)
    pub speed: f32,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub converge_at_ms: u64,
    pub settle_at_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Velocity kept (and inverted) on a wall bounce
    pub restitution: f32,
    /// Per-frame velocity multiplier while expanding
    pub friction: f32,
    /// Fraction of the remaining distance covered per frame
    pub converge_rate: f32,
    pub settle_rate: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SamplerConfig {
    /// Side of the square the logo is rasterized into
    pub analysis_size: u32,
    /// Largest share of the analysis square the logo may occupy
    pub fill_ratio: f32,
    pub stride: u32,
    /// Red channel below this counts as part of the logo
    pub threshold: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 1350,
            height: 1920,
            window_scale: 0.5,
            vsync: true,
            background: "#f1f1f1".into(),
            particles: ParticleConfig::default(),
            timing: TimingConfig::default(),
            motion: MotionConfig::default(),
            sampler: SamplerConfig::default(),
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 1500,
            palette: ["#ff0000".into(), "#0000ff".into(), "#ffff00".into()],
            size_min: 2.0,
            size_max: 5.0,
            speed: 5.0,
            seed: None,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            converge_at_ms: 3000,
            settle_at_ms: 6000,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            restitution: 0.8,
            friction: 0.99,
            converge_rate: 0.05,
            settle_rate: 0.2,
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            analysis_size: 300,
            fill_ratio: 0.8,
            stride: 2,
            threshold: 128,
        }
    }
}

impl Config {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(Error::InvalidConfig(msg.to_string()));

        if self.width == 0 || self.height == 0 {
            return invalid("canvas width and height must be non-zero");
        }
        if PixelBuffer::byte_len(self.width, self.height).is_none() {
            return invalid("canvas is too large for a pixel buffer");
        }
        if !(self.window_scale > 0.0) {
            return invalid("window_scale must be positive");
        }
        if self.particles.count == 0 {
            return invalid("particle count must be non-zero");
        }
        if !(self.particles.size_min > 0.0 && self.particles.size_min <= self.particles.size_max) {
            return invalid("particle size range must satisfy 0 < size_min <= size_max");
        }
        if !(self.particles.speed >= 0.0) {
            return invalid("particle speed must be non-negative");
        }
        if self.timing.settle_at_ms < self.timing.converge_at_ms {
            return invalid("settle_at_ms must not come before converge_at_ms");
        }
        let in_unit = |v: f32| v > 0.0 && v <= 1.0;
        let m = &self.motion;
        if !(in_unit(m.restitution) && in_unit(m.friction)) {
            return invalid("restitution and friction must be in (0, 1]");
        }
        if !(in_unit(m.converge_rate) && in_unit(m.settle_rate)) {
            return invalid("converge_rate and settle_rate must be in (0, 1]");
        }
        if self.sampler.analysis_size == 0 || self.sampler.stride == 0 {
            return invalid("sampler analysis_size and stride must be non-zero");
        }
        let side = self.sampler.analysis_size;
        if PixelBuffer::byte_len(side, side).is_none() {
            return invalid("sampler analysis_size is too large for a pixel buffer");
        }
        if !in_unit(self.sampler.fill_ratio) {
            return invalid("sampler fill_ratio must be in (0, 1]");
        }

        self.background_rgb()?;
        self.palette_rgb()?;
        Ok(())
    }

    pub fn background_rgb(&self) -> Result<Rgb> {
        color(&self.background)
    }

    pub fn palette_rgb(&self) -> Result<[Rgb; 3]> {
        let p = &self.particles.palette;
        Ok([color(&p[0])?, color(&p[1])?, color(&p[2])?])
    }

    pub fn converge_at(&self) -> Duration {
        Duration::from_millis(self.timing.converge_at_ms)
    }

    pub fn settle_at(&self) -> Duration {
        Duration::from_millis(self.timing.settle_at_ms)
    }

    /// Window size after scaling, never smaller than 1x1
    pub fn window_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.window_scale).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

fn color(s: &str) -> Result<Rgb> {
    parse_hex_color(s).ok_or_else(|| Error::InvalidConfig(format!("bad color '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.palette_rgb().unwrap()[0], (255, 0, 0));
        assert_eq!(config.background_rgb().unwrap(), (0xf1, 0xf1, 0xf1));
        assert_eq!(config.converge_at(), Duration::from_millis(3000));
        assert_eq!(config.settle_at(), Duration::from_millis(6000));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "width": 400, "particles": { "count": 12 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.width, 400);
        assert_eq!(config.height, 1920);
        assert_eq!(config.particles.count, 12);
        assert_eq!(config.particles.size_max, 5.0);
        assert_eq!(config.motion.restitution, 0.8);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.particles.count = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.timing.settle_at_ms = 1000;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.particles.palette[1] = "blue".into();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.sampler.stride = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.width = 40_000;
        config.height = 40_000;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.sampler.analysis_size = 100_000;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.motion.settle_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_size_scales() {
        let config = Config::default();
        assert_eq!(config.window_size(), (675, 960));
    }

    #[test]
    fn test_save_load_file() {
        let path = std::env::temp_dir().join(format!("emblem-burst-{}.json", std::process::id()));
        let mut config = Config::default();
        config.particles.seed = Some(99);
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}

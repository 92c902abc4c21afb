use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::fractal::{
    DEFAULT_BAILOUT_RADIUS, DEFAULT_JULIA_CONSTANT, DEFAULT_MAX_ITERATIONS, EscapeParams,
    julia_preset,
};
use crate::math::{C, Coordinate};

/// Axis-aligned box in the complex plane that `random` samples from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Region {
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.x_min..self.x_max).contains(&point.x()) && (self.y_min..self.y_max).contains(&point.y())
    }
}

impl Default for Region {
    fn default() -> Self {
        Region { x_min: -2.0, x_max: 0.6, y_min: -1.2, y_max: 1.2 }
    }
}

/// Either a preset name ("spiral") or an explicit `[re, im]` pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JuliaConstant {
    Preset(String),
    Value([f64; 2]),
}

impl Default for JuliaConstant {
    fn default() -> Self {
        JuliaConstant::Value([DEFAULT_JULIA_CONSTANT.re, DEFAULT_JULIA_CONSTANT.im])
    }
}

impl JuliaConstant {
    pub fn resolve(&self) -> Result<C> {
        match self {
            JuliaConstant::Preset(name) => julia_preset(name)
                .ok_or_else(|| Error::invalid(format!("unknown julia preset: {}", name))),
            JuliaConstant::Value([re, im]) => Ok(C::new(*re, *im)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_iterations: u32,
    pub bailout_radius: f64,
    pub julia_constant: JuliaConstant,
    pub default_poem_lines: usize,
    pub max_poem_lines: usize,
    pub journey_steps: usize,
    pub move_step: f64,
    pub zoom_factor: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub coordinate_limit: f64,
    pub interesting_region: Region,
    pub ascii_width: usize,
    pub ascii_height: usize,
    pub color_width: usize,
    pub color_height: usize,
    pub art_width: u32,
    pub art_height: u32,
    /// Session seed; a fresh one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            bailout_radius: DEFAULT_BAILOUT_RADIUS,
            julia_constant: JuliaConstant::default(),
            default_poem_lines: 8,
            max_poem_lines: 50,
            journey_steps: 5,
            move_step: 0.1,
            zoom_factor: 2.0,
            min_zoom: 1e-3,
            max_zoom: 1e12,
            coordinate_limit: 10.0,
            interesting_region: Region::default(),
            ascii_width: 60,
            ascii_height: 15,
            color_width: 40,
            color_height: 12,
            art_width: 400,
            art_height: 300,
            seed: None,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Config = toml::from_str(&text)?;
        config.validate()?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::invalid("max_iterations must be greater than zero"));
        }
        if !(self.bailout_radius.is_finite() && self.bailout_radius > 0.0) {
            return Err(Error::invalid("bailout_radius must be positive"));
        }
        if self.max_poem_lines == 0 || self.default_poem_lines == 0 {
            return Err(Error::invalid("poem line counts must be greater than zero"));
        }
        // the viewport half-size 2 / zoom must stay finite
        if !(self.min_zoom > 0.0
            && (2.0 / self.min_zoom).is_finite()
            && self.min_zoom <= self.max_zoom
            && self.max_zoom.is_finite())
        {
            return Err(Error::invalid("zoom bounds must satisfy 0 < min_zoom <= max_zoom"));
        }
        if !(self.move_step.is_finite() && self.move_step > 0.0) {
            return Err(Error::invalid("move_step must be positive"));
        }
        if !(self.zoom_factor.is_finite() && self.zoom_factor > 0.0) {
            return Err(Error::invalid("zoom_factor must be positive"));
        }
        if !(self.coordinate_limit.is_finite() && self.coordinate_limit > 0.0) {
            return Err(Error::invalid("coordinate_limit must be positive"));
        }
        let r = &self.interesting_region;
        if !(r.x_min < r.x_max && r.y_min < r.y_max) {
            return Err(Error::invalid("interesting_region bounds are inverted"));
        }
        self.julia_constant.resolve()?;
        Ok(())
    }

    pub fn escape_params(&self) -> Result<EscapeParams> {
        Ok(EscapeParams {
            max_iterations: self.max_iterations,
            bailout_radius: self.bailout_radius,
            julia_constant: self.julia_constant.resolve()?,
        })
    }
}

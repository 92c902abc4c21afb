use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::math::{C, Coordinate};

pub const DEFAULT_MAX_ITERATIONS: u32 = 100;
pub const DEFAULT_BAILOUT_RADIUS: f64 = 2.0;
pub const DEFAULT_JULIA_CONSTANT: C = C { re: -0.7, im: 0.27015 };

/// Named Julia constants worth looking at.
pub const JULIA_PRESETS: &[(&str, C)] = &[
    ("classic", DEFAULT_JULIA_CONSTANT),
    ("spiral", C { re: -0.8, im: 0.156 }),
    ("dragon", C { re: 0.285, im: 0.01 }),
    ("snowflake", C { re: -0.4, im: 0.6 }),
];

pub fn julia_preset(name: &str) -> Option<C> {
    JULIA_PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
        .map(|(_, c)| *c)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractalKind {
    #[default]
    Mandelbrot,
    Julia,
}

impl FractalKind {
    pub const ALL: &'static [Self] = &[Self::Mandelbrot, Self::Julia];

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Mandelbrot => "Mandelbrot",
            Self::Julia => "Julia",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Mandelbrot => "mandelbrot",
            Self::Julia => "julia",
        }
    }
}

impl fmt::Display for FractalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FractalKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FractalKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid(format!("unknown fractal type: {}", s)))
    }
}

/// Escape-time metrics for one point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FractalResult {
    pub iterations: u32,
    pub escaped: bool,
    /// Modulus of z when iteration stopped.
    pub magnitude: f64,
    pub kind: FractalKind,
    pub max_iterations: u32,
}

impl FractalResult {
    /// Fraction of the iteration budget used before stopping, in [0, 1].
    pub fn stability(&self) -> f64 {
        if self.max_iterations == 0 {
            return 1.0;
        }
        self.iterations as f64 / self.max_iterations as f64
    }

    /// Near the boundary: neither escaped at once nor trapped for good.
    pub fn is_interesting(&self) -> bool {
        let s = self.stability();
        self.escaped && s > 0.3 && s < 0.95
    }
}

/// Everything the escape loop needs besides the point itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EscapeParams {
    pub max_iterations: u32,
    pub bailout_radius: f64,
    pub julia_constant: C,
}

impl Default for EscapeParams {
    fn default() -> Self {
        EscapeParams {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            bailout_radius: DEFAULT_BAILOUT_RADIUS,
            julia_constant: DEFAULT_JULIA_CONSTANT,
        }
    }
}

impl EscapeParams {
    pub fn with_julia_constant(self, julia_constant: C) -> Self {
        EscapeParams { julia_constant, ..self }
    }

    pub fn evaluate(&self, coord: Coordinate, kind: FractalKind) -> FractalResult {
        let (z0, c) = match kind {
            FractalKind::Mandelbrot => (C::new(0.0, 0.0), coord.to_c()),
            FractalKind::Julia => (coord.to_c(), self.julia_constant),
        };
        escape(z0, c, kind, self.max_iterations, self.bailout_radius)
    }
}

/// Evaluates a point with the default Julia constant.
pub fn evaluate(
    coord: Coordinate,
    kind: FractalKind,
    max_iterations: u32,
    bailout_radius: f64,
) -> FractalResult {
    EscapeParams {
        max_iterations,
        bailout_radius,
        julia_constant: DEFAULT_JULIA_CONSTANT,
    }
    .evaluate(coord, kind)
}

fn escape(z0: C, c: C, kind: FractalKind, max_iterations: u32, bailout_radius: f64) -> FractalResult {
    let mut z = z0;
    let mut magnitude = z.abs();

    for i in 0..max_iterations {
        magnitude = z.abs();
        if magnitude > bailout_radius {
            return FractalResult {
                iterations: i,
                escaped: true,
                magnitude,
                kind,
                max_iterations,
            };
        }
        z = z.mul(z).add(c);
    }

    FractalResult {
        iterations: max_iterations,
        escaped: false,
        magnitude,
        kind,
        max_iterations,
    }
}

/// Samples a spiral around `coord` and keeps the points near the set boundary.
pub fn find_nearby_interesting_points(
    params: &EscapeParams,
    coord: Coordinate,
    kind: FractalKind,
    radius: f64,
    samples: usize,
) -> Vec<Coordinate> {
    let mut points = Vec::new();

    for i in 0..samples {
        let angle = (i as f64 / samples as f64) * 2.0 * std::f64::consts::PI;
        let r = radius * (i as f64 / samples as f64).sqrt();
        let candidate = coord.offset(r * angle.cos(), r * angle.sin());

        if params.evaluate(candidate, kind).is_interesting() {
            points.push(candidate);
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes_mandelbrot() {
        for max in [0, 1, 10, 100, 1000] {
            let result = evaluate(Coordinate::ORIGIN, FractalKind::Mandelbrot, max, 2.0);
            assert!(!result.escaped);
            assert_eq!(result.iterations, max);
            assert_eq!(result.magnitude, 0.0);
        }
    }

    #[test]
    fn far_point_escapes_within_one_iteration() {
        let result = evaluate(Coordinate::new(3.0, 1.0), FractalKind::Mandelbrot, 100, 2.0);
        assert!(result.escaped);
        assert!(result.iterations <= 1);
        assert!(result.magnitude > 2.0);
    }

    #[test]
    fn matches_direct_iteration() {
        let (cx, cy) = (-0.7_f64, 0.0_f64);
        let (mut x, mut y) = (0.0_f64, 0.0_f64);
        let mut expected = None;
        for i in 0..100u32 {
            if x * x + y * y > 4.0 {
                expected = Some(i);
                break;
            }
            let xt = x * x - y * y + cx;
            y = 2.0 * x * y + cy;
            x = xt;
        }

        let result = evaluate(Coordinate::new(cx, cy), FractalKind::Mandelbrot, 100, 2.0);
        match expected {
            Some(i) => {
                assert!(result.escaped);
                assert_eq!(result.iterations, i);
            }
            None => {
                assert!(!result.escaped);
                assert_eq!(result.iterations, 100);
            }
        }
    }

    #[test]
    fn julia_starts_from_the_coordinate() {
        let result = evaluate(Coordinate::new(2.5, 0.0), FractalKind::Julia, 50, 2.0);
        assert!(result.escaped);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.magnitude, 2.5);
        assert_eq!(result.kind, FractalKind::Julia);
    }

    #[test]
    fn julia_constant_is_configurable() {
        let params = EscapeParams::default().with_julia_constant(C::new(0.0, 0.0));
        // z -> z² from 0.5 converges to 0
        let result = params.evaluate(Coordinate::new(0.5, 0.0), FractalKind::Julia);
        assert!(!result.escaped);
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Julia".parse::<FractalKind>().unwrap(), FractalKind::Julia);
        assert_eq!("mandelbrot".parse::<FractalKind>().unwrap(), FractalKind::Mandelbrot);
        assert!("newton".parse::<FractalKind>().is_err());
    }

    #[test]
    fn presets_resolve_by_name() {
        assert_eq!(julia_preset("SPIRAL"), Some(C::new(-0.8, 0.156)));
        assert_eq!(julia_preset("nope"), None);
    }

    #[test]
    fn interesting_points_lie_near_boundary() {
        let params = EscapeParams::default();
        let points = find_nearby_interesting_points(
            &params,
            Coordinate::new(-0.75, 0.1),
            FractalKind::Mandelbrot,
            0.2,
            64,
        );
        for p in points {
            assert!(params.evaluate(p, FractalKind::Mandelbrot).is_interesting());
        }
    }
}

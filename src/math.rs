use std::f64::consts::PI;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct C {
    pub re: f64,
    pub im: f64,
}

impl C {
    pub fn new(re: f64, im: f64) -> Self {
        C { re, im }
    }

    pub fn abs_sq(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    pub fn abs(&self) -> f64 {
        self.abs_sq().sqrt()
    }

    pub fn add(&self, other: C) -> C {
        C::new(self.re + other.re, self.im + other.im)
    }

    pub fn mul(&self, other: C) -> C {
        C::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re
        )
    }
}

/// A point in the complex plane as the user navigates it.
///
/// Fields are private so a coordinate never changes after creation;
/// navigation produces new coordinates instead.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    x: f64,
    y: f64,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Coordinate { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn to_c(&self) -> C {
        C::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Coordinate {
        Coordinate::new(self.x + dx, self.y + dy)
    }

    pub fn clamp(&self, limit: f64) -> Coordinate {
        Coordinate::new(self.x.clamp(-limit, limit), self.y.clamp(-limit, limit))
    }

    /// Angle in [0, 2π), measured counter-clockwise from the positive real axis.
    pub fn angle(&self) -> f64 {
        let theta = self.y.atan2(self.x);
        if theta < 0.0 { theta + 2.0 * PI } else { theta }
    }

    /// Quadrant index 0..4 of the angle. The origin falls in quadrant 0.
    pub fn quadrant(&self) -> usize {
        ((self.angle() / (PI / 2.0)) as usize).min(3)
    }
}

//! Field geometry shared by every safety and targeting check.

use serde::{Deserialize, Serialize};

/// A point on the pitch, in simulator units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Heading from `self` towards `other`, in degrees.
    pub fn bearing_to(self, other: Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }
}

/// Rectangular playing area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// The process-wide pitch.
pub const FIELD: FieldBounds = FieldBounds {
    x_min: -52.5,
    x_max: 52.5,
    y_min: -34.0,
    y_max: 34.0,
};

impl FieldBounds {
    /// Clamp `p` into the rectangle shrunk by `inset` on every side.
    pub fn clamp_inset(&self, p: Point, inset: f64) -> Point {
        Point {
            x: p.x.clamp(self.x_min + inset, self.x_max - inset),
            y: p.y.clamp(self.y_min + inset, self.y_max - inset),
        }
    }

    pub fn contains_inset(&self, p: Point, inset: f64) -> bool {
        p.x >= self.x_min + inset
            && p.x <= self.x_max - inset
            && p.y >= self.y_min + inset
            && p.y <= self.y_max - inset
    }
}

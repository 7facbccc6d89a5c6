//! Three-axis locations of the print head

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Position of the print head in 3D space
///
/// Immutable value; all arithmetic returns a new location.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl Location {
    /// Create a location from its three axes
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        debug_assert!(
            x.is_finite() && y.is_finite() && z.is_finite(),
            "Location axes must be finite: x={x}, y={y}, z={z}"
        );
        Self { x, y, z }
    }

    /// Location at the machine origin
    pub fn origin() -> Self {
        Self::default()
    }

    /// Replace the axes that are present, keeping the others from `self`
    pub fn with_axes(&self, x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Self {
        Self::new(
            x.unwrap_or(self.x),
            y.unwrap_or(self.y),
            z.unwrap_or(self.z),
        )
    }

    /// Euclidean length of this location taken as a vector
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Squared length of this location taken as a vector
    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Distance to another location
    pub fn distance(&self, other: &Location) -> f64 {
        (*self - *other).length()
    }

    /// Squared distance to another location
    pub fn distance_squared(&self, other: &Location) -> f64 {
        (*self - *other).length_squared()
    }

    /// Point `distance` back from `self` towards `from`, along the segment `from -> self`
    ///
    /// Returns `None` for a zero-length segment.
    pub fn back_towards(&self, from: &Location, distance: f64) -> Option<Location> {
        let segment = *from - *self;
        let segment_length = segment.length();
        if segment_length <= 0.0 {
            return None;
        }
        Some(*self + segment * (distance / segment_length))
    }
}

impl Add for Location {
    type Output = Location;

    fn add(self, rhs: Location) -> Location {
        Location::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Location {
    type Output = Location;

    fn sub(self, rhs: Location) -> Location {
        Location::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Location {
    type Output = Location;

    fn mul(self, scale: f64) -> Location {
        Location::new(self.x * scale, self.y * scale, self.z * scale)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{:.3} Y:{:.3} Z:{:.3}", self.x, self.y, self.z)
    }
}

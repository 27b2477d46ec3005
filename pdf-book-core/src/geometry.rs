//! Small 2D primitives shared by the page map and the viewport engine.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A 2D offset or position in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vector) -> f32 {
        (self - other).length()
    }

    pub fn midpoint(self, other: Vector) -> Vector {
        Vector::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f32) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

/// Width and height, either in renderer units or screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A size with a non-positive (or NaN) side cannot be laid out.
    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn scale(self, factor: f32) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }

    pub fn center(self) -> Vector {
        Vector::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `size` centered on `center`.
    pub fn centered(center: Vector, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn center(&self) -> Vector {
        Vector::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A pan offset plus a zoom multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub pan: Vector,
    pub zoom: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        pan: Vector::ZERO,
        zoom: 1.0,
    };

    pub const fn new(pan: Vector, zoom: f32) -> Self {
        Self { pan, zoom }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Resistance curve for a value dragged `distance` past a limit.
///
/// Grows without bound but ever more slowly, approaching
/// `dimension / constant` asymptotically.
pub fn rubberband(distance: f32, dimension: f32, constant: f32) -> f32 {
    if dimension == 0.0 || dimension.is_infinite() {
        return distance.powf(constant * 5.0);
    }
    (distance * dimension * constant) / (dimension + constant * distance)
}

/// Passes `value` through unchanged inside `[min, max]` and rubber-bands the
/// overshoot outside of it.
pub fn rubberband_if_out_of_bounds(value: f32, min: f32, max: f32, constant: f32) -> f32 {
    if constant == 0.0 {
        return value.clamp(min, max);
    }
    let dimension = max - min;
    if value < min {
        min - rubberband(min - value, dimension, constant)
    } else if value > max {
        max + rubberband(value - max, dimension, constant)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn vector_arithmetic() {
        let a = Vector::new(3.0, 4.0);
        let b = Vector::new(1.0, -2.0);
        assert_eq!(a + b, Vector::new(4.0, 2.0));
        assert_eq!(a - b, Vector::new(2.0, 6.0));
        assert_eq!(a * 2.0, Vector::new(6.0, 8.0));
        assert_eq!(-a, Vector::new(-3.0, -4.0));
        assert!((a.length() - 5.0).abs() < EPSILON);
        assert_eq!(a.midpoint(b), Vector::new(2.0, 1.0));
    }

    #[test]
    fn empty_sizes() {
        assert!(Size::new(0.0, 10.0).is_empty());
        assert!(Size::new(10.0, -1.0).is_empty());
        assert!(Size::new(f32::NAN, 1.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn centered_rect_round_trips_center() {
        let rect = Rect::centered(Vector::new(50.0, 40.0), Size::new(20.0, 10.0));
        assert_eq!(rect, Rect::new(40.0, 35.0, 20.0, 10.0));
        assert_eq!(rect.center(), Vector::new(50.0, 40.0));
    }

    #[test]
    fn rubberband_is_identity_inside_bounds() {
        assert_eq!(rubberband_if_out_of_bounds(2.0, 1.0, 8.0, 0.15), 2.0);
        assert_eq!(rubberband_if_out_of_bounds(1.0, 1.0, 8.0, 0.15), 1.0);
        assert_eq!(rubberband_if_out_of_bounds(8.0, 1.0, 8.0, 0.15), 8.0);
    }

    #[test]
    fn rubberband_resists_overshoot() {
        let above = rubberband_if_out_of_bounds(12.0, 1.0, 8.0, 0.15);
        assert!(above > 8.0 && above < 12.0);

        let below = rubberband_if_out_of_bounds(0.5, 1.0, 8.0, 0.15);
        assert!(below < 1.0 && below > 0.5);

        // Further overshoot still moves, but never past the asymptote.
        let far = rubberband_if_out_of_bounds(1_000.0, 1.0, 8.0, 0.15);
        assert!(far > above);
        assert!(far < 8.0 + 7.0 / 0.15);
    }

    #[test]
    fn zero_constant_hard_clamps() {
        assert_eq!(rubberband_if_out_of_bounds(12.0, 1.0, 8.0, 0.0), 8.0);
        assert_eq!(rubberband_if_out_of_bounds(0.2, 1.0, 8.0, 0.0), 1.0);
    }
}

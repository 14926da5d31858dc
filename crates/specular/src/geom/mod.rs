//! Exact 2D primitives for the reflection sweep.
//!
//! Purpose
//! - Immutable points (`nalgebra::Vector2<f64>`) and oriented segments with the
//!   orientation test, distances, line intersection and mirroring the sweep
//!   relies on.
//! - Keep every operation a pure function of its inputs; nothing here mutates
//!   a point or a segment after construction.
//!
//! Numerics
//! - Thresholds are collected in `tol` so call sites name them instead of
//!   repeating literals.
//! - Near-parallel intersections return `None` (the undefined sentinel) and
//!   log a diagnostic; callers treat that as "contributes nothing".

mod segment;
pub mod tol;

pub use segment::Segment;

use std::cmp::Ordering;

use nalgebra::Vector2;

/// A point in the plane.
pub type Point = Vector2<f64>;

/// Angle of `p` as seen from `center`, in `(-π, π]`.
#[inline]
pub fn angle(center: &Point, p: &Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x)
}

/// Lexicographic total order on points (x first, then y).
#[inline]
pub fn point_cmp(a: &Point, b: &Point) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

/// Distance from `x` to the next representable value of larger magnitude.
///
/// Matches the usual `ulp` definition: NaN for NaN, +∞ for ±∞, the smallest
/// subnormal for zero.
pub fn ulp(x: f64) -> f64 {
    let a = x.abs();
    if a.is_nan() || a.is_infinite() {
        return a;
    }
    if a == f64::MAX {
        return a - f64::from_bits(a.to_bits() - 1);
    }
    f64::from_bits(a.to_bits() + 1) - a
}

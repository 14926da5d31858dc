//! Oriented segment `p1 → p2` with a cached midpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{tol, Point};

/// Immutable oriented segment.
///
/// Invariants:
/// - `p1`, `p2` never change after construction; `mid` is their average.
/// - Equality compares the endpoints in order (`a→b != b→a`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(from = "[Point; 2]", into = "[Point; 2]")]
pub struct Segment {
    p1: Point,
    p2: Point,
    mid: Point,
}

impl Segment {
    #[inline]
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            mid: (p1 + p2) * 0.5,
        }
    }

    /// Zero-length segment sitting at `p`.
    #[inline]
    pub fn degenerate(p: Point) -> Self {
        Self::new(p, p)
    }

    #[inline]
    pub fn p1(&self) -> &Point {
        &self.p1
    }

    #[inline]
    pub fn p2(&self) -> &Point {
        &self.p2
    }

    #[inline]
    pub fn mid(&self) -> &Point {
        &self.mid
    }

    #[inline]
    pub fn direction(&self) -> Point {
        self.p2 - self.p1
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.p2 - self.p1).norm()
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.p1 == self.p2
    }

    /// Relative orientation of `p` with respect to this segment.
    ///
    /// Returns `1`, `-1` or `0`. With `y` pointing up, `1` means `p` lies to the
    /// right of `p1 → p2` and `-1` to the left. Collinear points report `0`
    /// inside the closed span, `-1` behind `p1` and `1` beyond `p2`.
    pub fn relative_ccw(&self, p: &Point) -> i32 {
        let x2 = self.p2.x - self.p1.x;
        let y2 = self.p2.y - self.p1.y;
        let mut px = p.x - self.p1.x;
        let mut py = p.y - self.p1.y;
        let mut ccw = px * y2 - py * x2;
        if ccw == 0.0 {
            ccw = px * x2 + py * y2;
            if ccw > 0.0 {
                px -= x2;
                py -= y2;
                ccw = px * x2 + py * y2;
                if ccw < 0.0 {
                    ccw = 0.0;
                }
            }
        }
        if ccw < 0.0 {
            -1
        } else if ccw > 0.0 {
            1
        } else {
            0
        }
    }

    /// Distance from `p` to the infinite supporting line.
    ///
    /// Falls back to the distance to `p1` for a degenerate segment.
    pub fn pt_line_dist(&self, p: &Point) -> f64 {
        let d = self.direction();
        let len = d.norm();
        if len == 0.0 {
            return (p - self.p1).norm();
        }
        let rel = p - self.p1;
        (d.x * rel.y - d.y * rel.x).abs() / len
    }

    /// Distance from `p` to the closed segment.
    pub fn pt_seg_dist(&self, p: &Point) -> f64 {
        let d = self.direction();
        let len_sq = d.norm_squared();
        if len_sq == 0.0 {
            return (p - self.p1).norm();
        }
        let t = ((p - self.p1).dot(&d) / len_sq).clamp(0.0, 1.0);
        (p - (self.p1 + d * t)).norm()
    }

    /// Intersection of the two supporting lines.
    ///
    /// `None` when `|det| < PARALLEL_EPS`: the lines are (nearly) parallel and the
    /// point is undefined.
    pub fn intersection(&self, other: &Segment) -> Option<Point> {
        let (x1, y1, x2, y2) = (other.p1.x, other.p1.y, other.p2.x, other.p2.y);
        let (x3, y3, x4, y4) = (self.p1.x, self.p1.y, self.p2.x, self.p2.y);
        let d1x = x1 - x2;
        let d2x = x3 - x4;
        let d1y = y1 - y2;
        let d2y = y3 - y4;
        let det = d1x * d2y - d1y * d2x;

        if det.abs() >= tol::PARALLEL_EPS {
            let c1 = x1 * y2 - y1 * x2;
            let c2 = x3 * y4 - y3 * x4;
            Some(Point::new(
                (c1 * d2x - d1x * c2) / det,
                (c1 * d2y - d1y * c2) / det,
            ))
        } else {
            tracing::warn!(
                line = %self,
                with = %other,
                det,
                "parallel lines, intersection undefined"
            );
            None
        }
    }

    /// Mirror image of `p` across the supporting line.
    pub fn mirror(&self, p: &Point) -> Point {
        let d = self.direction();
        let k = 2.0 * (d.x * (p.y - self.p1.y) - d.y * (p.x - self.p1.x)) / d.norm_squared();
        Point::new(p.x + k * d.y, p.y - k * d.x)
    }
}

impl PartialEq for Segment {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.p1 == other.p1 && self.p2 == other.p2
    }
}

impl From<[Point; 2]> for Segment {
    #[inline]
    fn from([p1, p2]: [Point; 2]) -> Self {
        Self::new(p1, p2)
    }
}

impl From<Segment> for [Point; 2] {
    #[inline]
    fn from(s: Segment) -> Self {
        [s.p1, s.p2]
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[({},{})->({},{})]",
            self.p1.x, self.p1.y, self.p2.x, self.p2.y
        )
    }
}

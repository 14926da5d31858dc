//! Numeric thresholds (internal).
//!
//! Policy
//! - Fixed constants; the sweep's decisions were tuned against them and
//!   changing one shifts which spans survive.

/// Minimum |det| for a line–line intersection to be considered defined.
pub const PARALLEL_EPS: f64 = 1e-4;
/// Distance above which an "already on the occluder" gate endpoint is suspicious.
pub const PROJECTION_EPS: f64 = 1e-4;
/// Non-degenerate gates shorter than this are reported.
pub const SHORT_GATE_LEN: f64 = 1e-6;

/// Scale applied to the largest coordinate ULP when filtering noise spans:
/// `100 / sqrt(ulp(1.0))`.
#[inline]
pub fn rounding_error_factor() -> f64 {
    100.0 / super::ulp(1.0).sqrt()
}

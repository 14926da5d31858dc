//! Radial sweep: angular events around a center and a cyclic, restartable
//! iterator that tracks the open set.
//!
//! Purpose
//! - Turn segments into BEGIN/END pairs (angularly first endpoint first when
//!   sweeping counter-clockwise) and points of interest into POINT events.
//! - Order them totally and deterministically: angle, kind
//!   (BEGIN < END < POINT), endpoint discriminator, then endpoint coordinates.
//!   Segments sharing an angle must always resolve the same way, otherwise
//!   obstruction decisions diverge between runs.
//! - Report, at any time, which segments span the current sweep direction.
//!
//! Lifecycle
//! - `SweepBuilder` collects events and the initial open set; `build()`
//!   consumes it and yields a `SweepIter` that wraps around forever. Callers
//!   decide when to stop.

mod builder;
mod event;

pub use builder::{SweepBuilder, SweepIter};
pub use event::{EventKind, Marker, Owner, SweepEvent};

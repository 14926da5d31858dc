//! Specular reflection paths in the plane.
//!
//! Given a source, a target and a set of two-sided line mirrors, enumerate the
//! light paths from source to target, grouped by the sequence of mirrors they
//! bounce off. Each reflection sequence is a node of a tree; expanding a node
//! is one radial sweep around its (virtual) source.
//!
//! Layout
//! - `geom`: points, segments and the numeric thresholds.
//! - `sweep`: angular event order and the cyclic sweep iterator.
//! - `reflect`: reflection groups, the active-occluder collector, path rebuild.
//! - `trace`: breadth-first driver with depth cutoff and cancellation.
//! - `model`: input scene, text format and random scenes.

pub mod error;
pub mod geom;
pub mod model;
pub mod reflect;
pub mod sweep;
pub mod trace;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::ReflectError;
pub use model::{MirrorId, Model, ModelError};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::error::ReflectError;
    pub use crate::geom::{Point, Segment};
    pub use crate::model::rand::{draw_model, RandomSceneCfg};
    pub use crate::model::{MirrorId, Model, ModelError};
    pub use crate::reflect::{Expansion, FoundPath, Gate, GroupId, GroupTree, ReflectionGroup};
    pub use crate::trace::{
        trace, CancelStatus, Deadline, LiveTrace, NeverCancel, Trace, TraceCfg,
    };
}

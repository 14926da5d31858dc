//! Failures of a reflection expansion or of the breadth-first driver.
//!
//! Precondition failures abort the current expansion only; the driver decides
//! whether to skip the node or give up on the whole trace. Numerical
//! degeneracies are not errors: they are logged and the affected span or path
//! is dropped.

use std::fmt;

use crate::geom::{Point, Segment};
use crate::model::MirrorId;
use crate::reflect::GroupId;
use crate::sweep::SweepEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum ReflectError {
    /// A non-root gate whose source lies strictly clockwise of it.
    GateOrientation { gate: Segment, source: Point },
    /// The sweep tried to record a found path twice.
    RayAlreadySet { group: GroupId },
    /// `start` on a collector that already started.
    AlreadyStarted { group: GroupId },
    /// An event the expanding group never registers.
    UnexpectedEvent { group: GroupId, event: String },
    /// The sweep did not reach its terminating event within its bound.
    SweepOverrun { group: GroupId, steps: usize },
    UnknownGroup(GroupId),
    /// A reflected group whose occluder is not a mirror of the model.
    UnknownMirror(MirrorId),
    Cancelled,
    /// Depth cutoffs are integers `>= -1`.
    InvalidDepth(i64),
}

impl ReflectError {
    pub(crate) fn unexpected(group: GroupId, ev: &SweepEvent) -> Self {
        Self::UnexpectedEvent {
            group,
            event: format!("{:?} from {:?} at angle {}", ev.kind(), ev.owner(), ev.angle()),
        }
    }
}

impl fmt::Display for ReflectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GateOrientation { gate, source } => write!(
                f,
                "gate {gate} is not ccw to group at ({},{})",
                source.x, source.y
            ),
            Self::RayAlreadySet { group } => write!(f, "path already recorded for {group}"),
            Self::AlreadyStarted { group } => write!(f, "collector for {group} already started"),
            Self::UnexpectedEvent { group, event } => {
                write!(f, "unexpected sweep event in {group}: {event}")
            }
            Self::SweepOverrun { group, steps } => {
                write!(f, "sweep of {group} did not terminate after {steps} events")
            }
            Self::UnknownGroup(id) => write!(f, "no such group {id}"),
            Self::UnknownMirror(id) => write!(f, "no such mirror #{}", id.0),
            Self::Cancelled => write!(f, "trace cancelled"),
            Self::InvalidDepth(d) => write!(f, "invalid depth cutoff {d} (must be >= -1)"),
        }
    }
}

impl std::error::Error for ReflectError {}

//! Reflection groups, gates, and found paths.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReflectError;
use crate::geom::tol::SHORT_GATE_LEN;
use crate::geom::{Point, Segment};
use crate::model::MirrorId;

/// Index into a [`super::GroupTree`]; the root is always `GroupId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Opening a group's light enters through.
///
/// The root gate is degenerate at the true source. Every other gate has its
/// group's (virtual) source on the counter-clockwise side or on the line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Gate(Segment);

impl Gate {
    pub fn root(source: Point) -> Self {
        Self(Segment::degenerate(source))
    }

    pub fn new(p1: Point, p2: Point, source: &Point) -> Result<Self, ReflectError> {
        let seg = Segment::new(p1, p2);
        if seg.relative_ccw(source) < 0 {
            return Err(ReflectError::GateOrientation {
                gate: seg,
                source: *source,
            });
        }
        if seg.length() < SHORT_GATE_LEN {
            tracing::warn!(gate = %seg, len = seg.length(), "very short gate");
        }
        Ok(Self(seg))
    }

    #[inline]
    pub fn segment(&self) -> &Segment {
        &self.0
    }

    #[inline]
    pub fn p1(&self) -> &Point {
        self.0.p1()
    }

    #[inline]
    pub fn p2(&self) -> &Point {
        self.0.p2()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GroupKind {
    Root,
    /// Produced from `parent` by bouncing off `occluder`.
    Reflected { parent: GroupId, occluder: MirrorId },
}

/// Every ray of a group leaves its source and passes through its gate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReflectionGroup {
    level: usize,
    gate: Gate,
    virtual_source: Point,
    travelled: f64,
    kind: GroupKind,
}

impl ReflectionGroup {
    pub fn root(source: Point) -> Self {
        Self {
            level: 0,
            gate: Gate::root(source),
            virtual_source: source,
            travelled: 0.0,
            kind: GroupKind::Root,
        }
    }

    /// Child of `parent` reflected off `occluder`.
    pub fn reflected(
        parent: &ReflectionGroup,
        parent_id: GroupId,
        occluder: MirrorId,
        virtual_source: Point,
        gate: Gate,
    ) -> Self {
        Self {
            level: parent.level + 1,
            travelled: gate.segment().pt_seg_dist(&virtual_source),
            gate,
            virtual_source,
            kind: GroupKind::Reflected {
                parent: parent_id,
                occluder,
            },
        }
    }

    /// Number of reflections; the root is at level 0.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    #[inline]
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    #[inline]
    pub fn virtual_source(&self) -> &Point {
        &self.virtual_source
    }

    /// Shortest distance from the (virtual) source to the gate.
    #[inline]
    pub fn travelled_distance(&self) -> f64 {
        self.travelled
    }

    #[inline]
    pub fn kind(&self) -> &GroupKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<GroupId> {
        match self.kind {
            GroupKind::Root => None,
            GroupKind::Reflected { parent, .. } => Some(parent),
        }
    }

    pub fn occluder(&self) -> Option<MirrorId> {
        match self.kind {
            GroupKind::Root => None,
            GroupKind::Reflected { occluder, .. } => Some(occluder),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.kind == GroupKind::Root
    }
}

/// Polyline from the true source through each reflection point to the target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoundPath {
    points: Vec<Point>,
}

impl FoundPath {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of reflection points.
    pub fn bounces(&self) -> usize {
        self.points.len().saturating_sub(2)
    }

    /// Euclidean length of the polyline.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

/// Outcome of expanding one group: its children in sweep order and, when the
/// target is visible through the group, the path reaching it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expansion {
    pub children: Vec<ReflectionGroup>,
    pub path: Option<FoundPath>,
}

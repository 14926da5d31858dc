//! Sweep events and their total order.

use std::cmp::Ordering;

use crate::geom::{angle, point_cmp, Point, Segment};
use crate::model::MirrorId;

/// Event kind; the declaration order is the tie-break priority at equal angles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Begin,
    End,
    Point,
}

/// Role of a standalone point of interest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Marker {
    /// The model's target.
    Target,
    /// First gate endpoint; reaching it ends a reflected sweep.
    GateEnd,
    /// Starting direction handed to the builder.
    Reference,
}

/// What produced an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    Mirror(MirrorId),
    /// The gate a reflected sweep starts from (never stored in the event set).
    Gate,
    Marker(Marker),
}

impl Owner {
    fn rank(&self) -> (u8, usize) {
        match *self {
            Owner::Mirror(MirrorId(i)) => (0, i),
            Owner::Gate => (1, 0),
            Owner::Marker(m) => (2, m as usize),
        }
    }
}

/// One angular event as seen from a sweep center.
///
/// `which` is `1` or `2` for the segment endpoint the event sits on and `0` for
/// standalone points (whose `line` is degenerate at the point).
#[derive(Clone, Copy, Debug)]
pub struct SweepEvent {
    kind: EventKind,
    owner: Owner,
    line: Segment,
    point: Point,
    angle: f64,
    which: u8,
}

impl SweepEvent {
    /// BEGIN/END pair for `line` as seen from `center`.
    ///
    /// Endpoints are swapped when `center` lies on the positive side of the
    /// line, so that BEGIN is always the first endpoint met counter-clockwise.
    pub fn pair(line: &Segment, owner: Owner, center: &Point) -> (SweepEvent, SweepEvent) {
        let swap = line.relative_ccw(center) > 0;
        let endpoint = |kind, use_p2: bool| {
            let (point, which) = if use_p2 {
                (*line.p2(), 2)
            } else {
                (*line.p1(), 1)
            };
            SweepEvent {
                kind,
                owner,
                line: *line,
                point,
                angle: angle(center, &point),
                which,
            }
        };
        (
            endpoint(EventKind::Begin, swap),
            endpoint(EventKind::End, !swap),
        )
    }

    /// POINT event for a point of interest.
    pub fn marker(p: Point, marker: Marker, center: &Point) -> SweepEvent {
        SweepEvent {
            kind: EventKind::Point,
            owner: Owner::Marker(marker),
            line: Segment::degenerate(p),
            point: p,
            angle: angle(center, &p),
            which: 0,
        }
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    #[inline]
    pub fn owner(&self) -> Owner {
        self.owner
    }

    #[inline]
    pub fn mirror(&self) -> Option<MirrorId> {
        match self.owner {
            Owner::Mirror(id) => Some(id),
            _ => None,
        }
    }

    #[inline]
    pub fn marker_role(&self) -> Option<Marker> {
        match self.owner {
            Owner::Marker(m) => Some(m),
            _ => None,
        }
    }

    #[inline]
    pub fn line(&self) -> &Segment {
        &self.line
    }

    #[inline]
    pub fn point(&self) -> &Point {
        &self.point
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    #[inline]
    pub fn which(&self) -> u8 {
        self.which
    }
}

impl Ord for SweepEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.angle
            .total_cmp(&other.angle)
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.which.cmp(&other.which))
            .then_with(|| point_cmp(self.line.p1(), other.line.p1()))
            .then_with(|| point_cmp(self.line.p2(), other.line.p2()))
            .then_with(|| self.owner.rank().cmp(&other.owner.rank()))
    }
}

impl PartialOrd for SweepEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SweepEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SweepEvent {}

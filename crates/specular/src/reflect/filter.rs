//! Pre-filter on the mirrors a reflected sweep registers.
//!
//! A reflected group only sees the region on the far side of its gate and
//! inside the wedge spanned by the rays from its source through the two gate
//! endpoints. Mirrors wholly outside that region are dropped before the sweep,
//! mirrors that cross a wedge edge are clipped to it before deciding.

use crate::geom::{Point, Segment};

/// Whether the far side of the gate as seen from `source` contains part of `line`.
pub(crate) fn gate_admits(gate: &Segment, source: &Point, line: &Segment) -> bool {
    let beyond = |p: &Point| gate.relative_ccw(p) <= 0;
    let mut p1 = *line.p1();
    let mut p2 = *line.p2();
    let mut p1_beyond = beyond(&p1);
    let mut p2_beyond = beyond(&p2);
    if p1_beyond && p2_beyond {
        return true;
    }
    if !p1_beyond && !p2_beyond {
        return false;
    }

    let sight_start = Segment::new(*source, *gate.p1());
    let p1_after = sight_start.relative_ccw(&p1) >= 0;
    let p2_after = sight_start.relative_ccw(&p2) >= 0;
    if !p1_after && !p2_after {
        return false;
    }
    if p1_after != p2_after {
        if let Some(hit) = sight_start.intersection(line) {
            if p1_after {
                p2 = hit;
                p2_beyond = beyond(&p2);
            } else {
                p1 = hit;
                p1_beyond = beyond(&p1);
            }
        }
        if p1_beyond && p2_beyond {
            return true;
        }
        if !p1_beyond && !p2_beyond {
            return false;
        }
    }

    let sight_end = Segment::new(*source, *gate.p2());
    let p1_past = sight_end.relative_ccw(&p1) >= 0;
    let p2_past = sight_end.relative_ccw(&p2) >= 0;
    if p1_past && p2_past {
        return false;
    }
    if p1_past != p2_past {
        if let Some(hit) = sight_end.intersection(line) {
            if p2_past {
                p2 = hit;
                p2_beyond = beyond(&p2);
            } else {
                p1 = hit;
                p1_beyond = beyond(&p1);
            }
        }
    }
    if p1_beyond && p2_beyond {
        return true;
    }
    if !p1_beyond && !p2_beyond {
        return false;
    }

    // both clipped endpoints sit inside the wedge, one on each side of the gate
    let mid = (p1 + p2) / 2.0;
    beyond(&mid)
}

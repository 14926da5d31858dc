//! Active-occluder tracking during one group's sweep.
//!
//! The collector follows the nearest visible mirror (the active occluder) as
//! the sweep advances. Whenever the active mirror changes, the angular span it
//! covered since it became active is closed off as the gate of a new child
//! group, reflected off that mirror.

use tracing::{debug, warn};

use crate::error::ReflectError;
use crate::geom::tol::{rounding_error_factor, PROJECTION_EPS};
use crate::geom::{ulp, Point, Segment};
use crate::model::{MirrorId, Model};
use crate::sweep::{EventKind, SweepEvent, SweepIter};

use super::tree::GroupTree;
use super::types::{Expansion, FoundPath, Gate, GroupId, ReflectionGroup};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Occluder changes are tracked but no spans are emitted.
    Initializing,
    Started,
}

/// Per-expansion state; [`Collector::build`] consumes it.
pub(crate) struct Collector<'t> {
    tree: &'t GroupTree,
    group: GroupId,
    iter: SweepIter,
    source: Point,
    active: Option<MirrorId>,
    active_start: Option<Point>,
    on_ccw_of_active: bool,
    children: Vec<ReflectionGroup>,
    path: Option<FoundPath>,
    ray_set: bool,
    phase: Phase,
}

#[inline]
fn ccw_of(line: &Segment, p: &Point) -> bool {
    line.relative_ccw(p) >= 0
}

impl<'t> Collector<'t> {
    /// Collector for `group`, with the active occluder taken in the direction of
    /// `start` from `source`.
    pub(crate) fn new(
        tree: &'t GroupTree,
        group: GroupId,
        iter: SweepIter,
        source: Point,
        start: &Point,
    ) -> Self {
        let mut c = Self {
            tree,
            group,
            iter,
            source,
            active: None,
            active_start: None,
            on_ccw_of_active: true,
            children: Vec::new(),
            path: None,
            ray_set: false,
            phase: Phase::Initializing,
        };
        c.update_active(start);
        c.on_ccw_of_active = c.source_side();
        c
    }

    #[inline]
    fn model(&self) -> &'t Model {
        self.tree.model()
    }

    #[inline]
    pub(crate) fn next_event(&mut self) -> Option<SweepEvent> {
        self.iter.next()
    }

    /// Begin emitting spans.
    pub(crate) fn start(&mut self) -> Result<(), ReflectError> {
        if self.phase != Phase::Initializing {
            return Err(ReflectError::AlreadyStarted { group: self.group });
        }
        self.phase = Phase::Started;
        Ok(())
    }

    fn source_side(&self) -> bool {
        self.active
            .map_or(true, |a| ccw_of(self.model().mirror(a), &self.source))
    }

    /// Whether `ev` can change what the source sees.
    pub(crate) fn is_visible(&self, ev: &SweepEvent) -> bool {
        let Some(active) = self.active else {
            return true;
        };
        if ev.mirror() == Some(active) {
            return true;
        }
        let line = self.model().mirror(active);
        match ev.kind() {
            EventKind::Begin => {
                let el = ev.line();
                let active_mid_with_source =
                    ccw_of(el, line.mid()) == ccw_of(el, &self.source);
                let mid_with_source = ccw_of(line, el.mid()) == self.on_ccw_of_active;
                if active_mid_with_source != mid_with_source {
                    return mid_with_source;
                }
                ccw_of(line, ev.point()) == self.on_ccw_of_active
            }
            // an ending segment other than the active one was already hidden
            EventKind::End => false,
            EventKind::Point => ccw_of(line, ev.point()) == self.on_ccw_of_active,
        }
    }

    /// A visible segment begins and becomes the active occluder.
    pub(crate) fn start_segment(&mut self, ev: &SweepEvent) -> Result<(), ReflectError> {
        let Some(id) = ev.mirror() else {
            return Err(ReflectError::unexpected(self.group, ev));
        };
        if self.active == Some(id) {
            return Ok(());
        }
        if self.phase == Phase::Started && self.active.is_some() {
            self.add_span(*ev.point(), true)?;
        }
        self.active_start = Some(*ev.point());
        self.active = Some(id);
        self.on_ccw_of_active = self.source_side();
        Ok(())
    }

    /// The active segment ends (or the sweep reached its end); the nearest open
    /// segment takes over.
    pub(crate) fn end_segment(&mut self, ev: &SweepEvent) -> Result<(), ReflectError> {
        if self.phase == Phase::Started {
            if let Some(active) = self.active {
                let own_endpoint = ev.mirror() == Some(active) && ev.which() != 0;
                self.add_span(*ev.point(), !own_endpoint)?;
            }
        }
        self.update_active(ev.point());
        self.on_ccw_of_active = self.source_side();
        Ok(())
    }

    /// Close the span of the active occluder at `given` and emit its child.
    fn add_span(&mut self, given: Point, project: bool) -> Result<(), ReflectError> {
        let Some(active) = self.active else {
            return Ok(());
        };
        let line = *self.model().mirror(active);
        let gate_end = if project {
            match line.intersection(&Segment::new(self.source, given)) {
                Some(p) => p,
                None => {
                    debug!(%line, "span end not projectable, dropped");
                    return Ok(());
                }
            }
        } else {
            let off = line.pt_seg_dist(&given);
            if off > PROJECTION_EPS {
                warn!(%line, off, "span end is not on the active mirror");
            }
            given
        };
        let Some(gate_start) = self.active_start else {
            debug!(%line, "span start undefined, dropped");
            return Ok(());
        };

        let len = (gate_end - gate_start).norm();
        let noise = ulp(gate_start.x)
            .max(ulp(gate_start.y))
            .max(ulp(gate_end.x).max(ulp(gate_end.y)))
            * rounding_error_factor();
        if len < noise {
            debug!(len, noise, "span below rounding noise, dropped");
            return Ok(());
        }

        let virtual_source = line.mirror(&self.source);
        let gate = Gate::new(gate_start, gate_end, &virtual_source)?;
        let tree = self.tree;
        let parent = tree.get(self.group)?;
        self.children.push(ReflectionGroup::reflected(
            parent,
            self.group,
            active,
            virtual_source,
            gate,
        ));
        Ok(())
    }

    /// Nearest open segment in the direction of `p` becomes active.
    fn update_active(&mut self, p: &Point) {
        let ray = Segment::new(self.source, *p);
        let model = self.model();
        let mut best = None;
        let mut best_sq = f64::INFINITY;
        for &id in self.iter.open_set() {
            let Some(hit) = ray.intersection(model.mirror(id)) else {
                continue;
            };
            let d_sq = (hit - self.source).norm_squared();
            if d_sq < best_sq {
                best_sq = d_sq;
                best = Some(id);
            }
        }
        self.active = best;
        self.active_start = best.and_then(|id| model.mirror(id).intersection(&ray));
    }

    /// Record the path to the visible target at `p`.
    pub(crate) fn set_ray(&mut self, p: &Point) -> Result<(), ReflectError> {
        if self.ray_set {
            return Err(ReflectError::RayAlreadySet { group: self.group });
        }
        self.ray_set = true;
        self.path = self.tree.path_to(self.group, p)?;
        Ok(())
    }

    pub(crate) fn build(self) -> Expansion {
        Expansion {
            children: self.children,
            path: self.path,
        }
    }
}

//! Arena of reflection groups and the two expansion procedures.

use tracing::{debug, trace};

use crate::error::ReflectError;
use crate::geom::{Point, Segment};
use crate::model::{MirrorId, Model};
use crate::sweep::{EventKind, Marker, SweepBuilder, SweepEvent};

use super::collect::Collector;
use super::filter::gate_admits;
use super::types::{Expansion, FoundPath, GroupId, GroupKind, ReflectionGroup};

/// Reflection groups of one model, indexed by [`GroupId`].
///
/// Groups only reference their parent by id, so a tree can be grown while
/// earlier groups are being expanded from a shared borrow.
#[derive(Clone, Debug)]
pub struct GroupTree {
    model: Model,
    groups: Vec<ReflectionGroup>,
}

impl GroupTree {
    pub const ROOT: GroupId = GroupId(0);

    /// Tree holding only the root group at the model's source.
    pub fn new(model: Model) -> Self {
        let root = ReflectionGroup::root(*model.source());
        Self {
            model,
            groups: vec![root],
        }
    }

    #[inline]
    pub fn model(&self) -> &Model {
        &self.model
    }

    #[inline]
    pub fn root(&self) -> GroupId {
        Self::ROOT
    }

    pub fn get(&self, id: GroupId) -> Result<&ReflectionGroup, ReflectError> {
        self.groups.get(id.0).ok_or(ReflectError::UnknownGroup(id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Always false: the root is present from construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &ReflectionGroup)> + '_ {
        self.groups.iter().enumerate().map(|(i, g)| (GroupId(i), g))
    }

    /// Add a group produced by a previous expansion.
    ///
    /// The parent must already be in the tree and the occluder must be a
    /// mirror of the model.
    pub fn insert(&mut self, group: ReflectionGroup) -> Result<GroupId, ReflectError> {
        if let GroupKind::Reflected { parent, occluder } = *group.kind() {
            self.get(parent)?;
            if occluder.0 >= self.model.mirrors().len() {
                return Err(ReflectError::UnknownMirror(occluder));
            }
        }
        let id = GroupId(self.groups.len());
        self.groups.push(group);
        Ok(id)
    }

    /// Sweep around the group's (virtual) source: one child per visible span
    /// of a mirror, plus the path to the target when it is visible.
    ///
    /// Expanding never mutates the tree; the same group expands to the same
    /// result every time.
    pub fn expand(&self, id: GroupId) -> Result<Expansion, ReflectError> {
        let group = self.get(id)?;
        let out = match *group.kind() {
            GroupKind::Root => self.expand_root(id)?,
            GroupKind::Reflected { occluder, .. } => self.expand_reflected(id, group, occluder)?,
        };
        debug!(
            %id,
            level = group.level(),
            children = out.children.len(),
            found = out.path.is_some(),
            "group expanded"
        );
        Ok(out)
    }

    /// Full-circle sweep around the true source.
    fn expand_root(&self, id: GroupId) -> Result<Expansion, ReflectError> {
        let model = &self.model;
        let source = *model.source();
        if model.mirrors().is_empty() {
            return Ok(Expansion {
                children: Vec::new(),
                path: self.path_to(id, model.target())?,
            });
        }

        let mut builder = SweepBuilder::new(source);
        builder.prepare_mirrors(model.mirror_ids());
        builder.prepare_point(*model.target(), Marker::Target);
        let mut iter = builder.build();
        let budget = 2 * iter.len() + 2;
        let Some(first) = iter.next() else {
            return Ok(Expansion::default());
        };
        let mut c = Collector::new(self, id, iter, source, first.point());

        // the sweep starts for real at the first visible BEGIN/END and stops
        // when that event comes around again
        let mut first_digested: Option<SweepEvent> = None;
        for _ in 0..budget {
            let Some(ev) = c.next_event() else { break };
            let looping = first_digested.is_some();
            trace!(kind = ?ev.kind(), owner = ?ev.owner(), angle = ev.angle(), "root event");
            match ev.kind() {
                EventKind::Begin | EventKind::End => {
                    if c.is_visible(&ev) {
                        if ev.kind() == EventKind::Begin {
                            c.start_segment(&ev)?;
                        } else {
                            c.end_segment(&ev)?;
                        }
                        if first_digested.is_none() {
                            first_digested = Some(ev);
                            c.start()?;
                        }
                    }
                }
                EventKind::Point => match ev.marker_role() {
                    Some(Marker::Target) => {
                        if first_digested.is_some() && c.is_visible(&ev) {
                            c.set_ray(ev.point())?;
                        }
                    }
                    _ => return Err(ReflectError::unexpected(id, &ev)),
                },
            }
            if looping && first_digested == Some(ev) {
                return Ok(c.build());
            }
        }
        Err(ReflectError::SweepOverrun {
            group: id,
            steps: budget,
        })
    }

    /// Sweep from the gate's second endpoint to its first around the
    /// virtual source, over the region beyond the gate.
    fn expand_reflected(
        &self,
        id: GroupId,
        group: &ReflectionGroup,
        occluder: MirrorId,
    ) -> Result<Expansion, ReflectError> {
        let model = &self.model;
        let source = *group.virtual_source();
        let gate = *group.gate().segment();

        let mut builder = SweepBuilder::from_gate(source, &gate);
        builder.prepare_mirrors(
            model
                .mirror_ids()
                .filter(|&(mid, line)| mid != occluder && gate_admits(&gate, &source, line)),
        );
        if gate.relative_ccw(model.target()) <= 0 {
            builder.prepare_point(*model.target(), Marker::Target);
        }
        builder.prepare_point(*gate.p1(), Marker::GateEnd);
        let iter = builder.build();
        let budget = iter.len() + 1;

        let mut c = Collector::new(self, id, iter, source, gate.p2());
        c.start()?;
        for _ in 0..budget {
            let Some(ev) = c.next_event() else { break };
            trace!(kind = ?ev.kind(), owner = ?ev.owner(), angle = ev.angle(), "reflected event");
            match (ev.kind(), ev.marker_role()) {
                (EventKind::Begin, _) => {
                    if c.is_visible(&ev) {
                        c.start_segment(&ev)?;
                    }
                }
                (EventKind::End, _) => {
                    if c.is_visible(&ev) {
                        c.end_segment(&ev)?;
                    }
                }
                (EventKind::Point, Some(Marker::Target)) => {
                    if c.is_visible(&ev) {
                        c.set_ray(ev.point())?;
                    }
                }
                (EventKind::Point, Some(Marker::GateEnd)) => {
                    c.end_segment(&ev)?;
                    return Ok(c.build());
                }
                (EventKind::Point, _) => return Err(ReflectError::unexpected(id, &ev)),
            }
        }
        Err(ReflectError::SweepOverrun {
            group: id,
            steps: budget,
        })
    }

    /// Polyline from the true source to `dst`, unwinding the reflections of
    /// `id` and its ancestors.
    ///
    /// `None` when some reflection point is undefined (ray parallel to its mirror).
    pub fn path_to(&self, id: GroupId, dst: &Point) -> Result<Option<FoundPath>, ReflectError> {
        let mut points = vec![*dst];
        let mut cur = *dst;
        let mut group = self.get(id)?;
        while let GroupKind::Reflected { parent, occluder } = *group.kind() {
            let sight = Segment::new(*group.virtual_source(), cur);
            let Some(hit) = self.model.mirror(occluder).intersection(&sight) else {
                debug!(group = %id, line = %self.model.mirror(occluder), "reflection point undefined");
                return Ok(None);
            };
            points.push(hit);
            cur = hit;
            group = self.get(parent)?;
        }
        points.push(*self.model.source());
        points.reverse();
        Ok(Some(FoundPath::new(points)))
    }
}

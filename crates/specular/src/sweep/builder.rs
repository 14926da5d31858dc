//! Builder and cyclic iterator for a radial sweep.

use std::collections::BTreeSet;

use crate::geom::{Point, Segment};
use crate::model::MirrorId;

use super::event::{EventKind, Marker, Owner, SweepEvent};

/// Collects sweep events around `center` and the segments already open at the
/// starting reference.
///
/// Without a reference, the sweep starts just after angle `-π`: exactly the
/// segments whose angular span wraps through `±π` are open.
#[derive(Clone, Debug)]
pub struct SweepBuilder {
    center: Point,
    start: Option<SweepEvent>,
    events: BTreeSet<SweepEvent>,
    open: Vec<MirrorId>,
}

impl SweepBuilder {
    pub fn new(center: Point) -> Self {
        Self {
            center,
            start: None,
            events: BTreeSet::new(),
            open: Vec::new(),
        }
    }

    /// Start at the direction of `start`.
    pub fn from_point(center: Point, start: Point) -> Self {
        let mut b = Self::new(center);
        b.start = Some(SweepEvent::marker(start, Marker::Reference, &center));
        b
    }

    /// Start at the BEGIN event `gate` would produce as seen from `center`.
    pub fn from_gate(center: Point, gate: &Segment) -> Self {
        let mut b = Self::new(center);
        b.start = Some(SweepEvent::pair(gate, Owner::Gate, &center).0);
        b
    }

    /// Register BEGIN/END pairs and mark the segments open at the start reference.
    pub fn prepare_mirrors<'a>(&mut self, mirrors: impl IntoIterator<Item = (MirrorId, &'a Segment)>) {
        for (id, line) in mirrors {
            let (begin, end) = SweepEvent::pair(line, Owner::Mirror(id), &self.center);
            if spans(&begin, self.start.as_ref(), &end) && !self.open.contains(&id) {
                self.open.push(id);
            }
            self.events.insert(begin);
            self.events.insert(end);
        }
    }

    /// Register a standalone point of interest.
    pub fn prepare_point(&mut self, p: Point, marker: Marker) {
        self.events
            .insert(SweepEvent::marker(p, marker, &self.center));
    }

    /// Finalize into a cyclic iterator positioned at the start reference.
    pub fn build(self) -> SweepIter {
        let events: Vec<SweepEvent> = self.events.into_iter().collect();
        if events.is_empty() {
            return SweepIter {
                events,
                pos: 0,
                open: Vec::new(),
            };
        }
        let pos = match &self.start {
            Some(s) => events.partition_point(|e| e < s),
            None => 0,
        };
        tracing::debug!(
            center = ?(self.center.x, self.center.y),
            events = events.len(),
            open = self.open.len(),
            pos,
            "sweep built"
        );
        SweepIter {
            events,
            pos,
            open: self.open,
        }
    }
}

/// Whether `middle` lies strictly inside the counter-clockwise interval
/// `begin → end`. A missing `middle` sorts before every event.
fn spans(begin: &SweepEvent, middle: Option<&SweepEvent>, end: &SweepEvent) -> bool {
    if begin < end {
        // plain interval: cutting the circle at -π keeps it whole
        middle.is_some_and(|m| begin < m && m < end)
    } else {
        // wrapping interval: inside unless end <= middle <= begin
        middle.map_or(true, |m| end > m || m > begin)
    }
}

/// Endless iterator over the sorted events, restarting at the smallest angle.
///
/// Only an empty sweep returns `None`.
#[derive(Clone, Debug)]
pub struct SweepIter {
    events: Vec<SweepEvent>,
    pos: usize,
    open: Vec<MirrorId>,
}

impl SweepIter {
    /// Segments spanning the direction of the last BEGIN/END returned, in
    /// first-insertion order.
    #[inline]
    pub fn open_set(&self) -> &[MirrorId] {
        &self.open
    }

    /// Number of distinct events in one full cycle.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Iterator for SweepIter {
    type Item = SweepEvent;

    fn next(&mut self) -> Option<SweepEvent> {
        if self.events.is_empty() {
            return None;
        }
        if self.pos >= self.events.len() {
            self.pos = 0;
        }
        let ev = self.events[self.pos];
        self.pos += 1;
        match (ev.kind(), ev.mirror()) {
            (EventKind::Begin, Some(id)) => {
                if !self.open.contains(&id) {
                    self.open.push(id);
                }
            }
            (EventKind::End, Some(id)) => self.open.retain(|&o| o != id),
            _ => {}
        }
        Some(ev)
    }
}

//! Breadth-first driver over the reflection tree.
//!
//! Purpose
//! - Expand groups level by level (FIFO) until the depth cutoff, collecting
//!   every found path and leaving the unexpanded frontier in the result.
//!
//! Policy
//! - The cutoff is checked against the front of the queue before dequeuing, so
//!   a depth of `d` expands every group of level `<= d` and nothing deeper.
//! - Cancellation is polled before each node; a cancelled run is an error and
//!   yields no partial trace.
//! - A failing expansion aborts the whole run unless `skip_failed` is set, in
//!   which case the node is recorded and its subtree is never produced.

mod cancel;
mod live;

pub use cancel::{CancelStatus, Deadline, NeverCancel};
pub use live::LiveTrace;

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ReflectError;
use crate::geom::Point;
use crate::model::{MirrorId, Model};
use crate::reflect::{FoundPath, GroupId, GroupTree};

/// Driver configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceCfg {
    /// Deepest level to expand; `None` expands until no group is left.
    pub max_depth: Option<usize>,
    /// Record failing expansions and continue instead of aborting.
    pub skip_failed: bool,
}

impl TraceCfg {
    /// Map the signed cutoff convention: `-1` is unlimited, `>= 0` bounds the
    /// level, anything else is rejected.
    pub fn from_depth(depth: i64) -> Result<Self, ReflectError> {
        Ok(Self {
            max_depth: depth_limit(depth)?,
            ..Self::default()
        })
    }
}

pub(crate) fn depth_limit(depth: i64) -> Result<Option<usize>, ReflectError> {
    match depth {
        -1 => Ok(None),
        d if d >= 0 => usize::try_from(d)
            .map(Some)
            .map_err(|_| ReflectError::InvalidDepth(depth)),
        _ => Err(ReflectError::InvalidDepth(depth)),
    }
}

/// Result of one driver run.
#[derive(Clone, Debug)]
pub struct Trace {
    tree: GroupTree,
    rays: Vec<FoundPath>,
    frontier: Vec<GroupId>,
    failed: Vec<(GroupId, ReflectError)>,
    expanded: usize,
}

impl Trace {
    /// Every group produced, including the frontier.
    #[inline]
    pub fn tree(&self) -> &GroupTree {
        &self.tree
    }

    #[inline]
    pub fn model(&self) -> &Model {
        self.tree.model()
    }

    /// Found paths in discovery order.
    #[inline]
    pub fn rays(&self) -> &[FoundPath] {
        &self.rays
    }

    /// Groups produced but not expanded, in queue order.
    #[inline]
    pub fn frontier(&self) -> &[GroupId] {
        &self.frontier
    }

    /// Expansions that failed and were skipped.
    #[inline]
    pub fn failed(&self) -> &[(GroupId, ReflectError)] {
        &self.failed
    }

    #[inline]
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// One row per group in arena order.
    pub fn summaries(&self) -> Vec<GroupSummary> {
        let mut pending = vec![false; self.tree.len()];
        for id in &self.frontier {
            pending[id.0] = true;
        }
        self.tree
            .iter()
            .map(|(id, g)| GroupSummary {
                id,
                level: g.level(),
                parent: g.parent(),
                occluder: g.occluder(),
                gate: [*g.gate().p1(), *g.gate().p2()],
                virtual_source: *g.virtual_source(),
                travelled: g.travelled_distance(),
                frontier: pending[id.0],
            })
            .collect()
    }

    /// Serializable view for hand-off to callers.
    pub fn report(&self) -> TraceReport {
        TraceReport {
            model: self.model().clone(),
            expanded: self.expanded,
            rays: self.rays.clone(),
            groups: self.summaries(),
            failed: self
                .failed
                .iter()
                .map(|(id, e)| (*id, e.to_string()))
                .collect(),
        }
    }
}

/// Flat description of one group.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub level: usize,
    pub parent: Option<GroupId>,
    pub occluder: Option<MirrorId>,
    pub gate: [Point; 2],
    pub virtual_source: Point,
    pub travelled: f64,
    pub frontier: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct TraceReport {
    pub model: Model,
    pub expanded: usize,
    pub rays: Vec<FoundPath>,
    pub groups: Vec<GroupSummary>,
    pub failed: Vec<(GroupId, String)>,
}

/// Expand `model` breadth-first up to the configured depth.
pub fn trace(
    model: Model,
    cfg: &TraceCfg,
    cancel: &dyn CancelStatus,
) -> Result<Trace, ReflectError> {
    info!(%model, max_depth = ?cfg.max_depth, "trace started");
    let out = BfsRunner::new(model, cfg, cancel).run()?;
    info!(
        expanded = out.expanded,
        groups = out.tree.len(),
        rays = out.rays.len(),
        frontier = out.frontier.len(),
        failed = out.failed.len(),
        "trace finished"
    );
    Ok(out)
}

/// Queue plus accumulators for one run.
struct BfsRunner<'c> {
    cfg: &'c TraceCfg,
    cancel: &'c dyn CancelStatus,
    tree: GroupTree,
    pending: VecDeque<GroupId>,
    rays: Vec<FoundPath>,
    failed: Vec<(GroupId, ReflectError)>,
    expanded: usize,
}

impl<'c> BfsRunner<'c> {
    fn new(model: Model, cfg: &'c TraceCfg, cancel: &'c dyn CancelStatus) -> Self {
        let tree = GroupTree::new(model);
        let pending = VecDeque::from([tree.root()]);
        Self {
            cfg,
            cancel,
            tree,
            pending,
            rays: Vec::new(),
            failed: Vec::new(),
            expanded: 0,
        }
    }

    fn within_depth(&self, id: GroupId) -> Result<bool, ReflectError> {
        let level = self.tree.get(id)?.level();
        Ok(self.cfg.max_depth.map_or(true, |d| level <= d))
    }

    fn run(mut self) -> Result<Trace, ReflectError> {
        while let Some(&id) = self.pending.front() {
            if !self.within_depth(id)? {
                break;
            }
            if self.cancel.is_cancelled() {
                debug!(expanded = self.expanded, "cancel requested");
                return Err(ReflectError::Cancelled);
            }
            self.pending.pop_front();
            let exp = match self.tree.expand(id) {
                Ok(exp) => exp,
                Err(e) if self.cfg.skip_failed => {
                    warn!(%id, error = %e, "expansion failed, group skipped");
                    self.failed.push((id, e));
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.expanded += 1;
            if let Some(path) = exp.path {
                self.rays.push(path);
            }
            for child in exp.children {
                let cid = self.tree.insert(child)?;
                self.pending.push_back(cid);
            }
        }
        Ok(Trace {
            tree: self.tree,
            rays: self.rays,
            frontier: self.pending.into(),
            failed: self.failed,
            expanded: self.expanded,
        })
    }
}

//! Retained trace that is recomputed whenever its inputs change.

use tracing::error;

use super::{depth_limit, trace, CancelStatus, Trace, TraceCfg};
use crate::model::Model;

/// Holds the inputs and the last successful trace.
///
/// Every recomputation polls the cancellation capability handed to the call
/// that triggered it. A failed or cancelled recomputation is logged and leaves
/// the previous trace in place; the new inputs are kept so the next change
/// starts from them.
#[derive(Clone, Debug)]
pub struct LiveTrace {
    model: Model,
    cfg: TraceCfg,
    current: Option<Trace>,
}

impl LiveTrace {
    pub fn new(model: Model, cfg: TraceCfg, cancel: &dyn CancelStatus) -> Self {
        let mut live = Self {
            model,
            cfg,
            current: None,
        };
        live.refresh(cancel);
        live
    }

    #[inline]
    pub fn model(&self) -> &Model {
        &self.model
    }

    #[inline]
    pub fn cfg(&self) -> &TraceCfg {
        &self.cfg
    }

    /// Last successful trace, if any run succeeded.
    #[inline]
    pub fn current(&self) -> Option<&Trace> {
        self.current.as_ref()
    }

    /// Replace the model and recompute. Returns whether the recomputation succeeded.
    pub fn set_model(&mut self, model: Model, cancel: &dyn CancelStatus) -> bool {
        self.model = model;
        self.refresh(cancel)
    }

    /// Change the depth cutoff (`-1` = unlimited) and recompute.
    pub fn set_depth(&mut self, depth: i64, cancel: &dyn CancelStatus) -> bool {
        match depth_limit(depth) {
            Ok(max_depth) => {
                self.cfg.max_depth = max_depth;
                self.refresh(cancel)
            }
            Err(e) => {
                error!(error = %e, "depth rejected, keeping previous trace");
                false
            }
        }
    }

    fn refresh(&mut self, cancel: &dyn CancelStatus) -> bool {
        match trace(self.model.clone(), &self.cfg, cancel) {
            Ok(t) => {
                self.current = Some(t);
                true
            }
            Err(e) => {
                error!(error = %e, "trace failed, keeping previous trace");
                false
            }
        }
    }
}

//! Bind/unbind bookkeeping for offscreen render targets.
//!
//! At most one target is bound at a time. Rendering goes to the bound target, or
//! to the default target when none is bound. [`TargetBinding`] enforces the
//! nesting rules for any backend.

use crate::backend::TargetId;
use crate::error::SceneError;

/// Whether a given target currently receives rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetState {
    Bound,
    Unbound,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TargetBinding {
    bound: Option<TargetId>,
}

impl TargetBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// The target receiving rendering, if any.
    pub fn bound(&self) -> Option<TargetId> {
        self.bound
    }

    pub fn state(&self, target: TargetId) -> TargetState {
        if self.bound == Some(target) {
            TargetState::Bound
        } else {
            TargetState::Unbound
        }
    }

    /// Fails if any target, including `target` itself, is already bound.
    pub fn bind(&mut self, target: TargetId) -> Result<(), SceneError> {
        if let Some(bound) = self.bound {
            return Err(SceneError::TargetAlreadyBound {
                bound: bound.raw(),
                requested: target.raw(),
            });
        }
        self.bound = Some(target);
        Ok(())
    }

    /// Fails unless `target` is the bound one.
    pub fn unbind(&mut self, target: TargetId) -> Result<(), SceneError> {
        if self.bound != Some(target) {
            return Err(SceneError::TargetNotBound(target.raw()));
        }
        self.bound = None;
        Ok(())
    }

    /// Checks that a frame can end. The binding is reset either way so the
    /// next frame starts on the default target.
    pub fn finish_frame(&mut self) -> Result<(), SceneError> {
        match self.bound.take() {
            Some(target) => Err(SceneError::TargetLeftBound(target.raw())),
            None => Ok(()),
        }
    }
}

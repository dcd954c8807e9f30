//! Finalize lifecycle shared by every finalizable entity
//!
//! A finalize pass runs once the whole scene graph is built or loaded and
//! links entities to their dependents. The state machine is
//! `Unfinalized -> Finalized`; the finalized state is terminal unless a forced
//! re-finalize is requested.

use super::{SceneError, SceneHandle};

/// Finalized flag plus a count of hook invocations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalizeState {
    finalized: bool,
    passes: u32,
}

impl FinalizeState {
    /// Fresh, unfinalized state
    pub const fn new() -> Self {
        Self { finalized: false, passes: 0 }
    }

    /// Whether a finalize pass has run
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// How many times the per-kind hook has been invoked
    pub const fn passes(&self) -> u32 {
        self.passes
    }

    fn begin_pass(&mut self) {
        self.finalized = true;
        self.passes = self.passes.saturating_add(1);
    }
}

/// Idempotent finalize with a per-kind hook
///
/// Implementors expose their [`FinalizeState`] and override
/// [`Finalize::do_finalize`] when they have dependents to link. The provided
/// [`Finalize::finalize`] must not be overridden.
pub trait Finalize {
    /// Finalize state
    fn finalize_state(&self) -> &FinalizeState;

    /// Mutable finalize state
    fn finalize_state_mut(&mut self) -> &mut FinalizeState;

    /// Per-kind linking, called after the finalized flag is set
    fn do_finalize(&mut self, _scene: SceneHandle) -> Result<(), SceneError> {
        Ok(())
    }

    /// Whether a finalize pass has run
    fn is_finalized(&self) -> bool {
        self.finalize_state().is_finalized()
    }

    /// Run the finalize pass against `scene`
    ///
    /// Returns `Ok(false)` without touching anything when already finalized
    /// and `force` is false. Otherwise marks the entity finalized, then runs
    /// [`Finalize::do_finalize`] and returns `Ok(true)`. A failing hook
    /// restores the previous state so the pass can be retried.
    fn finalize(&mut self, scene: SceneHandle, force: bool) -> Result<bool, SceneError> {
        if self.is_finalized() && !force {
            return Ok(false);
        }

        let previous = *self.finalize_state();
        self.finalize_state_mut().begin_pass();
        if let Err(err) = self.do_finalize(scene) {
            *self.finalize_state_mut() = previous;
            return Err(err);
        }
        Ok(true)
    }
}

//! The per-frame scene lifecycle.
//!
//! A scene moves through
//!
//! ```text
//! Uninitialized --init--> Ready --update--> Updated --draw--> Drawn
//!                           |                  ^                |
//!                           +------draw--------|----------------+
//!                                              +-----update-----+
//! any initialized phase --deinit--> Deinitialized
//! ```
//!
//! Updating or drawing twice in a row is allowed but logged. Updating or drawing
//! outside an initialized phase is a programmer error, as is initializing twice.
//! Deinitializing a scene that holds nothing is a logged no-op.

use crate::backend::RenderBackend;
use crate::error::{SceneError, Severity};
use crate::input::KeyState;

/// Where a scene is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Uninitialized,
    Ready,
    Updated,
    Drawn,
    Deinitialized,
}

impl Phase {
    /// True between a successful `init` and `deinit`.
    pub fn is_live(self) -> bool {
        matches!(self, Phase::Ready | Phase::Updated | Phase::Drawn)
    }

    pub fn after_init(self) -> Result<Phase, SceneError> {
        match self {
            Phase::Uninitialized => Ok(Phase::Ready),
            phase => Err(SceneError::Lifecycle { op: "init", phase }),
        }
    }

    pub fn after_update(self) -> Result<Phase, SceneError> {
        match self {
            Phase::Ready | Phase::Drawn => Ok(Phase::Updated),
            Phase::Updated => {
                log::warn!("update() called twice without a draw()");
                Ok(Phase::Updated)
            }
            phase => Err(SceneError::Lifecycle { op: "update", phase }),
        }
    }

    pub fn after_draw(self) -> Result<Phase, SceneError> {
        match self {
            Phase::Ready | Phase::Updated => Ok(Phase::Drawn),
            Phase::Drawn => {
                log::warn!("draw() called twice without an update()");
                Ok(Phase::Drawn)
            }
            phase => Err(SceneError::Lifecycle { op: "draw", phase }),
        }
    }

    /// `None` when there is nothing to release.
    pub fn after_deinit(self) -> Option<Phase> {
        if self.is_live() {
            Some(Phase::Deinitialized)
        } else {
            log::warn!("deinit() called while the scene is {self:?}; nothing to release");
            None
        }
    }
}

/// Trips a debug assertion for programmer errors and passes the error through.
///
/// Release builds only see the returned error.
pub fn report(err: SceneError) -> SceneError {
    debug_assert!(err.severity() != Severity::ProgrammerError, "{err}");
    err
}

/// A scene driven once per frame by an engine loop.
pub trait Scene<B: RenderBackend> {
    /// Creates every resource the scene uses.
    fn init(&mut self, backend: &mut B) -> Result<(), SceneError>;

    /// Advances simulation by `dt` seconds. Does not draw.
    fn update(&mut self, backend: &mut B, dt: f32, input: &dyn KeyState)
        -> Result<(), SceneError>;

    /// Records the frame's draw calls.
    fn draw(&mut self, backend: &mut B) -> Result<(), SceneError>;

    /// Releases everything `init` created.
    fn deinit(&mut self, backend: &mut B) -> Result<(), SceneError>;

    /// The default target changed size.
    fn resize(&mut self, _backend: &mut B, _width: u32, _height: u32) -> Result<(), SceneError> {
        Ok(())
    }
}

/// One engine tick: update, then draw between `begin_frame` and `end_frame`.
///
/// The frame is always ended once it has begun, so a failed draw never leaves
/// the backend mid-frame. The draw error takes precedence.
pub fn run_frame<B, S>(
    scene: &mut S,
    backend: &mut B,
    dt: f32,
    input: &dyn KeyState,
) -> Result<(), SceneError>
where
    B: RenderBackend,
    S: Scene<B> + ?Sized,
{
    scene.update(backend, dt, input)?;
    backend.begin_frame();
    let drawn = scene.draw(backend);
    let ended = backend.end_frame();
    drawn.and(ended)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let phase = Phase::Uninitialized.after_init().unwrap();
        assert_eq!(phase, Phase::Ready);
        let phase = phase.after_update().unwrap();
        assert_eq!(phase, Phase::Updated);
        let phase = phase.after_draw().unwrap();
        assert_eq!(phase, Phase::Drawn);
        let phase = phase.after_update().unwrap();
        assert_eq!(phase, Phase::Updated);
        assert_eq!(phase.after_deinit(), Some(Phase::Deinitialized));
    }

    #[test]
    fn draw_straight_after_init() {
        assert_eq!(Phase::Ready.after_draw().unwrap(), Phase::Drawn);
    }

    #[test]
    fn repeats_are_tolerated() {
        assert_eq!(Phase::Updated.after_update().unwrap(), Phase::Updated);
        assert_eq!(Phase::Drawn.after_draw().unwrap(), Phase::Drawn);
    }

    #[test]
    fn dead_phases_reject_work() {
        for phase in [Phase::Uninitialized, Phase::Deinitialized] {
            assert!(phase.after_update().is_err());
            assert!(phase.after_draw().is_err());
            assert_eq!(phase.after_deinit(), None);
        }
    }

    #[test]
    fn init_happens_once() {
        for phase in [Phase::Ready, Phase::Updated, Phase::Drawn, Phase::Deinitialized] {
            assert!(matches!(
                phase.after_init(),
                Err(SceneError::Lifecycle { op: "init", .. })
            ));
        }
    }

    #[test]
    fn report_passes_runtime_errors_through() {
        let err = report(SceneError::Surface(wgpu::SurfaceError::Timeout));
        assert_eq!(err.severity(), Severity::RecoverableFrame);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic)]
    fn report_asserts_on_misuse() {
        let _ = report(SceneError::Lifecycle {
            op: "draw",
            phase: Phase::Uninitialized,
        });
    }
}

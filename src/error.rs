//! Error types shared by the scene, the backend seam and the wgpu renderer.
//!
//! Every failure is a [`SceneError`]. Callers decide what to do with it through
//! [`SceneError::severity`]: fatal errors abort scene construction, frame errors
//! skip a single frame, and programmer errors indicate a broken call sequence.

use std::path::PathBuf;

use crate::backend::Resource;
use crate::bindings::UniformError;
use crate::lifecycle::Phase;

/// How the engine loop should react to a [`SceneError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// A required resource could not be created. The scene cannot run.
    FatalInit,
    /// A single frame could not be rendered. Log it and try the next frame.
    RecoverableFrame,
    /// An API was used out of order or with a stale handle.
    ProgrammerError,
}

/// Errors produced while building, updating or drawing the scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to load asset '{}': {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to create window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("surface texture unavailable: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("invalid geometry: {0}")]
    Geometry(String),

    #[error("material '{label}' expects {expected} texture(s), got {found}")]
    MaterialLayout {
        label: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Uniform(#[from] UniformError),

    #[error("unknown {0:?}")]
    UnknownResource(Resource),

    #[error("cannot bind target {requested}: target {bound} is still bound")]
    TargetAlreadyBound { bound: u32, requested: u32 },

    #[error("cannot unbind target {0}: it is not the bound target")]
    TargetNotBound(u32),

    #[error("frame ended while target {0} was still bound")]
    TargetLeftBound(u32),

    #[error("{op}() called while the scene is {phase:?}")]
    Lifecycle { op: &'static str, phase: Phase },
}

impl SceneError {
    /// Classifies the error for the engine loop.
    pub fn severity(&self) -> Severity {
        match self {
            SceneError::Asset { .. }
            | SceneError::Adapter(_)
            | SceneError::Device(_)
            | SceneError::CreateSurface(_)
            | SceneError::Geometry(_)
            | SceneError::MaterialLayout { .. } => Severity::FatalInit,
            SceneError::Surface(_) => Severity::RecoverableFrame,
            SceneError::Uniform(_)
            | SceneError::UnknownResource(_)
            | SceneError::TargetAlreadyBound { .. }
            | SceneError::TargetNotBound(_)
            | SceneError::TargetLeftBound(_)
            | SceneError::Lifecycle { .. } => Severity::ProgrammerError,
        }
    }
}

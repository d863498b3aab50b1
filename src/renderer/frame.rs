//! Per-frame recording.
//!
//! Draws are not encoded when the scene issues them. They are appended to the
//! current [`PassRecord`], and a new record starts whenever the render target
//! changes or a clear follows draws. `end_frame` turns each record into one wgpu
//! render pass.

use glam::Mat4;

use crate::backend::{DrawCall, MaterialId, MeshId, TargetId};

/// Where a pass renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PassTarget {
    Screen,
    Offscreen(TargetId),
}

#[derive(Debug)]
pub(crate) struct DrawCmd {
    pub mesh: MeshId,
    pub material: MaterialId,
    pub depth_test: bool,
    pub uniforms: DrawUniforms,
}

#[derive(Debug)]
pub(crate) struct PassRecord {
    pub target: PassTarget,
    /// Clears color to this value and depth to 1.0 before drawing.
    pub clear: Option<[f32; 4]>,
    pub draws: Vec<DrawCmd>,
}

impl PassRecord {
    pub fn new(target: PassTarget) -> Self {
        Self {
            target,
            clear: None,
            draws: Vec::new(),
        }
    }

    /// Nothing to encode.
    pub fn is_empty(&self) -> bool {
        self.clear.is_none() && self.draws.is_empty()
    }
}

/// The ordered pass list of one frame.
#[derive(Debug, Default)]
pub(crate) struct FrameRecord {
    passes: Vec<PassRecord>,
}

impl FrameRecord {
    pub fn begin(&mut self) {
        self.passes.clear();
        self.passes.push(PassRecord::new(PassTarget::Screen));
    }

    pub fn switch_to(&mut self, target: PassTarget) {
        self.passes.push(PassRecord::new(target));
    }

    pub fn current_target(&self) -> PassTarget {
        self.passes
            .last()
            .map(|p| p.target)
            .unwrap_or(PassTarget::Screen)
    }

    pub fn clear(&mut self, color: [f32; 4]) {
        let target = self.current_target();
        match self.passes.last_mut() {
            Some(pass) if pass.draws.is_empty() => pass.clear = Some(color),
            _ => {
                let mut pass = PassRecord::new(target);
                pass.clear = Some(color);
                self.passes.push(pass);
            }
        }
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        if self.passes.is_empty() {
            self.passes.push(PassRecord::new(PassTarget::Screen));
        }
        if let Some(pass) = self.passes.last_mut() {
            pass.draws.push(cmd);
        }
    }

    /// Takes the recorded passes, skipping empty ones.
    pub fn take(&mut self) -> Vec<PassRecord> {
        std::mem::take(&mut self.passes)
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// Group 0 of every pipeline. Mirrors `DrawUniforms` in the WGSL sources.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub has_light: u32,
    pub light_dir: [f32; 3],
    pub light_ambient: f32,
    pub light_diffuse: f32,
    pub light_specular: f32,
    pub _pad: [f32; 2],
}

impl DrawUniforms {
    pub fn from_call(call: &DrawCall) -> Self {
        let normal_matrix = call.transform.inverse().transpose();
        let (has_light, light_dir, ambient, diffuse, specular) = match call.light {
            Some(light) => (
                1,
                light.direction.to_array(),
                light.ambient,
                light.diffuse,
                light.specular,
            ),
            None => (0, [0.0, -1.0, 0.0], 0.0, 0.0, 0.0),
        };
        Self {
            model: call.transform.to_cols_array_2d(),
            view: call.camera.view.to_cols_array_2d(),
            proj: call.camera.projection.to_cols_array_2d(),
            normal_matrix: if normal_matrix.is_finite() {
                normal_matrix.to_cols_array_2d()
            } else {
                Mat4::IDENTITY.to_cols_array_2d()
            },
            camera_pos: call.camera.position.to_array(),
            has_light,
            light_dir,
            light_ambient: ambient,
            light_diffuse: diffuse,
            light_specular: specular,
            _pad: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::mem::offset_of;

    use bytemuck::Zeroable;
    use glam::Vec3;

    use super::*;
    use crate::light::DirectionalLight;

    fn cmd() -> DrawCmd {
        DrawCmd {
            mesh: MeshId::new(0),
            material: MaterialId::new(0),
            depth_test: true,
            uniforms: DrawUniforms::zeroed(),
        }
    }

    #[test]
    fn uniform_layout_matches_wgsl() {
        assert_eq!(offset_of!(DrawUniforms, camera_pos), 256);
        assert_eq!(offset_of!(DrawUniforms, has_light), 268);
        assert_eq!(offset_of!(DrawUniforms, light_dir), 272);
        assert_eq!(offset_of!(DrawUniforms, light_ambient), 284);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 304);
    }

    #[test]
    fn only_lit_draws_carry_the_light() {
        let mut call = DrawCall::screen(MeshId::new(0), MaterialId::new(0));
        assert_eq!(DrawUniforms::from_call(&call).has_light, 0);

        call.light = Some(DirectionalLight::new(Vec3::NEG_Y));
        let uniforms = DrawUniforms::from_call(&call);
        assert_eq!(uniforms.has_light, 1);
        assert_eq!(uniforms.light_dir, [0.0, -1.0, 0.0]);
    }

    #[test]
    fn target_switches_start_new_passes() {
        let mut frame = FrameRecord::default();
        frame.begin();
        frame.switch_to(PassTarget::Offscreen(TargetId::new(0)));
        frame.clear([0.0; 4]);
        frame.push(cmd());
        frame.push(cmd());
        frame.switch_to(PassTarget::Screen);
        frame.clear([0.0; 4]);
        frame.push(cmd());

        let passes = frame.take();
        // the untouched screen pass from begin() is dropped
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].target, PassTarget::Offscreen(TargetId::new(0)));
        assert_eq!(passes[0].draws.len(), 2);
        assert!(passes[0].clear.is_some());
        assert_eq!(passes[1].target, PassTarget::Screen);
        assert_eq!(passes[1].draws.len(), 1);
    }

    #[test]
    fn clear_after_draws_splits_the_pass() {
        let mut frame = FrameRecord::default();
        frame.begin();
        frame.push(cmd());
        frame.clear([1.0; 4]);
        frame.push(cmd());

        let passes = frame.take();
        assert_eq!(passes.len(), 2);
        assert!(passes[0].clear.is_none());
        assert_eq!(passes[1].clear, Some([1.0; 4]));
    }
}

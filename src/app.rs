//! Rotating-cube demo application.
//!
//! Drives two mesh builders against any [`RenderDevice`]: a colored cube
//! drawn indexed and a textured cube drawn non-indexed, both rebuilt every
//! frame through a full begin/emit/end session. The host (native demo or
//! browser loop) owns the device and the frame clock; this type owns the
//! scene.

use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_4;

use glam::{Mat4, Vec3};

use crate::attrib::AttributeMask;
use crate::builder::{MeshBuilder, MeshBuildResult};
use crate::device::{DrawMode, RenderDevice};
use crate::geometry::{cube, CubeData};
use crate::program::ShaderProgram;
use crate::shader_source;
use crate::texture::{Texture, TextureData};

const CAMERA_DISTANCE: f32 = 6.0;
const YAW_SPEED: f32 = 0.9;
const PITCH_SPEED: f32 = 0.6;

/// Demo scene state and its device resources.
pub struct DemoApp {
    colored_cube: MeshBuilder,
    textured_cube: MeshBuilder,
    checker: Texture,
    cube: CubeData,
    yaw: f32,
    pitch: f32,
    frame_times: VecDeque<f32>,
    fps: f32,
}

impl DemoApp {
    /// Create the scene: compile both programs, upload the checkerboard
    /// texture and allocate both builders.
    pub fn new<D: RenderDevice>(device: &mut D) -> MeshBuildResult<Self> {
        let color_program = ShaderProgram::create(
            device,
            shader_source::COLOR_SHADER_VS,
            shader_source::COLOR_SHADER_FS,
        )?;
        let colored_cube = MeshBuilder::new(
            device,
            AttributeMask::POSITION | AttributeMask::COLOR,
            color_program,
            None,
        )?;

        let texture_program = ShaderProgram::create(
            device,
            shader_source::TEXTURE_SHADER_VS,
            shader_source::TEXTURE_SHADER_FS,
        )?;
        let checker = Texture::create(
            device,
            &TextureData::checkerboard(64, [230, 230, 230, 255], [40, 40, 40, 255]),
        )?;
        let textured_cube = MeshBuilder::new(
            device,
            AttributeMask::POSITION | AttributeMask::TEXCOORD,
            texture_program,
            Some(checker.handle),
        )?;

        log::debug!("demo scene ready: colored cube (indexed) and textured cube (non-indexed)");
        Ok(Self {
            colored_cube,
            textured_cube,
            checker,
            cube: cube(0.8),
            yaw: 0.0,
            pitch: 0.0,
            frame_times: VecDeque::with_capacity(60),
            fps: 0.0,
        })
    }

    /// Advance rotation angles and the FPS average by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.yaw += YAW_SPEED * dt;
        self.pitch += PITCH_SPEED * dt;
        self.update_fps(dt);
    }

    /// Average frames per second over the last 60 frames.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Clear and draw both cubes for the given viewport aspect ratio.
    pub fn render<D: RenderDevice>(&mut self, device: &mut D, aspect: f32) -> MeshBuildResult<()> {
        device.clear(0.0, 0.0, 0.0, 1.0);

        let projection = Mat4::perspective_rh(FRAC_PI_4, aspect, 0.1, 100.0);
        let view = Mat4::look_at_rh(
            Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            Vec3::ZERO,
            Vec3::Y,
        );
        let rotation = Mat4::from_rotation_y(self.yaw) * Mat4::from_rotation_x(self.pitch);

        let colored_model = Mat4::from_translation(Vec3::new(-1.6, 0.0, 0.0)) * rotation;
        self.draw_colored_cube(device, projection * view * colored_model)?;

        let textured_model = Mat4::from_translation(Vec3::new(1.6, 0.0, 0.0)) * rotation;
        self.draw_textured_cube(device, projection * view * textured_model)?;

        Ok(())
    }

    /// Release every device resource the scene holds.
    pub fn dispose<D: RenderDevice>(self, device: &mut D) {
        self.colored_cube.dispose(device);
        self.textured_cube.dispose(device);
        self.checker.destroy(device);
    }

    fn draw_colored_cube<D: RenderDevice>(
        &mut self,
        device: &mut D,
        mvp: Mat4,
    ) -> MeshBuildResult<()> {
        self.colored_cube.begin(DrawMode::Triangles);
        for i in 0..self.cube.positions.len() {
            let [r, g, b, a] = self.cube.colors[i];
            let [x, y, z] = self.cube.positions[i];
            self.colored_cube.color(r, g, b, a)?.vertex(x, y, z)?;
        }
        self.colored_cube.set_ibo(device, &self.cube.indices)?;
        self.colored_cube.end(device, mvp)
    }

    fn draw_textured_cube<D: RenderDevice>(
        &mut self,
        device: &mut D,
        mvp: Mat4,
    ) -> MeshBuildResult<()> {
        self.textured_cube.begin(DrawMode::Triangles);
        // Expand the index list so the non-indexed path gets real use.
        for &index in self.cube.indices.iter() {
            let i = index as usize;
            let [u, v] = self.cube.texcoords[i];
            let [x, y, z] = self.cube.positions[i];
            self.textured_cube.texcoord(u, v)?.vertex(x, y, z)?;
        }
        self.textured_cube.end(device, mvp)
    }

    fn update_fps(&mut self, dt: f32) {
        if self.frame_times.len() >= 60 {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(dt);

        if !self.frame_times.is_empty() {
            let avg_dt: f32 = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
            self.fps = 1.0 / avg_dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::headless::DrawCall;
    use crate::device::HeadlessDevice;

    #[test]
    fn test_frame_issues_both_draw_paths() {
        let mut device = HeadlessDevice::new();
        let mut app = DemoApp::new(&mut device).unwrap();
        app.update(1.0 / 60.0);
        app.render(&mut device, 16.0 / 9.0).unwrap();

        assert_eq!(
            device.draw_calls(),
            &[
                DrawCall::Elements {
                    mode: DrawMode::Triangles,
                    count: 36
                },
                DrawCall::Arrays {
                    mode: DrawMode::Triangles,
                    first: 0,
                    count: 36
                },
            ]
        );
        // Both cubes upload fresh vertex data each frame.
        assert_eq!(device.array_uploads().len(), 2);
        assert_eq!(device.array_uploads()[0].len(), 24 * 7 * 4);
        assert_eq!(device.array_uploads()[1].len(), 36 * 5 * 4);
    }

    #[test]
    fn test_frames_leave_no_transient_resources() {
        let mut device = HeadlessDevice::new();
        let mut app = DemoApp::new(&mut device).unwrap();
        let baseline = device.live_buffer_count();
        for _ in 0..3 {
            app.update(1.0 / 60.0);
            app.render(&mut device, 1.0).unwrap();
        }
        // Session index buffers are released by end(), only the two vertex
        // buffers persist.
        assert_eq!(device.live_buffer_count(), baseline);
        app.dispose(&mut device);
        assert_eq!(device.live_buffer_count(), 0);
        assert_eq!(device.live_vertex_array_count(), 0);
        assert_eq!(device.live_texture_count(), 0);
    }

    #[test]
    fn test_fps_averages_frame_times() {
        let mut device = HeadlessDevice::new();
        let mut app = DemoApp::new(&mut device).unwrap();
        for _ in 0..10 {
            app.update(0.02);
        }
        assert!((app.fps() - 50.0).abs() < 0.5);
    }
}

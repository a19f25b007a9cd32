//! Stateful, chainable mesh builder.
//!
//! [`MeshBuilder`] is the immediate-mode emission API over the retained
//! device: declare an attribute mask once, then per frame run one session,
//!
//! ```ignore
//! builder.begin(DrawMode::Triangles);
//! builder.color(1.0, 0.0, 0.0, 1.0)?.vertex(0.0, 0.0, 0.0)?;
//! // ... more vertices ...
//! builder.end(&mut device, mvp)?;
//! ```
//!
//! A session runs from `begin` to `end`. Setters mutate the current
//! scratchpad; only `vertex` commits, appending every present attribute's
//! value in canonical order into one interleaved stream. `end` uploads the
//! stream, draws (indexed when `set_ibo` was called this session) and
//! unbinds the vertex array and program, so the next mesh starts from clean
//! binding state.
//!
//! The builder is single-threaded by design: all calls must come from the
//! thread owning the device context, and sessions must not be interleaved
//! with raw device calls.

use std::sync::Arc;

use glam::Mat4;
use thiserror::Error;

use crate::attrib::layout::{self, AttributeLayout};
use crate::attrib::{AttributeKind, AttributeMask};
use crate::container::DynamicBuffer;
use crate::device::{
    BufferHandle, DeviceError, DrawMode, RenderDevice, TextureHandle, VertexArrayHandle,
};
use crate::program::{ShaderProgram, MVP_MATRIX_UNIFORM};

/// Mesh builder error type
#[derive(Error, Debug)]
pub enum MeshBuildError {
    #[error("Mesh layout does not include {0:?}")]
    MissingAttribute(AttributeKind),
    #[error("'{0}' called outside a begin()/end() session")]
    NotRecording(&'static str),
    #[error("Device operation failed: {0}")]
    Device(#[from] DeviceError),
}

pub type MeshBuildResult<T> = Result<T, MeshBuildError>;

/// Attribute values the next `vertex()` call will commit.
///
/// One fixed array per kind; kinds absent from the mask never reach the
/// stream, their slots here just hold the defaults.
#[derive(Debug, Clone, PartialEq)]
struct VertexScratch {
    position: [f32; 3],
    texcoord: [f32; 2],
    normal: [f32; 3],
    color: [f32; 4],
    size: [f32; 1],
}

impl VertexScratch {
    fn values(&self, kind: AttributeKind) -> &[f32] {
        match kind {
            AttributeKind::Position => &self.position,
            AttributeKind::TexCoord => &self.texcoord,
            AttributeKind::Normal => &self.normal,
            AttributeKind::Color => &self.color,
            AttributeKind::Size => &self.size,
        }
    }
}

impl Default for VertexScratch {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            texcoord: [0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            color: [0.0, 0.0, 1.0, 1.0],
            size: [1.0],
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct IndexBinding {
    buffer: BufferHandle,
    count: u32,
}

/// Immediate-mode mesh emission over a retained device.
pub struct MeshBuilder {
    mask: AttributeMask,
    layout: Arc<AttributeLayout>,
    draw_mode: DrawMode,
    vertex_array: VertexArrayHandle,
    vertex_buffer: BufferHandle,
    program: ShaderProgram,
    texture: Option<TextureHandle>,
    scratch: VertexScratch,
    stream: DynamicBuffer<f32>,
    vertex_count: u32,
    index_binding: Option<IndexBinding>,
    retired_index_buffers: Vec<BufferHandle>,
    recording: bool,
}

impl MeshBuilder {
    /// Create a builder for the given attribute mask.
    ///
    /// Allocates the vertex array and vertex buffer once; both are reused by
    /// every session. The attribute pointers for the mask's interleaved
    /// layout are recorded into the vertex array here, so sessions only
    /// refill the buffer.
    ///
    /// Position must be part of the mask. A mask with texcoords but no
    /// texture is allowed (the texture may arrive later through
    /// [`MeshBuilder::set_texture`]) and only logs a warning.
    pub fn new<D: RenderDevice>(
        device: &mut D,
        mask: AttributeMask,
        program: ShaderProgram,
        texture: Option<TextureHandle>,
    ) -> MeshBuildResult<Self> {
        if !mask.has(AttributeKind::Position) {
            return Err(MeshBuildError::MissingAttribute(AttributeKind::Position));
        }
        if mask.has(AttributeKind::TexCoord) && texture.is_none() {
            log::warn!(
                "mesh layout includes texcoords but no texture is set; \
                 draws sample nothing until set_texture is called"
            );
        }

        let layout = layout::layout_for(mask);
        let vertex_array = device.create_vertex_array()?;
        let vertex_buffer = match device.create_buffer() {
            Ok(buffer) => buffer,
            Err(err) => {
                device.destroy_vertex_array(vertex_array);
                return Err(err.into());
            }
        };

        device.bind_vertex_array(Some(vertex_array));
        device.bind_array_buffer(Some(vertex_buffer));
        layout::bind_attrib_pointers(device, &layout);
        device.bind_vertex_array(None);
        device.bind_array_buffer(None);

        Ok(Self {
            mask,
            layout,
            draw_mode: DrawMode::Triangles,
            vertex_array,
            vertex_buffer,
            program,
            texture,
            scratch: VertexScratch::default(),
            stream: DynamicBuffer::new(),
            vertex_count: 0,
            index_binding: None,
            retired_index_buffers: Vec::new(),
            recording: false,
        })
    }

    /// The attribute mask this builder encodes.
    pub fn mask(&self) -> AttributeMask {
        self.mask
    }

    /// The interleaved layout derived from the mask.
    pub fn layout(&self) -> &AttributeLayout {
        &self.layout
    }

    /// Byte distance between consecutive vertices in the stream.
    pub fn vertex_stride(&self) -> u32 {
        self.layout.vertex_stride()
    }

    /// Draw mode of the current (or last) session.
    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    /// Vertices committed in the current session.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Whether a session is open.
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// The program this builder draws with.
    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    /// Texture bound by `end()`, if any.
    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    /// Set or replace the texture bound by `end()`.
    pub fn set_texture(&mut self, texture: TextureHandle) {
        self.texture = Some(texture);
    }

    /// Open a session: reset the scratchpad to defaults, clear the stream,
    /// zero the vertex counter and record the draw mode.
    ///
    /// Calling `begin` while a session is open discards that session; the
    /// result is the same as a single `begin` with this call's mode.
    pub fn begin(&mut self, mode: DrawMode) -> &mut Self {
        self.draw_mode = mode;
        self.scratch = VertexScratch::default();
        self.stream.clear();
        self.vertex_count = 0;
        if let Some(binding) = self.index_binding.take() {
            // Device release happens on the next device-touching call.
            self.retired_index_buffers.push(binding.buffer);
        }
        self.recording = true;
        self
    }

    /// Set the color for subsequent vertices, rgba in `[0, 1]`.
    pub fn color(&mut self, r: f32, g: f32, b: f32, a: f32) -> MeshBuildResult<&mut Self> {
        self.check_setter(AttributeKind::Color, "color")?;
        self.scratch.color = [r, g, b, a];
        Ok(self)
    }

    /// Set the point size for subsequent vertices.
    pub fn size(&mut self, size: f32) -> MeshBuildResult<&mut Self> {
        self.check_setter(AttributeKind::Size, "size")?;
        self.scratch.size = [size];
        Ok(self)
    }

    /// Set the texture coordinates for subsequent vertices.
    pub fn texcoord(&mut self, u: f32, v: f32) -> MeshBuildResult<&mut Self> {
        self.check_setter(AttributeKind::TexCoord, "texcoord")?;
        self.scratch.texcoord = [u, v];
        Ok(self)
    }

    /// Set the normal for subsequent vertices.
    pub fn normal(&mut self, x: f32, y: f32, z: f32) -> MeshBuildResult<&mut Self> {
        self.check_setter(AttributeKind::Normal, "normal")?;
        self.scratch.normal = [x, y, z];
        Ok(self)
    }

    /// Commit one vertex at the given position.
    ///
    /// Appends every present attribute's current value in canonical order.
    /// Commits are append-only; setters called afterwards affect the next
    /// vertex, never committed ones.
    pub fn vertex(&mut self, x: f32, y: f32, z: f32) -> MeshBuildResult<&mut Self> {
        if !self.recording {
            return Err(MeshBuildError::NotRecording("vertex"));
        }
        self.scratch.position = [x, y, z];
        for kind in self.mask.kinds() {
            self.stream.extend_from_slice(self.scratch.values(kind));
        }
        self.vertex_count += 1;
        Ok(self)
    }

    /// Upload a 16-bit index buffer for this session.
    ///
    /// The buffer lives until the session's `end()` draws with it; a fresh
    /// `set_ibo` is required in every session that wants indexed drawing.
    /// Calling it twice in one session replaces the pending buffer.
    pub fn set_ibo<D: RenderDevice>(
        &mut self,
        device: &mut D,
        indices: &[u16],
    ) -> MeshBuildResult<()> {
        if !self.recording {
            return Err(MeshBuildError::NotRecording("set_ibo"));
        }
        self.release_retired(device);
        let buffer = device.create_buffer()?;
        device.bind_element_buffer(Some(buffer));
        device.element_buffer_data(indices);
        device.bind_element_buffer(None);
        let previous = self.index_binding.replace(IndexBinding {
            buffer,
            count: indices.len() as u32,
        });
        if let Some(previous) = previous {
            device.destroy_buffer(previous.buffer);
        }
        Ok(())
    }

    /// Close the session: upload the committed vertices and draw them with
    /// the given transform.
    ///
    /// Order of operations: bind the program, upload the transform, bind the
    /// texture and sampler when one is set, bind the vertex array, upload
    /// the stream, then draw indexed (if `set_ibo` ran this session) or
    /// non-indexed. Afterwards the session's index buffer is released and
    /// the vertex array and program are unbound.
    ///
    /// A uniform or sampler failure aborts before any upload or draw and
    /// leaves the program unbound; the session stays open so the caller
    /// decides what to do with the committed data.
    pub fn end<D: RenderDevice>(&mut self, device: &mut D, transform: Mat4) -> MeshBuildResult<()> {
        if !self.recording {
            return Err(MeshBuildError::NotRecording("end"));
        }
        self.release_retired(device);

        self.program.bind(device);
        if let Err(err) = self
            .program
            .set_matrix4(device, MVP_MATRIX_UNIFORM, transform)
        {
            self.program.unbind(device);
            return Err(err.into());
        }
        if let Some(texture) = self.texture {
            device.bind_texture(Some(texture));
            if let Err(err) = self.program.load_sampler(device) {
                self.program.unbind(device);
                return Err(err.into());
            }
        }

        device.bind_vertex_array(Some(self.vertex_array));
        device.bind_array_buffer(Some(self.vertex_buffer));
        device.array_buffer_data(self.stream.bytes());

        match self.index_binding.take() {
            Some(binding) => {
                device.bind_element_buffer(Some(binding.buffer));
                device.draw_elements_u16(self.draw_mode, binding.count);
                device.destroy_buffer(binding.buffer);
            }
            None => device.draw_arrays(self.draw_mode, 0, self.vertex_count),
        }

        device.bind_vertex_array(None);
        self.program.unbind(device);
        self.recording = false;
        Ok(())
    }

    /// Release the vertex array, buffers and program.
    pub fn dispose<D: RenderDevice>(mut self, device: &mut D) {
        self.release_retired(device);
        if let Some(binding) = self.index_binding.take() {
            device.destroy_buffer(binding.buffer);
        }
        device.destroy_buffer(self.vertex_buffer);
        device.destroy_vertex_array(self.vertex_array);
        self.program.destroy(device);
    }

    fn check_setter(&self, kind: AttributeKind, op: &'static str) -> MeshBuildResult<()> {
        if !self.recording {
            return Err(MeshBuildError::NotRecording(op));
        }
        if !self.mask.has(kind) {
            return Err(MeshBuildError::MissingAttribute(kind));
        }
        Ok(())
    }

    fn release_retired<D: RenderDevice>(&mut self, device: &mut D) {
        for buffer in self.retired_index_buffers.drain(..) {
            device.destroy_buffer(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessDevice;
    use crate::shader_source;

    fn color_builder(mask: AttributeMask) -> (HeadlessDevice, MeshBuilder) {
        let mut device = HeadlessDevice::new();
        let program = ShaderProgram::create(
            &mut device,
            shader_source::COLOR_SHADER_VS,
            shader_source::COLOR_SHADER_FS,
        )
        .unwrap();
        let builder = MeshBuilder::new(&mut device, mask, program, None).unwrap();
        (device, builder)
    }

    #[test]
    fn test_construction_requires_position() {
        let mut device = HeadlessDevice::new();
        let program = ShaderProgram::create(
            &mut device,
            shader_source::COLOR_SHADER_VS,
            shader_source::COLOR_SHADER_FS,
        )
        .unwrap();
        let result = MeshBuilder::new(&mut device, AttributeMask::COLOR, program, None);
        assert!(matches!(
            result,
            Err(MeshBuildError::MissingAttribute(AttributeKind::Position))
        ));
    }

    #[test]
    fn test_construction_fails_on_device_failure() {
        let mut device = HeadlessDevice::new();
        let program = ShaderProgram::create(
            &mut device,
            shader_source::COLOR_SHADER_VS,
            shader_source::COLOR_SHADER_FS,
        )
        .unwrap();
        device.set_fail_allocations(true);
        let result = MeshBuilder::new(&mut device, AttributeMask::POSITION, program, None);
        assert!(matches!(result, Err(MeshBuildError::Device(_))));
    }

    #[test]
    fn test_construction_records_attrib_pointers() {
        let (device, builder) = color_builder(AttributeMask::POSITION | AttributeMask::COLOR);
        assert_eq!(builder.vertex_stride(), 28);
        let pointers = device.attrib_pointers();
        assert_eq!(pointers.len(), 2);
        assert_eq!(pointers[0].slot, 0);
        assert_eq!(pointers[0].components, 3);
        assert_eq!(pointers[0].offset, 0);
        assert_eq!(pointers[1].slot, 3);
        assert_eq!(pointers[1].components, 4);
        assert_eq!(pointers[1].offset, 12);
        assert!(pointers.iter().all(|p| p.stride == 28));
        assert_eq!(device.enabled_slots(), &[0, 3]);
        // Pointer setup leaves nothing bound.
        assert_eq!(device.bindings().vertex_array, None);
        assert_eq!(device.bindings().array_buffer, None);
    }

    #[test]
    fn test_setter_outside_session() {
        let (_device, mut builder) = color_builder(AttributeMask::POSITION | AttributeMask::COLOR);
        let result = builder.color(1.0, 0.0, 0.0, 1.0);
        assert!(matches!(result, Err(MeshBuildError::NotRecording("color"))));
        let result = builder.vertex(0.0, 0.0, 0.0);
        assert!(matches!(result, Err(MeshBuildError::NotRecording("vertex"))));
    }

    #[test]
    fn test_setter_for_absent_kind_leaves_state_unmodified() {
        let (_device, mut builder) = color_builder(AttributeMask::POSITION | AttributeMask::COLOR);
        builder.begin(DrawMode::Triangles);
        builder.vertex(1.0, 2.0, 3.0).unwrap();
        let before = builder.stream.as_slice().to_vec();
        let scratch_before = builder.scratch.clone();

        let result = builder.size(4.0);
        assert!(matches!(
            result,
            Err(MeshBuildError::MissingAttribute(AttributeKind::Size))
        ));
        assert_eq!(builder.stream.as_slice(), before.as_slice());
        assert_eq!(builder.scratch, scratch_before);
    }

    #[test]
    fn test_vertex_appends_in_canonical_order() {
        let (_device, mut builder) = color_builder(
            AttributeMask::POSITION | AttributeMask::NORMAL | AttributeMask::COLOR,
        );
        builder.begin(DrawMode::Triangles);
        builder
            .color(0.5, 0.25, 0.125, 1.0)
            .unwrap()
            .normal(1.0, 0.0, 0.0)
            .unwrap()
            .vertex(7.0, 8.0, 9.0)
            .unwrap();
        // position, then normal, then color
        assert_eq!(
            builder.stream.as_slice(),
            &[7.0, 8.0, 9.0, 1.0, 0.0, 0.0, 0.5, 0.25, 0.125, 1.0]
        );
        assert_eq!(builder.vertex_count(), 1);
    }

    #[test]
    fn test_defaults_commit_for_unset_attributes() {
        let (_device, mut builder) = color_builder(AttributeMask::POSITION | AttributeMask::COLOR);
        builder.begin(DrawMode::Triangles);
        builder.vertex(1.0, 1.0, 1.0).unwrap();
        // Default color is (0, 0, 1, 1).
        assert_eq!(
            builder.stream.as_slice(),
            &[1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_begin_twice_equals_single_begin() {
        let (_device, mut builder) = color_builder(AttributeMask::POSITION | AttributeMask::COLOR);
        builder.begin(DrawMode::Triangles);
        builder
            .color(1.0, 0.0, 0.0, 1.0)
            .unwrap()
            .vertex(5.0, 5.0, 5.0)
            .unwrap();
        builder.begin(DrawMode::Lines);

        assert_eq!(builder.draw_mode(), DrawMode::Lines);
        assert_eq!(builder.vertex_count(), 0);
        assert!(builder.stream.is_empty());
        assert_eq!(builder.scratch, VertexScratch::default());
        assert!(builder.is_recording());
    }

    #[test]
    fn test_end_without_begin() {
        let (mut device, mut builder) =
            color_builder(AttributeMask::POSITION | AttributeMask::COLOR);
        let result = builder.end(&mut device, Mat4::IDENTITY);
        assert!(matches!(result, Err(MeshBuildError::NotRecording("end"))));
        assert!(device.draw_calls().is_empty());
    }

    #[test]
    fn test_set_ibo_outside_session() {
        let (mut device, mut builder) =
            color_builder(AttributeMask::POSITION | AttributeMask::COLOR);
        let result = builder.set_ibo(&mut device, &[0, 1, 2]);
        assert!(matches!(
            result,
            Err(MeshBuildError::NotRecording("set_ibo"))
        ));
    }

    #[test]
    fn test_set_ibo_twice_replaces_pending_buffer() {
        let (mut device, mut builder) =
            color_builder(AttributeMask::POSITION | AttributeMask::COLOR);
        builder.begin(DrawMode::Triangles);
        builder.set_ibo(&mut device, &[0, 1, 2]).unwrap();
        let live_after_first = device.live_buffer_count();
        builder.set_ibo(&mut device, &[0, 1, 2, 0, 2, 3]).unwrap();
        assert_eq!(device.live_buffer_count(), live_after_first);
        assert_eq!(device.element_uploads().len(), 2);
        assert_eq!(device.element_uploads()[1], vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_begin_after_set_ibo_discards_index_buffer() {
        let (mut device, mut builder) =
            color_builder(AttributeMask::POSITION | AttributeMask::COLOR);
        builder.begin(DrawMode::Triangles);
        builder.set_ibo(&mut device, &[0, 1, 2]).unwrap();
        builder.begin(DrawMode::Triangles);
        builder.vertex(0.0, 0.0, 0.0).unwrap();
        builder.end(&mut device, Mat4::IDENTITY).unwrap();
        // The abandoned index buffer was released and the draw is non-indexed.
        assert_eq!(device.live_buffer_count(), 1);
        assert!(matches!(
            device.draw_calls().last(),
            Some(crate::device::headless::DrawCall::Arrays { count: 1, .. })
        ));
    }
}

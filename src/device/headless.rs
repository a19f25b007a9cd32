//! In-memory device for tests and headless runs.
//!
//! No GPU work happens here: the device stores buffer contents, tracks
//! binding state and records uploads and draw calls so callers can assert
//! exactly what would have reached a real context. Uniform lookups are
//! resolved against the stored shader source, so a program only has the
//! uniforms its source text mentions.

use std::collections::{HashMap, HashSet};

use super::{
    BufferHandle, DeviceError, DeviceResult, DrawMode, ProgramHandle, RenderDevice, TextureHandle,
    VertexArrayHandle,
};

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    /// Non-indexed draw over a vertex range.
    Arrays { mode: DrawMode, first: u32, count: u32 },
    /// Indexed draw with 16-bit indices.
    Elements { mode: DrawMode, count: u32 },
}

/// Snapshot of the device's global binding state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindingState {
    pub vertex_array: Option<VertexArrayHandle>,
    pub array_buffer: Option<BufferHandle>,
    pub element_buffer: Option<BufferHandle>,
    pub texture: Option<TextureHandle>,
    pub program: Option<ProgramHandle>,
}

/// One recorded attribute-pointer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribPointerRecord {
    pub slot: u32,
    pub components: u32,
    pub stride: u32,
    pub offset: u32,
}

#[derive(Debug)]
struct StoredProgram {
    vertex_src: String,
    fragment_src: String,
}

impl StoredProgram {
    fn has_uniform(&self, name: &str) -> bool {
        self.vertex_src.contains(name) || self.fragment_src.contains(name)
    }
}

/// Recording device.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    next_id: u64,
    buffers: HashMap<u64, Vec<u8>>,
    vertex_arrays: HashSet<u64>,
    textures: HashMap<u64, (u32, u32)>,
    programs: HashMap<u64, StoredProgram>,
    bindings: BindingState,
    attrib_pointers: Vec<AttribPointerRecord>,
    enabled_slots: Vec<u32>,
    array_uploads: Vec<Vec<u8>>,
    element_uploads: Vec<Vec<u16>>,
    matrix_uploads: Vec<(String, [f32; 16])>,
    sampler_uploads: Vec<(String, u32)>,
    draw_calls: Vec<DrawCall>,
    viewport: (i32, i32, u32, u32),
    clear_color: (f32, f32, f32, f32),
    fail_allocations: bool,
}

impl HeadlessDevice {
    /// Create a new recording device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent resource creation fail, for error-path tests.
    pub fn set_fail_allocations(&mut self, fail: bool) {
        self.fail_allocations = fail;
    }

    /// Current binding state.
    pub fn bindings(&self) -> BindingState {
        self.bindings
    }

    /// Every draw call issued so far, in order.
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    /// Every vertex-buffer upload so far, in order.
    pub fn array_uploads(&self) -> &[Vec<u8>] {
        &self.array_uploads
    }

    /// Every index-buffer upload so far, in order.
    pub fn element_uploads(&self) -> &[Vec<u16>] {
        &self.element_uploads
    }

    /// Every matrix uniform upload so far, as (name, column-major values).
    pub fn matrix_uploads(&self) -> &[(String, [f32; 16])] {
        &self.matrix_uploads
    }

    /// Every sampler uniform upload so far, as (name, unit).
    pub fn sampler_uploads(&self) -> &[(String, u32)] {
        &self.sampler_uploads
    }

    /// Attribute pointers configured so far.
    pub fn attrib_pointers(&self) -> &[AttribPointerRecord] {
        &self.attrib_pointers
    }

    /// Attribute slots enabled so far.
    pub fn enabled_slots(&self) -> &[u32] {
        &self.enabled_slots
    }

    /// Stored contents of a live buffer.
    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer.0).map(Vec::as_slice)
    }

    /// Number of live (not yet destroyed) buffers.
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of live vertex arrays.
    pub fn live_vertex_array_count(&self) -> usize {
        self.vertex_arrays.len()
    }

    /// Number of live textures.
    pub fn live_texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Last viewport rectangle set.
    pub fn viewport(&self) -> (i32, i32, u32, u32) {
        self.viewport
    }

    /// Last clear color set.
    pub fn clear_color(&self) -> (f32, f32, f32, f32) {
        self.clear_color
    }

    /// Forget recorded uploads and draw calls, keeping live resources.
    pub fn reset_recording(&mut self) {
        self.array_uploads.clear();
        self.element_uploads.clear();
        self.matrix_uploads.clear();
        self.sampler_uploads.clear();
        self.draw_calls.clear();
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_allocations(&self, what: &str) -> DeviceResult<()> {
        if self.fail_allocations {
            Err(DeviceError::ResourceCreation(format!(
                "{what} allocation rejected"
            )))
        } else {
            Ok(())
        }
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_buffer(&mut self) -> DeviceResult<BufferHandle> {
        self.check_allocations("buffer")?;
        let id = self.next_id();
        self.buffers.insert(id, Vec::new());
        log::trace!("HeadlessDevice: created buffer {id}");
        Ok(BufferHandle(id))
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        log::trace!("HeadlessDevice: destroying buffer {}", buffer.0);
        self.buffers.remove(&buffer.0);
        // Deleting a bound buffer reverts the binding, as GL does.
        if self.bindings.array_buffer == Some(buffer) {
            self.bindings.array_buffer = None;
        }
        if self.bindings.element_buffer == Some(buffer) {
            self.bindings.element_buffer = None;
        }
    }

    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayHandle> {
        self.check_allocations("vertex array")?;
        let id = self.next_id();
        self.vertex_arrays.insert(id);
        log::trace!("HeadlessDevice: created vertex array {id}");
        Ok(VertexArrayHandle(id))
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        log::trace!("HeadlessDevice: destroying vertex array {}", vertex_array.0);
        self.vertex_arrays.remove(&vertex_array.0);
        if self.bindings.vertex_array == Some(vertex_array) {
            self.bindings.vertex_array = None;
        }
    }

    fn create_texture_rgba8(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> DeviceResult<TextureHandle> {
        self.check_allocations("texture")?;
        let expected = (width * height * 4) as usize;
        if pixels.len() != expected {
            return Err(DeviceError::ResourceCreation(format!(
                "texture data is {} bytes, {}x{} rgba8 needs {}",
                pixels.len(),
                width,
                height,
                expected
            )));
        }
        let id = self.next_id();
        self.textures.insert(id, (width, height));
        log::trace!("HeadlessDevice: created texture {id} ({width}x{height})");
        Ok(TextureHandle(id))
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        log::trace!("HeadlessDevice: destroying texture {}", texture.0);
        self.textures.remove(&texture.0);
        if self.bindings.texture == Some(texture) {
            self.bindings.texture = None;
        }
    }

    fn create_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> DeviceResult<ProgramHandle> {
        self.check_allocations("program")?;
        if vertex_src.trim().is_empty() {
            return Err(DeviceError::ShaderCompile("empty vertex shader".into()));
        }
        if fragment_src.trim().is_empty() {
            return Err(DeviceError::ShaderCompile("empty fragment shader".into()));
        }
        let id = self.next_id();
        self.programs.insert(
            id,
            StoredProgram {
                vertex_src: vertex_src.to_string(),
                fragment_src: fragment_src.to_string(),
            },
        );
        log::trace!("HeadlessDevice: created program {id}");
        Ok(ProgramHandle(id))
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        log::trace!("HeadlessDevice: destroying program {}", program.0);
        self.programs.remove(&program.0);
        if self.bindings.program == Some(program) {
            self.bindings.program = None;
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        log::trace!("HeadlessDevice: bind vertex array {vertex_array:?}");
        self.bindings.vertex_array = vertex_array;
    }

    fn bind_array_buffer(&mut self, buffer: Option<BufferHandle>) {
        log::trace!("HeadlessDevice: bind array buffer {buffer:?}");
        self.bindings.array_buffer = buffer;
    }

    fn bind_element_buffer(&mut self, buffer: Option<BufferHandle>) {
        log::trace!("HeadlessDevice: bind element buffer {buffer:?}");
        self.bindings.element_buffer = buffer;
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        log::trace!("HeadlessDevice: bind texture {texture:?}");
        self.bindings.texture = texture;
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        log::trace!("HeadlessDevice: use program {program:?}");
        self.bindings.program = program;
    }

    fn array_buffer_data(&mut self, data: &[u8]) {
        log::trace!("HeadlessDevice: array buffer upload, {} bytes", data.len());
        match self.bindings.array_buffer {
            Some(bound) => {
                if let Some(contents) = self.buffers.get_mut(&bound.0) {
                    contents.clear();
                    contents.extend_from_slice(data);
                }
                self.array_uploads.push(data.to_vec());
            }
            None => log::warn!("HeadlessDevice: array buffer upload with no buffer bound"),
        }
    }

    fn element_buffer_data(&mut self, indices: &[u16]) {
        log::trace!(
            "HeadlessDevice: element buffer upload, {} indices",
            indices.len()
        );
        match self.bindings.element_buffer {
            Some(bound) => {
                if let Some(contents) = self.buffers.get_mut(&bound.0) {
                    contents.clear();
                    contents.extend_from_slice(bytemuck::cast_slice(indices));
                }
                self.element_uploads.push(indices.to_vec());
            }
            None => log::warn!("HeadlessDevice: element buffer upload with no buffer bound"),
        }
    }

    fn vertex_attrib_pointer(&mut self, slot: u32, components: u32, stride: u32, offset: u32) {
        log::trace!(
            "HeadlessDevice: attrib pointer slot {slot}, {components} floats, stride {stride}, offset {offset}"
        );
        self.attrib_pointers.push(AttribPointerRecord {
            slot,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib(&mut self, slot: u32) {
        log::trace!("HeadlessDevice: enable attrib slot {slot}");
        self.enabled_slots.push(slot);
    }

    fn set_uniform_matrix4(
        &mut self,
        program: ProgramHandle,
        name: &str,
        matrix: &[f32; 16],
    ) -> DeviceResult<()> {
        let stored = self
            .programs
            .get(&program.0)
            .ok_or_else(|| DeviceError::InvalidHandle(format!("program {}", program.0)))?;
        if !stored.has_uniform(name) {
            return Err(DeviceError::MissingUniform(name.to_string()));
        }
        log::trace!("HeadlessDevice: set matrix uniform '{name}'");
        self.matrix_uploads.push((name.to_string(), *matrix));
        Ok(())
    }

    fn set_uniform_sampler(
        &mut self,
        program: ProgramHandle,
        name: &str,
        unit: u32,
    ) -> DeviceResult<()> {
        let stored = self
            .programs
            .get(&program.0)
            .ok_or_else(|| DeviceError::InvalidHandle(format!("program {}", program.0)))?;
        if !stored.has_uniform(name) {
            return Err(DeviceError::MissingUniform(name.to_string()));
        }
        log::trace!("HeadlessDevice: set sampler uniform '{name}' to unit {unit}");
        self.sampler_uploads.push((name.to_string(), unit));
        Ok(())
    }

    fn draw_arrays(&mut self, mode: DrawMode, first: u32, count: u32) {
        log::trace!("HeadlessDevice: draw arrays {mode:?}, first {first}, count {count}");
        self.draw_calls.push(DrawCall::Arrays { mode, first, count });
    }

    fn draw_elements_u16(&mut self, mode: DrawMode, count: u32) {
        log::trace!("HeadlessDevice: draw elements {mode:?}, count {count}");
        self.draw_calls.push(DrawCall::Elements { mode, count });
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        log::trace!("HeadlessDevice: viewport {x} {y} {width}x{height}");
        self.viewport = (x, y, width, height);
    }

    fn clear(&mut self, r: f32, g: f32, b: f32, a: f32) {
        log::trace!("HeadlessDevice: clear ({r}, {g}, {b}, {a})");
        self.clear_color = (r, g, b, a);
    }
}

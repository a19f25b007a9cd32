//! GL device over a `glow` context.
//!
//! Resources are stored in handle tables keyed by `u64`, so callers hold
//! plain copyable handles instead of platform GL objects. In the browser the
//! context comes from a canvas's WebGL2 context; on native any loaded GL
//! context works.
//!
//! Uniform locations are cached per program and name, since the builder
//! resolves the same uniforms every frame.

use std::collections::HashMap;

use glow::HasContext;

use super::{
    BufferHandle, DeviceError, DeviceResult, DrawMode, ProgramHandle, RenderDevice, TextureHandle,
    VertexArrayHandle,
};
use crate::attrib::CANONICAL_ORDER;

type GlBuffer = <glow::Context as HasContext>::Buffer;
type GlVertexArray = <glow::Context as HasContext>::VertexArray;
type GlTexture = <glow::Context as HasContext>::Texture;
type GlProgram = <glow::Context as HasContext>::Program;
type GlShader = <glow::Context as HasContext>::Shader;
type GlUniformLocation = <glow::Context as HasContext>::UniformLocation;

/// Real GL implementation of [`RenderDevice`].
pub struct GlDevice {
    gl: glow::Context,
    next_id: u64,
    buffers: HashMap<u64, GlBuffer>,
    vertex_arrays: HashMap<u64, GlVertexArray>,
    textures: HashMap<u64, GlTexture>,
    programs: HashMap<u64, GlProgram>,
    uniform_locations: HashMap<(u64, String), Option<GlUniformLocation>>,
}

impl GlDevice {
    /// Wrap a GL context and apply the default render state: depth test on,
    /// black clear color.
    pub fn new(gl: glow::Context) -> Self {
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.clear_color(0.0, 0.0, 0.0, 1.0);
        }
        Self {
            gl,
            next_id: 0,
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            programs: HashMap::new(),
            uniform_locations: HashMap::new(),
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn uniform_location(
        &mut self,
        program: ProgramHandle,
        name: &str,
    ) -> DeviceResult<GlUniformLocation> {
        let key = (program.0, name.to_string());
        if let Some(cached) = self.uniform_locations.get(&key) {
            return cached
                .clone()
                .ok_or_else(|| DeviceError::MissingUniform(name.to_string()));
        }
        let native = self
            .programs
            .get(&program.0)
            .copied()
            .ok_or_else(|| DeviceError::InvalidHandle(format!("program {}", program.0)))?;
        let location = unsafe { self.gl.get_uniform_location(native, name) };
        self.uniform_locations.insert(key, location.clone());
        location.ok_or_else(|| DeviceError::MissingUniform(name.to_string()))
    }

    fn compile_shader(&self, shader_type: u32, source: &str) -> DeviceResult<GlShader> {
        unsafe {
            let shader = self
                .gl
                .create_shader(shader_type)
                .map_err(DeviceError::ResourceCreation)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let info = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(DeviceError::ShaderCompile(info));
            }
            Ok(shader)
        }
    }
}

fn convert_draw_mode(mode: DrawMode) -> u32 {
    match mode {
        DrawMode::Points => glow::POINTS,
        DrawMode::Lines => glow::LINES,
        DrawMode::LineLoop => glow::LINE_LOOP,
        DrawMode::LineStrip => glow::LINE_STRIP,
        DrawMode::Triangles => glow::TRIANGLES,
        DrawMode::TriangleStrip => glow::TRIANGLE_STRIP,
        DrawMode::TriangleFan => glow::TRIANGLE_FAN,
    }
}

impl RenderDevice for GlDevice {
    fn create_buffer(&mut self) -> DeviceResult<BufferHandle> {
        let buffer = unsafe { self.gl.create_buffer() }.map_err(DeviceError::ResourceCreation)?;
        let id = self.next_id();
        self.buffers.insert(id, buffer);
        Ok(BufferHandle(id))
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(native) = self.buffers.remove(&buffer.0) {
            unsafe { self.gl.delete_buffer(native) };
        }
    }

    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayHandle> {
        let vertex_array =
            unsafe { self.gl.create_vertex_array() }.map_err(DeviceError::ResourceCreation)?;
        let id = self.next_id();
        self.vertex_arrays.insert(id, vertex_array);
        Ok(VertexArrayHandle(id))
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        if let Some(native) = self.vertex_arrays.remove(&vertex_array.0) {
            unsafe { self.gl.delete_vertex_array(native) };
        }
    }

    fn create_texture_rgba8(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> DeviceResult<TextureHandle> {
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
        let texture = unsafe { self.gl.create_texture() }.map_err(DeviceError::ResourceCreation)?;
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(pixels),
            );
            // Sampling state safe for non-power-of-two sizes under WebGL2.
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        let id = self.next_id();
        self.textures.insert(id, texture);
        Ok(TextureHandle(id))
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if let Some(native) = self.textures.remove(&texture.0) {
            unsafe { self.gl.delete_texture(native) };
        }
    }

    fn create_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> DeviceResult<ProgramHandle> {
        let vertex = self.compile_shader(glow::VERTEX_SHADER, vertex_src)?;
        let fragment = match self.compile_shader(glow::FRAGMENT_SHADER, fragment_src) {
            Ok(shader) => shader,
            Err(err) => {
                unsafe { self.gl.delete_shader(vertex) };
                return Err(err);
            }
        };
        unsafe {
            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(message) => {
                    self.gl.delete_shader(vertex);
                    self.gl.delete_shader(fragment);
                    return Err(DeviceError::ResourceCreation(message));
                }
            };
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            // Attribute slots are fixed by the registry, bound before link.
            for kind in CANONICAL_ORDER {
                self.gl
                    .bind_attrib_location(program, kind.binding_slot(), kind.shader_name());
            }
            self.gl.link_program(program);
            let linked = self.gl.get_program_link_status(program);
            self.gl.detach_shader(program, vertex);
            self.gl.detach_shader(program, fragment);
            self.gl.delete_shader(vertex);
            self.gl.delete_shader(fragment);
            if !linked {
                let info = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(DeviceError::ProgramLink(info));
            }
            let id = self.next_id();
            self.programs.insert(id, program);
            Ok(ProgramHandle(id))
        }
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        if let Some(native) = self.programs.remove(&program.0) {
            unsafe { self.gl.delete_program(native) };
        }
        self.uniform_locations.retain(|(id, _), _| *id != program.0);
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        let native = vertex_array.and_then(|handle| self.vertex_arrays.get(&handle.0).copied());
        if vertex_array.is_some() && native.is_none() {
            log::warn!("GlDevice: binding unknown vertex array {vertex_array:?}");
        }
        unsafe { self.gl.bind_vertex_array(native) };
    }

    fn bind_array_buffer(&mut self, buffer: Option<BufferHandle>) {
        let native = buffer.and_then(|handle| self.buffers.get(&handle.0).copied());
        if buffer.is_some() && native.is_none() {
            log::warn!("GlDevice: binding unknown buffer {buffer:?}");
        }
        unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, native) };
    }

    fn bind_element_buffer(&mut self, buffer: Option<BufferHandle>) {
        let native = buffer.and_then(|handle| self.buffers.get(&handle.0).copied());
        if buffer.is_some() && native.is_none() {
            log::warn!("GlDevice: binding unknown buffer {buffer:?}");
        }
        unsafe { self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, native) };
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        let native = texture.and_then(|handle| self.textures.get(&handle.0).copied());
        if texture.is_some() && native.is_none() {
            log::warn!("GlDevice: binding unknown texture {texture:?}");
        }
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, native);
        }
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        let native = program.and_then(|handle| self.programs.get(&handle.0).copied());
        if program.is_some() && native.is_none() {
            log::warn!("GlDevice: using unknown program {program:?}");
        }
        unsafe { self.gl.use_program(native) };
    }

    fn array_buffer_data(&mut self, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::DYNAMIC_DRAW);
        }
    }

    fn element_buffer_data(&mut self, indices: &[u16]) {
        unsafe {
            self.gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );
        }
    }

    fn vertex_attrib_pointer(&mut self, slot: u32, components: u32, stride: u32, offset: u32) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                slot,
                components as i32,
                glow::FLOAT,
                false,
                stride as i32,
                offset as i32,
            );
        }
    }

    fn enable_vertex_attrib(&mut self, slot: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(slot) };
    }

    fn set_uniform_matrix4(
        &mut self,
        program: ProgramHandle,
        name: &str,
        matrix: &[f32; 16],
    ) -> DeviceResult<()> {
        let location = self.uniform_location(program, name)?;
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(&location), false, matrix);
        }
        Ok(())
    }

    fn set_uniform_sampler(
        &mut self,
        program: ProgramHandle,
        name: &str,
        unit: u32,
    ) -> DeviceResult<()> {
        let location = self.uniform_location(program, name)?;
        unsafe { self.gl.uniform_1_i32(Some(&location), unit as i32) };
        Ok(())
    }

    fn draw_arrays(&mut self, mode: DrawMode, first: u32, count: u32) {
        unsafe {
            self.gl
                .draw_arrays(convert_draw_mode(mode), first as i32, count as i32);
        }
    }

    fn draw_elements_u16(&mut self, mode: DrawMode, count: u32) {
        unsafe {
            self.gl
                .draw_elements(convert_draw_mode(mode), count as i32, glow::UNSIGNED_SHORT, 0);
        }
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { self.gl.viewport(x, y, width as i32, height as i32) };
    }

    fn clear(&mut self, r: f32, g: f32, b: f32, a: f32) {
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_mode_conversion() {
        assert_eq!(convert_draw_mode(DrawMode::Points), glow::POINTS);
        assert_eq!(convert_draw_mode(DrawMode::Triangles), glow::TRIANGLES);
        assert_eq!(convert_draw_mode(DrawMode::TriangleFan), glow::TRIANGLE_FAN);
    }
}

//! Render device abstraction.
//!
//! [`RenderDevice`] is the retained-mode interface the mesh builder and
//! program facade talk to: buffer and vertex-array lifecycle, binding state,
//! uploads, attribute pointers, uniforms and draw calls.
//!
//! Two implementations exist:
//!
//! - [`GlDevice`]: real GL through `glow` (a WebGL2 context in the browser).
//! - [`HeadlessDevice`]: in-memory recorder used by tests and the native
//!   demo; it stores buffer contents and logs every draw for inspection.
//!
//! Binding state is global to the device. Components that bind a resource
//! unbind it at well-defined points so the next mesh starts from a clean
//! slate; callers must not interleave raw device calls inside a builder
//! session.

pub mod gl;
pub mod headless;

pub use gl::GlDevice;
pub use headless::HeadlessDevice;

use thiserror::Error;

/// Device error type
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Failed to create device resource: {0}")]
    ResourceCreation(String),
    #[error("Failed to compile shader: {0}")]
    ShaderCompile(String),
    #[error("Failed to link program: {0}")]
    ProgramLink(String),
    #[error("Program has no uniform named '{0}'")]
    MissingUniform(String),
    #[error("Unknown device handle: {0}")]
    InvalidHandle(String),
}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// Handle to a device buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Handle to a vertex array object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub(crate) u64);

/// Handle to a device texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

/// Handle to a compiled and linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub(crate) u64);

/// Primitive assembly type used when issuing a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawMode {
    /// One point per vertex.
    Points,
    /// Independent line segments, two vertices each.
    Lines,
    /// Connected segments closed back to the first vertex.
    LineLoop,
    /// Connected segments, open.
    LineStrip,
    /// Independent triangles, three vertices each (default).
    #[default]
    Triangles,
    /// Triangles sharing an edge with the previous one.
    TriangleStrip,
    /// Triangles fanning out from the first vertex.
    TriangleFan,
}

/// Retained-mode graphics interface consumed by the mesh builder.
///
/// All creation is fallible; binds, uploads and draws are not (a headless
/// device records them, a GL device forwards them to the driver).
pub trait RenderDevice {
    // Resource lifecycle

    /// Create an empty buffer object.
    fn create_buffer(&mut self) -> DeviceResult<BufferHandle>;

    /// Release a buffer object.
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Create a vertex array object.
    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayHandle>;

    /// Release a vertex array object.
    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Create a 2D RGBA8 texture from tightly packed pixel rows.
    fn create_texture_rgba8(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> DeviceResult<TextureHandle>;

    /// Release a texture.
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Compile and link a program from vertex and fragment source.
    fn create_program(&mut self, vertex_src: &str, fragment_src: &str)
        -> DeviceResult<ProgramHandle>;

    /// Release a program.
    fn destroy_program(&mut self, program: ProgramHandle);

    // Binding state

    /// Bind (or with `None` unbind) a vertex array object.
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>);

    /// Bind (or unbind) the vertex buffer target.
    fn bind_array_buffer(&mut self, buffer: Option<BufferHandle>);

    /// Bind (or unbind) the index buffer target.
    fn bind_element_buffer(&mut self, buffer: Option<BufferHandle>);

    /// Bind (or unbind) the 2D texture target of unit 0.
    fn bind_texture(&mut self, texture: Option<TextureHandle>);

    /// Make a program current (or clear the current program with `None`).
    fn use_program(&mut self, program: Option<ProgramHandle>);

    // Data upload

    /// Upload bytes into the bound vertex buffer, dynamic-draw usage.
    fn array_buffer_data(&mut self, data: &[u8]);

    /// Upload 16-bit indices into the bound index buffer, static-draw usage.
    fn element_buffer_data(&mut self, indices: &[u16]);

    // Vertex pipeline configuration (recorded into the bound vertex array)

    /// Point an attribute slot at `components` floats at `offset`, strided
    /// by `stride`, within the bound vertex buffer.
    fn vertex_attrib_pointer(&mut self, slot: u32, components: u32, stride: u32, offset: u32);

    /// Enable an attribute slot.
    fn enable_vertex_attrib(&mut self, slot: u32);

    // Uniforms

    /// Upload a column-major 4x4 matrix to a named uniform.
    fn set_uniform_matrix4(
        &mut self,
        program: ProgramHandle,
        name: &str,
        matrix: &[f32; 16],
    ) -> DeviceResult<()>;

    /// Point a named sampler uniform at a texture unit.
    fn set_uniform_sampler(
        &mut self,
        program: ProgramHandle,
        name: &str,
        unit: u32,
    ) -> DeviceResult<()>;

    // Draw calls

    /// Draw `count` vertices starting at `first` from the bound vertex array.
    fn draw_arrays(&mut self, mode: DrawMode, first: u32, count: u32);

    /// Draw `count` 16-bit indices from the bound index buffer.
    fn draw_elements_u16(&mut self, mode: DrawMode, count: u32);

    // Frame state

    /// Set the viewport rectangle.
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Clear color and depth with the given color.
    fn clear(&mut self, r: f32, g: f32, b: f32, a: f32);
}

//! Shader program facade.
//!
//! [`ShaderProgram`] is the narrow interface the mesh builder draws through:
//! bind, upload the transform uniform, point the sampler at unit 0, unbind.

use glam::Mat4;

use crate::device::{DeviceResult, ProgramHandle, RenderDevice};

/// Name of the model-view-projection matrix uniform.
pub const MVP_MATRIX_UNIFORM: &str = "uMVPMatrix";

/// Name of the texture sampler uniform.
pub const SAMPLER_UNIFORM: &str = "uSampler";

/// Texture unit the sampler uniform reads from.
pub const SAMPLER_UNIT: u32 = 0;

/// Compiled and linked shader program.
pub struct ShaderProgram {
    handle: ProgramHandle,
}

impl ShaderProgram {
    /// Compile and link a program from vertex and fragment source.
    pub fn create<D: RenderDevice>(
        device: &mut D,
        vertex_src: &str,
        fragment_src: &str,
    ) -> DeviceResult<Self> {
        let handle = device.create_program(vertex_src, fragment_src)?;
        Ok(Self { handle })
    }

    /// The device handle of this program.
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Make this program current.
    pub fn bind<D: RenderDevice>(&self, device: &mut D) {
        device.use_program(Some(self.handle));
    }

    /// Clear the current program.
    pub fn unbind<D: RenderDevice>(&self, device: &mut D) {
        device.use_program(None);
    }

    /// Upload a 4x4 matrix to a named uniform, column-major.
    pub fn set_matrix4<D: RenderDevice>(
        &self,
        device: &mut D,
        name: &str,
        matrix: Mat4,
    ) -> DeviceResult<()> {
        device.set_uniform_matrix4(self.handle, name, &matrix.to_cols_array())
    }

    /// Point the sampler uniform at the texture unit the builder binds.
    pub fn load_sampler<D: RenderDevice>(&self, device: &mut D) -> DeviceResult<()> {
        device.set_uniform_sampler(self.handle, SAMPLER_UNIFORM, SAMPLER_UNIT)
    }

    /// Release the program.
    pub fn destroy<D: RenderDevice>(self, device: &mut D) {
        device.destroy_program(self.handle);
    }
}

//! Immediate-mode mesh construction over a WebGL2-style rendering device.
//!
//! The crate rebuilds small meshes from scratch every frame: callers open a
//! recording session on a [`MeshBuilder`], stream per-vertex attributes
//! through it and close the session with a single draw. Vertex data is
//! interleaved according to a cached [`AttributeLayout`] derived from the
//! builder's attribute mask.
//!
//! # Features
//! - Fixed registry of five vertex attributes with canonical interleave order
//! - Mask-driven layouts (offsets, stride, shader bindings) shared via a
//!   process-wide cache
//! - Chainable begin/setter/vertex/end recording sessions with per-session
//!   index buffers
//! - [`RenderDevice`] abstraction with a WebGL2 implementation ([`GlDevice`])
//!   and a recording test double ([`HeadlessDevice`])
//! - Rotating-cube demo scene ([`DemoApp`]) runnable natively or in the
//!   browser via WebAssembly

pub mod app;
pub mod attrib;
pub mod builder;
pub mod container;
pub mod device;
pub mod geometry;
pub mod program;
pub mod shader_source;
pub mod texture;

// Web-specific modules
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
mod web_demo;

pub use app::DemoApp;
pub use attrib::{layout_for, AttributeKind, AttributeLayout, AttributeMask};
pub use builder::{MeshBuildError, MeshBuildResult, MeshBuilder};
pub use container::DynamicBuffer;
pub use device::{
    BufferHandle, DeviceError, DeviceResult, DrawMode, GlDevice, HeadlessDevice, ProgramHandle,
    RenderDevice, TextureHandle, VertexArrayHandle,
};
pub use program::ShaderProgram;
pub use texture::{Texture, TextureData};

// Web initialization helper
#[cfg(target_arch = "wasm32")]
pub fn init_web_logging() {
    // Set up panic hook for better error messages in console
    console_error_panic_hook::set_once();
    // Set up console logging for web
    console_log::init_with_level(log::Level::Info).expect("Failed to initialize logger");
}

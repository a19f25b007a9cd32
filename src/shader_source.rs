//! Embedded GLSL shader sources.
//!
//! Attribute names match the registry's shader names, so programs link with
//! the registry's binding slots regardless of driver-assigned locations.
//! GLSL 100 sources run unchanged on WebGL2.

/// Vertex shader for per-vertex colored meshes.
pub const COLOR_SHADER_VS: &str = r#"
attribute vec3 aPosition;
attribute vec4 aColor;

uniform mat4 uMVPMatrix;

varying vec4 vColor;

void main() {
    gl_Position = uMVPMatrix * vec4(aPosition, 1.0);
    vColor = aColor;
}
"#;

/// Fragment shader for per-vertex colored meshes.
pub const COLOR_SHADER_FS: &str = r#"
precision mediump float;

varying vec4 vColor;

void main() {
    gl_FragColor = vColor;
}
"#;

/// Vertex shader for textured meshes.
pub const TEXTURE_SHADER_VS: &str = r#"
attribute vec3 aPosition;
attribute vec2 aTexCoord;

uniform mat4 uMVPMatrix;

varying vec2 vTexCoord;

void main() {
    gl_Position = uMVPMatrix * vec4(aPosition, 1.0);
    vTexCoord = aTexCoord;
}
"#;

/// Fragment shader for textured meshes.
pub const TEXTURE_SHADER_FS: &str = r#"
precision mediump float;

uniform sampler2D uSampler;

varying vec2 vTexCoord;

void main() {
    gl_FragColor = texture2D(uSampler, vTexCoord);
}
"#;

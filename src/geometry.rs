//! Procedural cube data for the demo scene.

/// Cube vertex data, four vertices per face so colors and texcoords stay
/// flat across each face.
pub struct CubeData {
    pub positions: [[f32; 3]; 24],
    pub colors: [[f32; 4]; 24],
    pub texcoords: [[f32; 2]; 24],
    pub indices: [u16; 36],
}

/// Build a cube spanning `[-half_extent, half_extent]` on every axis.
///
/// Face order: front, back, top, bottom, right, left. Each face carries one
/// solid color (white, red, green, blue, yellow, purple) and full-quad
/// texture coordinates.
pub fn cube(half_extent: f32) -> CubeData {
    let l = half_extent;
    let positions = [
        // Front face
        [-l, -l, l],
        [l, -l, l],
        [l, l, l],
        [-l, l, l],
        // Back face
        [-l, -l, -l],
        [-l, l, -l],
        [l, l, -l],
        [l, -l, -l],
        // Top face
        [-l, l, -l],
        [-l, l, l],
        [l, l, l],
        [l, l, -l],
        // Bottom face
        [-l, -l, -l],
        [l, -l, -l],
        [l, -l, l],
        [-l, -l, l],
        // Right face
        [l, -l, -l],
        [l, l, -l],
        [l, l, l],
        [l, -l, l],
        // Left face
        [-l, -l, -l],
        [-l, -l, l],
        [-l, l, l],
        [-l, l, -l],
    ];

    let face_colors: [[f32; 4]; 6] = [
        [1.0, 1.0, 1.0, 1.0], // front: white
        [1.0, 0.0, 0.0, 1.0], // back: red
        [0.0, 1.0, 0.0, 1.0], // top: green
        [0.0, 0.0, 1.0, 1.0], // bottom: blue
        [1.0, 1.0, 0.0, 1.0], // right: yellow
        [1.0, 0.0, 1.0, 1.0], // left: purple
    ];
    let face_uvs: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut colors = [[0.0f32; 4]; 24];
    let mut texcoords = [[0.0f32; 2]; 24];
    let mut indices = [0u16; 36];
    for face in 0..6 {
        let base = face * 4;
        for corner in 0..4 {
            colors[base + corner] = face_colors[face];
            texcoords[base + corner] = face_uvs[corner];
        }
        let b = base as u16;
        indices[face * 6..face * 6 + 6].copy_from_slice(&[b, b + 1, b + 2, b, b + 2, b + 3]);
    }

    CubeData {
        positions,
        colors,
        texcoords,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_counts() {
        let cube = cube(1.0);
        assert_eq!(cube.positions.len(), 24);
        assert_eq!(cube.colors.len(), 24);
        assert_eq!(cube.texcoords.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.indices.iter().all(|&i| i < 24));
    }

    #[test]
    fn test_faces_have_uniform_color() {
        let cube = cube(1.0);
        for face in 0..6 {
            let base = face * 4;
            let color = cube.colors[base];
            assert!(cube.colors[base..base + 4].iter().all(|&c| c == color));
        }
        // Front face is white, back face is red.
        assert_eq!(cube.colors[0], [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(cube.colors[4], [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_half_extent_scales_positions() {
        let cube = cube(2.5);
        assert!(cube
            .positions
            .iter()
            .flatten()
            .all(|&p| p == 2.5 || p == -2.5));
    }

    #[test]
    fn test_index_pattern_per_face() {
        let cube = cube(1.0);
        assert_eq!(&cube.indices[0..6], &[0, 1, 2, 0, 2, 3]);
        assert_eq!(&cube.indices[30..36], &[20, 21, 22, 20, 22, 23]);
    }
}

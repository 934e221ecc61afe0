use bytemuck::{Pod, Zeroable};

/// Half the edge length of the unit cube mesh.
pub const CUBE_HALF_EXTENT: f32 = 0.5;

/// Six faces, two triangles each.
pub const CUBE_INDEX_COUNT: u32 = 36;

/// Mesh vertex: position, face normal and texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // texcoord
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const fn v(position: [f32; 3], normal: [f32; 3], texcoord: [f32; 2]) -> Vertex {
    Vertex { position, normal, texcoord }
}

/// 24 vertices (four per face, so each face gets its own normal and UVs).
pub fn cube_vertices() -> [Vertex; 24] {
    let s = CUBE_HALF_EXTENT;
    [
        // front (+Z)
        v([-s, -s, s], [0.0, 0.0, 1.0], [0.0, 1.0]),
        v([s, -s, s], [0.0, 0.0, 1.0], [1.0, 1.0]),
        v([s, s, s], [0.0, 0.0, 1.0], [1.0, 0.0]),
        v([-s, s, s], [0.0, 0.0, 1.0], [0.0, 0.0]),
        // right (+X)
        v([s, -s, s], [1.0, 0.0, 0.0], [0.0, 1.0]),
        v([s, -s, -s], [1.0, 0.0, 0.0], [1.0, 1.0]),
        v([s, s, -s], [1.0, 0.0, 0.0], [1.0, 0.0]),
        v([s, s, s], [1.0, 0.0, 0.0], [0.0, 0.0]),
        // back (-Z)
        v([s, -s, -s], [0.0, 0.0, -1.0], [0.0, 1.0]),
        v([-s, -s, -s], [0.0, 0.0, -1.0], [1.0, 1.0]),
        v([-s, s, -s], [0.0, 0.0, -1.0], [1.0, 0.0]),
        v([s, s, -s], [0.0, 0.0, -1.0], [0.0, 0.0]),
        // left (-X)
        v([-s, -s, -s], [-1.0, 0.0, 0.0], [0.0, 1.0]),
        v([-s, -s, s], [-1.0, 0.0, 0.0], [1.0, 1.0]),
        v([-s, s, s], [-1.0, 0.0, 0.0], [1.0, 0.0]),
        v([-s, s, -s], [-1.0, 0.0, 0.0], [0.0, 0.0]),
        // top (+Y)
        v([-s, s, s], [0.0, 1.0, 0.0], [0.0, 1.0]),
        v([s, s, s], [0.0, 1.0, 0.0], [1.0, 1.0]),
        v([s, s, -s], [0.0, 1.0, 0.0], [1.0, 0.0]),
        v([-s, s, -s], [0.0, 1.0, 0.0], [0.0, 0.0]),
        // bottom (-Y)
        v([-s, -s, -s], [0.0, -1.0, 0.0], [0.0, 1.0]),
        v([s, -s, -s], [0.0, -1.0, 0.0], [1.0, 1.0]),
        v([s, -s, s], [0.0, -1.0, 0.0], [1.0, 0.0]),
        v([-s, -s, s], [0.0, -1.0, 0.0], [0.0, 0.0]),
    ]
}

/// Counter-clockwise triangles, two per face.
pub fn cube_indices() -> [u16; CUBE_INDEX_COUNT as usize] {
    let mut out = [0u16; CUBE_INDEX_COUNT as usize];
    for face in 0..6u16 {
        let base = face * 4;
        let i = face as usize * 6;
        out[i..i + 6].copy_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::layout().array_stride, 32);
    }

    #[test]
    fn indices_reference_valid_vertices() {
        let verts = cube_vertices();
        let idx = cube_indices();
        assert_eq!(idx.len(), 36);
        assert!(idx.iter().all(|&i| (i as usize) < verts.len()));
        assert_eq!(&idx[..6], &[0, 1, 2, 2, 3, 0]);
        assert_eq!(&idx[30..], &[20, 21, 22, 22, 23, 20]);
    }

    #[test]
    fn vertices_lie_on_cube_surface() {
        for vert in cube_vertices() {
            assert!(vert.position.iter().all(|c| c.abs() == CUBE_HALF_EXTENT));
            let len: f32 = vert.normal.iter().map(|n| n * n).sum();
            assert_eq!(len, 1.0);
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_around_outward_normal() {
        let verts = cube_vertices();
        for tri in cube_indices().chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| verts[i as usize]);
            let n = cross(sub(b.position, a.position), sub(c.position, a.position));
            let dot: f32 = n.iter().zip(a.normal).map(|(x, y)| x * y).sum();
            assert!(dot > 0.0, "triangle {tri:?} faces inward");
        }
    }
}

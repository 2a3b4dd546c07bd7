//! Vertex data for the shared image plane and the fullscreen quad.

/// Floats per plane vertex: position xyz, uv.
pub const PLANE_STRIDE: usize = 5;

/// Largest subdivision whose vertices are all addressable by `u16` indices.
pub const MAX_PLANE_SEGMENTS: u32 = 255;

/// Unit plane in z = 0 centred on the origin, subdivided into
/// `segments` x `segments` quads, clamped to `1..=MAX_PLANE_SEGMENTS`.
/// uv (0, 0) is the bottom-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneGeometry {
    pub vertices: Vec<f32>,
    pub indices: Vec<u16>,
}

impl PlaneGeometry {
    pub fn new(segments: u32) -> Self {
        let n = segments.clamp(1, MAX_PLANE_SEGMENTS);
        let row = n + 1;
        let mut vertices = Vec::with_capacity((row * row) as usize * PLANE_STRIDE);
        for iy in 0..row {
            let v = 1.0 - iy as f32 / n as f32;
            for ix in 0..row {
                let u = ix as f32 / n as f32;
                vertices.extend_from_slice(&[u - 0.5, v - 0.5, 0.0, u, v]);
            }
        }

        let mut indices = Vec::with_capacity((n * n * 6) as usize);
        for iy in 0..n {
            for ix in 0..n {
                let a = iy * row + ix;
                let b = a + row;
                let c = b + 1;
                let d = a + 1;
                // c <= row * row - 1, which fits u16 for n <= MAX_PLANE_SEGMENTS
                indices.extend([a, b, d, b, c, d].map(|i| i as u16));
            }
        }
        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / PLANE_STRIDE
    }
}

/// Clip-space quad covering the screen, as two triangles.
pub const QUAD_VERTICES: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0];
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

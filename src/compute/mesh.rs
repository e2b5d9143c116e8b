//! Surface mesh construction from a height field.
//!
//! Every open cell becomes a four-triangle pyramid fan around its center.
//! Vertices are not shared between triangles so each face keeps its own flat
//! normal.

use std::ops::Sub;

use bytemuck::{Pod, Zeroable};

use super::{WallMask, corner_height, shift_near_zero_height};
use crate::schema::Grid;

/// Vertex slots reserved per cell (4 triangles * 3 vertices).
pub const VERTICES_PER_CELL: usize = 12;

/// Minimal 3-component vector for mesh data.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or zero for a degenerate input.
    #[inline]
    pub fn normalize_or_zero(self) -> Vec3 {
        let len = self.length();
        if len > f32::EPSILON {
            Vec3::new(self.x / len, self.y / len, self.z / len)
        } else {
            Vec3::ZERO
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Interleaved vertex record ready for upload to a vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Triangle soup for one frame.
///
/// All arrays hold exactly `12 * width * height` entries. Cell (x, y) owns
/// slots `[(y * width + x) * 12, +12)`; wall cells leave their slots zeroed.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<Vec3>,
    pub triangle_indices: Vec<u32>,
    pub normals: Vec<Vec3>,
}

impl MeshBuffers {
    /// Zero-filled buffers for a grid of the given size.
    pub fn zeroed(width: usize, height: usize) -> Self {
        let len = VERTICES_PER_CELL * width * height;
        Self {
            vertices: vec![Vec3::ZERO; len],
            triangle_indices: vec![0; len],
            normals: vec![Vec3::ZERO; len],
        }
    }

    /// Number of vertex slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of triangles actually written (open cells * 4).
    pub fn triangle_count(&self) -> usize {
        self.normals
            .chunks_exact(3)
            .filter(|tri| tri[0] != Vec3::ZERO)
            .count()
    }

    /// Positions and normals interleaved per vertex.
    pub fn interleaved(&self) -> Vec<MeshVertex> {
        self.vertices
            .iter()
            .zip(self.normals.iter())
            .map(|(p, n)| MeshVertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect()
    }

    /// Raw bytes of the interleaved vertex data.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.interleaved()).to_vec()
    }

    /// Raw bytes of the index buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangle_indices)
    }
}

/// World position of corner (x, y) at surface height `h`.
#[inline]
fn corner_position(x: usize, y: usize, h: f32, half_w: f32, half_h: f32) -> Vec3 {
    Vec3::new(x as f32 - half_w - 0.5, h, -(y as f32 - half_h) + 0.5)
}

/// Build the surface mesh for one frame.
///
/// Wall cells contribute no triangles but keep their slots so every cell sits
/// at a fixed offset.
pub fn build_frame(grid: &Grid, walls: &WallMask) -> MeshBuffers {
    let width = grid.width();
    let height = grid.height();
    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;

    let mut mesh = MeshBuffers::zeroed(width, height);

    for y in 0..height {
        for x in 0..width {
            if walls.is_wall(x, y) {
                continue;
            }

            let corner = |cx: usize, cy: usize| {
                let h = shift_near_zero_height(corner_height(cx, cy, grid, walls));
                corner_position(cx, cy, h, half_w, half_h)
            };

            let top_left = corner(x, y);
            let top_right = corner(x + 1, y);
            let bottom_left = corner(x, y + 1);
            let bottom_right = corner(x + 1, y + 1);
            let center = Vec3::new(
                x as f32 - half_w,
                shift_near_zero_height(grid.cell(x, y).h),
                -(y as f32 - half_h),
            );

            let triangles = [
                [center, top_left, top_right],
                [center, bottom_left, top_left],
                [center, bottom_right, bottom_left],
                [center, top_right, bottom_right],
            ];

            let base = grid.idx(x, y) * VERTICES_PER_CELL;
            for (t, [v0, v1, v2]) in triangles.into_iter().enumerate() {
                let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
                for (k, v) in [v0, v1, v2].into_iter().enumerate() {
                    let slot = base + t * 3 + k;
                    mesh.vertices[slot] = v;
                    mesh.normals[slot] = normal;
                    mesh.triangle_indices[slot] = slot as u32;
                }
            }
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: usize, height: usize, heights: &[f32]) -> Grid {
        let zeros = vec![0.0; width * height];
        Grid::from_fields(width, height, heights, &zeros, &zeros)
    }

    #[test]
    fn test_vertex_count_is_fixed() {
        let g = grid(3, 2, &[0.5; 6]);
        let static_grid = grid(3, 2, &[1.0, 0.0, 0.0, 0.0, 1.0, 1.0]);
        let walls = WallMask::from_static_grid(&static_grid);

        let mesh = build_frame(&g, &walls);
        assert_eq!(mesh.vertices.len(), 12 * 6);
        assert_eq!(mesh.normals.len(), 12 * 6);
        assert_eq!(mesh.triangle_indices.len(), 12 * 6);
        assert_eq!(mesh.triangle_count(), 4 * 3);
    }

    #[test]
    fn test_wall_cells_leave_slots_zeroed() {
        let g = grid(2, 1, &[0.5, 0.5]);
        let static_grid = grid(2, 1, &[2.0, 0.0]);
        let walls = WallMask::from_static_grid(&static_grid);

        let mesh = build_frame(&g, &walls);
        assert!(mesh.vertices[..12].iter().all(|v| *v == Vec3::ZERO));
        assert!(mesh.triangle_indices[..12].iter().all(|&i| i == 0));
        assert!(mesh.normals[12..].iter().all(|n| *n != Vec3::ZERO));
    }

    #[test]
    fn test_identity_indices() {
        let g = grid(2, 2, &[0.3; 4]);
        let mesh = build_frame(&g, &WallMask::open(2, 2));
        for (i, &idx) in mesh.triangle_indices.iter().enumerate() {
            assert_eq!(idx as usize, i);
        }
    }

    #[test]
    fn test_flat_surface_normals_point_up() {
        let g = grid(2, 2, &[0.7; 4]);
        let mesh = build_frame(&g, &WallMask::open(2, 2));

        for n in &mesh.normals {
            assert!((n.y - 1.0).abs() < 1e-5, "normal {:?}", n);
        }
        for v in &mesh.vertices {
            assert!((v.y - 0.7).abs() < 1e-6);
        }
    }

    #[test]
    fn test_world_coordinates() {
        let g = grid(2, 2, &[0.7; 4]);
        let mesh = build_frame(&g, &WallMask::open(2, 2));

        let xz = |v: Vec3| (v.x, v.z);

        // Cell (0, 0): center then top-left, top-right
        assert_eq!(xz(mesh.vertices[0]), (-1.0, 1.0));
        assert_eq!(xz(mesh.vertices[1]), (-1.5, 1.5));
        assert_eq!(xz(mesh.vertices[2]), (-0.5, 1.5));

        // Cell (1, 1) center
        let base = 3 * VERTICES_PER_CELL;
        assert_eq!(xz(mesh.vertices[base]), (0.0, 0.0));
        assert_eq!(mesh.vertices[base].y, 0.7);
    }

    #[test]
    fn test_normals_replicated_per_triangle() {
        let g = grid(3, 3, &[0.1, 0.4, 0.2, 0.9, 1.3, 0.0, 0.5, 0.2, 0.8]);
        let mesh = build_frame(&g, &WallMask::open(3, 3));

        for tri in mesh.normals.chunks_exact(3) {
            assert_eq!(tri[0], tri[1]);
            assert_eq!(tri[1], tri[2]);
            assert!((tri[0].length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_dry_cells_sink_below_floor() {
        let g = grid(1, 1, &[0.0]);
        let mesh = build_frame(&g, &WallMask::open(1, 1));
        assert!(mesh.vertices.iter().all(|v| v.y < 0.0));
    }

    #[test]
    fn test_interleaved_bytes() {
        let g = grid(1, 1, &[0.5]);
        let mesh = build_frame(&g, &WallMask::open(1, 1));

        let vertices = mesh.interleaved();
        assert_eq!(vertices.len(), 12);
        assert_eq!(vertices[0].position, mesh.vertices[0].to_array());
        assert_eq!(mesh.vertex_bytes().len(), 12 * 6 * 4);
        assert_eq!(mesh.index_bytes().len(), 12 * 4);
    }
}

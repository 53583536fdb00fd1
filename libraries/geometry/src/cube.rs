use glam::{Vec2, Vec3};

use crate::mesh::{Mesh, FLOATS_PER_FACE_POSITION, FLOATS_PER_FACE_UV};

/// Edge length of the head texture atlas in pixels.
pub const HEAD_ATLAS_SIZE: u32 = 64;
/// Edge length of a single face cell within the head atlas in pixels.
pub const HEAD_CELL_SIZE: u32 = 8;

/// A face of the unit cube spanned by two tangent axes.
///
/// `u_axis × v_axis == normal`, so walking the corners in `(u, v)` order
/// `(0, 0), (1, 0), (1, 1), (0, 1)` is counter-clockwise when seen from outside.
struct Face {
    normal: Vec3,
    u_axis: Vec3,
    v_axis: Vec3,
}

/// Buffer layout order: +Z, -Z, +Y, -Y, +X, -X
const FACES: [Face; 6] = [
    Face {
        normal: Vec3::Z,
        u_axis: Vec3::X,
        v_axis: Vec3::Y,
    },
    Face {
        normal: Vec3::NEG_Z,
        u_axis: Vec3::NEG_X,
        v_axis: Vec3::Y,
    },
    Face {
        normal: Vec3::Y,
        u_axis: Vec3::NEG_X,
        v_axis: Vec3::Z,
    },
    Face {
        normal: Vec3::NEG_Y,
        u_axis: Vec3::X,
        v_axis: Vec3::Z,
    },
    Face {
        normal: Vec3::X,
        u_axis: Vec3::Y,
        v_axis: Vec3::Z,
    },
    Face {
        normal: Vec3::NEG_X,
        u_axis: Vec3::NEG_Y,
        v_axis: Vec3::Z,
    },
];

/// Corners of a face in tangent space. Triangles are `0, 1, 2` and `0, 2, 3`.
const TRIANGLE_CORNERS: [Vec2; 6] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

impl Face {
    fn positions(&self) -> [f32; FLOATS_PER_FACE_POSITION] {
        let mut positions = [0.0; FLOATS_PER_FACE_POSITION];
        for (target, corner) in positions.chunks_exact_mut(3).zip(TRIANGLE_CORNERS) {
            let position =
                self.normal * 0.5 + self.u_axis * (corner.x - 0.5) + self.v_axis * (corner.y - 0.5);
            target.copy_from_slice(&position.to_array());
        }
        positions
    }

    /// Maps the face corners onto the rectangle `min..max` in texture space.
    fn tex_coords(min: Vec2, max: Vec2) -> [f32; FLOATS_PER_FACE_UV] {
        let mut tex_coords = [0.0; FLOATS_PER_FACE_UV];
        for (target, corner) in tex_coords.chunks_exact_mut(2).zip(TRIANGLE_CORNERS) {
            target.copy_from_slice(&(min + (max - min) * corner).to_array());
        }
        tex_coords
    }
}

/// Builds a unit cube centered at the origin.
///
/// Every face maps a texture `tiling` times along each of its two tangent axes, so a
/// repeating sampler tiles the texture proportionally to the scale the cube is drawn with.
#[must_use]
pub fn build_cube(tiling: Vec3) -> Mesh {
    let mut mesh = Mesh::with_faces(FACES.len());
    for face in &FACES {
        let repeat = Vec2::new(face.u_axis.abs().dot(tiling), face.v_axis.abs().dot(tiling));
        mesh.add_face(&face.positions(), &Face::tex_coords(Vec2::ZERO, repeat));
    }
    mesh
}

/// A [`HEAD_CELL_SIZE`] square within the head atlas, addressed by its top left pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasCell {
    pub x: u32,
    pub y: u32,
}

impl AtlasCell {
    pub const FRONT: Self = Self::new(8, 8);
    pub const BACK: Self = Self::new(24, 8);
    pub const LEFT: Self = Self::new(0, 8);
    pub const RIGHT: Self = Self::new(16, 8);
    pub const TOP: Self = Self::new(8, 0);
    pub const BOTTOM: Self = Self::new(16, 0);

    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Normalized bounds of the cell as `(min, max)`.
    ///
    /// Pixel rows count from the top of the image while texture coordinates count from the
    /// bottom (the texture is uploaded bottom row first), hence the flipped `v`.
    #[expect(
        clippy::cast_precision_loss,
        reason = "atlas coordinates are tiny integers"
    )]
    #[must_use]
    pub fn uv_bounds(self) -> (Vec2, Vec2) {
        let size = HEAD_ATLAS_SIZE as f32;
        let cell = HEAD_CELL_SIZE as f32;
        let left = self.x as f32 / size;
        let top = 1.0 - self.y as f32 / size;
        (
            Vec2::new(left, top - cell / size),
            Vec2::new(left + cell / size, top),
        )
    }
}

/// Atlas cells in buffer layout order.
///
/// The head is drawn rotated by 90° around +Z, which turns the -X face into the front.
const HEAD_CELLS: [AtlasCell; 6] = [
    AtlasCell::TOP,
    AtlasCell::BOTTOM,
    AtlasCell::LEFT,
    AtlasCell::RIGHT,
    AtlasCell::BACK,
    AtlasCell::FRONT,
];

/// Builds a unit cube whose faces sample individual cells of the head atlas.
#[must_use]
pub fn build_head_cube() -> Mesh {
    let mut mesh = Mesh::with_faces(FACES.len());
    for (face, cell) in FACES.iter().zip(HEAD_CELLS) {
        let (min, max) = cell.uv_bounds();
        mesh.add_face(&face.positions(), &Face::tex_coords(min, max));
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VERTICES_PER_CUBE;

    fn triangles(mesh: &Mesh) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        mesh.positions.chunks_exact(9).map(|triangle| {
            [
                Vec3::from_slice(&triangle[0..3]),
                Vec3::from_slice(&triangle[3..6]),
                Vec3::from_slice(&triangle[6..9]),
            ]
        })
    }

    #[test]
    fn cube_has_36_vertices() {
        let mesh = build_cube(Vec3::ONE);
        assert_eq!(mesh.positions.len(), 108);
        assert_eq!(mesh.tex_coords.len(), 72);
        assert_eq!(mesh.vertex_count(), VERTICES_PER_CUBE);
    }

    #[test]
    fn tiling_only_scales_tex_coords() {
        let plain = build_cube(Vec3::ONE);
        let tiled = build_cube(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(plain.positions, tiled.positions);
        assert_eq!(plain.tex_coords.len(), tiled.tex_coords.len());

        // +Z face spans x and y
        let top = &tiled.tex_coords[..FLOATS_PER_FACE_UV];
        assert_eq!(top[2..6], [2.0, 0.0, 2.0, 3.0]);
        // +X face spans y and z
        let right = &tiled.tex_coords[4 * FLOATS_PER_FACE_UV..5 * FLOATS_PER_FACE_UV];
        assert_eq!(right[4..6], [3.0, 4.0]);
    }

    #[test]
    fn faces_follow_layout_order() {
        let mesh = build_cube(Vec3::ONE);
        let expected = [
            Vec3::Z,
            Vec3::NEG_Z,
            Vec3::Y,
            Vec3::NEG_Y,
            Vec3::X,
            Vec3::NEG_X,
        ];
        for (face, normal) in mesh.positions.chunks_exact(18).zip(expected) {
            for vertex in face.chunks_exact(3) {
                assert!((Vec3::from_slice(vertex).dot(normal) - 0.5).abs() < f32::EPSILON);
            }
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_seen_from_outside() {
        for mesh in [build_cube(Vec3::ONE), build_head_cube()] {
            for [first, second, third] in triangles(&mesh) {
                let normal = (second - first).cross(third - first);
                let center = (first + second + third) / 3.0;
                assert!(normal.dot(center) > 0.0, "{first} {second} {third}");
            }
        }
    }

    #[test]
    fn faces_share_their_diagonal() {
        let mesh = build_cube(Vec3::ONE);
        for face in mesh.positions.chunks_exact(18) {
            assert_eq!(face[0..3], face[9..12]);
            assert_eq!(face[6..9], face[12..15]);
        }
    }

    #[test]
    fn vertices_stay_within_half_unit() {
        let mesh = build_cube(Vec3::ONE);
        assert!(mesh.positions.iter().all(|coord| coord.abs() == 0.5));
    }

    #[test]
    fn head_cube_samples_the_atlas() {
        let mesh = build_head_cube();
        assert_eq!(mesh.positions.len(), 108);
        assert_eq!(mesh.tex_coords.len(), 72);
        assert!(mesh
            .tex_coords
            .iter()
            .all(|coord| (0.0..=1.0).contains(coord)));
    }

    #[test]
    fn head_front_uses_front_cell() {
        let mesh = build_head_cube();
        // -X is the last face
        let front = &mesh.tex_coords[5 * FLOATS_PER_FACE_UV..];
        let (min, max) = AtlasCell::FRONT.uv_bounds();
        assert_eq!(min, Vec2::new(0.125, 0.75));
        assert_eq!(max, Vec2::new(0.25, 0.875));
        for uv in front.chunks_exact(2) {
            assert!(uv[0] == min.x || uv[0] == max.x);
            assert!(uv[1] == min.y || uv[1] == max.y);
        }
    }
}

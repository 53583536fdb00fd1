#![allow(
    missing_docs,
    reason = "geometry helpers are documented where non-obvious"
)]
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::indexing_slicing,
        clippy::float_cmp,
        reason = "tests"
    )
)]

mod camera;
mod cube;
mod grid;
mod mesh;
mod projection;

pub use camera::Camera;
pub use cube::{build_cube, build_head_cube, AtlasCell, HEAD_ATLAS_SIZE, HEAD_CELL_SIZE};
pub use grid::build_grid;
pub use mesh::{FaceError, Mesh, FLOATS_PER_FACE_POSITION, FLOATS_PER_FACE_UV, VERTICES_PER_FACE};
pub use projection::{Projection, ProjectionError};

/// Number of vertices of a cube made of two triangles per face.
pub const VERTICES_PER_CUBE: usize = 6 * VERTICES_PER_FACE;

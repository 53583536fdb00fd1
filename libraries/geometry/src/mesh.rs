use std::fmt::{self, Display};

use tracing::warn;

/// Two triangles sharing a diagonal.
pub const VERTICES_PER_FACE: usize = 6;
pub const FLOATS_PER_FACE_POSITION: usize = VERTICES_PER_FACE * 3;
pub const FLOATS_PER_FACE_UV: usize = VERTICES_PER_FACE * 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceError {
    pub positions: usize,
    pub tex_coords: usize,
}

impl Display for FaceError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "a face needs {FLOATS_PER_FACE_POSITION} position and {FLOATS_PER_FACE_UV} texture \
             coordinate floats, got {} and {}",
            self.positions, self.tex_coords
        )
    }
}

impl std::error::Error for FaceError {}

/// Flat vertex data ready to be uploaded as two separate attribute buffers.
///
/// `positions` holds `x, y, z` triples and `tex_coords` holds `u, v` pairs, index aligned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<f32>,
    pub tex_coords: Vec<f32>,
}

impl Mesh {
    #[must_use]
    pub fn with_faces(faces: usize) -> Self {
        Self {
            positions: Vec::with_capacity(faces * FLOATS_PER_FACE_POSITION),
            tex_coords: Vec::with_capacity(faces * FLOATS_PER_FACE_UV),
        }
    }

    /// Appends one quad face.
    ///
    /// # Errors
    ///
    /// Returns an error and leaves the mesh untouched if the slices do not describe exactly
    /// [`VERTICES_PER_FACE`] vertices.
    pub fn push_face(&mut self, positions: &[f32], tex_coords: &[f32]) -> Result<(), FaceError> {
        if positions.len() != FLOATS_PER_FACE_POSITION || tex_coords.len() != FLOATS_PER_FACE_UV {
            return Err(FaceError {
                positions: positions.len(),
                tex_coords: tex_coords.len(),
            });
        }
        self.positions.extend_from_slice(positions);
        self.tex_coords.extend_from_slice(tex_coords);
        Ok(())
    }

    /// Like [`Mesh::push_face`] but a malformed face is logged and skipped.
    pub fn add_face(&mut self, positions: &[f32], tex_coords: &[f32]) {
        if let Err(error) = self.push_face(positions, tex_coords) {
            warn!("skipping face: {error}");
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[must_use]
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    #[must_use]
    pub fn tex_coord_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.tex_coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_face_is_skipped() {
        let mut mesh = Mesh::default();
        assert_eq!(
            mesh.push_face(&[0.0; 17], &[0.0; FLOATS_PER_FACE_UV]),
            Err(FaceError {
                positions: 17,
                tex_coords: FLOATS_PER_FACE_UV
            })
        );
        mesh.add_face(&[0.0; FLOATS_PER_FACE_POSITION], &[0.0; 8]);
        assert_eq!(mesh, Mesh::default());

        mesh.add_face(&[0.0; FLOATS_PER_FACE_POSITION], &[0.0; FLOATS_PER_FACE_UV]);
        assert_eq!(mesh.vertex_count(), VERTICES_PER_FACE);
        assert_eq!(mesh.position_bytes().len(), FLOATS_PER_FACE_POSITION * 4);
    }
}

use std::{
    f32::consts::PI,
    fmt::{self, Display},
    ops::Range,
};

use glam::Mat4;

/// Rejected projection parameters.
///
/// All checks happen before a matrix is computed so a degenerate input never turns into a
/// matrix full of `NaN`s or infinities.
#[derive(Clone, Debug, PartialEq)]
pub enum ProjectionError {
    EmptySurface { width: u32, height: u32 },
    FieldOfView(f32),
    DepthRange { near: f32, far: f32 },
}

impl Display for ProjectionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::EmptySurface { width, height } => {
                write!(formatter, "surface of {width}x{height} pixels has no area")
            }
            ProjectionError::FieldOfView(fov) => {
                write!(
                    formatter,
                    "field of view of {fov} radians is outside of (0, π)"
                )
            }
            ProjectionError::DepthRange { near, far } => {
                write!(formatter, "invalid depth range {near}..{far}")
            }
        }
    }
}

impl std::error::Error for ProjectionError {}

#[derive(Clone, Debug, PartialEq)]
pub enum Projection {
    Perspective {
        surface_width: u32,
        surface_height: u32,
        /// vertical field of view in radians
        fov: f32,
        z_range: Range<f32>,
    },
}

impl Projection {
    /// Creates a perspective projection.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface has no area, the field of view is not within `(0, π)`
    /// or the depth range is not a finite, non-empty range in front of the camera.
    pub fn new_perspective(
        (surface_width, surface_height): (u32, u32),
        fov: f32,
        z_range: Range<f32>,
    ) -> Result<Self, ProjectionError> {
        if surface_width == 0 || surface_height == 0 {
            return Err(ProjectionError::EmptySurface {
                width: surface_width,
                height: surface_height,
            });
        }
        if !fov.is_finite() || fov <= 0.0 || fov >= PI {
            return Err(ProjectionError::FieldOfView(fov));
        }
        let (near, far) = (z_range.start, z_range.end);
        if !near.is_finite() || !far.is_finite() || near <= 0.0 || far <= near {
            return Err(ProjectionError::DepthRange { near, far });
        }

        Ok(Self::Perspective {
            surface_width,
            surface_height,
            fov,
            z_range,
        })
    }

    fn surface_width(&self) -> u32 {
        match *self {
            Projection::Perspective { surface_width, .. } => surface_width,
        }
    }

    fn surface_height(&self) -> u32 {
        match *self {
            Projection::Perspective { surface_height, .. } => surface_height,
        }
    }

    #[must_use]
    pub fn near(&self) -> f32 {
        match *self {
            Projection::Perspective { ref z_range, .. } => z_range.start,
        }
    }

    #[must_use]
    pub fn far(&self) -> f32 {
        match *self {
            Projection::Perspective { ref z_range, .. } => z_range.end,
        }
    }

    #[must_use]
    pub fn fov(&self) -> f32 {
        match *self {
            Projection::Perspective { fov, .. } => fov,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "surface dimensions are far below 2^24"
    )]
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.surface_width() as f32 / self.surface_height() as f32
    }

    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov(), self.aspect_ratio(), self.near(), self.far())
    }
}

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use glam::{Mat4, Vec3};
use lib_geometry::{Camera, Projection};
use serde::{Deserialize, Serialize};

use crate::{
    error::InputError,
    settings::{LensSettings, OrbitSettings},
};

/// One of the eight corners the static camera can look from.
///
/// Left/Right, Front/Back and Top/Bottom select the sign on the x, y and z axis respectively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "Left-Front-Top")]
    LeftFrontTop,
    #[serde(rename = "Left-Front-Bottom")]
    LeftFrontBottom,
    #[serde(rename = "Left-Back-Top")]
    LeftBackTop,
    #[serde(rename = "Left-Back-Bottom")]
    LeftBackBottom,
    #[serde(rename = "Right-Front-Top")]
    RightFrontTop,
    #[serde(rename = "Right-Front-Bottom")]
    RightFrontBottom,
    #[serde(rename = "Right-Back-Top")]
    RightBackTop,
    #[serde(rename = "Right-Back-Bottom")]
    RightBackBottom,
}

impl Direction {
    pub const ALL: [Self; 8] = [
        Self::LeftFrontTop,
        Self::LeftFrontBottom,
        Self::LeftBackTop,
        Self::LeftBackBottom,
        Self::RightFrontTop,
        Self::RightFrontBottom,
        Self::RightBackTop,
        Self::RightBackBottom,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::LeftFrontTop => "Left-Front-Top",
            Self::LeftFrontBottom => "Left-Front-Bottom",
            Self::LeftBackTop => "Left-Back-Top",
            Self::LeftBackBottom => "Left-Back-Bottom",
            Self::RightFrontTop => "Right-Front-Top",
            Self::RightFrontBottom => "Right-Front-Bottom",
            Self::RightBackTop => "Right-Back-Top",
            Self::RightBackBottom => "Right-Back-Bottom",
        }
    }

    /// The corner of the cube `[-1, 1]³` this direction points to.
    #[must_use]
    pub fn as_vec3(self) -> Vec3 {
        let (x, y, z) = match self {
            Self::LeftFrontTop => (-1.0, -1.0, 1.0),
            Self::LeftFrontBottom => (-1.0, -1.0, -1.0),
            Self::LeftBackTop => (-1.0, 1.0, 1.0),
            Self::LeftBackBottom => (-1.0, 1.0, -1.0),
            Self::RightFrontTop => (1.0, -1.0, 1.0),
            Self::RightFrontBottom => (1.0, -1.0, -1.0),
            Self::RightBackTop => (1.0, 1.0, 1.0),
            Self::RightBackBottom => (1.0, 1.0, -1.0),
        };
        Vec3::new(x, y, z)
    }
}

impl Display for Direction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = InputError;

    /// Accepts the names as shown in the user interface, ignoring case.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|direction| direction.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| InputError::UnknownDirection(name.to_owned()))
    }
}

/// The user-controlled parameters of the static camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewParameters {
    /// vertical field of view in degrees
    pub view_angle: f32,
    pub distance: f32,
    pub direction: Direction,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            view_angle: 60.0,
            distance: 45.0,
            direction: Direction::LeftFrontTop,
        }
    }
}

fn parse_number(field: &'static str, value: Option<&str>) -> Result<f32, InputError> {
    let value = value.map(str::trim).filter(|value| !value.is_empty());
    let value = value.ok_or(InputError::Missing(field))?;
    value.parse().map_err(|_| InputError::Unparsable {
        field,
        value: value.to_owned(),
    })
}

impl ViewParameters {
    /// Parses the raw text of the input fields.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is empty, not a number, out of range or names no known
    /// direction.
    pub fn parse(
        view_angle: Option<&str>,
        distance: Option<&str>,
        direction: Option<&str>,
    ) -> Result<Self, InputError> {
        let parameters = Self {
            view_angle: parse_number("view angle", view_angle)?,
            distance: parse_number("distance", distance)?,
            direction: direction.ok_or(InputError::Missing("direction"))?.parse()?,
        };
        parameters.validate()?;
        Ok(parameters)
    }

    /// # Errors
    ///
    /// Returns an error for a non-positive or non-finite distance or a view angle outside of
    /// `(0°, 180°)`.
    pub fn validate(&self) -> Result<(), InputError> {
        if !(self.distance.is_finite() && self.distance > 0.0) {
            return Err(InputError::OutOfRange {
                field: "distance",
                value: self.distance,
            });
        }
        if !(self.view_angle.is_finite() && self.view_angle > 0.0 && self.view_angle < 180.0) {
            return Err(InputError::OutOfRange {
                field: "view angle",
                value: self.view_angle,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn eye(&self) -> Vec3 {
        self.direction.as_vec3() * self.distance
    }
}

/// A camera circling the origin while slowly bobbing up and down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    /// radians, only ever increases
    pub angle: f32,
    pub radius: f32,
    pub base_height: f32,
    pub amplitude: f32,
    /// radians per tick
    pub angle_step: f32,
    /// vertical field of view in degrees
    pub view_angle: f32,
}

impl OrbitCamera {
    #[must_use]
    pub fn new(settings: &OrbitSettings, view_angle: f32) -> Self {
        Self {
            angle: 0.0,
            radius: settings.radius,
            base_height: settings.base_height,
            amplitude: settings.amplitude,
            angle_step: settings.angle_step,
            view_angle,
        }
    }

    pub fn advance(&mut self) {
        self.angle += self.angle_step;
    }

    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let (sin, cos) = self.angle.sin_cos();
        Vec3::new(
            self.radius * cos,
            self.radius * sin,
            self.base_height + self.amplitude * (self.angle / 2.0).sin(),
        )
    }
}

/// The camera model currently in charge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraState {
    Static(ViewParameters),
    Orbiting(OrbitCamera),
}

/// Everything a frame needs to know about the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMatrices {
    pub eye: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    /// vertical field of view in degrees
    pub view_angle: f32,
    pub near: f32,
    pub far: f32,
}

/// Computes view and projection for a surface of `surface_size` pixels.
///
/// Both camera models look at the origin with +Z up. The far plane is placed at `far_factor`
/// times the configured distance for the static camera and times the eye distance while
/// orbiting.
///
/// # Errors
///
/// Returns an error instead of a degenerate matrix when any parameter is out of range.
pub fn compute_matrices(
    state: &CameraState,
    surface_size: (u32, u32),
    lens: &LensSettings,
) -> Result<CameraMatrices, InputError> {
    let (eye, view_angle, reach) = match state {
        CameraState::Static(parameters) => {
            parameters.validate()?;
            (parameters.eye(), parameters.view_angle, parameters.distance)
        }
        CameraState::Orbiting(orbit) => (orbit.eye(), orbit.view_angle, orbit.eye().length()),
    };
    if !eye.is_finite() || eye.length_squared() == 0.0 {
        return Err(InputError::OutOfRange {
            field: "distance",
            value: eye.length(),
        });
    }

    let camera = Camera::new(eye, Vec3::ZERO);
    let far = reach * lens.far_factor;
    let projection = Projection::new_perspective(
        surface_size,
        view_angle.to_radians(),
        lens.near..far,
    )?;

    Ok(CameraMatrices {
        eye,
        view: camera.matrix(),
        projection: projection.matrix(),
        view_angle,
        near: projection.near(),
        far: projection.far(),
    })
}

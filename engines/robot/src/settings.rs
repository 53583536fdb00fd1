use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{camera::ViewParameters, error::SetupError};

/// Every tunable of the viewer.
///
/// Missing fields of a JSON document fall back to their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Inputs used on startup and restored on reset.
    pub view: ViewParameters,
    pub orbit: OrbitSettings,
    pub lens: LensSettings,
    pub clear_color: [f32; 4],
    pub grid: GridSettings,
    pub textures: TextureSettings,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            view: ViewParameters::default(),
            orbit: OrbitSettings::default(),
            lens: LensSettings::default(),
            clear_color: [0.1, 0.1, 0.1, 1.0],
            grid: GridSettings::default(),
            textures: TextureSettings::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub radius: f32,
    pub base_height: f32,
    pub amplitude: f32,
    /// radians per tick
    pub angle_step: f32,
    pub tick_period_ms: u64,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            radius: 45.0,
            base_height: 20.0,
            amplitude: 10.0,
            angle_step: 0.02,
            tick_period_ms: 30,
        }
    }
}

impl OrbitSettings {
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensSettings {
    pub near: f32,
    /// far plane distance relative to the camera distance
    pub far_factor: f32,
}

impl Default for LensSettings {
    fn default() -> Self {
        Self {
            near: 0.001,
            far_factor: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub extent: f32,
    pub step: f32,
    pub color: [f32; 3],
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            extent: 100.0,
            step: 10.0,
            color: [0.5, 0.5, 0.5],
        }
    }
}

impl GridSettings {
    #[must_use]
    pub fn color(&self) -> Vec3 {
        Vec3::from_array(self.color)
    }
}

/// Image URLs, relative to the page or the asset root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSettings {
    pub surface: String,
    pub head: String,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            surface: "textures/metal.png".to_owned(),
            head: "textures/head.png".to_owned(),
        }
    }
}

fn invalid(reason: impl Into<String>) -> SetupError {
    SetupError::InvalidSettings(reason.into())
}

impl ViewerSettings {
    /// Reads settings from a JSON document and validates them.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or contains unusable values.
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|error| invalid(error.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// # Errors
    ///
    /// Returns an error naming the first unusable value.
    pub fn validate(&self) -> Result<(), SetupError> {
        self.view
            .validate()
            .map_err(|error| invalid(format!("default view: {error}")))?;

        let orbit = &self.orbit;
        for (name, value) in [
            ("orbit radius", orbit.radius),
            ("orbit base height", orbit.base_height),
            ("orbit amplitude", orbit.amplitude),
            ("orbit angle step", orbit.angle_step),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {value}")));
            }
        }
        if orbit.radius <= 0.0 {
            return Err(invalid(format!(
                "orbit radius must be positive, got {}",
                orbit.radius
            )));
        }
        if orbit.angle_step < 0.0 {
            return Err(invalid("orbit angle step must not be negative"));
        }
        if orbit.tick_period_ms == 0 {
            return Err(invalid("tick period must be at least one millisecond"));
        }

        let lens = &self.lens;
        if !(lens.near.is_finite() && lens.near > 0.0) {
            return Err(invalid(format!(
                "near plane must be positive, got {}",
                lens.near
            )));
        }
        if !(lens.far_factor.is_finite() && lens.far_factor > 0.0) {
            return Err(invalid(format!(
                "far factor must be positive, got {}",
                lens.far_factor
            )));
        }

        let grid = &self.grid;
        if !(grid.extent.is_finite() && grid.step.is_finite() && grid.step > 0.0) {
            return Err(invalid(format!(
                "grid needs a finite extent and a positive step, got {} and {}",
                grid.extent, grid.step
            )));
        }
        Ok(())
    }
}

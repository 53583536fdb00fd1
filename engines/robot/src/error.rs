use std::fmt::{self, Display};

use lib_geometry::ProjectionError;
use lib_time::ScheduleError;
use robot_viewer_framework::{DeviceError, FetchError, ShaderStage};

pub type ViewerResult<T> = Result<T, ViewerError>;

/// Failures that prevent the viewer from being set up at all.
#[derive(Debug)]
pub enum SetupError {
    Compile { stage: ShaderStage, log: String },
    Link(String),
    Surface(DeviceError),
    Buffer(DeviceError),
    Texture(DeviceError),
    Scheduler(ScheduleError),
    InvalidSettings(String),
}

impl Display for SetupError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Compile { stage, log } => {
                write!(formatter, "failed to compile {stage} shader: {log}")
            }
            SetupError::Link(log) => write!(formatter, "failed to link program: {log}"),
            SetupError::Surface(error) => write!(formatter, "no render surface: {error}"),
            SetupError::Buffer(error) => write!(formatter, "failed to create buffer: {error}"),
            SetupError::Texture(error) => write!(formatter, "failed to create texture: {error}"),
            SetupError::Scheduler(error) => write!(formatter, "no timer available: {error}"),
            SetupError::InvalidSettings(reason) => write!(formatter, "invalid settings: {reason}"),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Surface(error) | SetupError::Buffer(error) | SetupError::Texture(error) => {
                Some(error)
            }
            SetupError::Scheduler(error) => Some(error),
            SetupError::Compile { .. } | SetupError::Link(_) | SetupError::InvalidSettings(_) => {
                None
            }
        }
    }
}

/// A missing or unusable value coming from the user interface.
#[derive(Clone, Debug, PartialEq)]
pub enum InputError {
    Missing(&'static str),
    Unparsable { field: &'static str, value: String },
    UnknownDirection(String),
    OutOfRange { field: &'static str, value: f32 },
    Projection(ProjectionError),
}

impl Display for InputError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Missing(field) => write!(formatter, "no value given for {field}"),
            InputError::Unparsable { field, value } => {
                write!(formatter, "`{value}` is not a number (field {field})")
            }
            InputError::UnknownDirection(name) => write!(formatter, "unknown direction `{name}`"),
            InputError::OutOfRange { field, value } => {
                write!(formatter, "{value} is out of range for {field}")
            }
            InputError::Projection(error) => write!(formatter, "{error}"),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::Projection(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ProjectionError> for InputError {
    fn from(value: ProjectionError) -> Self {
        Self::Projection(value)
    }
}

/// A single draw that could not be issued. Other draws of the same frame are unaffected.
#[derive(Clone, Debug, PartialEq)]
pub enum ResourceError {
    InvalidTexture(&'static str),
    MissingLocation(&'static str),
    Device(DeviceError),
}

impl Display for ResourceError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::InvalidTexture(part) => {
                write!(formatter, "texture of {part} is not a valid texture object")
            }
            ResourceError::MissingLocation(name) => {
                write!(formatter, "program has no active `{name}`")
            }
            ResourceError::Device(error) => write!(formatter, "device error: {error}"),
        }
    }
}

impl std::error::Error for ResourceError {}

impl From<DeviceError> for ResourceError {
    fn from(value: DeviceError) -> Self {
        Self::Device(value)
    }
}

/// An image that could not be turned into texture content.
#[derive(Clone, Debug, PartialEq)]
pub enum AssetError {
    Fetch(FetchError),
    Decode { url: String, reason: String },
}

impl Display for AssetError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Fetch(error) => write!(formatter, "{error}"),
            AssetError::Decode { url, reason } => {
                write!(formatter, "failed to decode `{url}`: {reason}")
            }
        }
    }
}

impl std::error::Error for AssetError {}

impl From<FetchError> for AssetError {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}

#[derive(Debug)]
pub enum ViewerError {
    Setup(SetupError),
    Input(InputError),
    Resource(ResourceError),
    /// Textures are still loading.
    NotReady,
    /// The orbit animation owns the camera until it is stopped.
    AnimationRunning,
}

impl Display for ViewerError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::Setup(error) => write!(formatter, "{error}"),
            ViewerError::Input(error) => write!(formatter, "invalid input: {error}"),
            ViewerError::Resource(error) => write!(formatter, "{error}"),
            ViewerError::NotReady => formatter.write_str("scene is not ready yet"),
            ViewerError::AnimationRunning => {
                formatter.write_str("camera is animated, stop the animation first")
            }
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::Setup(error) => Some(error),
            ViewerError::Input(error) => Some(error),
            ViewerError::Resource(error) => Some(error),
            ViewerError::NotReady | ViewerError::AnimationRunning => None,
        }
    }
}

impl From<SetupError> for ViewerError {
    fn from(value: SetupError) -> Self {
        Self::Setup(value)
    }
}

impl From<InputError> for ViewerError {
    fn from(value: InputError) -> Self {
        Self::Input(value)
    }
}

impl From<ResourceError> for ViewerError {
    fn from(value: ResourceError) -> Self {
        Self::Resource(value)
    }
}

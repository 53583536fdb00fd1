use std::{
    fmt::{self, Display},
    io,
    path::PathBuf,
};

use engine_robot_viewer::{SetupError, ViewerError};
use robot_viewer_framework::DeviceError;

pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[derive(Debug)]
pub enum ApplicationError {
    Surface(DeviceError),
    Settings { path: PathBuf, error: io::Error },
    Setup(SetupError),
    Viewer(ViewerError),
}

impl Display for ApplicationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::Surface(error) => write!(formatter, "no render surface: {error}"),
            ApplicationError::Settings { path, error } => {
                write!(
                    formatter,
                    "failed to read settings from {}: {error}",
                    path.display()
                )
            }
            ApplicationError::Setup(error) => write!(formatter, "failed to set up viewer: {error}"),
            ApplicationError::Viewer(error) => write!(formatter, "{error}"),
        }
    }
}

impl std::error::Error for ApplicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicationError::Surface(error) => Some(error),
            ApplicationError::Settings { error, .. } => Some(error),
            ApplicationError::Setup(error) => Some(error),
            ApplicationError::Viewer(error) => Some(error),
        }
    }
}

impl From<SetupError> for ApplicationError {
    fn from(value: SetupError) -> Self {
        Self::Setup(value)
    }
}

impl From<ViewerError> for ApplicationError {
    fn from(value: ViewerError) -> Self {
        Self::Viewer(value)
    }
}

#[cfg(not(target_family = "wasm"))]
impl From<ApplicationError> for std::process::ExitCode {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Surface(_) | ApplicationError::Settings { .. } => Self::from(2),
            ApplicationError::Setup(_) => Self::from(3),
            ApplicationError::Viewer(_) => Self::FAILURE,
        }
    }
}

#[cfg(target_family = "wasm")]
impl From<ApplicationError> for wasm_bindgen::JsValue {
    fn from(value: ApplicationError) -> Self {
        value.to_string().into()
    }
}

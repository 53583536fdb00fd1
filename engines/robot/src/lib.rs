#![allow(missing_docs, reason = "consumed by the viewer application only")]
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::indexing_slicing,
        clippy::float_cmp,
        reason = "tests"
    )
)]

pub mod animation;
pub mod camera;
pub mod error;
pub mod program;
pub mod scene;
pub mod settings;
pub mod texture;
mod viewer;

pub use animation::{AnimationDriver, AnimationState};
pub use camera::{
    compute_matrices, CameraMatrices, CameraState, Direction, OrbitCamera, ViewParameters,
};
pub use error::{AssetError, InputError, ResourceError, SetupError, ViewerError, ViewerResult};
pub use scene::{Part, PartShape, RenderContext, ROBOT_PARTS};
pub use settings::ViewerSettings;
pub use texture::{load_texture, SceneImages, SceneTextures, TextureSlot};
pub use viewer::Viewer;

use std::{rc::Rc, sync::Once};

use engine_robot_viewer::{SetupError, Viewer, ViewerError, ViewerResult, ViewerSettings};
use lib_time::IntervalScheduler;
use robot_viewer_framework::{image_source::FetchImageSource, init_logger, WebGlDevice};
use tracing::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::error::{ApplicationError, ApplicationResult};

static LOGGER: Once = Once::new();

type WebViewer = Viewer<WebGlDevice, IntervalScheduler>;

/// Frames requested before the textures arrived are skipped rather than reported.
fn frame_result(result: ViewerResult<bool>) -> Result<bool, JsValue> {
    match result {
        Ok(complete) => Ok(complete),
        Err(ViewerError::NotReady) => Ok(false),
        Err(error) => {
            warn!("{error}");
            Err(ApplicationError::from(error).into())
        }
    }
}

/// The viewer as seen by the host page.
///
/// The page forwards the raw values of its input fields and button clicks.
#[wasm_bindgen]
pub struct RobotViewer {
    viewer: Rc<WebViewer>,
}

impl RobotViewer {
    fn create(canvas_id: &str, settings: Option<&str>) -> ApplicationResult<Self> {
        let settings = match settings {
            Some(json) => ViewerSettings::from_json(json)?,
            None => ViewerSettings::default(),
        };
        let device = WebGlDevice::from_canvas_id(canvas_id).map_err(ApplicationError::Surface)?;
        let scheduler = IntervalScheduler::new().map_err(SetupError::Scheduler)?;
        let viewer = Rc::new(Viewer::new(device, settings, scheduler)?);

        let loader = Rc::clone(&viewer);
        spawn_local(async move {
            match loader.load_textures(&FetchImageSource).await {
                Ok(complete) => info!("first frame drawn (complete: {complete})"),
                Err(error) => error!("failed to draw the first frame: {error}"),
            }
        });

        Ok(Self { viewer })
    }
}

#[wasm_bindgen]
impl RobotViewer {
    /// Attaches to the canvas with id `canvas_id` and starts loading the textures.
    ///
    /// `settings` is an optional JSON document overriding the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, settings: Option<String>) -> Result<RobotViewer, JsValue> {
        LOGGER.call_once(init_logger);
        Ok(Self::create(canvas_id, settings.as_deref())?)
    }

    /// Redraws the static camera from the raw input values.
    ///
    /// Returns whether the whole scene was drawn. Throws if an input is unusable or the orbit
    /// animation is running.
    pub fn redraw(
        &self,
        view_angle: Option<String>,
        distance: Option<String>,
        direction: Option<String>,
    ) -> Result<bool, JsValue> {
        frame_result(self.viewer.redraw_with_input(
            view_angle.as_deref(),
            distance.as_deref(),
            direction.as_deref(),
        ))
    }

    #[wasm_bindgen(js_name = startAnimation)]
    pub fn start_animation(&self) -> Result<bool, JsValue> {
        self.viewer
            .start_animation()
            .map_err(|error| ApplicationError::from(error).into())
    }

    #[wasm_bindgen(js_name = stopAnimation)]
    pub fn stop_animation(&self) -> bool {
        self.viewer.stop_animation()
    }

    /// Stops the animation and redraws the default view.
    pub fn reset(&self) -> Result<bool, JsValue> {
        frame_result(self.viewer.reset())
    }

    #[wasm_bindgen(js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.viewer.is_animating()
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.viewer.is_ready()
    }

    /// The current inputs as `[view angle, distance, direction]`, e.g. to refill the form after
    /// a reset.
    pub fn inputs(&self) -> Vec<JsValue> {
        let view = self.viewer.view();
        vec![
            view.view_angle.into(),
            view.distance.into(),
            view.direction.name().into(),
        ]
    }
}

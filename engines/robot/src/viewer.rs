use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use lib_time::Scheduler;
use robot_viewer_framework::{ImageSource, RenderDevice};
use tracing::{debug, info, warn};
use web_time::Instant;

use crate::{
    animation::AnimationDriver,
    camera::{compute_matrices, CameraMatrices, CameraState, OrbitCamera, ViewParameters},
    error::{SetupError, ViewerError, ViewerResult},
    scene::RenderContext,
    settings::ViewerSettings,
    texture::{SceneImages, SceneTextures},
};

/// Everything a frame is rendered from.
struct ViewerState<D: RenderDevice> {
    device: D,
    context: RenderContext<D>,
    textures: SceneTextures<D>,
    /// `false` until the scene images have been installed
    ready: bool,
    settings: ViewerSettings,
    view: ViewParameters,
    camera: CameraState,
    /// orbit put aside by a static redraw, resumed by the next start
    parked_orbit: Option<OrbitCamera>,
    last_frame: Option<CameraMatrices>,
}

impl<D: RenderDevice> ViewerState<D> {
    fn render(&mut self) -> ViewerResult<bool> {
        if !self.ready {
            debug!("skipping frame, textures are still loading");
            return Err(ViewerError::NotReady);
        }
        let started = Instant::now();

        let matrices = compute_matrices(
            &self.camera,
            self.device.surface_size(),
            &self.settings.lens,
        )?;
        let complete = self
            .context
            .draw_scene(&mut self.device, &matrices, &self.textures);
        self.last_frame = Some(matrices);

        debug!(
            "frame from {} drawn in {:?} (complete: {complete})",
            matrices.eye,
            started.elapsed()
        );
        Ok(complete)
    }

    fn tick(&mut self) {
        if let CameraState::Orbiting(orbit) = &mut self.camera {
            orbit.advance();
        }
        match self.render() {
            Ok(_) | Err(ViewerError::NotReady) => {}
            Err(error) => warn!("animation frame failed: {error}"),
        }
    }
}

/// The commands offered to the user: redraw, start, stop and reset.
///
/// All commands take `&self` so they can be invoked from event handlers and timer callbacks
/// sharing one viewer.
pub struct Viewer<D: RenderDevice + 'static, S: Scheduler> {
    state: Rc<RefCell<ViewerState<D>>>,
    scheduler: S,
    animation: RefCell<AnimationDriver>,
}

impl<D: RenderDevice + 'static, S: Scheduler> Viewer<D, S> {
    /// Builds programs, geometry and placeholder textures.
    ///
    /// Nothing is drawn until the scene images are installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the device cannot provide the
    /// programs, buffers or textures.
    pub fn new(mut device: D, settings: ViewerSettings, scheduler: S) -> Result<Self, SetupError> {
        settings.validate()?;
        let context = RenderContext::new(&mut device, &settings)?;
        let textures = SceneTextures::new(&mut device).map_err(SetupError::Texture)?;

        let view = settings.view;
        info!(
            "viewer set up for a {:?} surface, initial view {view:?}",
            device.surface_size()
        );
        let state = ViewerState {
            device,
            context,
            textures,
            ready: false,
            settings,
            view,
            camera: CameraState::Static(view),
            parked_orbit: None,
            last_frame: None,
        };
        Ok(Self {
            state: Rc::new(RefCell::new(state)),
            scheduler,
            animation: RefCell::new(AnimationDriver::new()),
        })
    }

    /// Uploads the scene images and renders the first frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the first frame cannot be computed.
    pub fn install_textures(&self, images: &SceneImages) -> ViewerResult<bool> {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        state.textures.install(&mut state.device, images);
        state.ready = true;
        info!("textures installed");
        state.render()
    }

    /// Fetches the scene images from `source`, then installs them.
    ///
    /// Images failing to load are replaced by the placeholder.
    ///
    /// # Errors
    ///
    /// Returns an error if the first frame cannot be computed.
    pub async fn load_textures<I: ImageSource>(&self, source: &I) -> ViewerResult<bool> {
        let settings = self.state.borrow().settings.textures.clone();
        let images = SceneImages::fetch(source, &settings).await;
        self.install_textures(&images)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.borrow().ready
    }

    /// Renders the current camera again.
    ///
    /// Returns whether every part of the scene was drawn.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::NotReady`] before the textures are installed or an input error
    /// if the camera state cannot be turned into matrices.
    pub fn redraw(&self) -> ViewerResult<bool> {
        self.state.borrow_mut().render()
    }

    /// Switches to the static camera described by `view` and renders it.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::AnimationRunning`] while the orbit is animated and an input error
    /// for unusable parameters. In both cases nothing is drawn and the previous camera and frame
    /// stay.
    pub fn redraw_with(&self, view: ViewParameters) -> ViewerResult<bool> {
        if self.is_animating() {
            return Err(ViewerError::AnimationRunning);
        }
        view.validate()?;

        let mut state = self.state.borrow_mut();
        let camera = CameraState::Static(view);
        // commit only views the lens accepts
        compute_matrices(&camera, state.device.surface_size(), &state.settings.lens)
            .inspect_err(|error| warn!("ignoring redraw request: {error}"))?;

        if let CameraState::Orbiting(orbit) = state.camera {
            state.parked_orbit = Some(orbit);
        }
        state.view = view;
        state.camera = camera;
        state.render()
    }

    /// Parses the raw input field values and renders the resulting static view.
    ///
    /// # Errors
    ///
    /// See [`Viewer::redraw_with`] and [`ViewParameters::parse`].
    pub fn redraw_with_input(
        &self,
        view_angle: Option<&str>,
        distance: Option<&str>,
        direction: Option<&str>,
    ) -> ViewerResult<bool> {
        let view = ViewParameters::parse(view_angle, distance, direction)
            .inspect_err(|error| warn!("ignoring redraw request: {error}"))?;
        self.redraw_with(view)
    }

    /// Starts orbiting. Does nothing if the animation is already running.
    ///
    /// A previously stopped orbit continues where it was frozen.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler refused the tick.
    pub fn start_animation(&self) -> ViewerResult<bool> {
        if self.is_animating() {
            debug!("start ignored, animation is running");
            return Ok(false);
        }

        let (period, previous_camera) = {
            let mut state = self.state.borrow_mut();
            let previous_camera = state.camera;
            let mut orbit = match previous_camera {
                CameraState::Orbiting(orbit) => orbit,
                CameraState::Static(_) => match state.parked_orbit.take() {
                    Some(orbit) => orbit,
                    None => OrbitCamera::new(&state.settings.orbit, state.view.view_angle),
                },
            };
            orbit.view_angle = state.view.view_angle;
            state.camera = CameraState::Orbiting(orbit);
            (state.settings.orbit.tick_period(), previous_camera)
        };

        let tick = tick_task(Rc::downgrade(&self.state));
        let started = self
            .animation
            .borrow_mut()
            .start(&self.scheduler, period, tick);
        match started {
            Ok(started) => Ok(started),
            Err(error) => {
                self.state.borrow_mut().camera = previous_camera;
                Err(SetupError::Scheduler(error).into())
            }
        }
    }

    /// Stops orbiting and freezes the camera at its current position.
    ///
    /// Returns `false` if the animation was not running.
    pub fn stop_animation(&self) -> bool {
        self.animation.borrow_mut().stop(&self.scheduler)
    }

    /// Stops the animation, restores the default inputs and renders them.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::NotReady`] before the textures are installed. The defaults are
    /// restored nevertheless.
    pub fn reset(&self) -> ViewerResult<bool> {
        self.stop_animation();

        let mut state = self.state.borrow_mut();
        let view = state.settings.view;
        state.view = view;
        state.camera = CameraState::Static(view);
        state.parked_orbit = None;
        info!("reset to {view:?}");
        state.render()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.borrow().is_running()
    }

    /// The current static inputs.
    #[must_use]
    pub fn view(&self) -> ViewParameters {
        self.state.borrow().view
    }

    #[must_use]
    pub fn camera(&self) -> CameraState {
        self.state.borrow().camera
    }

    /// Camera of the most recently drawn frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<CameraMatrices> {
        self.state.borrow().last_frame
    }

    #[must_use]
    pub fn settings(&self) -> ViewerSettings {
        self.state.borrow().settings.clone()
    }

    /// Grants access to the device, e.g. to inspect a recording.
    pub fn with_device<R>(&self, function: impl FnOnce(&mut D) -> R) -> R {
        function(&mut self.state.borrow_mut().device)
    }
}

impl<D: RenderDevice + 'static, S: Scheduler> Drop for Viewer<D, S> {
    fn drop(&mut self) {
        self.stop_animation();
    }
}

fn tick_task<D: RenderDevice + 'static>(state: Weak<RefCell<ViewerState<D>>>) -> lib_time::Task {
    Box::new(move || {
        let Some(state) = state.upgrade() else {
            return;
        };
        match state.try_borrow_mut() {
            Ok(mut state) => state.tick(),
            Err(_) => warn!("viewer busy, skipping animation tick"),
        };
    })
}

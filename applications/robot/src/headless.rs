//! Renders the viewer into a [`RecordingDevice`] on a virtual clock.
//!
//! Used as a smoke test of the full command sequence without a browser.

use std::{fs, path::Path};

use engine_robot_viewer::{CameraMatrices, Viewer, ViewerSettings};
use lib_time::VirtualClock;
use robot_viewer_framework::{FileImageSource, RecordingDevice};
use tracing::info;

use crate::error::{ApplicationError, ApplicationResult};

const SURFACE_SIZE: (u32, u32) = (600, 600);

/// What a preview run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewReport {
    pub draw_calls: usize,
    /// frames requested by commands, animation ticks not included
    pub frames: usize,
    pub complete_frames: usize,
    pub ticks: usize,
    pub last_frame: Option<CameraMatrices>,
}

/// Reads settings from `path`, falling back to the defaults if there is no such file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_settings(path: &Path) -> ApplicationResult<ViewerSettings> {
    match fs::read_to_string(path) {
        Ok(json) => Ok(ViewerSettings::from_json(&json)?),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            info!("no settings at {}, using defaults", path.display());
            Ok(ViewerSettings::default())
        }
        Err(error) => Err(ApplicationError::Settings {
            path: path.to_owned(),
            error,
        }),
    }
}

/// Loads the textures from `asset_root`, draws the default view, orbits for `ticks` ticks and
/// resets.
///
/// # Errors
///
/// Returns an error if the viewer cannot be set up or a frame cannot be computed.
pub fn run_preview(
    settings: ViewerSettings,
    asset_root: &Path,
    ticks: u32,
) -> ApplicationResult<PreviewReport> {
    let clock = VirtualClock::new();
    let tick_period = settings.orbit.tick_period();
    let viewer = Viewer::new(RecordingDevice::new(SURFACE_SIZE), settings, clock.clone())?;

    let source = FileImageSource::new(asset_root);
    let mut complete_frames = 0;
    let mut frames = 0;
    let mut count = |complete: bool| {
        frames += 1;
        complete_frames += usize::from(complete);
    };

    count(pollster::block_on(viewer.load_textures(&source))?);

    viewer.start_animation()?;
    let ticks = clock.advance(tick_period * ticks);
    viewer.stop_animation();
    info!("orbited for {ticks} ticks");

    count(viewer.reset()?);

    let draw_calls = viewer.with_device(|device| device.draws().count());
    let report = PreviewReport {
        draw_calls,
        frames,
        complete_frames,
        ticks,
        last_frame: viewer.last_frame(),
    };
    info!("preview finished: {report:?}");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn preview_without_assets_draws_placeholders() {
        let report =
            run_preview(ViewerSettings::default(), Path::new("does/not/exist"), 10).unwrap();

        assert_eq!(report.frames, 2);
        assert_eq!(report.complete_frames, 2);
        assert_eq!(report.ticks, 10);
        // every tick draws a frame as well
        assert_eq!(report.draw_calls, 12 * 9);
        assert_eq!(
            report.last_frame.map(|frame| frame.eye),
            Some(Vec3::new(-45.0, -45.0, 45.0))
        );
    }

    #[test]
    fn missing_settings_file_means_defaults() {
        let settings = read_settings(Path::new("does/not/exist.json")).unwrap();
        assert_eq!(settings, ViewerSettings::default());
    }
}

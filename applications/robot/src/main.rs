use std::process::ExitCode;

#[cfg(not(target_family = "wasm"))]
fn main() -> ExitCode {
    use std::path::Path;

    use application_robot_viewer::headless::{read_settings, run_preview};
    use robot_viewer_framework::init_logger;
    use tracing::error;

    const ASSET_ROOT: &str = "applications/robot/www";
    const SETTINGS_PATH: &str = "applications/robot/www/settings.json";
    const PREVIEW_TICKS: u32 = 100;

    init_logger();

    let result = read_settings(Path::new(SETTINGS_PATH))
        .and_then(|settings| run_preview(settings, Path::new(ASSET_ROOT), PREVIEW_TICKS));
    match result {
        Ok(report) if report.complete_frames == report.frames => ExitCode::SUCCESS,
        Ok(report) => {
            error!(
                "only {} of {} frames were drawn completely",
                report.complete_frames, report.frames
            );
            ExitCode::FAILURE
        }
        Err(error) => {
            error!("{error}");
            error.into()
        }
    }
}

/// The browser entry point is the exported `RobotViewer`.
#[cfg(target_family = "wasm")]
fn main() -> ExitCode {
    ExitCode::SUCCESS
}

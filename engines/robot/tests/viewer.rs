#![allow(clippy::unwrap_used, clippy::float_cmp, reason = "tests")]

use std::time::Duration;

use engine_robot_viewer::{
    CameraState, Direction, InputError, SceneImages, ViewParameters, Viewer, ViewerError,
    ViewerSettings, ROBOT_PARTS,
};
use glam::Vec3;
use lib_time::{Scheduler, VirtualClock};
use robot_viewer_framework::{MemoryImageSource, RecordingDevice};

const TICK: Duration = Duration::from_millis(30);

fn viewer() -> (Viewer<RecordingDevice, VirtualClock>, VirtualClock) {
    let clock = VirtualClock::new();
    let viewer = Viewer::new(
        RecordingDevice::new((600, 600)),
        ViewerSettings::default(),
        clock.clone(),
    )
    .unwrap();
    (viewer, clock)
}

fn ready_viewer() -> (Viewer<RecordingDevice, VirtualClock>, VirtualClock) {
    let (viewer, clock) = viewer();
    viewer.install_textures(&SceneImages::default()).unwrap();
    (viewer, clock)
}

fn orbit_angle(viewer: &Viewer<RecordingDevice, VirtualClock>) -> f32 {
    match viewer.camera() {
        CameraState::Orbiting(orbit) => orbit.angle,
        CameraState::Static(view) => panic!("expected an orbiting camera, got {view:?}"),
    }
}

fn draw_count(viewer: &Viewer<RecordingDevice, VirtualClock>) -> usize {
    viewer.with_device(|device| device.draws().count())
}

#[test]
fn nothing_is_drawn_before_textures_arrive() {
    let (viewer, clock) = viewer();

    assert!(!viewer.is_ready());
    assert!(matches!(viewer.redraw(), Err(ViewerError::NotReady)));

    // ticks are skipped as well
    viewer.start_animation().unwrap();
    clock.advance(TICK * 5);
    assert_eq!(draw_count(&viewer), 0);
    assert!(viewer.last_frame().is_none());
}

#[test]
fn missing_assets_fall_back_to_placeholders() {
    let (viewer, _clock) = viewer();
    let source = MemoryImageSource::new();

    let complete = pollster::block_on(viewer.load_textures(&source)).unwrap();

    assert!(complete);
    assert!(viewer.is_ready());
    assert_eq!(draw_count(&viewer), ROBOT_PARTS.len() + 1);
}

#[test]
fn first_frame_uses_the_defaults() {
    let (viewer, _clock) = ready_viewer();

    let frame = viewer.last_frame().unwrap();
    assert_eq!(frame.eye, Vec3::new(-45.0, -45.0, 45.0));
    assert_eq!(frame.view_angle, 60.0);
    assert!((frame.far - 450.0).abs() < 1e-3);
}

#[test]
fn static_redraw_follows_the_inputs() {
    let (viewer, _clock) = ready_viewer();

    let complete = viewer
        .redraw_with_input(Some("60"), Some("45"), Some("Right-Back-Bottom"))
        .unwrap();

    assert!(complete);
    let frame = viewer.last_frame().unwrap();
    assert_eq!(frame.eye, Vec3::new(45.0, 45.0, -45.0));
    assert_eq!(viewer.view().direction, Direction::RightBackBottom);
}

#[test]
fn rejected_input_keeps_the_previous_frame() {
    let (viewer, _clock) = ready_viewer();
    let before = viewer.last_frame();
    let draws = draw_count(&viewer);

    let result = viewer.redraw_with_input(Some("60"), Some("45"), Some("Upside-Down"));

    assert!(matches!(
        result,
        Err(ViewerError::Input(InputError::UnknownDirection(_)))
    ));
    assert_eq!(viewer.last_frame(), before);
    assert_eq!(draw_count(&viewer), draws);
    assert_eq!(viewer.view(), ViewParameters::default());
}

#[test]
fn view_rejected_by_the_lens_is_not_kept() {
    let (viewer, _clock) = ready_viewer();
    let before = viewer.last_frame();
    let draws = draw_count(&viewer);

    // far plane ends up in front of the near plane
    let tiny = ViewParameters {
        distance: 1e-5,
        ..ViewParameters::default()
    };
    assert!(matches!(
        viewer.redraw_with(tiny),
        Err(ViewerError::Input(_))
    ));

    assert_eq!(viewer.view(), ViewParameters::default());
    assert_eq!(
        viewer.camera(),
        CameraState::Static(ViewParameters::default())
    );
    assert_eq!(viewer.last_frame(), before);
    assert_eq!(draw_count(&viewer), draws);
    assert!(viewer.redraw().unwrap());
}

#[test]
fn rejected_view_keeps_the_stopped_orbit() {
    let (viewer, clock) = ready_viewer();
    viewer.start_animation().unwrap();
    clock.advance(TICK * 4);
    viewer.stop_animation();
    let angle = orbit_angle(&viewer);

    let tiny = ViewParameters {
        distance: 1e-5,
        ..ViewParameters::default()
    };
    assert!(viewer.redraw_with(tiny).is_err());

    assert_eq!(orbit_angle(&viewer), angle);
}

#[test]
fn orbit_advances_only_while_running() {
    let (viewer, clock) = ready_viewer();

    assert!(viewer.start_animation().unwrap());
    let mut previous = orbit_angle(&viewer);
    for _ in 0..20 {
        clock.advance(TICK);
        let angle = orbit_angle(&viewer);
        assert!(angle >= previous);
        previous = angle;
    }
    assert!(previous > 0.0);

    assert!(viewer.stop_animation());
    let frozen = orbit_angle(&viewer);
    let frame = viewer.last_frame();
    clock.advance(TICK * 20);
    assert_eq!(orbit_angle(&viewer), frozen);
    assert_eq!(viewer.last_frame(), frame);
}

#[test]
fn start_and_stop_are_idempotent() {
    let (viewer, clock) = ready_viewer();

    assert!(viewer.start_animation().unwrap());
    assert!(!viewer.start_animation().unwrap());
    assert_eq!(clock.active_tasks(), 1);

    clock.advance(TICK * 10);
    let draws = draw_count(&viewer);
    // one frame per tick, not two
    assert_eq!(draws, (ROBOT_PARTS.len() + 1) * 11);

    assert!(viewer.stop_animation());
    assert!(!viewer.stop_animation());
    assert_eq!(clock.active_tasks(), 0);
}

#[test]
fn static_edits_wait_for_the_animation_to_stop() {
    let (viewer, clock) = ready_viewer();
    viewer.start_animation().unwrap();
    clock.advance(TICK * 3);

    assert!(matches!(
        viewer.redraw_with(ViewParameters::default()),
        Err(ViewerError::AnimationRunning)
    ));

    viewer.stop_animation();
    let angle = orbit_angle(&viewer);
    viewer.redraw_with(ViewParameters::default()).unwrap();
    assert!(matches!(viewer.camera(), CameraState::Static(_)));

    // the orbit resumes where it was frozen
    viewer.start_animation().unwrap();
    assert_eq!(orbit_angle(&viewer), angle);
    clock.advance(TICK);
    assert!(orbit_angle(&viewer) > angle);
}

#[test]
fn reset_restores_the_defaults() {
    let (viewer, clock) = ready_viewer();
    viewer
        .redraw_with_input(Some("30"), Some("10"), Some("Left-Back-Bottom"))
        .unwrap();
    viewer.start_animation().unwrap();
    clock.advance(TICK * 7);

    viewer.reset().unwrap();

    assert!(!viewer.is_animating());
    assert_eq!(clock.active_tasks(), 0);
    assert_eq!(
        viewer.view(),
        ViewParameters {
            view_angle: 60.0,
            distance: 45.0,
            direction: Direction::LeftFrontTop,
        }
    );
    assert_eq!(
        viewer.camera(),
        CameraState::Static(ViewParameters::default())
    );
    assert_eq!(
        viewer.last_frame().unwrap().eye,
        Vec3::new(-45.0, -45.0, 45.0)
    );

    // a fresh orbit starts from the beginning
    viewer.start_animation().unwrap();
    assert_eq!(orbit_angle(&viewer), 0.0);
}

#[test]
fn dropping_the_viewer_cancels_the_tick() {
    let (viewer, clock) = ready_viewer();
    viewer.start_animation().unwrap();
    assert_eq!(clock.active_tasks(), 1);

    drop(viewer);

    assert_eq!(clock.active_tasks(), 0);
    assert_eq!(clock.advance(TICK * 5), 0);
}

#[test]
fn invalid_settings_fail_setup() {
    let mut settings = ViewerSettings::default();
    settings.orbit.tick_period_ms = 0;

    let result = Viewer::new(
        RecordingDevice::new((600, 600)),
        settings,
        VirtualClock::new(),
    );
    assert!(result.is_err());
}

use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LEVEL: Level = Level::DEBUG;

#[cfg_attr(
    target_arch = "wasm32",
    allow(dead_code, reason = "the browser console filters by level itself")
)]
fn target_filter() -> filter::Targets {
    filter::Targets::new()
        .with_default(DEFAULT_LEVEL)
        // one event per draw call is too chatty for the default output
        .with_target("engine_robot_viewer::scene", Level::INFO)
        .with_target("lib_time", Level::INFO)
}

/// Installs the global `tracing` subscriber.
///
/// Must be called once, before any other part of the viewer is set up.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logger() {
    // A layer that logs events to stdout using the human-readable "pretty" format.
    let logger = tracing_subscriber::fmt::layer().pretty();

    tracing_subscriber::registry()
        .with(logger)
        .with(target_filter())
        .with(LevelFilter::from_level(DEFAULT_LEVEL))
        .init();
}

/// Installs the global `tracing` subscriber writing to the browser console.
///
/// Must be called once, before any other part of the viewer is set up.
#[cfg(target_arch = "wasm32")]
pub fn init_logger() {
    console_error_panic_hook::set_once();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false) // Only partially supported across browsers
        .without_time() // std::time is not available in browsers
        .with_writer(tracing_web::MakeWebConsoleWriter::new()); // write events to the console
    let perf_layer = tracing_web::performance_layer()
        .with_details_from_fields(tracing_subscriber::fmt::format::Pretty::default());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(perf_layer)
        .with(LevelFilter::from_level(DEFAULT_LEVEL))
        .init();
}

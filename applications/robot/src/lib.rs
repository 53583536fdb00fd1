#![allow(missing_docs, reason = "the exported API is described in the README")]
#![cfg_attr(test, allow(clippy::unwrap_used, reason = "tests"))]

mod error;

pub use error::{ApplicationError, ApplicationResult};

///////////////////////// native section /////////////////////////

#[cfg(not(target_family = "wasm"))]
pub mod headless;

///////////////////////// WASM section /////////////////////////

#[cfg(target_family = "wasm")]
mod wasm;

#[cfg(target_family = "wasm")]
pub use wasm::RobotViewer;

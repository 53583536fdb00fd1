use std::{ffi::OsString, path::Path};

use anyhow::Context;
use xshell::Shell;

use crate::util::{check_all_programs, Program};

const WASM_BINDGEN: Program = Program {
    crate_name: "wasm-bindgen-cli",
    binary_name: "wasm-bindgen",
};

const SIMPLE_HTTP_SERVER: Program = Program {
    crate_name: "simple-http-server",
    binary_name: "simple-http-server",
};

pub(crate) fn check_wasm_programs(no_serve: bool) -> anyhow::Result<()> {
    let programs_needed: &[_] = if no_serve {
        &[WASM_BINDGEN]
    } else {
        &[WASM_BINDGEN, SIMPLE_HTTP_SERVER]
    };

    check_all_programs(programs_needed)
}

/// Builds `package_name` for `wasm32-unknown-unknown` and generates its JavaScript bindings
/// into `out_dir`.
pub(crate) fn build_wasm(
    shell: &Shell,
    package_name: &str,
    library_name: &str,
    is_release: bool,
    out_dir: &Path,
    cargo_args: &[OsString],
) -> anyhow::Result<()> {
    let release_flag: &[_] = if is_release { &["--release"] } else { &[] };
    let output_dir = if is_release { "release" } else { "debug" };

    log::info!("building {package_name}");

    xshell::cmd!(
        shell,
        "cargo build --target wasm32-unknown-unknown --lib --package {package_name} {release_flag...}"
    )
    .args(cargo_args)
    .run()
    .with_context(|| format!("Failed to build {package_name} as wasm32"))?;

    xshell::cmd!(
        shell,
        "wasm-bindgen target/wasm32-unknown-unknown/{output_dir}/{library_name}.wasm --target web --no-typescript --out-dir {out_dir} --out-name {library_name}"
    )
    .run()
    .with_context(|| format!("Failed to run bindgen for {package_name}"))?;

    Ok(())
}

pub(crate) fn start_webserver(shell: &Shell, root_path: &Path) -> anyhow::Result<()> {
    log::info!("serving on http://127.0.0.1:8000");

    xshell::cmd!(
        shell,
        "simple-http-server {root_path} --compress wasm,html,js --ip 127.0.0.1 --index --nocache"
    )
    .quiet()
    .run()
    .context("Failed to run simple-http-server")
}

use std::{io, path::Path, process::Command};

use anyhow::Context;
use xshell::Shell;

pub(crate) struct Program {
    pub crate_name: &'static str,
    pub binary_name: &'static str,
}

pub(crate) fn check_all_programs(programs: &[Program]) -> anyhow::Result<()> {
    let mut failed_crates = Vec::new();
    for &Program {
        crate_name,
        binary_name,
    } in programs
    {
        match Command::new(binary_name).arg("--help").output() {
            Ok(_) => log::info!("Checking for {binary_name} in PATH: found"),
            Err(error) if matches!(error.kind(), io::ErrorKind::NotFound) => {
                log::error!("Checking for {binary_name} in PATH: missing");
                failed_crates.push(crate_name);
            }
            Err(error) => {
                anyhow::bail!("Unknown IO error while looking for {binary_name}: {error}");
            }
        }
    }

    if !failed_crates.is_empty() {
        log::error!(
            "Please install them with: cargo install {}",
            failed_crates.join(" ")
        );
        anyhow::bail!("Missing required programs");
    }

    Ok(())
}

/// Copies a file or a whole directory into `destination_path`.
fn copy(shell: &Shell, source_path: &Path, destination_path: &Path) -> anyhow::Result<()> {
    if source_path.is_dir() {
        let destination_path = &destination_path.join(
            source_path
                .file_name()
                .with_context(|| format!("invalid source path: {}", source_path.display()))?,
        );
        copy_content(shell, source_path, destination_path)
    } else {
        log::info!(
            "copying file \"{}\" → \"{}\"",
            source_path.display(),
            destination_path.display()
        );
        shell
            .copy_file(source_path, destination_path)
            .with_context(|| {
                format!(
                    "Failed to copy file \"{}\" → \"{}\"",
                    source_path.display(),
                    destination_path.display()
                )
            })
    }
}

/// Copies everything inside `source_path` into `destination_path`.
pub(crate) fn copy_content(
    shell: &Shell,
    source_path: &Path,
    destination_path: &Path,
) -> anyhow::Result<()> {
    shell.create_dir(destination_path).with_context(|| {
        format!(
            "failed to create destination path: {}",
            destination_path.display()
        )
    })?;

    let entries = shell
        .read_dir(source_path)
        .with_context(|| format!("Failed to enumerate files in {}", source_path.display()))?;
    for entry in entries {
        copy(shell, &entry, destination_path)?;
    }

    Ok(())
}

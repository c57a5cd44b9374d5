//! Shim publishing.
//!
//! A shim is a copy of the shared dispatcher binary plus a `<command>.shim`
//! sidecar holding the absolute path the dispatcher should re-execute.

use crate::error::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    pub overwrite: bool,
    pub quiet: bool,
}

/// `python3.exe` -> `python3.shim`; `python3.6` -> `python3.6.shim`.
pub fn sidecar_path(command: &Path) -> PathBuf {
    let name = command
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let suffix = std::env::consts::EXE_SUFFIX;
    let stem = if suffix.is_empty() {
        name.as_str()
    } else {
        name.strip_suffix(suffix).unwrap_or(&name)
    };
    command.with_file_name(format!("{}.shim", stem))
}

pub struct ShimPublisher {
    dispatcher: PathBuf,
}

impl ShimPublisher {
    pub fn new(dispatcher: &Path) -> Self {
        Self {
            dispatcher: dispatcher.to_path_buf(),
        }
    }

    /// Publishes `command` as a dispatcher resolving to `target`.
    ///
    /// Returns `false` when the command exists and `overwrite` is off.
    pub fn publish_command(&self, target: &Path, command: &Path, options: PublishOptions) -> Result<bool> {
        if !options.overwrite && command.exists() {
            tracing::trace!("Skipping existing command {}", command.display());
            return Ok(false);
        }
        announce(command, options);

        let dir = parent_dir(command);
        let resolved = resolve_target(target);

        let mut sidecar =
            NamedTempFile::new_in(dir).map_err(Error::io("Failed to stage shim", dir))?;
        sidecar
            .write_all(resolved.to_string_lossy().as_bytes())
            .map_err(Error::io("Failed to write shim", sidecar.path()))?;

        let dispatcher =
            NamedTempFile::new_in(dir).map_err(Error::io("Failed to stage shim", dir))?;
        fs::copy(&self.dispatcher, dispatcher.path())
            .map_err(Error::io("Failed to copy dispatcher", &self.dispatcher))?;

        // Both halves are fully written before either becomes visible
        let sidecar_target = sidecar_path(command);
        sidecar
            .persist(&sidecar_target)
            .map_err(|e| Error::io("Failed to publish shim", &sidecar_target)(e.error))?;
        dispatcher
            .persist(command)
            .map_err(|e| Error::io("Failed to publish command", command)(e.error))?;

        tracing::debug!("Published {} -> {}", command.display(), resolved.display());
        Ok(true)
    }
}

/// Copies `source` to `command` directly, without a sidecar.
pub fn publish_file(source: &Path, command: &Path, options: PublishOptions) -> Result<bool> {
    if !options.overwrite && command.exists() {
        tracing::trace!("Skipping existing command {}", command.display());
        return Ok(false);
    }
    announce(command, options);

    fs::copy(source, command).map_err(Error::io(
        format!("Failed to copy {}", source.display()),
        command,
    ))?;
    tracing::debug!("Copied {} -> {}", source.display(), command.display());
    Ok(true)
}

/// Removes `command` and its sidecar. Missing files are not an error.
///
/// Both removals are attempted even if the first one fails.
pub fn unpublish(command: &Path) -> Result<bool> {
    let removed_command = remove_if_present(command);
    let removed_sidecar = remove_if_present(&sidecar_path(command));
    Ok(removed_command? | removed_sidecar?)
}

fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io("Failed to remove", path)(e)),
    }
}

fn announce(command: &Path, options: PublishOptions) {
    if !options.quiet {
        if let Some(name) = command.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Absolute form of `target` without resolving links, so Windows paths keep
/// their drive-letter form instead of the `\\?\` verbatim prefix.
fn resolve_target(target: &Path) -> PathBuf {
    std::path::absolute(target).unwrap_or_else(|_| target.to_path_buf())
}

//! Active-set reconciliation.
//!
//! The shared scripts directory is rebuilt from scratch every time the set of
//! active versions changes. Versions are published in order with
//! `overwrite = false`, so the first version offering a command name owns it.
//!
//! There is no inter-process locking. Two concurrent rebuilds of the same
//! scripts directory can interleave and leave it inconsistent.

use crate::catalog::Catalog;
use crate::config::Layout;
use crate::error::{Error, Result};
use crate::locator::Installation;
use crate::platform::exe_name;
use crate::shim::{publish_file, PublishOptions, ShimPublisher};
use crate::types::VersionDescriptor;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Script stems never published into the shared namespace; every version
/// ships them and only the version-qualified variants are unambiguous.
const UNVERSIONED_SCRIPTS: &[&str] = &["pip", "easy_install"];

pub fn load_active_names(path: &Path) -> Result<Vec<String>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io("Failed to read active versions", path)(e)),
    };
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn save_active_names(path: &Path, names: &[&str]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(Error::io("Failed to create directory", parent))?;
    }
    fs::write(path, names.join("\n")).map_err(Error::io("Failed to save active versions", path))
}

/// Rebuilds the scripts directory for `versions`, in precedence order.
pub fn activate(
    layout: &Layout,
    versions: &[&VersionDescriptor],
    allow_empty: bool,
    quiet: bool,
) -> Result<()> {
    if versions.is_empty() && !allow_empty {
        return Err(Error::NoActiveVersions);
    }

    let scripts_dir = &layout.scripts_dir;
    fs::create_dir_all(scripts_dir)
        .map_err(Error::io("Failed to create scripts directory", scripts_dir))?;

    if !quiet {
        println!("Removing scripts.");
    }
    clear_directory(scripts_dir)?;

    let publisher = ShimPublisher::new(&layout.dispatcher);
    for version in versions {
        publish_version_scripts(&publisher, layout, version, quiet)?;
    }

    let names: Vec<&str> = versions.iter().map(|v| v.name.as_str()).collect();
    save_active_names(&layout.active_versions_file, &names)?;
    tracing::info!("Active versions: {:?}", names);
    Ok(())
}

fn clear_directory(dir: &Path) -> Result<()> {
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::io("Failed to list scripts", &path)(e.into())
        })?;
        let path = entry.path();
        let removed = if entry.file_type().is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        removed.map_err(Error::io("Failed to remove", path))?;
        tracing::trace!("Removed {}", path.display());
    }
    Ok(())
}

fn publish_version_scripts(
    publisher: &ShimPublisher,
    layout: &Layout,
    version: &VersionDescriptor,
    quiet: bool,
) -> Result<()> {
    if !quiet {
        println!("Publishing {}...", version);
    }
    let options = PublishOptions {
        overwrite: false,
        quiet,
    };

    let installation = Installation::locate(version, &layout.install_root);
    let command = layout
        .scripts_dir
        .join(exe_name(&format!("python{}", version.major_version())));
    publisher.publish_command(&installation.interpreter, &command, options)?;

    if !installation.scripts_dir.is_dir() {
        tracing::debug!(
            "{} has no scripts directory at {}",
            version.name,
            installation.scripts_dir.display()
        );
        return Ok(());
    }

    // Sorted so that rebuilds are reproducible
    let scripts = WalkDir::new(&installation.scripts_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file());

    for entry in scripts {
        let path = entry.path();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if UNVERSIONED_SCRIPTS.contains(&stem.as_str()) {
            continue;
        }
        let target = layout.scripts_dir.join(entry.file_name());
        publish_file(path, &target, options)?;
    }
    Ok(())
}

/// Drops `remove` from the active set, rebuilding only when membership
/// actually changes. Returns whether a rebuild happened.
pub fn update_active_versions(
    layout: &Layout,
    catalog: &Catalog,
    remove: &[&str],
    quiet: bool,
) -> Result<bool> {
    let current = load_active_names(&layout.active_versions_file)?;
    let remaining: Vec<&str> = current
        .iter()
        .map(String::as_str)
        .filter(|name| !remove.contains(name))
        .collect();

    if remaining.len() == current.len() {
        tracing::debug!("Active versions unchanged");
        return Ok(false);
    }
    if !quiet {
        for name in current.iter().filter(|n| remove.contains(&n.as_str())) {
            println!("Deactivating {}", name);
        }
    }

    let versions = remaining
        .iter()
        .map(|name| catalog.resolve(name))
        .collect::<Result<Vec<_>>>()?;
    activate(layout, &versions, true, quiet)?;
    Ok(true)
}

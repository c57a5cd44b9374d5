//! Pinned commands: version-qualified names such as `python3.6` that stay
//! published regardless of which versions are active.

use crate::config::Layout;
use crate::error::{Error, Result};
use crate::locator::Installation;
use crate::platform::exe_name;
use crate::shim::{publish_file, unpublish, PublishOptions, ShimPublisher};
use crate::types::VersionDescriptor;
use std::fs;
use std::path::PathBuf;

const PINNED: PublishOptions = PublishOptions {
    overwrite: true,
    quiet: true,
};

fn command_path(layout: &Layout, name: &str) -> PathBuf {
    layout.commands_dir.join(exe_name(name))
}

pub fn link_commands(layout: &Layout, version: &VersionDescriptor) -> Result<()> {
    fs::create_dir_all(&layout.commands_dir).map_err(Error::io(
        "Failed to create commands directory",
        &layout.commands_dir,
    ))?;

    let installation = Installation::locate(version, &layout.install_root);
    let publisher = ShimPublisher::new(&layout.dispatcher);

    for name in version.interpreter_commands() {
        println!("Publishing {}", name);
        publisher.publish_command(&installation.interpreter, &command_path(layout, &name), PINNED)?;
    }

    for name in version.package_manager_commands() {
        if !installation.package_manager.is_file() {
            tracing::warn!(
                "Skipping {}: {} does not exist",
                name,
                installation.package_manager.display()
            );
            continue;
        }
        println!("Publishing {}", name);
        publish_file(&installation.package_manager, &command_path(layout, &name), PINNED)?;
    }
    Ok(())
}

/// Removes every pinned command of `version`. Failures are reported and
/// skipped; returns how many commands were actually removed.
pub fn unlink_commands(layout: &Layout, version: &VersionDescriptor) -> usize {
    let mut removed = 0;
    let names = version
        .interpreter_commands()
        .into_iter()
        .chain(version.package_manager_commands());

    for name in names {
        let path = command_path(layout, &name);
        match unpublish(&path) {
            Ok(true) => {
                println!("Unlinking {}", name);
                removed += 1;
            }
            Ok(false) => tracing::debug!("{} was not linked", path.display()),
            Err(e) => {
                eprintln!("Failed to remove {} ({})", path.display(), e);
                tracing::warn!("Failed to unlink {}: {}", name, e);
            }
        }
    }
    removed
}

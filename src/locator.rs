//! Filesystem facts about an installed version.

use crate::catalog::Catalog;
use crate::platform::exe_name;
use crate::types::VersionDescriptor;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub install_dir: PathBuf,
    pub interpreter: PathBuf,
    pub package_manager: PathBuf,
    pub scripts_dir: PathBuf,
}

impl Installation {
    /// Pure path computation; nothing here touches the disk.
    pub fn locate(version: &VersionDescriptor, root: &Path) -> Self {
        let install_dir = root
            .join("Programs")
            .join("Python")
            .join(format!("Python{}", version.name.replace('.', "")));
        let scripts_dir = install_dir.join("Scripts");
        Self {
            interpreter: install_dir.join(exe_name("python")),
            package_manager: scripts_dir.join(exe_name("pip")),
            scripts_dir,
            install_dir,
        }
    }
}

/// Read-only view of which versions are present on this machine.
pub trait InstallationQuery {
    fn installed_names(&self) -> Vec<String>;
    fn is_installed(&self, name: &str) -> bool;
}

/// Treats a version as installed when its interpreter exists on disk.
pub struct LocalInstallations<'a> {
    catalog: &'a Catalog,
    root: PathBuf,
}

impl<'a> LocalInstallations<'a> {
    pub fn new(catalog: &'a Catalog, root: &Path) -> Self {
        Self {
            catalog,
            root: root.to_path_buf(),
        }
    }
}

impl InstallationQuery for LocalInstallations<'_> {
    fn installed_names(&self) -> Vec<String> {
        self.catalog
            .versions()
            .into_iter()
            .filter(|v| Installation::locate(v, &self.root).interpreter.is_file())
            .map(|v| v.name.clone())
            .collect()
    }

    fn is_installed(&self, name: &str) -> bool {
        match self.catalog.resolve(name) {
            Ok(version) => Installation::locate(version, &self.root).interpreter.is_file(),
            Err(_) => false,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::cmp::PartialEq;
use std::fmt;

/// Native installer convention used by a catalog entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InstallerKind {
    /// MSI packages, driven through the system installer service.
    #[serde(rename = "legacy", alias = "cpython_msi")]
    Legacy,
    /// Self-contained installer executables.
    #[serde(rename = "modern", alias = "cpython")]
    Modern,
}

impl fmt::Display for InstallerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallerKind::Legacy => write!(f, "legacy"),
            InstallerKind::Modern => write!(f, "modern"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DeclaredCommands {
    #[serde(default)]
    pub interpreter: Vec<String>,
    #[serde(default)]
    pub package_manager: Vec<String>,
}

/// On-disk shape of a catalog entry. The name comes from the file stem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionRecord {
    pub installer_kind: InstallerKind,
    pub url: String,
    pub checksum: String,
    pub version_info: Vec<u32>,
    #[serde(default)]
    pub commands: DeclaredCommands,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDescriptor {
    pub name: String,
    pub url: String,
    pub checksum: String,
    pub version_info: Vec<u32>,
    pub installer_kind: InstallerKind,
    pub commands: DeclaredCommands,
}

impl VersionDescriptor {
    pub fn from_record(name: &str, record: VersionRecord) -> Self {
        Self {
            name: name.to_string(),
            url: record.url,
            checksum: record.checksum,
            version_info: record.version_info,
            installer_kind: record.installer_kind,
            commands: record.commands,
        }
    }

    pub fn major_version(&self) -> u32 {
        self.version_info.first().copied().unwrap_or(0)
    }

    fn major_minor(&self) -> String {
        let minor = self.version_info.get(1).copied().unwrap_or(0);
        format!("{}.{}", self.major_version(), minor)
    }

    pub fn is_32bit(&self) -> bool {
        self.name.ends_with("-32")
    }

    /// Interpreter commands pinned to this version, e.g. `python3.6`.
    pub fn interpreter_commands(&self) -> Vec<String> {
        if self.commands.interpreter.is_empty() {
            vec![format!("python{}", self.major_minor())]
        } else {
            self.commands.interpreter.clone()
        }
    }

    /// Package-manager commands pinned to this version, e.g. `pip3.6`.
    pub fn package_manager_commands(&self) -> Vec<String> {
        if self.commands.package_manager.is_empty() {
            vec![format!("pip{}", self.major_minor())]
        } else {
            self.commands.package_manager.clone()
        }
    }
}

impl fmt::Display for VersionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Python {}", self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_install_root")]
    pub install_root: String,
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: String,
    #[serde(default = "default_commands_dir")]
    pub commands_dir: String,
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: String,
    #[serde(default = "default_dispatcher_path")]
    pub dispatcher_path: String,
    #[serde(default)]
    pub force_32bit: bool,
}

fn app_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("pythonup")
}

fn default_install_root() -> String {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .to_string_lossy()
        .to_string()
}
fn default_scripts_dir() -> String {
    app_dir().join("scripts").to_string_lossy().to_string()
}
fn default_commands_dir() -> String {
    app_dir().join("cmd").to_string_lossy().to_string()
}
fn default_catalog_dir() -> String {
    app_dir().join("versions").to_string_lossy().to_string()
}
fn default_dispatcher_path() -> String {
    app_dir()
        .join("lib")
        .join(format!("shim{}", std::env::consts::EXE_SUFFIX))
        .to_string_lossy()
        .to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            install_root: default_install_root(),
            scripts_dir: default_scripts_dir(),
            commands_dir: default_commands_dir(),
            catalog_dir: default_catalog_dir(),
            dispatcher_path: default_dispatcher_path(),
            force_32bit: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub os: String,
    pub arch: String,
    pub can_execute_64bit: bool,
}

impl fmt::Display for HostInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = if self.can_execute_64bit { "64-bit" } else { "32-bit" };
        write!(f, "{}/{}, {}", self.os, self.arch, bits)
    }
}

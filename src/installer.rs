//! Installer protocol.
//!
//! Each [`InstallerKind`] maps to one protocol implementation through
//! [`InstallerKind::protocol`]. Protocols only describe the process to run;
//! a [`ProcessRunner`] executes it, so tests can substitute a fake runner.

use crate::error::{Error, Result};
use crate::locator::Installation;
use crate::types::{InstallerKind, VersionDescriptor};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

pub trait ProcessRunner {
    /// Runs to completion. A non-zero exit is an error and is never retried.
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        tracing::debug!("Executing: {} {:?}", invocation.program, invocation.args);
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(Error::io(
                format!("Failed to launch {}", invocation.program),
                Path::new(&invocation.program),
            ))?;

        if !status.success() {
            return Err(Error::InstallerFailed {
                program: invocation.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

pub trait InstallerProtocol: Sync {
    fn install_invocation(&self, installer: &Path, install_dir: &Path) -> Invocation;
    fn uninstall_invocation(&self, installer: &Path) -> Invocation;
}

/// MSI packages through `msiexec`, per-user, without extras.
pub struct LegacyInstaller;

impl InstallerProtocol for LegacyInstaller {
    fn install_invocation(&self, installer: &Path, install_dir: &Path) -> Invocation {
        Invocation {
            program: "msiexec".to_string(),
            args: vec![
                "/i".to_string(),
                installer.display().to_string(),
                "/qb".to_string(),
                "ALLUSERS=0".to_string(),
                format!("TARGETDIR={}", install_dir.display()),
                "REMOVE=Extensions,Tools,Testsuite".to_string(),
            ],
        }
    }

    fn uninstall_invocation(&self, installer: &Path) -> Invocation {
        Invocation {
            program: "msiexec".to_string(),
            args: vec!["/x".to_string(), installer.display().to_string()],
        }
    }
}

/// Executable installers driven by their own command-line switches.
pub struct ModernInstaller;

impl InstallerProtocol for ModernInstaller {
    fn install_invocation(&self, installer: &Path, install_dir: &Path) -> Invocation {
        let mut args = vec![
            "/passive".to_string(),
            "InstallAllUsers=0".to_string(),
            format!("DefaultJustForMeTargetDir={}", install_dir.display()),
        ];
        args.extend(
            [
                "AssociateFiles=0",
                "PrependPath=0",
                "Shortcuts=0",
                "Include_launcher=0",
                "Include_test=0",
                "Include_tools=0",
                "InstallLauncherAllUsers=0",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        Invocation {
            program: installer.display().to_string(),
            args,
        }
    }

    fn uninstall_invocation(&self, installer: &Path) -> Invocation {
        Invocation {
            program: installer.display().to_string(),
            args: vec!["/uninstall".to_string()],
        }
    }
}

impl InstallerKind {
    pub fn protocol(self) -> &'static dyn InstallerProtocol {
        match self {
            InstallerKind::Legacy => &LegacyInstaller,
            InstallerKind::Modern => &ModernInstaller,
        }
    }
}

/// Installs `version` from `installer` and returns its install directory.
pub fn install(
    version: &VersionDescriptor,
    runner: &dyn ProcessRunner,
    installer: &Path,
    install_root: &Path,
) -> Result<PathBuf> {
    let install_dir = Installation::locate(version, install_root).install_dir;
    tracing::info!(
        "Running {} installer for {} into {}",
        version.installer_kind,
        version.name,
        install_dir.display()
    );
    let invocation = version
        .installer_kind
        .protocol()
        .install_invocation(installer, &install_dir);
    runner.run(&invocation)?;
    Ok(install_dir)
}

pub fn uninstall(
    version: &VersionDescriptor,
    runner: &dyn ProcessRunner,
    installer: &Path,
) -> Result<()> {
    tracing::info!(
        "Running {} uninstaller for {}",
        version.installer_kind,
        version.name
    );
    let invocation = version.installer_kind.protocol().uninstall_invocation(installer);
    runner.run(&invocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeclaredCommands;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<Invocation>>,
        fail: bool,
    }

    impl ProcessRunner for RecordingRunner {
        fn run(&self, invocation: &Invocation) -> Result<()> {
            self.calls.borrow_mut().push(invocation.clone());
            if self.fail {
                return Err(Error::InstallerFailed {
                    program: invocation.program.clone(),
                    status: "exit code: 1603".to_string(),
                });
            }
            Ok(())
        }
    }

    fn descriptor(name: &str, kind: InstallerKind) -> VersionDescriptor {
        VersionDescriptor {
            name: name.to_string(),
            url: String::new(),
            checksum: String::new(),
            version_info: vec![3, 6, 3],
            installer_kind: kind,
            commands: DeclaredCommands::default(),
        }
    }

    #[test]
    fn test_legacy_install_invocation() {
        let runner = RecordingRunner::default();
        let version = descriptor("3.4.4", InstallerKind::Legacy);
        let root = Path::new("/appdata");
        let installer = Path::new("/tmp/python-3.4.4.msi");

        let dir = install(&version, &runner, installer, root).unwrap();
        assert_eq!(dir, Installation::locate(&version, root).install_dir);

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "msiexec");
        assert_eq!(calls[0].args[0], "/i");
        assert_eq!(calls[0].args[1], installer.display().to_string());
        assert!(calls[0].args.contains(&"ALLUSERS=0".to_string()));
        assert!(calls[0]
            .args
            .contains(&format!("TARGETDIR={}", dir.display())));
        assert!(calls[0]
            .args
            .contains(&"REMOVE=Extensions,Tools,Testsuite".to_string()));
    }

    #[test]
    fn test_modern_install_and_uninstall_invocations() {
        let runner = RecordingRunner::default();
        let version = descriptor("3.6.3", InstallerKind::Modern);
        let installer = Path::new("/tmp/python-3.6.3-amd64.exe");

        install(&version, &runner, installer, Path::new("/appdata")).unwrap();
        uninstall(&version, &runner, installer).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].program, installer.display().to_string());
        assert_eq!(calls[0].args[0], "/passive");
        for flag in ["PrependPath=0", "Shortcuts=0", "Include_launcher=0", "Include_test=0"] {
            assert!(calls[0].args.contains(&flag.to_string()), "missing {}", flag);
        }
        assert_eq!(calls[1].program, installer.display().to_string());
        assert_eq!(calls[1].args, vec!["/uninstall".to_string()]);
    }

    #[test]
    fn test_legacy_uninstall_uses_removal_mode() {
        let invocation = InstallerKind::Legacy
            .protocol()
            .uninstall_invocation(Path::new("C:/tmp/python.msi"));
        assert_eq!(invocation.program, "msiexec");
        assert_eq!(invocation.args[0], "/x");
    }

    #[test]
    fn test_runner_failure_propagates() {
        let runner = RecordingRunner {
            fail: true,
            ..Default::default()
        };
        let version = descriptor("3.6.3", InstallerKind::Modern);
        let err = install(&version, &runner, Path::new("setup.exe"), Path::new("/appdata"))
            .unwrap_err();
        assert!(matches!(err, Error::InstallerFailed { .. }));
        // Exactly one attempt, no retry
        assert_eq!(runner.calls.borrow().len(), 1);
    }
}

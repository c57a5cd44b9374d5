use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

// Each integration test binary uses a different subset of these helpers.
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub install_root: PathBuf,
    pub catalog_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub commands_dir: PathBuf,
    pub dispatcher: PathBuf,
    pub bin_path: PathBuf,
    pub force_32bit: bool,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();

        let dispatcher = root.join("lib").join("shim");
        fs::create_dir_all(dispatcher.parent().unwrap()).unwrap();
        fs::write(&dispatcher, b"DISPATCHER").unwrap();

        Self {
            config_path: root.join("config.json"),
            data_dir: root.join("data").join("pythonup"),
            install_root: root.join("appdata"),
            catalog_dir: root.join("versions"),
            scripts_dir: root.join("scripts"),
            commands_dir: root.join("cmd"),
            dispatcher,
            bin_path: PathBuf::from(env!("CARGO_BIN_EXE_pythonup")),
            force_32bit: false,
            _temp_dir: temp_dir,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.env("PYTHONUP_CONFIG", &self.config_path);
        cmd.env("PYTHONUP_DATA_DIR", &self.data_dir);
        cmd.env("PYTHONUP_INSTALL_ROOT", &self.install_root);
        cmd.env("PYTHONUP_CATALOG_DIR", &self.catalog_dir);
        cmd.env("PYTHONUP_SCRIPTS_DIR", &self.scripts_dir);
        cmd.env("PYTHONUP_COMMANDS_DIR", &self.commands_dir);
        cmd.env("PYTHONUP_DISPATCHER_PATH", &self.dispatcher);
        if self.force_32bit {
            cmd.env("PYTHONUP_FORCE_32BIT", "true");
        } else {
            cmd.env_remove("PYTHONUP_FORCE_32BIT");
        }
        cmd.env_remove("RUST_LOG");
        // Keep the real home out of reach
        cmd.env("HOME", self._temp_dir.path());
        cmd.env("XDG_DATA_HOME", self._temp_dir.path().join("xdg-data"));
        cmd.env("XDG_CONFIG_HOME", self._temp_dir.path().join("xdg-config"));
        cmd
    }

    pub fn run(&self, args: &[&str]) -> CommandOutput {
        self.cmd()
            .args(args)
            .output()
            .expect("Failed to run pythonup")
            .into()
    }

    /// Adds a catalog entry pointing at an unreachable URL.
    pub fn add_version(&self, name: &str, version_info: &[u32]) {
        fs::create_dir_all(&self.catalog_dir).unwrap();
        let record = serde_json::json!({
            "installer_kind": "modern",
            "url": format!("http://127.0.0.1:9/python-{}.exe", name),
            "checksum": "0".repeat(64),
            "version_info": version_info,
        });
        fs::write(
            self.catalog_dir.join(format!("{}.json", name)),
            serde_json::to_string_pretty(&record).unwrap(),
        )
        .unwrap();
    }

    /// Lays out an installation as the native installer would.
    pub fn fake_install(&self, name: &str, scripts: &[(&str, &str)]) -> PathBuf {
        let install_dir = self
            .install_root
            .join("Programs")
            .join("Python")
            .join(format!("Python{}", name.replace('.', "")));
        let scripts_dir = install_dir.join("Scripts");
        fs::create_dir_all(&scripts_dir).unwrap();
        fs::write(install_dir.join(exe("python")), format!("python {}", name)).unwrap();
        for (script, content) in scripts {
            fs::write(scripts_dir.join(script), content).unwrap();
        }
        install_dir
    }

    pub fn active_versions(&self) -> String {
        fs::read_to_string(self.data_dir.join("active-versions.txt")).unwrap_or_default()
    }
}

pub fn exe(stem: &str) -> String {
    format!("{}{}", stem, std::env::consts::EXE_SUFFIX)
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        if self.status.success() {
            panic!(
                "Command unexpectedly succeeded\nstdout: {}\nstderr: {}",
                self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No such version: {0}")]
    VersionNotFound(String),

    #[error("Download integrity check failed for {name}: expected {expected}, got {actual}")]
    DownloadIntegrity {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("{program} exited with {status}")]
    InstallerFailed { program: String, status: String },

    #[error("{0} is already installed.")]
    AlreadyInstalled(String),

    #[error("{0} is not installed.")]
    NotInstalled(String),

    #[error("No active versions.")]
    NoActiveVersions,

    #[error("Invalid catalog entry {path}: {source}")]
    InvalidCatalogEntry {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{message}: {path}")]
    Io {
        message: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Adapter for `map_err` that attaches a message and the offending path.
    pub fn io(message: impl Into<String>, path: &Path) -> impl FnOnce(io::Error) -> Error {
        let message = message.into();
        let path = path.to_path_buf();
        move |source| Error::Io {
            message,
            path,
            source,
        }
    }

    pub fn http(url: &str) -> impl FnOnce(reqwest::Error) -> Error {
        let url = url.to_string();
        move |source| Error::Http { url, source }
    }
}

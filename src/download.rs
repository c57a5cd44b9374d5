use crate::error::{Error, Result};
use crate::types::VersionDescriptor;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// Upper bound on what a `Content-Length` header may reserve up front.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Streams `url` into memory with a single request.
///
/// Progress is a bar when the server reports a length, a spinner otherwise.
pub async fn fetch(url: &str, quiet: bool) -> Result<Vec<u8>> {
    tracing::info!("Downloading {}", url);

    let response = reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(Error::http(url))?;

    let total_size = response.content_length();
    let pb = progress_for(total_size, quiet);
    pb.set_message(installer_file_name(url).to_string());

    // The header only sizes the bar; the buffer grows with what actually arrives
    let reserve = total_size.unwrap_or(0).min(MAX_PREALLOCATION) as usize;
    let mut data = Vec::with_capacity(reserve);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Error::http(url))?;
        data.extend_from_slice(&chunk);
        if total_size.is_some() {
            pb.set_position(data.len() as u64);
        } else {
            pb.tick();
        }
    }

    pb.finish_and_clear();
    tracing::debug!("Downloaded {} bytes from {}", data.len(), url);
    Ok(data)
}

fn progress_for(total_size: Option<u64>, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    match total_size {
        Some(len) => {
            let pb = ProgressBar::new(len);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{msg} {spinner:.green} {bytes}") {
                pb.set_style(style);
            }
            pb
        }
    }
}

pub fn checksum(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Verifies `data` against the descriptor, then writes it to `target`.
///
/// Nothing is written on mismatch. The payload is staged next to `target`
/// and renamed into place, so a partial file never appears under that name.
pub fn persist(data: &[u8], version: &VersionDescriptor, target: &Path) -> Result<()> {
    let actual = checksum(data);
    if !actual.eq_ignore_ascii_case(version.checksum.trim()) {
        return Err(Error::DownloadIntegrity {
            name: version.name.clone(),
            expected: version.checksum.clone(),
            actual,
        });
    }

    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(Error::io("Failed to create directory", dir))?;

    let mut staged =
        NamedTempFile::new_in(dir).map_err(Error::io("Failed to stage download", dir))?;
    staged
        .write_all(data)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(Error::io("Failed to write download", staged.path()))?;
    staged
        .persist(target)
        .map_err(|e| Error::io("Failed to move download into place", target)(e.error))?;

    tracing::debug!("Saved verified installer to {}", target.display());
    Ok(())
}

pub fn installer_file_name(url: &str) -> &str {
    url.rsplit('/')
        .next()
        .and_then(|name| name.split('?').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("installer")
}

/// Scratch space for downloaded installers, removed when dropped.
pub struct DownloadArea {
    dir: TempDir,
}

impl DownloadArea {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("pythonup-")
            .tempdir()
            .map_err(Error::io("Failed to create download area", &std::env::temp_dir()))?;
        tracing::debug!("Download area: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub async fn download_installer(&self, version: &VersionDescriptor, quiet: bool) -> Result<PathBuf> {
        if !quiet {
            println!("Downloading {}", version.url);
        }
        let data = fetch(&version.url, quiet).await?;
        let target = self.path().join(installer_file_name(&version.url));
        persist(&data, version, &target)?;
        Ok(target)
    }
}

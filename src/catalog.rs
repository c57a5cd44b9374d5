//! Version catalog.
//!
//! The catalog is a directory of JSON records, one per version, keyed by the
//! file stem. Descriptors are immutable once loaded.

use crate::error::{Error, Result};
use crate::types::{VersionDescriptor, VersionRecord};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    versions: BTreeMap<String, VersionDescriptor>,
}

/// Outcome of a host-aware lookup.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub descriptor: &'a VersionDescriptor,
    /// The name originally asked for, when a 32-bit entry was substituted.
    pub substituted_for: Option<&'a str>,
}

impl Catalog {
    pub fn load(dir: &Path) -> Result<Self> {
        let mut versions = BTreeMap::new();

        if !dir.is_dir() {
            tracing::warn!("Catalog directory {} does not exist", dir.display());
            return Ok(Self { versions });
        }

        let entries = fs::read_dir(dir).map_err(Error::io("Failed to read catalog", dir))?;
        for entry in entries {
            let path = entry
                .map_err(Error::io("Failed to read catalog entry", dir))?
                .path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = fs::read_to_string(&path)
                .map_err(Error::io("Failed to read catalog entry", &path))?;
            let record: VersionRecord =
                serde_json::from_str(&content).map_err(|source| Error::InvalidCatalogEntry {
                    path: path.clone(),
                    source,
                })?;

            tracing::trace!("Loaded catalog entry {}", name);
            versions.insert(name.to_string(), VersionDescriptor::from_record(name, record));
        }

        tracing::debug!("Loaded {} catalog entries from {}", versions.len(), dir.display());
        Ok(Self { versions })
    }

    #[cfg(test)]
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = VersionDescriptor>) -> Self {
        Self {
            versions: descriptors
                .into_iter()
                .map(|d| (d.name.clone(), d))
                .collect(),
        }
    }

    pub fn resolve(&self, name: &str) -> Result<&VersionDescriptor> {
        self.versions
            .get(name)
            .ok_or_else(|| Error::VersionNotFound(name.to_string()))
    }

    /// Resolves `name`, preferring the `-32` variant on hosts that cannot
    /// execute 64-bit binaries.
    pub fn resolve_for_host<'a>(
        &'a self,
        name: &'a str,
        can_execute_64bit: bool,
    ) -> Result<Resolved<'a>> {
        if !can_execute_64bit && !name.ends_with("-32") {
            if let Some(descriptor) = self.versions.get(&format!("{}-32", name)) {
                return Ok(Resolved {
                    descriptor,
                    substituted_for: Some(name),
                });
            }
        }
        Ok(Resolved {
            descriptor: self.resolve(name)?,
            substituted_for: None,
        })
    }

    /// All entries ordered by version, 64-bit before 32-bit for equal versions.
    pub fn versions(&self) -> Vec<&VersionDescriptor> {
        let mut versions: Vec<_> = self.versions.values().collect();
        versions.sort_by(|a, b| {
            a.version_info
                .cmp(&b.version_info)
                .then_with(|| a.is_32bit().cmp(&b.is_32bit()))
                .then_with(|| a.name.cmp(&b.name))
        });
        versions
    }

    /// Entries worth showing on this host: a 64-bit entry is hidden when the
    /// host cannot run it and a 32-bit counterpart exists.
    pub fn visible_versions(&self, can_execute_64bit: bool) -> Vec<&VersionDescriptor> {
        self.versions()
            .into_iter()
            .filter(|v| {
                can_execute_64bit
                    || v.is_32bit()
                    || !self.versions.contains_key(&format!("{}-32", v.name))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

//! Name conflict resolution.
//!
//! Creation and import always succeed by picking a free name; rename is a
//! deliberate user choice and is rejected instead of silently altered.

use std::path::{Path, PathBuf};
use tracing::debug;

use pdfvault_common::{Error, Result};
use pdfvault_storage::StorageProvider;

/// Picks names that do not collide with existing directory entries.
#[derive(Debug, Clone)]
pub struct PathConflictResolver {
    folder_template: String,
}

impl PathConflictResolver {
    /// Create a resolver using `folder_template` as the base folder name.
    pub fn new(folder_template: impl Into<String>) -> Self {
        Self {
            folder_template: folder_template.into(),
        }
    }

    /// Free name for a new folder in `dir`.
    ///
    /// Tries the template, then `"<template> 0"`, `"<template> 1"`, ...
    pub fn folder_name<P: StorageProvider + ?Sized>(&self, provider: &P, dir: &Path) -> String {
        let mut candidate = self.folder_template.clone();
        let mut counter: u64 = 0;

        while provider.exists(&dir.join(&candidate)) {
            candidate = format!("{} {}", self.folder_template, counter);
            counter += 1;
        }

        debug!(dir = %dir.display(), name = %candidate, "Resolved folder name");
        candidate
    }

    /// Free name for an imported file in `dir`.
    ///
    /// Keeps `desired` when free, otherwise inserts `" (n)"` before the
    /// extension with `n` starting at 1 (`doc.pdf` -> `doc (1).pdf`).
    pub fn file_name<P: StorageProvider + ?Sized>(
        &self,
        provider: &P,
        dir: &Path,
        desired: &str,
    ) -> String {
        if !provider.exists(&dir.join(desired)) {
            return desired.to_string();
        }

        let (stem, extension) = split_name(desired);
        let mut counter: u64 = 1;
        loop {
            let candidate = match extension {
                Some(ext) => format!("{} ({}).{}", stem, counter, ext),
                None => format!("{} ({})", stem, counter),
            };
            if !provider.exists(&dir.join(&candidate)) {
                debug!(dir = %dir.display(), desired, name = %candidate, "Resolved file name");
                return candidate;
            }
            counter += 1;
        }
    }

    /// Target path for renaming `current` to `new_name` in place.
    ///
    /// # Errors
    /// - `NameConflict` if another entry already uses `new_name`
    pub fn rename_target<P: StorageProvider + ?Sized>(
        &self,
        provider: &P,
        current: &Path,
        new_name: &str,
    ) -> Result<PathBuf> {
        let parent = current
            .parent()
            .ok_or_else(|| Error::InvalidInput("Cannot rename the filesystem root".to_string()))?;
        let target = parent.join(new_name);

        if provider.exists(&target) && !provider.same_entry(current, &target) {
            return Err(Error::NameConflict(format!(
                "an entry named '{}' already exists in {}",
                new_name,
                parent.display()
            )));
        }

        Ok(target)
    }
}

impl Default for PathConflictResolver {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FOLDER_TEMPLATE)
    }
}

/// Split `name` into stem and extension the way `Path` does.
fn split_name(name: &str) -> (&str, Option<&str>) {
    let path = Path::new(name);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => (stem, Some(ext)),
        _ => (name, None),
    }
}

//! Storage provider trait definition.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use pdfvault_common::Result;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Last path component.
    pub name: String,
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Whether this is a directory; symlinks report their target's kind.
    pub is_directory: bool,
    /// Whether the entry itself is a symbolic link.
    pub is_symlink: bool,
}

/// Filesystem primitives consumed by the vault engine.
///
/// All paths are absolute. Implementations report OS failures as
/// `Error::Io` so callers can inspect the underlying `ErrorKind`.
pub trait StorageProvider {
    /// Get the provider name (e.g., "local").
    fn name(&self) -> &str;

    /// Check if any entry exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `a` and `b` name the same on-disk entry.
    ///
    /// Differs from path equality on case-insensitive filesystems.
    fn same_entry(&self, a: &Path, b: &Path) -> bool;

    /// List a directory in the order the OS enumerates it.
    ///
    /// Entries that cannot be inspected are skipped, not fatal.
    ///
    /// # Errors
    /// - The directory cannot be opened
    /// - An entry cannot be read
    fn list(&self, path: &Path) -> Result<Vec<Entry>>;

    /// Create a single directory.
    ///
    /// # Errors
    /// - Parent missing
    /// - Entry already exists
    /// - Permission denied
    fn create_dir(&self, path: &Path) -> Result<()>;

    /// Copy a file, never overwriting `to`.
    ///
    /// # Errors
    /// - Source missing or not a file
    /// - Destination already exists
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Delete a file.
    fn delete(&self, path: &Path) -> Result<()>;

    /// Delete a directory and everything below it.
    fn delete_dir(&self, path: &Path) -> Result<()>;

    /// Move/rename a file or directory.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
}

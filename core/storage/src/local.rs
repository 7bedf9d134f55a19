//! Local filesystem storage provider.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::provider::{Entry, StorageProvider};
use pdfvault_common::{Error, Result};

/// Local filesystem storage provider.
///
/// Mutations are confined to the vault root; reads (copy sources) may come
/// from anywhere.
pub struct LocalProvider {
    root: PathBuf,
}

impl LocalProvider {
    /// Create a new local provider for the given vault root.
    ///
    /// # Postconditions
    /// - Root directory is created if it doesn't exist
    ///
    /// # Errors
    /// - Permission denied
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            fs::create_dir_all(&root)?;
        }

        Ok(Self { root })
    }

    /// The vault root this provider is confined to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_inside(&self, path: &Path) -> Result<()> {
        if path.starts_with(&self.root) {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "{} is outside the vault {}",
                path.display(),
                self.root.display()
            )))
        }
    }
}

/// Turn one `read_dir` item into an [`Entry`], or `None` if it is unreadable.
fn inspect_entry(dir: &Path, entry: io::Result<fs::DirEntry>) -> Option<Entry> {
    let inspected = entry.and_then(|e| e.file_type().map(|t| (e, t)));
    let (entry, file_type) = match inspected {
        Ok(pair) => pair,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
            return None;
        }
    };

    let path = entry.path();
    let is_symlink = file_type.is_symlink();
    let is_directory = if is_symlink {
        fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false)
    } else {
        file_type.is_dir()
    };

    Some(Entry {
        name: entry.file_name().to_string_lossy().into_owned(),
        path,
        is_directory,
        is_symlink,
    })
}

fn already_exists(path: &Path) -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("{} already exists", path.display()),
    ))
}

impl StorageProvider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so dangling links still count as taken names
        fs::symlink_metadata(path).is_ok()
    }

    fn same_entry(&self, a: &Path, b: &Path) -> bool {
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => a == b,
        }
    }

    fn list(&self, path: &Path) -> Result<Vec<Entry>> {
        let results = fs::read_dir(path)?
            .filter_map(|entry| inspect_entry(path, entry))
            .collect();
        Ok(results)
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        self.ensure_inside(path)?;
        fs::create_dir(path)?;
        debug!(path = %path.display(), "Directory created");
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.ensure_inside(to)?;

        if !fs::metadata(from)?.is_file() {
            return Err(Error::InvalidInput(format!(
                "{} is not a file",
                from.display()
            )));
        }

        let mut source = File::open(from)?;
        // create_new refuses to clobber an entry that appeared after name resolution
        let mut dest = OpenOptions::new().write(true).create_new(true).open(to)?;

        if let Err(e) = io::copy(&mut source, &mut dest) {
            drop(dest);
            if let Err(cleanup) = fs::remove_file(to) {
                warn!(path = %to.display(), error = %cleanup, "Failed to remove partial copy");
            }
            return Err(e.into());
        }

        debug!(from = %from.display(), to = %to.display(), "File copied");
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        self.ensure_inside(path)?;
        fs::remove_file(path)?;
        Ok(())
    }

    fn delete_dir(&self, path: &Path) -> Result<()> {
        self.ensure_inside(path)?;
        if path == self.root {
            return Err(Error::InvalidInput("Cannot delete the vault root".to_string()));
        }
        fs::remove_dir_all(path)?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.ensure_inside(from)?;
        self.ensure_inside(to)?;

        // std::fs::rename replaces existing files on Unix
        if self.exists(to) && !self.same_entry(from, to) {
            return Err(already_exists(to));
        }

        fs::rename(from, to)?;
        debug!(from = %from.display(), to = %to.display(), "Entry renamed");
        Ok(())
    }
}

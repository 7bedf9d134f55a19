//! Recursive directory scan producing a fresh vault subtree.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use pdfvault_common::{has_extension, Error, Result};
use pdfvault_storage::{Entry, StorageProvider};

use crate::tree::{VaultNode, VaultTree};

/// Non-fatal problem met while scanning; the affected subtree is partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Directory that could not be fully read.
    pub path: PathBuf,
    /// Human-readable cause.
    pub message: String,
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Result of a scan: the built subtree plus any warnings.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Root of the scanned subtree, flagged expanded.
    pub root: VaultNode,
    /// Problems that did not stop the scan.
    pub warnings: Vec<ScanWarning>,
}

/// Depth-first walker that mirrors PDF files and folders into nodes.
///
/// Within one directory PDF files come first, then subdirectories, each in
/// the order the OS enumerates them. Links to folders are not followed;
/// links to PDF files are listed like regular files.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    extension: String,
}

impl DirectoryScanner {
    /// Create a scanner matching files with `extension` (case-insensitive).
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Scan the vault root.
    ///
    /// # Errors
    /// - `Scan` if the root directory itself cannot be listed
    pub fn scan<P: StorageProvider + ?Sized>(
        &self,
        provider: &P,
        root: &Path,
    ) -> Result<ScanOutcome> {
        let entries = provider
            .list(root)
            .map_err(|e| Error::Scan(format!("{}: {}", root.display(), e)))?;

        let mut node = VaultNode::root(root);
        node.expand();
        let mut warnings = Vec::new();
        self.populate(provider, &mut node, entries, &mut warnings);

        let tree = VaultTree::new(node);
        info!(
            root = %root.display(),
            files = tree.count_files(),
            folders = tree.count_folders(),
            warnings = warnings.len(),
            "Vault scanned"
        );

        Ok(ScanOutcome {
            root: tree.into_root(),
            warnings,
        })
    }

    fn populate<P: StorageProvider + ?Sized>(
        &self,
        provider: &P,
        node: &mut VaultNode,
        entries: Vec<Entry>,
        warnings: &mut Vec<ScanWarning>,
    ) {
        debug!(path = %node.path().display(), entries = entries.len(), "Scanning directory");

        let (dirs, files): (Vec<Entry>, Vec<Entry>) = entries
            .into_iter()
            // linked folders could loop back into the vault
            .filter(|e| !(e.is_symlink && e.is_directory))
            .partition(|e| e.is_directory);

        for entry in files
            .into_iter()
            .filter(|e| has_extension(&e.path, &self.extension))
        {
            if let Err(e) = node.add_child(VaultNode::file(entry.path)) {
                warnings.push(ScanWarning {
                    path: node.path().to_path_buf(),
                    message: e.to_string(),
                });
            }
        }

        for entry in dirs {
            let mut folder = VaultNode::folder(entry.path.clone());
            match provider.list(&entry.path) {
                Ok(children) => self.populate(provider, &mut folder, children, warnings),
                Err(e) if e.is_permission_denied() => {
                    debug!(path = %entry.path.display(), "Access denied, skipping folder");
                    continue;
                }
                Err(e) => {
                    warn!(path = %entry.path.display(), error = %e, "Folder could not be read");
                    warnings.push(ScanWarning {
                        path: entry.path.clone(),
                        message: e.to_string(),
                    });
                }
            }
            if let Err(e) = node.add_child(folder) {
                warnings.push(ScanWarning {
                    path: entry.path,
                    message: e.to_string(),
                });
            }
        }
    }
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PDF_EXTENSION)
    }
}

//! Vault tree synchronization.
//!
//! Every structural operation runs its filesystem side-effect first and
//! patches the in-memory tree only once the disk agrees. When the disk
//! outcome cannot be mirrored precisely (moves), the tree is rebuilt from a
//! fresh scan with the expansion state carried over.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use pdfvault_common::{has_extension, validate_file_name, Error, Result};
use pdfvault_storage::{LocalProvider, StorageProvider};

use crate::config::VaultConfig;
use crate::conflict::PathConflictResolver;
use crate::events::{NullObserver, TreeEvent, TreeObserver};
use crate::scanner::{DirectoryScanner, ScanWarning};
use crate::tree::{VaultNode, VaultTree};

/// The node currently selected in the view, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    path: PathBuf,
    is_directory: bool,
}

impl Selection {
    pub fn new(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self {
            path: path.into(),
            is_directory,
        }
    }

    /// Selection pointing at `node`.
    pub fn of(node: &VaultNode) -> Self {
        Self::new(node.path(), node.is_directory())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// Folder containing the selected entry.
    pub fn parent_folder(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// Per-file failure inside an import batch.
#[derive(Debug)]
pub struct ImportFailure {
    pub source: PathBuf,
    pub error: Error,
}

/// Result of an import batch.
#[derive(Debug)]
pub struct ImportReport {
    /// Folder the files were copied into.
    pub destination: PathBuf,
    /// Vault paths of the copies, in source order.
    pub imported: Vec<PathBuf>,
    /// Sources that could not be imported.
    pub failed: Vec<ImportFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { path: PathBuf },
    /// The vault root was targeted; nothing happened.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed { from: PathBuf, to: PathBuf },
    /// Root, empty name, or same name; nothing happened.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: PathBuf, to: PathBuf },
    /// Root source, or drop on itself.
    Ignored,
}

/// Orchestrates filesystem mutations and their in-memory mirror.
pub struct VaultTreeSync<P: StorageProvider> {
    provider: P,
    tree: VaultTree,
    scanner: DirectoryScanner,
    resolver: PathConflictResolver,
    extension: String,
    observer: Box<dyn TreeObserver>,
    warnings: Vec<ScanWarning>,
}

impl VaultTreeSync<LocalProvider> {
    /// Open the vault described by `config` on the local disk.
    ///
    /// # Postconditions
    /// - Vault root exists
    /// - Tree mirrors the root as scanned, root expanded
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Root cannot be created or scanned
    pub fn open(config: &VaultConfig) -> Result<Self> {
        config.validate()?;
        config.ensure_root()?;

        let provider = LocalProvider::new(&config.root)?;
        let scanner = DirectoryScanner::new(config.pdf_extension.clone());
        let outcome = scanner.scan(&provider, &config.root)?;
        for warning in &outcome.warnings {
            warn!(%warning, "Scan warning");
        }

        let mut sync = Self::new(provider, VaultTree::new(outcome.root), config);
        sync.warnings = outcome.warnings;
        info!(root = %config.root.display(), "Vault opened");
        Ok(sync)
    }
}

impl<P: StorageProvider> VaultTreeSync<P> {
    /// Wrap an existing tree. The tree's root must be the vault root.
    pub fn new(provider: P, tree: VaultTree, config: &VaultConfig) -> Self {
        Self {
            provider,
            tree,
            scanner: DirectoryScanner::new(config.pdf_extension.clone()),
            resolver: PathConflictResolver::new(config.folder_template.clone()),
            extension: config.pdf_extension.clone(),
            observer: Box::new(NullObserver),
            warnings: Vec::new(),
        }
    }

    /// Route tree notifications to `observer`.
    pub fn with_observer(mut self, observer: Box<dyn TreeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn tree(&self) -> &VaultTree {
        &self.tree
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn root_path(&self) -> &Path {
        self.tree.root_path()
    }

    /// Warnings from the most recent full scan.
    pub fn scan_warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    /// Build a selection for the node at `path`.
    pub fn select(&self, path: &Path) -> Result<Selection> {
        self.tree
            .find_node(path)
            .map(Selection::of)
            .ok_or_else(|| Error::NotFound(format!("Path not found: {}", path.display())))
    }

    /// Expand or collapse a folder on behalf of the view.
    pub fn set_expanded(&mut self, path: &Path, expanded: bool) -> Result<()> {
        self.tree.set_expanded(path, expanded)
    }

    fn emit(&mut self, event: TreeEvent) {
        self.observer.notify(&event);
    }

    fn expand(&mut self, path: &Path) -> Result<()> {
        self.tree.set_expanded(path, true)?;
        self.emit(TreeEvent::NodeExpanded {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    /// Folder that create/import write into for the given selection.
    fn destination(&self, selection: Option<&Selection>) -> Result<PathBuf> {
        let dir = match selection {
            None => self.tree.root_path().to_path_buf(),
            Some(s) if s.is_directory() => s.path().to_path_buf(),
            Some(s) => s
                .parent_folder()
                .ok_or_else(|| Error::InvalidInput("Selection has no parent".to_string()))?
                .to_path_buf(),
        };

        match self.tree.find_node(&dir) {
            Some(node) if node.is_directory() => Ok(dir),
            Some(_) => Err(Error::InvalidInput(format!(
                "{} is not a folder",
                dir.display()
            ))),
            None => Err(Error::NotFound(format!(
                "Folder not in vault: {}",
                dir.display()
            ))),
        }
    }

    /// Create a new folder next to or inside the selection.
    ///
    /// # Postconditions
    /// - Folder exists on disk under a non-colliding name
    /// - Folder node appended to its parent, parent expanded
    ///
    /// # Errors
    /// - `Creation` if the directory cannot be created; tree untouched
    pub fn create_folder(&mut self, selection: Option<&Selection>) -> Result<PathBuf> {
        let parent = self.destination(selection)?;
        let name = self.resolver.folder_name(&self.provider, &parent);
        let path = parent.join(&name);

        self.provider.create_dir(&path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Folder creation failed");
            Error::Creation(format!("{}: {}", path.display(), e))
        })?;

        self.tree.insert(&parent, VaultNode::folder(path.clone()))?;
        self.emit(TreeEvent::NodeAdded {
            parent: parent.clone(),
            path: path.clone(),
        });
        self.expand(&parent)?;

        info!(path = %path.display(), "Folder created");
        Ok(path)
    }

    /// Copy PDF files into the folder resolved from the selection.
    ///
    /// Each source is handled on its own: a failure is recorded in the
    /// report and the remaining sources are still attempted.
    ///
    /// # Errors
    /// - Only if the destination folder cannot be resolved
    pub fn import_files(
        &mut self,
        selection: Option<&Selection>,
        sources: &[PathBuf],
    ) -> Result<ImportReport> {
        let destination = self.destination(selection)?;
        let mut report = ImportReport {
            destination: destination.clone(),
            imported: Vec::new(),
            failed: Vec::new(),
        };

        for source in sources {
            match self.import_one(&destination, source) {
                Ok(path) => report.imported.push(path),
                Err(error) => {
                    warn!(source = %source.display(), %error, "Import failed");
                    report.failed.push(ImportFailure {
                        source: source.clone(),
                        error,
                    });
                }
            }
        }

        self.expand(&destination)?;
        info!(
            destination = %destination.display(),
            imported = report.imported.len(),
            failed = report.failed.len(),
            "Import finished"
        );
        Ok(report)
    }

    fn import_one(&mut self, destination: &Path, source: &Path) -> Result<PathBuf> {
        if !has_extension(source, &self.extension) {
            return Err(Error::Import(format!(
                "{} is not a .{} file",
                source.display(),
                self.extension
            )));
        }
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Import(format!("{} has no usable name", source.display())))?;

        let name = self
            .resolver
            .file_name(&self.provider, destination, file_name);
        let path = destination.join(&name);

        self.provider
            .copy(source, &path)
            .map_err(|e| Error::Import(format!("{}: {}", source.display(), e)))?;

        self.tree
            .insert(destination, VaultNode::file(path.clone()))?;
        self.emit(TreeEvent::NodeAdded {
            parent: destination.to_path_buf(),
            path: path.clone(),
        });

        debug!(source = %source.display(), path = %path.display(), "File imported");
        Ok(path)
    }

    /// Delete a file, or a folder with everything in it.
    ///
    /// Confirmation is the caller's job. The root is never deleted.
    ///
    /// # Errors
    /// - `NotFound` if `path` is not in the tree
    /// - `Deletion` if the disk operation fails; tree untouched
    pub fn delete(&mut self, path: &Path) -> Result<DeleteOutcome> {
        if self.tree.is_root(path) {
            debug!("Refusing to delete the vault root");
            return Ok(DeleteOutcome::Ignored);
        }

        let is_directory = self
            .tree
            .find_node(path)
            .map(|n| n.is_directory())
            .ok_or_else(|| Error::NotFound(format!("Path not found: {}", path.display())))?;

        let result = if is_directory {
            self.provider.delete_dir(path)
        } else {
            self.provider.delete(path)
        };
        result.map_err(|e| {
            warn!(path = %path.display(), error = %e, "Deletion failed");
            Error::Deletion(format!("{}: {}", path.display(), e))
        })?;

        self.tree.remove(path)?;
        if let Some(parent) = path.parent() {
            self.emit(TreeEvent::NodeRemoved {
                parent: parent.to_path_buf(),
                path: path.to_path_buf(),
            });
        }

        info!(path = %path.display(), "Deleted");
        Ok(DeleteOutcome::Deleted {
            path: path.to_path_buf(),
        })
    }

    /// Rename a file or folder in place.
    ///
    /// A blank or unchanged name cancels silently. A taken name is
    /// rejected, never auto-suffixed.
    ///
    /// # Errors
    /// - `InvalidName` for illegal characters, or a file losing its PDF extension
    /// - `NameConflict` if another entry already has the name
    /// - `Rename` if the disk operation fails
    ///
    /// On any error the node keeps its old path and name.
    pub fn rename(&mut self, path: &Path, new_name: &str) -> Result<RenameOutcome> {
        if self.tree.is_root(path) {
            debug!("Refusing to rename the vault root");
            return Ok(RenameOutcome::Unchanged);
        }

        let (is_file, old_name) = self
            .tree
            .find_node(path)
            .map(|n| (n.is_file(), n.name().to_string()))
            .ok_or_else(|| Error::NotFound(format!("Path not found: {}", path.display())))?;

        let new_name = new_name.trim();
        if new_name.is_empty() || new_name == old_name {
            return Ok(RenameOutcome::Unchanged);
        }

        validate_file_name(new_name)?;
        if is_file && !has_extension(Path::new(new_name), &self.extension) {
            return Err(Error::InvalidName(format!(
                "'{}' must keep the .{} extension",
                new_name, self.extension
            )));
        }

        let target = self
            .resolver
            .rename_target(&self.provider, path, new_name)?;

        self.provider.rename(path, &target).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Rename failed");
            Error::Rename(format!("{}: {}", path.display(), e))
        })?;

        let new_path = self.tree.rename(path, new_name)?;
        self.emit(TreeEvent::NodeRenamed {
            from: path.to_path_buf(),
            to: new_path.clone(),
        });

        info!(from = %path.display(), to = %new_path.display(), "Renamed");
        Ok(RenameOutcome::Renamed {
            from: path.to_path_buf(),
            to: new_path,
        })
    }

    /// Move `source` into `target` (or into `target`'s folder when it is a
    /// file). The tree is rebuilt afterwards, success or not.
    ///
    /// # Errors
    /// - `Conflict` if the destination already holds the name, including a
    ///   drop into the folder the source already lives in; nothing touched
    /// - `Move` if the folder would move into itself, or the disk move fails
    pub fn move_node(&mut self, source: &Path, target: &Path) -> Result<MoveOutcome> {
        if self.tree.is_root(source) || source == target {
            return Ok(MoveOutcome::Ignored);
        }

        let (source_is_dir, source_name) = self
            .tree
            .find_node(source)
            .map(|n| (n.is_directory(), n.name().to_string()))
            .ok_or_else(|| Error::NotFound(format!("Path not found: {}", source.display())))?;

        let destination_dir = match self.tree.find_node(target) {
            Some(node) if node.is_directory() => target.to_path_buf(),
            Some(_) => target
                .parent()
                .ok_or_else(|| Error::InvalidInput("Target has no parent".to_string()))?
                .to_path_buf(),
            None => {
                return Err(Error::NotFound(format!(
                    "Path not found: {}",
                    target.display()
                )))
            }
        };

        if source_is_dir && destination_dir.starts_with(source) {
            return Err(Error::Move(format!(
                "cannot move {} into itself",
                source.display()
            )));
        }

        let destination = destination_dir.join(&source_name);
        if self.provider.exists(&destination) {
            return Err(Error::Conflict(format!(
                "'{}' already exists in {}",
                source_name,
                destination_dir.display()
            )));
        }

        let expanded = self.tree.snapshot_expanded();
        if let Err(e) = self.provider.rename(source, &destination) {
            warn!(source = %source.display(), error = %e, "Move failed, rebuilding tree");
            // the OS may have applied part of the move
            if let Err(scan_err) = self.rebuild(&expanded) {
                warn!(error = %scan_err, "Rebuild after failed move failed");
            }
            return Err(Error::Move(format!("{}: {}", source.display(), e)));
        }

        self.rebuild(&expanded)?;
        info!(from = %source.display(), to = %destination.display(), "Moved");
        Ok(MoveOutcome::Moved {
            from: source.to_path_buf(),
            to: destination,
        })
    }

    /// Rescan the whole vault, keeping current expansion state.
    pub fn reload(&mut self) -> Result<Vec<ScanWarning>> {
        let expanded = self.tree.snapshot_expanded();
        self.rebuild(&expanded)?;
        Ok(self.warnings.clone())
    }

    fn rebuild(&mut self, expanded: &HashSet<PathBuf>) -> Result<()> {
        let root = self.tree.root_path().to_path_buf();
        let outcome = self.scanner.scan(&self.provider, &root)?;
        for warning in &outcome.warnings {
            warn!(%warning, "Scan warning");
        }

        self.tree.replace_root(outcome.root);
        self.warnings = outcome.warnings;
        self.emit(TreeEvent::TreeReplaced { root: root.clone() });

        self.tree.restore_expanded(expanded);
        let restored = self.tree.snapshot_expanded().len();
        self.emit(TreeEvent::ExpansionRestored { expanded: restored });

        debug!(root = %root.display(), expanded = restored, "Tree rebuilt");
        Ok(())
    }
}

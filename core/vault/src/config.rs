//! Vault configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use pdfvault_common::{Error, Result};

/// Name of the vault directory created under the user's documents folder.
pub const DEFAULT_VAULT_DIRNAME: &str = "My CASTLE";

/// Base name for newly created folders.
pub const DEFAULT_FOLDER_TEMPLATE: &str = "New Folder";

/// Extension of the documents the vault manages.
pub const DEFAULT_PDF_EXTENSION: &str = "pdf";

/// Pointer travel (in pixels, per axis) that turns a press into a drag.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 5.0;

/// Vault configuration.
///
/// Stored as JSON; every field falls back to its default when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Absolute path of the vault root directory.
    pub root: PathBuf,
    /// Base name used by folder creation.
    pub folder_template: String,
    /// Extension (without dot) recognized as a PDF document.
    pub pdf_extension: String,
    /// Drag gesture threshold in pixels.
    pub drag_threshold: f64,
}

impl VaultConfig {
    /// Configuration for a vault rooted at `root`, other fields default.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// The well-known vault location: `<documents>/My CASTLE`.
    ///
    /// Falls back to the home directory, then the current directory, on
    /// platforms without a documents folder.
    pub fn default_root() -> PathBuf {
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_VAULT_DIRNAME)
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// - File cannot be read
    /// - Content is not valid configuration JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        info!(path = %path.display(), root = %config.root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Check field-level constraints.
    ///
    /// # Errors
    /// - Root is relative
    /// - Folder template is not a valid name
    /// - Extension is empty or dotted
    /// - Drag threshold is negative or not finite
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_absolute() {
            return Err(Error::InvalidInput(format!(
                "vault root must be absolute: {}",
                self.root.display()
            )));
        }
        pdfvault_common::validate_file_name(&self.folder_template)?;
        if self.pdf_extension.is_empty() || self.pdf_extension.contains('.') {
            return Err(Error::InvalidInput(format!(
                "invalid document extension '{}'",
                self.pdf_extension
            )));
        }
        if !self.drag_threshold.is_finite() || self.drag_threshold < 0.0 {
            return Err(Error::InvalidInput(
                "drag threshold must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    /// Create the vault root if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
            info!(root = %self.root.display(), "Vault directory created");
        }
        Ok(())
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: Self::default_root(),
            folder_template: DEFAULT_FOLDER_TEMPLATE.to_string(),
            pdf_extension: DEFAULT_PDF_EXTENSION.to_string(),
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }
}

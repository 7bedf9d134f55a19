//! Common types used throughout the PDF vault.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Kind of a node in the vault tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// The vault root directory itself.
    Root,
    /// A folder below the root.
    Folder,
    /// A PDF document.
    File,
}

impl NodeKind {
    /// Whether nodes of this kind may own children.
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Folder)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeKind::Root => "root",
            NodeKind::Folder => "folder",
            NodeKind::File => "file",
        };
        f.write_str(label)
    }
}

/// Characters rejected in a single file or folder name.
///
/// This is the union of what Windows and Unix forbid, so a vault stays
/// portable between hosts.
const ILLEGAL_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Validate a candidate name for a single path component.
///
/// # Errors
/// - Returns `InvalidName` if the name is empty, is `.` or `..`, or contains
///   a separator, a reserved character, or a control character
pub fn validate_file_name(name: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(crate::Error::InvalidName("name cannot be empty".to_string()));
    }
    if name == "." || name == ".." {
        return Err(crate::Error::InvalidName(format!(
            "'{}' is reserved",
            name
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| ILLEGAL_NAME_CHARS.contains(c) || c.is_control())
    {
        return Err(crate::Error::InvalidName(format!(
            "'{}' contains the invalid character {:?}",
            name, c
        )));
    }
    Ok(())
}

/// Case-insensitive extension check (`report.PDF` matches `pdf`).
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

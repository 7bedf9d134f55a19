//! Vault tree engine for PDF Vault.
//!
//! This module provides:
//! - An in-memory tree mirroring the vault's folders and PDF files
//! - Recursive directory scanning into that tree
//! - Filesystem-first structural operations (create, import, delete,
//!   rename, move) that keep the tree consistent with the disk
//! - Drag-and-drop gesture tracking feeding the move operation
//!
//! # Architecture
//! [`VaultTreeSync`] sits between the presentation layer and a
//! [`pdfvault_storage::StorageProvider`]. The disk is the source of truth:
//! a mutation touches the tree only after the provider reports success,
//! and moves rebuild the tree from a fresh scan.

pub mod config;
pub mod conflict;
pub mod events;
pub mod gesture;
pub mod scanner;
pub mod sync;
pub mod tree;

pub use config::VaultConfig;
pub use conflict::PathConflictResolver;
pub use events::{EventLog, LoggingObserver, NullObserver, TreeEvent, TreeObserver};
pub use gesture::{DragGesture, DropEffect, GestureState, MoveRequest, Point};
pub use scanner::{DirectoryScanner, ScanOutcome, ScanWarning};
pub use sync::{
    DeleteOutcome, ImportFailure, ImportReport, MoveOutcome, RenameOutcome, Selection,
    VaultTreeSync,
};
pub use tree::{VaultNode, VaultTree};

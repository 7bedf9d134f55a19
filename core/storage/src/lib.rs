//! Filesystem access for the PDF vault.
//!
//! This module provides a trait-based interface over the handful of
//! filesystem primitives the vault engine consumes, and the local-disk
//! implementation used by the application.
//!
//! # Design Principles
//! - One seam: the tree engine never touches `std::fs` for mutations
//! - Synchronous: every call completes before the next user action
//! - Unified error semantics: OS failures surface as `Error::Io`

pub mod local;
pub mod provider;

pub use local::LocalProvider;
pub use provider::{Entry, StorageProvider};

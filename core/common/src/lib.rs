//! Common utilities and types shared across the PDF vault crates.
//!
//! This module provides the error taxonomy and the small value types
//! (node kinds, file-name rules) that every other crate builds on.

pub mod error;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use types::{has_extension, validate_file_name, NodeKind};

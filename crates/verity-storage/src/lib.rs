//! Verity Storage Library
//!
//! This crate provides the byte store for raw uploads: the `Storage` trait and
//! a local filesystem implementation rooted at the configured upload folder.
//!
//! # Storage key format
//!
//! Keys are flat file names of the form `{uuid}_{sanitized original name}`.
//! Keys must not contain `..`, path separators or a leading `/`. Key
//! generation lives in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::{sanitize_filename, storage_name_for};
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};

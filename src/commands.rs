//! Command implementations shared by the CLI and the HTTP server.
//!
//! Each mutating command returns the user-facing success message so both
//! front ends report outcomes identically.

use std::path::{Path, PathBuf};

use crate::config::{Config, expand_tilde};
use crate::storage::local::LocalDocumentStore;
use crate::storage::{DocumentStore, StorageError};

pub const WRITE_MESSAGE: &str = "PDF file written successfully";
pub const APPEND_MESSAGE: &str = "Content appended successfully to PDF";
pub const RENAME_MESSAGE: &str = "PDF file renamed successfully";
pub const DELETE_MESSAGE: &str = "PDF file deleted successfully";
pub const CREATE_DIR_MESSAGE: &str = "Directory created successfully";
pub const DELETE_DIR_MESSAGE: &str = "Directory deleted successfully";

/// Pick the storage root: an explicit override wins over the config file.
#[must_use]
pub fn storage_root(override_root: Option<&Path>, config: &Config) -> PathBuf {
    override_root.map_or_else(|| expand_tilde(&config.storage.root), Path::to_path_buf)
}

/// Open (creating if needed) the local store at `root`.
///
/// # Errors
///
/// Returns an error if the root directory cannot be created.
pub fn open_store(root: PathBuf) -> anyhow::Result<LocalDocumentStore> {
    Ok(LocalDocumentStore::open(root)?)
}

/// Create or overwrite a document holding `content`.
///
/// # Errors
///
/// Propagates the store's `StorageError`.
pub fn write(
    store: &dyn DocumentStore,
    name: &str,
    content: &str,
) -> Result<&'static str, StorageError> {
    store.create(name, content)?;
    Ok(WRITE_MESSAGE)
}

/// Append a page holding `content` to an existing document.
///
/// # Errors
///
/// Propagates the store's `StorageError`.
pub fn append(
    store: &dyn DocumentStore,
    name: &str,
    content: &str,
) -> Result<&'static str, StorageError> {
    store.append(name, content)?;
    Ok(APPEND_MESSAGE)
}

/// Read a document's extracted text.
///
/// # Errors
///
/// Propagates the store's `StorageError`.
pub fn read_text(store: &dyn DocumentStore, name: &str) -> Result<String, StorageError> {
    store.read_text(name)
}

/// Read a document's raw bytes.
///
/// # Errors
///
/// Propagates the store's `StorageError`.
pub fn read_raw(store: &dyn DocumentStore, name: &str) -> Result<Vec<u8>, StorageError> {
    store.read_bytes(name)
}

/// Rename a document.
///
/// # Errors
///
/// Propagates the store's `StorageError`.
pub fn rename(
    store: &dyn DocumentStore,
    old_name: &str,
    new_name: &str,
) -> Result<&'static str, StorageError> {
    store.rename(old_name, new_name)?;
    Ok(RENAME_MESSAGE)
}

/// Delete a document.
///
/// # Errors
///
/// Propagates the store's `StorageError`.
pub fn delete(store: &dyn DocumentStore, name: &str) -> Result<&'static str, StorageError> {
    store.delete(name)?;
    Ok(DELETE_MESSAGE)
}

/// Create a directory (and parents) under the root.
///
/// # Errors
///
/// Propagates the store's `StorageError`.
pub fn create_dir(store: &dyn DocumentStore, name: &str) -> Result<&'static str, StorageError> {
    store.create_directory(name)?;
    Ok(CREATE_DIR_MESSAGE)
}

/// Recursively delete a directory under the root.
///
/// # Errors
///
/// Propagates the store's `StorageError`.
pub fn delete_dir(store: &dyn DocumentStore, name: &str) -> Result<&'static str, StorageError> {
    store.delete_directory(name)?;
    Ok(DELETE_DIR_MESSAGE)
}

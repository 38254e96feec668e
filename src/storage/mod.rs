//! Document store trait and implementations.
//!
//! Every name a client hands us is untrusted. Implementations route each one
//! through a [`resolver::PathResolver`] before touching the filesystem, so a
//! rejected name never causes I/O.
//!
//! # Concurrency
//!
//! Operations are independent and take no locks. Two concurrent `append`
//! calls on the same document race: both may read the same bytes and the
//! later write wins, dropping the earlier page. Callers that need strict
//! append ordering must serialize per name themselves.

pub mod local;
pub mod resolver;

use std::path::{Path, PathBuf};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{0}")]
    InvalidName(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to read: {0}")]
    ReadFailure(String),

    #[error("Failed to parse PDF: {0}")]
    ParseFailure(String),

    #[error("Failed to write: {0}")]
    WriteFailure(String),

    #[error("Already exists: {0}")]
    Conflict(String),
}

impl StorageError {
    /// Shorthand for the extension check failure shared by every document operation.
    #[must_use]
    pub fn not_pdf() -> Self {
        Self::InvalidName("Only PDF files are allowed".to_string())
    }
}

/// Trait for document stores.
///
/// Names are client-supplied and resolved relative to [`DocumentStore::root`].
/// Document operations require a `.pdf` extension (case-insensitive);
/// directory operations do not.
pub trait DocumentStore: Send + Sync {
    /// Create (or overwrite) a single-page document holding `text`.
    ///
    /// # Errors
    ///
    /// `InvalidName` for a bad name, `WriteFailure` if the file cannot be written.
    fn create(&self, name: &str, text: &str) -> Result<PathBuf, StorageError>;

    /// Read the raw bytes of a document, verifying they parse as a PDF.
    ///
    /// # Errors
    ///
    /// `NotFound` if the file is missing or is not a valid PDF.
    fn read_bytes(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Read the text content of every page of a document.
    ///
    /// # Errors
    ///
    /// `NotFound` if the file is missing or is not a valid PDF.
    fn read_text(&self, name: &str) -> Result<String, StorageError>;

    /// Append a new page holding `text` to an existing document.
    ///
    /// # Errors
    ///
    /// `NotFound` if the document is missing, `ParseFailure` if it is not a
    /// valid PDF, `WriteFailure` if the result cannot be saved.
    fn append(&self, name: &str, text: &str) -> Result<PathBuf, StorageError>;

    /// Rename a document.
    ///
    /// # Errors
    ///
    /// `NotFound` if the source is missing, `Conflict` if a different document
    /// already exists under the new name, `WriteFailure` if the rename fails.
    fn rename(&self, old_name: &str, new_name: &str) -> Result<PathBuf, StorageError>;

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// `NotFound` if the document does not exist.
    fn delete(&self, name: &str) -> Result<(), StorageError>;

    /// Create a directory and any missing parents. Succeeds if it already exists.
    ///
    /// # Errors
    ///
    /// `InvalidName` for an empty name, `WriteFailure` on I/O error.
    fn create_directory(&self, name: &str) -> Result<PathBuf, StorageError>;

    /// Recursively remove a directory. Succeeds if it does not exist.
    ///
    /// # Errors
    ///
    /// `InvalidName` for an empty name, `WriteFailure` on I/O error.
    fn delete_directory(&self, name: &str) -> Result<(), StorageError>;

    /// The storage root every name is resolved against.
    fn root(&self) -> &Path;
}

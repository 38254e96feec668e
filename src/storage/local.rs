//! Local filesystem document store.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::document::{self, DocumentError};
use crate::storage::resolver::PathResolver;
use crate::storage::{DocumentStore, StorageError};

/// Document store backed by a single directory on the local filesystem.
pub struct LocalDocumentStore {
    resolver: PathResolver,
}

impl LocalDocumentStore {
    /// Create a store rooted at `root` without touching the filesystem.
    ///
    /// Operations fail with `ReadFailure` until the root exists; use
    /// [`LocalDocumentStore::open`] to create it.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            resolver: PathResolver::new(root),
        }
    }

    /// Create the root directory if needed and return a store over it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::WriteFailure` if the root cannot be created.
    pub fn open(root: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).map_err(|e| {
            StorageError::WriteFailure(format!("create root {}: {e}", root.display()))
        })?;
        info!("Storage root: {}", root.display());
        Ok(Self::new(root))
    }

    fn document_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let path = self.resolver.resolve_document(name)?;
        self.resolver.confine(&path)?;
        debug!("Resolved document {name:?} to {}", path.display());
        Ok(path)
    }

    fn directory_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let path = self.resolver.resolve_directory(name)?;
        self.resolver.confine(&path)?;
        debug!("Resolved directory {name:?} to {}", path.display());
        Ok(path)
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(self.resolver.root()).unwrap_or(path)
    }

    /// Read a document file, mapping absence to `NotFound`.
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        if !path.is_file() {
            return Err(StorageError::NotFound(self.relative(path).display().to_string()));
        }

        fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                StorageError::NotFound(self.relative(path).display().to_string())
            }
            _ => StorageError::ReadFailure(format!("{}: {e}", self.relative(path).display())),
        })
    }

    /// Read and parse a document for the read operations, which report an
    /// unparseable file as missing.
    fn read_valid(&self, name: &str) -> Result<(PathBuf, Vec<u8>), StorageError> {
        let path = self.document_path(name)?;
        let bytes = self.read_file(&path)?;

        document::validate(&bytes).map_err(|e| {
            StorageError::NotFound(format!("{}: {e}", self.relative(&path).display()))
        })?;

        Ok((path, bytes))
    }

    /// Write through a uniquely named sibling and rename it into place.
    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::InvalidName(path.display().to_string()))?;

        replace_with(parent, path, bytes).map_err(|e| {
            StorageError::WriteFailure(format!("{}: {e}", self.relative(path).display()))
        })
    }
}

/// Concurrent writers each get their own temporary file; the last rename wins.
fn replace_with(parent: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".pdfvault-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn serialize_error(path: &Path, e: &DocumentError) -> StorageError {
    StorageError::WriteFailure(format!("{}: {e}", path.display()))
}

impl DocumentStore for LocalDocumentStore {
    fn create(&self, name: &str, text: &str) -> Result<PathBuf, StorageError> {
        let path = self.document_path(name)?;

        let bytes = document::create(text).map_err(|e| serialize_error(self.relative(&path), &e))?;
        self.write_file(&path, &bytes)?;

        info!("Created {} ({} bytes)", self.relative(&path).display(), bytes.len());
        Ok(path)
    }

    fn read_bytes(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let (_, bytes) = self.read_valid(name)?;
        Ok(bytes)
    }

    fn read_text(&self, name: &str) -> Result<String, StorageError> {
        let (path, bytes) = self.read_valid(name)?;

        document::extract_text(&bytes).map_err(|e| {
            StorageError::NotFound(format!("{}: {e}", self.relative(&path).display()))
        })
    }

    fn append(&self, name: &str, text: &str) -> Result<PathBuf, StorageError> {
        let path = self.document_path(name)?;
        let existing = self.read_file(&path)?;

        let bytes = document::append_page(&existing, text).map_err(|e| match e {
            DocumentError::Serialize(_) => serialize_error(self.relative(&path), &e),
            _ => StorageError::ParseFailure(format!("{}: {e}", self.relative(&path).display())),
        })?;
        self.write_file(&path, &bytes)?;

        let pages = document::page_count(&bytes).unwrap_or_default();
        info!(
            "Appended page to {} ({pages} pages, {} bytes)",
            self.relative(&path).display(),
            bytes.len()
        );
        Ok(path)
    }

    fn rename(&self, old_name: &str, new_name: &str) -> Result<PathBuf, StorageError> {
        let old_path = self.document_path(old_name)?;
        let new_path = self.document_path(new_name)?;

        if !old_path.is_file() {
            return Err(StorageError::NotFound(
                self.relative(&old_path).display().to_string(),
            ));
        }

        if old_path == new_path {
            return Ok(new_path);
        }

        // A case-only rename on a case-insensitive filesystem sees the source
        // under the new name; that is the same file, not a conflict.
        if new_path.exists() && !same_file(&old_path, &new_path) {
            return Err(StorageError::Conflict(
                self.relative(&new_path).display().to_string(),
            ));
        }

        fs::rename(&old_path, &new_path).map_err(|e| {
            StorageError::WriteFailure(format!(
                "rename {} -> {}: {e}",
                self.relative(&old_path).display(),
                self.relative(&new_path).display()
            ))
        })?;

        info!(
            "Renamed {} -> {}",
            self.relative(&old_path).display(),
            self.relative(&new_path).display()
        );
        Ok(new_path)
    }

    fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.document_path(name)?;

        if !path.is_file() {
            return Err(StorageError::NotFound(self.relative(&path).display().to_string()));
        }

        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                StorageError::NotFound(self.relative(&path).display().to_string())
            }
            _ => StorageError::WriteFailure(format!("{}: {e}", self.relative(&path).display())),
        })?;

        info!("Deleted {}", self.relative(&path).display());
        Ok(())
    }

    fn create_directory(&self, name: &str) -> Result<PathBuf, StorageError> {
        let path = self.directory_path(name)?;

        fs::create_dir_all(&path).map_err(|e| {
            StorageError::WriteFailure(format!(
                "create dir {}: {e}",
                self.relative(&path).display()
            ))
        })?;

        info!("Created directory {}", self.relative(&path).display());
        Ok(path)
    }

    fn delete_directory(&self, name: &str) -> Result<(), StorageError> {
        let path = self.directory_path(name)?;

        match fs::remove_dir_all(&path) {
            Ok(()) => {
                info!("Deleted directory {}", self.relative(&path).display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Directory {} already absent", self.relative(&path).display());
                Ok(())
            }
            Err(e) => Err(StorageError::WriteFailure(format!(
                "remove dir {}: {e}",
                self.relative(&path).display()
            ))),
        }
    }

    fn root(&self) -> &Path {
        self.resolver.root()
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

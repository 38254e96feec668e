//! Mapping of untrusted names onto paths inside the storage root.

use std::path::{Component, Path, PathBuf};

use crate::storage::StorageError;

/// Extension every document name must carry.
pub const PDF_EXTENSION: &str = "pdf";

/// Resolves client-supplied names to paths under a fixed root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a name to a direct child of the root.
    ///
    /// Only the final segment of `name` is kept (split on both `/` and `\`),
    /// so `../../etc/passwd` resolves to `<root>/passwd`. Traversal segments
    /// are discarded rather than interpreted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidName` if the name is empty, has no usable
    /// final segment, contains a NUL byte, or lacks a `.pdf` extension when
    /// `require_pdf` is set.
    pub fn resolve(&self, name: &str, require_pdf: bool) -> Result<PathBuf, StorageError> {
        let base = basename(name)?;

        if require_pdf && !has_pdf_extension(base) {
            return Err(StorageError::not_pdf());
        }

        Ok(self.root.join(base))
    }

    /// Resolve a document name (`.pdf` required).
    ///
    /// # Errors
    ///
    /// See [`PathResolver::resolve`].
    pub fn resolve_document(&self, name: &str) -> Result<PathBuf, StorageError> {
        self.resolve(name, true)
    }

    /// Resolve a directory name, keeping nested structure.
    ///
    /// Only normal components survive: `..`, `.`, and any root or drive
    /// prefix are dropped, so `x/../../y` becomes `<root>/x/y` and `/etc`
    /// becomes `<root>/etc`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidName` if nothing usable is left.
    pub fn resolve_directory(&self, name: &str) -> Result<PathBuf, StorageError> {
        if name.contains('\0') {
            return Err(StorageError::InvalidName(
                "Directory name contains a NUL byte".to_string(),
            ));
        }

        let normalized = name.replace('\\', "/");
        let relative: PathBuf = Path::new(&normalized)
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();

        if relative.as_os_str().is_empty() {
            return Err(StorageError::InvalidName(
                "Directory name is required".to_string(),
            ));
        }

        Ok(self.root.join(relative))
    }

    /// Verify that a resolved path stays inside the root on disk.
    ///
    /// Walks up from `path` to the nearest existing ancestor and checks that
    /// it canonicalizes inside the canonical root. This catches symlinks
    /// planted inside the root that point elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidName` if the path escapes the root, or
    /// `StorageError::ReadFailure` if the root itself cannot be accessed.
    pub fn confine(&self, path: &Path) -> Result<(), StorageError> {
        let canonical_root = self.root.canonicalize().map_err(|e| {
            StorageError::ReadFailure(format!(
                "cannot access storage root {}: {e}",
                self.root.display()
            ))
        })?;

        let mut check_path = path;
        loop {
            // Dangling links count as existing.
            if check_path.symlink_metadata().is_ok() {
                let canonical = check_path.canonicalize().map_err(|_| {
                    StorageError::InvalidName(format!(
                        "Cannot verify path: {}",
                        display_relative(&self.root, path)
                    ))
                })?;
                if !canonical.starts_with(&canonical_root) {
                    return Err(StorageError::InvalidName(format!(
                        "Path escapes storage root: {}",
                        display_relative(&self.root, path)
                    )));
                }
                return Ok(());
            }

            match check_path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => check_path = parent,
                _ => {
                    return Err(StorageError::InvalidName(format!(
                        "Cannot verify path: {}",
                        display_relative(&self.root, path)
                    )));
                }
            }
        }
    }
}

/// Final path segment of `name`, rejecting empty and dot segments.
///
/// # Errors
///
/// Returns `StorageError::InvalidName` for empty, NUL-bearing, or dot-only names.
pub fn basename(name: &str) -> Result<&str, StorageError> {
    if name.trim().is_empty() {
        return Err(StorageError::InvalidName("File name is required".to_string()));
    }
    if name.contains('\0') {
        return Err(StorageError::InvalidName(
            "File name contains a NUL byte".to_string(),
        ));
    }

    let base = name
        .split(['/', '\\'])
        .rfind(|segment| !segment.is_empty())
        .unwrap_or_default();

    match base {
        "" | "." | ".." => Err(StorageError::InvalidName(format!(
            "Invalid file name: {name}"
        ))),
        _ => Ok(base),
    }
}

/// Case-insensitive `.pdf` check. A bare `.pdf` has no stem and is rejected.
#[must_use]
pub fn has_pdf_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PDF_EXTENSION))
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

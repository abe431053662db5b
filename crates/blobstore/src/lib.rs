//! Binary file storage for Openshelf
//!
//! Covers and uploaded book files live on disk under a single content root,
//! organized into folders ("images/covers", "books"). Stored filenames are
//! generated UUIDs so concurrent uploads can never collide; the original
//! filename is kept in the database, never on disk. All paths handed out and
//! accepted by this crate are root-relative with forward slashes.

use openshelf_core::{AppError, Result, UploadedFile};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Longest extension a stored filename will carry
const EXTENSION_MAX_LEN: usize = 10;

/// File store rooted at a content directory
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Creates a store over the given content root
    ///
    /// The root does not have to exist yet; folders are created on first
    /// save into them.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute on-disk path for a stored relative path
    pub fn absolute_path(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }

    /// Saves bytes into `folder` under a fresh UUID filename
    ///
    /// `extension` is appended verbatim when given; pass the enforced
    /// extension for typed uploads so a mislabeled file cannot smuggle its
    /// own. Returns the root-relative path of the new file.
    pub async fn save(
        &self,
        content: &[u8],
        folder: &str,
        extension: Option<&str>,
    ) -> Result<String> {
        if !is_safe_relative(folder) {
            return Err(AppError::InvalidArgument {
                argument: "folder".to_string(),
                reason: format!("unsafe storage folder: {}", folder),
            });
        }

        let file_name = match extension.map(sanitize_extension) {
            Some(Some(ext)) => format!("{}.{}", Uuid::new_v4(), ext),
            _ => Uuid::new_v4().to_string(),
        };
        let relative_path = format!("{}/{}", folder.trim_end_matches('/'), file_name);
        let absolute = self.absolute_path(&relative_path);

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage("Failed to create storage folder", e))?;
        }
        fs::write(&absolute, content)
            .await
            .map_err(|e| AppError::storage(format!("Failed to write {}", relative_path), e))?;

        log::debug!("saved blob {} ({} bytes)", relative_path, content.len());
        Ok(relative_path)
    }

    /// Saves an upload, taking the stored extension from the original
    /// filename unless an enforced one is given
    pub async fn save_upload(
        &self,
        upload: &UploadedFile,
        folder: &str,
        enforced_extension: Option<&str>,
    ) -> Result<String> {
        let own_extension = upload.extension();
        let extension = enforced_extension.or(own_extension.as_deref());
        self.save(&upload.content, folder, extension).await
    }

    /// Deletes a stored file, best effort
    ///
    /// Never fails: an empty path or a file that is already gone is a no-op,
    /// and any other I/O error is logged and swallowed. Callers invoke this
    /// after their database commit, at a point where surfacing an error
    /// could only misreport an operation that already succeeded.
    pub async fn delete(&self, relative_path: &str) {
        if relative_path.is_empty() {
            return;
        }
        if !is_safe_relative(relative_path) {
            log::warn!("refusing to delete unsafe blob path: {}", relative_path);
            return;
        }

        match fs::remove_file(self.absolute_path(relative_path)).await {
            Ok(()) => log::debug!("deleted blob {}", relative_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("failed to delete blob {}: {}", relative_path, e),
        }
    }

    /// Reads a stored file into memory
    pub async fn read(&self, relative_path: &str) -> Result<Vec<u8>> {
        if !is_safe_relative(relative_path) {
            return Err(AppError::InvalidArgument {
                argument: "relative_path".to_string(),
                reason: format!("unsafe blob path: {}", relative_path),
            });
        }

        let absolute = self.absolute_path(relative_path);
        fs::read(&absolute).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::FileNotFound { path: absolute },
            _ => AppError::storage(format!("Failed to read {}", relative_path), e),
        })
    }

    /// Returns true if the stored file exists on disk
    pub async fn exists(&self, relative_path: &str) -> bool {
        if relative_path.is_empty() || !is_safe_relative(relative_path) {
            return false;
        }
        fs::try_exists(self.absolute_path(relative_path))
            .await
            .unwrap_or(false)
    }
}

/// Rejects absolute paths and any path that could climb out of the root
fn is_safe_relative(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Keeps only extensions that are plain ASCII alphanumerics
fn sanitize_extension(extension: &str) -> Option<String> {
    let trimmed = extension.trim_start_matches('.');
    if trimmed.is_empty()
        || trimmed.len() > EXTENSION_MAX_LEN
        || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(trimmed.to_lowercase())
}

use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::uploader::model::{FileUpload, FileValidator, UploadField};

/// Public URL prefix under which the assets directory is served.
pub const ASSETS_PREFIX: &str = "/assets";

#[derive(Debug, Error)]
pub enum UploadError {
    /// The client sent a file we refuse to store.
    #[error("{0}")]
    Invalid(String),

    #[error("upload I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A file written to the assets directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub field: UploadField,
    /// Location on disk.
    pub disk_path: PathBuf,
    /// Path clients use to fetch the file, e.g. `/assets/faces/<name>`.
    pub public_path: String,
}

/// Writes uploaded images below the assets root.
pub struct UploadService {
    assets_dir: PathBuf,
    validator: FileValidator,
}

impl UploadService {
    pub fn new(assets_dir: impl Into<PathBuf>, validator: FileValidator) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            validator,
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    /// Validates and stores one file as `<uuid>-<original name>`.
    pub async fn save(
        &self,
        field: UploadField,
        file: &FileUpload,
    ) -> Result<StoredFile, UploadError> {
        self.validator.validate(file).map_err(UploadError::Invalid)?;

        let stored_name = format!("{}-{}", Uuid::new_v4(), file.sanitized_name());

        let mut dir = self.assets_dir.clone();
        let mut public_path = ASSETS_PREFIX.to_string();
        if let Some(sub_dir) = field.sub_dir() {
            dir.push(sub_dir);
            public_path.push('/');
            public_path.push_str(sub_dir);
        }
        public_path.push('/');
        public_path.push_str(&stored_name);

        tokio::fs::create_dir_all(&dir).await?;

        let disk_path = dir.join(&stored_name);
        if let Err(e) = tokio::fs::write(&disk_path, &file.data).await {
            let _ = tokio::fs::remove_file(&disk_path).await;
            return Err(e.into());
        }

        log::info!(
            "Stored {} upload '{}' at {}",
            field.field_name(),
            file.file_name,
            disk_path.display()
        );

        Ok(StoredFile {
            field,
            disk_path,
            public_path,
        })
    }

    /// Best-effort removal of files from a request that did not complete.
    pub async fn discard(&self, files: &[StoredFile]) {
        for file in files {
            if let Err(e) = tokio::fs::remove_file(&file.disk_path).await {
                log::warn!(
                    "Failed to remove orphaned upload {}: {}",
                    file.disk_path.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[actix_web::test]
    async fn files_land_in_field_specific_directories() {
        let dir = TempDir::new().unwrap();
        let service = UploadService::new(dir.path(), FileValidator::images());
        let file = FileUpload::new("me.png".into(), vec![7; 16], Some("image/png".into()));

        let face = service.save(UploadField::Image, &file).await.unwrap();
        assert!(face.public_path.starts_with("/assets/faces/"));
        assert!(face.public_path.ends_with("-me.png"));
        assert_eq!(face.disk_path.parent().unwrap(), dir.path().join("faces"));
        assert_eq!(std::fs::read(&face.disk_path).unwrap(), vec![7; 16]);

        let background = service.save(UploadField::Background, &file).await.unwrap();
        assert!(background.public_path.starts_with("/assets/"));
        assert!(!background.public_path.starts_with("/assets/faces/"));
        assert_eq!(background.disk_path.parent().unwrap(), dir.path());

        // Same original name, distinct stored names.
        assert_ne!(face.disk_path.file_name(), background.disk_path.file_name());

        service.discard(&[face.clone(), background.clone()]).await;
        assert!(!face.disk_path.exists());
        assert!(!background.disk_path.exists());
    }

    #[actix_web::test]
    async fn invalid_files_are_not_written() {
        let dir = TempDir::new().unwrap();
        let service = UploadService::new(dir.path(), FileValidator::images());
        let file = FileUpload::new("script.sh".into(), vec![1; 4], None);

        assert!(matches!(
            service.save(UploadField::Background, &file).await,
            Err(UploadError::Invalid(_))
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn unwritable_assets_root_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("assets");
        std::fs::write(&root, b"not a directory").unwrap();
        let service = UploadService::new(&root, FileValidator::images());
        let file = FileUpload::new("me.png".into(), vec![7; 16], None);

        assert!(matches!(
            service.save(UploadField::Image, &file).await,
            Err(UploadError::Io(_))
        ));
    }
}

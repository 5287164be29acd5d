use crate::config::CatalogConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

/// Local file store for product images.
///
/// A stored reference is the bare file name; files are served under `/images`.
pub struct ImageStore {
    root: PathBuf,
    allowed_extensions: Vec<String>,
}

impl ImageStore {
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            root: PathBuf::from(&config.images_path),
            allowed_extensions: config
                .allowed_image_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the normalized extension of an upload name, or a message
    /// describing why it is not accepted.
    pub fn check_filename(&self, filename: &str) -> Result<String, String> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| format!("File '{filename}' has no extension"))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(format!(
                "Unsupported image type '.{extension}', allowed: {}",
                self.allowed_extensions.join(", ")
            ));
        }

        let is_image = mime_guess::from_ext(&extension)
            .first()
            .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE);
        if !is_image {
            return Err(format!("'.{extension}' is not an image type"));
        }

        Ok(extension)
    }

    /// Write `bytes` under a fresh unique name and return its reference.
    pub async fn save(&self, bytes: &[u8], original_filename: &str) -> Result<String> {
        let extension = self
            .check_filename(original_filename)
            .map_err(anyhow::Error::msg)?;

        if !self.root.exists() {
            fs::create_dir_all(&self.root)
                .await
                .with_context(|| format!("Failed to create {}", self.root.display()))?;
        }

        let reference = format!("{}.{extension}", Uuid::new_v4().simple());
        let file_path = self.root.join(&reference);

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write image to {}", file_path.display()))?;

        info!(path = %file_path.display(), size = bytes.len(), "Saved image");
        Ok(reference)
    }

    /// Remove the file behind `reference`. Missing files are not an error.
    pub async fn delete(&self, reference: &str) -> Result<()> {
        let Some(path) = self.resolve(reference) else {
            anyhow::bail!("Refusing to delete suspicious image reference '{reference}'");
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(path = %path.display(), "Deleted image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to delete image {}", path.display()))
            }
        }
    }

    /// Best-effort removal of several files; failures are logged.
    pub async fn delete_all(&self, references: &[String]) {
        for reference in references {
            if let Err(e) = self.delete(reference).await {
                warn!(reference = %reference, error = %e, "Failed to remove image file");
            }
        }
    }

    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let name = Path::new(reference).file_name()?.to_str()?;
        (name == reference).then(|| self.root.join(name))
    }
}

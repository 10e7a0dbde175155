use error_types::{ServiceError, ServiceResult};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::format::ImageFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub name: String,
    pub url: String,
}

#[derive(Debug)]
pub struct ImageData {
    pub data: Vec<u8>,
    pub format: ImageFormat,
}

/// Flat on-disk image store; every file is `{uuid}.{ext}` directly under `dir`
pub struct ImageStore {
    dir: PathBuf,
    public_prefix: String,
    max_bytes: usize,
}

/// Parse a stored file name, rejecting anything that is not `{uuid}.{ext}`
pub fn parse_name(name: &str) -> ServiceResult<(Uuid, ImageFormat)> {
    let invalid = || ServiceError::invalid_input("invalid image name");
    let (stem, ext) = name.split_once('.').ok_or_else(invalid)?;
    let id = Uuid::parse_str(stem).map_err(|_| invalid())?;
    let format = ImageFormat::from_extension(ext).ok_or_else(invalid)?;
    // Only the canonical hyphenated form, so one image has exactly one name
    if id.hyphenated().to_string() != stem {
        return Err(invalid());
    }
    Ok((id, format))
}

impl ImageStore {
    pub async fn open(config: &StorageConfig) -> anyhow::Result<Self> {
        fs::create_dir_all(&config.dir).await?;
        info!("Image storage directory: {}", config.dir.display());
        Ok(Self {
            dir: config.dir.clone(),
            public_prefix: config.public_prefix.clone(),
            max_bytes: config.max_bytes,
        })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.public_prefix, name)
    }

    /// Check size, declared type and magic bytes
    pub fn check_upload(&self, data: &[u8], content_type: &str) -> ServiceResult<ImageFormat> {
        if data.is_empty() {
            return Err(ServiceError::invalid_input("image data is empty"));
        }
        if data.len() > self.max_bytes {
            return Err(ServiceError::invalid_input(format!(
                "image exceeds {} bytes",
                self.max_bytes
            )));
        }
        let declared = ImageFormat::from_content_type(content_type).ok_or_else(|| {
            ServiceError::invalid_input(format!("unsupported content type '{}'", content_type))
        })?;
        match ImageFormat::sniff(data) {
            Some(actual) if actual == declared => Ok(declared),
            _ => Err(ServiceError::invalid_input(
                "image data does not match content type",
            )),
        }
    }

    pub async fn save(&self, data: &[u8], content_type: &str) -> ServiceResult<StoredImage> {
        let format = self.check_upload(data, content_type)?;
        let name = format!("{}.{}", Uuid::new_v4(), format.extension());
        let path = self.dir.join(&name);

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(ServiceError::internal)?;
        if let Err(e) = file.write_all(data).await {
            let _ = fs::remove_file(&path).await;
            return Err(ServiceError::internal(e));
        }
        file.flush().await.map_err(ServiceError::internal)?;

        info!(event = "image_stored", name = %name, bytes = data.len());
        Ok(StoredImage {
            url: self.url_for(&name),
            name,
        })
    }

    pub async fn load(&self, name: &str) -> ServiceResult<ImageData> {
        let (_, format) = parse_name(name)?;
        match fs::read(self.dir.join(name)).await {
            Ok(data) => Ok(ImageData { data, format }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ServiceError::not_found("image")),
            Err(e) => Err(ServiceError::internal(e)),
        }
    }

    pub async fn delete(&self, name: &str) -> ServiceResult<()> {
        parse_name(name)?;
        match fs::remove_file(self.dir.join(name)).await {
            Ok(()) => {
                info!(event = "image_deleted", name = %name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Image {} already gone", name);
                Err(ServiceError::not_found("image"))
            }
            Err(e) => Err(ServiceError::internal(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    async fn store(max_bytes: usize) -> ImageStore {
        let config = StorageConfig {
            dir: std::env::temp_dir().join(format!("image-store-{}", Uuid::new_v4())),
            public_prefix: "/api/v1/images".to_string(),
            max_bytes,
        };
        ImageStore::open(&config).await.unwrap()
    }

    #[test]
    fn test_parse_name_rejects_escapes() {
        let id = Uuid::new_v4();
        let bad_names = [
            "../etc/passwd".to_string(),
            "a/b.png".to_string(),
            "not-a-uuid.png".to_string(),
            String::new(),
            ".png".to_string(),
            format!("{id}.exe"),
            format!("{id}.png/../x"),
            format!("{}.png", id.simple()),
        ];
        for bad in &bad_names {
            assert!(parse_name(bad).is_err(), "accepted {bad:?}");
        }
        assert_eq!(
            parse_name(&format!("{id}.webp")).unwrap(),
            (id, ImageFormat::Webp)
        );
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = store(1024).await;

        let stored = store.save(PNG, "image/png").await.unwrap();
        assert!(stored.name.ends_with(".png"));
        assert_eq!(stored.url, format!("/api/v1/images/{}", stored.name));

        let loaded = store.load(&stored.name).await.unwrap();
        assert_eq!(loaded.data, PNG);
        assert_eq!(loaded.format, ImageFormat::Png);

        store.delete(&stored.name).await.unwrap();
        let err = store.delete(&stored.name).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { resource: "image" }));
        assert!(store.load(&stored.name).await.is_err());

        let _ = fs::remove_dir_all(store.dir()).await;
    }

    #[tokio::test]
    async fn test_rejects_bad_uploads() {
        let store = store(16).await;

        assert!(store.save(b"", "image/png").await.is_err());
        assert!(store.save(&[0u8; 17], "image/png").await.is_err());
        assert!(store.save(PNG, "image/svg+xml").await.is_err());

        // Declared JPEG, actually PNG
        let err = store.save(PNG, "image/jpeg").await.unwrap_err();
        assert_eq!(err.to_string(), "image data does not match content type");

        let _ = fs::remove_dir_all(store.dir()).await;
    }
}

//! Input files and offline collaborators.

use crate::error::CliError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tessera_core::field::{MediaInfo, MediaResolver, PageInfo, PageResolver};
use tessera_core::{BlockRecord, ContentEntity, ContentType, ServiceProvider};
use uuid::Uuid;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and validate a content type schema.
pub fn read_schema(path: &Path) -> Result<ContentType, CliError> {
    let content_type: ContentType = read_json(path)?;
    content_type.validate()?;
    Ok(content_type)
}

/// Read a stored content entity.
pub fn read_entity(path: &Path) -> Result<ContentEntity, CliError> {
    read_json(path)
}

/// Read a flat list of block records.
pub fn read_blocks(path: &Path) -> Result<Vec<BlockRecord>, CliError> {
    read_json(path)
}

/// Resolves media without a media library: the id is echoed back.
struct OfflineMedia;

#[async_trait]
impl MediaResolver for OfflineMedia {
    async fn media(&self, id: Uuid) -> tessera_core::Result<Option<MediaInfo>> {
        Ok(Some(MediaInfo {
            id,
            filename: id.to_string(),
            url: format!("/media/{id}"),
            content_type: "application/octet-stream".to_string(),
        }))
    }
}

/// Resolves pages without a site: the id is echoed back.
struct OfflinePages;

#[async_trait]
impl PageResolver for OfflinePages {
    async fn page(&self, id: Uuid) -> tessera_core::Result<Option<PageInfo>> {
        Ok(Some(PageInfo {
            id,
            title: id.to_string(),
            permalink: format!("/page/{id}"),
        }))
    }
}

/// Service provider with the offline resolvers.
pub fn offline_services() -> Arc<ServiceProvider> {
    let media: Arc<dyn MediaResolver> = Arc::new(OfflineMedia);
    let pages: Arc<dyn PageResolver> = Arc::new(OfflinePages);
    Arc::new(ServiceProvider::new().with_singleton(media).with_singleton(pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::field::ImageField;

    #[tokio::test]
    async fn test_offline_media_echoes_id() {
        let scope = offline_services().create_scope();
        let id = Uuid::new_v4();
        let mut image = ImageField::new(id);

        tessera_core::Field::initialize(&mut image, &scope).await.unwrap();
        assert_eq!(image.media.unwrap().url, format!("/media/{id}"));
    }

    #[test]
    fn test_missing_file() {
        let result = read_schema(Path::new("/nonexistent/schema.json"));
        assert!(matches!(result, Err(CliError::Read { .. })));
    }
}

//! Fields referencing media and pages by id.
//!
//! Only the id is stored. The referenced object is looked up on load through
//! a resolver registered with the service provider; a resolver is required
//! only when the field actually holds an id.

use super::Field;
use crate::error::{Error, Result};
use crate::inject::InjectionScope;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Media metadata returned by a [`MediaResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Media id.
    pub id: Uuid,
    /// Original file name.
    pub filename: String,
    /// Public URL.
    pub url: String,
    /// MIME type.
    pub content_type: String,
}

/// Page metadata returned by a [`PageResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Page id.
    pub id: Uuid,
    /// Page title.
    pub title: String,
    /// Public permalink.
    pub permalink: String,
}

/// Looks up media by id.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Fetch media metadata, `None` if it no longer exists.
    async fn media(&self, id: Uuid) -> Result<Option<MediaInfo>>;
}

/// Looks up pages by id.
#[async_trait]
pub trait PageResolver: Send + Sync {
    /// Fetch page metadata, `None` if it no longer exists.
    async fn page(&self, id: Uuid) -> Result<Option<PageInfo>>;
}

fn parse_id(stored: &str) -> Result<Option<Uuid>> {
    let stored = stored.trim();
    if stored.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(stored)
        .map(Some)
        .map_err(|e| Error::Deserialization(format!("invalid reference id '{stored}': {e}")))
}

macro_rules! media_field {
    ($(#[$meta:meta])* $name:ident, $type_name:literal, [$($shorthand:literal),*]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            /// Referenced media id.
            pub id: Option<Uuid>,
            /// Resolved media, set by the initializer.
            pub media: Option<MediaInfo>,
        }

        impl $name {
            /// Reference the media with `id`.
            pub fn new(id: Uuid) -> Self {
                Self { id: Some(id), media: None }
            }
        }

        // Equality is identity: the resolved metadata is a cache.
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        #[async_trait]
        impl Field for $name {
            const TYPE_NAME: &'static str = $type_name;
            const SHORTHAND: &'static [&'static str] = &[$($shorthand),*];

            fn to_stored(&self) -> Result<String> {
                Ok(self.id.map(|id| id.to_string()).unwrap_or_default())
            }

            fn from_stored(stored: &str) -> Result<Self> {
                Ok(Self { id: parse_id(stored)?, media: None })
            }

            fn to_json(&self) -> serde_json::Value {
                serde_json::json!({ "id": self.id, "media": self.media })
            }

            async fn initialize(&mut self, scope: &InjectionScope) -> Result<()> {
                let Some(id) = self.id else {
                    return Ok(());
                };
                let resolver = scope.resolve::<Arc<dyn MediaResolver>>()?;
                self.media = resolver.media(id).await?;
                if self.media.is_none() {
                    tracing::debug!(media = %id, "referenced media not found");
                }
                Ok(())
            }
        }
    };
}

media_field!(
    /// A reference to an image.
    ImageField,
    "tessera.field.image",
    ["Image"]
);

media_field!(
    /// A reference to a document.
    DocumentField,
    "tessera.field.document",
    ["Document"]
);

/// A reference to another page.
#[derive(Debug, Clone, Default)]
pub struct PageField {
    /// Referenced page id.
    pub id: Option<Uuid>,
    /// Resolved page, set by the initializer.
    pub page: Option<PageInfo>,
}

impl PageField {
    /// Reference the page with `id`.
    pub fn new(id: Uuid) -> Self {
        Self {
            id: Some(id),
            page: None,
        }
    }
}

impl PartialEq for PageField {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[async_trait]
impl Field for PageField {
    const TYPE_NAME: &'static str = "tessera.field.page";
    const SHORTHAND: &'static [&'static str] = &["Page"];

    fn to_stored(&self) -> Result<String> {
        Ok(self.id.map(|id| id.to_string()).unwrap_or_default())
    }

    fn from_stored(stored: &str) -> Result<Self> {
        Ok(Self {
            id: parse_id(stored)?,
            page: None,
        })
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "id": self.id, "page": self.page })
    }

    async fn initialize(&mut self, scope: &InjectionScope) -> Result<()> {
        let Some(id) = self.id else {
            return Ok(());
        };
        let resolver = scope.resolve::<Arc<dyn PageResolver>>()?;
        self.page = resolver.page(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::ServiceProvider;

    struct Library;

    #[async_trait]
    impl MediaResolver for Library {
        async fn media(&self, id: Uuid) -> Result<Option<MediaInfo>> {
            Ok(Some(MediaInfo {
                id,
                filename: "logo.png".into(),
                url: "/uploads/logo.png".into(),
                content_type: "image/png".into(),
            }))
        }
    }

    #[test]
    fn test_reference_storage() {
        let id = Uuid::new_v4();
        let field = ImageField::new(id);

        assert_eq!(field.to_stored().unwrap(), id.to_string());
        assert_eq!(ImageField::from_stored(&id.to_string()).unwrap(), field);
        assert_eq!(ImageField::from_stored("").unwrap().id, None);
        assert!(PageField::from_stored("not-a-uuid").is_err());
    }

    #[tokio::test]
    async fn test_image_resolves_media() {
        let resolver: Arc<dyn MediaResolver> = Arc::new(Library);
        let provider = Arc::new(ServiceProvider::new().with_singleton(resolver));
        let scope = provider.create_scope();

        let mut field = ImageField::new(Uuid::new_v4());
        field.initialize(&scope).await.unwrap();
        assert_eq!(field.media.unwrap().filename, "logo.png");
    }

    #[tokio::test]
    async fn test_missing_resolver_fails() {
        let provider = Arc::new(ServiceProvider::new());
        let scope = provider.create_scope();

        let mut field = DocumentField::new(Uuid::new_v4());
        assert!(matches!(
            field.initialize(&scope).await,
            Err(Error::UnresolvedCollaborator { .. })
        ));

        let mut empty = DocumentField::default();
        assert!(empty.initialize(&scope).await.is_ok());
    }
}

//! Field codec: storage strings to field values and back.

use crate::error::{Error, Result};
use crate::field::FieldValue;
use crate::inject::InjectionScope;
use crate::registry::{FieldTypeDescriptor, TypeRegistry};
use std::sync::Arc;

/// Serializes, deserializes and initializes single field values.
#[derive(Debug, Clone)]
pub struct FieldCodec {
    registry: Arc<TypeRegistry>,
}

impl FieldCodec {
    /// Create a codec backed by `registry`.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// The backing type registry.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Resolve a shorthand or canonical type name.
    pub fn descriptor(&self, type_name: &str) -> Option<FieldTypeDescriptor> {
        self.registry.resolve(type_name)
    }

    /// Encode `value` as its storage string.
    ///
    /// The value's runtime type must be exactly the declared type: stored
    /// rows are decoded by their type name, never by content.
    pub fn serialize(
        &self,
        value: &dyn FieldValue,
        declared: &FieldTypeDescriptor,
        path: &str,
    ) -> Result<String> {
        if value.type_name() != declared.type_name {
            return Err(Error::TypeMismatch {
                path: path.to_string(),
                expected: declared.type_name.to_string(),
                actual: value.type_name().to_string(),
            });
        }
        value.serialize()
    }

    /// Construct a default value of the named type, optionally initialized.
    ///
    /// Returns `None` when the type name does not resolve.
    pub async fn construct(
        &self,
        type_name: &str,
        scope: Option<&InjectionScope>,
    ) -> Result<Option<Box<dyn FieldValue>>> {
        let Some(descriptor) = self.descriptor(type_name) else {
            tracing::warn!(type_name, "unresolved field type, field skipped");
            return Ok(None);
        };
        let mut value = descriptor.construct();
        if let Some(scope) = scope {
            self.initialize(value.as_mut(), scope).await?;
        }
        Ok(Some(value))
    }

    /// Decode a stored value and run its initializer.
    ///
    /// Returns `None` when `type_name` does not resolve.
    pub async fn deserialize(
        &self,
        stored: &str,
        type_name: &str,
        scope: &InjectionScope,
    ) -> Result<Option<Box<dyn FieldValue>>> {
        let Some(descriptor) = self.descriptor(type_name) else {
            tracing::warn!(type_name, "unresolved field type, stored value dropped");
            return Ok(None);
        };
        let mut value = descriptor.construct();
        value.populate(stored)?;
        self.initialize(value.as_mut(), scope).await?;
        Ok(Some(value))
    }

    /// Run a value's initializer to completion.
    ///
    /// Missing collaborators surface as `UnresolvedCollaborator`; any other
    /// initializer failure is reported as `Initialization`.
    pub async fn initialize(&self, value: &mut dyn FieldValue, scope: &InjectionScope) -> Result<()> {
        let field_type = value.type_name();
        value.init(scope).await.map_err(|err| match err {
            Error::UnresolvedCollaborator { .. } | Error::Initialization { .. } => err,
            other => Error::Initialization {
                field_type: field_type.to_string(),
                message: other.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{
        Field, HtmlField, ImageField, MediaInfo, MediaResolver, StringField, TextField,
    };
    use crate::inject::ServiceProvider;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct Offline;

    #[async_trait]
    impl MediaResolver for Offline {
        async fn media(&self, _id: Uuid) -> Result<Option<MediaInfo>> {
            Err(Error::Deserialization("media library offline".to_string()))
        }
    }

    fn codec() -> FieldCodec {
        FieldCodec::new(Arc::new(TypeRegistry::with_builtin_fields()))
    }

    #[test]
    fn test_serialize_matching_type() {
        let codec = codec();
        let declared = codec.descriptor("Text").unwrap();

        let stored = codec
            .serialize(&TextField::from("hello"), &declared, "Body.Default")
            .unwrap();
        assert_eq!(stored, "hello");
    }

    #[test]
    fn test_serialize_rejects_other_type() {
        let codec = codec();
        let declared = codec.descriptor("Text").unwrap();

        match codec.serialize(&ImageField::default(), &declared, "Body.Default") {
            Err(Error::TypeMismatch { path, expected, actual }) => {
                assert_eq!(path, "Body.Default");
                assert_eq!(expected, TextField::TYPE_NAME);
                assert_eq!(actual, ImageField::TYPE_NAME);
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deserialize_by_type_name() {
        let codec = codec();
        let provider = Arc::new(ServiceProvider::new());
        let scope = provider.create_scope();

        let value = codec
            .deserialize("<p>x</p>", HtmlField::TYPE_NAME, &scope)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value.downcast_ref::<HtmlField>(), Some(&HtmlField::from("<p>x</p>")));
    }

    #[tokio::test]
    async fn test_deserialize_unknown_type() {
        let codec = codec();
        let provider = Arc::new(ServiceProvider::new());
        let scope = provider.create_scope();

        let value = codec.deserialize("x", "legacy.Carousel", &scope).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_construct_without_scope() {
        let codec = codec();
        let value = codec.construct("String", None).await.unwrap().unwrap();

        assert_eq!(value.downcast_ref::<StringField>(), Some(&StringField::default()));
        assert!(codec.construct("Unknown", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_initializer_failure_is_wrapped() {
        let codec = codec();
        let media: Arc<dyn MediaResolver> = Arc::new(Offline);
        let provider = Arc::new(ServiceProvider::new().with_singleton(media));
        let scope = provider.create_scope();

        let stored = Uuid::new_v4().to_string();
        match codec.deserialize(&stored, "Image", &scope).await {
            Err(Error::Initialization { field_type, message }) => {
                assert_eq!(field_type, ImageField::TYPE_NAME);
                assert!(message.contains("offline"));
            }
            other => panic!("expected Initialization, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_collaborator_is_not_wrapped() {
        let codec = codec();
        let provider = Arc::new(ServiceProvider::new());
        let scope = provider.create_scope();

        let stored = Uuid::new_v4().to_string();
        let result = codec.deserialize(&stored, "Image", &scope).await;
        assert!(matches!(result, Err(Error::UnresolvedCollaborator { .. })));
    }
}

//! Region builder: default region values from a region schema.

use crate::codec::FieldCodec;
use crate::error::{Error, Result};
use crate::field::FieldValue;
use crate::inject::InjectionScope;
use crate::model::{FieldSet, RegionValue};
use crate::schema::{FieldType, RegionType};

/// Constructs empty region values.
#[derive(Debug, Clone)]
pub struct RegionBuilder {
    codec: FieldCodec,
    strict: bool,
}

impl RegionBuilder {
    /// Create a builder over `codec`.
    pub fn new(codec: FieldCodec) -> Self {
        Self {
            codec,
            strict: false,
        }
    }

    /// Fail on field types that do not resolve instead of skipping them.
    pub fn with_strict_field_types(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The field codec.
    pub fn codec(&self) -> &FieldCodec {
        &self.codec
    }

    /// Build one element of `region`.
    ///
    /// A single-field region yields the bare field value; a multi-field
    /// region yields a record keyed by field id. Returns `None` only for a
    /// single-field region whose type does not resolve.
    pub async fn build(
        &self,
        region: &RegionType,
        initialize: bool,
        scope: &InjectionScope,
    ) -> Result<Option<RegionValue>> {
        if region.is_single_field() {
            let value = self.build_field(&region.fields[0], initialize, scope).await?;
            return Ok(value.map(RegionValue::Field));
        }

        let mut record = FieldSet::new();
        for field in &region.fields {
            if let Some(value) = self.build_field(field, initialize, scope).await? {
                record.insert(field.id.clone(), value);
            }
        }
        Ok(Some(RegionValue::Record(record)))
    }

    /// Build the default value of one field.
    pub async fn build_field(
        &self,
        field: &FieldType,
        initialize: bool,
        scope: &InjectionScope,
    ) -> Result<Option<Box<dyn FieldValue>>> {
        let scope = initialize.then_some(scope);
        match self.codec.construct(&field.type_name, scope).await? {
            Some(value) => Ok(Some(value)),
            None if self.strict => Err(Error::UnknownFieldType(field.type_name.clone())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{MarkdownField, MarkdownRenderer, StringField, TextField};
    use crate::inject::ServiceProvider;
    use crate::registry::TypeRegistry;
    use std::sync::Arc;

    struct Upper;

    impl MarkdownRenderer for Upper {
        fn render(&self, markdown: &str) -> String {
            markdown.to_uppercase()
        }
    }

    fn builder() -> RegionBuilder {
        RegionBuilder::new(FieldCodec::new(Arc::new(TypeRegistry::with_builtin_fields())))
    }

    #[tokio::test]
    async fn test_single_field_collapses() {
        let scope = Arc::new(ServiceProvider::new()).create_scope();
        let region = RegionType::new("Body").with_field(FieldType::new("Default", "Text"));

        let value = builder().build(&region, true, &scope).await.unwrap().unwrap();
        assert_eq!(
            value.as_field().and_then(|v| v.downcast_ref::<TextField>()),
            Some(&TextField::default())
        );
    }

    #[tokio::test]
    async fn test_multi_field_record() {
        let scope = Arc::new(ServiceProvider::new()).create_scope();
        let region = RegionType::new("Hero").with_fields([
            FieldType::new("Title", "String"),
            FieldType::new("Legacy", "Carousel"),
            FieldType::new("Text", "Text"),
        ]);

        let value = builder().build(&region, true, &scope).await.unwrap().unwrap();
        let record = value.as_record().unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get_as::<StringField>("Title"), Some(&StringField::default()));
        assert!(!record.contains("Legacy"));
    }

    #[tokio::test]
    async fn test_strict_unknown_type() {
        let scope = Arc::new(ServiceProvider::new()).create_scope();
        let region = RegionType::new("Legacy").with_field(FieldType::new("Default", "Carousel"));

        assert!(builder().build(&region, true, &scope).await.unwrap().is_none());

        let strict = builder().with_strict_field_types(true);
        let result = strict.build(&region, true, &scope).await;
        assert!(matches!(result, Err(Error::UnknownFieldType(name)) if name == "Carousel"));
    }

    #[tokio::test]
    async fn test_initialize_flag() {
        let renderer: Arc<dyn MarkdownRenderer> = Arc::new(Upper);
        let provider = Arc::new(ServiceProvider::new().with_singleton(renderer));
        let scope = provider.create_scope();
        let field = FieldType::new("Default", "Markdown");

        let initialized = builder().build_field(&field, true, &scope).await.unwrap().unwrap();
        let plain = builder().build_field(&field, false, &scope).await.unwrap().unwrap();

        assert!(initialized.downcast_ref::<MarkdownField>().unwrap().html.is_some());
        assert!(plain.downcast_ref::<MarkdownField>().unwrap().html.is_none());
    }
}

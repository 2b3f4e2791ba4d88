//! Content factory: fresh models from a content type.

use crate::builder::RegionBuilder;
use crate::codec::FieldCodec;
use crate::config::MapperConfig;
use crate::error::Result;
use crate::inject::{InjectionScope, ServiceProvider};
use crate::model::{ContentModel, DynamicModel, RegionValue, TypedModel};
use crate::registry::TypeRegistry;
use crate::schema::ContentType;
use std::sync::Arc;

/// Creates new, fully initialized content models.
///
/// Every call opens its own injection scope, dropped once the model is
/// complete.
#[derive(Clone)]
pub struct ContentFactory {
    builder: RegionBuilder,
    provider: Arc<ServiceProvider>,
}

impl ContentFactory {
    /// Create a factory.
    pub fn new(registry: Arc<TypeRegistry>, provider: Arc<ServiceProvider>) -> Self {
        Self {
            builder: RegionBuilder::new(FieldCodec::new(registry)),
            provider,
        }
    }

    /// Apply a mapper configuration.
    pub fn with_config(mut self, config: &MapperConfig) -> Self {
        self.builder = self
            .builder
            .with_strict_field_types(config.strict_field_types);
        self
    }

    /// Create a dynamic model with every region present.
    pub async fn create_dynamic(&self, content_type: &ContentType) -> Result<DynamicModel> {
        let mut model = DynamicModel::new(content_type.id.clone());
        let scope = self.provider.create_scope();
        self.populate(&mut model, content_type, &scope).await?;
        Ok(model)
    }

    /// Create a typed model.
    ///
    /// Returns `None` when `M` is not the content type's model type.
    pub async fn create_typed<M: TypedModel>(&self, content_type: &ContentType) -> Result<Option<M>> {
        if !content_type.accepts_model(M::MODEL_TYPE) {
            tracing::debug!(
                content_type = %content_type.id,
                model = M::MODEL_TYPE,
                "model type not accepted"
            );
            return Ok(None);
        }

        let mut model = M::default();
        let scope = self.provider.create_scope();
        self.populate(&mut model, content_type, &scope).await?;
        Ok(Some(model))
    }

    /// Create one initialized element of a region, e.g. a new collection item.
    ///
    /// Returns `None` for an unknown region id.
    pub async fn create_region(
        &self,
        content_type: &ContentType,
        region_id: &str,
    ) -> Result<Option<RegionValue>> {
        let Some(region) = content_type.region(region_id) else {
            return Ok(None);
        };
        let scope = self.provider.create_scope();
        self.builder.build(region, true, &scope).await
    }

    async fn populate(
        &self,
        model: &mut dyn ContentModel,
        content_type: &ContentType,
        scope: &InjectionScope,
    ) -> Result<()> {
        for region in &content_type.regions {
            if region.collection {
                model.set_region(&region.id, RegionValue::Collection(Vec::new()))?;
                continue;
            }
            if let Some(value) = self.builder.build(region, true, scope).await? {
                model.set_region(&region.id, value)?;
            }
        }
        tracing::debug!(
            content_type = %content_type.id,
            regions = content_type.regions.len(),
            "created content model"
        );
        Ok(())
    }
}

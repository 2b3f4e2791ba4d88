//! Content mapper: stored field rows to runtime models and back.
//!
//! Loading selects each region's rows by sort order and decodes them by
//! their stored type name. Saving walks the schema, checks every value
//! against its declared field type and reuses existing row ids, so the
//! caller can persist a minimal diff.

use crate::block::{Block, BlockRecord, BlockTreeCodec, BlockTypeRegistry};
use crate::codec::FieldCodec;
use crate::config::MapperConfig;
use crate::entity::{ContentEntity, FieldRow, SlotIndex};
use crate::error::{Error, Result};
use crate::field::{FieldValue, UnresolvedField};
use crate::inject::{InjectionScope, ServiceProvider};
use crate::model::{ContentModel, DynamicModel, FieldSet, RegionRef, RegionSource, RegionValue, TypedModel};
use crate::registry::TypeRegistry;
use crate::schema::{ContentType, FieldType, RegionType};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of [`ContentMapper::to_entity`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveResult {
    /// The created or updated entity.
    pub entity: ContentEntity,
    /// Ids of every row written by this save.
    pub touched: Vec<Uuid>,
    /// Subset of `touched` that did not exist before.
    pub inserted: Vec<Uuid>,
    /// Ids of trailing collection rows deleted by this save.
    pub removed: Vec<Uuid>,
}

impl SaveResult {
    /// Written rows that already existed.
    pub fn updated(&self) -> impl Iterator<Item = &Uuid> {
        self.touched.iter().filter(|id| !self.inserted.contains(id))
    }
}

/// Bidirectional mapping between content entities and content models.
///
/// The mapper keeps no state between calls. Each load opens a fresh
/// injection scope that is dropped once every field is initialized.
#[derive(Clone)]
pub struct ContentMapper {
    codec: FieldCodec,
    blocks: BlockTreeCodec,
    provider: Arc<ServiceProvider>,
    config: MapperConfig,
}

impl ContentMapper {
    /// Create a mapper with the built-in block types and default settings.
    pub fn new(registry: Arc<TypeRegistry>, provider: Arc<ServiceProvider>) -> Self {
        let codec = FieldCodec::new(registry);
        let blocks = BlockTreeCodec::new(
            codec.clone(),
            Arc::new(BlockTypeRegistry::with_builtin_blocks()),
        );
        Self {
            codec,
            blocks,
            provider,
            config: MapperConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.blocks = self.blocks.with_config(config.clone());
        self.config = config;
        self
    }

    /// Replace the block type registry.
    pub fn with_block_types(mut self, blocks: Arc<BlockTypeRegistry>) -> Self {
        self.blocks = BlockTreeCodec::new(self.codec.clone(), blocks).with_config(self.config.clone());
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// The field codec.
    pub fn codec(&self) -> &FieldCodec {
        &self.codec
    }

    /// Load an entity into a dynamic model.
    pub async fn to_dynamic(
        &self,
        entity: &ContentEntity,
        content_type: &ContentType,
    ) -> Result<DynamicModel> {
        let mut model = DynamicModel::new(content_type.id.clone());
        self.load_into(&mut model, entity, content_type).await?;
        Ok(model)
    }

    /// Load an entity into a typed model.
    ///
    /// Fails with `ModelTypeMismatch` when `M` is not the content type's
    /// model type.
    pub async fn to_typed<M: TypedModel>(
        &self,
        entity: &ContentEntity,
        content_type: &ContentType,
    ) -> Result<M> {
        if !content_type.accepts_model(M::MODEL_TYPE) {
            return Err(Error::ModelTypeMismatch {
                requested: M::MODEL_TYPE,
                content_type: content_type.id.clone(),
            });
        }
        let mut model = M::default();
        self.load_into(&mut model, entity, content_type).await?;
        Ok(model)
    }

    /// Load an entity into an existing model.
    ///
    /// Regions without stored rows keep their current value, except
    /// collections and multi-field regions which are always replaced.
    /// A collection slot that cannot be decoded holds an [`UnresolvedField`].
    pub async fn load_into(
        &self,
        model: &mut dyn ContentModel,
        entity: &ContentEntity,
        content_type: &ContentType,
    ) -> Result<()> {
        if entity.type_id != content_type.id {
            tracing::warn!(
                entity = %entity.id,
                stored = %entity.type_id,
                content_type = %content_type.id,
                "entity loaded with a different content type"
            );
        }
        self.log_stale_rows(entity, content_type);

        let scope = self.provider.create_scope();
        for region in &content_type.regions {
            let slots = RegionSlots::new(entity, &region.id);

            if !region.collection {
                if let Some(value) = self.load_element(region, &slots, 0, &scope).await? {
                    model.set_region(&region.id, value)?;
                }
                continue;
            }

            let Some(last) = slots.last_sort_order(region, self.config.max_collection_gap)? else {
                model.set_region(&region.id, RegionValue::Collection(Vec::new()))?;
                continue;
            };
            let mut items = Vec::new();
            for sort_order in 0..=last {
                let item = match self.load_element(region, &slots, sort_order, &scope).await? {
                    Some(item) => item,
                    None => RegionValue::Field(Box::new(self.placeholder(region, &slots, sort_order))),
                };
                items.push(item);
            }
            model.set_region(&region.id, RegionValue::Collection(items))?;
        }

        tracing::debug!(
            entity = %entity.id,
            content_type = %content_type.id,
            rows = entity.fields.len(),
            "loaded content"
        );
        Ok(())
    }

    async fn load_element(
        &self,
        region: &RegionType,
        slots: &RegionSlots<'_>,
        sort_order: u32,
        scope: &InjectionScope,
    ) -> Result<Option<RegionValue>> {
        if region.is_single_field() {
            let Some(row) = slots.get(&region.fields[0].id, sort_order) else {
                return Ok(None);
            };
            return Ok(self.decode(row, scope).await?.map(RegionValue::Field));
        }

        let mut record = FieldSet::new();
        for field in &region.fields {
            if let Some(row) = slots.get(&field.id, sort_order) {
                if let Some(value) = self.decode(row, scope).await? {
                    record.insert(field.id.clone(), value);
                }
            }
        }
        Ok(Some(RegionValue::Record(record)))
    }

    fn placeholder(&self, region: &RegionType, slots: &RegionSlots<'_>, sort_order: u32) -> UnresolvedField {
        match slots.get(&region.fields[0].id, sort_order) {
            Some(row) => {
                tracing::debug!(
                    region = %region.id,
                    sort_order,
                    type_name = %row.type_name,
                    "collection item kept as stored"
                );
                UnresolvedField::row(row.type_name.clone(), row.value.clone())
            }
            None => {
                tracing::debug!(region = %region.id, sort_order, "collection item has no stored value");
                UnresolvedField::missing()
            }
        }
    }

    async fn decode(
        &self,
        row: &FieldRow,
        scope: &InjectionScope,
    ) -> Result<Option<Box<dyn FieldValue>>> {
        match self.codec.deserialize(&row.value, &row.type_name, scope).await? {
            Some(value) => Ok(Some(value)),
            None if self.config.strict_field_types => {
                Err(Error::UnknownFieldType(row.type_name.clone()))
            }
            None => Ok(None),
        }
    }

    fn log_stale_rows(&self, entity: &ContentEntity, content_type: &ContentType) {
        for row in &entity.fields {
            let known = content_type
                .region(&row.region_id)
                .is_some_and(|region| region.field(&row.field_id).is_some());
            if !known {
                tracing::debug!(
                    row = %row.id,
                    region = %row.region_id,
                    field = %row.field_id,
                    "stored field has no schema counterpart, skipped"
                );
            }
        }
    }

    /// Map a model onto field rows.
    ///
    /// Works on a copy of `existing`: on error nothing has been written.
    /// Rows are matched by `(region, field, sort_order)` and keep their ids.
    pub fn to_entity(
        &self,
        model: &dyn RegionSource,
        content_type: &ContentType,
        existing: Option<&ContentEntity>,
    ) -> Result<SaveResult> {
        let mut entity = existing
            .cloned()
            .unwrap_or_else(|| ContentEntity::new(content_type.id.clone()));
        entity.type_id = content_type.id.clone();

        let mut writer = RowWriter {
            codec: &self.codec,
            strict: self.config.strict_field_types,
            slots: SlotIndex::build(&entity),
            entity: &mut entity,
            touched: Vec::new(),
            inserted: Vec::new(),
        };
        let mut lengths = Vec::new();

        for region in &content_type.regions {
            let Some(value) = model.region(&region.id) else {
                tracing::debug!(region = %region.id, "model has no value for region");
                continue;
            };

            if !region.collection {
                writer.write_element(region, &value, 0, &region.id)?;
                continue;
            }

            let RegionRef::Collection(items) = value else {
                return Err(Error::RegionShape {
                    region: region.id.clone(),
                    expected: "collection",
                });
            };
            for (index, item) in items.iter().enumerate() {
                let path = format!("{}[{index}]", region.id);
                let sort_order = u32::try_from(index).map_err(|_| {
                    Error::Serialization(format!("collection '{}' has too many items", region.id))
                })?;
                writer.write_element(region, item, sort_order, &path)?;
            }
            lengths.push((region, items.len()));
        }

        let RowWriter {
            touched, inserted, ..
        } = writer;

        let mut removed = Vec::new();
        if self.config.prune_collections {
            for (region, len) in lengths {
                let pruned = entity.remove_trailing(&region.id, len);
                if !pruned.is_empty() {
                    tracing::debug!(
                        region = %region.id,
                        count = pruned.len(),
                        "pruned trailing collection rows"
                    );
                }
                removed.extend(pruned.into_iter().map(|row| row.id));
            }
        }

        tracing::debug!(
            entity = %entity.id,
            touched = touched.len(),
            inserted = inserted.len(),
            removed = removed.len(),
            "mapped content to rows"
        );
        Ok(SaveResult {
            entity,
            touched,
            inserted,
            removed,
        })
    }

    /// Flatten a block tree into records.
    pub fn flatten_blocks(&self, blocks: &[Block]) -> Result<Vec<BlockRecord>> {
        self.blocks.flatten(blocks)
    }

    /// Rebuild a block tree in a fresh injection scope.
    pub async fn unflatten_blocks(&self, records: &[BlockRecord]) -> Result<Vec<Block>> {
        let scope = self.provider.create_scope();
        self.blocks.unflatten(records, &scope).await
    }
}

/// Rows of one region keyed by field id, then sort order.
struct RegionSlots<'e> {
    rows: HashMap<&'e str, HashMap<u32, &'e FieldRow>>,
}

impl<'e> RegionSlots<'e> {
    fn new(entity: &'e ContentEntity, region_id: &str) -> Self {
        let mut rows: HashMap<&'e str, HashMap<u32, &'e FieldRow>> = HashMap::new();
        for row in entity.fields.iter().filter(|row| row.region_id == region_id) {
            rows.entry(row.field_id.as_str())
                .or_default()
                .entry(row.sort_order)
                .or_insert(row);
        }
        Self { rows }
    }

    fn get(&self, field_id: &str, sort_order: u32) -> Option<&'e FieldRow> {
        self.rows
            .get(field_id)
            .and_then(|by_order| by_order.get(&sort_order))
            .copied()
    }

    /// Highest stored sort order, `None` when the region has no rows.
    ///
    /// Fails when more than `max_gap` sort orders below it have no row.
    fn last_sort_order(&self, region: &RegionType, max_gap: usize) -> Result<Option<u32>> {
        let stored: HashSet<u32> = self
            .rows
            .values()
            .flat_map(|by_order| by_order.keys().copied())
            .collect();
        let Some(last) = stored.iter().max().copied() else {
            return Ok(None);
        };

        let missing = last as usize - (stored.len() - 1);
        if missing > max_gap {
            return Err(Error::Deserialization(format!(
                "collection '{}' has sort order {last} but only {} stored items",
                region.id,
                stored.len()
            )));
        }
        Ok(Some(last))
    }
}

struct RowWriter<'a> {
    codec: &'a FieldCodec,
    strict: bool,
    slots: SlotIndex,
    entity: &'a mut ContentEntity,
    touched: Vec<Uuid>,
    inserted: Vec<Uuid>,
}

impl RowWriter<'_> {
    fn write_element(
        &mut self,
        region: &RegionType,
        value: &RegionRef<'_>,
        sort_order: u32,
        path: &str,
    ) -> Result<()> {
        if region.is_single_field() {
            let RegionRef::Field(value) = value else {
                return Err(Error::RegionShape {
                    region: region.id.clone(),
                    expected: "field",
                });
            };
            let field = &region.fields[0];
            return self.write_field(region, field, *value, sort_order, &format!("{path}.{}", field.id));
        }

        let RegionRef::Record(record) = value else {
            return Err(Error::RegionShape {
                region: region.id.clone(),
                expected: "record",
            });
        };
        for field in &region.fields {
            match record.field(&field.id) {
                Some(value) => {
                    self.write_field(region, field, value, sort_order, &format!("{path}.{}", field.id))?
                }
                None => tracing::debug!(
                    region = %region.id,
                    field = %field.id,
                    "record has no value for field"
                ),
            }
        }
        Ok(())
    }

    fn write_field(
        &mut self,
        region: &RegionType,
        field: &FieldType,
        value: &dyn FieldValue,
        sort_order: u32,
        path: &str,
    ) -> Result<()> {
        if let Some(kept) = value.downcast_ref::<UnresolvedField>() {
            return self.restore_field(region, field, kept, sort_order, path);
        }

        let Some(declared) = self.codec.descriptor(&field.type_name) else {
            if self.strict {
                return Err(Error::UnknownFieldType(field.type_name.clone()));
            }
            tracing::warn!(
                type_name = %field.type_name,
                path,
                "unresolved field type, value not saved"
            );
            return Ok(());
        };

        let stored = self.codec.serialize(value, &declared, path)?;
        let (row, created) = self
            .slots
            .upsert(self.entity, &region.id, &field.id, sort_order);
        row.type_name = declared.type_name.to_string();
        row.value = stored;

        self.touched.push(row.id);
        if created {
            self.inserted.push(row.id);
        }
        Ok(())
    }

    /// Write back a value that was loaded without decoding.
    fn restore_field(
        &mut self,
        region: &RegionType,
        field: &FieldType,
        kept: &UnresolvedField,
        sort_order: u32,
        path: &str,
    ) -> Result<()> {
        let Some(stored) = &kept.stored else {
            tracing::debug!(path, "collection item has no stored value, nothing written");
            return Ok(());
        };
        if self.strict {
            return Err(Error::UnknownFieldType(kept.type_name.clone()));
        }

        let (row, created) = self
            .slots
            .upsert(self.entity, &region.id, &field.id, sort_order);
        if !created && row.type_name == kept.type_name && row.value == *stored {
            return Ok(());
        }
        row.type_name = kept.type_name.clone();
        row.value = stored.clone();

        self.touched.push(row.id);
        if created {
            self.inserted.push(row.id);
        }
        Ok(())
    }
}

//! Persisted content rows.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One stored field value of a content instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRow {
    /// Row id.
    pub id: Uuid,
    /// Region id from the content type.
    pub region_id: String,
    /// Field id within the region.
    pub field_id: String,
    /// Item position for collection regions, 0 otherwise.
    pub sort_order: u32,
    /// Canonical type name of the stored value.
    pub type_name: String,
    /// Serialized value.
    pub value: String,
}

impl FieldRow {
    /// Create a row with a fresh id.
    pub fn new(
        region_id: impl Into<String>,
        field_id: impl Into<String>,
        sort_order: u32,
        type_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            region_id: region_id.into(),
            field_id: field_id.into(),
            sort_order,
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    /// Check whether this row holds `(region, field, sort_order)`.
    pub fn is_slot(&self, region_id: &str, field_id: &str, sort_order: u32) -> bool {
        self.region_id == region_id && self.field_id == field_id && self.sort_order == sort_order
    }
}

/// A stored content instance: its type reference and flat field rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntity {
    /// Content id.
    pub id: Uuid,
    /// Content type id.
    pub type_id: String,
    /// Field rows in no particular order.
    #[serde(default)]
    pub fields: Vec<FieldRow>,
}

impl ContentEntity {
    /// Create an empty entity with a fresh id.
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            type_id: type_id.into(),
            fields: Vec::new(),
        }
    }

    /// Set the content id.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Add a field row.
    pub fn with_field(mut self, row: FieldRow) -> Self {
        self.fields.push(row);
        self
    }

    /// Find the row holding `(region, field, sort_order)`.
    pub fn field(&self, region_id: &str, field_id: &str, sort_order: u32) -> Option<&FieldRow> {
        self.fields
            .iter()
            .find(|row| row.is_slot(region_id, field_id, sort_order))
    }

    /// Rows of one region, ordered by sort order.
    pub fn region_rows(&self, region_id: &str) -> Vec<&FieldRow> {
        let mut rows: Vec<&FieldRow> = self
            .fields
            .iter()
            .filter(|row| row.region_id == region_id)
            .collect();
        rows.sort_by_key(|row| row.sort_order);
        rows
    }

    /// Remove every row of a region at or beyond `count`.
    pub fn remove_trailing(&mut self, region_id: &str, count: usize) -> Vec<FieldRow> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.fields)
            .into_iter()
            .partition(|row| row.region_id == region_id && row.sort_order as usize >= count);
        self.fields = kept;
        removed
    }
}

/// Positions of an entity's rows keyed by `(region, field, sort_order)`.
///
/// Built once per save. Only valid while rows are appended, never removed.
#[derive(Debug, Default)]
pub struct SlotIndex {
    positions: HashMap<(String, String, u32), usize>,
}

impl SlotIndex {
    /// Index every row of `entity`. The first row of a duplicated slot wins.
    pub fn build(entity: &ContentEntity) -> Self {
        let mut positions = HashMap::with_capacity(entity.fields.len());
        for (index, row) in entity.fields.iter().enumerate() {
            positions
                .entry((row.region_id.clone(), row.field_id.clone(), row.sort_order))
                .or_insert(index);
        }
        Self { positions }
    }

    /// Return the row for a slot, appending it to `entity` if absent.
    ///
    /// The flag is `true` when the row was created.
    pub fn upsert<'e>(
        &mut self,
        entity: &'e mut ContentEntity,
        region_id: &str,
        field_id: &str,
        sort_order: u32,
    ) -> (&'e mut FieldRow, bool) {
        let key = (region_id.to_string(), field_id.to_string(), sort_order);
        match self
            .positions
            .get(&key)
            .copied()
            .filter(|&index| index < entity.fields.len())
        {
            Some(index) => (&mut entity.fields[index], false),
            None => {
                entity
                    .fields
                    .push(FieldRow::new(region_id, field_id, sort_order, "", ""));
                let index = entity.fields.len() - 1;
                self.positions.insert(key, index);
                (&mut entity.fields[index], true)
            }
        }
    }
}

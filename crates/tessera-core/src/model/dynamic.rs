//! Dynamic content model keyed by region id.

use super::{ContentModel, RegionRef, RegionSource, RegionValue};
use crate::error::Result;
use crate::field::{Field, FieldValue};
use indexmap::IndexMap;

/// A content model with no compiled type: regions keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicModel {
    /// Content type id this model was built for.
    pub type_id: String,
    regions: IndexMap<String, RegionValue>,
}

impl DynamicModel {
    /// Create an empty model for a content type.
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            regions: IndexMap::new(),
        }
    }

    /// Insert or replace a region value.
    pub fn insert(&mut self, id: impl Into<String>, value: RegionValue) {
        self.regions.insert(id.into(), value);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_region(mut self, id: impl Into<String>, value: RegionValue) -> Self {
        self.insert(id, value);
        self
    }

    /// Borrow a region value.
    pub fn get(&self, id: &str) -> Option<&RegionValue> {
        self.regions.get(id)
    }

    /// Mutably borrow a region value.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut RegionValue> {
        self.regions.get_mut(id)
    }

    /// Remove a region.
    pub fn remove(&mut self, id: &str) -> Option<RegionValue> {
        self.regions.shift_remove(id)
    }

    /// Borrow a single-field region's value as its concrete type.
    pub fn field_as<T: Field>(&self, region: &str) -> Option<&T> {
        self.get(region)
            .and_then(RegionValue::as_field)
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Borrow a field of a multi-field region.
    pub fn record_field(&self, region: &str, field: &str) -> Option<&dyn FieldValue> {
        self.get(region)
            .and_then(RegionValue::as_record)
            .and_then(|record| record.get(field))
    }

    /// Borrow the items of a collection region.
    pub fn items(&self, region: &str) -> Option<&[RegionValue]> {
        self.get(region).and_then(RegionValue::as_collection)
    }

    /// Append an item to a collection region, creating the collection if absent.
    pub fn push_item(&mut self, region: &str, item: RegionValue) {
        match self.regions.get_mut(region) {
            Some(RegionValue::Collection(items)) => items.push(item),
            _ => self.insert(region, RegionValue::Collection(vec![item])),
        }
    }

    /// Region ids in insertion order.
    pub fn region_ids(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check whether the model has no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Render the model as a JSON object keyed by region id.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.regions
                .iter()
                .map(|(id, value)| (id.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl RegionSource for DynamicModel {
    fn has_region(&self, id: &str) -> bool {
        self.regions.contains_key(id)
    }

    fn region(&self, id: &str) -> Option<RegionRef<'_>> {
        self.regions.get(id).map(RegionValue::as_region_ref)
    }
}

impl ContentModel for DynamicModel {
    fn set_region(&mut self, id: &str, value: RegionValue) -> Result<()> {
        self.insert(id, value);
        Ok(())
    }
}

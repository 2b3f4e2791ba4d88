//! Open-ended field record for multi-field regions.

use super::Region;
use crate::error::Result;
use crate::field::{Field, FieldValue};
use indexmap::IndexMap;

/// Field values keyed by field id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: IndexMap<String, Box<dyn FieldValue>>,
}

impl FieldSet {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field value.
    pub fn insert(&mut self, id: impl Into<String>, value: Box<dyn FieldValue>) {
        self.fields.insert(id.into(), value);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, id: impl Into<String>, value: impl Field) -> Self {
        self.insert(id, Box::new(value));
        self
    }

    /// Borrow a field value by id.
    pub fn get(&self, id: &str) -> Option<&dyn FieldValue> {
        self.fields.get(id).map(|value| &**value)
    }

    /// Borrow a field value as its concrete type.
    pub fn get_as<T: Field>(&self, id: &str) -> Option<&T> {
        self.get(id).and_then(|value| value.downcast_ref::<T>())
    }

    /// Mutably borrow a field value by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Box<dyn FieldValue>> {
        self.fields.get_mut(id)
    }

    /// Remove a field value.
    pub fn remove(&mut self, id: &str) -> Option<Box<dyn FieldValue>> {
        self.fields.shift_remove(id)
    }

    /// Check whether a field is present.
    pub fn contains(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the record is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate `(id, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn FieldValue)> {
        self.fields.iter().map(|(id, value)| (id.as_str(), &**value))
    }

    /// Render for display.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(id, value)| (id.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl IntoIterator for FieldSet {
    type Item = (String, Box<dyn FieldValue>);
    type IntoIter = indexmap::map::IntoIter<String, Box<dyn FieldValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Region for FieldSet {
    fn field(&self, id: &str) -> Option<&dyn FieldValue> {
        self.get(id)
    }

    fn set_field(&mut self, id: &str, value: Box<dyn FieldValue>) -> Result<()> {
        self.insert(id, value);
        Ok(())
    }

    fn field_ids(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

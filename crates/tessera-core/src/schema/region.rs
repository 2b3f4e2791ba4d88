//! Region type definitions.

use super::field::FieldType;
use serde::{Deserialize, Serialize};

/// A named, possibly repeating slot in a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionType {
    /// Region id, unique within its content type.
    pub id: String,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Editor help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the region repeats.
    #[serde(default)]
    pub collection: bool,
    /// Ordered field declarations.
    #[serde(default)]
    pub fields: Vec<FieldType>,
}

impl RegionType {
    /// Create a new single-instance region.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            collection: false,
            fields: Vec::new(),
        }
    }

    /// Create a new collection region.
    pub fn collection(id: impl Into<String>) -> Self {
        Self {
            collection: true,
            ..Self::new(id)
        }
    }

    /// Add a field to the region.
    pub fn with_field(mut self, field: FieldType) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldType>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get a field by id.
    pub fn field(&self, id: &str) -> Option<&FieldType> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// A single-field region's value is the field value itself.
    pub fn is_single_field(&self) -> bool {
        self.fields.len() == 1
    }
}

//! Field type definitions for regions.

use serde::{Deserialize, Serialize};

/// A typed field declaration within a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldType {
    /// Field id, unique within its region.
    pub id: String,
    /// Field type name or shorthand, resolved through the type registry.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Editor help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldType {
    /// Create a new field type.
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            title: None,
            description: None,
        }
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_builder() {
        let field = FieldType::new("Title", "String").with_title("Heading");

        assert_eq!(field.id, "Title");
        assert_eq!(field.type_name, "String");
        assert_eq!(field.title.as_deref(), Some("Heading"));
        assert!(field.description.is_none());
    }

    #[test]
    fn test_field_type_json_uses_type_key() {
        let field: FieldType = serde_json::from_str(r#"{"id":"Body","type":"Html"}"#).unwrap();
        assert_eq!(field.type_name, "Html");

        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#"{"id":"Body","type":"Html"}"#);
    }
}

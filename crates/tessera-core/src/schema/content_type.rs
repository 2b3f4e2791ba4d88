//! Content type definitions.

use super::region::RegionType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Declarative schema for one kind of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    /// Content type id.
    pub id: String,
    /// Name of the typed model bound to this content type, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Ordered region declarations.
    #[serde(default)]
    pub regions: Vec<RegionType>,
    /// Permitted routes.
    #[serde(default)]
    pub routes: Vec<String>,
}

impl ContentType {
    /// Create a new, empty content type.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model_type: None,
            title: None,
            regions: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Bind a typed model to this content type.
    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = Some(model_type.into());
        self
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a region.
    pub fn with_region(mut self, region: RegionType) -> Self {
        self.regions.push(region);
        self
    }

    /// Add multiple regions.
    pub fn with_regions(mut self, regions: impl IntoIterator<Item = RegionType>) -> Self {
        self.regions.extend(regions);
        self
    }

    /// Add a permitted route.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.routes.push(route.into());
        self
    }

    /// Get a region by id.
    pub fn region(&self, id: &str) -> Option<&RegionType> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Iterate region ids in declaration order.
    pub fn region_ids(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.id.as_str())
    }

    /// Check whether a typed model with the given name may represent this type.
    pub fn accepts_model(&self, model_type: &str) -> bool {
        self.model_type.as_deref() == Some(model_type)
    }

    /// Check the schema invariants.
    ///
    /// Region ids are non-empty and unique, every region declares at least one
    /// field, and field ids are non-empty and unique within their region.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::InvalidSchema("content type id is empty".into()));
        }

        let mut region_ids = HashSet::new();
        for region in &self.regions {
            if region.id.is_empty() {
                return Err(Error::InvalidSchema(format!(
                    "content type '{}' has a region with an empty id",
                    self.id
                )));
            }
            if !region_ids.insert(region.id.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate region '{}' in content type '{}'",
                    region.id, self.id
                )));
            }
            if region.fields.is_empty() {
                return Err(Error::InvalidSchema(format!(
                    "region '{}' declares no fields",
                    region.id
                )));
            }

            let mut field_ids = HashSet::new();
            for field in &region.fields {
                if field.id.is_empty() {
                    return Err(Error::InvalidSchema(format!(
                        "region '{}' has a field with an empty id",
                        region.id
                    )));
                }
                if !field_ids.insert(field.id.as_str()) {
                    return Err(Error::InvalidSchema(format!(
                        "duplicate field '{}' in region '{}'",
                        field.id, region.id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Parse a content type from its JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let content_type: Self = serde_json::from_str(json)?;
        content_type.validate()?;
        Ok(content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn sample_type() -> ContentType {
        ContentType::new("StandardPage")
            .with_model_type("StandardPage")
            .with_region(RegionType::new("Body").with_field(FieldType::new("Default", "Html")))
            .with_region(
                RegionType::collection("Teasers")
                    .with_field(FieldType::new("Title", "String"))
                    .with_field(FieldType::new("Text", "Text")),
            )
            .with_route("/page")
    }

    #[test]
    fn test_content_type_builder() {
        let ct = sample_type();

        assert_eq!(ct.regions.len(), 2);
        assert_eq!(ct.region_ids().collect::<Vec<_>>(), vec!["Body", "Teasers"]);
        assert!(ct.region("Teasers").is_some_and(|r| r.collection));
        assert!(ct.accepts_model("StandardPage"));
        assert!(!ct.accepts_model("BlogPost"));
        assert!(ct.validate().is_ok());
    }

    #[test]
    fn test_duplicate_region_rejected() {
        let ct = sample_type()
            .with_region(RegionType::new("Body").with_field(FieldType::new("Default", "Text")));

        assert!(matches!(ct.validate(), Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn test_empty_region_rejected() {
        let ct = ContentType::new("Empty").with_region(RegionType::new("Body"));
        assert!(matches!(ct.validate(), Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let ct = ContentType::new("Dup").with_region(
            RegionType::new("Hero")
                .with_field(FieldType::new("Title", "String"))
                .with_field(FieldType::new("Title", "Text")),
        );
        assert!(matches!(ct.validate(), Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "id": "Post",
            "regions": [
                { "id": "Body", "fields": [ { "id": "Default", "type": "Text" } ] },
                { "id": "Tags", "collection": true, "fields": [ { "id": "Default", "type": "String" } ] }
            ]
        }"#;

        let ct = ContentType::from_json(json).unwrap();
        assert_eq!(ct.id, "Post");
        assert!(ct.model_type.is_none());
        assert!(ct.region("Tags").unwrap().collection);
        assert!(ct.routes.is_empty());
    }
}

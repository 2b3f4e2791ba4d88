//! Stand-in for collection items that could not be decoded.

use super::Field;
use crate::error::Result;

/// Holds a collection slot whose stored row could not be decoded.
///
/// Loading puts one at every sort order with no row or with a stored type
/// name that does not resolve, so later items keep their positions. Saving
/// writes `stored` back under `type_name` and never converts it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnresolvedField {
    /// Type name of the stored row.
    pub type_name: String,
    /// Raw stored value, `None` when the slot has no row.
    pub stored: Option<String>,
}

impl UnresolvedField {
    /// Keep a row whose type name does not resolve.
    pub fn row(type_name: impl Into<String>, stored: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            stored: Some(stored.into()),
        }
    }

    /// Mark a sort order with no stored row.
    pub fn missing() -> Self {
        Self::default()
    }
}

impl Field for UnresolvedField {
    const TYPE_NAME: &'static str = "tessera.field.unresolved";
    const SHORTHAND: &'static [&'static str] = &[];

    fn to_stored(&self) -> Result<String> {
        Ok(self.stored.clone().unwrap_or_default())
    }

    fn from_stored(stored: &str) -> Result<Self> {
        Ok(Self {
            type_name: String::new(),
            stored: Some(stored.to_string()),
        })
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldValue;

    #[test]
    fn test_keeps_raw_row() {
        let value: Box<dyn FieldValue> = Box::new(UnresolvedField::row("legacy.Carousel", "keep-me"));

        assert_eq!(value.type_name(), UnresolvedField::TYPE_NAME);
        assert_eq!(value.serialize().unwrap(), "keep-me");
        assert_eq!(value.to_json(), serde_json::Value::Null);

        let held = value.downcast_ref::<UnresolvedField>().unwrap();
        assert_eq!(held.type_name, "legacy.Carousel");
    }

    #[test]
    fn test_missing_has_no_row() {
        assert_eq!(UnresolvedField::missing().stored, None);
        assert_eq!(UnresolvedField::missing().to_stored().unwrap(), "");
    }
}

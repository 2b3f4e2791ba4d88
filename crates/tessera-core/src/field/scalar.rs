//! Number, checkbox and date fields.

use super::Field;
use crate::error::{Error, Result};
use chrono::NaiveDate;

/// An optional floating point number. Stored as its decimal text, empty when unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberField {
    /// The number.
    pub value: Option<f64>,
}

impl From<f64> for NumberField {
    fn from(value: f64) -> Self {
        Self { value: Some(value) }
    }
}

impl Field for NumberField {
    const TYPE_NAME: &'static str = "tessera.field.number";
    const SHORTHAND: &'static [&'static str] = &["Number"];

    fn to_stored(&self) -> Result<String> {
        Ok(self.value.map(|v| v.to_string()).unwrap_or_default())
    }

    fn from_stored(stored: &str) -> Result<Self> {
        let stored = stored.trim();
        if stored.is_empty() {
            return Ok(Self::default());
        }
        stored
            .parse::<f64>()
            .map(Self::from)
            .map_err(|e| Error::Deserialization(format!("invalid number '{stored}': {e}")))
    }

    fn to_json(&self) -> serde_json::Value {
        self.value.map_or(serde_json::Value::Null, serde_json::Value::from)
    }
}

/// A boolean flag. Stored as `true` / `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckboxField {
    /// The flag.
    pub value: bool,
}

impl From<bool> for CheckboxField {
    fn from(value: bool) -> Self {
        Self { value }
    }
}

impl Field for CheckboxField {
    const TYPE_NAME: &'static str = "tessera.field.checkbox";
    const SHORTHAND: &'static [&'static str] = &["Checkbox"];

    fn to_stored(&self) -> Result<String> {
        Ok(self.value.to_string())
    }

    fn from_stored(stored: &str) -> Result<Self> {
        match stored.trim() {
            "true" => Ok(Self::from(true)),
            "false" | "" => Ok(Self::from(false)),
            other => Err(Error::Deserialization(format!("invalid checkbox value '{other}'"))),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Bool(self.value)
    }
}

/// An optional calendar date. Stored as ISO 8601 (`YYYY-MM-DD`), empty when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateField {
    /// The date.
    pub value: Option<NaiveDate>,
}

impl From<NaiveDate> for DateField {
    fn from(value: NaiveDate) -> Self {
        Self { value: Some(value) }
    }
}

impl Field for DateField {
    const TYPE_NAME: &'static str = "tessera.field.date";
    const SHORTHAND: &'static [&'static str] = &["Date"];

    fn to_stored(&self) -> Result<String> {
        Ok(self
            .value
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default())
    }

    fn from_stored(stored: &str) -> Result<Self> {
        let stored = stored.trim();
        if stored.is_empty() {
            return Ok(Self::default());
        }
        NaiveDate::parse_from_str(stored, "%Y-%m-%d")
            .map(Self::from)
            .map_err(|e| Error::Deserialization(format!("invalid date '{stored}': {e}")))
    }

    fn to_json(&self) -> serde_json::Value {
        self.value
            .map_or(serde_json::Value::Null, |d| d.format("%Y-%m-%d").to_string().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_storage() {
        assert_eq!(NumberField::from(12.5).to_stored().unwrap(), "12.5");
        assert_eq!(NumberField::default().to_stored().unwrap(), "");
        assert_eq!(NumberField::from_stored(" 3 ").unwrap().value, Some(3.0));
        assert_eq!(NumberField::from_stored("").unwrap(), NumberField::default());
        assert!(matches!(
            NumberField::from_stored("twelve"),
            Err(Error::Deserialization(_))
        ));
    }

    #[test]
    fn test_checkbox_storage() {
        assert_eq!(CheckboxField::from(true).to_stored().unwrap(), "true");
        assert!(!CheckboxField::from_stored("").unwrap().value);
        assert!(CheckboxField::from_stored("yes").is_err());
    }

    #[test]
    fn test_date_storage() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let field = DateField::from(date);

        assert_eq!(field.to_stored().unwrap(), "2024-02-29");
        assert_eq!(DateField::from_stored("2024-02-29").unwrap(), field);
        assert_eq!(DateField::from_stored("").unwrap().value, None);
        assert!(DateField::from_stored("2023-02-29").is_err());
        assert_eq!(field.to_json(), serde_json::json!("2024-02-29"));
    }
}

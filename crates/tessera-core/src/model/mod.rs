//! Runtime content models.
//!
//! A content instance is held either as a typed model (a Rust struct with an
//! accessor table) or as a [`DynamicModel`] keyed by region id. The mapper is
//! written once against [`RegionSource`] and [`ContentModel`], which both
//! representations implement.

mod dynamic;
mod field_set;
mod typed;

pub use dynamic::DynamicModel;
pub use field_set::FieldSet;
pub use typed::{cached_accessors, Accessors, RegionAccessor, TypedModel};

use crate::error::Result;
use crate::field::FieldValue;

/// Owned value of one region.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionValue {
    /// Single-field region: the field value is the region value.
    Field(Box<dyn FieldValue>),
    /// Multi-field region: values keyed by field id.
    Record(FieldSet),
    /// Collection region: ordered items, each a `Field` or `Record`.
    Collection(Vec<RegionValue>),
}

impl RegionValue {
    /// Borrow as a [`RegionRef`].
    pub fn as_region_ref(&self) -> RegionRef<'_> {
        match self {
            RegionValue::Field(value) => RegionRef::Field(&**value),
            RegionValue::Record(fields) => RegionRef::Record(fields),
            RegionValue::Collection(items) => {
                RegionRef::Collection(items.iter().map(RegionValue::as_region_ref).collect())
            }
        }
    }

    /// The field value of a single-field region.
    pub fn as_field(&self) -> Option<&dyn FieldValue> {
        match self {
            RegionValue::Field(value) => Some(&**value),
            _ => None,
        }
    }

    /// The fields of a multi-field region.
    pub fn as_record(&self) -> Option<&FieldSet> {
        match self {
            RegionValue::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// The items of a collection region.
    pub fn as_collection(&self) -> Option<&[RegionValue]> {
        match self {
            RegionValue::Collection(items) => Some(items),
            _ => None,
        }
    }

    /// Render for display.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RegionValue::Field(value) => value.to_json(),
            RegionValue::Record(fields) => fields.to_json(),
            RegionValue::Collection(items) => {
                serde_json::Value::Array(items.iter().map(RegionValue::to_json).collect())
            }
        }
    }

    /// Shape name used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            RegionValue::Field(_) => "field",
            RegionValue::Record(_) => "record",
            RegionValue::Collection(_) => "collection",
        }
    }
}

/// Borrowed view of one region, read by the save direction.
#[derive(Clone)]
pub enum RegionRef<'a> {
    /// Single-field region value.
    Field(&'a dyn FieldValue),
    /// Multi-field region value.
    Record(&'a dyn Region),
    /// Collection items.
    Collection(Vec<RegionRef<'a>>),
}

/// Named field access on a multi-field region or block.
pub trait Region: Send + Sync {
    /// Borrow a field by id.
    fn field(&self, id: &str) -> Option<&dyn FieldValue>;

    /// Assign a field by id. Unknown ids are ignored.
    fn set_field(&mut self, id: &str, value: Box<dyn FieldValue>) -> Result<()>;

    /// Field ids in declaration order.
    fn field_ids(&self) -> Vec<&str>;
}

/// Read capability over a content model.
pub trait RegionSource: Send + Sync {
    /// Check whether the model carries the region.
    fn has_region(&self, id: &str) -> bool;

    /// Borrow a region by id.
    fn region(&self, id: &str) -> Option<RegionRef<'_>>;
}

/// Full capability over a content model.
pub trait ContentModel: RegionSource {
    /// Assign a region by id.
    fn set_region(&mut self, id: &str, value: RegionValue) -> Result<()>;
}

/// Implement [`Region`] for a struct whose members are field values.
///
/// ```
/// use tessera_core::field::{HtmlField, StringField};
///
/// #[derive(Debug, Clone, Default)]
/// struct Hero {
///     title: StringField,
///     body: HtmlField,
/// }
///
/// tessera_core::impl_region!(Hero {
///     "Title" => title: StringField,
///     "Body" => body: HtmlField,
/// });
/// ```
#[macro_export]
macro_rules! impl_region {
    ($ty:ident { $($id:literal => $member:ident : $field:ty),* $(,)? }) => {
        impl $crate::model::Region for $ty {
            fn field(&self, id: &str) -> Option<&dyn $crate::field::FieldValue> {
                match id {
                    $($id => Some(&self.$member),)*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                id: &str,
                value: Box<dyn $crate::field::FieldValue>,
            ) -> $crate::Result<()> {
                match id {
                    $($id => {
                        self.$member = $crate::field::downcast_field::<$field>(value, id)?;
                    })*
                    _ => {}
                }
                Ok(())
            }

            fn field_ids(&self) -> Vec<&str> {
                vec![$($id),*]
            }
        }
    };
}

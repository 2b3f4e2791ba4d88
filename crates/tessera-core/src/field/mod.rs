//! Field values.
//!
//! Every stored field value implements the object-safe [`FieldValue`] trait.
//! Concrete field types implement the friendlier [`Field`] trait and receive
//! [`FieldValue`] through a blanket impl.

mod reference;
mod scalar;
mod text;
mod unresolved;

pub use reference::{
    DocumentField, ImageField, MediaInfo, MediaResolver, PageField, PageInfo, PageResolver,
};
pub use scalar::{CheckboxField, DateField, NumberField};
pub use text::{HtmlField, MarkdownField, MarkdownRenderer, StringField, TextField};
pub use unresolved::UnresolvedField;

use crate::error::{Error, Result};
use crate::inject::InjectionScope;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;

/// A field value as seen by the mapper.
#[async_trait]
pub trait FieldValue: Any + Send + Sync + fmt::Debug {
    /// Canonical type name, persisted with every stored row.
    fn type_name(&self) -> &'static str;

    /// Encode the value as its storage string.
    fn serialize(&self) -> Result<String>;

    /// Replace the value with the decoded storage string.
    fn populate(&mut self, stored: &str) -> Result<()>;

    /// Run the post-load initializer.
    async fn init(&mut self, scope: &InjectionScope) -> Result<()>;

    /// Borrow as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Convert into `Any` for owned downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Clone behind a box.
    fn clone_value(&self) -> Box<dyn FieldValue>;

    /// Compare with another field value of any type.
    fn value_eq(&self, other: &dyn FieldValue) -> bool;

    /// Render for display.
    fn to_json(&self) -> serde_json::Value;
}

/// A concrete field type.
#[async_trait]
pub trait Field: Default + Clone + PartialEq + Send + Sync + fmt::Debug + 'static {
    /// Canonical type name.
    const TYPE_NAME: &'static str;

    /// Shorthand names accepted in schemas.
    const SHORTHAND: &'static [&'static str];

    /// Encode as the storage string.
    fn to_stored(&self) -> Result<String>;

    /// Decode from the storage string.
    fn from_stored(stored: &str) -> Result<Self>;

    /// Render for display.
    fn to_json(&self) -> serde_json::Value;

    /// Post-load initializer. Collaborators come from `scope`.
    async fn initialize(&mut self, _scope: &InjectionScope) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: Field> FieldValue for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn serialize(&self) -> Result<String> {
        self.to_stored()
    }

    fn populate(&mut self, stored: &str) -> Result<()> {
        *self = T::from_stored(stored)?;
        Ok(())
    }

    async fn init(&mut self, scope: &InjectionScope) -> Result<()> {
        Field::initialize(self, scope).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_value(&self) -> Box<dyn FieldValue> {
        Box::new(self.clone())
    }

    fn value_eq(&self, other: &dyn FieldValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn to_json(&self) -> serde_json::Value {
        Field::to_json(self)
    }
}

impl Clone for Box<dyn FieldValue> {
    fn clone(&self) -> Self {
        self.clone_value()
    }
}

impl PartialEq for Box<dyn FieldValue> {
    fn eq(&self, other: &Self) -> bool {
        self.value_eq(&**other)
    }
}

// Works around rust-lang/rust#31740: without this impl, `==` on two
// `Box<dyn FieldValue>` values tries to move out of the right operand.
impl PartialEq<&Self> for Box<dyn FieldValue> {
    fn eq(&self, other: &&Self) -> bool {
        self.value_eq(&***other)
    }
}

impl<'a> dyn FieldValue + 'a {
    /// Downcast to a concrete field type.
    pub fn downcast_ref<T: Field>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Move a boxed field value into its concrete type.
///
/// Fails with `UnexpectedFieldType` when the value holds another type.
pub fn downcast_field<T: Field>(value: Box<dyn FieldValue>, field: &str) -> Result<T> {
    let actual = value.type_name();
    value
        .into_any()
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| Error::UnexpectedFieldType {
            field: field.to_string(),
            expected: T::TYPE_NAME,
            actual,
        })
}

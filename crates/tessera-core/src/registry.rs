//! Field type registry.
//!
//! Maps canonical type names and schema shorthands to constructors.

use crate::field::{
    CheckboxField, DateField, DocumentField, Field, FieldValue, HtmlField, ImageField,
    MarkdownField, NumberField, PageField, StringField, TextField,
};
use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Runtime descriptor of a registered field type.
#[derive(Clone, Copy)]
pub struct FieldTypeDescriptor {
    /// Canonical type name, persisted with stored rows.
    pub type_name: &'static str,
    /// Shorthand names accepted in schemas.
    pub shorthand: &'static [&'static str],
    construct: fn() -> Box<dyn FieldValue>,
}

impl FieldTypeDescriptor {
    /// Describe the field type `T`.
    pub fn of<T: Field>() -> Self {
        Self {
            type_name: T::TYPE_NAME,
            shorthand: T::SHORTHAND,
            construct: construct_default::<T>,
        }
    }

    /// Construct a default, uninitialized value.
    pub fn construct(&self) -> Box<dyn FieldValue> {
        (self.construct)()
    }
}

impl fmt::Debug for FieldTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTypeDescriptor")
            .field("type_name", &self.type_name)
            .field("shorthand", &self.shorthand)
            .finish()
    }
}

impl PartialEq for FieldTypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

fn construct_default<T: Field>() -> Box<dyn FieldValue> {
    Box::new(T::default())
}

/// Registry of field types keyed by canonical name and shorthand.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: DashMap<String, FieldTypeDescriptor>,
}

static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in field types.
    pub fn with_builtin_fields() -> Self {
        let registry = Self::new();
        registry.register::<StringField>();
        registry.register::<TextField>();
        registry.register::<HtmlField>();
        registry.register::<MarkdownField>();
        registry.register::<NumberField>();
        registry.register::<CheckboxField>();
        registry.register::<DateField>();
        registry.register::<ImageField>();
        registry.register::<DocumentField>();
        registry.register::<PageField>();
        registry
    }

    /// The process-wide registry, seeded with the built-in field types.
    pub fn global() -> Arc<TypeRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::with_builtin_fields())))
    }

    /// Register `T` under its canonical name and every shorthand.
    ///
    /// An existing registration under the same name is replaced.
    pub fn register<T: Field>(&self) {
        self.register_descriptor(FieldTypeDescriptor::of::<T>());
    }

    /// Register a descriptor under its canonical name and every shorthand.
    pub fn register_descriptor(&self, descriptor: FieldTypeDescriptor) {
        self.types
            .insert(descriptor.type_name.to_string(), descriptor);
        for shorthand in descriptor.shorthand {
            self.types.insert((*shorthand).to_string(), descriptor);
        }
    }

    /// Register `T` under an extra alias.
    pub fn register_alias<T: Field>(&self, alias: impl Into<String>) {
        self.types.insert(alias.into(), FieldTypeDescriptor::of::<T>());
    }

    /// Resolve a shorthand or canonical type name.
    pub fn resolve(&self, name: &str) -> Option<FieldTypeDescriptor> {
        self.types.get(name).map(|entry| *entry.value())
    }

    /// Check whether a name resolves.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered names, shorthands included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_shorthand_and_full_name() {
        let registry = TypeRegistry::with_builtin_fields();

        let by_short = registry.resolve("Text").unwrap();
        let by_full = registry.resolve(TextField::TYPE_NAME).unwrap();
        assert_eq!(by_short, by_full);
        assert_eq!(by_short.type_name, TextField::TYPE_NAME);
        assert!(registry.resolve("Carousel").is_none());
    }

    #[test]
    fn test_construct_default() {
        let registry = TypeRegistry::with_builtin_fields();
        let value = registry.resolve("Checkbox").unwrap().construct();

        assert_eq!(value.type_name(), CheckboxField::TYPE_NAME);
        assert_eq!(value.serialize().unwrap(), "false");
    }

    #[test]
    fn test_overwrite_shorthand() {
        let registry = TypeRegistry::with_builtin_fields();
        registry.register_alias::<HtmlField>("Text");

        assert_eq!(registry.resolve("Text").unwrap().type_name, HtmlField::TYPE_NAME);
        // Rows persisted with the canonical name still resolve.
        assert_eq!(
            registry.resolve(TextField::TYPE_NAME).unwrap().type_name,
            TextField::TYPE_NAME
        );
    }

    #[test]
    fn test_global_is_shared() {
        let a = TypeRegistry::global();
        let b = TypeRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.contains("Image"));
    }
}

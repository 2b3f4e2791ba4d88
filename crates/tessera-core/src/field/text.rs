//! Text-like fields. Their storage string is the raw text.

use super::Field;
use crate::error::Result;
use crate::inject::InjectionScope;
use async_trait::async_trait;
use std::sync::Arc;

macro_rules! text_field {
    ($(#[$meta:meta])* $name:ident, $type_name:literal, [$($shorthand:literal),*]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            /// The text value.
            pub value: String,
        }

        impl $name {
            /// Create a field holding `value`.
            pub fn new(value: impl Into<String>) -> Self {
                Self { value: value.into() }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl Field for $name {
            const TYPE_NAME: &'static str = $type_name;
            const SHORTHAND: &'static [&'static str] = &[$($shorthand),*];

            fn to_stored(&self) -> Result<String> {
                Ok(self.value.clone())
            }

            fn from_stored(stored: &str) -> Result<Self> {
                Ok(Self::new(stored))
            }

            fn to_json(&self) -> serde_json::Value {
                serde_json::Value::String(self.value.clone())
            }
        }
    };
}

text_field!(
    /// A single line of text.
    StringField,
    "tessera.field.string",
    ["String"]
);

text_field!(
    /// Multi-line plain text.
    TextField,
    "tessera.field.text",
    ["Text"]
);

text_field!(
    /// Rich HTML content.
    HtmlField,
    "tessera.field.html",
    ["Html"]
);

/// Converts markdown to HTML for [`MarkdownField`].
pub trait MarkdownRenderer: Send + Sync {
    /// Render markdown source as HTML.
    fn render(&self, markdown: &str) -> String;
}

/// Markdown source with its rendered HTML.
///
/// Only the source is stored. The HTML is produced on load by a
/// [`MarkdownRenderer`] when the host registers one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownField {
    /// Markdown source.
    pub value: String,
    /// Rendered HTML, set by the initializer.
    pub html: Option<String>,
}

impl MarkdownField {
    /// Create a field holding `value`.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            html: None,
        }
    }
}

impl From<&str> for MarkdownField {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[async_trait]
impl Field for MarkdownField {
    const TYPE_NAME: &'static str = "tessera.field.markdown";
    const SHORTHAND: &'static [&'static str] = &["Markdown"];

    fn to_stored(&self) -> Result<String> {
        Ok(self.value.clone())
    }

    fn from_stored(stored: &str) -> Result<Self> {
        Ok(Self::new(stored))
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "value": self.value, "html": self.html })
    }

    async fn initialize(&mut self, scope: &InjectionScope) -> Result<()> {
        if let Some(renderer) = scope.try_resolve::<Arc<dyn MarkdownRenderer>>() {
            self.html = Some(renderer.render(&self.value));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::ServiceProvider;

    struct Paragraphs;

    impl MarkdownRenderer for Paragraphs {
        fn render(&self, markdown: &str) -> String {
            format!("<p>{markdown}</p>")
        }
    }

    #[test]
    fn test_text_storage_is_raw() {
        let field = TextField::from("line one\nline two");
        assert_eq!(field.to_stored().unwrap(), "line one\nline two");
        assert_eq!(TextField::from_stored("abc").unwrap(), TextField::from("abc"));
    }

    #[test]
    fn test_distinct_type_names() {
        assert_ne!(StringField::TYPE_NAME, TextField::TYPE_NAME);
        assert_ne!(TextField::TYPE_NAME, HtmlField::TYPE_NAME);
        assert_eq!(HtmlField::SHORTHAND, &["Html"]);
    }

    #[tokio::test]
    async fn test_markdown_renders_with_renderer() {
        let renderer: Arc<dyn MarkdownRenderer> = Arc::new(Paragraphs);
        let provider = Arc::new(ServiceProvider::new().with_singleton(renderer));
        let scope = provider.create_scope();

        let mut field = MarkdownField::from("hi");
        field.initialize(&scope).await.unwrap();
        assert_eq!(field.html.as_deref(), Some("<p>hi</p>"));
    }

    #[tokio::test]
    async fn test_markdown_without_renderer() {
        let provider = Arc::new(ServiceProvider::new());
        let scope = provider.create_scope();

        let mut field = MarkdownField::from("hi");
        field.initialize(&scope).await.unwrap();
        assert!(field.html.is_none());
    }
}

//! Built-in block types.

use super::kind::BlockType;
use crate::field::{HtmlField, ImageField, StringField, TextField};
use crate::impl_region;

/// Plain text paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub body: TextField,
}

impl_region!(TextBlock { "Body" => body: TextField });

impl BlockType for TextBlock {
    const TYPE_NAME: &'static str = "tessera.block.text";
}

/// Raw HTML fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlBlock {
    pub body: HtmlField,
}

impl_region!(HtmlBlock { "Body" => body: HtmlField });

impl BlockType for HtmlBlock {
    const TYPE_NAME: &'static str = "tessera.block.html";
}

/// Quotation with attribution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteBlock {
    pub quote: TextField,
    pub author: StringField,
}

impl_region!(QuoteBlock {
    "Quote" => quote: TextField,
    "Author" => author: StringField,
});

impl BlockType for QuoteBlock {
    const TYPE_NAME: &'static str = "tessera.block.quote";
}

/// Single image with caption.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageBlock {
    pub image: ImageField,
    pub caption: StringField,
}

impl_region!(ImageBlock {
    "Image" => image: ImageField,
    "Caption" => caption: StringField,
});

impl BlockType for ImageBlock {
    const TYPE_NAME: &'static str = "tessera.block.image";
}

/// Column layout. Each child is one column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnBlock {}

impl_region!(ColumnBlock {});

impl BlockType for ColumnBlock {
    const TYPE_NAME: &'static str = "tessera.block.columns";
    const GROUP: bool = true;
}

/// Titled group of image blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryBlock {
    pub title: StringField,
}

impl_region!(GalleryBlock { "Title" => title: StringField });

impl BlockType for GalleryBlock {
    const TYPE_NAME: &'static str = "tessera.block.gallery";
    const GROUP: bool = true;
}

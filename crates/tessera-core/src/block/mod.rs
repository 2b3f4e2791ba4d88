//! Content blocks.
//!
//! Blocks are reusable content units holding named field values. Group
//! blocks own an ordered list of child blocks. A block tree is persisted as a
//! flat list of [`BlockRecord`]s linked by parent id.

mod builtin;
mod codec;
mod kind;

pub use builtin::{ColumnBlock, GalleryBlock, HtmlBlock, ImageBlock, QuoteBlock, TextBlock};
pub use codec::BlockTreeCodec;
pub use kind::{Block, BlockKind, BlockType, BlockTypeDescriptor, BlockTypeRegistry};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One stored field value of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFieldRecord {
    pub field_id: String,
    pub type_name: String,
    pub value: String,
}

/// A stored block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    /// Block id.
    pub id: Uuid,
    /// Id of the owning group, `None` for top-level blocks.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Position among its siblings.
    #[serde(default)]
    pub sort_order: u32,
    /// Registered block type name.
    pub type_name: String,
    #[serde(default)]
    pub fields: Vec<BlockFieldRecord>,
}

impl BlockRecord {
    /// Create a record without fields.
    pub fn new(
        id: Uuid,
        parent_id: Option<Uuid>,
        sort_order: u32,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            parent_id,
            sort_order,
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field value.
    pub fn with_field(mut self, field: BlockFieldRecord) -> Self {
        self.fields.push(field);
        self
    }
}

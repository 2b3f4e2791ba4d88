//! Block kinds, block instances and the block type registry.

use crate::model::Region;
use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use uuid::Uuid;

/// Object-safe view of a block's concrete type.
pub trait BlockKind: Region + fmt::Debug {
    /// Registered type name.
    fn type_name(&self) -> &'static str;

    /// Whether the block may own child blocks.
    fn is_group(&self) -> bool;

    /// Clone behind a box.
    fn clone_kind(&self) -> Box<dyn BlockKind>;

    /// Borrow as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// A concrete block type. Field members are exposed through [`Region`],
/// usually via [`impl_region!`](crate::impl_region).
pub trait BlockType: Region + Default + Clone + fmt::Debug + 'static {
    /// Registered type name, persisted with every record.
    const TYPE_NAME: &'static str;

    /// Whether the block may own child blocks.
    const GROUP: bool = false;
}

impl<T: BlockType> BlockKind for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn is_group(&self) -> bool {
        T::GROUP
    }

    fn clone_kind(&self) -> Box<dyn BlockKind> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn same_fields(a: &dyn BlockKind, b: &dyn BlockKind) -> bool {
    let ids = a.field_ids();
    ids == b.field_ids()
        && ids.iter().all(|id| match (a.field(id), b.field(id)) {
            (Some(x), Some(y)) => x.value_eq(y),
            (None, None) => true,
            _ => false,
        })
}

/// A block instance with its children.
#[derive(Debug)]
pub struct Block {
    pub id: Uuid,
    pub kind: Box<dyn BlockKind>,
    /// Child blocks; always empty for non-group kinds.
    pub items: Vec<Block>,
}

impl Block {
    /// Create a block with a fresh id.
    pub fn new(kind: impl BlockKind + 'static) -> Self {
        Self::from_kind(Box::new(kind))
    }

    /// Create a block from a boxed kind.
    pub fn from_kind(kind: Box<dyn BlockKind>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            items: Vec::new(),
        }
    }

    /// Set the block id.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Append a child block.
    pub fn with_item(mut self, item: Block) -> Self {
        self.items.push(item);
        self
    }

    /// Registered type name.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Whether the block may own children.
    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }

    /// Borrow the kind as its concrete type.
    pub fn kind_as<T: BlockType>(&self) -> Option<&T> {
        self.kind.as_any().downcast_ref::<T>()
    }

    /// Number of blocks in this subtree, this block included.
    pub fn size(&self) -> usize {
        1 + self.items.iter().map(Block::size).sum::<usize>()
    }

    /// Height of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.items.iter().map(Block::depth).max().unwrap_or(0)
    }

    /// Render for display.
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .kind
            .field_ids()
            .into_iter()
            .filter_map(|id| self.kind.field(id).map(|value| (id.to_string(), value.to_json())))
            .collect();

        let mut json = serde_json::json!({
            "id": self.id.to_string(),
            "type": self.type_name(),
            "fields": fields,
        });
        if self.is_group() {
            json["items"] = self.items.iter().map(Block::to_json).collect();
        }
        json
    }
}

impl Clone for Block {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            kind: self.kind.clone_kind(),
            items: self.items.clone(),
        }
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.type_name() == other.type_name()
            && same_fields(&*self.kind, &*other.kind)
            && self.items == other.items
    }
}

/// Runtime descriptor of a registered block type.
#[derive(Clone, Copy)]
pub struct BlockTypeDescriptor {
    pub type_name: &'static str,
    pub group: bool,
    construct: fn() -> Box<dyn BlockKind>,
}

impl BlockTypeDescriptor {
    /// Describe the block type `T`.
    pub fn of<T: BlockType>() -> Self {
        Self {
            type_name: T::TYPE_NAME,
            group: T::GROUP,
            construct: construct_default::<T>,
        }
    }

    /// Construct a default block kind.
    pub fn construct(&self) -> Box<dyn BlockKind> {
        (self.construct)()
    }
}

impl fmt::Debug for BlockTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockTypeDescriptor")
            .field("type_name", &self.type_name)
            .field("group", &self.group)
            .finish()
    }
}

fn construct_default<T: BlockType>() -> Box<dyn BlockKind> {
    Box::new(T::default())
}

/// Registry of block types keyed by type name.
#[derive(Debug, Default)]
pub struct BlockTypeRegistry {
    types: DashMap<String, BlockTypeDescriptor>,
}

impl BlockTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in block types.
    pub fn with_builtin_blocks() -> Self {
        use super::builtin::*;

        let registry = Self::new();
        registry.register::<TextBlock>();
        registry.register::<HtmlBlock>();
        registry.register::<QuoteBlock>();
        registry.register::<ImageBlock>();
        registry.register::<ColumnBlock>();
        registry.register::<GalleryBlock>();
        registry
    }

    /// Register `T`, replacing any previous registration under its name.
    pub fn register<T: BlockType>(&self) {
        self.types
            .insert(T::TYPE_NAME.to_string(), BlockTypeDescriptor::of::<T>());
    }

    /// Look up a block type.
    pub fn resolve(&self, type_name: &str) -> Option<BlockTypeDescriptor> {
        self.types.get(type_name).map(|entry| *entry.value())
    }

    /// Check whether a block type is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Number of registered block types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

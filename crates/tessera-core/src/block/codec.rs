//! Conversion between block trees and flat block records.

use super::kind::{Block, BlockTypeRegistry};
use super::{BlockFieldRecord, BlockRecord};
use crate::codec::FieldCodec;
use crate::config::MapperConfig;
use crate::error::{Error, Result};
use crate::inject::InjectionScope;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Flattens block trees into records and rebuilds them.
#[derive(Debug, Clone)]
pub struct BlockTreeCodec {
    fields: FieldCodec,
    blocks: Arc<BlockTypeRegistry>,
    config: MapperConfig,
}

type ChildIndex<'r> = HashMap<Uuid, Vec<&'r BlockRecord>>;

impl BlockTreeCodec {
    /// Create a codec with the default configuration.
    pub fn new(fields: FieldCodec, blocks: Arc<BlockTypeRegistry>) -> Self {
        Self {
            fields,
            blocks,
            config: MapperConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// The block type registry.
    pub fn blocks(&self) -> &Arc<BlockTypeRegistry> {
        &self.blocks
    }

    /// Flatten a forest depth-first. Parents precede their children.
    pub fn flatten(&self, blocks: &[Block]) -> Result<Vec<BlockRecord>> {
        let mut records = Vec::new();
        for (index, block) in blocks.iter().enumerate() {
            self.flatten_block(block, None, index as u32, 1, &mut records)?;
        }
        tracing::debug!(records = records.len(), "flattened block tree");
        Ok(records)
    }

    fn flatten_block(
        &self,
        block: &Block,
        parent_id: Option<Uuid>,
        sort_order: u32,
        depth: usize,
        out: &mut Vec<BlockRecord>,
    ) -> Result<()> {
        if depth > self.config.max_block_depth {
            return Err(Error::BlockDepthExceeded(self.config.max_block_depth));
        }
        if !block.is_group() {
            if let Some(child) = block.items.first() {
                return Err(Error::InvalidBlockParent {
                    block: child.id,
                    parent: block.id,
                });
            }
        }

        let mut record = BlockRecord::new(block.id, parent_id, sort_order, block.type_name());
        for field_id in block.kind.field_ids() {
            let Some(value) = block.kind.field(field_id) else {
                continue;
            };
            let type_name = value.type_name();
            if self.fields.descriptor(type_name).is_none() {
                return Err(Error::UnknownFieldType(type_name.to_string()));
            }
            record.fields.push(BlockFieldRecord {
                field_id: field_id.to_string(),
                type_name: type_name.to_string(),
                value: value.serialize()?,
            });
        }
        out.push(record);

        for (index, child) in block.items.iter().enumerate() {
            self.flatten_block(child, Some(block.id), index as u32, depth + 1, out)?;
        }
        Ok(())
    }

    /// Rebuild a forest from flat records.
    ///
    /// Siblings are ordered by sort order, ties keeping stored order. Fails
    /// on missing parents, parent cycles, children of non-group blocks,
    /// unknown block types and trees deeper than `max_block_depth`.
    pub async fn unflatten(
        &self,
        records: &[BlockRecord],
        scope: &InjectionScope,
    ) -> Result<Vec<Block>> {
        let mut ids = HashSet::with_capacity(records.len());
        for record in records {
            if !ids.insert(record.id) {
                return Err(Error::Deserialization(format!(
                    "duplicate block id {}",
                    record.id
                )));
            }
        }

        let mut roots = Vec::new();
        let mut children: ChildIndex<'_> = HashMap::new();
        for record in records {
            match record.parent_id {
                None => roots.push(record),
                Some(parent) if parent == record.id => return Err(Error::BlockCycle(record.id)),
                Some(parent) if !ids.contains(&parent) => {
                    return Err(Error::OrphanBlockReference {
                        block: record.id,
                        parent,
                    })
                }
                Some(parent) => children.entry(parent).or_default().push(record),
            }
        }
        roots.sort_by_key(|record| record.sort_order);
        for siblings in children.values_mut() {
            siblings.sort_by_key(|record| record.sort_order);
        }

        let mut blocks = Vec::with_capacity(roots.len());
        for record in roots {
            blocks.push(self.build(record, &children, scope, 1).await?);
        }

        // Records never reached from a root can only sit on a parent cycle.
        let attached: usize = blocks.iter().map(Block::size).sum();
        if attached != records.len() {
            let reached: HashSet<Uuid> = blocks.iter().flat_map(subtree_ids).collect();
            if let Some(record) = records.iter().find(|r| !reached.contains(&r.id)) {
                return Err(Error::BlockCycle(record.id));
            }
        }

        tracing::debug!(blocks = attached, "unflattened block tree");
        Ok(blocks)
    }

    fn build<'a>(
        &'a self,
        record: &'a BlockRecord,
        children: &'a ChildIndex<'a>,
        scope: &'a InjectionScope,
        depth: usize,
    ) -> BoxFuture<'a, Result<Block>> {
        async move {
            if depth > self.config.max_block_depth {
                return Err(Error::BlockDepthExceeded(self.config.max_block_depth));
            }
            let descriptor = self
                .blocks
                .resolve(&record.type_name)
                .ok_or_else(|| Error::UnknownBlockType(record.type_name.clone()))?;

            let mut kind = descriptor.construct();
            for field in &record.fields {
                match self
                    .fields
                    .deserialize(&field.value, &field.type_name, scope)
                    .await?
                {
                    Some(value) => kind.set_field(&field.field_id, value)?,
                    None if self.config.strict_field_types => {
                        return Err(Error::UnknownFieldType(field.type_name.clone()))
                    }
                    None => {}
                }
            }

            let mut block = Block::from_kind(kind).with_id(record.id);
            if let Some(items) = children.get(&record.id) {
                if !descriptor.group {
                    return Err(Error::InvalidBlockParent {
                        block: items[0].id,
                        parent: record.id,
                    });
                }
                for item in items {
                    block
                        .items
                        .push(self.build(item, children, scope, depth + 1).await?);
                }
            }
            Ok(block)
        }
        .boxed()
    }
}

fn subtree_ids(block: &Block) -> Vec<Uuid> {
    let mut ids = vec![block.id];
    ids.extend(block.items.iter().flat_map(subtree_ids));
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockType, ColumnBlock, QuoteBlock, TextBlock};
    use crate::field::{StringField, TextField};
    use crate::inject::ServiceProvider;
    use crate::registry::TypeRegistry;
    use pretty_assertions::assert_eq;

    fn codec() -> BlockTreeCodec {
        BlockTreeCodec::new(
            FieldCodec::new(Arc::new(TypeRegistry::with_builtin_fields())),
            Arc::new(BlockTypeRegistry::with_builtin_blocks()),
        )
    }

    fn scope() -> InjectionScope {
        Arc::new(ServiceProvider::new()).create_scope()
    }

    fn text(body: &str) -> Block {
        Block::new(TextBlock {
            body: TextField::from(body),
        })
    }

    #[tokio::test]
    async fn test_group_roundtrip() {
        let codec = codec();
        let group = Block::new(ColumnBlock::default())
            .with_item(text("left"))
            .with_item(Block::new(QuoteBlock {
                quote: TextField::from("Less is more"),
                author: StringField::from("Mies"),
            }));
        let tree = vec![group.clone(), text("footer")];

        let records = codec.flatten(&tree).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].parent_id, None);
        assert_eq!(records[1].parent_id, Some(group.id));
        assert_eq!(records[2].parent_id, Some(group.id));
        assert_eq!(records[3].parent_id, None);

        let rebuilt = codec.unflatten(&records, &scope()).await.unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[tokio::test]
    async fn test_children_follow_sort_order() {
        let codec = codec();
        let group = Block::new(ColumnBlock::default())
            .with_item(text("a"))
            .with_item(text("b"));
        let mut records = codec.flatten(std::slice::from_ref(&group)).unwrap();
        records.reverse();

        let rebuilt = codec.unflatten(&records, &scope()).await.unwrap();
        assert_eq!(rebuilt, vec![group]);
    }

    #[tokio::test]
    async fn test_orphan_reference() {
        let codec = codec();
        let missing = Uuid::new_v4();
        let child = BlockRecord::new(Uuid::new_v4(), Some(missing), 0, TextBlock::TYPE_NAME);

        match codec.unflatten(&[child.clone()], &scope()).await {
            Err(Error::OrphanBlockReference { block, parent }) => {
                assert_eq!(block, child.id);
                assert_eq!(parent, missing);
            }
            other => panic!("expected OrphanBlockReference, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cycle_detected() {
        let codec = codec();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let records = vec![
            BlockRecord::new(a, Some(b), 0, ColumnBlock::TYPE_NAME),
            BlockRecord::new(b, Some(a), 0, ColumnBlock::TYPE_NAME),
        ];

        let result = codec.unflatten(&records, &scope()).await;
        assert!(matches!(result, Err(Error::BlockCycle(_))));

        let own = BlockRecord::new(a, Some(a), 0, ColumnBlock::TYPE_NAME);
        let result = codec.unflatten(&[own], &scope()).await;
        assert!(matches!(result, Err(Error::BlockCycle(id)) if id == a));
    }

    #[tokio::test]
    async fn test_depth_bound() {
        let codec = codec().with_config(MapperConfig::new().with_max_block_depth(2));
        let mut records = vec![BlockRecord::new(Uuid::new_v4(), None, 0, ColumnBlock::TYPE_NAME)];
        for _ in 0..2 {
            let parent = records.last().map(|r| r.id);
            records.push(BlockRecord::new(Uuid::new_v4(), parent, 0, ColumnBlock::TYPE_NAME));
        }

        let result = codec.unflatten(&records, &scope()).await;
        assert!(matches!(result, Err(Error::BlockDepthExceeded(2))));
    }

    #[tokio::test]
    async fn test_child_of_non_group() {
        let codec = codec();
        let parent = Uuid::new_v4();
        let records = vec![
            BlockRecord::new(parent, None, 0, TextBlock::TYPE_NAME),
            BlockRecord::new(Uuid::new_v4(), Some(parent), 0, TextBlock::TYPE_NAME),
        ];

        let result = codec.unflatten(&records, &scope()).await;
        assert!(matches!(result, Err(Error::InvalidBlockParent { .. })));

        let invalid = text("leaf").with_item(text("child"));
        assert!(matches!(
            codec.flatten(&[invalid]),
            Err(Error::InvalidBlockParent { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_block_type() {
        let codec = codec();
        let record = BlockRecord::new(Uuid::new_v4(), None, 0, "legacy.Carousel");

        let result = codec.unflatten(&[record], &scope()).await;
        assert!(matches!(result, Err(Error::UnknownBlockType(name)) if name == "legacy.Carousel"));
    }
}

//! Archived row batches handed to a repository.
//!
//! Ids are stored as raw 16-byte arrays so the archive format does not depend
//! on uuid's own rkyv support.

use crate::block::{BlockFieldRecord, BlockRecord};
use crate::entity::{ContentEntity, FieldRow};
use crate::error::{Error, Result};
use rkyv::{Archive, Deserialize, Serialize};
use uuid::Uuid;

/// A stored field row.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct StoredField {
    pub id: [u8; 16],
    pub region_id: String,
    pub field_id: String,
    pub sort_order: u32,
    pub type_name: String,
    pub value: String,
}

/// A stored content instance with all of its field rows.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct StoredContent {
    pub id: [u8; 16],
    pub type_id: String,
    /// Save timestamp in microseconds since Unix epoch.
    pub saved_at: i64,
    pub fields: Vec<StoredField>,
}

impl StoredContent {
    /// Archive an entity, stamping the current time.
    pub fn from_entity(entity: &ContentEntity) -> Self {
        Self::with_timestamp(entity, chrono::Utc::now().timestamp_micros())
    }

    /// Archive an entity with a specific timestamp.
    pub fn with_timestamp(entity: &ContentEntity, saved_at: i64) -> Self {
        Self {
            id: entity.id.into_bytes(),
            type_id: entity.type_id.clone(),
            saved_at,
            fields: entity
                .fields
                .iter()
                .map(|row| StoredField {
                    id: row.id.into_bytes(),
                    region_id: row.region_id.clone(),
                    field_id: row.field_id.clone(),
                    sort_order: row.sort_order,
                    type_name: row.type_name.clone(),
                    value: row.value.clone(),
                })
                .collect(),
        }
    }

    /// Convert back into an entity.
    pub fn into_entity(self) -> ContentEntity {
        ContentEntity {
            id: Uuid::from_bytes(self.id),
            type_id: self.type_id,
            fields: self
                .fields
                .into_iter()
                .map(|field| FieldRow {
                    id: Uuid::from_bytes(field.id),
                    region_id: field.region_id,
                    field_id: field.field_id,
                    sort_order: field.sort_order,
                    type_name: field.type_name,
                    value: field.value,
                })
                .collect(),
        }
    }

    /// Serialize using rkyv.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize using rkyv.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// A stored block record.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct StoredBlock {
    pub id: [u8; 16],
    pub parent_id: Option<[u8; 16]>,
    pub sort_order: u32,
    pub type_name: String,
    /// `(field_id, type_name, value)` triples.
    pub fields: Vec<(String, String, String)>,
}

impl From<&BlockRecord> for StoredBlock {
    fn from(record: &BlockRecord) -> Self {
        Self {
            id: record.id.into_bytes(),
            parent_id: record.parent_id.map(Uuid::into_bytes),
            sort_order: record.sort_order,
            type_name: record.type_name.clone(),
            fields: record
                .fields
                .iter()
                .map(|f| (f.field_id.clone(), f.type_name.clone(), f.value.clone()))
                .collect(),
        }
    }
}

impl From<StoredBlock> for BlockRecord {
    fn from(stored: StoredBlock) -> Self {
        Self {
            id: Uuid::from_bytes(stored.id),
            parent_id: stored.parent_id.map(Uuid::from_bytes),
            sort_order: stored.sort_order,
            type_name: stored.type_name,
            fields: stored
                .fields
                .into_iter()
                .map(|(field_id, type_name, value)| BlockFieldRecord {
                    field_id,
                    type_name,
                    value,
                })
                .collect(),
        }
    }
}

/// Serialize a flat block batch using rkyv.
pub fn blocks_to_bytes(records: &[BlockRecord]) -> Result<Vec<u8>> {
    let stored: Vec<StoredBlock> = records.iter().map(StoredBlock::from).collect();
    rkyv::to_bytes::<rkyv::rancor::Error>(&stored)
        .map(|v| v.to_vec())
        .map_err(|e| Error::Serialization(e.to_string()))
}

/// Deserialize a flat block batch using rkyv.
pub fn blocks_from_bytes(bytes: &[u8]) -> Result<Vec<BlockRecord>> {
    rkyv::from_bytes::<Vec<StoredBlock>, rkyv::rancor::Error>(bytes)
        .map(|stored| stored.into_iter().map(BlockRecord::from).collect())
        .map_err(|e| Error::Deserialization(e.to_string()))
}

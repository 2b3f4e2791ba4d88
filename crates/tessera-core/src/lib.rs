//! Tessera Core - content type mapping engine.
//!
//! Translates between declarative content type schemas, flat persisted field
//! rows and runtime content models, either typed Rust structs or dynamic
//! region maps. Block trees are persisted as flat records linked by parent id.

pub mod block;
pub mod builder;
pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod factory;
pub mod field;
pub mod inject;
pub mod mapper;
pub mod model;
pub mod record;
pub mod registry;
pub mod schema;

pub use block::{Block, BlockKind, BlockRecord, BlockTreeCodec, BlockType, BlockTypeRegistry};
pub use builder::RegionBuilder;
pub use codec::FieldCodec;
pub use config::MapperConfig;
pub use entity::{ContentEntity, FieldRow, SlotIndex};
pub use error::{Error, Result};
pub use factory::ContentFactory;
pub use field::{Field, FieldValue};
pub use inject::{InjectionScope, ServiceProvider};
pub use mapper::{ContentMapper, SaveResult};
pub use model::{
    ContentModel, DynamicModel, FieldSet, Region, RegionRef, RegionSource, RegionValue,
    TypedModel,
};
pub use record::StoredContent;
pub use registry::{FieldTypeDescriptor, TypeRegistry};
pub use schema::{ContentType, FieldType, RegionType};

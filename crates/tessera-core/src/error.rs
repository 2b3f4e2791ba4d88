//! Core error types.

use thiserror::Error;
use uuid::Uuid;

/// Result alias used throughout the engine.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Mapping engine errors.
///
/// Stale schema references (a stored row whose region or field no longer
/// exists) are not represented here: they are skipped and logged.
#[derive(Debug, Error)]
pub enum Error {
    /// A field value's runtime type differs from its configured field type.
    #[error("type mismatch at {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Region/field path, e.g. `Teasers[2].Title`.
        path: String,
        /// Canonical type name configured on the field type.
        expected: String,
        /// Canonical type name of the value being written.
        actual: String,
    },

    /// A stored field decoded to a type the typed model member cannot hold.
    #[error("field '{field}' expects {expected}, got {actual}")]
    UnexpectedFieldType {
        /// Field id.
        field: String,
        /// Type name of the model member.
        expected: &'static str,
        /// Type name of the decoded value.
        actual: &'static str,
    },

    /// A region value has the wrong shape for its region type.
    #[error("region '{region}' expects a {expected} value")]
    RegionShape {
        /// Region id.
        region: String,
        /// Expected shape.
        expected: &'static str,
    },

    /// A field initializer requested a collaborator the scope cannot supply.
    #[error("unresolved collaborator: {collaborator}")]
    UnresolvedCollaborator {
        /// Type name of the requested collaborator.
        collaborator: &'static str,
    },

    /// A field initializer failed.
    #[error("initialization of {field_type} failed: {message}")]
    Initialization {
        /// Canonical type name of the field.
        field_type: String,
        /// Failure description.
        message: String,
    },

    /// A block record references a parent that is not in the batch.
    #[error("block {block} references missing parent {parent}")]
    OrphanBlockReference {
        /// The child block.
        block: Uuid,
        /// The missing parent id.
        parent: Uuid,
    },

    /// A block record is part of a parent cycle.
    #[error("block {0} is part of a parent cycle")]
    BlockCycle(Uuid),

    /// The block tree is nested deeper than the configured bound.
    #[error("block tree exceeds maximum depth of {0}")]
    BlockDepthExceeded(usize),

    /// A block owns children but is not a group.
    #[error("block {parent} is not a group and cannot own block {block}")]
    InvalidBlockParent {
        /// The child block.
        block: Uuid,
        /// The non-group parent.
        parent: Uuid,
    },

    /// No block type is registered under the name.
    #[error("unknown block type: {0}")]
    UnknownBlockType(String),

    /// No field type is registered under the name.
    #[error("unknown field type: {0}")]
    UnknownFieldType(String),

    /// The content type schema violates an invariant.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// The requested typed model does not match the content type.
    #[error("model type {requested} is not compatible with content type '{content_type}'")]
    ModelTypeMismatch {
        /// The requested model's type name.
        requested: &'static str,
        /// The content type id.
        content_type: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// JSON encoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

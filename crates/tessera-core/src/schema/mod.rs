//! Content type schemas.
//!
//! A content type is an ordered list of regions; a region is an ordered list
//! of typed fields and may repeat as a collection.

mod content_type;
mod field;
mod region;

pub use content_type::ContentType;
pub use field::FieldType;
pub use region::RegionType;

//! Tessera Benchmark Suite
//!
//! Criterion benchmarks for the mapping engine.
//!
//! # Benchmark Categories
//!
//! - **Mapper**: save to rows, load into dynamic models, row archives
//! - **Blocks**: block tree flatten and unflatten

pub mod fixtures;

pub use fixtures::{generate_blocks, generate_page, landing_page_type, services, Scale};

//! CSV I/O and data validation for MOF property datasets.
//!
//! A MOF (metal-organic framework) is identified structurally by a
//! `(metal_node, organic_core, topology)` triple. This crate loads raw
//! property tables, reconciles rows against a canonical identity registry,
//! and runs the multi-stage filter pipeline that produces a cleaned dataset
//! ready for model training and evaluation.
//!
//! # Key types
//!
//! - [`MofKey`] / [`MofRecord`] — structural identity and one table row
//! - [`MofRegistry`] — bidirectional triple ↔ canonical ID mapping
//! - [`ColumnSchema`] — explicit source-column mapping, validated at load
//! - [`FilterConfig`] / [`FilterReport`] — filter stages and their removal ledger

pub mod filter;
pub mod reader;
pub mod registry;
pub mod schema;
pub mod types;
pub mod writer;

pub use filter::{clean_property_set, FilterConfig, FilterReport, SelectivityBound, StageCount};
pub use reader::{load_reference_set, read_records, LoadedTable};
pub use registry::{MofColumnSet, MofRegistry};
pub use schema::ColumnSchema;
pub use types::{MofKey, MofRecord, RunMode};
pub use writer::write_records;

//! Tree flattening - explode nested site-model JSON into flat row tables
//!
//! This module holds the generic machinery: the [`Table`] representation
//! every pipeline stage consumes and produces, the record-path normalizer
//! that turns nested records into flat columns, and the explode-then-
//! normalize [`flatten`] operation the entity extractors are built on.

pub mod flattener;
pub mod normalize;
pub mod table;

pub use flattener::flatten;
pub use normalize::{meta_column_name, normalize, normalize_document, record_prefix};
pub use table::{Row, Table};

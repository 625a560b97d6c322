//! # Catalog
//!
//! This crate loads the fixed item catalog that cinescout searches over and
//! owns the record representation shared read-only by the rest of the
//! pipeline.
//!
//! The catalog is a row-oriented table (CSV) with a unique title column;
//! every other column is carried verbatim as an opaque scalar payload. Source
//! row order is preserved after loading; the row position is the identifier
//! space used by the similarity index and the embedding cache.

pub mod error;
pub mod loader;
pub mod record;

pub use error::{CatalogError, Result};
pub use loader::Catalog;
pub use record::CatalogRecord;

//! Data ingestion: CSV schema, loader, writer, synthetic series

pub mod loader;
pub mod schema;
pub mod synthetic;
pub mod writer;

pub use loader::{load_series, LoadError, LoadedSeries, SeriesLoader};
pub use schema::{ColumnMap, SchemaError, REQUIRED_COLUMNS};
pub use synthetic::{generate, SyntheticKind, SyntheticParams};
pub use writer::write_csv;

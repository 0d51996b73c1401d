//! Spreadsheet ingestion: reading, record building, column classification
//! and the upload pipeline tying them to the stores.

pub mod classifier;
pub mod factory;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod pipeline;
pub mod reader;
pub mod table;

pub use classifier::classify;
pub use pipeline::{FileInfo, IngestPipeline, IngestReport, MappingRef};
pub use table::{SheetContent, Table, TabularSource};

//! Dataset ingestion: records, source metadata, and the CSV reader.

mod reader;
mod source;

pub use reader::{DatasetReader, ReaderConfig};
pub use source::{Dataset, Record, SourceMetadata};

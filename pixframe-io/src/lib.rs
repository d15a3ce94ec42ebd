//! pixframe-io: run headers, event files and cluster output.
//!
//! Event files are read through memory maps via memmap2; headers and
//! events are JSON documents parsed with `serde_json`.

mod error;
mod header;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use header::{RunHeader, SensorHeader};
pub use reader::{EventFileReader, EventIter, MappedFileReader};
pub use writer::{ClusterFileWriter, OutputFormat};

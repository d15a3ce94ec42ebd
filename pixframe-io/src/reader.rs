//! Memory-mapped event file reader.
//!
//! Event files are JSON lines: one event object per line, blank lines
//! ignored.
//!
//! ```json
//! {"number": 0, "kind": "data", "sensors": [{"charge": [0.1, 12.0], "noise": [1.0, 1.0]}]}
//! {"number": 1, "kind": "end_of_run"}
//! ```

use crate::{Error, Result};
use memmap2::Mmap;
use pixframe_core::event::EventData;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A memory-mapped file reader.
///
/// Uses memmap2 to access file contents without loading the entire
/// file into memory.
pub struct MappedFileReader {
    mmap: Option<Mmap>,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // Zero-length files cannot be mapped on every platform.
        let mmap = if file.metadata()?.len() == 0 {
            None
        } else {
            // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
            // This is the standard safety contract for memory mapping.
            #[allow(unsafe_code)]
            let mmap = unsafe { Mmap::map(&file)? };
            Some(mmap)
        };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or_default()
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Path the reader was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reader for JSON-lines event files.
pub struct EventFileReader {
    reader: MappedFileReader,
}

impl EventFileReader {
    /// Opens an event file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = MappedFileReader::open(path)?;
        log::debug!(
            "mapped event file {} ({} bytes)",
            reader.path().display(),
            reader.len()
        );
        Ok(Self { reader })
    }

    /// File size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.reader.len()
    }

    /// Path of the event file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.reader.path()
    }

    /// Iterates the events in file order.
    #[must_use]
    pub fn events(&self) -> EventIter<'_> {
        EventIter::new(self.reader.as_bytes())
    }

    /// Reads every event into memory.
    ///
    /// # Errors
    /// Returns the first malformed line.
    pub fn read_all(&self) -> Result<Vec<EventData>> {
        self.events().collect()
    }
}

/// Iterator over the events of a JSON-lines buffer.
pub struct EventIter<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> EventIter<'a> {
    /// Iterates events contained in `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            line: 0,
        }
    }
}

impl Iterator for EventIter<'_> {
    type Item = Result<EventData>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.data.len() {
            let rest = &self.data[self.pos..];
            let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
            let line = &rest[..end];
            self.pos += end + 1;
            self.line += 1;

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(
                serde_json::from_slice::<EventData>(line).map_err(|err| Error::InvalidEvent {
                    line: self.line,
                    message: err.to_string(),
                }),
            );
        }
        None
    }
}

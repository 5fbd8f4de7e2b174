use serde_json::{Map, Value};

use crate::error::Result;
use crate::normalize::{LocationInput, NormalizedLocation};

/// One row pulled from a batch source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    /// 1-based line number in the source.
    pub line: usize,
    pub input: LocationInput,
    /// The full record when the source is structured; `None` for plain text.
    pub fields: Option<Map<String, Value>>,
}

impl SourceRecord {
    pub fn plain(line: usize, input: LocationInput) -> Self {
        Self {
            line,
            input,
            fields: None,
        }
    }
}

/// Batch sources are iterators over rows; a row that cannot be read is an
/// `Err` item and does not end the batch. Any such iterator qualifies,
/// including `Vec::into_iter` in tests.
pub trait LocationSource: Iterator<Item = Result<SourceRecord>> {}

impl<T> LocationSource for T where T: Iterator<Item = Result<SourceRecord>> {}

/// Receives every normalized row. Sink errors abort the batch.
pub trait LocationSink {
    fn write(&mut self, record: &SourceRecord, location: &NormalizedLocation) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps every row in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<(SourceRecord, NormalizedLocation)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationSink for MemorySink {
    fn write(&mut self, record: &SourceRecord, location: &NormalizedLocation) -> Result<()> {
        self.rows.push((record.clone(), location.clone()));
        Ok(())
    }
}

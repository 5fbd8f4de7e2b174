use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::app::ports::{LocationSink, SourceRecord};
use crate::error::Result;
use crate::normalize::NormalizedLocation;

/// Key under which the normalized location is attached to each output row.
pub const NORMALIZED_KEY: &str = "normalizedLocation";

/// Writes one JSON object per row: the original record fields (or the line
/// number and raw text for plain sources) plus the normalized location.
pub struct NdjsonSink<W: Write> {
    writer: BufWriter<W>,
    rows_written: usize,
}

impl NdjsonSink<std::fs::File> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        info!("Writing normalized rows to {}", path.display());
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> NdjsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            rows_written: 0,
        }
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn into_inner(self) -> std::result::Result<W, std::io::Error> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> LocationSink for NdjsonSink<W> {
    fn write(&mut self, record: &SourceRecord, location: &NormalizedLocation) -> Result<()> {
        let mut row = match &record.fields {
            Some(fields) => fields.clone(),
            None => {
                let mut row = Map::new();
                row.insert("line".to_string(), Value::from(record.line));
                row.insert("raw".to_string(), Value::from(record.input.raw.clone()));
                row
            }
        };
        row.insert(NORMALIZED_KEY.to_string(), serde_json::to_value(location)?);

        serde_json::to_writer(&mut self.writer, &row)?;
        self.writer.write_all(b"\n")?;
        self.rows_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

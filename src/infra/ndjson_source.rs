use serde_json::Value;
use std::io::{BufRead, Lines};

use crate::app::ports::SourceRecord;
use crate::config::BatchConfig;
use crate::error::{NormalizerError, Result};
use crate::normalize::LocationInput;

/// Reads newline-delimited JSON objects, pulling the location and hint
/// fields named in [`BatchConfig`].
///
/// Blank lines are skipped. A missing or `null` location field is read as
/// an empty location; numbers and booleans are stringified.
pub struct NdjsonSource<R> {
    lines: Lines<R>,
    line_no: usize,
    location_field: String,
    hint_field: String,
}

impl<R: BufRead> NdjsonSource<R> {
    pub fn new(reader: R, config: &BatchConfig) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            location_field: config.location_field.clone(),
            hint_field: config.hint_field.clone(),
        }
    }

    fn parse_line(&self, line: &str) -> Result<SourceRecord> {
        let value: Value = serde_json::from_str(line).map_err(|e| NormalizerError::Row {
            line: self.line_no,
            message: e.to_string(),
        })?;
        let Value::Object(fields) = value else {
            return Err(NormalizerError::Row {
                line: self.line_no,
                message: "expected a JSON object".to_string(),
            });
        };

        let raw = fields.get(&self.location_field).and_then(field_text).unwrap_or_default();
        let hint = fields
            .get(&self.hint_field)
            .and_then(field_text)
            .filter(|h| !h.trim().is_empty());

        Ok(SourceRecord {
            line: self.line_no,
            input: LocationInput {
                raw,
                context_hint: hint,
            },
            fields: Some(fields),
        })
    }
}

/// A line the reader could not decode (invalid UTF-8) is a row error; the
/// reader has already moved past it.
fn unreadable_line(line: usize, err: std::io::Error) -> NormalizerError {
    NormalizerError::Row {
        line,
        message: err.to_string(),
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl<R: BufRead> Iterator for NdjsonSource<R> {
    type Item = Result<SourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.lines.next()?;
            self.line_no += 1;
            let line = match next {
                Ok(line) => line,
                Err(e) => return Some(Err(unreadable_line(self.line_no, e))),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse_line(&line));
        }
    }
}

/// Treats every non-blank line as a raw location.
pub struct LinesSource<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> LinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for LinesSource<R> {
    type Item = Result<SourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.lines.next()?;
            self.line_no += 1;
            let line = match next {
                Ok(line) => line,
                Err(e) => return Some(Err(unreadable_line(self.line_no, e))),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(Ok(SourceRecord::plain(self.line_no, LocationInput::new(line))));
        }
    }
}

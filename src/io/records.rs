use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::TableError;

/// Line-oriented reader for whitespace-separated integer records.
///
/// Lines that are empty, or that begin with a space or `#`, are treated as
/// comments. Line numbers reported in errors are 1-based physical lines.
pub struct RecordReader<R> {
    inner: R,
    source_name: String,
    line: usize,
    buf: String,
}

impl RecordReader<BufReader<File>> {
    /// Open a record file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let file = File::open(path).map_err(|e| TableError::Io {
            source_name: source_name.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::new(BufReader::new(file), source_name))
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Wrap any buffered reader; `source_name` is used in error messages.
    pub fn new(inner: R, source_name: impl Into<String>) -> Self {
        Self {
            inner,
            source_name: source_name.into(),
            line: 0,
            buf: String::new(),
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Line number of the most recently returned record.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next record as exactly `N` unsigned integers.
    ///
    /// Returns `Ok(None)` at end of input.
    pub fn next_record<const N: usize>(&mut self) -> Result<Option<[u64; N]>, TableError> {
        loop {
            self.buf.clear();
            let read = self
                .inner
                .read_line(&mut self.buf)
                .map_err(|e| TableError::Io {
                    source_name: self.source_name.clone(),
                    message: e.to_string(),
                })?;
            if read == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = self.buf.trim_end_matches(['\n', '\r']);
            if is_comment(text) {
                continue;
            }
            return parse_fields(text)
                .map(Some)
                .ok_or_else(|| TableError::MalformedRecord {
                    source_name: self.source_name.clone(),
                    line: self.line,
                });
        }
    }
}

fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with(' ') || line.starts_with('#')
}

fn parse_fields<const N: usize>(line: &str) -> Option<[u64; N]> {
    let mut values = [0u64; N];
    let mut fields = line.split_whitespace();
    for value in values.iter_mut() {
        *value = fields.next()?.parse().ok()?;
    }
    if fields.next().is_some() {
        return None;
    }
    Some(values)
}

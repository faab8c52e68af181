//! Reader for tab-delimited lamp data files.
//!
//! Each file starts with two header rows. Data rows carry the time in column 0,
//! the main intensity in column 2 and the reference intensity in column 4.
//! Header rows are skipped undecoded; they may hold instrument text in any
//! encoding.

use csv::{ByteRecord, ReaderBuilder};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Number of header rows skipped at the top of every file.
pub const HEADER_ROWS: usize = 2;

const TIME_COLUMN: usize = 0;
const MAIN_COLUMN: usize = 2;
const REFERENCE_COLUMN: usize = 4;

/// Errors raised while reading a single data file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data format at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
    #[error("no data rows after header")]
    NoData,
}

/// Columns extracted from one data file, in local (unshifted) time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileData {
    pub times: Vec<f64>,
    pub main: Vec<f64>,
    pub reference: Vec<f64>,
}

impl FileData {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Read a data file from disk.
pub fn read_data_file(path: &Path) -> Result<FileData, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    parse_data(file)
}

/// Parse tab-delimited data from any reader.
pub fn parse_data<R: Read>(reader: R) -> Result<FileData, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut data = FileData::default();
    for (row, record) in rdr.byte_records().enumerate() {
        let record = record?;
        if row < HEADER_ROWS {
            continue;
        }
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(row as u64 + 1);

        data.times.push(parse_field(&record, TIME_COLUMN, line)?);
        data.main.push(parse_field(&record, MAIN_COLUMN, line)?);
        data.reference.push(parse_field(&record, REFERENCE_COLUMN, line)?);
    }

    if data.is_empty() {
        return Err(LoadError::NoData);
    }
    Ok(data)
}

fn parse_field(record: &ByteRecord, column: usize, line: u64) -> Result<f64, LoadError> {
    let bytes = record.get(column).ok_or_else(|| LoadError::MalformedRow {
        line,
        reason: format!(
            "expected at least {} columns, found {}",
            REFERENCE_COLUMN + 1,
            record.len()
        ),
    })?;
    let raw = std::str::from_utf8(bytes).map_err(|e| LoadError::MalformedRow {
        line,
        reason: format!("column {column} is not valid UTF-8: {e}"),
    })?;
    raw.trim().parse::<f64>().map_err(|e| LoadError::MalformedRow {
        line,
        reason: format!("column {column} value '{}': {e}", raw.trim()),
    })
}

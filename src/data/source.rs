//! Column readers for labeled sources.
//!
//! A reader returns one feature of one source as an ordered column of
//! values. All features of the same source must come back with the same
//! length; the pipeline checks this and refuses the source otherwise.
//!
//! Two readers ship with the crate:
//! - `CsvSourceReader`: UTF-8, comma-separated files with a header row
//!   naming the columns; double-quoted fields with embedded commas are
//!   handled.
//! - `MemorySource`: columns held in memory, keyed by path and feature.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Reads whole feature columns from a source.
///
/// Implementations are called from several threads at once, one call per
/// feature.
pub trait SourceReader: Sync {
    fn read_feature(&self, source: &Path, feature: &str) -> Result<Vec<f64>>;
}

/// Reads named columns from CSV files.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvSourceReader;

impl SourceReader for CsvSourceReader {
    fn read_feature(&self, source: &Path, feature: &str) -> Result<Vec<f64>> {
        let text = std::fs::read_to_string(source)?;
        parse_column(&text, feature).map_err(|reason| Error::Source {
            source_path: source.to_path_buf(),
            feature: feature.to_owned(),
            reason,
        })
    }
}

/// Columns kept in memory; handy for tests and generated data.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    columns: HashMap<(PathBuf, String), Vec<f64>>,
}

impl MemorySource {
    pub fn new() -> MemorySource {
        MemorySource::default()
    }

    pub fn insert(&mut self, source: impl Into<PathBuf>, feature: impl Into<String>, values: Vec<f64>) {
        self.columns.insert((source.into(), feature.into()), values);
    }

    /// Stores a row-major table under `source`, one column per name.
    pub fn insert_rows(&mut self, source: impl Into<PathBuf>, names: &[&str], rows: &[Vec<f64>]) {
        let source = source.into();
        for (col, name) in names.iter().enumerate() {
            let values = rows.iter().map(|r| r[col]).collect();
            self.insert(source.clone(), *name, values);
        }
    }
}

impl SourceReader for MemorySource {
    fn read_feature(&self, source: &Path, feature: &str) -> Result<Vec<f64>> {
        self.columns
            .get(&(source.to_path_buf(), feature.to_owned()))
            .cloned()
            .ok_or_else(|| Error::Source {
                source_path: source.to_path_buf(),
                feature: feature.to_owned(),
                reason: "no such column".into(),
            })
    }
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Extracts the column named `feature` from CSV text with a header row.
fn parse_column(text: &str, feature: &str) -> std::result::Result<Vec<f64>, String> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines.next().ok_or_else(|| "file is empty".to_owned())?;
    let col = parse_csv_row(header)
        .iter()
        .position(|name| name.trim() == feature)
        .ok_or_else(|| format!("no column named '{}' in header", feature))?;

    let mut values = Vec::new();
    for (row_idx, line) in lines.enumerate() {
        let cells = parse_csv_row(line.trim());
        let cell = cells.get(col).ok_or_else(|| {
            format!("Row {}: expected at least {} columns, got {}", row_idx + 1, col + 1, cells.len())
        })?;
        let value = cell
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("Row {}: '{}' is not a valid number", row_idx + 1, cell))?;
        values.push(value);
    }
    Ok(values)
}

/// Parses a single CSV row, handling double-quoted fields.
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                // Escaped quote inside quoted field.
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

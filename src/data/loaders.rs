//! Shape detection and record extraction for raw tabular files.

use std::{fmt, path::Path};

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    data::normalize::normalize_text,
    error::{PipelineError, Result, ShapeHint, TableError},
};

/// Number of data rows inspected by the detector.
pub const SAMPLE_ROWS: usize = 5;
/// Binary matrices must have strictly more columns than this.
pub const BINARY_MIN_COLUMNS: usize = 5;

const FREE_TEXT_MARKERS: &[&str] = &["description", "text", "clinical_notes"];
const ABSENT_VALUES: &[&str] = &["0", "0.0", "False", "false", ""];

const LIST_DISEASE_KEYS: &[&str] = &["disease", "disease_name"];
const LIST_SYMPTOM_KEYS: &[&str] = &[
    "symptoms",
    "symptom",
    "symptom_list",
    "symptom(s)",
    "description",
];
const MATRIX_DISEASE_KEYS: &[&str] = &["disease", "disease_name", "diagnosis"];
const TEXT_DISEASE_KEYS: &[&str] = &["disease", "diagnosis"];
const TEXT_BODY_KEYS: &[&str] = &["description", "symptoms", "clinical_notes", "text"];

/// One input row reduced to a disease and its candidate symptoms.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawRecord {
    pub disease: String,
    pub symptoms: Vec<String>,
}

/// A fully read delimited file: header plus string cells.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Read the header and at most `limit` data rows from `path`.
    pub fn from_path(path: &Path, limit: Option<usize>) -> Result<Self, TableError> {
        Self::from_reader(Self::builder().from_path(path)?, limit)
    }

    pub fn from_csv_str(text: &str) -> Result<Self, TableError> {
        Self::from_reader(Self::builder().from_reader(text.as_bytes()), None)
    }

    /// Short rows are accepted and read as empty trailing cells; rows longer
    /// than the header are rejected.
    fn builder() -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder.has_headers(true).flexible(true);
        builder
    }

    fn from_reader<R: std::io::Read>(
        mut reader: csv::Reader<R>,
        limit: Option<usize>,
    ) -> Result<Self, TableError> {
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for result in reader.records().take(limit.unwrap_or(usize::MAX)) {
            let record = result?;
            if record.len() > headers.len() {
                return Err(TableError::TooManyFields {
                    line: record.position().map_or(0, |pos| pos.line()),
                    found: record.len(),
                    expected: headers.len(),
                });
            }
            rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
        }
        Ok(Self { headers, rows })
    }

    fn lowered_headers(&self) -> Vec<String> {
        self.headers.iter().map(|h| h.to_lowercase()).collect()
    }

    fn sample(&self) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(SAMPLE_ROWS)]
    }
}

/// The closed set of supported input layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileShape {
    /// Disease column plus a delimiter-separated symptoms column.
    SymptomList,
    /// Disease column plus one 0/1 column per symptom.
    BinaryMatrix,
    /// Disease column plus free clinical prose.
    FreeText,
}

impl fmt::Display for FileShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SymptomList => "symptom-list",
            Self::BinaryMatrix => "binary-matrix",
            Self::FreeText => "free-text",
        };
        f.write_str(name)
    }
}

impl FileShape {
    /// Pick a loader from the header and the first few rows. First match wins.
    pub fn detect(table: &Table) -> Self {
        let binary_like = table
            .sample()
            .iter()
            .flatten()
            .any(|cell| cell == "0" || cell == "1");
        if table.headers.len() > BINARY_MIN_COLUMNS && binary_like {
            return Self::BinaryMatrix;
        }
        let lowered = table.lowered_headers();
        if lowered
            .iter()
            .any(|h| FREE_TEXT_MARKERS.contains(&h.as_str()))
        {
            return Self::FreeText;
        }
        Self::SymptomList
    }

    /// Extract records from a table according to this shape.
    pub fn load(self, table: &Table) -> Vec<RawRecord> {
        match self {
            Self::SymptomList => load_symptom_list(table),
            Self::BinaryMatrix => load_binary_matrix(table),
            Self::FreeText => load_free_text(table),
        }
    }
}

/// Records extracted from one source file.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub source: String,
    pub shape: FileShape,
    pub records: Vec<RawRecord>,
}

/// Detect the shape from a sample, then read and load the whole file.
/// Errors concern this file only and name the shape once it is known.
pub fn load_file(path: &Path) -> Result<LoadedFile> {
    let sample = Table::from_path(path, Some(SAMPLE_ROWS))
        .map_err(|err| PipelineError::unreadable(path, ShapeHint::Undetected, err))?;
    if sample.headers.is_empty() {
        return Err(PipelineError::UnresolvableSchema {
            path: path.to_path_buf(),
        });
    }
    let shape = FileShape::detect(&sample);
    let table = Table::from_path(path, None)
        .map_err(|err| PipelineError::unreadable(path, ShapeHint::Detected(shape), err))?;
    let records = shape.load(&table);
    let source = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();
    info!(path = %path.display(), %shape, rows = records.len(), "loaded raw file");
    Ok(LoadedFile {
        source,
        shape,
        records,
    })
}

/// Return the first candidate key present in the headers, by key priority.
fn column_by_key(lowered: &[String], keys: &[&str]) -> Option<usize> {
    keys.iter()
        .find_map(|key| lowered.iter().position(|h| h == key))
}

/// Return the first header, in column order, that is one of the keys.
fn column_by_position(lowered: &[String], keys: &[&str]) -> Option<usize> {
    lowered.iter().position(|h| keys.contains(&h.as_str()))
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or_default()
}

fn split_symptom_cell(raw: &str) -> Vec<String> {
    raw.split([',', ';', '/'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_free_text(raw: &str) -> Vec<String> {
    normalize_text(raw)
        .replace(';', ".")
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn load_symptom_list(table: &Table) -> Vec<RawRecord> {
    let lowered = table.lowered_headers();
    let disease_col = column_by_key(&lowered, LIST_DISEASE_KEYS).unwrap_or(0);
    let symptoms_col = column_by_key(&lowered, LIST_SYMPTOM_KEYS)
        .or_else(|| (table.headers.len() > 1).then_some(1));
    debug!(disease_col, ?symptoms_col, "symptom-list columns");

    table
        .rows
        .iter()
        .map(|row| RawRecord {
            disease: cell(row, disease_col).to_string(),
            symptoms: symptoms_col
                .map(|idx| split_symptom_cell(cell(row, idx)))
                .unwrap_or_default(),
        })
        .collect()
}

fn load_binary_matrix(table: &Table) -> Vec<RawRecord> {
    let lowered = table.lowered_headers();
    let disease_col = column_by_position(&lowered, MATRIX_DISEASE_KEYS).unwrap_or(0);
    debug!(disease_col, columns = table.headers.len(), "binary-matrix columns");

    table
        .rows
        .iter()
        .map(|row| RawRecord {
            disease: cell(row, disease_col).to_string(),
            symptoms: table
                .headers
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != disease_col)
                .filter(|(idx, _)| !ABSENT_VALUES.contains(&cell(row, *idx)))
                .map(|(_, name)| name.clone())
                .collect(),
        })
        .collect()
}

fn load_free_text(table: &Table) -> Vec<RawRecord> {
    let lowered = table.lowered_headers();
    let disease_col = column_by_key(&lowered, TEXT_DISEASE_KEYS).unwrap_or(0);
    let body_col = column_by_key(&lowered, TEXT_BODY_KEYS)
        .or_else(|| (table.headers.len() > 1).then_some(1));
    debug!(disease_col, ?body_col, "free-text columns");

    table
        .rows
        .iter()
        .map(|row| RawRecord {
            disease: cell(row, disease_col).to_string(),
            symptoms: body_col
                .map(|idx| split_free_text(cell(row, idx)))
                .unwrap_or_default(),
        })
        .collect()
}

use serde::{Deserialize, Serialize};

/// One physical line of the export (first column only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the source file, for error reporting.
    pub line: usize,
    pub text: String,
}

impl RawRow {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

/// Semantic role of a row, derived purely from its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    RegistrationMarker(String),
    DateMarker(String),
    DataMarker(Vec<String>),
    Irrelevant,
}

impl RowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegistrationMarker(_) => "registration",
            Self::DateMarker(_) => "date",
            Self::DataMarker(_) => "data",
            Self::Irrelevant => "irrelevant",
        }
    }
}

/// Raw mpal/stops tokens pulled out of a data row, before numeric coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFields {
    pub mpal: String,
    pub stops: String,
}

/// A data row carrying the registration and date it was attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedRow {
    pub line: usize,
    pub registration: String,
    pub date: String,
    pub tokens: Vec<String>,
    pub fields: RawFields,
}

/// The unit of truth every aggregate view is computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedRecord {
    pub registration: String,
    pub date: String,
    pub mpal: f64,
    pub stops: i64,
}

/// Counters collected while the pipeline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub rows_read: usize,
    pub candidates: usize,
    pub data_rows: usize,
    pub unattributed: usize,
    pub incomplete: usize,
    pub duplicates: usize,
    pub records: usize,
}

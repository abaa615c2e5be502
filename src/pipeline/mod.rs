//! Row classification and reshape pipeline.
//!
//! classify → fields → propagate → records → aggregate. Everything here is
//! synchronous and pure: the same rows always give the same views.

pub mod types;
pub mod classify;
pub mod fields;
pub mod propagate;
pub mod records;
pub mod aggregate;

pub use types::*;
pub use aggregate::{
    aggregate, CheckCategory, CheckCell, DayKey, ReportOptions, ReportViews,
};

use thiserror::Error;

use fields::NumericError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Extraction failed at line {line}: {source}")]
    Extraction {
        line: usize,
        #[source]
        source: NumericError,
    },

    #[error("Stop total for {registration} ({scope}) does not fit in a 64-bit integer")]
    StopsOverflow { registration: String, scope: String },
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub records: Vec<AttributedRecord>,
    pub views: ReportViews,
    pub stats: PipelineStats,
}

/// Run every stage over the rows of one input file.
pub fn run(rows: &[RawRow], options: &ReportOptions) -> Result<PipelineOutput, PipelineError> {
    let mut stats = PipelineStats {
        rows_read: rows.len(),
        ..Default::default()
    };

    // Loose selection first, strict classification second.
    let classified: Vec<(usize, RowKind)> = rows
        .iter()
        .filter(|row| classify::is_candidate(&row.text))
        .map(|row| (row.line, classify::classify(&row.text)))
        .collect();
    stats.candidates = classified.len();
    stats.data_rows = classified
        .iter()
        .filter(|(_, kind)| matches!(kind, RowKind::DataMarker(_)))
        .count();

    let propagated = propagate::propagate(classified);
    stats.unattributed = propagated.unattributed;
    stats.incomplete = propagated.incomplete;

    let built = records::build_records(propagated.rows)?;
    stats.duplicates = built.duplicates;
    stats.records = built.records.len();

    tracing::debug!(
        rows = stats.rows_read,
        candidates = stats.candidates,
        data_rows = stats.data_rows,
        unattributed = stats.unattributed,
        incomplete = stats.incomplete,
        duplicates = stats.duplicates,
        records = stats.records,
        "Pipeline stages complete"
    );

    let views = aggregate(&built.records, options)?;

    Ok(PipelineOutput {
        records: built.records,
        views,
        stats,
    })
}

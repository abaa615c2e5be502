//! File-to-file conversion: one export in, one workbook out.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::import::{self, ImportError, InputFormat};
use crate::pipeline::{self, PipelineError, PipelineOutput, PipelineStats};
use crate::report::{self, ReportError};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// What one conversion read and wrote.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub input: PathBuf,
    pub output: PathBuf,
    pub stats: PipelineStats,
}

/// Read `path` (format from its extension) and run the pipeline over it.
pub fn process_file(path: &Path, config: &AppConfig) -> Result<PipelineOutput, BatchError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(ImportError::MissingFileName)?;
    let format = import::detect_format(name, &config.accepted_extensions)?;
    let rows = import::read_rows(path, format, config.has_header)?;
    Ok(pipeline::run(&rows, &config.report_options())?)
}

/// Convert `input` and write the workbook to `output`.
pub fn convert_file(
    input: &Path,
    output: &Path,
    config: &AppConfig,
) -> Result<Conversion, BatchError> {
    let result = process_file(input, config)?;
    report::save_report(&result.views, output)?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        records = result.stats.records,
        duplicates = result.stats.duplicates,
        "Conversion complete"
    );

    Ok(Conversion {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        stats: result.stats,
    })
}

/// `<input_dir>/<name>.csv` → `<output_dir>/<name>.xlsx`.
///
/// A trailing `.csv` on `name` is tolerated.
pub fn convert_named(name: &str, config: &AppConfig) -> Result<Conversion, BatchError> {
    let (input, output) = named_paths(name, config)?;
    convert_file(&input, &output, config)
}

pub fn named_paths(name: &str, config: &AppConfig) -> Result<(PathBuf, PathBuf), BatchError> {
    let ext = InputFormat::Csv.as_str();
    let name = name.trim();
    let stem = name
        .strip_suffix(&format!(".{ext}"))
        .unwrap_or(name)
        .trim();
    if stem.is_empty() {
        return Err(ImportError::MissingFileName.into());
    }

    let input = config.input_dir.join(format!("{stem}.{ext}"));
    let output = config.output_dir.join(import::report_file_name(&format!("{stem}.{ext}")));
    Ok((input, output))
}

pub mod format;
pub mod reader;
pub mod staging;

pub use format::*;
pub use reader::*;
pub use staging::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File too large: {size_mb:.1}MB exceeds {max_mb}MB limit")]
    FileTooLarge { size_mb: f64, max_mb: u64 },

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet read error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Spreadsheet has no worksheets")]
    EmptyWorkbook,

    #[error("No file name given")]
    MissingFileName,
}

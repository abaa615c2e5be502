use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ImportError;

/// Input formats the reader understands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    Xlsx,
    Xls,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Xls)
    }
}

/// Resolve the format of `filename` by extension and check it is accepted.
///
/// The extension is the only signal: exports are plain text, so there are
/// no magic bytes to sniff.
pub fn detect_format(filename: &str, accepted: &[InputFormat]) -> Result<InputFormat, ImportError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match InputFormat::from_extension(ext) {
        Some(format) if accepted.contains(&format) => Ok(format),
        _ => Err(ImportError::UnsupportedFormat(format!(
            "{filename:?} (accepted: {})",
            accepted
                .iter()
                .map(|f| format!(".{}", f.as_str()))
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// Sanitize a filename: strip path components, drop control characters.
pub fn sanitize_filename(original: &str) -> String {
    // Browsers on Windows may send the full client path.
    let last = original.rsplit(['/', '\\']).next().unwrap_or(original);

    let clean: String = last
        .chars()
        .filter(|c| !c.is_control())
        .take(255)
        .collect();
    let clean = clean.trim().trim_start_matches('.').to_string();

    if clean.is_empty() {
        "report.csv".to_string()
    } else {
        clean
    }
}

/// Base name of the output workbook: input stem with `.xlsx`.
pub fn report_file_name(input_name: &str) -> String {
    let stem = Path::new(input_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("report");
    format!("{stem}.xlsx")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_ONLY: &[InputFormat] = &[InputFormat::Csv];
    const ALL: &[InputFormat] = &[InputFormat::Csv, InputFormat::Xlsx, InputFormat::Xls];

    #[test]
    fn csv_accepted_case_insensitive() {
        assert_eq!(detect_format("2024_10.csv", CSV_ONLY).unwrap(), InputFormat::Csv);
        assert_eq!(detect_format("EXPORT.CSV", CSV_ONLY).unwrap(), InputFormat::Csv);
    }

    #[test]
    fn spreadsheet_rejected_unless_enabled() {
        let err = detect_format("2024_10.xlsx", CSV_ONLY).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
        assert!(err.to_string().contains(".csv"));

        assert_eq!(detect_format("2024_10.xlsx", ALL).unwrap(), InputFormat::Xlsx);
        assert_eq!(detect_format("old.xls", ALL).unwrap(), InputFormat::Xls);
    }

    #[test]
    fn missing_or_unknown_extension_rejected() {
        assert!(detect_format("export", ALL).is_err());
        assert!(detect_format("export.pdf", ALL).is_err());
        assert!(detect_format("", ALL).is_err());
    }

    #[test]
    fn extension_parsing() {
        assert_eq!(InputFormat::from_extension(".CSV"), Some(InputFormat::Csv));
        assert_eq!(InputFormat::from_extension(" xlsx "), Some(InputFormat::Xlsx));
        assert_eq!(InputFormat::from_extension("txt"), None);
        assert!(InputFormat::Xls.is_spreadsheet());
        assert!(!InputFormat::Csv.is_spreadsheet());
    }

    #[test]
    fn sanitize_path_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\jan\\2024_10.csv"), "2024_10.csv");
        assert_eq!(sanitize_filename("..hidden.csv"), "hidden.csv");
        assert_eq!(sanitize_filename(""), "report.csv");
        assert_eq!(sanitize_filename("file\0name.csv"), "filename.csv");
    }

    #[test]
    fn sanitize_preserves_normal_names() {
        assert_eq!(sanitize_filename("2024_10.csv"), "2024_10.csv");
        assert_eq!(sanitize_filename("raport (1).csv"), "raport (1).csv");
    }

    #[test]
    fn report_name_swaps_extension() {
        assert_eq!(report_file_name("2024_10.csv"), "2024_10.xlsx");
        assert_eq!(report_file_name("archiwum.2024.csv"), "archiwum.2024.xlsx");
        assert_eq!(report_file_name(""), "report.xlsx");
    }
}

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use super::{ImportError, InputFormat};
use crate::pipeline::RawRow;

/// Read the first column of `path` as report rows.
///
/// `has_header` skips the first physical row, matching how the export is
/// produced (a column caption precedes the report text).
pub fn read_rows(
    path: &Path,
    format: InputFormat,
    has_header: bool,
) -> Result<Vec<RawRow>, ImportError> {
    let rows = match format {
        InputFormat::Csv => {
            let file = std::fs::File::open(path)?;
            read_csv_rows(file, has_header)?
        }
        InputFormat::Xlsx | InputFormat::Xls => read_sheet_rows(path, has_header)?,
    };

    tracing::debug!(
        path = %path.display(),
        format = format.as_str(),
        rows = rows.len(),
        "Input rows read"
    );
    Ok(rows)
}

/// First column of every CSV record. Other columns are ignored.
///
/// Records are read as bytes and decoded lossily so a stray non-UTF-8 byte
/// in an unrelated line does not abort the file.
pub fn read_csv_rows<R: Read>(input: R, has_header: bool) -> Result<Vec<RawRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_reader(input);

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(rows.len() + 1);
        let text = record
            .get(0)
            .map(|field| String::from_utf8_lossy(field).trim().to_string())
            .unwrap_or_default();
        rows.push(RawRow::new(line, text));
    }
    Ok(rows)
}

/// First column of the first worksheet of an `.xlsx`/`.xls` workbook.
pub fn read_sheet_rows(path: &Path, has_header: bool) -> Result<Vec<RawRow>, ImportError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::EmptyWorkbook)??;

    // the range begins at the first used row, not at row 1
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let skip = usize::from(has_header);
    let rows = range
        .rows()
        .enumerate()
        .skip(skip)
        .map(|(i, cells)| {
            let text = cells.first().map(cell_text).unwrap_or_default();
            RawRow::new(first_row + i + 1, text.trim())
        })
        .collect();
    Ok(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

use std::collections::HashSet;

use super::fields::{parse_mpal, parse_stops};
use super::types::{AttributedRecord, AttributedRow};
use super::PipelineError;

/// Records built from the attributed rows, and how many duplicates were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltRecords {
    pub records: Vec<AttributedRecord>,
    pub duplicates: usize,
}

/// Drop rows whose token sequence was already seen. First occurrence wins.
///
/// The export repeats some lines across page breaks, so duplicates are
/// expected and not an error.
pub fn dedup_rows(rows: Vec<AttributedRow>) -> (Vec<AttributedRow>, usize) {
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(rows.len());
    let mut kept = Vec::with_capacity(rows.len());
    let mut duplicates = 0;

    for row in rows {
        if seen.contains(&row.tokens) {
            duplicates += 1;
            continue;
        }
        seen.insert(row.tokens.clone());
        kept.push(row);
    }

    (kept, duplicates)
}

/// Deduplicate, then coerce mpal/stops into an [`AttributedRecord`] per row.
///
/// A single unparseable token fails the whole build.
pub fn build_records(rows: Vec<AttributedRow>) -> Result<BuiltRecords, PipelineError> {
    let (rows, duplicates) = dedup_rows(rows);

    let records = rows
        .into_iter()
        .map(|row| {
            let mpal = parse_mpal(&row.fields.mpal).map_err(|source| PipelineError::Extraction {
                line: row.line,
                source,
            })?;
            let stops =
                parse_stops(&row.fields.stops).map_err(|source| PipelineError::Extraction {
                    line: row.line,
                    source,
                })?;
            Ok(AttributedRecord {
                registration: row.registration,
                date: row.date,
                mpal,
                stops,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    Ok(BuiltRecords {
        records,
        duplicates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fields::{extract_fields, Field};

    fn row(line: usize, reg: &str, date: &str, values: &str) -> AttributedRow {
        let tokens: Vec<String> = values.split_whitespace().map(str::to_string).collect();
        let fields = extract_fields(&tokens).unwrap();
        AttributedRow {
            line,
            registration: reg.into(),
            date: date.into(),
            tokens,
            fields,
        }
    }

    #[test]
    fn identical_tokens_collapse_to_first() {
        let built = build_records(vec![
            row(3, "TK1", "2024-09-01", "10,5 x x x x 2"),
            row(9, "TK2", "2024-09-05", "10,5 x x x x 2"),
        ])
        .unwrap();
        assert_eq!(built.records.len(), 1);
        assert_eq!(built.duplicates, 1);
        assert_eq!(built.records[0].registration, "TK1");
    }

    #[test]
    fn distinct_rows_all_kept_in_order() {
        let built = build_records(vec![
            row(1, "TK1", "2024-09-01", "10,5 x x x x 2"),
            row(2, "TK1", "2024-09-01", "12,0 x x x x 1"),
        ])
        .unwrap();
        assert_eq!(built.duplicates, 0);
        assert_eq!(built.records[0].mpal, 10.5);
        assert_eq!(built.records[1].mpal, 12.0);
        assert_eq!(built.records[1].stops, 1);
    }

    #[test]
    fn bad_stops_token_fails_with_line() {
        let err = build_records(vec![
            row(1, "TK1", "2024-09-01", "10,5 x x x x 2"),
            row(7, "TK1", "2024-09-01", "10,6 x x x x 2,5"),
        ])
        .unwrap_err();
        match err {
            PipelineError::Extraction { line, source } => {
                assert_eq!(line, 7);
                assert_eq!(source.field, Field::Stops);
                assert_eq!(source.token, "2,5");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_mpal_token_fails() {
        let err = build_records(vec![row(4, "TK1", "2024-09-01", "abc x x x x 2")]).unwrap_err();
        assert!(err.to_string().contains("line 4"));
    }
}

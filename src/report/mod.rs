//! Report assembly: turns aggregate views into named sheet tables, then
//! writes them as an `.xlsx` workbook.
//!
//! [`assemble`] is pure and carries check categories as data; styling lives
//! in [`workbook`] only.

pub mod workbook;

pub use workbook::{report_bytes, save_report};

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::pipeline::{CheckCell, DayKey, ReportViews};

pub const SHEET_SUMMARY: &str = "mpal_stop";
pub const SHEET_DAILY_MPAL: &str = "mpal";
pub const SHEET_MPAL_PER_DAY: &str = "mpal-perday";
pub const SHEET_DAILY_STOPS: &str = "stops";
pub const SHEET_DELIVERY_CHECK: &str = "del_rec";

/// Sheet order in the written workbook.
pub const SHEET_NAMES: [&str; 5] = [
    SHEET_SUMMARY,
    SHEET_DAILY_MPAL,
    SHEET_MPAL_PER_DAY,
    SHEET_DAILY_STOPS,
    SHEET_DELIVERY_CHECK,
];

/// Years a spreadsheet date cell can hold.
pub const EXCEL_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

const REG_HEADER: &str = "reg_number";
const DATE_HEADER: &str = "date";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Workbook write failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Date(NaiveDate),
    /// Delivery-check count with its display category.
    Check(CheckCell),
    Empty,
}

impl From<&DayKey> for CellValue {
    fn from(day: &DayKey) -> Self {
        match day {
            DayKey::Calendar(date) if EXCEL_YEARS.contains(&date.year()) => Self::Date(*date),
            DayKey::Calendar(_) => Self::Text(day.to_string()),
            DayKey::Label(label) => Self::Text(label.clone()),
        }
    }
}

/// One output sheet: a header row followed by data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: &'static str,
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    fn new(name: &'static str, header: Vec<String>) -> Self {
        Self {
            name,
            header,
            rows: Vec::new(),
        }
    }
}

/// Lay out all five views as sheet tables, in [`SHEET_NAMES`] order.
pub fn assemble(views: &ReportViews) -> Vec<SheetTable> {
    vec![
        summary_sheet(views),
        daily_mpal_sheet(views),
        mpal_per_day_sheet(views),
        daily_stops_sheet(views),
        delivery_check_sheet(views),
    ]
}

fn summary_sheet(views: &ReportViews) -> SheetTable {
    let mut sheet = SheetTable::new(
        SHEET_SUMMARY,
        vec![REG_HEADER.into(), "mpal".into(), "stops".into()],
    );
    sheet.rows = views
        .summary
        .rows
        .iter()
        .map(|r| {
            vec![
                CellValue::Text(r.registration.clone()),
                CellValue::Number(r.mpal),
                CellValue::Integer(r.stops),
            ]
        })
        .collect();
    sheet
}

fn daily_mpal_sheet(views: &ReportViews) -> SheetTable {
    let pivot = &views.daily_mpal;
    let mut sheet = SheetTable::new(SHEET_DAILY_MPAL, with_leading(DATE_HEADER, &pivot.columns));
    sheet.rows = pivot
        .rows
        .iter()
        .zip(&pivot.cells)
        .map(|(date, cells)| {
            std::iter::once(CellValue::Text(date.clone()))
                .chain(cells.iter().map(|v| CellValue::Number(*v)))
                .collect()
        })
        .collect();
    sheet
}

fn mpal_per_day_sheet(views: &ReportViews) -> SheetTable {
    let breakdown = &views.mpal_per_day;
    let mut header = vec![REG_HEADER.to_string(), DATE_HEADER.to_string()];
    header.extend(breakdown.value_columns());

    let mut sheet = SheetTable::new(SHEET_MPAL_PER_DAY, header);
    sheet.rows = breakdown
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                CellValue::Text(row.registration.clone()),
                CellValue::Text(row.date.clone()),
            ];
            cells.extend(row.values.iter().map(|v| match v {
                Some(mpal) => CellValue::Number(*mpal),
                None => CellValue::Empty,
            }));
            cells
        })
        .collect();
    sheet
}

fn daily_stops_sheet(views: &ReportViews) -> SheetTable {
    let pivot = &views.daily_stops;
    let mut sheet = SheetTable::new(SHEET_DAILY_STOPS, with_leading(DATE_HEADER, &pivot.columns));
    sheet.rows = pivot
        .rows
        .iter()
        .zip(&pivot.cells)
        .map(|(day, cells)| {
            std::iter::once(CellValue::from(day))
                .chain(cells.iter().map(|v| CellValue::Integer(*v)))
                .collect()
        })
        .collect();
    sheet
}

fn delivery_check_sheet(views: &ReportViews) -> SheetTable {
    let grid = &views.delivery_check;
    let mut sheet = SheetTable::new(SHEET_DELIVERY_CHECK, with_leading(REG_HEADER, &grid.columns));
    sheet.rows = grid
        .rows
        .iter()
        .zip(&grid.cells)
        .map(|(reg, cells)| {
            std::iter::once(CellValue::Text(reg.clone()))
                .chain(cells.iter().map(|c| CellValue::Check(*c)))
                .collect()
        })
        .collect();
    sheet
}

fn with_leading(first: &str, rest: &[String]) -> Vec<String> {
    std::iter::once(first.to_string())
        .chain(rest.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{aggregate, AttributedRecord, CheckCategory, ReportOptions};

    fn views() -> ReportViews {
        let rec = |reg: &str, date: &str, mpal, stops| AttributedRecord {
            registration: reg.into(),
            date: date.into(),
            mpal,
            stops,
        };
        aggregate(
            &[
                rec("TK1", "2024-09-01", 10.5, 2),
                rec("TK1", "2024-09-01", 1.5, 1),
                rec("TK2", "2024-09-02", 3.0, 4),
            ],
            &ReportOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn five_sheets_in_order() {
        let sheets = assemble(&views());
        let names: Vec<&str> = sheets.iter().map(|s| s.name).collect();
        assert_eq!(names, SHEET_NAMES);
    }

    #[test]
    fn summary_sheet_layout() {
        let sheets = assemble(&views());
        let summary = &sheets[0];
        assert_eq!(summary.header, ["reg_number", "mpal", "stops"]);
        assert_eq!(
            summary.rows[0],
            [
                CellValue::Text("TK1".into()),
                CellValue::Number(12.0),
                CellValue::Integer(3)
            ]
        );
    }

    #[test]
    fn breakdown_sheet_pads_with_empty_cells() {
        let sheets = assemble(&views());
        let sheet = &sheets[2];
        assert_eq!(sheet.header, ["reg_number", "date", "mpal_1", "mpal_2"]);
        assert_eq!(sheet.rows[1][2], CellValue::Number(3.0));
        assert_eq!(sheet.rows[1][3], CellValue::Empty);
        assert!(sheet.rows.iter().all(|r| r.len() == sheet.header.len()));
    }

    #[test]
    fn stops_sheet_uses_calendar_dates() {
        let sheets = assemble(&views());
        let sheet = &sheets[3];
        assert_eq!(sheet.header, ["date", "TK1", "TK2"]);
        assert_eq!(
            sheet.rows[0][0],
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap())
        );
        assert_eq!(sheet.rows[0][1], CellValue::Integer(3));
        assert_eq!(sheet.rows[0][2], CellValue::Integer(0));
    }

    #[test]
    fn dates_outside_excel_range_become_text() {
        let early = DayKey::from_label("01-01-1899");
        assert!(matches!(early, DayKey::Calendar(_)));
        assert_eq!(CellValue::from(&early), CellValue::Text("1899-01-01".into()));

        let first = DayKey::from_label("01-01-1900");
        assert_eq!(
            CellValue::from(&first),
            CellValue::Date(NaiveDate::from_ymd_opt(1900, 1, 1).unwrap())
        );
    }

    #[test]
    fn check_sheet_carries_categories() {
        let sheets = assemble(&views());
        let sheet = &sheets[4];
        assert_eq!(sheet.header, ["reg_number", "2024-09-01", "2024-09-02"]);
        let CellValue::Check(cell) = &sheet.rows[0][1] else {
            panic!("expected check cell");
        };
        assert_eq!(cell.category, CheckCategory::Complete);
        let CellValue::Check(cell) = &sheet.rows[0][2] else {
            panic!("expected check cell");
        };
        assert_eq!(cell.category, CheckCategory::Missing);
    }
}

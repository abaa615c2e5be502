//! Grouped sums, counts and pivots over the full record set.
//!
//! Every view is a pure function of `&[AttributedRecord]`. Grouping goes
//! through `BTreeMap`/`BTreeSet` so row and column order never depends on
//! hashing or on the order records happened to arrive in.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::types::AttributedRecord;
use super::PipelineError;

/// Date formats tried, in order, on the first token of a date label.
///
/// Two-digit-year forms go first: `%Y` would otherwise read `"03-03-25"` as
/// the year 3.
const DATE_FORMATS: [&str; 7] = [
    "%d-%m-%y", "%d.%m.%y", "%d/%m/%y", "%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%Y",
];

/// Knobs that change view shape without touching the numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Emit a zero row for every calendar day between the first and last
    /// date of the stops pivot.
    pub fill_date_gaps: bool,
}

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationTotals {
    pub registration: String,
    pub mpal: f64,
    pub stops: i64,
}

/// Totals per registration, ordered by registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryByRegistration {
    pub rows: Vec<RegistrationTotals>,
}

impl SummaryByRegistration {
    pub fn get(&self, registration: &str) -> Option<&RegistrationTotals> {
        self.rows.iter().find(|r| r.registration == registration)
    }
}

/// Rectangular table keyed by row label and column label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot<R, T> {
    pub rows: Vec<R>,
    pub columns: Vec<String>,
    /// `cells[i][j]` belongs to `rows[i]` and `columns[j]`.
    pub cells: Vec<Vec<T>>,
}

impl<R: PartialEq, T> Pivot<R, T> {
    pub fn cell(&self, row: &R, column: &str) -> Option<&T> {
        let i = self.rows.iter().position(|r| r == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        self.cells.get(i)?.get(j)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Calendar-normalized day. Parsed dates sort chronologically and ahead of
/// labels that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DayKey {
    Calendar(NaiveDate),
    Label(String),
}

impl DayKey {
    pub fn from_label(label: &str) -> Self {
        match parse_calendar_date(label) {
            Some(date) => Self::Calendar(date),
            None => Self::Label(label.to_string()),
        }
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Calendar(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// Date label rows × registration columns, summed mpal.
pub type DailyMpalPivot = Pivot<String, f64>;

/// Calendar day rows × registration columns, summed stops.
pub type DailyStopsPivot = Pivot<DayKey, i64>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MpalBreakdownRow {
    pub registration: String,
    pub date: String,
    /// Exactly `MpalPerDayBreakdown::width` entries; `None` is padding.
    pub values: Vec<Option<f64>>,
}

/// Individual mpal values per (registration, date), padded to equal width.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MpalPerDayBreakdown {
    pub width: usize,
    pub rows: Vec<MpalBreakdownRow>,
}

impl MpalPerDayBreakdown {
    /// `mpal_1 .. mpal_<width>`
    pub fn value_columns(&self) -> Vec<String> {
        (1..=self.width).map(|i| format!("mpal_{i}")).collect()
    }
}

/// Display category of a delivery-check cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckCategory {
    Missing,
    Single,
    Complete,
    Excess,
}

impl CheckCategory {
    pub const ALL: [CheckCategory; 4] = [
        CheckCategory::Missing,
        CheckCategory::Single,
        CheckCategory::Complete,
        CheckCategory::Excess,
    ];

    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Self::Missing,
            1 => Self::Single,
            2 => Self::Complete,
            _ => Self::Excess,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Single => "single",
            Self::Complete => "complete",
            Self::Excess => "excess",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckCell {
    pub count: usize,
    pub category: CheckCategory,
}

impl CheckCell {
    pub fn from_count(count: usize) -> Self {
        Self {
            count,
            category: CheckCategory::from_count(count),
        }
    }
}

/// Registration rows × date label columns, record counts.
pub type DeliveryCheckGrid = Pivot<String, CheckCell>;

/// All views written to the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportViews {
    pub summary: SummaryByRegistration,
    pub daily_mpal: DailyMpalPivot,
    pub mpal_per_day: MpalPerDayBreakdown,
    pub daily_stops: DailyStopsPivot,
    pub delivery_check: DeliveryCheckGrid,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Fails only when a stop total does not fit in `i64`.
pub fn aggregate(
    records: &[AttributedRecord],
    options: &ReportOptions,
) -> Result<ReportViews, PipelineError> {
    Ok(ReportViews {
        summary: summary_by_registration(records)?,
        daily_mpal: daily_mpal_pivot(records),
        mpal_per_day: mpal_per_day_breakdown(records),
        daily_stops: daily_stops_pivot(records, options.fill_date_gaps)?,
        delivery_check: delivery_check_grid(records),
    })
}

fn add_stops(total: i64, record: &AttributedRecord, scope: &str) -> Result<i64, PipelineError> {
    total
        .checked_add(record.stops)
        .ok_or_else(|| PipelineError::StopsOverflow {
            registration: record.registration.clone(),
            scope: scope.to_string(),
        })
}

pub fn summary_by_registration(
    records: &[AttributedRecord],
) -> Result<SummaryByRegistration, PipelineError> {
    let mut totals: BTreeMap<&str, (f64, i64)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(record.registration.as_str()).or_insert((0.0, 0));
        entry.0 += record.mpal;
        entry.1 = add_stops(entry.1, record, "all dates")?;
    }

    Ok(SummaryByRegistration {
        rows: totals
            .into_iter()
            .map(|(registration, (mpal, stops))| RegistrationTotals {
                registration: registration.to_string(),
                mpal,
                stops,
            })
            .collect(),
    })
}

pub fn daily_mpal_pivot(records: &[AttributedRecord]) -> DailyMpalPivot {
    let mut sums: BTreeMap<(String, String), f64> = BTreeMap::new();
    for record in records {
        *sums
            .entry((record.date.clone(), record.registration.clone()))
            .or_insert(0.0) += record.mpal;
    }
    pivot(sums, std::iter::empty(), 0.0)
}

pub fn daily_stops_pivot(
    records: &[AttributedRecord],
    fill_date_gaps: bool,
) -> Result<DailyStopsPivot, PipelineError> {
    let mut sums: BTreeMap<(DayKey, String), i64> = BTreeMap::new();
    for record in records {
        let sum = sums
            .entry((DayKey::from_label(&record.date), record.registration.clone()))
            .or_insert(0);
        *sum = add_stops(*sum, record, &record.date)?;
    }

    let gap_days = if fill_date_gaps {
        calendar_span(sums.keys().map(|(day, _)| day))
    } else {
        Vec::new()
    };
    Ok(pivot(sums, gap_days, 0))
}

/// Two passes: size the widest group first, then build fixed-width rows.
pub fn mpal_per_day_breakdown(records: &[AttributedRecord]) -> MpalPerDayBreakdown {
    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.registration.as_str(), record.date.as_str()))
            .or_default()
            .push(record.mpal);
    }

    let width = groups.values().map(Vec::len).max().unwrap_or(0);

    let rows = groups
        .into_iter()
        .map(|((registration, date), values)| {
            let mut padded: Vec<Option<f64>> = Vec::with_capacity(width);
            padded.extend(values.into_iter().map(Some));
            padded.resize(width, None);
            MpalBreakdownRow {
                registration: registration.to_string(),
                date: date.to_string(),
                values: padded,
            }
        })
        .collect();

    MpalPerDayBreakdown { width, rows }
}

/// Counts records per (registration, date); the `stops` field is not summed.
pub fn delivery_check_grid(records: &[AttributedRecord]) -> DeliveryCheckGrid {
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for record in records {
        *counts
            .entry((record.registration.clone(), record.date.clone()))
            .or_insert(0) += 1;
    }

    let cells = counts
        .into_iter()
        .map(|(key, count)| (key, CheckCell::from_count(count)))
        .collect();
    pivot(cells, std::iter::empty(), CheckCell::from_count(0))
}

/// Parse the leading token of a date label, e.g. `"03-03-25 KM Stopy"`.
pub fn parse_calendar_date(label: &str) -> Option<NaiveDate> {
    let token = label.split_whitespace().next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

fn calendar_span<'a>(days: impl Iterator<Item = &'a DayKey>) -> Vec<DayKey> {
    let dates: BTreeSet<NaiveDate> = days
        .filter_map(|day| match day {
            DayKey::Calendar(date) => Some(*date),
            DayKey::Label(_) => None,
        })
        .collect();

    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| d <= last)
        .map(DayKey::Calendar)
        .collect()
}

fn pivot<R, T>(
    cells: BTreeMap<(R, String), T>,
    extra_rows: impl IntoIterator<Item = R>,
    fill: T,
) -> Pivot<R, T>
where
    R: Ord + Clone,
    T: Clone,
{
    let mut rows: BTreeSet<R> = cells.keys().map(|(r, _)| r.clone()).collect();
    rows.extend(extra_rows);
    let columns: BTreeSet<String> = cells.keys().map(|(_, c)| c.clone()).collect();

    let rows: Vec<R> = rows.into_iter().collect();
    let columns: Vec<String> = columns.into_iter().collect();

    let values = rows
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| {
                    cells
                        .get(&(r.clone(), c.clone()))
                        .cloned()
                        .unwrap_or_else(|| fill.clone())
                })
                .collect()
        })
        .collect();

    Pivot {
        rows,
        columns,
        cells: values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(reg: &str, date: &str, mpal: f64, stops: i64) -> AttributedRecord {
        AttributedRecord {
            registration: reg.into(),
            date: date.into(),
            mpal,
            stops,
        }
    }

    fn sample() -> Vec<AttributedRecord> {
        vec![
            rec("TK2", "2024-09-02", 5.0, 1),
            rec("TK1", "2024-09-01", 10.5, 2),
            rec("TK1", "2024-09-01", 1.5, 3),
            rec("TK1", "2024-09-03", 4.0, 1),
            rec("TK2", "2024-09-02", 2.0, 4),
            rec("TK2", "2024-09-02", 1.0, 0),
        ]
    }

    #[test]
    fn category_mapping_is_exact() {
        let got: Vec<&str> = [0, 1, 2, 3, 7]
            .iter()
            .map(|&n| CheckCategory::from_count(n).as_str())
            .collect();
        assert_eq!(got, ["missing", "single", "complete", "excess", "excess"]);
    }

    #[test]
    fn summary_sums_per_registration() {
        let summary = summary_by_registration(&sample()).unwrap();
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[0].registration, "TK1");
        let tk1 = summary.get("TK1").unwrap();
        assert_eq!(tk1.mpal, 16.0);
        assert_eq!(tk1.stops, 6);
        let tk2 = summary.get("TK2").unwrap();
        assert_eq!(tk2.mpal, 8.0);
        assert_eq!(tk2.stops, 5);
    }

    #[test]
    fn mpal_pivot_dates_as_rows_zero_filled() {
        let pivot = daily_mpal_pivot(&sample());
        assert_eq!(pivot.rows, ["2024-09-01", "2024-09-02", "2024-09-03"]);
        assert_eq!(pivot.columns, ["TK1", "TK2"]);
        assert_eq!(pivot.cell(&"2024-09-01".to_string(), "TK1"), Some(&12.0));
        assert_eq!(pivot.cell(&"2024-09-01".to_string(), "TK2"), Some(&0.0));
        assert_eq!(pivot.cell(&"2024-09-02".to_string(), "TK2"), Some(&8.0));
    }

    #[test]
    fn stops_pivot_orders_chronologically() {
        let records = vec![
            rec("TK1", "10-09-24", 1.0, 2),
            rec("TK1", "02-09-24", 1.0, 3),
            rec("TK1", "01-10-24", 1.0, 1),
        ];
        let pivot = daily_stops_pivot(&records, false).unwrap();
        let days: Vec<String> = pivot.rows.iter().map(ToString::to_string).collect();
        assert_eq!(days, ["2024-09-02", "2024-09-10", "2024-10-01"]);
        assert_eq!(pivot.cells[0][0], 3);
    }

    #[test]
    fn stops_pivot_unparsed_labels_sort_last() {
        let records = vec![
            rec("TK1", "brak daty", 1.0, 2),
            rec("TK1", "2024-09-05", 1.0, 1),
        ];
        let pivot = daily_stops_pivot(&records, false).unwrap();
        assert_eq!(
            pivot.rows[0],
            DayKey::Calendar(NaiveDate::from_ymd_opt(2024, 9, 5).unwrap())
        );
        assert_eq!(pivot.rows[1], DayKey::Label("brak daty".into()));
    }

    #[test]
    fn stops_pivot_fills_calendar_gaps_when_asked() {
        let records = vec![
            rec("TK1", "2024-09-01", 1.0, 2),
            rec("TK2", "2024-09-04", 1.0, 5),
        ];
        let pivot = daily_stops_pivot(&records, true).unwrap();
        assert_eq!(pivot.rows.len(), 4);
        let gap = DayKey::Calendar(NaiveDate::from_ymd_opt(2024, 9, 2).unwrap());
        assert_eq!(pivot.cell(&gap, "TK1"), Some(&0));
        assert_eq!(pivot.cell(&gap, "TK2"), Some(&0));

        let plain = daily_stops_pivot(&records, false).unwrap();
        assert_eq!(plain.rows.len(), 2);
    }

    #[test]
    fn breakdown_pads_to_widest_group() {
        let breakdown = mpal_per_day_breakdown(&sample());
        assert_eq!(breakdown.width, 3);
        assert_eq!(breakdown.value_columns(), ["mpal_1", "mpal_2", "mpal_3"]);
        assert_eq!(breakdown.rows.len(), 3);

        let first = &breakdown.rows[0];
        assert_eq!((first.registration.as_str(), first.date.as_str()), ("TK1", "2024-09-01"));
        assert_eq!(first.values, [Some(10.5), Some(1.5), None]);

        let tk2 = &breakdown.rows[2];
        assert_eq!(tk2.values, [Some(5.0), Some(2.0), Some(1.0)]);
        assert!(breakdown.rows.iter().all(|r| r.values.len() == 3));
    }

    #[test]
    fn breakdown_of_nothing_is_empty() {
        let breakdown = mpal_per_day_breakdown(&[]);
        assert_eq!(breakdown.width, 0);
        assert!(breakdown.rows.is_empty());
    }

    #[test]
    fn check_grid_counts_records_not_stops() {
        let grid = delivery_check_grid(&sample());
        assert_eq!(grid.rows, ["TK1", "TK2"]);
        assert_eq!(grid.columns, ["2024-09-01", "2024-09-02", "2024-09-03"]);

        let tk1 = "TK1".to_string();
        let tk2 = "TK2".to_string();
        let cell = grid.cell(&tk1, "2024-09-01").unwrap();
        assert_eq!(cell.count, 2);
        assert_eq!(cell.category, CheckCategory::Complete);
        assert_eq!(grid.cell(&tk1, "2024-09-02").unwrap().category, CheckCategory::Missing);
        assert_eq!(grid.cell(&tk1, "2024-09-03").unwrap().category, CheckCategory::Single);
        assert_eq!(grid.cell(&tk2, "2024-09-02").unwrap().category, CheckCategory::Excess);
    }

    #[test]
    fn calendar_date_formats() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);
        assert_eq!(parse_calendar_date("2024-09-01"), d(2024, 9, 1));
        assert_eq!(parse_calendar_date("03-03-25 KM Stopy"), d(2025, 3, 3));
        assert_eq!(parse_calendar_date("03-03-2025"), d(2025, 3, 3));
        assert_eq!(parse_calendar_date("15.09.2024"), d(2024, 9, 15));
        assert_eq!(parse_calendar_date("KM Stopy"), None);
        assert_eq!(parse_calendar_date(""), None);
    }

    #[test]
    fn stop_total_overflow_is_an_error() {
        let records = vec![
            rec("TK1", "2024-09-01", 1.0, i64::MAX),
            rec("TK1", "2024-09-01", 1.0, 1),
        ];
        let err = summary_by_registration(&records).unwrap_err();
        assert!(matches!(
            &err,
            PipelineError::StopsOverflow { registration, .. } if registration == "TK1"
        ));

        let err = daily_stops_pivot(&records, false).unwrap_err();
        let PipelineError::StopsOverflow { scope, .. } = err else {
            panic!("expected stops overflow");
        };
        assert_eq!(scope, "2024-09-01");
    }

    #[test]
    fn large_stop_totals_that_fit_are_kept() {
        let records = vec![
            rec("TK1", "2024-09-01", 1.0, i64::MAX - 1),
            rec("TK1", "2024-09-01", 1.0, 1),
        ];
        let options = ReportOptions::default();
        let views = aggregate(&records, &options).unwrap();
        assert_eq!(views.summary.get("TK1").unwrap().stops, i64::MAX);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let options = ReportOptions::default();
        let a = aggregate(&sample(), &options).unwrap();
        let b = aggregate(&sample(), &options).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}

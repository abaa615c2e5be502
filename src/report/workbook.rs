use std::path::Path;

use chrono::Datelike;
use rust_xlsxwriter::{Color, ExcelDateTime, Format, Workbook, Worksheet};

use super::{assemble, CellValue, ReportError, SheetTable, SHEET_DELIVERY_CHECK};
use crate::pipeline::{CheckCategory, ReportViews};

/// Background color of a delivery-check cell.
pub fn category_color(category: CheckCategory) -> Color {
    match category {
        CheckCategory::Missing => Color::Orange,
        CheckCategory::Single => Color::Red,
        CheckCategory::Complete => Color::Green,
        CheckCategory::Excess => Color::Blue,
    }
}

/// Color name shown in the sheet legend.
pub fn category_color_name(category: CheckCategory) -> &'static str {
    match category {
        CheckCategory::Missing => "orange",
        CheckCategory::Single => "red",
        CheckCategory::Complete => "green",
        CheckCategory::Excess => "blue",
    }
}

/// Build the workbook in memory and write it to `path`.
pub fn save_report(views: &ReportViews, path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut workbook = build_workbook(&assemble(views))?;
    workbook.save(path)?;
    tracing::info!(path = %path.display(), "Report written");
    Ok(())
}

/// Serialized `.xlsx` bytes without touching the filesystem.
pub fn report_bytes(views: &ReportViews) -> Result<Vec<u8>, ReportError> {
    let mut workbook = build_workbook(&assemble(views))?;
    Ok(workbook.save_to_buffer()?)
}

pub fn build_workbook(sheets: &[SheetTable]) -> Result<Workbook, ReportError> {
    let mut workbook = Workbook::new();
    let formats = Formats::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name)?;
        write_sheet(worksheet, sheet, &formats)?;
        if sheet.name == SHEET_DELIVERY_CHECK {
            write_legend(worksheet, sheet.header.len() as u16 + 1, &formats)?;
        }
        worksheet.autofit();
    }

    Ok(workbook)
}

struct Formats {
    header: Format,
    date: Format,
    decimal: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format("yyyy-mm-dd"),
            decimal: Format::new().set_num_format("0.0#"),
        }
    }

    fn check(category: CheckCategory) -> Format {
        Format::new().set_background_color(category_color(category))
    }
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &SheetTable,
    formats: &Formats,
) -> Result<(), ReportError> {
    for (col, title) in sheet.header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, title, &formats.header)?;
    }

    for (i, cells) in sheet.rows.iter().enumerate() {
        let row = i as u32 + 1;
        for (j, cell) in cells.iter().enumerate() {
            write_cell(worksheet, row, j as u16, cell, formats)?;
        }
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    formats: &Formats,
) -> Result<(), ReportError> {
    match cell {
        CellValue::Text(text) => {
            worksheet.write_string(row, col, text)?;
        }
        CellValue::Number(value) => {
            worksheet.write_number_with_format(row, col, *value, &formats.decimal)?;
        }
        CellValue::Integer(value) => {
            worksheet.write_number(row, col, *value as f64)?;
        }
        CellValue::Date(date) => {
            let dt = ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
            worksheet.write_datetime_with_format(row, col, &dt, &formats.date)?;
        }
        CellValue::Check(check) => {
            let format = Formats::check(check.category);
            worksheet.write_number_with_format(row, col, check.count as f64, &format)?;
        }
        CellValue::Empty => {}
    }
    Ok(())
}

/// Category → color table beside the grid, so the meaning of each color
/// survives viewers that drop cell styling.
fn write_legend(
    worksheet: &mut Worksheet,
    first_col: u16,
    formats: &Formats,
) -> Result<(), ReportError> {
    worksheet.write_string_with_format(0, first_col, "category", &formats.header)?;
    worksheet.write_string_with_format(0, first_col + 1, "records", &formats.header)?;
    worksheet.write_string_with_format(0, first_col + 2, "color", &formats.header)?;

    let counts = ["0", "1", "2", ">2"];
    for (i, (category, count)) in CheckCategory::ALL.iter().zip(counts).enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string_with_format(
            row,
            first_col,
            category.as_str(),
            &Formats::check(*category),
        )?;
        worksheet.write_string(row, first_col + 1, count)?;
        worksheet.write_string(row, first_col + 2, category_color_name(*category))?;
    }
    Ok(())
}

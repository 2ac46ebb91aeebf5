use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};
use std::path::Path;

use crate::pipeline::{CellValue, Collected};

const ROW_FILL: u32 = 0x006400;
const FOCUS_FILL: u32 = 0x8B0000;
/// Filled cells appended after the data columns
const PADDING_COLUMNS: u16 = 3;

fn cell_format(fill: u32) -> Format {
    Format::new()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(fill))
        .set_border_top(FormatBorder::Thin)
        .set_border_top_color(Color::Black)
        .set_border_bottom(FormatBorder::Thin)
        .set_border_bottom_color(Color::Black)
        .set_border_left(FormatBorder::Thin)
        .set_border_left_color(Color::Black)
}

fn padding_format(fill: u32) -> Format {
    Format::new()
        .set_background_color(Color::RGB(fill))
        .set_border_top(FormatBorder::Thin)
        .set_border_top_color(Color::Black)
        .set_border_bottom(FormatBorder::Thin)
        .set_border_bottom_color(Color::Black)
}

/// Spreadsheet formula for a clickable link
pub fn hyperlink_formula(url: &str, label: &str) -> String {
    format!(
        "=HYPERLINK(\"{}\", \"{}\")",
        url.replace('"', "\"\""),
        label.replace('"', "\"\"")
    )
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &CellValue, format: &Format) -> Result<()> {
    let written = match cell {
        CellValue::Empty => sheet.write_blank(row, col, format),
        CellValue::Integer(i) => sheet.write_number_with_format(row, col, *i as f64, format),
        CellValue::Real(f) => sheet.write_number_with_format(row, col, *f, format),
        CellValue::Text(s) => sheet.write_string_with_format(row, col, s, format),
        CellValue::Link { url, label } => {
            sheet.write_formula_with_format(row, col, hyperlink_formula(url, label).as_str(), format)
        }
    };
    written.with_context(|| format!("Failed to write cell ({}, {})", row, col))?;
    Ok(())
}

/// Write the export workbook; rows of the focus entity get the focus fill
pub fn write_xlsx(path: &Path, collected: &Collected) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in collected.header.iter().enumerate() {
        sheet
            .write_string(0, col as u16, name)
            .context("Failed to write header")?;
    }

    let row_format = cell_format(ROW_FILL);
    let focus_format = cell_format(FOCUS_FILL);
    let row_padding = padding_format(ROW_FILL);
    let focus_padding = padding_format(FOCUS_FILL);

    for (index, row) in collected.rows.iter().enumerate() {
        let excel_row = index as u32 + 1;
        let (format, padding) = if row.focused {
            (&focus_format, &focus_padding)
        } else {
            (&row_format, &row_padding)
        };

        for (col, cell) in row.cells.iter().enumerate() {
            write_cell(sheet, excel_row, col as u16, cell, format)?;
        }

        let first_pad = row.cells.len() as u16;
        for col in first_pad..first_pad + PADDING_COLUMNS {
            sheet
                .write_blank(excel_row, col, padding)
                .context("Failed to write row padding")?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save workbook {:?}", path))?;
    Ok(())
}

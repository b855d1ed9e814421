use anyhow::{Context, Result};
use log::info;
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use std::path::Path;

use crate::projection::{DisplayValue, TableProjection};

/// Excel caps sheet names at 31 characters.
const MAX_SHEET_NAME: usize = 31;

/// One named table destined for its own worksheet.
#[derive(Debug, Clone)]
pub struct SheetData {
    pub name: String,
    pub table: TableProjection,
}

impl SheetData {
    pub fn new(name: impl Into<String>, table: TableProjection) -> Self {
        SheetData {
            name: name.into(),
            table,
        }
    }
}

/// Header block for the summary sheet.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub target_id: String,
    pub symbol: String,
}

/// Writes the tables to an Excel file, one worksheet each, after an optional summary sheet.
pub fn write_excel_file(file_path: &Path, sheets: &[SheetData], summary: Option<&ExportSummary>) -> Result<()> {
    info!("Initializing Excel workbook for file: {:?}", file_path);
    let mut workbook = Workbook::new();

    if let Some(summary) = summary {
        let summary_sheet = workbook.add_worksheet();
        write_summary_sheet(summary_sheet, summary, sheets)?;
    }

    for sheet_data in sheets {
        let sheet = workbook.add_worksheet();
        write_table_sheet(sheet, sheet_data)
            .with_context(|| format!("Failed to write sheet '{}'", sheet_data.name))?;
    }

    info!("Saving Excel workbook...");
    workbook
        .save(file_path)
        .with_context(|| format!("Failed to save workbook to {:?}", file_path))?;
    info!("Excel file saved successfully to {:?}", file_path);
    Ok(())
}

/// Replaces characters Excel rejects in sheet names and truncates to the length limit.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let trimmed = cleaned.trim_matches('\'');
    if trimmed.is_empty() {
        "Sheet".to_string()
    } else {
        trimmed.to_string()
    }
}

fn write_table_sheet(sheet: &mut Worksheet, data: &SheetData) -> Result<()> {
    sheet.set_name(sanitize_sheet_name(&data.name))?;
    let header_format = Format::new().set_bold();

    for (col_num, column) in data.table.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col_num as u16, &column.label, &header_format)?;
        sheet.set_column_width(col_num as u16, (column.label.len().clamp(10, 40)) as f64)?;
    }

    for (row_num, row) in data.table.rows.iter().enumerate() {
        let current_row = (row_num + 1) as u32; // +1 for header row
        for (col_num, cell) in row.iter().enumerate() {
            write_cell(sheet, current_row, col_num as u16, cell)?;
        }
    }
    info!("'{}' sheet written with {} rows.", data.name, data.table.len());
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &DisplayValue) -> Result<()> {
    match value {
        DisplayValue::Empty => {}
        DisplayValue::Number(n) => {
            sheet.write_number(row, col, *n)?;
        }
        DisplayValue::Integer(i) => {
            sheet.write_number(row, col, *i as f64)?;
        }
        DisplayValue::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        DisplayValue::Link(link) if !link.url.is_empty() => {
            sheet.write_url_with_text(row, col, link.url.as_str(), link.label.as_str())?;
        }
        DisplayValue::Heat(cell) => {
            let format = Format::new()
                .set_background_color(Color::RGB(cell.color.to_u32()))
                .set_num_format("0.000");
            match cell.score {
                Some(score) => {
                    sheet.write_number_with_format(row, col, score, &format)?;
                }
                None => {
                    sheet.write_blank(row, col, &format)?;
                }
            }
        }
        other => {
            sheet.write_string(row, col, other.to_plain_text())?;
        }
    }
    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, summary: &ExportSummary, sheets: &[SheetData]) -> Result<()> {
    sheet.set_name("Summary")?;
    sheet.set_column_width(0, 32)?;
    sheet.set_column_width(1, 20)?;

    let mut current_row = 0u32;
    sheet.write_string(current_row, 0, "EVIDENCE EXPORT SUMMARY")?;
    current_row += 2;

    sheet.write_string(current_row, 0, "Target")?;
    sheet.write_string(current_row, 1, &summary.target_id)?;
    current_row += 1;
    sheet.write_string(current_row, 0, "Symbol")?;
    sheet.write_string(current_row, 1, &summary.symbol)?;
    current_row += 2;

    sheet.write_string(current_row, 0, "Table")?;
    sheet.write_string(current_row, 1, "Rows")?;
    current_row += 1;
    let mut total_rows = 0usize;
    for sheet_data in sheets {
        sheet.write_string(current_row, 0, &sheet_data.name)?;
        sheet.write_number(current_row, 1, sheet_data.table.len() as f64)?;
        total_rows += sheet_data.table.len();
        current_row += 1;
    }
    sheet.write_string(current_row, 0, "Total")?;
    sheet.write_number(current_row, 1, total_rows as f64)?;
    current_row += 2;

    sheet.write_string(current_row, 0, "Generated")?;
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    sheet.write_string(current_row, 1, &timestamp)?;

    info!("'Summary' sheet written for {} tables.", sheets.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_scale::QuantizeScale;
    use crate::projection::{ColumnHeader, Link};
    use tempfile::NamedTempFile;

    fn every_variant() -> TableProjection {
        let scale = QuantizeScale::default();
        let cells = vec![
            DisplayValue::Empty,
            DisplayValue::text("BRAF"),
            DisplayValue::Number(1.5e-8),
            DisplayValue::Integer(42),
            DisplayValue::Bool(true),
            DisplayValue::List(vec!["a".into(), "b".into()]),
            DisplayValue::Link(Link::new("EFO_1", "https://platform.opentargets.org/disease/EFO_1")),
            DisplayValue::Link(Link::new("no url", "")),
            DisplayValue::Links(vec![Link::new("SVG", "https://x/1.svg"), Link::new("PNG", "https://x/1.png")]),
            DisplayValue::heat(&scale, Some(0.42)),
            DisplayValue::heat(&scale, None),
        ];
        TableProjection {
            columns: (0..cells.len())
                .map(|i| ColumnHeader {
                    id: format!("c{}", i),
                    label: format!("Column {}", i),
                })
                .collect(),
            rows: vec![cells.clone(), cells],
        }
    }

    #[test]
    fn writes_every_cell_kind_to_disk() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("xlsx");
        let sheets = vec![
            SheetData::new("All values", every_variant()),
            SheetData::new("Empty [table]", TableProjection::default()),
        ];
        let summary = ExportSummary {
            target_id: "ENSG00000157764".into(),
            symbol: "BRAF".into(),
        };

        write_excel_file(&path, &sheets, Some(&summary)).unwrap();
        let written = std::fs::metadata(&path).unwrap();
        assert!(written.len() > 0);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn sheet_names_are_made_excel_safe() {
        assert_eq!(sanitize_sheet_name("Reactome [evidence]"), "Reactome _evidence_");
        assert_eq!(sanitize_sheet_name("a/b\\c?d*e:f"), "a_b_c_d_e_f");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), MAX_SHEET_NAME);
        assert_eq!(sanitize_sheet_name("''"), "Sheet");
    }
}

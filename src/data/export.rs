use rust_xlsxwriter::{Format, Workbook};

use super::model::{CellValue, Dataset, MISSING_PLACEHOLDER};
use crate::error::ExportError;

/// Name of the single exported worksheet.
pub const SHEET_NAME: &str = "Filtered Data";

/// Excel measures column width in characters, roughly pixels / 7.
const PIXELS_PER_CHAR: f32 = 7.0;

/// Largest integer magnitude an f64 number cell holds exactly (2^53).
const MAX_EXACT_INTEGER: i64 = 1 << 53;

/// Serialize a view of rows into an xlsx workbook held in memory.
///
/// `rows` must be aligned with `columns`. Missing cells are written as
/// [`MISSING_PLACEHOLDER`]; numbers and bools keep their cell type, except
/// integers too large for an exact number cell, which are written as text.
pub fn export_rows<'a, I>(
    columns: &[String],
    rows: I,
    widths: Option<&[f32]>,
) -> Result<Vec<u8>, ExportError>
where
    I: IntoIterator<Item = &'a [CellValue]>,
{
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        let bold = Format::new().set_bold();
        for (col, name) in columns.iter().enumerate() {
            let col = col_num(col)?;
            sheet.write_string_with_format(0, col, name, &bold)?;
            if let Some(width) = widths.and_then(|w| w.get(usize::from(col))) {
                sheet.set_column_width(col, f64::from(*width / PIXELS_PER_CHAR))?;
            }
        }

        for (i, row) in rows.into_iter().enumerate() {
            let r = u32::try_from(i + 1).map_err(|_| ExportError::TooLarge)?;
            for (col, cell) in row.iter().take(columns.len()).enumerate() {
                let c = col_num(col)?;
                if cell.is_missing() {
                    sheet.write_string(r, c, MISSING_PLACEHOLDER)?;
                    continue;
                }
                match cell {
                    CellValue::Integer(v) if v.unsigned_abs() <= MAX_EXACT_INTEGER as u64 => {
                        sheet.write_number(r, c, *v as f64)?;
                    }
                    CellValue::Float(v) => {
                        sheet.write_number(r, c, *v)?;
                    }
                    CellValue::Bool(b) => {
                        sheet.write_boolean(r, c, *b)?;
                    }
                    other => {
                        sheet.write_string(r, c, other.to_string())?;
                    }
                }
            }
            // Short rows still show the placeholder in every column.
            for col in row.len()..columns.len() {
                sheet.write_string(r, col_num(col)?, MISSING_PLACEHOLDER)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Export the given dataset rows, in the order of `indices`.
pub fn export_view(
    dataset: &Dataset,
    indices: &[usize],
    widths: Option<&[f32]>,
) -> Result<Vec<u8>, ExportError> {
    let rows = indices.iter().filter_map(|&i| dataset.row(i));
    let bytes = export_rows(dataset.columns(), rows, widths)?;
    log::info!(
        "exported {} rows x {} columns ({} bytes)",
        indices.len(),
        dataset.columns().len(),
        bytes.len()
    );
    Ok(bytes)
}

fn col_num(col: usize) -> Result<u16, ExportError> {
    u16::try_from(col).map_err(|_| ExportError::TooLarge)
}

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset, Record};
use crate::error::{EmptyDatasetError, ParseError};

// ---------------------------------------------------------------------------
// Source formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Spreadsheet,
    Parquet,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::Csv => "CSV",
            SourceFormat::Json => "JSON",
            SourceFormat::Spreadsheet => "spreadsheet",
            SourceFormat::Parquet => "Parquet",
        };
        f.write_str(name)
    }
}

impl SourceFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Ok(SourceFormat::Spreadsheet),
            "parquet" | "pq" => Ok(SourceFormat::Parquet),
            other => Err(ParseError::UnsupportedExtension(other.to_string())),
        }
    }

    /// Extensions accepted by the open dialog.
    pub const EXTENSIONS: &'static [&'static str] =
        &["csv", "json", "xlsx", "xls", "xlsm", "xlsb", "ods", "parquet", "pq"];
}

// ---------------------------------------------------------------------------
// Decoded rows
// ---------------------------------------------------------------------------

/// The two shapes a decoder may hand back.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedRows {
    /// Array-of-arrays; row 0 is the header.
    Table(Vec<Vec<CellValue>>),
    /// Mapping-shaped records.
    Records(Vec<Record>),
}

impl Dataset {
    pub fn from_decoded(rows: DecodedRows) -> Result<Self, EmptyDatasetError> {
        match rows {
            DecodedRows::Table(table) => Dataset::from_table(table),
            DecodedRows::Records(records) => Dataset::load(records, None),
        }
    }
}

/// One decoding strategy per source format.
pub trait RowDecoder {
    fn format(&self) -> SourceFormat;
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRows, ParseError>;
}

pub fn decoder_for(format: SourceFormat) -> Box<dyn RowDecoder + Send> {
    match format {
        SourceFormat::Csv => Box::new(CsvDecoder),
        SourceFormat::Json => Box::new(JsonDecoder),
        SourceFormat::Spreadsheet => Box::new(SpreadsheetDecoder),
        SourceFormat::Parquet => Box::new(ParquetDecoder),
    }
}

/// Decode raw bytes with the strategy registered for `format`.
pub fn decode(format: SourceFormat, bytes: &[u8]) -> Result<DecodedRows, ParseError> {
    let decoder = decoder_for(format);
    log::debug!("decoding {} bytes as {}", bytes.len(), decoder.format());
    decoder.decode(bytes)
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Every line is a row; the first one is the header. Cells stay text.
pub struct CsvDecoder;

impl RowDecoder for CsvDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Csv
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedRows, ParseError> {
        if is_blank(bytes) {
            return Err(ParseError::Empty(SourceFormat::Csv));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut table = Vec::new();
        for (row_no, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                ParseError::malformed(SourceFormat::Csv, format!("row {row_no}: {e}"))
            })?;
            table.push(record.iter().map(text_cell).collect());
        }
        Ok(DecodedRows::Table(table))
    }
}

fn text_cell(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Accepted shapes:
///
/// ```json
/// [ { "name": "Bob", "age": 30 }, ... ]     // records
/// { "name": "Bob", "age": 30 }              // a single record
/// [ ["name", "age"], ["Bob", 30], ... ]     // header + rows
/// ```
pub struct JsonDecoder;

impl RowDecoder for JsonDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Json
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedRows, ParseError> {
        if is_blank(bytes) {
            return Err(ParseError::Empty(SourceFormat::Json));
        }
        let root: JsonValue = serde_json::from_slice(bytes)
            .map_err(|e| ParseError::malformed(SourceFormat::Json, e))?;

        match &root {
            JsonValue::Object(_) => Ok(DecodedRows::Records(vec![json_record(&root, 0)?])),
            JsonValue::Array(items) => {
                if items.first().is_some_and(JsonValue::is_array) {
                    let table = items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| {
                            item.as_array()
                                .map(|cells| cells.iter().map(json_to_cell).collect())
                                .ok_or_else(|| {
                                    ParseError::malformed(
                                        SourceFormat::Json,
                                        format!("row {i} is not an array"),
                                    )
                                })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(DecodedRows::Table(table))
                } else {
                    let records = items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| json_record(item, i))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(DecodedRows::Records(records))
                }
            }
            _ => Err(ParseError::malformed(
                SourceFormat::Json,
                "expected an object or an array of objects",
            )),
        }
    }
}

/// Convert one JSON object into a record, keeping key order.
pub(crate) fn json_record(value: &JsonValue, row: usize) -> Result<Record, ParseError> {
    let obj = value.as_object().ok_or_else(|| {
        ParseError::malformed(SourceFormat::Json, format!("row {row} is not an object"))
    })?;
    Ok(obj
        .iter()
        .map(|(key, val)| (key.clone(), json_to_cell(val)))
        .collect())
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        // Nested arrays / objects are shown as their JSON text.
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet
// ---------------------------------------------------------------------------

/// First worksheet only, blank rows dropped.
pub struct SpreadsheetDecoder;

impl RowDecoder for SpreadsheetDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Spreadsheet
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedRows, ParseError> {
        let format = SourceFormat::Spreadsheet;
        if bytes.is_empty() {
            return Err(ParseError::Empty(format));
        }
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| ParseError::malformed(format, e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ParseError::Empty(format))?
            .map_err(|e| ParseError::malformed(format, e))?;

        let table: Vec<Vec<CellValue>> = range
            .rows()
            .filter(|r| r.iter().any(|c| !matches!(c, Data::Empty)))
            .map(|r| r.iter().map(sheet_to_cell).collect())
            .collect();

        if table.is_empty() {
            return Err(ParseError::Empty(format));
        }
        Ok(DecodedRows::Table(table))
    }
}

pub(crate) fn sheet_to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(v) => text_cell(v),
        Data::Float(v) => {
            if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                CellValue::Integer(*v as i64)
            } else {
                CellValue::Float(*v)
            }
        }
        Data::Int(v) => CellValue::Integer(*v),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::DateTime(v) => CellValue::Float(v.as_f64()),
        Data::DateTimeIso(v) | Data::DurationIso(v) => CellValue::String(v.clone()),
        Data::Error(v) => CellValue::String(format!("{v:?}")),
        Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Reads every record batch; the header comes from the schema.
pub struct ParquetDecoder;

impl RowDecoder for ParquetDecoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Parquet
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedRows, ParseError> {
        let format = SourceFormat::Parquet;
        if bytes.is_empty() {
            return Err(ParseError::Empty(format));
        }
        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes::Bytes::from(bytes.to_vec()))
            .map_err(|e| ParseError::malformed(format, format!("reading parquet metadata: {e}")))?;
        let header: Vec<CellValue> = builder
            .schema()
            .fields()
            .iter()
            .map(|f| CellValue::String(f.name().clone()))
            .collect();
        let reader = builder
            .build()
            .map_err(|e| ParseError::malformed(format, format!("building parquet reader: {e}")))?;

        let mut table = vec![header];
        for batch_result in reader {
            let batch = batch_result
                .map_err(|e| ParseError::malformed(format, format!("reading record batch: {e}")))?;
            for row in 0..batch.num_rows() {
                table.push(
                    batch
                        .columns()
                        .iter()
                        .map(|col| arrow_to_cell(col, row))
                        .collect(),
                );
            }
        }
        Ok(DecodedRows::Table(table))
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_to_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => text_cell(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => text_cell(col.as_string::<i64>().value(row)),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => match array_value_to_string(col, row) {
            Ok(s) => text_cell(&s),
            Err(_) => CellValue::String(format!("{:?}", col.data_type())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.CSV")).unwrap(), SourceFormat::Csv);
        assert_eq!(
            SourceFormat::from_path(Path::new("book.xlsx")).unwrap(),
            SourceFormat::Spreadsheet
        );
        assert!(matches!(
            SourceFormat::from_path(Path::new("notes.txt")),
            Err(ParseError::UnsupportedExtension(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn each_format_has_its_own_decoder() {
        for format in [
            SourceFormat::Csv,
            SourceFormat::Json,
            SourceFormat::Spreadsheet,
            SourceFormat::Parquet,
        ] {
            assert_eq!(decoder_for(format).format(), format);
        }
    }

    #[test]
    fn csv_header_row_and_ragged_lines() {
        let rows = decode(SourceFormat::Csv, b"a,b\n1,2\n\n3\n").unwrap();
        let ds = Dataset::from_decoded(rows).unwrap();
        assert_eq!(ds.columns(), ["a", "b"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.cell(1, "b"), Some(&CellValue::Null));
    }

    #[test]
    fn blank_sources_are_parse_errors() {
        assert!(matches!(
            decode(SourceFormat::Csv, b"  \n\t"),
            Err(ParseError::Empty(SourceFormat::Csv))
        ));
        assert!(matches!(
            decode(SourceFormat::Json, b"\n"),
            Err(ParseError::Empty(SourceFormat::Json))
        ));
        assert!(matches!(
            decode(SourceFormat::Json, b"{ nope"),
            Err(ParseError::Malformed { .. })
        ));
    }

    #[test]
    fn json_records_keep_key_order() {
        let rows = decode(
            SourceFormat::Json,
            br#"[{"zeta": 1, "alpha": "x"}, {"alpha": "y", "tags": [1, 2]}]"#,
        )
        .unwrap();
        let ds = Dataset::from_decoded(rows).unwrap();
        assert_eq!(ds.columns(), ["zeta", "alpha", "tags"]);
        assert_eq!(ds.cell(1, "tags"), Some(&CellValue::from("[1,2]")));
    }

    #[test]
    fn json_single_object_and_table_shapes() {
        let single = decode(SourceFormat::Json, br#"{"a": true}"#).unwrap();
        assert_eq!(
            single,
            DecodedRows::Records(vec![vec![("a".to_string(), CellValue::Bool(true))]])
        );

        let table = decode(SourceFormat::Json, br#"[["a","b"],[1,2.5]]"#).unwrap();
        let ds = Dataset::from_decoded(table).unwrap();
        assert_eq!(ds.cell(0, "b"), Some(&CellValue::Float(2.5)));

        assert!(decode(SourceFormat::Json, b"42").is_err());
    }

    #[test]
    fn json_empty_array_is_empty_dataset() {
        let rows = decode(SourceFormat::Json, b"[]").unwrap();
        assert_eq!(Dataset::from_decoded(rows).unwrap_err(), EmptyDatasetError);
    }

    #[test]
    fn sheet_cells_normalise_integral_floats() {
        assert_eq!(sheet_to_cell(&Data::Float(30.0)), CellValue::Integer(30));
        assert_eq!(sheet_to_cell(&Data::Float(2.5)), CellValue::Float(2.5));
        assert_eq!(sheet_to_cell(&Data::Empty), CellValue::Null);
    }
}

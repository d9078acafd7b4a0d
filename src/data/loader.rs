use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, DESCRIPTION, LOCATION, BEDROOMS, PRICE, RawRecord, RawTable, Table};

// ---------------------------------------------------------------------------
// Table sources
// ---------------------------------------------------------------------------

/// Something that can produce a fresh [`Table`] on demand.
///
/// Every call re-reads the underlying data; nothing is cached between calls.
pub trait TableSource: Send + Sync {
    fn load(&self) -> Result<Table>;
}

/// A listings file on disk, re-read on every [`TableSource::load`].
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for FileSource {
    fn load(&self) -> Result<Table> {
        let table = load_file(&self.path)
            .with_context(|| format!("loading listings from {}", self.path.display()))?;
        log::debug!("loaded {} listings from {}", table.len(), self.path.display());
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one listing per record
/// * `.json`    – `[{ "Location": "...", "Price": "...", ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    Table::from_raw(raw)
}

/// Reject a header that names the same column twice; rows are keyed by name.
fn ensure_unique_columns(columns: &[String]) -> Result<()> {
    for (i, name) in columns.iter().enumerate() {
        if columns[..i].contains(name) {
            bail!("duplicate column '{name}'");
        }
    }
    Ok(())
}

/// Columns whose cells are always kept as text, whatever they look like.
fn is_text_column(name: &str) -> bool {
    matches!(name, LOCATION | BEDROOMS | PRICE | DESCRIPTION)
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one listing per record.
/// Empty cells, and cells past the end of a short record, are treated as missing.
fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    ensure_unique_columns(&columns)?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let row: RawRecord = columns
            .iter()
            .enumerate()
            .map(|(col_idx, col_name)| {
                let cell = record.get(col_idx).unwrap_or("");
                let value = if is_text_column(col_name) {
                    text_cell(cell)
                } else {
                    guess_cell_type(cell)
                };
                (col_name.clone(), value)
            })
            .collect();

        records.push(row);
    }

    Ok(RawTable { columns, records })
}

fn text_cell(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Location": "Sector 5, Gurgaon", "Bedrooms": "3", "Price": "50,00,000" },
///   ...
/// ]
/// ```
///
/// Columns are the union of all keys, in first-seen order.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, rec) in rows.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = RawRecord::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            let value = json_to_cell(val);
            let value = match value {
                CellValue::Null => CellValue::Null,
                other if is_text_column(key) => CellValue::String(other.to_text()),
                other => other,
            };
            row.insert(key.clone(), value);
        }
        records.push(row);
    }

    // Rows that lack a key get it as missing.
    for row in &mut records {
        for col in &columns {
            row.entry(col.clone()).or_insert(CellValue::Null);
        }
    }

    Ok(RawTable { columns, records })
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
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file of listings.
///
/// Strings, integers, floats and booleans keep their type; any other column
/// (dates, timestamps, categoricals, ...) is carried as its display text. Works
/// with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    ensure_unique_columns(&columns)?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let mut record = RawRecord::new();
            for (col_idx, col_name) in columns.iter().enumerate() {
                let value = extract_cell(batch.column(col_idx), row)
                    .with_context(|| format!("Row {row}: failed to read '{col_name}'"))?;
                let value = match value {
                    CellValue::Null => CellValue::Null,
                    other if is_text_column(col_name) => CellValue::String(other.to_text()),
                    other => other,
                };
                record.insert(col_name.clone(), value);
            }
            records.push(record);
        }
    }

    Ok(RawTable { columns, records })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(col.as_ref(), &options)
                .with_context(|| format!("formatting {} column", col.data_type()))?;
            CellValue::String(formatter.value(row).to_string())
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{BHK, CITY};

    use arrow::array::{Date32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn csv_derives_city_area_and_bhk() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "listings.csv",
            "Location,Bedrooms,Price,Floor,Furnishing\n\
             \"Sector 5, Gurgaon\",3,\"50,00,000\",2,Semi\n\
             \"Andheri, Mumbai\",N/A,\"1,20,00,000\",,\n",
        );

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.has_column(BHK));
        assert!(table.has_column(CITY));

        let first = &table.listings[0];
        assert_eq!(first.city, "Gurgaon");
        assert_eq!(first.area, "Sector 5");
        assert_eq!(first.bhk, "3");
        assert_eq!(first.price, "50,00,000");
        assert_eq!(first.extra["Floor"], CellValue::Integer(2));

        let second = &table.listings[1];
        assert_eq!(second.bhk, "");
        assert_eq!(second.extra["Floor"], CellValue::String(String::new()));
        assert_eq!(second.extra["Furnishing"], CellValue::String(String::new()));
    }

    #[test]
    fn csv_keeps_numeric_price_as_text() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "l.csv", "Location,Bedrooms,Price\n\"A, B\",2,4500000\n");
        let table = load_file(&path).unwrap();
        assert_eq!(table.listings[0].price, "4500000");
    }

    #[test]
    fn csv_with_description_column() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "l.csv",
            "Location,Bedrooms,Price,Description\n\"A, B\",2,100,Sea view\n\"C, D\",1,200,\n",
        );
        let table = load_file(&path).unwrap();
        assert!(table.has_column(DESCRIPTION));
        assert_eq!(table.listings[0].description.as_deref(), Some("Sea view"));
        assert_eq!(table.listings[1].description.as_deref(), Some(""));
    }

    #[test]
    fn missing_required_column_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "l.csv", "Location,Price\n\"A, B\",100\n");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let source = FileSource::new(dir.path().join("absent.csv"));
        let err = source.load().unwrap_err();
        assert!(format!("{err:#}").contains("absent.csv"));
    }

    #[test]
    fn unsupported_extension_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "l.xlsx", "");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn json_records_are_loaded() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "l.json",
            r#"[
                {"Location": "Andheri, Mumbai", "Bedrooms": 2, "Price": 12000000, "Parking": true},
                {"Location": "Baner, Pune", "Bedrooms": null, "Price": "85,00,000"}
            ]"#,
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.listings[0].bhk, "2");
        assert_eq!(table.listings[0].price, "12000000");
        assert_eq!(table.listings[0].extra["Parking"], CellValue::Bool(true));
        assert_eq!(table.listings[1].bhk, "");
        assert_eq!(table.listings[1].extra["Parking"], CellValue::String(String::new()));
    }

    #[test]
    fn json_must_be_an_array() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "l.json", r#"{"Location": "x"}"#);
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn parquet_scalar_columns_are_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("l.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new(LOCATION, DataType::Utf8, true),
            Field::new(BEDROOMS, DataType::Int64, true),
            Field::new(PRICE, DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Sector 5, Gurgaon"), None])),
                Arc::new(Int64Array::from(vec![Some(3), None])),
                Arc::new(StringArray::from(vec![Some("50,00,000"), Some("10")])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.listings[0].city, "Gurgaon");
        assert_eq!(table.listings[0].bhk, "3");
        assert_eq!(table.listings[1].location, "");
        assert_eq!(table.listings[1].city, "Unknown");
        assert_eq!(table.listings[1].bhk, "");
    }

    #[test]
    fn short_csv_rows_are_padded_with_empty_cells() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "l.csv",
            "Location,Bedrooms,Price,Furnishing\n\"A, B\",2,100,Semi\n\"C, D\",3\n",
        );
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.listings[1].city, "D");
        assert_eq!(table.listings[1].bhk, "3");
        assert_eq!(table.listings[1].price, "");
        assert_eq!(table.listings[1].extra["Furnishing"], CellValue::String(String::new()));
    }

    #[test]
    fn duplicate_csv_header_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "l.csv", "Location,Bedrooms,Price,Price\n\"A, B\",2,100,200\n");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate column 'Price'"));
    }

    #[test]
    fn parquet_date_column_is_carried_as_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("l.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new(LOCATION, DataType::Utf8, true),
            Field::new(BEDROOMS, DataType::Utf8, true),
            Field::new(PRICE, DataType::Utf8, true),
            Field::new("Listed", DataType::Date32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Baner, Pune"), Some("Wakad, Pune")])),
                Arc::new(StringArray::from(vec![Some("2"), Some("3")])),
                Arc::new(StringArray::from(vec![Some("85,00,000"), Some("90,00,000")])),
                Arc::new(Date32Array::from(vec![Some(19000), None])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.listings[0].extra["Listed"],
            CellValue::String("2022-01-08".to_string())
        );
        assert_eq!(table.listings[1].extra["Listed"], CellValue::String(String::new()));
    }

    #[test]
    fn repeated_loads_are_identical() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "l.csv", "Location,Bedrooms,Price\n\"A, B\",2,100\n");
        let source = FileSource::new(path.clone());
        let a = source.load().unwrap();
        let b = source.load().unwrap();
        assert_eq!(a.listings, b.listings);
        assert_eq!(a.columns, b.columns);
    }
}

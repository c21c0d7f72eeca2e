use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::record::{
    CellValue, SalesDataset, SalesRecord, CATEGORY, DISCOUNT, MONTH, ORDER_DATE, ORDER_ID,
    PRODUCT, QUANTITY, REGION, REQUIRED_COLUMNS, TOTAL_SALES, UNIT_PRICE,
};
use crate::error::DataSourceError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one order line per row (recommended)
/// * `.json`    – `[{ "OrderID": ..., "Tanggal_Pesanan": ..., ... }, ...]`
/// * `.parquet` – one column per field, dates as `Date32`/`Date64` or text
pub fn load_file(path: &Path) -> Result<SalesDataset, DataSourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(open(path)?)?,
        "json" => read_json(open(path)?)?,
        "parquet" | "pq" => read_parquet(open(path)?)?,
        other => return Err(DataSourceError::UnsupportedFormat(other.to_string())),
    };

    let dataset = build_dataset(table)?;
    log::info!(
        "Loaded {} sales rows from {} ({} columns)",
        dataset.len(),
        path.display(),
        dataset.columns().len()
    );
    let undated = dataset.undated_count();
    if undated > 0 {
        log::warn!("{undated} rows have an unparseable order date; they are kept without a month");
    }
    Ok(dataset)
}

/// Load a dataset from CSV text held in any reader.
pub fn load_csv<R: Read>(reader: R) -> Result<SalesDataset, DataSourceError> {
    build_dataset(read_csv(reader)?)
}

/// Load a dataset from a records-oriented JSON array.
pub fn load_json<R: Read>(reader: R) -> Result<SalesDataset, DataSourceError> {
    build_dataset(read_json(reader)?)
}

fn open(path: &Path) -> Result<std::fs::File, DataSourceError> {
    std::fs::File::open(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Raw table: format-independent intermediate
// ---------------------------------------------------------------------------

/// Header names plus rows of loosely typed cells, before validation.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

/// Validate the schema and convert raw rows into typed records.
///
/// Rows whose order date does not parse are kept with a null date.
/// Malformed numeric cells are rejected.
fn build_dataset(table: RawTable) -> Result<SalesDataset, DataSourceError> {
    let RawTable { headers, rows } = table;

    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(DataSourceError::MissingColumns(missing));
    }

    let index_of = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
    let extra_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !REQUIRED_COLUMNS.contains(&h.as_str()) && h.as_str() != MONTH)
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.into_iter().enumerate() {
        let row_no = i + 1;
        let cell = |name: &str| row.get(index_of(name)).cloned().unwrap_or(CellValue::Null);
        let invalid = |name: &str, value: &CellValue| DataSourceError::InvalidValue {
            row: row_no,
            column: name.to_string(),
            value: value.to_string(),
        };
        let number = |name: &str| {
            let value = cell(name);
            value
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid(name, &value))
        };
        let text = |name: &str| match cell(name) {
            CellValue::Null => String::new(),
            value => value.to_string(),
        };

        let order_id = match cell(ORDER_ID) {
            CellValue::Null => return Err(invalid(ORDER_ID, &CellValue::Null)),
            value => value.to_string(),
        };

        let discount = number(DISCOUNT)?;
        if !(0.0..=1.0).contains(&discount) {
            return Err(invalid(DISCOUNT, &CellValue::Float(discount)));
        }

        let quantity_cell = cell(QUANTITY);
        let quantity = quantity_cell
            .as_i64()
            .filter(|q| *q >= 0)
            .ok_or_else(|| invalid(QUANTITY, &quantity_cell))?;

        let extra: BTreeMap<String, CellValue> = extra_columns
            .iter()
            .map(|(idx, name)| (name.clone(), row.get(*idx).cloned().unwrap_or(CellValue::Null)))
            .collect();

        records.push(SalesRecord {
            order_id,
            order_date: cell(ORDER_DATE).as_date(),
            region: text(REGION),
            category: text(CATEGORY),
            product: text(PRODUCT),
            unit_price: number(UNIT_PRICE)?,
            discount,
            quantity,
            total_sales: number(TOTAL_SALES)?,
            extra,
        });
    }

    Ok(SalesDataset::new(
        records,
        extra_columns.into_iter().map(|(_, name)| name).collect(),
    ))
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv<R: Read>(reader: R) -> Result<RawTable, DataSourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let verbatim: Vec<bool> = headers.iter().map(|h| is_text_column(h)).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .zip(&verbatim)
                .map(|(s, keep)| if *keep { text_cell(s) } else { guess_cell_type(s) })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

/// Identity and date columns keep their source text: `007` and `7` are
/// different orders.
const TEXT_COLUMNS: [&str; 5] = [ORDER_ID, ORDER_DATE, REGION, CATEGORY, PRODUCT];

fn is_text_column(header: &str) -> bool {
    TEXT_COLUMNS.contains(&header)
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

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "OrderID": 1, "Tanggal_Pesanan": "2024-01-05", "Wilayah": "West", ... },
///   ...
/// ]
/// ```
///
/// Dates may also be epoch milliseconds, the pandas default for datetime
/// columns. Numbers in identity columns keep their literal JSON text.
fn read_json<R: Read>(reader: R) -> Result<RawTable, DataSourceError> {
    let root: JsonValue = serde_json::from_reader(reader)?;

    let records = root.as_array().ok_or_else(|| DataSourceError::MalformedRow {
        row: 0,
        message: "expected a top-level JSON array".to_string(),
    })?;

    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| DataSourceError::MalformedRow {
            row: i + 1,
            message: "not a JSON object".to_string(),
        })?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| match obj.get(h) {
                    Some(JsonValue::Number(n)) if is_text_column(h) && h != ORDER_DATE => {
                        CellValue::String(n.to_string())
                    }
                    Some(val) => json_to_cell(val),
                    None => CellValue::Null,
                })
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
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

/// Works with files written by **Pandas** (`df.to_parquet()`), **Polars**
/// (`df.write_parquet()`) and the bundled sample generator.
fn read_parquet(file: std::fs::File) -> Result<RawTable, DataSourceError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map_or(CellValue::Null, CellValue::Date),
        DataType::Date64 => col
            .as_primitive::<Date64Type>()
            .value_as_date(row)
            .map_or(CellValue::Null, CellValue::Date),
        _ => match array_value_to_string(col, row) {
            Ok(s) => CellValue::String(s),
            Err(_) => CellValue::Null,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::MONTH;

    const SAMPLE_CSV: &str = "\
OrderID,Tanggal_Pesanan,Wilayah,Kategori,Produk,Harga_Satuan,Diskon,Jumlah,Total_Penjualan,Kanal
1,2024-01-05,West,A,Kopi,50,0,2,100,online
1,2024-01-05,West,A,Teh,25,0,2,50,online
2,2024-02-10,East,B,Gula,100,0.1,2,200,toko
3,bukan tanggal,East,B,Gula,100,0,1,100,toko
";

    #[test]
    fn load_sample_csv() {
        let ds = load_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 4);
        let first = &ds.records()[0];
        assert_eq!(first.order_id, "1");
        assert_eq!(first.region, "West");
        assert_eq!(first.quantity, 2);
        assert_eq!(first.total_sales, 100.0);
        assert_eq!(first.month().as_deref(), Some("2024-01"));
        assert_eq!(first.extra.get("Kanal"), Some(&CellValue::String("online".into())));
        assert!(ds.has_column("Kanal"));
        assert!(ds.has_column(MONTH));
    }

    #[test]
    fn unparseable_date_row_is_kept() {
        let ds = load_csv(SAMPLE_CSV.as_bytes()).unwrap();
        let undated = &ds.records()[3];
        assert_eq!(undated.order_id, "3");
        assert_eq!(undated.order_date, None);
        assert_eq!(undated.month(), None);
        assert_eq!(ds.undated_count(), 1);
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let csv = "OrderID,Wilayah,Kategori,Produk,Harga_Satuan,Diskon,Jumlah\n1,West,A,Kopi,50,0,2\n";
        match load_csv(csv.as_bytes()) {
            Err(DataSourceError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["Tanggal_Pesanan", "Total_Penjualan"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn malformed_number_is_rejected() {
        let csv = "\
OrderID,Tanggal_Pesanan,Wilayah,Kategori,Produk,Harga_Satuan,Diskon,Jumlah,Total_Penjualan
1,2024-01-05,West,A,Kopi,lima puluh,0,2,100
";
        match load_csv(csv.as_bytes()) {
            Err(DataSourceError::InvalidValue { row, column, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column, UNIT_PRICE);
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn negative_quantity_and_discount_out_of_range_are_rejected() {
        let negative = "\
OrderID,Tanggal_Pesanan,Wilayah,Kategori,Produk,Harga_Satuan,Diskon,Jumlah,Total_Penjualan
1,2024-01-05,West,A,Kopi,50,0,-2,100
";
        assert!(matches!(
            load_csv(negative.as_bytes()),
            Err(DataSourceError::InvalidValue { ref column, .. }) if column == QUANTITY
        ));

        let discount = "\
OrderID,Tanggal_Pesanan,Wilayah,Kategori,Produk,Harga_Satuan,Diskon,Jumlah,Total_Penjualan
1,2024-01-05,West,A,Kopi,50,1.5,2,100
";
        assert!(matches!(
            load_csv(discount.as_bytes()),
            Err(DataSourceError::InvalidValue { ref column, .. }) if column == DISCOUNT
        ));
    }

    #[test]
    fn load_records_json() {
        let json = r#"[
            {"OrderID": 10, "Tanggal_Pesanan": "2024-03-01", "Wilayah": "North", "Kategori": "C",
             "Produk": "Beras", "Harga_Satuan": 12.5, "Diskon": 0.2, "Jumlah": 4, "Total_Penjualan": 40.0},
            {"OrderID": 11, "Tanggal_Pesanan": null, "Wilayah": "South", "Kategori": "C",
             "Produk": "Beras", "Harga_Satuan": 12.5, "Diskon": 0.0, "Jumlah": 1, "Total_Penjualan": 12.5}
        ]"#;
        let ds = load_json(json.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].order_id, "10");
        assert_eq!(ds.records()[0].discount, 0.2);
        assert_eq!(ds.records()[1].order_date, None);
    }

    #[test]
    fn identity_columns_keep_source_text() {
        let csv = "\
OrderID,Tanggal_Pesanan,Wilayah,Kategori,Produk,Harga_Satuan,Diskon,Jumlah,Total_Penjualan
007,2024-01-05,01,A,1.50,10,0,1,10
7,2024-01-05,1,A,1.5,10,0,1,10
12345678901234567890,2024-01-06,West,B,X,10,0,1,10
12345678901234567891,2024-01-06,West,B,X,10,0,1,10
";
        let ds = load_csv(csv.as_bytes()).unwrap();
        let ids: Vec<&str> = ds.iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, ["007", "7", "12345678901234567890", "12345678901234567891"]);
        assert_eq!(ds.records()[0].product, "1.50");
        assert_eq!(ds.records()[1].product, "1.5");
        assert_eq!(ds.regions(), vec!["01", "1", "West"]);
        assert_eq!(crate::data::aggregate::order_count(&ds), 4);
        assert_eq!(crate::data::aggregate::top_products(&ds, 10).len(), 3);
    }

    #[test]
    fn json_ids_and_epoch_dates() {
        let json = r#"[
            {"OrderID": 12345678901234567890, "Tanggal_Pesanan": 1704412800000, "Wilayah": "West",
             "Kategori": "A", "Produk": "Kopi", "Harga_Satuan": 10, "Diskon": 0, "Jumlah": 1,
             "Total_Penjualan": 10},
            {"OrderID": 12345678901234567891, "Tanggal_Pesanan": 1707523200000, "Wilayah": "West",
             "Kategori": "A", "Produk": "Kopi", "Harga_Satuan": 10, "Diskon": 0, "Jumlah": 1,
             "Total_Penjualan": 10}
        ]"#;
        let ds = load_json(json.as_bytes()).unwrap();
        assert_eq!(ds.records()[0].order_id, "12345678901234567890");
        assert_eq!(ds.records()[1].order_id, "12345678901234567891");
        assert_eq!(ds.records()[0].month().as_deref(), Some("2024-01"));
        assert_eq!(ds.records()[1].month().as_deref(), Some("2024-02"));
        assert_eq!(ds.undated_count(), 0);
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(matches!(
            load_json(r#"{"OrderID": 1}"#.as_bytes()),
            Err(DataSourceError::MalformedRow { .. })
        ));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = load_file(Path::new("sales.xlsx")).unwrap_err();
        assert!(matches!(err, DataSourceError::UnsupportedFormat(ref ext) if ext == "xlsx"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataSourceError::Io { .. }));
    }
}

//! Writes a deterministic demo dataset and model artifact:
//!
//! * `data/data_dummy_retail_store.csv`
//! * `data/data_dummy_retail_store.parquet`
//! * `models/model_sales.json`

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use sales_dashboard::data::record::month_period;
use sales_dashboard::predict::model::ModelArtifact;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// One CSV row, headers matching the loader's required columns.
#[derive(Debug, Serialize)]
struct SaleRow {
    #[serde(rename = "OrderID")]
    order_id: i64,
    #[serde(rename = "Tanggal_Pesanan")]
    date: String,
    #[serde(rename = "Wilayah")]
    region: String,
    #[serde(rename = "Kategori")]
    category: String,
    #[serde(rename = "Produk")]
    product: String,
    #[serde(rename = "Harga_Satuan")]
    unit_price: f64,
    #[serde(rename = "Diskon")]
    discount: f64,
    #[serde(rename = "Jumlah")]
    quantity: i64,
    #[serde(rename = "Total_Penjualan")]
    total: f64,
}

const REGIONS: [&str; 5] = ["Jakarta", "Bandung", "Surabaya", "Medan", "Makassar"];
const DISCOUNTS: [f64; 5] = [0.0, 0.0, 0.05, 0.1, 0.2];

fn catalog() -> Vec<(&'static str, &'static str, f64)> {
    vec![
        ("Elektronik", "Headphone", 350_000.0),
        ("Elektronik", "Power Bank", 220_000.0),
        ("Elektronik", "Mouse Wireless", 150_000.0),
        ("Fashion", "Kaos Polos", 75_000.0),
        ("Fashion", "Sepatu Lari", 480_000.0),
        ("Fashion", "Topi", 60_000.0),
        ("Makanan", "Kopi Bubuk", 45_000.0),
        ("Makanan", "Teh Celup", 20_000.0),
        ("Makanan", "Cokelat", 30_000.0),
        ("Rumah Tangga", "Wajan", 180_000.0),
        ("Rumah Tangga", "Sapu", 35_000.0),
        ("Kecantikan", "Serum Wajah", 120_000.0),
    ]
}

fn generate_rows(rng: &mut SimpleRng, n_orders: i64) -> Vec<(SaleRow, NaiveDate)> {
    let catalog = catalog();
    let first_day = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
    let mut rows = Vec::new();

    for order_id in 1..=n_orders {
        let date = first_day + Duration::days(rng.below(730) as i64);
        let region = *rng.pick(&REGIONS);
        // An order holds one to three line items.
        for _ in 0..=rng.below(3) {
            let (category, product, base_price) = *rng.pick(&catalog);
            let unit_price = (base_price * (0.9 + 0.2 * rng.next_f64())).round();
            let discount = *rng.pick(&DISCOUNTS);
            let quantity = 1 + rng.below(5) as i64;
            let total = (unit_price * quantity as f64 * (1.0 - discount)).round();
            rows.push((
                SaleRow {
                    order_id,
                    date: date.format("%Y-%m-%d").to_string(),
                    region: region.to_string(),
                    category: category.to_string(),
                    product: product.to_string(),
                    unit_price,
                    discount,
                    quantity,
                    total,
                },
                date,
            ));
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[(SaleRow, NaiveDate)]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for (row, _) in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn string_array(rows: &[(SaleRow, NaiveDate)], field: fn(&SaleRow) -> &str) -> StringArray {
    StringArray::from(rows.iter().map(|(r, _)| field(r)).collect::<Vec<&str>>())
}

fn write_parquet(path: &Path, rows: &[(SaleRow, NaiveDate)]) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();

    let schema = Arc::new(Schema::new(vec![
        Field::new("OrderID", DataType::Int64, false),
        Field::new("Tanggal_Pesanan", DataType::Date32, true),
        Field::new("Wilayah", DataType::Utf8, false),
        Field::new("Kategori", DataType::Utf8, false),
        Field::new("Produk", DataType::Utf8, false),
        Field::new("Harga_Satuan", DataType::Float64, false),
        Field::new("Diskon", DataType::Float64, false),
        Field::new("Jumlah", DataType::Int64, false),
        Field::new("Total_Penjualan", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|(r, _)| r.order_id))),
            Arc::new(Date32Array::from_iter_values(
                rows.iter().map(|(_, d)| (*d - epoch).num_days() as i32),
            )),
            Arc::new(string_array(rows, |r| r.region.as_str())),
            Arc::new(string_array(rows, |r| r.category.as_str())),
            Arc::new(string_array(rows, |r| r.product.as_str())),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|(r, _)| r.unit_price))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|(r, _)| r.discount))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|(r, _)| r.quantity))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|(r, _)| r.total))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// An anonymous linear model over the default feature set, with the
/// month-period encoded as its position in the calendar.
fn sample_model(rows: &[(SaleRow, NaiveDate)]) -> ModelArtifact {
    let months: BTreeMap<String, f64> = rows
        .iter()
        .map(|(_, d)| month_period(*d))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, m)| (m, (i + 1) as f64))
        .collect();

    ModelArtifact {
        feature_names_in: None,
        // Bulan, Diskon, Harga_Satuan, Jumlah, day_ordinal
        coefficients: vec![1_500.0, -250_000.0, 2.4, 95_000.0, 120.0],
        intercept: -160_000.0,
        encodings: BTreeMap::from([(0, months)]),
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng, 600);

    std::fs::create_dir_all("data")?;
    std::fs::create_dir_all("models")?;

    let csv_path = Path::new("data/data_dummy_retail_store.csv");
    write_csv(csv_path, &rows)?;
    let parquet_path = Path::new("data/data_dummy_retail_store.parquet");
    write_parquet(parquet_path, &rows)?;

    let model_path = Path::new("models/model_sales.json");
    let json = serde_json::to_string_pretty(&sample_model(&rows))?;
    std::fs::write(model_path, json).with_context(|| format!("writing {}", model_path.display()))?;

    println!(
        "Wrote {} order lines to {} and {}, model to {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display(),
        model_path.display()
    );
    Ok(())
}

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const ORDER_ID: &str = "OrderID";
pub const ORDER_DATE: &str = "Tanggal_Pesanan";
pub const REGION: &str = "Wilayah";
pub const CATEGORY: &str = "Kategori";
pub const PRODUCT: &str = "Produk";
pub const UNIT_PRICE: &str = "Harga_Satuan";
pub const DISCOUNT: &str = "Diskon";
pub const QUANTITY: &str = "Jumlah";
pub const TOTAL_SALES: &str = "Total_Penjualan";

/// Derived year-month period column.
pub const MONTH: &str = "Bulan";

/// Columns every data source must provide.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    ORDER_ID,
    ORDER_DATE,
    REGION,
    CATEGORY,
    PRODUCT,
    UNIT_PRICE,
    DISCOUNT,
    QUANTITY,
    TOTAL_SALES,
];

// ---------------------------------------------------------------------------
// CellValue – a single dynamically-typed cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{v:.0}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`, parsing numeric text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the value as an `i64`. Floats qualify only when integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            CellValue::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|v| v.fract() == 0.0).map(|v| v as i64))
            }
            _ => None,
        }
    }

    /// Interpret the value as a calendar date. Unparseable text is `None`.
    /// Integers are epoch milliseconds (UTC).
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::String(s) => parse_order_date(s),
            CellValue::Integer(ms) => DateTime::from_timestamp_millis(*ms).map(|dt| dt.date_naive()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Date helpers
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse an order date. Returns `None` for empty or unrecognised text.
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Year-month period key, e.g. `2024-01`.
pub fn month_period(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

// ---------------------------------------------------------------------------
// SalesRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single order line.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub order_id: String,
    /// `None` when the source value did not parse.
    pub order_date: Option<NaiveDate>,
    pub region: String,
    pub category: String,
    pub product: String,
    pub unit_price: f64,
    /// Fraction in `[0, 1]`.
    pub discount: f64,
    pub quantity: i64,
    pub total_sales: f64,
    /// Source columns beyond the required set, keyed by header.
    pub extra: BTreeMap<String, CellValue>,
}

impl SalesRecord {
    /// Month-period derived from the order date.
    pub fn month(&self) -> Option<String> {
        self.order_date.map(month_period)
    }

    /// Look up a cell by column name, including the derived month column.
    pub fn column(&self, name: &str) -> Option<CellValue> {
        let value = match name {
            ORDER_ID => CellValue::String(self.order_id.clone()),
            ORDER_DATE => self.order_date.map_or(CellValue::Null, CellValue::Date),
            REGION => CellValue::String(self.region.clone()),
            CATEGORY => CellValue::String(self.category.clone()),
            PRODUCT => CellValue::String(self.product.clone()),
            UNIT_PRICE => CellValue::Float(self.unit_price),
            DISCOUNT => CellValue::Float(self.discount),
            QUANTITY => CellValue::Integer(self.quantity),
            TOTAL_SALES => CellValue::Float(self.total_sales),
            MONTH => self.month().map_or(CellValue::Null, CellValue::String),
            other => return self.extra.get(other).cloned(),
        };
        Some(value)
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the loaded table
// ---------------------------------------------------------------------------

/// An ordered, immutable sequence of records plus its column schema.
///
/// Filtering and derivation always build a new dataset; nothing mutates a
/// dataset after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesDataset {
    records: Vec<SalesRecord>,
    columns: Vec<String>,
}

impl SalesDataset {
    /// Build a dataset from records. `extra_columns` are the source headers
    /// beyond the required set, in source order.
    pub fn new(records: Vec<SalesRecord>, extra_columns: Vec<String>) -> Self {
        let mut columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(extra_columns.into_iter().filter(|c| c != MONTH));
        columns.push(MONTH.to_string());
        SalesDataset { records, columns }
    }

    /// A dataset with the same schema holding `records`.
    pub fn with_records(&self, records: Vec<SalesRecord>) -> Self {
        SalesDataset {
            records,
            columns: self.columns.clone(),
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SalesRecord> {
        self.records.iter()
    }

    /// Ordered column names, derived `Bulan` last.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct regions in order of first appearance.
    pub fn regions(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.region.as_str()))
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.category.as_str()))
    }

    /// Earliest and latest non-null order date.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.order_date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Number of records whose order date did not parse.
    pub fn undated_count(&self) -> usize {
        self.records.iter().filter(|r| r.order_date.is_none()).count()
    }

    /// A copy holding only the records with a parsed order date.
    pub fn dated_only(&self) -> Self {
        self.with_records(
            self.records
                .iter()
                .filter(|r| r.order_date.is_some())
                .cloned()
                .collect(),
        )
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(order_id: &str, date: Option<&str>, region: &str, category: &str, total: f64) -> SalesRecord {
        SalesRecord {
            order_id: order_id.to_string(),
            order_date: date.and_then(parse_order_date),
            region: region.to_string(),
            category: category.to_string(),
            product: format!("{category}-item"),
            unit_price: total,
            discount: 0.0,
            quantity: 1,
            total_sales: total,
            extra: BTreeMap::new(),
        }
    }

    /// The three-row scenario: one order with two lines, one single-line order.
    pub fn three_rows() -> SalesDataset {
        SalesDataset::new(
            vec![
                record("1", Some("2024-01-05"), "West", "A", 100.0),
                record("1", Some("2024-01-05"), "West", "A", 50.0),
                record("2", Some("2024-02-10"), "East", "B", 200.0),
            ],
            Vec::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn parses_supported_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        for raw in ["2024-03-07", "2024/03/07", "03/07/2024", "2024-03-07 13:45:00", "2024-03-07T08:00:00"] {
            assert_eq!(parse_order_date(raw), Some(expected), "{raw}");
        }
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert_eq!(parse_order_date(""), None);
        assert_eq!(parse_order_date("not a date"), None);
        assert_eq!(parse_order_date("2024-13-40"), None);
    }

    #[test]
    fn month_period_is_year_month() {
        let d = NaiveDate::from_ymd_opt(2023, 9, 30).unwrap();
        assert_eq!(month_period(d), "2023-09");
    }

    #[test]
    fn undated_record_has_no_month() {
        let r = record("9", Some("garbage"), "North", "C", 10.0);
        assert_eq!(r.order_date, None);
        assert_eq!(r.month(), None);
        assert_eq!(r.column(MONTH), Some(CellValue::Null));
    }

    #[test]
    fn column_lookup_covers_required_and_extra() {
        let mut r = record("7", Some("2024-01-05"), "West", "A", 100.0);
        r.extra.insert("Channel".into(), CellValue::String("online".into()));
        assert_eq!(r.column(QUANTITY), Some(CellValue::Integer(1)));
        assert_eq!(r.column(MONTH), Some(CellValue::String("2024-01".into())));
        assert_eq!(r.column("Channel"), Some(CellValue::String("online".into())));
        assert_eq!(r.column("Nope"), None);
    }

    #[test]
    fn dataset_options_follow_first_appearance() {
        let ds = SalesDataset::new(
            vec![
                record("1", None, "West", "B", 1.0),
                record("2", None, "East", "A", 1.0),
                record("3", None, "West", "B", 1.0),
            ],
            Vec::new(),
        );
        assert_eq!(ds.regions(), vec!["West", "East"]);
        assert_eq!(ds.categories(), vec!["B", "A"]);
        assert_eq!(ds.date_bounds(), None);
        assert_eq!(ds.undated_count(), 3);
    }

    #[test]
    fn date_bounds_ignore_nulls() {
        let mut ds = three_rows();
        ds = ds.with_records(
            ds.iter()
                .cloned()
                .chain(std::iter::once(record("3", None, "East", "B", 5.0)))
                .collect(),
        );
        assert_eq!(
            ds.date_bounds(),
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()
            ))
        );
        assert_eq!(ds.dated_only().len(), 3);
    }

    #[test]
    fn schema_puts_month_last() {
        let ds = SalesDataset::new(Vec::new(), vec!["Channel".into()]);
        assert_eq!(ds.columns().first().map(String::as_str), Some(ORDER_ID));
        assert_eq!(ds.columns().last().map(String::as_str), Some(MONTH));
        assert!(ds.has_column("Channel"));
    }

    #[test]
    fn integer_dates_are_epoch_millis() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(CellValue::Integer(1_704_412_800_000).as_date(), Some(expected));
        assert_eq!(CellValue::Integer(1_704_499_199_999).as_date(), Some(expected));
        assert_eq!(CellValue::Float(1.0).as_date(), None);
    }

    #[test]
    fn float_display_drops_trailing_zero_fraction() {
        assert_eq!(CellValue::Float(3.0).to_string(), "3");
        assert_eq!(CellValue::Float(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(CellValue::String(" 4 ".into()).as_i64(), Some(4));
    }
}

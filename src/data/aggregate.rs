//! Summary statistics and grouped rollups over a (filtered) dataset.
//!
//! Every function is total: an empty dataset yields zeros or empty series.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::record::{SalesDataset, SalesRecord};

/// `(group key, summed Total_Penjualan)`.
pub type Rollup = Vec<(String, f64)>;

/// Sum of `Total_Penjualan`.
pub fn total_sales(ds: &SalesDataset) -> f64 {
    ds.iter().map(|r| r.total_sales).sum()
}

/// Number of distinct `OrderID` values.
pub fn order_count(ds: &SalesDataset) -> usize {
    ds.iter()
        .map(|r| r.order_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// `total_sales / order_count`, or 0 when there are no orders.
pub fn average_order_value(ds: &SalesDataset) -> f64 {
    match order_count(ds) {
        0 => 0.0,
        n => total_sales(ds) / n as f64,
    }
}

/// Sum of `Jumlah`, saturating at `i64::MAX`.
pub fn units_sold(ds: &SalesDataset) -> i64 {
    ds.iter().fold(0i64, |acc, r| acc.saturating_add(r.quantity))
}

/// Sales per month-period in chronological order. Undated rows are skipped.
pub fn monthly_sales(ds: &SalesDataset) -> Rollup {
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    for r in ds.iter() {
        if let Some(month) = r.month() {
            *by_month.entry(month).or_default() += r.total_sales;
        }
    }
    by_month.into_iter().collect()
}

/// The `n` best-selling products, largest first. Ties keep first-seen order.
pub fn top_products(ds: &SalesDataset, n: usize) -> Rollup {
    let mut totals = group_in_first_seen_order(ds, |r| &r.product);
    // sort_by is stable, so equal totals stay in first-seen order.
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals.truncate(n);
    totals
}

/// Sales per category in order of first appearance.
pub fn category_distribution(ds: &SalesDataset) -> Rollup {
    group_in_first_seen_order(ds, |r| &r.category)
}

fn group_in_first_seen_order<F>(ds: &SalesDataset, key: F) -> Rollup
where
    F: Fn(&SalesRecord) -> &String,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Rollup = Vec::new();
    for r in ds.iter() {
        let k = key(r);
        let slot = *index.entry(k.as_str()).or_insert_with(|| {
            totals.push((k.clone(), 0.0));
            totals.len() - 1
        });
        totals[slot].1 += r.total_sales;
    }
    totals
}

// ---------------------------------------------------------------------------
// Bundled views
// ---------------------------------------------------------------------------

/// The four headline metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverviewSummary {
    pub total_sales: f64,
    pub order_count: usize,
    pub average_order_value: f64,
    pub units_sold: i64,
}

pub fn summarize(ds: &SalesDataset) -> OverviewSummary {
    OverviewSummary {
        total_sales: total_sales(ds),
        order_count: order_count(ds),
        average_order_value: average_order_value(ds),
        units_sold: units_sold(ds),
    }
}

/// Everything the overview page draws, derived from one filtered dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverviewView {
    pub rows: usize,
    pub summary: OverviewSummary,
    pub monthly: Rollup,
    pub top_products: Rollup,
    pub categories: Rollup,
}

impl OverviewView {
    pub fn compute(ds: &SalesDataset, top_n: usize) -> Self {
        Self {
            rows: ds.len(),
            summary: summarize(ds),
            monthly: monthly_sales(ds),
            top_products: top_products(ds, top_n),
            categories: category_distribution(ds),
        }
    }
}

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::record::{SalesDataset, SalesRecord};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` lies in `[start, end]`. A reversed range contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The three predicates applied to the overview.
///
/// * `date_range`: `None` means no date predicate. When set, undated rows fail.
/// * `regions` / `categories`: an empty set selects nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub date_range: Option<DateRange>,
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl FilterSpec {
    /// Initial selection: every region and category, full date bounds.
    pub fn select_all(dataset: &SalesDataset) -> Self {
        Self {
            date_range: dataset
                .date_bounds()
                .map(|(start, end)| DateRange::new(start, end)),
            regions: dataset.regions().into_iter().collect(),
            categories: dataset.categories().into_iter().collect(),
        }
    }

    /// Whether a single record passes all predicates.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        let date_ok = match self.date_range {
            Some(range) => record.order_date.is_some_and(|d| range.contains(d)),
            None => true,
        };
        date_ok && self.regions.contains(&record.region) && self.categories.contains(&record.category)
    }
}

/// Return the records passing `spec`, in their original order.
pub fn apply(dataset: &SalesDataset, spec: &FilterSpec) -> SalesDataset {
    let records: Vec<SalesRecord> = dataset
        .iter()
        .filter(|r| spec.matches(r))
        .cloned()
        .collect();
    log::debug!("Filter kept {} of {} rows", records.len(), dataset.len());
    dataset.with_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::fixtures::{record, three_rows};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn region_filter_keeps_matching_rows_in_order() {
        let ds = three_rows();
        let mut spec = FilterSpec::select_all(&ds);
        spec.regions = set(&["West"]);
        let out = apply(&ds, &spec);
        assert_eq!(out.records(), &ds.records()[..2]);
    }

    #[test]
    fn select_all_keeps_everything() {
        let ds = three_rows();
        let out = apply(&ds, &FilterSpec::select_all(&ds));
        assert_eq!(out, ds);
    }

    #[test]
    fn empty_region_or_category_selects_nothing() {
        let ds = three_rows();
        let mut spec = FilterSpec::select_all(&ds);
        spec.regions.clear();
        assert!(apply(&ds, &spec).is_empty());

        let mut spec = FilterSpec::select_all(&ds);
        spec.categories.clear();
        spec.date_range = None;
        assert!(apply(&ds, &spec).is_empty());
    }

    #[test]
    fn unknown_region_yields_empty_not_error() {
        let ds = three_rows();
        let mut spec = FilterSpec::select_all(&ds);
        spec.regions = set(&["Atlantis"]);
        assert!(apply(&ds, &spec).is_empty());
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let ds = three_rows();
        let mut spec = FilterSpec::select_all(&ds);
        spec.date_range = Some(DateRange::new(date("2024-01-05"), date("2024-01-05")));
        assert_eq!(apply(&ds, &spec).len(), 2);

        spec.date_range = Some(DateRange::new(date("2024-01-06"), date("2024-02-10")));
        let out = apply(&ds, &spec);
        assert_eq!(out.len(), 1);
        assert_eq!(out.records()[0].order_id, "2");
    }

    #[test]
    fn reversed_range_selects_nothing() {
        let ds = three_rows();
        let mut spec = FilterSpec::select_all(&ds);
        spec.date_range = Some(DateRange::new(date("2024-03-01"), date("2024-01-01")));
        assert!(apply(&ds, &spec).is_empty());
    }

    #[test]
    fn undated_rows_drop_only_under_a_date_predicate() {
        let ds = three_rows();
        let ds = ds.with_records(
            ds.iter()
                .cloned()
                .chain(std::iter::once(record("3", None, "West", "A", 10.0)))
                .collect(),
        );
        let mut spec = FilterSpec::select_all(&ds);
        assert_eq!(apply(&ds, &spec).len(), 3);

        spec.date_range = None;
        assert_eq!(apply(&ds, &spec).len(), 4);
    }

    #[test]
    fn select_all_without_dates_has_no_date_predicate() {
        let ds = SalesDataset::new(vec![record("1", None, "West", "A", 1.0)], Vec::new());
        let spec = FilterSpec::select_all(&ds);
        assert_eq!(spec.date_range, None);
        assert_eq!(apply(&ds, &spec).len(), 1);
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = three_rows();
        let mut spec = FilterSpec::select_all(&ds);
        spec.categories = set(&["B"]);
        let once = apply(&ds, &spec);
        assert_eq!(apply(&once, &spec), once);
    }
}

use chrono::NaiveDate;

use sales_dashboard::data::aggregate::OverviewView;
use sales_dashboard::data::filter::{DateRange, FilterSpec};
use sales_dashboard::error::PredictionFailure;
use sales_dashboard::predict::PredictionOutput;
use sales_dashboard::DashboardContext;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Prediction,
}

impl Page {
    pub fn label(self) -> &'static str {
        match self {
            Page::Overview => "Overview Dashboard",
            Page::Prediction => "Prediksi Penjualan",
        }
    }
}

/// Which multi-select a selection change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    Region,
    Category,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub page: Page,

    /// Current filter selection; starts with everything selected.
    pub filters: FilterSpec,

    /// Filter options in first-appearance order.
    pub region_options: Vec<String>,
    pub category_options: Vec<String>,

    /// Earliest and latest order date; `None` when no date parsed.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,

    /// Derived overview data for the current filters (cached).
    pub overview: OverviewView,

    /// Computed on first visit to the prediction page.
    pub prediction: Option<Result<PredictionOutput, PredictionFailure>>,

    /// Exclude undated rows before predicting.
    pub skip_undated: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    dirty: bool,
}

impl AppState {
    pub fn new(ctx: &DashboardContext) -> Self {
        let dataset = ctx.dataset();
        let filters = FilterSpec::select_all(dataset);
        let status_message = ctx
            .model()
            .err()
            .map(|e| format!("Model unavailable: {e}"));
        Self {
            page: Page::Overview,
            overview: ctx.overview(&filters),
            filters,
            region_options: dataset.regions(),
            category_options: dataset.categories(),
            date_bounds: dataset.date_bounds(),
            prediction: None,
            skip_undated: ctx.config().prediction.skip_undated_rows,
            status_message,
            dirty: false,
        }
    }

    /// Recompute the overview if a filter changed since the last call.
    pub fn refresh(&mut self, ctx: &DashboardContext) {
        if self.dirty {
            self.overview = ctx.overview(&self.filters);
            log::debug!("Overview refreshed: {} rows visible", self.overview.rows);
            self.dirty = false;
        }
    }

    /// Run the model once; later calls reuse the result.
    pub fn ensure_prediction(&mut self, ctx: &DashboardContext) {
        if self.prediction.is_none() {
            self.prediction = Some(ctx.predictions(self.skip_undated));
        }
    }

    pub fn set_skip_undated(&mut self, skip: bool) {
        if self.skip_undated != skip {
            self.skip_undated = skip;
            self.prediction = None;
        }
    }

    /// Replace the date range, clamped to the dataset bounds.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let Some((lo, hi)) = self.date_bounds else {
            return;
        };
        let range = DateRange::new(start.clamp(lo, hi), end.clamp(lo, hi));
        if self.filters.date_range != Some(range) {
            self.filters.date_range = Some(range);
            self.dirty = true;
        }
    }

    /// Toggle a single value in a multi-select.
    pub fn toggle_filter_value(&mut self, column: FilterColumn, value: &str) {
        let selected = self.selection_mut(column);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.dirty = true;
    }

    /// Select all values in a multi-select.
    pub fn select_all(&mut self, column: FilterColumn) {
        let all = match column {
            FilterColumn::Region => self.region_options.clone(),
            FilterColumn::Category => self.category_options.clone(),
        };
        *self.selection_mut(column) = all.into_iter().collect();
        self.dirty = true;
    }

    /// Deselect all values in a multi-select. The overview then shows nothing.
    pub fn select_none(&mut self, column: FilterColumn) {
        self.selection_mut(column).clear();
        self.dirty = true;
    }

    pub fn is_selected(&self, column: FilterColumn, value: &str) -> bool {
        match column {
            FilterColumn::Region => self.filters.regions.contains(value),
            FilterColumn::Category => self.filters.categories.contains(value),
        }
    }

    fn selection_mut(&mut self, column: FilterColumn) -> &mut std::collections::BTreeSet<String> {
        match column {
            FilterColumn::Region => &mut self.filters.regions,
            FilterColumn::Category => &mut self.filters.categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_dashboard::data::loader::load_csv;
    use sales_dashboard::predict::model::parse_model;
    use sales_dashboard::DashboardConfig;

    const CSV: &str = "\
OrderID,Tanggal_Pesanan,Wilayah,Kategori,Produk,Harga_Satuan,Diskon,Jumlah,Total_Penjualan
1,2024-01-05,West,A,Kopi,50,0,2,100
1,2024-01-05,West,A,Teh,25,0,2,50
2,2024-02-10,East,B,Gula,100,0,2,200
";

    fn ctx() -> DashboardContext {
        let ds = load_csv(CSV.as_bytes()).unwrap();
        let model = parse_model(r#"{"feature_names_in": ["Jumlah"], "coefficients": [10.0]}"#);
        DashboardContext::new(DashboardConfig::default(), ds, model)
    }

    #[test]
    fn starts_with_everything_selected() {
        let ctx = ctx();
        let state = AppState::new(&ctx);
        assert_eq!(state.overview.summary.total_sales, 350.0);
        assert_eq!(state.region_options, vec!["West", "East"]);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn select_none_empties_the_overview() {
        let ctx = ctx();
        let mut state = AppState::new(&ctx);
        state.select_none(FilterColumn::Category);
        state.refresh(&ctx);
        assert_eq!(state.overview.rows, 0);
        assert_eq!(state.overview.summary.average_order_value, 0.0);

        state.select_all(FilterColumn::Category);
        state.refresh(&ctx);
        assert_eq!(state.overview.rows, 3);
    }

    #[test]
    fn toggling_a_region_refilters() {
        let ctx = ctx();
        let mut state = AppState::new(&ctx);
        state.toggle_filter_value(FilterColumn::Region, "East");
        state.refresh(&ctx);
        assert!(!state.is_selected(FilterColumn::Region, "East"));
        assert_eq!(state.overview.summary.total_sales, 150.0);
    }

    #[test]
    fn date_range_is_clamped_to_bounds() {
        let ctx = ctx();
        let mut state = AppState::new(&ctx);
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        state.set_date_range(d("2023-01-01"), d("2024-01-31"));
        state.refresh(&ctx);
        assert_eq!(
            state.filters.date_range,
            Some(DateRange::new(d("2024-01-05"), d("2024-01-31")))
        );
        assert_eq!(state.overview.monthly.len(), 1);
    }

    #[test]
    fn prediction_is_cached_until_mode_changes() {
        let ctx = ctx();
        let mut state = AppState::new(&ctx);
        state.ensure_prediction(&ctx);
        let first = state.prediction.clone().unwrap().unwrap();
        assert_eq!(first.predictions(), &[20.0, 20.0, 20.0]);
        state.set_skip_undated(true);
        assert!(state.prediction.is_none());
    }
}

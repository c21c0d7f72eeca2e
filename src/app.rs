use eframe::egui;

use sales_dashboard::DashboardContext;

use crate::color::CategoryColors;
use crate::state::{AppState, Page};
use crate::ui::{overview, panels, prediction};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub ctx: DashboardContext,
    pub state: AppState,
    colors: CategoryColors,
}

impl SalesDashboardApp {
    pub fn new(ctx: DashboardContext) -> Self {
        let state = AppState::new(&ctx);
        let colors = CategoryColors::new(&state.category_options);
        Self { ctx, state, colors }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: status bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state, &self.ctx);
        });

        // ---- Left side panel: navigation + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // Recompute derived views after any filter change.
        self.state.refresh(&self.ctx);

        // ---- Central panel: selected page ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::Overview => overview::overview_page(ui, &self.state, &self.colors),
            Page::Prediction => {
                self.state.ensure_prediction(&self.ctx);
                let cfg = &self.ctx.config().prediction;
                prediction::prediction_page(ui, &mut self.state, cfg.preview_rows, cfg.histogram_bins);
            }
        });
    }
}

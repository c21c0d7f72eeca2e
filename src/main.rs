mod app;
mod color;
mod state;
mod ui;

use anyhow::Context;
use app::SalesDashboardApp;
use eframe::egui;
use sales_dashboard::{DashboardConfig, DashboardContext};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load().context("loading dashboard configuration")?;
    let data_path = config.data.path.clone();
    let dashboard = match DashboardContext::load(config) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            log::error!("Failed to load {}: {e}", data_path.display());
            return Err(e).with_context(|| format!("loading sales data from {}", data_path.display()));
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Dashboard Analisis Penjualan",
        options,
        Box::new(|_cc| Ok(Box::new(SalesDashboardApp::new(dashboard)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use sales_dashboard::DashboardContext;

use crate::state::{AppState, FilterColumn, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left navigation / filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Pengaturan & Navigasi");
    ui.separator();

    ui.strong("Pilih Halaman:");
    for page in [Page::Overview, Page::Prediction] {
        ui.radio_value(&mut state.page, page, page.label());
    }
    ui.separator();

    if state.page != Page::Overview {
        return;
    }

    ui.heading("Filter Data Dashboard");

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            date_range_picker(ui, state);
            ui.separator();
            multi_select(ui, state, FilterColumn::Region, "Pilih Wilayah");
            multi_select(ui, state, FilterColumn::Category, "Pilih Kategori Produk");
        });
}

fn date_range_picker(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Pilih Rentang Tanggal:");
    let Some(range) = state.filters.date_range else {
        ui.label("No parseable order dates.");
        return;
    };

    let mut start = range.start;
    let mut end = range.end;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("From");
        ui.add(DatePickerButton::new(&mut start).id_salt("date_start"));
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("To");
        ui.add(DatePickerButton::new(&mut end).id_salt("date_end"));
    });
    if start != range.start || end != range.end {
        state.set_date_range(start, end);
    }
}

fn multi_select(ui: &mut Ui, state: &mut AppState, column: FilterColumn, title: &str) {
    let options = match column {
        FilterColumn::Region => state.region_options.clone(),
        FilterColumn::Category => state.category_options.clone(),
    };
    let n_selected = options
        .iter()
        .filter(|v| state.is_selected(column, v))
        .count();
    let header_text = format!("{title}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            // Select all / none buttons
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(column);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(column);
                }
            });

            for value in &options {
                let mut checked = state.is_selected(column, value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    state.toggle_filter_value(column, value);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top status bar.
pub fn top_bar(ui: &mut Ui, state: &AppState, ctx: &DashboardContext) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Dashboard Analisis Penjualan");
        ui.separator();

        ui.label(format!(
            "{} rows loaded from {}, {} visible",
            ctx.dataset().len(),
            ctx.data_path().display(),
            state.overview.rows
        ));

        ui.separator();

        match ctx.model() {
            Ok(model) => {
                ui.label(format!("Model: {}", model.describe()));
            }
            Err(_) => {
                ui.label(RichText::new("Model: unavailable").color(Color32::RED));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use sales_dashboard::data::aggregate::{OverviewSummary, Rollup};

use crate::color::{sequential, CategoryColors};
use crate::state::AppState;
use crate::ui::{format_rupiah, format_thousands};

const CHART_HEIGHT: f32 = 400.0;

// ---------------------------------------------------------------------------
// Overview page (central panel)
// ---------------------------------------------------------------------------

/// Render metrics and charts for the current filter selection.
pub fn overview_page(ui: &mut Ui, state: &AppState, colors: &CategoryColors) {
    let view = &state.overview;

    ui.heading("Ringkasan Performa Penjualan");
    metric_row(ui, &view.summary);
    ui.add_space(8.0);

    if view.rows == 0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No rows match the current filters.");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Tren Penjualan Bulanan");
            monthly_chart(ui, &view.monthly);
            ui.separator();

            ui.heading("Top Product & Distribusi Penjualan");
            ui.columns(2, |cols| {
                cols[0].strong(format!("Top {} Produk", view.top_products.len()));
                top_products_chart(&mut cols[0], &view.top_products);
                cols[1].strong("Distribusi Penjualan per Kategori");
                category_chart(&mut cols[1], &view.categories, colors);
            });
        });
}

fn metric_row(ui: &mut Ui, summary: &OverviewSummary) {
    let cards = [
        ("Total Penjualan", format_rupiah(summary.total_sales)),
        ("Jumlah Pesanan", format_thousands(summary.order_count as f64)),
        ("Avg. Order Value", format_rupiah(summary.average_order_value)),
        ("Produk Terjual", format_thousands(summary.units_sold as f64)),
    ];
    ui.columns(cards.len(), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(cards) {
            col.label(RichText::new(label).color(Color32::GRAY));
            col.label(RichText::new(value).size(22.0).strong());
        }
    });
}

/// x-axis label for integer grid marks that index into `labels`.
fn index_label(labels: &[String], mark: GridMark) -> String {
    let idx = mark.value.round();
    if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn monthly_chart(ui: &mut Ui, monthly: &Rollup) {
    let labels: Vec<String> = monthly.iter().map(|(m, _)| m.clone()).collect();
    let points: Vec<[f64; 2]> = monthly
        .iter()
        .enumerate()
        .map(|(i, (_, total))| [i as f64, *total])
        .collect();

    Plot::new("monthly_sales")
        .height(CHART_HEIGHT)
        .x_axis_label("Bulan")
        .y_axis_label("Total_Penjualan")
        .x_axis_formatter(move |mark, _range| index_label(&labels, mark))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Total Penjualan per Bulan")
                    .width(2.0),
            );
            plot_ui.points(Points::new(PlotPoints::from(points)).radius(4.0));
        });
}

fn top_products_chart(ui: &mut Ui, products: &Rollup) {
    let max = products.first().map_or(0.0, |(_, v)| *v);
    let n = products.len();
    // Largest on top: rank 0 gets the highest y position.
    let labels: Vec<String> = products.iter().rev().map(|(p, _)| p.clone()).collect();
    let bars: Vec<Bar> = products
        .iter()
        .enumerate()
        .map(|(rank, (product, total))| {
            let t = if max > 0.0 { total / max } else { 0.0 };
            Bar::new((n - 1 - rank) as f64, *total)
                .name(product)
                .fill(sequential(t))
                .width(0.7)
        })
        .collect();

    Plot::new("top_products")
        .height(CHART_HEIGHT)
        .x_axis_label("Total_Penjualan")
        .y_axis_formatter(move |mark, _range| index_label(&labels, mark))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn category_chart(ui: &mut Ui, categories: &Rollup, colors: &CategoryColors) {
    let grand_total: f64 = categories.iter().map(|(_, v)| v).sum();
    let labels: Vec<String> = categories.iter().map(|(c, _)| c.clone()).collect();

    Plot::new("category_share")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Share (%)")
        .x_axis_formatter(move |mark, _range| index_label(&labels, mark))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, (category, total)) in categories.iter().enumerate() {
                let share = if grand_total > 0.0 { total / grand_total * 100.0 } else { 0.0 };
                let color = colors.color_for(category);
                let bar = Bar::new(i as f64, share).fill(color).width(0.7);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .name(format!("{category} ({share:.1}%)"))
                        .color(color),
                );
            }
        });
}

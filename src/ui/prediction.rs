use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};

use sales_dashboard::data::record::ORDER_ID;
use sales_dashboard::predict::adapter::PREDICTION;
use sales_dashboard::predict::PredictionOutput;

use crate::state::AppState;
use crate::ui::format_thousands;

// ---------------------------------------------------------------------------
// Histogram bucketing
// ---------------------------------------------------------------------------

/// One equal-width histogram bucket `[start, end)`; the last bucket is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Bucket finite `values` into `bins` equal-width bins spanning min..=max.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min - 0.5,
            end: max + 0.5,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for v in finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Prediction page (central panel)
// ---------------------------------------------------------------------------

pub fn prediction_page(ui: &mut Ui, state: &mut AppState, preview_rows: usize, bins: usize) {
    ui.heading("Prediksi Penjualan per Baris Data");

    let mut skip = state.skip_undated;
    if ui
        .checkbox(&mut skip, "Skip rows without a valid order date")
        .changed()
    {
        state.set_skip_undated(skip);
        return;
    }
    ui.separator();

    match &state.prediction {
        None => {
            ui.spinner();
        }
        Some(Err(e)) => {
            ui.label(RichText::new(format!("Prediction unavailable: {e}")).color(Color32::RED));
        }
        Some(Ok(output)) => {
            ui.label(format!("{} rows predicted", output.len()));
            preview_table(ui, output, preview_rows);
            ui.add_space(12.0);
            ui.heading("Distribusi Nilai Prediksi");
            histogram_chart(ui, output.predictions(), bins);
        }
    }
}

fn preview_table(ui: &mut Ui, output: &PredictionOutput, rows: usize) {
    let preview = output.preview(rows);
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(100.0))
        .column(Column::remainder())
        .header(22.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong(ORDER_ID);
            });
            header.col(|ui: &mut Ui| {
                ui.strong(PREDICTION);
            });
        })
        .body(|mut body| {
            for (order_id, value) in &preview {
                body.row(20.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(order_id);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format_thousands(*value));
                    });
                });
            }
        });
}

fn histogram_chart(ui: &mut Ui, predictions: &[f64], bins: usize) {
    let bars: Vec<Bar> = histogram(predictions, bins)
        .into_iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("{} – {}", format_thousands(b.start), format_thousands(b.end)))
        })
        .collect();

    Plot::new("prediction_histogram")
        .height(320.0)
        .x_axis_label(PREDICTION)
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(99, 110, 250)));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_value_once() {
        let values = [1.0, 2.0, 2.5, 3.0, 10.0];
        let bins = histogram(&values, 3);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].count, 4);
        assert_eq!(bins[2].count, 1, "max lands in the last bin");
        assert_eq!(bins[0].start, 1.0);
        assert_eq!(bins[2].end, 10.0);
    }

    #[test]
    fn constant_values_make_one_bin() {
        let bins = histogram(&[5.0, 5.0], 30);
        assert_eq!(bins, vec![HistogramBin { start: 4.5, end: 5.5, count: 2 }]);
    }

    #[test]
    fn empty_and_non_finite_inputs() {
        assert!(histogram(&[], 10).is_empty());
        assert!(histogram(&[f64::NAN], 10).is_empty());
        assert!(histogram(&[1.0, 2.0], 0).is_empty());
    }
}

use eframe::egui::{self, Ui};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints};

use ionic_trends::data::model::Strategy;
use ionic_trends::data::scale::ScaleMode;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Trends plot (central panel)
// ---------------------------------------------------------------------------

fn line_style(strategy: Strategy) -> LineStyle {
    match strategy {
        Strategy::TS => LineStyle::Solid,
        Strategy::KW => LineStyle::dashed_loose(),
        Strategy::TI => LineStyle::dotted_dense(),
    }
}

/// Axis tick for a log10 value, shown as the publication count it stands for.
fn log_tick_label(exponent: f64) -> String {
    let value = 10f64.powf(exponent);
    if value >= 1.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Render the publication trends chart in the central panel.
pub fn trends_plot(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a publication table to begin  (File → Open…)");
            });
            return;
        }
    };

    if let Some(hint) = state.empty_hint() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(egui::RichText::new(hint).size(16.0));
        });
        return;
    }

    let range = state.criteria.year_range;
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(format!(
            "Publication Trends ({}–{})",
            range.start(),
            range.end()
        ));
    });

    let log_scale = state.scale == ScaleMode::Log;
    let mut plot = Plot::new("trends_plot")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label(if log_scale {
            "Number of Publications (log scale)"
        } else {
            "Number of Publications"
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |name, value| {
            if name.is_empty() {
                return String::new();
            }
            let count = if log_scale { 10f64.powf(value.y) } else { value.y };
            format!("{name}\nYear: {:.0}\nPublications: {count:.0}", value.x)
        });
    if log_scale {
        plot = plot.y_axis_formatter(|mark, _range| log_tick_label(mark.value));
    }

    plot.show(ui, |plot_ui| {
        // Largest series first so smaller ones are drawn on top.
        for total in state.view.counts.ranked_totals() {
            let Some(points) = state.view.display.get(&total.key) else {
                continue;
            };

            let points: PlotPoints = points
                .iter()
                .map(|p| [f64::from(p.year), p.value])
                .collect();

            let line = Line::new(points)
                .name(dataset.topic_names.series_label(total.key))
                .color(state.colors.color_for(total.key.topic))
                .style(line_style(total.key.strategy))
                .width(3.0_f32)
                .fill(0.0_f32);

            plot_ui.line(line);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_ticks_show_counts() {
        assert_eq!(log_tick_label(0.0), "1");
        assert_eq!(log_tick_label(3.0), "1000");
        assert_eq!(log_tick_label(-1.0), "0.10");
    }
}

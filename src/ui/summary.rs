use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Analysis summary (bottom panel)
// ---------------------------------------------------------------------------

/// `1234567` → `"1,234,567"`.
fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn summary_panel(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let criteria = &state.criteria;

    ui.heading("Analysis Summary");
    ui.separator();

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.columns(3, |cols| {
            cols[0].strong("Selected Topics:");
            for topic in &criteria.topics {
                cols[0].label(format!("• {topic}: {}", dataset.topic_names.name(*topic)));
            }

            cols[1].strong("Search Strategies:");
            for strategy in &criteria.strategies {
                cols[1].label(format!("• {}", strategy.description()));
            }

            cols[2].strong("Analysis Parameters:");
            cols[2].label(format!(
                "• Period: {}–{}",
                criteria.year_range.start(),
                criteria.year_range.end()
            ));
            cols[2].label(format!("• Y-axis: {} scale", state.scale));
            cols[2].label(format!(
                "• Data points: {}",
                with_thousands(state.view.counts.point_count() as u64)
            ));
        });

        if state.view.counts.is_empty() {
            return;
        }

        ui.add_space(8.0);
        ui.strong("Top Publication Combinations:");
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(240.0))
            .column(Column::auto().at_least(120.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Research Topic");
                });
                header.col(|ui| {
                    ui.strong("Search Strategy");
                });
                header.col(|ui| {
                    ui.strong("Total Publications");
                });
            })
            .body(|mut body| {
                for total in state
                    .view
                    .counts
                    .ranked_totals()
                    .into_iter()
                    .take(state.config.top_n)
                {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(dataset.topic_names.name(total.key.topic));
                        });
                        row.col(|ui| {
                            ui.label(total.key.strategy.code());
                        });
                        row.col(|ui| {
                            ui.label(with_thousands(total.total as u64));
                        });
                    });
                }
            });
    });
}

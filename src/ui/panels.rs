use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use ionic_trends::data::model::{Strategy, TopicId, YearRange};
use ionic_trends::data::scale::ScaleMode;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – analysis controls
// ---------------------------------------------------------------------------

/// Render the left control panel. All widgets edit a copy of the criteria,
/// which replaces the current one once at the end of the frame.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analysis Controls");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut next = state.criteria.clone();
    let mut scale = state.scale;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(
                "Explore publication trends in ionic liquid research for electrochemistry. \
                 Select topics, search strategies and a period to compare growth over time.",
            );
            ui.add_space(8.0);

            // ---- Research topics ----
            ui.strong("Research Topics");
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    next = TopicId::all().fold(next.clone(), |c, t| c.with_topic(t, true));
                }
                if ui.small_button("None").clicked() {
                    next = TopicId::all().fold(next.clone(), |c, t| c.with_topic(t, false));
                }
            });
            for topic in TopicId::all() {
                let label = format!("{topic}: {}", dataset.topic_names.name(topic));
                let text = RichText::new(label).color(state.colors.color_for(topic));
                let mut checked = next.topics.contains(&topic);
                if ui.checkbox(&mut checked, text).changed() {
                    next = next.with_topic(topic, checked);
                }
            }
            ui.add_space(8.0);

            // ---- Search strategies ----
            ui.strong("Search Strategies");
            for strategy in Strategy::ALL {
                let mut checked = next.strategies.contains(&strategy);
                if ui.checkbox(&mut checked, strategy.description()).changed() {
                    next = next.with_strategy(strategy, checked);
                }
            }
            ui.add_space(8.0);

            // ---- Analysis period ----
            ui.strong("Analysis Period");
            let bounds = state.year_bounds();
            let mut start = next.year_range.start();
            let mut end = next.year_range.end();
            let start_changed = ui
                .add(egui::Slider::new(&mut start, bounds.start()..=bounds.end()).text("From"))
                .changed();
            let end_changed = ui
                .add(egui::Slider::new(&mut end, bounds.start()..=bounds.end()).text("To"))
                .changed();
            if start_changed && start > end {
                end = start;
            }
            if end_changed && end < start {
                start = end;
            }
            if start_changed || end_changed {
                match YearRange::new(start, end) {
                    Ok(range) => next = next.with_year_range(range),
                    Err(e) => log::warn!("Ignoring slider input: {e}"),
                }
            }
            ui.add_space(8.0);

            // ---- Y-axis scale ----
            ui.strong("Y-Axis Scale");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut scale, ScaleMode::Linear, "Linear");
                ui.radio_value(&mut scale, ScaleMode::Log, "Log");
            });
        });

    state.set_criteria(next);
    state.set_scale(scale);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = !state.view.is_empty();
            if ui
                .add_enabled(can_export, egui::Button::new("Download Filtered Data (CSV)…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.view.records.len()
            ));
        }
        if let Some(path) = &state.data_path {
            ui.separator();
            ui.label(RichText::new(path.display().to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open publication table")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(state.export_file_name())
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_to(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

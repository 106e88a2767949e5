use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, summary};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TrendsApp {
    pub state: AppState,
}

impl TrendsApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for TrendsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: analysis controls ----
        egui::SidePanel::left("controls_panel")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: analysis summary ----
        egui::TopBottomPanel::bottom("summary_panel")
            .default_height(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                summary::summary_panel(ui, &self.state);
            });

        // ---- Central panel: trends chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::trends_plot(ui, &self.state);
        });
    }
}

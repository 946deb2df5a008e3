use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct SalaryDashApp {
    pub state: AppState,
}

impl SalaryDashApp {
    /// Open the configured dataset, if any, before the first frame.
    pub fn new(config: &DashboardConfig) -> Self {
        let mut app = Self::default();
        if let Some(path) = &config.dataset_path {
            app.state.load_path(path);
        }
        app
    }
}

impl eframe::App for SalaryDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selector and number displays ----
        egui::SidePanel::left("summary_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::charts(ui, &mut self.state);
        });
    }
}

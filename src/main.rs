use eframe::egui;
use salary_dash::app::SalaryDashApp;
use salary_dash::config::{DashboardConfig, WINDOW_MIN_SIZE, WINDOW_SIZE};

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_env();
    log::info!("Starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_min_inner_size(WINDOW_MIN_SIZE),
        ..Default::default()
    };

    eframe::run_native(
        "Faculty Salary Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(SalaryDashApp::new(&config)))),
    )
}

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::dashboard::SalaryDashboard;
use crate::state::AppState;
use crate::ui::plot::format_percent;

// ---------------------------------------------------------------------------
// Left side panel – selector, number displays, group readouts
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Faculty Salaries");
    ui.separator();

    let Some(dashboard) = &state.dashboard else {
        ui.label("No dataset loaded.");
        return;
    };

    // ---- Discipline select menu ----
    ui.strong("Discipline");
    let options = match dashboard.discipline_options() {
        Ok(options) => options,
        Err(e) => {
            ui.label(format!("Error: {e}"));
            Vec::new()
        }
    };
    let current = dashboard.selected_discipline();
    let mut choice: Option<Option<String>> = None;
    egui::ComboBox::from_id_salt("discipline_selector")
        .selected_text(current.clone().unwrap_or_else(|| "Select All".to_string()))
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), "Select All").clicked() {
                choice = Some(None);
            }
            for (discipline, count) in &options {
                let selected = current.as_deref() == Some(discipline.as_str());
                if ui
                    .selectable_label(selected, format!("{discipline}: {count}"))
                    .clicked()
                {
                    choice = Some(Some(discipline.clone()));
                }
            }
        });
    ui.separator();

    // ---- Percent professors ----
    for view in &dashboard.percent_professors {
        let text = match dashboard.professor_ratio(view) {
            Ok(ratio) => format_percent(ratio),
            Err(e) => format!("error: {e}"),
        };
        ui.label(format!("Percent of {} professors", view.gender.to_lowercase()));
        ui.label(RichText::new(text).size(24.0).strong());
    }
    ui.separator();

    // ---- Group readouts ----
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            group_tables(ui, dashboard);
        });

    if let Some(choice) = choice {
        state.select_discipline(choice.as_deref());
    }
}

/// One collapsible table per bar chart, listing every key and its value.
fn group_tables(ui: &mut Ui, dashboard: &SalaryDashboard) {
    for view in [&dashboard.gender_balance, &dashboard.average_salary] {
        let Ok(bars) = dashboard.bars(view) else {
            continue;
        };
        egui::CollapsingHeader::new(RichText::new(view.title).strong())
            .id_salt(view.title)
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                ui.push_id(view.title, |ui: &mut Ui| {
                    TableBuilder::new(ui)
                        .striped(true)
                        .column(Column::auto())
                        .column(Column::remainder())
                        .header(18.0, |mut header| {
                            header.col(|ui| {
                                ui.strong(view.x_label);
                            });
                            header.col(|ui| {
                                ui.strong("Value");
                            });
                        })
                        .body(|mut body| {
                            for bar in &bars {
                                body.row(18.0, |mut row| {
                                    row.col(|ui| {
                                        ui.label(bar.key.to_string());
                                    });
                                    row.col(|ui| {
                                        ui.label(format!("{}", bar.value));
                                    });
                                });
                            }
                        });
                });
            });
    }
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
        });

        ui.separator();

        if ui.button("Reset filters").clicked() {
            state.reset_filters();
        }

        if ui.button("Copy snapshot").clicked() {
            if let Some(json) = state.snapshot_json() {
                ui.ctx().copy_text(json);
            }
        }

        ui.separator();

        if let Some(dashboard) = &state.dashboard {
            let index = dashboard.index();
            ui.label(format!(
                "{} selected out of {} records",
                index.visible_count(),
                index.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open salary data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("Delimited text", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

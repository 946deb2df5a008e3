use eframe::egui::{self, Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoint, PlotPoints, Points};

use crate::color::{BAR_FILL, DESELECTED};
use crate::config::{BAR_CHART_SIZE, SCATTER_SIZE};
use crate::dashboard::{BarView, ScatterView, StackedBarView};
use crate::data::index::DimensionId;
use crate::data::model::Key;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – chart grid
// ---------------------------------------------------------------------------

/// A click on an ordinal chart, applied after rendering.
struct Click {
    dimension: DimensionId,
    key: Key,
}

/// Render every chart in the central panel.
pub fn charts(ui: &mut Ui, state: &mut AppState) {
    let Some(dashboard) = &state.dashboard else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a salary dataset to begin  (File → Open…)");
        });
        return;
    };

    let mut click = None;
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                click = click.take().or(bar_chart(ui, state, &dashboard.gender_balance));
                click = click.take().or(bar_chart(ui, state, &dashboard.average_salary));
                click = click.take().or(stacked_chart(ui, state, &dashboard.rank_distribution));
            });
            ui.separator();
            scatter_plot(ui, state, &dashboard.service_salary);
            ui.separator();
            scatter_plot(ui, state, &dashboard.phd_salary);
        });

    if let Some(Click { dimension, key }) = click {
        state.toggle_filter(dimension, &key);
    }
}

/// Bars sit at x = 0, 1, 2…; label the integer ticks with their keys.
fn ordinal_formatter(keys: Vec<Key>) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let i = mark.value.round();
        if (mark.value - i).abs() > f64::EPSILON || i < 0.0 {
            return String::new();
        }
        keys.get(i as usize).map(|k| k.to_string()).unwrap_or_default()
    }
}

/// Key under the pointer when the plot was clicked.
fn clicked_key(clicked: bool, pointer: Option<PlotPoint>, keys: &[Key]) -> Option<Key> {
    if !clicked {
        return None;
    }
    let x = pointer?.x.round();
    if x < 0.0 {
        return None;
    }
    keys.get(x as usize).cloned()
}

fn bar_chart(ui: &mut Ui, state: &AppState, view: &BarView) -> Option<Click> {
    let dashboard = state.dashboard.as_ref()?;
    let bars = match dashboard.bars(view) {
        Ok(bars) => bars,
        Err(e) => {
            ui.label(format!("{}: {e}", view.title));
            return None;
        }
    };
    let filtered = bars.iter().any(|b| b.selected);
    let keys: Vec<Key> = bars.iter().map(|b| b.key.clone()).collect();

    let plot_bars: Vec<Bar> = bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let fill = if filtered && !b.selected { DESELECTED } else { BAR_FILL };
            Bar::new(i as f64, b.value)
                .name(format!("{}: {}", b.key, b.value))
                .fill(fill)
                .width(0.6)
        })
        .collect();

    let mut clicked = None;
    ui.vertical(|ui: &mut Ui| {
        ui.strong(view.title);
        let response = Plot::new(view.title)
            .width(BAR_CHART_SIZE[0])
            .height(BAR_CHART_SIZE[1])
            .x_axis_label(view.x_label)
            .x_axis_formatter(ordinal_formatter(keys.clone()))
            .include_y(0.0)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(plot_bars));
                plot_ui.pointer_coordinate()
            });
        clicked = clicked_key(response.response.clicked(), response.inner, &keys)
            .map(|key| Click { dimension: view.dimension, key });
    });
    clicked
}

fn stacked_chart(ui: &mut Ui, state: &AppState, view: &StackedBarView) -> Option<Click> {
    let dashboard = state.dashboard.as_ref()?;
    let layers = match dashboard.stacked(view) {
        Ok(layers) => layers,
        Err(e) => {
            ui.label(format!("{}: {e}", view.title));
            return None;
        }
    };
    let keys: Vec<Key> = layers
        .first()
        .map(|l| l.bars.iter().map(|b| b.key.clone()).collect())
        .unwrap_or_default();

    let mut charts: Vec<BarChart> = Vec::with_capacity(layers.len());
    for layer in &layers {
        let color = state.rank_colors.color_for_text(layer.label);
        let bars: Vec<Bar> = layer
            .bars
            .iter()
            .enumerate()
            .map(|(i, b)| Bar::new(i as f64, b.value).name(format!("{}: {:.1}%", b.key, b.value)).width(0.6))
            .collect();
        let refs: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars).name(layer.label).color(color).stack_on(&refs);
        charts.push(chart);
    }

    let mut clicked = None;
    ui.vertical(|ui: &mut Ui| {
        ui.strong(view.title);
        let response = Plot::new(view.title)
            .width(BAR_CHART_SIZE[0])
            .height(BAR_CHART_SIZE[1])
            .legend(Legend::default())
            .x_axis_formatter(ordinal_formatter(keys.clone()))
            .include_y(0.0)
            .include_y(100.0)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show(ui, |plot_ui| {
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
                plot_ui.pointer_coordinate()
            });
        clicked = clicked_key(response.response.clicked(), response.inner, &keys)
            .map(|key| Click { dimension: view.dimension, key });
    });
    clicked
}

fn scatter_plot(ui: &mut Ui, state: &AppState, view: &ScatterView) {
    let Some(dashboard) = &state.dashboard else {
        return;
    };
    ui.strong(view.title);

    // A view without a domain is unusable; the other charts still render.
    let (min_x, max_x) = match &view.domain {
        Ok(domain) => *domain,
        Err(e) => {
            ui.label(format!("{}: {e}", view.title));
            return;
        }
    };
    let points = match dashboard.scatter_points(view) {
        Ok(points) => points,
        Err(e) => {
            ui.label(format!("{}: {e}", view.title));
            return;
        }
    };

    // One series per (rank, sex) so the hover label can name the rank while
    // the colour follows gender.
    let mut series: std::collections::BTreeMap<(String, String), Vec<[f64; 2]>> =
        std::collections::BTreeMap::new();
    for p in &points {
        series
            .entry((p.rank.clone(), p.sex.clone()))
            .or_default()
            .push([p.x as f64, p.salary as f64]);
    }

    Plot::new(view.title)
        .width(SCATTER_SIZE[0])
        .height(SCATTER_SIZE[1])
        .legend(Legend::default())
        .x_axis_label(view.x_label)
        .y_axis_label("Salary")
        .include_x(min_x as f64)
        .include_x(max_x as f64)
        .label_formatter(|name, value| {
            let rank = name.split(" (").next().unwrap_or_default();
            if rank.is_empty() {
                String::new()
            } else {
                format!("{rank} earned {:.0}", value.y)
            }
        })
        .show(ui, |plot_ui| {
            for ((rank, sex), coords) in series {
                let color: Color32 = state.gender_colors.color_for_text(&sex);
                plot_ui.points(
                    Points::new(PlotPoints::from(coords))
                        .name(format!("{rank} ({sex})"))
                        .color(color)
                        .radius(4.0),
                );
            }
        });
}

/// `.2%` formatting used by the percent-professors displays.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

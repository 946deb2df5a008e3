use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::dashboard::{RANK_LAYERS, SalaryDashboard};
use crate::data::index::DimensionId;
use crate::data::loader;
use crate::data::model::{Key, Record};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Built dashboard (None until a dataset is loaded).
    pub dashboard: Option<SalaryDashboard>,

    /// File the current dataset came from.
    pub source: Option<PathBuf>,

    /// Scatter colours.
    pub gender_colors: ColorMap,

    /// Stacked rank layer colours.
    pub rank_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dashboard: None,
            source: None,
            gender_colors: ColorMap::gender(),
            rank_colors: ColorMap::generated(RANK_LAYERS.iter().map(|(_, label)| *label)),
            status_message: None,
        }
    }
}

impl AppState {
    /// Build a fresh dashboard over `records`, replacing any previous one.
    pub fn set_records(&mut self, records: Vec<Record>) -> Result<()> {
        let dashboard = SalaryDashboard::build(records).context("building dashboard")?;
        self.dashboard = Some(dashboard);
        self.status_message = None;
        Ok(())
    }

    /// Load `path` and rebuild the dashboard. On failure the previous
    /// dashboard stays and the error is shown in the status bar.
    pub fn load_path(&mut self, path: &Path) {
        let result = loader::load_file(path)
            .with_context(|| format!("loading {}", path.display()))
            .and_then(|records| self.set_records(records));
        match result {
            Ok(()) => {
                log::info!("Dashboard ready for {}", path.display());
                self.source = Some(path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Toggle `key` on an ordinal chart's dimension.
    pub fn toggle_filter(&mut self, dimension: DimensionId, key: &Key) {
        let Some(dashboard) = &mut self.dashboard else {
            return;
        };
        if let Err(e) = dashboard.toggle(dimension, key) {
            self.report(e);
        }
    }

    /// Select a single discipline, or all of them.
    pub fn select_discipline(&mut self, discipline: Option<&str>) {
        let Some(dashboard) = &mut self.dashboard else {
            return;
        };
        if let Err(e) = dashboard.select_discipline(discipline) {
            self.report(e);
        }
    }

    pub fn reset_filters(&mut self) {
        if let Some(dashboard) = &mut self.dashboard {
            dashboard.reset_filters();
        }
    }

    /// Serialized group values for the clipboard.
    pub fn snapshot_json(&self) -> Option<String> {
        let dashboard = self.dashboard.as_ref()?;
        match dashboard.snapshot_json() {
            Ok(json) => Some(json),
            Err(e) => {
                log::error!("Failed to serialize snapshot: {e}");
                None
            }
        }
    }

    fn report(&mut self, e: impl std::fmt::Display) {
        log::error!("{e}");
        self.status_message = Some(format!("Error: {e}"));
    }
}

use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Window / chart sizes
// ---------------------------------------------------------------------------

pub const WINDOW_SIZE: [f32; 2] = [1280.0, 900.0];
pub const WINDOW_MIN_SIZE: [f32; 2] = [800.0, 600.0];

pub const BAR_CHART_SIZE: [f32; 2] = [400.0, 300.0];
pub const SCATTER_SIZE: [f32; 2] = [800.0, 400.0];

/// Environment variable naming the dataset to open at startup.
pub const DATA_ENV: &str = "SALARY_DASH_DATA";

/// Dataset opened at startup when [`DATA_ENV`] is unset.
pub const DEFAULT_DATA_PATH: &str = "data/Salaries.csv";

// ---------------------------------------------------------------------------
// Startup configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardConfig {
    /// File to load before the first frame, if any.
    pub dataset_path: Option<PathBuf>,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::resolve(std::env::var_os(DATA_ENV).map(PathBuf::from), |p| p.is_file())
    }

    /// An explicit path always wins; otherwise use [`DEFAULT_DATA_PATH`] when
    /// it exists.
    fn resolve(explicit: Option<PathBuf>, exists: impl Fn(&Path) -> bool) -> Self {
        let dataset_path = explicit.or_else(|| {
            let default = PathBuf::from(DEFAULT_DATA_PATH);
            exists(&default).then_some(default)
        });
        DashboardConfig { dataset_path }
    }
}

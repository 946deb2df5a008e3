//! Cross-filtered dashboard over a faculty-salary dataset.
//!
//! The `data` module holds the reusable part: a dimensional index whose
//! groups are kept current by add/remove deltas as filters change.
//! `dashboard` binds the salary views to it and the remaining modules draw
//! them with egui.

pub mod app;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod state;
pub mod ui;

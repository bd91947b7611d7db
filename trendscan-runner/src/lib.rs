//! TrendScan Runner: everything around the screening engine that touches
//! the outside world.
//!
//! This crate builds on `trendscan-core` to provide:
//! - Application config file (`[screen]`, `[data]`, `[output]`, `[logging]`)
//! - Panel loading from a CSV directory, or a seeded synthetic panel
//! - Single-flight run gate with deadline-bounded execution
//! - Report rendering (text, watchlist, JSON, CSV, Markdown) and artifacts
//! - Tracing subscriber initialisation

pub mod config;
pub mod data_loader;
pub mod logging;
pub mod report;
pub mod run_gate;
pub mod runner;
pub mod synthetic;

pub use config::{
    AppConfig, ConfigError, DataConfig, LogFormat, LoggingConfig, OutputConfig, OutputFormat,
};
pub use data_loader::{load_panel_dir, LoadError, LoadOptions, LoadedPanel, SkippedFile};
pub use logging::init_logging;
pub use report::{
    export_candidates_csv, export_json, generate_markdown, import_json, render_text,
    render_watchlist, save_artifacts,
};
pub use run_gate::{run_with_deadline, RunGate, RunToken};
pub use runner::{load_panel, run_scan, scan_panel, PanelSource, RunError, ScanOutcome};
pub use synthetic::SyntheticPanel;

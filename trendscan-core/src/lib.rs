//! TrendScan Core: cross-sectional screening of an hourly panel.
//!
//! This crate contains the whole screening engine:
//! - Domain types (bars, panel, candidates, hashes)
//! - Indicator library (EMA, ATR, rolling slope, percentile rank, rolling extremes)
//! - Benchmark alignment and timeframe resampling
//! - Screening stages: preprocessing, noise gate, relative strength, trend gate,
//!   setup detection, bucketing and scoring
//! - The pipeline chaining them over one snapshot
//!
//! No I/O happens here; loading panels and rendering reports live in
//! `trendscan-runner`.

pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod screen;

pub use domain::{Bar, Bucket, Candidate, Panel, SetupKind};
pub use screen::{ScreenConfig, ScreenError, ScreenReport, ScreeningPipeline};

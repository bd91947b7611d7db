//! Screening stages and the pipeline that chains them.

pub mod config;
pub mod error;
pub mod features;
pub mod noise_gate;
pub mod pipeline;
pub mod relative_strength;
pub mod scoring;
pub mod setup;
pub mod trend_gate;

pub use config::{
    BreakoutConfig, BucketConfig, ConfigError, ContractionConfig, NoiseGateConfig,
    RelativeStrengthConfig, ScoreWeights, ScreenConfig, TrendGateConfig,
};
pub use error::ScreenError;
pub use features::{
    PanelPreprocessor, PreprocessedPanel, SymbolFeatures, UniverseRow, UniverseSnapshot,
};
pub use noise_gate::{NoiseGate, NoiseThresholds};
pub use pipeline::{ScreenReport, ScreeningPipeline, StageResult, REPORT_SCHEMA_VERSION};
pub use relative_strength::{RelativeStrengthEngine, RelativeStrengthRecord, RelativeStrengthScore};
pub use scoring::{rank_and_truncate, Bucketer, Scorer};
pub use setup::{ContractionBase, SetupDetector, SetupEvaluation};
pub use trend_gate::{TrendGate, TrendVerdict};

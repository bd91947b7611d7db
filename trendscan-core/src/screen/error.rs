use thiserror::Error;

use super::config::ConfigError;

/// Run-level failures. Per-symbol problems never surface here; they only
/// remove the symbol from the run.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("benchmark series '{symbol}' is missing from the panel")]
    BenchmarkMissing { symbol: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

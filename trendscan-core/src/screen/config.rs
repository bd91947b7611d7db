//! Screening configuration.
//!
//! Every threshold and window used by the pipeline is a named field here.
//! `Default` reproduces the production constants; all sections are
//! `#[serde(default)]` so a TOML file only needs to name what it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse screening config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize screening config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Complete screening configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Instrument every symbol is measured against.
    pub benchmark_symbol: String,
    /// Symbols never screened (stablecoins, indices, tokenised equities).
    pub exclude_symbols: Vec<String>,
    /// Minimum history a symbol needs, in days.
    pub min_history_days: usize,
    pub bars_per_day: usize,
    /// Depth of the self-history distributions (impulse, widths), in days.
    pub distribution_days: usize,
    /// Output cap.
    pub max_output: usize,

    pub noise: NoiseGateConfig,
    pub relative_strength: RelativeStrengthConfig,
    pub trend: TrendGateConfig,
    pub contraction: ContractionConfig,
    pub breakout: BreakoutConfig,
    pub buckets: BucketConfig,
    pub score: ScoreWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseGateConfig {
    pub atr_period: usize,
    /// Cross-sectional quantile of ATR fraction above which a symbol is dropped.
    pub atr_percentile: f64,
    /// Trailing bars for the median dollar volume (one week).
    pub volume_median_bars: usize,
    /// Cross-sectional quantile of median dollar volume below which a symbol is dropped.
    pub volume_percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeStrengthConfig {
    pub short_horizon: usize,
    pub mid_horizon: usize,
    pub long_horizon: usize,
    pub short_weight: f64,
    pub mid_weight: f64,
    pub long_weight: f64,
    /// EMA span applied to the close / benchmark ratio.
    pub ratio_ema_span: usize,
    /// Regression window for the slope of the ratio EMA.
    pub slope_window: usize,
    /// Unlabelled symbols need an RS rank of at least `hard_threshold × 100`.
    pub hard_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendGateConfig {
    pub fast_span: usize,
    pub slow_span: usize,
    /// Aggregation length of the higher timeframe, in hours.
    pub resample_hours: u32,
    pub htf_fast_span: usize,
    pub htf_slow_span: usize,
    /// EMA whose rise over `htf_slope_lag` aggregated bars proxies the slope.
    pub htf_slope_span: usize,
    pub htf_slope_lag: usize,
    pub min_resampled_bars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractionConfig {
    pub impulse_window: usize,
    pub impulse_quantile: f64,
    /// Scan grid of base lengths, in bars.
    pub lookbacks: Vec<usize>,
    pub max_width_rank: f64,
    /// Minimum position of the close inside the base range.
    pub min_position: f64,
    /// EMA the lowest close of the base must stay above.
    pub support_ema_span: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutConfig {
    /// Rolling-high window the breakout must clear.
    pub high_lookback: usize,
    /// How many recent bars may contain the breakout close.
    pub recent_bars: usize,
    pub flag_lookback: usize,
    pub max_flag_width_rank: f64,
    /// EMA the current close must stay above.
    pub support_ema_span: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    pub leader_rank: f64,
    pub power_play_rank: f64,
    pub turning_rank: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub rs: f64,
    pub setup: f64,
    pub trend: f64,
    /// Trend component value for every scored symbol.
    pub trend_score: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            benchmark_symbol: "BTCUSDT".into(),
            exclude_symbols: [
                "USDCUSDT",
                "BTCDOMUSDT",
                "ALLUSDT",
                "XAUUSDT",
                "XAGUSDT",
                "TSLAUSDT",
                "EURUSDT",
                "GBPUSDT",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_history_days: 60,
            bars_per_day: 24,
            distribution_days: 60,
            max_output: 20,
            noise: NoiseGateConfig::default(),
            relative_strength: RelativeStrengthConfig::default(),
            trend: TrendGateConfig::default(),
            contraction: ContractionConfig::default(),
            breakout: BreakoutConfig::default(),
            buckets: BucketConfig::default(),
            score: ScoreWeights::default(),
        }
    }
}

impl Default for NoiseGateConfig {
    fn default() -> Self {
        Self {
            atr_period: 20,
            atr_percentile: 0.95,
            volume_median_bars: 168,
            volume_percentile: 0.10,
        }
    }
}

impl Default for RelativeStrengthConfig {
    fn default() -> Self {
        Self {
            short_horizon: 72,
            mid_horizon: 168,
            long_horizon: 336,
            short_weight: 0.20,
            mid_weight: 0.30,
            long_weight: 0.50,
            ratio_ema_span: 20,
            slope_window: 48,
            hard_threshold: 0.70,
        }
    }
}

impl Default for TrendGateConfig {
    fn default() -> Self {
        Self {
            fast_span: 50,
            slow_span: 200,
            resample_hours: 4,
            htf_fast_span: 20,
            htf_slow_span: 45,
            htf_slope_span: 50,
            htf_slope_lag: 2,
            min_resampled_bars: 55,
        }
    }
}

impl Default for ContractionConfig {
    fn default() -> Self {
        Self {
            impulse_window: 72,
            impulse_quantile: 0.80,
            lookbacks: vec![24, 48, 72, 96, 168],
            max_width_rank: 0.20,
            min_position: 2.0 / 3.0,
            support_ema_span: 200,
        }
    }
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            high_lookback: 240,
            recent_bars: 48,
            flag_lookback: 24,
            max_flag_width_rank: 0.20,
            support_ema_span: 20,
        }
    }
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            leader_rank: 85.0,
            power_play_rank: 80.0,
            turning_rank: 60.0,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            rs: 0.6,
            setup: 0.2,
            trend: 0.2,
            trend_score: 100.0,
        }
    }
}

impl ScreenConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Minimum-history requirement in bars.
    pub fn history_bars(&self) -> usize {
        self.min_history_days * self.bars_per_day
    }

    /// Depth of a symbol's own trailing distribution, in bars.
    pub fn distribution_bars(&self) -> usize {
        self.distribution_days * self.bars_per_day
    }

    /// Longest fixed window any stage reads.
    pub fn longest_window(&self) -> usize {
        let rs = &self.relative_strength;
        let windows = [
            self.noise.atr_period,
            self.noise.volume_median_bars,
            rs.short_horizon,
            rs.mid_horizon,
            rs.long_horizon,
            rs.slope_window,
            self.contraction.impulse_window,
            self.breakout.high_lookback,
            self.breakout.recent_bars,
            self.breakout.flag_lookback,
        ];
        let lookbacks = self.contraction.lookbacks.iter().copied();
        windows.into_iter().chain(lookbacks).max().unwrap_or(0)
    }

    /// Bars a symbol needs to be screened: the configured history or one
    /// more than the longest window, whichever is larger.
    pub fn required_bars(&self) -> usize {
        self.history_bars().max(self.longest_window() + 1)
    }

    pub fn is_excluded(&self, symbol: &str) -> bool {
        self.exclude_symbols.iter().any(|s| s == symbol)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.benchmark_symbol.trim().is_empty() {
            return Err(invalid("benchmark_symbol", "must not be empty"));
        }
        positive("min_history_days", self.min_history_days)?;
        positive("bars_per_day", self.bars_per_day)?;
        positive("distribution_days", self.distribution_days)?;
        positive("max_output", self.max_output)?;

        positive("noise.atr_period", self.noise.atr_period)?;
        positive("noise.volume_median_bars", self.noise.volume_median_bars)?;
        unit_interval("noise.atr_percentile", self.noise.atr_percentile)?;
        unit_interval("noise.volume_percentile", self.noise.volume_percentile)?;

        let rs = &self.relative_strength;
        positive("relative_strength.short_horizon", rs.short_horizon)?;
        positive("relative_strength.mid_horizon", rs.mid_horizon)?;
        positive("relative_strength.long_horizon", rs.long_horizon)?;
        positive("relative_strength.ratio_ema_span", rs.ratio_ema_span)?;
        if rs.slope_window < 2 {
            return Err(invalid("relative_strength.slope_window", "must be at least 2"));
        }
        weight("relative_strength.short_weight", rs.short_weight)?;
        weight("relative_strength.mid_weight", rs.mid_weight)?;
        weight("relative_strength.long_weight", rs.long_weight)?;
        unit_interval("relative_strength.hard_threshold", rs.hard_threshold)?;

        let trend = &self.trend;
        positive("trend.fast_span", trend.fast_span)?;
        positive("trend.slow_span", trend.slow_span)?;
        positive("trend.resample_hours", trend.resample_hours as usize)?;
        positive("trend.htf_fast_span", trend.htf_fast_span)?;
        positive("trend.htf_slow_span", trend.htf_slow_span)?;
        positive("trend.htf_slope_span", trend.htf_slope_span)?;
        positive("trend.htf_slope_lag", trend.htf_slope_lag)?;
        if trend.min_resampled_bars <= trend.htf_slope_lag {
            return Err(invalid(
                "trend.min_resampled_bars",
                "must exceed trend.htf_slope_lag",
            ));
        }

        let vcp = &self.contraction;
        positive("contraction.impulse_window", vcp.impulse_window)?;
        unit_interval("contraction.impulse_quantile", vcp.impulse_quantile)?;
        if vcp.lookbacks.is_empty() {
            return Err(invalid("contraction.lookbacks", "must list at least one length"));
        }
        if vcp.lookbacks.iter().any(|&l| l < 2) {
            return Err(invalid("contraction.lookbacks", "every length must be at least 2"));
        }
        unit_interval("contraction.max_width_rank", vcp.max_width_rank)?;
        unit_interval("contraction.min_position", vcp.min_position)?;
        positive("contraction.support_ema_span", vcp.support_ema_span)?;

        let pp = &self.breakout;
        positive("breakout.high_lookback", pp.high_lookback)?;
        positive("breakout.recent_bars", pp.recent_bars)?;
        positive("breakout.flag_lookback", pp.flag_lookback)?;
        unit_interval("breakout.max_flag_width_rank", pp.max_flag_width_rank)?;
        positive("breakout.support_ema_span", pp.support_ema_span)?;

        for (field, value) in [
            ("buckets.leader_rank", self.buckets.leader_rank),
            ("buckets.power_play_rank", self.buckets.power_play_rank),
            ("buckets.turning_rank", self.buckets.turning_rank),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(invalid(field, format!("{value} is outside [0, 100]")));
            }
        }

        weight("score.rs", self.score.rs)?;
        weight("score.setup", self.score.setup)?;
        weight("score.trend", self.score.trend)?;
        if !self.score.trend_score.is_finite() {
            return Err(invalid("score.trend_score", "must be finite"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(invalid(field, "must be greater than zero"));
    }
    Ok(())
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(field, format!("{value} is outside [0, 1]")));
    }
    Ok(())
}

fn weight(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, format!("{value} must be a finite, non-negative weight")));
    }
    Ok(())
}

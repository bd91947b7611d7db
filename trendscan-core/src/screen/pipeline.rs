//! Screening pipeline: one panel snapshot in, ranked candidates out.
//!
//! Stage order:
//! 1. Preprocess: feature columns per screenable symbol, universe snapshot.
//! 2. Noise gate over the snapshot.
//! 3. Relative strength: score every survivor, then rank the batch.
//! 4. Trend gate.
//! 5. Setup detection.
//! 6. Bucketing and scoring.
//! 7. Sort and truncate.
//!
//! The run is synchronous and holds no state between calls. The only
//! run-level failure is a missing benchmark (or an invalid config at
//! construction); everything else removes individual symbols.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::ScreenConfig;
use super::error::ScreenError;
use super::features::PanelPreprocessor;
use super::noise_gate::NoiseGate;
use super::relative_strength::RelativeStrengthEngine;
use super::scoring::{make_candidate, rank_and_truncate, Bucketer, Scorer};
use super::setup::SetupDetector;
use super::trend_gate::TrendGate;
use crate::domain::{Candidate, ConfigHash, DatasetHash, Panel};
use crate::fingerprint;

/// Bump when the serialized report layout changes.
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Survivor counts of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: String,
    pub input: usize,
    pub passed: usize,
    pub eliminated: usize,
}

impl StageResult {
    pub fn elimination_rate(&self) -> f64 {
        if self.input == 0 {
            0.0
        } else {
            self.eliminated as f64 / self.input as f64
        }
    }
}

/// Result of one run: the candidates plus what produced them.
///
/// Carries no wall-clock data, so identical inputs serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenReport {
    pub schema_version: u32,
    pub benchmark: String,
    /// Symbols in the panel other than the benchmark.
    pub universe_size: usize,
    pub candidates: Vec<Candidate>,
    pub funnel: Vec<StageResult>,
    pub dataset_hash: DatasetHash,
    pub config_hash: ConfigHash,
}

#[derive(Default)]
struct Funnel(Vec<StageResult>);

impl Funnel {
    fn record(&mut self, stage: &str, input: usize, passed: usize) {
        let eliminated = input.saturating_sub(passed);
        info!(stage, input, passed, eliminated, "stage complete");
        self.0.push(StageResult {
            stage: stage.to_string(),
            input,
            passed,
            eliminated,
        });
    }
}

#[derive(Debug, Clone)]
pub struct ScreeningPipeline {
    config: ScreenConfig,
    config_hash: ConfigHash,
}

impl ScreeningPipeline {
    /// Validate `config` and build a pipeline around it.
    pub fn new(config: ScreenConfig) -> Result<Self, ScreenError> {
        config.validate()?;
        let config_hash = fingerprint::config_hash(&config)?;
        Ok(Self {
            config,
            config_hash,
        })
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn config_hash(&self) -> &ConfigHash {
        &self.config_hash
    }

    /// Candidates only.
    pub fn screen(&self, panel: &Panel) -> Result<Vec<Candidate>, ScreenError> {
        Ok(self.run(panel)?.candidates)
    }

    pub fn run(&self, panel: &Panel) -> Result<ScreenReport, ScreenError> {
        let config = &self.config;
        let benchmark =
            panel
                .get(&config.benchmark_symbol)
                .ok_or_else(|| ScreenError::BenchmarkMissing {
                    symbol: config.benchmark_symbol.clone(),
                })?;

        let dataset_hash = fingerprint::dataset_hash(panel);
        let universe_size = panel.len() - 1;
        info!(
            universe = universe_size,
            benchmark = %config.benchmark_symbol,
            dataset = dataset_hash.short(),
            "screening run started"
        );

        let mut funnel = Funnel::default();

        // 1. Preprocess
        let pre = PanelPreprocessor::new(config).run(panel);
        funnel.record("preprocess", pre.candidates_offered, pre.features.len());

        // 2. Noise gate
        let survivors = NoiseGate::new(&config.noise).apply(&pre.snapshot);
        funnel.record("noise_gate", pre.snapshot.len(), survivors.len());

        // 3. Relative strength (collect, then rank)
        let rs_engine = RelativeStrengthEngine::new(&config.relative_strength);
        let batch = survivors
            .iter()
            .filter_map(|symbol| pre.features.get(symbol.as_str()));
        let ranked = rs_engine.evaluate(batch, benchmark);
        funnel.record("relative_strength", survivors.len(), ranked.len());

        // 4. Trend gate
        let trend_gate = TrendGate::new(&config.trend);
        let mut trending = Vec::with_capacity(ranked.len());
        for rs in &ranked {
            let Some(features) = pre.features.get(rs.symbol.as_str()) else {
                continue;
            };
            let verdict = trend_gate.evaluate(features.bars, &features.close);
            if verdict.passed() {
                trending.push((rs, features));
            } else {
                debug!(symbol = %rs.symbol, ?verdict, "trend gate rejected");
            }
        }
        funnel.record("trend_gate", ranked.len(), trending.len());

        // 5. Setups
        let detector = SetupDetector::new(
            &config.contraction,
            &config.breakout,
            config.distribution_bars(),
        );
        let mut with_setup = Vec::with_capacity(trending.len());
        for (rs, features) in &trending {
            let setup = detector.evaluate(features);
            if setup.any() {
                debug!(
                    symbol = %rs.symbol,
                    contraction = ?setup.contraction,
                    breakout_flag = setup.breakout_flag,
                    "setup found"
                );
                with_setup.push((*rs, *features, setup));
            }
        }
        funnel.record("setup", trending.len(), with_setup.len());

        // 6. Bucket and score
        let bucketer = Bucketer::new(&config.buckets, config.relative_strength.hard_threshold);
        let scorer = Scorer::new(&config.score);
        let mut candidates = Vec::with_capacity(with_setup.len());
        for (rs, features, setup) in &with_setup {
            let Some(bucket) = bucketer.classify(rs, setup) else {
                debug!(symbol = %rs.symbol, rank = rs.rank, "below hard RS threshold");
                continue;
            };
            let score = scorer.score(rs.rank, setup);
            if let Some(candidate) =
                make_candidate(rs, bucket, score, features.last_close(), setup)
            {
                candidates.push(candidate);
            }
        }
        funnel.record("bucket", with_setup.len(), candidates.len());

        // 7. Sort and truncate
        let scored = candidates.len();
        let candidates = rank_and_truncate(candidates, config.max_output);
        funnel.record("output", scored, candidates.len());

        info!(candidates = candidates.len(), "screening run finished");

        Ok(ScreenReport {
            schema_version: REPORT_SCHEMA_VERSION,
            benchmark: config.benchmark_symbol.clone(),
            universe_size,
            candidates,
            funnel: funnel.0,
            dataset_hash,
            config_hash: self.config_hash.clone(),
        })
    }
}

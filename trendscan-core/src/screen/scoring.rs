//! Bucketing, composite scoring and the final ordering.

use super::config::{BucketConfig, ScoreWeights};
use super::relative_strength::RelativeStrengthRecord;
use super::setup::SetupEvaluation;
use crate::domain::{round1, Bucket, Candidate};

pub struct Bucketer<'c> {
    config: &'c BucketConfig,
    /// Minimum RS rank (0–100) for an unlabelled symbol.
    hard_rank: f64,
}

impl<'c> Bucketer<'c> {
    pub fn new(config: &'c BucketConfig, hard_threshold: f64) -> Self {
        Self {
            config,
            hard_rank: hard_threshold * 100.0,
        }
    }

    /// First matching bucket in priority order, or `None` when an unlabelled
    /// symbol falls below the hard RS rank and must be dropped.
    pub fn classify(&self, rs: &RelativeStrengthRecord, setup: &SetupEvaluation) -> Option<Bucket> {
        let c = self.config;
        let bucket = if rs.rank > c.leader_rank && rs.trend_confirmed && setup.any() {
            Bucket::Leader
        } else if rs.rank > c.power_play_rank && setup.breakout_flag {
            Bucket::PowerPlay
        } else if rs.rank > c.turning_rank && rs.trend_confirmed {
            Bucket::Turning
        } else {
            Bucket::None
        };

        if bucket == Bucket::None && rs.rank < self.hard_rank {
            return None;
        }
        Some(bucket)
    }
}

pub struct Scorer<'c> {
    weights: &'c ScoreWeights,
}

impl<'c> Scorer<'c> {
    pub fn new(weights: &'c ScoreWeights) -> Self {
        Self { weights }
    }

    /// `(1 − width_rank) × 100` for a contraction base, 0 otherwise.
    ///
    /// A breakout-only symbol scores zero here.
    pub fn setup_quality(&self, setup: &SetupEvaluation) -> f64 {
        setup
            .contraction
            .map_or(0.0, |base| (1.0 - base.width_rank) * 100.0)
    }

    /// Unrounded composite score.
    pub fn score(&self, rs_rank: f64, setup: &SetupEvaluation) -> f64 {
        let w = self.weights;
        w.rs * rs_rank + w.setup * self.setup_quality(setup) + w.trend * w.trend_score
    }
}

/// Build a candidate; rank and score are rounded to one decimal.
pub fn make_candidate(
    rs: &RelativeStrengthRecord,
    bucket: Bucket,
    score: f64,
    price: f64,
    setup: &SetupEvaluation,
) -> Option<Candidate> {
    Some(Candidate {
        symbol: rs.symbol.clone(),
        bucket,
        rs_rank: round1(rs.rank),
        score: round1(score),
        price,
        setup: setup.kind()?,
    })
}

/// Sort by descending score and keep the first `max_output`.
///
/// The sort is stable, so equal scores keep their incoming (symbol) order.
pub fn rank_and_truncate(mut candidates: Vec<Candidate>, max_output: usize) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(max_output);
    candidates
}

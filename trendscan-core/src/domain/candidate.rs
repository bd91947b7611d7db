//! Candidate: the final output unit of a screening run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority classification for a qualifying symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bucket {
    Leader,
    PowerPlay,
    Turning,
    None,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leader => write!(f, "Leader"),
            Self::PowerPlay => write!(f, "PowerPlay"),
            Self::Turning => write!(f, "Turning"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Which setup pattern qualified the symbol.
///
/// A symbol that passes both patterns is labelled `PowerPlay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupKind {
    /// Contraction base.
    #[serde(rename = "VCP")]
    Vcp,
    /// Breakout flag.
    #[serde(rename = "PP")]
    PowerPlay,
}

impl fmt::Display for SetupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vcp => write!(f, "VCP"),
            Self::PowerPlay => write!(f, "PP"),
        }
    }
}

/// One ranked symbol. `rs_rank` and `score` are rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: String,
    pub bucket: Bucket,
    pub rs_rank: f64,
    pub score: f64,
    pub price: f64,
    pub setup: SetupKind,
}

/// Round to one decimal place (half away from zero).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

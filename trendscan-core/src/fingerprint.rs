//! Run fingerprinting: deterministic identification of inputs.
//!
//! - `dataset_hash`: BLAKE3 over every series of the panel, bit-exact.
//! - `config_hash`: BLAKE3 over the canonical TOML rendering of the config.
//!
//! Two runs with the same pair of hashes must produce the same report.

use crate::domain::{ConfigHash, DatasetHash, Panel};
use crate::screen::{ConfigError, ScreenConfig};

/// Content hash of a panel snapshot.
///
/// Symbols are visited in sorted order; each bar contributes its timestamp
/// (milliseconds) and the raw bits of its five values, so NaN payloads and
/// signed zeros are distinguished.
pub fn dataset_hash(panel: &Panel) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    for (symbol, bars) in panel.iter() {
        hasher.update(symbol.as_bytes());
        hasher.update(&[0]);
        hasher.update(&(bars.len() as u64).to_le_bytes());
        for bar in bars {
            hasher.update(&bar.timestamp.timestamp_millis().to_le_bytes());
            for v in [bar.open, bar.high, bar.low, bar.close, bar.volume] {
                hasher.update(&v.to_bits().to_le_bytes());
            }
        }
    }
    DatasetHash::from_hash(hasher.finalize())
}

/// Hash of every configured value.
pub fn config_hash(config: &ScreenConfig) -> Result<ConfigHash, ConfigError> {
    let canonical = config.to_toml_string()?;
    Ok(ConfigHash::from_bytes(canonical.as_bytes()))
}

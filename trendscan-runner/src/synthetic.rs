//! Synthetic hourly panels for demos, benches and tests.
//!
//! Every series is a geometric random walk whose drift and volatility are
//! drawn per symbol. The RNG for a symbol is seeded from
//! `BLAKE3(seed || symbol)`, so a given `(seed, symbol)` pair always yields
//! the same bars regardless of universe size.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trendscan_core::domain::{Bar, Panel, PanelError};

#[derive(Debug, Clone)]
pub struct SyntheticPanel {
    pub benchmark: String,
    /// Number of non-benchmark symbols.
    pub symbols: usize,
    pub bars: usize,
    pub seed: u64,
    pub start: DateTime<Utc>,
}

impl SyntheticPanel {
    pub fn new(benchmark: impl Into<String>, symbols: usize, bars: usize, seed: u64) -> Self {
        Self {
            benchmark: benchmark.into(),
            symbols,
            bars,
            seed,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default(),
        }
    }

    pub fn symbol_names(&self) -> Vec<String> {
        (0..self.symbols).map(|i| format!("SYN{i:03}USDT")).collect()
    }

    pub fn generate(&self) -> Result<Panel, PanelError> {
        let mut panel = Panel::new();
        panel.insert(self.benchmark.clone(), self.series(&self.benchmark))?;
        for symbol in self.symbol_names() {
            let bars = self.series(&symbol);
            panel.insert(symbol, bars)?;
        }
        Ok(panel)
    }

    fn rng_for(&self, symbol: &str) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }

    /// One symbol's bars.
    pub fn series(&self, symbol: &str) -> Vec<Bar> {
        let mut rng = self.rng_for(symbol);
        let drift: f64 = rng.gen_range(-0.0006..0.0010);
        let vol: f64 = rng.gen_range(0.003..0.012);
        let base_volume: f64 = rng.gen_range(1_000.0..500_000.0);
        let mut price: f64 = rng.gen_range(0.5..500.0);

        (0..self.bars)
            .map(|i| {
                // Sum of two uniforms: triangular shock with unit-ish spread.
                let shock = rng.gen_range(-1.0..1.0) + rng.gen_range(-1.0..1.0);
                let open = price;
                let close = open * (drift + vol * shock).exp();
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..vol));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..vol));
                let volume = base_volume * rng.gen_range(0.5..1.5);
                price = close;
                Bar {
                    timestamp: self.start + Duration::hours(i as i64),
                    open,
                    high,
                    low,
                    close,
                    volume,
                }
            })
            .collect()
    }
}

//! Panel loading from a directory of per-symbol CSV files.
//!
//! Layout: one `<SYMBOL>.csv` per instrument with the header
//! `timestamp,open,high,low,close,volume`. Timestamps are Unix milliseconds
//! or RFC 3339 strings. Empty numeric cells load as NaN (void bars).
//!
//! Loading policy:
//! 1. Files are visited in name order so the panel is reproducible.
//! 2. A file that fails to parse, is out of order, carries an insane bar, or
//!    is shorter than `min_bars` is skipped with a warning.
//! 3. Only an unreadable directory is fatal here. A missing benchmark is
//!    reported by the pipeline.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use trendscan_core::domain::{Bar, Panel, PanelError};

/// Fatal loader errors.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read panel directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single file was left out of the panel.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unrecognised timestamp '{value}'")]
    Timestamp { row: usize, value: String },

    #[error("row {row}: inconsistent OHLCV values")]
    InsaneBar { row: usize },

    #[error("only {bars} bars, {required} required")]
    TooShort { bars: usize, required: usize },

    #[error(transparent)]
    Panel(#[from] PanelError),
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Files with fewer bars are skipped.
    pub min_bars: usize,
}

/// A file that did not make it into the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug)]
pub struct LoadedPanel {
    pub panel: Panel,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

/// Load every `*.csv` under `dir` into a panel.
pub fn load_panel_dir(dir: &Path, opts: &LoadOptions) -> Result<LoadedPanel, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();

    let mut panel = Panel::new();
    let mut skipped = Vec::new();

    for path in &files {
        let Some(symbol) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let outcome = read_symbol_csv(path).and_then(|bars| {
            if bars.len() < opts.min_bars {
                return Err(FileError::TooShort {
                    bars: bars.len(),
                    required: opts.min_bars,
                });
            }
            panel.insert(symbol, bars).map_err(FileError::from)
        });
        if let Err(e) = outcome {
            warn!(symbol, file = %path.display(), error = %e, "skipping symbol");
            skipped.push(SkippedFile {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            });
        }
    }

    info!(
        dir = %dir.display(),
        loaded = panel.len(),
        skipped = skipped.len(),
        "panel loaded"
    );
    Ok(LoadedPanel { panel, skipped })
}

/// Read one symbol file into ordered bars.
///
/// Void bars (any cell empty or NaN) are kept; every other bar must pass
/// [`Bar::is_sane`].
pub fn read_symbol_csv(path: &Path) -> Result<Vec<Bar>, FileError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut bars = Vec::new();
    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let line = i + 2;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| FileError::Timestamp {
            row: line,
            value: row.timestamp.clone(),
        })?;
        let bar = Bar {
            timestamp,
            open: row.open.unwrap_or(f64::NAN),
            high: row.high.unwrap_or(f64::NAN),
            low: row.low.unwrap_or(f64::NAN),
            close: row.close.unwrap_or(f64::NAN),
            volume: row.volume.unwrap_or(f64::NAN),
        };
        if !bar.is_void() && !bar.is_sane() {
            return Err(FileError::InsaneBar { row: line });
        }
        bars.push(bar);
    }
    Ok(bars)
}

/// Unix milliseconds, or an RFC 3339 string.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ms) = value.parse::<i64>() {
        return DateTime::<Utc>::from_timestamp_millis(ms);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    const HEADER: &str = "timestamp,open,high,low,close,volume\n";

    fn write_csv(dir: &Path, name: &str, body: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(HEADER.as_bytes()).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    fn hourly_rows(n: usize) -> String {
        let start = 1_704_067_200_000_i64; // 2024-01-01T00:00:00Z
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                format!(
                    "{},{},{},{},{},{}\n",
                    start + i as i64 * 3_600_000,
                    c,
                    c + 1.0,
                    c - 1.0,
                    c + 0.5,
                    1000.0
                )
            })
            .collect()
    }

    #[test]
    fn parses_millis_and_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("1704067200000"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T08:00:00+08:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn reads_void_bars_as_nan() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "ETHUSDT.csv",
            "1704067200000,10,11,9,10.5,5\n1704070800000,,,,,\n",
        );
        let bars = read_symbol_csv(&dir.path().join("ETHUSDT.csv")).unwrap();
        assert_eq!(bars.len(), 2);
        assert!(!bars[0].is_void());
        assert!(bars[1].is_void());
    }

    #[test]
    fn insane_bar_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "BAD.csv", "1704067200000,10,9,11,10,5\n");
        let err = read_symbol_csv(&dir.path().join("BAD.csv")).unwrap_err();
        assert!(matches!(err, FileError::InsaneBar { row: 2 }));
    }

    #[test]
    fn loads_directory_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "BTCUSDT.csv", &hourly_rows(30));
        write_csv(dir.path(), "ETHUSDT.csv", &hourly_rows(30));
        write_csv(dir.path(), "SHORTUSDT.csv", &hourly_rows(29));
        write_csv(dir.path(), "GARBLEDUSDT.csv", "not-a-time,1,2,0.5,1,1\n");
        std::fs::write(dir.path().join("README.txt"), "ignored").unwrap();

        let loaded = load_panel_dir(dir.path(), &LoadOptions { min_bars: 30 }).unwrap();

        assert_eq!(
            loaded.panel.symbols().collect::<Vec<_>>(),
            vec!["BTCUSDT", "ETHUSDT"]
        );
        let skipped: Vec<&str> = loaded.skipped.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(skipped, vec!["GARBLEDUSDT", "SHORTUSDT"]);
        assert!(loaded.skipped[1].reason.contains("29 bars"));
    }

    #[test]
    fn out_of_order_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "XUSDT.csv",
            "1704070800000,10,11,9,10,1\n1704067200000,10,11,9,10,1\n",
        );
        let loaded = load_panel_dir(dir.path(), &LoadOptions { min_bars: 1 }).unwrap();
        assert!(loaded.panel.is_empty());
        assert!(loaded.skipped[0].reason.contains("not strictly increasing"));
    }

    #[test]
    fn missing_directory_is_fatal() {
        let err = load_panel_dir(Path::new("/nonexistent/panel"), &LoadOptions { min_bars: 1 })
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/panel"));
    }
}
